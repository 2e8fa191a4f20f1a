//! termdex: a memory-budgeted parallel inverted-index builder and
//! TF-IDF/BM25 query engine.
//!
//! Two pipelines share this crate:
//! - indexing (`indexer`, `merge`) builds `final_inverted_index.jsonl`,
//!   `lexicon.jsonl`, `document_index.jsonl`, and `stats.json` from a
//!   `.jsonl` corpus under a bounded memory budget;
//! - querying (`query`) loads those files and answers ranked keyword
//!   queries under conjunctive retrieval semantics.

pub mod config;
pub mod error;
pub mod indexer;
pub mod merge;
pub mod query;
pub mod tokenizer;
pub mod types;

pub use config::{IndexerConfig, ProcessorConfig};
pub use error::{IndexError, Result};
pub use indexer::{run_indexing, IndexingReport};
pub use query::{Processor, ScoredDoc};
pub use tokenizer::{Tokenizer, WhitespaceTokenizer};
pub use types::{
    CorpusRecord, DocId, DocumentIndexEntry, GlobalStats, IndexRecord, LexiconEntry, Posting,
    PostingList, Ranker, Term,
};
