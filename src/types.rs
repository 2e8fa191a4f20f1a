//! Core data types shared across the indexing and query pipelines.

use serde::{Deserialize, Serialize};

/// A document identifier, preserved verbatim from the corpus.
pub type DocId = String;

/// A normalized token string. Treated as an opaque byte string for
/// ordering and equality — the core never inspects its linguistic shape.
pub type Term = String;

/// `(doc_id, tf)` — a term's occurrence count within one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
}

/// A posting list: unique on `doc_id`, sorted ascending by `doc_id`.
pub type PostingList = Vec<Posting>;

/// Per-term metadata recorded in the lexicon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub term: Term,
    /// Number of distinct documents containing the term.
    pub df: u64,
    /// Sum of `tf` across all postings for the term.
    pub cf: u64,
    /// Byte offset of the term's record in the final index file.
    pub offset: u64,
}

/// Per-document metadata recorded in the document index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentIndexEntry {
    pub doc_id: DocId,
    pub tokens: u64,
    pub chars: u64,
}

/// Corpus-wide aggregate statistics, persisted as `stats.json`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GlobalStats {
    pub num_documents: u64,
    pub num_tokens: u64,
    pub avg_doc_length: f64,
}

/// One line of the final inverted index file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub term: Term,
    pub postings: Vec<(DocId, u32)>,
}

impl IndexRecord {
    pub fn from_posting_list(term: Term, postings: PostingList) -> Self {
        IndexRecord {
            term,
            postings: postings.into_iter().map(|p| (p.doc_id, p.tf)).collect(),
        }
    }

    pub fn into_posting_list(self) -> (Term, PostingList) {
        let postings = self
            .postings
            .into_iter()
            .map(|(doc_id, tf)| Posting { doc_id, tf })
            .collect();
        (self.term, postings)
    }
}

/// One raw corpus record, as read from the `.jsonl` input.
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusRecord {
    pub id: DocId,
    pub text: String,
}

/// Which relevance ranker a query should be scored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ranker {
    TfIdf,
    Bm25,
}

impl std::str::FromStr for Ranker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bm25" => Ok(Ranker::Bm25),
            "tfidf" | "tf-idf" | "tf_idf" => Ok(Ranker::TfIdf),
            other => Err(format!("unknown ranker '{other}', expected 'bm25' or 'tfidf'")),
        }
    }
}
