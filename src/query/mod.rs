//! Query pipeline: loads the lexicon and document index eagerly, opens
//! the final index for random-access reads, and answers ranked keyword
//! queries under conjunctive retrieval semantics.

pub mod scorer;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use ahash::AHashMap;
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::error::{IndexError, Result};
use crate::query::scorer::Scorer;
use crate::tokenizer::Tokenizer;
use crate::types::{DocId, GlobalStats, IndexRecord, LexiconEntry, Ranker};

/// Opens the final index file named by `index_file_path` (spec.md §6,
/// `--index_file_path`/`-i`) and loads `lexicon.jsonl`, `document_index.jsonl`,
/// and `stats.json` from its parent directory, where `termdex-index` wrote
/// them as siblings of the index file. Every field here is read-only once
/// constructed, so a `Processor` can be shared (behind `Arc`) across threads
/// answering queries concurrently — the only mutable state is the IDF cache
/// inside `Scorer`, which is a concurrent map, and the index file handle's
/// seek position, which is guarded by a mutex.
pub struct Processor {
    lexicon: AHashMap<String, LexiconEntry>,
    doc_lengths: AHashMap<DocId, u64>,
    stats: GlobalStats,
    index_file: Mutex<BufReader<File>>,
    scorer: Scorer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

impl Processor {
    /// `index_file_path` is the final index file itself, e.g.
    /// `/out/final_inverted_index.jsonl` — the sibling `lexicon.jsonl`,
    /// `document_index.jsonl`, and `stats.json` are found in its parent
    /// directory.
    pub fn open(index_file_path: &Path) -> Result<Self> {
        let dir = index_file_path.parent().unwrap_or_else(|| Path::new("."));
        let lexicon = load_lexicon(&dir.join("lexicon.jsonl"))?;
        let doc_lengths = load_doc_lengths(&dir.join("document_index.jsonl"))?;
        let stats = load_stats(&dir.join("stats.json"))?;
        let index_file = File::open(index_file_path)?;
        let scorer = Scorer::new(stats.num_documents, stats.avg_doc_length);

        Ok(Processor {
            lexicon,
            doc_lengths,
            stats,
            index_file: Mutex::new(BufReader::new(index_file)),
            scorer,
        })
    }

    pub fn stats(&self) -> GlobalStats {
        self.stats
    }

    /// Tokenizes `query_text` with `tokenizer` (must match the tokenizer
    /// used at index time) and returns the top `top_k` documents by score,
    /// descending, ties broken by ascending doc_id. Conjunctive retrieval:
    /// any query term absent from the lexicon empties the candidate set.
    pub fn query(
        &self,
        tokenizer: &dyn Tokenizer,
        query_text: &str,
        ranker: Ranker,
        top_k: usize,
    ) -> Result<Vec<ScoredDoc>> {
        let mut terms: Vec<String> = tokenizer.tokenize(query_text);
        terms.sort_unstable();
        terms.dedup();

        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut per_term_postings: Vec<(LexiconEntry, AHashMap<DocId, u32>)> =
            Vec::with_capacity(terms.len());
        for term in &terms {
            let Some(entry) = self.lexicon.get(term) else {
                // Missing term under conjunctive semantics: empty candidate set.
                return Ok(Vec::new());
            };
            let record = self.read_record_at(entry.offset)?;
            let postings: AHashMap<DocId, u32> =
                record.postings.into_iter().map(|(doc, tf)| (doc, tf)).collect();
            per_term_postings.push((entry.clone(), postings));
        }

        let candidates = intersect_doc_ids(&per_term_postings);

        // Scoring each candidate is independent of every other, so large
        // candidate sets are scored data-parallel (the same pattern the
        // corpus uses in `diskann/fresh_graph.rs` for per-node work); the
        // bounded top-k heap itself stays single-threaded since it's a
        // small, cheap, order-sensitive reduction.
        let scored: Vec<HeapCandidate> = candidates
            .par_iter()
            .map(|doc_id| {
                let doc_len = *self.doc_lengths.get(doc_id).unwrap_or(&0);
                let score = per_term_postings
                    .iter()
                    .map(|(entry, postings)| {
                        let tf = postings[doc_id];
                        self.scorer.score_term(ranker, &entry.term, entry.df, tf, doc_len)
                    })
                    .sum();
                HeapCandidate { doc_id: doc_id.clone(), score }
            })
            .collect();

        let mut heap: BinaryHeap<HeapCandidate> = BinaryHeap::new();
        for candidate in scored {
            heap.push(candidate);
            if heap.len() > top_k {
                heap.pop();
            }
        }

        let mut results: Vec<ScoredDoc> = heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| ScoredDoc { doc_id: c.doc_id, score: c.score })
            .collect();
        results.reverse();
        Ok(results)
    }

    fn read_record_at(&self, offset: u64) -> Result<IndexRecord> {
        let mut guard = self.index_file.lock();
        guard.seek(SeekFrom::Start(offset))?;
        let mut line = String::new();
        guard.read_line(&mut line)?;
        serde_json::from_str(line.trim_end()).map_err(IndexError::from)
    }
}

/// Reverse order by score so `BinaryHeap` (a max-heap) behaves as a
/// bounded min-heap of the current top-k: the smallest surviving score
/// sits at the top and is the one popped when the heap overflows. Ties
/// favor the larger doc_id for popping, so ascending doc_id wins among
/// equal scores in the final output.
struct HeapCandidate {
    doc_id: DocId,
    score: f64,
}

impl PartialEq for HeapCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.doc_id == other.doc_id
    }
}
impl Eq for HeapCandidate {}

impl PartialOrd for HeapCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then(other.doc_id.cmp(&self.doc_id))
    }
}

fn intersect_doc_ids(per_term: &[(LexiconEntry, AHashMap<DocId, u32>)]) -> Vec<DocId> {
    let Some((_, smallest)) = per_term.iter().min_by_key(|(_, postings)| postings.len()) else {
        return Vec::new();
    };
    smallest
        .keys()
        .filter(|doc_id| per_term.iter().all(|(_, postings)| postings.contains_key(*doc_id)))
        .cloned()
        .collect()
}

fn load_lexicon(path: &Path) -> Result<AHashMap<String, LexiconEntry>> {
    let file = File::open(path)?;
    let mut map = AHashMap::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: LexiconEntry = serde_json::from_str(&line)?;
        map.insert(entry.term.clone(), entry);
    }
    Ok(map)
}

fn load_doc_lengths(path: &Path) -> Result<AHashMap<DocId, u64>> {
    let file = File::open(path)?;
    let mut map = AHashMap::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: crate::types::DocumentIndexEntry = serde_json::from_str(&line)?;
        map.insert(entry.doc_id, entry.tokens);
    }
    Ok(map)
}

fn load_stats(path: &Path) -> Result<GlobalStats> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::WhitespaceTokenizer;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_fixture(dir: &Path) {
        // index: two terms, "alpha" shared by d1,d2; "beta" only d1.
        let mut index = File::create(dir.join("final_inverted_index.jsonl")).unwrap();
        let alpha_line = serde_json::to_string(&IndexRecord {
            term: "alpha".into(),
            postings: vec![("d1".into(), 2), ("d2".into(), 1)],
        })
        .unwrap();
        writeln!(index, "{alpha_line}").unwrap();
        let alpha_offset = 0u64;
        let beta_offset = alpha_line.len() as u64 + 1;
        let beta_line = serde_json::to_string(&IndexRecord {
            term: "beta".into(),
            postings: vec![("d1".into(), 1)],
        })
        .unwrap();
        writeln!(index, "{beta_line}").unwrap();

        let mut lexicon = File::create(dir.join("lexicon.jsonl")).unwrap();
        writeln!(
            lexicon,
            "{}",
            serde_json::to_string(&LexiconEntry { term: "alpha".into(), df: 2, cf: 3, offset: alpha_offset })
                .unwrap()
        )
        .unwrap();
        writeln!(
            lexicon,
            "{}",
            serde_json::to_string(&LexiconEntry { term: "beta".into(), df: 1, cf: 1, offset: beta_offset })
                .unwrap()
        )
        .unwrap();

        let mut doc_index = File::create(dir.join("document_index.jsonl")).unwrap();
        writeln!(
            doc_index,
            "{}",
            serde_json::to_string(&crate::types::DocumentIndexEntry { doc_id: "d1".into(), tokens: 3, chars: 12 })
                .unwrap()
        )
        .unwrap();
        writeln!(
            doc_index,
            "{}",
            serde_json::to_string(&crate::types::DocumentIndexEntry { doc_id: "d2".into(), tokens: 1, chars: 5 })
                .unwrap()
        )
        .unwrap();

        std::fs::write(
            dir.join("stats.json"),
            serde_json::to_string(&GlobalStats { num_documents: 2, num_tokens: 4, avg_doc_length: 2.0 }).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn conjunctive_query_returns_only_documents_containing_every_term() {
        let dir = TempDir::new().unwrap();
        write_fixture(dir.path());
        let processor = Processor::open(&dir.path().join("final_inverted_index.jsonl")).unwrap();
        let tokenizer = WhitespaceTokenizer::default();

        let results = processor.query(&tokenizer, "alpha beta", Ranker::Bm25, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].doc_id, "d1");
    }

    #[test]
    fn single_term_query_matches_both_documents() {
        let dir = TempDir::new().unwrap();
        write_fixture(dir.path());
        let processor = Processor::open(&dir.path().join("final_inverted_index.jsonl")).unwrap();
        let tokenizer = WhitespaceTokenizer::default();

        let results = processor.query(&tokenizer, "alpha", Ranker::TfIdf, 10).unwrap();
        let doc_ids: Vec<&str> = results.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(doc_ids.len(), 2);
        assert!(doc_ids.contains(&"d1"));
        assert!(doc_ids.contains(&"d2"));
    }

    #[test]
    fn missing_term_yields_empty_results() {
        let dir = TempDir::new().unwrap();
        write_fixture(dir.path());
        let processor = Processor::open(&dir.path().join("final_inverted_index.jsonl")).unwrap();
        let tokenizer = WhitespaceTokenizer::default();

        let results = processor.query(&tokenizer, "nonexistent", Ranker::Bm25, 10).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn top_k_truncates_and_orders_by_score() {
        let dir = TempDir::new().unwrap();
        write_fixture(dir.path());
        let processor = Processor::open(&dir.path().join("final_inverted_index.jsonl")).unwrap();
        let tokenizer = WhitespaceTokenizer::default();

        let results = processor.query(&tokenizer, "alpha", Ranker::Bm25, 1).unwrap();
        assert_eq!(results.len(), 1);
    }
}
