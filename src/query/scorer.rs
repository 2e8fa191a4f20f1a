//! TF-IDF and BM25 relevance scoring.
//!
//! IDF is memoized per `(term, ranker)` for the lifetime of the processor
//! in a `DashMap`, mirroring the corpus's choice of a concurrent map
//! wherever a cache must stay correct under multi-threaded query
//! answering (`cache/row_cache.rs`'s `Arc<DashMap<...>>` access-pattern
//! tracker is the same shape, applied here to scores instead of rows).

use dashmap::DashMap;

use crate::types::Ranker;

/// Okapi BM25 parameters. Fixed at `k1 = 1.5`, `b = 0.75` per the scoring
/// contract; exposed as a struct (rather than bare constants) so a future
/// caller can plug in a tuned variant without touching the scoring math.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.5, b: 0.75 }
    }
}

pub struct Scorer {
    num_documents: u64,
    avg_doc_length: f64,
    bm25: Bm25Params,
    idf_cache: DashMap<(String, RankerKey), f64>,
}

/// `Ranker` isn't `Hash`/`Eq` by itself being a plain enum works fine, but
/// spelling out the cache key type keeps the dashmap key self-contained.
type RankerKey = Ranker;

impl Scorer {
    pub fn new(num_documents: u64, avg_doc_length: f64) -> Self {
        Scorer {
            num_documents,
            avg_doc_length,
            bm25: Bm25Params::default(),
            idf_cache: DashMap::new(),
        }
    }

    /// Document score contribution from one query term occurring `tf`
    /// times in a document of length `doc_len`.
    pub fn score_term(&self, ranker: Ranker, term: &str, df: u64, tf: u32, doc_len: u64) -> f64 {
        match ranker {
            Ranker::TfIdf => {
                let idf = self.idf(ranker, term, df, |n, df| (n as f64 / df as f64).ln());
                (1.0 + (tf as f64).ln()) * idf
            }
            Ranker::Bm25 => {
                let idf = self.idf(ranker, term, df, |n, df| {
                    (((n as f64 - df as f64 + 0.5) / (df as f64 + 0.5)) + 1.0).ln()
                });
                let norm = if self.avg_doc_length > 0.0 {
                    1.0 - self.bm25.b + self.bm25.b * (doc_len as f64 / self.avg_doc_length)
                } else {
                    1.0
                };
                idf * (tf as f64 * (self.bm25.k1 + 1.0)) / (tf as f64 + self.bm25.k1 * norm)
            }
        }
    }

    fn idf(&self, ranker: Ranker, term: &str, df: u64, formula: impl Fn(u64, u64) -> f64) -> f64 {
        if let Some(cached) = self.idf_cache.get(&(term.to_string(), ranker)) {
            return *cached;
        }
        let value = formula(self.num_documents, df);
        self.idf_cache.insert((term.to_string(), ranker), value);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tfidf_matches_the_documented_formula() {
        let scorer = Scorer::new(10, 5.0);
        let score = scorer.score_term(Ranker::TfIdf, "alpha", 2, 3, 5);
        let expected = (1.0 + 3f64.ln()) * (10.0f64 / 2.0).ln();
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn bm25_matches_the_documented_formula() {
        let scorer = Scorer::new(10, 4.0);
        let score = scorer.score_term(Ranker::Bm25, "alpha", 2, 3, 8);
        let idf = (((10.0 - 2.0 + 0.5) / (2.0 + 0.5)) + 1.0f64).ln();
        let norm = 1.0 - 0.75 + 0.75 * (8.0 / 4.0);
        let expected = idf * (3.0 * 2.5) / (3.0 + 1.5 * norm);
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn idf_is_cached_per_term_and_ranker() {
        let scorer = Scorer::new(10, 5.0);
        scorer.score_term(Ranker::Bm25, "alpha", 2, 1, 5);
        assert!(scorer.idf_cache.contains_key(&("alpha".to_string(), Ranker::Bm25)));
        assert!(!scorer.idf_cache.contains_key(&("alpha".to_string(), Ranker::TfIdf)));
    }
}
