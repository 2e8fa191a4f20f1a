//! The in-memory posting accumulator owned by one worker.
//!
//! Mirrors the corpus's `pending_posting_lists` aggregation in
//! `TextFTSIndex::batch_insert` (tokenize, aggregate per-term counts within
//! a document, then merge into the running per-term posting lists) but
//! tracks its own flush threshold instead of a fixed constant.

use ahash::AHashMap;

use crate::types::{DocId, Posting, PostingList, Term};

/// Per-posting-entry memory cost. A platform calibration, not a semantic
/// contract — re-derive on the target runtime if accuracy matters more
/// than simplicity. 112 bytes approximates a `(String doc_id, u32 tf)`
/// entry plus hash-map and `Vec` growth overhead; the overhead of unique
/// terms themselves is ignored since postings-per-term dominates (the
/// corpus observes roughly a 30x ratio).
pub(crate) const PER_ENTRY_BYTES: u64 = 112;

/// Accumulates postings for the documents assigned to one worker while
/// bounding memory via `should_flush`.
pub struct MemIndex {
    postings: AHashMap<Term, Vec<Posting>>,
    total_entries: u64,
}

impl MemIndex {
    pub fn new() -> Self {
        MemIndex {
            postings: AHashMap::new(),
            total_entries: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Scans `terms` once, aggregating per-term occurrence counts for this
    /// document, then appends one posting per distinct term.
    pub fn add_document(&mut self, doc_id: DocId, terms: &[Term]) {
        if terms.is_empty() {
            return;
        }
        let mut counts: AHashMap<&str, u32> = AHashMap::new();
        for term in terms {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }
        for (term, tf) in counts {
            self.postings
                .entry(term.to_string())
                .or_default()
                .push(Posting {
                    doc_id: doc_id.clone(),
                    tf,
                });
            self.total_entries += 1;
        }
    }

    /// Approximate resident memory in bytes, dominated by posting-entry count.
    pub fn memory_estimate(&self) -> u64 {
        self.total_entries * PER_ENTRY_BYTES
    }

    pub fn should_flush(&self, budget_bytes: u64) -> bool {
        self.memory_estimate() as f64 >= 0.8 * budget_bytes as f64
    }

    /// Drains the accumulator into an ordered sequence of `(term,
    /// posting_list)`, terms ascending lexicographically and each posting
    /// list ascending by `doc_id`. The indexer is empty after this call.
    pub fn drain_sorted(&mut self) -> Vec<(Term, PostingList)> {
        let mut drained: Vec<(Term, PostingList)> = std::mem::take(&mut self.postings)
            .into_iter()
            .collect();
        self.total_entries = 0;
        drained.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        for (_, postings) in drained.iter_mut() {
            postings.sort_unstable_by(|a, b| a.doc_id.cmp(&b.doc_id));
        }
        drained
    }
}

impl Default for MemIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_term_frequency_within_a_document() {
        let mut idx = MemIndex::new();
        idx.add_document(
            "d1".to_string(),
            &["alpha".to_string(), "beta".to_string(), "alpha".to_string()],
        );
        let drained = idx.drain_sorted();
        assert_eq!(drained.len(), 2);
        let (term, postings) = &drained[0];
        assert_eq!(term, "alpha");
        assert_eq!(postings, &vec![Posting { doc_id: "d1".into(), tf: 2 }]);
    }

    #[test]
    fn drain_sorts_terms_and_postings() {
        let mut idx = MemIndex::new();
        idx.add_document("d2".to_string(), &["zeta".to_string(), "alpha".to_string()]);
        idx.add_document("d1".to_string(), &["alpha".to_string()]);
        let drained = idx.drain_sorted();
        let terms: Vec<_> = drained.iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(terms, vec!["alpha", "zeta"]);
        let alpha_postings = &drained[0].1;
        assert_eq!(alpha_postings[0].doc_id, "d1");
        assert_eq!(alpha_postings[1].doc_id, "d2");
    }

    #[test]
    fn drain_empties_the_indexer() {
        let mut idx = MemIndex::new();
        idx.add_document("d1".to_string(), &["alpha".to_string()]);
        idx.drain_sorted();
        assert!(idx.is_empty());
        assert_eq!(idx.memory_estimate(), 0);
    }

    #[test]
    fn should_flush_once_entries_cross_eighty_percent_of_budget() {
        let mut idx = MemIndex::new();
        // budget of 10 entries' worth of bytes; flush threshold is 8 entries.
        let budget = 10 * PER_ENTRY_BYTES;
        for i in 0..7 {
            idx.add_document(format!("d{i}"), &["t".to_string()]);
            assert!(!idx.should_flush(budget), "flushed too early at entry {i}");
        }
        idx.add_document("d7".to_string(), &["t".to_string()]);
        assert!(idx.should_flush(budget));
    }
}
