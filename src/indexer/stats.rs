//! Per-worker and aggregate indexing statistics.

use crate::types::GlobalStats;

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerStats {
    pub docs_seen: u64,
    pub tokens_seen: u64,
}

impl WorkerStats {
    pub fn record_document(&mut self, token_count: u64) {
        self.docs_seen += 1;
        self.tokens_seen += token_count;
    }

    pub fn merge(&mut self, other: WorkerStats) {
        self.docs_seen += other.docs_seen;
        self.tokens_seen += other.tokens_seen;
    }
}

/// Result returned by a single worker thread once its input channel closes.
#[derive(Debug)]
pub struct WorkerResult {
    pub worker_id: usize,
    pub stats: WorkerStats,
    pub partial_files: Vec<std::path::PathBuf>,
    pub doc_index_file: std::path::PathBuf,
}

pub fn finalize_global_stats(total: WorkerStats, malformed_records: u64) -> (GlobalStats, u64) {
    let avg_doc_length = if total.docs_seen > 0 {
        total.tokens_seen as f64 / total.docs_seen as f64
    } else {
        0.0
    };
    (
        GlobalStats {
            num_documents: total.docs_seen,
            num_tokens: total.tokens_seen,
            avg_doc_length,
        },
        malformed_records,
    )
}
