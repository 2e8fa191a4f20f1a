//! Wires the reader, the worker pool, and the merger into one indexing
//! run. Grounded in the corpus's `run_pipeline` (the hedon/fingertips
//! multi-stage pipeline), generalized from a fixed five-stage `mpsc` chain
//! into an N-worker fan-out over one bounded `crossbeam_channel`.

use std::path::PathBuf;
use std::thread;

use tracing::info;

use crate::config::IndexerConfig;
use crate::error::Result;
use crate::indexer::reader::{self, MalformedCounter};
use crate::indexer::stats::{finalize_global_stats, WorkerStats};
use crate::indexer::worker;
use crate::merge;
use crate::tokenizer::Tokenizer;
use crate::types::GlobalStats;

#[derive(Debug)]
pub struct IndexingReport {
    pub stats: GlobalStats,
    pub malformed_records: u64,
    pub num_terms: u64,
}

/// Runs the full indexing pipeline against `config`, writing
/// `final_inverted_index.jsonl`, `lexicon.jsonl`, `document_index.jsonl`,
/// and `stats.json` into `config.index_dir`.
pub fn run_indexing(config: &IndexerConfig, tokenizer: &dyn Tokenizer) -> Result<IndexingReport> {
    std::fs::create_dir_all(&config.index_dir)?;
    let partial_dir = config.partial_dir();
    let doc_index_dir = partial_dir.join("docidx");
    let budget_bytes = config.per_worker_budget_bytes();

    let (sender, receiver) = crossbeam_channel::bounded(config.queue_capacity);
    let malformed = MalformedCounter::new();

    let mut total_stats = WorkerStats::default();
    let mut all_partial_files: Vec<PathBuf> = Vec::new();
    let mut all_doc_index_files: Vec<PathBuf> = Vec::new();

    // `thread::scope` lets every worker borrow `tokenizer` directly
    // instead of requiring `Arc<dyn Tokenizer>` — all scoped threads are
    // joined before the closure returns, so the borrow is sound.
    thread::scope(|scope| -> Result<()> {
        let reader_handle = {
            let corpus_path = config.corpus_path.clone();
            let batch_size = config.batch_size;
            let malformed = malformed.clone();
            scope.spawn(move || reader::run(&corpus_path, batch_size, sender, malformed))
        };

        let worker_handles: Vec<_> = (0..config.num_workers)
            .map(|worker_id| {
                let receiver = receiver.clone();
                let partial_dir = partial_dir.clone();
                let doc_index_dir = doc_index_dir.clone();
                scope.spawn(move || {
                    worker::run(worker_id, receiver, tokenizer, budget_bytes, &partial_dir, &doc_index_dir)
                })
            })
            .collect();

        reader_handle
            .join()
            .map_err(|_| crate::error::IndexError::WorkerPanicked { worker_id: usize::MAX })??;

        for handle in worker_handles {
            let result = handle
                .join()
                .map_err(|_| crate::error::IndexError::WorkerPanicked { worker_id: 0 })??;
            info!(worker_id = result.worker_id, docs = result.stats.docs_seen, "worker finished");
            total_stats.merge(result.stats);
            all_partial_files.extend(result.partial_files);
            all_doc_index_files.push(result.doc_index_file);
        }
        Ok(())
    })?;

    let merge_outputs = merge::merge_partial_indexes(&all_partial_files, &config.index_dir)?;
    merge::merge_document_index_shards(&all_doc_index_files, &config.index_dir)?;

    let (global_stats, malformed_records) = finalize_global_stats(total_stats, malformed.get());
    std::fs::write(
        config.index_dir.join("stats.json"),
        serde_json::to_string(&global_stats)?,
    )?;

    info!(
        num_documents = global_stats.num_documents,
        num_terms = merge_outputs.num_terms,
        malformed_records,
        "indexing run complete"
    );

    Ok(IndexingReport {
        stats: global_stats,
        malformed_records,
        num_terms: merge_outputs.num_terms,
    })
}
