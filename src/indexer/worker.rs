//! Worker: consumes batches from the queue, tokenizes, feeds the in-memory
//! indexer, flushes on threshold, and emits local stats on shutdown.
//!
//! One OS thread per worker (spec §9 permits threads in place of processes
//! when the runtime doesn't serialize CPU-bound work — Rust's don't). Each
//! worker owns its `MemIndex`, its `PartialIndexWriter`, and its own
//! document-index shard; no cross-worker synchronization happens outside
//! the shared input queue.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::Receiver;

use crate::error::Result;
use crate::indexer::docindex::DocIndexShardWriter;
use crate::indexer::memtable::MemIndex;
use crate::indexer::reader::Batch;
use crate::indexer::stats::{WorkerResult, WorkerStats};
use crate::indexer::writer::PartialIndexWriter;
use crate::tokenizer::Tokenizer;
use crate::types::DocumentIndexEntry;

/// After every document is added, `should_flush` is consulted. On true the
/// drained, sorted postings are written synchronously — there is no
/// soft-flush, flushing never races ahead of the worker's own progress.
pub fn run(
    worker_id: usize,
    receiver: Receiver<Batch>,
    tokenizer: &dyn Tokenizer,
    budget_bytes: u64,
    partial_dir: &Path,
    doc_index_dir: &Path,
) -> Result<WorkerResult> {
    let writer = PartialIndexWriter::new(partial_dir)?;
    let mut doc_index = DocIndexShardWriter::create(doc_index_dir, worker_id)?;
    let mut mem_index = MemIndex::new();
    let mut stats = WorkerStats::default();
    let seq_no = AtomicUsize::new(0);
    let mut partial_files = Vec::new();

    for batch in receiver.iter() {
        for (doc_id, text) in batch {
            let terms = tokenizer.tokenize(&text);
            let token_count = terms.len() as u64;
            let char_count = text.chars().count() as u64;

            mem_index.add_document(doc_id.clone(), &terms);
            stats.record_document(token_count);
            doc_index.write_entry(&DocumentIndexEntry {
                doc_id,
                tokens: token_count,
                chars: char_count,
            })?;

            if mem_index.should_flush(budget_bytes) {
                flush(&writer, worker_id, &seq_no, &mut mem_index, &mut partial_files)?;
            }
        }
    }

    if !mem_index.is_empty() {
        flush(&writer, worker_id, &seq_no, &mut mem_index, &mut partial_files)?;
    }

    let doc_index_file = doc_index.finish()?;
    Ok(WorkerResult {
        worker_id,
        stats,
        partial_files,
        doc_index_file,
    })
}

fn flush(
    writer: &PartialIndexWriter,
    worker_id: usize,
    seq_no: &AtomicUsize,
    mem_index: &mut MemIndex,
    partial_files: &mut Vec<std::path::PathBuf>,
) -> Result<()> {
    let records = mem_index.drain_sorted();
    let seq = seq_no.fetch_add(1, Ordering::Relaxed);
    let path = writer.write(worker_id, seq, &records)?;
    partial_files.push(path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::WhitespaceTokenizer;
    use tempfile::TempDir;

    #[test]
    fn processes_batches_and_flushes_remainder() {
        let dir = TempDir::new().unwrap();
        let partial_dir = dir.path().join("partial");
        let doc_dir = dir.path().join("docidx");
        let tokenizer = WhitespaceTokenizer::default();

        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(vec![
            ("d1".to_string(), "alpha beta".to_string()),
            ("d2".to_string(), "alpha gamma".to_string()),
        ])
        .unwrap();
        drop(tx);

        let result = run(0, rx, &tokenizer, 1_000_000, &partial_dir, &doc_dir).unwrap();
        assert_eq!(result.stats.docs_seen, 2);
        assert_eq!(result.stats.tokens_seen, 4);
        assert_eq!(result.partial_files.len(), 1);
        assert!(result.doc_index_file.exists());
    }

    #[test]
    fn flushes_mid_stream_when_budget_is_tiny() {
        let dir = TempDir::new().unwrap();
        let partial_dir = dir.path().join("partial");
        let doc_dir = dir.path().join("docidx");
        let tokenizer = WhitespaceTokenizer::default();

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut batch = Vec::new();
        for i in 0..20 {
            batch.push((format!("d{i}"), "alpha".to_string()));
        }
        tx.send(batch).unwrap();
        drop(tx);

        // tiny budget forces several flushes well before the stream ends.
        let result = run(0, rx, &tokenizer, 200, &partial_dir, &doc_dir).unwrap();
        assert!(result.partial_files.len() > 1);
        assert_eq!(result.stats.docs_seen, 20);
    }
}
