//! Single-producer document reader.
//!
//! Streams `(doc_id, text)` records from the corpus and pushes batches
//! onto a bounded queue, providing back-pressure so the reader cannot race
//! ahead of the workers and blow the memory budget. Grounded in the
//! corpus's `start_file_reader_thread` pipeline stage, generalized from
//! one-file-per-document to one-line-per-document `.jsonl` records.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::error::Result;
use crate::types::CorpusRecord;

pub type Batch = Vec<(String, String)>;

/// Shared, thread-safe counter for corpus lines skipped due to missing
/// required fields (`MalformedRecord` — a counted, not fatal, condition).
#[derive(Debug, Default, Clone)]
pub struct MalformedCounter(Arc<AtomicU64>);

impl MalformedCounter {
    pub fn new() -> Self {
        MalformedCounter(Arc::new(AtomicU64::new(0)))
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Reads `corpus_path` line by line, batching `batch_size` documents at a
/// time and pushing them onto `sender`. Returns once the corpus is
/// exhausted or the channel is disconnected (all workers gone).
///
/// Termination is implicit: dropping `sender` at the end of this function
/// closes the channel, so every worker's blocking `recv()` returns `Err`
/// exactly once — behaviorally identical to pushing N explicit sentinels,
/// but idiomatic for `crossbeam_channel`.
pub fn run(
    corpus_path: &Path,
    batch_size: usize,
    sender: Sender<Batch>,
    malformed: MalformedCounter,
) -> Result<()> {
    let file = File::open(corpus_path)?;
    let reader = BufReader::new(file);

    let mut batch: Batch = Vec::with_capacity(batch_size);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<CorpusRecord>(&line) {
            Ok(record) => {
                batch.push((record.id, record.text));
                if batch.len() >= batch_size {
                    let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
                    if sender.send(full).is_err() {
                        return Ok(());
                    }
                }
            }
            Err(_) => malformed.increment(),
        }
    }
    if !batch.is_empty() {
        let _ = sender.send(batch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn batches_documents_and_counts_malformed_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id": "d1", "text": "alpha beta"}}"#).unwrap();
        writeln!(file, "{{not json}}").unwrap();
        writeln!(file, r#"{{"id": "d2", "text": "gamma"}}"#).unwrap();

        let (tx, rx) = crossbeam_channel::bounded(8);
        let malformed = MalformedCounter::new();
        run(file.path(), 10, tx, malformed.clone()).unwrap();

        let batches: Vec<Batch> = rx.into_iter().collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(malformed.get(), 1);
    }

    #[test]
    fn respects_batch_size() {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..5 {
            writeln!(file, r#"{{"id": "d{i}", "text": "x"}}"#).unwrap();
        }
        let (tx, rx) = crossbeam_channel::bounded(8);
        run(file.path(), 2, tx, MalformedCounter::new()).unwrap();
        let batches: Vec<Batch> = rx.into_iter().collect();
        assert_eq!(batches.iter().map(|b| b.len()).collect::<Vec<_>>(), vec![2, 2, 1]);
    }
}
