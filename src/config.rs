//! Validated configuration for the indexer and query pipelines.
//!
//! Construction validates before any filesystem access — a `ConfigError`
//! (here `IndexError::Config`) is reported and the process exits non-zero
//! before anything is opened or created on disk.

use std::path::PathBuf;

use crate::error::{IndexError, Result};

/// Default number of in-flight batches the reader may queue ahead of the
/// slowest worker. Chosen so queue occupancy × batch size × average
/// document size stays small relative to a single worker's memory share.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Default number of documents per batch handed to a worker.
pub const DEFAULT_BATCH_SIZE: usize = 32;

#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub memory_limit_mb: u64,
    pub corpus_path: PathBuf,
    pub index_dir: PathBuf,
    pub num_workers: usize,
    pub queue_capacity: usize,
    pub batch_size: usize,
}

impl IndexerConfig {
    pub fn new(memory_limit_mb: u64, corpus_path: PathBuf, index_dir: PathBuf) -> Result<Self> {
        Self::with_workers(
            memory_limit_mb,
            corpus_path,
            index_dir,
            default_worker_count(),
        )
    }

    pub fn with_workers(
        memory_limit_mb: u64,
        corpus_path: PathBuf,
        index_dir: PathBuf,
        num_workers: usize,
    ) -> Result<Self> {
        if memory_limit_mb == 0 {
            return Err(IndexError::Config(
                "memory_limit_mb must be a positive integer".into(),
            ));
        }
        if num_workers == 0 {
            return Err(IndexError::Config("num_workers must be at least 1".into()));
        }
        if corpus_path.as_os_str().is_empty() {
            return Err(IndexError::Config("corpus_path is required".into()));
        }
        if index_dir.as_os_str().is_empty() {
            return Err(IndexError::Config("index_dir is required".into()));
        }
        Ok(IndexerConfig {
            memory_limit_mb,
            corpus_path,
            index_dir,
            num_workers,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Memory budget allotted to a single worker's in-memory indexer, in bytes.
    pub fn per_worker_budget_bytes(&self) -> u64 {
        (self.memory_limit_mb * 1024 * 1024) / self.num_workers as u64
    }

    pub fn partial_dir(&self) -> PathBuf {
        self.index_dir.join(".partial")
    }
}

/// `index_file_path` names the final index file itself (spec.md §6,
/// `--index_file_path`/`-i`), not its containing directory — the lexicon,
/// document index, and stats files are located by `Processor::open` as
/// siblings of this path.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub index_file_path: PathBuf,
    pub queries_file_path: PathBuf,
    pub ranker: crate::types::Ranker,
    pub top_k: usize,
}

impl ProcessorConfig {
    pub fn new(
        index_file_path: PathBuf,
        queries_file_path: PathBuf,
        ranker: crate::types::Ranker,
    ) -> Result<Self> {
        Self::with_top_k(index_file_path, queries_file_path, ranker, 10)
    }

    pub fn with_top_k(
        index_file_path: PathBuf,
        queries_file_path: PathBuf,
        ranker: crate::types::Ranker,
        top_k: usize,
    ) -> Result<Self> {
        if index_file_path.as_os_str().is_empty() {
            return Err(IndexError::Config("index_file_path is required".into()));
        }
        if queries_file_path.as_os_str().is_empty() {
            return Err(IndexError::Config("queries_file_path is required".into()));
        }
        Ok(ProcessorConfig {
            index_file_path,
            queries_file_path,
            ranker,
            top_k,
        })
    }
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
