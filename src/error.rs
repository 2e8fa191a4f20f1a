//! Crate-wide error type.
//!
//! `MalformedRecord` and `MissingTerm` from the design notes are not
//! variants here — they are not errors. A malformed corpus line is
//! counted (see `IndexingStats::malformed_records`); a query term absent
//! from the lexicon just yields an empty candidate set.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("merge error: {0}")]
    Merge(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("memory budget exceeded after flush: {0}")]
    BudgetOverflow(String),

    #[error("corrupted partial index file {0}")]
    CorruptedPartialFile(PathBuf),

    #[error("worker {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },
}
