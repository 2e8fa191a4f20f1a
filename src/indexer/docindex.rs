//! Per-worker document-index shard, written as JSON lines and concatenated
//! (then sorted by `doc_id`) by the merger — no key conflicts are possible
//! since the reader partitions `doc_id`s disjointly across workers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::DocumentIndexEntry;

pub struct DocIndexShardWriter {
    out: BufWriter<File>,
    path: PathBuf,
}

impl DocIndexShardWriter {
    pub fn create(dir: &Path, worker_id: usize) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("docidx-{worker_id:04}.jsonl"));
        let file = File::create(&path)?;
        Ok(DocIndexShardWriter {
            out: BufWriter::new(file),
            path,
        })
    }

    pub fn write_entry(&mut self, entry: &DocumentIndexEntry) -> Result<()> {
        let json = serde_json::to_string(entry)?;
        writeln!(self.out, "{json}")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        self.out.flush()?;
        Ok(self.path)
    }
}
