//! Persists a drained in-memory index as one immutable partial-index file.
//!
//! Format: one record per line, `term\t<json posting list>`, terms in
//! strict ascending order (guaranteed by the caller's `drain_sorted`). No
//! global header; the file is opaque to anyone but the merger. Written to
//! a `.tmp` path and renamed into place, matching the corpus's
//! write-then-rename persistence idiom (`TextFTSIndex::save_metadata`,
//! `ChunkedDictionary::flush`).

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::{PostingList, Term};

pub struct PartialIndexWriter {
    dir: PathBuf,
}

impl PartialIndexWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(PartialIndexWriter { dir })
    }

    /// Writes `records` (already term-sorted by the caller) to a new
    /// partial-index file and returns its final path. Atomic at the file
    /// granularity: either the whole file is present and complete on
    /// disk, or (on crash before rename) absent.
    pub fn write(
        &self,
        worker_id: usize,
        seq_no: usize,
        records: &[(Term, PostingList)],
    ) -> Result<PathBuf> {
        let final_path = self.dir.join(format!("part-{worker_id:04}-{seq_no:06}.idx"));
        let tmp_path = self.dir.join(format!("part-{worker_id:04}-{seq_no:06}.idx.tmp"));

        {
            let file = File::create(&tmp_path)?;
            let mut out = BufWriter::new(file);
            for (term, postings) in records {
                let encoded: Vec<(String, u32)> =
                    postings.iter().map(|p| (p.doc_id.clone(), p.tf)).collect();
                let json = serde_json::to_string(&encoded)?;
                writeln!(out, "{term}\t{json}")?;
            }
            out.flush()?;
        }
        fs::rename(&tmp_path, &final_path)?;
        Ok(final_path)
    }
}

/// Parses one line of a partial-index file into `(term, posting_list)`.
pub fn parse_line(line: &str) -> Result<(Term, PostingList)> {
    let (term, json) = line.split_once('\t').ok_or_else(|| {
        crate::error::IndexError::Merge(format!("malformed partial-index line: {line:?}"))
    })?;
    let encoded: Vec<(String, u32)> = serde_json::from_str(json)?;
    let postings = encoded
        .into_iter()
        .map(|(doc_id, tf)| crate::types::Posting { doc_id, tf })
        .collect();
    Ok((term.to_string(), postings))
}

pub fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().map(|e| e == "idx").unwrap_or(false))
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Posting;
    use tempfile::TempDir;

    #[test]
    fn writes_and_parses_round_trip() {
        let dir = TempDir::new().unwrap();
        let writer = PartialIndexWriter::new(dir.path()).unwrap();
        let records = vec![
            (
                "alpha".to_string(),
                vec![Posting { doc_id: "d1".into(), tf: 2 }],
            ),
            (
                "beta".to_string(),
                vec![Posting { doc_id: "d1".into(), tf: 1 }],
            ),
        ];
        let path = writer.write(0, 0, &records).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("idx.tmp").exists());

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let (term, postings) = parse_line(lines[0]).unwrap();
        assert_eq!(term, "alpha");
        assert_eq!(postings[0].tf, 2);
    }

    #[test]
    fn read_dir_sorted_orders_by_filename() {
        let dir = TempDir::new().unwrap();
        let writer = PartialIndexWriter::new(dir.path()).unwrap();
        writer.write(1, 0, &[]).unwrap();
        writer.write(0, 0, &[]).unwrap();
        let files = read_dir_sorted(dir.path()).unwrap();
        assert!(files[0].to_string_lossy().contains("part-0000"));
        assert!(files[1].to_string_lossy().contains("part-0001"));
    }
}
