//! A cursor over one partial-index file, yielding `(term, posting_list)`
//! records in the term order the writer guaranteed.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::indexer::writer::parse_line;
use crate::types::{PostingList, Term};

pub struct PartialCursor {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl PartialCursor {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(PartialCursor {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
        })
    }

    /// Advances the cursor and returns the next record, or `None` at EOF.
    pub fn next(&mut self) -> Result<Option<(Term, PostingList)>> {
        match self.lines.next() {
            None => Ok(None),
            Some(line) => {
                let line = line?;
                let (term, postings) = parse_line(&line).map_err(|_| {
                    crate::error::IndexError::CorruptedPartialFile(self.path.clone())
                })?;
                Ok(Some((term, postings)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::writer::PartialIndexWriter;
    use crate::types::Posting;
    use tempfile::TempDir;

    #[test]
    fn yields_records_in_written_order() {
        let dir = TempDir::new().unwrap();
        let writer = PartialIndexWriter::new(dir.path()).unwrap();
        let records = vec![
            ("alpha".to_string(), vec![Posting { doc_id: "d1".into(), tf: 1 }]),
            ("beta".to_string(), vec![Posting { doc_id: "d1".into(), tf: 1 }]),
        ];
        let path = writer.write(0, 0, &records).unwrap();

        let mut cursor = PartialCursor::open(&path).unwrap();
        let (term, _) = cursor.next().unwrap().unwrap();
        assert_eq!(term, "alpha");
        let (term, _) = cursor.next().unwrap().unwrap();
        assert_eq!(term, "beta");
        assert!(cursor.next().unwrap().is_none());
    }
}
