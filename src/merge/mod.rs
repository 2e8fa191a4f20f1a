//! Index Merger: a streaming external k-way merge over all partial index
//! files, producing the final index, lexicon, and document index.
//!
//! The heap-based merge is the same shape as the corpus's
//! `MergingIterator` (`storage/lsm/merging_iterator.rs`): a
//! `BinaryHeap<Reverse<HeapEntry>>` keyed by the sort key (here, `term`),
//! refilled one record at a time from whichever source just supplied the
//! heap's minimum, with deterministic tie-breaking by source id. Unlike
//! the LSM merge this one never discards a key — every term, no matter
//! how many sources share it, is merged and emitted exactly once.

pub mod cursor;

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ahash::AHashMap;

use crate::error::Result;
use crate::merge::cursor::PartialCursor;
use crate::types::{DocumentIndexEntry, IndexRecord, LexiconEntry, Posting, PostingList, Term};

struct HeapEntry {
    term: Term,
    postings: PostingList,
    source_id: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term && self.source_id == other.source_id
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.term.cmp(&other.term).then(self.source_id.cmp(&other.source_id))
    }
}

pub struct MergeOutputs {
    pub index_path: PathBuf,
    pub lexicon_path: PathBuf,
    pub num_terms: u64,
}

/// Performs the k-way merge of `partial_files`, writing
/// `final_inverted_index.jsonl` and `lexicon.jsonl` into `index_dir`. Any
/// I/O failure aborts the merge and leaves the outputs absent — both
/// files are written to `.tmp` paths and renamed into place only once
/// complete. Document-index shards are merged separately via
/// `merge_document_index_shards`, since they carry no term ordering and
/// don't participate in the heap.
pub fn merge_partial_indexes(partial_files: &[PathBuf], index_dir: &Path) -> Result<MergeOutputs> {
    fs::create_dir_all(index_dir)?;
    let index_tmp = index_dir.join("final_inverted_index.jsonl.tmp");
    let index_final = index_dir.join("final_inverted_index.jsonl");
    let lexicon_tmp = index_dir.join("lexicon.jsonl.tmp");
    let lexicon_final = index_dir.join("lexicon.jsonl");

    let mut cursors: Vec<PartialCursor> = partial_files
        .iter()
        .map(|p| PartialCursor::open(p))
        .collect::<Result<_>>()?;

    let mut heap: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::new();
    for (source_id, cursor) in cursors.iter_mut().enumerate() {
        if let Some((term, postings)) = cursor.next()? {
            heap.push(Reverse(HeapEntry { term, postings, source_id }));
        }
    }

    let mut index_offset: u64 = 0;
    let mut num_terms: u64 = 0;
    {
        let mut index_out = BufWriter::new(File::create(&index_tmp)?);
        let mut lexicon_out = BufWriter::new(File::create(&lexicon_tmp)?);

        while let Some(Reverse(smallest)) = heap.pop() {
            let term = smallest.term;
            let mut merged: Vec<Posting> = smallest.postings;
            refill(&mut heap, &mut cursors, smallest.source_id)?;

            while let Some(Reverse(next)) = heap.peek() {
                if next.term != term {
                    break;
                }
                let Reverse(next) = heap.pop().unwrap();
                merged.extend(next.postings);
                refill(&mut heap, &mut cursors, next.source_id)?;
            }

            let postings = dedup_and_sort(merged);
            let df = postings.len() as u64;
            let cf: u64 = postings.iter().map(|p| p.tf as u64).sum();

            let record = IndexRecord::from_posting_list(term.clone(), postings);
            let line = serde_json::to_string(&record)?;
            writeln!(index_out, "{line}")?;
            let offset = index_offset;
            index_offset += line.len() as u64 + 1;

            let lexicon_entry = LexiconEntry { term, df, cf, offset };
            writeln!(lexicon_out, "{}", serde_json::to_string(&lexicon_entry)?)?;
            num_terms += 1;
        }

        index_out.flush()?;
        lexicon_out.flush()?;
    }

    fs::rename(&index_tmp, &index_final)?;
    fs::rename(&lexicon_tmp, &lexicon_final)?;

    Ok(MergeOutputs {
        index_path: index_final,
        lexicon_path: lexicon_final,
        num_terms,
    })
}

fn refill(
    heap: &mut BinaryHeap<Reverse<HeapEntry>>,
    cursors: &mut [PartialCursor],
    source_id: usize,
) -> Result<()> {
    if let Some((term, postings)) = cursors[source_id].next()? {
        heap.push(Reverse(HeapEntry { term, postings, source_id }));
    }
    Ok(())
}

/// Concatenates posting lists sharing a term, summing `tf` for any
/// doc_id that appears more than once (defensive: impossible under
/// disjoint doc_id partitioning by the reader, but handled per the
/// merge algorithm's safety requirement) and sorts ascending by doc_id.
fn dedup_and_sort(postings: Vec<Posting>) -> PostingList {
    let mut by_doc: AHashMap<String, u32> = AHashMap::new();
    let mut order: Vec<String> = Vec::new();
    for p in postings {
        match by_doc.get_mut(&p.doc_id) {
            Some(tf) => *tf += p.tf,
            None => {
                order.push(p.doc_id.clone());
                by_doc.insert(p.doc_id, p.tf);
            }
        }
    }
    let mut merged: Vec<Posting> = order
        .into_iter()
        .map(|doc_id| {
            let tf = by_doc[&doc_id];
            Posting { doc_id, tf }
        })
        .collect();
    merged.sort_unstable_by(|a, b| a.doc_id.cmp(&b.doc_id));
    merged
}

/// Concatenates the per-worker document-index shards (no key conflicts —
/// doc_id partitioning is disjoint) and sorts the result by doc_id for
/// binary-searchable lookup at query time.
pub fn merge_document_index_shards(shard_paths: &[PathBuf], index_dir: &Path) -> Result<PathBuf> {
    let mut entries: Vec<DocumentIndexEntry> = Vec::new();
    for path in shard_paths {
        if !path.exists() {
            continue;
        }
        let contents = fs::read_to_string(path)?;
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(line)?);
        }
    }
    entries.sort_unstable_by(|a, b| a.doc_id.cmp(&b.doc_id));

    let tmp = index_dir.join("document_index.jsonl.tmp");
    let final_path = index_dir.join("document_index.jsonl");
    {
        let mut out = BufWriter::new(File::create(&tmp)?);
        for entry in &entries {
            writeln!(out, "{}", serde_json::to_string(entry)?)?;
        }
        out.flush()?;
    }
    fs::rename(&tmp, &final_path)?;
    Ok(final_path)
}
