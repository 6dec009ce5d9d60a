//! Per-term postings storage and boolean-OR merging.
//!
//! Each distinct term owns one `{termFileId}.pos` file of tab-separated
//! `doc_id \t term_freq` lines. Reading a term produces raw [`Posting`]
//! records; the collector scores them and merges lists from several terms
//! with [`join_or`]. Postings are query-scoped: created on read, scored
//! once, merged, then discarded when the query completes.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{AmberError, Result};
use crate::term::Term;

/// Postings file extension.
pub const POSTINGS_EXT: &str = "pos";

/// One `(document, term-frequency)` record for one term.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    /// The document containing the term.
    pub doc_id: u64,
    /// The field the term was indexed under.
    pub field: String,
    /// How often the term occurs in the document.
    pub term_freq: u64,
    /// Relevance score, filled in by the scorer; zero until then.
    pub score: f64,
}

impl Posting {
    /// Create a new unscored posting.
    pub fn new<F: Into<String>>(doc_id: u64, field: F, term_freq: u64) -> Self {
        Posting {
            doc_id,
            field: field.into(),
            term_freq,
            score: 0.0,
        }
    }
}

/// Boolean-OR combination of postings lists.
///
/// The result covers every document appearing in either input, and each
/// posting keeps the frequency and score of its own source term: a document
/// matched by two terms appears once per term until the caller aggregates.
/// `None` is the OR identity, so lists fold together starting from nothing.
pub fn join_or(acc: Option<Vec<Posting>>, list: Vec<Posting>) -> Vec<Posting> {
    match acc {
        None => list,
        Some(mut merged) => {
            merged.extend(list);
            merged
        }
    }
}

/// The path of the postings file for a term.
pub fn postings_path(dir: &Path, term: &Term) -> PathBuf {
    dir.join(format!("{}.{POSTINGS_EXT}", term.postings_file_id()))
}

/// Writes one term's postings file.
#[derive(Debug)]
pub struct PostingsWriter {
    dir: PathBuf,
}

impl PostingsWriter {
    /// Create a writer placing files under `dir`.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        PostingsWriter { dir: dir.into() }
    }

    /// Write the `(doc_id, term_freq)` records for `term`, replacing any
    /// existing file. Returns the written path.
    pub fn write(&self, term: &Term, postings: &[(u64, u64)]) -> Result<PathBuf> {
        let path = postings_path(&self.dir, term);
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        for (doc_id, term_freq) in postings {
            writeln!(writer, "{doc_id}\t{term_freq}")?;
        }
        writer.flush()?;
        Ok(path)
    }
}

/// Reads one term's postings file sequentially.
#[derive(Debug)]
pub struct PostingsReader {
    reader: BufReader<File>,
}

impl PostingsReader {
    /// Open a postings file. A missing file is an I/O error: a term resolved
    /// from the dictionary must have postings, so absence here is corruption
    /// of the index, not an empty result.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(PostingsReader {
            reader: BufReader::new(file),
        })
    }

    /// Read every posting for `term`.
    pub fn read(mut self, term: &Term) -> Result<Vec<Posting>> {
        let mut postings = Vec::new();
        let mut line = String::new();

        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                break;
            }
            let record = line.trim_end_matches('\n');
            if record.is_empty() {
                continue;
            }

            let (doc_id, term_freq) = record
                .split_once('\t')
                .ok_or_else(|| AmberError::decode(format!("bad postings record: {record:?}")))?;
            let doc_id = doc_id
                .parse::<u64>()
                .map_err(|_| AmberError::decode(format!("bad doc id in postings: {record:?}")))?;
            let term_freq = term_freq.parse::<u64>().map_err(|_| {
                AmberError::decode(format!("bad term frequency in postings: {record:?}"))
            })?;

            postings.push(Posting::new(doc_id, term.field.clone(), term_freq));
        }

        Ok(postings)
    }
}
