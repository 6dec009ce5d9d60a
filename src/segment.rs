//! Segment descriptors: per-generation corpus statistics and document state.
//!
//! Each index generation writes a `{version}.ix` JSON descriptor carrying
//! the per-field document counts the scorer needs and a per-document
//! content-hash table. A document superseded by a later write is marked
//! obsolete in the table rather than removed from the postings files; the
//! collector skips it at scoring time, a logical, lazy delete.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AmberError, Result};

/// Segment descriptor file extension.
pub const SEGMENT_EXT: &str = "ix";

/// Content hash and liveness of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocHash {
    /// Hash of the document's content when it was indexed.
    pub hash: u64,
    /// True if a later write superseded this document.
    pub obsolete: bool,
}

impl DocHash {
    /// Create a live document hash.
    pub fn new(hash: u64) -> Self {
        DocHash {
            hash,
            obsolete: false,
        }
    }
}

/// One index generation's descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SegmentInfo {
    /// The generation number.
    pub version: u64,
    /// Per-field count of documents carrying that field.
    doc_count: HashMap<String, u64>,
    /// Per-document content hashes.
    doc_hashes: HashMap<u64, DocHash>,
}

impl SegmentInfo {
    /// Create an empty descriptor for a generation.
    pub fn new(version: u64) -> Self {
        SegmentInfo {
            version,
            doc_count: HashMap::new(),
            doc_hashes: HashMap::new(),
        }
    }

    /// Number of documents carrying `field`; zero for unknown fields.
    pub fn doc_count(&self, field: &str) -> u64 {
        self.doc_count.get(field).copied().unwrap_or(0)
    }

    /// Set the document count for a field.
    pub fn set_doc_count<F: Into<String>>(&mut self, field: F, count: u64) {
        self.doc_count.insert(field.into(), count);
    }

    /// Record a document's content hash.
    pub fn insert_doc_hash(&mut self, doc_id: u64, hash: DocHash) {
        self.doc_hashes.insert(doc_id, hash);
    }

    /// Mark a document obsolete. An unknown document gets a zero-hash entry.
    pub fn mark_obsolete(&mut self, doc_id: u64) {
        self.doc_hashes
            .entry(doc_id)
            .or_insert(DocHash {
                hash: 0,
                obsolete: false,
            })
            .obsolete = true;
    }

    /// True if the document was superseded by a later write.
    pub fn is_obsolete(&self, doc_id: u64) -> bool {
        self.doc_hashes
            .get(&doc_id)
            .map(|h| h.obsolete)
            .unwrap_or(false)
    }

    /// The stored content hash of a document, if known.
    pub fn doc_hash(&self, doc_id: u64) -> Option<DocHash> {
        self.doc_hashes.get(&doc_id).copied()
    }

    /// Write the descriptor to `{version}.ix` under `dir`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.{SEGMENT_EXT}", self.version));
        let file = File::create(&path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(path)
    }

    /// Load the descriptor for one generation.
    pub fn load(dir: &Path, version: u64) -> Result<Self> {
        let path = dir.join(format!("{version}.{SEGMENT_EXT}"));
        let file = File::open(&path)?;
        let info = serde_json::from_reader(BufReader::new(file))?;
        Ok(info)
    }

    /// Load the latest generation's descriptor under `dir`.
    pub fn load_latest(dir: &Path) -> Result<Self> {
        let mut latest: Option<u64> = None;
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(&format!(".{SEGMENT_EXT}")) else {
                continue;
            };
            if let Ok(version) = stem.parse::<u64>() {
                latest = Some(latest.map_or(version, |v: u64| v.max(version)));
            }
        }

        match latest {
            Some(version) => Self::load(dir, version),
            None => Err(AmberError::index(format!(
                "no segment descriptor under {}",
                dir.display()
            ))),
        }
    }
}
