//! The query engine: scans, resolves, scores, reduces, ranks.
//!
//! One [`Collector`] executes queries against one index directory and one
//! segment generation. A query runs in three steps:
//!
//! 1. **Scan** — every node of the query tree resolves its terms against the
//!    field's dictionary partitions, one parallel task per node. Tasks share
//!    nothing mutable: each writes only its own node's `terms` and owns the
//!    file handles it opens, released when the task returns.
//! 2. **Resolve postings** — sequentially, depth-first: each resolved term's
//!    postings are read, scored, and cached, so a term referenced by several
//!    nodes touches storage exactly once per query. The cache is scoped to
//!    the collect call; concurrent queries use separate collectors.
//! 3. **Reduce and rank** — the tree folds bottom-up via
//!    [`QueryContext::reduce`] and the root's scores are sorted descending.
//!
//! Absence is not failure: a field with no dictionary resolves to zero
//! terms. A missing or corrupt postings file for a resolved term aborts the
//! query.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use ahash::AHashMap;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::{AmberError, Result};
use crate::postings::{Posting, PostingsReader, join_or, postings_path};
use crate::query::{DocumentScore, QueryContext};
use crate::scoring::ScoringScheme;
use crate::segment::SegmentInfo;
use crate::term::{Term, dictionary_id};
use crate::trie::codec::PARTITION_EXT;
use crate::trie::reader::PartitionReader;

/// Executes queries against one index directory.
pub struct Collector {
    directory: PathBuf,
    segment: SegmentInfo,
    scheme: Box<dyn ScoringScheme>,
    thread_pool: ThreadPool,
    /// Term -> scored postings, cleared at the start of every collect call.
    term_cache: AHashMap<Term, Vec<Posting>>,
}

impl Collector {
    /// Create a collector over `directory` with an explicit segment
    /// descriptor.
    pub fn new<P: Into<PathBuf>>(
        directory: P,
        segment: SegmentInfo,
        scheme: Box<dyn ScoringScheme>,
    ) -> Result<Self> {
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(num_cpus::get())
            .thread_name(|i| format!("amber-scan-{i}"))
            .build()
            .map_err(|e| AmberError::internal(format!("failed to create thread pool: {e}")))?;

        Ok(Collector {
            directory: directory.into(),
            segment,
            scheme,
            thread_pool,
            term_cache: AHashMap::new(),
        })
    }

    /// Create a collector over `directory`, loading the latest segment
    /// descriptor found there.
    pub fn open<P: Into<PathBuf>>(directory: P, scheme: Box<dyn ScoringScheme>) -> Result<Self> {
        let directory = directory.into();
        let segment = SegmentInfo::load_latest(&directory)?;
        Collector::new(directory, segment, scheme)
    }

    /// The segment descriptor this collector scores against.
    pub fn segment(&self) -> &SegmentInfo {
        &self.segment
    }

    /// Execute the query and return its documents ranked by descending
    /// score. The caller keeps ownership of the tree; its `terms` and
    /// `postings` fields hold the resolution results afterwards.
    pub fn collect(&mut self, query: &mut QueryContext) -> Result<Vec<DocumentScore>> {
        if query.field.is_empty() && query.value.is_empty() {
            return Err(AmberError::query("empty query context"));
        }

        self.term_cache.clear();

        let start = Instant::now();
        self.thread_pool.install(|| self.scan(query))?;
        debug!(elapsed = ?start.elapsed(), nodes = query.node_count(), "scan complete");

        let start = Instant::now();
        self.resolve_postings(query)?;
        debug!(
            elapsed = ?start.elapsed(),
            distinct_terms = self.term_cache.len(),
            "postings resolved"
        );

        let mut scores = query.reduce();
        scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        Ok(scores)
    }

    /// Resolve terms for this node and, in parallel, for its children. The
    /// split borrow keeps each task's write confined to its own node.
    fn scan(&self, node: &mut QueryContext) -> Result<()> {
        let QueryContext {
            field,
            value,
            prefix,
            fuzzy,
            edits,
            terms,
            children,
            ..
        } = node;

        let (own, rest) = rayon::join(
            || self.scan_node(field, value, *prefix, *fuzzy, *edits),
            || children.par_iter_mut().try_for_each(|child| self.scan(child)),
        );

        *terms = own?;
        rest
    }

    /// Run the term matcher for one node against every partition of its
    /// field's dictionary. Results are the union across partitions, which
    /// are disjoint by construction.
    fn scan_node(
        &self,
        field: &str,
        value: &str,
        prefix: bool,
        fuzzy: bool,
        edits: usize,
    ) -> Result<Vec<Term>> {
        let mut terms = Vec::new();

        for path in self.partitions(field)? {
            let start = Instant::now();
            let reader = PartitionReader::open(&path)?;

            if fuzzy {
                for word in reader.near(value, edits)? {
                    terms.push(Term::new(field, word));
                }
            } else if prefix {
                for word in reader.starts_with(value)? {
                    terms.push(Term::new(field, word));
                }
            } else if reader.has_word(value)? {
                terms.push(Term::new(field, value));
            }

            debug!(partition = %path.display(), elapsed = ?start.elapsed(), "scanned partition");
        }

        Ok(terms)
    }

    /// The field's partition files, in lexicographic order. A field with no
    /// partitions (or no index directory at all) is an empty dictionary.
    fn partitions(&self, field: &str) -> Result<Vec<PathBuf>> {
        let dict_id = dictionary_id(field);
        let suffix = format!(".{PARTITION_EXT}");

        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(&dict_id) && name.ends_with(&suffix) {
                paths.push(entry.path());
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Depth-first sequential postings resolution through the term cache.
    fn resolve_postings(&mut self, node: &mut QueryContext) -> Result<()> {
        let mut merged: Option<Vec<Posting>> = None;
        for term in &node.terms {
            let scored = self.scored_postings(term)?;
            merged = Some(join_or(merged, scored));
        }
        node.postings = merged.unwrap_or_default();

        for child in &mut node.children {
            self.resolve_postings(child)?;
        }
        Ok(())
    }

    /// One term's scored postings, read from storage at most once per query.
    fn scored_postings(&mut self, term: &Term) -> Result<Vec<Posting>> {
        if let Some(cached) = self.term_cache.get(term) {
            return Ok(cached.clone());
        }

        let path = postings_path(&self.directory, term);
        let raw = PostingsReader::open(&path)?.read(term)?;
        let scored = self.score(term, raw);
        self.term_cache.insert(term.clone(), scored.clone());
        Ok(scored)
    }

    /// Score raw postings for one term, dropping obsolete documents before
    /// they can reach the ranked result.
    fn score(&self, term: &Term, postings: Vec<Posting>) -> Vec<Posting> {
        let docs_with_term = postings.len() as u64;
        let scorer = self
            .scheme
            .create_scorer(self.segment.doc_count(&term.field), docs_with_term);

        postings
            .into_iter()
            .filter(|posting| !self.segment.is_obsolete(posting.doc_id))
            .map(|mut posting| {
                posting.score = scorer.score(posting.term_freq);
                posting
            })
            .collect()
    }
}
