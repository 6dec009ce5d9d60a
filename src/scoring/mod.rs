//! Pluggable relevance scoring.
//!
//! A [`ScoringScheme`] is chosen when the collector is built. For each term
//! it manufactures a [`Scorer`] from corpus statistics (documents carrying
//! the field, documents carrying the term); the scorer then maps each
//! document's term frequency to a score. Rarer terms and higher in-document
//! frequency both push the score up under the default scheme, but the
//! formula is a strategy, not a fixed part of the engine.

use std::fmt::Debug;

/// A per-term scorer produced by a [`ScoringScheme`].
pub trait Scorer: Send {
    /// Score one document given the term's frequency in it.
    fn score(&self, term_freq: u64) -> f64;
}

/// Factory for per-term scorers.
pub trait ScoringScheme: Send + Sync + Debug {
    /// Create a scorer for one term.
    ///
    /// `total_docs_with_field` is the number of indexed documents carrying
    /// the queried field; `docs_with_term` the number carrying this term.
    fn create_scorer(&self, total_docs_with_field: u64, docs_with_term: u64) -> Box<dyn Scorer>;

    /// Get the name of this scheme.
    fn name(&self) -> &'static str;
}

/// IDF-weighted term-frequency scoring, the default scheme.
#[derive(Debug, Clone, Default)]
pub struct TfIdfScheme;

impl TfIdfScheme {
    /// Create a new tf-idf scheme.
    pub fn new() -> Self {
        TfIdfScheme
    }
}

impl ScoringScheme for TfIdfScheme {
    fn create_scorer(&self, total_docs_with_field: u64, docs_with_term: u64) -> Box<dyn Scorer> {
        let n = total_docs_with_field as f64;
        let df = docs_with_term as f64;
        // idf = ln(1 + (N - df + 0.5) / (df + 0.5))
        let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
        Box::new(TfIdfScorer { idf: idf.max(0.0) })
    }

    fn name(&self) -> &'static str {
        "TfIdf"
    }
}

/// Scorer produced by [`TfIdfScheme`].
#[derive(Debug, Clone)]
struct TfIdfScorer {
    idf: f64,
}

impl Scorer for TfIdfScorer {
    fn score(&self, term_freq: u64) -> f64 {
        if term_freq == 0 {
            return 0.0;
        }
        // Sublinear term frequency: 1 + ln(tf).
        self.idf * (1.0 + (term_freq as f64).ln())
    }
}

/// A scheme whose scorers always return the same score; useful when only the
/// matched document set matters.
#[derive(Debug, Clone)]
pub struct ConstantScheme {
    score: f64,
}

impl ConstantScheme {
    /// Create a new constant scheme.
    pub fn new(score: f64) -> Self {
        ConstantScheme { score }
    }
}

impl ScoringScheme for ConstantScheme {
    fn create_scorer(&self, _total_docs_with_field: u64, _docs_with_term: u64) -> Box<dyn Scorer> {
        Box::new(ConstantScorer { score: self.score })
    }

    fn name(&self) -> &'static str {
        "Constant"
    }
}

struct ConstantScorer {
    score: f64,
}

impl Scorer for ConstantScorer {
    fn score(&self, _term_freq: u64) -> f64 {
        self.score
    }
}
