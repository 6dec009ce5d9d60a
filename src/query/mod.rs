//! Query contexts: the (possibly nested) clause tree a query executes as.
//!
//! Each node names a field, a value, and a match mode (exact, prefix, or
//! fuzzy with an edit budget). The collector fills in the node's resolved
//! terms and postings; [`QueryContext::reduce`] then folds the tree bottom-up
//! into one set of document scores, combining each child with its parent
//! under the child's own boolean policy.

pub mod parser;

use ahash::AHashMap;

use crate::postings::Posting;
use crate::term::Term;

/// How a clause combines with the result accumulated so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combine {
    /// Union: documents matched by either side, scores summed where both.
    #[default]
    Or,
    /// Intersection: only documents matched by both sides, scores summed.
    And,
}

/// A ranked document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentScore {
    /// The matched document.
    pub doc_id: u64,
    /// Its accumulated relevance score.
    pub score: f64,
}

/// One node in the query tree.
///
/// Owned by the caller for the duration of one query; the collector writes
/// `terms` during its scan step and `postings` during postings resolution.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    /// The queried field.
    pub field: String,
    /// The query value: a literal, a prefix, or a fuzzy pattern.
    pub value: String,
    /// Expand the value to all completions.
    pub prefix: bool,
    /// Expand the value to all words within the edit budget.
    pub fuzzy: bool,
    /// Edit-distance budget for fuzzy matching.
    pub edits: usize,
    /// How this clause combines with its parent.
    pub combine: Combine,
    /// Terms resolved by the scan step.
    pub terms: Vec<Term>,
    /// Scored postings resolved for this node's terms.
    pub postings: Vec<Posting>,
    /// Nested clauses.
    pub children: Vec<QueryContext>,
}

impl QueryContext {
    /// Create an exact-match clause.
    pub fn new<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        QueryContext {
            field: field.into(),
            value: value.into(),
            ..QueryContext::default()
        }
    }

    /// Turn this clause into a prefix match.
    pub fn with_prefix(mut self) -> Self {
        self.prefix = true;
        self
    }

    /// Turn this clause into a fuzzy match with the given edit budget.
    pub fn with_fuzzy(mut self, edits: usize) -> Self {
        self.fuzzy = true;
        self.edits = edits;
        self
    }

    /// Set how this clause combines with its parent.
    pub fn with_combine(mut self, combine: Combine) -> Self {
        self.combine = combine;
        self
    }

    /// Attach a nested clause.
    pub fn with_child(mut self, child: QueryContext) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this tree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Fold the tree bottom-up into document scores.
    ///
    /// The node's own postings are aggregated per document first (a document
    /// matched by several of the node's terms gets the sum of their scores),
    /// then each child's reduced result is combined in order under the
    /// child's [`Combine`] policy. The output order is unspecified; ranking
    /// happens at the collector.
    pub fn reduce(&self) -> Vec<DocumentScore> {
        let mut scores: AHashMap<u64, f64> = AHashMap::new();
        for posting in &self.postings {
            *scores.entry(posting.doc_id).or_insert(0.0) += posting.score;
        }

        for child in &self.children {
            let child_scores = child.reduce();
            match child.combine {
                Combine::Or => {
                    for hit in child_scores {
                        *scores.entry(hit.doc_id).or_insert(0.0) += hit.score;
                    }
                }
                Combine::And => {
                    let mut kept: AHashMap<u64, f64> = AHashMap::new();
                    for hit in child_scores {
                        if let Some(base) = scores.get(&hit.doc_id) {
                            kept.insert(hit.doc_id, base + hit.score);
                        }
                    }
                    scores = kept;
                }
            }
        }

        scores
            .into_iter()
            .map(|(doc_id, score)| DocumentScore { doc_id, score })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(doc_id: u64, score: f64) -> Posting {
        Posting {
            doc_id,
            field: "body".to_string(),
            term_freq: 1,
            score,
        }
    }

    fn score_of(scores: &[DocumentScore], doc_id: u64) -> Option<f64> {
        scores.iter().find(|s| s.doc_id == doc_id).map(|s| s.score)
    }

    #[test]
    fn test_reduce_aggregates_own_postings_per_document() {
        let mut ctx = QueryContext::new("body", "cat");
        ctx.postings = vec![scored(1, 0.5), scored(1, 0.25), scored(2, 1.0)];

        let scores = ctx.reduce();
        assert_eq!(scores.len(), 2);
        assert_eq!(score_of(&scores, 1), Some(0.75));
        assert_eq!(score_of(&scores, 2), Some(1.0));
    }

    #[test]
    fn test_reduce_or_child_unions() {
        let mut root = QueryContext::new("body", "cat");
        root.postings = vec![scored(1, 1.0)];

        let mut child = QueryContext::new("body", "dog");
        child.postings = vec![scored(1, 0.5), scored(2, 2.0)];
        root.children.push(child);

        let scores = root.reduce();
        assert_eq!(scores.len(), 2);
        assert_eq!(score_of(&scores, 1), Some(1.5));
        assert_eq!(score_of(&scores, 2), Some(2.0));
    }

    #[test]
    fn test_reduce_and_child_intersects() {
        let mut root = QueryContext::new("body", "cat");
        root.postings = vec![scored(1, 1.0), scored(2, 1.0)];

        let mut child = QueryContext::new("body", "dog").with_combine(Combine::And);
        child.postings = vec![scored(2, 0.5), scored(3, 0.5)];
        root.children.push(child);

        let scores = root.reduce();
        assert_eq!(scores.len(), 1);
        assert_eq!(score_of(&scores, 2), Some(1.5));
    }

    #[test]
    fn test_reduce_and_child_with_no_matches_empties_result() {
        let mut root = QueryContext::new("body", "cat");
        root.postings = vec![scored(1, 1.0)];

        // A required clause that matched nothing: boolean AND with the empty
        // set.
        let child = QueryContext::new("body", "unicorn").with_combine(Combine::And);
        root.children.push(child);

        assert!(root.reduce().is_empty());
    }

    #[test]
    fn test_reduce_nested_children_bottom_up() {
        let mut grandchild = QueryContext::new("body", "fish");
        grandchild.postings = vec![scored(5, 0.5)];

        let mut child = QueryContext::new("body", "dog");
        child.postings = vec![scored(5, 1.0)];
        child.children.push(grandchild);

        let mut root = QueryContext::new("body", "cat");
        root.postings = vec![scored(1, 1.0)];
        root.children.push(child);

        let scores = root.reduce();
        assert_eq!(score_of(&scores, 5), Some(1.5));
        assert_eq!(score_of(&scores, 1), Some(1.0));
    }

    #[test]
    fn test_node_count() {
        let root = QueryContext::new("body", "a")
            .with_child(QueryContext::new("body", "b"))
            .with_child(QueryContext::new("body", "c").with_child(QueryContext::new("body", "d")));
        assert_eq!(root.node_count(), 4);
    }
}
