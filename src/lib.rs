//! # Amber
//!
//! A compact trie-based full-text indexing and retrieval engine.
//!
//! ## Features
//!
//! - LCRS-encoded term dictionaries, partitioned on disk
//! - Exact, prefix, and bounded edit-distance term matching
//! - Per-term postings with boolean-OR merging
//! - Pluggable relevance scoring
//! - Parallel per-clause query scanning

pub mod collector;
pub mod error;
pub mod postings;
pub mod query;
pub mod scoring;
pub mod segment;
pub mod term;
pub mod trie;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
