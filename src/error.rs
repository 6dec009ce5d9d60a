//! Error types for the Amber library.
//!
//! All errors are represented by the [`AmberError`] enum. Absence of a match
//! is never an error: a field or term that does not exist resolves to an
//! empty result. Errors are reserved for invalid input, I/O failures, and
//! corrupt on-disk encodings, and the latter two are kept distinct so that
//! callers can tell "file absent" apart from "file present but unreadable".

use std::io;

use thiserror::Error;

/// The main error type for Amber operations.
#[derive(Error, Debug)]
pub enum AmberError {
    /// I/O errors (missing or unreadable files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A trie or postings record that violates the expected layout.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid query input, rejected at the call boundary.
    #[error("Query error: {0}")]
    Query(String),

    /// Index-related errors (segment descriptors, dictionary layout).
    #[error("Index error: {0}")]
    Index(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal engine errors (thread pool construction and the like).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for operations that may fail with AmberError.
pub type Result<T> = std::result::Result<T, AmberError>;

impl AmberError {
    /// Create a new decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        AmberError::Decode(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        AmberError::Query(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        AmberError::Index(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        AmberError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = AmberError::decode("bad trie record");
        assert_eq!(error.to_string(), "Decode error: bad trie record");

        let error = AmberError::query("empty query");
        assert_eq!(error.to_string(), "Query error: empty query");

        let error = AmberError::index("no segment descriptor");
        assert_eq!(error.to_string(), "Index error: no segment descriptor");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let amber_error = AmberError::from(io_error);

        match amber_error {
            AmberError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
