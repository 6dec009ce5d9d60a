//! Terms and their deterministic mapping to on-disk file identifiers.
//!
//! A [`Term`] is a `(field, word)` pair. Each field's dictionary lives in one
//! or more `{dictId}_{n}.tri` partition files, and each distinct term's
//! postings live in a single `{termFileId}.pos` file. Both identifiers are
//! derived with CRC-32 so that they are stable across processes; the default
//! hashers are randomly seeded and would produce different file names on
//! every run.

use std::fmt;

use crc32fast::Hasher;

/// A `(field, word)` pair identifying one entry in the term dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term {
    /// The field the word was indexed under.
    pub field: String,
    /// The indexed word, already normalized.
    pub word: String,
}

impl Term {
    /// Create a new term.
    pub fn new<F: Into<String>, W: Into<String>>(field: F, word: W) -> Self {
        Term {
            field: field.into(),
            word: word.into(),
        }
    }

    /// The identifier of the postings file holding this term's postings.
    pub fn postings_file_id(&self) -> String {
        let mut hasher = Hasher::new();
        hasher.update(self.field.as_bytes());
        hasher.update(&[0]);
        hasher.update(self.word.as_bytes());
        format!("{:08x}", hasher.finalize())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.word)
    }
}

/// The identifier of a field's term dictionary.
///
/// Partition files for the field are named `{dictionary_id}_{n}.tri` and are
/// glob-matched by this prefix at read time.
pub fn dictionary_id(field: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(field.as_bytes());
    format!("{:08x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_display() {
        let term = Term::new("title", "amber");
        assert_eq!(term.to_string(), "title:amber");
    }

    #[test]
    fn test_postings_file_id_deterministic() {
        let a = Term::new("body", "cat");
        let b = Term::new("body", "cat");
        assert_eq!(a.postings_file_id(), b.postings_file_id());
    }

    #[test]
    fn test_postings_file_id_distinguishes_field_and_word() {
        // The separator byte keeps ("ab", "c") and ("a", "bc") apart.
        assert_ne!(
            Term::new("ab", "c").postings_file_id(),
            Term::new("a", "bc").postings_file_id()
        );
        assert_ne!(
            Term::new("body", "cat").postings_file_id(),
            Term::new("title", "cat").postings_file_id()
        );
    }

    #[test]
    fn test_dictionary_id_stable() {
        assert_eq!(dictionary_id("body"), dictionary_id("body"));
        assert_ne!(dictionary_id("body"), dictionary_id("title"));
    }
}
