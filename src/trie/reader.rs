//! Streaming traversal of serialized trie partitions.
//!
//! A [`PartitionReader`] walks one partition file in its serialized
//! depth-first order without rebuilding the tree in memory. The depth field
//! of each record drives an explicit path stack: a record at depth `d`
//! truncates the path to `d` characters and appends its own. Every matcher
//! consumes the reader, mirroring the single forward pass the format allows;
//! reopen the file to run another matcher.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{AmberError, Result};
use crate::trie::codec::TrieRecord;

/// A reader over one trie partition file.
#[derive(Debug)]
pub struct PartitionReader {
    reader: BufReader<File>,
    line: String,
}

impl PartitionReader {
    /// Open a partition file. A missing file is an I/O error; callers that
    /// treat absent dictionaries as empty should not get this far.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(PartitionReader {
            reader: BufReader::new(file),
            line: String::new(),
        })
    }

    /// Exact lookup: true if the partition contains `word` with its
    /// end-of-word marker set. The empty word is never in a dictionary.
    pub fn has_word(mut self, word: &str) -> Result<bool> {
        let target: Vec<char> = word.chars().collect();
        if target.is_empty() {
            return Ok(false);
        }

        // Number of leading characters matched so far. The last matched node
        // sits at depth `matched - 1`, so its subtree records all have depth
        // >= `matched`; a shallower record means the subtree closed without
        // completing the word.
        let mut matched = 0usize;

        while let Some(record) = self.next_record()? {
            if record.depth < matched {
                return Ok(false);
            }
            if record.depth > matched {
                // Inside an unmatched sibling's subtree.
                continue;
            }
            if record.value == target[matched] {
                matched += 1;
                if matched == target.len() {
                    return Ok(record.end_of_word);
                }
                if !record.has_child {
                    return Ok(false);
                }
            }
        }

        Ok(false)
    }

    /// Prefix enumeration: every word in the partition starting with
    /// `prefix`, including `prefix` itself if it is a word. The empty prefix
    /// enumerates the whole partition.
    pub fn starts_with(mut self, prefix: &str) -> Result<Vec<String>> {
        let target: Vec<char> = prefix.chars().collect();
        let mut words = Vec::new();
        let mut path: Vec<char> = Vec::new();
        let mut matched = 0usize;
        let mut skip_below: Option<usize> = None;

        while let Some(record) = self.next_record()? {
            if let Some(limit) = skip_below {
                if record.depth > limit {
                    continue;
                }
                skip_below = None;
            }

            if record.depth > path.len() {
                return Err(depth_jump(path.len(), record.depth));
            }
            path.truncate(record.depth);
            path.push(record.value);
            matched = matched.min(record.depth);

            if matched == record.depth && matched < target.len() {
                if record.value == target[matched] {
                    matched += 1;
                } else {
                    // Wrong branch; its whole subtree is out.
                    skip_below = Some(record.depth);
                    continue;
                }
            }

            if record.end_of_word && matched == target.len() {
                words.push(path.iter().collect());
            }
        }

        Ok(words)
    }

    /// Bounded edit-distance enumeration: every word in the partition within
    /// `edits` Levenshtein distance of `word`.
    ///
    /// A distance-table row is carried per path position; a branch whose row
    /// minimum already exceeds the budget cannot produce a match through any
    /// completion and its subtree is skipped. The empty query matches only
    /// words of length <= `edits` (pure insertions).
    pub fn near(mut self, word: &str, edits: usize) -> Result<Vec<String>> {
        let target: Vec<char> = word.chars().collect();
        let n = target.len();
        let mut words = Vec::new();
        let mut path: Vec<char> = Vec::new();
        // rows[d] is the distance row after consuming path[..d].
        let mut rows: Vec<Vec<usize>> = vec![(0..=n).collect()];
        let mut skip_below: Option<usize> = None;

        while let Some(record) = self.next_record()? {
            if let Some(limit) = skip_below {
                if record.depth > limit {
                    continue;
                }
                skip_below = None;
            }

            if record.depth > path.len() {
                return Err(depth_jump(path.len(), record.depth));
            }
            path.truncate(record.depth);
            path.push(record.value);
            rows.truncate(record.depth + 1);

            let prev = &rows[record.depth];
            let mut row = Vec::with_capacity(n + 1);
            row.push(prev[0] + 1);
            for j in 1..=n {
                let cost = if target[j - 1] == record.value { 0 } else { 1 };
                let value = (row[j - 1] + 1).min(prev[j] + 1).min(prev[j - 1] + cost);
                row.push(value);
            }

            if record.end_of_word && row[n] <= edits {
                words.push(path.iter().collect());
            }

            // Minimum achievable distance through any completion of this
            // branch; rows below can only grow past it.
            let floor = row.iter().copied().min().unwrap_or(0);
            rows.push(row);
            if floor > edits {
                skip_below = Some(record.depth);
            }
        }

        Ok(words)
    }

    /// Every word in the partition.
    pub fn words(self) -> Result<Vec<String>> {
        self.starts_with("")
    }

    /// Number of top-level subtrees serialized into this partition.
    pub fn top_level_count(mut self) -> Result<usize> {
        let mut count = 0;
        while let Some(record) = self.next_record()? {
            if record.depth == 0 {
                count += 1;
            }
        }
        Ok(count)
    }

    fn next_record(&mut self) -> Result<Option<TrieRecord>> {
        loop {
            self.line.clear();
            let read = self.reader.read_line(&mut self.line)?;
            if read == 0 {
                return Ok(None);
            }
            let line = self.line.trim_end_matches('\n');
            if line.is_empty() {
                continue;
            }
            return Ok(Some(TrieRecord::parse(line)?));
        }
    }
}

/// Depth-first order only ever descends one level at a time; a deeper jump
/// means the partition is corrupt.
fn depth_jump(path_len: usize, depth: usize) -> AmberError {
    AmberError::decode(format!(
        "trie record depth jumps from {path_len} to {depth}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::Trie;
    use crate::trie::codec::{FoldOptions, write_dictionary_with};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn single_partition(dir: &TempDir, words: &[&str]) -> PathBuf {
        let trie = Trie::from_words(words);
        // A large minimum group keeps these small dictionaries in one file.
        let options = FoldOptions {
            min_group: 64,
            ..FoldOptions::default()
        };
        let partitions = write_dictionary_with(&trie, dir.path(), "body", &options).unwrap();
        assert_eq!(partitions.len(), 1);
        partitions.into_iter().next().unwrap()
    }

    fn sorted(mut words: Vec<String>) -> Vec<String> {
        words.sort();
        words
    }

    #[test]
    fn test_has_word() {
        let dir = TempDir::new().unwrap();
        let path = single_partition(&dir, &["cat", "car", "cart", "dog"]);

        for word in ["cat", "car", "cart", "dog"] {
            assert!(PartitionReader::open(&path).unwrap().has_word(word).unwrap());
        }
        for word in ["do", "ca", "cats", "carts", "fox", ""] {
            assert!(!PartitionReader::open(&path).unwrap().has_word(word).unwrap());
        }
    }

    #[test]
    fn test_starts_with() {
        let dir = TempDir::new().unwrap();
        let path = single_partition(&dir, &["cat", "car", "cart", "dog"]);

        let hits = PartitionReader::open(&path).unwrap().starts_with("ca").unwrap();
        assert_eq!(sorted(hits), vec!["car", "cart", "cat"]);

        let hits = PartitionReader::open(&path).unwrap().starts_with("car").unwrap();
        assert_eq!(sorted(hits), vec!["car", "cart"]);

        let hits = PartitionReader::open(&path).unwrap().starts_with("dog").unwrap();
        assert_eq!(hits, vec!["dog"]);

        let hits = PartitionReader::open(&path).unwrap().starts_with("x").unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_starts_with_empty_prefix_enumerates_all() {
        let dir = TempDir::new().unwrap();
        let path = single_partition(&dir, &["cat", "car", "dog"]);

        let hits = PartitionReader::open(&path).unwrap().starts_with("").unwrap();
        assert_eq!(sorted(hits), vec!["car", "cat", "dog"]);
    }

    #[test]
    fn test_near_exact_budget_zero() {
        let dir = TempDir::new().unwrap();
        let path = single_partition(&dir, &["cat", "car", "cart", "dog"]);

        let hits = PartitionReader::open(&path).unwrap().near("cat", 0).unwrap();
        assert_eq!(hits, vec!["cat"]);
    }

    #[test]
    fn test_near_one_edit() {
        let dir = TempDir::new().unwrap();
        let path = single_partition(&dir, &["cat", "car", "cart", "dog"]);

        // car is one substitution away, cart one insertion; dog is far out.
        let hits = PartitionReader::open(&path).unwrap().near("cat", 1).unwrap();
        assert_eq!(sorted(hits), vec!["car", "cart", "cat"]);
    }

    #[test]
    fn test_near_matches_reference_distance() {
        let dir = TempDir::new().unwrap();
        let words = ["kitten", "sitting", "mitten", "kit", "written"];
        let path = single_partition(&dir, &words);

        for budget in 0..=4 {
            let hits = PartitionReader::open(&path).unwrap().near("kitten", budget).unwrap();
            let expected: Vec<String> = {
                let mut v: Vec<String> = words
                    .iter()
                    .filter(|w| levenshtein("kitten", w) <= budget)
                    .map(|w| w.to_string())
                    .collect();
                v.sort();
                v
            };
            assert_eq!(sorted(hits), expected, "budget {budget}");
        }
    }

    #[test]
    fn test_near_empty_query_matches_short_words() {
        let dir = TempDir::new().unwrap();
        let path = single_partition(&dir, &["a", "ab", "abc"]);

        let hits = PartitionReader::open(&path).unwrap().near("", 2).unwrap();
        assert_eq!(sorted(hits), vec!["a", "ab"]);

        let hits = PartitionReader::open(&path).unwrap().near("", 0).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_corrupt_partition_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.tri");
        fs::write(&path, "c1100\nnot a record at all\n").unwrap();

        let err = PartitionReader::open(&path).unwrap().words().unwrap_err();
        assert!(matches!(err, AmberError::Decode(_)));
    }

    #[test]
    fn test_missing_partition_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = PartitionReader::open(&dir.path().join("absent.tri")).unwrap_err();
        assert!(matches!(err, AmberError::Io(_)));
    }

    // Plain reference implementation to check the trie traversal against.
    fn levenshtein(a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let mut prev: Vec<usize> = (0..=b.len()).collect();
        for i in 1..=a.len() {
            let mut row = vec![i];
            for j in 1..=b.len() {
                let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
                row.push((row[j - 1] + 1).min(prev[j] + 1).min(prev[j - 1] + cost));
            }
            prev = row;
        }
        prev[b.len()]
    }
}
