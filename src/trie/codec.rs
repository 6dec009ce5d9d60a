//! Serialization of tries into partition files.
//!
//! Each node is written as one text line in depth-first order:
//! `{value}{hasRightSibling}{hasLeftChild}{endOfWord}{depth}`, flags encoded
//! as `0`/`1`. The child subtree is emitted before the right sibling, so a
//! strictly increasing depth means "descend" and a non-increasing depth means
//! the previous subtree closed. This, plus the explicit depth, is enough to
//! reconstruct the shape without pointers.
//!
//! The top-level sibling chain is folded into groups of subtrees, one
//! partition file per group, named `{dictId}_{n}.tri`. Oversized partitions
//! are deleted and re-split with the fold factor halved per level, so both
//! the file count and the per-file size stay bounded.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AmberError, Result};
use crate::term::dictionary_id;
use crate::trie::Trie;

/// Partition file extension.
pub const PARTITION_EXT: &str = "tri";

/// One serialized trie node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrieRecord {
    /// The character at this node.
    pub value: char,
    /// True if another sibling follows at the same depth.
    pub has_sibling: bool,
    /// True if this node has a child subtree.
    pub has_child: bool,
    /// True if the path down to this node spells a complete word.
    pub end_of_word: bool,
    /// Depth of this node below the synthetic root.
    pub depth: usize,
}

impl TrieRecord {
    /// Encode the record as one line, without the trailing newline.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.value,
            flag(self.has_sibling),
            flag(self.has_child),
            flag(self.end_of_word),
            self.depth
        )
    }

    /// Parse a record from one line.
    pub fn parse(line: &str) -> Result<Self> {
        let mut chars = line.chars();
        let value = chars
            .next()
            .ok_or_else(|| AmberError::decode("empty trie record"))?;
        let has_sibling = parse_flag(chars.next(), line)?;
        let has_child = parse_flag(chars.next(), line)?;
        let end_of_word = parse_flag(chars.next(), line)?;
        let depth = chars
            .as_str()
            .parse::<usize>()
            .map_err(|_| AmberError::decode(format!("bad depth in trie record: {line:?}")))?;

        Ok(TrieRecord {
            value,
            has_sibling,
            has_child,
            end_of_word,
            depth,
        })
    }
}

fn flag(value: bool) -> char {
    if value { '1' } else { '0' }
}

fn parse_flag(ch: Option<char>, line: &str) -> Result<bool> {
    match ch {
        Some('0') => Ok(false),
        Some('1') => Ok(true),
        _ => Err(AmberError::decode(format!(
            "bad flag in trie record: {line:?}"
        ))),
    }
}

/// Folding and rebalancing parameters.
#[derive(Debug, Clone, Copy)]
pub struct FoldOptions {
    /// Top-level subtrees are split into roughly `count / fold_factor`
    /// groups.
    pub fold_factor: usize,
    /// Minimum number of subtrees per group.
    pub min_group: usize,
    /// Partitions larger than this are re-split.
    pub max_partition_bytes: u64,
}

impl Default for FoldOptions {
    fn default() -> Self {
        FoldOptions {
            fold_factor: 48,
            min_group: 2,
            max_partition_bytes: 100 * 1024,
        }
    }
}

/// Serialize a field's trie into partition files under `dir`.
///
/// Returns the paths of the written partitions, which collectively cover the
/// full top-level sibling chain and are pairwise disjoint. An empty trie
/// writes nothing.
pub fn write_dictionary(trie: &Trie, dir: &Path, field: &str) -> Result<Vec<PathBuf>> {
    write_dictionary_with(trie, dir, field, &FoldOptions::default())
}

/// Serialize a field's trie into partition files with explicit fold options.
pub fn write_dictionary_with(
    trie: &Trie,
    dir: &Path,
    field: &str,
    options: &FoldOptions,
) -> Result<Vec<PathBuf>> {
    let roots = trie.top_level();
    if roots.is_empty() {
        return Ok(Vec::new());
    }

    let dict_id = dictionary_id(field);
    let fold_factor = options.fold_factor.max(1);
    let groups: Vec<&[u32]> = if roots.len() == 1 {
        vec![&roots[..]]
    } else {
        let group_size = (roots.len() / fold_factor).max(options.min_group).max(1);
        roots.chunks(group_size).collect()
    };

    let mut partitions = Vec::new();
    for (ordinal, group) in groups.iter().enumerate() {
        let path = dir.join(format!("{dict_id}_{ordinal}.{PARTITION_EXT}"));
        write_balanced(trie, group, &path, fold_factor, options, &mut partitions)?;
    }

    Ok(partitions)
}

/// Write one group of top-level subtrees to `path`, then re-split it if the
/// file came out oversized. Each recursion level halves the fold factor; a
/// fold factor below 2 splits into one partition per subtree, which ends the
/// recursion.
fn write_balanced(
    trie: &Trie,
    group: &[u32],
    path: &Path,
    fold_factor: usize,
    options: &FoldOptions,
    partitions: &mut Vec<PathBuf>,
) -> Result<()> {
    let size = write_group(trie, group, path)?;

    if size <= options.max_partition_bytes || group.len() <= 1 {
        partitions.push(path.to_path_buf());
        return Ok(());
    }

    debug!(
        partition = %path.display(),
        size,
        subtrees = group.len(),
        "re-splitting oversized partition"
    );
    fs::remove_file(path)?;

    let subgroups: Vec<&[u32]> = if fold_factor < 2 {
        group.chunks(1).collect()
    } else {
        let group_size = (group.len() / fold_factor).max(options.min_group).max(1);
        group.chunks(group_size).collect()
    };

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| AmberError::index(format!("bad partition path: {}", path.display())))?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    for (ordinal, subgroup) in subgroups.iter().enumerate() {
        let child = dir.join(format!("{stem}_{ordinal}.{PARTITION_EXT}"));
        write_balanced(trie, subgroup, &child, fold_factor / 2, options, partitions)?;
    }

    Ok(())
}

/// Serialize a group of top-level subtrees depth-first into one file.
///
/// The group members are chained as siblings of each other within the
/// partition, whatever their linkage in the full chain was; partitioning
/// cuts the top-level chain at group boundaries. Returns the file size in
/// bytes. Iterative with an explicit stack, so dictionary depth never turns
/// into call-stack depth.
fn write_group(trie: &Trie, group: &[u32], path: &Path) -> Result<u64> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let mut written: u64 = 0;

    // (node, depth, sibling-flag override for group members at depth 0)
    let mut stack: Vec<(u32, usize, Option<bool>)> = Vec::new();
    for (i, &root) in group.iter().enumerate().rev() {
        stack.push((root, 0, Some(i + 1 < group.len())));
    }

    while let Some((idx, depth, sibling_override)) = stack.pop() {
        let node = trie.node(idx);
        let record = TrieRecord {
            value: node.value,
            has_sibling: sibling_override.unwrap_or(node.right_sibling.is_some()),
            has_child: node.left_child.is_some(),
            end_of_word: node.end_of_word,
            depth,
        };
        let line = record.encode();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        written += line.len() as u64 + 1;

        // Sibling below child: the child subtree is emitted first. Group
        // members ignore their real sibling link; the group defines it.
        if sibling_override.is_none()
            && let Some(sibling) = node.right_sibling
        {
            stack.push((sibling, depth, None));
        }
        if let Some(child) = node.left_child {
            stack.push((child, depth + 1, None));
        }
    }

    writer.flush()?;
    Ok(written)
}
