//! The in-memory term dictionary: a left-child/right-sibling encoded trie.
//!
//! The trie is stored as an arena of nodes addressed by index. Each node
//! holds a single character, an end-of-word marker, and optional arena
//! indices for its first child (`left_child`) and its next sibling
//! (`right_sibling`). A node's children form a singly-linked chain reachable
//! only through `left_child` followed by `right_sibling` links; there are no
//! upward links. A conceptual synthetic root owns the top-level sibling
//! chain, one chain element per first character of every indexed word.

pub mod codec;
pub mod reader;

/// One character position in the dictionary.
#[derive(Debug, Clone)]
pub(crate) struct TrieNode {
    /// The character at this position.
    pub(crate) value: char,
    /// True if the path from the root to this node spells a complete word.
    pub(crate) end_of_word: bool,
    /// First child: the next character in some word extending this prefix.
    pub(crate) left_child: Option<u32>,
    /// Next sibling: an alternative character at the same branch point.
    pub(crate) right_sibling: Option<u32>,
}

/// An LCRS trie over an arena of nodes.
#[derive(Debug, Clone, Default)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    /// Head of the top-level sibling chain, owned by the synthetic root.
    root: Option<u32>,
}

impl Trie {
    /// Create a new empty trie.
    pub fn new() -> Self {
        Trie::default()
    }

    /// Build a trie from an iterator of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Trie::new();
        for word in words {
            trie.insert(word.as_ref());
        }
        trie
    }

    /// Insert a word. The empty string is a no-op: the synthetic root cannot
    /// carry an end-of-word marker.
    pub fn insert(&mut self, word: &str) {
        let mut parent: Option<u32> = None;

        for ch in word.chars() {
            let head = match parent {
                None => self.root,
                Some(p) => self.node(p).left_child,
            };

            // Walk the sibling chain looking for ch, remembering the tail so
            // a missing character can be appended in insertion order.
            let mut found = None;
            let mut tail = None;
            let mut cursor = head;
            while let Some(idx) = cursor {
                if self.node(idx).value == ch {
                    found = Some(idx);
                    break;
                }
                tail = Some(idx);
                cursor = self.node(idx).right_sibling;
            }

            let idx = match found {
                Some(idx) => idx,
                None => {
                    let idx = self.push_node(ch);
                    match tail {
                        Some(t) => self.node_mut(t).right_sibling = Some(idx),
                        None => match parent {
                            None => self.root = Some(idx),
                            Some(p) => self.node_mut(p).left_child = Some(idx),
                        },
                    }
                    idx
                }
            };

            parent = Some(idx);
        }

        if let Some(p) = parent {
            self.node_mut(p).end_of_word = true;
        }
    }

    /// All words in the trie, in depth-first order.
    pub fn words(&self) -> Vec<String> {
        let mut words = Vec::new();
        let mut path: Vec<char> = Vec::new();
        let mut stack: Vec<(u32, usize)> = Vec::new();

        if let Some(root) = self.root {
            stack.push((root, 0));
        }

        while let Some((idx, depth)) = stack.pop() {
            let node = self.node(idx);
            path.truncate(depth);
            path.push(node.value);

            if node.end_of_word {
                words.push(path.iter().collect());
            }

            // Sibling below child so the child's subtree is walked first.
            if let Some(sibling) = node.right_sibling {
                stack.push((sibling, depth));
            }
            if let Some(child) = node.left_child {
                stack.push((child, depth + 1));
            }
        }

        words
    }

    /// Arena indices of the top-level sibling chain, in chain order.
    pub(crate) fn top_level(&self) -> Vec<u32> {
        let mut roots = Vec::new();
        let mut cursor = self.root;
        while let Some(idx) = cursor {
            roots.push(idx);
            cursor = self.node(idx).right_sibling;
        }
        roots
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the trie holds no words.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn node(&self, idx: u32) -> &TrieNode {
        &self.nodes[idx as usize]
    }

    fn node_mut(&mut self, idx: u32) -> &mut TrieNode {
        &mut self.nodes[idx as usize]
    }

    fn push_node(&mut self, value: char) -> u32 {
        let idx = self.nodes.len() as u32;
        self.nodes.push(TrieNode {
            value,
            end_of_word: false,
            left_child: None,
            right_sibling: None,
        });
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_trie() {
        let trie = Trie::new();
        assert!(trie.is_empty());
        assert_eq!(trie.node_count(), 0);
        assert!(trie.words().is_empty());
    }

    #[test]
    fn test_insert_and_enumerate() {
        let trie = Trie::from_words(["cat", "car", "cart", "dog"]);

        let mut words = trie.words();
        words.sort();
        assert_eq!(words, vec!["car", "cart", "cat", "dog"]);
    }

    #[test]
    fn test_shared_prefixes_share_nodes() {
        let trie = Trie::from_words(["cat", "car", "cart"]);
        // c, a, t, r, t: five nodes, the "ca" prefix stored once.
        assert_eq!(trie.node_count(), 5);
    }

    #[test]
    fn test_prefix_word_marked() {
        let trie = Trie::from_words(["cart", "car"]);
        let mut words = trie.words();
        words.sort();
        assert_eq!(words, vec!["car", "cart"]);
    }

    #[test]
    fn test_empty_word_is_noop() {
        let mut trie = Trie::new();
        trie.insert("");
        assert!(trie.is_empty());
    }

    #[test]
    fn test_duplicate_insert() {
        let mut trie = Trie::from_words(["cat"]);
        let nodes = trie.node_count();
        trie.insert("cat");
        assert_eq!(trie.node_count(), nodes);
        assert_eq!(trie.words(), vec!["cat"]);
    }

    #[test]
    fn test_top_level_chain_order() {
        let trie = Trie::from_words(["cat", "dog", "ant"]);
        let firsts: Vec<char> = trie
            .top_level()
            .into_iter()
            .map(|idx| trie.node(idx).value)
            .collect();
        // Insertion order, one chain element per first character.
        assert_eq!(firsts, vec!['c', 'd', 'a']);
    }

    #[test]
    fn test_unicode_words() {
        let trie = Trie::from_words(["über", "überall", "übung"]);
        let mut words = trie.words();
        words.sort();
        assert_eq!(words, vec!["über", "überall", "übung"]);
    }
}
