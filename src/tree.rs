use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use log::{debug, trace};

use crate::frequency::FrequencyTable;


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {

    /// Branching node. `freq` is the sum of both children while building,
    /// and zero after the tree is read back from a header.
    Inner { freq: u64, left: Box<Node>, right: Box<Node> },
    /// Terminal node. At decode time `count` is the number of occurrences
    /// of `symbol` still allowed to be emitted.
    Leaf { symbol: u8, count: u64 },

}

impl Node {

    pub const fn freq(&self) -> u64 {
        match self {
            Node::Inner { freq, .. } |
            Node::Leaf { count: freq, .. }
                => *freq
        }
    }


    pub const fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }


    fn merge(left: Node, right: Node) -> Node {
        Node::Inner {
            freq: left.freq().saturating_add(right.freq()),
            left: Box::new(left),
            right: Box::new(right)
        }
    }


    fn leaf_count(&self) -> usize {
        match self {
            Node::Inner { left, right, .. } => left.leaf_count() + right.leaf_count(),
            Node::Leaf { .. } => 1,
        }
    }


    fn depth(&self) -> usize {
        match self {
            Node::Inner { left, right, .. } => 1 + left.depth().max(right.depth()),
            Node::Leaf { .. } => 0,
        }
    }

}


/// A node waiting to be merged.
///
/// `order` is the insertion index into the candidate set: leaves get theirs in
/// ascending symbol order before any merged node exists, merged nodes get theirs
/// in creation order. Ordering on `(freq, order)` therefore puts leaves before
/// inner nodes of equal frequency, equal leaves by symbol, and equal inner nodes
/// by which was created first.
#[derive(Debug)]
struct Candidate {

    freq: u64,
    order: usize,
    node: Node

}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.freq, self.order).cmp(&(other.freq, other.order))
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {

    /// Always an inner node
    root: Node

}

impl HuffmanTree {

    /// Builds the prefix-code tree for the given byte counts.
    ///
    /// Returns `None` when no byte occurs at all. When exactly one byte value
    /// occurs, a zero-count placeholder leaf for the following byte value joins
    /// the candidates so that the root is still an inner node.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Option<Self> {

        let mut leaves: Vec<(u8, u64)> = frequencies.iter_nonzero().collect();

        if leaves.is_empty() {
            return None;
        }

        if leaves.len() == 1 {
            let symbol = leaves[0].0;
            let placeholder = symbol.wrapping_add(1);
            trace!("single symbol {symbol:#04x}, adding placeholder leaf {placeholder:#04x}");
            leaves.push((placeholder, 0));
            leaves.sort_unstable_by_key(|&(symbol, _)| symbol);
        }

        let mut candidates: BinaryHeap<Reverse<Candidate>> = leaves.into_iter()
            .enumerate()
            .map(|(order, (symbol, count))| Reverse(Candidate {
                freq: count,
                order,
                node: Node::Leaf { symbol, count }
            }))
            .collect();

        let mut next_order = candidates.len();

        loop {
            let Reverse(left) = candidates.pop()?;

            let Some(Reverse(right)) = candidates.pop() else {
                // The last candidate standing is the root
                debug!("built tree: {} leaves, depth {}", left.node.leaf_count(), left.node.depth());
                return Self::from_root(left.node);
            };

            let parent = Node::merge(left.node, right.node);

            candidates.push(Reverse(Candidate {
                freq: parent.freq(),
                order: next_order,
                node: parent
            }));

            next_order += 1;
        }
    }


    /// Wraps an existing root, which must be an inner node.
    pub fn from_root(root: Node) -> Option<Self> {
        if root.is_leaf() {
            None
        } else {
            Some(Self { root })
        }
    }


    pub const fn root(&self) -> &Node {
        &self.root
    }


    pub(crate) fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }


    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }


    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

}
