//! Tree node representation
//!
//! Node = (side, children, alignment) addressed by a stable arena id.
//! Cross-references are plain ids into the owning [`NodeArena`], never
//! ownership-bearing pointers.
//!
//! [`NodeArena`]: super::NodeArena

use std::collections::BTreeSet;
use std::fmt;

/// Index of a node in its arena. Assigned at creation, never reused.
pub type NodeId = usize;

/// Which of the two trees of a pair a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Side {
    /// Source-side tree (`L` in the stream format)
    Left,

    /// Target-side tree (`R` in the stream format)
    Right,
}

impl Side {
    /// The other tree of the pair
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Letter used by the stream format
    pub fn letter(self) -> char {
        match self {
            Side::Left => 'L',
            Side::Right => 'R',
        }
    }

    /// Parse a stream-format side letter
    pub fn from_letter(c: char) -> Option<Side> {
        match c {
            'L' => Some(Side::Left),
            'R' => Some(Side::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Whether a node came from the input or was synthesized during alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Origin {
    /// Present in the decoded record
    Original,

    /// Synthesized to give some span a counterpart
    Virtual,
}

/// A single tree element
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Node {
    /// Arena index
    pub id: NodeId,

    /// Tree this node belongs to (fixed at creation)
    pub side: Side,

    /// Input node or synthesized bracket
    pub origin: Origin,

    /// Parent id, `None` for roots
    pub parent: Option<NodeId>,

    /// Ordered children in surface order (empty ⇔ leaf)
    pub children: Vec<NodeId>,

    /// Opposite-side nodes this node corresponds to. Grows, never shrinks.
    pub alignment: BTreeSet<NodeId>,
}

impl Node {
    /// Create an input node with no links yet
    pub fn original(id: NodeId, side: Side, children: Vec<NodeId>) -> Self {
        Self {
            id,
            side,
            origin: Origin::Original,
            parent: None,
            children,
            alignment: BTreeSet::new(),
        }
    }

    /// Create a synthesized bracket grouping `children` of `parent`
    pub fn virtual_node(id: NodeId, side: Side, parent: NodeId, children: Vec<NodeId>) -> Self {
        Self {
            id,
            side,
            origin: Origin::Virtual,
            parent: Some(parent),
            children,
            alignment: BTreeSet::new(),
        }
    }

    /// Check if terminal
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Check if synthesized
    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.origin == Origin::Virtual
    }

    /// Check if no link has been inferred or seeded yet
    #[inline]
    pub fn is_unaligned(&self) -> bool {
        self.alignment.is_empty()
    }

    /// Internal node without any link
    #[inline]
    pub fn is_unmatched(&self) -> bool {
        !self.is_leaf() && self.is_unaligned()
    }

    /// Position of `child` in this node's ordered children
    pub fn position_of(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.side, self.id)
    }
}
