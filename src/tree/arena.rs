//! Node arena for one tree pair
//!
//! All nodes (original and virtual) live in a single growable vector and
//! are addressed by [`NodeId`]. Parent, children and alignment are plain ids,
//! so the whole pair is dropped at once when the arena goes out of scope.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Index;

use super::node::{Node, NodeId, Origin, Side};
use crate::AlignError;

/// Owns every node of one tree pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct NodeArena {
    /// Arena storage, `nodes[i].id == i`
    nodes: Vec<Node>,

    /// Number of nodes declared by the input record
    original_len: usize,
}

impl NodeArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes, virtual included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no node exists (used as the end-of-stream marker)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes that came from the input record
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Look up a node by id
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes in id order
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    /// Nodes on one side, in id order
    pub fn nodes_on(&self, side: Side) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(move |n| n.side == side)
    }

    /// Original nodes on one side, leaves included
    pub fn original_nodes(&self, side: Side) -> Vec<NodeId> {
        self.nodes_on(side)
            .filter(|n| n.origin == Origin::Original)
            .map(|n| n.id)
            .collect()
    }

    /// Original nodes on one side that have children
    pub fn internal_nodes(&self, side: Side) -> Vec<NodeId> {
        self.nodes_on(side)
            .filter(|n| n.origin == Origin::Original && !n.is_leaf())
            .map(|n| n.id)
            .collect()
    }

    /// Synthesized nodes in creation order
    pub fn virtual_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes[self.original_len..].iter()
    }

    /// Append a virtual node grouping `children` under `parent`
    ///
    /// The node starts without links; callers align it right after.
    pub fn push_virtual(&mut self, side: Side, parent: NodeId, children: Vec<NodeId>) -> NodeId {
        let id = self.nodes.len();
        debug_assert!(
            self.nodes.get(parent).is_some_and(|p| p.side == side),
            "virtual parent must exist on the same side"
        );
        self.nodes.push(Node::virtual_node(id, side, parent, children));
        id
    }

    /// Record a symmetric alignment link between `a` and `b`
    ///
    /// Returns `true` if the link is new.
    pub fn link(&mut self, a: NodeId, b: NodeId) -> Result<bool, AlignError> {
        let len = self.nodes.len();
        if a >= len || b >= len {
            return Err(AlignError::LinkOutOfRange {
                node: a.min(b),
                partner: a.max(b),
            });
        }
        if self.nodes[a].side == self.nodes[b].side {
            return Err(AlignError::SameSideLink { a, b });
        }
        let fresh = self.nodes[a].alignment.insert(b);
        self.nodes[b].alignment.insert(a);
        Ok(fresh)
    }

    /// Internal nodes that are still without any link
    pub fn unaligned_internal(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.is_unmatched())
            .map(|n| n.id)
            .collect()
    }

    /// Does every non-leaf node have a non-empty alignment set
    pub fn is_fully_aligned(&self) -> bool {
        self.nodes.iter().all(|n| !n.is_unmatched())
    }

    /// Snapshot of the alignment relation as ordered pairs `(a, b)` with `a < b`
    pub fn alignment_pairs(&self) -> BTreeSet<(NodeId, NodeId)> {
        self.nodes
            .iter()
            .flat_map(|n| n.alignment.iter().map(move |&p| (n.id.min(p), n.id.max(p))))
            .collect()
    }

    /// Check the structural invariants of the pair
    ///
    /// - every link names a node on the opposite side, and links are symmetric
    /// - original parent/children pointers agree with each other
    /// - parent chains terminate (no cycles)
    /// - virtual children are a contiguous run of their parent's children
    pub fn validate(&self) -> Result<(), AlignError> {
        for node in &self.nodes {
            for &partner in &node.alignment {
                let other = self.nodes.get(partner).ok_or(AlignError::LinkOutOfRange {
                    node: node.id,
                    partner,
                })?;
                if other.side == node.side {
                    return Err(AlignError::SameSideLink {
                        a: node.id,
                        b: partner,
                    });
                }
                if !other.alignment.contains(&node.id) {
                    return Err(AlignError::AsymmetricLink {
                        node: node.id,
                        partner,
                    });
                }
            }

            match node.origin {
                Origin::Original => self.validate_original(node)?,
                Origin::Virtual => self.validate_virtual(node)?,
            }
        }

        self.check_acyclic()
    }

    /// Walk every parent chain once; reaching a node already on the current
    /// chain is a cycle
    fn check_acyclic(&self) -> Result<(), AlignError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unseen,
            OnChain,
            Done,
        }

        let mut marks = vec![Mark::Unseen; self.nodes.len()];
        let mut chain = Vec::new();
        for start in 0..self.nodes.len() {
            let mut cursor = Some(start);
            while let Some(id) = cursor {
                match marks[id] {
                    Mark::Done => break,
                    Mark::OnChain => return Err(AlignError::Cycle { node: id }),
                    Mark::Unseen => {
                        marks[id] = Mark::OnChain;
                        chain.push(id);
                        cursor = self.nodes[id].parent;
                    }
                }
            }
            for id in chain.drain(..) {
                marks[id] = Mark::Done;
            }
        }
        Ok(())
    }

    fn validate_original(&self, node: &Node) -> Result<(), AlignError> {
        for &child in &node.children {
            let c = self.nodes.get(child).ok_or(AlignError::ChildOutOfRange {
                parent: node.id,
                child,
            })?;
            if c.side != node.side {
                return Err(AlignError::SideMismatch {
                    parent: node.id,
                    child,
                });
            }
            if c.parent != Some(node.id) {
                return Err(AlignError::ParentMismatch { node: child });
            }
        }
        if let Some(p) = node.parent {
            let parent = self.nodes.get(p).ok_or(AlignError::ParentMismatch { node: node.id })?;
            if parent.origin != Origin::Original || parent.position_of(node.id).is_none() {
                return Err(AlignError::ParentMismatch { node: node.id });
            }
        }
        Ok(())
    }

    fn validate_virtual(&self, node: &Node) -> Result<(), AlignError> {
        let not_contiguous = || AlignError::VirtualNotContiguous { node: node.id };
        let parent = node
            .parent
            .and_then(|p| self.nodes.get(p))
            .ok_or_else(not_contiguous)?;
        if parent.side != node.side || node.children.is_empty() {
            return Err(not_contiguous());
        }
        let start = parent
            .position_of(node.children[0])
            .ok_or_else(not_contiguous)?;
        let end = start + node.children.len();
        if end > parent.children.len() || parent.children[start..end] != node.children[..] {
            return Err(not_contiguous());
        }
        Ok(())
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

/// Incremental construction of a decoded arena
///
/// Nodes may be added in any order; [`ArenaBuilder::build`] checks the
/// declared id range, derives parent pointers and makes seeded links
/// symmetric.
///
/// Storage grows with the nodes actually added, not with the declared count.
#[derive(Debug)]
pub struct ArenaBuilder {
    declared: usize,
    nodes: BTreeMap<NodeId, Node>,
}

impl ArenaBuilder {
    /// Builder for a record declaring `declared` nodes (ids `0..declared`)
    pub fn new(declared: usize) -> Self {
        Self {
            declared,
            nodes: BTreeMap::new(),
        }
    }

    /// Number of declared ids
    pub fn declared(&self) -> usize {
        self.declared
    }

    /// Add an input node with its ordered children and seeded links
    pub fn add_node(
        &mut self,
        id: NodeId,
        side: Side,
        children: Vec<NodeId>,
        links: impl IntoIterator<Item = NodeId>,
    ) -> Result<&mut Self, AlignError> {
        if id >= self.declared {
            return Err(AlignError::NodeOutOfRange {
                id,
                declared: self.declared,
            });
        }
        if self.nodes.contains_key(&id) {
            return Err(AlignError::DuplicateNode { id });
        }
        let mut node = Node::original(id, side, children);
        node.alignment.extend(links);
        self.nodes.insert(id, node);
        Ok(self)
    }

    /// Finish construction
    pub fn build(self) -> Result<NodeArena, AlignError> {
        let declared = self.declared;
        if self.nodes.len() < declared {
            // Ids are unique and below `declared`: one of the first len + 1 is free
            let id = (0..=self.nodes.len())
                .find(|id| !self.nodes.contains_key(id))
                .unwrap_or(self.nodes.len());
            return Err(AlignError::MissingNode { id });
        }
        let mut nodes: Vec<Node> = self.nodes.into_values().collect();

        for id in 0..declared {
            for idx in 0..nodes[id].children.len() {
                let child = nodes[id].children[idx];
                if child >= declared {
                    return Err(AlignError::ChildOutOfRange { parent: id, child });
                }
                if child == id {
                    return Err(AlignError::Cycle { node: id });
                }
                if nodes[child].side != nodes[id].side {
                    return Err(AlignError::SideMismatch { parent: id, child });
                }
                if nodes[child].parent.is_some() {
                    return Err(AlignError::MultipleParents { node: child });
                }
                nodes[child].parent = Some(id);
            }
        }

        let mut arena = NodeArena {
            nodes,
            original_len: declared,
        };

        let seeds: Vec<(NodeId, NodeId)> = arena
            .nodes
            .iter()
            .flat_map(|n| n.alignment.iter().map(move |&p| (n.id, p)))
            .collect();
        for (a, b) in seeds {
            arena.link(a, b)?;
        }

        arena.validate()?;
        Ok(arena)
    }
}
