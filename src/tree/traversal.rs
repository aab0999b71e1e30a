//! Yield computation
//!
//! Yield(n) = set of leaf ids reachable from n. Pure function of
//! `children`; alignment is never consulted.
//! Both [`compute_yield`] and [`YieldCache`] walk with an explicit stack;
//! the cache fills each subtree once.

use std::collections::BTreeSet;

use super::node::NodeId;
use super::NodeArena;

/// Leaf ids spanned by a subtree
pub type Yield = BTreeSet<NodeId>;

/// Compute the yield of `id` without caching
pub fn compute_yield(arena: &NodeArena, id: NodeId) -> Yield {
    let mut leaves = Yield::new();
    let mut stack = vec![id];

    while let Some(current) = stack.pop() {
        let node = &arena[current];
        if node.is_leaf() {
            leaves.insert(current);
        } else {
            stack.extend(node.children.iter().rev().copied());
        }
    }

    leaves
}

/// Per-arena memo of yields, keyed by node id
///
/// Valid for one tree pair; original subtrees never change once decoded.
#[derive(Debug, Default)]
pub struct YieldCache {
    entries: Vec<Option<Yield>>,
}

impl YieldCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached yield of `id`, computed on first request
    ///
    /// Missing entries below `id` are filled in post-order with an explicit
    /// stack, so chain depth is bounded by the heap.
    pub fn get(&mut self, arena: &NodeArena, id: NodeId) -> &Yield {
        let needed = arena.len().max(id + 1);
        if self.entries.len() < needed {
            self.entries.resize(needed, None);
        }

        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if self.entries[current].is_some() {
                continue;
            }
            let node = &arena[current];
            if node.is_leaf() {
                self.entries[current] = Some(Yield::from([current]));
            } else if expanded {
                let mut leaves = Yield::new();
                for &child in &node.children {
                    if let Some(child_yield) = &self.entries[child] {
                        leaves.extend(child_yield.iter().copied());
                    }
                }
                self.entries[current] = Some(leaves);
            } else {
                stack.push((current, true));
                stack.extend(node.children.iter().rev().map(|&c| (c, false)));
            }
        }

        self.entries[id].get_or_insert_with(Yield::new)
    }

    /// Number of memoised entries
    pub fn cached(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Drop all entries (pair boundary)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
