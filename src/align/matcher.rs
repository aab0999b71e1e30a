//! Containment matcher
//!
//! Builds the one-directional containment relation between every original
//! left node and every original right node, then links all mutually
//! contained internal pairs (the exact-match pass).
//!
//! Space: 2 bits per direction per (left, right) pair.

use bitvec::prelude::*;
use tracing::{debug, trace};

use super::predicate::{containment, Containment};
use crate::tree::{NodeArena, NodeId, Side, YieldCache};
use crate::AlignError;

/// Containment relation between the original nodes of both sides
///
/// Leaves are included so that leaf descendants can serve as span pieces.
#[derive(Debug, Clone)]
pub struct ContainmentTable {
    left: Vec<NodeId>,
    right: Vec<NodeId>,

    /// Row/column of each original id within `left` or `right`
    slot: Vec<Option<usize>>,

    /// yield(l) ⊆ yield(r), indexed `l * right.len() + r`
    left_in_right: BitVec,
    left_in_right_supported: BitVec,

    /// yield(r) ⊆ yield(l), same indexing
    right_in_left: BitVec,
    right_in_left_supported: BitVec,
}

impl ContainmentTable {
    /// Compute the relation for every original left/right pair
    ///
    /// Cost: O(|L| × |R| × average yield size)
    pub fn build(arena: &NodeArena, cache: &mut YieldCache) -> Self {
        let left = arena.original_nodes(Side::Left);
        let right = arena.original_nodes(Side::Right);

        let mut slot = vec![None; arena.original_len()];
        for (i, &id) in left.iter().enumerate() {
            slot[id] = Some(i);
        }
        for (j, &id) in right.iter().enumerate() {
            slot[id] = Some(j);
        }

        let cells = left.len() * right.len();
        let mut table = Self {
            left_in_right: bitvec![0; cells],
            left_in_right_supported: bitvec![0; cells],
            right_in_left: bitvec![0; cells],
            right_in_left_supported: bitvec![0; cells],
            left,
            right,
            slot,
        };

        let right_yields: Vec<_> = table
            .right
            .iter()
            .map(|&r| cache.get(arena, r).clone())
            .collect();

        for i in 0..table.left.len() {
            let left_yield = cache.get(arena, table.left[i]).clone();
            for (j, right_yield) in right_yields.iter().enumerate() {
                let cell = i * table.right.len() + j;
                let forward = containment(arena, &left_yield, right_yield);
                let backward = containment(arena, right_yield, &left_yield);
                table.left_in_right.set(cell, forward.holds());
                table.left_in_right_supported.set(cell, forward.is_supported());
                table.right_in_left.set(cell, backward.holds());
                table.right_in_left_supported.set(cell, backward.is_supported());
            }
        }

        trace!(
            left = table.left.len(),
            right = table.right.len(),
            "containment table built"
        );
        table
    }

    /// Original nodes of `side`, in id order
    pub fn side(&self, side: Side) -> &[NodeId] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn cell(&self, left: NodeId, right: NodeId) -> Option<usize> {
        let i = self.slot.get(left).copied().flatten()?;
        let j = self.slot.get(right).copied().flatten()?;
        Some(i * self.right.len() + j)
    }

    /// How yield(`small`) relates to yield(`large`)
    ///
    /// `small` and `large` must be original nodes on opposite sides;
    /// returns `None` otherwise.
    pub fn relation(&self, arena: &NodeArena, small: NodeId, large: NodeId) -> Option<Containment> {
        let small_side = arena.get(small)?.side;
        if arena.get(large)?.side == small_side {
            return None;
        }
        let (holds, supported) = match small_side {
            Side::Left => {
                let cell = self.cell(small, large)?;
                (self.left_in_right[cell], self.left_in_right_supported[cell])
            }
            Side::Right => {
                let cell = self.cell(large, small)?;
                (self.right_in_left[cell], self.right_in_left_supported[cell])
            }
        };
        Some(match (holds, supported) {
            (false, _) => Containment::Violated,
            (true, false) => Containment::Vacuous,
            (true, true) => Containment::Supported,
        })
    }

    /// True when each yield contains the other
    pub fn is_mutual(&self, left: NodeId, right: NodeId) -> bool {
        self.cell(left, right)
            .is_some_and(|cell| self.left_in_right[cell] && self.right_in_left[cell])
    }
}

/// Link every mutually contained pair of internal original nodes
///
/// Returns the number of links that were not present before.
pub fn exact_pass(arena: &mut NodeArena, table: &ContainmentTable) -> Result<usize, AlignError> {
    let left = arena.internal_nodes(Side::Left);
    let right = arena.internal_nodes(Side::Right);
    let mut added = 0;

    for &l in &left {
        for &r in &right {
            if table.is_mutual(l, r) && arena.link(l, r)? {
                trace!(left = l, right = r, "exact match");
                added += 1;
            }
        }
    }

    debug!(links = added, "exact-match pass complete");
    Ok(added)
}
