//! Tree pair storage
//!
//! One [`NodeArena`] per tree pair holds both sides: the Left tree, the
//! Right tree, and every virtual node synthesized while aligning them.
//! Nodes are addressed by id; yields are derived on demand.

mod arena;
mod node;
mod traversal;

pub use arena::{ArenaBuilder, NodeArena};
pub use node::{Node, NodeId, Origin, Side};
pub use traversal::{compute_yield, Yield, YieldCache};

/// Roots of one side (original nodes without a parent)
pub fn roots(arena: &NodeArena, side: Side) -> Vec<NodeId> {
    arena
        .nodes_on(side)
        .filter(|n| n.origin == Origin::Original && n.parent.is_none())
        .map(|n| n.id)
        .collect()
}
