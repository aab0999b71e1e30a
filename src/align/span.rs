//! Single-node span completion
//!
//! For a node left unmatched by the exact pass, look on the other side for
//! the unique most specific node enclosing its span. If the enclosing node's
//! children contain a gap-free run that covers exactly the pieces of that
//! span, a virtual node grouping the run becomes its counterpart.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::matcher::ContainmentTable;
use crate::tree::{NodeArena, NodeId, Side};
use crate::AlignError;

/// Result of one span-completion phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanOutcome {
    /// Virtual nodes synthesized, in creation order
    pub created: Vec<NodeId>,

    /// Unmatched nodes no exact fit was found for
    pub deferred: Vec<NodeId>,
}

/// Try to complete every unmatched original internal node of both sides
///
/// Both work lists are fixed before any synthesis, and nodes created for one
/// side are never candidates for the other.
pub fn complete_spans(
    arena: &mut NodeArena,
    table: &ContainmentTable,
) -> Result<SpanOutcome, AlignError> {
    let left_todo = unmatched_original(arena, Side::Left);
    let right_todo = unmatched_original(arena, Side::Right);
    let mut outcome = SpanOutcome::default();

    for node in left_todo.into_iter().chain(right_todo) {
        match complete_span(arena, table, node)? {
            Some(created) => outcome.created.push(created),
            None => outcome.deferred.push(node),
        }
    }

    debug!(
        created = outcome.created.len(),
        deferred = outcome.deferred.len(),
        "span completion complete"
    );
    Ok(outcome)
}

/// Try to synthesize one virtual counterpart for `node`
///
/// Returns the new node's id, or `None` when there is no exact fit. Two or
/// more equally specific enclosing candidates also give `None`: there is no
/// tie-break.
pub fn complete_span(
    arena: &mut NodeArena,
    table: &ContainmentTable,
    node: NodeId,
) -> Result<Option<NodeId>, AlignError> {
    let other = arena[node].side.opposite();
    let candidates = table.side(other);

    // Unaligned leaves are contained vacuously and may fill a run.
    let descendants: BTreeSet<NodeId> = candidates
        .iter()
        .copied()
        .filter(|&c| {
            table
                .relation(arena, c, node)
                .is_some_and(|rel| rel.holds())
        })
        .collect();
    let ancestors: BTreeSet<NodeId> = candidates
        .iter()
        .copied()
        .filter(|&c| !arena[c].is_leaf())
        .filter(|&c| {
            table
                .relation(arena, node, c)
                .is_some_and(|rel| rel.holds())
        })
        .collect();

    let pieces = topmost(arena, &descendants);
    let parents = most_specific(arena, &ancestors);

    let parent = match parents.len() {
        1 => parents[0],
        0 => {
            trace!(node, "no enclosing span on the other side");
            return Ok(None);
        }
        n => {
            debug!(node, candidates = n, "ambiguous enclosing span, abstaining");
            return Ok(None);
        }
    };

    let Some(run) = contiguous_run(&arena[parent].children, &pieces) else {
        trace!(node, parent, pieces = pieces.len(), "pieces are not an exact run");
        return Ok(None);
    };

    let created = arena.push_virtual(other, parent, run);
    arena.link(node, created)?;
    debug!(
        node,
        created,
        parent,
        children = ?arena[created].children,
        "span completed with virtual node"
    );
    Ok(Some(created))
}

fn unmatched_original(arena: &NodeArena, side: Side) -> Vec<NodeId> {
    arena
        .internal_nodes(side)
        .into_iter()
        .filter(|&id| arena[id].is_unaligned())
        .collect()
}

/// Members whose parent is not itself a member
fn topmost(arena: &NodeArena, set: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
    set.iter()
        .copied()
        .filter(|&id| arena[id].parent.map_or(true, |p| !set.contains(&p)))
        .collect()
}

/// Members none of whose children is a member
fn most_specific(arena: &NodeArena, set: &BTreeSet<NodeId>) -> Vec<NodeId> {
    set.iter()
        .copied()
        .filter(|&id| !arena[id].children.iter().any(|c| set.contains(c)))
        .collect()
}

/// Trim `children` to the first..last member of `pieces` and accept the run
/// only if it is exactly `pieces` (no extra, no missing, no gap)
fn contiguous_run(children: &[NodeId], pieces: &BTreeSet<NodeId>) -> Option<Vec<NodeId>> {
    let start = children.iter().position(|c| pieces.contains(c))?;
    let end = children.iter().rposition(|c| pieces.contains(c))? + 1;
    let run = &children[start..end];

    (run.len() == pieces.len() && run.iter().all(|c| pieces.contains(c))).then(|| run.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{exact_pass, Containment};
    use crate::codec::read_record;
    use crate::tree::YieldCache;

    fn prepared(text: &str) -> (NodeArena, ContainmentTable) {
        let mut arena = read_record(text).unwrap();
        let mut cache = YieldCache::new();
        let table = ContainmentTable::build(&arena, &mut cache);
        exact_pass(&mut arena, &table).unwrap();
        (arena, table)
    }

    #[test]
    fn test_contiguous_run_trims_edges_only() {
        let pieces = BTreeSet::from([2, 3]);
        assert_eq!(contiguous_run(&[1, 2, 3, 4], &pieces), Some(vec![2, 3]));
        assert_eq!(contiguous_run(&[2, 1, 3], &pieces), None);
        assert_eq!(contiguous_run(&[2, 4], &pieces), None);
        assert_eq!(contiguous_run(&[1, 4], &BTreeSet::new()), None);
    }

    #[test]
    fn test_completes_partial_span_under_single_parent() {
        // L0 [1 4], L1 [2 3]; R5 [6 7 8]; L2-R6 L3-R7 L4-R8
        let (mut arena, table) =
            prepared("9\nL0 [1 4] L1 [2 3] L2 (6) L3 (7) L4 (8) R5 [6 7 8] R6 R7 R8\n");
        assert!(arena[1].is_unmatched());

        let outcome = complete_spans(&mut arena, &table).unwrap();
        assert_eq!(outcome.created, vec![9]);
        assert!(outcome.deferred.is_empty());

        let created = &arena[9];
        assert!(created.is_virtual());
        assert_eq!(created.side, Side::Right);
        assert_eq!(created.parent, Some(5));
        assert_eq!(created.children, vec![6, 7]);
        assert!(arena[1].alignment.contains(&9));
        arena.validate().unwrap();
    }

    #[test]
    fn test_unaligned_leaf_inside_run_is_grouped() {
        // R5 [6 7 8 9]: R7 has no link and sits between L1's two pieces
        let (mut arena, table) =
            prepared("10\nL0 [1 4] L1 [2 3] L2 (6) L3 (8) L4 (9) R5 [6 7 8 9] R6 R7 R8 R9\n");
        assert!(arena[1].is_unmatched());
        assert_eq!(table.relation(&arena, 7, 1), Some(Containment::Vacuous));

        let outcome = complete_spans(&mut arena, &table).unwrap();
        assert_eq!(outcome.created, vec![10]);
        assert_eq!(arena[10].parent, Some(5));
        assert_eq!(arena[10].children, vec![6, 7, 8]);
        assert!(arena.is_fully_aligned());
        arena.validate().unwrap();
    }

    #[test]
    fn test_two_enclosing_candidates_abstain() {
        // L2 and L3 each link into both R5 [6 7 11] and R8 [9 10 13]
        let (mut arena, table) = prepared(
            "14\nL0 [1 4] L1 [2 3] L2 (6 9) L3 (7 10) L4 (11 13) \
             R5 [6 7 11] R6 R7 R8 [9 10 13] R9 R10 R11 R12 [5 8] R13\n",
        );
        assert!(arena[1].is_unmatched());
        assert_eq!(table.relation(&arena, 1, 5), Some(Containment::Supported));
        assert_eq!(table.relation(&arena, 1, 8), Some(Containment::Supported));

        let before = arena.len();
        assert_eq!(complete_span(&mut arena, &table, 1).unwrap(), None);
        assert_eq!(arena.len(), before);
        assert!(arena[1].is_unmatched());
    }

    #[test]
    fn test_gap_in_run_defers() {
        // R5 [6 7 8]: the middle child links outside L1's span
        let (mut arena, table) =
            prepared("10\nL0 [1 4] L1 [2 3] L2 (6) L3 (8) L4 (7) R5 [6 7 8] R6 R7 R8 R9\n");
        assert!(arena[1].is_unmatched());

        let outcome = complete_spans(&mut arena, &table).unwrap();
        assert!(outcome.created.is_empty());
        assert_eq!(outcome.deferred, vec![1]);
        assert_eq!(arena.len(), 10);
    }
}
