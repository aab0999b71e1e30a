//! Alignment predicate and yield containment
//!
//! A node is consistent with a target leaf set when it has no links at all
//! (no evidence against) or when at least one link lands in the set.
//! Containment lifts this to yields: every leaf of the smaller yield must be
//! consistent with the larger one.

use crate::tree::{NodeArena, NodeId, Yield};

/// What a single node's links say about a target set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    /// Node has no links, so nothing speaks against the target
    Unconstrained,

    /// At least one link lands inside the target
    Linked,

    /// Node has links, none of them inside the target
    Conflicting,
}

/// Outcome of a yield containment test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// Some leaf links only outside the larger yield
    Violated,

    /// Holds, but only because no leaf has any link
    Vacuous,

    /// Holds and at least one leaf links into the larger yield
    Supported,
}

impl Containment {
    /// True for both vacuous and supported containment
    #[inline]
    pub fn holds(self) -> bool {
        self != Containment::Violated
    }

    /// True only when backed by at least one real link
    #[inline]
    pub fn is_supported(self) -> bool {
        self == Containment::Supported
    }
}

/// Classify `node`'s links against `target`
pub fn evidence(arena: &NodeArena, node: NodeId, target: &Yield) -> Evidence {
    let links = &arena[node].alignment;
    if links.is_empty() {
        Evidence::Unconstrained
    } else if links.iter().any(|a| target.contains(a)) {
        Evidence::Linked
    } else {
        Evidence::Conflicting
    }
}

/// Is `node` compatible with `target`
///
/// An unconstrained node is vacuously compatible with anything.
#[inline]
pub fn consistent_with(arena: &NodeArena, node: NodeId, target: &Yield) -> bool {
    evidence(arena, node, target) != Evidence::Conflicting
}

/// Full containment test of `small` in `large`
pub fn containment(arena: &NodeArena, small: &Yield, large: &Yield) -> Containment {
    let mut linked = false;
    for &leaf in small {
        match evidence(arena, leaf, large) {
            Evidence::Conflicting => return Containment::Violated,
            Evidence::Linked => linked = true,
            Evidence::Unconstrained => {}
        }
    }
    if linked {
        Containment::Supported
    } else {
        Containment::Vacuous
    }
}

/// Does every leaf of `small` align toward `large`
#[inline]
pub fn contains(arena: &NodeArena, small: &Yield, large: &Yield) -> bool {
    containment(arena, small, large).holds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::read_record;
    use test_case::test_case;

    // L0 [1 2] with L1 linked to R5; R3 [4 5 6]; L2, R4, R6 unaligned
    fn pair() -> NodeArena {
        read_record("7\nL0 [1 2] L1 (5) L2 R3 [4 5 6] R4 R5 R6\n").unwrap()
    }

    #[test_case(1, &[4, 5, 6], Evidence::Linked ; "link inside target")]
    #[test_case(1, &[4, 6], Evidence::Conflicting ; "link outside target")]
    #[test_case(2, &[4, 5, 6], Evidence::Unconstrained ; "no links")]
    #[test_case(2, &[], Evidence::Unconstrained ; "no links empty target")]
    fn test_evidence(node: NodeId, target: &[NodeId], expected: Evidence) {
        let arena = pair();
        let target: Yield = target.iter().copied().collect();
        assert_eq!(evidence(&arena, node, &target), expected);
        assert_eq!(
            consistent_with(&arena, node, &target),
            expected != Evidence::Conflicting
        );
    }

    #[test]
    fn test_containment_distinguishes_vacuous() {
        let arena = pair();
        let left = Yield::from([1, 2]);
        let right = Yield::from([4, 5, 6]);

        assert_eq!(containment(&arena, &left, &right), Containment::Supported);
        assert_eq!(
            containment(&arena, &Yield::from([2]), &right),
            Containment::Vacuous
        );
        assert_eq!(
            containment(&arena, &left, &Yield::from([4, 6])),
            Containment::Violated
        );
        assert!(contains(&arena, &Yield::from([4, 6]), &left));
        assert!(!contains(&arena, &Yield::from([5]), &Yield::from([2])));
    }
}
