//! Segment partitioning for partially corresponding node pairs
//!
//! Child positions of an unmatched left node and an unmatched right node are
//! linked wherever a left child aligns to a right child. The links are split
//! into maximal runs that are contiguous on both sides, and each run with
//! enough real links yields one virtual node pair.
//!
//! Unaligned leaf children become markers: they bridge a one-position gap on
//! their own side but never widen a run's range.

use std::ops::RangeInclusive;

use tracing::{debug, trace};

use crate::tree::{NodeArena, NodeId, Side};
use crate::AlignError;

/// Default minimum number of real links per segment
pub const MIN_SEGMENT_LINKS: usize = 2;

/// One position-link record
///
/// Both positions set = real link; one side `None` = unaligned-leaf marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionLink {
    /// Position among the left node's children
    pub left: Option<usize>,

    /// Position among the right node's children
    pub right: Option<usize>,
}

impl PositionLink {
    /// Link between left position `i` and right position `j`
    pub fn real(i: usize, j: usize) -> Self {
        Self {
            left: Some(i),
            right: Some(j),
        }
    }

    /// Unaligned leaf at `position` on `side`
    pub fn marker(side: Side, position: usize) -> Self {
        match side {
            Side::Left => Self {
                left: Some(position),
                right: None,
            },
            Side::Right => Self {
                left: None,
                right: Some(position),
            },
        }
    }

    /// True when both positions are set
    #[inline]
    pub fn is_real(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Position on `side`
    #[inline]
    pub fn position(&self, side: Side) -> Option<usize> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Records gathered for one node pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    /// Real links and markers, left-derived records first
    pub links: Vec<PositionLink>,

    /// Number of real links
    pub real: usize,
}

/// A run of records contiguous on both sides
///
/// Records are kept sorted, so equal segments compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Segment {
    links: Vec<PositionLink>,
}

impl Segment {
    fn new(mut links: Vec<PositionLink>) -> Self {
        links.sort_unstable();
        links.dedup();
        Self { links }
    }

    /// Records in this segment
    pub fn links(&self) -> &[PositionLink] {
        &self.links
    }

    /// Number of real links (markers excluded)
    pub fn real_links(&self) -> usize {
        self.links.iter().filter(|l| l.is_real()).count()
    }

    /// Inclusive child-position range on `side`, spanned by real links only
    pub fn range(&self, side: Side) -> Option<RangeInclusive<usize>> {
        let mut positions = self
            .links
            .iter()
            .filter(|l| l.is_real())
            .filter_map(|l| l.position(side));
        let first = positions.next()?;
        let (min, max) = positions.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(min..=max)
    }
}

/// Gather the position-link records for `(left, right)`
///
/// - left child that is an unaligned leaf: one left marker
/// - otherwise: one real link per alignment partner among `right`'s children
/// - right child that is an unaligned leaf: one right marker
pub fn collect_links(arena: &NodeArena, left: NodeId, right: NodeId) -> LinkSet {
    let right_children = &arena[right].children;
    let mut set = LinkSet::default();

    for (i, &child) in arena[left].children.iter().enumerate() {
        let node = &arena[child];
        if node.is_leaf() && node.is_unaligned() {
            set.links.push(PositionLink::marker(Side::Left, i));
            continue;
        }
        for &partner in &node.alignment {
            if let Some(j) = right_children.iter().position(|&c| c == partner) {
                set.links.push(PositionLink::real(i, j));
                set.real += 1;
            }
        }
    }

    for (j, &child) in right_children.iter().enumerate() {
        let node = &arena[child];
        if node.is_leaf() && node.is_unaligned() {
            set.links.push(PositionLink::marker(Side::Right, j));
        }
    }

    set
}

/// Split `links` into maximal segments contiguous on both sides
///
/// Alternates a left-position split and a right-position split, dropping
/// segments with fewer than `min_links` real links after each split, until
/// the grouping stops changing.
pub fn partition_links(links: &[PositionLink], min_links: usize) -> Vec<Segment> {
    let initial = Segment::new(links.to_vec());
    if initial.real_links() < min_links {
        return Vec::new();
    }

    let mut segments = vec![initial];
    loop {
        let before = segments.clone();
        for axis in [Side::Left, Side::Right] {
            segments = segments
                .into_iter()
                .flat_map(|segment| split_on(segment, axis))
                .filter(|segment| segment.real_links() >= min_links)
                .collect();
            segments.sort();
        }
        if segments == before {
            return segments;
        }
    }
}

/// Split one segment where positions on `axis` jump by more than one
///
/// Markers of the other side carry no `axis` position; each one stays with
/// the first group holding a record adjacent to it on its own side, and is
/// dropped if there is none.
fn split_on(segment: Segment, axis: Side) -> Vec<Segment> {
    let cross = axis.opposite();
    let (mut on_axis, off_axis): (Vec<_>, Vec<_>) = segment
        .links
        .into_iter()
        .partition(|l| l.position(axis).is_some());
    on_axis.sort_unstable_by_key(|l| (l.position(axis), l.position(cross)));

    let mut groups: Vec<Vec<PositionLink>> = Vec::new();
    let mut last = None;
    for link in on_axis {
        let pos = link.position(axis);
        match (last, groups.last_mut()) {
            (Some(prev), Some(group)) if pos.is_some_and(|p| p <= prev + 1) => group.push(link),
            _ => groups.push(vec![link]),
        }
        last = pos;
    }

    for marker in off_axis {
        let Some(j) = marker.position(cross) else {
            continue;
        };
        let home = groups.iter_mut().find(|group| {
            group
                .iter()
                .any(|l| l.position(cross).is_some_and(|p| p.abs_diff(j) <= 1))
        });
        if let Some(group) = home {
            group.push(marker);
        }
    }

    groups.into_iter().map(Segment::new).collect()
}

/// Partition one `(left, right)` pair and synthesize its virtual pairs
///
/// Returns the `(left, right)` ids of the created nodes. A segment covering
/// all children of both nodes is skipped, since it would only restate the
/// pair itself.
pub fn partition_pair(
    arena: &mut NodeArena,
    left: NodeId,
    right: NodeId,
    min_links: usize,
) -> Result<Vec<(NodeId, NodeId)>, AlignError> {
    if arena[left].side != Side::Left || arena[right].side != Side::Right {
        return Err(AlignError::InvalidPair { left, right });
    }

    let set = collect_links(arena, left, right);
    if set.real < min_links {
        trace!(left, right, real = set.real, "too few links, pair abandoned");
        return Ok(Vec::new());
    }

    let mut created = Vec::new();
    for segment in partition_links(&set.links, min_links) {
        let (Some(lrange), Some(rrange)) = (segment.range(Side::Left), segment.range(Side::Right))
        else {
            continue;
        };

        let left_children = arena[left].children[lrange.clone()].to_vec();
        let right_children = arena[right].children[rrange.clone()].to_vec();
        if left_children.len() == arena[left].children.len()
            && right_children.len() == arena[right].children.len()
        {
            trace!(left, right, "segment spans both nodes entirely, skipped");
            continue;
        }

        let vl = arena.push_virtual(Side::Left, left, left_children);
        let vr = arena.push_virtual(Side::Right, right, right_children);
        arena.link(vl, vr)?;
        debug!(
            left,
            right,
            virtual_left = vl,
            virtual_right = vr,
            left_range = ?lrange,
            right_range = ?rrange,
            "segment synthesized"
        );
        created.push((vl, vr));
    }

    Ok(created)
}

/// Run [`partition_pair`] once over every pair of unmatched original
/// internal nodes, in id order
pub fn partition_unresolved(
    arena: &mut NodeArena,
    min_links: usize,
) -> Result<Vec<(NodeId, NodeId)>, AlignError> {
    let unmatched = |arena: &NodeArena, side: Side| -> Vec<NodeId> {
        arena
            .internal_nodes(side)
            .into_iter()
            .filter(|&id| arena[id].is_unaligned())
            .collect()
    };
    let left = unmatched(arena, Side::Left);
    let right = unmatched(arena, Side::Right);

    let mut created = Vec::new();
    for &l in &left {
        for &r in &right {
            created.extend(partition_pair(arena, l, r, min_links)?);
        }
    }

    debug!(pairs = created.len(), "segment partitioning complete");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{exact_pass, ContainmentTable};
    use crate::codec::read_record;
    use crate::tree::YieldCache;

    fn real(i: usize, j: usize) -> PositionLink {
        PositionLink::real(i, j)
    }

    #[test]
    fn test_right_split_separates_runs() {
        let links = [real(0, 0), real(1, 1), real(2, 3), real(3, 4)];
        let segments = partition_links(&links, MIN_SEGMENT_LINKS);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].range(Side::Left), Some(0..=1));
        assert_eq!(segments[0].range(Side::Right), Some(0..=1));
        assert_eq!(segments[1].range(Side::Left), Some(2..=3));
        assert_eq!(segments[1].range(Side::Right), Some(3..=4));
    }

    #[test]
    fn test_discarding_reaches_fixed_point() {
        let links = [real(0, 0), real(1, 1), real(2, 5), real(3, 3)];
        let segments = partition_links(&links, MIN_SEGMENT_LINKS);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].real_links(), 2);
        assert_eq!(segments[0].range(Side::Left), Some(0..=1));
    }

    #[test]
    fn test_markers_bridge_but_do_not_extend() {
        let bridged = [
            real(0, 0),
            PositionLink::marker(Side::Left, 1),
            real(2, 2),
            PositionLink::marker(Side::Right, 1),
            PositionLink::marker(Side::Left, 3),
        ];
        let segments = partition_links(&bridged, MIN_SEGMENT_LINKS);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].range(Side::Left), Some(0..=2));
        assert_eq!(segments[0].range(Side::Right), Some(0..=2));

        let gapped = [real(0, 0), real(2, 2)];
        assert!(partition_links(&gapped, MIN_SEGMENT_LINKS).is_empty());
    }

    #[test]
    fn test_single_link_pair_is_abandoned() {
        // L0 [1 2 3] with only L1-R5; everything else unaligned
        let mut arena = read_record("8\nL0 [1 2 3] L1 (5) L2 L3 R4 [5 6 7] R5 R6 R7\n").unwrap();
        let set = collect_links(&arena, 0, 4);
        assert_eq!(set.real, 1);
        assert_eq!(set.links.len(), 5);

        let created = partition_pair(&mut arena, 0, 4, MIN_SEGMENT_LINKS).unwrap();
        assert!(created.is_empty());
        assert_eq!(arena.len(), 8);
    }

    #[test]
    fn test_pair_yields_one_virtual_pair_per_run() {
        // L0 [1..5] and R6 [7..11]; the middle children link elsewhere
        let text = "14\nL0 [1 2 3 4 5] L1 (7) L2 (8) L3 (12) L4 (10) L5 (11) \
                    R6 [7 8 9 10 11] R7 R8 R9 (13) R10 R11 R12 L13\n";
        let mut arena = read_record(text).unwrap();

        let created = partition_pair(&mut arena, 0, 6, MIN_SEGMENT_LINKS).unwrap();
        assert_eq!(created, vec![(14, 15), (16, 17)]);
        assert_eq!(arena[14].children, vec![1, 2]);
        assert_eq!(arena[15].children, vec![7, 8]);
        assert_eq!(arena[16].children, vec![4, 5]);
        assert_eq!(arena[17].children, vec![10, 11]);
        assert_eq!(arena[14].parent, Some(0));
        assert_eq!(arena[17].parent, Some(6));
        assert!(arena[14].alignment.contains(&15));
        arena.validate().unwrap();

        assert!(matches!(
            partition_pair(&mut arena, 6, 0, MIN_SEGMENT_LINKS),
            Err(AlignError::InvalidPair { left: 6, right: 0 })
        ));
    }

    #[test]
    fn test_segment_covering_both_nodes_is_skipped() {
        // L1 is seeded to R6, so L0 [1 2] and R5 [6 7] link child for child
        // even though L1's leaves link under R8
        let text = "12\nL0 [1 2] L1 [3 4] (6) L2 (7) L3 (9) L4 (10) \
                    R5 [6 7] R6 [11] R7 R8 [9 10] R9 R10 R11\n";
        let mut arena = read_record(text).unwrap();
        let mut cache = YieldCache::new();
        let table = ContainmentTable::build(&arena, &mut cache);
        exact_pass(&mut arena, &table).unwrap();
        assert!(!table.is_mutual(0, 5));
        assert!(arena[0].is_unmatched() && arena[5].is_unmatched());

        let set = collect_links(&arena, 0, 5);
        assert_eq!(set.real, 2);
        let segments = partition_links(&set.links, MIN_SEGMENT_LINKS);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].range(Side::Left), Some(0..=1));
        assert_eq!(segments[0].range(Side::Right), Some(0..=1));

        let created = partition_unresolved(&mut arena, MIN_SEGMENT_LINKS).unwrap();
        assert!(created.is_empty());
        assert_eq!(arena.len(), 12);
    }
}
