//! Alignment inference over one tree pair
//!
//! Phases, in order:
//! 1. **Exact match**: link internal nodes whose yields contain each other
//! 2. **Span completion**: give an unmatched node a single virtual counterpart
//! 3. **Segment partitioning**: split partially corresponding pairs into
//!    contiguous runs, one virtual pair per run

mod matcher;
mod predicate;
mod segment;
mod span;

pub use matcher::{exact_pass, ContainmentTable};
pub use predicate::{consistent_with, containment, contains, evidence, Containment, Evidence};
pub use segment::{
    collect_links, partition_links, partition_pair, partition_unresolved, LinkSet, PositionLink,
    Segment, MIN_SEGMENT_LINKS,
};
pub use span::{complete_span, complete_spans, SpanOutcome};
