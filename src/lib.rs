//! # Constituency Tree Pair Alignment
//!
//! This library aligns a pair of parallel constituency trees (Left and
//! Right, e.g. source and target parses in a rule-based translation
//! pipeline) using the word alignment seeded on their leaves.
//!
//! ## Core Algorithm
//!
//! 1. **Yields**: every node spans a set of leaves
//! 2. **Exact match**: internal nodes whose yields contain each other,
//!    through the leaf links, are aligned
//! 3. **Span completion**: an unmatched node whose span is an exact run of
//!    children under a unique enclosing node gets a virtual counterpart
//! 4. **Segment partitioning**: partially corresponding pairs are split into
//!    runs contiguous on both sides, each run becoming a virtual node pair
//!
//! Result: every span with enough evidence has a counterpart on the other
//! side. Alignment is best-effort; unresolved nodes are a normal outcome.
//!
//! ## Usage Example
//!
//! ```
//! use treealign::{codec, AlignerConfig, TreeAligner};
//!
//! let mut pair = codec::read_record("6\nL0 [1 2] L1 (4) L2 (5) R3 [4 5] R4 R5\n")?;
//! let aligner = TreeAligner::new(AlignerConfig::default())?;
//! let report = aligner.align(&mut pair)?;
//! assert_eq!(report.exact_links, 1);
//! assert_eq!(codec::render_record(&pair), "0 ( 3 ) 3 ( 0 ) \n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

// Core modules - each implements one stage of the pipeline
pub mod align; // Containment, span completion, segment partitioning
pub mod codec; // Stream format reader/writer
pub mod tree; // Node arena and yields

// Re-exports for convenience
pub use align::{Containment, ContainmentTable, Evidence, MIN_SEGMENT_LINKS};
pub use codec::{DecodeError, TreeReader};
pub use tree::{Node, NodeArena, NodeId, Origin, Side, Yield, YieldCache};

use thiserror::Error;
use tracing::{debug, info};

/// Configuration parameters for alignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignerConfig {
    /// Synthesize single virtual counterparts for unmatched nodes
    pub span_completion: bool,

    /// Split partially corresponding pairs into virtual node pairs
    pub segment_partitioning: bool,

    /// Real links a segment needs to be kept (at least 2)
    pub min_segment_links: usize,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            span_completion: true,
            segment_partitioning: true,
            min_segment_links: MIN_SEGMENT_LINKS,
        }
    }
}

impl AlignerConfig {
    /// Only run the exact-match pass, never synthesize nodes
    pub fn exact_only() -> Self {
        Self {
            span_completion: false,
            segment_partitioning: false,
            ..Self::default()
        }
    }

    /// Enable or disable span completion
    pub fn with_span_completion(mut self, enabled: bool) -> Self {
        self.span_completion = enabled;
        self
    }

    /// Enable or disable segment partitioning
    pub fn with_segment_partitioning(mut self, enabled: bool) -> Self {
        self.segment_partitioning = enabled;
        self
    }

    /// Set the real-link threshold for segments
    pub fn with_min_segment_links(mut self, links: usize) -> Self {
        self.min_segment_links = links;
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), AlignError> {
        if self.min_segment_links < MIN_SEGMENT_LINKS {
            return Err(AlignError::InvalidConfig(format!(
                "min_segment_links must be at least {}, got {}",
                MIN_SEGMENT_LINKS, self.min_segment_links
            )));
        }
        Ok(())
    }
}

/// Summary of one tree pair's alignment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct AlignmentReport {
    /// Links added by the exact-match pass
    pub exact_links: usize,

    /// Virtual nodes created by span completion
    pub completed: Vec<NodeId>,

    /// Virtual `(left, right)` pairs created by segment partitioning
    pub virtual_pairs: Vec<(NodeId, NodeId)>,

    /// Internal nodes still without any link
    pub unresolved: Vec<NodeId>,
}

impl AlignmentReport {
    /// Number of virtual nodes synthesized
    pub fn virtual_nodes(&self) -> usize {
        self.completed.len() + 2 * self.virtual_pairs.len()
    }

    /// True when every internal node ended up aligned
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Errors raised by structurally invalid tree pairs or configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// Id outside the range declared by the record header
    #[error("node {id} outside declared range 0..{declared}")]
    NodeOutOfRange {
        /// Offending id
        id: NodeId,
        /// Declared node count
        declared: usize,
    },

    /// Same id specified twice
    #[error("node {id} specified more than once")]
    DuplicateNode {
        /// Offending id
        id: NodeId,
    },

    /// Declared id never specified
    #[error("node {id} declared but never specified")]
    MissingNode {
        /// Missing id
        id: NodeId,
    },

    /// Child id that does not name a node
    #[error("node {parent} lists unknown child {child}")]
    ChildOutOfRange {
        /// Listing node
        parent: NodeId,
        /// Unknown child
        child: NodeId,
    },

    /// Child on the other side of the pair
    #[error("node {parent} lists child {child} from the other tree")]
    SideMismatch {
        /// Listing node
        parent: NodeId,
        /// Child on the other side
        child: NodeId,
    },

    /// Child listed by two parents
    #[error("node {node} has more than one parent")]
    MultipleParents {
        /// Shared child
        node: NodeId,
    },

    /// Parent pointer and children list disagree
    #[error("parent and children of node {node} disagree")]
    ParentMismatch {
        /// Node whose links disagree
        node: NodeId,
    },

    /// Node is its own ancestor
    #[error("cycle through node {node}")]
    Cycle {
        /// Node on the cycle
        node: NodeId,
    },

    /// Alignment partner that does not name a node
    #[error("node {node} aligned to unknown node {partner}")]
    LinkOutOfRange {
        /// Linked node
        node: NodeId,
        /// Unknown partner
        partner: NodeId,
    },

    /// Alignment between two nodes of the same tree
    #[error("nodes {a} and {b} are on the same side and cannot be aligned")]
    SameSideLink {
        /// First node
        a: NodeId,
        /// Second node
        b: NodeId,
    },

    /// Link present in one direction only
    #[error("node {node} links to {partner} without the reverse link")]
    AsymmetricLink {
        /// Linking node
        node: NodeId,
        /// Partner missing the reverse link
        partner: NodeId,
    },

    /// Virtual children are not a contiguous run of the parent's children
    #[error("virtual node {node} does not group a contiguous run of its parent's children")]
    VirtualNotContiguous {
        /// Virtual node
        node: NodeId,
    },

    /// Partition requested for a pair that is not (left, right)
    #[error("nodes ({left}, {right}) are not a left/right pair")]
    InvalidPair {
        /// Expected left node
        left: NodeId,
        /// Expected right node
        right: NodeId,
    },

    /// Configuration out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Main alignment orchestrator
///
/// Runs the phases over one tree pair at a time; holds no per-pair state.
#[derive(Debug, Clone)]
pub struct TreeAligner {
    config: AlignerConfig,
}

impl TreeAligner {
    /// Create aligner after checking the configuration
    pub fn new(config: AlignerConfig) -> Result<Self, AlignError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Align one tree pair in place
    ///
    /// This is the main entry point that orchestrates:
    /// 1. Containment table over all original nodes
    /// 2. Exact-match pass
    /// 3. Span completion (if enabled)
    /// 4. Segment partitioning of what is still unmatched (if enabled)
    ///
    /// Only original nodes are ever matched, so running again on a fully
    /// aligned pair changes nothing.
    pub fn align(&self, arena: &mut NodeArena) -> Result<AlignmentReport, AlignError> {
        let mut cache = YieldCache::new();
        let table = ContainmentTable::build(arena, &mut cache);

        let mut report = AlignmentReport {
            exact_links: align::exact_pass(arena, &table)?,
            ..AlignmentReport::default()
        };

        if self.config.span_completion {
            report.completed = align::complete_spans(arena, &table)?.created;
        }

        if self.config.segment_partitioning {
            report.virtual_pairs =
                align::partition_unresolved(arena, self.config.min_segment_links)?;
        }

        report.unresolved = arena.unaligned_internal();
        debug_assert!(arena.validate().is_ok(), "alignment broke an arena invariant");

        if report.is_complete() {
            debug!(
                nodes = arena.len(),
                virtual_nodes = report.virtual_nodes(),
                "tree pair fully aligned"
            );
        } else {
            info!(
                nodes = arena.len(),
                virtual_nodes = report.virtual_nodes(),
                unresolved = ?report.unresolved,
                "tree pair partially aligned"
            );
        }
        Ok(report)
    }
}
