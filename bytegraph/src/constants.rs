//! Advisory limits surfaced to callers.
//!
//! The engine itself never enforces a size cap; rendering front-ends are
//! expected to consult [`crate::cfg::GraphSize`] before laying out very
//! large graphs and warn past these thresholds.

/// Node count above which a graph is considered too large to display comfortably.
pub const NODE_WARN_THRESHOLD: usize = 2_500;

/// Edge count above which a graph is considered too large to display comfortably.
pub const EDGE_WARN_THRESHOLD: usize = 1_000;
