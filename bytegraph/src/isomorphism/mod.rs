//! Unordered subtree-isomorphism matching between two rooted trees.
//!
//! Four variants share one canonicalization (see [`crate::tree::shape`])
//! and differ in matching discipline: the exact variants accept a node
//! pair only when all of its children pair off perfectly, while the
//! maximum-common variants settle for the largest partial pairing. The
//! absence of structure is always a return value, never an error; the
//! only matcher error is a malformed input tree.

mod bottom_up;
mod max_common;
mod top_down;


use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::cfg::NodeId;
use crate::tree::RootedTree;

/// Matcher-level structural precondition violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidTree {
    /// A node reachable through more than one parent.
    #[error("node {0:?} is reachable through more than one parent")]
    DuplicateParent(NodeId),
    /// Tree edges form a cycle.
    #[error("tree edges form a cycle through node {0:?}")]
    Cycle(NodeId),
    /// The root has an incoming tree edge.
    #[error("root {0:?} has an incoming tree edge")]
    ParentedRoot(NodeId),
}

/// A partial injective mapping from nodes of the left tree to nodes of
/// the right tree. Every key and every value appears at most once.
#[derive(Debug, Clone, Default)]
pub struct NodeCorrespondence {
    forward: FxHashMap<NodeId, NodeId>,
    reverse: FxHashMap<NodeId, NodeId>,
}

impl NodeCorrespondence {
    /// Creates an empty correspondence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pair. Returns `false` (and records nothing) when either
    /// endpoint is already mapped, preserving injectivity.
    pub fn insert(&mut self, left: NodeId, right: NodeId) -> bool {
        if self.forward.contains_key(&left) || self.reverse.contains_key(&right) {
            return false;
        }
        self.forward.insert(left, right);
        self.reverse.insert(right, left);
        true
    }

    /// Number of matched pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether no pair has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// The right-tree node a left-tree node is paired with.
    #[must_use]
    pub fn right_of(&self, left: NodeId) -> Option<NodeId> {
        self.forward.get(&left).copied()
    }

    /// The left-tree node a right-tree node is paired with.
    #[must_use]
    pub fn left_of(&self, right: NodeId) -> Option<NodeId> {
        self.reverse.get(&right).copied()
    }

    /// All pairs, unordered.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.forward.iter().map(|(&l, &r)| (l, r))
    }

    /// All pairs sorted by left node id; the deterministic listing for
    /// consumers and tests.
    #[must_use]
    pub fn sorted_pairs(&self) -> Vec<(NodeId, NodeId)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_unstable();
        pairs
    }
}

/// Result of one matcher invocation.
///
/// The two empty outcomes are distinct variants rather than one nullable
/// value: [`MatchOutcome::LeftTreeLarger`] means an injective map is
/// structurally impossible, [`MatchOutcome::NoMatch`] means the matcher
/// ran and found nothing.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// A correspondence was found.
    Matched(NodeCorrespondence),
    /// The matcher ran to completion without finding a correspondence.
    NoMatch,
    /// The left tree has strictly more nodes than the right tree, so an
    /// exact match cannot exist.
    LeftTreeLarger,
}

impl MatchOutcome {
    /// Number of matched pairs; zero for both empty outcomes.
    #[must_use]
    pub fn matched_count(&self) -> usize {
        match self {
            Self::Matched(map) => map.len(),
            Self::NoMatch | Self::LeftTreeLarger => 0,
        }
    }

    /// The correspondence, if one was found.
    #[must_use]
    pub const fn correspondence(&self) -> Option<&NodeCorrespondence> {
        match self {
            Self::Matched(map) => Some(map),
            Self::NoMatch | Self::LeftTreeLarger => None,
        }
    }
}

/// Traversal direction of a matcher variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Pair from the roots down.
    #[default]
    TopDown,
    /// Grow shape classes from the leaves up.
    BottomUp,
}

/// Matching discipline of a matcher variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Discipline {
    /// All children of a pair must pair; one unmatched child voids the
    /// pair.
    #[default]
    Exact,
    /// Maximize total matched pairs, accepting partial child pairings.
    MaximumCommon,
}

/// Selects one of the four matcher variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Traversal direction.
    pub direction: Direction,
    /// Matching discipline.
    pub discipline: Discipline,
}

/// Computes a node correspondence between two rooted unordered trees.
///
/// Both trees are validated first; a node with two parents, a tree-edge
/// cycle, or a parented root fails with [`InvalidTree`]. The
/// maximum-common disciplines never return fewer matched pairs than their
/// exact counterpart on the same input.
pub fn compare(
    left: &RootedTree,
    right: &RootedTree,
    config: MatchConfig,
) -> Result<MatchOutcome, InvalidTree> {
    validate(left)?;
    validate(right)?;
    let outcome = match (config.direction, config.discipline) {
        (Direction::TopDown, Discipline::Exact) => top_down::match_exact(left, right),
        (Direction::BottomUp, Discipline::Exact) => bottom_up::match_exact(left, right),
        (Direction::TopDown, Discipline::MaximumCommon) => max_common::match_top_down(left, right),
        (Direction::BottomUp, Discipline::MaximumCommon) => {
            max_common::match_bottom_up(left, right)
        }
    };
    debug!(
        direction = ?config.direction,
        discipline = ?config.discipline,
        pairs = outcome.matched_count(),
        "tree comparison complete"
    );
    Ok(outcome)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Checks the matcher's structural preconditions on the part of the
/// graph the root reaches.
fn validate(tree: &RootedTree) -> Result<(), InvalidTree> {
    let graph = tree.graph();
    let root = tree.root();
    let mut color = vec![Color::White; graph.node_count()];
    let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
    color[root.0] = Color::Gray;
    loop {
        let Some(frame) = stack.last_mut() else { break };
        let node = frame.0;
        let out = graph.outgoing(node);
        if frame.1 == out.len() {
            color[node.0] = Color::Black;
            stack.pop();
            continue;
        }
        let target = graph.edge(out[frame.1]).target;
        frame.1 += 1;
        match color[target.0] {
            Color::White => {
                color[target.0] = Color::Gray;
                stack.push((target, 0));
            }
            // An edge back onto the DFS stack closes a cycle; an edge to
            // a finished node gives it a second parent.
            Color::Gray => return Err(InvalidTree::Cycle(target)),
            Color::Black => return Err(InvalidTree::DuplicateParent(target)),
        }
    }
    // Edges out of unreachable nodes can still parent the root or a
    // reachable node.
    for edge in graph.edges() {
        if color[edge.source.0] == Color::White {
            if edge.target == root {
                return Err(InvalidTree::ParentedRoot(root));
            }
            if color[edge.target.0] != Color::White {
                return Err(InvalidTree::DuplicateParent(edge.target));
            }
        }
    }
    Ok(())
}
