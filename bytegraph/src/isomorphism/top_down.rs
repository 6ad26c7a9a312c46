//! Exact top-down matching.

use tracing::trace;

use crate::cfg::NodeId;
use crate::tree::shape::{compute_shapes, ShapeInterner};
use crate::tree::RootedTree;

use super::{MatchOutcome, NodeCorrespondence};

/// Pairs the two trees from the roots down.
///
/// A child of the left tree pairs with a still-unpaired child of the
/// right tree sharing its canonical shape, ties broken by original edge
/// order; the matcher then recurses into each paired pair. One unmatched
/// child anywhere voids the whole result: the exact discipline accepts
/// precisely the fully isomorphic case.
pub(super) fn match_exact(left: &RootedTree, right: &RootedTree) -> MatchOutcome {
    // An injective map of a larger left tree cannot exist; this is the
    // "structurally impossible" fast path, distinct from running and
    // finding nothing.
    if left.node_count() > right.node_count() {
        return MatchOutcome::LeftTreeLarger;
    }
    if left.node(left.root()).kind != right.node(right.root()).kind {
        return MatchOutcome::NoMatch;
    }

    let mut interner = ShapeInterner::new();
    let left_shapes = compute_shapes(left, &mut interner);
    let right_shapes = compute_shapes(right, &mut interner);

    let mut map = NodeCorrespondence::new();
    let mut work = vec![(left.root(), right.root())];
    while let Some((l, r)) = work.pop() {
        map.insert(l, r);
        let right_children: Vec<NodeId> = right.children(r).collect();
        let mut used = vec![false; right_children.len()];
        for left_child in left.children(l) {
            let candidate = (0..right_children.len()).find(|&k| {
                !used[k] && right_shapes.of(right_children[k]) == left_shapes.of(left_child)
            });
            match candidate {
                Some(k) => {
                    used[k] = true;
                    work.push((left_child, right_children[k]));
                }
                None => {
                    trace!(left = left_child.0, "unmatched child voids the pairing");
                    return MatchOutcome::NoMatch;
                }
            }
        }
        // Both sides must be fully consumed.
        if used.iter().any(|&u| !u) {
            return MatchOutcome::NoMatch;
        }
    }
    MatchOutcome::Matched(map)
}
