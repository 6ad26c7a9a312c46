//! Exact bottom-up matching.

use crate::cfg::NodeId;
use crate::tree::shape::{finish_node, ShapeInterner, TreeShapes};
use crate::tree::RootedTree;

use super::{MatchOutcome, NodeCorrespondence};

/// Grows shape classes from the leaves upward, then accepts iff the two
/// root classes agree.
///
/// The mirror of the top-down variant: instead of descending and pairing,
/// it computes canonical shapes over a leaves-first worklist and lets the
/// hash-consed class ids carry the acceptance decision. The two empty
/// outcomes are the same as top-down's.
pub(super) fn match_exact(left: &RootedTree, right: &RootedTree) -> MatchOutcome {
    if left.node_count() > right.node_count() {
        return MatchOutcome::LeftTreeLarger;
    }
    let mut interner = ShapeInterner::new();
    let left_shapes = shapes_leaves_up(left, &mut interner);
    let right_shapes = shapes_leaves_up(right, &mut interner);
    if left_shapes.of(left.root()) != right_shapes.of(right.root()) {
        return MatchOutcome::NoMatch;
    }
    MatchOutcome::Matched(pair_subtrees(
        left,
        right,
        &left_shapes,
        &right_shapes,
        left.root(),
        right.root(),
    ))
}

/// Computes canonical shapes leaves-first: every node enters the worklist
/// once all of its children carry a shape, so classes grow strictly
/// upward in height.
pub(super) fn shapes_leaves_up(tree: &RootedTree, interner: &mut ShapeInterner) -> TreeShapes {
    let graph = tree.graph();
    let n = graph.node_count();
    let mut shapes = TreeShapes {
        shape: vec![None; n],
        size: vec![0; n],
        post_order: Vec::with_capacity(tree.node_count()),
    };

    let mut parent: Vec<Option<NodeId>> = vec![None; n];
    let mut pending: Vec<usize> = vec![0; n];
    let mut discovered = vec![false; n];
    let mut discovery = vec![tree.root()];
    discovered[tree.root().0] = true;
    let mut cursor = 0;
    while cursor < discovery.len() {
        let node = discovery[cursor];
        cursor += 1;
        for child in tree.children(node) {
            if !discovered[child.0] {
                discovered[child.0] = true;
                parent[child.0] = Some(node);
                pending[node.0] += 1;
                discovery.push(child);
            }
        }
    }

    let mut worklist: Vec<NodeId> = discovery
        .iter()
        .copied()
        .filter(|id| pending[id.0] == 0)
        .collect();
    while let Some(node) = worklist.pop() {
        finish_node(tree, interner, &mut shapes, node);
        if let Some(p) = parent[node.0] {
            pending[p.0] -= 1;
            if pending[p.0] == 0 {
                worklist.push(p);
            }
        }
    }
    shapes
}

/// Materializes the correspondence between two equal-shape subtrees by
/// pairing equal-shape children, ties broken by edge order.
pub(super) fn pair_subtrees(
    left: &RootedTree,
    right: &RootedTree,
    left_shapes: &TreeShapes,
    right_shapes: &TreeShapes,
    left_root: NodeId,
    right_root: NodeId,
) -> NodeCorrespondence {
    let mut map = NodeCorrespondence::new();
    let mut work = vec![(left_root, right_root)];
    while let Some((l, r)) = work.pop() {
        map.insert(l, r);
        let right_children: Vec<NodeId> = right.children(r).collect();
        let mut used = vec![false; right_children.len()];
        for left_child in left.children(l) {
            let candidate = (0..right_children.len()).find(|&k| {
                !used[k] && right_shapes.of(right_children[k]) == left_shapes.of(left_child)
            });
            // Equal parent shapes guarantee the children pair off.
            if let Some(k) = candidate {
                used[k] = true;
                work.push((left_child, right_children[k]));
            }
        }
    }
    map
}
