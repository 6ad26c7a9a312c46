//! Maximum-common matching: the relaxed discipline that accepts the
//! largest partial pairing instead of voiding a pair over one unmatched
//! child.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::cfg::NodeId;
use crate::tree::shape::{compute_shapes, ShapeId, ShapeInterner};
use crate::tree::RootedTree;

use super::bottom_up::{pair_subtrees, shapes_leaves_up};
use super::{MatchOutcome, NodeCorrespondence};

/// Top-down maximum-common matching.
///
/// Fills an all-pairs table of common-subtree sizes in post order, then
/// extracts the pairing from the roots down. `common(l, r)` is zero for
/// role-incompatible nodes, otherwise one plus the best assignment of
/// l's children to r's children weighted by their own common sizes. The
/// objective is the total number of matched pairs, so the result never
/// has fewer pairs than the exact top-down variant.
pub(super) fn match_top_down(left: &RootedTree, right: &RootedTree) -> MatchOutcome {
    let mut interner = ShapeInterner::new();
    let left_shapes = compute_shapes(left, &mut interner);
    let right_shapes = compute_shapes(right, &mut interner);
    let left_post = left_shapes.post_order();
    let right_post = right_shapes.post_order();

    let mut left_pos = vec![usize::MAX; left.graph().node_count()];
    for (i, &node) in left_post.iter().enumerate() {
        left_pos[node.0] = i;
    }
    let mut right_pos = vec![usize::MAX; right.graph().node_count()];
    for (i, &node) in right_post.iter().enumerate() {
        right_pos[node.0] = i;
    }

    let width = right_post.len();
    let mut common = vec![0u32; left_post.len() * width];
    let idx = |l: NodeId, r: NodeId| left_pos[l.0] * width + right_pos[r.0];

    for &l in left_post {
        for &r in right_post {
            if left.node(l).kind != right.node(r).kind {
                continue;
            }
            let left_children: Vec<NodeId> = left.children(l).collect();
            let right_children: Vec<NodeId> = right.children(r).collect();
            let score = if left_children.is_empty() || right_children.is_empty() {
                1
            } else {
                let weights: Vec<Vec<u32>> = left_children
                    .iter()
                    .map(|&a| right_children.iter().map(|&b| common[idx(a, b)]).collect())
                    .collect();
                let assignment = solve_assignment(&weights);
                1 + assignment
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &col)| col.map(|j| weights[i][j]))
                    .sum::<u32>()
            };
            common[idx(l, r)] = score;
        }
    }

    if common[idx(left.root(), right.root())] == 0 {
        return MatchOutcome::NoMatch;
    }

    let mut map = NodeCorrespondence::new();
    let mut work = vec![(left.root(), right.root())];
    while let Some((l, r)) = work.pop() {
        map.insert(l, r);
        let left_children: Vec<NodeId> = left.children(l).collect();
        let right_children: Vec<NodeId> = right.children(r).collect();
        if left_children.is_empty() || right_children.is_empty() {
            continue;
        }
        let weights: Vec<Vec<u32>> = left_children
            .iter()
            .map(|&a| right_children.iter().map(|&b| common[idx(a, b)]).collect())
            .collect();
        let assignment = solve_assignment(&weights);
        for (i, &col) in assignment.iter().enumerate() {
            if let Some(j) = col {
                // Zero-weight assignments carry no common structure.
                if weights[i][j] > 0 {
                    work.push((left_children[i], right_children[j]));
                }
            }
        }
    }
    trace!(pairs = map.len(), "maximum-common top-down extraction done");
    MatchOutcome::Matched(map)
}

/// Bottom-up maximum-common matching.
///
/// Grows shape classes from the leaves and returns the correspondence
/// covering the largest pair of complete subtrees, one per tree, with
/// identical canonical shape. Size ties go to the earliest left worklist
/// position, then the earliest right one.
pub(super) fn match_bottom_up(left: &RootedTree, right: &RootedTree) -> MatchOutcome {
    let mut interner = ShapeInterner::new();
    let left_shapes = shapes_leaves_up(left, &mut interner);
    let right_shapes = shapes_leaves_up(right, &mut interner);

    let mut right_of_shape: FxHashMap<ShapeId, NodeId> = FxHashMap::default();
    for &r in right_shapes.post_order() {
        if let Some(shape) = right_shapes.of(r) {
            right_of_shape.entry(shape).or_insert(r);
        }
    }

    let mut best: Option<(u32, NodeId, NodeId)> = None;
    for &l in left_shapes.post_order() {
        let Some(shape) = left_shapes.of(l) else { continue };
        if let Some(&r) = right_of_shape.get(&shape) {
            let size = left_shapes.subtree_size(l);
            if best.is_none_or(|(bs, _, _)| size > bs) {
                best = Some((size, l, r));
            }
        }
    }

    match best {
        None => MatchOutcome::NoMatch,
        Some((_, l, r)) => MatchOutcome::Matched(pair_subtrees(
            left,
            right,
            &left_shapes,
            &right_shapes,
            l,
            r,
        )),
    }
}

/// Maximum-weight assignment between rows and columns (Hungarian method
/// with potentials). Returns the assigned column per row; with more rows
/// than columns the instance is transposed internally and the surplus
/// rows come back unassigned.
pub(super) fn solve_assignment(weights: &[Vec<u32>]) -> Vec<Option<usize>> {
    let rows = weights.len();
    let cols = weights.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return vec![None; rows];
    }
    if rows > cols {
        let transposed: Vec<Vec<u32>> = (0..cols)
            .map(|j| (0..rows).map(|i| weights[i][j]).collect())
            .collect();
        let by_column = solve_assignment(&transposed);
        let mut out = vec![None; rows];
        for (col, row) in by_column.into_iter().enumerate() {
            if let Some(row) = row {
                out[row] = Some(col);
            }
        }
        return out;
    }

    // Minimum-cost formulation over negated weights; rows are 1-indexed
    // in `u`, columns in `v`/`p`/`way`, with index 0 as the scratch slot.
    let n = rows;
    let m = cols;
    let inf = i64::MAX / 2;
    let cost = |i: usize, j: usize| -i64::from(weights[i][j]);
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; m + 1];
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];
    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![inf; m + 1];
        let mut used = vec![false; m + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = inf;
            let mut j1 = 0usize;
            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut out = vec![None; n];
    for j in 1..=m {
        if p[j] != 0 {
            out[p[j] - 1] = Some(j - 1);
        }
    }
    out
}
