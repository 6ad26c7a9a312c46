//! Canonical-shape computation for unordered role-labeled trees.
//!
//! A node's canonical shape is its vertex role plus the multiset of its
//! children's shapes. Shapes are hash-consed through an interner shared
//! by the two trees being compared, so two subtrees are structurally
//! isomorphic (ignoring child order, respecting roles) exactly when their
//! shape ids are equal.

use rustc_hash::FxHashMap;

use crate::cfg::{NodeId, VertexKind};

use super::spanning::RootedTree;

/// Interned identifier of one canonical shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ShapeId(u32);

/// Hash-consing interner for canonical shapes. Share one instance across
/// both trees of a comparison so equal shapes get equal ids.
#[derive(Debug, Default)]
pub(crate) struct ShapeInterner {
    table: FxHashMap<(VertexKind, Vec<ShapeId>), ShapeId>,
}

impl ShapeInterner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Interns the shape `(kind, multiset of child shapes)`. The child
    /// list is sorted so sibling order cannot influence the id.
    pub(crate) fn intern(&mut self, kind: VertexKind, mut children: Vec<ShapeId>) -> ShapeId {
        children.sort_unstable();
        #[allow(clippy::cast_possible_truncation)]
        let next = ShapeId(self.table.len() as u32);
        *self.table.entry((kind, children)).or_insert(next)
    }
}

/// Per-tree shape table, indexed by node id.
#[derive(Debug)]
pub(crate) struct TreeShapes {
    /// Shape of each node; `None` for nodes the root cannot reach.
    pub(crate) shape: Vec<Option<ShapeId>>,
    /// Subtree size (node count) rooted at each node.
    pub(crate) size: Vec<u32>,
    /// Reachable nodes, children before parents.
    pub(crate) post_order: Vec<NodeId>,
}

impl TreeShapes {
    /// Shape of a node, if the root reaches it.
    pub(crate) fn of(&self, id: NodeId) -> Option<ShapeId> {
        self.shape[id.0]
    }

    pub(crate) fn subtree_size(&self, id: NodeId) -> u32 {
        self.size[id.0]
    }

    pub(crate) fn post_order(&self) -> &[NodeId] {
        &self.post_order
    }
}

/// Computes canonical shapes by iterative post-order traversal from the
/// root. Requires a valid tree (validated by the matcher before use).
pub(crate) fn compute_shapes(tree: &RootedTree, interner: &mut ShapeInterner) -> TreeShapes {
    let graph = tree.graph();
    let n = graph.node_count();
    let mut shapes = TreeShapes {
        shape: vec![None; n],
        size: vec![0; n],
        post_order: Vec::with_capacity(tree.node_count()),
    };

    let mut stack: Vec<(NodeId, usize)> = vec![(tree.root(), 0)];
    loop {
        let Some(frame) = stack.last_mut() else { break };
        let node = frame.0;
        let out = graph.outgoing(node);
        if frame.1 < out.len() {
            let child = graph.edge(out[frame.1]).target;
            frame.1 += 1;
            stack.push((child, 0));
            continue;
        }
        stack.pop();
        finish_node(tree, interner, &mut shapes, node);
    }
    shapes
}

/// Interns one node's shape once all of its children are done.
pub(crate) fn finish_node(
    tree: &RootedTree,
    interner: &mut ShapeInterner,
    shapes: &mut TreeShapes,
    node: NodeId,
) {
    let child_shapes: Vec<ShapeId> = tree
        .children(node)
        .filter_map(|c| shapes.shape[c.0])
        .collect();
    let size = 1 + tree.children(node).map(|c| shapes.size[c.0]).sum::<u32>();
    shapes.shape[node.0] = Some(interner.intern(tree.node(node).kind, child_shapes));
    shapes.size[node.0] = size;
    shapes.post_order.push(node);
}
