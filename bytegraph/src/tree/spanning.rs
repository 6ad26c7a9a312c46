//! Depth-first spanning-tree conversion.
//!
//! The matcher operates only on trees, so a possibly cyclic CFG is first
//! converted here: a deterministic DFS keeps tree edges and sets aside
//! back edges (loops) and cross edges in a diagnostic side list. This is
//! the one documented seam between cyclic graphs and the tree-only
//! algorithms downstream.

use tracing::debug;

use crate::cfg::{DirectedGraph, EdgeKind, Node, NodeId};

/// DFS classification of a discarded edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeClass {
    /// Edge to a node still on the DFS stack; a loop edge.
    Back,
    /// Edge to an already-finished node that is not an ancestor.
    Cross,
}

/// An edge dropped during spanning-tree conversion. Diagnostic only;
/// never fed to the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscardedEdge {
    /// Source node in the original graph.
    pub source: NodeId,
    /// Target node in the original graph.
    pub target: NodeId,
    /// The original edge kind.
    pub kind: EdgeKind,
    /// Why the edge was dropped.
    pub class: EdgeClass,
}

/// A directed graph restricted to tree edges plus one designated root.
///
/// Node ids are preserved from the source graph, so correspondences
/// computed over trees map straight back to CFG nodes. Nodes the root
/// cannot reach remain in the arena but are not part of the tree and are
/// excluded from [`RootedTree::node_count`].
#[derive(Debug)]
pub struct RootedTree {
    graph: DirectedGraph,
    root: NodeId,
    discarded: Vec<DiscardedEdge>,
    reachable: usize,
}

impl RootedTree {
    /// Wraps an externally built tree-edge graph. No validation happens
    /// here; the matcher checks its structural preconditions on entry.
    #[must_use]
    pub fn new(graph: DirectedGraph, root: NodeId) -> Self {
        let mut visited = vec![false; graph.node_count()];
        let mut reachable = 0;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if visited[node.0] {
                continue;
            }
            visited[node.0] = true;
            reachable += 1;
            stack.extend(graph.successors(node));
        }
        Self {
            graph,
            root,
            discarded: Vec::new(),
            reachable,
        }
    }

    /// The tree-edge-only graph.
    #[must_use]
    pub fn graph(&self) -> &DirectedGraph {
        &self.graph
    }

    /// The designated root.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// The node behind an id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        self.graph.node(id)
    }

    /// Children of a node, in tree-edge insertion order (the DFS visit
    /// order of the conversion).
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.successors(id)
    }

    /// Number of nodes reachable from the root.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.reachable
    }

    /// Edges dropped by the conversion, in discovery order.
    #[must_use]
    pub fn discarded_edges(&self) -> &[DiscardedEdge] {
        &self.discarded
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Converts a graph into a spanning tree rooted at `root`.
///
/// Iterative depth-first search visiting children in edge insertion
/// order, so repeated runs over the same graph produce an identical tree.
/// An edge to a node on the DFS stack is discarded as a back edge; an
/// edge to a finished node is discarded as a cross edge. All nodes and
/// the property map carry over; only tree edges do.
#[must_use]
pub fn spanning_tree(graph: &DirectedGraph, root: NodeId) -> RootedTree {
    let mut tree = DirectedGraph::new();
    tree.copy_properties_from(graph);
    for node in graph.nodes() {
        tree.add_node(node.clone());
    }

    let mut color = vec![Color::White; graph.node_count()];
    let mut discarded = Vec::new();
    let mut reachable = 1usize;
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
        let edge = graph.edge(out[frame.1]);
        frame.1 += 1;
        let target = edge.target;
        match color[target.0] {
            Color::White => {
                tree.add_edge(node, target, edge.kind);
                color[target.0] = Color::Gray;
                reachable += 1;
                stack.push((target, 0));
            }
            Color::Gray => discarded.push(DiscardedEdge {
                source: node,
                target,
                kind: edge.kind,
                class: EdgeClass::Back,
            }),
            Color::Black => discarded.push(DiscardedEdge {
                source: node,
                target,
                kind: edge.kind,
                class: EdgeClass::Cross,
            }),
        }
    }

    debug!(
        reachable,
        discarded = discarded.len(),
        "converted graph to spanning tree"
    );
    RootedTree {
        graph: tree,
        root,
        discarded,
        reachable,
    }
}
