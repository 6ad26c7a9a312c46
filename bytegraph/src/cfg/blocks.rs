//! Basic-block aggregation over an instruction-granularity CFG.

use compact_str::format_compact;
use tracing::debug;

use super::builder::ControlFlowGraph;
use super::types::{DirectedGraph, GraphSize, Node, NodeId};

/// The CFG coarsened to basic-block granularity.
///
/// Topologically equivalent to the source graph: the straight-line chain
/// edges inside a block are elided, every other edge keeps its kind and
/// relative order, and a jump from a block back into itself becomes a
/// self-loop. Block
/// nodes occupy ids `0..k` in offset order, followed by singleton entry
/// and exit blocks, mirroring the instruction graph's layout.
#[derive(Debug)]
pub struct BlockGraph {
    graph: DirectedGraph,
    members: Vec<Vec<NodeId>>,
    block_of: Vec<NodeId>,
    entry: NodeId,
    exit: NodeId,
}

impl BlockGraph {
    /// Aggregates maximal straight-line instruction runs into blocks.
    ///
    /// A node starts a new block if it has zero or more than one
    /// predecessor, or its unique predecessor has more than one successor;
    /// it ends a block if it has zero or more than one successor, its
    /// unique successor has more than one predecessor, or its unique
    /// successor is not the next instruction in offset order. Every node
    /// lands in exactly one block in a single pass over the instruction
    /// nodes in offset order.
    #[must_use]
    pub fn from_cfg(cfg: &ControlFlowGraph) -> Self {
        let src = cfg.graph();
        let instruction_count = src.node_count() - 2;

        let starts_block = |id: NodeId| {
            if src.in_degree(id) != 1 {
                return true;
            }
            let pred = src.predecessors(id).next();
            pred.is_some_and(|p| src.out_degree(p) > 1)
        };
        let ends_block = |id: NodeId| {
            if src.out_degree(id) != 1 {
                return true;
            }
            let Some(succ) = src.successors(id).next() else {
                return true;
            };
            src.in_degree(succ) > 1 || succ.0 != id.0 + 1
        };

        let mut members: Vec<Vec<NodeId>> = Vec::new();
        let mut current: Vec<NodeId> = Vec::new();
        for i in 0..instruction_count {
            let id = NodeId(i);
            if !current.is_empty() && starts_block(id) {
                members.push(std::mem::take(&mut current));
            }
            current.push(id);
            if ends_block(id) {
                members.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            members.push(current);
        }

        let mut graph = DirectedGraph::new();
        graph.copy_properties_from(src);
        for (k, block) in members.iter().enumerate() {
            let first = block[0];
            let last = block[block.len() - 1];
            // A block inherits the offset of its first member and the
            // branching character of its last.
            graph.add_node(Node::new(
                src.node(first).offset,
                src.node(last).kind,
                format_compact!("B{k}"),
            ));
        }
        let entry = graph.add_node(src.node(cfg.entry()).clone());
        let exit = graph.add_node(src.node(cfg.exit()).clone());
        members.push(vec![cfg.entry()]);
        members.push(vec![cfg.exit()]);

        let mut block_of = vec![NodeId(0); src.node_count()];
        for (k, block) in members.iter().enumerate() {
            for &node in block {
                block_of[node.0] = NodeId(k);
            }
        }

        for edge in src.edges() {
            let (bs, bt) = (block_of[edge.source.0], block_of[edge.target.0]);
            // Only the intra-block chain edges vanish; a jump from a
            // block's tail back to its own head survives as a self-loop.
            if bs != bt || edge.target.0 != edge.source.0 + 1 {
                graph.add_edge(bs, bt, edge.kind);
            }
        }

        debug!(
            blocks = graph.node_count(),
            edges = graph.edge_count(),
            instructions = instruction_count,
            "aggregated basic blocks"
        );
        Self {
            graph,
            members,
            block_of,
            entry,
            exit,
        }
    }

    /// The underlying block-granularity graph.
    #[must_use]
    pub fn graph(&self) -> &DirectedGraph {
        &self.graph
    }

    /// The singleton block holding the synthetic entry node.
    #[must_use]
    pub const fn entry(&self) -> NodeId {
        self.entry
    }

    /// The singleton block holding the synthetic exit node.
    #[must_use]
    pub const fn exit(&self) -> NodeId {
        self.exit
    }

    /// The source-graph nodes a block owns, in offset order.
    #[must_use]
    pub fn members(&self, block: NodeId) -> &[NodeId] {
        &self.members[block.0]
    }

    /// The block a source-graph node was classified into.
    #[must_use]
    pub fn block_of(&self, node: NodeId) -> NodeId {
        self.block_of[node.0]
    }

    /// O(1) size query for caller-side pre-screening.
    #[must_use]
    pub fn size(&self) -> GraphSize {
        self.graph.size()
    }
}
