//! Control-flow graph construction from a decoded instruction sequence.

use compact_str::{format_compact, CompactString};
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::bytecode::{opcodes, Instruction, Operands};

use super::types::{
    DirectedGraph, EdgeKind, ExceptionHandler, GraphSize, Node, NodeId, VertexKind,
};

/// Where an unresolvable control transfer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOrigin {
    /// An explicit branch or switch destination.
    Branch,
    /// The implicit advance past a non-terminal instruction.
    FallThrough,
    /// An exception-table handler entry.
    Handler,
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch => write!(f, "branch"),
            Self::FallThrough => write!(f, "fall-through"),
            Self::Handler => write!(f, "handler"),
        }
    }
}

/// Builder-level failure: a control transfer whose destination is not an
/// instruction start. Unrecoverable for the affected method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{origin} transfer at offset {at} targets {target}, which is not an instruction start")]
pub struct UnreachableTarget {
    /// Offset of the transferring instruction (protected-range start for
    /// handler entries). Not named `source`: thiserror reserves that
    /// name for the error cause.
    pub at: u32,
    /// The unresolvable code-relative target offset.
    pub target: i64,
    /// What produced the target.
    pub origin: TargetOrigin,
}

/// A method's control-flow graph at instruction granularity.
///
/// Instruction nodes occupy ids `0..n` in offset order (node id equals
/// instruction index); the synthetic entry and exit nodes follow at `n`
/// and `n + 1`.
#[derive(Debug)]
pub struct ControlFlowGraph {
    graph: DirectedGraph,
    entry: NodeId,
    exit: NodeId,
    offsets: FxHashMap<u32, NodeId>,
}

impl ControlFlowGraph {
    /// Builds the CFG for a decoded instruction sequence plus its
    /// exception table.
    ///
    /// Emits, per instruction: a fall-through edge unless the instruction
    /// is a return, throw, switch, or unconditional jump; the taken edge
    /// after the fall-through edge for conditional branches; case edges in
    /// key order with the default last for switches; an exit edge for
    /// returns and throws; and one exceptional edge per handler whose
    /// protected range covers the instruction. `ret` transfers to a
    /// dynamic address and contributes no outgoing edge; `jsr` contributes
    /// only its jump edge.
    pub fn build(
        instructions: &[Instruction],
        handlers: &[ExceptionHandler],
    ) -> Result<Self, UnreachableTarget> {
        let mut graph = DirectedGraph::new();
        for ins in instructions {
            graph.add_node(Node::new(Some(ins.offset), classify(ins), label_of(ins)));
        }
        let entry = graph.add_node(Node::synthetic(VertexKind::Entry, "entry"));
        let exit = graph.add_node(Node::synthetic(VertexKind::Exit, "exit"));

        let offsets: FxHashMap<u32, NodeId> = instructions
            .iter()
            .enumerate()
            .map(|(i, ins)| (ins.offset, NodeId(i)))
            .collect();
        let resolve = |target: i64, at: u32, origin: TargetOrigin| {
            u32::try_from(target)
                .ok()
                .and_then(|t| offsets.get(&t).copied())
                .ok_or(UnreachableTarget { at, target, origin })
        };

        let handler_nodes: Vec<NodeId> = handlers
            .iter()
            .map(|h| resolve(i64::from(h.handler), h.start, TargetOrigin::Handler))
            .collect::<Result<_, _>>()?;

        match instructions.first() {
            Some(first) => {
                graph.add_edge(entry, offsets[&first.offset], EdgeKind::Entry);
            }
            // Empty method body: keep exit reachable.
            None => {
                graph.add_edge(entry, exit, EdgeKind::Entry);
            }
        }

        for (i, ins) in instructions.iter().enumerate() {
            let node = NodeId(i);
            let op = ins.opcode;
            let fall_through = |graph: &mut DirectedGraph| {
                if i + 1 < instructions.len() {
                    graph.add_edge(node, NodeId(i + 1), EdgeKind::FallThrough);
                    Ok(())
                } else {
                    Err(UnreachableTarget {
                        at: ins.offset,
                        target: i64::from(ins.end_offset()),
                        origin: TargetOrigin::FallThrough,
                    })
                }
            };

            if opcodes::is_return(op) || opcodes::is_throw(op) {
                graph.add_edge(node, exit, EdgeKind::Exit);
            } else if opcodes::is_conditional_branch(op) {
                // Not-taken first, taken second. Decision rendering relies
                // on this order.
                fall_through(&mut graph)?;
                if let Operands::Branch { target, .. } = ins.operands {
                    let taken = resolve(target, ins.offset, TargetOrigin::Branch)?;
                    graph.add_edge(node, taken, EdgeKind::Taken);
                }
            } else if opcodes::is_switch(op) {
                // The encoding puts the default first; the graph wants it
                // after the cases.
                match &ins.operands {
                    Operands::TableSwitch {
                        low,
                        cases,
                        default,
                        ..
                    } => {
                        for (k, case) in cases.iter().enumerate() {
                            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                            let key = low.wrapping_add(k as i32);
                            let t = resolve(case.target, ins.offset, TargetOrigin::Branch)?;
                            graph.add_edge(node, t, EdgeKind::Case { key });
                        }
                        let t = resolve(default.target, ins.offset, TargetOrigin::Branch)?;
                        graph.add_edge(node, t, EdgeKind::Default);
                    }
                    Operands::LookupSwitch { pairs, default } => {
                        for &(key, case) in pairs {
                            let t = resolve(case.target, ins.offset, TargetOrigin::Branch)?;
                            graph.add_edge(node, t, EdgeKind::Case { key });
                        }
                        let t = resolve(default.target, ins.offset, TargetOrigin::Branch)?;
                        graph.add_edge(node, t, EdgeKind::Default);
                    }
                    _ => {}
                }
            } else if op == opcodes::RET {
                // Returns to a dynamic address; no modeled successor.
            } else if opcodes::is_unconditional_jump(op) {
                if let Operands::Branch { target, .. } = ins.operands {
                    let t = resolve(target, ins.offset, TargetOrigin::Branch)?;
                    graph.add_edge(node, t, EdgeKind::Jump);
                }
            } else {
                fall_through(&mut graph)?;
            }

            // Exceptional out-edges, one per applicable handler. Unordered
            // among themselves; overlapping ranges stack.
            for (h, &hnode) in handlers.iter().zip(&handler_nodes) {
                if h.start <= ins.offset && ins.offset < h.end {
                    graph.add_edge(
                        node,
                        hnode,
                        EdgeKind::Exception {
                            catch_type: h.catch_type,
                        },
                    );
                }
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            handlers = handlers.len(),
            "built control-flow graph"
        );
        Ok(Self {
            graph,
            entry,
            exit,
            offsets,
        })
    }

    /// The underlying graph.
    #[must_use]
    pub fn graph(&self) -> &DirectedGraph {
        &self.graph
    }

    /// Attaches caller-owned metadata to the graph's property map. The
    /// map survives block aggregation and tree conversion.
    pub fn set_property(
        &mut self,
        key: impl Into<CompactString>,
        value: impl Into<CompactString>,
    ) {
        self.graph.set_property(key, value);
    }

    /// The synthetic entry node.
    #[must_use]
    pub const fn entry(&self) -> NodeId {
        self.entry
    }

    /// The synthetic exit node.
    #[must_use]
    pub const fn exit(&self) -> NodeId {
        self.exit
    }

    /// The instruction node starting at a code-relative offset.
    #[must_use]
    pub fn node_at_offset(&self, offset: u32) -> Option<NodeId> {
        self.offsets.get(&offset).copied()
    }

    /// O(1) size query for caller-side pre-screening.
    #[must_use]
    pub fn size(&self) -> GraphSize {
        self.graph.size()
    }

    /// Offsets of instruction nodes with no path from entry, in offset
    /// order. Used for dead-code display.
    #[must_use]
    pub fn find_unreachable_nodes(&self) -> Vec<u32> {
        let mut reachable = vec![false; self.graph.node_count()];
        let mut stack = vec![self.entry];
        while let Some(node) = stack.pop() {
            if reachable[node.0] {
                continue;
            }
            reachable[node.0] = true;
            for successor in self.graph.successors(node) {
                if !reachable[successor.0] {
                    stack.push(successor);
                }
            }
        }
        self.graph
            .node_ids()
            .filter(|id| !reachable[id.0])
            .filter_map(|id| self.graph.node(id).offset)
            .collect()
    }
}

/// Vertex role as a pure function of opcode category.
fn classify(ins: &Instruction) -> VertexKind {
    let op = ins.opcode;
    if opcodes::is_conditional_branch(op) {
        VertexKind::Decision
    } else if opcodes::is_switch(op) {
        VertexKind::Switch {
            cases: case_count(ins),
        }
    } else if opcodes::is_invoke(op) {
        VertexKind::Invoke
    } else if opcodes::is_field_access(op) {
        VertexKind::FieldAccess
    } else if opcodes::is_return(op) || opcodes::is_throw(op) {
        VertexKind::Exit
    } else if opcodes::is_unconditional_jump(op) {
        VertexKind::Jump
    } else {
        VertexKind::Plain
    }
}

/// Outgoing case edges of a switch, default included.
fn case_count(ins: &Instruction) -> u32 {
    #[allow(clippy::cast_possible_truncation)]
    match &ins.operands {
        Operands::TableSwitch { cases, .. } => cases.len() as u32 + 1,
        Operands::LookupSwitch { pairs, .. } => pairs.len() as u32 + 1,
        _ => 0,
    }
}

fn label_of(ins: &Instruction) -> CompactString {
    if ins.wide {
        format_compact!("wide {}", ins.mnemonic())
    } else {
        CompactString::const_new(ins.mnemonic())
    }
}
