//! Control-flow graphs at instruction and basic-block granularity.

mod blocks;
mod builder;
mod types;

#[cfg(test)]
mod tests;

pub use blocks::BlockGraph;
pub use builder::{ControlFlowGraph, TargetOrigin, UnreachableTarget};
pub use types::{
    DirectedGraph, Edge, EdgeId, EdgeKind, ExceptionHandler, Extent, GraphSize, Node, NodeId,
    VertexKind,
};
