//! Control-flow graphs and structural comparison for JVM method bytecode.
//!
//! The crate is a synchronous pipeline with no I/O:
//!
//! 1. [`bytecode::decode`] turns a method's code array into typed
//!    [`bytecode::Instruction`] records with code-relative offsets.
//! 2. [`cfg::ControlFlowGraph::build`] produces a directed graph with one
//!    node per instruction plus synthetic entry/exit nodes, each node
//!    classified by its control-flow role.
//! 3. [`cfg::BlockGraph::from_cfg`] coarsens the graph to basic-block
//!    granularity (an independent consumer; not part of the comparison
//!    path).
//! 4. [`tree::spanning_tree`] converts a possibly cyclic graph into a
//!    rooted tree, setting back and cross edges aside.
//! 5. [`isomorphism::compare`] computes a node-to-node correspondence
//!    between two such trees, in four variants (top-down/bottom-up, each
//!    exact or maximum-common).
//!
//! Class-file parsing, rendering, layout, and export live with the
//! callers on either side of this boundary; the engine only computes
//! structure and correspondence. Callers wanting to pre-screen very large
//! inputs query [`cfg::GraphSize`] against the advisory thresholds in
//! [`constants`].

pub mod bytecode;
pub mod cfg;
pub mod constants;
pub mod isomorphism;
pub mod tree;

pub use bytecode::{decode, Instruction, MalformedBytecode};
pub use cfg::{
    BlockGraph, ControlFlowGraph, DirectedGraph, EdgeKind, ExceptionHandler, GraphSize, Node,
    NodeId, UnreachableTarget, VertexKind,
};
pub use isomorphism::{
    compare, Direction, Discipline, InvalidTree, MatchConfig, MatchOutcome, NodeCorrespondence,
};
pub use tree::{spanning_tree, RootedTree};
