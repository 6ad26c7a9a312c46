//! Spanning trees over control-flow graphs and their canonical shapes.

pub(crate) mod shape;
mod spanning;


pub use spanning::{spanning_tree, DiscardedEdge, EdgeClass, RootedTree};
