//! Arena-style directed graph shared by the instruction-granularity CFG,
//! the basic-block graph, and the spanning trees derived from either.
//!
//! Nodes and edges are immutable once inserted; graph algorithms keep
//! their transient state in per-run tables indexed by [`NodeId`], never in
//! the graph itself, so independent runs over the same graph cannot
//! interfere.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::constants::{EDGE_WARN_THRESHOLD, NODE_WARN_THRESHOLD};

/// Index of a node within its owning [`DirectedGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Index of an edge within its owning [`DirectedGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// Control-flow role of a node, carrying only the data each role needs.
///
/// The role participates in the matcher's canonical shapes through its
/// derived equality, so two switch nodes only share a shape when their
/// declared fan-out agrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexKind {
    /// Synthetic method entry.
    Entry,
    /// Straight-line instruction.
    Plain,
    /// Two-target conditional branch.
    Decision,
    /// Multi-way branch.
    Switch {
        /// Outgoing case edges, default included.
        cases: u32,
    },
    /// Method invocation.
    Invoke,
    /// Static or instance field access.
    FieldAccess,
    /// Unconditional jump (`goto`, `jsr`, `ret` and wide forms).
    Jump,
    /// Return or throw, plus the synthetic exit node.
    Exit,
}

/// Kind of control transfer an edge represents.
///
/// The kind is the ordering carrier for decision and switch nodes: a
/// decision's adjacency lists fall-through before taken, and a switch's
/// lists cases in key order with the default last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Synthetic edge from the entry node to the first instruction.
    Entry,
    /// Implicit advance to the next instruction.
    FallThrough,
    /// Taken leg of a conditional branch.
    Taken,
    /// Unconditional jump to its target.
    Jump,
    /// One switch case.
    Case {
        /// The matched key.
        key: i32,
    },
    /// The switch default case.
    Default,
    /// Transfer to an exception handler.
    Exception {
        /// Opaque constant-pool index of the caught type; 0 catches all.
        catch_type: u16,
    },
    /// Synthetic edge from a return or throw to the exit node.
    Exit,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry => write!(f, "entry"),
            Self::FallThrough => write!(f, "fall-through"),
            Self::Taken => write!(f, "taken"),
            Self::Jump => write!(f, "jump"),
            Self::Case { key } => write!(f, "case {key}"),
            Self::Default => write!(f, "default"),
            Self::Exception { .. } => write!(f, "exception"),
            Self::Exit => write!(f, "exit"),
        }
    }
}

/// Placeholder geometry owned by rendering front-ends. Never read or
/// written by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extent {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// One control-flow node: an instruction, a basic block, or a synthetic
/// entry/exit marker.
#[derive(Debug, Clone)]
pub struct Node {
    /// Byte offset of the underlying instruction (of the first member for
    /// block nodes); `None` for synthetic nodes.
    pub offset: Option<u32>,
    /// Control-flow role.
    pub kind: VertexKind,
    /// Display label seeded by the builder (instruction mnemonic, block
    /// name, or "entry"/"exit").
    pub label: CompactString,
    /// Rendering geometry placeholder.
    pub extent: Extent,
}

impl Node {
    /// Creates a node with default (zeroed) geometry.
    pub fn new(offset: Option<u32>, kind: VertexKind, label: impl Into<CompactString>) -> Self {
        Self {
            offset,
            kind,
            label: label.into(),
            extent: Extent::default(),
        }
    }

    pub(crate) fn synthetic(kind: VertexKind, label: &str) -> Self {
        Self::new(None, kind, label)
    }
}

/// One directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Source node.
    pub source: NodeId,
    /// Target node.
    pub target: NodeId,
    /// Transfer kind.
    pub kind: EdgeKind,
}

/// O(1) node and edge counts for pre-screening large graphs before layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSize {
    /// Node count.
    pub nodes: usize,
    /// Edge count.
    pub edges: usize,
}

impl GraphSize {
    /// Whether the graph exceeds the advisory display thresholds in
    /// [`crate::constants`]. The engine itself never enforces a cap.
    #[must_use]
    pub const fn exceeds_soft_limits(&self) -> bool {
        self.nodes > NODE_WARN_THRESHOLD || self.edges > EDGE_WARN_THRESHOLD
    }
}

/// One exception-table entry: instructions in `[start, end)` transfer to
/// `handler` when a compatible exception is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// Code-relative start of the protected range (inclusive).
    pub start: u32,
    /// Code-relative end of the protected range (exclusive).
    pub end: u32,
    /// Code-relative offset of the handler's first instruction.
    pub handler: u32,
    /// Opaque constant-pool index of the caught type; 0 catches all.
    pub catch_type: u16,
}

/// A directed graph owning its nodes and edges.
///
/// Edge insertion order is significant: per-node adjacency lists preserve
/// it, which is what keeps decision and switch out-edges ordered. No node
/// is ever shared between two graph instances.
#[derive(Debug, Clone, Default)]
pub struct DirectedGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    outgoing: Vec<SmallVec<[EdgeId; 2]>>,
    incoming: Vec<SmallVec<[EdgeId; 2]>>,
    properties: FxHashMap<CompactString, CompactString>,
}

impl DirectedGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node, returning its id.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.outgoing.push(SmallVec::new());
        self.incoming.push(SmallVec::new());
        id
    }

    /// Appends an edge, returning its id. Both endpoints must already be
    /// in the graph.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, kind: EdgeKind) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            source,
            target,
            kind,
        });
        self.outgoing[source.0].push(id);
        self.incoming[target.0].push(id);
        id
    }

    /// The node behind an id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// The edge behind an id.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    /// All nodes, in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All node ids, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Node count.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Edge count.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Out-edges of a node, in insertion order.
    #[must_use]
    pub fn outgoing(&self, id: NodeId) -> &[EdgeId] {
        &self.outgoing[id.0]
    }

    /// In-edges of a node, in insertion order.
    #[must_use]
    pub fn incoming(&self, id: NodeId) -> &[EdgeId] {
        &self.incoming[id.0]
    }

    /// Successor nodes, in out-edge insertion order.
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing[id.0].iter().map(|&e| self.edges[e.0].target)
    }

    /// Predecessor nodes, in in-edge insertion order.
    pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming[id.0].iter().map(|&e| self.edges[e.0].source)
    }

    /// Number of out-edges.
    #[must_use]
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.outgoing[id.0].len()
    }

    /// Number of in-edges.
    #[must_use]
    pub fn in_degree(&self, id: NodeId) -> usize {
        self.incoming[id.0].len()
    }

    /// Sets a caller-owned metadata property.
    pub fn set_property(&mut self, key: impl Into<CompactString>, value: impl Into<CompactString>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Looks up a caller-owned metadata property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(CompactString::as_str)
    }

    /// The full property map.
    #[must_use]
    pub fn properties(&self) -> &FxHashMap<CompactString, CompactString> {
        &self.properties
    }

    /// Carries another graph's property map over, so caller metadata
    /// survives aggregation and tree conversion.
    pub(crate) fn copy_properties_from(&mut self, other: &Self) {
        self.properties
            .extend(other.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// O(1) size query.
    #[must_use]
    pub fn size(&self) -> GraphSize {
        GraphSize {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
        }
    }
}
