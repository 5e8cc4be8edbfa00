//! Element records stored in the per-graph arenas.

use crate::ids::{EdgeId, GraphId, LayerId, NodeId, PortId};
use serde::{Deserialize, Serialize};

/// Side of a node a port sits on. The declaration order is the clockwise order used when a
/// node's ports are sorted (`North < East < South < West`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortSide {
    /// Not assigned yet. Rejected by validation.
    Undefined,
    North,
    East,
    South,
    West,
}

impl PortSide {
    pub fn opposed(self) -> Self {
        match self {
            PortSide::North => PortSide::South,
            PortSide::East => PortSide::West,
            PortSide::South => PortSide::North,
            PortSide::West => PortSide::East,
            PortSide::Undefined => PortSide::Undefined,
        }
    }

    pub fn is_north_or_south(self) -> bool {
        matches!(self, PortSide::North | PortSide::South)
    }
}

/// Direction of the edges a port is queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    /// Ports with at least one incoming edge.
    Input,
    /// Ports with at least one outgoing edge.
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Normal,
    /// One segment of a long edge that was split across layers.
    LongEdge,
    /// Stands in for a north or south port of a normal node in the same layer.
    NorthSouthPort,
    /// Stands in for a hierarchical port of the parent node inside a nested graph.
    ExternalPort,
    Label,
}

/// How much freedom a node's port list has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortConstraints {
    #[default]
    Free,
    FixedSide,
    FixedOrder,
    FixedRatio,
    FixedPos,
}

impl PortConstraints {
    pub fn is_order_fixed(self) -> bool {
        matches!(
            self,
            PortConstraints::FixedOrder | PortConstraints::FixedRatio | PortConstraints::FixedPos
        )
    }
}

/// The element a dummy node was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// A node of the same graph (north/south dummies point at their owner).
    Node(NodeId),
    /// A port of the same graph (dummy ports point at the port they replace).
    Port(PortId),
    /// An edge of the same graph (long-edge and self-loop dummies).
    Edge(EdgeId),
    /// A hierarchical port of the parent node, living in the parent graph.
    ExternalPort(PortId),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub(crate) nodes: Vec<NodeId>,
}

impl Layer {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub name: Option<String>,
    pub(crate) layer: LayerId,
    pub(crate) ports: Vec<PortId>,
    pub(crate) nested: Option<GraphId>,
    pub origin: Option<Origin>,
    /// Representative node of the layout unit this node belongs to.
    pub layout_unit: Option<NodeId>,
    /// Nodes of the same layer that must be placed after this node.
    pub successor_constraints: Vec<NodeId>,
    /// Same-layer nodes whose barycenter contributes to this node's.
    pub barycenter_associates: Vec<NodeId>,
    pub port_constraints: PortConstraints,
    /// Crossings a north/south dummy forces with its owner's other edges (0, 1 or 2).
    pub crossing_hint: u32,
    pub model_order: Option<usize>,
    /// Top-left corner in the previous drawing, used by interactive ordering.
    pub position: Point,
    pub size: Size,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, layer: LayerId) -> Self {
        Self {
            kind,
            name: None,
            layer,
            ports: Vec::new(),
            nested: None,
            origin: None,
            layout_unit: None,
            successor_constraints: Vec::new(),
            barycenter_associates: Vec::new(),
            port_constraints: PortConstraints::default(),
            crossing_hint: 0,
            model_order: None,
            position: Point::default(),
            size: Size::default(),
        }
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Ports in clockwise order, starting at the top-left corner.
    pub fn ports(&self) -> &[PortId] {
        &self.ports
    }

    pub fn nested_graph(&self) -> Option<GraphId> {
        self.nested
    }

    /// Reference point used by interactive ordering: the center of the previous bounds.
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }
}

#[derive(Debug, Clone)]
pub struct Port {
    pub(crate) node: NodeId,
    pub side: PortSide,
    pub(crate) incoming: Vec<EdgeId>,
    pub(crate) outgoing: Vec<EdgeId>,
    /// For dummy ports: the port of the original node this port replaces.
    pub origin: Option<PortId>,
    /// The dummy node standing in for this port. For north/south ports it lives in the same
    /// layer; for hierarchical ports it lives in the node's nested graph.
    pub port_dummy: Option<NodeId>,
    /// Whether this port of a compound node has connections inside the nested graph.
    pub inside_connections: bool,
}

impl Port {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    pub fn degree(&self) -> usize {
        self.incoming.len() + self.outgoing.len()
    }

    pub fn connected_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.incoming.iter().chain(self.outgoing.iter()).copied()
    }

    pub fn has_type(&self, port_type: PortType) -> bool {
        match port_type {
            PortType::Input => !self.incoming.is_empty(),
            PortType::Output => !self.outgoing.is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) source: PortId,
    pub(crate) target: PortId,
    /// Set when cycle breaking flipped the edge; affects presentation only.
    pub reversed: bool,
    /// Polyline of the edge in the previous drawing (source anchor, bends, target anchor).
    pub original_path: Vec<Point>,
}

impl Edge {
    pub fn source(&self) -> PortId {
        self.source
    }

    pub fn target(&self) -> PortId {
        self.target
    }
}
