//! Layered graph container.
//!
//! A [`LayeredGraph`] owns three arenas (nodes, ports, edges) plus the ordered layer lists. The
//! arena index of an element is its identity; list positions (node order in a layer, port order
//! around a node) are the only state the ordering phase mutates.

mod elements;

pub use elements::{
    Edge, Layer, Node, NodeKind, Origin, Point, Port, PortConstraints, PortSide, PortType, Size,
};

use crate::ids::{EdgeId, GraphId, LayerId, NodeId, PortId};

#[derive(Debug, Clone)]
pub struct LayeredGraph {
    id: GraphId,
    parent: Option<(GraphId, NodeId)>,
    layers: Vec<Layer>,
    nodes: Vec<Node>,
    ports: Vec<Port>,
    edges: Vec<Edge>,
}

impl LayeredGraph {
    pub(crate) fn new(id: GraphId, parent: Option<(GraphId, NodeId)>) -> Self {
        Self {
            id,
            parent,
            layers: Vec::new(),
            nodes: Vec::new(),
            ports: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    /// The compound node (in the parent graph) that owns this graph.
    pub fn parent(&self) -> Option<(GraphId, NodeId)> {
        self.parent
    }

    pub fn add_layer(&mut self) -> LayerId {
        self.layers.push(Layer::default());
        LayerId::new(self.layers.len() - 1)
    }

    /// Appends a new node at the end of `layer`.
    pub fn add_node(&mut self, layer: LayerId, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(kind, layer));
        self.layers[layer.index()].nodes.push(id);
        id
    }

    /// Appends a new port at the end of `node`'s port list.
    pub fn add_port(&mut self, node: NodeId, side: PortSide) -> PortId {
        let id = PortId::new(self.ports.len());
        self.ports.push(Port {
            node,
            side,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            origin: None,
            port_dummy: None,
            inside_connections: false,
        });
        self.nodes[node.index()].ports.push(id);
        id
    }

    pub fn add_edge(&mut self, source: PortId, target: PortId) -> EdgeId {
        let id = EdgeId::new(self.edges.len());
        self.edges.push(Edge {
            source,
            target,
            reversed: false,
            original_path: Vec::new(),
        });
        self.ports[source.index()].outgoing.push(id);
        self.ports[target.index()].incoming.push(id);
        id
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> &Layer {
        &self.layers[id.index()]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn port(&self, id: PortId) -> &Port {
        &self.ports[id.index()]
    }

    pub fn port_mut(&mut self, id: PortId) -> &mut Port {
        &mut self.ports[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId::new)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + use<> {
        (0..self.edges.len()).map(EdgeId::new)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the graph contains dummies for hierarchical ports of its parent node.
    pub fn has_external_ports(&self) -> bool {
        self.nodes.iter().any(|n| n.kind == NodeKind::ExternalPort)
    }

    /// Node order of every layer, copied out.
    pub fn node_order(&self) -> Vec<Vec<NodeId>> {
        self.layers.iter().map(|l| l.nodes.clone()).collect()
    }

    /// Replaces the order of `layer`. The new order must be a permutation of the old one.
    pub fn set_layer_order(&mut self, layer: LayerId, nodes: Vec<NodeId>) {
        let slot = &mut self.layers[layer.index()].nodes;
        debug_assert_eq!(slot.len(), nodes.len());
        *slot = nodes;
    }

    /// Replaces the port order of `node`. The new order must be a permutation of the old one.
    pub fn set_port_order(&mut self, node: NodeId, ports: Vec<PortId>) {
        let slot = &mut self.nodes[node.index()].ports;
        debug_assert_eq!(slot.len(), ports.len());
        *slot = ports;
    }

    /// Mutable port list of `node`, for in-place swaps.
    pub fn ports_mut(&mut self, node: NodeId) -> &mut [PortId] {
        &mut self.nodes[node.index()].ports
    }

    pub fn node_of(&self, port: PortId) -> NodeId {
        self.ports[port.index()].node
    }

    pub fn layer_of(&self, node: NodeId) -> LayerId {
        self.nodes[node.index()].layer
    }

    /// Ports of `node` on `side`, in clockwise order.
    pub fn ports_on_side(&self, node: NodeId, side: PortSide) -> impl Iterator<Item = PortId> + '_ {
        self.nodes[node.index()]
            .ports
            .iter()
            .copied()
            .filter(move |&p| self.ports[p.index()].side == side)
    }

    /// Ports of `node` with at least one edge of the given direction, in clockwise order.
    pub fn ports_of_type(
        &self,
        node: NodeId,
        port_type: PortType,
    ) -> impl Iterator<Item = PortId> + '_ {
        self.nodes[node.index()]
            .ports
            .iter()
            .copied()
            .filter(move |&p| self.ports[p.index()].has_type(port_type))
    }

    pub fn has_ports_on_side(&self, node: NodeId, side: PortSide) -> bool {
        self.ports_on_side(node, side).next().is_some()
    }

    /// The endpoint of `edge` that is not `port`.
    pub fn opposite(&self, edge: EdgeId, port: PortId) -> PortId {
        let e = &self.edges[edge.index()];
        if e.source == port { e.target } else { e.source }
    }

    /// Ports at the other ends of all edges of `port`.
    pub fn connected_ports(&self, port: PortId) -> impl Iterator<Item = PortId> + '_ {
        self.ports[port.index()]
            .connected_edges()
            .map(move |e| self.opposite(e, port))
    }

    /// Ports at the sources of `port`'s incoming edges.
    pub fn predecessor_ports(&self, port: PortId) -> impl Iterator<Item = PortId> + '_ {
        self.ports[port.index()]
            .incoming
            .iter()
            .map(move |e| self.edges[e.index()].source)
    }

    /// Ports at the targets of `port`'s outgoing edges.
    pub fn successor_ports(&self, port: PortId) -> impl Iterator<Item = PortId> + '_ {
        self.ports[port.index()]
            .outgoing
            .iter()
            .map(move |e| self.edges[e.index()].target)
    }

    pub fn is_self_loop(&self, edge: EdgeId) -> bool {
        let e = &self.edges[edge.index()];
        self.node_of(e.source) == self.node_of(e.target)
    }

    /// Whether both endpoints of `edge` lie in the same layer.
    pub fn is_in_layer(&self, edge: EdgeId) -> bool {
        let e = &self.edges[edge.index()];
        self.layer_of(self.node_of(e.source)) == self.layer_of(self.node_of(e.target))
    }

    /// Position of `port` in its node's port list.
    pub fn port_index(&self, port: PortId) -> Option<usize> {
        let node = self.node_of(port);
        self.nodes[node.index()].ports.iter().position(|&p| p == port)
    }

    pub fn has_nested_graph(&self, node: NodeId) -> bool {
        self.nodes[node.index()].nested.is_some()
    }

    pub(crate) fn set_nested(&mut self, node: NodeId, nested: GraphId) {
        self.nodes[node.index()].nested = Some(nested);
    }
}
