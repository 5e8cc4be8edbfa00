//! Exact crossing counting for ordinary (non-hyper) edges.
//!
//! Ports of the two layers are laid out on a circle: the left layer's eastern ports top-down,
//! then the right layer's western ports bottom-up. Every edge is a chord of that circle and two
//! edges cross iff their chords interleave, which an [`IndexTree`] counts in O(e log p). The same
//! walk with a single side also counts in-layer edges looping around one side of a layer.

use super::index_tree::IndexTree;
use crate::util::in_north_south_east_west_order;
use lamina_graph::{EdgeId, LayeredGraph, NodeId, PortId, PortSide};

#[derive(Debug, Clone)]
pub struct CrossingsCounter {
    port_positions: Vec<Option<usize>>,
    positioned: Vec<PortId>,
    tree: IndexTree,
    assume_fixed_port_order: bool,
    count_both: bool,
}

impl CrossingsCounter {
    /// Counter that treats every node's port order as fixed.
    pub fn new(port_count: usize) -> Self {
        Self::with_port_order(port_count, true)
    }

    /// Counter that lets ports of nodes without fixed port order share one position.
    pub fn with_free_port_order(port_count: usize) -> Self {
        Self::with_port_order(port_count, false)
    }

    fn with_port_order(port_count: usize, assume_fixed_port_order: bool) -> Self {
        Self {
            port_positions: vec![None; port_count],
            positioned: Vec::new(),
            tree: IndexTree::default(),
            assume_fixed_port_order,
            count_both: false,
        }
    }

    /// Crossings among the in-layer edges on `side` of `nodes`, plus crossings of those edges
    /// with between-layer edges leaving ports they enclose.
    pub fn count_in_layer_crossings_on_side(
        &mut self,
        g: &LayeredGraph,
        nodes: &[NodeId],
        side: PortSide,
    ) -> usize {
        self.count_both = false;
        let num_ports = self.set_port_positions(g, side, nodes.iter().copied(), 0);
        self.tree.reset(num_ports);
        let crossings = self.add_edges_and_count_crossings_on(g, side, nodes.iter().copied());
        self.clear_positions();
        crossings
    }

    pub fn count_in_layer_crossings_on_both_sides(
        &mut self,
        g: &LayeredGraph,
        nodes: &[NodeId],
    ) -> usize {
        self.count_in_layer_crossings_on_side(g, nodes, PortSide::East)
            + self.count_in_layer_crossings_on_side(g, nodes, PortSide::West)
    }

    /// Crossings of all edges between `left` and `right`, including in-layer edges on the
    /// eastern side of `left` and the western side of `right`.
    pub fn count_crossings_between_layers(
        &mut self,
        g: &LayeredGraph,
        left: &[NodeId],
        right: &[NodeId],
    ) -> usize {
        self.count_both = true;
        let num_ports = self.set_port_positions(g, PortSide::East, left.iter().copied(), 0);
        let num_ports =
            self.set_port_positions(g, PortSide::West, right.iter().rev().copied(), num_ports);
        self.tree.reset(num_ports);
        let mut crossings =
            self.add_edges_and_count_crossings_on(g, PortSide::East, left.iter().copied());
        crossings +=
            self.add_edges_and_count_crossings_on(g, PortSide::West, right.iter().rev().copied());
        self.clear_positions();
        crossings
    }

    fn ports_of(&self, g: &LayeredGraph, node: NodeId, side: PortSide) -> Vec<PortId> {
        if self.count_both {
            g.ports_on_side(node, side).collect()
        } else {
            in_north_south_east_west_order(g, node, side)
        }
    }

    fn port_order_is_fixed(&self, g: &LayeredGraph, node: NodeId) -> bool {
        self.assume_fixed_port_order || g.node(node).port_constraints.is_order_fixed()
    }

    fn set_port_positions(
        &mut self,
        g: &LayeredGraph,
        side: PortSide,
        nodes: impl Iterator<Item = NodeId>,
        start: usize,
    ) -> usize {
        let mut current = start;
        for node in nodes {
            let fixed = self.port_order_is_fixed(g, node);
            let ports = self.ports_of(g, node, side);
            for &port in &ports {
                self.port_positions[port.index()] = Some(current);
                self.positioned.push(port);
                // Ports whose order is still open share one position.
                if fixed {
                    current += 1;
                }
            }
            if !fixed && !ports.is_empty() {
                current += 1;
            }
        }
        current
    }

    fn clear_positions(&mut self) {
        for port in self.positioned.drain(..) {
            self.port_positions[port.index()] = None;
        }
    }

    fn add_edges_and_count_crossings_on(
        &mut self,
        g: &LayeredGraph,
        side: PortSide,
        nodes: impl Iterator<Item = NodeId>,
    ) -> usize {
        let mut crossings = 0;
        for node in nodes {
            let ports = self.ports_of(g, node, side);
            crossings += if self.port_order_is_fixed(g, node) {
                self.count_with_fixed_port_order(g, &ports)
            } else {
                self.count_with_free_port_order(g, &ports)
            };
        }
        crossings
    }

    fn count_with_free_port_order(&mut self, g: &LayeredGraph, ports: &[PortId]) -> usize {
        let mut crossings = 0;
        for &port in ports {
            if let Some(pos) = self.port_positions[port.index()] {
                self.tree.remove_all(pos);
            }
            crossings += self.crossings_of_edges(g, port);
        }
        let size = self.tree.size();
        let mut between_layer_edges = 0;
        for &port in ports {
            between_layer_edges += self.add_targets_counting_between_layer_edges(g, port);
        }
        crossings + between_layer_edges * size
    }

    fn count_with_fixed_port_order(&mut self, g: &LayeredGraph, ports: &[PortId]) -> usize {
        let mut crossings = 0;
        for &port in ports {
            if let Some(pos) = self.port_positions[port.index()] {
                self.tree.remove_all(pos);
            }
            crossings += self.crossings_of_edges(g, port);
            let size = self.tree.size();
            crossings += self.add_targets_counting_between_layer_edges(g, port) * size;
        }
        crossings
    }

    /// Position of the far end of `edge` if it points further along the walk than `port`.
    fn downward_end(&self, g: &LayeredGraph, edge: EdgeId, port: PortId) -> Option<usize> {
        let here = self.port_positions[port.index()]?;
        let there = self.port_positions[g.opposite(edge, port).index()]?;
        (there > here).then_some(there)
    }

    fn crossings_of_edges(&self, g: &LayeredGraph, port: PortId) -> usize {
        let mut crossings = 0;
        for edge in g.port(port).connected_edges() {
            if g.is_self_loop(edge) {
                continue;
            }
            if !(self.count_both || g.is_in_layer(edge)) {
                continue;
            }
            if let Some(end) = self.downward_end(g, edge, port) {
                crossings += self.tree.rank(end);
            }
        }
        crossings
    }

    fn add_targets_counting_between_layer_edges(&mut self, g: &LayeredGraph, port: PortId) -> usize {
        let mut between_layer_edges = 0;
        for edge in g.port(port).connected_edges() {
            if g.is_self_loop(edge) {
                continue;
            }
            if self.count_both || g.is_in_layer(edge) {
                if let Some(end) = self.downward_end(g, edge, port) {
                    self.tree.add(end);
                }
            } else {
                between_layer_edges += 1;
            }
        }
        between_layer_edges
    }
}
