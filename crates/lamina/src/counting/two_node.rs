//! Crossings between the edges of two vertically adjacent elements, in both relative orders.
//!
//! Used by the greedy heuristics: when two neighboring nodes (or two neighboring ports of one
//! node) are swapped, only the crossings among their own edges change.

use crate::util::in_north_south_east_west_order;
use lamina_graph::{LayeredGraph, NodeId, PortId, PortSide};

/// Positions of the ports of one layer on the side facing a neighboring layer.
#[derive(Debug, Clone)]
pub struct LayerPortPositions {
    positions: Vec<Option<usize>>,
    assigned: Vec<PortId>,
}

impl LayerPortPositions {
    pub fn new(port_count: usize) -> Self {
        Self {
            positions: vec![None; port_count],
            assigned: Vec::new(),
        }
    }

    /// Numbers the `side` ports of `layer` from top to bottom.
    pub fn assign(&mut self, g: &LayeredGraph, layer: &[NodeId], side: PortSide) {
        self.clear();
        let mut next = 0;
        for &node in layer {
            for port in in_north_south_east_west_order(g, node, side) {
                self.positions[port.index()] = Some(next);
                self.assigned.push(port);
                next += 1;
            }
        }
    }

    pub fn clear(&mut self) {
        for port in self.assigned.drain(..) {
            self.positions[port.index()] = None;
        }
    }

    pub fn position(&self, port: PortId) -> Option<usize> {
        self.positions[port.index()]
    }

    /// Positions of the far ends of `port`'s edges that lie in the numbered layer, sorted.
    pub fn adjacent_positions(&self, g: &LayeredGraph, port: PortId, out: &mut Vec<usize>) {
        for edge in g.port(port).connected_edges() {
            if g.is_self_loop(edge) {
                continue;
            }
            if let Some(pos) = self.position(g.opposite(edge, port)) {
                out.push(pos);
            }
        }
    }

    /// Like [`adjacent_positions`](Self::adjacent_positions), for every port of `node`.
    pub fn node_adjacent_positions(&self, g: &LayeredGraph, node: NodeId, out: &mut Vec<usize>) {
        for &port in g.node(node).ports() {
            self.adjacent_positions(g, port, out);
        }
    }
}

/// Crossings between the edge bundles `upper` and `lower` (far-end positions): first with
/// `upper` placed above `lower`, then with the two swapped. Edges meeting in the same far
/// position never cross.
pub fn count_pair_crossings(upper: &mut [usize], lower: &mut [usize]) -> (usize, usize) {
    upper.sort_unstable();
    lower.sort_unstable();

    // Pairs (u, l) with u > l cross while upper is on top.
    let mut upper_lower = 0;
    let mut j = 0;
    for &u in upper.iter() {
        while j < lower.len() && lower[j] < u {
            j += 1;
        }
        upper_lower += j;
    }

    // Pairs (u, l) with u < l cross once the two are swapped.
    let mut lower_upper = 0;
    let mut j = 0;
    for &l in lower.iter() {
        while j < upper.len() && upper[j] < l {
            j += 1;
        }
        lower_upper += j;
    }

    (upper_lower, lower_upper)
}
