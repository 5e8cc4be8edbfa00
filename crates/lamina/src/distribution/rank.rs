//! Port rank assignment.
//!
//! Ranks are laid out layer by layer: each node consumes a slice of the rank axis starting where
//! its predecessor in the layer stopped. Input ports are numbered counter-clockwise (so western
//! inputs count upwards from the bottom) except northern ones, which keep their own band below
//! the rest; output ports are numbered clockwise.

use lamina_graph::{LayeredGraph, NodeId, PortSide, PortType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankPolicy {
    /// Every node consumes one unit of rank, split evenly among its ports.
    NodeRelative,
    /// Every port consumes one unit of rank.
    LayerTotal,
}

#[derive(Debug, Clone)]
pub struct PortRanks {
    policy: RankPolicy,
    ranks: Vec<f64>,
}

impl PortRanks {
    pub fn new(port_count: usize, policy: RankPolicy) -> Self {
        Self {
            policy,
            ranks: vec![0.0; port_count],
        }
    }

    pub fn policy(&self) -> RankPolicy {
        self.policy
    }

    pub fn ranks(&self) -> &[f64] {
        &self.ranks
    }

    pub fn calculate(&mut self, g: &LayeredGraph, layer: &[NodeId], port_type: PortType) {
        let mut consumed = 0.0;
        for &node in layer {
            consumed += self.calculate_for_node(g, node, consumed, port_type);
        }
    }

    /// Ranks the ports of one node starting at `rank_sum`; returns the rank range consumed.
    fn calculate_for_node(
        &mut self,
        g: &LayeredGraph,
        node: NodeId,
        rank_sum: f64,
        port_type: PortType,
    ) -> f64 {
        let ports = g.node(node).ports();
        match port_type {
            PortType::Input => {
                let mut input_count = 0usize;
                let mut north_input_count = 0usize;
                for &port in ports {
                    if g.port(port).has_type(PortType::Input) {
                        input_count += 1;
                        if g.port(port).side == PortSide::North {
                            north_input_count += 1;
                        }
                    }
                }
                let (incr, consumed) = match self.policy {
                    RankPolicy::NodeRelative => (1.0 / (input_count as f64 + 1.0), 1.0),
                    RankPolicy::LayerTotal => (1.0, input_count as f64),
                };
                let mut north_pos = rank_sum + north_input_count as f64 * incr;
                let mut rest_pos = match self.policy {
                    RankPolicy::NodeRelative => rank_sum + 1.0 - incr,
                    RankPolicy::LayerTotal => rank_sum + input_count as f64,
                };
                for &port in ports {
                    if !g.port(port).has_type(PortType::Input) {
                        continue;
                    }
                    if g.port(port).side == PortSide::North {
                        self.ranks[port.index()] = north_pos;
                        north_pos -= incr;
                    } else {
                        self.ranks[port.index()] = rest_pos;
                        rest_pos -= incr;
                    }
                }
                consumed
            }
            PortType::Output => {
                let output_count = ports
                    .iter()
                    .filter(|&&p| g.port(p).has_type(PortType::Output))
                    .count();
                let (incr, consumed) = match self.policy {
                    RankPolicy::NodeRelative => (1.0 / (output_count as f64 + 1.0), 1.0),
                    RankPolicy::LayerTotal => (1.0, output_count as f64),
                };
                let mut pos = rank_sum + incr;
                for &port in ports {
                    if g.port(port).has_type(PortType::Output) {
                        self.ranks[port.index()] = pos;
                        pos += incr;
                    }
                }
                consumed
            }
        }
    }
}
