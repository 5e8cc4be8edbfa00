use super::rank::{PortRanks, RankPolicy};
use super::NestedOrderLookup;
use crate::util::{fixed_index, fixed_port_type, first_index, side_facing_fixed};
use lamina_graph::{LayeredGraph, NodeId, PortId, PortSide, PortType};
use std::cmp::Ordering;

/// Orders the free ports of each node by the mean rank of the ports they connect to.
#[derive(Debug, Clone)]
pub struct BarycenterPortDistributor {
    ranks: PortRanks,
    /// Kept across calls: sides that are not redistributed keep their last values.
    port_barycenters: Vec<Option<f64>>,
    node_positions: Vec<usize>,
    in_layer_ports: Vec<PortId>,
    min_barycenter: f64,
    max_barycenter: f64,
}

impl BarycenterPortDistributor {
    pub fn new(g: &LayeredGraph, policy: RankPolicy) -> Self {
        let mut node_positions = vec![0; g.node_count()];
        for layer in g.layers() {
            for (i, &node) in layer.nodes().iter().enumerate() {
                node_positions[node.index()] = i;
            }
        }
        Self {
            ranks: PortRanks::new(g.port_count(), policy),
            port_barycenters: vec![None; g.port_count()],
            node_positions,
            in_layer_ports: Vec::new(),
            min_barycenter: 0.0,
            max_barycenter: 0.0,
        }
    }

    pub fn policy(&self) -> RankPolicy {
        self.ranks.policy()
    }

    pub fn port_ranks(&self) -> &[f64] {
        self.ranks.ranks()
    }

    pub fn calculate_port_ranks(&mut self, g: &LayeredGraph, layer: &[NodeId], port_type: PortType) {
        self.ranks.calculate(g, layer, port_type);
    }

    pub fn distribute_ports_while_sweeping(
        &mut self,
        g: &mut LayeredGraph,
        _nested: &dyn NestedOrderLookup,
        order: &[Vec<NodeId>],
        free_layer: usize,
        forward: bool,
    ) -> bool {
        self.update_node_positions(&order[free_layer]);
        let side = side_facing_fixed(forward);
        let free = &order[free_layer];

        if free_layer != first_index(forward, order.len()) {
            let fixed = &order[fixed_index(forward, free_layer)];
            self.ranks.calculate(g, fixed, fixed_port_type(forward));
            for &node in free {
                self.distribute_ports(g, node, side, free.len());
            }

            // Ranks of the free layer now drive the fixed layer's facing side.
            let opposite_type = match fixed_port_type(forward) {
                PortType::Output => PortType::Input,
                PortType::Input => PortType::Output,
            };
            self.ranks.calculate(g, free, opposite_type);
            for &node in fixed {
                if !g.has_nested_graph(node) {
                    self.distribute_ports(g, node, side.opposed(), fixed.len());
                }
            }
        } else {
            for &node in free {
                self.distribute_ports(g, node, side, free.len());
            }
        }
        false
    }

    fn update_node_positions(&mut self, layer: &[NodeId]) {
        for (i, &node) in layer.iter().enumerate() {
            self.node_positions[node.index()] = i;
        }
    }

    fn distribute_ports(&mut self, g: &mut LayeredGraph, node: NodeId, side: PortSide, layer_size: usize) {
        if g.node(node).port_constraints.is_order_fixed() {
            return;
        }
        for s in [side, PortSide::South, PortSide::North] {
            let ports: Vec<PortId> = g.ports_on_side(node, s).collect();
            self.distribute_side(g, node, &ports, layer_size);
        }
        self.sort_ports(g, node);
    }

    fn distribute_side(&mut self, g: &LayeredGraph, node: NodeId, ports: &[PortId], layer_size: usize) {
        self.in_layer_ports.clear();
        self.collect_barycenters(g, node, ports, layer_size);
        if !self.in_layer_ports.is_empty() {
            self.in_layer_barycenters(g, node, layer_size);
        }
    }

    fn collect_barycenters(&mut self, g: &LayeredGraph, node: NodeId, ports: &[PortId], layer_size: usize) {
        self.min_barycenter = 0.0;
        self.max_barycenter = 0.0;
        // Large enough to put southern input ports behind everything else.
        let absurdly_large = (2 * layer_size + 1) as f64;
        let layer = g.layer_of(node);

        'ports: for &port in ports {
            let p = g.port(port);
            let north_south = p.side.is_north_or_south();
            let mut sum = 0.0;
            if north_south {
                let Some(dummy) = p.port_dummy else {
                    continue;
                };
                sum += self.north_south_key(g, port, dummy, absurdly_large);
            } else {
                let ranks = self.ranks.ranks();
                for &edge in p.outgoing() {
                    let target = g.edge(edge).target();
                    if g.layer_of(g.node_of(target)) == layer {
                        self.in_layer_ports.push(port);
                        continue 'ports;
                    }
                    // Outgoing edges lead to the next layer and are seen clockwise.
                    sum += ranks[target.index()];
                }
                for &edge in p.incoming() {
                    let source = g.edge(edge).source();
                    if g.layer_of(g.node_of(source)) == layer {
                        self.in_layer_ports.push(port);
                        continue 'ports;
                    }
                    sum -= ranks[source.index()];
                }
            }

            if p.degree() > 0 {
                let barycenter = sum / p.degree() as f64;
                self.port_barycenters[port.index()] = Some(barycenter);
                self.min_barycenter = self.min_barycenter.min(barycenter);
                self.max_barycenter = self.max_barycenter.max(barycenter);
            } else if north_south {
                self.port_barycenters[port.index()] = Some(sum);
            }
        }
    }

    /// Sort key of a north/south port: inputs, mixed ports and outputs get disjoint bands.
    fn north_south_key(&self, g: &LayeredGraph, port: PortId, dummy: NodeId, absurdly_large: f64) -> f64 {
        let mut input = false;
        let mut output = false;
        for &dummy_port in g.node(dummy).ports() {
            let dp = g.port(dummy_port);
            if dp.origin == Some(port) {
                if !dp.outgoing().is_empty() {
                    output = true;
                } else if !dp.incoming().is_empty() {
                    input = true;
                }
            }
        }

        let position = self.node_positions[dummy.index()] as f64;
        let north = g.port(port).side == PortSide::North;
        match (input, output) {
            (true, false) if north => -position,
            (true, false) => absurdly_large - position,
            (false, true) => position + 1.0,
            (true, true) if north => 0.0,
            (true, true) => absurdly_large / 2.0,
            (false, false) => 0.0,
        }
    }

    /// In-layer ports go above or below the node's other ports depending on where most of their
    /// same-layer neighbors are.
    fn in_layer_barycenters(&mut self, g: &LayeredGraph, node: NodeId, layer_size: usize) {
        let node_index = (self.node_positions[node.index()] + 1) as f64;
        let layer_size = (layer_size + 1) as f64;
        let layer = g.layer_of(node);

        for &port in &self.in_layer_ports {
            let mut sum = 0usize;
            let mut connections = 0usize;
            for other in g.connected_ports(port) {
                let other_node = g.node_of(other);
                if g.layer_of(other_node) == layer {
                    sum += self.node_positions[other_node.index()] + 1;
                    connections += 1;
                }
            }
            if connections == 0 {
                continue;
            }
            let barycenter = sum as f64 / connections as f64;
            let value = match g.port(port).side {
                PortSide::East if barycenter < node_index => self.min_barycenter - barycenter,
                PortSide::East => self.max_barycenter + (layer_size - barycenter),
                PortSide::West if barycenter < node_index => self.max_barycenter + barycenter,
                PortSide::West => self.min_barycenter - (layer_size - barycenter),
                _ => continue,
            };
            self.port_barycenters[port.index()] = Some(value);
        }
    }

    fn sort_ports(&self, g: &mut LayeredGraph, node: NodeId) {
        let mut keyed: Vec<(PortSide, Option<f64>, PortId)> = g
            .node(node)
            .ports()
            .iter()
            .map(|&p| {
                let rank = self.port_barycenters[p.index()].filter(|&b| b != 0.0);
                (g.port(p).side, rank, p)
            })
            .collect();
        // Stable: unranked ports (no rank, or rank 0) keep their relative order and come first
        // on their side.
        keyed.sort_by(|a, b| {
            a.0.cmp(&b.0).then_with(|| match (a.1, b.1) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => x.total_cmp(&y),
            })
        });
        g.set_port_order(node, keyed.into_iter().map(|(_, _, p)| p).collect());
    }
}
