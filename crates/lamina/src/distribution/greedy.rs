use super::rank::{PortRanks, RankPolicy};
use super::NestedOrderLookup;
use crate::counting::{LayerPortPositions, count_pair_crossings};
use crate::util::{fixed_index, first_index, in_north_south_east_west_order, side_facing_fixed};
use lamina_graph::{LayeredGraph, NodeId, NodeKind, Origin, PortId, PortSide, PortType};

/// Swaps neighboring ports of free-order nodes while the swap removes crossings.
///
/// On the side facing the fixed layer the edges towards that layer are counted. For compound
/// nodes the edges behind the hierarchical ports, inside the nested graph, are counted as well;
/// on the side facing away from the fixed layer only those inner edges are known.
#[derive(Debug, Clone)]
pub struct GreedyPortDistributor {
    ranks: PortRanks,
    fixed_positions: LayerPortPositions,
    upper: Vec<usize>,
    lower: Vec<usize>,
}

impl GreedyPortDistributor {
    pub fn new(g: &LayeredGraph, policy: RankPolicy) -> Self {
        Self {
            ranks: PortRanks::new(g.port_count(), policy),
            fixed_positions: LayerPortPositions::new(g.port_count()),
            upper: Vec::new(),
            lower: Vec::new(),
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
        nested: &dyn NestedOrderLookup,
        order: &[Vec<NodeId>],
        free_layer: usize,
        forward: bool,
    ) -> bool {
        let side = side_facing_fixed(forward);
        let has_fixed = free_layer != first_index(forward, order.len());
        if has_fixed {
            let fixed = &order[fixed_index(forward, free_layer)];
            self.fixed_positions.assign(g, fixed, side.opposed());
        }

        let mut improved = false;
        for &node in &order[free_layer] {
            if g.node(node).port_constraints.is_order_fixed() {
                continue;
            }
            let inner = inner_positions(g, nested, node, side);
            if has_fixed || inner.is_some() {
                improved |= self.distribute_on_side(g, node, side, has_fixed, inner.as_ref());
            }
            let inner = inner_positions(g, nested, node, side.opposed());
            if inner.is_some() {
                improved |= self.distribute_on_side(g, node, side.opposed(), false, inner.as_ref());
            }
        }
        self.fixed_positions.clear();
        improved
    }

    fn distribute_on_side(
        &mut self,
        g: &mut LayeredGraph,
        node: NodeId,
        side: PortSide,
        outer: bool,
        inner: Option<&InnerPositions<'_>>,
    ) -> bool {
        let mut improved = false;
        let mut ports = in_north_south_east_west_order(g, node, side);
        let mut switching = true;
        while switching {
            switching = false;
            for i in 0..ports.len().saturating_sub(1) {
                let (upper, lower) = (ports[i], ports[i + 1]);
                if self.switch_decreases_crossings(g, upper, lower, outer, inner) {
                    ports.swap(i, i + 1);
                    swap_in_port_list(g, node, upper, lower);
                    improved = true;
                    switching = true;
                }
            }
        }
        improved
    }

    fn switch_decreases_crossings(
        &mut self,
        g: &LayeredGraph,
        upper: PortId,
        lower: PortId,
        outer: bool,
        inner: Option<&InnerPositions<'_>>,
    ) -> bool {
        let mut upper_lower = 0;
        let mut lower_upper = 0;
        if outer {
            self.upper.clear();
            self.lower.clear();
            self.fixed_positions.adjacent_positions(g, upper, &mut self.upper);
            self.fixed_positions.adjacent_positions(g, lower, &mut self.lower);
            let (a, b) = count_pair_crossings(&mut self.upper, &mut self.lower);
            upper_lower += a;
            lower_upper += b;
        }
        if let Some(inner) = inner {
            let (a, b) = inner.count(g, upper, lower, &mut self.upper, &mut self.lower);
            upper_lower += a;
            lower_upper += b;
        }
        upper_lower > lower_upper
    }
}

/// Positions inside a nested graph of the edges behind the parent's hierarchical ports on one
/// side.
#[derive(Debug)]
struct InnerPositions<'a> {
    nested: &'a LayeredGraph,
    positions: LayerPortPositions,
}

impl InnerPositions<'_> {
    fn count(
        &self,
        parent: &LayeredGraph,
        upper: PortId,
        lower: PortId,
        upper_out: &mut Vec<usize>,
        lower_out: &mut Vec<usize>,
    ) -> (usize, usize) {
        upper_out.clear();
        lower_out.clear();
        for (port, out) in [(upper, &mut *upper_out), (lower, &mut *lower_out)] {
            let Some(dummy) = parent.port(port).port_dummy else {
                continue;
            };
            if self.nested.node(dummy).kind != NodeKind::ExternalPort {
                continue;
            }
            self.positions.node_adjacent_positions(self.nested, dummy, out);
        }
        count_pair_crossings(upper_out, lower_out)
    }
}

/// Numbers the layer next to the external-port layer of `node`'s nested graph on `side`, if
/// there is one.
fn inner_positions<'a>(
    g: &LayeredGraph,
    nested: &'a dyn NestedOrderLookup,
    node: NodeId,
    side: PortSide,
) -> Option<InnerPositions<'a>> {
    let child = g.node(node).nested_graph()?;
    let (inner, order) = nested.nested(child)?;
    if order.len() < 2 {
        return None;
    }
    let (dummy_layer, next_layer, facing) = match side {
        PortSide::West => (0, 1, PortSide::West),
        PortSide::East => (order.len() - 1, order.len() - 2, PortSide::East),
        _ => return None,
    };
    let is_dummy_layer = order[dummy_layer].first().is_some_and(|&n| {
        matches!(inner.node(n).origin, Some(Origin::ExternalPort(p)) if g.port(p).side == side)
    });
    if !is_dummy_layer {
        return None;
    }
    let mut positions = LayerPortPositions::new(inner.port_count());
    positions.assign(inner, &order[next_layer], facing);
    Some(InnerPositions {
        nested: inner,
        positions,
    })
}

fn swap_in_port_list(g: &mut LayeredGraph, node: NodeId, a: PortId, b: PortId) {
    let ports = g.ports_mut(node);
    let ia = ports.iter().position(|&p| p == a);
    let ib = ports.iter().position(|&p| p == b);
    if let (Some(ia), Some(ib)) = (ia, ib) {
        ports.swap(ia, ib);
    }
}
