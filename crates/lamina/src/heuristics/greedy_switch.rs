//! Greedy switching of adjacent nodes.
//!
//! Two neighboring nodes of the free layer are swapped whenever that removes crossings between
//! their own edges. The one-sided variant only looks at the layer the sweep comes from; the
//! two-sided variant looks at both neighboring layers and therefore never makes a layer worse.

use super::{CrossingMinimizationHeuristic, LayerContext};
use crate::counting::{CrossingCount, LayerPortPositions, count_pair_crossings};
use crate::options::GreedySwitchType;
use crate::util::first_index;
use lamina_graph::{LayeredGraph, NodeId, NodeKind, PortSide};

#[derive(Debug, Clone)]
pub struct GreedySwitchHeuristic {
    mode: GreedySwitchType,
    west: LayerPortPositions,
    east: LayerPortPositions,
    upper: Vec<usize>,
    lower: Vec<usize>,
}

impl GreedySwitchHeuristic {
    pub fn new(g: &LayeredGraph, mode: GreedySwitchType) -> Self {
        Self {
            mode,
            west: LayerPortPositions::new(g.port_count()),
            east: LayerPortPositions::new(g.port_count()),
            upper: Vec::new(),
            lower: Vec::new(),
        }
    }

    pub fn mode(&self) -> GreedySwitchType {
        self.mode
    }

    /// Numbers the neighbors of `free_layer` that take part in the decision.
    fn prepare(&mut self, g: &LayeredGraph, order: &[Vec<NodeId>], free_layer: usize, forward: bool) {
        self.west.clear();
        self.east.clear();
        let len = order.len();
        let (use_west, use_east) = match self.mode {
            GreedySwitchType::TwoSided => (true, true),
            // One-sided: the fixed layer, or the only neighbor when the free layer starts the
            // sweep.
            _ if free_layer == first_index(forward, len) => (!forward, forward),
            _ => (forward, !forward),
        };
        if use_west && free_layer > 0 {
            self.west.assign(g, &order[free_layer - 1], PortSide::East);
        }
        if use_east && free_layer + 1 < len {
            self.east.assign(g, &order[free_layer + 1], PortSide::West);
        }
    }

    /// Repeats downward passes over the layer until no switch happens.
    fn sweep_layer(&mut self, ctx: &mut LayerContext<'_>, free_layer: usize, forward: bool) -> bool {
        self.prepare(ctx.graph, ctx.order, free_layer, forward);
        let in_layer = ctx.counter.has_in_layer_crossings(free_layer);
        let mut improved = false;
        let mut switched = true;
        while switched {
            switched = false;
            for i in 0..ctx.order[free_layer].len().saturating_sub(1) {
                if self.switch_reduces_crossings(ctx, free_layer, i, in_layer) {
                    ctx.order[free_layer].swap(i, i + 1);
                    switched = true;
                    improved = true;
                }
            }
        }
        self.west.clear();
        self.east.clear();
        improved
    }

    fn switch_reduces_crossings(
        &mut self,
        ctx: &mut LayerContext<'_>,
        free_layer: usize,
        i: usize,
        in_layer: bool,
    ) -> bool {
        let g = ctx.graph;
        let layer = &ctx.order[free_layer];
        let (upper, lower) = (layer[i], layer[i + 1]);
        if constraints_prevent_switch(g, upper, lower) {
            return false;
        }

        let mut upper_lower = 0;
        let mut lower_upper = 0;
        for positions in [&self.west, &self.east] {
            self.upper.clear();
            self.lower.clear();
            positions.node_adjacent_positions(g, upper, &mut self.upper);
            positions.node_adjacent_positions(g, lower, &mut self.lower);
            let (a, b) = count_pair_crossings(&mut self.upper, &mut self.lower);
            upper_lower += a;
            lower_upper += b;
        }

        if in_layer {
            let mut switched = layer.clone();
            switched.swap(i, i + 1);
            upper_lower += ctx.counter.count_within(g, &ctx.order[free_layer]);
            lower_upper += ctx.counter.count_within(g, &switched);
        }
        upper_lower > lower_upper
    }
}

/// Successor constraints, layout units and north/south dummies pin neighbors in place.
fn constraints_prevent_switch(g: &LayeredGraph, upper: NodeId, lower: NodeId) -> bool {
    let (u, l) = (g.node(upper), g.node(lower));
    u.successor_constraints.contains(&lower)
        || layout_units_prevent_switch(g, upper, lower)
        || is_normal_and_north_south_dummy(u.kind, l.kind)
        || is_normal_and_north_south_dummy(l.kind, u.kind)
}

fn layout_units_prevent_switch(g: &LayeredGraph, upper: NodeId, lower: NodeId) -> bool {
    let (u, l) = (g.node(upper), g.node(lower));
    if u.kind == NodeKind::LongEdge || l.kind == NodeKind::LongEdge {
        return false;
    }
    let different_units = u.layout_unit != l.layout_unit;
    // A node with north or south connections always owns a unit of dummies.
    let in_unit = part_of_multi_node_unit(upper, u.layout_unit)
        || part_of_multi_node_unit(lower, l.layout_unit)
        || has_edges_on_side(g, upper, PortSide::South)
        || has_edges_on_side(g, lower, PortSide::North);
    (in_unit && different_units)
        || has_edges_on_side(g, upper, PortSide::North)
        || has_edges_on_side(g, lower, PortSide::South)
}

fn part_of_multi_node_unit(node: NodeId, unit: Option<NodeId>) -> bool {
    unit.is_some_and(|unit| unit != node)
}

fn has_edges_on_side(g: &LayeredGraph, node: NodeId, side: PortSide) -> bool {
    g.ports_on_side(node, side).any(|p| {
        let port = g.port(p);
        port.port_dummy.is_some() || port.degree() > 0
    })
}

fn is_normal_and_north_south_dummy(a: NodeKind, b: NodeKind) -> bool {
    a == NodeKind::Normal && b == NodeKind::NorthSouthPort
}

impl CrossingMinimizationHeuristic for GreedySwitchHeuristic {
    fn set_first_layer_order(&mut self, ctx: &mut LayerContext<'_>, forward: bool) -> bool {
        if ctx.order.is_empty() {
            return false;
        }
        let start = first_index(forward, ctx.order.len());
        self.sweep_layer(ctx, start, forward)
    }

    fn minimize_crossings(
        &mut self,
        ctx: &mut LayerContext<'_>,
        free_layer: usize,
        forward: bool,
        _first_sweep: bool,
    ) -> bool {
        self.sweep_layer(ctx, free_layer, forward)
    }

    fn always_improves(&self) -> bool {
        self.mode == GreedySwitchType::TwoSided
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}
