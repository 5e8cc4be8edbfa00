//! Layer sweep barycenter heuristic.

use super::{CrossingMinimizationHeuristic, LayerContext};
use crate::constraints::ConstraintResolver;
use crate::distribution::PortDistribution;
use crate::random::Random;
use crate::util::{first_index, fixed_index, fixed_port_type};
use lamina_graph::{LayeredGraph, NodeId, NodeKind};
use std::cmp::Ordering;

/// Jitter added to every computed barycenter is drawn from `[-RANDOM_AMOUNT/2, RANDOM_AMOUNT/2)`.
const RANDOM_AMOUNT: f32 = 0.07;

/// Barycenter bookkeeping of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BarycenterState {
    pub summed_weight: f64,
    pub degree: usize,
    pub barycenter: Option<f64>,
    pub visited: bool,
}

impl BarycenterState {
    fn assign(&mut self, value: f64) {
        self.barycenter = Some(value);
        self.summed_weight = value;
        self.degree = 1;
    }
}

/// Defined barycenters first, ascending; undefined ones keep their relative order at the end.
pub(crate) fn compare_barycenters(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone)]
pub struct BarycenterHeuristic {
    pub(crate) states: Vec<BarycenterState>,
    pub(crate) resolver: ConstraintResolver,
}

impl BarycenterHeuristic {
    pub fn new(g: &LayeredGraph) -> Self {
        Self {
            states: vec![BarycenterState::default(); g.node_count()],
            resolver: ConstraintResolver::new(g),
        }
    }

    pub fn state(&self, node: NodeId) -> &BarycenterState {
        &self.states[node.index()]
    }

    #[allow(clippy::too_many_arguments)]
    fn minimize_layer(
        &mut self,
        g: &LayeredGraph,
        ranks: &[f64],
        random: &mut Random,
        nodes: &mut Vec<NodeId>,
        pre_ordered: bool,
        randomize: bool,
        forward: bool,
    ) {
        if randomize {
            self.randomize_barycenters(nodes, random);
        } else {
            self.calculate_barycenters(g, ranks, random, nodes, forward);
            self.fill_in_unknown_barycenters(nodes, pre_ordered, random);
        }
        if nodes.len() > 1 {
            let states = &self.states;
            nodes.sort_by(|a, b| {
                compare_barycenters(states[a.index()].barycenter, states[b.index()].barycenter)
            });
            self.resolver.process_constraints(g, nodes, &mut self.states);
        }
    }

    pub(crate) fn randomize_barycenters(&mut self, nodes: &[NodeId], random: &mut Random) {
        for &node in nodes {
            let value = random.next_f64();
            self.states[node.index()].assign(value);
        }
    }

    /// Places nodes without a barycenter: between their defined neighbors when the layer
    /// already has a meaningful order, randomly otherwise.
    pub(crate) fn fill_in_unknown_barycenters(
        &mut self,
        nodes: &[NodeId],
        pre_ordered: bool,
        random: &mut Random,
    ) {
        if pre_ordered {
            let mut last_value = -1.0;
            for (i, &node) in nodes.iter().enumerate() {
                let current = self.states[node.index()].barycenter;
                let value = match current {
                    Some(v) => v,
                    None => {
                        let next_value = nodes[i + 1..]
                            .iter()
                            .find_map(|n| self.states[n.index()].barycenter)
                            .unwrap_or(last_value + 1.0);
                        let v = (last_value + next_value) / 2.0;
                        self.states[node.index()].assign(v);
                        v
                    }
                };
                last_value = value;
            }
        } else {
            let mut max_bary: f64 = 0.0;
            for &node in nodes {
                if let Some(b) = self.states[node.index()].barycenter {
                    max_bary = max_bary.max(b);
                }
            }
            max_bary += 2.0;
            for &node in nodes {
                if self.states[node.index()].barycenter.is_none() {
                    let value = f64::from(random.next_f32()) * max_bary - 1.0;
                    self.states[node.index()].assign(value);
                }
            }
        }
    }

    pub(crate) fn calculate_barycenters(
        &mut self,
        g: &LayeredGraph,
        ranks: &[f64],
        random: &mut Random,
        nodes: &[NodeId],
        forward: bool,
    ) {
        for &node in nodes {
            self.states[node.index()].visited = false;
        }
        for &node in nodes {
            self.calculate_barycenter(g, ranks, random, node, forward);
        }
    }

    fn calculate_barycenter(
        &mut self,
        g: &LayeredGraph,
        ranks: &[f64],
        random: &mut Random,
        node: NodeId,
        forward: bool,
    ) {
        if self.states[node.index()].visited {
            return;
        }
        self.states[node.index()] = BarycenterState {
            summed_weight: 0.0,
            degree: 0,
            barycenter: None,
            visited: true,
        };

        let layer = g.layer_of(node);
        for &free_port in g.node(node).ports() {
            let fixed_ports: Vec<_> = if forward {
                g.predecessor_ports(free_port).collect()
            } else {
                g.successor_ports(free_port).collect()
            };
            for fixed_port in fixed_ports {
                let fixed_node = g.node_of(fixed_port);
                if g.layer_of(fixed_node) == layer {
                    // In-layer edge: borrow the other node's values. Self-loops are ignored.
                    if fixed_node != node {
                        self.calculate_barycenter(g, ranks, random, fixed_node, forward);
                        let other = self.states[fixed_node.index()];
                        let state = &mut self.states[node.index()];
                        state.degree += other.degree;
                        state.summed_weight += other.summed_weight;
                    }
                } else {
                    let state = &mut self.states[node.index()];
                    state.summed_weight += ranks[fixed_port.index()];
                    state.degree += 1;
                }
            }
        }

        for &associate in &g.node(node).barycenter_associates {
            if g.layer_of(associate) == layer {
                self.calculate_barycenter(g, ranks, random, associate, forward);
                let other = self.states[associate.index()];
                let state = &mut self.states[node.index()];
                state.degree += other.degree;
                state.summed_weight += other.summed_weight;
            }
        }

        let state = &mut self.states[node.index()];
        if state.degree > 0 {
            let jitter = random.next_f32() * RANDOM_AMOUNT - RANDOM_AMOUNT / 2.0;
            state.summed_weight += f64::from(jitter);
            state.barycenter = Some(state.summed_weight / state.degree as f64);
        }
    }
}

/// Ranks the fixed layer next to `free_layer` unless `free_layer` starts the sweep.
pub(crate) fn rank_fixed_layer(ctx: &mut LayerContext<'_>, free_layer: usize, forward: bool) {
    if free_layer != first_index(forward, ctx.order.len()) {
        let fixed = fixed_index(forward, free_layer);
        ctx.ports
            .calculate_port_ranks(ctx.graph, &ctx.order[fixed], fixed_port_type(forward));
    }
}

/// Whether a layer's current order already carries information worth interpolating from.
pub(crate) fn is_pre_ordered(g: &LayeredGraph, layer: &[NodeId], first_sweep: bool) -> bool {
    !first_sweep
        || layer
            .first()
            .is_some_and(|&n| g.node(n).kind == NodeKind::ExternalPort)
}

impl CrossingMinimizationHeuristic for BarycenterHeuristic {
    fn set_first_layer_order(&mut self, ctx: &mut LayerContext<'_>, forward: bool) -> bool {
        let start = first_index(forward, ctx.order.len());
        let Some(layer) = ctx.order.get(start) else {
            return false;
        };
        let mut nodes = layer.clone();
        self.minimize_layer(
            ctx.graph,
            ctx.ports.port_ranks(),
            ctx.random,
            &mut nodes,
            false,
            true,
            forward,
        );
        ctx.order[start] = nodes;
        false
    }

    fn minimize_crossings(
        &mut self,
        ctx: &mut LayerContext<'_>,
        free_layer: usize,
        forward: bool,
        first_sweep: bool,
    ) -> bool {
        rank_fixed_layer(ctx, free_layer, forward);
        let pre_ordered = is_pre_ordered(ctx.graph, &ctx.order[free_layer], first_sweep);
        let mut nodes = ctx.order[free_layer].clone();
        self.minimize_layer(
            ctx.graph,
            ctx.ports.port_ranks(),
            ctx.random,
            &mut nodes,
            pre_ordered,
            false,
            forward,
        );
        ctx.order[free_layer] = nodes;
        false
    }

    fn always_improves(&self) -> bool {
        false
    }

    fn is_deterministic(&self) -> bool {
        false
    }
}
