//! Median heuristic.

use super::barycenter::{BarycenterState, compare_barycenters, rank_fixed_layer};
use super::{CrossingMinimizationHeuristic, LayerContext};
use crate::constraints::ConstraintResolver;
use crate::distribution::PortDistribution;
use lamina_graph::{LayeredGraph, NodeId};

/// Orders a free layer by the median rank of each node's neighbors in the fixed layer.
///
/// Nodes without fixed-layer neighbors take the mean of the medians that do exist (or keep their
/// index if none exist). No randomness is involved.
#[derive(Debug, Clone)]
pub struct MedianHeuristic {
    states: Vec<BarycenterState>,
    resolver: ConstraintResolver,
    neighbor_ranks: Vec<f64>,
}

impl MedianHeuristic {
    pub fn new(g: &LayeredGraph) -> Self {
        Self {
            states: vec![BarycenterState::default(); g.node_count()],
            resolver: ConstraintResolver::new(g),
            neighbor_ranks: Vec::new(),
        }
    }

    fn median(&mut self, g: &LayeredGraph, ranks: &[f64], node: NodeId, forward: bool) -> Option<f64> {
        self.neighbor_ranks.clear();
        let layer = g.layer_of(node);
        for &port in g.node(node).ports() {
            let others: Vec<_> = if forward {
                g.predecessor_ports(port).collect()
            } else {
                g.successor_ports(port).collect()
            };
            for other in others {
                if g.layer_of(g.node_of(other)) != layer {
                    self.neighbor_ranks.push(ranks[other.index()]);
                }
            }
        }
        let n = self.neighbor_ranks.len();
        if n == 0 {
            return None;
        }
        self.neighbor_ranks.sort_by(f64::total_cmp);
        Some(if n % 2 == 1 {
            self.neighbor_ranks[n / 2]
        } else {
            (self.neighbor_ranks[n / 2 - 1] + self.neighbor_ranks[n / 2]) / 2.0
        })
    }
}

impl CrossingMinimizationHeuristic for MedianHeuristic {
    fn set_first_layer_order(&mut self, _ctx: &mut LayerContext<'_>, _forward: bool) -> bool {
        false
    }

    fn minimize_crossings(
        &mut self,
        ctx: &mut LayerContext<'_>,
        free_layer: usize,
        forward: bool,
        _first_sweep: bool,
    ) -> bool {
        rank_fixed_layer(ctx, free_layer, forward);
        let mut nodes = ctx.order[free_layer].clone();
        let ranks = ctx.ports.port_ranks();

        let medians: Vec<Option<f64>> = nodes
            .iter()
            .map(|&n| self.median(ctx.graph, ranks, n, forward))
            .collect();
        let defined: Vec<f64> = medians.iter().flatten().copied().collect();
        let fallback = if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum::<f64>() / defined.len() as f64)
        };
        for (i, (&node, median)) in nodes.iter().zip(&medians).enumerate() {
            let value = median.or(fallback).unwrap_or(i as f64);
            self.states[node.index()] = BarycenterState {
                summed_weight: value,
                degree: 1,
                barycenter: Some(value),
                visited: true,
            };
        }

        if nodes.len() > 1 {
            let states = &self.states;
            nodes.sort_by(|a, b| {
                compare_barycenters(states[a.index()].barycenter, states[b.index()].barycenter)
            });
            self.resolver
                .process_constraints(ctx.graph, &mut nodes, &mut self.states);
        }
        let changed = nodes != ctx.order[free_layer];
        ctx.order[free_layer] = nodes;
        changed
    }

    fn always_improves(&self) -> bool {
        false
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}
