//! Barycenter ordering that never contradicts the input model order.
//!
//! Comparisons are remembered transitively while one layer is sorted: once `a < b` and `b < c`
//! were decided, `a < c` holds regardless of what model order or barycenters say. The resulting
//! comparator is not a total order, so the layer is sorted with an insertion sort.

use super::barycenter::{BarycenterHeuristic, compare_barycenters, is_pre_ordered, rank_fixed_layer};
use super::{CrossingMinimizationHeuristic, LayerContext};
use crate::distribution::PortDistribution;
use crate::util::{first_index, insertion_sort_by};
use lamina_graph::{LayeredGraph, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct ModelOrderHeuristic {
    base: BarycenterHeuristic,
    /// For every node, the nodes already known to sort before it.
    smaller: FxHashMap<NodeId, FxHashSet<NodeId>>,
    /// For every node, the nodes already known to sort after it.
    bigger: FxHashMap<NodeId, FxHashSet<NodeId>>,
}

impl ModelOrderHeuristic {
    pub fn new(g: &LayeredGraph) -> Self {
        Self {
            base: BarycenterHeuristic::new(g),
            smaller: FxHashMap::default(),
            bigger: FxHashMap::default(),
        }
    }

    fn sort_layer(&mut self, g: &LayeredGraph, nodes: &mut Vec<NodeId>) {
        if nodes.len() > 1 {
            insertion_sort_by(nodes, |&a, &b| self.compare(g, a, b));
            self.base
                .resolver
                .process_constraints(g, nodes, &mut self.base.states);
        }
        self.smaller.clear();
        self.bigger.clear();
    }

    fn compare(&mut self, g: &LayeredGraph, a: NodeId, b: NodeId) -> Ordering {
        let known = self.known_order(a, b);
        if known != Ordering::Equal {
            return known;
        }
        let value = match (g.node(a).model_order, g.node(b).model_order) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => compare_barycenters(
                self.base.states[a.index()].barycenter,
                self.base.states[b.index()].barycenter,
            ),
        };
        match value {
            Ordering::Less => self.record(a, b),
            Ordering::Greater => self.record(b, a),
            Ordering::Equal => {}
        }
        value
    }

    fn known_order(&self, a: NodeId, b: NodeId) -> Ordering {
        if self.bigger.get(&a).is_some_and(|s| s.contains(&b)) {
            Ordering::Less
        } else if self.smaller.get(&a).is_some_and(|s| s.contains(&b)) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Records `low < high` together with everything it implies.
    fn record(&mut self, low: NodeId, high: NodeId) {
        let mut lows: Vec<NodeId> = vec![low];
        lows.extend(self.smaller.get(&low).into_iter().flatten().copied());
        let mut highs: Vec<NodeId> = vec![high];
        highs.extend(self.bigger.get(&high).into_iter().flatten().copied());

        for &l in &lows {
            self.bigger.entry(l).or_default().extend(highs.iter().copied());
        }
        for &h in &highs {
            self.smaller.entry(h).or_default().extend(lows.iter().copied());
        }
    }
}

impl CrossingMinimizationHeuristic for ModelOrderHeuristic {
    fn set_first_layer_order(&mut self, ctx: &mut LayerContext<'_>, forward: bool) -> bool {
        let start = first_index(forward, ctx.order.len());
        let Some(layer) = ctx.order.get(start) else {
            return false;
        };
        let mut nodes = layer.clone();
        self.base.randomize_barycenters(&nodes, ctx.random);
        self.sort_layer(ctx.graph, &mut nodes);
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
        self.base.calculate_barycenters(
            ctx.graph,
            ctx.ports.port_ranks(),
            ctx.random,
            &nodes,
            forward,
        );
        self.base
            .fill_in_unknown_barycenters(&nodes, pre_ordered, ctx.random);
        self.sort_layer(ctx.graph, &mut nodes);
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
