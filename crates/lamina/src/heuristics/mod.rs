//! Layer ordering heuristics.
//!
//! A sweep fixes one layer and lets a heuristic reorder its neighbor (the free layer), then
//! moves on. Heuristics only see the order they are asked to change; port ranks come from the
//! graph's port distributor and crossing counts from its counter.

mod barycenter;
mod greedy_switch;
mod interactive;
mod median;
mod model_order;
mod no_op;

pub use barycenter::{BarycenterHeuristic, BarycenterState};
pub use greedy_switch::GreedySwitchHeuristic;
pub use interactive::InteractiveHeuristic;
pub use median::MedianHeuristic;
pub use model_order::ModelOrderHeuristic;
pub use no_op::NoOpHeuristic;

use crate::counting::CrossingCounter;
use crate::distribution::PortDistributor;
use crate::options::{CrossMinOptions, CrossMinStrategy};
use crate::random::Random;
use lamina_graph::{LayeredGraph, NodeId};

/// Everything a heuristic may read or change while one graph is swept.
pub struct LayerContext<'a> {
    pub graph: &'a LayeredGraph,
    pub order: &'a mut [Vec<NodeId>],
    pub ports: &'a mut PortDistributor,
    pub counter: &'a mut CrossingCounter,
    pub random: &'a mut Random,
}

pub trait CrossingMinimizationHeuristic {
    /// Orders the layer a sweep starts with. Returns whether the order improved.
    fn set_first_layer_order(&mut self, ctx: &mut LayerContext<'_>, forward: bool) -> bool;

    /// Reorders `free_layer` against its already placed neighbor. Returns whether the order
    /// improved in a way that justifies another sweep.
    fn minimize_crossings(
        &mut self,
        ctx: &mut LayerContext<'_>,
        free_layer: usize,
        forward: bool,
        first_sweep: bool,
    ) -> bool;

    /// Whether every change this heuristic reports is a strict improvement, so no crossing
    /// counts are needed to decide when to stop sweeping.
    fn always_improves(&self) -> bool;

    /// Whether the heuristic draws no random numbers; deterministic heuristics run once.
    fn is_deterministic(&self) -> bool;
}

/// The heuristic chosen for one graph.
#[derive(Debug, Clone)]
pub enum Heuristic {
    Barycenter(BarycenterHeuristic),
    GreedySwitch(GreedySwitchHeuristic),
    Median(MedianHeuristic),
    ModelOrder(ModelOrderHeuristic),
    Interactive(InteractiveHeuristic),
    NoOp(NoOpHeuristic),
}

impl Heuristic {
    pub fn for_graph(g: &LayeredGraph, options: &CrossMinOptions) -> Self {
        match options.strategy {
            CrossMinStrategy::Barycenter => Heuristic::Barycenter(BarycenterHeuristic::new(g)),
            CrossMinStrategy::GreedySwitch => {
                Heuristic::GreedySwitch(GreedySwitchHeuristic::new(g, options.greedy_switch))
            }
            CrossMinStrategy::Median => Heuristic::Median(MedianHeuristic::new(g)),
            CrossMinStrategy::ModelOrder => Heuristic::ModelOrder(ModelOrderHeuristic::new(g)),
            CrossMinStrategy::Interactive => Heuristic::Interactive(InteractiveHeuristic::new()),
            CrossMinStrategy::None => Heuristic::NoOp(NoOpHeuristic),
        }
    }

    fn inner(&mut self) -> &mut dyn CrossingMinimizationHeuristic {
        match self {
            Heuristic::Barycenter(h) => h,
            Heuristic::GreedySwitch(h) => h,
            Heuristic::Median(h) => h,
            Heuristic::ModelOrder(h) => h,
            Heuristic::Interactive(h) => h,
            Heuristic::NoOp(h) => h,
        }
    }

    fn inner_ref(&self) -> &dyn CrossingMinimizationHeuristic {
        match self {
            Heuristic::Barycenter(h) => h,
            Heuristic::GreedySwitch(h) => h,
            Heuristic::Median(h) => h,
            Heuristic::ModelOrder(h) => h,
            Heuristic::Interactive(h) => h,
            Heuristic::NoOp(h) => h,
        }
    }
}

impl CrossingMinimizationHeuristic for Heuristic {
    fn set_first_layer_order(&mut self, ctx: &mut LayerContext<'_>, forward: bool) -> bool {
        self.inner().set_first_layer_order(ctx, forward)
    }

    fn minimize_crossings(
        &mut self,
        ctx: &mut LayerContext<'_>,
        free_layer: usize,
        forward: bool,
        first_sweep: bool,
    ) -> bool {
        self.inner()
            .minimize_crossings(ctx, free_layer, forward, first_sweep)
    }

    fn always_improves(&self) -> bool {
        self.inner_ref().always_improves()
    }

    fn is_deterministic(&self) -> bool {
        self.inner_ref().is_deterministic()
    }
}
