use super::{CrossingMinimizationHeuristic, LayerContext};

/// Leaves every layer as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHeuristic;

impl CrossingMinimizationHeuristic for NoOpHeuristic {
    fn set_first_layer_order(&mut self, _ctx: &mut LayerContext<'_>, _forward: bool) -> bool {
        false
    }

    fn minimize_crossings(
        &mut self,
        _ctx: &mut LayerContext<'_>,
        _free_layer: usize,
        _forward: bool,
        _first_sweep: bool,
    ) -> bool {
        false
    }

    fn always_improves(&self) -> bool {
        false
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}
