//! Position-preserving ordering.
//!
//! Every node is placed where it was in the previous drawing. Long-edge dummies have no position
//! of their own; their vertical position is where the previous edge path crosses the layer.

use super::{CrossingMinimizationHeuristic, LayerContext};
use crate::util::{first_index, insertion_sort_by};
use lamina_graph::{LayeredGraph, NodeId, NodeKind, Origin, Point, PortSide};
use std::cmp::Ordering;

#[derive(Debug, Clone, Default)]
pub struct InteractiveHeuristic;

impl InteractiveHeuristic {
    pub fn new() -> Self {
        Self
    }

    /// Sorts `layer` by previous vertical position. In-layer successor constraints decide ties.
    pub fn order_layer(g: &LayeredGraph, layer: &mut [NodeId]) {
        if layer.is_empty() {
            return;
        }
        let horizontal = layer.iter().map(|&n| g.node(n).center().x).sum::<f64>() / layer.len() as f64;
        let mut keyed: Vec<(NodeId, f64)> = layer
            .iter()
            .map(|&n| (n, vertical_position(g, n, horizontal)))
            .collect();
        insertion_sort_by(&mut keyed, |&(a, pa), &(b, pb)| {
            match pa.total_cmp(&pb) {
                Ordering::Equal => {
                    if g.node(a).successor_constraints.contains(&b) {
                        Ordering::Less
                    } else if g.node(b).successor_constraints.contains(&a) {
                        Ordering::Greater
                    } else {
                        Ordering::Equal
                    }
                }
                unequal => unequal,
            }
        });
        for (slot, (node, _)) in layer.iter_mut().zip(keyed) {
            *slot = node;
        }
    }
}

fn vertical_position(g: &LayeredGraph, node: NodeId, horizontal: f64) -> f64 {
    let n = g.node(node);
    match n.kind {
        NodeKind::LongEdge => {
            if let Some(Origin::Edge(edge)) = n.origin {
                let e = g.edge(edge);
                if e.original_path.len() >= 2 {
                    let mut path = e.original_path.clone();
                    if e.reversed {
                        path.reverse();
                    }
                    return interpolate(&path, horizontal);
                }
            }
            n.center().y
        }
        NodeKind::NorthSouthPort => {
            let Some(Origin::Node(owner)) = n.origin else {
                return n.center().y;
            };
            let owner_node = g.node(owner);
            let south = n.ports().iter().any(|&p| {
                g.port(p)
                    .origin
                    .is_some_and(|o| g.port(o).side == PortSide::South)
            });
            if south {
                owner_node.position.y + owner_node.size.height
            } else {
                owner_node.position.y
            }
        }
        _ => n.center().y,
    }
}

/// Y coordinate where the polyline `path` crosses the vertical line at `x`.
///
/// Outside the path's horizontal range the nearest endpoint's y is used.
fn interpolate(path: &[Point], x: f64) -> f64 {
    for pair in path.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (lo, hi) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
        if x >= lo && x <= hi {
            if hi - lo <= f64::EPSILON {
                return (a.y + b.y) / 2.0;
            }
            return a.y + (x - a.x) * (b.y - a.y) / (b.x - a.x);
        }
    }
    match (path.first(), path.last()) {
        (Some(first), Some(last)) => {
            if (x - first.x).abs() <= (x - last.x).abs() {
                first.y
            } else {
                last.y
            }
        }
        _ => 0.0,
    }
}

impl CrossingMinimizationHeuristic for InteractiveHeuristic {
    fn set_first_layer_order(&mut self, ctx: &mut LayerContext<'_>, forward: bool) -> bool {
        let start = first_index(forward, ctx.order.len());
        let Some(layer) = ctx.order.get_mut(start) else {
            return false;
        };
        let before = layer.clone();
        Self::order_layer(ctx.graph, layer);
        *layer != before
    }

    fn minimize_crossings(
        &mut self,
        ctx: &mut LayerContext<'_>,
        free_layer: usize,
        _forward: bool,
        _first_sweep: bool,
    ) -> bool {
        let layer = &mut ctx.order[free_layer];
        let before = layer.clone();
        Self::order_layer(ctx.graph, layer);
        *layer != before
    }

    fn always_improves(&self) -> bool {
        false
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}
