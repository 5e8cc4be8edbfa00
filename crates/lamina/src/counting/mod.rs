//! Crossing counting.
//!
//! A [`CrossingCounter`] is chosen once per graph: graphs without ports carrying several
//! edges are counted exactly; otherwise layer gaps containing such ports switch to the
//! hyperedge approximation.

mod between_layers;
mod hyperedge;
mod in_layer;
mod index_tree;
mod two_node;

pub use between_layers::CrossingsCounter;
pub use hyperedge::HyperedgeCrossingsCounter;
pub use in_layer::InLayerCrossingsCounter;
pub use two_node::{LayerPortPositions, count_pair_crossings};

use lamina_graph::{LayeredGraph, NodeId, NodeKind, PortSide};

/// Crossing counts for the two shapes a sweep asks about.
pub trait CrossingCount {
    /// Crossings of the edges between two adjacent layers (including in-layer edges on the
    /// facing sides).
    fn count_between(&mut self, g: &LayeredGraph, left: &[NodeId], right: &[NodeId]) -> usize;

    /// Crossings caused entirely inside one layer.
    fn count_within(&mut self, g: &LayeredGraph, layer: &[NodeId]) -> usize;
}

/// Per-layer facts the counters need, gathered once per graph.
#[derive(Debug, Clone, Default)]
pub struct LayerFacts {
    pub in_layer_edges: Vec<usize>,
    pub north_south_ports: Vec<bool>,
    /// Whether the gap between layer `i` and `i + 1` has a port with several edges.
    pub hyperedges_east_of: Vec<bool>,
}

impl LayerFacts {
    pub fn of(g: &LayeredGraph) -> Self {
        let layers = g.layers().len();
        let mut facts = Self {
            in_layer_edges: vec![0; layers],
            north_south_ports: vec![false; layers],
            hyperedges_east_of: vec![false; layers],
        };
        for edge in g.edge_ids() {
            if g.is_in_layer(edge) && !g.is_self_loop(edge) {
                let layer = g.layer_of(g.node_of(g.edge(edge).source()));
                facts.in_layer_edges[layer.index()] += 1;
            }
        }
        for (i, layer) in g.layers().iter().enumerate() {
            for &node in layer.nodes() {
                if g.node(node).kind == NodeKind::NorthSouthPort {
                    facts.north_south_ports[i] = true;
                }
                for &port in g.node(node).ports() {
                    let p = g.port(port);
                    if p.degree() <= 1 {
                        continue;
                    }
                    match p.side {
                        PortSide::East if i + 1 < layers => facts.hyperedges_east_of[i] = true,
                        PortSide::West if i > 0 => facts.hyperedges_east_of[i - 1] = true,
                        _ => {}
                    }
                }
            }
        }
        facts
    }

    fn layer_index(g: &LayeredGraph, layer: &[NodeId]) -> Option<usize> {
        layer.first().map(|&n| g.layer_of(n).index())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Exact,
    HyperedgeAware,
}

/// Exact between-layer counting plus in-layer estimates.
#[derive(Debug, Clone)]
pub struct ExactCounter {
    facts: LayerFacts,
    crossings: CrossingsCounter,
    in_layer: InLayerCrossingsCounter,
}

impl ExactCounter {
    pub fn new(g: &LayeredGraph, facts: LayerFacts) -> Self {
        Self {
            facts,
            crossings: CrossingsCounter::new(g.port_count()),
            in_layer: InLayerCrossingsCounter::new(g.node_count(), g.port_count()),
        }
    }

    fn north_south(&mut self, g: &LayeredGraph, layer: &[NodeId]) -> usize {
        self.in_layer.count_north_south_hint_crossings(g, layer)
            + self.in_layer.count_north_south_port_crossings(g, layer)
    }

    /// Crossings on the outer sides of the first and last layer.
    fn outer_sides(&mut self, g: &LayeredGraph, order: &[Vec<NodeId>]) -> usize {
        let (Some(first), Some(last)) = (order.first(), order.last()) else {
            return 0;
        };
        self.crossings
            .count_in_layer_crossings_on_side(g, first, PortSide::West)
            + self
                .crossings
                .count_in_layer_crossings_on_side(g, last, PortSide::East)
    }
}

impl CrossingCount for ExactCounter {
    fn count_between(&mut self, g: &LayeredGraph, left: &[NodeId], right: &[NodeId]) -> usize {
        self.crossings.count_crossings_between_layers(g, left, right)
    }

    fn count_within(&mut self, g: &LayeredGraph, layer: &[NodeId]) -> usize {
        let Some(i) = LayerFacts::layer_index(g, layer) else {
            return 0;
        };
        let mut c = 0;
        if self.facts.in_layer_edges[i] > 0 {
            c += self.in_layer.count_east_west_crossings(g, layer);
        }
        if self.facts.north_south_ports[i] {
            c += self.north_south(g, layer);
        }
        c
    }
}

/// Exact counting, except for layer gaps with hyperedges.
#[derive(Debug, Clone)]
pub struct HyperedgeAwareCounter {
    exact: ExactCounter,
    hyperedges: HyperedgeCrossingsCounter,
}

impl HyperedgeAwareCounter {
    pub fn new(g: &LayeredGraph, facts: LayerFacts) -> Self {
        Self {
            exact: ExactCounter::new(g, facts),
            hyperedges: HyperedgeCrossingsCounter::new(g.port_count()),
        }
    }
}

impl CrossingCount for HyperedgeAwareCounter {
    fn count_between(&mut self, g: &LayeredGraph, left: &[NodeId], right: &[NodeId]) -> usize {
        let hyper = LayerFacts::layer_index(g, left)
            .is_some_and(|i| self.exact.facts.hyperedges_east_of[i]);
        if !hyper {
            return self.exact.count_between(g, left, right);
        }
        self.hyperedges.count_crossings(g, left, right)
            + self
                .exact
                .crossings
                .count_in_layer_crossings_on_side(g, left, PortSide::East)
            + self
                .exact
                .crossings
                .count_in_layer_crossings_on_side(g, right, PortSide::West)
    }

    fn count_within(&mut self, g: &LayeredGraph, layer: &[NodeId]) -> usize {
        self.exact.count_within(g, layer)
    }
}

#[derive(Debug, Clone)]
pub enum CrossingCounter {
    Exact(ExactCounter),
    HyperedgeAware(HyperedgeAwareCounter),
}

impl CrossingCounter {
    /// Picks the counter variant suited to `g`.
    pub fn for_graph(g: &LayeredGraph) -> Self {
        let facts = LayerFacts::of(g);
        if facts.hyperedges_east_of.iter().any(|&h| h) {
            CrossingCounter::HyperedgeAware(HyperedgeAwareCounter::new(g, facts))
        } else {
            CrossingCounter::Exact(ExactCounter::new(g, facts))
        }
    }

    pub fn kind(&self) -> CounterKind {
        match self {
            CrossingCounter::Exact(_) => CounterKind::Exact,
            CrossingCounter::HyperedgeAware(_) => CounterKind::HyperedgeAware,
        }
    }

    fn exact_mut(&mut self) -> &mut ExactCounter {
        match self {
            CrossingCounter::Exact(c) => c,
            CrossingCounter::HyperedgeAware(c) => &mut c.exact,
        }
    }

    fn facts(&self) -> &LayerFacts {
        match self {
            CrossingCounter::Exact(c) => &c.facts,
            CrossingCounter::HyperedgeAware(c) => &c.exact.facts,
        }
    }

    /// Whether `layer` has anything [`count_within`](CrossingCount::count_within) can see.
    pub fn has_in_layer_crossings(&self, layer: usize) -> bool {
        let facts = self.facts();
        facts.in_layer_edges.get(layer).is_some_and(|&c| c > 0)
            || facts.north_south_ports.get(layer).is_some_and(|&b| b)
    }

    /// Total crossings of a complete node order.
    pub fn count_all(&mut self, g: &LayeredGraph, order: &[Vec<NodeId>]) -> usize {
        let mut crossings = self.exact_mut().outer_sides(g, order);
        for (i, layer) in order.iter().enumerate() {
            if let Some(right) = order.get(i + 1) {
                crossings += self.count_between(g, layer, right);
            }
            if self.facts().north_south_ports.get(i).is_some_and(|&b| b) {
                crossings += self.exact_mut().north_south(g, layer);
            }
        }
        crossings
    }
}

impl CrossingCount for CrossingCounter {
    fn count_between(&mut self, g: &LayeredGraph, left: &[NodeId], right: &[NodeId]) -> usize {
        match self {
            CrossingCounter::Exact(c) => c.count_between(g, left, right),
            CrossingCounter::HyperedgeAware(c) => c.count_between(g, left, right),
        }
    }

    fn count_within(&mut self, g: &LayeredGraph, layer: &[NodeId]) -> usize {
        match self {
            CrossingCounter::Exact(c) => c.count_within(g, layer),
            CrossingCounter::HyperedgeAware(c) => c.count_within(g, layer),
        }
    }
}

/// Total crossings of `g` in its current layer order.
pub fn count_crossings(g: &LayeredGraph) -> usize {
    CrossingCounter::for_graph(g).count_all(g, &g.node_order())
}
