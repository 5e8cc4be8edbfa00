//! Port distribution: ranking ports and reordering the free ports of a node.
//!
//! Every distributor can assign ranks to the ports of a layer (heuristics read them as the
//! positions of fixed-layer neighbors). The barycenter distributors reorder ports by the mean
//! rank of their neighbors; the greedy distributor swaps adjacent ports while that removes
//! crossings.

mod barycenter;
mod greedy;
mod rank;

pub use barycenter::BarycenterPortDistributor;
pub use greedy::GreedyPortDistributor;
pub use rank::{PortRanks, RankPolicy};

use lamina_graph::{GraphId, LayeredGraph, NodeId, PortType};

/// Read access to the current order of nested graphs while their parent is being modified.
pub trait NestedOrderLookup {
    fn nested(&self, graph: GraphId) -> Option<(&LayeredGraph, &[Vec<NodeId>])>;
}

/// Lookup for flat graphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNestedGraphs;

impl NestedOrderLookup for NoNestedGraphs {
    fn nested(&self, _graph: GraphId) -> Option<(&LayeredGraph, &[Vec<NodeId>])> {
        None
    }
}

pub trait PortDistribution {
    /// Rank of every port as last assigned by [`calculate_port_ranks`](Self::calculate_port_ranks).
    fn port_ranks(&self) -> &[f64];

    /// Ranks the ports of `layer` that have edges of `port_type`.
    fn calculate_port_ranks(&mut self, g: &LayeredGraph, layer: &[NodeId], port_type: PortType);

    /// Reorders ports after the heuristic placed layer `free_layer`. Returns whether the port
    /// order improved in a way that makes another sweep worthwhile.
    fn distribute_ports_while_sweeping(
        &mut self,
        g: &mut LayeredGraph,
        nested: &dyn NestedOrderLookup,
        order: &[Vec<NodeId>],
        free_layer: usize,
        forward: bool,
    ) -> bool;
}

#[derive(Debug, Clone)]
pub enum PortDistributor {
    Barycenter(BarycenterPortDistributor),
    Greedy(GreedyPortDistributor),
}

impl PortDistributor {
    pub fn barycenter(g: &LayeredGraph, policy: RankPolicy) -> Self {
        PortDistributor::Barycenter(BarycenterPortDistributor::new(g, policy))
    }

    pub fn greedy(g: &LayeredGraph, policy: RankPolicy) -> Self {
        PortDistributor::Greedy(GreedyPortDistributor::new(g, policy))
    }

    pub fn policy(&self) -> RankPolicy {
        match self {
            PortDistributor::Barycenter(d) => d.policy(),
            PortDistributor::Greedy(d) => d.policy(),
        }
    }
}

impl PortDistribution for PortDistributor {
    fn port_ranks(&self) -> &[f64] {
        match self {
            PortDistributor::Barycenter(d) => d.port_ranks(),
            PortDistributor::Greedy(d) => d.port_ranks(),
        }
    }

    fn calculate_port_ranks(&mut self, g: &LayeredGraph, layer: &[NodeId], port_type: PortType) {
        match self {
            PortDistributor::Barycenter(d) => d.calculate_port_ranks(g, layer, port_type),
            PortDistributor::Greedy(d) => d.calculate_port_ranks(g, layer, port_type),
        }
    }

    fn distribute_ports_while_sweeping(
        &mut self,
        g: &mut LayeredGraph,
        nested: &dyn NestedOrderLookup,
        order: &[Vec<NodeId>],
        free_layer: usize,
        forward: bool,
    ) -> bool {
        match self {
            PortDistributor::Barycenter(d) => {
                d.distribute_ports_while_sweeping(g, nested, order, free_layer, forward)
            }
            PortDistributor::Greedy(d) => {
                d.distribute_ports_while_sweeping(g, nested, order, free_layer, forward)
            }
        }
    }
}
