//! Per-graph state of one minimization.

use crate::counting::CrossingCounter;
use crate::distribution::{PortDistributor, RankPolicy};
use crate::heuristics::{CrossingMinimizationHeuristic, Heuristic};
use crate::options::{CrossMinOptions, PortDistributionStrategy};
use crate::random::Random;
use lamina_graph::{GraphId, Hierarchy, LayerId, LayeredGraph, NodeId, NodeKind, PortId, PortSide};

/// Node order of every layer plus the port order of every node, taken at one point of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepCopy {
    nodes: Vec<Vec<NodeId>>,
    ports: Vec<Vec<PortId>>,
}

impl SweepCopy {
    pub fn new(g: &LayeredGraph, order: &[Vec<NodeId>]) -> Self {
        Self {
            nodes: order.to_vec(),
            ports: g.node_ids().map(|n| g.node(n).ports().to_vec()).collect(),
        }
    }

    pub fn nodes(&self) -> &[Vec<NodeId>] {
        &self.nodes
    }

    pub fn port_order(&self, node: NodeId) -> &[PortId] {
        &self.ports[node.index()]
    }

    /// Writes the copy into `g`'s layers and port lists.
    pub fn transfer(&self, g: &mut LayeredGraph) {
        for (i, layer) in self.nodes.iter().enumerate() {
            g.set_layer_order(LayerId::new(i), layer.clone());
        }
        for (i, ports) in self.ports.iter().enumerate() {
            g.set_port_order(NodeId::new(i), ports.clone());
        }
    }
}

/// Everything the sweep keeps for one graph of the hierarchy.
#[derive(Debug, Clone)]
pub struct GraphInfo {
    pub id: GraphId,
    pub parent: Option<(GraphId, NodeId)>,
    /// Working order; heuristics reorder it in place.
    pub order: Vec<Vec<NodeId>>,
    pub currently_best: Option<SweepCopy>,
    pub best: Option<SweepCopy>,
    pub heuristic: Heuristic,
    pub distributor: PortDistributor,
    pub counter: CrossingCounter,
    /// Optimized on its own rather than as part of its parent's sweep.
    pub is_leaf: bool,
    pub has_external_ports: bool,
    /// For leaves: this graph followed by every nested graph swept together with it.
    pub members: Vec<GraphId>,
}

impl GraphInfo {
    pub fn new(g: &LayeredGraph, options: &CrossMinOptions, random: &mut Random) -> Self {
        let policy = if random.next_bool() {
            RankPolicy::NodeRelative
        } else {
            RankPolicy::LayerTotal
        };
        let distributor = match options.port_distribution {
            PortDistributionStrategy::Barycenter => PortDistributor::barycenter(g, policy),
            PortDistributionStrategy::Greedy => PortDistributor::greedy(g, policy),
        };
        let heuristic = Heuristic::for_graph(g, options);
        // Deterministic heuristics sweep into nested graphs unless told otherwise.
        let is_leaf = g.parent().is_none()
            || options.bottom_up()
            || (!heuristic.is_deterministic()
                && connectivity(g) < options.hierarchical.recursive_boundary);
        Self {
            id: g.id(),
            parent: g.parent(),
            order: g.node_order(),
            currently_best: None,
            best: None,
            heuristic,
            distributor,
            counter: CrossingCounter::for_graph(g),
            is_leaf,
            has_external_ports: g.has_external_ports(),
            members: Vec::new(),
        }
    }
}

/// Builds the infos of every graph in `hierarchy`, indexed by graph id.
///
/// Rank policies are drawn in breadth-first graph order.
pub fn build_infos(hierarchy: &Hierarchy, options: &CrossMinOptions, random: &mut Random) -> Vec<GraphInfo> {
    let mut slots: Vec<Option<GraphInfo>> = vec![None; hierarchy.len()];
    for id in hierarchy.breadth_first() {
        slots[id.index()] = Some(GraphInfo::new(hierarchy.graph(id), options, random));
    }
    // Graphs detached from the tree still get an info so indices line up.
    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.unwrap_or_else(|| GraphInfo::new(hierarchy.graph(GraphId::new(i)), options, random))
        })
        .collect()
}

/// Fills in the member lists of every leaf: the leaf itself followed by the non-leaf nested
/// graphs reachable from it through other non-leaf nested graphs.
pub fn assign_members(hierarchy: &Hierarchy, infos: &mut [GraphInfo]) {
    for i in 0..infos.len() {
        if !infos[i].is_leaf {
            continue;
        }
        let mut members = vec![infos[i].id];
        let mut next = 0;
        while next < members.len() {
            let g = hierarchy.graph(members[next]);
            for layer in g.layers() {
                for &node in layer.nodes() {
                    let Some(child) = g.node(node).nested_graph() else {
                        continue;
                    };
                    if !infos[child.index()].is_leaf {
                        members.push(child);
                    }
                }
            }
            next += 1;
        }
        infos[i].members = members;
    }
}

/// How strongly the content of a nested graph is tied to its external ports: the mean of the
/// western and eastern [`side_connectivity`].
pub fn connectivity(g: &LayeredGraph) -> f64 {
    (side_connectivity(g, PortSide::West) + side_connectivity(g, PortSide::East)) / 2.0
}

/// Ratio of external-port dummies reaching into the graph on `side` to content nodes without a
/// port on `side`.
pub fn side_connectivity(g: &LayeredGraph, side: PortSide) -> f64 {
    let mut outside = 0usize;
    let mut unconnected = 0usize;
    for layer in g.layers() {
        let nodes = layer.nodes();
        let external = nodes
            .first()
            .is_some_and(|&n| g.node(n).kind == NodeKind::ExternalPort);
        if external {
            outside += nodes
                .iter()
                .filter(|&&n| g.has_ports_on_side(n, side.opposed()))
                .count();
        } else {
            unconnected += nodes
                .iter()
                .filter(|&&n| !g.has_ports_on_side(n, side))
                .count();
        }
    }
    if outside < 2 {
        0.0
    } else if unconnected == 0 {
        1.0
    } else {
        outside as f64 / unconnected as f64
    }
}
