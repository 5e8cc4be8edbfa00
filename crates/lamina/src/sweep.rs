//! Layer sweep orchestration.
//!
//! Graphs marked as leaves are optimized one at a time, deepest first. A leaf's sweep walks its
//! layers back and forth; whenever a layer holds a compound node whose nested graph is not a
//! leaf, the sweep descends into that graph before moving on, so the whole subtree is counted and
//! optimized as one. Once a nested leaf is done, its external-port order is fixed onto the
//! parent node's ports.

use crate::counting::count_crossings;
use crate::distribution::{NestedOrderLookup, PortDistribution};
use crate::error::Result;
use crate::heuristics::{CrossingMinimizationHeuristic, GreedySwitchHeuristic, Heuristic, LayerContext};
use crate::info::{GraphInfo, SweepCopy, assign_members, build_infos};
use crate::options::CrossMinOptions;
use crate::progress::ProgressMonitor;
use crate::random::Random;
use crate::util::{end_index, first_index, free_layers, in_north_south_east_west_order};
use lamina_graph::{
    GraphId, Hierarchy, LayeredGraph, NodeId, NodeKind, Origin, PortConstraints, PortId, PortSide, Rest,
    split_one_mut,
};
use serde::Serialize;
use tracing::{debug, trace};

/// Outcome of [`minimize_crossings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CrossMinResult {
    /// Crossings of the committed order, summed over every graph of the hierarchy.
    pub crossings: usize,
    /// Number of sweep runs executed (post-passes included).
    pub runs: usize,
    /// Whether the progress monitor asked to stop before all work was done.
    pub cancelled: bool,
}

/// Orders the nodes of every layer and the ports of every node of `hierarchy` so that few edges
/// cross.
///
/// The hierarchy is validated first; on error nothing is modified. Cancellation through
/// `monitor` leaves every graph with the best order that was completely saved.
pub fn minimize_crossings(
    hierarchy: &mut Hierarchy,
    options: &CrossMinOptions,
    monitor: &mut dyn ProgressMonitor,
) -> Result<CrossMinResult> {
    options.validate()?;
    hierarchy.validate()?;

    let root = hierarchy.root();
    if root.is_empty() || (root.node_count() == 1 && hierarchy.len() == 1) {
        debug!("nothing to order");
        return Ok(CrossMinResult::default());
    }

    let mut random = Random::new(options.random_seed);
    let mut infos = build_infos(hierarchy, options, &mut random);
    assign_members(hierarchy, &mut infos);
    let run_seed = random.next_u64();

    // Breadth-first order reversed: children before their parents.
    let leaves: Vec<GraphId> = hierarchy
        .breadth_first()
        .into_iter()
        .rev()
        .filter(|id| infos[id.index()].is_leaf)
        .collect();
    debug!(
        graphs = infos.len(),
        leaves = leaves.len(),
        strategy = ?options.strategy,
        "minimizing crossings"
    );
    monitor.begin("Layer sweep crossing minimization", leaves.len() as f64);

    let mut sweeper = Sweeper {
        graphs: hierarchy.graphs_mut(),
        infos: &mut infos,
        random,
        run_seed,
        thoroughness: options.thoroughness,
        monitor,
        runs: 0,
        cancelled: false,
        flat: false,
    };

    for &leaf in &leaves {
        if sweeper.check_cancelled() {
            break;
        }
        let crossings = sweeper.minimize_leaf(leaf);
        debug!(graph = leaf.index(), crossings, "graph ordered");
        sweeper.hand_back(leaf);
        sweeper.monitor.worked(1.0);
    }

    for i in 0..sweeper.infos.len() {
        if sweeper.check_cancelled() {
            break;
        }
        let g = &sweeper.graphs[i];
        if !options.greedy_post_pass_applies(g.node_count()) || !post_pass_allowed(g, sweeper.infos) {
            continue;
        }
        let greedy = Heuristic::GreedySwitch(GreedySwitchHeuristic::new(g, options.greedy_switch));
        let previous = std::mem::replace(&mut sweeper.infos[i].heuristic, greedy);
        sweeper.flat = true;
        let crossings = sweeper.minimize_leaf(GraphId::new(i));
        sweeper.flat = false;
        sweeper.infos[i].heuristic = previous;
        debug!(graph = i, crossings, mode = ?options.greedy_switch, "greedy switch post-pass");
    }

    for g in sweeper.graphs.iter_mut() {
        write_back_north_south(g);
    }

    let result = CrossMinResult {
        crossings: sweeper.graphs.iter().map(count_crossings).sum(),
        runs: sweeper.runs,
        cancelled: sweeper.cancelled,
    };
    sweeper.monitor.done();
    debug!(
        crossings = result.crossings,
        runs = result.runs,
        cancelled = result.cancelled,
        "crossing minimization finished"
    );
    Ok(result)
}

/// The post-pass reorders a graph on its own, which must not break the correspondence between
/// external-port dummies and the ports of a compound node.
fn post_pass_allowed(g: &LayeredGraph, infos: &[GraphInfo]) -> bool {
    !infos[g.id().index()].has_external_ports
        && g.node_ids().all(|n| {
            g.node(n)
                .nested_graph()
                .is_none_or(|child| infos[child.index()].is_leaf)
        })
}

struct Sweeper<'a, M: ProgressMonitor + ?Sized> {
    graphs: &'a mut [LayeredGraph],
    infos: &'a mut [GraphInfo],
    random: Random,
    run_seed: u64,
    thoroughness: usize,
    monitor: &'a mut M,
    runs: usize,
    cancelled: bool,
    /// Set while a single graph is swept without descending into nested graphs.
    flat: bool,
}

impl<M: ProgressMonitor + ?Sized> Sweeper<'_, M> {
    fn check_cancelled(&mut self) -> bool {
        if !self.cancelled && self.monitor.is_canceled() {
            debug!("crossing minimization cancelled");
            self.cancelled = true;
        }
        self.cancelled
    }

    fn members(&self, leaf: GraphId) -> Vec<GraphId> {
        if self.flat {
            vec![leaf]
        } else {
            self.infos[leaf.index()].members.clone()
        }
    }

    /// Optimizes `leaf` and the graphs swept with it, then commits the best order found. The
    /// input order counts as the first candidate, so the result is never worse than it. Interactive
    /// ordering is the exception: it always commits the order of the previous drawing.
    fn minimize_leaf(&mut self, leaf: GraphId) -> usize {
        if matches!(self.infos[leaf.index()].heuristic, Heuristic::Interactive(_)) {
            return self.follow_previous_layout(leaf);
        }
        let baseline = self.count(leaf);
        self.save_currently_best(leaf);
        self.save_best(leaf);
        if baseline == 0 {
            debug!(graph = leaf.index(), "input order has no crossings");
            self.commit_best(leaf);
            return 0;
        }

        let heuristic = &self.infos[leaf.index()].heuristic;
        let deterministic = heuristic.is_deterministic();
        let without_counter = deterministic && heuristic.always_improves();
        let runs = if deterministic {
            1
        } else {
            self.random.set_seed(self.run_seed);
            self.thoroughness
        };

        let mut best = baseline;
        for _ in 0..runs {
            if self.check_cancelled() {
                break;
            }
            let crossings = if without_counter {
                self.run_without_counter(leaf)
            } else {
                self.run_with_counter(leaf)
            };
            self.runs += 1;
            debug!(graph = leaf.index(), crossings, "run finished");
            if crossings < best {
                best = crossings;
                self.save_best(leaf);
                if best == 0 {
                    debug!(graph = leaf.index(), "reached zero crossings");
                    break;
                }
            }
        }
        self.commit_best(leaf);
        best
    }

    /// One forward pass that sorts every layer by previous positions. The outcome is committed
    /// even if the input order had fewer crossings.
    fn follow_previous_layout(&mut self, leaf: GraphId) -> usize {
        self.set_first_layer_order(leaf, true);
        self.sweep(leaf, true, true);
        self.runs += 1;
        self.save_currently_best(leaf);
        self.save_best(leaf);
        self.commit_best(leaf);
        let crossings = self.count(leaf);
        debug!(graph = leaf.index(), crossings, "previous layout restored");
        crossings
    }

    /// Sweeps back and forth until a pass no longer lowers the crossing count. Returns the count
    /// of the order saved as currently best.
    fn run_with_counter(&mut self, leaf: GraphId) -> usize {
        let mut forward = self.random.next_bool();
        self.set_first_layer_order(leaf, forward);
        self.sweep(leaf, forward, true);
        let mut crossings = self.count(leaf);
        trace!(graph = leaf.index(), forward, crossings, "first sweep");
        loop {
            self.save_currently_best(leaf);
            if crossings == 0 || self.check_cancelled() {
                return crossings;
            }
            forward = !forward;
            let previous = crossings;
            self.sweep(leaf, forward, false);
            crossings = self.count(leaf);
            trace!(graph = leaf.index(), forward, crossings, "sweep");
            if crossings >= previous {
                return previous;
            }
        }
    }

    /// Sweeps back and forth while the heuristic reports improvements.
    fn run_without_counter(&mut self, leaf: GraphId) -> usize {
        let mut forward = self.random.next_bool();
        self.set_first_layer_order(leaf, forward);
        let mut first = true;
        loop {
            let improved = self.sweep(leaf, forward, first);
            trace!(graph = leaf.index(), forward, improved, "sweep");
            first = false;
            forward = !forward;
            if !improved || self.check_cancelled() {
                break;
            }
        }
        self.save_currently_best(leaf);
        self.count(leaf)
    }

    fn count(&mut self, leaf: GraphId) -> usize {
        let mut crossings = 0;
        for member in self.members(leaf) {
            let info = &mut self.infos[member.index()];
            crossings += info
                .counter
                .count_all(&self.graphs[member.index()], &info.order);
        }
        crossings
    }

    fn save_currently_best(&mut self, leaf: GraphId) {
        for member in self.members(leaf) {
            let i = member.index();
            self.infos[i].currently_best = Some(SweepCopy::new(&self.graphs[i], &self.infos[i].order));
        }
    }

    fn save_best(&mut self, leaf: GraphId) {
        for member in self.members(leaf) {
            let info = &mut self.infos[member.index()];
            info.best = info.currently_best.clone();
        }
    }

    fn commit_best(&mut self, leaf: GraphId) {
        for member in self.members(leaf) {
            let i = member.index();
            let info = &mut self.infos[i];
            if let Some(best) = &info.best {
                best.transfer(&mut self.graphs[i]);
                info.order = best.nodes().to_vec();
            }
        }
    }

    fn set_first_layer_order(&mut self, id: GraphId, forward: bool) -> bool {
        let g = &self.graphs[id.index()];
        let GraphInfo {
            order,
            heuristic,
            distributor,
            counter,
            ..
        } = &mut self.infos[id.index()];
        let mut ctx = LayerContext {
            graph: g,
            order: order.as_mut_slice(),
            ports: distributor,
            counter,
            random: &mut self.random,
        };
        heuristic.set_first_layer_order(&mut ctx, forward)
    }

    fn minimize_layer(&mut self, id: GraphId, free_layer: usize, forward: bool, first_sweep: bool) -> bool {
        let g = &self.graphs[id.index()];
        let GraphInfo {
            order,
            heuristic,
            distributor,
            counter,
            ..
        } = &mut self.infos[id.index()];
        let mut ctx = LayerContext {
            graph: g,
            order: order.as_mut_slice(),
            ports: distributor,
            counter,
            random: &mut self.random,
        };
        heuristic.minimize_crossings(&mut ctx, free_layer, forward, first_sweep)
    }

    fn distribute_ports(&mut self, id: GraphId, layer: usize, forward: bool) -> bool {
        let Some((g, graphs)) = split_one_mut(self.graphs, id.index()) else {
            return false;
        };
        let Some((info, infos)) = split_one_mut(self.infos, id.index()) else {
            return false;
        };
        let nested = NestedOrders { graphs, infos };
        info.distributor
            .distribute_ports_while_sweeping(g, &nested, &info.order, layer, forward)
    }

    /// One pass over all layers of `id` in the given direction.
    fn sweep(&mut self, id: GraphId, forward: bool, first_sweep: bool) -> bool {
        let len = self.infos[id.index()].order.len();
        if len == 0 {
            return false;
        }
        let start = first_index(forward, len);
        let mut improved = self.distribute_ports(id, start, forward);
        improved |= self.sweep_into_nested(id, start, forward, first_sweep);
        for free in free_layers(forward, len) {
            improved |= self.minimize_layer(id, free, forward, first_sweep);
            improved |= self.distribute_ports(id, free, forward);
            improved |= self.sweep_into_nested(id, free, forward, first_sweep);
        }
        improved
    }

    fn sweep_into_nested(&mut self, id: GraphId, layer: usize, forward: bool, first_sweep: bool) -> bool {
        if self.flat {
            return false;
        }
        let nodes = self.infos[id.index()].order[layer].clone();
        let mut improved = false;
        for node in nodes {
            let Some(child) = self.graphs[id.index()].node(node).nested_graph() else {
                continue;
            };
            if !self.infos[child.index()].is_leaf {
                improved |= self.sweep_nested_graph(id, node, child, forward, first_sweep);
            }
        }
        improved
    }

    fn sweep_nested_graph(
        &mut self,
        parent: GraphId,
        parent_node: NodeId,
        child: GraphId,
        forward: bool,
        first_sweep: bool,
    ) -> bool {
        let c = child.index();
        let len = self.infos[c].order.len();
        if len == 0 {
            return false;
        }
        let start = first_index(forward, len);
        let starts_with_dummies = self.infos[c].order[start]
            .first()
            .is_some_and(|&n| self.graphs[c].node(n).kind == NodeKind::ExternalPort);
        if starts_with_dummies {
            let side = if forward { PortSide::West } else { PortSide::East };
            let sorted = dummies_in_port_order(
                &self.graphs[parent.index()],
                parent_node,
                &self.infos[c].order[start],
                side,
            );
            self.infos[c].order[start] = sorted;
        } else {
            self.set_first_layer_order(child, forward);
        }

        let improved = self.sweep(child, forward, first_sweep);

        if let Some((parent_graph, nested)) = parent_and_child(self.graphs, parent, child) {
            sort_ports_by_dummy_positions(parent_graph, parent_node, nested, &self.infos[c].order, forward);
        }
        improved
    }

    /// Fixes the best order of a nested leaf's external-port dummies onto its parent node.
    fn hand_back(&mut self, leaf: GraphId) {
        let info = &self.infos[leaf.index()];
        if !info.has_external_ports {
            return;
        }
        let Some((parent, parent_node)) = info.parent else {
            return;
        };
        let Some((parent_graph, nested)) = parent_and_child(self.graphs, parent, leaf) else {
            return;
        };
        let order = &self.infos[leaf.index()].order;
        sort_ports_by_dummy_positions(parent_graph, parent_node, nested, order, true);
        sort_ports_by_dummy_positions(parent_graph, parent_node, nested, order, false);
        parent_graph.node_mut(parent_node).port_constraints = PortConstraints::FixedOrder;
    }
}

/// Current orders of the graphs not being modified.
struct NestedOrders<'a> {
    graphs: Rest<'a, LayeredGraph>,
    infos: Rest<'a, GraphInfo>,
}

impl NestedOrderLookup for NestedOrders<'_> {
    fn nested(&self, graph: GraphId) -> Option<(&LayeredGraph, &[Vec<NodeId>])> {
        let g = self.graphs.get(graph.index())?;
        let info = self.infos.get(graph.index())?;
        Some((g, info.order.as_slice()))
    }
}

fn parent_and_child(
    graphs: &mut [LayeredGraph],
    parent: GraphId,
    child: GraphId,
) -> Option<(&mut LayeredGraph, &LayeredGraph)> {
    let (parent_graph, rest) = split_one_mut(graphs, parent.index())?;
    let child_graph = rest.get(child.index())?;
    Some((parent_graph, child_graph))
}

/// `layer` (external-port dummies of the nested graph of `parent_node`) reordered to follow the
/// parent node's hierarchical ports on `side`. Dummies without a matching port keep their
/// relative order at the end.
fn dummies_in_port_order(
    parent: &LayeredGraph,
    parent_node: NodeId,
    layer: &[NodeId],
    side: PortSide,
) -> Vec<NodeId> {
    let mut sorted = Vec::with_capacity(layer.len());
    for port in in_north_south_east_west_order(parent, parent_node, side) {
        let p = parent.port(port);
        if !p.inside_connections {
            continue;
        }
        if let Some(dummy) = p.port_dummy {
            if layer.contains(&dummy) && !sorted.contains(&dummy) {
                sorted.push(dummy);
            }
        }
    }
    for &node in layer {
        if !sorted.contains(&node) {
            sorted.push(node);
        }
    }
    sorted
}

/// Reorders the hierarchical ports of `parent_node` on the east side (`east`) or west side to
/// match the dummies in the corresponding outer layer of its nested graph.
fn sort_ports_by_dummy_positions(
    parent: &mut LayeredGraph,
    parent_node: NodeId,
    nested: &LayeredGraph,
    order: &[Vec<NodeId>],
    east: bool,
) {
    let Some(last) = order.get(end_index(east, order.len())) else {
        return;
    };
    if !last
        .first()
        .is_some_and(|&n| nested.node(n).kind == NodeKind::ExternalPort)
    {
        return;
    }
    let side = if east { PortSide::East } else { PortSide::West };
    let origin_port = |&n: &NodeId| match nested.node(n).origin {
        Some(Origin::ExternalPort(p)) if parent.port(p).side == side && parent.node_of(p) == parent_node => {
            Some(p)
        }
        _ => None,
    };
    let replacements: Vec<PortId> = if east {
        last.iter().filter_map(origin_port).collect()
    } else {
        last.iter().rev().filter_map(origin_port).collect()
    };
    let slots: Vec<usize> = parent
        .node(parent_node)
        .ports()
        .iter()
        .enumerate()
        .filter(|&(_, &p)| parent.port(p).side == side && parent.port(p).inside_connections)
        .map(|(i, _)| i)
        .collect();
    if slots.len() != replacements.len() {
        debug!(
            node = parent_node.index(),
            ports = slots.len(),
            dummies = replacements.len(),
            "hierarchical ports and external-port dummies disagree"
        );
        return;
    }
    let ports = parent.ports_mut(parent_node);
    for (slot, port) in slots.into_iter().zip(replacements) {
        ports[slot] = port;
    }
}

/// Moves the origin ports of north/south dummies to the side their dummy ended up on and
/// regroups the owner's ports by side.
fn write_back_north_south(g: &mut LayeredGraph) {
    let mut owners: Vec<NodeId> = Vec::new();
    let mut moves: Vec<(PortId, PortSide)> = Vec::new();
    for layer in g.layers() {
        let nodes = layer.nodes();
        for (i, &dummy) in nodes.iter().enumerate() {
            let d = g.node(dummy);
            if d.kind != NodeKind::NorthSouthPort {
                continue;
            }
            let Some(Origin::Node(owner)) = d.origin else {
                continue;
            };
            if g.node(owner).port_constraints != PortConstraints::Free {
                continue;
            }
            let Some(owner_index) = nodes.iter().position(|&n| n == owner) else {
                continue;
            };
            let side = if i < owner_index {
                PortSide::North
            } else {
                PortSide::South
            };
            for &port in d.ports() {
                if let Some(origin) = g.port(port).origin {
                    if g.node_of(origin) == owner {
                        moves.push((origin, side));
                    }
                }
            }
            if !owners.contains(&owner) {
                owners.push(owner);
            }
        }
    }
    for (port, side) in moves {
        g.port_mut(port).side = side;
    }
    for owner in owners {
        let mut ports = g.node(owner).ports().to_vec();
        ports.sort_by_key(|&p| g.port(p).side);
        g.set_port_order(owner, ports);
    }
}
