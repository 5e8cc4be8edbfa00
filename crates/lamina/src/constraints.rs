//! In-layer ordering constraints.
//!
//! After a layer has been sorted by barycenter, the resolver merges groups of nodes whose order
//! contradicts a successor constraint (or the grouping of north/south dummies into layout units)
//! until no violation is left. A merged group keeps its members in constraint order and takes
//! the weighted mean barycenter of its parts, so the layer stays sorted.

use crate::heuristics::BarycenterState;
use lamina_graph::{LayeredGraph, NodeId, NodeKind};
use tracing::trace;

/// Barycenters closer than this still count as equal when validating merges.
const BARYCENTER_EQUALITY_DELTA: f64 = 0.0001;

#[derive(Debug, Clone)]
struct ConstraintGroup {
    nodes: Vec<NodeId>,
    summed_weight: f64,
    degree: usize,
    barycenter: Option<f64>,
    outgoing: Vec<usize>,
    incoming: Vec<usize>,
    incoming_count: usize,
}

impl ConstraintGroup {
    fn single(node: NodeId, state: &BarycenterState) -> Self {
        Self {
            nodes: vec![node],
            summed_weight: state.summed_weight,
            degree: state.degree,
            barycenter: state.barycenter,
            outgoing: Vec::new(),
            incoming: Vec::new(),
            incoming_count: 0,
        }
    }

    fn value(&self) -> f64 {
        self.barycenter.unwrap_or(f64::NEG_INFINITY)
    }
}

/// Merges constraint-violating node groups of one layer at a time.
#[derive(Debug, Clone)]
pub struct ConstraintResolver {
    /// Members of every layout unit, indexed by the unit's representative node.
    layout_units: Vec<Vec<NodeId>>,
    node_group: Vec<Option<usize>>,
}

impl ConstraintResolver {
    /// Builds the layout unit table of `g` once; it is never modified afterwards.
    pub fn new(g: &LayeredGraph) -> Self {
        let mut layout_units = vec![Vec::new(); g.node_count()];
        for layer in g.layers() {
            for &node in layer.nodes() {
                if let Some(unit) = g.node(node).layout_unit {
                    layout_units[unit.index()].push(node);
                }
            }
        }
        Self {
            layout_units,
            node_group: vec![None; g.node_count()],
        }
    }

    /// Reorders the barycenter-sorted `nodes` so every constraint holds, writing the final
    /// group barycenters back into `states`.
    pub fn process_constraints(
        &mut self,
        g: &LayeredGraph,
        nodes: &mut Vec<NodeId>,
        states: &mut [BarycenterState],
    ) {
        let mut groups: Vec<ConstraintGroup> = Vec::with_capacity(nodes.len());
        for (ix, &node) in nodes.iter().enumerate() {
            groups.push(ConstraintGroup::single(node, &states[node.index()]));
            self.node_group[node.index()] = Some(ix);
        }
        let mut order: Vec<usize> = (0..groups.len()).collect();

        self.build_constraints_graph(g, nodes, &mut groups);
        let mut merges = 0usize;
        while let Some((first, second)) = find_violated_constraint(&mut groups, &order) {
            handle_violated_constraint(&mut groups, &mut order, first, second);
            merges += 1;
        }
        if merges > 0 {
            trace!(nodes = nodes.len(), merges, "resolved in-layer constraints");
        }

        for &node in nodes.iter() {
            self.node_group[node.index()] = None;
        }
        nodes.clear();
        for &ix in &order {
            let group = &groups[ix];
            for &node in &group.nodes {
                nodes.push(node);
                states[node.index()].barycenter = group.barycenter;
            }
        }
    }

    fn group_of(&self, node: NodeId) -> Option<usize> {
        self.node_group.get(node.index()).copied().flatten()
    }

    fn build_constraints_graph(
        &self,
        g: &LayeredGraph,
        nodes: &[NodeId],
        groups: &mut [ConstraintGroup],
    ) {
        fn add(groups: &mut [ConstraintGroup], from: usize, to: usize) {
            groups[from].outgoing.push(to);
            groups[to].incoming_count += 1;
        }

        let mut last_normal: Option<NodeId> = None;
        for &node in nodes {
            let Some(from) = self.group_of(node) else {
                continue;
            };
            for &successor in &g.node(node).successor_constraints {
                if let Some(to) = self.group_of(successor) {
                    add(groups, from, to);
                }
            }

            if g.node(node).kind != NodeKind::Normal {
                continue;
            }
            // Every member of the previous normal node's unit precedes every member of this one.
            if let Some(last) = last_normal {
                for &last_member in &self.layout_units[last.index()] {
                    for &member in &self.layout_units[node.index()] {
                        if let (Some(a), Some(b)) = (self.group_of(last_member), self.group_of(member))
                        {
                            add(groups, a, b);
                        }
                    }
                }
            }
            last_normal = Some(node);
        }
    }
}

/// Finds a constraint whose endpoints appear in the wrong order, scanning the constraint graph
/// from its sources. Returns `(predecessor, successor)` in the order they must end up in.
fn find_violated_constraint(
    groups: &mut [ConstraintGroup],
    order: &[usize],
) -> Option<(usize, usize)> {
    let mut active: std::collections::VecDeque<usize> = std::collections::VecDeque::new();
    for &ix in order {
        let group = &mut groups[ix];
        group.incoming.clear();
        if !group.outgoing.is_empty() && group.incoming_count == 0 {
            active.push_back(ix);
        }
    }

    let position = |ix: usize| order.iter().position(|&o| o == ix);
    while let Some(ix) = active.pop_front() {
        let value = groups[ix].value();
        for &predecessor in &groups[ix].incoming {
            let pred_value = groups[predecessor].value();
            if pred_value as f32 == value as f32 {
                if position(predecessor) > position(ix) {
                    return Some((predecessor, ix));
                }
            } else if pred_value > value {
                return Some((predecessor, ix));
            }
        }

        let outgoing = groups[ix].outgoing.clone();
        for successor in outgoing {
            let target = &mut groups[successor];
            target.incoming.insert(0, ix);
            if target.incoming_count == target.incoming.len() {
                active.push_back(successor);
            }
        }
    }
    None
}

/// Replaces `first` and `second` with their union, inserted so that `order` stays sorted, and
/// re-points every constraint that targeted one of them.
fn handle_violated_constraint(
    groups: &mut Vec<ConstraintGroup>,
    order: &mut Vec<usize>,
    first: usize,
    second: usize,
) {
    let merged = merge_groups(groups, first, second);
    let merged_ix = groups.len();
    groups.push(merged);
    let merged_value = groups[merged_ix].value();
    if let (Some(m), Some(a), Some(b)) = (
        groups[merged_ix].barycenter,
        groups[first].barycenter,
        groups[second].barycenter,
    ) {
        debug_assert!(m + BARYCENTER_EQUALITY_DELTA >= b);
        debug_assert!(m - BARYCENTER_EQUALITY_DELTA <= a);
    }

    let mut next: Vec<usize> = Vec::with_capacity(order.len());
    let mut inserted = false;
    for &ix in order.iter() {
        if ix == first || ix == second {
            continue;
        }
        if !inserted && groups[ix].value() > merged_value {
            next.push(merged_ix);
            inserted = true;
        }
        let outgoing = &mut groups[ix].outgoing;
        let had_first = remove_first(outgoing, first);
        let had_second = remove_first(outgoing, second);
        if had_first || had_second {
            outgoing.push(merged_ix);
            groups[merged_ix].incoming_count += 1;
        }
        next.push(ix);
    }
    if !inserted {
        next.push(merged_ix);
    }
    *order = next;
}

fn merge_groups(groups: &mut [ConstraintGroup], first: usize, second: usize) -> ConstraintGroup {
    let mut nodes = groups[first].nodes.clone();
    nodes.extend_from_slice(&groups[second].nodes);

    let mut outgoing: Vec<usize> = groups[first].outgoing.clone();
    remove_first(&mut outgoing, second);
    for candidate in groups[second].outgoing.clone() {
        if candidate == first {
            continue;
        }
        if outgoing.contains(&candidate) {
            // A successor of both halves loses one of its two incoming constraints.
            groups[candidate].incoming_count = groups[candidate].incoming_count.saturating_sub(1);
        } else {
            outgoing.push(candidate);
        }
    }

    let (a, b) = (&groups[first], &groups[second]);
    let summed_weight = a.summed_weight + b.summed_weight;
    let degree = a.degree + b.degree;
    let barycenter = if degree > 0 {
        Some(summed_weight / degree as f64)
    } else {
        match (a.barycenter, b.barycenter) {
            (Some(x), Some(y)) => Some((x + y) / 2.0),
            (x, y) => x.or(y),
        }
    };

    ConstraintGroup {
        nodes,
        summed_weight,
        degree,
        barycenter,
        outgoing,
        incoming: Vec::new(),
        incoming_count: 0,
    }
}

fn remove_first(items: &mut Vec<usize>, value: usize) -> bool {
    match items.iter().position(|&v| v == value) {
        Some(at) => {
            items.remove(at);
            true
        }
        None => false,
    }
}
