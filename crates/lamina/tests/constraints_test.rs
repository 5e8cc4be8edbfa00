use lamina::constraints::ConstraintResolver;
use lamina::graph::{Hierarchy, LayeredGraph, NodeId, NodeKind};
use lamina::heuristics::BarycenterState;

fn single_layer(count: usize) -> (Hierarchy, Vec<NodeId>) {
    let mut h = Hierarchy::new();
    let g = h.root_mut();
    let l0 = g.add_layer();
    let nodes = (0..count).map(|_| g.add_node(l0, NodeKind::Normal)).collect();
    (h, nodes)
}

fn states_with(g: &LayeredGraph, values: &[(NodeId, f64)]) -> Vec<BarycenterState> {
    let mut states = vec![BarycenterState::default(); g.node_count()];
    for &(node, value) in values {
        states[node.index()] = BarycenterState {
            summed_weight: value,
            degree: 1,
            barycenter: Some(value),
            visited: true,
        };
    }
    states
}

fn position(order: &[NodeId], node: NodeId) -> usize {
    order.iter().position(|&n| n == node).expect("node present")
}

#[test]
fn resolver_keeps_an_order_without_violations() {
    let (mut h, n) = single_layer(3);
    let g = h.root_mut();
    g.node_mut(n[0]).successor_constraints.push(n[2]);
    let mut states = states_with(g, &[(n[0], 0.0), (n[1], 1.0), (n[2], 2.0)]);

    let mut order = n.clone();
    ConstraintResolver::new(g).process_constraints(g, &mut order, &mut states);
    assert_eq!(order, n);
}

#[test]
fn resolver_merges_nodes_violating_a_successor_constraint() {
    let (mut h, n) = single_layer(3);
    let g = h.root_mut();
    g.node_mut(n[2]).successor_constraints.push(n[0]);
    let mut states = states_with(g, &[(n[0], 0.0), (n[1], 1.0), (n[2], 2.0)]);

    let mut order = n.clone();
    ConstraintResolver::new(g).process_constraints(g, &mut order, &mut states);

    assert_eq!(order.len(), 3);
    assert!(position(&order, n[2]) < position(&order, n[0]));
    // The merged group takes the mean of its members.
    assert_eq!(states[n[0].index()].barycenter, Some(1.0));
    assert_eq!(states[n[2].index()].barycenter, Some(1.0));
}

#[test]
fn resolver_satisfies_chained_constraints() {
    let (mut h, n) = single_layer(4);
    let g = h.root_mut();
    g.node_mut(n[3]).successor_constraints.push(n[2]);
    g.node_mut(n[2]).successor_constraints.push(n[1]);
    g.node_mut(n[1]).successor_constraints.push(n[0]);
    let mut states = states_with(g, &[(n[0], 0.0), (n[1], 1.0), (n[2], 2.0), (n[3], 3.0)]);

    let mut order = n.clone();
    ConstraintResolver::new(g).process_constraints(g, &mut order, &mut states);
    assert_eq!(order, vec![n[3], n[2], n[1], n[0]]);
}

#[test]
fn resolver_keeps_layout_units_together() {
    let mut h = Hierarchy::new();
    let g = h.root_mut();
    let l0 = g.add_layer();
    let owner = g.add_node(l0, NodeKind::Normal);
    let dummy = g.add_node(l0, NodeKind::NorthSouthPort);
    let other = g.add_node(l0, NodeKind::Normal);
    g.node_mut(owner).layout_unit = Some(owner);
    g.node_mut(dummy).layout_unit = Some(owner);
    g.node_mut(other).layout_unit = Some(other);

    // The barycenters would put the other node between owner and dummy.
    let mut states = states_with(g, &[(owner, 0.0), (other, 1.0), (dummy, 2.0)]);
    let mut order = vec![owner, other, dummy];
    ConstraintResolver::new(g).process_constraints(g, &mut order, &mut states);

    let (o, d, x) = (
        position(&order, owner),
        position(&order, dummy),
        position(&order, other),
    );
    assert!(!(o < x && x < d), "{order:?} separates the layout unit");
}
