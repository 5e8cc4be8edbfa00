use lamina_graph::{
    GraphError, Hierarchy, LayerId, NodeId, NodeKind, Origin, PortSide, PortType, split_one_mut,
};

fn two_layer_hierarchy() -> Hierarchy {
    let mut h = Hierarchy::new();
    let g = h.root_mut();
    let l0 = g.add_layer();
    let l1 = g.add_layer();
    let a = g.add_node(l0, NodeKind::Normal);
    let b = g.add_node(l1, NodeKind::Normal);
    let pa = g.add_port(a, PortSide::East);
    let pb = g.add_port(b, PortSide::West);
    g.add_edge(pa, pb);
    h
}

#[test]
fn nodes_are_appended_to_their_layer_in_insertion_order() {
    let mut h = Hierarchy::new();
    let g = h.root_mut();
    let l0 = g.add_layer();
    let a = g.add_node(l0, NodeKind::Normal);
    let b = g.add_node(l0, NodeKind::LongEdge);
    assert_eq!(g.layer(l0).nodes(), &[a, b]);
    assert_eq!(g.layer_of(b), l0);
    assert_eq!(g.node(b).kind, NodeKind::LongEdge);
    assert_eq!(g.node_order(), vec![vec![a, b]]);
}

#[test]
fn edges_link_ports_in_both_directions() {
    let h = two_layer_hierarchy();
    let g = h.root();
    let a = g.layer(LayerId::new(0)).nodes()[0];
    let b = g.layer(LayerId::new(1)).nodes()[0];
    let pa = g.node(a).ports()[0];
    let pb = g.node(b).ports()[0];

    assert_eq!(g.successor_ports(pa).collect::<Vec<_>>(), vec![pb]);
    assert_eq!(g.predecessor_ports(pb).collect::<Vec<_>>(), vec![pa]);
    assert!(g.port(pa).has_type(PortType::Output));
    assert!(!g.port(pa).has_type(PortType::Input));
    assert_eq!(g.port(pb).degree(), 1);
    assert_eq!(g.node_of(pb), b);

    let edge = g.port(pa).outgoing()[0];
    assert_eq!(g.opposite(edge, pa), pb);
    assert!(!g.is_in_layer(edge));
    assert!(!g.is_self_loop(edge));
}

#[test]
fn ports_on_side_keep_clockwise_order() {
    let mut h = Hierarchy::new();
    let g = h.root_mut();
    let l0 = g.add_layer();
    let n = g.add_node(l0, NodeKind::Normal);
    let north = g.add_port(n, PortSide::North);
    let e1 = g.add_port(n, PortSide::East);
    let e2 = g.add_port(n, PortSide::East);
    let west = g.add_port(n, PortSide::West);

    assert_eq!(g.ports_on_side(n, PortSide::East).collect::<Vec<_>>(), vec![e1, e2]);
    assert!(g.has_ports_on_side(n, PortSide::North));
    assert!(!g.has_ports_on_side(n, PortSide::South));
    assert_eq!(g.port_index(west), Some(3));
    assert_eq!(g.port_index(north), Some(0));
}

#[test]
fn reordering_replaces_layer_and_port_lists() {
    let mut h = Hierarchy::new();
    let g = h.root_mut();
    let l0 = g.add_layer();
    let a = g.add_node(l0, NodeKind::Normal);
    let b = g.add_node(l0, NodeKind::Normal);
    let p1 = g.add_port(a, PortSide::East);
    let p2 = g.add_port(a, PortSide::East);

    g.set_layer_order(l0, vec![b, a]);
    g.set_port_order(a, vec![p2, p1]);
    assert_eq!(g.layer(l0).nodes(), &[b, a]);
    assert_eq!(g.node(a).ports(), &[p2, p1]);

    g.ports_mut(a).swap(0, 1);
    assert_eq!(g.node(a).ports(), &[p1, p2]);
}

#[test]
fn nested_graphs_are_visited_breadth_first() {
    let mut h = Hierarchy::new();
    let root = h.root_id();
    let l0 = h.root_mut().add_layer();
    let outer = h.root_mut().add_node(l0, NodeKind::Normal);
    let child = h.add_nested_graph(root, outer);
    let cl = h.graph_mut(child).add_layer();
    let inner = h.graph_mut(child).add_node(cl, NodeKind::Normal);
    let grandchild = h.add_nested_graph(child, inner);

    assert_eq!(h.breadth_first(), vec![root, child, grandchild]);
    assert_eq!(h.graph(child).parent(), Some((root, outer)));
    assert!(h.root().has_nested_graph(outer));
    assert_eq!(h.root().node(outer).nested_graph(), Some(child));
    assert_eq!(h.len(), 3);
}

#[test]
fn external_port_dummies_point_back_at_the_parent_port() {
    let mut h = Hierarchy::new();
    let root = h.root_id();
    let l0 = h.root_mut().add_layer();
    let compound = h.root_mut().add_node(l0, NodeKind::Normal);
    let port = h.root_mut().add_port(compound, PortSide::West);
    let child = h.add_nested_graph(root, compound);
    let cl = h.graph_mut(child).add_layer();

    let (dummy, dummy_port) = h
        .add_external_port_dummy(child, cl, port)
        .expect("nested graph has a parent");
    let inner = h.graph(child);
    assert_eq!(inner.node(dummy).kind, NodeKind::ExternalPort);
    assert_eq!(inner.node(dummy).origin, Some(Origin::ExternalPort(port)));
    assert_eq!(inner.port(dummy_port).side, PortSide::East);
    assert!(inner.has_external_ports());

    let p = h.root().port(port);
    assert!(p.inside_connections);
    assert_eq!(p.port_dummy, Some(dummy));
}

#[test]
fn split_one_mut_lends_one_element_and_hides_it_from_the_rest() {
    let mut items = vec![1, 2, 3, 4];
    let (item, rest) = split_one_mut(&mut items, 1).expect("index in range");
    *item = 20;
    assert_eq!(rest.get(0), Some(&1));
    assert_eq!(rest.get(1), None);
    assert_eq!(rest.get(2), Some(&3));
    assert_eq!(rest.get(3), Some(&4));
    assert_eq!(rest.get(4), None);
    assert_eq!(items, vec![1, 20, 3, 4]);
    assert!(split_one_mut(&mut items, 4).is_none());
}

#[test]
fn validate_accepts_a_well_formed_hierarchy() {
    assert_eq!(two_layer_hierarchy().validate(), Ok(()));
}

#[test]
fn validate_rejects_empty_layers() {
    let mut h = two_layer_hierarchy();
    h.root_mut().add_layer();
    assert!(matches!(h.validate(), Err(GraphError::EmptyLayer { .. })));
}

#[test]
fn validate_rejects_ports_without_side() {
    let mut h = two_layer_hierarchy();
    let a = h.root().layer(LayerId::new(0)).nodes()[0];
    h.root_mut().add_port(a, PortSide::Undefined);
    assert!(matches!(h.validate(), Err(GraphError::UndefinedPortSide { .. })));
}

#[test]
fn validate_rejects_edges_skipping_layers() {
    let mut h = Hierarchy::new();
    let g = h.root_mut();
    let l0 = g.add_layer();
    let l1 = g.add_layer();
    let l2 = g.add_layer();
    let a = g.add_node(l0, NodeKind::Normal);
    g.add_node(l1, NodeKind::Normal);
    let c = g.add_node(l2, NodeKind::Normal);
    let pa = g.add_port(a, PortSide::East);
    let pc = g.add_port(c, PortSide::West);
    g.add_edge(pa, pc);
    assert!(matches!(h.validate(), Err(GraphError::LongEdge { .. })));
}

#[test]
fn validate_rejects_cyclic_successor_constraints() {
    let mut h = Hierarchy::new();
    let g = h.root_mut();
    let l0 = g.add_layer();
    let a = g.add_node(l0, NodeKind::Normal);
    let b = g.add_node(l0, NodeKind::Normal);
    g.node_mut(a).successor_constraints.push(b);
    g.node_mut(b).successor_constraints.push(a);
    assert!(matches!(h.validate(), Err(GraphError::CyclicConstraints { .. })));
}

#[test]
fn validate_rejects_constraints_across_layers() {
    let mut h = two_layer_hierarchy();
    let a = h.root().layer(LayerId::new(0)).nodes()[0];
    let b = h.root().layer(LayerId::new(1)).nodes()[0];
    h.root_mut().node_mut(a).successor_constraints.push(b);
    assert!(matches!(h.validate(), Err(GraphError::ConstraintAcrossLayers { .. })));
}

#[test]
fn validate_rejects_constraints_on_unknown_nodes() {
    let mut h = two_layer_hierarchy();
    let a = h.root().layer(LayerId::new(0)).nodes()[0];
    h.root_mut()
        .node_mut(a)
        .successor_constraints
        .push(NodeId::new(42));
    assert_eq!(
        h.validate(),
        Err(GraphError::UnknownConstraintTarget {
            graph: h.root_id(),
            from: a,
            to: NodeId::new(42),
        })
    );
}

#[test]
fn validate_rejects_external_port_dummies_without_parent_port() {
    let mut h = Hierarchy::new();
    let root = h.root_id();
    let l0 = h.root_mut().add_layer();
    let compound = h.root_mut().add_node(l0, NodeKind::Normal);
    let child = h.add_nested_graph(root, compound);
    let cl = h.graph_mut(child).add_layer();
    h.graph_mut(child).add_node(cl, NodeKind::ExternalPort);
    assert!(matches!(h.validate(), Err(GraphError::DanglingExternalPort { .. })));
}
