use lamina::counting::{
    CounterKind, CrossingCount, CrossingCounter, InLayerCrossingsCounter, count_crossings,
};
use lamina::graph::{Hierarchy, LayerId, LayeredGraph, NodeId, NodeKind, PortId, PortSide};

fn node(g: &mut LayeredGraph, layer: usize) -> NodeId {
    g.add_node(LayerId::new(layer), NodeKind::Normal)
}

fn connect(g: &mut LayeredGraph, from: NodeId, to: NodeId) -> (PortId, PortId) {
    let source = g.add_port(from, PortSide::East);
    let target = g.add_port(to, PortSide::West);
    g.add_edge(source, target);
    (source, target)
}

fn layered(layers: usize) -> Hierarchy {
    let mut h = Hierarchy::new();
    for _ in 0..layers {
        h.root_mut().add_layer();
    }
    h
}

#[test]
fn count_crossings_returns_0_for_an_empty_graph() {
    let h = Hierarchy::new();
    assert_eq!(count_crossings(h.root()), 0);
}

#[test]
fn count_crossings_returns_0_for_parallel_edges() {
    let mut h = layered(2);
    let g = h.root_mut();
    let (a, b) = (node(g, 0), node(g, 0));
    let (c, d) = (node(g, 1), node(g, 1));
    connect(g, a, c);
    connect(g, b, d);
    assert_eq!(count_crossings(g), 0);
}

#[test]
fn count_crossings_returns_1_for_an_x() {
    let mut h = layered(2);
    let g = h.root_mut();
    let (a, b) = (node(g, 0), node(g, 0));
    let (c, d) = (node(g, 1), node(g, 1));
    connect(g, a, d);
    connect(g, b, c);
    assert_eq!(count_crossings(g), 1);
}

#[test]
fn count_crossings_counts_every_edge_of_a_crossed_bundle() {
    let mut h = layered(2);
    let g = h.root_mut();
    let (a, b) = (node(g, 0), node(g, 0));
    let (c, d) = (node(g, 1), node(g, 1));
    let a_top = g.add_port(a, PortSide::East);
    let a_bottom = g.add_port(a, PortSide::East);
    // Western ports are listed clockwise, i.e. bottom to top.
    let d_bottom = g.add_port(d, PortSide::West);
    let d_top = g.add_port(d, PortSide::West);
    g.add_edge(a_top, d_top);
    g.add_edge(a_bottom, d_bottom);
    connect(g, b, c);
    assert_eq!(count_crossings(g), 2);
}

#[test]
fn count_crossings_counts_edges_between_twisted_ports() {
    let mut h = layered(2);
    let g = h.root_mut();
    let a = node(g, 0);
    let d = node(g, 1);
    let a_top = g.add_port(a, PortSide::East);
    let a_bottom = g.add_port(a, PortSide::East);
    let d_bottom = g.add_port(d, PortSide::West);
    let d_top = g.add_port(d, PortSide::West);
    g.add_edge(a_top, d_bottom);
    g.add_edge(a_bottom, d_top);
    assert_eq!(count_crossings(g), 1);
}

#[test]
fn count_crossings_includes_in_layer_edges_looping_around_a_port() {
    let mut h = layered(2);
    let g = h.root_mut();
    let (a, b, c) = (node(g, 0), node(g, 0), node(g, 0));
    let d = node(g, 1);
    let pa = g.add_port(a, PortSide::East);
    connect(g, b, d);
    let pc = g.add_port(c, PortSide::East);
    g.add_edge(pa, pc);
    assert_eq!(count_crossings(g), 1);
}

#[test]
fn count_crossings_ignores_self_loops() {
    let mut h = layered(2);
    let g = h.root_mut();
    let (a, b) = (node(g, 0), node(g, 0));
    let (c, d) = (node(g, 1), node(g, 1));
    let loop_out = g.add_port(a, PortSide::East);
    let loop_in = g.add_port(a, PortSide::East);
    g.add_edge(loop_out, loop_in);
    connect(g, a, d);
    connect(g, b, c);
    assert_eq!(count_crossings(g), 1);
}

#[test]
fn count_crossings_sums_all_layer_gaps() {
    let mut h = layered(3);
    let g = h.root_mut();
    let (a, b) = (node(g, 0), node(g, 0));
    let (c, d) = (node(g, 1), node(g, 1));
    let (e, f) = (node(g, 2), node(g, 2));
    connect(g, a, d);
    connect(g, b, c);
    connect(g, c, f);
    connect(g, d, e);
    assert_eq!(count_crossings(g), 2);
}

#[test]
fn simple_graphs_get_the_exact_counter() {
    let mut h = layered(2);
    let g = h.root_mut();
    let (a, c) = (node(g, 0), node(g, 1));
    connect(g, a, c);
    assert_eq!(CrossingCounter::for_graph(g).kind(), CounterKind::Exact);
}

#[test]
fn ports_with_several_edges_switch_to_the_hyperedge_counter() {
    let mut h = layered(2);
    let g = h.root_mut();
    let (a, b) = (node(g, 0), node(g, 0));
    let (c, d, e) = (node(g, 1), node(g, 1), node(g, 1));
    let pa = g.add_port(a, PortSide::East);
    let pc = g.add_port(c, PortSide::West);
    let pd = g.add_port(d, PortSide::West);
    g.add_edge(pa, pc);
    g.add_edge(pa, pd);
    connect(g, b, e);

    let mut counter = CrossingCounter::for_graph(g);
    assert_eq!(counter.kind(), CounterKind::HyperedgeAware);

    let planar = g.node_order();
    assert_eq!(counter.count_all(g, &planar), 0);

    let crossed = vec![vec![a, b], vec![e, c, d]];
    assert!(counter.count_all(g, &crossed) > 0);
}

/// `a` fans out from one port to `targets`; `b` feeds `single`.
fn fan_and_edge(targets: usize) -> (Hierarchy, [NodeId; 2], Vec<NodeId>, NodeId) {
    let mut h = layered(2);
    let g = h.root_mut();
    let (a, b) = (node(g, 0), node(g, 0));
    let fan: Vec<NodeId> = (0..targets).map(|_| node(g, 1)).collect();
    let single = node(g, 1);
    let pa = g.add_port(a, PortSide::East);
    for &t in &fan {
        let pt = g.add_port(t, PortSide::West);
        g.add_edge(pa, pt);
    }
    connect(g, b, single);
    (h, [a, b], fan, single)
}

#[test]
fn a_fan_of_three_edges_does_not_cross_itself() {
    let (h, _, _, _) = fan_and_edge(3);
    let g = h.root();
    let mut counter = CrossingCounter::for_graph(g);
    assert_eq!(counter.kind(), CounterKind::HyperedgeAware);
    assert_eq!(counter.count_all(g, &g.node_order()), 0);
}

#[test]
fn hyperedge_counter_matches_the_exact_count_for_one_crossing_branch() {
    let (mut h, [a, b], fan, single) = fan_and_edge(2);
    let g = h.root_mut();
    // `b -> single` runs between the two branches of the fan: only `a -> fan[1]` crosses it.
    g.set_layer_order(LayerId::new(1), vec![fan[0], single, fan[1]]);
    assert_eq!(count_crossings(g), 1);

    g.set_layer_order(LayerId::new(1), vec![fan[0], fan[1], single]);
    assert_eq!(count_crossings(g), 0);
    assert_eq!(g.layer(LayerId::new(0)).nodes(), &[a, b]);
}

#[test]
fn an_edge_through_a_hyperedge_counts_once() {
    let (mut h, _, fan, single) = fan_and_edge(3);
    let g = h.root_mut();
    g.set_layer_order(LayerId::new(1), vec![fan[0], single, fan[1], fan[2]]);
    assert_eq!(count_crossings(g), 1);

    // An edge passing above the whole fan crosses it once as well.
    g.set_layer_order(LayerId::new(1), vec![single, fan[0], fan[1], fan[2]]);
    assert_eq!(count_crossings(g), 1);
}

#[test]
fn in_layer_counter_estimates_edges_spanning_other_ports() {
    let mut h = layered(2);
    let g = h.root_mut();
    let (a, b, c) = (node(g, 0), node(g, 0), node(g, 0));
    let d = node(g, 1);
    let pa = g.add_port(a, PortSide::East);
    connect(g, b, d);
    let pc = g.add_port(c, PortSide::East);
    g.add_edge(pa, pc);

    let mut counter = InLayerCrossingsCounter::new(g.node_count(), g.port_count());
    assert_eq!(counter.count_east_west_crossings(g, &[a, b, c]), 1);
    assert_eq!(counter.count_east_west_crossings(g, &[a, c, b]), 0);
}

#[test]
fn count_within_sees_north_south_dummies_separated_from_their_owner() {
    let mut h = layered(1);
    let g = h.root_mut();
    let owner = node(g, 0);
    let dummy = g.add_node(LayerId::new(0), NodeKind::NorthSouthPort);
    let other = node(g, 0);
    let long_edge = g.add_node(LayerId::new(0), NodeKind::LongEdge);
    g.node_mut(owner).layout_unit = Some(owner);
    g.node_mut(dummy).layout_unit = Some(owner);
    g.node_mut(dummy).origin = Some(lamina::graph::Origin::Node(owner));
    g.node_mut(dummy).crossing_hint = 1;
    g.node_mut(other).layout_unit = Some(other);

    let mut counter = CrossingCounter::for_graph(g);
    assert!(counter.has_in_layer_crossings(0));
    // South dummy directly below its owner: nothing in between.
    assert_eq!(counter.count_within(g, &[owner, dummy, other, long_edge]), 0);
    // A long-edge dummy squeezed between owner and dummy crosses the dummy's edge.
    assert_eq!(counter.count_within(g, &[owner, long_edge, dummy, other]), 1);
}
