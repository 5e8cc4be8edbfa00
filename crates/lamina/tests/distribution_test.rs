use lamina::count_crossings;
use lamina::distribution::{
    NoNestedGraphs, PortDistribution, PortDistributor, PortRanks, RankPolicy,
};
use lamina::graph::{Hierarchy, NodeId, NodeKind, PortConstraints, PortId, PortSide, PortType};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Two sources feeding one target whose two western ports start out twisted.
fn twisted_target() -> (Hierarchy, NodeId, [PortId; 2]) {
    let mut h = Hierarchy::new();
    let g = h.root_mut();
    let l0 = g.add_layer();
    let l1 = g.add_layer();
    let a = g.add_node(l0, NodeKind::Normal);
    let b = g.add_node(l0, NodeKind::Normal);
    let d = g.add_node(l1, NodeKind::Normal);
    let pa = g.add_port(a, PortSide::East);
    let pb = g.add_port(b, PortSide::East);
    // Clockwise on the west side means bottom to top: `from_a` starts below `from_b`.
    let from_a = g.add_port(d, PortSide::West);
    let from_b = g.add_port(d, PortSide::West);
    g.add_edge(pa, from_a);
    g.add_edge(pb, from_b);
    (h, d, [from_a, from_b])
}

#[test]
fn node_relative_ranks_split_one_unit_per_node() {
    let mut h = Hierarchy::new();
    let g = h.root_mut();
    let l0 = g.add_layer();
    let l1 = g.add_layer();
    let a = g.add_node(l0, NodeKind::Normal);
    let b = g.add_node(l0, NodeKind::Normal);
    let t = g.add_node(l1, NodeKind::Normal);
    let a1 = g.add_port(a, PortSide::East);
    let a2 = g.add_port(a, PortSide::East);
    let b1 = g.add_port(b, PortSide::East);
    for source in [a1, a2, b1] {
        let target = g.add_port(t, PortSide::West);
        g.add_edge(source, target);
    }

    let mut ranks = PortRanks::new(g.port_count(), RankPolicy::NodeRelative);
    ranks.calculate(g, &[a, b], PortType::Output);
    assert_close(ranks.ranks()[a1.index()], 1.0 / 3.0);
    assert_close(ranks.ranks()[a2.index()], 2.0 / 3.0);
    assert_close(ranks.ranks()[b1.index()], 1.5);

    let mut ranks = PortRanks::new(g.port_count(), RankPolicy::LayerTotal);
    ranks.calculate(g, &[a, b], PortType::Output);
    assert_close(ranks.ranks()[a1.index()], 1.0);
    assert_close(ranks.ranks()[a2.index()], 2.0);
    assert_close(ranks.ranks()[b1.index()], 3.0);
}

#[test]
fn input_ranks_grow_towards_the_bottom_of_a_side() {
    let (h, d, [from_a, from_b]) = twisted_target();
    let g = h.root();
    let mut ranks = PortRanks::new(g.port_count(), RankPolicy::NodeRelative);
    ranks.calculate(g, &[d], PortType::Input);
    assert_close(ranks.ranks()[from_a.index()], 2.0 / 3.0);
    assert_close(ranks.ranks()[from_b.index()], 1.0 / 3.0);
}

#[test]
fn barycenter_distributor_untwists_ports_of_the_free_layer() {
    let (mut h, d, [from_a, from_b]) = twisted_target();
    let g = h.root_mut();
    assert_eq!(count_crossings(g), 1);

    let order = g.node_order();
    let mut distributor = PortDistributor::barycenter(g, RankPolicy::NodeRelative);
    distributor.distribute_ports_while_sweeping(g, &NoNestedGraphs, &order, 1, true);

    assert_eq!(g.node(d).ports(), &[from_b, from_a]);
    assert_eq!(count_crossings(g), 0);
}

#[test]
fn greedy_distributor_untwists_ports_of_the_free_layer() {
    let (mut h, d, [from_a, from_b]) = twisted_target();
    let g = h.root_mut();

    let order = g.node_order();
    let mut distributor = PortDistributor::greedy(g, RankPolicy::LayerTotal);
    let improved = distributor.distribute_ports_while_sweeping(g, &NoNestedGraphs, &order, 1, true);

    assert!(improved);
    assert_eq!(g.node(d).ports(), &[from_b, from_a]);
    assert_eq!(count_crossings(g), 0);
}

#[test]
fn distributors_leave_fixed_order_ports_alone() {
    let (mut h, d, [from_a, from_b]) = twisted_target();
    let g = h.root_mut();
    g.node_mut(d).port_constraints = PortConstraints::FixedOrder;
    let order = g.node_order();

    let mut barycenter = PortDistributor::barycenter(g, RankPolicy::NodeRelative);
    barycenter.distribute_ports_while_sweeping(g, &NoNestedGraphs, &order, 1, true);
    assert_eq!(g.node(d).ports(), &[from_a, from_b]);

    let mut greedy = PortDistributor::greedy(g, RankPolicy::NodeRelative);
    assert!(!greedy.distribute_ports_while_sweeping(g, &NoNestedGraphs, &order, 1, true));
    assert_eq!(g.node(d).ports(), &[from_a, from_b]);
}

#[test]
fn distributed_ports_are_grouped_by_side_clockwise() {
    let mut h = Hierarchy::new();
    let g = h.root_mut();
    let l0 = g.add_layer();
    let l1 = g.add_layer();
    let sources: Vec<NodeId> = (0..3).map(|_| g.add_node(l0, NodeKind::Normal)).collect();
    let free = g.add_node(l1, NodeKind::Normal);
    let sink = g.add_node(l1, NodeKind::Normal);

    // Port list deliberately out of clockwise order.
    let west_a = g.add_port(free, PortSide::West);
    let east = g.add_port(free, PortSide::East);
    let west_b = g.add_port(free, PortSide::West);
    let north = g.add_port(free, PortSide::North);
    let west_c = g.add_port(free, PortSide::West);
    for (&source, target) in sources.iter().zip([west_a, west_b, west_c]) {
        let port = g.add_port(source, PortSide::East);
        g.add_edge(port, target);
    }
    let sink_port = g.add_port(sink, PortSide::West);
    let extra = g.add_port(sources[0], PortSide::East);
    g.add_edge(extra, sink_port);

    let order = g.node_order();
    let mut distributor = PortDistributor::barycenter(g, RankPolicy::NodeRelative);
    distributor.distribute_ports_while_sweeping(g, &NoNestedGraphs, &order, 1, true);

    let ports = g.node(free).ports().to_vec();
    let sides: Vec<PortSide> = ports.iter().map(|&p| g.port(p).side).collect();
    let mut sorted = sides.clone();
    sorted.sort();
    assert_eq!(sides, sorted, "ports must be grouped N, E, S, W");
    assert_eq!(ports[..2], [north, east]);

    // West ports are clockwise (bottom to top), so the topmost source ends up last.
    let west: Vec<PortId> = ports
        .iter()
        .copied()
        .filter(|&p| g.port(p).side == PortSide::West)
        .collect();
    assert_eq!(west, vec![west_c, west_b, west_a]);
}

#[test]
fn ports_ranked_zero_count_as_unranked() {
    let mut h = Hierarchy::new();
    let g = h.root_mut();
    let l0 = g.add_layer();
    let l1 = g.add_layer();
    let source = g.add_node(l0, NodeKind::Normal);
    let unconnected = g.add_node(l1, NodeKind::NorthSouthPort);
    let fed = g.add_node(l1, NodeKind::NorthSouthPort);
    let owner = g.add_node(l1, NodeKind::Normal);

    // `to_fed` gets a negative rank from its dummy's input edge; `to_unconnected` gets 0.
    let to_fed = g.add_port(owner, PortSide::North);
    let to_unconnected = g.add_port(owner, PortSide::North);
    g.port_mut(to_fed).port_dummy = Some(fed);
    g.port_mut(to_unconnected).port_dummy = Some(unconnected);
    let out = g.add_port(source, PortSide::East);
    let input = g.add_port(fed, PortSide::West);
    g.port_mut(input).origin = Some(to_fed);
    g.add_edge(out, input);

    let order = g.node_order();
    let mut distributor = PortDistributor::barycenter(g, RankPolicy::NodeRelative);
    distributor.distribute_ports_while_sweeping(g, &NoNestedGraphs, &order, 1, true);

    assert_eq!(g.node(owner).ports(), &[to_unconnected, to_fed]);
}
