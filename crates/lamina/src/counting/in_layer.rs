//! Crossing estimates inside a single layer.
//!
//! Two sources of crossings live entirely inside a layer: edges connecting two ports on the same
//! side of the layer, and north/south port dummies that get separated from their owner by other
//! nodes. Both are estimated here from the layer's order alone.

use lamina_graph::{LayeredGraph, NodeId, NodeKind, Origin, PortId, PortSide};

#[derive(Debug, Clone)]
pub struct InLayerCrossingsCounter {
    east_numbers: Vec<Option<usize>>,
    west_numbers: Vec<Option<usize>>,
    numbered: Vec<PortId>,
    dummy_index: Vec<usize>,
    unit_hints: Vec<(usize, usize)>,
}

impl InLayerCrossingsCounter {
    pub fn new(node_count: usize, port_count: usize) -> Self {
        Self {
            east_numbers: vec![None; port_count],
            west_numbers: vec![None; port_count],
            numbered: Vec::new(),
            dummy_index: vec![0; node_count],
            unit_hints: vec![(0, 0); node_count],
        }
    }

    /// Estimate for edges connecting two ports on the same side of `layer`.
    ///
    /// Eastern ports are numbered top-down and western ports bottom-up by cumulative degree; an
    /// edge between two same-side ports is crossed by at most the edges attached in between.
    pub fn count_east_west_crossings(&mut self, g: &LayeredGraph, layer: &[NodeId]) -> usize {
        self.number_east_west_ports(g, layer);
        let mut crossings = 0;
        for &node in layer {
            for &port in g.node(node).ports() {
                crossings += match g.port(port).side {
                    PortSide::East => max_in_layer_span(g, port, &self.east_numbers),
                    PortSide::West => max_in_layer_span(g, port, &self.west_numbers),
                    _ => 0,
                };
            }
        }
        for port in self.numbered.drain(..) {
            self.east_numbers[port.index()] = None;
            self.west_numbers[port.index()] = None;
        }
        crossings
    }

    fn number_east_west_ports(&mut self, g: &LayeredGraph, layer: &[NodeId]) {
        let mut east = 0;
        for &node in layer {
            east = number_side(g, node, PortSide::East, east, &mut self.east_numbers, &mut self.numbered);
        }
        let mut west = 0;
        for &node in layer.iter().rev() {
            west = number_side(g, node, PortSide::West, west, &mut self.west_numbers, &mut self.numbered);
        }
    }

    /// Crossings caused by nodes placed between a north/south dummy and its owner.
    ///
    /// The first sweep walks each layout unit and accumulates the crossing hints of its dummies
    /// on the northern and southern side separately. The second sweep charges every foreign
    /// node found inside a unit with the hints of the dummies it separates from the owner.
    /// Nothing is counted when a normal or north/south dummy node lacks a layout unit.
    pub fn count_north_south_hint_crossings(&mut self, g: &LayeredGraph, layer: &[NodeId]) -> usize {
        let mut current_unit: Option<NodeId> = None;
        let mut north_max = 0;
        let mut south_max = 0;
        let mut northern = true;
        let mut units: Vec<NodeId> = Vec::new();

        for &node in layer {
            let n = g.node(node);
            if !matches!(n.kind, NodeKind::Normal | NodeKind::NorthSouthPort) {
                continue;
            }
            let Some(unit) = n.layout_unit else {
                for unit in units {
                    self.unit_hints[unit.index()] = (0, 0);
                }
                return 0;
            };
            if current_unit != Some(unit) {
                if let Some(prev) = current_unit {
                    self.unit_hints[prev.index()] = (north_max, south_max);
                }
                current_unit = Some(unit);
                units.push(unit);
                north_max = 0;
                south_max = 0;
                northern = true;
            }
            if node == unit {
                northern = false;
            }
            let hint = n.crossing_hint as usize;
            if northern {
                north_max += hint;
                self.dummy_index[node.index()] = north_max;
            } else {
                south_max += hint;
                self.dummy_index[node.index()] = south_max;
            }
        }
        if let Some(prev) = current_unit {
            self.unit_hints[prev.index()] = (north_max, south_max);
        }

        let mut crossings = 0;
        let mut last_unit: Option<NodeId> = None;
        let mut last_dummy_index = 0;
        let mut dummy_count = 0;
        northern = true;
        for &node in layer {
            let n = g.node(node);
            match n.kind {
                NodeKind::Normal => {
                    last_dummy_index = self.dummy_index[node.index()];
                    dummy_count = self.unit_hints[node.index()].1;
                    last_unit = Some(node);
                    northern = false;
                }
                NodeKind::NorthSouthPort => {
                    last_dummy_index = self.dummy_index[node.index()];
                    if n.layout_unit != last_unit {
                        if let Some(unit) = n.layout_unit {
                            dummy_count = self.unit_hints[unit.index()].0;
                        }
                        last_unit = n.layout_unit;
                        northern = true;
                    }
                }
                _ => {
                    crossings += if northern {
                        last_dummy_index
                    } else {
                        dummy_count.saturating_sub(last_dummy_index)
                    };
                }
            }
        }

        for unit in units {
            self.unit_hints[unit.index()] = (0, 0);
        }
        crossings
    }

    /// Crossings among the north/south dummies of one owner with a fixed port order: two dummies
    /// whose origin ports appear in the opposite order on the owner cross.
    pub fn count_north_south_port_crossings(&self, g: &LayeredGraph, layer: &[NodeId]) -> usize {
        let mut crossings = 0;
        let mut northern = true;
        let mut recent_owner: Option<NodeId> = None;

        for (i, &node) in layer.iter().enumerate() {
            let n = g.node(node);
            match n.kind {
                NodeKind::Normal => {
                    recent_owner = Some(node);
                    northern = false;
                }
                NodeKind::NorthSouthPort => {
                    let Some(Origin::Node(owner)) = n.origin else {
                        // Self-loop dummies never influence crossings.
                        continue;
                    };
                    if recent_owner != Some(owner) {
                        recent_owner = Some(owner);
                        northern = true;
                    }
                    if !g.node(owner).port_constraints.is_order_fixed() {
                        continue;
                    }
                    let (input, output) = origin_ports(g, node);

                    for &other in &layer[i + 1..] {
                        let o = g.node(other);
                        if o.kind == NodeKind::Normal {
                            break;
                        }
                        if o.kind != NodeKind::NorthSouthPort {
                            continue;
                        }
                        if o.origin != Some(Origin::Node(owner)) {
                            break;
                        }
                        let (input2, output2) = origin_ports(g, other);
                        crossings += pair_crossings(northern, (input, output), (input2, output2));
                    }
                }
                _ => {}
            }
        }
        crossings
    }
}

/// Positions (on the owner) of the origin ports a north/south dummy stands in for.
fn origin_ports(g: &LayeredGraph, dummy: NodeId) -> (Option<usize>, Option<usize>) {
    let mut input = None;
    let mut output = None;
    for &port in g.node(dummy).ports() {
        let p = g.port(port);
        let origin = p.origin.and_then(|o| g.port_index(o));
        if !p.incoming().is_empty() {
            input = origin;
        } else if !p.outgoing().is_empty() {
            output = origin;
        }
    }
    (input, output)
}

/// Crossings between the dummy `(input, output)` and a dummy `(input2, output2)` of the same
/// owner placed after it in the layer.
fn pair_crossings(
    northern: bool,
    (input, output): (Option<usize>, Option<usize>),
    (input2, output2): (Option<usize>, Option<usize>),
) -> usize {
    let lt = |a: Option<usize>, b: Option<usize>| matches!((a, b), (Some(a), Some(b)) if a < b);
    let gt = |a: Option<usize>, b: Option<usize>| matches!((a, b), (Some(a), Some(b)) if a > b);

    let mut crossings = 0;
    let mut input_collision = false;
    let mut output_collision = false;
    if northern {
        // Collisions are tracked for the dummy closer to the top.
        for (hit, on_output) in [
            (lt(output, input2), true),
            (gt(input, output2), false),
            (gt(output, output2), true),
            (lt(input, input2), false),
        ] {
            if hit {
                crossings += 1;
                if on_output {
                    output_collision = true;
                } else {
                    input_collision = true;
                }
            }
        }
        if input_collision && output_collision && input == output {
            crossings -= 1;
        }
    } else {
        // Collisions are tracked for the dummy further from the owner.
        for (hit, on_output) in [
            (lt(input, output2), true),
            (gt(output, input2), false),
            (lt(input, input2), false),
            (gt(output, output2), true),
        ] {
            if hit {
                crossings += 1;
                if on_output {
                    output_collision = true;
                } else {
                    input_collision = true;
                }
            }
        }
        if input_collision && output_collision && input2 == output2 {
            crossings -= 1;
        }
    }
    crossings
}

fn number_side(
    g: &LayeredGraph,
    node: NodeId,
    side: PortSide,
    mut current: usize,
    numbers: &mut [Option<usize>],
    numbered: &mut Vec<PortId>,
) -> usize {
    if g.node(node).port_constraints.is_order_fixed() {
        for port in g.ports_on_side(node, side) {
            let degree = g.port(port).degree();
            if degree > 0 {
                current += degree;
                numbers[port.index()] = Some(current);
                numbered.push(port);
            }
        }
    } else {
        current += g.ports_on_side(node, side).map(|p| g.port(p).degree()).sum::<usize>();
        for port in g.ports_on_side(node, side) {
            if g.port(port).degree() > 0 {
                numbers[port.index()] = Some(current);
                numbered.push(port);
            }
        }
    }
    current
}

/// Largest number of edge ends strictly between `port` and a same-side port it connects to.
fn max_in_layer_span(g: &LayeredGraph, port: PortId, numbers: &[Option<usize>]) -> usize {
    let Some(index) = numbers[port.index()] else {
        return 0;
    };
    let mut max = 0;
    for edge in g.port(port).connected_edges() {
        let other = g.opposite(edge, port);
        if let Some(other_index) = numbers[other.index()] {
            // Each edge is counted from its lower end only.
            if index > other_index {
                max = max.max(index - other_index - 1);
            }
        }
    }
    max
}
