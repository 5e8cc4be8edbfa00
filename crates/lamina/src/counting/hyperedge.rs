//! Crossing approximation for layers whose ports carry more than one edge.
//!
//! Edges sharing a port are merged into hyperedges (by union over shared ports). Every
//! hyperedge is reduced to its vertical extent on both layers; crossings are the inversions of
//! the upper corners plus, per side, the number of hyperedges a lower corner closes over. The
//! result equals the exact count for simple edges. An edge passing through the span of a
//! hyperedge counts once, however many of the hyperedge's branches it passes.

use lamina_graph::{LayerId, LayeredGraph, NodeId, PortId, PortSide};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
struct Hyperedge {
    ports: Vec<PortId>,
    upper_left: usize,
    lower_left: usize,
    upper_right: usize,
    lower_right: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CornerType {
    Upper,
    Lower,
}

#[derive(Debug, Clone, Copy)]
struct Corner {
    hyperedge: usize,
    position: usize,
    opposite: usize,
    kind: CornerType,
}

impl Corner {
    fn order(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then(self.opposite.cmp(&other.opposite))
            .then(self.hyperedge.cmp(&other.hyperedge))
            .then(self.kind.cmp(&other.kind))
    }
}

#[derive(Debug, Clone)]
pub struct HyperedgeCrossingsCounter {
    port_positions: Vec<usize>,
    port_hyperedge: Vec<Option<usize>>,
}

impl HyperedgeCrossingsCounter {
    pub fn new(port_count: usize) -> Self {
        Self {
            port_positions: vec![0; port_count],
            port_hyperedge: vec![None; port_count],
        }
    }

    pub fn count_crossings(&mut self, g: &LayeredGraph, left: &[NodeId], right: &[NodeId]) -> usize {
        let (Some(&left_first), Some(&right_first)) = (left.first(), right.first()) else {
            return 0;
        };
        let left_layer = g.layer_of(left_first);
        let right_layer = g.layer_of(right_first);

        // Left ports: clockwise, only those with edges leaving the layer.
        let mut source_count = 0;
        for &node in left {
            for &port in g.node(node).ports() {
                let leaving = g
                    .successor_ports(port)
                    .filter(|&t| g.layer_of(g.node_of(t)) != left_layer)
                    .count();
                if leaving > 0 {
                    self.port_positions[port.index()] = source_count;
                    source_count += 1;
                }
            }
        }

        // Right ports: north inputs first, then the remaining inputs counter-clockwise.
        let mut target_count = 0;
        for &node in right {
            let entering =
                |p: PortId| g.predecessor_ports(p).any(|s| g.layer_of(g.node_of(s)) != right_layer);
            let ports = g.node(node).ports();
            let mut north_inputs = 0;
            for &port in ports {
                if g.port(port).side != PortSide::North {
                    break;
                }
                if entering(port) {
                    north_inputs += 1;
                }
            }
            let mut other_inputs = 0;
            for &port in ports.iter().rev() {
                if !entering(port) {
                    continue;
                }
                if g.port(port).side == PortSide::North {
                    self.port_positions[port.index()] = target_count;
                    target_count += 1;
                } else {
                    self.port_positions[port.index()] = target_count + north_inputs + other_inputs;
                    other_inputs += 1;
                }
            }
            target_count += other_inputs;
        }

        let mut hyperedges = self.gather_hyperedges(g, left, left_layer);
        for he in &mut hyperedges {
            he.upper_left = source_count;
            he.upper_right = target_count;
            for &port in &he.ports {
                let pos = self.port_positions[port.index()];
                let layer = g.layer_of(g.node_of(port));
                if layer == left_layer {
                    he.upper_left = he.upper_left.min(pos);
                    he.lower_left = he.lower_left.max(pos);
                } else if layer == right_layer {
                    he.upper_right = he.upper_right.min(pos);
                    he.lower_right = he.lower_right.max(pos);
                }
            }
        }
        for he in &hyperedges {
            for &port in &he.ports {
                self.port_hyperedge[port.index()] = None;
            }
        }

        // Hyperedges keep their creation index for tie-breaking.
        let mut sorted: Vec<usize> = (0..hyperedges.len()).collect();
        sorted.sort_by(|&a, &b| {
            let (ha, hb) = (&hyperedges[a], &hyperedges[b]);
            ha.upper_left
                .cmp(&hb.upper_left)
                .then(ha.upper_right.cmp(&hb.upper_right))
                .then(a.cmp(&b))
        });

        let mut crossings = count_upper_inversions(&hyperedges, &sorted, target_count);

        let left_corners = corners(&sorted, |i| (hyperedges[i].upper_left, hyperedges[i].lower_left));
        crossings += count_corner_crossings(left_corners);
        let right_corners =
            corners(&sorted, |i| (hyperedges[i].upper_right, hyperedges[i].lower_right));
        crossings += count_corner_crossings(right_corners);
        crossings
    }

    fn gather_hyperedges(
        &mut self,
        g: &LayeredGraph,
        left: &[NodeId],
        left_layer: LayerId,
    ) -> Vec<Hyperedge> {
        let mut slots: Vec<Option<Hyperedge>> = Vec::new();
        for &node in left {
            for &source in g.node(node).ports() {
                for &edge in g.port(source).outgoing() {
                    let target = g.edge(edge).target();
                    if g.layer_of(g.node_of(target)) == left_layer {
                        continue;
                    }
                    let source_he = self.port_hyperedge[source.index()];
                    let target_he = self.port_hyperedge[target.index()];
                    match (source_he, target_he) {
                        (None, None) => {
                            let id = slots.len();
                            slots.push(Some(Hyperedge {
                                ports: vec![source, target],
                                upper_left: 0,
                                lower_left: 0,
                                upper_right: 0,
                                lower_right: 0,
                            }));
                            self.port_hyperedge[source.index()] = Some(id);
                            self.port_hyperedge[target.index()] = Some(id);
                        }
                        (None, Some(t)) => {
                            if let Some(he) = slots[t].as_mut() {
                                he.ports.push(source);
                            }
                            self.port_hyperedge[source.index()] = Some(t);
                        }
                        (Some(s), None) => {
                            if let Some(he) = slots[s].as_mut() {
                                he.ports.push(target);
                            }
                            self.port_hyperedge[target.index()] = Some(s);
                        }
                        (Some(s), Some(t)) if s == t => {}
                        (Some(s), Some(t)) => {
                            let Some(absorbed) = slots[t].take() else {
                                continue;
                            };
                            for &p in &absorbed.ports {
                                self.port_hyperedge[p.index()] = Some(s);
                            }
                            if let Some(he) = slots[s].as_mut() {
                                he.ports.extend(absorbed.ports);
                            }
                        }
                    }
                }
            }
        }
        slots.into_iter().flatten().collect()
    }
}

/// Inversions among the upper-right corners when hyperedges are ordered by their upper-left
/// corners, counted with an accumulator tree over the compressed right positions.
fn count_upper_inversions(hyperedges: &[Hyperedge], sorted: &[usize], target_count: usize) -> usize {
    let mut south: Vec<usize> = sorted.iter().map(|&i| hyperedges[i].upper_right).collect();
    let mut used = vec![false; target_count + 1];
    for &s in &south {
        used[s] = true;
    }
    let mut compressed = vec![0usize; target_count + 1];
    let mut next = 0;
    for (i, &u) in used.iter().enumerate() {
        if u {
            compressed[i] = next;
            next += 1;
        }
    }
    for s in &mut south {
        *s = compressed[*s];
    }
    let q = next;

    let mut first_index = 1;
    while first_index < q {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree = vec![0usize; tree_size];

    let mut crossings = 0;
    for &s in &south {
        let mut index = s + first_index;
        tree[index] += 1;
        while index > 0 {
            if index % 2 == 1 {
                crossings += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += 1;
        }
    }
    crossings
}

fn corners(sorted: &[usize], extent: impl Fn(usize) -> (usize, usize)) -> Vec<Corner> {
    let mut out = Vec::with_capacity(sorted.len() * 2);
    for &i in sorted {
        let (upper, lower) = extent(i);
        out.push(Corner {
            hyperedge: i,
            position: upper,
            opposite: lower,
            kind: CornerType::Upper,
        });
        out.push(Corner {
            hyperedge: i,
            position: lower,
            opposite: upper,
            kind: CornerType::Lower,
        });
    }
    out
}

fn count_corner_crossings(mut corners: Vec<Corner>) -> usize {
    corners.sort_by(Corner::order);
    let mut open = 0usize;
    let mut crossings = 0;
    for c in &corners {
        match c.kind {
            CornerType::Upper => open += 1,
            CornerType::Lower => {
                open = open.saturating_sub(1);
                crossings += open;
            }
        }
    }
    crossings
}
