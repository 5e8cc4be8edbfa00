//! Small helpers shared by counters, heuristics and distributors.

use lamina_graph::{LayeredGraph, NodeId, PortId, PortSide, PortType};
use std::cmp::Ordering;

/// Ports of `node` on `side`, ordered north to south (east/west) or west to east (north/south).
///
/// A node's port list is clockwise, so the west and south sides have to be reversed.
pub fn in_north_south_east_west_order(g: &LayeredGraph, node: NodeId, side: PortSide) -> Vec<PortId> {
    let mut ports: Vec<PortId> = g.ports_on_side(node, side).collect();
    if matches!(side, PortSide::West | PortSide::South) {
        ports.reverse();
    }
    ports
}

/// Index of the layer a sweep starts with.
pub fn first_index(forward: bool, len: usize) -> usize {
    if forward { 0 } else { len.saturating_sub(1) }
}

/// Index of the layer a sweep ends with.
pub fn end_index(forward: bool, len: usize) -> usize {
    if forward { len.saturating_sub(1) } else { 0 }
}

/// Free layers visited by a sweep after the first one, in visiting order.
pub fn free_layers(forward: bool, len: usize) -> Vec<usize> {
    if forward {
        (1..len).collect()
    } else {
        (0..len.saturating_sub(1)).rev().collect()
    }
}

/// Index of the fixed layer next to `free` for a sweep in the given direction.
pub fn fixed_index(forward: bool, free: usize) -> usize {
    if forward { free - 1 } else { free + 1 }
}

/// The side of the free layer's nodes that faces the fixed layer.
pub fn side_facing_fixed(forward: bool) -> PortSide {
    if forward { PortSide::West } else { PortSide::East }
}

/// Ports of the fixed layer that are ranked for a sweep: those feeding edges into the free layer.
pub fn fixed_port_type(forward: bool) -> PortType {
    if forward { PortType::Output } else { PortType::Input }
}

/// Stable insertion sort.
///
/// Used where the comparator is not guaranteed to be a total order; unlike the library sorts it
/// never panics on inconsistent comparisons and only ever swaps adjacent elements the
/// comparator orders strictly.
pub fn insertion_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}
