//! Precondition checks run before the ordering phase touches a hierarchy.

use crate::error::{GraphError, Result};
use crate::graph::{LayeredGraph, NodeKind, Origin, PortSide};
use crate::hierarchy::Hierarchy;
use crate::ids::{LayerId, NodeId};

impl Hierarchy {
    /// Checks the structural preconditions of every graph in the hierarchy.
    pub fn validate(&self) -> Result<()> {
        for g in self.graphs() {
            validate_layers(g)?;
            validate_ports(g)?;
            validate_edges(g)?;
            validate_constraints(g)?;
            validate_external_ports(self, g)?;
        }
        Ok(())
    }
}

fn validate_layers(g: &LayeredGraph) -> Result<()> {
    for (i, layer) in g.layers().iter().enumerate() {
        if layer.is_empty() {
            return Err(GraphError::EmptyLayer {
                graph: g.id(),
                layer: LayerId::new(i),
            });
        }
    }
    Ok(())
}

fn validate_ports(g: &LayeredGraph) -> Result<()> {
    for node in g.node_ids() {
        for &port in g.node(node).ports() {
            if g.port(port).side == PortSide::Undefined {
                return Err(GraphError::UndefinedPortSide {
                    graph: g.id(),
                    node,
                    port,
                });
            }
        }
    }
    Ok(())
}

fn validate_edges(g: &LayeredGraph) -> Result<()> {
    for edge in g.edge_ids() {
        let e = g.edge(edge);
        let source_layer = g.layer_of(g.node_of(e.source())).index();
        let target_layer = g.layer_of(g.node_of(e.target())).index();
        if source_layer.abs_diff(target_layer) > 1 {
            return Err(GraphError::LongEdge {
                graph: g.id(),
                edge,
                source_layer,
                target_layer,
            });
        }
    }
    Ok(())
}

fn validate_constraints(g: &LayeredGraph) -> Result<()> {
    for (i, layer) in g.layers().iter().enumerate() {
        // Kahn's algorithm restricted to the layer.
        let mut indegree = vec![0usize; g.node_count()];
        for &n in layer.nodes() {
            for &succ in &g.node(n).successor_constraints {
                if succ.index() >= g.node_count() {
                    return Err(GraphError::UnknownConstraintTarget {
                        graph: g.id(),
                        from: n,
                        to: succ,
                    });
                }
                if g.layer_of(succ) != g.layer_of(n) {
                    return Err(GraphError::ConstraintAcrossLayers {
                        graph: g.id(),
                        from: n,
                        to: succ,
                    });
                }
                indegree[succ.index()] += 1;
            }
        }
        let mut ready: Vec<NodeId> = layer
            .nodes()
            .iter()
            .copied()
            .filter(|n| indegree[n.index()] == 0)
            .collect();
        let mut seen = 0;
        while let Some(n) = ready.pop() {
            seen += 1;
            for &succ in &g.node(n).successor_constraints {
                indegree[succ.index()] -= 1;
                if indegree[succ.index()] == 0 {
                    ready.push(succ);
                }
            }
        }
        if seen != layer.len() {
            return Err(GraphError::CyclicConstraints {
                graph: g.id(),
                layer: LayerId::new(i),
            });
        }
    }
    Ok(())
}

fn validate_external_ports(h: &Hierarchy, g: &LayeredGraph) -> Result<()> {
    for node in g.node_ids() {
        if g.node(node).kind != NodeKind::ExternalPort {
            continue;
        }
        let dangling = GraphError::DanglingExternalPort {
            graph: g.id(),
            node,
        };
        let (Some((parent_graph, parent_node)), Some(Origin::ExternalPort(port))) =
            (g.parent(), g.node(node).origin)
        else {
            return Err(dangling);
        };
        let parent = h.graph(parent_graph);
        if port.index() >= parent.port_count() {
            return Err(dangling);
        }
        let p = parent.port(port);
        if p.node() != parent_node || !p.inside_connections || p.port_dummy != Some(node) {
            return Err(dangling);
        }
    }
    Ok(())
}
