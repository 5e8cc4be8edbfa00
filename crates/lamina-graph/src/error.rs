use crate::ids::{EdgeId, GraphId, LayerId, NodeId, PortId};

/// Structural precondition violations found by [`Hierarchy::validate`](crate::Hierarchy::validate).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("layer {layer:?} of graph {graph:?} is empty")]
    EmptyLayer { graph: GraphId, layer: LayerId },
    #[error("port {port:?} of node {node:?} in graph {graph:?} has no side assigned")]
    UndefinedPortSide {
        graph: GraphId,
        node: NodeId,
        port: PortId,
    },
    #[error("edge {edge:?} in graph {graph:?} spans layers {source_layer} and {target_layer}")]
    LongEdge {
        graph: GraphId,
        edge: EdgeId,
        source_layer: usize,
        target_layer: usize,
    },
    #[error("successor constraint {from:?} -> {to:?} in graph {graph:?} leaves the layer")]
    ConstraintAcrossLayers {
        graph: GraphId,
        from: NodeId,
        to: NodeId,
    },
    #[error("successor constraint {from:?} -> {to:?} in graph {graph:?} names an unknown node")]
    UnknownConstraintTarget {
        graph: GraphId,
        from: NodeId,
        to: NodeId,
    },
    #[error("successor constraints of layer {layer:?} in graph {graph:?} contain a cycle")]
    CyclicConstraints { graph: GraphId, layer: LayerId },
    #[error("external port dummy {node:?} in graph {graph:?} has no hierarchical port in its parent")]
    DanglingExternalPort { graph: GraphId, node: NodeId },
}

pub type Result<T> = std::result::Result<T, GraphError>;
