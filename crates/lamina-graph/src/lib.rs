#![forbid(unsafe_code)]

//! Layered graph model used by `lamina`.
//!
//! The model is what an upstream layering pipeline hands to the ordering phase: graphs split
//! into non-empty layers, nodes with side-assigned ports, long edges already broken into
//! per-layer dummy chains, and compound nodes owning nested graphs.

pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod ids;
mod validate;

pub use error::{GraphError, Result};
pub use graph::{
    Edge, Layer, LayeredGraph, Node, NodeKind, Origin, Point, Port, PortConstraints, PortSide,
    PortType, Size,
};
pub use hierarchy::{Hierarchy, Rest, split_one_mut};
pub use ids::{EdgeId, GraphId, LayerId, NodeId, PortId};
