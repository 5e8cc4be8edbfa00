#![forbid(unsafe_code)]

//! Layer-sweep crossing minimization for layered graph layout.
//!
//! Given a [`Hierarchy`](lamina_graph::Hierarchy) whose nodes are already assigned to layers,
//! [`minimize_crossings`] reorders the nodes of every layer and the ports of every node so that
//! few edges cross. Nested graphs are either optimized on their own or swept together with their
//! parent, depending on how strongly they are tied to their hierarchical ports.

pub use lamina_graph as graph;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod constraints;
pub mod counting;
pub mod distribution;
pub mod error;
pub mod heuristics;
pub mod info;
pub mod options;
pub mod progress;
pub mod random;
pub mod sweep;
pub mod util;

pub use counting::count_crossings;
pub use error::{Error, Result};
pub use options::{
    CrossMinOptions, CrossMinStrategy, GreedySwitchType, HierarchicalOptions, HierarchicalSweepMode,
    PortDistributionStrategy,
};
pub use progress::{NullProgressMonitor, ProgressMonitor};
pub use random::Random;
pub use sweep::{CrossMinResult, minimize_crossings};
