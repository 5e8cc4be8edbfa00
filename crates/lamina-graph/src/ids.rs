//! Dense typed indices.
//!
//! Every element of a [`LayeredGraph`](crate::LayeredGraph) lives in a per-graph arena and is
//! addressed by its arena index. Indices are assigned once, on insertion, and never change; the
//! *order* of nodes in a layer and of ports around a node is tracked separately.

use serde::{Deserialize, Serialize};

macro_rules! dense_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(usize);

        impl $name {
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }
    };
}

dense_id!(
    /// A graph inside a [`Hierarchy`](crate::Hierarchy). The root graph is always `GraphId(0)`.
    GraphId
);
dense_id!(
    /// Position of a layer among its graph's layers.
    LayerId
);
dense_id!(NodeId);
dense_id!(PortId);
dense_id!(EdgeId);
