//! Tree of nested layered graphs.

use crate::graph::{LayeredGraph, NodeKind, Origin};
use crate::ids::{GraphId, LayerId, NodeId, PortId};

/// Owns the root graph and every graph nested in a compound node.
///
/// Graphs are stored in creation order; a nested graph is always created after its parent, so
/// `GraphId(0)` is the root and child ids are larger than their parent's id.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    graphs: Vec<LayeredGraph>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    pub fn new() -> Self {
        Self {
            graphs: vec![LayeredGraph::new(GraphId::new(0), None)],
        }
    }

    pub fn root_id(&self) -> GraphId {
        GraphId::new(0)
    }

    pub fn root(&self) -> &LayeredGraph {
        &self.graphs[0]
    }

    pub fn root_mut(&mut self) -> &mut LayeredGraph {
        &mut self.graphs[0]
    }

    pub fn graph(&self, id: GraphId) -> &LayeredGraph {
        &self.graphs[id.index()]
    }

    pub fn graph_mut(&mut self, id: GraphId) -> &mut LayeredGraph {
        &mut self.graphs[id.index()]
    }

    pub fn graphs(&self) -> &[LayeredGraph] {
        &self.graphs
    }

    /// All graphs, indexed by [`GraphId`].
    pub fn graphs_mut(&mut self) -> &mut [LayeredGraph] {
        &mut self.graphs
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.iter().all(LayeredGraph::is_empty)
    }

    /// Creates an empty graph owned by `parent_node` of `parent`.
    pub fn add_nested_graph(&mut self, parent: GraphId, parent_node: NodeId) -> GraphId {
        let id = GraphId::new(self.graphs.len());
        self.graphs
            .push(LayeredGraph::new(id, Some((parent, parent_node))));
        self.graphs[parent.index()].set_nested(parent_node, id);
        id
    }

    /// Adds an external-port dummy for `parent_port` to `layer` of the nested graph `nested`.
    ///
    /// The dummy gets a single port on the side opposite to `parent_port` (facing the inner
    /// content), and the parent port is marked as having inside connections.
    pub fn add_external_port_dummy(
        &mut self,
        nested: GraphId,
        layer: LayerId,
        parent_port: PortId,
    ) -> Option<(NodeId, PortId)> {
        let (parent_graph, _) = self.graphs[nested.index()].parent()?;
        let side = self.graphs[parent_graph.index()].port(parent_port).side;

        let inner = &mut self.graphs[nested.index()];
        let dummy = inner.add_node(layer, NodeKind::ExternalPort);
        inner.node_mut(dummy).origin = Some(Origin::ExternalPort(parent_port));
        let dummy_port = inner.add_port(dummy, side.opposed());

        let port = self.graphs[parent_graph.index()].port_mut(parent_port);
        port.inside_connections = true;
        port.port_dummy = Some(dummy);
        Some((dummy, dummy_port))
    }

    /// Nested graphs in breadth-first order starting at the root (root included).
    pub fn breadth_first(&self) -> Vec<GraphId> {
        let mut out = vec![self.root_id()];
        let mut i = 0;
        while i < out.len() {
            let g = &self.graphs[out[i].index()];
            for layer in g.layers() {
                for &n in layer.nodes() {
                    if let Some(child) = g.node(n).nested_graph() {
                        out.push(child);
                    }
                }
            }
            i += 1;
        }
        out
    }

    /// Lends out one graph mutably while keeping the others readable.
    pub fn split_mut(&mut self, id: GraphId) -> Option<(&mut LayeredGraph, Rest<'_, LayeredGraph>)> {
        split_one_mut(&mut self.graphs, id.index())
    }
}

/// Read-only view of a slice with one element lent out elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct Rest<'a, T> {
    before: &'a [T],
    after: &'a [T],
}

impl<'a, T> Rest<'a, T> {
    /// Returns `None` for the lent-out index and for indices out of range.
    pub fn get(&self, index: usize) -> Option<&'a T> {
        let at = self.before.len();
        match index.cmp(&at) {
            std::cmp::Ordering::Less => self.before.get(index),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => self.after.get(index - at - 1),
        }
    }
}

/// Splits `items` into the element at `index` (mutable) and everything else (shared).
pub fn split_one_mut<T>(items: &mut [T], index: usize) -> Option<(&mut T, Rest<'_, T>)> {
    if index >= items.len() {
        return None;
    }
    let (before, rest) = items.split_at_mut(index);
    let (item, after) = rest.split_first_mut()?;
    Some((
        item,
        Rest {
            before: &*before,
            after: &*after,
        },
    ))
}
