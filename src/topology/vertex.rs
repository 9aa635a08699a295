use super::face::Face;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in a mesh graph.
    ///
    /// Handles are ordered by slot, which is the traversal order of
    /// [`MeshGraph::vertices`](super::MeshGraph::vertices).
    pub struct VertexId;
}

/// Adjacency held by a vertex.
#[derive(Debug, Clone, Default)]
pub struct VertexData {
    /// Ring neighbours in insertion order.
    pub(crate) neighbors: Vec<VertexId>,
    /// Incident faces in insertion order.
    pub(crate) faces: Vec<Face>,
}

impl VertexData {
    /// Returns `true` if the vertex has no incident edge.
    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Number of incident edges.
    #[must_use]
    pub fn valence(&self) -> usize {
        self.neighbors.len()
    }
}
