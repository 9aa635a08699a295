use super::face::Face;
use super::vertex::VertexId;

/// An undirected edge between two distinct vertices.
///
/// The endpoints are stored sorted, so `Edge::new(a, b) == Edge::new(b, a)`
/// and equality and hashing never depend on the order they were given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    a: VertexId,
    b: VertexId,
}

impl Edge {
    /// Creates the edge joining `a` and `b`.
    #[must_use]
    pub fn new(a: VertexId, b: VertexId) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    /// The smaller endpoint.
    #[must_use]
    pub fn a(&self) -> VertexId {
        self.a
    }

    /// The larger endpoint.
    #[must_use]
    pub fn b(&self) -> VertexId {
        self.b
    }

    /// Both endpoints, smaller first.
    #[must_use]
    pub fn vertices(&self) -> [VertexId; 2] {
        [self.a, self.b]
    }

    /// Returns `true` if `v` is an endpoint.
    #[must_use]
    pub fn contains(&self, v: VertexId) -> bool {
        self.a == v || self.b == v
    }

    /// The endpoint across from `v`, or `None` if `v` is not an endpoint.
    #[must_use]
    pub fn opposite(&self, v: VertexId) -> Option<VertexId> {
        if v == self.a {
            Some(self.b)
        } else if v == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Faces incident to an edge. A manifold edge has at most two.
#[derive(Debug, Clone, Default)]
pub struct EdgeData {
    pub(crate) faces: Vec<Face>,
}

impl EdgeData {
    /// The incident faces.
    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }
}
