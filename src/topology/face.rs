use super::edge::Edge;
use super::vertex::VertexId;

/// An oriented triangle `(A, B, C)`.
///
/// The corners are rotated so the smallest vertex comes first. Two faces
/// compare equal when one is a cyclic rotation of the other; reversing the
/// winding gives a different face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Face {
    a: VertexId,
    b: VertexId,
    c: VertexId,
}

impl Face {
    /// Creates the face with winding `a -> b -> c`.
    #[must_use]
    pub fn new(a: VertexId, b: VertexId, c: VertexId) -> Self {
        if a <= b && a <= c {
            Self { a, b, c }
        } else if b <= a && b <= c {
            Self { a: b, b: c, c: a }
        } else {
            Self { a: c, b: a, c: b }
        }
    }

    /// First corner.
    #[must_use]
    pub fn a(&self) -> VertexId {
        self.a
    }

    /// Second corner.
    #[must_use]
    pub fn b(&self) -> VertexId {
        self.b
    }

    /// Third corner.
    #[must_use]
    pub fn c(&self) -> VertexId {
        self.c
    }

    /// Corners in winding order.
    #[must_use]
    pub fn vertices(&self) -> [VertexId; 3] {
        [self.a, self.b, self.c]
    }

    /// The same triangle with reversed winding.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self::new(self.a, self.c, self.b)
    }

    /// Returns `true` if two corners coincide.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b || self.b == self.c || self.c == self.a
    }

    /// Returns `true` if `v` is a corner.
    #[must_use]
    pub fn contains(&self, v: VertexId) -> bool {
        self.a == v || self.b == v || self.c == v
    }

    /// The three undirected edges `ab`, `bc`, `ca`.
    #[must_use]
    pub fn edges(&self) -> [Edge; 3] {
        [
            Edge::new(self.a, self.b),
            Edge::new(self.b, self.c),
            Edge::new(self.c, self.a),
        ]
    }

    /// The three directed half-edges in winding order.
    #[must_use]
    pub fn half_edges(&self) -> [(VertexId, VertexId); 3] {
        [(self.a, self.b), (self.b, self.c), (self.c, self.a)]
    }

    /// The corner not on `edge`, or `None` if `edge` is not a side.
    #[must_use]
    pub fn opposite(&self, edge: &Edge) -> Option<VertexId> {
        if !self.edges().contains(edge) {
            return None;
        }
        self.vertices().into_iter().find(|&v| !edge.contains(v))
    }

    /// The face with every corner equal to `from` replaced by `to`.
    #[must_use]
    pub fn substitute(&self, from: VertexId, to: VertexId) -> Self {
        let swap = |v: VertexId| if v == from { to } else { v };
        Self::new(swap(self.a), swap(self.b), swap(self.c))
    }

    /// Returns `true` if both faces use the same three vertices,
    /// regardless of winding.
    #[must_use]
    pub fn same_vertices(&self, other: &Face) -> bool {
        *self == *other || *self == other.flipped()
    }
}
