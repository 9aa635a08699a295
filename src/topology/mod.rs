pub mod edge;
pub mod face;
pub mod vertex;

pub use edge::{Edge, EdgeData};
pub use face::Face;
pub use vertex::{VertexData, VertexId};

use std::collections::{BTreeMap, BTreeSet, HashMap};

use slotmap::SlotMap;
use tracing::debug;

use crate::error::TopologyError;
use crate::math::DisjointSet;

/// Triangle mesh connectivity.
///
/// Vertices live in a slotmap arena and are referenced by generational
/// [`VertexId`] handles. Edges and faces are value types keyed by their
/// corners. The graph keeps four derived indices in lockstep with every
/// mutation: vertex → ring neighbours, vertex → incident faces,
/// edge → incident faces and directed half-edge → owning face.
///
/// The graph is not required to be globally manifold, but an edge never
/// bounds more than two faces and a directed half-edge never belongs to
/// more than one face.
#[derive(Debug, Clone, Default)]
pub struct MeshGraph {
    vertices: SlotMap<VertexId, VertexData>,
    edges: BTreeMap<Edge, EdgeData>,
    faces: BTreeSet<Face>,
    half_edges: HashMap<(VertexId, VertexId), Face>,
}

impl MeshGraph {
    /// Creates a new, empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Counts ---

    /// Number of vertices.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Euler characteristic `|V| - |E| + |F|`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn euler_characteristic(&self) -> i64 {
        self.num_vertices() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }

    /// Genus `(2 - χ) / 2`, meaningful for closed orientable surfaces only.
    #[must_use]
    pub fn genus(&self) -> i64 {
        (2 - self.euler_characteristic()) / 2
    }

    // --- Vertex operations ---

    /// Creates an isolated vertex and returns its handle.
    pub fn add_vertex(&mut self) -> VertexId {
        self.vertices.insert(VertexData::default())
    }

    /// Returns the adjacency of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not in the graph.
    pub fn vertex(&self, v: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(v)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns `true` if the vertex is in the graph.
    #[must_use]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains_key(v)
    }

    /// Iterates vertices in slot order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys()
    }

    /// Removes a vertex together with its face-free edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is missing or still has incident faces.
    pub fn remove_vertex(&mut self, v: VertexId) -> Result<(), TopologyError> {
        let data = self.vertex(v)?;
        if !data.faces.is_empty() {
            return Err(TopologyError::VertexInUse {
                faces: data.faces.len(),
            });
        }

        let neighbors = data.neighbors.clone();
        for n in neighbors {
            self.edges.remove(&Edge::new(v, n));
            if let Some(nd) = self.vertices.get_mut(n) {
                nd.neighbors.retain(|&x| x != v);
            }
        }
        self.vertices.remove(v);
        Ok(())
    }

    /// The 1-ring of `v`: every vertex sharing an edge with it, once each.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not in the graph.
    pub fn vert_ring(&self, v: VertexId) -> Result<&[VertexId], TopologyError> {
        Ok(&self.vertex(v)?.neighbors)
    }

    /// Faces incident to `v`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not in the graph.
    pub fn face_ring(&self, v: VertexId) -> Result<&[Face], TopologyError> {
        Ok(&self.vertex(v)?.faces)
    }

    /// Edges incident to `v`, in ring order.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not in the graph.
    pub fn edge_star(&self, v: VertexId) -> Result<Vec<Edge>, TopologyError> {
        Ok(self
            .vertex(v)?
            .neighbors
            .iter()
            .map(|&n| Edge::new(v, n))
            .collect())
    }

    // --- Edge operations ---

    /// Creates the edge `ab` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if `a == b` or either vertex is missing.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<Edge, TopologyError> {
        if a == b {
            return Err(TopologyError::DegenerateEdge);
        }
        self.vertex(a)?;
        self.vertex(b)?;
        Ok(self.link(a, b))
    }

    /// Returns `true` if `a` and `b` share an edge.
    #[must_use]
    pub fn has_edge(&self, a: VertexId, b: VertexId) -> bool {
        a != b && self.edges.contains_key(&Edge::new(a, b))
    }

    /// Returns `true` if some face walks from `a` to `b`.
    #[must_use]
    pub fn has_half_edge(&self, a: VertexId, b: VertexId) -> bool {
        self.half_edges.contains_key(&(a, b))
    }

    /// Iterates edges in sorted order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.keys().copied()
    }

    /// Faces incident to `edge`; empty for an unknown edge.
    #[must_use]
    pub fn edge_faces(&self, edge: &Edge) -> &[Face] {
        self.edges.get(edge).map_or(&[][..], EdgeData::faces)
    }

    /// Returns `true` iff `edge` is incident to exactly one face.
    #[must_use]
    pub fn is_boundary(&self, edge: &Edge) -> bool {
        self.edge_faces(edge).len() == 1
    }

    /// Iterates the boundary edges in sorted order.
    pub fn boundary_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges
            .iter()
            .filter(|(_, data)| data.faces.len() == 1)
            .map(|(edge, _)| *edge)
    }

    /// Number of boundary edges.
    #[must_use]
    pub fn num_boundary_edges(&self) -> usize {
        self.boundary_edges().count()
    }

    /// The free directions of the boundary edges.
    ///
    /// For a boundary edge whose face walks `u -> v`, the free half-edge is
    /// `v -> u`. Following free half-edges head to tail walks each boundary
    /// loop in the winding implied by its faces.
    #[must_use]
    pub fn boundary_half_edges(&self) -> Vec<(VertexId, VertexId)> {
        self.boundary_edges()
            .map(|edge| {
                let (a, b) = (edge.a(), edge.b());
                if self.has_half_edge(a, b) {
                    (b, a)
                } else {
                    (a, b)
                }
            })
            .collect()
    }

    /// Vertices incident to at least one boundary edge, once each, in
    /// ascending handle order.
    #[must_use]
    pub fn bound(&self) -> Vec<VertexId> {
        let verts: BTreeSet<VertexId> = self
            .boundary_edges()
            .flat_map(|edge| edge.vertices())
            .collect();
        verts.into_iter().collect()
    }

    /// Number of connected components of the boundary-edge subgraph.
    #[must_use]
    pub fn num_bound_components(&self) -> usize {
        let mut set = DisjointSet::new();
        for edge in self.boundary_edges() {
            set.union(edge.a(), edge.b());
        }
        set.num_sets()
    }

    // --- Face operations ---

    /// Inserts a face, creating any missing edges.
    ///
    /// If the requested winding would reuse a half-edge owned by a
    /// neighbouring face but the reversed winding fits, the face is flipped
    /// to agree with its neighbours. The inserted face is returned. The
    /// reversed winding of an existing face fits on its free half-edges, so
    /// the two close into a pillow.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the graph untouched, if the face repeats a
    /// vertex, references a missing vertex, repeats an existing face in the
    /// same winding, would give an edge a third face, or fits in neither
    /// winding.
    pub fn add_face(&mut self, face: Face) -> Result<Face, TopologyError> {
        if face.is_degenerate() {
            return Err(TopologyError::DegenerateFace);
        }
        for v in face.vertices() {
            self.vertex(v)?;
        }
        if self.faces.contains(&face) {
            return Err(TopologyError::DuplicateFace);
        }
        if face.edges().iter().any(|e| self.edge_faces(e).len() >= 2) {
            return Err(TopologyError::NonManifoldEdge);
        }

        let fits = |f: &Face| f.half_edges().iter().all(|he| !self.half_edges.contains_key(he));
        let oriented = if fits(&face) {
            face
        } else if fits(&face.flipped()) {
            debug!(?face, "flipping face to agree with its neighbours");
            face.flipped()
        } else {
            return Err(TopologyError::InconsistentOrientation);
        };

        for edge in oriented.edges() {
            self.link(edge.a(), edge.b());
            if let Some(data) = self.edges.get_mut(&edge) {
                data.faces.push(oriented);
            }
        }
        for he in oriented.half_edges() {
            self.half_edges.insert(he, oriented);
        }
        for v in oriented.vertices() {
            if let Some(data) = self.vertices.get_mut(v) {
                data.faces.push(oriented);
            }
        }
        self.faces.insert(oriented);
        Ok(oriented)
    }

    /// Removes the face on `face`'s vertices, preferring the given winding
    /// when both are stored. Its edges stay in the graph.
    ///
    /// # Errors
    ///
    /// Returns an error if no such face exists.
    pub fn remove_face(&mut self, face: Face) -> Result<Face, TopologyError> {
        let [a, b, c] = face.vertices();
        let stored = self
            .face(a, b, c)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))?;

        self.faces.remove(&stored);
        for he in stored.half_edges() {
            self.half_edges.remove(&he);
        }
        for edge in stored.edges() {
            if let Some(data) = self.edges.get_mut(&edge) {
                data.faces.retain(|f| *f != stored);
            }
        }
        for v in stored.vertices() {
            if let Some(data) = self.vertices.get_mut(v) {
                data.faces.retain(|f| *f != stored);
            }
        }
        Ok(stored)
    }

    /// Returns `true` if a face on `a`, `b`, `c` exists in either winding.
    #[must_use]
    pub fn has_face(&self, a: VertexId, b: VertexId, c: VertexId) -> bool {
        self.face(a, b, c).is_some()
    }

    /// Returns the stored face on `a`, `b`, `c`, preferring the given
    /// winding when both are stored.
    #[must_use]
    pub fn face(&self, a: VertexId, b: VertexId, c: VertexId) -> Option<Face> {
        let face = Face::new(a, b, c);
        if self.faces.contains(&face) {
            Some(face)
        } else if self.faces.contains(&face.flipped()) {
            Some(face.flipped())
        } else {
            None
        }
    }

    /// Iterates faces in sorted order.
    pub fn faces(&self) -> impl Iterator<Item = Face> + '_ {
        self.faces.iter().copied()
    }

    /// The other face on `edge`, seen from `face`.
    #[must_use]
    pub fn opposite_face(&self, face: &Face, edge: &Edge) -> Option<Face> {
        let faces = self.edge_faces(edge);
        if !faces.contains(face) {
            return None;
        }
        faces.iter().copied().find(|f| f != face)
    }

    // --- Consistency ---

    /// Checks the derived indices against each other and returns one
    /// message per inconsistency found. An empty list means the graph is
    /// consistent.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut msgs = Vec::new();

        for face in &self.faces {
            for edge in face.edges() {
                match self.edges.get(&edge) {
                    None => msgs.push(format!("face {face:?} has a missing edge {edge:?}")),
                    Some(data) if !data.faces.contains(face) => {
                        msgs.push(format!("edge {edge:?} does not list face {face:?}"));
                    }
                    Some(_) => {}
                }
            }
            for he in face.half_edges() {
                if self.half_edges.get(&he) != Some(face) {
                    msgs.push(format!("half-edge {he:?} is not owned by face {face:?}"));
                }
            }
            for v in face.vertices() {
                match self.vertices.get(v) {
                    None => msgs.push(format!("face {face:?} references a missing vertex")),
                    Some(data) if !data.faces.contains(face) => {
                        msgs.push(format!("vertex {v:?} does not list face {face:?}"));
                    }
                    Some(_) => {}
                }
            }
        }

        for (edge, data) in &self.edges {
            if data.faces.len() > 2 {
                msgs.push(format!("edge {edge:?} has {} faces", data.faces.len()));
            }
            for f in &data.faces {
                if !self.faces.contains(f) {
                    msgs.push(format!("edge {edge:?} lists a removed face {f:?}"));
                }
            }
            let [a, b] = edge.vertices();
            let linked = |x: VertexId, y: VertexId| {
                self.vertices
                    .get(x)
                    .is_some_and(|data| data.neighbors.contains(&y))
            };
            if !linked(a, b) || !linked(b, a) {
                msgs.push(format!("edge {edge:?} is missing from a vertex ring"));
            }
        }

        for (v, data) in &self.vertices {
            for &n in &data.neighbors {
                if !self.edges.contains_key(&Edge::new(v, n)) {
                    msgs.push(format!("ring of {v:?} lists {n:?} without an edge"));
                }
            }
            for f in &data.faces {
                if !f.contains(v) || !self.faces.contains(f) {
                    msgs.push(format!("vertex {v:?} lists a stale face {f:?}"));
                }
            }
        }

        if self.half_edges.len() != 3 * self.faces.len() {
            msgs.push(format!(
                "{} half-edges owned by {} faces",
                self.half_edges.len(),
                self.faces.len()
            ));
        }

        msgs
    }

    /// Creates the edge `ab` and ring links if missing. Both vertices must
    /// exist.
    fn link(&mut self, a: VertexId, b: VertexId) -> Edge {
        let edge = Edge::new(a, b);
        if !self.edges.contains_key(&edge) {
            self.edges.insert(edge, EdgeData::default());
            if let Some(data) = self.vertices.get_mut(a) {
                data.neighbors.push(b);
            }
            if let Some(data) = self.vertices.get_mut(b) {
                data.neighbors.push(a);
            }
        }
        edge
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn graph_with(n: usize) -> (MeshGraph, Vec<VertexId>) {
        let mut graph = MeshGraph::new();
        let verts = (0..n).map(|_| graph.add_vertex()).collect();
        (graph, verts)
    }

    fn tetrahedron() -> (MeshGraph, Vec<VertexId>) {
        let (mut g, v) = graph_with(4);
        g.add_face(Face::new(v[0], v[2], v[1])).unwrap();
        g.add_face(Face::new(v[0], v[1], v[3])).unwrap();
        g.add_face(Face::new(v[1], v[2], v[3])).unwrap();
        g.add_face(Face::new(v[2], v[0], v[3])).unwrap();
        (g, v)
    }

    #[test]
    fn single_triangle() {
        let (mut g, v) = graph_with(3);
        g.add_face(Face::new(v[0], v[1], v[2])).unwrap();

        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.num_faces(), 1);
        assert_eq!(g.euler_characteristic(), 1);
        assert_eq!(g.num_boundary_edges(), 3);
        assert_eq!(g.bound().len(), 3);
        assert_eq!(g.num_bound_components(), 1);
        assert!(g.has_face(v[2], v[1], v[0]));
        assert!(g.has_half_edge(v[0], v[1]));
        assert!(!g.has_half_edge(v[1], v[0]));
        assert!(g.validate().is_empty());
    }

    #[test]
    fn closed_tetrahedron() {
        let (g, v) = tetrahedron();
        assert_eq!(g.num_edges(), 6);
        assert_eq!(g.euler_characteristic(), 2);
        assert_eq!(g.genus(), 0);
        assert!(g.bound().is_empty());
        assert_eq!(g.num_bound_components(), 0);
        for &x in &v {
            assert_eq!(g.vert_ring(x).unwrap().len(), 3);
            assert_eq!(g.face_ring(x).unwrap().len(), 3);
            assert_eq!(g.edge_star(x).unwrap().len(), 3);
        }
        assert!(g.validate().is_empty());
    }

    #[test]
    fn duplicate_face_rejected() {
        let (mut g, v) = graph_with(3);
        g.add_face(Face::new(v[0], v[1], v[2])).unwrap();
        assert_eq!(
            g.add_face(Face::new(v[1], v[2], v[0])),
            Err(TopologyError::DuplicateFace)
        );
        assert_eq!(g.num_faces(), 1);
    }

    #[test]
    fn reversed_face_closes_pillow() {
        let (mut g, v) = graph_with(3);
        let front = g.add_face(Face::new(v[0], v[1], v[2])).unwrap();
        let back = g.add_face(Face::new(v[0], v[2], v[1])).unwrap();
        assert_eq!(back, front.flipped());

        assert_eq!(g.num_faces(), 2);
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.num_boundary_edges(), 0);
        assert_eq!(g.euler_characteristic(), 2);
        assert_eq!(
            g.add_face(Face::new(v[2], v[1], v[0])),
            Err(TopologyError::DuplicateFace)
        );
        assert!(g.validate().is_empty());

        // the requested winding is removed first
        assert_eq!(g.remove_face(back).unwrap(), back);
        assert!(g.has_face(v[0], v[1], v[2]));
        assert_eq!(g.num_boundary_edges(), 3);
        assert!(g.validate().is_empty());
    }

    #[test]
    fn third_face_on_edge_rejected() {
        let (mut g, v) = graph_with(5);
        g.add_face(Face::new(v[0], v[1], v[2])).unwrap();
        g.add_face(Face::new(v[1], v[0], v[3])).unwrap();
        let before = g.num_edges();
        assert_eq!(
            g.add_face(Face::new(v[0], v[1], v[4])),
            Err(TopologyError::NonManifoldEdge)
        );
        assert_eq!(g.num_edges(), before);
        assert!(g.validate().is_empty());
    }

    #[test]
    fn inconsistent_winding_is_flipped() {
        let (mut g, v) = graph_with(4);
        g.add_face(Face::new(v[0], v[1], v[2])).unwrap();
        // reuses the half-edge 0 -> 1
        let added = g.add_face(Face::new(v[0], v[1], v[3])).unwrap();
        assert_eq!(added, Face::new(v[1], v[0], v[3]));
        assert!(g.validate().is_empty());
    }

    #[test]
    fn degenerate_and_missing_vertices() {
        let (mut g, v) = graph_with(3);
        assert_eq!(
            g.add_face(Face::new(v[0], v[0], v[1])),
            Err(TopologyError::DegenerateFace)
        );
        g.remove_vertex(v[2]).unwrap();
        assert!(matches!(
            g.add_face(Face::new(v[0], v[1], v[2])),
            Err(TopologyError::EntityNotFound(_))
        ));
        assert_eq!(g.add_edge(v[1], v[1]), Err(TopologyError::DegenerateEdge));
    }

    #[test]
    fn remove_vertex_requires_no_faces() {
        let (mut g, v) = tetrahedron();
        assert_eq!(
            g.remove_vertex(v[3]),
            Err(TopologyError::VertexInUse { faces: 3 })
        );

        for f in g.face_ring(v[3]).unwrap().to_vec() {
            g.remove_face(f).unwrap();
        }
        g.remove_vertex(v[3]).unwrap();

        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.num_faces(), 1);
        assert_eq!(g.num_boundary_edges(), 3);
        assert!(g.validate().is_empty());
    }

    #[test]
    fn remove_face_keeps_edges() {
        let (mut g, v) = tetrahedron();
        let removed = g.remove_face(Face::new(v[0], v[1], v[2])).unwrap();
        assert_eq!(removed, Face::new(v[0], v[2], v[1]));
        assert_eq!(g.num_edges(), 6);
        assert_eq!(g.num_boundary_edges(), 3);
        assert_eq!(g.num_bound_components(), 1);
        assert!(g.remove_face(removed).is_err());
        assert!(g.validate().is_empty());
    }

    #[test]
    fn boundary_half_edges_walk_a_loop() {
        let (mut g, v) = graph_with(4);
        g.add_face(Face::new(v[0], v[1], v[2])).unwrap();
        g.add_face(Face::new(v[0], v[2], v[3])).unwrap();

        let free = g.boundary_half_edges();
        assert_eq!(free.len(), 4);
        for (from, to) in &free {
            assert!(g.has_half_edge(*to, *from));
            // every free half-edge is continued by exactly one other
            assert_eq!(free.iter().filter(|(f, _)| f == to).count(), 1);
        }
    }

    #[test]
    fn two_boundary_components() {
        let (mut g, v) = graph_with(6);
        g.add_face(Face::new(v[0], v[1], v[2])).unwrap();
        g.add_face(Face::new(v[3], v[4], v[5])).unwrap();
        assert_eq!(g.num_bound_components(), 2);
        assert_eq!(g.bound().len(), 6);
    }

    #[test]
    fn opposite_face_across_edge() {
        let (g, v) = tetrahedron();
        let f = g.face(v[0], v[1], v[3]).unwrap();
        let e = Edge::new(v[0], v[1]);
        let other = g.opposite_face(&f, &e).unwrap();
        assert!(other.same_vertices(&Face::new(v[0], v[1], v[2])));
    }

    #[test]
    fn wire_edges_are_not_boundary() {
        let (mut g, v) = graph_with(2);
        let e = g.add_edge(v[0], v[1]).unwrap();
        assert!(g.has_edge(v[1], v[0]));
        assert!(!g.is_boundary(&e));
        assert_eq!(g.vert_ring(v[0]).unwrap(), &[v[1]]);
        g.remove_vertex(v[1]).unwrap();
        assert_eq!(g.num_edges(), 0);
        assert!(g.vert_ring(v[0]).unwrap().is_empty());
    }
}
