//! A triangle mesh: one [`MeshGraph`] plus one [`AttributeStore`] over the
//! same vertex handles.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use crate::attributes::AttributeStore;
use crate::error::{AttributeError, Result, TopologyError};
use crate::math::triangle::{triangle_area, triangle_normal};
use crate::math::{Point3, Vector3, VectorN};
use crate::topology::{Edge, Face, MeshGraph, VertexId};

/// Vertex position channel (3-D). Required by every geometric operation.
pub const COORD: &str = "coord";
/// Vertex normal channel (3-D), derived from [`COORD`].
pub const NORMAL: &str = "normal";
/// Vertex selection channel (1-D, 0/1 or label valued).
pub const SELECTION: &str = "selection";
/// Component index channel (1-D) written by whole-mesh labeling.
pub const INDEX: &str = "index";

/// Connectivity and per-vertex attributes sharing one vertex identity space.
///
/// Vertices are created and destroyed through the mesh so the graph and
/// the store stay in lockstep. `Clone` is a deep copy that keeps vertex
/// handles, so a copy can be compared handle by handle with its source.
#[derive(Debug, Clone)]
pub struct Mesh {
    graph: MeshGraph,
    vattr: AttributeStore<VertexId>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    /// Creates an empty mesh with a declared [`COORD`] channel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: MeshGraph::new(),
            vattr: AttributeStore::with_channel(COORD, VectorN::zeros(3)),
        }
    }

    /// Builds a mesh from vertex positions and index triples.
    ///
    /// Vertex handles are created in input order, so
    /// `mesh.graph().vertices()` yields them in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if a triangle references an out-of-range index or
    /// cannot be inserted into the graph.
    pub fn from_triangles(points: &[Point3], triangles: &[[usize; 3]]) -> Result<Self> {
        let mut mesh = Self::new();
        let mut verts = Vec::with_capacity(points.len());
        for p in points {
            verts.push(mesh.add_vertex_at(p)?);
        }
        for tri in triangles {
            let mut corners = [VertexId::default(); 3];
            for (corner, &idx) in corners.iter_mut().zip(tri) {
                *corner = *verts.get(idx).ok_or_else(|| {
                    TopologyError::EntityNotFound(format!("vertex index {idx}"))
                })?;
            }
            mesh.add_face(Face::new(corners[0], corners[1], corners[2]))?;
        }
        Ok(mesh)
    }

    /// The connectivity.
    #[must_use]
    pub fn graph(&self) -> &MeshGraph {
        &self.graph
    }

    /// The vertex attributes.
    #[must_use]
    pub fn attrs(&self) -> &AttributeStore<VertexId> {
        &self.vattr
    }

    /// Mutable vertex attributes, for declaring channels and writing
    /// values. Membership is managed by the mesh: registering or removing
    /// keys here bypasses the graph.
    pub fn attrs_mut(&mut self) -> &mut AttributeStore<VertexId> {
        &mut self.vattr
    }

    // --- Vertices ---

    /// Adds a vertex to the graph and registers it in every channel with
    /// the channel prototype.
    pub fn add_vertex(&mut self) -> VertexId {
        let v = self.graph.add_vertex();
        self.vattr.insert_key(v);
        v
    }

    /// Adds a vertex at `point`.
    ///
    /// # Errors
    ///
    /// Returns an error if the [`COORD`] channel is not 3-D.
    pub fn add_vertex_at(&mut self, point: &Point3) -> Result<VertexId> {
        let v = self.add_vertex();
        self.set_coord(v, point)?;
        Ok(v)
    }

    /// Removes a vertex from the graph and from every channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is missing or still has faces.
    pub fn remove_vertex(&mut self, v: VertexId) -> Result<()> {
        self.graph.remove_vertex(v)?;
        self.vattr.remove_key(v);
        Ok(())
    }

    /// Position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex has no 3-D [`COORD`] value.
    pub fn coord(&self, v: VertexId) -> Result<Point3> {
        let value = self.vattr.get(v, COORD)?;
        if value.len() != 3 {
            return Err(AttributeError::DimensionMismatch {
                name: COORD.to_owned(),
                expected: 3,
                found: value.len(),
            }
            .into());
        }
        Ok(Point3::new(value[0], value[1], value[2]))
    }

    /// Moves a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is unknown or [`COORD`] is not 3-D.
    pub fn set_coord(&mut self, v: VertexId, point: &Point3) -> Result<()> {
        let value = VectorN::from_column_slice(point.coords.as_slice());
        self.vattr.set(v, COORD, &value)?;
        Ok(())
    }

    // --- Faces ---

    /// Inserts a face. See [`MeshGraph::add_face`].
    ///
    /// # Errors
    ///
    /// Returns the graph's [`TopologyError`] unchanged.
    pub fn add_face(&mut self, face: Face) -> std::result::Result<Face, TopologyError> {
        self.graph.add_face(face)
    }

    /// Removes a face. See [`MeshGraph::remove_face`].
    ///
    /// # Errors
    ///
    /// Returns an error if the face does not exist.
    pub fn remove_face(&mut self, face: Face) -> std::result::Result<Face, TopologyError> {
        self.graph.remove_face(face)
    }

    /// Keeps only the vertices accepted by `keep`, dropping every face
    /// with a rejected corner. Returns the number of removed vertices.
    ///
    /// # Errors
    ///
    /// Propagates graph errors, which indicate a corrupted graph.
    pub fn retain_vertices<F>(&mut self, keep: F) -> Result<usize>
    where
        F: Fn(VertexId) -> bool,
    {
        let doomed: Vec<VertexId> = self.graph.vertices().filter(|&v| !keep(v)).collect();
        for &v in &doomed {
            for face in self.graph.face_ring(v)?.to_vec() {
                self.graph.remove_face(face)?;
            }
        }
        for &v in &doomed {
            self.remove_vertex(v)?;
        }
        Ok(doomed.len())
    }

    /// Appends a copy of `other`, returning the new handle of each of its
    /// vertices. Only channels declared on `self` are copied.
    ///
    /// # Errors
    ///
    /// Returns an error if a copied value has the wrong dimension or a face
    /// cannot be inserted.
    pub fn append(&mut self, other: &Mesh) -> Result<HashMap<VertexId, VertexId>> {
        let names: Vec<String> = self.vattr.attrs().into_iter().map(str::to_owned).collect();
        let mut lut = HashMap::with_capacity(other.graph.num_vertices());
        for v in other.graph.vertices() {
            let nv = self.add_vertex();
            for name in &names {
                if other.vattr.has(name) {
                    let value = other.vattr.get(v, name)?.clone();
                    self.vattr.set(nv, name, &value)?;
                }
            }
            lut.insert(v, nv);
        }
        for face in other.graph.faces() {
            let [a, b, c] = face.vertices().map(|v| lut[&v]);
            self.graph.add_face(Face::new(a, b, c))?;
        }
        Ok(lut)
    }

    // --- Geometry ---

    /// Euclidean length of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint has no position.
    pub fn edge_length(&self, edge: &Edge) -> Result<f64> {
        Ok((self.coord(edge.b())? - self.coord(edge.a())?).norm())
    }

    /// Area of a face.
    ///
    /// # Errors
    ///
    /// Returns an error if a corner has no position.
    pub fn face_area(&self, face: &Face) -> Result<f64> {
        let [a, b, c] = face.vertices();
        Ok(triangle_area(
            &self.coord(a)?,
            &self.coord(b)?,
            &self.coord(c)?,
        ))
    }

    /// Total surface area.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex has no position.
    pub fn area(&self) -> Result<f64> {
        self.graph.faces().map(|f| self.face_area(&f)).sum()
    }

    /// Mean face area, or `0.0` for a mesh without faces.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex has no position.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_face_area(&self) -> Result<f64> {
        let n = self.graph.num_faces();
        if n == 0 {
            return Ok(0.0);
        }
        Ok(self.area()? / n as f64)
    }

    /// Axis-aligned bounds of the vertex positions, or `None` for an empty
    /// mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex has no position.
    pub fn bounds(&self) -> Result<Option<(Point3, Point3)>> {
        let mut bounds: Option<(Point3, Point3)> = None;
        for v in self.graph.vertices() {
            let p = self.coord(v)?;
            bounds = Some(match bounds {
                None => (p, p),
                Some((lo, hi)) => (lo.inf(&p), hi.sup(&p)),
            });
        }
        Ok(bounds)
    }

    /// Recomputes [`NORMAL`] from [`COORD`].
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex has no position.
    pub fn compute_normals(&mut self) -> Result<()> {
        self.compute_normals_from(COORD, NORMAL)
    }

    /// Writes to `output` the normalized sum of the unit normals of the
    /// faces around each vertex, using positions from `input`. Vertices
    /// without a non-degenerate face get a zero normal.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is missing or not 3-D, or `output`
    /// exists with another dimension.
    pub fn compute_normals_from(&mut self, input: &str, output: &str) -> Result<()> {
        let point = |v: VertexId| -> Result<Point3> {
            let value = self.vattr.get(v, input)?;
            if value.len() != 3 {
                return Err(AttributeError::DimensionMismatch {
                    name: input.to_owned(),
                    expected: 3,
                    found: value.len(),
                }
                .into());
            }
            Ok(Point3::new(value[0], value[1], value[2]))
        };

        let mut normals = Vec::with_capacity(self.graph.num_vertices());
        for v in self.graph.vertices() {
            let mut n = Vector3::zeros();
            for face in self.graph.face_ring(v)? {
                let [a, b, c] = face.vertices();
                if let Some(normal) = triangle_normal(&point(a)?, &point(b)?, &point(c)?) {
                    n += normal;
                }
            }
            let n = n.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
            normals.push((v, VectorN::from_column_slice(n.as_slice())));
        }

        self.vattr.add(output, VectorN::zeros(3))?;
        for (v, n) in normals {
            self.vattr.set(v, output, &n)?;
        }
        Ok(())
    }
}

/// Where an operation writes its result.
///
/// `Copy` leaves the caller's mesh untouched and produces a freshly owned
/// mesh. `InPlace` mutates the caller's mesh directly: handles held by the
/// caller may be invalidated and any attribute the operation writes is
/// overwritten.
#[derive(Debug)]
pub enum MeshTarget<'a> {
    Copy(&'a Mesh),
    InPlace(&'a mut Mesh),
}

impl<'a> MeshTarget<'a> {
    /// Resolves the target into the mesh the operation will mutate.
    #[must_use]
    pub fn into_output(self) -> MeshOutput<'a> {
        match self {
            MeshTarget::Copy(mesh) => MeshOutput::Owned(mesh.clone()),
            MeshTarget::InPlace(mesh) => MeshOutput::InPlace(mesh),
        }
    }
}

/// The mesh produced by an operation run on a [`MeshTarget`].
#[derive(Debug)]
pub enum MeshOutput<'a> {
    Owned(Mesh),
    InPlace(&'a mut Mesh),
}

impl MeshOutput<'_> {
    /// Returns `true` if the caller's mesh was mutated.
    #[must_use]
    pub fn is_in_place(&self) -> bool {
        matches!(self, MeshOutput::InPlace(_))
    }

    /// Returns the owned result, cloning when the output aliases the
    /// caller's mesh.
    #[must_use]
    pub fn into_owned(self) -> Mesh {
        match self {
            MeshOutput::Owned(mesh) => mesh,
            MeshOutput::InPlace(mesh) => mesh.clone(),
        }
    }
}

impl Deref for MeshOutput<'_> {
    type Target = Mesh;

    fn deref(&self) -> &Mesh {
        match self {
            MeshOutput::Owned(mesh) => mesh,
            MeshOutput::InPlace(mesh) => mesh,
        }
    }
}

impl DerefMut for MeshOutput<'_> {
    fn deref_mut(&mut self) -> &mut Mesh {
        match self {
            MeshOutput::Owned(mesh) => mesh,
            MeshOutput::InPlace(mesh) => mesh,
        }
    }
}
