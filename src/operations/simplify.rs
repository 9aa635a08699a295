use std::collections::{HashMap, HashSet};

use tracing::{debug, error, info, warn};

use super::SkipReason;
use crate::error::{OperationError, Result, TopologyError};
use crate::mesh::{Mesh, MeshOutput, MeshTarget};
use crate::topology::{Edge, Face, MeshGraph, VertexId};

/// Stopping thresholds and options for [`Simplify`].
///
/// A run stops once every configured threshold holds. Unset thresholds
/// are always satisfied.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplifyParams {
    /// Maximum number of collapse passes.
    pub max_iter: usize,
    /// Stop once the vertex count is at most this.
    pub max_vertices: Option<usize>,
    /// Stop once the edge count is at most this.
    pub max_edges: Option<usize>,
    /// Stop once the face count is at most this.
    pub max_faces: Option<usize>,
    /// Stop once the mean face area exceeds this.
    pub mean_area: Option<f64>,
    /// Never collapse an edge whose endpoint rings touch the boundary.
    pub preserve_boundary: bool,
}

impl Default for SimplifyParams {
    fn default() -> Self {
        Self {
            max_iter: 10_000,
            max_vertices: None,
            max_edges: None,
            max_faces: None,
            mean_area: None,
            preserve_boundary: false,
        }
    }
}

impl SimplifyParams {
    /// Sets the pass cap.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the vertex count threshold.
    #[must_use]
    pub fn with_max_vertices(mut self, max_vertices: usize) -> Self {
        self.max_vertices = Some(max_vertices);
        self
    }

    /// Sets the edge count threshold.
    #[must_use]
    pub fn with_max_edges(mut self, max_edges: usize) -> Self {
        self.max_edges = Some(max_edges);
        self
    }

    /// Sets the face count threshold.
    #[must_use]
    pub fn with_max_faces(mut self, max_faces: usize) -> Self {
        self.max_faces = Some(max_faces);
        self
    }

    /// Sets the mean face area threshold.
    #[must_use]
    pub fn with_mean_area(mut self, mean_area: f64) -> Self {
        self.mean_area = Some(mean_area);
        self
    }

    /// Keeps boundary vertices and their neighbourhoods fixed.
    #[must_use]
    pub fn with_preserve_boundary(mut self, preserve: bool) -> Self {
        self.preserve_boundary = preserve;
        self
    }

    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if `max_iter` is zero or
    /// `mean_area` is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(OperationError::InvalidInput("max_iter must be positive".into()).into());
        }
        if let Some(area) = self.mean_area {
            if !area.is_finite() || area < 0.0 {
                return Err(OperationError::InvalidInput(format!(
                    "mean_area must be a non-negative number, got {area}"
                ))
                .into());
            }
        }
        Ok(())
    }
}

/// How a simplification run ended. Every variant is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimplifyStatus {
    /// All configured thresholds hold.
    Converged,
    /// A pass found no collapsible edge before the thresholds were met.
    Stalled,
    /// The pass cap was reached first.
    IterationCap,
}

/// Outcome of a simplification run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplifyReport {
    /// Passes performed.
    pub iterations: usize,
    /// Edges collapsed across all passes.
    pub collapses: usize,
    /// Re-pointed faces that could not be inserted.
    pub skipped_faces: usize,
    pub status: SimplifyStatus,
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
    pub mean_area: f64,
}

/// Decimates a mesh by collapsing short edges into their midpoints.
///
/// Each pass scores every edge by length, greedily picks a set of
/// independent collapsible edges, shortest first, and collapses them all
/// at once. A chosen edge claims both endpoints and their full rings, so
/// no two collapses of a pass touch a common vertex. An edge is
/// collapsible only if every vertex adjacent to both endpoints forms a
/// face with them, which keeps the surface from folding.
///
/// The collapse vertex takes the 0.5/0.5 blend of every channel of the
/// two endpoints. Normals are recomputed at the end of the run.
pub struct Simplify {
    params: SimplifyParams,
}

impl Simplify {
    /// Creates a new `Simplify` operation.
    #[must_use]
    pub fn new(params: SimplifyParams) -> Self {
        Self { params }
    }

    /// The configured parameters.
    #[must_use]
    pub fn params(&self) -> &SimplifyParams {
        &self.params
    }

    /// Executes the simplification on a copy or on the caller's mesh.
    ///
    /// In place, every collapsed endpoint handle held by the caller becomes
    /// invalid and the "normal" channel is overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid, a vertex has no
    /// position, or the graph is corrupted.
    pub fn execute<'a>(&self, target: MeshTarget<'a>) -> Result<(MeshOutput<'a>, SimplifyReport)> {
        let mut output = target.into_output();
        let report = self.run(&mut output)?;
        Ok((output, report))
    }

    /// Simplifies `mesh` in place.
    ///
    /// # Errors
    ///
    /// See [`Simplify::execute`].
    pub fn run(&self, mesh: &mut Mesh) -> Result<SimplifyReport> {
        self.params.validate()?;
        info!(
            vertices = mesh.graph().num_vertices(),
            faces = mesh.graph().num_faces(),
            "started simplification"
        );

        let mut iterations = 0;
        let mut collapses = 0;
        let mut skipped_faces = 0;
        let mut status = SimplifyStatus::IterationCap;

        while iterations < self.params.max_iter {
            iterations += 1;

            let edges = self.select_collapses(mesh)?;
            skipped_faces += collapse(mesh, &edges)?;
            collapses += edges.len();
            debug!(
                iteration = iterations,
                collapsed = edges.len(),
                vertices = mesh.graph().num_vertices(),
                faces = mesh.graph().num_faces(),
                "finished simplification pass"
            );

            if self.thresholds_hold(mesh)? {
                status = SimplifyStatus::Converged;
                break;
            }
            if edges.is_empty() {
                status = SimplifyStatus::Stalled;
                break;
            }
        }

        mesh.compute_normals()?;

        let report = SimplifyReport {
            iterations,
            collapses,
            skipped_faces,
            status,
            vertices: mesh.graph().num_vertices(),
            edges: mesh.graph().num_edges(),
            faces: mesh.graph().num_faces(),
            mean_area: mesh.mean_face_area()?,
        };
        info!(
            iterations,
            collapses,
            skipped_faces,
            ?status,
            vertices = report.vertices,
            faces = report.faces,
            "finished simplification"
        );
        Ok(report)
    }

    /// Picks the edges one pass would collapse, in acceptance order.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge endpoint has no position.
    pub fn select_collapses(&self, mesh: &Mesh) -> Result<Vec<Edge>> {
        let graph = mesh.graph();
        let boundary: HashSet<VertexId> = if self.params.preserve_boundary {
            graph.bound().into_iter().collect()
        } else {
            HashSet::new()
        };

        let mut scored = Vec::with_capacity(graph.num_edges());
        for edge in graph.edges() {
            scored.push((edge, mesh.edge_length(&edge)?));
        }
        scored.sort_by(|x, y| x.1.total_cmp(&y.1));

        let mut claimed: HashSet<VertexId> = HashSet::new();
        let mut accepted = Vec::new();
        for (edge, _) in scored {
            let [a, b] = edge.vertices();
            if claimed.contains(&a) || claimed.contains(&b) {
                continue;
            }
            if !collapsible(graph, &edge, &boundary)? {
                continue;
            }
            claimed.insert(a);
            claimed.insert(b);
            claimed.extend(graph.vert_ring(a)?.iter().copied());
            claimed.extend(graph.vert_ring(b)?.iter().copied());
            accepted.push(edge);
        }
        Ok(accepted)
    }

    fn thresholds_hold(&self, mesh: &Mesh) -> Result<bool> {
        let graph = mesh.graph();
        let params = &self.params;
        let under = |limit: Option<usize>, count: usize| limit.is_none_or(|max| count <= max);

        let area_holds = match params.mean_area {
            Some(min) => mesh.mean_face_area()? > min,
            None => true,
        };
        Ok(under(params.max_vertices, graph.num_vertices())
            && under(params.max_edges, graph.num_edges())
            && under(params.max_faces, graph.num_faces())
            && area_holds)
    }
}

/// With a non-empty `boundary`, rejects edges whose endpoint rings touch
/// it. Always rejects edges where a common ring vertex does not form a
/// face with both endpoints.
fn collapsible(
    graph: &MeshGraph,
    edge: &Edge,
    boundary: &HashSet<VertexId>,
) -> std::result::Result<bool, TopologyError> {
    let [a, b] = edge.vertices();
    let ring_a = graph.vert_ring(a)?;
    let ring_b = graph.vert_ring(b)?;

    if ring_a.iter().chain(ring_b).any(|v| boundary.contains(v)) {
        return Ok(false);
    }
    Ok(ring_a
        .iter()
        .filter(|w| ring_b.contains(w))
        .all(|&w| graph.has_face(a, b, w)))
}

/// Collapses every edge of an independent set. Returns the number of
/// re-pointed faces that were skipped.
fn collapse(mesh: &mut Mesh, edges: &[Edge]) -> Result<usize> {
    if edges.is_empty() {
        return Ok(0);
    }

    let names: Vec<String> = mesh.attrs().attrs().into_iter().map(str::to_owned).collect();
    let mut lut: HashMap<VertexId, VertexId> = HashMap::with_capacity(2 * edges.len());
    for edge in edges {
        let [a, b] = edge.vertices();
        let merged = mesh.add_vertex();
        for name in &names {
            let blend = {
                let attrs = mesh.attrs();
                attrs.get(a, name)?.scale(0.5) + attrs.get(b, name)?.scale(0.5)
            };
            mesh.attrs_mut().set(merged, name, &blend)?;
        }
        lut.insert(a, merged);
        lut.insert(b, merged);
    }

    let affected: Vec<Face> = mesh
        .graph()
        .faces()
        .filter(|f| f.vertices().iter().any(|v| lut.contains_key(v)))
        .collect();

    let mut rebuilt = Vec::with_capacity(affected.len());
    let mut skipped = 0;
    for face in &affected {
        match repoint(face, &lut) {
            Ok(moved) => rebuilt.push(moved),
            Err(SkipReason::Collapsed(_)) => {}
            Err(reason) => {
                error!(?reason, "edges aren't disjoint");
                skipped += 1;
            }
        }
    }

    for face in affected {
        mesh.remove_face(face)?;
    }
    for face in rebuilt {
        if let Err(err) = mesh.add_face(face) {
            warn!(reason = ?SkipReason::Rejected(face, err), "skipping face");
            skipped += 1;
        }
    }
    for edge in edges {
        for v in edge.vertices() {
            mesh.remove_vertex(v)?;
        }
    }
    Ok(skipped)
}

/// Moves a face onto the collapse vertices. A face with both endpoints of
/// one collapse disappears with it.
fn repoint(
    face: &Face,
    lut: &HashMap<VertexId, VertexId>,
) -> std::result::Result<Face, SkipReason> {
    let touched = face.vertices().iter().filter(|v| lut.contains_key(*v)).count();
    let [a, b, c] = face.vertices().map(|v| lut.get(&v).copied().unwrap_or(v));
    let moved = Face::new(a, b, c);
    match touched {
        1 => Ok(moved),
        2 if moved.is_degenerate() => Err(SkipReason::Collapsed(*face)),
        _ => Err(SkipReason::Overlapping(*face)),
    }
}
