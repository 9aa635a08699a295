use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use super::SkipReason;
use crate::error::{OperationError, Result};
use crate::math::triangle::centroid;
use crate::mesh::{Mesh, MeshOutput, MeshTarget, COORD};
use crate::topology::{Face, VertexId};

/// Outcome of a hole filling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillReport {
    pub holes_filled: usize,
    /// Loops left open: too short, or the walk did not close.
    pub holes_skipped: usize,
    pub vertices_added: usize,
    pub faces_added: usize,
    /// Fill faces the graph refused.
    pub faces_skipped: usize,
}

/// Closes boundary loops.
///
/// Loops are found by following free boundary half-edges from the first
/// unvisited boundary vertex, so every loop is walked in the winding its
/// faces imply. A loop of three vertices gets a single triangle. A longer
/// loop gets a vertex at the mean of its positions, with every other
/// channel copied from the loop's first vertex, and a fan of triangles
/// around it.
pub struct FillHoles;

impl Default for FillHoles {
    fn default() -> Self {
        Self::new()
    }
}

impl FillHoles {
    /// Creates a new `FillHoles` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the fill on a copy or on the caller's mesh.
    ///
    /// In place, handles stay valid; new vertices and faces are added.
    ///
    /// # Errors
    ///
    /// Returns an error if a loop vertex has no position or a channel
    /// cannot be copied onto a fill vertex.
    pub fn execute<'a>(&self, target: MeshTarget<'a>) -> Result<(MeshOutput<'a>, FillReport)> {
        let mut output = target.into_output();
        let report = self.run(&mut output)?;
        Ok((output, report))
    }

    /// Fills the holes of `mesh` in place.
    ///
    /// # Errors
    ///
    /// See [`FillHoles::execute`].
    pub fn run(&self, mesh: &mut Mesh) -> Result<FillReport> {
        let bound = mesh.graph().bound();
        info!(boundary_vertices = bound.len(), "started hole filling");

        let mut succ: HashMap<VertexId, Vec<VertexId>> = HashMap::new();
        for (u, v) in mesh.graph().boundary_half_edges() {
            succ.entry(u).or_default().push(v);
        }

        let mut report = FillReport::default();
        let mut visited: HashSet<VertexId> = HashSet::new();
        for start in bound {
            if visited.contains(&start) {
                continue;
            }
            match walk(start, &succ, &mut visited) {
                Ok(hole) => close(mesh, &hole, &mut report)?,
                Err(reason) => {
                    warn!(?reason, ?start, "an error occurred searching boundary, skipping");
                    report.holes_skipped += 1;
                }
            }
        }

        info!(
            filled = report.holes_filled,
            skipped = report.holes_skipped,
            faces = report.faces_added,
            "finished hole filling"
        );
        Ok(report)
    }
}

/// Follows free half-edges from `start` until the loop closes.
fn walk(
    start: VertexId,
    succ: &HashMap<VertexId, Vec<VertexId>>,
    visited: &mut HashSet<VertexId>,
) -> std::result::Result<Vec<VertexId>, SkipReason> {
    let mut hole = vec![start];
    visited.insert(start);
    let mut current = start;
    loop {
        let options = succ.get(&current).map_or(&[][..], Vec::as_slice);
        let next = options
            .iter()
            .find(|&&w| w == start)
            .or_else(|| options.iter().find(|w| !visited.contains(*w)))
            .copied()
            .ok_or(SkipReason::OpenWalk)?;
        if next == start {
            return Ok(hole);
        }
        visited.insert(next);
        hole.push(next);
        current = next;
    }
}

/// Fills one walked loop and records it as filled, or as skipped when the
/// loop is too short or no fill face fits.
fn close(mesh: &mut Mesh, hole: &[VertexId], report: &mut FillReport) -> Result<()> {
    if hole.len() < 3 {
        warn!(reason = ?SkipReason::ShortLoop(hole.len()), "skipping degenerate hole");
        report.holes_skipped += 1;
        return Ok(());
    }
    if fill(mesh, hole, report)? == 0 {
        warn!(vertices = hole.len(), "no fill face fits, leaving hole open");
        report.holes_skipped += 1;
    } else {
        report.holes_filled += 1;
        debug!(vertices = hole.len(), "filled hole");
    }
    Ok(())
}

/// Returns the number of faces added. A centroid that no face kept is
/// removed again.
fn fill(mesh: &mut Mesh, hole: &[VertexId], report: &mut FillReport) -> Result<usize> {
    if let [a, b, c] = *hole {
        return Ok(usize::from(add_fill_face(mesh, Face::new(a, b, c), report)));
    }

    let points = hole.iter().map(|&v| mesh.coord(v)).collect::<Result<Vec<_>>>()?;
    let center_point = centroid(&points)
        .ok_or_else(|| OperationError::InvalidInput("empty boundary loop".into()))?;

    let first = hole[0];
    let center = mesh.add_vertex();
    let names: Vec<String> = mesh.attrs().attrs().into_iter().map(str::to_owned).collect();
    for name in names.iter().filter(|n| n.as_str() != COORD) {
        let value = mesh.attrs().get(first, name)?.clone();
        mesh.attrs_mut().set(center, name, &value)?;
    }
    mesh.set_coord(center, &center_point)?;

    let mut added = 0;
    for (i, &cur) in hole.iter().enumerate() {
        let prev = hole[(i + hole.len() - 1) % hole.len()];
        if add_fill_face(mesh, Face::new(prev, cur, center), report) {
            added += 1;
        }
    }

    if mesh.graph().vertex(center)?.is_isolated() {
        mesh.remove_vertex(center)?;
    } else {
        report.vertices_added += 1;
    }
    Ok(added)
}

fn add_fill_face(mesh: &mut Mesh, face: Face, report: &mut FillReport) -> bool {
    match mesh.add_face(face) {
        Ok(_) => {
            report.faces_added += 1;
            true
        }
        Err(err) => {
            warn!(reason = ?SkipReason::Rejected(face, err), "skipping face");
            report.faces_skipped += 1;
            false
        }
    }
}
