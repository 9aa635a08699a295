pub mod components;
pub mod hole_fill;
pub mod query;
pub mod simplify;

pub use components::{ComponentReport, LabelComponents, MeshComponents};
pub use hole_fill::{FillHoles, FillReport};
pub use query::MeshInfo;
pub use simplify::{Simplify, SimplifyParams, SimplifyReport, SimplifyStatus};

use crate::error::TopologyError;
use crate::topology::Face;

/// Why a mesh operation left out one unit of work.
///
/// Skips are counted and logged by the operation that owns the loop; they
/// never abort it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A re-pointed face lost a corner and no longer spans a triangle.
    Collapsed(Face),
    /// A face touches endpoints of more than one collapse in a pass.
    Overlapping(Face),
    /// The graph refused the face.
    Rejected(Face, TopologyError),
    /// A boundary loop has fewer than three vertices.
    ShortLoop(usize),
    /// A boundary walk found no next edge before closing.
    OpenWalk,
}
