use std::fmt;

use crate::error::Result;
use crate::math::Point3;
use crate::mesh::Mesh;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

/// Topological and geometric summary of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInfo {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
    pub euler: i64,
    /// `(2 - euler) / 2`, meaningful for closed orientable surfaces.
    pub genus: i64,
    pub area: f64,
    pub boundary_edges: usize,
    pub boundary_components: usize,
    /// `None` for a mesh without vertices.
    pub bounds: Option<Aabb>,
    /// Channel names and dimensions in declaration order.
    pub channels: Vec<(String, usize)>,
}

impl MeshInfo {
    /// Measures `mesh`.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex has no position.
    pub fn measure(mesh: &Mesh) -> Result<Self> {
        let graph = mesh.graph();
        let attrs = mesh.attrs();
        let mut channels = Vec::with_capacity(attrs.num_attrs());
        for name in attrs.attrs() {
            channels.push((name.to_owned(), attrs.dim(name)?));
        }

        Ok(Self {
            vertices: graph.num_vertices(),
            edges: graph.num_edges(),
            faces: graph.num_faces(),
            euler: graph.euler_characteristic(),
            genus: graph.genus(),
            area: mesh.area()?,
            boundary_edges: graph.num_boundary_edges(),
            boundary_components: graph.num_bound_components(),
            bounds: mesh.bounds()?.map(|(min, max)| Aabb { min, max }),
            channels,
        })
    }

    /// Returns `true` if the mesh has no boundary edges.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.boundary_edges == 0
    }
}

impl fmt::Display for MeshInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "vertices: {}", self.vertices)?;
        writeln!(f, "edges: {}", self.edges)?;
        writeln!(f, "faces: {}", self.faces)?;
        writeln!(f, "euler: {}", self.euler)?;
        writeln!(f, "genus: {}", self.genus)?;
        writeln!(f, "area: {}", self.area)?;
        writeln!(f, "boundary edges: {}", self.boundary_edges)?;
        writeln!(f, "boundary components: {}", self.boundary_components)?;
        if let Some(bounds) = &self.bounds {
            let (lo, hi) = (bounds.min, bounds.max);
            writeln!(f, "bounds: ({}, {}, {}) - ({}, {}, {})", lo.x, lo.y, lo.z, hi.x, hi.y, hi.z)?;
        }
        for (name, dim) in &self.channels {
            writeln!(f, "attribute: {name} ({dim})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn open_box() -> Mesh {
        // unit cube without its top
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let tris = [
            [0, 2, 1],
            [0, 3, 2],
            [0, 1, 5],
            [0, 5, 4],
            [1, 2, 6],
            [1, 6, 5],
            [2, 3, 7],
            [2, 7, 6],
            [3, 0, 4],
            [3, 4, 7],
        ];
        Mesh::from_triangles(&points, &tris).unwrap()
    }

    #[test]
    fn measures_open_box() {
        let info = MeshInfo::measure(&open_box()).unwrap();
        assert_eq!(info.vertices, 8);
        assert_eq!(info.faces, 10);
        assert_eq!(info.edges, 17);
        assert_eq!(info.euler, 1);
        assert_eq!(info.boundary_edges, 4);
        assert_eq!(info.boundary_components, 1);
        assert!(!info.is_closed());
        assert_relative_eq!(info.area, 5.0);
        let bounds = info.bounds.unwrap();
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(info.channels, vec![("coord".to_owned(), 3)]);
    }

    #[test]
    fn empty_mesh() {
        let info = MeshInfo::measure(&Mesh::new()).unwrap();
        assert_eq!(info.vertices, 0);
        assert!(info.bounds.is_none());
        assert!(info.is_closed());
    }

    #[test]
    fn display_lists_channels() {
        let text = MeshInfo::measure(&open_box()).unwrap().to_string();
        assert!(text.contains("faces: 10"));
        assert!(text.contains("attribute: coord (3)"));
    }
}
