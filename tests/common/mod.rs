#![allow(dead_code)]

use surfmesh::math::{Point3, VectorN};
use surfmesh::mesh::SELECTION;
use surfmesh::topology::VertexId;
use surfmesh::Mesh;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; `RUST_LOG` overrides the level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn handles(mesh: &Mesh) -> Vec<VertexId> {
    mesh.graph().vertices().collect()
}

pub fn select_all(mesh: &mut Mesh, value: f64) {
    mesh.attrs_mut().add(SELECTION, VectorN::zeros(1)).unwrap();
    mesh.attrs_mut()
        .set_all(SELECTION, &VectorN::from_element(1, value))
        .unwrap();
}

/// Regular icosahedron: 12 vertices, 30 edges, 20 faces, outward winding.
pub fn icosahedron() -> Mesh {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let points = [
        Point3::new(-1.0, phi, 0.0),
        Point3::new(1.0, phi, 0.0),
        Point3::new(-1.0, -phi, 0.0),
        Point3::new(1.0, -phi, 0.0),
        Point3::new(0.0, -1.0, phi),
        Point3::new(0.0, 1.0, phi),
        Point3::new(0.0, -1.0, -phi),
        Point3::new(0.0, 1.0, -phi),
        Point3::new(phi, 0.0, -1.0),
        Point3::new(phi, 0.0, 1.0),
        Point3::new(-phi, 0.0, -1.0),
        Point3::new(-phi, 0.0, 1.0),
    ];
    let tris = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    Mesh::from_triangles(&points, &tris).unwrap()
}

/// Octahedron: 6 vertices, 12 edges, 8 faces.
pub fn octahedron() -> Mesh {
    let points = [
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, -1.0),
    ];
    let tris = [
        [4, 0, 1],
        [4, 1, 2],
        [4, 2, 3],
        [4, 3, 0],
        [5, 1, 0],
        [5, 2, 1],
        [5, 3, 2],
        [5, 0, 3],
    ];
    Mesh::from_triangles(&points, &tris).unwrap()
}

/// Flat disk with a pentagonal rim and two interior vertices: 7 vertices,
/// 7 faces, one boundary loop of 5 vertices.
pub fn pentagon_disk() -> Mesh {
    let mut points = Vec::new();
    for k in 0..5_u32 {
        let t = std::f64::consts::FRAC_PI_2 + f64::from(k) * std::f64::consts::TAU / 5.0;
        points.push(Point3::new(t.cos(), t.sin(), 0.0));
    }
    points.push(Point3::new(-0.25, 0.0, 0.0));
    points.push(Point3::new(0.25, 0.0, 0.0));
    let (q0, q1) = (5, 6);
    let tris = [
        [q0, q1, 0],
        [q0, 0, 1],
        [q0, 1, 2],
        [q0, 2, 3],
        [q1, q0, 3],
        [q1, 3, 4],
        [q1, 4, 0],
    ];
    Mesh::from_triangles(&points, &tris).unwrap()
}

/// Pentagonal bipyramid with three adjacent top faces removed: 7
/// vertices, 7 faces, one boundary loop through the apex.
pub fn open_bipyramid() -> Mesh {
    let mut points = Vec::new();
    for k in 0..5_u32 {
        let t = f64::from(k) * std::f64::consts::TAU / 5.0;
        points.push(Point3::new(t.cos(), t.sin(), 0.0));
    }
    points.push(Point3::new(0.0, 0.0, 1.0));
    points.push(Point3::new(0.0, 0.0, -1.0));
    let (top, bottom) = (5, 6);
    let mut tris = Vec::new();
    for i in 3..5 {
        tris.push([top, i, (i + 1) % 5]);
    }
    for i in 0..5 {
        tris.push([bottom, (i + 1) % 5, i]);
    }
    Mesh::from_triangles(&points, &tris).unwrap()
}

/// Triangle fan of `n` faces around a centre vertex, optionally offset.
pub fn fan(mesh: &mut Mesh, n: usize, offset: f64) -> Vec<VertexId> {
    let center = mesh
        .add_vertex_at(&Point3::new(offset, 0.0, 0.0))
        .unwrap();
    let mut rim = Vec::new();
    for i in 0..n {
        #[allow(clippy::cast_precision_loss)]
        let t = std::f64::consts::TAU * i as f64 / n as f64;
        rim.push(
            mesh.add_vertex_at(&Point3::new(offset + t.cos(), t.sin(), 0.0))
                .unwrap(),
        );
    }
    for i in 0..n {
        mesh.add_face(surfmesh::topology::Face::new(center, rim[i], rim[(i + 1) % n]))
            .unwrap();
    }
    let mut verts = vec![center];
    verts.extend(rim);
    verts
}

/// Two disjoint triangles, 6 vertices.
pub fn two_triangles() -> Mesh {
    let points = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(5.0, 0.0, 0.0),
        Point3::new(6.0, 0.0, 0.0),
        Point3::new(5.0, 1.0, 0.0),
    ];
    Mesh::from_triangles(&points, &[[0, 1, 2], [3, 4, 5]]).unwrap()
}
