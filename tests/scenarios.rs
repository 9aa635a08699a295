mod common;

use approx::assert_relative_eq;
use surfmesh::mesh::{MeshTarget, NORMAL, SELECTION};
use surfmesh::operations::query::MeshInfo;
use surfmesh::operations::{FillHoles, LabelComponents, Simplify, SimplifyParams, SimplifyStatus};

use common::{
    handles, icosahedron, init_tracing, open_bipyramid, pentagon_disk, select_all, two_triangles,
};

#[test]
fn disk_hole_gets_centroid_fan() {
    init_tracing();
    let mesh = pentagon_disk();
    let before = MeshInfo::measure(&mesh).unwrap();
    assert_eq!(before.vertices, 7);
    assert_eq!(before.boundary_components, 1);
    assert_eq!(mesh.graph().bound().len(), 5);

    let (out, report) = FillHoles::new().execute(MeshTarget::Copy(&mesh)).unwrap();
    let after = MeshInfo::measure(&out).unwrap();
    assert_eq!(report.holes_filled, 1);
    assert_eq!(after.vertices, 8);
    assert_eq!(after.faces, before.faces + 5);
    assert_eq!(after.boundary_edges, 0);
    assert_eq!(after.euler, 2);
    assert!(out.graph().validate().is_empty());
}

#[test]
fn apex_hole_closes_bipyramid() {
    init_tracing();
    let mut mesh = open_bipyramid();
    let report = FillHoles::new().run(&mut mesh).unwrap();
    assert_eq!(report.vertices_added, 1);
    assert_eq!(report.faces_added, 5);

    let info = MeshInfo::measure(&mesh).unwrap();
    assert_eq!(info.vertices, 8);
    assert_eq!(info.faces, 12);
    assert!(info.is_closed());
    assert_eq!(info.genus, 0);
}

#[test]
fn disjoint_triangles_get_two_labels() {
    init_tracing();
    let mut mesh = two_triangles();
    select_all(&mut mesh, 1.0);
    let verts = handles(&mesh);

    let (out, reports) = LabelComponents::new().execute(MeshTarget::Copy(&mesh)).unwrap();
    assert_eq!(reports[0].num_components, 2);
    assert_eq!(reports[0].sizes, vec![3, 3]);
    let labels: Vec<f64> = verts
        .iter()
        .map(|&v| out.attrs().scalar(v, SELECTION).unwrap())
        .collect();
    // equal sizes rank by the first vertex visited
    assert_eq!(labels, vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
}

#[test]
fn tied_largest_keeps_first_component() {
    init_tracing();
    let mut mesh = two_triangles();
    select_all(&mut mesh, 1.0);
    let verts = handles(&mesh);

    let op = LabelComponents::new().with_largest(true).with_output("mask");
    let (out, _) = op.execute(MeshTarget::Copy(&mesh)).unwrap();
    let mask: Vec<f64> = verts
        .iter()
        .map(|&v| out.attrs().scalar(v, "mask").unwrap())
        .collect();
    assert_eq!(mask, vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
}

#[test]
fn icosahedron_simplifies_to_ten_faces() {
    init_tracing();
    let mesh = icosahedron();
    let info = MeshInfo::measure(&mesh).unwrap();
    assert_eq!((info.vertices, info.edges, info.faces), (12, 30, 20));

    let op = Simplify::new(SimplifyParams::default().with_max_faces(10));
    let (out, report) = op.execute(MeshTarget::Copy(&mesh)).unwrap();
    assert_eq!(report.status, SimplifyStatus::Converged);
    assert!(report.faces <= 10);
    assert_eq!(report.skipped_faces, 0);
    assert_eq!(out.graph().euler_characteristic(), 2);
    assert_eq!(out.graph().num_boundary_edges(), 0);
    assert!(out.graph().validate().is_empty());

    // normals of a convex closed surface point away from its centre
    for v in out.graph().vertices() {
        let p = out.coord(v).unwrap();
        let n = out.attrs().get(v, NORMAL).unwrap();
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-9);
        assert!(p.x * n[0] + p.y * n[1] + p.z * n[2] > 0.0);
    }

    // the source mesh is untouched
    assert_eq!(mesh.graph().num_faces(), 20);
}
