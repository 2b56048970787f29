use super::frame::{face_frame, newell_normal};
use super::solids;
use super::{Face, Point3, Polyhedron, Transform};
use proptest::prelude::*;

fn assert_orthonormal(t: &Transform) {
    let (x, y, z) = (t.axis_x(), t.axis_y(), t.axis_z());
    for (name, axis) in [("x", x), ("y", y), ("z", z)] {
        assert!((axis.norm() - 1.0).abs() < 1e-9, "{} axis is not unit length", name);
    }
    assert!(x.dot(&y).abs() < 1e-9);
    assert!(y.dot(&z).abs() < 1e-9);
    assert!(z.dot(&x).abs() < 1e-9);
    // right-handed
    assert!((x.cross(&y) - z).norm() < 1e-9);
}

#[test]
fn test_square_frame() {
    let poly = Polyhedron::new(
        vec![
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
        ],
        vec![Face::new(vec![0, 1, 2, 3])],
    )
    .unwrap();

    let frame = face_frame(&poly, 0).unwrap();
    assert_orthonormal(&frame);
    assert!((frame.origin() - Point3::origin()).norm() < 1e-12);
    // first edge is the bottom edge, so y points up the face
    assert!((frame.axis_y() - super::Vector3::y()).norm() < 1e-12);
    assert!((frame.axis_z() - super::Vector3::z()).norm() < 1e-12);
    assert!((frame.axis_x() - super::Vector3::x()).norm() < 1e-12);
}

#[test]
fn test_collinear_face_is_degenerate() {
    let poly = Polyhedron::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ],
        vec![Face::new(vec![0, 1, 2])],
    )
    .unwrap();

    let err = face_frame(&poly, 0).unwrap_err();
    assert_eq!(err.face, 0);
}

#[test]
fn test_every_standard_solid_has_orthonormal_outward_frames() {
    let all = [
        solids::tetrahedron().unwrap(),
        solids::cube().unwrap(),
        solids::octahedron().unwrap(),
        solids::pentagonal_trapezohedron(1.15).unwrap(),
        solids::dodecahedron().unwrap(),
        solids::icosahedron().unwrap(),
    ];
    for poly in &all {
        let center = poly.center();
        for f in 0..poly.faces().len() {
            let frame = face_frame(poly, f).unwrap();
            assert_orthonormal(&frame);
            assert!(frame.axis_z().dot(&(poly.centroid(f) - center)) > 0.0);
            let n = newell_normal(&poly.face_positions(f)).normalize();
            assert!((frame.axis_z() - n).norm() < 1e-9);
        }
    }
}

fn point() -> impl Strategy<Value = Point3> {
    (-100.0..100.0f64, -100.0..100.0f64, -100.0..100.0f64).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

proptest! {
    #[test]
    fn prop_triangle_frames_are_orthonormal(a in point(), b in point(), c in point()) {
        let area2 = (b - a).cross(&(c - a)).norm();
        prop_assume!(area2 > 1.0);

        let poly = Polyhedron::new(vec![a, b, c], vec![Face::new(vec![0, 1, 2])]).unwrap();
        let frame = face_frame(&poly, 0).unwrap();
        assert_orthonormal(&frame);

        let expected = (b - a).cross(&(c - a)).normalize();
        prop_assert!((frame.axis_z() - expected).norm() < 1e-9);
    }

    #[test]
    fn prop_collinear_triangles_are_rejected(a in point(), d in point()) {
        // Integer-valued points keep the collinear sum exact.
        let a = a.map(f64::round);
        let d = d.map(f64::round);
        let b = a + (d - a) * 2.0;
        let c = a + (d - a) * 4.0;
        let poly = Polyhedron::new(vec![a, b, c], vec![Face::new(vec![0, 1, 2])]).unwrap();
        prop_assert!(face_frame(&poly, 0).is_err());
    }
}
