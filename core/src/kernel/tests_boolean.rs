// Exercises the truck kernel on the shapes the dice engine actually builds:
// closed polyhedra, extruded glyph bars and emboss cuts.

use super::*;
use crate::geometry::{solids, ApproxEq, Point3, Transform, Vector3};

fn kernel() -> TruckKernel {
    TruckKernel::with_tolerance(0.05)
}

#[test]
fn test_cube_polyhedron_is_closed_solid() {
    let k = kernel();
    let cube = k.polyhedron_solid(&solids::cube().unwrap()).expect("cube must close");
    assert_eq!(cube.boundaries().len(), 1);
    assert_eq!(cube.boundaries()[0].face_iter().count(), 6);

    let bounds = k.bounds(&cube).unwrap();
    assert!(bounds.min.approx_eq(&Point3::new(-1.0, -1.0, -1.0)));
    assert!(bounds.max.approx_eq(&Point3::new(1.0, 1.0, 1.0)));
}

#[test]
fn test_every_standard_solid_closes() {
    let k = kernel();
    let all = [
        solids::tetrahedron().unwrap(),
        solids::octahedron().unwrap(),
        solids::pentagonal_trapezohedron(1.15).unwrap(),
        solids::dodecahedron().unwrap(),
        solids::icosahedron().unwrap(),
    ];
    for poly in &all {
        let solid = k.polyhedron_solid(poly).expect("solid must close");
        assert_eq!(solid.boundaries()[0].face_iter().count(), poly.faces().len());
    }
}

#[test]
fn test_transform_moves_bounds() {
    let k = kernel();
    let cube = k.polyhedron_solid(&solids::cube().unwrap()).unwrap();
    let t = Transform::translation(Vector3::new(5.0, 0.0, 0.0)) * Transform::scaling(2.0);
    let moved = k.transform_solid(&cube, &t).unwrap();
    let bounds = k.bounds(&moved).unwrap();
    assert!(bounds.min.approx_eq(&Point3::new(3.0, -2.0, -2.0)));
    assert!(bounds.max.approx_eq(&Point3::new(7.0, 2.0, 2.0)));
}

#[test]
fn test_combine_keeps_both_shells() {
    let k = kernel();
    let bar = k
        .extrude_polygon(&Polygon2D::rect(0.0, 0.0, 1.0, 3.0), &ExtrudeParams::linear(1.0))
        .unwrap();
    let shifted = k
        .transform_solid(&bar, &Transform::translation(Vector3::new(2.0, 0.0, 0.0)))
        .unwrap();
    let pair = k.combine(&[bar, shifted]).unwrap();
    assert_eq!(pair.boundaries().len(), 2);
    assert!(k.bounding_width(&pair).unwrap().approx_eq(&3.0));
}

#[test]
fn test_emboss_bar_into_cube() {
    let k = kernel();
    let cube = k.polyhedron_solid(&solids::cube().unwrap().scaled(5.0)).unwrap();

    // A bar that straddles the +z face: half inside, half outside.
    let bar = k
        .extrude_polygon(
            &Polygon2D::rect(-1.3, -2.1, 2.7, 4.3),
            &ExtrudeParams::linear(2.0).with_start_offset(4.1),
        )
        .unwrap();

    let cut = k.boolean_emboss(&cube, &[bar]).expect("emboss should succeed");
    assert!(cut.boundaries()[0].face_iter().count() > 6);

    let mesh = k.tessellate(&cut).unwrap();
    assert!(mesh.triangle_count() > 12);
}

#[test]
fn test_emboss_multi_shell_cutter() {
    let k = kernel();
    let cube = k.polyhedron_solid(&solids::cube().unwrap().scaled(5.0)).unwrap();
    let params = ExtrudeParams::linear(2.0).with_start_offset(4.1);
    let left = k.extrude_polygon(&Polygon2D::rect(-3.1, -2.1, 1.3, 4.3), &params).unwrap();
    let right = k.extrude_polygon(&Polygon2D::rect(0.7, -2.1, 1.3, 4.3), &params).unwrap();
    let pair = k.combine(&[left, right]).unwrap();

    let cut = k.boolean_emboss(&cube, &[pair]).unwrap();
    assert_eq!(cut.boundaries().len(), 1);
    // two pockets of five faces each
    assert!(cut.boundaries()[0].face_iter().count() >= 16);
}

#[test]
fn test_disjoint_cutter_leaves_base_alone() {
    let k = kernel();
    let cube = k.polyhedron_solid(&solids::cube().unwrap().scaled(5.0)).unwrap();
    let far = k
        .transform_solid(
            &k.polyhedron_solid(&solids::cube().unwrap()).unwrap(),
            &Transform::translation(Vector3::new(20.0, 0.0, 0.0)),
        )
        .unwrap();
    let cut = k.boolean_emboss(&cube, &[far]).unwrap();
    assert_eq!(cut.boundaries()[0].face_iter().count(), 6);
}

#[test]
fn test_buried_cutter_is_an_error() {
    // Never reaches the surface, so no step can produce a valid cut.
    let k = kernel();
    let cube = k.polyhedron_solid(&solids::cube().unwrap().scaled(5.0)).unwrap();
    let inner = k.polyhedron_solid(&solids::cube().unwrap()).unwrap();
    let err = k.boolean_emboss(&cube, &[inner]).unwrap_err();
    assert!(matches!(err, KernelOpError::OperationFailed(ref msg) if msg.contains("cutter 0")));
}
