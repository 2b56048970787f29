use super::*;
use crate::font::{Font, SegmentGlyphs};
use crate::geometry::{ApproxEq, Matrix4, Point3, Transform, Vector3};
use crate::kernel::{GeometryKernel, MockKernel};
use std::collections::HashMap;

fn segment_font(kernel: &MockKernel) -> Font<MockKernel> {
    Font::load(&SegmentGlyphs::default(), kernel, crate::font::FontKind::Spliced { padding: 1.0 }).unwrap()
}

#[test]
fn test_type_gate_runs_before_any_work() {
    let kernel = MockKernel::new();
    let font = segment_font(&kernel);
    let catalog = Catalog::standard().unwrap();
    let d12 = catalog.get("d12").unwrap();

    let options = InstanceOptions::new(DieType::Percentile).with_die_size(-5.0);
    match d12.create_instance(&kernel, &font, &options) {
        Err(DiceError::IncompatibleDieType { model, requested }) => {
            assert_eq!(model, "d12");
            assert_eq!(requested, "D%");
        }
        other => panic!("expected IncompatibleDieType, got {:?}", other.map(|i| i.model)),
    }
    assert_eq!(kernel.emboss_calls(), 0);
    assert_eq!(font.len(), 12);
}

#[test]
fn test_percentile_uses_bound_mapping() {
    let catalog = Catalog::standard().unwrap();
    let d10 = catalog.get("d10").unwrap();

    let planned = d10.plan_placements(&InstanceOptions::new(DieType::Percentile)).unwrap();
    let glyphs: Vec<&str> = planned.iter().map(|p| p.glyph.as_str()).collect();
    assert_eq!(glyphs, vec!["00", "10", "20", "30", "40", "50", "60", "70", "80", "90"]);

    let d10_plain = d10.plan_placements(&InstanceOptions::new(DieType::D10)).unwrap();
    assert_eq!(d10_plain[0].glyph, "1");
    assert_eq!(d10_plain[9].glyph, "10");

    let zero = d10
        .plan_placements(&InstanceOptions::new(DieType::D10).with_mapping("zero"))
        .unwrap();
    assert_eq!(zero[0].glyph, "0");
}

#[test]
fn test_unknown_mapping_request() {
    let catalog = Catalog::standard().unwrap();
    let d6 = catalog.get("d6").unwrap();
    assert!(matches!(
        d6.plan_placements(&InstanceOptions::new(DieType::D6).with_mapping("Chessex")),
        Err(DiceError::UnknownMapping { .. })
    ));
}

#[test]
fn test_coplanar_under_die_scale() {
    let catalog = Catalog::standard().unwrap();
    let d20 = catalog.get("d20").unwrap();
    let s = 1.5;
    let options = InstanceOptions::new(DieType::D20).with_die_size(d20.die_size() * s);
    let planned = d20.plan_placements(&options).unwrap();
    for p in &planned {
        let origin_i = d20.face_transforms()[p.slot].origin();
        assert!(p.transform.origin().approx_eq(&Point3::from(origin_i.coords * s)));
        // glyph size is untouched by die scale
        let expected = d20.font_size() / GLYPH_ASSET_HEIGHT;
        assert!(p.transform.axis_x().norm().approx_eq(&expected));
    }
}

#[test]
fn test_font_size_override_scales_glyphs_only() {
    let catalog = Catalog::standard().unwrap();
    let d6 = catalog.get("d6").unwrap();
    let base = d6.plan_placements(&InstanceOptions::new(DieType::D6)).unwrap();
    let big = d6
        .plan_placements(&InstanceOptions::new(DieType::D6).with_font_size(d6.font_size() * 2.0))
        .unwrap();
    for (a, b) in base.iter().zip(&big) {
        assert!(a.transform.origin().approx_eq(&b.transform.origin()));
        assert!(b.transform.axis_y().norm().approx_eq(&(2.0 * a.transform.axis_y().norm())));
    }
}

#[test]
fn test_mapping_angles_rotate_about_normal() {
    let catalog = Catalog::standard().unwrap();
    let d6 = catalog.get("d6").unwrap();
    let planned = d6
        .plan_placements(&InstanceOptions::new(DieType::D6).with_mapping("chessex"))
        .unwrap();
    assert_eq!(planned[1].angle, 180.0);
    let face = d6.face_transforms()[1];
    assert!(planned[1].transform.axis_y().approx_eq(&(-face.axis_y())));
    assert!(planned[1].transform.axis_z().approx_eq(&face.axis_z()));
}

#[test]
fn test_create_instance_embosses_every_slot() {
    let kernel = MockKernel::new();
    let font = segment_font(&kernel);
    let catalog = Catalog::standard().unwrap();
    let d20 = catalog.get("d20").unwrap();

    let instance = d20
        .create_instance(&kernel, &font, &InstanceOptions::new(DieType::D20).with_mapping("dotted"))
        .unwrap();
    assert_eq!(instance.model, "d20");
    assert_eq!(instance.mapping, "dotted");
    assert_eq!(instance.placements.len(), 20);
    assert_eq!(instance.solid.cutters, 20);
    assert_eq!(kernel.emboss_calls(), 1);
    assert!(font.contains("6."));
    assert!(font.contains("19"));
}

#[test]
fn test_final_transform_and_scale() {
    let kernel = MockKernel::new();
    let font = segment_font(&kernel);
    let catalog = Catalog::standard().unwrap();
    let d6 = catalog.get("d6").unwrap();

    let shift = Vector3::new(100.0, 0.0, 0.0);
    let options = InstanceOptions::new(DieType::D6)
        .with_die_size(32.0)
        .with_scale(0.5)
        .with_transform(Transform::translation(shift));
    let instance = d6.create_instance(&kernel, &font, &options).unwrap();
    assert!(instance.die_scale.approx_eq(&2.0));

    // 16 across, doubled by die size, halved by scale
    let bounds = kernel.bounds(&instance.solid).unwrap();
    assert!(bounds.width().approx_eq(&16.0));
    assert!(bounds.min.approx_eq(&Point3::new(92.0, -8.0, -8.0)));
}

#[test]
fn test_unresolved_glyph_stops_before_emboss() {
    let kernel = MockKernel::new();
    let mut assets = HashMap::new();
    for digit in ["1", "2", "3", "4", "5"] {
        let bar = kernel
            .extrude_polygon(
                &crate::kernel::Polygon2D::rect(-1.0, -5.0, 2.0, 10.0),
                &crate::kernel::ExtrudeParams::linear(1.0),
            )
            .unwrap();
        assets.insert(digit.to_string(), bar);
    }
    let font: Font<MockKernel> = Font::direct("partial", assets);
    let catalog = Catalog::standard().unwrap();
    let d6 = catalog.get("d6").unwrap();

    assert!(matches!(
        d6.create_instance(&kernel, &font, &InstanceOptions::new(DieType::D6)),
        Err(DiceError::UnresolvedGlyph { glyph, .. }) if glyph == "6"
    ));
    assert_eq!(kernel.emboss_calls(), 0);
}

#[test]
fn test_d4_corner_glyphs() {
    let catalog = Catalog::standard().unwrap();
    let d4 = catalog.get("d4").unwrap();
    let planned = d4.plan_placements(&InstanceOptions::new(DieType::D4)).unwrap();
    assert_eq!(planned.len(), 12);

    let poly = d4.polyhedron();
    let mut slot = 0;
    for face in poly.faces() {
        for &vertex in face.indices() {
            let p = &planned[slot];
            assert_eq!(p.glyph, (vertex + 1).to_string());
            let toward = (poly.vertices()[vertex] - p.transform.origin()).normalize();
            assert!(p.transform.axis_y().normalize().approx_eq(&toward));
            slot += 1;
        }
    }
    // each vertex label appears on the three faces meeting there
    for label in ["1", "2", "3", "4"] {
        assert_eq!(planned.iter().filter(|p| p.glyph == label).count(), 3);
    }
}

#[test]
fn test_invalid_external_scale() {
    let catalog = Catalog::standard().unwrap();
    let d8 = catalog.get("d8").unwrap();
    assert!(matches!(
        d8.plan_placements(&InstanceOptions::new(DieType::D8).with_scale(0.0)),
        Err(DiceError::InvalidSize { what: "scale", .. })
    ));
}

#[test]
fn test_rejects_projective_and_singular_transforms() {
    let kernel = MockKernel::new();
    let font = segment_font(&kernel);
    let catalog = Catalog::standard().unwrap();
    let d8 = catalog.get("d8").unwrap();

    let mut projective = Matrix4::identity();
    projective[(3, 0)] = 0.5;
    let flat = Transform::from_matrix(Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 0.0)));
    for transform in [Transform::from_matrix(projective), flat] {
        let options = InstanceOptions::new(DieType::D8).with_transform(transform);
        assert!(matches!(
            d8.create_instance(&kernel, &font, &options),
            Err(DiceError::InvalidTransform { .. })
        ));
    }
    assert_eq!(kernel.emboss_calls(), 0);

    // a request body carries any matrix
    let zeros = InstanceOptions::new(DieType::D8).with_transform(Transform::from_matrix(Matrix4::zeros()));
    let options: InstanceOptions = serde_json::from_str(&serde_json::to_string(&zeros).unwrap()).unwrap();
    assert!(matches!(
        d8.plan_placements(&options),
        Err(DiceError::InvalidTransform { .. })
    ));
}

#[test]
fn test_options_from_json() {
    let options: InstanceOptions = serde_json::from_str(r#"{ "die_type": "D%", "die_size": 20.0 }"#).unwrap();
    assert_eq!(options.die_type, DieType::Percentile);
    assert_eq!(options.die_size, Some(20.0));
    assert!(options.transform.is_identity(1e-12));
    assert_eq!(options.scale, 1.0);
}
