use super::*;
use crate::geometry::{solids, ApproxEq, Face, Point3, Polyhedron, Vector3};

fn cube_def(mappings: Vec<GlyphMapping>) -> DieModelDef {
    DieModelDef {
        name: "cube".into(),
        polyhedron: solids::cube().unwrap().scaled(8.0),
        die_size: 16.0,
        font_size: 8.0,
        placement: PlacementPolicy::FaceCentered,
        alignment: FaceAlignment::Edge,
        die_types: vec![DieTypeBinding::new(DieType::D6, DEFAULT_MAPPING)],
        mappings,
    }
}

#[test]
fn test_default_mapping_of_six_faces() {
    let model = DieModel::new(cube_def(Vec::new())).unwrap();
    let default = model.resolve_mapping(DEFAULT_MAPPING).unwrap();
    assert_eq!(default.glyph_ids, vec!["1", "2", "3", "4", "5", "6"]);
    assert_eq!(default.angles, vec![0.0; 6]);
    assert_eq!(model.slot_count(), 6);
    assert_eq!(model.placement_count(), 6);
}

#[test]
fn test_chessex_resolves_verbatim() {
    let catalog = Catalog::standard().unwrap();
    let d6 = catalog.get("d6").unwrap();
    let chessex = d6.resolve_mapping("chessex").unwrap();
    assert_eq!(chessex.glyph_ids, vec!["5", "1", "3", "2", "4", "6"]);
    assert_eq!(chessex.angles, vec![90.0, 180.0, 0.0, 90.0, 180.0, 0.0]);
    assert_eq!(d6.mapping_names().collect::<Vec<_>>(), vec!["default", "chessex", "opposed"]);
}

#[test]
fn test_register_mapping_arity() {
    let mut model = DieModel::new(cube_def(Vec::new())).unwrap();
    let wrong = GlyphMapping::sequential("wrong", 8);
    assert!(matches!(
        model.register_mapping(wrong),
        Err(DiceError::MappingArity { expected: 6, actual: 8, .. })
    ));
    assert!(matches!(
        model.resolve_mapping("wrong"),
        Err(DiceError::UnknownMapping { model, name }) if model == "cube" && name == "wrong"
    ));

    model.register_mapping(GlyphMapping::sequential("right", 6)).unwrap();
    assert!(model.resolve_mapping("right").is_ok());
}

#[test]
fn test_construction_rejects_bad_extra_mapping() {
    let def = cube_def(vec![GlyphMapping::sequential("short", 3)]);
    assert!(matches!(DieModel::new(def), Err(DiceError::MappingArity { .. })));
}

#[test]
fn test_construction_rejects_unbound_mapping() {
    let mut def = cube_def(Vec::new());
    def.die_types = vec![DieTypeBinding::new(DieType::D6, "missing")];
    assert!(matches!(DieModel::new(def), Err(DiceError::UnknownMapping { .. })));
}

#[test]
fn test_degenerate_face_names_model() {
    let poly = Polyhedron::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        vec![Face::new(vec![0, 1, 3]), Face::new(vec![0, 1, 2])],
    )
    .unwrap();
    let mut def = cube_def(Vec::new());
    def.name = "flat".into();
    def.polyhedron = poly;
    match DieModel::new(def) {
        Err(DiceError::DegenerateFace { model, face, .. }) => {
            assert_eq!(model, "flat");
            assert_eq!(face, 1);
        }
        other => panic!("expected DegenerateFace, got {:?}", other.map(|m| m.name().to_string())),
    }
}

#[test]
fn test_invalid_sizes_rejected() {
    let mut def = cube_def(Vec::new());
    def.font_size = 0.0;
    assert!(matches!(
        DieModel::new(def),
        Err(DiceError::InvalidSize { what: "font_size", .. })
    ));

    let model = DieModel::new(cube_def(Vec::new())).unwrap();
    assert!(matches!(
        model.resolve_scales(Some(-1.0), None),
        Err(DiceError::InvalidSize { what: "die_size", .. })
    ));
    assert!(matches!(
        model.resolve_scales(None, Some(f64::NAN)),
        Err(DiceError::InvalidSize { what: "font_size", .. })
    ));
}

#[test]
fn test_scales_are_independent() {
    let model = DieModel::new(cube_def(Vec::new())).unwrap();
    let only_die = model.resolve_scales(Some(32.0), None).unwrap();
    assert!(only_die.die_scale.approx_eq(&2.0));
    assert!(only_die.font_scale.approx_eq(&1.0));

    let only_font = model.resolve_scales(None, Some(4.0)).unwrap();
    assert!(only_font.die_scale.approx_eq(&1.0));
    assert!(only_font.font_scale.approx_eq(&0.5));
}

#[test]
fn test_face_transforms_scale_assets_to_font_size() {
    let model = DieModel::new(cube_def(Vec::new())).unwrap();
    let expected = model.font_size() / GLYPH_ASSET_HEIGHT;
    for (f, t) in model.face_transforms().iter().enumerate() {
        assert!(t.axis_x().norm().approx_eq(&expected));
        assert!(t.axis_y().norm().approx_eq(&expected));
        assert!(t.origin().approx_eq(&model.polyhedron().centroid(f)));
    }
}

#[test]
fn test_catalog_faces_point_outward() {
    let catalog = Catalog::standard().unwrap();
    for model in catalog.models() {
        let poly = model.polyhedron();
        let centre = poly.center();
        for (f, t) in model.face_transforms().iter().enumerate() {
            let outward = poly.centroid(f) - centre;
            assert!(t.axis_z().dot(&outward) > 0.0, "{} face {} points inward", model.name(), f);
        }
    }
}

#[test]
fn test_rotated_alignment_turns_about_normal() {
    let plain = DieModel::new(cube_def(Vec::new())).unwrap();
    let mut def = cube_def(Vec::new());
    def.alignment = FaceAlignment::Rotated(90.0);
    let turned = DieModel::new(def).unwrap();
    for (a, b) in plain.face_transforms().iter().zip(turned.face_transforms()) {
        assert!(a.axis_z().approx_eq(&b.axis_z()));
        // Rz(90) takes +x to +y and +y to -x
        assert!(b.axis_x().approx_eq(&a.axis_y()));
        assert!(b.axis_y().approx_eq(&(-a.axis_x())));
    }
}

#[test]
fn test_d10_glyphs_point_at_apex() {
    let catalog = Catalog::standard().unwrap();
    let d10 = catalog.get("d10").unwrap();
    let poly = d10.polyhedron();
    for (f, t) in d10.face_transforms().iter().enumerate() {
        let apex = poly.vertices()[poly.faces()[f].indices()[0]];
        let toward = (apex - poly.centroid(f)).normalize();
        assert!(t.axis_y().normalize().approx_eq(&toward), "face {}", f);
    }
}

#[test]
fn test_d4_corner_slots() {
    let catalog = Catalog::standard().unwrap();
    let d4 = catalog.get("d4").unwrap();
    assert_eq!(d4.slot_count(), 4);
    assert_eq!(d4.placement_count(), 12);

    let poly = d4.polyhedron();
    let mut seen = 0;
    for (f, face) in poly.faces().iter().enumerate() {
        for &vertex in face.indices() {
            let slot = &d4.slots()[seen];
            assert_eq!(slot.face, f);
            assert_eq!(slot.entry, vertex);

            let target = poly.vertices()[vertex];
            let origin = slot.transform.origin();
            let toward: Vector3 = (target - origin).normalize();
            assert!(slot.transform.axis_y().normalize().approx_eq(&toward));

            let expected = poly.centroid(f) + (target - poly.centroid(f)) * 0.55;
            assert!(origin.approx_eq(&expected));
            seen += 1;
        }
    }
}

#[test]
fn test_numbering_table_must_match_faces() {
    let poly = solids::tetrahedron().unwrap();
    let mut numbering = VertexNumbering::by_vertex(&poly, 0.5);
    numbering.table.pop();
    let def = DieModelDef {
        name: "bad-d4".into(),
        polyhedron: poly,
        die_size: 20.0,
        font_size: 5.0,
        placement: PlacementPolicy::VertexCentered(numbering),
        alignment: FaceAlignment::Edge,
        die_types: vec![DieTypeBinding::new(DieType::D4, DEFAULT_MAPPING)],
        mappings: Vec::new(),
    };
    assert!(matches!(DieModel::new(def), Err(DiceError::InvalidPolyhedron { .. })));
}

#[test]
fn test_coplanarity_offset() {
    let model = DieModel::new(cube_def(Vec::new())).unwrap();
    assert!(model.coplanarity_offset(0, 1.0).unwrap().is_identity(1e-12));
    let offset = model.coplanarity_offset(0, 3.0).unwrap();
    let origin = model.face_transforms()[0].origin();
    assert!(offset.transform_point(&origin).approx_eq(&Point3::from(origin.coords * 3.0)));
}

#[test]
fn test_coplanarity_offset_of_missing_slot() {
    let model = DieModel::new(cube_def(Vec::new())).unwrap();
    assert_eq!(model.placement_count(), 6);
    assert!(model.coplanarity_offset(6, 2.0).is_none());
}
