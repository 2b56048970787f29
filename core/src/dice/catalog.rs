//! The standard set of die models.

use super::error::{DiceError, DiceResult};
use super::mapping::{GlyphMapping, DEFAULT_MAPPING};
use super::model::{DieModel, DieModelDef, DieTypeBinding, FaceAlignment, PlacementPolicy, VertexNumbering};
use super::DieType;
use crate::geometry::{solids, Polyhedron};
use std::sync::Arc;
use tracing::debug;

/// Apex height of the ten-sided solid relative to its unit ring.
const D10_APEX_HEIGHT: f64 = 1.15;

/// Corner glyphs on the d4 sit this far from the centroid toward the vertex.
const D4_CORNER_OFFSET: f64 = 0.55;

/// Models keyed by name, in registration order. Models are shared behind
/// `Arc` and never change once registered.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    models: Vec<Arc<DieModel>>,
}

/// Scales `poly` so opposite faces sit `die_size` apart.
fn sized(poly: Polyhedron, die_size: f64) -> Polyhedron {
    let inradius = poly.inradius();
    poly.scaled(die_size / (2.0 * inradius))
}

/// `6` and `9` carry a trailing mark so they can be told apart.
fn dotted(base: &GlyphMapping) -> GlyphMapping {
    base.relabeled("dotted", |g| match g {
        "6" | "9" => format!("{}.", g),
        _ => g.to_string(),
    })
}

fn d4() -> DiceResult<DieModel> {
    let die_size = 20.0;
    // Vertex to opposite face is four inradii on a tetrahedron.
    let tetra = solids::tetrahedron()?;
    let poly = tetra.scaled(die_size / (4.0 * tetra.inradius()));
    let numbering = VertexNumbering::by_vertex(&poly, D4_CORNER_OFFSET);
    DieModel::new(DieModelDef {
        name: "d4".into(),
        polyhedron: poly,
        die_size,
        font_size: 5.0,
        placement: PlacementPolicy::VertexCentered(numbering),
        alignment: FaceAlignment::Edge,
        die_types: vec![DieTypeBinding::new(DieType::D4, DEFAULT_MAPPING)],
        mappings: Vec::new(),
    })
}

fn d6() -> DiceResult<DieModel> {
    let poly = sized(solids::cube()?, 16.0);
    let chessex = GlyphMapping::new(
        "chessex",
        ["5", "1", "3", "2", "4", "6"].map(String::from).to_vec(),
        vec![90.0, 180.0, 0.0, 90.0, 180.0, 0.0],
    );
    let opposed = GlyphMapping::opposed("opposed", &poly)?;
    DieModel::new(DieModelDef {
        name: "d6".into(),
        polyhedron: poly,
        die_size: 16.0,
        font_size: 8.0,
        placement: PlacementPolicy::FaceCentered,
        alignment: FaceAlignment::Edge,
        die_types: vec![DieTypeBinding::new(DieType::D6, DEFAULT_MAPPING)],
        mappings: vec![chessex, opposed],
    })
}

fn d8() -> DiceResult<DieModel> {
    let poly = sized(solids::octahedron()?, 15.0);
    let opposed = GlyphMapping::opposed("opposed", &poly)?;
    DieModel::new(DieModelDef {
        name: "d8".into(),
        polyhedron: poly,
        die_size: 15.0,
        font_size: 6.0,
        placement: PlacementPolicy::FaceCentered,
        alignment: FaceAlignment::Edge,
        die_types: vec![DieTypeBinding::new(DieType::D8, DEFAULT_MAPPING)],
        mappings: vec![opposed],
    })
}

fn d10() -> DiceResult<DieModel> {
    let poly = sized(solids::pentagonal_trapezohedron(D10_APEX_HEIGHT)?, 16.0);
    let zero = GlyphMapping::with_labels("zero", (0..10).map(|i| i.to_string()));
    let percentile = GlyphMapping::with_labels("percentile", (0..10).map(|i| format!("{}0", i)));
    DieModel::new(DieModelDef {
        name: "d10".into(),
        polyhedron: poly,
        die_size: 16.0,
        font_size: 5.5,
        placement: PlacementPolicy::FaceCentered,
        // Kite faces read from the ring toward the apex.
        alignment: FaceAlignment::TowardVertex(0),
        die_types: vec![
            DieTypeBinding::new(DieType::D10, DEFAULT_MAPPING),
            DieTypeBinding::new(DieType::Percentile, "percentile"),
        ],
        mappings: vec![zero, percentile],
    })
}

fn opposed_face_centered(name: &str, poly: Polyhedron, die_size: f64, font_size: f64, die_type: DieType) -> DiceResult<DieModel> {
    let poly = sized(poly, die_size);
    let opposed = GlyphMapping::opposed("opposed", &poly)?;
    let dotted = dotted(&opposed);
    DieModel::new(DieModelDef {
        name: name.into(),
        polyhedron: poly,
        die_size,
        font_size,
        placement: PlacementPolicy::FaceCentered,
        alignment: FaceAlignment::Edge,
        die_types: vec![DieTypeBinding::new(die_type, DEFAULT_MAPPING)],
        mappings: vec![opposed, dotted],
    })
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// d4, d6, d8, d10 (also D%), d12 and d20.
    pub fn standard() -> DiceResult<Self> {
        let mut catalog = Self::new();
        catalog.register(d4()?)?;
        catalog.register(d6()?)?;
        catalog.register(d8()?)?;
        catalog.register(d10()?)?;
        catalog.register(opposed_face_centered("d12", solids::dodecahedron()?, 18.0, 5.0, DieType::D12)?)?;
        catalog.register(opposed_face_centered("d20", solids::icosahedron()?, 20.0, 4.5, DieType::D20)?)?;
        debug!(models = catalog.models.len(), "built standard catalog");
        Ok(catalog)
    }

    pub fn register(&mut self, model: DieModel) -> DiceResult<Arc<DieModel>> {
        if self.get(model.name()).is_some() {
            return Err(DiceError::DuplicateModel {
                name: model.name().to_string(),
            });
        }
        let model = Arc::new(model);
        self.models.push(Arc::clone(&model));
        Ok(model)
    }

    pub fn get(&self, name: &str) -> Option<Arc<DieModel>> {
        self.models.iter().find(|m| m.name() == name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.name())
    }

    pub fn models(&self) -> impl Iterator<Item = &Arc<DieModel>> {
        self.models.iter()
    }

    /// First model that supports `die_type`.
    pub fn find_by_type(&self, die_type: DieType) -> Option<Arc<DieModel>> {
        self.models.iter().find(|m| m.supports(die_type)).cloned()
    }
}
