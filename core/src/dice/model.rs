//! Die model: a solid plus the rules for numbering it.
//!
//! A [`DieModel`] is built once per distinct shape. Construction derives every
//! face frame and every placement slot transform up front, so producing an
//! instance never touches raw polygon data again.

use super::error::{DiceError, DiceResult};
use super::mapping::{GlyphMapping, GlyphMappingRegistry};
use super::DieType;
use crate::geometry::{face_frame, Point3, Polyhedron, Transform, Vector3};
use tracing::debug;

/// Height every glyph asset is authored at. Face transforms scale assets from
/// this height to the model's font size.
pub const GLYPH_ASSET_HEIGHT: f64 = 10.0;

/// Post-rotation applied to each face frame about its normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaceAlignment {
    /// Glyphs stand on the face's first edge.
    Edge,
    /// Fixed rotation in degrees.
    Rotated(f64),
    /// Glyphs point from the centroid at `face[corner]`.
    TowardVertex(usize),
}

/// Corner numbering for vertex-centered dice.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexNumbering {
    /// `table[face][corner]` is the mapping entry shown at that corner.
    pub table: Vec<Vec<usize>>,
    /// Fraction of the centroid-to-vertex distance at which corner glyphs sit.
    pub corner_offset: f64,
}

impl VertexNumbering {
    /// Every corner shows the entry of the vertex it sits on.
    pub fn by_vertex(poly: &Polyhedron, corner_offset: f64) -> Self {
        Self {
            table: poly.faces().iter().map(|f| f.indices().to_vec()).collect(),
            corner_offset,
        }
    }

    fn entry_count(&self) -> usize {
        self.table.iter().flatten().max().map_or(0, |m| m + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacementPolicy {
    /// One glyph at the centre of each face.
    FaceCentered,
    /// One glyph near every corner of every face.
    VertexCentered(VertexNumbering),
}

/// A die type a model supports and the mapping it uses by default.
#[derive(Debug, Clone, PartialEq)]
pub struct DieTypeBinding {
    pub die_type: DieType,
    pub mapping: String,
}

impl DieTypeBinding {
    pub fn new(die_type: DieType, mapping: impl Into<String>) -> Self {
        Self {
            die_type,
            mapping: mapping.into(),
        }
    }
}

/// Everything needed to build a [`DieModel`].
#[derive(Debug, Clone)]
pub struct DieModelDef {
    pub name: String,
    pub polyhedron: Polyhedron,
    /// Reference distance between a face and its opposite (or vertex, for
    /// solids without opposite faces).
    pub die_size: f64,
    /// Reference glyph height.
    pub font_size: f64,
    pub placement: PlacementPolicy,
    pub alignment: FaceAlignment,
    pub die_types: Vec<DieTypeBinding>,
    /// Mappings registered in addition to `"default"`.
    pub mappings: Vec<GlyphMapping>,
}

/// One place a glyph goes.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub face: usize,
    /// Index into the mapping arrays.
    pub entry: usize,
    /// Placement before die scaling and mapping rotation.
    pub transform: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub die_scale: f64,
    pub font_scale: f64,
}

#[derive(Debug, Clone)]
pub struct DieModel {
    name: String,
    polyhedron: Polyhedron,
    die_size: f64,
    font_size: f64,
    placement: PlacementPolicy,
    die_types: Vec<DieTypeBinding>,
    face_transforms: Vec<Transform>,
    slots: Vec<Slot>,
    registry: GlyphMappingRegistry,
}

fn check_size(what: &'static str, value: f64) -> DiceResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DiceError::InvalidSize { what, value })
    }
}

/// Rotation about local z that turns `+y` toward `target`, plus the in-plane
/// offset to it, both in the frame's coordinates.
fn aim_at(frame: &Transform, target: &Point3) -> DiceResult<(f64, Vector3)> {
    let inverse = frame.try_inverse().ok_or_else(|| DiceError::InvalidPolyhedron {
        reason: "face frame is not invertible".into(),
    })?;
    let local = inverse.transform_point(target).coords;
    let planar = Vector3::new(local.x, local.y, 0.0);
    // Rz(phi) maps +y to (-sin phi, cos phi).
    let phi = (-planar.x).atan2(planar.y).to_degrees();
    Ok((phi, planar))
}

impl DieModel {
    pub fn new(def: DieModelDef) -> DiceResult<Self> {
        let DieModelDef {
            name,
            polyhedron,
            die_size,
            font_size,
            placement,
            alignment,
            die_types,
            mappings,
        } = def;

        check_size("die_size", die_size)?;
        check_size("font_size", font_size)?;
        let glyph_scale = Transform::scaling(font_size / GLYPH_ASSET_HEIGHT);

        let mut frames = Vec::with_capacity(polyhedron.faces().len());
        for (f, face) in polyhedron.faces().iter().enumerate() {
            let frame = face_frame(&polyhedron, f).map_err(|e| DiceError::DegenerateFace {
                model: name.clone(),
                face: e.face,
                reason: e.reason,
            })?;
            let aligned = match alignment {
                FaceAlignment::Edge => frame,
                FaceAlignment::Rotated(degrees) => frame * Transform::rotation_z_degrees(degrees),
                FaceAlignment::TowardVertex(corner) => {
                    let vertex = face.indices().get(corner).ok_or_else(|| DiceError::InvalidPolyhedron {
                        reason: format!("face {} has no corner {}", f, corner),
                    })?;
                    let (phi, _) = aim_at(&frame, &polyhedron.vertices()[*vertex])?;
                    frame * Transform::rotation_z_degrees(phi)
                }
            };
            frames.push(aligned);
        }

        let face_transforms: Vec<Transform> = frames.iter().map(|frame| frame * &glyph_scale).collect();

        let (slots, slot_count) = match &placement {
            PlacementPolicy::FaceCentered => {
                let slots = face_transforms
                    .iter()
                    .enumerate()
                    .map(|(f, t)| Slot {
                        face: f,
                        entry: f,
                        transform: *t,
                    })
                    .collect();
                (slots, polyhedron.faces().len())
            }
            PlacementPolicy::VertexCentered(numbering) => {
                Self::validate_numbering(&name, &polyhedron, numbering)?;
                let mut slots = Vec::new();
                for (f, face) in polyhedron.faces().iter().enumerate() {
                    for (c, &vertex) in face.indices().iter().enumerate() {
                        let (phi, offset) = aim_at(&frames[f], &polyhedron.vertices()[vertex])?;
                        let transform = frames[f]
                            * Transform::translation(offset * numbering.corner_offset)
                            * Transform::rotation_z_degrees(phi)
                            * glyph_scale;
                        slots.push(Slot {
                            face: f,
                            entry: numbering.table[f][c],
                            transform,
                        });
                    }
                }
                (slots, numbering.entry_count())
            }
        };

        let mut registry = GlyphMappingRegistry::new(name.clone(), slot_count);
        for mapping in mappings {
            registry.register(mapping)?;
        }
        for binding in &die_types {
            registry.resolve(&binding.mapping)?;
        }

        debug!(
            model = %name,
            faces = polyhedron.faces().len(),
            slots = slots.len(),
            "built die model"
        );

        Ok(Self {
            name,
            polyhedron,
            die_size,
            font_size,
            placement,
            die_types,
            face_transforms,
            slots,
            registry,
        })
    }

    fn validate_numbering(name: &str, poly: &Polyhedron, numbering: &VertexNumbering) -> DiceResult<()> {
        let invalid = |reason: String| DiceError::InvalidPolyhedron {
            reason: format!("model '{}': {}", name, reason),
        };
        if numbering.table.len() != poly.faces().len() {
            return Err(invalid(format!(
                "numbering table has {} rows for {} faces",
                numbering.table.len(),
                poly.faces().len()
            )));
        }
        for (f, (row, face)) in numbering.table.iter().zip(poly.faces()).enumerate() {
            if row.len() != face.len() {
                return Err(invalid(format!(
                    "numbering row {} has {} entries for {} corners",
                    f,
                    row.len(),
                    face.len()
                )));
            }
        }
        if !(numbering.corner_offset.is_finite() && (0.0..1.0).contains(&numbering.corner_offset)) {
            return Err(invalid(format!(
                "corner offset {} is outside [0, 1)",
                numbering.corner_offset
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polyhedron(&self) -> &Polyhedron {
        &self.polyhedron
    }

    pub fn die_size(&self) -> f64 {
        self.die_size
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn placement(&self) -> &PlacementPolicy {
        &self.placement
    }

    /// Per-face frames, already scaled from asset height to font size.
    pub fn face_transforms(&self) -> &[Transform] {
        &self.face_transforms
    }

    /// Entries every mapping of this model must have.
    pub fn slot_count(&self) -> usize {
        self.registry.slot_count()
    }

    /// Glyphs placed per instance.
    pub fn placement_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn die_types(&self) -> impl Iterator<Item = DieType> + '_ {
        self.die_types.iter().map(|b| b.die_type)
    }

    pub fn supports(&self, die_type: DieType) -> bool {
        self.die_types.iter().any(|b| b.die_type == die_type)
    }

    /// Mapping used for `die_type` when the caller names none.
    pub fn default_mapping_for(&self, die_type: DieType) -> DiceResult<&str> {
        self.die_types
            .iter()
            .find(|b| b.die_type == die_type)
            .map(|b| b.mapping.as_str())
            .ok_or_else(|| DiceError::IncompatibleDieType {
                model: self.name.clone(),
                requested: die_type.to_string(),
            })
    }

    pub fn mapping_names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    pub fn resolve_mapping(&self, name: &str) -> DiceResult<&GlyphMapping> {
        self.registry.resolve(name)
    }

    pub fn register_mapping(&mut self, mapping: GlyphMapping) -> DiceResult<()> {
        self.registry.register(mapping)
    }

    /// Die and font scale, each derived only from its own override.
    pub fn resolve_scales(&self, die_size: Option<f64>, font_size: Option<f64>) -> DiceResult<ScaleFactors> {
        let die_scale = match die_size {
            Some(size) => check_size("die_size", size)? / self.die_size,
            None => 1.0,
        };
        let font_scale = match font_size {
            Some(size) => check_size("font_size", size)? / self.font_size,
            None => 1.0,
        };
        Ok(ScaleFactors { die_scale, font_scale })
    }

    /// Shift that keeps a slot's glyph flush with its face once the base solid
    /// is scaled by `die_scale`. `None` for a slot the model does not have.
    pub fn coplanarity_offset(&self, slot: usize, die_scale: f64) -> Option<Transform> {
        self.slots.get(slot).map(|s| s.coplanarity_offset(die_scale))
    }
}

impl Slot {
    pub(crate) fn coplanarity_offset(&self, die_scale: f64) -> Transform {
        Transform::translation(self.transform.origin().coords * (die_scale - 1.0))
    }
}
