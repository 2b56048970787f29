//! Die instantiation: resolve, place, emboss.
//!
//! Every validation (die type, sizes, mapping, glyph lookup) happens before the
//! kernel is asked to emboss, so a failed request never pays for a boolean.

use super::error::{DiceError, DiceResult};
use super::mapping::GlyphMapping;
use super::model::{DieModel, ScaleFactors};
use super::DieType;
use crate::font::Font;
use crate::geometry::Transform;
use crate::kernel::GeometryKernel;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

fn default_scale() -> f64 {
    1.0
}

/// Per-request parameters for [`DieModel::create_instance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceOptions {
    pub die_type: DieType,
    /// Named mapping; the die type's bound mapping when absent.
    #[serde(default)]
    pub mapping: Option<String>,
    #[serde(default)]
    pub die_size: Option<f64>,
    #[serde(default)]
    pub font_size: Option<f64>,
    /// Applied to the finished solid, after `scale`.
    #[serde(default)]
    pub transform: Transform,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl InstanceOptions {
    pub fn new(die_type: DieType) -> Self {
        Self {
            die_type,
            mapping: None,
            die_size: None,
            font_size: None,
            transform: Transform::identity(),
            scale: 1.0,
        }
    }

    pub fn with_mapping(mut self, mapping: impl Into<String>) -> Self {
        self.mapping = Some(mapping.into());
        self
    }

    pub fn with_die_size(mut self, size: f64) -> Self {
        self.die_size = Some(size);
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// A glyph's planned position before any kernel work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedSlot {
    pub slot: usize,
    pub face: usize,
    pub glyph: String,
    /// Mapping rotation in degrees.
    pub angle: f64,
    pub transform: Transform,
}

/// Record of one embossed glyph. The glyph geometry itself is not kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedGlyph {
    pub slot: usize,
    pub glyph: String,
    pub transform: Transform,
}

/// A finished die. Owned by the caller; the engine keeps no reference to it.
#[derive(Debug, Clone)]
pub struct DieInstance<S> {
    pub model: String,
    pub die_type: DieType,
    pub mapping: String,
    pub die_scale: f64,
    pub font_scale: f64,
    pub placements: Vec<PlacedGlyph>,
    pub solid: S,
}

impl DieModel {
    fn resolve_request(&self, options: &InstanceOptions) -> DiceResult<(ScaleFactors, &GlyphMapping)> {
        if !self.supports(options.die_type) {
            return Err(DiceError::IncompatibleDieType {
                model: self.name().to_string(),
                requested: options.die_type.to_string(),
            });
        }
        if !(options.scale.is_finite() && options.scale > 0.0) {
            return Err(DiceError::InvalidSize {
                what: "scale",
                value: options.scale,
            });
        }
        if !options.transform.is_affine() {
            return Err(DiceError::InvalidTransform {
                reason: "must be finite with a bottom row of 0 0 0 1",
            });
        }
        if options.transform.try_inverse().is_none() {
            return Err(DiceError::InvalidTransform { reason: "is singular" });
        }
        let scales = self.resolve_scales(options.die_size, options.font_size)?;
        let name = match &options.mapping {
            Some(name) => name.as_str(),
            None => self.default_mapping_for(options.die_type)?,
        };
        let mapping = self.resolve_mapping(name)?;
        Ok((scales, mapping))
    }

    fn plan(&self, scales: ScaleFactors, mapping: &GlyphMapping) -> Vec<PlannedSlot> {
        let font_scale = Transform::scaling(scales.font_scale);
        self.slots()
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                let angle = mapping.angles[slot.entry];
                let transform = slot.coplanarity_offset(scales.die_scale)
                    * slot.transform
                    * Transform::rotation_z_degrees(angle)
                    * font_scale;
                PlannedSlot {
                    slot: i,
                    face: slot.face,
                    glyph: mapping.glyph_ids[slot.entry].clone(),
                    angle,
                    transform,
                }
            })
            .collect()
    }

    /// Resolves and places every glyph without touching a kernel.
    pub fn plan_placements(&self, options: &InstanceOptions) -> DiceResult<Vec<PlannedSlot>> {
        let (scales, mapping) = self.resolve_request(options)?;
        Ok(self.plan(scales, mapping))
    }

    pub fn create_instance<K: GeometryKernel>(
        &self,
        kernel: &K,
        font: &Font<K>,
        options: &InstanceOptions,
    ) -> DiceResult<DieInstance<K::Solid>> {
        let (scales, mapping) = self.resolve_request(options)?;
        debug!(
            model = %self.name(),
            die_type = %options.die_type,
            mapping = %mapping.name,
            die_scale = scales.die_scale,
            font_scale = scales.font_scale,
            "resolved die request"
        );

        let planned = self.plan(scales, mapping);
        let mut glyphs = Vec::with_capacity(planned.len());
        for slot in &planned {
            glyphs.push(font.create_glyph(kernel, &slot.glyph, slot.transform)?);
        }
        debug!(model = %self.name(), glyphs = glyphs.len(), "placed glyphs");

        let base = kernel.polyhedron_solid(self.polyhedron())?;
        let base = kernel.transform_solid(&base, &Transform::scaling(scales.die_scale))?;
        let cutters = glyphs
            .iter()
            .map(|g| kernel.transform_solid(&g.asset, &g.transform))
            .collect::<Result<Vec<_>, _>>()?;
        let embossed = kernel.boolean_emboss(&base, &cutters)?;
        drop(cutters);

        let placement = options.transform * Transform::scaling(options.scale);
        let solid = kernel.transform_solid(&embossed, &placement)?;

        info!(
            model = %self.name(),
            die_type = %options.die_type,
            placements = planned.len(),
            "created die instance"
        );

        Ok(DieInstance {
            model: self.name().to_string(),
            die_type: options.die_type,
            mapping: mapping.name.clone(),
            die_scale: scales.die_scale,
            font_scale: scales.font_scale,
            placements: planned
                .into_iter()
                .map(|p| PlacedGlyph {
                    slot: p.slot,
                    glyph: p.glyph,
                    transform: p.transform,
                })
                .collect(),
            solid,
        })
    }
}
