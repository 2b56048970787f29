//! Named glyph mappings: which glyph, at which rotation, goes on each
//! placement slot of a model.

use super::error::{DiceError, DiceResult};
use crate::geometry::Polyhedron;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAPPING: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphMapping {
    pub name: String,
    pub glyph_ids: Vec<String>,
    /// Rotation of each glyph about the face normal, in degrees.
    pub angles: Vec<f64>,
}

impl GlyphMapping {
    pub fn new(name: impl Into<String>, glyph_ids: Vec<String>, angles: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            glyph_ids,
            angles,
        }
    }

    /// Labels with every angle zero.
    pub fn with_labels<S: Into<String>>(name: impl Into<String>, labels: impl IntoIterator<Item = S>) -> Self {
        let glyph_ids: Vec<String> = labels.into_iter().map(Into::into).collect();
        let angles = vec![0.0; glyph_ids.len()];
        Self::new(name, glyph_ids, angles)
    }

    /// `"1"`, `"2"`, ... `n`, all upright.
    pub fn sequential(name: impl Into<String>, count: usize) -> Self {
        Self::with_labels(name, (1..=count).map(|i| i.to_string()))
    }

    /// Opposite faces sum to `n + 1`. Faces are visited in order; each
    /// unassigned face takes the lowest free number and its opposite the
    /// complement.
    pub fn opposed(name: impl Into<String>, poly: &Polyhedron) -> DiceResult<Self> {
        let n = poly.faces().len();
        let mut values = vec![0usize; n];
        let mut next = 1;
        for f in 0..n {
            if values[f] != 0 {
                continue;
            }
            let opposite = poly
                .opposite_face(f)
                .filter(|&o| values[o] == 0)
                .ok_or_else(|| DiceError::InvalidPolyhedron {
                    reason: format!("face {} has no free opposite face", f),
                })?;
            values[f] = next;
            values[opposite] = n + 1 - next;
            next += 1;
        }
        Ok(Self::with_labels(name, values.iter().map(|v| v.to_string())))
    }

    /// Copy of this mapping under a new name with every glyph rewritten.
    pub fn relabeled(&self, name: impl Into<String>, relabel: impl Fn(&str) -> String) -> Self {
        Self {
            name: name.into(),
            glyph_ids: self.glyph_ids.iter().map(|g| relabel(g.as_str())).collect(),
            angles: self.angles.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.glyph_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyph_ids.is_empty()
    }
}

/// Name → mapping store for one model, seeded with `"default"`.
/// Registration is additive; there is no removal.
#[derive(Debug, Clone)]
pub struct GlyphMappingRegistry {
    model: String,
    slot_count: usize,
    mappings: Vec<GlyphMapping>,
}

impl GlyphMappingRegistry {
    pub fn new(model: impl Into<String>, slot_count: usize) -> Self {
        Self {
            model: model.into(),
            slot_count,
            mappings: vec![GlyphMapping::sequential(DEFAULT_MAPPING, slot_count)],
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Rejects mappings whose arrays do not both match the slot count, and
    /// names that are already taken. Nothing is stored on failure.
    pub fn register(&mut self, mapping: GlyphMapping) -> DiceResult<()> {
        for actual in [mapping.glyph_ids.len(), mapping.angles.len()] {
            if actual != self.slot_count {
                return Err(DiceError::MappingArity {
                    model: self.model.clone(),
                    mapping: mapping.name,
                    expected: self.slot_count,
                    actual,
                });
            }
        }
        if self.get(&mapping.name).is_some() {
            return Err(DiceError::DuplicateMapping {
                model: self.model.clone(),
                name: mapping.name,
            });
        }
        self.mappings.push(mapping);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&GlyphMapping> {
        self.mappings.iter().find(|m| m.name == name)
    }

    pub fn resolve(&self, name: &str) -> DiceResult<&GlyphMapping> {
        self.get(name).ok_or_else(|| DiceError::UnknownMapping {
            model: self.model.clone(),
            name: name.to_string(),
        })
    }

    /// Mapping names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(|m| m.name.as_str())
    }
}
