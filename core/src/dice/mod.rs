//! Die models, glyph mappings and the instantiation pipeline.

pub mod catalog;
pub mod error;
pub mod mapping;
pub mod model;
pub mod pipeline;

#[cfg(test)]
mod tests_model;
#[cfg(test)]
mod tests_pipeline;

pub use catalog::Catalog;
pub use error::{DiceError, DiceResult};
pub use mapping::{GlyphMapping, GlyphMappingRegistry, DEFAULT_MAPPING};
pub use model::{
    DieModel, DieModelDef, DieTypeBinding, FaceAlignment, PlacementPolicy, ScaleFactors,
    VertexNumbering, GLYPH_ASSET_HEIGHT,
};
pub use pipeline::{DieInstance, InstanceOptions, PlacedGlyph, PlannedSlot};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numbering convention a model can be instantiated as. One solid may
/// support several (the ten-sided solid makes both D10 and D% dice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    /// Percentile die: a ten-sided solid numbered 00..90.
    Percentile,
}

impl DieType {
    pub const ALL: [DieType; 7] = [
        DieType::D4,
        DieType::D6,
        DieType::D8,
        DieType::D10,
        DieType::D12,
        DieType::D20,
        DieType::Percentile,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Self::D4 => "D4",
            Self::D6 => "D6",
            Self::D8 => "D8",
            Self::D10 => "D10",
            Self::D12 => "D12",
            Self::D20 => "D20",
            Self::Percentile => "D%",
        }
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for DieType {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.token() == s)
            .ok_or_else(|| DiceError::UnknownDieType { token: s.to_string() })
    }
}

// Serialized as its token ("D6", "D%") so requests read naturally.
impl Serialize for DieType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for DieType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}
