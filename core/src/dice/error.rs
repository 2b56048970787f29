//! Errors raised by the dice engine.
//!
//! Every failure is reported before any boolean work is handed to the
//! geometry kernel, so a failed request never leaves partial geometry.

use crate::kernel::KernelOpError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DiceError {
    #[error("model '{model}': face {face} is degenerate ({reason})")]
    DegenerateFace {
        model: String,
        face: usize,
        reason: &'static str,
    },

    #[error("invalid polyhedron: {reason}")]
    InvalidPolyhedron { reason: String },

    #[error("model '{model}': mapping '{mapping}' has {actual} entries, expected {expected}")]
    MappingArity {
        model: String,
        mapping: String,
        expected: usize,
        actual: usize,
    },

    #[error("model '{model}' has no glyph mapping named '{name}'")]
    UnknownMapping { model: String, name: String },

    #[error("model '{model}' already has a glyph mapping named '{name}'")]
    DuplicateMapping { model: String, name: String },

    #[error("model '{model}' cannot produce a {requested} die")]
    IncompatibleDieType { model: String, requested: String },

    #[error("unknown die type '{token}'")]
    UnknownDieType { token: String },

    #[error("font '{font}' has no glyph '{glyph}'")]
    UnresolvedGlyph { font: String, glyph: String },

    #[error("{what} must be a positive finite number, got {value}")]
    InvalidSize { what: &'static str, value: f64 },

    #[error("placement transform {reason}")]
    InvalidTransform { reason: &'static str },

    #[error("failed to load glyphs for font '{font}': {reason}")]
    AssetLoad { font: String, reason: String },

    #[error("a model named '{name}' is already registered")]
    DuplicateModel { name: String },

    #[error(transparent)]
    Kernel(#[from] KernelOpError),
}

pub type DiceResult<T> = Result<T, DiceError>;
