//! Kernel abstraction layer for the geometry the dice engine delegates.
//!
//! The engine never does boolean maths itself. It builds the base solid,
//! moves glyph assets into place and asks a [`GeometryKernel`] to emboss them.
//! Implementations can be swapped (Truck, test double) without touching the
//! engine.

pub mod types;
mod mock;
mod truck;

#[cfg(test)]
mod tests_boolean;

pub use mock::{MockKernel, MockSolid};
pub use truck::TruckKernel;
pub use types::*;

use crate::geometry::{Aabb, Polyhedron, Transform};
use thiserror::Error;

/// Errors that can occur during kernel operations.
#[derive(Debug, Error, Clone)]
pub enum KernelOpError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Tessellation failed: {0}")]
    TessellationFailed(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelOpError>;

/// Abstract interface for the geometry operations the engine consumes.
///
/// Kernels are passed explicitly into every call that needs one; there is no
/// process-wide "current document".
pub trait GeometryKernel: Send + Sync {
    /// The kernel's solid representation. Glyph assets are solids too.
    type Solid: Clone + Send + Sync;

    /// Build a closed solid from a polyhedron's vertex and face tables.
    fn polyhedron_solid(&self, poly: &Polyhedron) -> KernelResult<Self::Solid>;

    /// Extrude a 2D polygon along a direction to create a solid.
    ///
    /// # Arguments
    /// * `polygon` - The 2D polygon to extrude (with optional holes)
    /// * `params` - Extrusion parameters (distance, direction, start offset)
    fn extrude_polygon(&self, polygon: &Polygon2D, params: &ExtrudeParams) -> KernelResult<Self::Solid>;

    /// Return a copy of `solid` mapped through `transform`.
    fn transform_solid(&self, solid: &Self::Solid, transform: &Transform) -> KernelResult<Self::Solid>;

    /// Gather disjoint solids into one. Used to splice multi-character glyphs.
    fn combine(&self, parts: &[Self::Solid]) -> KernelResult<Self::Solid>;

    /// Axis-aligned bounds of a solid.
    fn bounds(&self, solid: &Self::Solid) -> KernelResult<Aabb>;

    /// Extent of a solid along x.
    fn bounding_width(&self, solid: &Self::Solid) -> KernelResult<f64> {
        Ok(self.bounds(solid)?.width())
    }

    /// Cut every cutter out of `base` (A - B1 - B2 - ...).
    fn boolean_emboss(&self, base: &Self::Solid, cutters: &[Self::Solid]) -> KernelResult<Self::Solid>;

    /// Convert a solid to a triangle mesh for rendering.
    fn tessellate(&self, solid: &Self::Solid) -> KernelResult<TriangleMesh>;

    /// Export a solid to STEP format and return as a string.
    fn export_step(&self, solid: &Self::Solid) -> KernelResult<String>;
}
