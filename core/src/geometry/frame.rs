//! Face frame solver.
//!
//! Every face gets an orthonormal, right-handed frame centred on its
//! centroid:
//! - `z` is the unit outward normal (Newell's method, so winding decides sign).
//! - `y` points from the midpoint of the face's first edge to the centroid.
//! - `x = y × z`.
//!
//! Glyphs authored upright in the local XY plane therefore stand on the
//! first edge of the face.

use super::{Point3, Polyhedron, Transform, Vector3};
use thiserror::Error;

/// Lengths below this are treated as zero when building a frame.
pub const DEGENERATE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("face {face} is degenerate: {reason}")]
pub struct DegenerateFace {
    pub face: usize,
    pub reason: &'static str,
}

/// Area-weighted polygon normal. Its length is twice the polygon area, so a
/// zero-length result means a collinear or zero-area polygon.
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let mut n = Vector3::zeros();
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n
}

pub fn face_frame(poly: &Polyhedron, face: usize) -> Result<Transform, DegenerateFace> {
    let points = poly.face_positions(face);
    let centroid = poly.centroid(face);

    let z = newell_normal(&points)
        .try_normalize(DEGENERATE_EPSILON)
        .ok_or(DegenerateFace { face, reason: "polygon has no area" })?;

    let edge_midpoint = Point3::from((points[0].coords + points[1].coords) * 0.5);
    let mut y = centroid - edge_midpoint;
    // Keep y in the face plane for faces that are only nearly planar.
    y -= z * y.dot(&z);
    let y = y
        .try_normalize(DEGENERATE_EPSILON)
        .ok_or(DegenerateFace { face, reason: "first edge passes through the centroid" })?;

    let x = y.cross(&z).normalize();

    Ok(Transform::from_frame(x, y, z, centroid))
}
