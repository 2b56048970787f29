//! Affine transforms used to place glyphs on die faces.
//!
//! A [`Transform`] wraps a homogeneous 4x4 matrix. Composition follows the
//! usual matrix convention: `a * b` applies `b` first, then `a`.

use super::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform(Matrix4);

impl Transform {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    pub fn from_matrix(matrix: Matrix4) -> Self {
        Self(matrix)
    }

    pub fn translation(offset: Vector3) -> Self {
        Self(Matrix4::new_translation(&offset))
    }

    /// Uniform scaling about the origin.
    pub fn scaling(factor: f64) -> Self {
        Self(Matrix4::new_scaling(factor))
    }

    /// Rotation about the local z axis. Positive angles are counter-clockwise
    /// when looking down the z axis toward the origin.
    pub fn rotation_z_degrees(degrees: f64) -> Self {
        let axis = Vector3::z_axis();
        Self(Matrix4::from_axis_angle(&axis, degrees.to_radians()))
    }

    /// Build the transform that maps the canonical basis onto `x`, `y`, `z`
    /// and the origin onto `origin`.
    pub fn from_frame(x: Vector3, y: Vector3, z: Vector3, origin: Point3) -> Self {
        #[rustfmt::skip]
        let m = Matrix4::new(
            x.x, y.x, z.x, origin.x,
            x.y, y.y, z.y, origin.y,
            x.z, y.z, z.z, origin.z,
            0.0, 0.0, 0.0, 1.0,
        );
        Self(m)
    }

    pub fn matrix(&self) -> &Matrix4 {
        &self.0
    }

    pub fn try_inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }

    pub fn transform_point(&self, p: &Point3) -> Point3 {
        self.0.transform_point(p)
    }

    pub fn transform_vector(&self, v: &Vector3) -> Vector3 {
        self.0.transform_vector(v)
    }

    pub fn origin(&self) -> Point3 {
        Point3::new(self.0[(0, 3)], self.0[(1, 3)], self.0[(2, 3)])
    }

    pub fn axis_x(&self) -> Vector3 {
        self.0.fixed_view::<3, 1>(0, 0).into_owned()
    }

    pub fn axis_y(&self) -> Vector3 {
        self.0.fixed_view::<3, 1>(0, 1).into_owned()
    }

    pub fn axis_z(&self) -> Vector3 {
        self.0.fixed_view::<3, 1>(0, 2).into_owned()
    }

    /// Columns as `[[f64; 4]; 4]`, the layout cgmath expects.
    pub fn to_cols_array(&self) -> [[f64; 4]; 4] {
        let m = &self.0;
        [
            [m[(0, 0)], m[(1, 0)], m[(2, 0)], m[(3, 0)]],
            [m[(0, 1)], m[(1, 1)], m[(2, 1)], m[(3, 1)]],
            [m[(0, 2)], m[(1, 2)], m[(2, 2)], m[(3, 2)]],
            [m[(0, 3)], m[(1, 3)], m[(2, 3)], m[(3, 3)]],
        ]
    }

    pub fn is_identity(&self, tolerance: f64) -> bool {
        (self.0 - Matrix4::identity()).amax() <= tolerance
    }

    /// Finite entries and a bottom row of `0 0 0 1`.
    pub fn is_affine(&self) -> bool {
        self.0.iter().all(|v| v.is_finite()) && self.0.row(3).iter().eq([0.0, 0.0, 0.0, 1.0].iter())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform(self.0 * rhs.0)
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Transform {
        Transform(self.0 * rhs.0)
    }
}
