//! Plain data exchanged with a kernel: glyph outlines going in, meshes coming
//! out.

use serde::{Deserialize, Serialize};

/// A point in glyph outline space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// A 2D polygon with optional holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon2D {
    /// Outer boundary (counter-clockwise winding).
    pub exterior: Vec<Point2D>,
    /// Inner holes (clockwise winding).
    pub interiors: Vec<Vec<Point2D>>,
}

impl Polygon2D {
    pub fn new(exterior: Vec<Point2D>) -> Self {
        Self {
            exterior,
            interiors: Vec::new(),
        }
    }

    /// Axis-aligned rectangle from its lower-left corner and size.
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(vec![
            Point2D::new(x, y),
            Point2D::new(x + width, y),
            Point2D::new(x + width, y + height),
            Point2D::new(x, y + height),
        ])
    }

    pub fn from_arrays(exterior: &[[f64; 2]], interiors: &[Vec<[f64; 2]>]) -> Self {
        Self {
            exterior: exterior.iter().copied().map(Point2D::from).collect(),
            interiors: interiors
                .iter()
                .map(|hole| hole.iter().copied().map(Point2D::from).collect())
                .collect(),
        }
    }

    /// Twice the signed area of the exterior; positive when counter-clockwise.
    pub fn signed_area2(&self) -> f64 {
        let n = self.exterior.len();
        (0..n)
            .map(|i| {
                let a = self.exterior[i];
                let b = self.exterior[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum()
    }
}

/// Extrusion of an outline along local +z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeParams {
    pub distance: f64,
    /// z of the outline before the sweep starts.
    pub start_offset: f64,
}

impl ExtrudeParams {
    pub fn linear(distance: f64) -> Self {
        Self {
            distance,
            start_offset: 0.0,
        }
    }

    pub fn with_start_offset(mut self, offset: f64) -> Self {
        self.start_offset = offset;
        self
    }
}

/// Output triangle mesh from tessellation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub positions: Vec<[f64; 3]>,
    /// Each triple indexes `positions`.
    pub triangles: Vec<[u32; 3]>,
    /// Per-triangle topological face ID.
    /// Triangles with the same face_id belong to the same logical face.
    pub face_ids: Vec<u32>,
}

impl TriangleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, position: [f64; 3]) -> u32 {
        let idx = self.positions.len() as u32;
        self.positions.push(position);
        idx
    }

    /// Add a triangle with an associated topological face ID.
    pub fn add_triangle_with_face(&mut self, triangle: [u32; 3], face_id: u32) {
        self.triangles.push(triangle);
        self.face_ids.push(face_id);
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}
