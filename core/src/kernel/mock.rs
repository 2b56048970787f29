//! MockKernel: deterministic test double implementing GeometryKernel.
//!
//! Solids are plain polygon soups. Transforms and bounds are exact, emboss
//! keeps the base geometry and only records how many cutters it received.
//! Call counters let tests assert that failed requests never reach emboss.

use super::types::*;
use super::{GeometryKernel, KernelOpError, KernelResult};
use crate::geometry::{Aabb, Point3, Polyhedron, Transform};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A polygon soup with a record of the cutters embossed into it.
#[derive(Debug, Clone, PartialEq)]
pub struct MockSolid {
    pub positions: Vec<Point3>,
    pub faces: Vec<Vec<usize>>,
    pub cutters: usize,
}

impl MockSolid {
    fn append(&mut self, other: &MockSolid) {
        let offset = self.positions.len();
        self.positions.extend(other.positions.iter().copied());
        self.faces
            .extend(other.faces.iter().map(|f| f.iter().map(|i| i + offset).collect()));
        self.cutters += other.cutters;
    }
}

#[derive(Debug, Default)]
pub struct MockKernel {
    emboss_calls: AtomicUsize,
    combine_calls: AtomicUsize,
}

impl MockKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `boolean_emboss` has been called.
    pub fn emboss_calls(&self) -> usize {
        self.emboss_calls.load(Ordering::SeqCst)
    }

    /// Number of times `combine` has been called.
    pub fn combine_calls(&self) -> usize {
        self.combine_calls.load(Ordering::SeqCst)
    }
}

impl GeometryKernel for MockKernel {
    type Solid = MockSolid;

    fn polyhedron_solid(&self, poly: &Polyhedron) -> KernelResult<Self::Solid> {
        Ok(MockSolid {
            positions: poly.vertices().to_vec(),
            faces: poly.faces().iter().map(|f| f.indices().to_vec()).collect(),
            cutters: 0,
        })
    }

    fn extrude_polygon(&self, polygon: &Polygon2D, params: &ExtrudeParams) -> KernelResult<Self::Solid> {
        let n = polygon.exterior.len();
        if n < 3 {
            return Err(KernelOpError::InvalidGeometry(
                "Polygon must have at least 3 vertices".into()
            ));
        }
        let at = |p: &Point2D, z: f64| Point3::new(p.x, p.y, z);

        let start = params.start_offset;
        let end = start + params.distance;
        let mut positions: Vec<Point3> = polygon.exterior.iter().map(|p| at(p, start)).collect();
        positions.extend(polygon.exterior.iter().map(|p| at(p, end)));

        let mut faces = vec![(0..n).rev().collect::<Vec<_>>(), (n..2 * n).collect()];
        for i in 0..n {
            let j = (i + 1) % n;
            faces.push(vec![i, j, n + j, n + i]);
        }
        Ok(MockSolid { positions, faces, cutters: 0 })
    }

    fn transform_solid(&self, solid: &Self::Solid, transform: &Transform) -> KernelResult<Self::Solid> {
        Ok(MockSolid {
            positions: solid.positions.iter().map(|p| transform.transform_point(p)).collect(),
            faces: solid.faces.clone(),
            cutters: solid.cutters,
        })
    }

    fn combine(&self, parts: &[Self::Solid]) -> KernelResult<Self::Solid> {
        self.combine_calls.fetch_add(1, Ordering::SeqCst);
        let (first, rest) = parts
            .split_first()
            .ok_or_else(|| KernelOpError::InvalidGeometry("Nothing to combine".into()))?;
        let mut combined = first.clone();
        for part in rest {
            combined.append(part);
        }
        Ok(combined)
    }

    fn bounds(&self, solid: &Self::Solid) -> KernelResult<Aabb> {
        if solid.positions.is_empty() {
            return Err(KernelOpError::InvalidGeometry("Solid has no vertices".into()));
        }
        Ok(Aabb::from_points(&solid.positions))
    }

    fn boolean_emboss(&self, base: &Self::Solid, cutters: &[Self::Solid]) -> KernelResult<Self::Solid> {
        self.emboss_calls.fetch_add(1, Ordering::SeqCst);
        let mut result = base.clone();
        result.cutters += cutters.len();
        Ok(result)
    }

    fn tessellate(&self, solid: &Self::Solid) -> KernelResult<TriangleMesh> {
        let mut mesh = TriangleMesh::new();
        for p in &solid.positions {
            mesh.add_vertex([p.x, p.y, p.z]);
        }
        // fan triangulation; every face is convex
        for (face_id, face) in solid.faces.iter().enumerate() {
            for k in 1..face.len().saturating_sub(1) {
                mesh.add_triangle_with_face(
                    [face[0] as u32, face[k] as u32, face[k + 1] as u32],
                    face_id as u32,
                );
            }
        }
        Ok(mesh)
    }

    fn export_step(&self, _solid: &Self::Solid) -> KernelResult<String> {
        Err(KernelOpError::NotImplemented(
            "MockKernel does not export STEP".into()
        ))
    }
}
