//! Truck-based implementation of the geometry kernel.
//!
//! This module provides a CAD kernel implementation using the Truck library,
//! which is licensed under Apache-2.0 (MIT-compatible).

use super::types::*;
use super::{GeometryKernel, KernelOpError, KernelResult};
use crate::geometry::{Aabb, Point3 as GeoPoint3, Polyhedron, Transform};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

// Use truck's pre-exported types which come from cgmath64
use truck_meshalgo::tessellation::MeshableShape;
use truck_modeling::{builder, Edge, Point3, Shell, ShellCondition, Solid, Vector3, Vertex, Wire};

/// Truck-based CAD kernel implementation.
pub struct TruckKernel {
    /// Tolerance for booleans and mesh generation.
    pub tolerance: f64,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            tolerance: 0.01, // 0.01mm precision
        }
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn to_matrix(transform: &Transform) -> cgmath::Matrix4<f64> {
    cgmath::Matrix4::from(transform.to_cols_array())
}

impl GeometryKernel for TruckKernel {
    type Solid = Solid;

    fn polyhedron_solid(&self, poly: &Polyhedron) -> KernelResult<Self::Solid> {
        let vertices: Vec<Vertex> = poly
            .vertices()
            .iter()
            .map(|p| builder::vertex(Point3::new(p.x, p.y, p.z)))
            .collect();

        // Neighbouring faces must share the same edge, traversed in opposite
        // directions, for the shell to close.
        let mut edges: HashMap<(usize, usize), Edge> = HashMap::new();
        let mut faces = Vec::with_capacity(poly.faces().len());
        for (f, face) in poly.faces().iter().enumerate() {
            let idx = face.indices();
            let wire: Wire = (0..idx.len())
                .map(|i| {
                    let (a, b) = (idx[i], idx[(i + 1) % idx.len()]);
                    let key = (a.min(b), a.max(b));
                    let edge = edges
                        .entry(key)
                        .or_insert_with(|| builder::line(&vertices[key.0], &vertices[key.1]));
                    if a < b {
                        edge.clone()
                    } else {
                        edge.inverse()
                    }
                })
                .collect();
            let face = builder::try_attach_plane(&[wire])
                .map_err(|e| KernelOpError::InvalidGeometry(format!("Failed to create face {}: {:?}", f, e)))?;
            faces.push(face);
        }

        let shell = Shell::from(faces);
        Solid::try_new(vec![shell])
            .map_err(|e| KernelOpError::InvalidGeometry(format!("Polyhedron is not a closed solid: {:?}", e)))
    }

    fn extrude_polygon(&self, polygon: &Polygon2D, params: &ExtrudeParams) -> KernelResult<Self::Solid> {
        if polygon.exterior.len() < 3 {
            return Err(KernelOpError::InvalidGeometry(
                "Polygon must have at least 3 vertices".into()
            ));
        }

        let mut all_wires = vec![self.build_wire_from_points(&polygon.exterior)?];
        for hole in &polygon.interiors {
            if hole.len() >= 3 {
                all_wires.push(self.build_wire_from_points(hole)?);
            }
        }
        let face = builder::try_attach_plane(&all_wires)
            .map_err(|e| KernelOpError::OperationFailed(format!("Failed to create face: {:?}", e)))?;

        let dir = Vector3::unit_z();
        let face = if params.start_offset != 0.0 {
            builder::translated(&face, dir * params.start_offset)
        } else {
            face
        };

        // Sweep to create solid
        let solid = builder::tsweep(&face, dir * params.distance);

        Ok(solid)
    }

    fn transform_solid(&self, solid: &Self::Solid, transform: &Transform) -> KernelResult<Self::Solid> {
        Ok(builder::transformed(solid, to_matrix(transform)))
    }

    fn combine(&self, parts: &[Self::Solid]) -> KernelResult<Self::Solid> {
        let shells: Vec<Shell> = parts
            .iter()
            .flat_map(|solid| solid.boundaries().iter().cloned())
            .collect();
        if shells.is_empty() {
            return Err(KernelOpError::InvalidGeometry("Nothing to combine".into()));
        }
        Solid::try_new(shells)
            .map_err(|e| KernelOpError::OperationFailed(format!("Failed to combine solids: {:?}", e)))
    }

    fn bounds(&self, solid: &Self::Solid) -> KernelResult<Aabb> {
        let mut aabb = Aabb::empty();
        for shell in solid.boundaries() {
            for vertex in shell.vertex_iter() {
                let p = vertex.point();
                aabb.extend(&GeoPoint3::new(p.x, p.y, p.z));
            }
        }
        if aabb.is_empty() {
            return Err(KernelOpError::InvalidGeometry("Solid has no vertices".into()));
        }
        Ok(aabb)
    }

    fn boolean_emboss(&self, base: &Self::Solid, cutters: &[Self::Solid]) -> KernelResult<Self::Solid> {
        let mut result = base.clone();
        let extent = self.bounds(base)?;
        for (i, cutter) in cutters.iter().enumerate() {
            // Shells are cut one at a time so every step can be checked.
            for shell in cutter.boundaries() {
                let piece = Solid::new_unchecked(vec![shell.clone()]);
                if !self.bounds(&piece)?.intersects(&extent) {
                    debug!(cutter = i, "cutter misses the solid, skipped");
                    continue;
                }
                result = self
                    .subtract(&result, &piece, &extent)
                    .ok_or_else(|| KernelOpError::OperationFailed(format!("Boolean emboss of cutter {} failed", i)))?;
            }
            debug!(cutter = i, "embossed glyph");
        }
        Ok(result)
    }

    fn tessellate(&self, solid: &Self::Solid) -> KernelResult<TriangleMesh> {
        // triangulation returns a Solid<Point3, PolylineCurve, Option<PolygonMesh>>
        // where each face has an Option<PolygonMesh> instead of Surface
        let meshed_solid = solid.triangulation(self.tolerance);

        // Collect all meshes from all faces into one unified mesh
        let mut mesh = TriangleMesh::new();
        let mut vertex_offset: u32 = 0;
        let mut face_id: u32 = 0;

        for shell in meshed_solid.boundaries() {
            // Each iteration of face_iter() gives a topological face
            for face in shell.face_iter() {
                if let Some(polygon_mesh) = face.surface() {
                    let positions = polygon_mesh.positions();
                    for pos in positions.iter() {
                        mesh.add_vertex([pos.x, pos.y, pos.z]);
                    }

                    for tri in polygon_mesh.tri_faces() {
                        let triangle = [tri[0].pos, tri[1].pos, tri[2].pos].map(|p| vertex_offset + p as u32);
                        mesh.add_triangle_with_face(triangle, face_id);
                    }

                    vertex_offset += positions.len() as u32;
                }
                // Increment face_id for each topological face (whether it had mesh data or not)
                face_id += 1;
            }
        }

        if mesh.triangles.is_empty() {
            return Err(KernelOpError::TessellationFailed("No triangles produced".into()));
        }
        Ok(mesh)
    }

    fn export_step(&self, solid: &Self::Solid) -> KernelResult<String> {
        use truck_stepio::out::{CompleteStepDisplay, StepHeaderDescriptor, StepModels};

        // 1. Compress the solid (required for STEP export)
        let compressed = solid.compress();

        // 2. StepModels implements FromIterator for &CompressedSolid
        let models: StepModels<_, _, _> = std::iter::once(&compressed).collect();

        let header = StepHeaderDescriptor {
            file_name: "die.step".to_string(),
            time_stamp: "2024-01-01T00:00:00".to_string(),
            authors: vec!["dice-core".to_string()],
            organization: vec![],
            organization_system: "truck".to_string(),
            authorization: "".to_string(),
        };

        let display = CompleteStepDisplay::new(models, header);
        Ok(display.to_string())
    }
}

/// Tolerance multipliers tried in turn for one boolean step. The last
/// attempts also nudge the cutter by a few tolerances along `NUDGE`.
const ATTEMPTS: [(f64, f64); 5] = [(1.0, 0.0), (0.5, 0.0), (2.0, 0.0), (1.0, 3.0), (0.5, -3.0)];

const NUDGE: [f64; 3] = [0.577, 0.408, 0.707];

fn face_count(solid: &Solid) -> usize {
    solid.boundaries().iter().map(|shell| shell.face_iter().count()).sum()
}

/// `cut` lies inside `base` and still spans most of it. A cut that lost the
/// base keeps only the cutter, which fails the second test.
fn plausible_extent(cut: &Aabb, base: &Aabb, tolerance: f64) -> bool {
    let inside = (base.min - cut.min).max() <= tolerance && (cut.max - base.max).max() <= tolerance;
    let span = |b: &Aabb| b.max - b.min;
    inside && span(cut).iter().zip(span(base).iter()).all(|(c, b)| *c >= 0.5 * *b)
}

impl TruckKernel {
    /// `base - piece`, where `piece` is a single closed shell.
    ///
    /// `truck_shapeops::and` can panic, or hand back a shell that lost the
    /// base entirely when it misclassifies faces. A step is accepted only if
    /// the result is one closed shell with more faces than `base` that still
    /// fills its bounds.
    fn subtract(&self, base: &Solid, piece: &Solid, extent: &Aabb) -> Option<Solid> {
        let before = face_count(base);
        for (attempt, &(scale, nudge)) in ATTEMPTS.iter().enumerate() {
            let tolerance = self.tolerance * scale;
            let mut complement = if nudge == 0.0 {
                piece.clone()
            } else {
                let offset = Vector3::new(NUDGE[0], NUDGE[1], NUDGE[2]) * (nudge * self.tolerance);
                builder::translated(piece, offset)
            };
            complement.not();

            let outcome = catch_unwind(AssertUnwindSafe(|| truck_shapeops::and(base, &complement, tolerance)));
            match outcome {
                Ok(Some(cut))
                    if cut.boundaries().len() == 1
                        && cut.boundaries()[0].shell_condition() == ShellCondition::Closed
                        && face_count(&cut) > before
                        && self.bounds(&cut).is_ok_and(|b| plausible_extent(&b, extent, tolerance * 10.0)) =>
                {
                    return Some(cut);
                }
                Ok(Some(_)) => debug!(attempt, tolerance, "boolean step gave a malformed solid"),
                Ok(None) => debug!(attempt, tolerance, "boolean step found no result"),
                Err(_) => warn!(attempt, tolerance, "boolean step panicked"),
            }
        }
        None
    }

    /// Build a closed truck Wire from 2D points (as 3D with z=0).
    fn build_wire_from_points(&self, points: &[Point2D]) -> KernelResult<Wire> {
        if points.len() < 3 {
            return Err(KernelOpError::InvalidGeometry(
                "Wire requires at least 3 points".into()
            ));
        }

        let mut vertices: Vec<Vertex> = points
            .iter()
            .map(|p| builder::vertex(Point3::new(p.x, p.y, 0.0)))
            .collect();

        // Close the loop
        vertices.push(vertices[0].clone());

        let mut edges = Vec::with_capacity(vertices.len() - 1);
        for i in 0..vertices.len() - 1 {
            edges.push(builder::line(&vertices[i], &vertices[i + 1]));
        }

        let wire = Wire::from_iter(edges);
        Ok(wire)
    }
}
