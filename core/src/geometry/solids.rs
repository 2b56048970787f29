//! Vertex/face tables for the standard dice solids.
//!
//! All solids are centred on the origin with outward (counter-clockwise)
//! winding. Sizes are arbitrary; the catalog rescales them.

use super::{newell_normal, Face, Point3, Polyhedron, Vector3, EPSILON};
use crate::dice::error::{DiceError, DiceResult};
use std::f64::consts::PI;

const PHI: f64 = 1.618_033_988_749_895;

pub fn tetrahedron() -> DiceResult<Polyhedron> {
    let vertices = vec![
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(1.0, -1.0, -1.0),
        Point3::new(-1.0, 1.0, -1.0),
        Point3::new(-1.0, -1.0, 1.0),
    ];
    let faces = vec![
        Face::new(vec![0, 1, 2]),
        Face::new(vec![0, 3, 1]),
        Face::new(vec![0, 2, 3]),
        Face::new(vec![1, 3, 2]),
    ];
    Ok(Polyhedron::new(vertices, faces)?.orient_outward())
}

/// Faces are ordered +z, +y, +x, -x, -y, -z so that face `i` and face `5 - i`
/// are opposite.
pub fn cube() -> DiceResult<Polyhedron> {
    // index bits: x = 1, y = 2, z = 4
    let vertices = (0..8usize)
        .map(|i| {
            let c = |bit: usize| if i & bit != 0 { 1.0 } else { -1.0 };
            Point3::new(c(1), c(2), c(4))
        })
        .collect();
    let faces = vec![
        Face::new(vec![4, 5, 7, 6]),
        Face::new(vec![2, 3, 7, 6]),
        Face::new(vec![1, 3, 7, 5]),
        Face::new(vec![0, 2, 6, 4]),
        Face::new(vec![0, 1, 5, 4]),
        Face::new(vec![0, 1, 3, 2]),
    ];
    Ok(Polyhedron::new(vertices, faces)?.orient_outward())
}

pub fn octahedron() -> DiceResult<Polyhedron> {
    dual(&cube()?)
}

pub fn icosahedron() -> DiceResult<Polyhedron> {
    let mut vertices = Vec::with_capacity(12);
    for &a in &[-1.0, 1.0] {
        for &b in &[-PHI, PHI] {
            vertices.push(Point3::new(0.0, a, b));
            vertices.push(Point3::new(a, b, 0.0));
            vertices.push(Point3::new(b, 0.0, a));
        }
    }

    // Edge length is 2; every face is a triple of mutually adjacent vertices.
    let adjacent = |i: usize, j: usize| ((vertices[i] - vertices[j]).norm_squared() - 4.0).abs() < 1e-9;
    let mut faces = Vec::with_capacity(20);
    for i in 0..12 {
        for j in (i + 1)..12 {
            if !adjacent(i, j) {
                continue;
            }
            for k in (j + 1)..12 {
                if adjacent(i, k) && adjacent(j, k) {
                    faces.push(Face::new(vec![i, j, k]));
                }
            }
        }
    }
    Ok(Polyhedron::new(vertices, faces)?.orient_outward())
}

pub fn dodecahedron() -> DiceResult<Polyhedron> {
    dual(&icosahedron()?)
}

/// Ten kite faces around two apexes on the z axis. `face[0]` of every kite is
/// its apex. Faces 0..5 surround the top apex, 5..10 the bottom one.
pub fn pentagonal_trapezohedron(apex_height: f64) -> DiceResult<Polyhedron> {
    // Ring height that keeps each kite planar for a unit ring radius.
    let cos36 = (PI / 5.0).cos();
    let ring_z = apex_height * (1.0 - cos36) / (1.0 + cos36);

    let mut vertices = vec![
        Point3::new(0.0, 0.0, apex_height),
        Point3::new(0.0, 0.0, -apex_height),
    ];
    // 2 + 2k: upper ring, 3 + 2k: lower ring, offset by 36 degrees
    for k in 0..10 {
        let angle = k as f64 * PI / 5.0;
        let z = if k % 2 == 0 { ring_z } else { -ring_z };
        vertices.push(Point3::new(angle.cos(), angle.sin(), z));
    }
    let ring = |k: usize| 2 + (k % 10);

    let mut faces = Vec::with_capacity(10);
    for i in 0..5 {
        faces.push(Face::new(vec![0, ring(2 * i), ring(2 * i + 1), ring(2 * i + 2)]));
    }
    for i in 0..5 {
        faces.push(Face::new(vec![1, ring(2 * i + 1), ring(2 * i + 2), ring(2 * i + 3)]));
    }
    Ok(Polyhedron::new(vertices, faces)?.orient_outward())
}

/// Vertex/face dual: one vertex per face centroid, one face per vertex made
/// of the centroids of the faces around it. Fails for a vertex no face uses
/// or one at the centre.
pub fn dual(poly: &Polyhedron) -> DiceResult<Polyhedron> {
    let center = poly.center();
    let vertices: Vec<Point3> = (0..poly.faces().len()).map(|f| poly.centroid(f)).collect();

    let mut faces = Vec::with_capacity(poly.vertices().len());
    for (v, position) in poly.vertices().iter().enumerate() {
        let mut around: Vec<usize> = poly
            .faces()
            .iter()
            .enumerate()
            .filter(|(_, face)| face.indices().contains(&v))
            .map(|(f, _)| f)
            .collect();

        let invalid = |reason: &str| DiceError::InvalidPolyhedron {
            reason: format!("cannot take the dual at vertex {}: {}", v, reason),
        };
        let first = *around.first().ok_or_else(|| invalid("no face uses it"))?;

        // Order the surrounding faces by angle about the vertex direction.
        let axis = (position - center)
            .try_normalize(EPSILON)
            .ok_or_else(|| invalid("it sits at the centre"))?;
        let reference = vertices[first] - position;
        let u = (reference - axis * reference.dot(&axis))
            .try_normalize(EPSILON)
            .ok_or_else(|| invalid("a neighbouring face lies on its axis"))?;
        let w = axis.cross(&u);
        let angle = |f: usize| {
            let d: Vector3 = vertices[f] - position;
            d.dot(&w).atan2(d.dot(&u))
        };
        around.sort_by(|&a, &b| {
            let key = |f: usize| if f == first { f64::NEG_INFINITY } else { angle(f).rem_euclid(2.0 * PI) };
            key(a).total_cmp(&key(b))
        });
        faces.push(Face::new(around));
    }
    Ok(Polyhedron::new(vertices, faces)?.orient_outward())
}

/// True when every face normal points away from the centre.
pub fn is_outward(poly: &Polyhedron) -> bool {
    let center = poly.center();
    (0..poly.faces().len()).all(|f| {
        let n = newell_normal(&poly.face_positions(f));
        n.dot(&(poly.centroid(f) - center)) > 0.0
    })
}
