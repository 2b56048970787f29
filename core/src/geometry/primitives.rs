use super::{frame::newell_normal, Point3, Vector3, EPSILON};
use crate::dice::error::{DiceError, DiceResult};
use serde::{Deserialize, Serialize};

/// An ordered list of vertex indices describing one planar polygon.
/// Counter-clockwise winding (seen from outside) gives an outward normal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face(Vec<usize>);

impl Face {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same polygon, opposite winding. The first vertex stays first so the
    /// first edge still touches it.
    fn reversed(&self) -> Self {
        let mut indices = Vec::with_capacity(self.0.len());
        indices.push(self.0[0]);
        indices.extend(self.0[1..].iter().rev());
        Self(indices)
    }
}

impl From<Vec<usize>> for Face {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

/// A solid described by vertex positions and faces that index into them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyhedron {
    vertices: Vec<Point3>,
    faces: Vec<Face>,
}

impl Polyhedron {
    /// Validates that every face has at least three distinct, in-range indices.
    pub fn new(vertices: Vec<Point3>, faces: Vec<Face>) -> DiceResult<Self> {
        for (i, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(DiceError::InvalidPolyhedron {
                    reason: format!("face {} has {} vertices, need at least 3", i, face.len()),
                });
            }
            if let Some(bad) = face.indices().iter().find(|&&idx| idx >= vertices.len()) {
                return Err(DiceError::InvalidPolyhedron {
                    reason: format!(
                        "face {} references vertex {} but only {} vertices exist",
                        i,
                        bad,
                        vertices.len()
                    ),
                });
            }
            let mut sorted = face.indices().to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            if sorted.len() != face.len() {
                return Err(DiceError::InvalidPolyhedron {
                    reason: format!("face {} repeats a vertex", i),
                });
            }
        }
        Ok(Self { vertices, faces })
    }

    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face_positions(&self, face: usize) -> Vec<Point3> {
        self.faces[face]
            .indices()
            .iter()
            .map(|&i| self.vertices[i])
            .collect()
    }

    pub fn centroid(&self, face: usize) -> Point3 {
        let positions = self.face_positions(face);
        let sum = positions
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / positions.len() as f64)
    }

    /// Mean of all vertex positions.
    pub fn center(&self) -> Point3 {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.vertices.len().max(1) as f64)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| p * factor).collect(),
            faces: self.faces.clone(),
        }
    }

    /// Smallest distance from the origin to any face plane.
    pub fn inradius(&self) -> f64 {
        (0..self.faces.len())
            .filter_map(|f| {
                let n = newell_normal(&self.face_positions(f));
                let len = n.norm();
                (len > EPSILON).then(|| (self.centroid(f).coords.dot(&n) / len).abs())
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// The face whose outward normal is anti-parallel to `face`'s, if any.
    pub fn opposite_face(&self, face: usize) -> Option<usize> {
        let n = newell_normal(&self.face_positions(face)).try_normalize(EPSILON)?;
        (0..self.faces.len()).filter(|&f| f != face).find(|&f| {
            newell_normal(&self.face_positions(f))
                .try_normalize(EPSILON)
                .map(|m| (n.dot(&m) + 1.0).abs() < 1e-6)
                .unwrap_or(false)
        })
    }

    /// Flip every face whose winding points its normal toward the centre.
    /// Only meaningful for convex solids.
    pub fn orient_outward(mut self) -> Self {
        let center = self.center();
        for f in 0..self.faces.len() {
            let n = newell_normal(&self.face_positions(f));
            if n.dot(&(self.centroid(f) - center)) < 0.0 {
                self.faces[f] = self.faces[f].reversed();
            }
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.extend(p);
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn extend(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);

        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn merge(&self, other: &Aabb) -> Aabb {
        let mut res = *self;
        res.min.x = res.min.x.min(other.min.x);
        res.min.y = res.min.y.min(other.min.y);
        res.min.z = res.min.z.min(other.min.z);

        res.max.x = res.max.x.max(other.max.x);
        res.max.y = res.max.y.max(other.max.y);
        res.max.z = res.max.z.max(other.max.z);
        res
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.x - self.min.x
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.y - self.min.y
        }
    }

    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }

    /// True when the boxes overlap or touch.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && other.min.x <= self.max.x &&
        self.min.y <= other.max.y && other.min.y <= self.max.y &&
        self.min.z <= other.max.z && other.min.z <= self.max.z
    }
}
