//! Polygon mesh value type.

use nodegeom_math::{Point3, Vec3};
use serde::{Deserialize, Serialize};

/// A polygon mesh: shared vertices and faces as index loops.
///
/// Faces may have any number of vertices; use [`Mesh::triangulated`] when a
/// consumer needs triangles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Faces as counter-clockwise vertex index loops.
    pub faces: Vec<Vec<usize>>,
}

impl Mesh {
    /// Mesh from vertices and faces.
    pub fn new(vertices: Vec<Point3>, faces: Vec<Vec<usize>>) -> Self {
        Self { vertices, faces }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// True when the mesh has no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Fan-triangulate every face with more than three vertices.
    ///
    /// Faces with fewer than three vertices are dropped.
    pub fn triangulated(&self) -> Mesh {
        let faces = self
            .faces
            .iter()
            .filter(|f| f.len() >= 3)
            .flat_map(|f| (1..f.len() - 1).map(move |k| vec![f[0], f[k], f[k + 1]]))
            .collect();
        Mesh {
            vertices: self.vertices.clone(),
            faces,
        }
    }

    /// Area-weighted (Newell) normal of face `index`, or `None` for a
    /// degenerate face or bad index.
    pub fn face_normal(&self, index: usize) -> Option<Vec3> {
        let n = self.newell(self.faces.get(index)?)?;
        let len = n.norm();
        if len < 1e-15 {
            None
        } else {
            Some(n / len)
        }
    }

    /// Area of face `index` (0 for degenerate faces or bad indices).
    pub fn face_area(&self, index: usize) -> f64 {
        self.faces
            .get(index)
            .and_then(|f| self.newell(f))
            .map_or(0.0, |n| 0.5 * n.norm())
    }

    /// Total surface area.
    pub fn area(&self) -> f64 {
        (0..self.faces.len()).map(|i| self.face_area(i)).sum()
    }

    /// Axis-aligned bounds `(min, max)`, or `None` when there are no vertices.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), p| {
            (
                Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        }))
    }

    /// Append another mesh, offsetting its indices.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| f.iter().map(|&i| i + offset).collect()),
        );
    }

    /// The same mesh with every vertex passed through `f`.
    pub fn map_vertices(&self, f: impl Fn(&Point3) -> Point3) -> Mesh {
        Mesh {
            vertices: self.vertices.iter().map(f).collect(),
            faces: self.faces.clone(),
        }
    }

    fn newell(&self, face: &[usize]) -> Option<Vec3> {
        if face.len() < 3 {
            return None;
        }
        let mut n = Vec3::zeros();
        for k in 0..face.len() {
            let a = self.vertices.get(face[k])?;
            let b = self.vertices.get(face[(k + 1) % face.len()])?;
            n += Vec3::new(
                (a.y - b.y) * (a.z + b.z),
                (a.z - b.z) * (a.x + b.x),
                (a.x - b.x) * (a.y + b.y),
            );
        }
        Some(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_square() -> Mesh {
        Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2, 3]],
        )
    }

    #[test]
    fn test_face_normal_and_area() {
        let m = unit_square();
        let n = m.face_normal(0).unwrap();
        assert_abs_diff_eq!(n.z, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.area(), 1.0, epsilon = 1e-12);
        assert!(m.face_normal(3).is_none());
    }

    #[test]
    fn test_triangulated_keeps_area() {
        let t = unit_square().triangulated();
        assert_eq!(t.num_faces(), 2);
        assert!(t.faces.iter().all(|f| f.len() == 3));
        assert_abs_diff_eq!(t.area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bounds_and_merge() {
        let mut m = unit_square();
        let shifted = m.map_vertices(|p| p + Vec3::new(0.0, 0.0, 2.0));
        m.merge(&shifted);
        assert_eq!(m.num_vertices(), 8);
        assert_eq!(m.faces[1], vec![4, 5, 6, 7]);
        let (lo, hi) = m.bounds().unwrap();
        assert_eq!(lo, Point3::origin());
        assert_eq!(hi, Point3::new(1.0, 1.0, 2.0));
        assert!(Mesh::default().bounds().is_none());
    }
}
