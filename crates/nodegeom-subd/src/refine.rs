//! Tag-aware smoothing and Catmull–Clark refinement.

use nodegeom_math::{Point3, Vec3};
use nodegeom_surface::Mesh;
use serde::{Deserialize, Serialize};

use crate::tags::{EdgeTag, VertexTag};
use crate::topology::SubD;

/// Refinement levels allowed by [`SubD::to_mesh_subdivided`].
const MAX_MESH_LEVELS: usize = 5;

/// Smoothing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothOptions {
    /// Averaging rounds.
    pub iterations: usize,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self { iterations: 1 }
    }
}

fn average(points: impl IntoIterator<Item = Point3>) -> Option<Point3> {
    let mut sum = Vec3::zeros();
    let mut n = 0usize;
    for p in points {
        sum += p.coords;
        n += 1;
    }
    (n > 0).then(|| Point3::from(sum / n as f64))
}

impl SubD {
    /// Laplacian smoothing that respects tags.
    ///
    /// Each round, every free vertex moves halfway toward the centroid of
    /// its edge neighbours, all computed from the previous round's
    /// positions. Corner and dart vertices are pinned, as is any vertex on
    /// a crease or open border.
    pub fn smooth(&self, options: &SmoothOptions) -> SubD {
        let mut out = self.clone();
        if options.iterations == 0 {
            return out;
        }

        let vertex_edges = self.vertex_edges();
        let fixed: Vec<bool> = self
            .vertices
            .iter()
            .map(|v| {
                v.tag.is_pinned() || vertex_edges[v.id].iter().any(|&e| self.is_sharp_edge(e))
            })
            .collect();

        for _ in 0..options.iterations {
            let current: Vec<Point3> = out.points();
            for v in &mut out.vertices {
                if fixed[v.id] {
                    continue;
                }
                let neighbors = vertex_edges[v.id]
                    .iter()
                    .map(|&e| current[self.other_vertex(e, v.id)]);
                if let Some(target) = average(neighbors) {
                    v.point = current[v.id] + (target - current[v.id]) * 0.5;
                }
            }
        }
        out.refresh_centroids();
        out
    }

    /// One level of Catmull–Clark refinement.
    ///
    /// Every n-gon becomes n quads. Crease and border edges stay sharp
    /// (their edge points are midpoints and their halves keep the crease
    /// tag); vertices with two sharp edges follow the crease rule, and
    /// corners (tagged, or valence-2 border vertices) and vertices with more
    /// than two sharp edges stay put.
    pub fn subdivide(&self) -> SubD {
        let nv = self.vertices.len();
        let ne = self.edges.len();

        let face_points: Vec<Point3> = self.faces.iter().map(|f| f.centroid).collect();

        let edge_points: Vec<Point3> = self
            .edges
            .iter()
            .map(|e| {
                let [a, b] = e.vertices;
                let (pa, pb) = (self.vertices[a].point, self.vertices[b].point);
                if self.is_sharp_edge(e.id) {
                    nalgebra::center(&pa, &pb)
                } else {
                    let fsum: Vec3 = e.faces.iter().map(|&f| face_points[f].coords).sum();
                    Point3::from((pa.coords + pb.coords + fsum) / (2 + e.faces.len()) as f64)
                }
            })
            .collect();

        let vertex_edges = self.vertex_edges();
        let vertex_faces = self.vertex_faces();
        let vertex_points: Vec<Point3> = self
            .vertices
            .iter()
            .map(|v| {
                let p = v.point;
                let edges = &vertex_edges[v.id];
                let sharp: Vec<usize> = edges
                    .iter()
                    .copied()
                    .filter(|&e| self.is_sharp_edge(e))
                    .collect();

                let open_corner = edges.len() == 2 && vertex_faces[v.id].len() <= 1;
                if v.tag == VertexTag::Corner || sharp.len() > 2 || edges.is_empty() || open_corner
                {
                    return p;
                }
                if sharp.len() == 2 {
                    let a = self.vertices[self.other_vertex(sharp[0], v.id)].point;
                    let b = self.vertices[self.other_vertex(sharp[1], v.id)].point;
                    return Point3::from((p.coords * 6.0 + a.coords + b.coords) / 8.0);
                }

                let faces = &vertex_faces[v.id];
                let n = edges.len() as f64;
                let Some(f) = average(faces.iter().map(|&f| face_points[f])) else {
                    return p;
                };
                let r = average(edges.iter().map(|&e| {
                    let o = self.vertices[self.other_vertex(e, v.id)].point;
                    nalgebra::center(&p, &o)
                }))
                .unwrap_or(p);
                Point3::from((f.coords + r.coords * 2.0 + p.coords * (n - 3.0)) / n)
            })
            .collect();

        let mut points = vertex_points;
        points.extend(edge_points);
        points.extend(face_points);

        let mut quads = Vec::new();
        for face in &self.faces {
            let k = face.vertices.len();
            let centre = nv + ne + face.id;
            for i in 0..k {
                let prev_edge = face.edges[(i + k - 1) % k];
                quads.push(vec![
                    face.vertices[i],
                    nv + face.edges[i],
                    centre,
                    nv + prev_edge,
                ]);
            }
        }

        let mut out = SubD::build(points, quads);
        for v in &self.vertices {
            out.vertices[v.id].tag = v.tag;
        }
        for e in self.edges.iter().filter(|e| e.tag == EdgeTag::Crease) {
            out.vertices[nv + e.id].tag = VertexTag::Crease;
            for end in e.vertices {
                if let Some(half) = out.edge_between(end, nv + e.id) {
                    out.edges[half].tag = EdgeTag::Crease;
                }
            }
        }
        out.metadata = self.metadata.clone();
        out
    }

    /// Refine `levels` times (capped) and convert to a mesh for display.
    pub fn to_mesh_subdivided(&self, levels: usize) -> Mesh {
        if levels > MAX_MESH_LEVELS {
            tracing::debug!(levels, max = MAX_MESH_LEVELS, "subdivision levels capped");
        }
        let mut current = self.clone();
        for _ in 0..levels.min(MAX_MESH_LEVELS) {
            current = current.subdivide();
        }
        current.to_mesh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid3x3() -> SubD {
        // 3x3 quads over [0,3]², inner four vertices raised to z = 1.
        let mut polys = Vec::new();
        for i in 0..3 {
            for j in 0..3 {
                let (x, y) = (i as f64, j as f64);
                polys.push(vec![
                    Point3::new(x, y, 0.0),
                    Point3::new(x + 1.0, y, 0.0),
                    Point3::new(x + 1.0, y + 1.0, 0.0),
                    Point3::new(x, y + 1.0, 0.0),
                ]);
            }
        }
        let s = SubD::from_polygons(&polys, 1e-6).unwrap();
        s.map_points(|p| {
            if (1.0..=2.0).contains(&p.x) && (1.0..=2.0).contains(&p.y) {
                Point3::new(p.x, p.y, 1.0)
            } else {
                *p
            }
        })
    }

    #[test]
    fn test_smooth_moves_interior_only() {
        let s = grid3x3();
        let smoothed = s.smooth(&SmoothOptions { iterations: 1 });
        for v in &s.vertices {
            let moved = (smoothed.vertices[v.id].point - v.point).norm() > 1e-12;
            assert_eq!(moved, !s.is_boundary_vertex(v.id));
        }
        // Interior raised vertex: neighbours at z = 1, 1, 0, 0 → halfway to 0.5.
        let inner = s
            .vertices
            .iter()
            .find(|v| v.point == Point3::new(1.0, 1.0, 1.0))
            .unwrap();
        assert_abs_diff_eq!(smoothed.vertices[inner.id].point.z, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_smooth_respects_corner_tag() {
        let s = grid3x3();
        let inner = s
            .vertices
            .iter()
            .find(|v| v.point == Point3::new(2.0, 2.0, 1.0))
            .unwrap()
            .id;
        let pinned = s.with_vertex_tag(inner, VertexTag::Corner);
        let smoothed = pinned.smooth(&SmoothOptions { iterations: 3 });
        assert_eq!(smoothed.vertices[inner].point, s.vertices[inner].point);
        assert_eq!(s.smooth(&SmoothOptions { iterations: 0 }), s);
    }

    #[test]
    fn test_subdivide_counts() {
        let s = grid3x3();
        let r = s.subdivide();
        assert_eq!(r.faces.len(), 36);
        assert_eq!(r.vertices.len(), s.vertices.len() + s.edges.len() + s.faces.len());
        assert!(r.faces.iter().all(|f| f.vertices.len() == 4));
    }

    #[test]
    fn test_subdivide_keeps_border_on_plane_and_crease_tags() {
        let s = grid3x3();
        let crease = s.edge_between(2, 4).unwrap();
        let tagged = s.with_edge_tag(crease, EdgeTag::Crease);
        let r = tagged.subdivide();
        let nv = s.vertices.len();
        // Border stays at z = 0 and corners stay fixed.
        for e in s.naked_edges() {
            assert_abs_diff_eq!(r.vertices[nv + e].point.z, 0.0, epsilon = 1e-12);
        }
        assert_eq!(r.vertices[0].point, s.vertices[0].point);
        let crease_halves = r.edges.iter().filter(|e| e.tag == EdgeTag::Crease).count();
        assert_eq!(crease_halves, 2);
    }

    #[test]
    fn test_to_mesh_subdivided() {
        let s = grid3x3();
        assert_eq!(s.to_mesh_subdivided(0).num_faces(), 9);
        assert_eq!(s.to_mesh_subdivided(2).num_faces(), 144);
    }
}
