//! SubD generators: subdivided boxes and pipes along curves.

use std::f64::consts::TAU;

use nodegeom_box::OrientedBox;
use nodegeom_math::{Point3, MERGE_TOLERANCE};
use nodegeom_surface::{rotation_minimizing_frames, Curve3d};
use serde::{Deserialize, Serialize};

use crate::tags::{EdgeTag, VertexTag};
use crate::topology::SubD;

// ============================================================================
// Box
// ============================================================================

/// Settings for [`subd_box`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdBoxOptions {
    /// Face divisions along the box's local x, y and z axes (minimum 1).
    pub density: [usize; 3],
    /// Tag the twelve box edges as creases and the eight corners as corners.
    pub crease_boundary: bool,
}

impl Default for SubdBoxOptions {
    fn default() -> Self {
        Self {
            density: [1, 1, 1],
            crease_boundary: false,
        }
    }
}

/// Closed quad cage over the six sides of `b`, with outward-facing faces.
pub fn subd_box(b: &OrientedBox, options: &SubdBoxOptions) -> SubD {
    let density = options.density.map(|d| d.max(1));
    let (lo, hi) = (b.local_min, b.local_max);
    let local = |axis: usize, i: usize| {
        lo[axis] + (hi[axis] - lo[axis]) * (i as f64 / density[axis] as f64)
    };

    let mut polygons = Vec::new();
    for axis in 0..3 {
        // (u, v) axes chosen so that u × v points along +axis.
        let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
        for (side, fixed) in [(false, lo[axis]), (true, hi[axis])] {
            for i in 0..density[u] {
                for j in 0..density[v] {
                    let corner = |di: usize, dj: usize| {
                        let mut p = Point3::origin();
                        p[axis] = fixed;
                        p[u] = local(u, i + di);
                        p[v] = local(v, j + dj);
                        b.local_to_world(&p)
                    };
                    let mut quad = vec![corner(0, 0), corner(1, 0), corner(1, 1), corner(0, 1)];
                    if !side {
                        quad.reverse();
                    }
                    polygons.push(quad);
                }
            }
        }
    }

    let scale = b.size().amax().max(1.0);
    let mut out = SubD::weld(&polygons, MERGE_TOLERANCE * scale);
    out.metadata.insert("generator".into(), serde_json::json!("box"));

    if options.crease_boundary {
        let tol = MERGE_TOLERANCE * scale;
        // Per axis: -1 on the min side, 1 on the max side, 0 inside.
        let sides: Vec<[i8; 3]> = out
            .vertices
            .iter()
            .map(|v| {
                let p = b.world_to_local(&v.point);
                [0, 1, 2].map(|a| {
                    if (p[a] - lo[a]).abs() <= tol {
                        -1
                    } else if (p[a] - hi[a]).abs() <= tol {
                        1
                    } else {
                        0
                    }
                })
            })
            .collect();

        for v in &mut out.vertices {
            if sides[v.id].iter().all(|&s| s != 0) {
                v.tag = VertexTag::Corner;
            }
        }
        for e in &mut out.edges {
            let [a, c] = e.vertices;
            let shared = (0..3)
                .filter(|&k| sides[a][k] != 0 && sides[a][k] == sides[c][k])
                .count();
            if shared >= 2 {
                e.tag = EdgeTag::Crease;
            }
        }
    }
    out
}

// ============================================================================
// Pipe
// ============================================================================

/// Radius override at a normalized curve parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizePoint {
    /// Normalized parameter in `[0, 1]`.
    pub parameter: f64,
    /// Radius at that parameter.
    pub radius: f64,
}

/// How radii are interpolated between size points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBlend {
    /// Piecewise linear.
    #[default]
    Linear,
    /// Smoothstep, flat at each size point.
    Smooth,
}

/// Settings for [`subd_pipe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeOptions {
    /// Radius used when no size points are given.
    pub radius: f64,
    /// Vertices per ring (minimum 3).
    pub segments: usize,
    /// Rings along the curve (minimum 2).
    pub samples: usize,
    /// Radius overrides along the curve.
    pub size_points: Vec<SizePoint>,
    /// Interpolation between size points.
    pub blend: SizeBlend,
    /// Close both ends with n-gon faces. Ignored for closed curves.
    pub caps: bool,
}

impl Default for PipeOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            segments: 8,
            samples: 16,
            size_points: Vec::new(),
            blend: SizeBlend::Linear,
            caps: false,
        }
    }
}

impl PipeOptions {
    /// Radius at normalized parameter `s`, clamped to the first and last
    /// size points outside their range.
    pub fn radius_at(&self, s: f64) -> f64 {
        let mut points: Vec<SizePoint> = self
            .size_points
            .iter()
            .copied()
            .filter(|p| p.parameter.is_finite() && p.radius.is_finite())
            .collect();
        points.sort_by(|a, b| a.parameter.total_cmp(&b.parameter));

        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return self.radius;
        };
        if s <= first.parameter {
            return first.radius;
        }
        if s >= last.parameter {
            return last.radius;
        }
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if s <= b.parameter {
                let span = b.parameter - a.parameter;
                let mut t = if span > 0.0 { (s - a.parameter) / span } else { 1.0 };
                if self.blend == SizeBlend::Smooth {
                    t = t * t * (3.0 - 2.0 * t);
                }
                return a.radius + (b.radius - a.radius) * t;
            }
        }
        last.radius
    }
}

/// Tube of quads around `curve`, following rotation-minimizing frames.
///
/// Closed curves wrap the last ring onto the first and need at least four
/// samples (three distinct rings). The frame's closing rotation is spread
/// evenly over the rings so the seam is not twisted. Open curves leave two
/// naked rings unless `caps` is set.
pub fn subd_pipe(curve: &dyn Curve3d, options: &PipeOptions) -> SubD {
    let segments = options.segments.max(3);
    let closed = curve.is_closed();
    let samples = options.samples.max(if closed { 4 } else { 2 });
    let frames = rotation_minimizing_frames(curve, samples);
    let rings = if closed { samples - 1 } else { samples };

    // Angle that turns the last frame's normal onto the first one's.
    let holonomy = match (closed, frames.first(), frames.last()) {
        (true, Some(first), Some(last)) => first
            .normal
            .dot(&last.binormal)
            .atan2(first.normal.dot(&last.normal)),
        _ => 0.0,
    };

    let mut points = Vec::with_capacity(rings * segments);
    for (j, frame) in frames.iter().take(rings).enumerate() {
        let s = j as f64 / (samples - 1) as f64;
        let r = options.radius_at(s);
        let roll = holonomy * s;
        for k in 0..segments {
            let angle = TAU * k as f64 / segments as f64 + roll;
            points.push(frame.point_at(r * angle.cos(), r * angle.sin()));
        }
    }

    let index = |j: usize, k: usize| (j % rings) * segments + k % segments;
    let spans = if closed { rings } else { rings - 1 };
    let mut faces = Vec::with_capacity(spans * segments + 2);
    for j in 0..spans {
        for k in 0..segments {
            faces.push(vec![
                index(j, k),
                index(j, k + 1),
                index(j + 1, k + 1),
                index(j + 1, k),
            ]);
        }
    }

    if options.caps {
        if closed {
            tracing::debug!("pipe caps ignored on a closed curve");
        } else {
            faces.push((0..segments).rev().map(|k| index(0, k)).collect());
            faces.push((0..segments).map(|k| index(rings - 1, k)).collect());
        }
    }

    let mut out = SubD::build(points, faces);
    out.metadata.insert("generator".into(), serde_json::json!("pipe"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::EdgeKind;
    use approx::assert_abs_diff_eq;
    use nodegeom_frame::Plane;
    use nodegeom_frame::Domain;
    use nodegeom_surface::{ArcCurve, FnCurve, LineCurve};

    fn unit_box() -> OrientedBox {
        OrientedBox::from_corners(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_box_density_one() {
        let s = subd_box(&unit_box(), &SubdBoxOptions::default());
        assert_eq!(s.vertices.len(), 8);
        assert_eq!(s.edges.len(), 12);
        assert_eq!(s.faces.len(), 6);
        assert!(s.edges.iter().all(|e| e.faces.len() == 2));
        assert!(s.is_closed());
    }

    #[test]
    fn test_box_faces_point_outward() {
        let b = OrientedBox::from_corners(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0));
        let s = subd_box(&b, &SubdBoxOptions { density: [2, 3, 4], crease_boundary: false });
        let mesh = s.to_mesh();
        for i in 0..mesh.num_faces() {
            let n = mesh.face_normal(i).unwrap();
            let c = s.faces[i].centroid;
            assert!(n.dot(&c.coords) > 0.0);
        }
    }

    #[test]
    fn test_box_dense_is_closed() {
        let s = subd_box(&unit_box(), &SubdBoxOptions { density: [2, 3, 4], crease_boundary: false });
        // Euler characteristic of a sphere.
        let chi = s.vertices.len() as i64 - s.edges.len() as i64 + s.faces.len() as i64;
        assert_eq!(chi, 2);
        assert_eq!(s.faces.len(), 2 * (2 * 3 + 3 * 4 + 4 * 2));
        assert!(s.edges.iter().all(|e| s.edge_kind(e.id) == EdgeKind::Interior));
    }

    #[test]
    fn test_box_crease_boundary() {
        let s = subd_box(&unit_box(), &SubdBoxOptions { density: [2, 2, 2], crease_boundary: true });
        let creases = s.edges.iter().filter(|e| e.tag == EdgeTag::Crease).count();
        let corners = s.vertices.iter().filter(|v| v.tag == VertexTag::Corner).count();
        assert_eq!(creases, 24);
        assert_eq!(corners, 8);
    }

    #[test]
    fn test_open_pipe_boundary_rings() {
        let line = LineCurve::new(Point3::origin(), Point3::new(0.0, 0.0, 10.0));
        let opts = PipeOptions { segments: 6, samples: 5, ..Default::default() };
        let s = subd_pipe(&line, &opts);
        assert_eq!(s.faces.len(), 4 * 6);
        let naked = s.naked_edges();
        assert_eq!(naked.len(), 12);
        assert!(naked.iter().all(|&e| s.edges[e].faces.len() == 1));
        assert!(!s.is_closed());
        for v in &s.vertices {
            assert_abs_diff_eq!(v.point.coords.xy().norm(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_capped_and_closed_pipes() {
        let line = LineCurve::new(Point3::origin(), Point3::new(5.0, 0.0, 0.0));
        let capped = subd_pipe(&line, &PipeOptions { caps: true, ..Default::default() });
        assert!(capped.is_closed());

        let ring = ArcCurve::circle(Plane::world_xy(), 5.0);
        let torus = subd_pipe(&ring, &PipeOptions { samples: 12, segments: 4, ..Default::default() });
        assert_eq!(torus.faces.len(), 11 * 4);
        assert!(torus.is_closed());
    }

    #[test]
    fn test_closed_pipe_minimum_samples() {
        let ring = ArcCurve::circle(Plane::world_xy(), 5.0);
        let tube = subd_pipe(&ring, &PipeOptions { samples: 2, segments: 4, ..Default::default() });
        assert_eq!(tube.faces.len(), 3 * 4);
        assert!(tube.is_closed());
    }

    #[test]
    fn test_closed_pipe_seam_is_untwisted() {
        // Trefoil knot: a closed rail whose frames do not close up.
        let knot = FnCurve::new(Domain::new(0.0, TAU), |t| {
            let r = 2.0 + (3.0 * t).cos();
            Point3::new(r * (2.0 * t).cos(), r * (2.0 * t).sin(), (3.0 * t).sin())
        });
        let segments = 6;
        let samples = 121;
        let tube = subd_pipe(
            &knot,
            &PipeOptions { radius: 0.2, segments, samples, ..Default::default() },
        );
        assert!(tube.is_closed());

        let rings = samples - 1;
        let p = |j: usize, k: usize| tube.vertices[(j % rings) * segments + k].point;
        for k in 0..segments {
            let seam = (p(rings, k) - p(rings - 1, k)).norm();
            let before = (p(rings - 1, k) - p(rings - 2, k)).norm();
            let after = (p(1, k) - p(0, k)).norm();
            assert!(seam < 1.5 * before.max(after), "seam {seam} vs {before}/{after}");
        }
    }

    #[test]
    fn test_size_points() {
        let opts = PipeOptions {
            size_points: vec![
                SizePoint { parameter: 1.0, radius: 3.0 },
                SizePoint { parameter: 0.0, radius: 1.0 },
            ],
            ..Default::default()
        };
        assert_abs_diff_eq!(opts.radius_at(0.25), 1.5);
        assert_abs_diff_eq!(opts.radius_at(-1.0), 1.0);
        let smooth = PipeOptions { blend: SizeBlend::Smooth, ..opts.clone() };
        assert_abs_diff_eq!(smooth.radius_at(0.25), 1.0 + 2.0 * 0.15625);
        assert_abs_diff_eq!(smooth.radius_at(0.5), 2.0);
        assert_abs_diff_eq!(PipeOptions::default().radius_at(0.3), 1.0);
    }
}
