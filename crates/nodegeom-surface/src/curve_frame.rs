//! Frenet-like frames along curves, used by sweeps, pipes and flow morphs.

use nodegeom_frame::Plane;
use nodegeom_math::{any_perpendicular, Point3, Vec3};

use crate::curve::Curve3d;

/// An orthonormal frame at a point on a curve.
///
/// - **Tangent**: the direction along the curve
/// - **Normal**: the direction toward the center of curvature
/// - **Binormal**: tangent × normal
///
/// Where curvature vanishes the normal is undefined, and an arbitrary but
/// consistent perpendicular is used instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFrame {
    /// Position on the curve.
    pub position: Point3,
    /// Unit tangent.
    pub tangent: Vec3,
    /// Unit normal.
    pub normal: Vec3,
    /// Unit binormal.
    pub binormal: Vec3,
}

impl CurveFrame {
    /// Frame at parameter `t`, from finite differences of the tangent.
    pub fn from_curve(curve: &dyn Curve3d, t: f64) -> Self {
        let domain = curve.domain();
        let dt = domain.length.max(1e-9) * 1e-4;

        let position = curve.evaluate(t);
        let tangent_vec = curve.tangent(t);
        let tangent_len = tangent_vec.norm();

        if tangent_len < 1e-12 {
            return Self::default_at(position);
        }

        let tangent = tangent_vec / tangent_len;

        let t_prev = (t - dt).max(domain.min);
        let t_next = (t + dt).min(domain.max);
        let tan_prev = curve.tangent(t_prev);
        let tan_next = curve.tangent(t_next);
        let d2 = (tan_next - tan_prev) / (t_next - t_prev).max(1e-12);

        // Normal is the part of the second derivative perpendicular to the tangent
        let d2_perp = d2 - tangent * d2.dot(&tangent);

        if d2_perp.norm() < 1e-9 * tangent_len.max(1.0) {
            Self::with_arbitrary_normal(position, tangent)
        } else {
            let normal = d2_perp.normalize();
            Self {
                position,
                tangent,
                normal,
                binormal: tangent.cross(&normal),
            }
        }
    }

    /// Frame with an arbitrary but consistent normal direction.
    pub fn with_arbitrary_normal(position: Point3, tangent: Vec3) -> Self {
        let normal = any_perpendicular(&tangent);
        Self {
            position,
            tangent,
            normal,
            binormal: tangent.cross(&normal),
        }
    }

    /// Default frame (tangent +Z) at `position`.
    fn default_at(position: Point3) -> Self {
        Self {
            position,
            tangent: Vec3::z(),
            normal: Vec3::x(),
            binormal: Vec3::y(),
        }
    }

    /// Rotate the normal and binormal about the tangent by `angle` radians.
    pub fn with_twist(&self, angle: f64) -> Self {
        if angle.abs() < 1e-12 {
            return *self;
        }
        let (s, c) = angle.sin_cos();
        Self {
            normal: self.normal * c + self.binormal * s,
            binormal: self.binormal * c - self.normal * s,
            ..*self
        }
    }

    /// Point at profile coordinates `(x, y)`: x along the normal, y along the binormal.
    pub fn point_at(&self, x: f64, y: f64) -> Point3 {
        self.position + self.normal * x + self.binormal * y
    }

    /// Point at local `(along, x, y)` offsets: along the tangent, normal and binormal.
    pub fn point_at_local(&self, along: f64, x: f64, y: f64) -> Point3 {
        self.position + self.tangent * along + self.normal * x + self.binormal * y
    }

    /// Local `(along, x, y)` offsets of a world point.
    pub fn local_coordinates(&self, p: &Point3) -> Vec3 {
        let d = p - self.position;
        Vec3::new(d.dot(&self.tangent), d.dot(&self.normal), d.dot(&self.binormal))
    }

    /// The profile plane: x = normal, y = binormal, z = tangent.
    pub fn to_plane(&self) -> Plane {
        Plane::from_origin_axes(self.position, self.normal, self.binormal)
    }

    /// Interpolate between two frames (`t = 0` → self, `t = 1` → other).
    pub fn lerp(&self, other: &CurveFrame, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let position = self.position + (other.position - self.position) * t;
        let tangent = lerp_dir(&self.tangent, &other.tangent, t);
        let normal = lerp_dir(&self.normal, &other.normal, t);
        // Re-orthogonalize the normal against the blended tangent.
        let normal = {
            let n = normal - tangent * normal.dot(&tangent);
            if n.norm() < 1e-12 {
                any_perpendicular(&tangent)
            } else {
                n.normalize()
            }
        };
        Self {
            position,
            tangent,
            normal,
            binormal: tangent.cross(&normal),
        }
    }
}

fn lerp_dir(a: &Vec3, b: &Vec3, t: f64) -> Vec3 {
    let v = a * (1.0 - t) + b * t;
    if v.norm() < 1e-12 {
        *a
    } else {
        v.normalize()
    }
}

/// Rotation-minimizing frames at `n_samples` evenly spaced parameters.
///
/// Propagates the first frame with the double reflection method, which
/// avoids the flips Frenet frames show at inflections and on straight runs.
pub fn rotation_minimizing_frames(curve: &dyn Curve3d, n_samples: usize) -> Vec<CurveFrame> {
    if n_samples < 2 {
        return vec![];
    }

    let params = curve.domain().samples(n_samples - 1);
    let mut frames = Vec::with_capacity(n_samples);
    frames.push(CurveFrame::from_curve(curve, params[0]));

    for &t in &params[1..] {
        let prev = frames[frames.len() - 1];
        let xi = curve.evaluate(t);

        let v1 = xi - prev.position;
        let c1 = v1.dot(&v1);
        if c1 < 1e-24 {
            frames.push(CurveFrame {
                position: xi,
                ..prev
            });
            continue;
        }

        let ri_l = prev.normal - v1 * (2.0 / c1) * v1.dot(&prev.normal);
        let ti_l = prev.tangent - v1 * (2.0 / c1) * v1.dot(&prev.tangent);

        let ti = curve.tangent(t);
        if ti.norm() < 1e-12 {
            frames.push(CurveFrame {
                position: xi,
                ..prev
            });
            continue;
        }
        let ti = ti.normalize();

        let v2 = ti - ti_l;
        let c2 = v2.dot(&v2);
        let ri = if c2 < 1e-24 {
            ri_l
        } else {
            ri_l - v2 * (2.0 / c2) * v2.dot(&ri_l)
        };
        let ri = ri - ti * ri.dot(&ti);
        let normal = if ri.norm() < 1e-12 {
            any_perpendicular(&ti)
        } else {
            ri.normalize()
        };

        frames.push(CurveFrame {
            position: xi,
            tangent: ti,
            normal,
            binormal: ti.cross(&normal),
        });
    }

    frames
}

/// Rotation-minimizing frames tabulated along a curve, looked up by
/// normalized parameter.
#[derive(Debug, Clone)]
pub struct FrameTable {
    frames: Vec<CurveFrame>,
}

impl FrameTable {
    /// Tabulate `samples` frames (at least 2).
    pub fn new(curve: &dyn Curve3d, samples: usize) -> Self {
        Self {
            frames: rotation_minimizing_frames(curve, samples.max(2)),
        }
    }

    /// Frame at normalized parameter `s` (clamped to `[0, 1]`).
    pub fn at(&self, s: f64) -> CurveFrame {
        let n = self.frames.len();
        let x = s.clamp(0.0, 1.0) * (n - 1) as f64;
        let i = (x.floor() as usize).min(n - 2);
        self.frames[i].lerp(&self.frames[i + 1], x - i as f64)
    }

    /// The first frame.
    pub fn first(&self) -> CurveFrame {
        self.frames[0]
    }

    /// All tabulated frames.
    pub fn frames(&self) -> &[CurveFrame] {
        &self.frames
    }
}
