//! Differential geometry and planarity by finite differences.
//!
//! All derivatives are numeric, so every surface kind (including
//! caller-provided functions) is analysed the same way. Steps are fractions
//! of each domain's length; see [`DifferentialOptions`].

use nodegeom_frame::{Domain, Plane};
use nodegeom_math::{Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::sample::sample_surface_grid;
use crate::surface::Surface;

/// Finite-difference step sizes, as fractions of the domain length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferentialOptions {
    /// Step for first derivatives (tangents).
    pub first_step: f64,
    /// Step for second derivatives.
    pub second_step: f64,
}

impl Default for DifferentialOptions {
    fn default() -> Self {
        Self {
            first_step: 1e-4,
            second_step: 1e-3,
        }
    }
}

/// Position, tangents and unit normal at a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFrame {
    /// Surface point.
    pub point: Point3,
    /// ∂P/∂u.
    pub tangent_u: Vec3,
    /// ∂P/∂v.
    pub tangent_v: Vec3,
    /// Unit normal, `tangent_u × tangent_v` normalized.
    pub normal: Vec3,
    /// Tangent plane at the point (x along `tangent_u`).
    pub plane: Plane,
}

/// First (E, F, G) and second (L, M, N) fundamental form coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FundamentalForms {
    /// `Pu · Pu`
    pub e: f64,
    /// `Pu · Pv`
    pub f: f64,
    /// `Pv · Pv`
    pub g: f64,
    /// `Puu · n`
    pub l: f64,
    /// `Puv · n`
    pub m: f64,
    /// `Pvv · n`
    pub n: f64,
}

impl FundamentalForms {
    /// Determinant of the first form, `EG − F²`.
    pub fn metric_determinant(&self) -> f64 {
        self.e * self.g - self.f * self.f
    }
}

/// Curvature at a parameter.
///
/// Signs follow the normal of [`surface_frame`]: a sphere with outward
/// normals has negative mean curvature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceCurvature {
    /// Surface point.
    pub point: Point3,
    /// Unit normal.
    pub normal: Vec3,
    /// Gaussian curvature `k1 · k2`.
    pub gaussian: f64,
    /// Mean curvature `(k1 + k2) / 2`.
    pub mean: f64,
    /// Larger principal curvature.
    pub k1: f64,
    /// Smaller principal curvature.
    pub k2: f64,
    /// Unit principal direction for `k1`.
    pub direction1: Vec3,
    /// Unit principal direction for `k2`.
    pub direction2: Vec3,
}

fn step(domain: &Domain, fraction: f64) -> f64 {
    (domain.length * fraction).max(1e-12)
}

/// Central difference clamped to the domain (one-sided at the edges).
fn derivative(domain: &Domain, t: f64, h: f64, eval: impl Fn(f64) -> Point3) -> Vec3 {
    let t0 = domain.clamp(t - h);
    let t1 = domain.clamp(t + h);
    if t1 - t0 < 1e-15 {
        return Vec3::zeros();
    }
    (eval(t1) - eval(t0)) / (t1 - t0)
}

/// Move a second-difference stencil centre inside the domain where it fits.
fn stencil_center(domain: &Domain, t: f64, h: f64) -> f64 {
    if domain.length > 2.0 * h {
        t.clamp(domain.min + h, domain.max - h)
    } else {
        t
    }
}

fn unit_normal(tu: &Vec3, tv: &Vec3, fallback: Option<&Plane>) -> Vec3 {
    let n = tu.cross(tv);
    let scale = tu.norm().max(tv.norm());
    if n.norm() > 1e-10 * scale * scale && n.norm() > 1e-300 {
        return n.normalize();
    }
    match fallback {
        Some(plane) => plane.normal(),
        None => {
            tracing::debug!("degenerate surface tangents, using world Z normal");
            Vec3::z()
        }
    }
}

/// Point, tangents, normal and tangent plane at `(u, v)`.
///
/// A degenerate normal falls back to the surface's plane normal, then to
/// world Z.
pub fn surface_frame(
    surface: &Surface,
    u: f64,
    v: f64,
    options: &DifferentialOptions,
) -> SurfaceFrame {
    let point = surface.evaluate(u, v);
    let hu = step(&surface.domain_u, options.first_step);
    let hv = step(&surface.domain_v, options.first_step);
    let tangent_u = derivative(&surface.domain_u, u, hu, |t| surface.evaluate(t, v));
    let tangent_v = derivative(&surface.domain_v, v, hv, |t| surface.evaluate(u, t));
    let normal = unit_normal(&tangent_u, &tangent_v, surface.plane.as_ref());

    let plane = if tangent_u.norm() > 1e-12 && tangent_u.cross(&normal).norm() > 1e-12 {
        Plane::from_origin_axes(point, tangent_u, normal.cross(&tangent_u))
    } else {
        Plane::from_origin_normal(point, normal)
    };

    SurfaceFrame {
        point,
        tangent_u,
        tangent_v,
        normal,
        plane,
    }
}

/// First and second fundamental forms at `(u, v)`.
pub fn fundamental_forms(
    surface: &Surface,
    u: f64,
    v: f64,
    options: &DifferentialOptions,
) -> FundamentalForms {
    let frame = surface_frame(surface, u, v, options);
    second_order(surface, u, v, options, &frame)
}

fn second_order(
    surface: &Surface,
    u: f64,
    v: f64,
    options: &DifferentialOptions,
    frame: &SurfaceFrame,
) -> FundamentalForms {
    let (pu, pv, n) = (frame.tangent_u, frame.tangent_v, frame.normal);
    let hu = step(&surface.domain_u, options.second_step);
    let hv = step(&surface.domain_v, options.second_step);
    let uc = stencil_center(&surface.domain_u, u, hu);
    let vc = stencil_center(&surface.domain_v, v, hv);

    let p = |a: f64, b: f64| surface.evaluate(a, b).coords;
    let centre = p(uc, vc);
    let puu = (p(uc + hu, vc) - centre * 2.0 + p(uc - hu, vc)) / (hu * hu);
    let pvv = (p(uc, vc + hv) - centre * 2.0 + p(uc, vc - hv)) / (hv * hv);
    let puv = (p(uc + hu, vc + hv) - p(uc + hu, vc - hv) - p(uc - hu, vc + hv)
        + p(uc - hu, vc - hv))
        / (4.0 * hu * hv);

    FundamentalForms {
        e: pu.dot(&pu),
        f: pu.dot(&pv),
        g: pv.dot(&pv),
        l: puu.dot(&n),
        m: puv.dot(&n),
        n: pvv.dot(&n),
    }
}

fn normalized_or(v: Vec3, fallback: Vec3) -> Vec3 {
    if v.norm() > 1e-15 {
        v.normalize()
    } else {
        fallback
    }
}

/// Gaussian, mean and principal curvatures with principal directions.
///
/// `K = (LN − M²) / (EG − F²)`, `H = (EN − 2FM + GL) / (2(EG − F²))`,
/// `k1,2 = H ± √max(H² − K, 0)`. Directions are eigenvectors of the shape
/// operator `I⁻¹ II`; a singular metric reports zero curvature along the
/// raw tangents.
pub fn surface_curvature(
    surface: &Surface,
    u: f64,
    v: f64,
    options: &DifferentialOptions,
) -> SurfaceCurvature {
    let frame = surface_frame(surface, u, v, options);
    let forms = second_order(surface, u, v, options, &frame);
    let raw_u = normalized_or(frame.tangent_u, frame.plane.x_axis);
    let raw_v = normalized_or(frame.tangent_v, frame.plane.y_axis);

    let det = forms.metric_determinant();
    if det.abs() < 1e-18 {
        tracing::debug!(u, v, "singular first fundamental form");
        return SurfaceCurvature {
            point: frame.point,
            normal: frame.normal,
            gaussian: 0.0,
            mean: 0.0,
            k1: 0.0,
            k2: 0.0,
            direction1: raw_u,
            direction2: raw_v,
        };
    }

    let FundamentalForms { e, f, g, l, m, n } = forms;
    let gaussian = (l * n - m * m) / det;
    let mean = (e * n - 2.0 * f * m + g * l) / (2.0 * det);
    let disc = (mean * mean - gaussian).max(0.0).sqrt();
    let (k1, k2) = (mean + disc, mean - disc);

    // Shape operator [[a, b], [c, d]] in the (Pu, Pv) basis.
    let a = (g * l - f * m) / det;
    let b = (g * m - f * n) / det;
    let c = (e * m - f * l) / det;
    let d = (e * n - f * m) / det;

    let scale = a.abs().max(b.abs()).max(c.abs()).max(d.abs()).max(1e-300);

    // Null vector of (S − kI) from its better-conditioned row.
    let eigen = |k: f64| -> Option<Vec3> {
        let row1 = (a - k).hypot(b);
        let row2 = c.hypot(d - k);
        if row1.max(row2) <= 1e-12 * scale {
            return None;
        }
        let (x, y) = if row1 >= row2 { (b, k - a) } else { (k - d, c) };
        let dir = frame.tangent_u * x + frame.tangent_v * y;
        (dir.norm() > 1e-15).then(|| dir.normalize())
    };

    let (direction1, direction2) = match (eigen(k1), eigen(k2)) {
        (Some(d1), Some(d2)) if disc > 1e-6 * scale => (d1, d2),
        _ => {
            // Diagonal or umbilic: the tangents are already eigenvectors.
            if (a - k1).abs() <= (d - k1).abs() {
                (raw_u, raw_v)
            } else {
                (raw_v, raw_u)
            }
        }
    };

    SurfaceCurvature {
        point: frame.point,
        normal: frame.normal,
        gaussian,
        mean,
        k1,
        k2,
        direction1,
        direction2,
    }
}

/// Planarity test settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarityOptions {
    /// Maximum deviation still considered planar.
    pub tolerance: f64,
    /// Segments per direction of the sample grid.
    pub samples: usize,
}

impl Default for PlanarityOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            samples: 8,
        }
    }
}

/// Result of [`surface_planarity`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planarity {
    /// True when `deviation <= tolerance`.
    pub planar: bool,
    /// Largest distance from a sample to `plane`.
    pub deviation: f64,
    /// Plane through three well-spread samples.
    pub plane: Plane,
}

/// Test whether a surface is planar within tolerance.
///
/// A plane is fitted through three non-collinear samples (the first, the
/// one farthest from it, and the one spanning the largest triangle with
/// those two) and the maximum deviation over the grid is reported. A
/// surface whose samples are all collinear counts as planar.
pub fn surface_planarity(surface: &Surface, options: &PlanarityOptions) -> Planarity {
    let n = options.samples.max(2);
    let points = sample_surface_grid(surface, n, n).points;
    let a = points[0];

    let b = points
        .iter()
        .copied()
        .max_by(|p, q| (p - a).norm_squared().total_cmp(&(q - a).norm_squared()))
        .unwrap_or(a);
    let ab = b - a;
    let c = points
        .iter()
        .copied()
        .max_by(|p, q| {
            ab.cross(&(p - a))
                .norm_squared()
                .total_cmp(&ab.cross(&(q - a)).norm_squared())
        })
        .unwrap_or(a);

    let span = ab.norm();
    if ab.cross(&(c - a)).norm() <= 1e-12 * span.max(1.0) * span.max(1.0) {
        tracing::debug!("collinear surface samples, treating as planar");
        return Planarity {
            planar: true,
            deviation: 0.0,
            plane: surface.plane.unwrap_or_else(|| Plane::world_xy_at(a)),
        };
    }

    let plane = Plane::from_points(a, b, c);
    let deviation = points
        .iter()
        .map(|p| plane.signed_distance(p).abs())
        .fold(0.0, f64::max);
    Planarity {
        planar: deviation <= options.tolerance,
        deviation,
        plane,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{cylinder, four_point, plane_surface, sphere};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_plane_frame() {
        let s = plane_surface(Plane::world_xy(), Domain::new(0.0, 2.0), Domain::new(0.0, 3.0));
        let f = surface_frame(&s, 1.0, 1.0, &DifferentialOptions::default());
        assert_abs_diff_eq!(f.normal.z, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(f.tangent_u.x, 1.0, epsilon = 1e-9);
        assert!(f.plane.is_orthonormal(1e-9));
    }

    #[test]
    fn test_edge_tangent_is_one_sided() {
        let s = cylinder(Plane::world_xy(), 1.0, 2.0);
        let f = surface_frame(&s, 0.0, 0.0, &DifferentialOptions::default());
        assert_abs_diff_eq!(f.tangent_v.z, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(f.normal.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sphere_curvature() {
        let r = 2.0;
        let s = sphere(Plane::world_xy(), r);
        let c = surface_curvature(&s, 1.0, 0.3, &DifferentialOptions::default());
        assert_abs_diff_eq!(c.gaussian, 1.0 / (r * r), epsilon = 1e-4);
        assert_abs_diff_eq!(c.mean.abs(), 1.0 / r, epsilon = 1e-4);
        assert_abs_diff_eq!(c.k1, c.k2, epsilon = 1e-2);
    }

    #[test]
    fn test_cylinder_curvature_and_directions() {
        let r = 3.0;
        let s = cylinder(Plane::world_xy(), r, 10.0);
        let c = surface_curvature(&s, PI / 3.0, 5.0, &DifferentialOptions::default());
        assert_abs_diff_eq!(c.gaussian, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(c.mean.abs(), 0.5 / r, epsilon = 1e-4);
        // The straight direction is the axis.
        let axis_dir = if c.k1.abs() < c.k2.abs() {
            c.direction1
        } else {
            c.direction2
        };
        assert_abs_diff_eq!(axis_dir.z.abs(), 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(c.direction1.dot(&c.direction2), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_fundamental_forms_of_plane() {
        let s = plane_surface(Plane::world_xy(), Domain::unit(), Domain::unit());
        let ff = fundamental_forms(&s, 0.5, 0.5, &DifferentialOptions::default());
        assert_abs_diff_eq!(ff.e, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ff.f, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ff.g, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ff.l, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ff.metric_determinant(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_planarity() {
        let flat = four_point(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(2.0, 2.0, 1.0),
            Point3::new(0.0, 2.0, 1.0),
        );
        let result = surface_planarity(&flat, &PlanarityOptions::default());
        assert!(result.planar);
        assert!(result.deviation < 1e-12);
        assert_abs_diff_eq!(result.plane.normal().z.abs(), 1.0, epsilon = 1e-12);

        let warped = four_point(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 1.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        let result = surface_planarity(&warped, &PlanarityOptions::default());
        assert!(!result.planar);
        assert!(result.deviation > 0.1);
    }

    #[test]
    fn test_collinear_surface_is_planar() {
        let s = plane_surface(Plane::world_xy(), Domain::new(0.0, 3.0), Domain::new(0.0, 0.0));
        let result = surface_planarity(&s, &PlanarityOptions::default());
        assert!(result.planar);
        assert_eq!(result.deviation, 0.0);
    }
}
