//! Analytic primitive surfaces and lattice-backed surfaces.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::sync::Arc;

use nodegeom_frame::{Domain, Plane};
use nodegeom_math::{lerp_point, Point3};

use crate::surface::{Surface, SurfaceFn, SurfaceKind};
use crate::SurfaceError;

// =============================================================================
// Plane
// =============================================================================

/// Parameterization: `P(u, v) = origin + u * x_axis + v * y_axis`
#[derive(Debug, Clone)]
struct PlaneFn {
    plane: Plane,
}

impl SurfaceFn for PlaneFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        self.plane.point_at(u, v)
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Plane
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Bounded planar surface over `domain_u × domain_v` in plane coordinates.
pub fn plane_surface(plane: Plane, domain_u: Domain, domain_v: Domain) -> Surface {
    Surface::new(PlaneFn { plane }, domain_u, domain_v, Some(plane))
}

// =============================================================================
// Cylinder
// =============================================================================

/// Parameterization: `P(u, v) = origin + r * (cos(u) * x + sin(u) * y) + v * z`
///
/// `u ∈ [0, 2π]` is the angle and `v ∈ [0, height]` the height along the axis.
#[derive(Debug, Clone)]
struct CylinderFn {
    base: Plane,
    radius: f64,
}

impl SurfaceFn for CylinderFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        let (s, c) = u.sin_cos();
        self.base.apply(self.radius * c, self.radius * s, v)
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Cylinder
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Cylinder standing on `base` with the given radius and height.
pub fn cylinder(base: Plane, radius: f64, height: f64) -> Surface {
    Surface::new(
        CylinderFn { base, radius },
        Domain::new(0.0, TAU),
        Domain::new(0.0, height),
        Some(base),
    )
}

// =============================================================================
// Cone
// =============================================================================

/// Parameterization: `P(u, v) = origin + r * (1 − v/h) * (cos(u) * x + sin(u) * y) + v * z`
///
/// The apex sits at height `h` on the base plane's z axis.
#[derive(Debug, Clone)]
struct ConeFn {
    base: Plane,
    radius: f64,
    height: f64,
}

impl SurfaceFn for ConeFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        let (s, c) = u.sin_cos();
        let scale = if self.height.abs() < 1e-12 {
            1.0
        } else {
            1.0 - v / self.height
        };
        let r = self.radius * scale;
        self.base.apply(r * c, r * s, v)
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Cone
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Cone with its base circle on `base` and the apex at `height` along z.
pub fn cone(base: Plane, radius: f64, height: f64) -> Surface {
    Surface::new(
        ConeFn {
            base,
            radius,
            height,
        },
        Domain::new(0.0, TAU),
        Domain::new(0.0, height),
        Some(base),
    )
}

// =============================================================================
// Sphere
// =============================================================================

/// Parameterization: `P(u, v) = origin + r * (cos(v) * (cos(u) * x + sin(u) * y) + sin(v) * z)`
///
/// `u ∈ [0, 2π]` is longitude, `v ∈ [−π/2, π/2]` latitude.
#[derive(Debug, Clone)]
struct SphereFn {
    base: Plane,
    radius: f64,
}

impl SurfaceFn for SphereFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        let (su, cu) = u.sin_cos();
        let (sv, cv) = v.sin_cos();
        let r = self.radius;
        self.base.apply(r * cv * cu, r * cv * su, r * sv)
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Sphere
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Sphere centred on the origin of `base`.
pub fn sphere(base: Plane, radius: f64) -> Surface {
    Surface::new(
        SphereFn { base, radius },
        Domain::new(0.0, TAU),
        Domain::new(-FRAC_PI_2, FRAC_PI_2),
        Some(base),
    )
}

// =============================================================================
// Four-point (bilinear) patch
// =============================================================================

/// Bilinear patch: `(0,0) → a`, `(1,0) → b`, `(1,1) → c`, `(0,1) → d`.
#[derive(Debug, Clone)]
struct FourPointFn {
    corners: [Point3; 4],
}

impl SurfaceFn for FourPointFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        let [a, b, c, d] = &self.corners;
        let bottom = lerp_point(a, b, u);
        let top = lerp_point(d, c, u);
        lerp_point(&bottom, &top, v)
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::FourPoint
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Bilinear surface through four corners, in counter-clockwise order.
pub fn four_point(a: Point3, b: Point3, c: Point3, d: Point3) -> Surface {
    Surface::new(
        FourPointFn {
            corners: [a, b, c, d],
        },
        Domain::unit(),
        Domain::unit(),
        Some(Plane::from_points(a, b, d)),
    )
}

// =============================================================================
// Grid
// =============================================================================

/// Bilinear lookup in a row-major lattice: `rows[i][j]`, with `j` along u
/// and `i` along v, both parameterized over `[0, 1]`.
#[derive(Debug, Clone)]
struct GridFn {
    rows: Vec<Vec<Point3>>,
}

impl GridFn {
    fn cell(count: usize, t: f64) -> (usize, f64) {
        let s = t.clamp(0.0, 1.0) * (count - 1) as f64;
        let i = (s.floor() as usize).min(count - 2);
        (i, s - i as f64)
    }
}

impl SurfaceFn for GridFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        let (j, fu) = Self::cell(self.rows[0].len(), u);
        let (i, fv) = Self::cell(self.rows.len(), v);
        let bottom = lerp_point(&self.rows[i][j], &self.rows[i][j + 1], fu);
        let top = lerp_point(&self.rows[i + 1][j], &self.rows[i + 1][j + 1], fu);
        lerp_point(&bottom, &top, fv)
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Grid
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }

    fn control_points(&self) -> Option<&[Vec<Point3>]> {
        Some(&self.rows)
    }
}

/// Free-form surface backed by a control-point lattice.
///
/// The lattice must be rectangular and at least 2×2.
pub fn grid(rows: Vec<Vec<Point3>>) -> Result<Surface, SurfaceError> {
    let cols = rows.first().map_or(0, Vec::len);
    if rows.len() < 2 || cols < 2 {
        return Err(SurfaceError::LatticeTooSmall {
            rows: rows.len(),
            cols,
        });
    }
    if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
        return Err(SurfaceError::RaggedLattice {
            row,
            found: r.len(),
            expected: cols,
        });
    }
    Ok(Surface::new(
        GridFn { rows },
        Domain::unit(),
        Domain::unit(),
        None,
    ))
}

// =============================================================================
// Function
// =============================================================================

#[derive(Clone)]
struct ClosureFn {
    f: Arc<dyn Fn(f64, f64) -> Point3 + Send + Sync>,
}

impl fmt::Debug for ClosureFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureFn").finish_non_exhaustive()
    }
}

impl SurfaceFn for ClosureFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        (self.f)(u, v)
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Function
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Surface from a caller-provided evaluation function.
pub fn from_fn<F>(domain_u: Domain, domain_v: Domain, plane: Option<Plane>, f: F) -> Surface
where
    F: Fn(f64, f64) -> Point3 + Send + Sync + 'static,
{
    Surface::new(ClosureFn { f: Arc::new(f) }, domain_u, domain_v, plane)
}
