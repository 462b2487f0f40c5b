//! Closest point on a surface: grid bracketing plus Gauss–Newton refinement.

use nodegeom_math::{solve_2x2, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::analysis::{surface_frame, DifferentialOptions};
use crate::sample::sample_surface_grid;
use crate::surface::Surface;

/// Closest-point solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosestPointOptions {
    /// Grid segments per direction for the initial search.
    pub resolution: usize,
    /// Gauss–Newton iteration cap.
    pub max_iterations: usize,
    /// Parameter step below which the solve counts as converged.
    pub tolerance: f64,
}

impl Default for ClosestPointOptions {
    fn default() -> Self {
        Self {
            resolution: 24,
            max_iterations: 8,
            tolerance: 1e-6,
        }
    }
}

/// Result of [`surface_closest_point`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceClosestPoint {
    /// Closest surface point found.
    pub point: Point3,
    /// u parameter of `point`.
    pub u: f64,
    /// v parameter of `point`.
    pub v: f64,
    /// Distance from the query.
    pub distance: f64,
    /// Unit surface normal at `point`.
    pub normal: Vec3,
    /// True when the parameter step fell below tolerance.
    pub converged: bool,
    /// Gauss–Newton iterations performed.
    pub iterations: usize,
}

/// Project `target` onto a surface.
///
/// Never fails: on a singular Jacobian or when the iteration cap is hit,
/// the best candidate seen so far is returned with `converged == false`.
pub fn surface_closest_point(
    surface: &Surface,
    target: &Point3,
    options: &ClosestPointOptions,
) -> SurfaceClosestPoint {
    let res = options.resolution.max(2);
    let grid = sample_surface_grid(surface, res, res);

    let mut best = (grid.us[0], grid.vs[0], f64::INFINITY);
    for (i, &v) in grid.vs.iter().enumerate() {
        for (j, &u) in grid.us.iter().enumerate() {
            let d = (grid.at(i, j) - target).norm_squared();
            if d < best.2 {
                best = (u, v, d);
            }
        }
    }

    let diff = DifferentialOptions::default();
    let (mut u, mut v) = (best.0, best.1);
    let mut converged = false;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        iterations += 1;
        let frame = surface_frame(surface, u, v, &diff);
        let r = frame.point - target;
        let (pu, pv) = (frame.tangent_u, frame.tangent_v);

        let Some((du, dv)) = solve_2x2(
            pu.dot(&pu),
            pu.dot(&pv),
            pu.dot(&pv),
            pv.dot(&pv),
            -pu.dot(&r),
            -pv.dot(&r),
        ) else {
            tracing::trace!(u, v, "singular closest-point jacobian");
            break;
        };

        let (nu, nv) = surface.clamp_parameters(u + du, v + dv);
        let step = (nu - u).hypot(nv - v);
        u = nu;
        v = nv;

        let d = (surface.evaluate(u, v) - target).norm_squared();
        if d < best.2 {
            best = (u, v, d);
        }
        if step < options.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        tracing::trace!(iterations, "closest point did not converge");
    }

    let frame = surface_frame(surface, best.0, best.1, &diff);
    SurfaceClosestPoint {
        point: frame.point,
        u: best.0,
        v: best.1,
        distance: (frame.point - target).norm(),
        normal: frame.normal,
        converged,
        iterations,
    }
}
