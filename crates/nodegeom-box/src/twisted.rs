//! Trilinear hexahedra ("twisted boxes") and their Newton inversion.

use nodegeom_math::{lerp_point, solve_3x3, Mat3, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::oriented::OrientedBox;

/// Newton iteration cap for [`TwistedBox::invert`].
pub const MAX_INVERT_ITERATIONS: usize = 25;

const JACOBIAN_STEP: f64 = 1e-6;

/// A hexahedron with eight free corners, blended trilinearly.
///
/// Corners `A B C D` form the bottom quad at `(0,0,0) (1,0,0) (1,1,0)
/// (0,1,0)`; `E F G H` sit above them at `w = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwistedBox {
    /// Corners `A..H`.
    pub corners: [Point3; 8],
}

/// Result of [`TwistedBox::invert`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwistedBoxParameter {
    /// Parameter along `A → B`.
    pub u: f64,
    /// Parameter along `A → D`.
    pub v: f64,
    /// Parameter along `A → E`.
    pub w: f64,
    /// True when the residual is below tolerance.
    pub success: bool,
    /// Distance between `evaluate(u, v, w)` and the query point.
    pub residual: f64,
    /// Newton iterations performed.
    pub iterations: usize,
}

impl TwistedBox {
    /// Box from corners `A..H`.
    pub fn new(corners: [Point3; 8]) -> Self {
        Self { corners }
    }

    /// Trilinear point at `(u, v, w)`; extrapolates outside `[0, 1]³`.
    pub fn evaluate(&self, u: f64, v: f64, w: f64) -> Point3 {
        let [a, b, c, d, e, f, g, h] = &self.corners;
        let bottom = lerp_point(&lerp_point(a, b, u), &lerp_point(d, c, u), v);
        let top = lerp_point(&lerp_point(e, f, u), &lerp_point(h, g, u), v);
        lerp_point(&bottom, &top, w)
    }

    /// Columns `∂P/∂u, ∂P/∂v, ∂P/∂w` by central differences.
    pub fn jacobian(&self, u: f64, v: f64, w: f64) -> Mat3 {
        let h = JACOBIAN_STEP;
        let du = (self.evaluate(u + h, v, w) - self.evaluate(u - h, v, w)) / (2.0 * h);
        let dv = (self.evaluate(u, v + h, w) - self.evaluate(u, v - h, w)) / (2.0 * h);
        let dw = (self.evaluate(u, v, w + h) - self.evaluate(u, v, w - h)) / (2.0 * h);
        Mat3::from_columns(&[du, dv, dw])
    }

    /// Centre of the box (`evaluate(0.5, 0.5, 0.5)`).
    pub fn center(&self) -> Point3 {
        self.evaluate(0.5, 0.5, 0.5)
    }

    /// A representative size: the longest corner-to-corner diagonal.
    pub fn diagonal(&self) -> f64 {
        let c = &self.corners;
        [(0, 6), (1, 7), (2, 4), (3, 5)]
            .iter()
            .map(|&(i, j)| (c[j] - c[i]).norm())
            .fold(0.0, f64::max)
    }

    /// The box with every corner passed through `f`.
    pub fn map_corners(&self, f: impl Fn(&Point3) -> Point3) -> Self {
        Self {
            corners: self.corners.map(|p| f(&p)),
        }
    }

    /// Box parameters of a world point by Newton–Raphson.
    ///
    /// Starts at the centre and runs at most [`MAX_INVERT_ITERATIONS`]
    /// steps. A singular Jacobian stops early. The iterate with the smallest
    /// residual is returned; `success` reports whether that residual fell
    /// below `1e-6` of the box diagonal.
    pub fn invert(&self, p: &Point3) -> TwistedBoxParameter {
        let tol = 1e-6 * self.diagonal().max(1e-12);
        let mut x = Vec3::new(0.5, 0.5, 0.5);
        let mut residual = (self.evaluate(x.x, x.y, x.z) - p).norm();
        let (mut best, mut best_residual) = (x, residual);
        let mut iterations = 0;

        while iterations < MAX_INVERT_ITERATIONS && residual > tol {
            iterations += 1;
            let r = self.evaluate(x.x, x.y, x.z) - p;
            let j = self.jacobian(x.x, x.y, x.z);
            let Some(step) = solve_3x3(&j, &(-r)) else {
                tracing::trace!(iterations, "singular twisted-box jacobian");
                break;
            };
            x += step;
            residual = (self.evaluate(x.x, x.y, x.z) - p).norm();
            if residual < best_residual {
                best = x;
                best_residual = residual;
            }
            if step.norm() < 1e-14 {
                break;
            }
        }

        let success = best_residual <= tol;
        if !success {
            tracing::trace!(
                residual = best_residual,
                iterations,
                "twisted-box inversion did not converge"
            );
        }
        TwistedBoxParameter {
            u: best.x,
            v: best.y,
            w: best.z,
            success,
            residual: best_residual,
            iterations,
        }
    }
}

impl From<&OrientedBox> for TwistedBox {
    fn from(b: &OrientedBox) -> Self {
        Self::new(b.corners())
    }
}

impl From<OrientedBox> for TwistedBox {
    fn from(b: OrientedBox) -> Self {
        Self::new(b.corners())
    }
}
