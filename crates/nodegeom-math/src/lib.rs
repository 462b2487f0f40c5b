#![warn(missing_docs)]

//! Math types for the nodegeom kernel.
//!
//! Thin wrappers around nalgebra providing domain-specific aliases
//! for 3D parametric geometry, tolerance constants, and the small dense
//! solvers the kernel needs (Gaussian elimination, 2x2 systems).

use nalgebra::{Matrix3, Matrix4, Unit, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D parameter space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// A 4x4 homogeneous matrix.
pub type Mat4 = Matrix4<f64>;

/// A 3x3 matrix (linear part of an affine map).
pub type Mat3 = Matrix3<f64>;

/// Orthonormality tolerance for frames.
pub const PLANE_EPSILON: f64 = 1e-9;

/// Distance under which two vertices are merged.
pub const MERGE_TOLERANCE: f64 = 1e-6;

/// Upper bound on the number of points gathered from a single value.
pub const MAX_SAMPLE_POINTS: usize = 4096;

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Linear distance tolerance.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default kernel tolerances (1e-6 linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if two angles are effectively equal (in radians).
    pub fn angles_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.angular
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Linear interpolation between two scalars.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Linear interpolation between two points.
pub fn lerp_point(a: &Point3, b: &Point3, t: f64) -> Point3 {
    a + (b - a) * t
}

/// True when all coordinates are finite.
pub fn is_finite_point(p: &Point3) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

/// True when all components are finite.
pub fn is_finite_vec(v: &Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// A unit vector perpendicular to `v`.
///
/// Picks the world axis least aligned with `v` as the reference; returns
/// world X for a zero-length input.
pub fn any_perpendicular(v: &Vec3) -> Vec3 {
    let len = v.norm();
    if len < 1e-12 {
        return Vec3::x();
    }
    let n = v / len;
    let reference = if n.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    let perp = reference - n * reference.dot(&n);
    perp.normalize()
}

/// Centroid of a set of points, or `None` when empty.
pub fn centroid(points: &[Point3]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vec3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
///
/// `a` is row-major and must be square with the same size as `b`.
/// Returns `None` for a malformed or (numerically) singular system.
pub fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return None;
    }

    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |m, v| m.max(v.abs()))
        .max(1.0);
    let eps = 1e-12 * scale;

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < eps {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in (row + 1)..n {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// Solve the 2x2 system `[a11 a12; a21 a22] * [x y] = [b1 b2]`.
pub fn solve_2x2(a11: f64, a12: f64, a21: f64, a22: f64, b1: f64, b2: f64) -> Option<(f64, f64)> {
    let det = a11 * a22 - a12 * a21;
    let scale = a11.abs().max(a12.abs()).max(a21.abs()).max(a22.abs());
    if scale == 0.0 || det.abs() <= 1e-14 * scale * scale {
        return None;
    }
    let x = (b1 * a22 - a12 * b2) / det;
    let y = (a11 * b2 - b1 * a21) / det;
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

/// Solve the 3x3 system `m * x = b`.
pub fn solve_3x3(m: &Mat3, b: &Vec3) -> Option<Vec3> {
    let rows: Vec<Vec<f64>> = (0..3)
        .map(|r| (0..3).map(|c| m[(r, c)]).collect())
        .collect();
    solve_linear_system(rows, vec![b.x, b.y, b.z]).map(|x| Vec3::new(x[0], x[1], x[2]))
}
