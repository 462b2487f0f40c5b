//! Sphere fitting: algebraic least squares with a bounding-sphere fallback.

use nodegeom_math::{solve_linear_system, Point3};
use serde::{Deserialize, Serialize};

/// How a [`SphereFit`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SphereFitMethod {
    /// Algebraic least-squares fit.
    LeastSquares,
    /// Ritter bounding sphere.
    BoundingSphere,
}

/// A fitted sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereFit {
    /// Centre.
    pub center: Point3,
    /// Radius.
    pub radius: f64,
    /// Which algorithm produced the fit.
    pub method: SphereFitMethod,
}

/// Least-squares sphere through `points`.
///
/// Solves `x·D + y·E + z·F + G = −(x² + y² + z²)` through the normal
/// equations; the centre is `(−D/2, −E/2, −F/2)` and the radius
/// `√(|c|² − G)`. Falls back to [`bounding_sphere`] with fewer than four
/// points, a singular system or a non-positive squared radius. `None` only
/// for an empty input.
pub fn fit_sphere(points: &[Point3]) -> Option<SphereFit> {
    if points.len() < 4 {
        tracing::debug!(count = points.len(), "too few points for sphere fit");
        return bounding_sphere(points);
    }

    let mut ata = vec![vec![0.0; 4]; 4];
    let mut atb = vec![0.0; 4];
    for p in points {
        let row = [p.x, p.y, p.z, 1.0];
        let rhs = -p.coords.norm_squared();
        for i in 0..4 {
            for j in 0..4 {
                ata[i][j] += row[i] * row[j];
            }
            atb[i] += row[i] * rhs;
        }
    }

    let Some(x) = solve_linear_system(ata, atb) else {
        tracing::debug!("singular sphere fit, using bounding sphere");
        return bounding_sphere(points);
    };
    let center = Point3::new(-0.5 * x[0], -0.5 * x[1], -0.5 * x[2]);
    let r2 = center.coords.norm_squared() - x[3];
    if !(r2 > 0.0) || !r2.is_finite() {
        tracing::debug!(r2, "non-positive sphere fit radius, using bounding sphere");
        return bounding_sphere(points);
    }
    Some(SphereFit {
        center,
        radius: r2.sqrt(),
        method: SphereFitMethod::LeastSquares,
    })
}

/// Ritter's approximate minimal bounding sphere. `None` for an empty input.
pub fn bounding_sphere(points: &[Point3]) -> Option<SphereFit> {
    let first = *points.first()?;
    let farthest = |from: &Point3| {
        points
            .iter()
            .copied()
            .max_by(|a, b| (a - from).norm_squared().total_cmp(&(b - from).norm_squared()))
            .unwrap_or(*from)
    };
    let a = farthest(&first);
    let b = farthest(&a);
    let mut center = nalgebra::center(&a, &b);
    let mut radius = 0.5 * (b - a).norm();

    for p in points {
        let d = (p - center).norm();
        if d > radius {
            let grown = 0.5 * (radius + d);
            center += (p - center) * ((grown - radius) / d);
            radius = grown;
        }
    }

    Some(SphereFit {
        center,
        radius,
        method: SphereFitMethod::BoundingSphere,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nodegeom_math::Vec3;

    fn sphere_points(c: Point3, r: f64) -> Vec<Point3> {
        let mut pts = Vec::new();
        for i in 0..6 {
            for j in 1..5 {
                let lon = i as f64 * 1.1;
                let lat = -1.2 + j as f64 * 0.5;
                pts.push(c + Vec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()) * r);
            }
        }
        pts
    }

    #[test]
    fn test_fit_recovers_exact_sphere() {
        let c = Point3::new(1.0, -2.0, 3.5);
        let fit = fit_sphere(&sphere_points(c, 4.0)).unwrap();
        assert_eq!(fit.method, SphereFitMethod::LeastSquares);
        assert_abs_diff_eq!((fit.center - c).norm(), 0.0, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.radius, 4.0, epsilon = 1e-8);
    }

    #[test]
    fn test_fit_with_four_points() {
        let pts = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let fit = fit_sphere(&pts).unwrap();
        assert_abs_diff_eq!(fit.radius, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.center.coords.norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fallbacks() {
        assert!(fit_sphere(&[]).is_none());

        let two = [Point3::origin(), Point3::new(2.0, 0.0, 0.0)];
        let fit = fit_sphere(&two).unwrap();
        assert_eq!(fit.method, SphereFitMethod::BoundingSphere);
        assert_abs_diff_eq!(fit.radius, 1.0);

        // Collinear points make the system singular.
        let line: Vec<Point3> = (0..6).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        let fit = fit_sphere(&line).unwrap();
        assert_eq!(fit.method, SphereFitMethod::BoundingSphere);
        assert_abs_diff_eq!(fit.center.x, 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_bounding_sphere_contains_all() {
        let pts: Vec<Point3> = (0..20)
            .map(|i| {
                let t = i as f64;
                Point3::new(t.sin() * 3.0, (t * 0.7).cos(), t * 0.1)
            })
            .collect();
        let s = bounding_sphere(&pts).unwrap();
        for p in &pts {
            assert!((p - s.center).norm() <= s.radius + 1e-9);
        }
    }
}
