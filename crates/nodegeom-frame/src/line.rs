//! Straight line segments, used as axes by transforms and morphs.

use nodegeom_math::{Point3, Vec3};
use serde::{Deserialize, Serialize};

/// A directed line segment from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Start point.
    pub from: Point3,
    /// End point.
    pub to: Point3,
}

impl Line {
    /// Line between two points.
    pub fn new(from: Point3, to: Point3) -> Self {
        Self { from, to }
    }

    /// Line from a start point along a vector.
    pub fn from_direction(from: Point3, direction: Vec3) -> Self {
        Self {
            from,
            to: from + direction,
        }
    }

    /// `to − from`.
    pub fn vector(&self) -> Vec3 {
        self.to - self.from
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// Unit direction, or `None` for a zero-length segment.
    pub fn direction(&self) -> Option<Vec3> {
        let v = self.vector();
        let len = v.norm();
        (len > 1e-12 && len.is_finite()).then(|| v / len)
    }

    /// Point at normalized parameter `t` (0 = from, 1 = to); not clamped.
    pub fn point_at(&self, t: f64) -> Point3 {
        self.from + self.vector() * t
    }

    /// Normalized parameter of the orthogonal projection of `p` onto the
    /// infinite line. A zero-length segment returns 0.
    pub fn closest_parameter(&self, p: &Point3) -> f64 {
        let v = self.vector();
        let len2 = v.norm_squared();
        if len2 < 1e-24 {
            return 0.0;
        }
        (p - self.from).dot(&v) / len2
    }

    /// Closest point on the segment (clamped to the endpoints).
    pub fn closest_point(&self, p: &Point3) -> Point3 {
        self.point_at(self.closest_parameter(p).clamp(0.0, 1.0))
    }

    /// The same segment traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_closest_parameter_unclamped() {
        let l = Line::new(Point3::origin(), Point3::new(0.0, 0.0, 10.0));
        assert_abs_diff_eq!(l.closest_parameter(&Point3::new(1.0, 0.0, 5.0)), 0.5);
        assert_abs_diff_eq!(l.closest_parameter(&Point3::new(1.0, 0.0, 15.0)), 1.5);
        assert_abs_diff_eq!(l.closest_point(&Point3::new(1.0, 0.0, 15.0)).z, 10.0);
    }

    #[test]
    fn test_zero_length_line() {
        let l = Line::new(Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 1.0));
        assert!(l.direction().is_none());
        assert_eq!(l.closest_parameter(&Point3::origin()), 0.0);
    }
}
