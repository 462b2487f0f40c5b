//! Curve types that surfaces are built from and morphs flow along.

use std::fmt;
use std::sync::Arc;

use nodegeom_frame::{Domain, Line, Plane, PointMap};
use nodegeom_math::{Mat4, Point3, Vec3};

/// The kind of a curve (for match-based dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    /// Straight segment.
    Line,
    /// Piecewise-linear curve through points.
    Polyline,
    /// Circular arc or full circle.
    Arc,
    /// Smooth Catmull–Rom curve through points.
    Interpolated,
    /// Caller-provided function.
    Function,
    /// Another curve composed with a point map.
    Mapped,
}

/// A parametric curve in 3D space.
pub trait Curve3d: Send + Sync + fmt::Debug {
    /// Evaluate the curve at parameter `t`.
    fn evaluate(&self, t: f64) -> Point3;

    /// Derivative with respect to `t`.
    ///
    /// The default is a central finite difference clamped to the domain.
    fn tangent(&self, t: f64) -> Vec3 {
        let d = self.domain();
        let h = d.length.max(1e-9) * 1e-6;
        let t0 = (t - h).max(d.min);
        let t1 = (t + h).min(d.max);
        if t1 - t0 < 1e-15 {
            return Vec3::zeros();
        }
        (self.evaluate(t1) - self.evaluate(t0)) / (t1 - t0)
    }

    /// Parameter domain.
    fn domain(&self) -> Domain;

    /// The kind of this curve.
    fn curve_type(&self) -> CurveKind;

    /// Clone this curve into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Curve3d>;

    /// True when the start and end points coincide.
    fn is_closed(&self) -> bool {
        let d = self.domain();
        (self.evaluate(d.start) - self.evaluate(d.end)).norm() < 1e-9
    }

    /// Suggested number of segments for sampling.
    fn suggested_segments(&self) -> usize {
        32
    }

    /// The curve's own plane, when it has one (arcs, circles).
    fn plane(&self) -> Option<Plane> {
        None
    }

    /// Apply an affine matrix, returning a new curve.
    ///
    /// The default composes the curve with the matrix; kinds that stay
    /// closed under affine maps override it with an exact rebuild.
    fn transform(&self, m: &Mat4) -> Box<dyn Curve3d> {
        let m = *m;
        Box::new(MappedCurve::new(
            self.clone_box(),
            Arc::new(move |p: &Point3| m.transform_point(p)),
        ))
    }

    /// Apply an arbitrary point map, returning a new curve.
    fn map_points(&self, map: &PointMap) -> Box<dyn Curve3d> {
        Box::new(MappedCurve::new(self.clone_box(), map.clone()))
    }
}

impl Clone for Box<dyn Curve3d> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// =============================================================================
// Line
// =============================================================================

/// A straight segment parameterized over `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineCurve {
    /// The underlying segment.
    pub line: Line,
}

impl LineCurve {
    /// Line between two points.
    pub fn new(from: Point3, to: Point3) -> Self {
        Self {
            line: Line::new(from, to),
        }
    }
}

impl From<Line> for LineCurve {
    fn from(line: Line) -> Self {
        Self { line }
    }
}

impl Curve3d for LineCurve {
    fn evaluate(&self, t: f64) -> Point3 {
        self.line.point_at(t)
    }

    fn tangent(&self, _t: f64) -> Vec3 {
        self.line.vector()
    }

    fn domain(&self) -> Domain {
        Domain::unit()
    }

    fn curve_type(&self) -> CurveKind {
        CurveKind::Line
    }

    fn clone_box(&self) -> Box<dyn Curve3d> {
        Box::new(self.clone())
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn suggested_segments(&self) -> usize {
        1
    }

    fn transform(&self, m: &Mat4) -> Box<dyn Curve3d> {
        Box::new(LineCurve::new(
            m.transform_point(&self.line.from),
            m.transform_point(&self.line.to),
        ))
    }
}

// =============================================================================
// Polyline
// =============================================================================

/// A piecewise-linear curve; parameter `i` is vertex `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineCurve {
    /// Vertices in order.
    pub points: Vec<Point3>,
    /// Whether a closing segment joins the last vertex back to the first.
    pub closed: bool,
}

impl PolylineCurve {
    /// Open polyline through `points`.
    pub fn new(points: Vec<Point3>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    /// Closed polygon through `points`.
    pub fn closed(points: Vec<Point3>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    fn segment_count(&self) -> usize {
        match self.points.len() {
            0 | 1 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    fn segment_at(&self, t: f64) -> (usize, f64) {
        let segments = self.segment_count();
        let i = (t.floor().max(0.0) as usize).min(segments - 1);
        (i, t - i as f64)
    }
}

impl Curve3d for PolylineCurve {
    fn evaluate(&self, t: f64) -> Point3 {
        match self.points.len() {
            0 => Point3::origin(),
            1 => self.points[0],
            n => {
                let (i, f) = self.segment_at(t);
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a + (b - a) * f
            }
        }
    }

    fn tangent(&self, t: f64) -> Vec3 {
        let n = self.points.len();
        if n < 2 {
            return Vec3::zeros();
        }
        let (i, _) = self.segment_at(t);
        self.points[(i + 1) % n] - self.points[i]
    }

    fn domain(&self) -> Domain {
        Domain::new(0.0, self.segment_count().max(1) as f64)
    }

    fn curve_type(&self) -> CurveKind {
        CurveKind::Polyline
    }

    fn clone_box(&self) -> Box<dyn Curve3d> {
        Box::new(self.clone())
    }

    fn is_closed(&self) -> bool {
        self.closed
            || (self.points.len() > 2
                && (self.points[0] - self.points[self.points.len() - 1]).norm() < 1e-9)
    }

    fn suggested_segments(&self) -> usize {
        self.segment_count().max(1)
    }

    fn transform(&self, m: &Mat4) -> Box<dyn Curve3d> {
        Box::new(PolylineCurve {
            points: self.points.iter().map(|p| m.transform_point(p)).collect(),
            closed: self.closed,
        })
    }

    fn map_points(&self, map: &PointMap) -> Box<dyn Curve3d> {
        Box::new(PolylineCurve {
            points: self.points.iter().map(|p| map(p)).collect(),
            closed: self.closed,
        })
    }
}

// =============================================================================
// Arc
// =============================================================================

/// A circular arc in a plane.
///
/// Parameterization: `P(t) = origin + radius * (cos(t) * x_axis + sin(t) * y_axis)`
/// for `t` in the angle domain (radians).
#[derive(Debug, Clone, PartialEq)]
pub struct ArcCurve {
    /// Plane whose origin is the arc centre.
    pub plane: Plane,
    /// Radius.
    pub radius: f64,
    /// Angle interval in radians.
    pub angle: Domain,
}

impl ArcCurve {
    /// Arc spanning `angle` radians.
    pub fn new(plane: Plane, radius: f64, angle: Domain) -> Self {
        Self {
            plane,
            radius,
            angle,
        }
    }

    /// Full circle.
    pub fn circle(plane: Plane, radius: f64) -> Self {
        Self::new(plane, radius, Domain::new(0.0, std::f64::consts::TAU))
    }

    /// Arc length.
    pub fn length(&self) -> f64 {
        self.radius.abs() * self.angle.length
    }
}

impl Curve3d for ArcCurve {
    fn evaluate(&self, t: f64) -> Point3 {
        let (s, c) = t.sin_cos();
        self.plane.point_at(self.radius * c, self.radius * s)
    }

    fn tangent(&self, t: f64) -> Vec3 {
        let (s, c) = t.sin_cos();
        (self.plane.y_axis * c - self.plane.x_axis * s) * self.radius
    }

    fn domain(&self) -> Domain {
        self.angle
    }

    fn curve_type(&self) -> CurveKind {
        CurveKind::Arc
    }

    fn clone_box(&self) -> Box<dyn Curve3d> {
        Box::new(self.clone())
    }

    fn is_closed(&self) -> bool {
        (self.angle.length - std::f64::consts::TAU).abs() < 1e-9
    }

    fn suggested_segments(&self) -> usize {
        ((self.angle.length / std::f64::consts::TAU) * 64.0).ceil().max(4.0) as usize
    }

    fn plane(&self) -> Option<Plane> {
        Some(self.plane)
    }

    fn transform(&self, m: &Mat4) -> Box<dyn Curve3d> {
        let x = m.transform_vector(&self.plane.x_axis);
        let y = m.transform_vector(&self.plane.y_axis);
        let z = m.transform_vector(&self.plane.z_axis);
        let sx = x.norm();
        let similar = (sx - y.norm()).abs() < 1e-9 * sx.max(1.0)
            && (sx - z.norm()).abs() < 1e-9 * sx.max(1.0)
            && x.dot(&y).abs() < 1e-9 * sx * sx
            && x.dot(&z).abs() < 1e-9 * sx * sx
            && y.dot(&z).abs() < 1e-9 * sx * sx;
        if !similar || sx < 1e-12 {
            let m = *m;
            return Box::new(MappedCurve::new(
                self.clone_box(),
                Arc::new(move |p: &Point3| m.transform_point(p)),
            ));
        }
        // Orthonormal images of x and y; a reflection only flips the normal.
        let plane = Plane {
            origin: m.transform_point(&self.plane.origin),
            x_axis: x / sx,
            y_axis: y / sx,
            z_axis: (x / sx).cross(&(y / sx)),
        };
        Box::new(ArcCurve::new(plane, self.radius * sx, self.angle))
    }
}

// =============================================================================
// Interpolated (Catmull–Rom)
// =============================================================================

/// A uniform Catmull–Rom curve through points; parameter `i` is point `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedCurve {
    /// Points the curve passes through.
    pub points: Vec<Point3>,
}

impl InterpolatedCurve {
    /// Curve through `points`.
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    fn point(&self, i: isize) -> Point3 {
        let n = self.points.len() as isize;
        if i < 0 {
            // Reflect the first segment to extend past the start.
            let a = self.points[0];
            let b = self.points[1.min(n as usize - 1)];
            return a + (a - b);
        }
        if i >= n {
            let a = self.points[n as usize - 1];
            let b = self.points[(n - 2).max(0) as usize];
            return a + (a - b);
        }
        self.points[i as usize]
    }
}

/// Uniform Catmull–Rom blend of four points at local parameter `f`.
pub(crate) fn catmull_rom(p0: &Point3, p1: &Point3, p2: &Point3, p3: &Point3, f: f64) -> Point3 {
    let f2 = f * f;
    let f3 = f2 * f;
    let c0 = -0.5 * f3 + f2 - 0.5 * f;
    let c1 = 1.5 * f3 - 2.5 * f2 + 1.0;
    let c2 = -1.5 * f3 + 2.0 * f2 + 0.5 * f;
    let c3 = 0.5 * f3 - 0.5 * f2;
    Point3::from(p0.coords * c0 + p1.coords * c1 + p2.coords * c2 + p3.coords * c3)
}

impl Curve3d for InterpolatedCurve {
    fn evaluate(&self, t: f64) -> Point3 {
        match self.points.len() {
            0 => Point3::origin(),
            1 => self.points[0],
            n => {
                let i = (t.floor().max(0.0) as usize).min(n - 2);
                let f = t - i as f64;
                let i = i as isize;
                catmull_rom(
                    &self.point(i - 1),
                    &self.point(i),
                    &self.point(i + 1),
                    &self.point(i + 2),
                    f,
                )
            }
        }
    }

    fn domain(&self) -> Domain {
        Domain::new(0.0, (self.points.len().max(2) - 1) as f64)
    }

    fn curve_type(&self) -> CurveKind {
        CurveKind::Interpolated
    }

    fn clone_box(&self) -> Box<dyn Curve3d> {
        Box::new(self.clone())
    }

    fn suggested_segments(&self) -> usize {
        self.points.len().max(2) * 8
    }

    fn transform(&self, m: &Mat4) -> Box<dyn Curve3d> {
        // Catmull–Rom weights sum to one, so affine maps commute with it.
        Box::new(InterpolatedCurve::new(
            self.points.iter().map(|p| m.transform_point(p)).collect(),
        ))
    }
}

// =============================================================================
// Function and mapped curves
// =============================================================================

/// A curve given by a caller-provided function.
#[derive(Clone)]
pub struct FnCurve {
    f: Arc<dyn Fn(f64) -> Point3 + Send + Sync>,
    domain: Domain,
}

impl FnCurve {
    /// Curve `t ↦ f(t)` over `domain`.
    pub fn new<F>(domain: Domain, f: F) -> Self
    where
        F: Fn(f64) -> Point3 + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(f),
            domain,
        }
    }
}

impl fmt::Debug for FnCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCurve")
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

impl Curve3d for FnCurve {
    fn evaluate(&self, t: f64) -> Point3 {
        (self.f)(t)
    }

    fn domain(&self) -> Domain {
        self.domain
    }

    fn curve_type(&self) -> CurveKind {
        CurveKind::Function
    }

    fn clone_box(&self) -> Box<dyn Curve3d> {
        Box::new(self.clone())
    }
}

/// A curve composed with a point map: `P(t) = map(inner(t))`.
#[derive(Clone)]
pub struct MappedCurve {
    inner: Box<dyn Curve3d>,
    map: PointMap,
}

impl MappedCurve {
    /// Compose `inner` with `map`.
    pub fn new(inner: Box<dyn Curve3d>, map: PointMap) -> Self {
        Self { inner, map }
    }

    /// The curve before mapping.
    pub fn inner(&self) -> &dyn Curve3d {
        self.inner.as_ref()
    }
}

impl fmt::Debug for MappedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedCurve")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl Curve3d for MappedCurve {
    fn evaluate(&self, t: f64) -> Point3 {
        (self.map)(&self.inner.evaluate(t))
    }

    fn domain(&self) -> Domain {
        self.inner.domain()
    }

    fn curve_type(&self) -> CurveKind {
        CurveKind::Mapped
    }

    fn clone_box(&self) -> Box<dyn Curve3d> {
        Box::new(self.clone())
    }

    fn suggested_segments(&self) -> usize {
        self.inner.suggested_segments().max(16)
    }
}

// =============================================================================
// Sampling and measurement
// =============================================================================

/// `segments + 1` points evenly spaced in parameter.
pub fn sample_curve(curve: &dyn Curve3d, segments: usize) -> Vec<Point3> {
    curve
        .domain()
        .samples(segments)
        .into_iter()
        .map(|t| curve.evaluate(t))
        .collect()
}

/// Polyline approximation of the curve length.
pub fn curve_length(curve: &dyn Curve3d, segments: usize) -> f64 {
    sample_curve(curve, segments)
        .windows(2)
        .map(|w| (w[1] - w[0]).norm())
        .sum()
}

/// Cumulative arc length against parameter, for arc-length reparameterization.
#[derive(Debug, Clone)]
pub struct ArcLengthTable {
    params: Vec<f64>,
    lengths: Vec<f64>,
}

impl ArcLengthTable {
    /// Tabulate `curve` at `segments + 1` parameters.
    pub fn new(curve: &dyn Curve3d, segments: usize) -> Self {
        let params = curve.domain().samples(segments.max(1));
        let mut lengths = Vec::with_capacity(params.len());
        let mut total = 0.0;
        let mut prev = curve.evaluate(params[0]);
        for &t in &params {
            let p = curve.evaluate(t);
            total += (p - prev).norm();
            lengths.push(total);
            prev = p;
        }
        Self { params, lengths }
    }

    /// Total length.
    pub fn total(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Arc length from the start of the domain to parameter `t` (clamped).
    pub fn length_at(&self, t: f64) -> f64 {
        let first = self.params[0];
        let last = self.params[self.params.len() - 1];
        if (last - first).abs() < 1e-15 {
            return 0.0;
        }
        let s = ((t - first) / (last - first)).clamp(0.0, 1.0) * (self.params.len() - 1) as f64;
        let i = (s.floor() as usize).min(self.params.len() - 2);
        let f = s - i as f64;
        self.lengths[i] + (self.lengths[i + 1] - self.lengths[i]) * f
    }

    /// Parameter at arc length `length` (clamped to the curve).
    pub fn parameter_at(&self, length: f64) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return self.params[0];
        }
        let length = length.clamp(0.0, total);
        let i = match self
            .lengths
            .binary_search_by(|l| l.total_cmp(&length))
        {
            Ok(i) => return self.params[i],
            Err(i) => i.clamp(1, self.lengths.len() - 1),
        };
        let (l0, l1) = (self.lengths[i - 1], self.lengths[i]);
        let f = if l1 - l0 > 1e-15 { (length - l0) / (l1 - l0) } else { 0.0 };
        self.params[i - 1] + (self.params[i] - self.params[i - 1]) * f
    }
}

/// Result of projecting a point onto a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveClosestPoint {
    /// Curve parameter of the closest point.
    pub parameter: f64,
    /// The closest point.
    pub point: Point3,
    /// Distance from the query point.
    pub distance: f64,
}

/// Closest point on a curve by dense polyline sampling, refined by local
/// step-halving around the best sample.
pub fn closest_parameter(curve: &dyn Curve3d, p: &Point3, samples: usize) -> CurveClosestPoint {
    let domain = curve.domain();
    let samples = samples.max(8);
    let mut best_t = domain.start;
    let mut best_d = f64::INFINITY;
    for t in domain.samples(samples) {
        let d = (curve.evaluate(t) - p).norm_squared();
        if d < best_d {
            best_d = d;
            best_t = t;
        }
    }

    let mut step = domain.length / samples as f64;
    let mut iterations = 0;
    while step > domain.length.max(1.0) * 1e-12 && iterations < 64 {
        iterations += 1;
        let mut improved = false;
        for candidate in [best_t - step, best_t + step] {
            let t = domain.clamp(candidate);
            let d = (curve.evaluate(t) - p).norm_squared();
            if d < best_d {
                best_d = d;
                best_t = t;
                improved = true;
            }
        }
        if !improved {
            step *= 0.5;
        }
    }

    let point = curve.evaluate(best_t);
    CurveClosestPoint {
        parameter: best_t,
        point,
        distance: (point - p).norm(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn test_line_curve() {
        let l = LineCurve::new(Point3::origin(), Point3::new(0.0, 0.0, 10.0));
        assert_abs_diff_eq!(l.evaluate(0.5).z, 5.0);
        assert_abs_diff_eq!(l.tangent(0.2).z, 10.0);
        assert!(!l.is_closed());
    }

    #[test]
    fn test_polyline_evaluate_and_closed() {
        let square = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let open = PolylineCurve::new(square.clone());
        assert_eq!(open.domain().end, 3.0);
        assert_abs_diff_eq!(open.evaluate(1.5).y, 0.5);
        assert_abs_diff_eq!(open.evaluate(3.0).x, 0.0);

        let closed = PolylineCurve::closed(square);
        assert_eq!(closed.domain().end, 4.0);
        assert!(closed.is_closed());
        assert_abs_diff_eq!(closed.evaluate(3.5).y, 0.5);
        assert_abs_diff_eq!(curve_length(&closed, 400), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circle_length_and_closed() {
        let c = ArcCurve::circle(Plane::world_xy(), 2.0);
        assert!(c.is_closed());
        assert_abs_diff_eq!(curve_length(&c, 2000), 2.0 * TAU, epsilon = 1e-4);
        let p = c.evaluate(FRAC_PI_2);
        assert_abs_diff_eq!(p.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_arc_transform_stays_arc_under_similarity() {
        let c = ArcCurve::new(Plane::world_xy(), 1.0, Domain::new(0.0, PI));
        let mut m = Mat4::identity();
        m[(0, 0)] = 3.0;
        m[(1, 1)] = 3.0;
        m[(2, 2)] = 3.0;
        m[(0, 3)] = 1.0;
        let t = c.transform(&m);
        assert_eq!(t.curve_type(), CurveKind::Arc);
        assert_abs_diff_eq!(t.evaluate(0.0).x, 4.0, epsilon = 1e-12);

        m[(2, 2)] = 1.0;
        m[(1, 1)] = 2.0;
        let t = c.transform(&m);
        assert_eq!(t.curve_type(), CurveKind::Mapped);
        assert_abs_diff_eq!(t.evaluate(FRAC_PI_2).y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolated_passes_through_points() {
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(3.0, 1.0, 1.0),
            Point3::new(4.0, 0.0, 0.0),
        ];
        let c = InterpolatedCurve::new(pts.clone());
        for (i, p) in pts.iter().enumerate() {
            assert!((c.evaluate(i as f64) - p).norm() < 1e-12);
        }
    }

    #[test]
    fn test_arc_length_table() {
        let l = LineCurve::new(Point3::origin(), Point3::new(10.0, 0.0, 0.0));
        let table = ArcLengthTable::new(&l, 10);
        assert_abs_diff_eq!(table.total(), 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(table.parameter_at(2.5), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(table.length_at(0.75), 7.5, epsilon = 1e-12);
        assert_abs_diff_eq!(table.parameter_at(20.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_closest_parameter_on_circle() {
        let c = ArcCurve::circle(Plane::world_xy(), 5.0);
        let hit = closest_parameter(&c, &Point3::new(0.0, 10.0, 3.0), 64);
        assert_abs_diff_eq!(hit.parameter, FRAC_PI_2, epsilon = 1e-6);
        assert_abs_diff_eq!(hit.point.y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mapped_curve() {
        let l = LineCurve::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let map: PointMap = Arc::new(|p: &Point3| Point3::new(p.x, p.x * p.x, 0.0));
        let m = l.map_points(&map);
        assert_eq!(m.curve_type(), CurveKind::Mapped);
        assert_abs_diff_eq!(m.evaluate(0.5).y, 0.25);
    }
}
