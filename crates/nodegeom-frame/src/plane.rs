//! Orthonormal planes (local frames) and their coercion sources.

use nodegeom_math::{any_perpendicular, is_finite_point, is_finite_vec, Mat4, Point2, Point3, Vec3};
use serde::{Deserialize, Serialize};

const AXIS_EPSILON: f64 = 1e-12;

/// An orthonormal local frame embedded in world space.
///
/// Parameterization: `P(u, v, w) = origin + u * x_axis + v * y_axis + w * z_axis`
///
/// The three axes are unit length and mutually orthogonal, with
/// `z_axis = x_axis × y_axis`. Constructors repair near-orthogonal input by
/// Gram–Schmidt and fall back to the world XY frame when the input is
/// degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Origin of the frame.
    pub origin: Point3,
    /// Unit vector along local u.
    pub x_axis: Vec3,
    /// Unit vector along local v.
    pub y_axis: Vec3,
    /// Unit normal (`x_axis × y_axis`).
    pub z_axis: Vec3,
}

impl Plane {
    /// World XY plane at the origin.
    pub fn world_xy() -> Self {
        Self {
            origin: Point3::origin(),
            x_axis: Vec3::x(),
            y_axis: Vec3::y(),
            z_axis: Vec3::z(),
        }
    }

    /// World XZ plane at the origin (normal −Y).
    pub fn world_xz() -> Self {
        Self {
            origin: Point3::origin(),
            x_axis: Vec3::x(),
            y_axis: Vec3::z(),
            z_axis: -Vec3::y(),
        }
    }

    /// World YZ plane at the origin (normal +X).
    pub fn world_yz() -> Self {
        Self {
            origin: Point3::origin(),
            x_axis: Vec3::y(),
            y_axis: Vec3::z(),
            z_axis: Vec3::x(),
        }
    }

    /// World XY plane moved to `origin` (or left at the world origin when
    /// `origin` is not finite).
    pub fn world_xy_at(origin: Point3) -> Self {
        let mut plane = Self::world_xy();
        if is_finite_point(&origin) {
            plane.origin = origin;
        }
        plane
    }

    /// Build a frame from an origin and two in-plane axes.
    ///
    /// `y_axis` is made orthogonal to `x_axis` by Gram–Schmidt; it does not
    /// need to be normalized or exactly perpendicular.
    pub fn from_origin_axes(origin: Point3, x_axis: Vec3, y_axis: Vec3) -> Self {
        if !is_finite_point(&origin) || !is_finite_vec(&x_axis) || !is_finite_vec(&y_axis) {
            tracing::debug!("non-finite plane input, using world XY");
            return Self::world_xy_at(origin);
        }
        let x_len = x_axis.norm();
        if x_len < AXIS_EPSILON {
            tracing::debug!("zero-length plane x axis, using world XY");
            return Self::world_xy_at(origin);
        }
        let x = x_axis / x_len;
        let y_perp = y_axis - x * y_axis.dot(&x);
        let y_len = y_perp.norm();
        if y_len < AXIS_EPSILON * y_axis.norm().max(1.0) {
            tracing::debug!("plane y axis parallel to x axis, using world XY");
            return Self::world_xy_at(origin);
        }
        let y = y_perp / y_len;
        Self {
            origin,
            x_axis: x,
            y_axis: y,
            z_axis: x.cross(&y),
        }
    }

    /// Build a frame from origin and normal. X/Y directions are chosen arbitrarily.
    pub fn from_origin_normal(origin: Point3, normal: Vec3) -> Self {
        if !is_finite_vec(&normal) || normal.norm() < AXIS_EPSILON {
            tracing::debug!("degenerate plane normal, using world XY");
            return Self::world_xy_at(origin);
        }
        let n = normal.normalize();
        // Keep world X as the x axis whenever the normal allows it.
        let x = if n.x.abs() < 0.9 {
            let r = Vec3::x();
            (r - n * r.dot(&n)).normalize()
        } else {
            any_perpendicular(&n)
        };
        let y = n.cross(&x);
        Self {
            origin,
            x_axis: x,
            y_axis: y,
            z_axis: n,
        }
    }

    /// Build a frame from three points: origin `a`, x axis `b − a`, normal
    /// `(b − a) × (c − a)`.
    ///
    /// Near-collinear points fall back to an axis-aligned frame at `a`.
    pub fn from_points(a: Point3, b: Point3, c: Point3) -> Self {
        let ab = b - a;
        let ac = c - a;
        let normal = ab.cross(&ac);
        let scale = ab.norm() * ac.norm();
        if scale < AXIS_EPSILON || normal.norm() < 1e-9 * scale {
            tracing::debug!("collinear plane points, using axis-aligned frame");
            return Self::world_xy_at(a);
        }
        let x = ab.normalize();
        let z = normal.normalize();
        let y = z.cross(&x);
        Self {
            origin: a,
            x_axis: x,
            y_axis: y,
            z_axis: z,
        }
    }

    /// Unit normal of the plane.
    pub fn normal(&self) -> Vec3 {
        self.z_axis
    }

    /// Point at in-plane coordinates `(u, v)`.
    pub fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.origin + self.x_axis * u + self.y_axis * v
    }

    /// Point at local coordinates `(u, v, w)`.
    pub fn apply(&self, u: f64, v: f64, w: f64) -> Point3 {
        self.origin + self.x_axis * u + self.y_axis * v + self.z_axis * w
    }

    /// Local `(u, v, w)` coordinates of a world point.
    pub fn coordinates(&self, p: &Point3) -> Vec3 {
        let d = p - self.origin;
        Vec3::new(d.dot(&self.x_axis), d.dot(&self.y_axis), d.dot(&self.z_axis))
    }

    /// Project a world point onto this plane's `(u, v)` parameter space.
    pub fn project(&self, p: &Point3) -> Point2 {
        let c = self.coordinates(p);
        Point2::new(c.x, c.y)
    }

    /// Signed distance from a point to this plane.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(&self.z_axis)
    }

    /// Orthogonal projection of a point onto the plane.
    pub fn closest_point(&self, p: &Point3) -> Point3 {
        p - self.z_axis * self.signed_distance(p)
    }

    /// Express a world vector in local axes.
    pub fn vector_coordinates(&self, v: &Vec3) -> Vec3 {
        Vec3::new(v.dot(&self.x_axis), v.dot(&self.y_axis), v.dot(&self.z_axis))
    }

    /// World vector from local components.
    pub fn vector_at(&self, local: &Vec3) -> Vec3 {
        self.x_axis * local.x + self.y_axis * local.y + self.z_axis * local.z
    }

    /// The same plane with the normal reversed (x and y swapped).
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            x_axis: self.y_axis,
            y_axis: self.x_axis,
            z_axis: -self.z_axis,
        }
    }

    /// The same orientation at a new origin.
    pub fn with_origin(&self, origin: Point3) -> Self {
        Self { origin, ..*self }
    }

    /// The plane moved by `offset`.
    pub fn translated(&self, offset: &Vec3) -> Self {
        self.with_origin(self.origin + offset)
    }

    /// Rotate the in-plane axes about the normal by `angle` radians.
    pub fn rotated(&self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let x = self.x_axis * c + self.y_axis * s;
        let y = self.y_axis * c - self.x_axis * s;
        Self {
            origin: self.origin,
            x_axis: x,
            y_axis: y,
            z_axis: self.z_axis,
        }
    }

    /// Local-to-world matrix (columns are the axes, last column the origin).
    pub fn to_matrix(&self) -> Mat4 {
        let mut m = Mat4::identity();
        for r in 0..3 {
            m[(r, 0)] = self.x_axis[r];
            m[(r, 1)] = self.y_axis[r];
            m[(r, 2)] = self.z_axis[r];
            m[(r, 3)] = self.origin[r];
        }
        m
    }

    /// World-to-local matrix, the exact inverse of [`Plane::to_matrix`].
    pub fn to_local_matrix(&self) -> Mat4 {
        let mut m = Mat4::identity();
        let o = self.origin.coords;
        for (r, axis) in [self.x_axis, self.y_axis, self.z_axis].iter().enumerate() {
            m[(r, 0)] = axis.x;
            m[(r, 1)] = axis.y;
            m[(r, 2)] = axis.z;
            m[(r, 3)] = -axis.dot(&o);
        }
        m
    }

    /// True when the axes are unit length and mutually orthogonal within `tol`.
    pub fn is_orthonormal(&self, tol: f64) -> bool {
        (self.x_axis.norm() - 1.0).abs() < tol
            && (self.y_axis.norm() - 1.0).abs() < tol
            && (self.z_axis.norm() - 1.0).abs() < tol
            && self.x_axis.dot(&self.y_axis).abs() < tol
            && self.y_axis.dot(&self.z_axis).abs() < tol
            && self.z_axis.dot(&self.x_axis).abs() < tol
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::world_xy()
    }
}

/// The ways a plane can be described by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaneSource {
    /// An existing plane, re-orthonormalized.
    Plane(Plane),
    /// Origin, a point on the x axis, and a point in the plane.
    Points(Point3, Point3, Point3),
    /// Origin plus two in-plane axes.
    OriginAxes {
        /// Frame origin.
        origin: Point3,
        /// Direction of local x.
        x_axis: Vec3,
        /// Direction of local y (need not be orthogonal).
        y_axis: Vec3,
    },
    /// Origin plus normal.
    OriginNormal {
        /// Frame origin.
        origin: Point3,
        /// Plane normal.
        normal: Vec3,
    },
    /// Flat numeric array: 3 (origin), 6 (origin + normal), 9 (origin + x + y)
    /// or 12 (origin + x + y + z; z is ignored and recomputed).
    Array(Vec<f64>),
    /// Input that could not be interpreted.
    Unknown,
}

impl From<Plane> for PlaneSource {
    fn from(p: Plane) -> Self {
        PlaneSource::Plane(p)
    }
}

impl From<[Point3; 3]> for PlaneSource {
    fn from(p: [Point3; 3]) -> Self {
        PlaneSource::Points(p[0], p[1], p[2])
    }
}

impl From<(Point3, Vec3)> for PlaneSource {
    fn from((origin, normal): (Point3, Vec3)) -> Self {
        PlaneSource::OriginNormal { origin, normal }
    }
}

impl From<(Point3, Vec3, Vec3)> for PlaneSource {
    fn from((origin, x_axis, y_axis): (Point3, Vec3, Vec3)) -> Self {
        PlaneSource::OriginAxes {
            origin,
            x_axis,
            y_axis,
        }
    }
}

impl From<Vec<f64>> for PlaneSource {
    fn from(values: Vec<f64>) -> Self {
        PlaneSource::Array(values)
    }
}

impl From<Option<Plane>> for PlaneSource {
    fn from(p: Option<Plane>) -> Self {
        p.map_or(PlaneSource::Unknown, PlaneSource::Plane)
    }
}

/// Normalize any [`PlaneSource`] into a valid orthonormal plane.
///
/// Unrecognized or degenerate input yields the world XY plane.
pub fn ensure_plane(source: impl Into<PlaneSource>) -> Plane {
    match source.into() {
        PlaneSource::Plane(p) => Plane::from_origin_axes(p.origin, p.x_axis, p.y_axis),
        PlaneSource::Points(a, b, c) => Plane::from_points(a, b, c),
        PlaneSource::OriginAxes {
            origin,
            x_axis,
            y_axis,
        } => Plane::from_origin_axes(origin, x_axis, y_axis),
        PlaneSource::OriginNormal { origin, normal } => Plane::from_origin_normal(origin, normal),
        PlaneSource::Array(values) => {
            let v = |i: usize| Vec3::new(values[i], values[i + 1], values[i + 2]);
            match values.len() {
                3 => Plane::world_xy_at(Point3::from(v(0))),
                6 => Plane::from_origin_normal(Point3::from(v(0)), v(3)),
                9 | 12 => Plane::from_origin_axes(Point3::from(v(0)), v(3), v(6)),
                n => {
                    tracing::debug!(len = n, "unrecognized plane array, using world XY");
                    Plane::world_xy()
                }
            }
        }
        PlaneSource::Unknown => Plane::world_xy(),
    }
}

/// Plane through three points (see [`Plane::from_points`]).
pub fn plane_from_points(a: Point3, b: Point3, c: Point3) -> Plane {
    Plane::from_points(a, b, c)
}

/// Local coordinates of `point` in `plane`; inverse of [`apply_plane`].
pub fn plane_coordinates(point: &Point3, plane: &Plane) -> Vec3 {
    plane.coordinates(point)
}

/// World point at local coordinates `(u, v, w)`; inverse of [`plane_coordinates`].
pub fn apply_plane(plane: &Plane, u: f64, v: f64, w: f64) -> Point3 {
    plane.apply(u, v, w)
}
