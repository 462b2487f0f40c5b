//! Oriented boxes: a frame plus an axis-aligned extent in its local coordinates.

use nodegeom_frame::{Domain, Plane};
use nodegeom_math::{is_finite_point, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb3;

/// A box aligned to `plane`, spanning `local_min..local_max` in plane
/// coordinates.
///
/// Corner order: bottom `A B C D` (`z = min`), top `E F G H` (`z = max`),
/// each counter-clockwise from `(min.x, min.y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    /// Orientation frame.
    pub plane: Plane,
    /// Minimum corner in local coordinates.
    pub local_min: Point3,
    /// Maximum corner in local coordinates.
    pub local_max: Point3,
}

impl OrientedBox {
    /// Box in `plane` between two local corners (sorted per axis).
    pub fn new(plane: Plane, a: Point3, b: Point3) -> Self {
        Self {
            plane,
            local_min: a.inf(&b),
            local_max: a.sup(&b),
        }
    }

    /// World-aligned box between two corners.
    pub fn from_corners(a: Point3, b: Point3) -> Self {
        Self::new(Plane::world_xy(), a, b)
    }

    /// Box in `plane` spanning three local domains.
    pub fn from_domains(plane: Plane, x: Domain, y: Domain, z: Domain) -> Self {
        Self::new(
            plane,
            Point3::new(x.min, y.min, z.min),
            Point3::new(x.max, y.max, z.max),
        )
    }

    /// Extent along each local axis.
    pub fn size(&self) -> Vec3 {
        self.local_max - self.local_min
    }

    /// Centre in world coordinates.
    pub fn center(&self) -> Point3 {
        self.local_to_world(&nalgebra::center(&self.local_min, &self.local_max))
    }

    /// Local coordinates to world.
    pub fn local_to_world(&self, p: &Point3) -> Point3 {
        self.plane.apply(p.x, p.y, p.z)
    }

    /// World point to local coordinates.
    pub fn world_to_local(&self, p: &Point3) -> Point3 {
        Point3::from(self.plane.coordinates(p))
    }

    /// Local domain along axis `axis` (0 = x, 1 = y, 2 = z).
    pub fn domain(&self, axis: usize) -> Domain {
        Domain::new(self.local_min[axis], self.local_max[axis])
    }

    /// The eight corners in world coordinates, `A..H`.
    pub fn corners(&self) -> [Point3; 8] {
        let (lo, hi) = (self.local_min, self.local_max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
        ]
        .map(|p| self.local_to_world(&p))
    }

    /// Smallest box in this box's frame that contains both boxes.
    pub fn union(&self, other: &OrientedBox) -> OrientedBox {
        let mut lo = self.local_min;
        let mut hi = self.local_max;
        for c in other.corners() {
            let l = self.world_to_local(&c);
            lo = lo.inf(&l);
            hi = hi.sup(&l);
        }
        OrientedBox {
            plane: self.plane,
            local_min: lo,
            local_max: hi,
        }
    }

    /// Grow (or shrink, for negative `amount`) every side by `amount`.
    ///
    /// Axes that would invert collapse to their midpoint.
    pub fn inflate(&self, amount: f64) -> OrientedBox {
        let d = Vec3::repeat(amount);
        let mut lo = self.local_min - d;
        let mut hi = self.local_max + d;
        for axis in 0..3 {
            if lo[axis] > hi[axis] {
                let mid = 0.5 * (self.local_min[axis] + self.local_max[axis]);
                lo[axis] = mid;
                hi[axis] = mid;
            }
        }
        OrientedBox {
            plane: self.plane,
            local_min: lo,
            local_max: hi,
        }
    }

    /// World-aligned bounds of the corners.
    pub fn aabb(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for c in self.corners() {
            aabb.include_point(&c);
        }
        aabb
    }

    /// True when the world bounds of both boxes overlap.
    pub fn overlaps_aabb(&self, other: &Aabb3) -> bool {
        self.aabb().overlaps(other)
    }
}

/// The ways a caller can describe a box.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxSource {
    /// An existing box.
    Box(OrientedBox),
    /// `plane` origin to `size` along its axes.
    PlaneExtent {
        /// Frame (box corner at its origin).
        plane: Plane,
        /// Extent along x, y, z.
        size: Vec3,
    },
    /// World-aligned min/max corners.
    MinMax {
        /// First corner.
        min: Point3,
        /// Opposite corner.
        max: Point3,
    },
    /// Centre and full size, optionally oriented.
    CenterSize {
        /// World centre.
        center: Point3,
        /// Full extent along each axis.
        size: Vec3,
        /// Orientation (world XY when `None`).
        plane: Option<Plane>,
    },
    /// Bounds of a point cloud in a frame.
    Points {
        /// Points to enclose.
        points: Vec<Point3>,
        /// Frame (world XY when `None`).
        plane: Option<Plane>,
    },
    /// Three local domains in a frame.
    PlaneDomains {
        /// Frame.
        plane: Plane,
        /// Local x interval.
        x: Domain,
        /// Local y interval.
        y: Domain,
        /// Local z interval.
        z: Domain,
    },
}

impl From<OrientedBox> for BoxSource {
    fn from(b: OrientedBox) -> Self {
        BoxSource::Box(b)
    }
}

impl From<(Point3, Point3)> for BoxSource {
    fn from((min, max): (Point3, Point3)) -> Self {
        BoxSource::MinMax { min, max }
    }
}

impl From<Vec<Point3>> for BoxSource {
    fn from(points: Vec<Point3>) -> Self {
        BoxSource::Points {
            points,
            plane: None,
        }
    }
}

/// Normalize any [`BoxSource`] into an [`OrientedBox`].
///
/// Returns `None` for an empty point cloud or non-finite input.
pub fn ensure_box(source: impl Into<BoxSource>) -> Option<OrientedBox> {
    let b = match source.into() {
        BoxSource::Box(b) => b,
        BoxSource::PlaneExtent { plane, size } => {
            OrientedBox::new(plane, Point3::origin(), Point3::from(size))
        }
        BoxSource::MinMax { min, max } => {
            if !is_finite_point(&min) || !is_finite_point(&max) {
                tracing::debug!("non-finite box corners");
                return None;
            }
            OrientedBox::from_corners(min, max)
        }
        BoxSource::CenterSize {
            center,
            size,
            plane,
        } => {
            let plane = plane.unwrap_or_else(Plane::world_xy).with_origin(center);
            let half = size.abs() * 0.5;
            OrientedBox::new(plane, Point3::from(-half), Point3::from(half))
        }
        BoxSource::Points { points, plane } => {
            let plane = plane.unwrap_or_else(Plane::world_xy);
            let local: Vec<Point3> = points
                .iter()
                .map(|p| Point3::from(plane.coordinates(p)))
                .collect();
            let Some(bounds) = Aabb3::from_points(&local) else {
                tracing::debug!("empty point cloud, no box");
                return None;
            };
            OrientedBox::new(plane, bounds.min, bounds.max)
        }
        BoxSource::PlaneDomains { plane, x, y, z } => OrientedBox::from_domains(plane, x, y, z),
    };
    if is_finite_point(&b.local_min) && is_finite_point(&b.local_max) {
        Some(b)
    } else {
        tracing::debug!("non-finite box extent");
        None
    }
}

/// Solid moments of a box treated as a uniform-density prism.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxMetrics {
    /// `|x · y · z|`
    pub volume: f64,
    /// Total face area.
    pub area: f64,
    /// World centre of mass.
    pub center: Point3,
    /// Mass (the volume unless overridden).
    pub mass: f64,
    /// Principal moments of inertia about the local axes through the centre.
    pub inertia: Vec3,
    /// Radii of gyration per local axis.
    pub gyration: Vec3,
}

/// Volume, area, centroid and inertia of a box.
///
/// Inertia uses `mass / 12 · (b² + c²)` per axis; `mass` defaults to the
/// volume (unit density).
pub fn compute_box_metrics(b: &OrientedBox, mass: Option<f64>) -> BoxMetrics {
    let s = b.size();
    let (x, y, z) = (s.x.abs(), s.y.abs(), s.z.abs());
    let volume = x * y * z;
    let area = 2.0 * (x * y + y * z + z * x);
    let mass = mass.unwrap_or(volume);
    let inertia = Vec3::new(y * y + z * z, x * x + z * z, x * x + y * y) * (mass / 12.0);
    let gyration = if mass.abs() > 0.0 {
        (inertia / mass).map(|i| i.abs().sqrt())
    } else {
        Vec3::zeros()
    };
    BoxMetrics {
        volume,
        area,
        center: b.center(),
        mass,
        inertia,
        gyration,
    }
}

/// Inclusion test in the box's frame.
///
/// Non-strict accepts points within `tolerance` outside the faces; strict
/// requires them more than `tolerance` inside. For `tolerance >= 0`, strict
/// inclusion implies non-strict inclusion.
pub fn contains_point(b: &OrientedBox, p: &Point3, tolerance: f64, strict: bool) -> bool {
    let local = b.world_to_local(p);
    let tol = tolerance.abs();
    (0..3).all(|axis| {
        let (lo, hi, v) = (b.local_min[axis], b.local_max[axis], local[axis]);
        if strict {
            v > lo + tol && v < hi - tol
        } else {
            v >= lo - tol && v <= hi + tol
        }
    })
}
