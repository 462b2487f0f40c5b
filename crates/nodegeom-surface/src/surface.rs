//! The surface value type and the evaluation trait behind it.

use std::fmt;

use nodegeom_frame::{Domain, Metadata, Plane};
use nodegeom_math::Point3;

/// The kind of a surface (for match-based dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Bounded region of a plane.
    Plane,
    /// Cylinder around the base plane's z axis.
    Cylinder,
    /// Cone with apex on the base plane's z axis.
    Cone,
    /// Sphere around the base plane's origin.
    Sphere,
    /// Bilinear patch through four corners.
    FourPoint,
    /// Bilinear lookup in a control-point lattice.
    Grid,
    /// Linear blend between two curves.
    Ruled,
    /// Interpolation through section curves.
    Loft,
    /// Profile carried along a rail.
    Sweep,
    /// Surface through two families of curves.
    Network,
    /// Profile rotated about an axis.
    Revolution,
    /// Curve translated along a vector.
    Extrusion,
    /// Circular tube around a rail.
    Pipe,
    /// Caller-provided function.
    Function,
    /// Another surface composed with a point map.
    Mapped,
    /// Another surface over a renormalized parameter space.
    Reparameterized,
}

/// The evaluation function behind a [`Surface`].
///
/// Implementations are pure: evaluating never mutates state.
pub trait SurfaceFn: Send + Sync + fmt::Debug {
    /// Evaluate at parameter `(u, v)`.
    fn evaluate(&self, u: f64, v: f64) -> Point3;

    /// The kind of this surface.
    fn surface_type(&self) -> SurfaceKind;

    /// Clone into a boxed trait object.
    fn clone_box(&self) -> Box<dyn SurfaceFn>;

    /// Row-major control lattice, for grid-backed surfaces.
    fn control_points(&self) -> Option<&[Vec<Point3>]> {
        None
    }
}

impl Clone for Box<dyn SurfaceFn> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A parametric surface: `(u, v) → point` over `domain_u × domain_v`.
#[derive(Debug, Clone)]
pub struct Surface {
    function: Box<dyn SurfaceFn>,
    /// Parameter range in u.
    pub domain_u: Domain,
    /// Parameter range in v.
    pub domain_v: Domain,
    /// Orientation hint; `None` for free-form surfaces.
    pub plane: Option<Plane>,
    /// Free-form metadata.
    pub metadata: Metadata,
}

impl Surface {
    /// Wrap an evaluation function with its domains.
    pub fn new(
        function: impl SurfaceFn + 'static,
        domain_u: Domain,
        domain_v: Domain,
        plane: Option<Plane>,
    ) -> Self {
        Self {
            function: Box::new(function),
            domain_u,
            domain_v,
            plane,
            metadata: Metadata::new(),
        }
    }

    /// Evaluate at parameter `(u, v)`.
    pub fn evaluate(&self, u: f64, v: f64) -> Point3 {
        self.function.evaluate(u, v)
    }

    /// Evaluate at normalized parameters (`0..1` across each domain).
    pub fn evaluate_normalized(&self, s: f64, t: f64) -> Point3 {
        self.evaluate(self.domain_u.parameter_at(s), self.domain_v.parameter_at(t))
    }

    /// The kind of this surface.
    pub fn surface_type(&self) -> SurfaceKind {
        self.function.surface_type()
    }

    /// The evaluation function.
    pub fn function(&self) -> &dyn SurfaceFn {
        self.function.as_ref()
    }

    /// The control lattice `rows[i][j]` (j along u) of a grid surface.
    pub fn control_points(&self) -> Option<&[Vec<Point3>]> {
        self.function.control_points()
    }

    /// Clamp `(u, v)` into the domains.
    pub fn clamp_parameters(&self, u: f64, v: f64) -> (f64, f64) {
        (self.domain_u.clamp(u), self.domain_v.clamp(v))
    }

    /// The same surface with a metadata entry added.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The same surface over different domains (evaluation unchanged).
    pub fn with_domains(&self, domain_u: Domain, domain_v: Domain) -> Self {
        Self {
            domain_u,
            domain_v,
            ..self.clone()
        }
    }
}
