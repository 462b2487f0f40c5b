#![warn(missing_docs)]

//! Frame algebra for the nodegeom kernel.
//!
//! Orthonormal planes, 1-D parameter domains, lines, and the conversions
//! that turn the many ways a plane or domain can be described into one
//! canonical value. Every operation is fail-soft: degenerate input yields
//! a well-defined fallback (world XY plane, unit domain) instead of an error.

mod domain;
mod line;
mod plane;

pub use domain::{ensure_domain, Domain, DomainSource};
pub use line::Line;
pub use plane::{apply_plane, ensure_plane, plane_coordinates, plane_from_points, Plane, PlaneSource};

use nodegeom_math::Point3;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Free-form metadata attached to kernel values.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A shared point-to-point mapping, the building block of every deformation.
pub type PointMap = Arc<dyn Fn(&Point3) -> Point3 + Send + Sync>;

/// Wrap a closure as a [`PointMap`].
pub fn point_map<F>(f: F) -> PointMap
where
    F: Fn(&Point3) -> Point3 + Send + Sync + 'static,
{
    Arc::new(f)
}
