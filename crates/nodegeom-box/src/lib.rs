#![warn(missing_docs)]

//! Bounding volumes for the nodegeom kernel.
//!
//! - [`Aabb3`]: world axis-aligned bounds, used as a broadphase filter
//! - [`OrientedBox`]: a plane plus an axis-aligned extent in that plane's
//!   local coordinates, with solid moments and inclusion tests
//! - [`TwistedBox`]: eight free corners blended trilinearly, with Newton
//!   inversion from world points back to box parameters
//! - [`fit_sphere`]: algebraic least-squares sphere fit with a bounding
//!   sphere fallback

mod aabb;
mod oriented;
mod sphere;
mod twisted;

pub use aabb::Aabb3;
pub use oriented::{
    compute_box_metrics, contains_point, ensure_box, BoxMetrics, BoxSource, OrientedBox,
};
pub use sphere::{bounding_sphere, fit_sphere, SphereFit, SphereFitMethod};
pub use twisted::{TwistedBox, TwistedBoxParameter, MAX_INVERT_ITERATIONS};
