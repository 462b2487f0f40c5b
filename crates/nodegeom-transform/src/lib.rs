#![warn(missing_docs)]

//! Affine transforms and generic geometry traversal for the nodegeom kernel.
//!
//! A [`Transform`] is a 4×4 matrix that remembers the fragments it was
//! composed from, so inversion can undo each step on its own instead of
//! inverting one badly conditioned product.
//!
//! [`Geometry`] is the closed set of values the kernel hands around.
//! [`map_geometry`] rebuilds any of them through a [`GeometryMapper`]:
//! points go through the full map, direction vectors through its linear
//! part, and everything non-geometric is passed through untouched.

mod geometry;
mod transform;
mod walker;

pub use geometry::{bounding_box, collect_points, Geometry, Group, Record};
pub use transform::{Rectangle, Transform};
pub use walker::{apply_transform, map_geometry, GeometryMapper, PointMapper, TransformMapper};

use thiserror::Error;

/// Errors from transform construction.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransformError {
    /// Point correspondences must pair up and number three or four.
    #[error("point correspondence needs 3 or 4 matching pairs, got {source_len} source and {target_len} target points")]
    CorrespondenceArity {
        /// Number of source points.
        source_len: usize,
        /// Number of target points.
        target_len: usize,
    },
}
