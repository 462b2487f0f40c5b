#![warn(missing_docs)]

//! Deformations for the nodegeom kernel.
//!
//! Every operator here is a plain point-to-point function wrapped in a
//! [`Morph`]. Applying a morph hands that function to the structural walker
//! from `nodegeom-transform`, so curves, surfaces, meshes, SubDs and nested
//! groups all deform the same way. With [`MorphOptions::rigid`] the map is
//! first reduced to its best-fit affine transform ([`rigidify`]).

mod axial;
mod field;
mod flow;
mod mirror;
mod morph;
mod volume;

pub use axial::{bend, stretch, taper, twist, whirl, BendOptions, StretchOptions, TaperOptions, TwistOptions, WhirlOptions};
pub use field::{point_deform, spatial_deform};
pub use flow::{flow, FlowOptions};
pub use mirror::{camera_obscura, mirror_curve, mirror_surface};
pub use morph::{rigidify, Morph, MorphOptions};
pub use volume::{box_morph, surface_morph};

use thiserror::Error;

/// Errors from morph construction.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MorphError {
    /// Each deformation point needs exactly one motion vector.
    #[error("{points} deformation points but {motions} motion vectors")]
    MotionCountMismatch {
        /// Number of points.
        points: usize,
        /// Number of motions.
        motions: usize,
    },

    /// A spatial field needs at least one sample.
    #[error("spatial deformation needs at least one sample")]
    NoSamples,
}
