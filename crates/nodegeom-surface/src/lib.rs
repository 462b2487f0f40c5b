#![warn(missing_docs)]

//! Parametric surfaces for the nodegeom kernel.
//!
//! A [`Surface`] is a pure function `(u, v) → point` over
//! `domain_u × domain_v`, optionally carrying an orientation plane and
//! free-form metadata. Every primitive factory (plane, cylinder, cone,
//! sphere, ruled, loft, sweep, network, revolution, extrusion, pipe,
//! grid) produces the same contract, so sampling, differential geometry,
//! closest-point solving and planarity testing work uniformly on all of
//! them.
//!
//! The crate also owns the curve ([`Curve3d`]) and polygon mesh ([`Mesh`])
//! value types that surfaces are built from and sampled into.

mod analysis;
mod closest;
mod curve;
mod curve_frame;
mod freeform;
mod mesh;
mod primitives;
mod sample;
mod surface;

pub use analysis::{
    fundamental_forms, surface_curvature, surface_frame, surface_planarity, DifferentialOptions,
    FundamentalForms, Planarity, PlanarityOptions, SurfaceCurvature, SurfaceFrame,
};
pub use closest::{surface_closest_point, ClosestPointOptions, SurfaceClosestPoint};
pub use curve::{
    closest_parameter, curve_length, sample_curve, ArcCurve, ArcLengthTable, CurveClosestPoint,
    CurveKind, Curve3d, FnCurve, InterpolatedCurve, LineCurve, MappedCurve, PolylineCurve,
};
pub use curve_frame::{rotation_minimizing_frames, CurveFrame, FrameTable};
pub use freeform::{
    extrusion, isotrim, loft, mapped, network, pipe, pipe_variable, reparameterize, revolution,
    ruled, sweep, LoftOptions,
};
pub use mesh::Mesh;
pub use primitives::{cone, cylinder, four_point, from_fn, grid, plane_surface, sphere};
pub use sample::{
    divide_surface, sample_surface_grid, surface_area, triangulate_surface_grid, AreaProperties,
    SurfaceGrid, SurfacePoints,
};
pub use surface::{Surface, SurfaceFn, SurfaceKind};

use thiserror::Error;

/// Errors from surface construction.
///
/// Only structural contract violations are errors; numerically degenerate
/// input produces a degenerate (but valid) surface instead.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SurfaceError {
    /// Rows of a control lattice have different lengths.
    #[error("lattice row {row} has {found} points, expected {expected}")]
    RaggedLattice {
        /// Offending row index.
        row: usize,
        /// Points in that row.
        found: usize,
        /// Points in the first row.
        expected: usize,
    },

    /// A lattice needs at least 2×2 points.
    #[error("lattice must be at least 2x2, got {rows}x{cols}")]
    LatticeTooSmall {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
    },

    /// Lofting needs two or more sections.
    #[error("loft needs at least 2 sections, got {0}")]
    NotEnoughSections(usize),

    /// A network needs at least two curves in each direction.
    #[error("network needs at least 2 curves per direction, got {u} and {v}")]
    NotEnoughNetworkCurves {
        /// Curves in the u family.
        u: usize,
        /// Curves in the v family.
        v: usize,
    },

    /// A variable pipe needs at least one radius sample.
    #[error("variable pipe needs at least one radius")]
    NoRadii,
}
