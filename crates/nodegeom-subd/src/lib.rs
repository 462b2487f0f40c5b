#![warn(missing_docs)]

//! Tagged polygon-mesh ("SubD") topology for the nodegeom kernel.
//!
//! A [`SubD`] is a control cage: vertices, edges and faces with
//! smooth/crease/corner/dart annotations. Construction merges coincident
//! vertices and shares edges between adjacent faces, so edge incidence
//! directly tells naked, boundary, interior and non-manifold edges apart.
//!
//! On top of the topology the crate provides tag-aware smoothing,
//! Catmull–Clark refinement, approximate booleans and two generators
//! ([`subd_box`], [`subd_pipe`]).

mod boolean;
mod generators;
mod refine;
mod tags;
mod topology;

pub use boolean::{boolean, BooleanOp};
pub use generators::{subd_box, subd_pipe, PipeOptions, SizeBlend, SizePoint, SubdBoxOptions};
pub use refine::SmoothOptions;
pub use tags::{EdgeTag, VertexTag};
pub use topology::{EdgeKind, SubD, SubdEdge, SubdFace, SubdVertex};

use thiserror::Error;

/// Errors from SubD construction.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubdError {
    /// A face refers to a vertex index that does not exist.
    #[error("face {face} references missing vertex {vertex}")]
    MissingVertex {
        /// Offending face index.
        face: usize,
        /// Out-of-range vertex index.
        vertex: usize,
    },

    /// A generator that needs input polygons was given none.
    #[error("no polygons to build a SubD from")]
    EmptyInput,
}
