#![warn(missing_docs)]

//! Geometry kernel facade for nodegeom.
//!
//! Re-exports every kernel crate and gathers the types most callers need
//! in [`prelude`].
//!
//! # Example
//!
//! ```
//! use nodegeom_kernel::prelude::*;
//!
//! let cage = subd_box(
//!     &OrientedBox::from_corners(Point3::origin(), Point3::new(1.0, 1.0, 1.0)),
//!     &SubdBoxOptions::default(),
//! );
//! let turned = twist(
//!     &Line::new(Point3::origin(), Point3::new(0.0, 0.0, 1.0)),
//!     1.0,
//!     TwistOptions::default(),
//! )
//! .apply(&Geometry::SubD(cage));
//! assert_eq!(turned.kind(), "subd");
//! ```

pub use nodegeom_box;
pub use nodegeom_frame;
pub use nodegeom_math;
pub use nodegeom_morph;
pub use nodegeom_subd;
pub use nodegeom_surface;
pub use nodegeom_transform;

/// The commonly used types and functions of every kernel crate.
pub mod prelude {
    pub use nodegeom_box::{
        compute_box_metrics, contains_point, ensure_box, fit_sphere, BoxSource, OrientedBox,
        TwistedBox,
    };
    pub use nodegeom_frame::{
        ensure_domain, ensure_plane, point_map, Domain, DomainSource, Line, Plane, PlaneSource,
        PointMap,
    };
    pub use nodegeom_math::{Point3, Tolerance, Vec3};
    pub use nodegeom_morph::{
        bend, box_morph, flow, stretch, taper, twist, whirl, Morph, MorphOptions, TwistOptions,
    };
    pub use nodegeom_subd::{boolean, subd_box, subd_pipe, BooleanOp, PipeOptions, SubD, SubdBoxOptions};
    pub use nodegeom_surface::{Curve3d, Mesh, Surface};
    pub use nodegeom_transform::{apply_transform, map_geometry, Geometry, Group, Transform};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_abs_diff_eq;
    use nodegeom_surface::{sample_surface_grid, sphere};
    use std::f64::consts::PI;
    use std::sync::Arc;

    #[test]
    fn test_plane_from_three_points() {
        let p = ensure_plane(PlaneSource::Points(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ));
        assert_eq!(p.origin, Point3::origin());
        assert_abs_diff_eq!(p.x_axis, Vec3::x(), epsilon = 1e-12);
        assert_abs_diff_eq!(p.z_axis, Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_fit_on_sampled_sphere() {
        let s = sphere(Plane::world_xy_at(Point3::new(1.0, 2.0, 3.0)), 2.5);
        let grid = sample_surface_grid(&s, 8, 8);
        let fit = fit_sphere(&grid.points).unwrap();
        assert_abs_diff_eq!(fit.radius, 2.5, epsilon = 1e-6);
        assert_abs_diff_eq!(fit.center, Point3::new(1.0, 2.0, 3.0), epsilon = 1e-6);
    }

    #[test]
    fn test_group_transform_then_twist() {
        let cage = Arc::new(Geometry::SubD(subd_box(
            &OrientedBox::from_corners(Point3::new(-1.0, -1.0, -5.0), Point3::new(1.0, 1.0, 5.0)),
            &SubdBoxOptions::default(),
        )));
        let group: Geometry = Group::new(vec![Arc::clone(&cage), cage]).into();
        let moved = apply_transform(&group, &Transform::translation(&Vec3::new(0.0, 0.0, 5.0)));
        let axis = Line::new(Point3::origin(), Point3::new(0.0, 0.0, 10.0));
        let Geometry::Group(out) = twist(&axis, PI, TwistOptions::default()).apply(&moved) else {
            panic!("expected group");
        };
        assert!(Arc::ptr_eq(&out.items[0], &out.items[1]));
        let Geometry::SubD(twisted) = out.items[0].as_ref() else {
            panic!("expected subd");
        };
        let top = twisted
            .vertices
            .iter()
            .find(|v| (v.point.z - 10.0).abs() < 1e-9)
            .unwrap();
        // Top corners end up rotated by a half turn, still on the same square.
        assert_abs_diff_eq!(top.point.x.abs(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(top.point.y.abs(), 1.0, epsilon = 1e-9);
    }
}
