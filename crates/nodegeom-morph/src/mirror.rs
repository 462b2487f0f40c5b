//! Point reflections through curves, surfaces and a focus point.

use nodegeom_frame::point_map;
use nodegeom_math::Point3;
use nodegeom_surface::{closest_parameter, surface_closest_point, ClosestPointOptions, Curve3d, Surface};

use crate::morph::Morph;

/// Sampling density for curve projection.
const CURVE_MIRROR_SAMPLES: usize = 128;

/// Reflect each point through its closest point on `curve`.
pub fn mirror_curve(curve: &dyn Curve3d) -> Morph {
    let curve = curve.clone_box();
    Morph::new(
        "mirror_curve",
        point_map(move |p| {
            let hit = closest_parameter(curve.as_ref(), p, CURVE_MIRROR_SAMPLES);
            Point3::from(hit.point.coords * 2.0 - p.coords)
        }),
    )
}

/// Reflect each point through its closest point on `surface`.
pub fn mirror_surface(surface: &Surface) -> Morph {
    let surface = surface.clone();
    let options = ClosestPointOptions::default();
    Morph::new(
        "mirror_surface",
        point_map(move |p| {
            let hit = surface_closest_point(&surface, p, &options);
            Point3::from(hit.point.coords * 2.0 - p.coords)
        }),
    )
}

/// Pinhole inversion: send each point through `focus` to the other side,
/// scaled by `factor`.
pub fn camera_obscura(focus: &Point3, factor: f64) -> Morph {
    let focus = *focus;
    Morph::new(
        "camera_obscura",
        point_map(move |p| focus - (p - focus) * factor),
    )
}
