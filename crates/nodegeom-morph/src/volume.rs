//! Morphs that carry points from one volume into another.

use nodegeom_box::TwistedBox;
use nodegeom_frame::{point_map, Domain};
use nodegeom_surface::{surface_frame, DifferentialOptions, Surface};

use crate::morph::Morph;

/// Carry points from `reference` into `target` by matching trilinear
/// parameters.
///
/// Points outside the reference box extrapolate. When inversion does not
/// converge the best parameters found are still used.
pub fn box_morph(reference: &TwistedBox, target: &TwistedBox) -> Morph {
    let (reference, target) = (*reference, *target);
    Morph::new(
        "box_morph",
        point_map(move |p| {
            let uvw = reference.invert(p);
            target.evaluate(uvw.u, uvw.v, uvw.w)
        }),
    )
}

/// Lay the contents of `reference` onto a patch of `surface`.
///
/// Box `u, v` select a point in the normalized sub-domains `du × dv` of the
/// surface; box `w` becomes an offset of `w · height` along the normal.
pub fn surface_morph(
    reference: &TwistedBox,
    surface: &Surface,
    du: Domain,
    dv: Domain,
    height: f64,
) -> Morph {
    let reference = *reference;
    let surface = surface.clone();
    let options = DifferentialOptions::default();
    Morph::new(
        "surface_morph",
        point_map(move |p| {
            let uvw = reference.invert(p);
            let u = surface.domain_u.parameter_at(du.parameter_at(uvw.u));
            let v = surface.domain_v.parameter_at(dv.parameter_at(uvw.v));
            let frame = surface_frame(&surface, u, v, &options);
            frame.point + frame.normal * (uvw.w * height)
        }),
    )
}
