//! Deformations parameterized along an axis or around a plane normal.

use nalgebra::Rotation3;
use nodegeom_frame::{point_map, Line, Plane};
use nodegeom_math::{any_perpendicular, lerp, Dir3, Point3, Vec3};
use nodegeom_surface::ArcCurve;
use serde::{Deserialize, Serialize};

use crate::morph::Morph;

/// Settings for [`twist`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwistOptions {
    /// Keep twisting past the ends of the axis instead of clamping.
    pub infinite: bool,
}

/// Settings for [`taper`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaperOptions {
    /// Extrapolate the radius past the ends of the axis.
    pub infinite: bool,
    /// Scale along one side direction only.
    pub flat: bool,
}

/// Settings for [`stretch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StretchOptions {
    /// Scale all of space along the axis, not just the axis span.
    pub infinite: bool,
}

/// Settings for [`bend`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BendOptions {
    /// Keep following the circle past the ends of the arc instead of
    /// continuing along its end tangents.
    pub infinite: bool,
}

/// Settings for [`whirl`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhirlOptions {
    /// Turn the other way.
    pub reverse: bool,
}

/// A unit axis with its span length.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Axis {
    pub origin: Point3,
    pub dir: Vec3,
    pub length: f64,
}

impl Axis {
    pub fn new(line: &Line) -> Option<Self> {
        let dir = line.direction()?;
        Some(Self {
            origin: line.from,
            dir: dir.normalize(),
            length: line.length(),
        })
    }

    /// Distance of `p` along the axis from its origin.
    pub fn along(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(&self.dir)
    }

    /// Normalized position of `p` along the span, clamped unless `infinite`.
    pub fn parameter(&self, p: &Point3, infinite: bool) -> f64 {
        let t = self.along(p) / self.length;
        if infinite {
            t
        } else {
            t.clamp(0.0, 1.0)
        }
    }

    /// Component of `p − origin` perpendicular to the axis.
    pub fn radial(&self, p: &Point3) -> Vec3 {
        let d = p - self.origin;
        d - self.dir * d.dot(&self.dir)
    }

    pub fn rotate(&self, p: &Point3, angle: f64) -> Point3 {
        let r = Rotation3::from_axis_angle(&Dir3::new_unchecked(self.dir), angle);
        self.origin + r * (p - self.origin)
    }
}

pub(crate) fn unchanged(name: &str) -> Morph {
    Morph::new(name, point_map(|p| *p))
}

/// Rotate about `axis` by `angle · t`, `t` the normalized position along it.
pub fn twist(axis: &Line, angle: f64, options: TwistOptions) -> Morph {
    let Some(ax) = Axis::new(axis) else {
        tracing::debug!("zero-length twist axis, using identity");
        return unchanged("twist");
    };
    Morph::new(
        "twist",
        point_map(move |p| ax.rotate(p, angle * ax.parameter(p, options.infinite))),
    )
}

/// Scale distances from `axis` by `r(t) / r0`, where `r` runs linearly from
/// `r0` at the start to `r1` at the end.
///
/// With `flat` only the offset along one fixed side direction is scaled.
pub fn taper(axis: &Line, r0: f64, r1: f64, options: TaperOptions) -> Morph {
    let Some(ax) = Axis::new(axis) else {
        tracing::debug!("zero-length taper axis, using identity");
        return unchanged("taper");
    };
    if r0.abs() < 1e-12 {
        tracing::debug!(r0, "zero start radius for taper, using identity");
        return unchanged("taper");
    }
    let side = any_perpendicular(&ax.dir);
    Morph::new(
        "taper",
        point_map(move |p| {
            let f = lerp(r0, r1, ax.parameter(p, options.infinite)) / r0;
            let radial = ax.radial(p);
            let offset = if options.flat {
                side * (radial.dot(&side) * (f - 1.0))
            } else {
                radial * (f - 1.0)
            };
            p + offset
        }),
    )
}

/// Stretch the span of `axis` to `length`.
///
/// Without `infinite`, points before the start stay put and points past
/// the end move with it.
pub fn stretch(axis: &Line, length: f64, options: StretchOptions) -> Morph {
    let Some(ax) = Axis::new(axis) else {
        tracing::debug!("zero-length stretch axis, using identity");
        return unchanged("stretch");
    };
    let k = length / ax.length;
    Morph::new(
        "stretch",
        point_map(move |p| {
            let a = ax.along(p);
            let stretched = if options.infinite || (0.0..=ax.length).contains(&a) {
                a * k
            } else if a < 0.0 {
                a
            } else {
                a + (k - 1.0) * ax.length
            };
            p + ax.dir * (stretched - a)
        }),
    )
}

/// Wrap the span of `base` onto `arc`.
///
/// Offsets from the base keep their size: the side `w × base` (with `w`
/// the arc plane normal) maps to `w × arc tangent`, and `w` to itself.
pub fn bend(base: &Line, arc: &ArcCurve, options: BendOptions) -> Morph {
    let Some(ax) = Axis::new(base) else {
        tracing::debug!("zero-length bend base, using identity");
        return unchanged("bend");
    };
    let sweep = arc.angle.end - arc.angle.start;
    let arc_length = arc.radius.abs() * sweep.abs();
    if arc_length < 1e-12 {
        tracing::debug!("degenerate bend arc, using identity");
        return unchanged("bend");
    }

    let d = ax.dir;
    let z = arc.plane.normal();
    let up = {
        let w = z - d * z.dot(&d);
        if w.norm() < 1e-9 {
            any_perpendicular(&d)
        } else {
            w.normalize()
        }
    };
    let side = up.cross(&d);
    let arc = arc.clone();

    Morph::new(
        "bend",
        point_map(move |p| {
            let s = ax.along(p) / ax.length;
            let radial = ax.radial(p);
            let (a, b) = (radial.dot(&side), radial.dot(&up));

            let (s_on, extra) = if options.infinite {
                (s, 0.0)
            } else if s < 0.0 {
                (0.0, s * arc_length)
            } else if s > 1.0 {
                (1.0, (s - 1.0) * arc_length)
            } else {
                (s, 0.0)
            };
            let theta = arc.angle.start + sweep * s_on;
            let (sin, cos) = theta.sin_cos();
            let x = arc.plane.x_axis;
            let y = arc.plane.y_axis;
            let on_arc = arc.plane.origin + (x * cos + y * sin) * arc.radius;
            let tangent = (y * cos - x * sin) * (arc.radius * sweep).signum();
            on_arc + tangent * extra + z.cross(&tangent) * a + z * b
        }),
    )
}

/// Swirl around the normal of `plane`: full `angle` within radius `r0`,
/// fading linearly to nothing at `r1`.
pub fn whirl(plane: &Plane, r0: f64, r1: f64, angle: f64, options: WhirlOptions) -> Morph {
    let (inner, outer) = (r0.min(r1).max(0.0), r0.max(r1));
    let angle = if options.reverse { -angle } else { angle };
    let ax = Axis {
        origin: plane.origin,
        dir: plane.normal(),
        length: 1.0,
    };
    Morph::new(
        "whirl",
        point_map(move |p| {
            let r = ax.radial(p).norm();
            let weight = if r <= inner {
                1.0
            } else if r >= outer {
                0.0
            } else {
                (outer - r) / (outer - inner)
            };
            if weight == 0.0 {
                *p
            } else {
                ax.rotate(p, angle * weight)
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nodegeom_frame::Domain;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn z_axis() -> Line {
        Line::new(Point3::origin(), Point3::new(0.0, 0.0, 10.0))
    }

    #[test]
    fn test_twist_midpoint() {
        let m = twist(&z_axis(), PI, TwistOptions::default());
        let p = m.map_point(&Point3::new(1.0, 0.0, 5.0));
        assert_abs_diff_eq!(p, Point3::new(0.0, 1.0, 5.0), epsilon = 1e-12);
        // Ends: no turn at the start, full turn at the end.
        assert_abs_diff_eq!(m.map_point(&Point3::new(1.0, 0.0, 0.0)), Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(m.map_point(&Point3::new(1.0, 0.0, 10.0)), Point3::new(-1.0, 0.0, 10.0), epsilon = 1e-12);
    }

    #[test]
    fn test_twist_clamps_unless_infinite() {
        let clamped = twist(&z_axis(), PI, TwistOptions::default());
        let free = twist(&z_axis(), PI, TwistOptions { infinite: true });
        let p = Point3::new(1.0, 0.0, 15.0);
        assert_abs_diff_eq!(clamped.map_point(&p), Point3::new(-1.0, 0.0, 15.0), epsilon = 1e-12);
        assert_abs_diff_eq!(free.map_point(&p), Point3::new(0.0, -1.0, 15.0), epsilon = 1e-12);
        let degenerate = twist(&Line::new(Point3::origin(), Point3::origin()), 1.0, TwistOptions::default());
        assert_eq!(degenerate.map_point(&p), p);
    }

    #[test]
    fn test_taper() {
        let m = taper(&z_axis(), 1.0, 3.0, TaperOptions::default());
        assert_abs_diff_eq!(m.map_point(&Point3::new(1.0, 1.0, 5.0)), Point3::new(2.0, 2.0, 5.0), epsilon = 1e-12);
        assert_abs_diff_eq!(m.map_point(&Point3::new(1.0, 0.0, 0.0)), Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);

        let flat = taper(&z_axis(), 1.0, 3.0, TaperOptions { infinite: false, flat: true });
        let side = any_perpendicular(&Vec3::z());
        let across = side.cross(&Vec3::z());
        let q = Point3::from(across * 1.5 + Vec3::new(0.0, 0.0, 10.0));
        assert_abs_diff_eq!(flat.map_point(&q), q, epsilon = 1e-12);
        let r = Point3::from(side + Vec3::new(0.0, 0.0, 10.0));
        assert_abs_diff_eq!((flat.map_point(&r) - Point3::new(0.0, 0.0, 10.0)).norm(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_stretch() {
        let m = stretch(&z_axis(), 20.0, StretchOptions::default());
        assert_abs_diff_eq!(m.map_point(&Point3::new(1.0, 0.0, 5.0)).z, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.map_point(&Point3::new(1.0, 0.0, -2.0)).z, -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.map_point(&Point3::new(1.0, 0.0, 12.0)).z, 22.0, epsilon = 1e-12);
        let inf = stretch(&z_axis(), 20.0, StretchOptions { infinite: true });
        assert_abs_diff_eq!(inf.map_point(&Point3::new(0.0, 0.0, -2.0)).z, -4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bend_onto_half_circle() {
        let base = Line::new(Point3::origin(), Point3::new(PI, 0.0, 0.0));
        let plane = Plane::from_origin_axes(Point3::new(0.0, 1.0, 0.0), -Vec3::y(), Vec3::x());
        let arc = ArcCurve::new(plane, 1.0, Domain::new(0.0, PI));
        let m = bend(&base, &arc, BendOptions::default());

        assert_abs_diff_eq!(m.map_point(&Point3::origin()), Point3::origin(), epsilon = 1e-12);
        assert_abs_diff_eq!(m.map_point(&Point3::new(FRAC_PI_2, 0.0, 0.0)), Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(m.map_point(&Point3::new(PI, 0.0, 0.0)), Point3::new(0.0, 2.0, 0.0), epsilon = 1e-12);
        // Outside the bend moves away from the centre; height is kept.
        assert_abs_diff_eq!(m.map_point(&Point3::new(FRAC_PI_2, -0.5, 2.0)), Point3::new(1.5, 1.0, 2.0), epsilon = 1e-12);
        // Past the end: straight on along the end tangent.
        assert_abs_diff_eq!(m.map_point(&Point3::new(PI + 1.0, 0.0, 0.0)), Point3::new(-1.0, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_whirl_falloff() {
        let m = whirl(&Plane::world_xy(), 1.0, 2.0, FRAC_PI_2, WhirlOptions::default());
        assert_abs_diff_eq!(m.map_point(&Point3::new(0.5, 0.0, 3.0)), Point3::new(0.0, 0.5, 3.0), epsilon = 1e-12);
        assert_eq!(m.map_point(&Point3::new(3.0, 0.0, 0.0)), Point3::new(3.0, 0.0, 0.0));
        let half = m.map_point(&Point3::new(1.5, 0.0, 0.0));
        assert_abs_diff_eq!(half.y.atan2(half.x), FRAC_PI_4, epsilon = 1e-12);
        let back = whirl(&Plane::world_xy(), 1.0, 2.0, FRAC_PI_2, WhirlOptions { reverse: true });
        assert_abs_diff_eq!(back.map_point(&Point3::new(0.5, 0.0, 0.0)), Point3::new(0.0, -0.5, 0.0), epsilon = 1e-12);
    }
}
