//! Free-form surfaces built from curves: ruled, loft, sweep, network,
//! revolution, extrusion and pipe, plus domain and mapping wrappers.

use std::fmt;

use nodegeom_frame::{Domain, Line, Plane, PointMap};
use nodegeom_math::{lerp, lerp_point, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::curve::{catmull_rom, Curve3d};
use crate::curve_frame::FrameTable;
use crate::surface::{Surface, SurfaceFn, SurfaceKind};
use crate::SurfaceError;

/// Frames tabulated along rails of sweeps and pipes.
const RAIL_FRAME_SAMPLES: usize = 96;

/// Evaluate a curve at a normalized parameter.
fn at(curve: &dyn Curve3d, s: f64) -> Point3 {
    curve.evaluate(curve.domain().parameter_at(s))
}

// =============================================================================
// Ruled
// =============================================================================

#[derive(Debug, Clone)]
struct RuledFn {
    a: Box<dyn Curve3d>,
    b: Box<dyn Curve3d>,
}

impl SurfaceFn for RuledFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        lerp_point(&at(self.a.as_ref(), u), &at(self.b.as_ref(), u), v)
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Ruled
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Ruled surface: straight lines between matching parameters of `a` and `b`.
///
/// `u` runs along the curves, `v` from `a` (0) to `b` (1).
pub fn ruled(a: &dyn Curve3d, b: &dyn Curve3d) -> Surface {
    Surface::new(
        RuledFn {
            a: a.clone_box(),
            b: b.clone_box(),
        },
        Domain::unit(),
        Domain::unit(),
        None,
    )
}

// =============================================================================
// Loft
// =============================================================================

/// Loft interpolation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoftOptions {
    /// Straight (piecewise-linear) sections instead of a smooth blend.
    pub straight: bool,
    /// Wrap from the last section back to the first.
    pub closed: bool,
}

#[derive(Debug, Clone)]
struct LoftFn {
    sections: Vec<Box<dyn Curve3d>>,
    options: LoftOptions,
}

impl LoftFn {
    fn section_point(&self, index: isize, u: f64) -> Point3 {
        let n = self.sections.len() as isize;
        if self.options.closed {
            let i = index.rem_euclid(n) as usize;
            return at(self.sections[i].as_ref(), u);
        }
        if index < 0 {
            let a = at(self.sections[0].as_ref(), u);
            let b = at(self.sections[1].as_ref(), u);
            return a + (a - b);
        }
        if index >= n {
            let a = at(self.sections[n as usize - 1].as_ref(), u);
            let b = at(self.sections[n as usize - 2].as_ref(), u);
            return a + (a - b);
        }
        at(self.sections[index as usize].as_ref(), u)
    }
}

impl SurfaceFn for LoftFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        let n = self.sections.len();
        let spans = if self.options.closed { n } else { n - 1 };
        let x = v.clamp(0.0, 1.0) * spans as f64;
        let i = (x.floor() as usize).min(spans - 1);
        let f = x - i as f64;
        let i = i as isize;
        if self.options.straight {
            return lerp_point(&self.section_point(i, u), &self.section_point(i + 1, u), f);
        }
        catmull_rom(
            &self.section_point(i - 1, u),
            &self.section_point(i, u),
            &self.section_point(i + 1, u),
            &self.section_point(i + 2, u),
            f,
        )
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Loft
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Loft through section curves.
///
/// `u` runs along each section (normalized), `v` across sections; section
/// `k` of `n` sits at `v = k / (n − 1)` (or `k / n` when closed).
pub fn loft(sections: &[&dyn Curve3d], options: LoftOptions) -> Result<Surface, SurfaceError> {
    if sections.len() < 2 {
        return Err(SurfaceError::NotEnoughSections(sections.len()));
    }
    Ok(Surface::new(
        LoftFn {
            sections: sections.iter().map(|c| c.clone_box()).collect(),
            options,
        },
        Domain::unit(),
        Domain::unit(),
        None,
    ))
}

// =============================================================================
// Sweep
// =============================================================================

#[derive(Debug, Clone)]
struct SweepFn {
    profile: Box<dyn Curve3d>,
    frames: FrameTable,
}

impl SurfaceFn for SweepFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        let local = self.frames.first().local_coordinates(&at(self.profile.as_ref(), u));
        self.frames.at(v).point_at_local(local.x, local.y, local.z)
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Sweep
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Sweep a profile along a rail.
///
/// The profile is read relative to the rail's start frame and carried
/// along rotation-minimizing frames. `u` runs along the profile, `v` along
/// the rail.
pub fn sweep(rail: &dyn Curve3d, profile: &dyn Curve3d) -> Surface {
    Surface::new(
        SweepFn {
            profile: profile.clone_box(),
            frames: FrameTable::new(rail, RAIL_FRAME_SAMPLES),
        },
        Domain::unit(),
        Domain::unit(),
        None,
    )
}

// =============================================================================
// Network
// =============================================================================

#[derive(Debug, Clone)]
struct NetworkFn {
    u_curves: Vec<Box<dyn Curve3d>>,
    v_curves: Vec<Box<dyn Curve3d>>,
    /// `corners[i][j]`: blend of u-curve `i` and v-curve `j` at their nominal crossing.
    corners: Vec<Vec<Point3>>,
}

fn segment(count: usize, t: f64) -> (usize, f64) {
    let x = t.clamp(0.0, 1.0) * (count - 1) as f64;
    let i = (x.floor() as usize).min(count - 2);
    (i, x - i as f64)
}

impl SurfaceFn for NetworkFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        let (i, fv) = segment(self.u_curves.len(), v);
        let (j, fu) = segment(self.v_curves.len(), u);

        let lu = lerp_point(
            &at(self.u_curves[i].as_ref(), u),
            &at(self.u_curves[i + 1].as_ref(), u),
            fv,
        );
        let lv = lerp_point(
            &at(self.v_curves[j].as_ref(), v),
            &at(self.v_curves[j + 1].as_ref(), v),
            fu,
        );
        let bottom = lerp_point(&self.corners[i][j], &self.corners[i][j + 1], fu);
        let top = lerp_point(&self.corners[i + 1][j], &self.corners[i + 1][j + 1], fu);
        let tensor = lerp_point(&bottom, &top, fv);

        Point3::from(lu.coords + lv.coords - tensor.coords)
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Network
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Surface through two families of curves (Gordon construction).
///
/// `u_curves` are functions of u stacked evenly along v; `v_curves` are
/// functions of v stacked evenly along u. The result is the sum of the
/// two linear lofts minus their bilinear tensor at the crossings; with two
/// curves per family this is the bilinearly blended Coons patch.
pub fn network(
    u_curves: &[&dyn Curve3d],
    v_curves: &[&dyn Curve3d],
) -> Result<Surface, SurfaceError> {
    let (m, n) = (u_curves.len(), v_curves.len());
    if m < 2 || n < 2 {
        return Err(SurfaceError::NotEnoughNetworkCurves { u: m, v: n });
    }
    let corners = (0..m)
        .map(|i| {
            (0..n)
                .map(|j| {
                    let s = j as f64 / (n - 1) as f64;
                    let t = i as f64 / (m - 1) as f64;
                    lerp_point(&at(u_curves[i], s), &at(v_curves[j], t), 0.5)
                })
                .collect()
        })
        .collect();
    Ok(Surface::new(
        NetworkFn {
            u_curves: u_curves.iter().map(|c| c.clone_box()).collect(),
            v_curves: v_curves.iter().map(|c| c.clone_box()).collect(),
            corners,
        },
        Domain::unit(),
        Domain::unit(),
        None,
    ))
}

// =============================================================================
// Revolution
// =============================================================================

/// Rotate `p` about the line through `origin` along unit `axis` (Rodrigues).
pub(crate) fn rotate_about(p: &Point3, origin: &Point3, axis: &Vec3, angle: f64) -> Point3 {
    let (s, c) = angle.sin_cos();
    let v = p - origin;
    let rotated = v * c + axis.cross(&v) * s + axis * axis.dot(&v) * (1.0 - c);
    origin + rotated
}

#[derive(Debug, Clone)]
struct RevolutionFn {
    profile: Box<dyn Curve3d>,
    origin: Point3,
    axis: Vec3,
}

impl SurfaceFn for RevolutionFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        rotate_about(&at(self.profile.as_ref(), u), &self.origin, &self.axis, v)
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Revolution
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Revolve a profile about an axis through the `angle` interval (radians).
///
/// `u` runs along the profile, `v` is the rotation angle. A zero-length
/// axis falls back to world Z through the axis start.
pub fn revolution(profile: &dyn Curve3d, axis: &Line, angle: Domain) -> Surface {
    let dir = axis.direction().unwrap_or_else(|| {
        tracing::debug!("zero-length revolution axis, using world Z");
        Vec3::z()
    });
    Surface::new(
        RevolutionFn {
            profile: profile.clone_box(),
            origin: axis.from,
            axis: dir,
        },
        Domain::unit(),
        angle,
        Some(Plane::from_origin_normal(axis.from, dir)),
    )
}

// =============================================================================
// Extrusion
// =============================================================================

#[derive(Debug, Clone)]
struct ExtrusionFn {
    curve: Box<dyn Curve3d>,
    direction: Vec3,
}

impl SurfaceFn for ExtrusionFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        at(self.curve.as_ref(), u) + self.direction * v
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Extrusion
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Extrude a curve along `direction`; `u` along the curve, `v ∈ [0, 1]`
/// along the direction.
pub fn extrusion(curve: &dyn Curve3d, direction: Vec3) -> Surface {
    Surface::new(
        ExtrusionFn {
            curve: curve.clone_box(),
            direction,
        },
        Domain::unit(),
        Domain::unit(),
        curve.plane(),
    )
}

// =============================================================================
// Pipe
// =============================================================================

#[derive(Debug, Clone)]
struct PipeFn {
    frames: FrameTable,
    /// `(normalized parameter, radius)`, sorted by parameter.
    radii: Vec<(f64, f64)>,
}

impl PipeFn {
    fn radius_at(&self, s: f64) -> f64 {
        let first = self.radii[0];
        let last = self.radii[self.radii.len() - 1];
        if s <= first.0 {
            return first.1;
        }
        if s >= last.0 {
            return last.1;
        }
        self.radii
            .windows(2)
            .find(|w| s >= w[0].0 && s <= w[1].0)
            .map_or(last.1, |w| {
                let span = w[1].0 - w[0].0;
                let f = if span > 1e-15 { (s - w[0].0) / span } else { 0.0 };
                lerp(w[0].1, w[1].1, f)
            })
    }
}

impl SurfaceFn for PipeFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        let r = self.radius_at(u);
        let (s, c) = v.sin_cos();
        self.frames.at(u).point_at(r * c, r * s)
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Pipe
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Circular pipe of constant radius around a rail.
///
/// `u ∈ [0, 1]` runs along the rail, `v ∈ [0, 2π]` around it.
pub fn pipe(rail: &dyn Curve3d, radius: f64) -> Surface {
    Surface::new(
        PipeFn {
            frames: FrameTable::new(rail, RAIL_FRAME_SAMPLES),
            radii: vec![(0.0, radius)],
        },
        Domain::unit(),
        Domain::new(0.0, std::f64::consts::TAU),
        None,
    )
}

/// Pipe whose radius is interpolated linearly between
/// `(normalized parameter, radius)` samples.
pub fn pipe_variable(rail: &dyn Curve3d, radii: &[(f64, f64)]) -> Result<Surface, SurfaceError> {
    if radii.is_empty() {
        return Err(SurfaceError::NoRadii);
    }
    let mut radii = radii.to_vec();
    radii.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(Surface::new(
        PipeFn {
            frames: FrameTable::new(rail, RAIL_FRAME_SAMPLES),
            radii,
        },
        Domain::unit(),
        Domain::new(0.0, std::f64::consts::TAU),
        None,
    ))
}

// =============================================================================
// Wrappers
// =============================================================================

#[derive(Clone)]
struct MappedFn {
    inner: Box<dyn SurfaceFn>,
    map: PointMap,
}

impl fmt::Debug for MappedFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedFn")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl SurfaceFn for MappedFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        (self.map)(&self.inner.evaluate(u, v))
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Mapped
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// Compose a surface with a point map, keeping domains and metadata.
///
/// The orientation hint is replaced by `plane`, since an arbitrary map
/// cannot carry it over.
pub fn mapped(surface: &Surface, map: PointMap, plane: Option<Plane>) -> Surface {
    let mut out = Surface::new(
        MappedFn {
            inner: surface.function().clone_box(),
            map,
        },
        surface.domain_u,
        surface.domain_v,
        plane,
    );
    out.metadata = surface.metadata.clone();
    out
}

/// Restrict a surface to a sub-region given as normalized sub-domains.
///
/// `Domain::new(0.25, 0.75)` keeps the middle half of each direction.
pub fn isotrim(surface: &Surface, u: Domain, v: Domain) -> Surface {
    let du = Domain::new(
        surface.domain_u.parameter_at(u.start.clamp(0.0, 1.0)),
        surface.domain_u.parameter_at(u.end.clamp(0.0, 1.0)),
    );
    let dv = Domain::new(
        surface.domain_v.parameter_at(v.start.clamp(0.0, 1.0)),
        surface.domain_v.parameter_at(v.end.clamp(0.0, 1.0)),
    );
    surface.with_domains(du, dv)
}

#[derive(Debug, Clone)]
struct ReparameterizedFn {
    inner: Box<dyn SurfaceFn>,
    domain_u: Domain,
    domain_v: Domain,
}

impl SurfaceFn for ReparameterizedFn {
    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        self.inner
            .evaluate(self.domain_u.parameter_at(u), self.domain_v.parameter_at(v))
    }

    fn surface_type(&self) -> SurfaceKind {
        SurfaceKind::Reparameterized
    }

    fn clone_box(&self) -> Box<dyn SurfaceFn> {
        Box::new(self.clone())
    }
}

/// The same surface over unit domains in both directions.
pub fn reparameterize(surface: &Surface) -> Surface {
    let mut out = Surface::new(
        ReparameterizedFn {
            inner: surface.function().clone_box(),
            domain_u: surface.domain_u,
            domain_v: surface.domain_v,
        },
        Domain::unit(),
        Domain::unit(),
        surface.plane,
    );
    out.metadata = surface.metadata.clone();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{ArcCurve, LineCurve, PolylineCurve};
    use crate::primitives::cylinder;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};
    use std::sync::Arc;

    fn x_line(y: f64, z: f64) -> LineCurve {
        LineCurve::new(Point3::new(0.0, y, z), Point3::new(1.0, y, z))
    }

    #[test]
    fn test_ruled_between_lines() {
        let a = x_line(0.0, 0.0);
        let b = x_line(2.0, 1.0);
        let s = ruled(&a, &b);
        let p = s.evaluate(0.5, 0.5);
        assert!((p - Point3::new(0.5, 1.0, 0.5)).norm() < 1e-12);
    }

    #[test]
    fn test_loft_interpolates_sections() {
        let c0 = x_line(0.0, 0.0);
        let c1 = x_line(1.0, 1.0);
        let c2 = x_line(2.0, 0.0);
        let s = loft(&[&c0, &c1, &c2], LoftOptions::default()).unwrap();
        assert!((s.evaluate(0.3, 0.5) - Point3::new(0.3, 1.0, 1.0)).norm() < 1e-12);
        assert!((s.evaluate(0.3, 1.0) - Point3::new(0.3, 2.0, 0.0)).norm() < 1e-12);

        let straight = loft(
            &[&c0, &c1, &c2],
            LoftOptions {
                straight: true,
                closed: false,
            },
        )
        .unwrap();
        assert_abs_diff_eq!(straight.evaluate(0.0, 0.25).z, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_loft_needs_two_sections() {
        let c0 = x_line(0.0, 0.0);
        assert_eq!(
            loft(&[&c0], LoftOptions::default()).unwrap_err(),
            SurfaceError::NotEnoughSections(1)
        );
    }

    #[test]
    fn test_sweep_straight_rail_is_extrusion() {
        let rail = LineCurve::new(Point3::origin(), Point3::new(0.0, 0.0, 10.0));
        let profile = ArcCurve::circle(Plane::world_xy(), 1.0);
        let s = sweep(&rail, &profile);
        for &(u, v) in &[(0.0, 0.0), (0.25, 0.5), (0.7, 1.0)] {
            let p = s.evaluate(u, v);
            let radial = (p.x * p.x + p.y * p.y).sqrt();
            assert_abs_diff_eq!(radial, 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(p.z, 10.0 * v, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_network_two_by_two_is_coons_patch() {
        let u0 = x_line(0.0, 0.0);
        let u1 = x_line(1.0, 0.0);
        let v0 = LineCurve::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        let v1 = LineCurve::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        let s = network(&[&u0, &u1], &[&v0, &v1]).unwrap();
        let p = s.evaluate(0.3, 0.6);
        assert!((p - Point3::new(0.3, 0.6, 0.0)).norm() < 1e-12);

        assert!(network(&[&u0], &[&v0, &v1]).is_err());
    }

    #[test]
    fn test_network_reproduces_boundary_curves() {
        // Curved boundary along u = 0 side.
        let u0 = PolylineCurve::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
            Point3::new(1.0, 0.0, 0.0),
        ]);
        let u1 = x_line(1.0, 0.0);
        let v0 = LineCurve::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        let v1 = LineCurve::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        let s = network(&[&u0, &u1], &[&v0, &v1]).unwrap();
        assert_abs_diff_eq!(s.evaluate(0.5, 0.0).z, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.evaluate(0.5, 1.0).z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_revolution_of_line_is_cylinder() {
        let profile = LineCurve::new(Point3::new(2.0, 0.0, 0.0), Point3::new(2.0, 0.0, 5.0));
        let axis = Line::new(Point3::origin(), Point3::new(0.0, 0.0, 1.0));
        let s = revolution(&profile, &axis, Domain::new(0.0, 2.0 * PI));
        let p = s.evaluate(1.0, PI);
        assert!((p - Point3::new(-2.0, 0.0, 5.0)).norm() < 1e-12);
        let q = s.evaluate(0.0, FRAC_PI_2);
        assert!((q - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_extrusion() {
        let c = x_line(0.0, 0.0);
        let s = extrusion(&c, Vec3::new(0.0, 0.0, 3.0));
        assert!((s.evaluate(1.0, 1.0) - Point3::new(1.0, 0.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_pipe_radius() {
        let rail = LineCurve::new(Point3::origin(), Point3::new(10.0, 0.0, 0.0));
        let s = pipe(&rail, 0.5);
        for v in [0.0, 1.0, 2.5, 4.0] {
            let p = s.evaluate(0.4, v);
            assert_abs_diff_eq!((p.y * p.y + p.z * p.z).sqrt(), 0.5, epsilon = 1e-9);
            assert_abs_diff_eq!(p.x, 4.0, epsilon = 1e-9);
        }

        let tapered = pipe_variable(&rail, &[(1.0, 2.0), (0.0, 1.0)]).unwrap();
        let p = tapered.evaluate(0.5, 0.0);
        assert_abs_diff_eq!((p.y * p.y + p.z * p.z).sqrt(), 1.5, epsilon = 1e-9);
        assert_eq!(pipe_variable(&rail, &[]).unwrap_err(), SurfaceError::NoRadii);
    }

    #[test]
    fn test_isotrim_and_reparameterize() {
        let cyl = cylinder(Plane::world_xy(), 1.0, 4.0);
        let trimmed = isotrim(&cyl, Domain::unit(), Domain::new(0.5, 1.0));
        assert_abs_diff_eq!(trimmed.domain_v.start, 2.0);
        let unit = reparameterize(&trimmed);
        assert_eq!(unit.domain_u, Domain::unit());
        assert_abs_diff_eq!(unit.evaluate(0.0, 0.0).z, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(unit.evaluate(0.5, 1.0).x, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mapped_surface() {
        let cyl = cylinder(Plane::world_xy(), 1.0, 4.0);
        let shifted = mapped(
            &cyl,
            Arc::new(|p: &Point3| p + Vec3::new(0.0, 0.0, 1.0)),
            None,
        );
        assert_eq!(shifted.surface_type(), SurfaceKind::Mapped);
        assert_abs_diff_eq!(shifted.evaluate(0.0, 0.0).z, 1.0);
    }
}
