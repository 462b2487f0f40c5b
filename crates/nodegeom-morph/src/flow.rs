//! Flow along a curve: carry points from one curve's neighbourhood to
//! another's.

use nalgebra::UnitQuaternion;
use nodegeom_frame::point_map;
use nodegeom_surface::{closest_parameter, ArcLengthTable, Curve3d, FrameTable};
use serde::{Deserialize, Serialize};

use crate::morph::Morph;

/// Settings for [`flow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowOptions {
    /// Rescale lengths so the whole base maps onto the whole target.
    pub stretch: bool,
    /// Polyline density for projection, arc length and frames.
    pub samples: usize,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            stretch: false,
            samples: 128,
        }
    }
}

/// Move points from around `base` to the same place around `target`.
///
/// Each point is projected onto the base; its arc length there becomes an
/// arc length on the target (scaled by the length ratio with `stretch`),
/// and its offset in the base frame is rebuilt in the target frame. The
/// target frames are rolled so the first frames of both curves agree.
pub fn flow(base: &dyn Curve3d, target: &dyn Curve3d, options: FlowOptions) -> Morph {
    let samples = options.samples.max(8);
    let base = base.clone_box();
    let target = target.clone_box();
    let base_lengths = ArcLengthTable::new(base.as_ref(), samples);
    let target_lengths = ArcLengthTable::new(target.as_ref(), samples);
    let base_frames = FrameTable::new(base.as_ref(), samples);
    let target_frames = FrameTable::new(target.as_ref(), samples);

    let b0 = base_frames.first();
    let t0 = target_frames.first();
    let carried = UnitQuaternion::rotation_between(&b0.tangent, &t0.tangent)
        .map(|q| q * b0.normal)
        .unwrap_or(b0.normal);
    let roll = carried.dot(&t0.binormal).atan2(carried.dot(&t0.normal));

    let ratio = if base_lengths.total() > 1e-12 {
        target_lengths.total() / base_lengths.total()
    } else {
        tracing::debug!("zero-length flow base");
        1.0
    };

    Morph::new(
        "flow",
        point_map(move |p| {
            let hit = closest_parameter(base.as_ref(), p, samples);
            let local = base_frames
                .at(base.domain().normalize(hit.parameter))
                .local_coordinates(p);

            let mut length = base_lengths.length_at(hit.parameter);
            if options.stretch {
                length *= ratio;
            }
            let t = target_lengths.parameter_at(length);
            // Arc length beyond the end of the target continues straight on.
            let overshoot = length - target_lengths.length_at(t);

            target_frames
                .at(target.domain().normalize(t))
                .with_twist(roll)
                .point_at_local(local.x + overshoot.max(0.0), local.y, local.z)
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nodegeom_frame::Plane;
    use nodegeom_math::Point3;
    use nodegeom_surface::{ArcCurve, LineCurve};
    use std::f64::consts::PI;

    #[test]
    fn test_flow_between_parallel_lines() {
        let base = LineCurve::new(Point3::origin(), Point3::new(10.0, 0.0, 0.0));
        let target = LineCurve::new(Point3::new(0.0, 5.0, 0.0), Point3::new(10.0, 5.0, 0.0));
        let m = flow(&base, &target, FlowOptions::default());
        assert_abs_diff_eq!(m.map_point(&Point3::new(3.0, 1.0, 2.0)), Point3::new(3.0, 6.0, 2.0), epsilon = 1e-6);
    }

    #[test]
    fn test_flow_stretch() {
        let base = LineCurve::new(Point3::origin(), Point3::new(10.0, 0.0, 0.0));
        let target = LineCurve::new(Point3::origin(), Point3::new(0.0, 20.0, 0.0));
        let plain = flow(&base, &target, FlowOptions::default());
        let stretched = flow(&base, &target, FlowOptions { stretch: true, ..Default::default() });
        assert_abs_diff_eq!(plain.map_point(&Point3::new(5.0, 0.0, 0.0)), Point3::new(0.0, 5.0, 0.0), epsilon = 1e-6);
        assert_abs_diff_eq!(stretched.map_point(&Point3::new(5.0, 0.0, 0.0)), Point3::new(0.0, 10.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_flow_onto_arc_keeps_distance() {
        let base = LineCurve::new(Point3::origin(), Point3::new(PI, 0.0, 0.0));
        let arc = ArcCurve::new(Plane::world_xy(), 1.0, nodegeom_frame::Domain::new(0.0, PI));
        let m = flow(&base, &arc, FlowOptions { samples: 256, ..Default::default() });
        let on = m.map_point(&Point3::new(PI / 2.0, 0.0, 0.0));
        assert_abs_diff_eq!(on, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-3);
        let above = m.map_point(&Point3::new(PI / 2.0, 0.0, 0.5));
        assert_abs_diff_eq!((above - on).norm(), 0.5, epsilon = 1e-3);
    }
}
