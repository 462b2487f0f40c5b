//! Deformation fields driven by scattered points.

use nodegeom_frame::point_map;
use nodegeom_math::{Point3, Vec3};

use crate::axial::unchanged;
use crate::morph::Morph;
use crate::MorphError;

/// Drag space with `points`, each moving by its `motion`.
///
/// Influence falls off smoothly as `(1 − (d/radius)²)²` and vanishes beyond
/// `radius`. A non-positive radius gives the identity.
pub fn point_deform(points: &[Point3], motions: &[Vec3], radius: f64) -> Result<Morph, MorphError> {
    if points.len() != motions.len() {
        return Err(MorphError::MotionCountMismatch {
            points: points.len(),
            motions: motions.len(),
        });
    }
    if !(radius > 0.0) {
        tracing::debug!(radius, "non-positive deformation radius, using identity");
        return Ok(unchanged("point_deform"));
    }
    let handles: Vec<(Point3, Vec3)> = points.iter().copied().zip(motions.iter().copied()).collect();
    Ok(Morph::new(
        "point_deform",
        point_map(move |p| {
            let mut offset = Vec3::zeros();
            for (q, m) in &handles {
                let d = (p - q).norm() / radius;
                if d < 1.0 {
                    let w = 1.0 - d * d;
                    offset += m * (w * w);
                }
            }
            p + offset
        }),
    ))
}

/// Push space with a force at each sample, fading as a Gaussian of width
/// `falloff`.
///
/// A non-positive falloff gives the identity.
pub fn spatial_deform(samples: &[Point3], forces: &[Vec3], falloff: f64) -> Result<Morph, MorphError> {
    if samples.is_empty() {
        return Err(MorphError::NoSamples);
    }
    if samples.len() != forces.len() {
        return Err(MorphError::MotionCountMismatch {
            points: samples.len(),
            motions: forces.len(),
        });
    }
    if !(falloff > 0.0) {
        tracing::debug!(falloff, "non-positive falloff, using identity");
        return Ok(unchanged("spatial_deform"));
    }
    let field: Vec<(Point3, Vec3)> = samples.iter().copied().zip(forces.iter().copied()).collect();
    Ok(Morph::new(
        "spatial_deform",
        point_map(move |p| {
            let offset: Vec3 = field
                .iter()
                .map(|(q, f)| f * (-((p - q).norm_squared()) / (falloff * falloff)).exp())
                .sum();
            p + offset
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_point_deform() {
        let m = point_deform(&[Point3::origin()], &[Vec3::z()], 2.0).unwrap();
        assert_abs_diff_eq!(m.map_point(&Point3::origin()), Point3::new(0.0, 0.0, 1.0));
        // d = 0.5: (1 - 0.25)² = 0.5625.
        assert_abs_diff_eq!(m.map_point(&Point3::new(1.0, 0.0, 0.0)).z, 0.5625, epsilon = 1e-12);
        assert_eq!(m.map_point(&Point3::new(3.0, 0.0, 0.0)), Point3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_point_deform_errors() {
        assert_eq!(
            point_deform(&[Point3::origin()], &[], 1.0).unwrap_err(),
            MorphError::MotionCountMismatch { points: 1, motions: 0 }
        );
        let flat = point_deform(&[Point3::origin()], &[Vec3::z()], 0.0).unwrap();
        assert_eq!(flat.map_point(&Point3::origin()), Point3::origin());
    }

    #[test]
    fn test_spatial_deform() {
        assert_eq!(spatial_deform(&[], &[], 1.0).unwrap_err(), MorphError::NoSamples);
        let m = spatial_deform(&[Point3::origin()], &[Vec3::x()], 1.0).unwrap();
        assert_abs_diff_eq!(m.map_point(&Point3::origin()).x, 1.0, epsilon = 1e-12);
        let far = m.map_point(&Point3::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(far.x, (-1.0f64).exp(), epsilon = 1e-12);
    }
}
