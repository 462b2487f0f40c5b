//! The `Morph` wrapper and rigid approximation.

use std::fmt;

use nodegeom_box::Aabb3;
use nodegeom_frame::{point_map, PointMap};
use nodegeom_math::{centroid, Point3, Vec3, MAX_SAMPLE_POINTS};
use nodegeom_transform::{apply_transform, collect_points, map_geometry, Geometry, PointMapper, Transform};
use serde::{Deserialize, Serialize};

/// Settings shared by all morphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorphOptions {
    /// Replace the map with its best-fit affine transform per value, which
    /// keeps straight things straight.
    pub rigid: bool,
}

/// A named point-to-point deformation.
#[derive(Clone)]
pub struct Morph {
    name: String,
    map: PointMap,
    /// Application settings.
    pub options: MorphOptions,
}

impl fmt::Debug for Morph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Morph")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Morph {
    /// Morph named `name` applying `map`.
    pub fn new(name: impl Into<String>, map: PointMap) -> Self {
        Self {
            name: name.into(),
            map,
            options: MorphOptions::default(),
        }
    }

    /// The morph that leaves every point where it is.
    pub fn identity() -> Self {
        Self::new("identity", point_map(|p| *p))
    }

    /// Same morph with `options`.
    pub fn with_options(mut self, options: MorphOptions) -> Self {
        self.options = options;
        self
    }

    /// Operator name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying map.
    pub fn point_map(&self) -> PointMap {
        self.map.clone()
    }

    /// Map a single point.
    pub fn map_point(&self, p: &Point3) -> Point3 {
        (self.map)(p)
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &Morph) -> Morph {
        let (a, b) = (self.map.clone(), next.map.clone());
        Morph {
            name: format!("{}+{}", self.name, next.name),
            map: point_map(move |p| b(&a(p))),
            options: self.options,
        }
    }

    /// Deform any value.
    pub fn apply(&self, geometry: &Geometry) -> Geometry {
        if self.options.rigid {
            let t = rigidify(geometry, &self.map);
            apply_transform(geometry, &t)
        } else {
            map_geometry(geometry, &PointMapper::new(self.map.clone()))
        }
    }
}

/// Best-fit affine stand-in for `map` around `geometry`.
///
/// Maps a tetrahedron at the value's centroid, with legs half its bounding
/// diagonal long, and solves the four-point correspondence. A value with no
/// points gives the identity.
pub fn rigidify(geometry: &Geometry, map: &PointMap) -> Transform {
    let points = collect_points(geometry, MAX_SAMPLE_POINTS);
    let (Some(center), Some(bounds)) = (centroid(&points), Aabb3::from_points(&points)) else {
        tracing::debug!("rigidify on a value without points, using identity");
        return Transform::identity();
    };
    let leg = (bounds.size().norm() * 0.5).max(1e-3);
    let source = [
        center,
        center + Vec3::x() * leg,
        center + Vec3::y() * leg,
        center + Vec3::z() * leg,
    ];
    let target = source.map(|p| map(&p));
    Transform::map_points(&source, &target).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegeom_surface::Mesh;

    fn triangle() -> Geometry {
        Geometry::Mesh(Mesh::new(
            vec![Point3::origin(), Point3::new(2.0, 0.0, 0.0), Point3::new(0.0, 2.0, 0.0)],
            vec![vec![0, 1, 2]],
        ))
    }

    #[test]
    fn test_apply_and_then() {
        let up = Morph::new("up", point_map(|p| p + Vec3::z()));
        let double = Morph::new("double", point_map(|p| Point3::from(p.coords * 2.0)));
        let both = up.then(&double);
        assert_eq!(both.name(), "up+double");
        assert_eq!(both.map_point(&Point3::origin()), Point3::new(0.0, 0.0, 2.0));
        let Geometry::Mesh(m) = both.apply(&triangle()) else {
            panic!("expected mesh");
        };
        assert_eq!(m.vertices[1], Point3::new(4.0, 0.0, 2.0));
        assert_eq!(Morph::identity().map_point(&Point3::new(1.0, 2.0, 3.0)), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_rigidify_recovers_affine_map() {
        let shear = point_map(|p| Point3::new(p.x + 0.5 * p.y, p.y, p.z + 1.0));
        let t = rigidify(&triangle(), &shear);
        let q = Point3::new(3.0, -1.0, 4.0);
        assert!((t.apply_point(&q) - shear(&q)).norm() < 1e-9);
        assert!(rigidify(&Geometry::Number(1.0), &shear).is_identity(0.0));
    }

    #[test]
    fn test_rigid_morph_keeps_straight_edges() {
        let wave = point_map(|p| Point3::new(p.x, p.y, (p.x * 2.0).sin()));
        let line = Geometry::Line(nodegeom_frame::Line::new(Point3::origin(), Point3::new(2.0, 0.0, 0.0)));
        let rigid = Morph::new("wave", wave).with_options(MorphOptions { rigid: true });
        let Geometry::Line(l) = rigid.apply(&line) else {
            panic!("expected line");
        };
        // Affine maps send the midpoint to the midpoint.
        let mid = rigid.map_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(mid.z.abs() > 0.5);
        let image_mid = nalgebra::center(&l.from, &l.to);
        assert!((image_mid.x - 1.0).abs() < 1e-9);
    }
}
