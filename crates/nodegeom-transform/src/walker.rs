//! Structural traversal shared by transforms and point-map deformations.

use std::collections::HashMap;
use std::sync::Arc;

use nodegeom_box::{ensure_box, BoxSource, OrientedBox};
use nodegeom_frame::{point_map, Line, Plane, PointMap};
use nodegeom_math::{Point3, Vec3};
use nodegeom_surface::{mapped, Curve3d, Surface};

use crate::geometry::{Geometry, Group, Record};
use crate::transform::Transform;

/// How each kind of geometric leaf is rebuilt during [`map_geometry`].
pub trait GeometryMapper {
    /// Map a location.
    fn map_point(&self, p: &Point3) -> Point3;

    /// Map a direction attached at `at`.
    fn map_vector(&self, at: &Point3, v: &Vec3) -> Vec3;

    /// Map a curve.
    fn map_curve(&self, curve: &dyn Curve3d) -> Box<dyn Curve3d>;

    /// Map a surface.
    fn map_surface(&self, surface: &Surface) -> Surface;

    /// Map a plane: origin as a point, axes as vectors at the origin.
    fn map_plane(&self, plane: &Plane) -> Plane {
        let o = plane.origin;
        Plane::from_origin_axes(
            self.map_point(&o),
            self.map_vector(&o, &plane.x_axis),
            self.map_vector(&o, &plane.y_axis),
        )
    }

    /// Map a box: the tightest box around its mapped corners, in its
    /// mapped frame.
    fn map_box(&self, b: &OrientedBox) -> OrientedBox {
        let plane = self.map_plane(&b.plane);
        let points = b.corners().iter().map(|p| self.map_point(p)).collect();
        ensure_box(BoxSource::Points {
            points,
            plane: Some(plane),
        })
        .unwrap_or(*b)
    }
}

/// Mapper applying an affine [`Transform`].
#[derive(Debug, Clone)]
pub struct TransformMapper {
    transform: Transform,
}

impl TransformMapper {
    /// Mapper for `transform`.
    pub fn new(transform: Transform) -> Self {
        Self { transform }
    }
}

impl GeometryMapper for TransformMapper {
    fn map_point(&self, p: &Point3) -> Point3 {
        self.transform.apply_point(p)
    }

    fn map_vector(&self, _at: &Point3, v: &Vec3) -> Vec3 {
        self.transform.apply_vector(v)
    }

    fn map_curve(&self, curve: &dyn Curve3d) -> Box<dyn Curve3d> {
        curve.transform(self.transform.matrix())
    }

    fn map_surface(&self, surface: &Surface) -> Surface {
        let m = *self.transform.matrix();
        let plane = surface.plane.map(|p| self.transform.apply_plane(&p));
        mapped(surface, point_map(move |p| m.transform_point(p)), plane)
    }
}

/// Mapper applying an arbitrary point function.
///
/// Vectors follow the map's directional derivative at their anchor.
#[derive(Clone)]
pub struct PointMapper {
    map: PointMap,
}

impl std::fmt::Debug for PointMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointMapper").finish_non_exhaustive()
    }
}

impl PointMapper {
    /// Mapper for `map`.
    pub fn new(map: PointMap) -> Self {
        Self { map }
    }
}

impl GeometryMapper for PointMapper {
    fn map_point(&self, p: &Point3) -> Point3 {
        (self.map)(p)
    }

    fn map_vector(&self, at: &Point3, v: &Vec3) -> Vec3 {
        let len = v.norm();
        if len < 1e-300 {
            return *v;
        }
        let h = 1e-6 * (1.0 + at.coords.norm());
        let dir = v / len;
        let ahead = (self.map)(&(at + dir * h));
        let behind = (self.map)(&(at - dir * h));
        let d = (ahead - behind) / (2.0 * h) * len;
        if d.iter().all(|c| c.is_finite()) {
            d
        } else {
            *v
        }
    }

    fn map_curve(&self, curve: &dyn Curve3d) -> Box<dyn Curve3d> {
        curve.map_points(&self.map)
    }

    fn map_surface(&self, surface: &Surface) -> Surface {
        let plane = surface.plane.map(|p| self.map_plane(&p));
        mapped(surface, self.map.clone(), plane)
    }
}

struct Walker<'a> {
    mapper: &'a dyn GeometryMapper,
    // Input allocations stay borrowed for the whole walk, so their
    // addresses are stable keys.
    memo: HashMap<*const Geometry, Arc<Geometry>>,
}

impl Walker<'_> {
    fn shared(&mut self, item: &Arc<Geometry>) -> Arc<Geometry> {
        let key = Arc::as_ptr(item);
        if let Some(done) = self.memo.get(&key) {
            return Arc::clone(done);
        }
        let out = Arc::new(self.walk(item, &Point3::origin()));
        self.memo.insert(key, Arc::clone(&out));
        out
    }

    fn walk(&mut self, geometry: &Geometry, anchor: &Point3) -> Geometry {
        let m = self.mapper;
        match geometry {
            Geometry::Point(p) => Geometry::Point(m.map_point(p)),
            Geometry::Vector(v) => Geometry::Vector(m.map_vector(anchor, v)),
            Geometry::Plane(p) => Geometry::Plane(m.map_plane(p)),
            Geometry::Line(l) => Geometry::Line(Line::new(m.map_point(&l.from), m.map_point(&l.to))),
            Geometry::Curve(c) => Geometry::Curve(m.map_curve(c.as_ref())),
            Geometry::Surface(s) => Geometry::Surface(m.map_surface(s)),
            Geometry::Box(b) => Geometry::Box(m.map_box(b)),
            Geometry::TwistedBox(b) => Geometry::TwistedBox(b.map_corners(|p| m.map_point(p))),
            Geometry::Mesh(mesh) => Geometry::Mesh(mesh.map_vertices(|p| m.map_point(p))),
            Geometry::SubD(s) => Geometry::SubD(s.map_points(|p| m.map_point(p))),
            Geometry::Group(g) => Geometry::Group(Group {
                items: g.items.iter().map(|item| self.shared(item)).collect(),
                metadata: g.metadata.clone(),
            }),
            Geometry::Record(r) => {
                let at = r.anchor();
                let fields = r
                    .fields
                    .iter()
                    .map(|(name, value)| {
                        // Vectors depend on the anchor, so they are not shared.
                        let mapped = match value.as_ref() {
                            Geometry::Vector(_) => Arc::new(self.walk(value, &at)),
                            _ => self.shared(value),
                        };
                        (name.clone(), mapped)
                    })
                    .collect();
                Geometry::Record(Record { fields })
            }
            Geometry::Transform(_)
            | Geometry::Number(_)
            | Geometry::Text(_)
            | Geometry::Bool(_) => geometry.clone(),
        }
    }
}

/// Rebuild `geometry` through `mapper`.
///
/// Values shared through the same `Arc` are mapped once and stay shared in
/// the output. Transforms, numbers, text and flags pass through unchanged.
pub fn map_geometry(geometry: &Geometry, mapper: &dyn GeometryMapper) -> Geometry {
    let mut walker = Walker {
        mapper,
        memo: HashMap::new(),
    };
    walker.walk(geometry, &Point3::origin())
}

/// Apply an affine transform to any value.
pub fn apply_transform(geometry: &Geometry, transform: &Transform) -> Geometry {
    map_geometry(geometry, &TransformMapper::new(transform.clone()))
}
