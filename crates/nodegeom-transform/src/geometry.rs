//! The closed set of values the kernel operates on.

use std::collections::BTreeMap;
use std::sync::Arc;

use nodegeom_box::{ensure_box, BoxSource, OrientedBox, TwistedBox};
use nodegeom_frame::{Line, Metadata, Plane};
use nodegeom_math::{Point3, Vec3, MAX_SAMPLE_POINTS};
use nodegeom_subd::SubD;
use nodegeom_surface::{sample_curve, sample_surface_grid, Curve3d, Mesh, Surface};

use crate::transform::Transform;

/// Grid resolution used when a surface stands in for its points.
const SURFACE_POINT_GRID: usize = 16;

/// Any kernel value.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// A location.
    Point(Point3),
    /// A free direction or displacement.
    Vector(Vec3),
    /// An oriented frame.
    Plane(Plane),
    /// A finite segment.
    Line(Line),
    /// A parametric curve.
    Curve(Box<dyn Curve3d>),
    /// A parametric surface.
    Surface(Surface),
    /// An oriented box.
    Box(OrientedBox),
    /// A trilinear hexahedron.
    TwistedBox(TwistedBox),
    /// A polygon mesh.
    Mesh(Mesh),
    /// A tagged control cage.
    SubD(SubD),
    /// A transform value; carried, never mapped.
    Transform(Transform),
    /// An ordered collection.
    Group(Group),
    /// Named fields.
    Record(Record),
    /// A scalar.
    Number(f64),
    /// Text.
    Text(String),
    /// A flag.
    Bool(bool),
}

/// Ordered collection of shared values.
#[derive(Debug, Clone, Default)]
pub struct Group {
    /// Members; the same `Arc` may appear more than once.
    pub items: Vec<Arc<Geometry>>,
    /// Free-form metadata.
    pub metadata: Metadata,
}

impl Group {
    /// Group of `items` with no metadata.
    pub fn new(items: Vec<Arc<Geometry>>) -> Self {
        Self {
            items,
            metadata: Metadata::new(),
        }
    }

    /// Members with nested groups expanded depth-first.
    pub fn flatten(&self) -> Vec<Arc<Geometry>> {
        let mut out = Vec::new();
        for item in &self.items {
            match item.as_ref() {
                Geometry::Group(inner) => out.extend(inner.flatten()),
                _ => out.push(Arc::clone(item)),
            }
        }
        out
    }
}

/// A value with named fields, such as a node's structured output.
///
/// Vector fields are mapped at the record's anchor: its `point`, `origin`
/// or `position` field, in that order, else the world origin.
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// Fields by name.
    pub fields: BTreeMap<String, Arc<Geometry>>,
}

impl Record {
    /// Anchor point for vector-valued fields.
    pub fn anchor(&self) -> Point3 {
        ["point", "origin", "position"]
            .iter()
            .find_map(|key| match self.fields.get(*key).map(|g| g.as_ref()) {
                Some(Geometry::Point(p)) => Some(*p),
                _ => None,
            })
            .unwrap_or_else(Point3::origin)
    }
}

impl From<Point3> for Geometry {
    fn from(p: Point3) -> Self {
        Geometry::Point(p)
    }
}

impl From<Vec3> for Geometry {
    fn from(v: Vec3) -> Self {
        Geometry::Vector(v)
    }
}

impl From<Plane> for Geometry {
    fn from(p: Plane) -> Self {
        Geometry::Plane(p)
    }
}

impl From<Line> for Geometry {
    fn from(l: Line) -> Self {
        Geometry::Line(l)
    }
}

impl From<Surface> for Geometry {
    fn from(s: Surface) -> Self {
        Geometry::Surface(s)
    }
}

impl From<OrientedBox> for Geometry {
    fn from(b: OrientedBox) -> Self {
        Geometry::Box(b)
    }
}

impl From<Mesh> for Geometry {
    fn from(m: Mesh) -> Self {
        Geometry::Mesh(m)
    }
}

impl From<SubD> for Geometry {
    fn from(s: SubD) -> Self {
        Geometry::SubD(s)
    }
}

impl From<Group> for Geometry {
    fn from(g: Group) -> Self {
        Geometry::Group(g)
    }
}

impl Geometry {
    /// Short lowercase name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "point",
            Geometry::Vector(_) => "vector",
            Geometry::Plane(_) => "plane",
            Geometry::Line(_) => "line",
            Geometry::Curve(_) => "curve",
            Geometry::Surface(_) => "surface",
            Geometry::Box(_) => "box",
            Geometry::TwistedBox(_) => "twisted_box",
            Geometry::Mesh(_) => "mesh",
            Geometry::SubD(_) => "subd",
            Geometry::Transform(_) => "transform",
            Geometry::Group(_) => "group",
            Geometry::Record(_) => "record",
            Geometry::Number(_) => "number",
            Geometry::Text(_) => "text",
            Geometry::Bool(_) => "bool",
        }
    }

    /// The point, if this is one.
    pub fn as_point(&self) -> Option<&Point3> {
        match self {
            Geometry::Point(p) => Some(p),
            _ => None,
        }
    }

    /// The mesh, if this is one.
    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            Geometry::Mesh(m) => Some(m),
            _ => None,
        }
    }
}

/// Representative points of a value, at most `cap` of them.
///
/// Curves and surfaces are sampled; boxes give their corners. `cap` is
/// itself limited to [`MAX_SAMPLE_POINTS`].
pub fn collect_points(geometry: &Geometry, cap: usize) -> Vec<Point3> {
    let cap = cap.min(MAX_SAMPLE_POINTS);
    let mut out = Vec::new();
    push_points(geometry, cap, &mut out);
    out.truncate(cap);
    out
}

fn push_points(geometry: &Geometry, cap: usize, out: &mut Vec<Point3>) {
    if out.len() >= cap {
        return;
    }
    match geometry {
        Geometry::Point(p) => out.push(*p),
        Geometry::Plane(p) => out.push(p.origin),
        Geometry::Line(l) => out.extend([l.from, l.to]),
        Geometry::Curve(c) => out.extend(sample_curve(c.as_ref(), c.suggested_segments())),
        Geometry::Surface(s) => {
            out.extend(sample_surface_grid(s, SURFACE_POINT_GRID, SURFACE_POINT_GRID).points)
        }
        Geometry::Box(b) => out.extend(b.corners()),
        Geometry::TwistedBox(b) => out.extend(b.corners),
        Geometry::Mesh(m) => out.extend(m.vertices.iter().copied()),
        Geometry::SubD(s) => out.extend(s.points()),
        Geometry::Group(g) => {
            for item in &g.items {
                push_points(item, cap, out);
            }
        }
        Geometry::Record(r) => {
            for item in r.fields.values() {
                push_points(item, cap, out);
            }
        }
        Geometry::Vector(_)
        | Geometry::Transform(_)
        | Geometry::Number(_)
        | Geometry::Text(_)
        | Geometry::Bool(_) => {}
    }
}

/// Bounding box of a value's points in `plane`. `None` when the value has
/// no points.
pub fn bounding_box(geometry: &Geometry, plane: &Plane) -> Option<OrientedBox> {
    let points = collect_points(geometry, MAX_SAMPLE_POINTS);
    if points.is_empty() {
        return None;
    }
    ensure_box(BoxSource::Points {
        points,
        plane: Some(*plane),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nodegeom_surface::{plane_surface, LineCurve};

    #[test]
    fn test_flatten_nested_groups() {
        let p = Arc::new(Geometry::Point(Point3::new(1.0, 0.0, 0.0)));
        let inner = Group::new(vec![Arc::clone(&p), Arc::new(Geometry::Number(2.0))]);
        let outer = Group::new(vec![Arc::new(inner.into()), Arc::clone(&p)]);
        let flat = outer.flatten();
        assert_eq!(flat.len(), 3);
        assert!(Arc::ptr_eq(&flat[0], &p));
        assert_eq!(flat[1].kind(), "number");
    }

    #[test]
    fn test_collect_points_caps() {
        let curve = Geometry::Curve(Box::new(LineCurve::new(Point3::origin(), Point3::new(4.0, 0.0, 0.0))));
        assert_eq!(collect_points(&curve, 5).len(), 5);
        assert!(collect_points(&Geometry::Text("x".into()), 10).is_empty());
        let mesh = Mesh::new(vec![Point3::origin(); 10_000], vec![]);
        assert_eq!(collect_points(&mesh.into(), usize::MAX).len(), MAX_SAMPLE_POINTS);
    }

    #[test]
    fn test_bounding_box_of_group() {
        let surface = plane_surface(
            Plane::world_xy(),
            nodegeom_frame::Domain::new(0.0, 2.0),
            nodegeom_frame::Domain::new(0.0, 3.0),
        );
        let g: Geometry = Group::new(vec![
            Arc::new(surface.into()),
            Arc::new(Geometry::Point(Point3::new(0.0, 0.0, 5.0))),
        ])
        .into();
        let b = bounding_box(&g, &Plane::world_xy()).unwrap();
        assert_abs_diff_eq!(b.size(), Vec3::new(2.0, 3.0, 5.0), epsilon = 1e-9);
        assert!(bounding_box(&Geometry::Bool(true), &Plane::world_xy()).is_none());
    }

    #[test]
    fn test_record_anchor() {
        let mut r = Record::default();
        assert_eq!(r.anchor(), Point3::origin());
        r.fields.insert("origin".into(), Arc::new(Geometry::Point(Point3::new(1.0, 2.0, 3.0))));
        assert_eq!(r.anchor(), Point3::new(1.0, 2.0, 3.0));
    }
}
