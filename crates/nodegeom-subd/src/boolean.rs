//! Approximate SubD booleans.
//!
//! These are not solid booleans. Faces are kept or dropped whole by testing
//! their centroids against the other operand's axis-aligned bounds, which is
//! enough to combine or cut cages for preview but never splits a face.
//! Vertex and edge tags of surviving geometry carry over, `a` first.

use nodegeom_math::MERGE_TOLERANCE;
use serde::{Deserialize, Serialize};

use crate::topology::SubD;

/// Boolean operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    /// All faces of both operands, welded.
    Union,
    /// Faces of each operand whose centroid lies in the other's bounds.
    Intersection,
    /// Faces of `a` whose centroid lies outside `b`'s bounds.
    Difference,
}

/// Combine two SubDs approximately; see the module docs for the rule.
///
/// Operands whose bounds do not overlap short-circuit: the intersection is
/// empty and the difference is `a` unchanged.
pub fn boolean(a: &SubD, b: &SubD, op: BooleanOp) -> SubD {
    let (Some(box_a), Some(box_b)) = (a.bounds(), b.bounds()) else {
        return match op {
            BooleanOp::Union if a.faces.is_empty() => b.clone(),
            BooleanOp::Union | BooleanOp::Difference => a.clone(),
            BooleanOp::Intersection => SubD::default(),
        };
    };

    let polys_a = a.polygons();
    let polys_b = b.polygons();
    let overlap = box_a.overlaps(&box_b);

    let kept: Vec<_> = match op {
        BooleanOp::Union => polys_a.into_iter().chain(polys_b).collect(),
        BooleanOp::Intersection if !overlap => Vec::new(),
        BooleanOp::Intersection => a
            .faces
            .iter()
            .filter(|f| box_b.contains(&f.centroid, MERGE_TOLERANCE))
            .map(|f| polys_a[f.id].clone())
            .chain(
                b.faces
                    .iter()
                    .filter(|f| box_a.contains(&f.centroid, MERGE_TOLERANCE))
                    .map(|f| polys_b[f.id].clone()),
            )
            .collect(),
        BooleanOp::Difference if !overlap => return a.clone(),
        BooleanOp::Difference => a
            .faces
            .iter()
            .filter(|f| !box_b.contains(&f.centroid, MERGE_TOLERANCE))
            .map(|f| polys_a[f.id].clone())
            .collect(),
    };

    let mut out = SubD::weld(&kept, MERGE_TOLERANCE);
    out.inherit_tags(&[a, b], MERGE_TOLERANCE);
    out.metadata = a.metadata.clone();
    out.metadata
        .insert("boolean".into(), serde_json::json!(format!("{op:?}").to_lowercase()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{subd_box, SubdBoxOptions};
    use crate::tags::{EdgeTag, VertexTag};
    use nodegeom_box::OrientedBox;
    use nodegeom_math::Point3;

    fn creased_cube(min: f64, max: f64) -> SubD {
        let b = OrientedBox::from_corners(Point3::new(min, min, min), Point3::new(max, max, max));
        subd_box(
            &b,
            &SubdBoxOptions {
                density: [1; 3],
                crease_boundary: true,
            },
        )
    }

    fn cube(min: f64, max: f64, density: usize) -> SubD {
        let b = OrientedBox::from_corners(Point3::new(min, min, min), Point3::new(max, max, max));
        subd_box(
            &b,
            &SubdBoxOptions {
                density: [density; 3],
                crease_boundary: false,
            },
        )
    }

    #[test]
    fn test_union_concatenates() {
        let u = boolean(&cube(0.0, 1.0, 1), &cube(5.0, 6.0, 1), BooleanOp::Union);
        assert_eq!(u.faces.len(), 12);
        assert_eq!(u.vertices.len(), 16);
        assert_eq!(u.metadata["boolean"], "union");
    }

    #[test]
    fn test_union_keeps_tags() {
        let (a, b) = (creased_cube(0.0, 1.0), creased_cube(5.0, 6.0));
        let count = |s: &SubD| {
            let creases = s.edges.iter().filter(|e| e.tag == EdgeTag::Crease).count();
            let corners = s.vertices.iter().filter(|v| v.tag == VertexTag::Corner).count();
            (creases, corners)
        };
        assert_eq!(count(&a), (12, 8));
        let u = boolean(&a, &b, BooleanOp::Union);
        assert_eq!(count(&u), (24, 16));
        for e in u.edges.iter().filter(|e| e.tag == EdgeTag::Crease) {
            let [p, q] = e.vertices;
            assert_eq!(u.vertices[p].tag, VertexTag::Corner);
            assert_eq!(u.vertices[q].tag, VertexTag::Corner);
        }
    }

    #[test]
    fn test_difference_keeps_tags_of_survivors() {
        let a = creased_cube(0.0, 2.0);
        let b = cube(1.0, 3.0, 1);
        let d = boolean(&a, &b, BooleanOp::Difference);
        assert!(!d.faces.is_empty());
        assert!(d.edges.iter().any(|e| e.tag == EdgeTag::Crease));
        assert!(d.vertices.iter().all(|v| v.tag == VertexTag::Corner));
    }

    #[test]
    fn test_disjoint_intersection_and_difference() {
        let a = cube(0.0, 1.0, 1);
        let b = cube(5.0, 6.0, 1);
        assert!(boolean(&a, &b, BooleanOp::Intersection).faces.is_empty());
        assert_eq!(boolean(&a, &b, BooleanOp::Difference), a);
    }

    #[test]
    fn test_overlapping_difference_drops_covered_faces() {
        let a = cube(0.0, 2.0, 2);
        let b = cube(1.0, 3.0, 1);
        let d = boolean(&a, &b, BooleanOp::Difference);
        assert!(d.faces.len() < a.faces.len());
        assert!(!d.faces.is_empty());
        for f in &d.faces {
            let c = f.centroid;
            assert!(!(c.x >= 1.0 && c.y >= 1.0 && c.z >= 1.0));
        }
        let i = boolean(&a, &b, BooleanOp::Intersection);
        assert_eq!(i.faces.len() + d.faces.len(), a.faces.len() + 3);
    }
}
