//! Composable affine transforms.

use nalgebra::{Matrix4, UnitQuaternion, Vector4};
use nodegeom_box::OrientedBox;
use nodegeom_frame::{Domain, Line, Plane};
use nodegeom_math::{any_perpendicular, Dir3, Mat3, Mat4, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::TransformError;

/// An affine transform that keeps the fragments it was composed from.
///
/// `matrix` always equals the product of `fragments` in application order
/// (`Fₙ·…·F₁`), or the identity when there are none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    matrix: Mat4,
    fragments: Vec<Mat4>,
}

/// A rectangle in a plane, spanned by an x and a y domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Frame of the rectangle.
    pub plane: Plane,
    /// Extent along the plane's x axis.
    pub x: Domain,
    /// Extent along the plane's y axis.
    pub y: Domain,
}

impl Rectangle {
    /// Rectangle in `plane` over `x × y`.
    pub fn new(plane: Plane, x: Domain, y: Domain) -> Self {
        Self { plane, x, y }
    }

    /// Corners at `(x.start, y.start)`, `(x.end, y.start)`, `(x.end, y.end)`
    /// and `(x.start, y.end)`.
    pub fn corners(&self) -> [Point3; 4] {
        let p = &self.plane;
        [
            p.point_at(self.x.start, self.y.start),
            p.point_at(self.x.end, self.y.start),
            p.point_at(self.x.end, self.y.end),
            p.point_at(self.x.start, self.y.end),
        ]
    }
}

fn linear_to_mat4(linear: &Mat3, translation: &Vec3) -> Mat4 {
    let mut m = Mat4::identity();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(linear);
    m.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
    m
}

// Fourth point for a three-point correspondence: off the triangle along its
// normal, scaled so the map stays roughly isotropic.
fn lift_triangle(p: &[Point3; 3]) -> Option<Point3> {
    let n = (p[1] - p[0]).cross(&(p[2] - p[0]));
    let area2 = n.norm();
    (area2 > 1e-12).then(|| p[0] + n / area2 * area2.sqrt())
}

impl Transform {
    /// Identity with no fragments.
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::identity(),
            fragments: Vec::new(),
        }
    }

    /// A single-fragment transform.
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            matrix,
            fragments: vec![matrix],
        }
    }

    /// The combined matrix.
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Fragments in application order.
    pub fn fragments(&self) -> &[Mat4] {
        &self.fragments
    }

    /// Apply `transforms` in order: the first one acts first.
    pub fn compose(transforms: &[Transform]) -> Self {
        transforms
            .iter()
            .fold(Self::identity(), |acc, t| acc.then(t))
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &Transform) -> Self {
        let mut fragments = self.fragments.clone();
        fragments.extend_from_slice(&next.fragments);
        Self {
            matrix: next.matrix * self.matrix,
            fragments,
        }
    }

    /// Inverse, undoing fragments one at a time in reverse order.
    ///
    /// `None` when any fragment is singular.
    pub fn inverse(&self) -> Option<Self> {
        let mut fragments = Vec::with_capacity(self.fragments.len());
        for (index, f) in self.fragments.iter().enumerate().rev() {
            let Some(inv) = f.try_inverse() else {
                tracing::debug!(index, "singular transform fragment");
                return None;
            };
            fragments.push(inv);
        }
        let matrix = fragments
            .iter()
            .fold(Mat4::identity(), |acc, f| f * acc);
        Some(Self { matrix, fragments })
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        if (v.w - 1.0).abs() > 1e-12 && v.w.abs() > 1e-300 {
            Point3::new(v.x / v.w, v.y / v.w, v.z / v.w)
        } else {
            Point3::new(v.x, v.y, v.z)
        }
    }

    /// Transform a direction vector by the linear 3×3 part.
    pub fn apply_vector(&self, v: &Vec3) -> Vec3 {
        self.linear() * v
    }

    /// Transform a surface normal (inverse transpose of the linear part).
    pub fn apply_normal(&self, n: &Vec3) -> Vec3 {
        match self.linear().try_inverse() {
            Some(inv) => inv.transpose() * n,
            None => *n,
        }
    }

    /// Transform a plane: origin by the full map, axes by the linear part,
    /// re-orthonormalized.
    pub fn apply_plane(&self, plane: &Plane) -> Plane {
        Plane::from_origin_axes(
            self.apply_point(&plane.origin),
            self.apply_vector(&plane.x_axis),
            self.apply_vector(&plane.y_axis),
        )
    }

    /// Upper-left 3×3 block.
    pub fn linear(&self) -> Mat3 {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// True when every matrix entry is within `tol` of the identity.
    pub fn is_identity(&self, tol: f64) -> bool {
        (self.matrix - Mat4::identity()).amax() <= tol
    }

    /// True when the linear part is a uniform scale times a rotation or
    /// reflection.
    pub fn is_similarity(&self, tol: f64) -> bool {
        let l = self.linear();
        let gram = l.transpose() * l;
        let s2 = gram.trace() / 3.0;
        s2 > tol && (gram - Mat3::identity() * s2).amax() <= tol * s2.max(1.0)
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Translation by `v`.
    pub fn translation(v: &Vec3) -> Self {
        Self::from_matrix(Matrix4::new_translation(v))
    }

    /// Uniform scale by `factor` about `center`.
    pub fn scale_about(center: &Point3, factor: f64) -> Self {
        let linear = Mat3::identity() * factor;
        Self::from_matrix(linear_to_mat4(&linear, &(center.coords * (1.0 - factor))))
    }

    /// Rotation about an axis through the world origin.
    ///
    /// Uses Rodrigues' rotation formula.
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);
        let linear = Mat3::new(
            t * x * x + c,
            t * x * y - s * z,
            t * x * z + s * y,
            t * x * y + s * z,
            t * y * y + c,
            t * y * z - s * x,
            t * x * z - s * y,
            t * y * z + s * x,
            t * z * z + c,
        );
        Self::from_matrix(linear_to_mat4(&linear, &Vec3::zeros()))
    }

    /// Rotation by `angle` about `axis`: move the axis to the origin, rotate
    /// and move back. A zero-length axis gives the identity.
    pub fn rotation_axis(angle: f64, axis: &Line) -> Self {
        let Some(dir) = axis.direction() else {
            tracing::debug!("zero-length rotation axis, using identity");
            return Self::identity();
        };
        let rot = Self::rotation_about_axis(&Dir3::new_normalize(dir), angle);
        let to = Matrix4::new_translation(&axis.from.coords);
        let back = Matrix4::new_translation(&-axis.from.coords);
        Self::from_matrix(to * rot.matrix * back)
    }

    /// Shortest-arc rotation taking direction `from` onto `to` about `center`.
    pub fn rotation_directions(from: &Vec3, to: &Vec3, center: &Point3) -> Self {
        if from.norm() < 1e-12 || to.norm() < 1e-12 {
            tracing::debug!("zero direction in rotation, using identity");
            return Self::identity();
        }
        let q = UnitQuaternion::rotation_between(from, to).unwrap_or_else(|| {
            // Antiparallel: any half turn about a perpendicular axis works.
            let axis = Dir3::new_normalize(any_perpendicular(from));
            UnitQuaternion::from_axis_angle(&axis, std::f64::consts::PI)
        });
        let linear = q.to_rotation_matrix().into_inner();
        let translation = center.coords - linear * center.coords;
        Self::from_matrix(linear_to_mat4(&linear, &translation))
    }

    /// Reflection across `plane` (Householder about its normal).
    pub fn mirror(plane: &Plane) -> Self {
        let n = plane.normal();
        let linear = Mat3::identity() - n * n.transpose() * 2.0;
        let translation = n * (2.0 * n.dot(&plane.origin.coords));
        Self::from_matrix(linear_to_mat4(&linear, &translation))
    }

    /// Rigid map taking `source` onto `target`, axes to axes.
    pub fn orient(source: &Plane, target: &Plane) -> Self {
        Self::from_matrix(target.to_matrix() * source.to_local_matrix())
    }

    /// Plane-local coordinates to world.
    pub fn from_plane_basis(plane: &Plane) -> Self {
        Self::from_matrix(plane.to_matrix())
    }

    /// World coordinates to plane-local.
    pub fn to_plane_basis(plane: &Plane) -> Self {
        Self::from_matrix(plane.to_local_matrix())
    }

    /// Scale by `(sx, sy, sz)` along the axes of `plane`, about its origin.
    pub fn scale_non_uniform(plane: &Plane, sx: f64, sy: f64, sz: f64) -> Self {
        let diag = Matrix4::new_nonuniform_scaling(&Vec3::new(sx, sy, sz));
        Self::from_matrix(plane.to_matrix() * diag * plane.to_local_matrix())
    }

    /// Shear parallel to `plane` that moves `grip` onto `target`.
    ///
    /// Offsets grow linearly with height above the plane, so `grip` must lie
    /// off it; a grip on the plane gives the identity.
    pub fn shear(plane: &Plane, grip: &Point3, target: &Point3) -> Self {
        let g = plane.coordinates(grip);
        let t = plane.coordinates(target);
        if g.z.abs() < 1e-12 {
            tracing::debug!("shear grip lies on the plane, using identity");
            return Self::identity();
        }
        let dz = t.z / g.z;
        let mut local = Mat4::identity();
        local[(0, 2)] = (t.x - g.x) / g.z;
        local[(1, 2)] = (t.y - g.y) / g.z;
        local[(2, 2)] = dz;
        Self::from_matrix(plane.to_matrix() * local * plane.to_local_matrix())
    }

    /// Shear tilting the plane's z axis by `angle_x` toward x and `angle_y`
    /// toward y.
    pub fn shear_angle(plane: &Plane, angle_x: f64, angle_y: f64) -> Self {
        let mut local = Mat4::identity();
        local[(0, 2)] = angle_x.tan();
        local[(1, 2)] = angle_y.tan();
        if !local.iter().all(|v| v.is_finite()) {
            tracing::debug!(angle_x, angle_y, "shear angle out of range, using identity");
            return Self::identity();
        }
        Self::from_matrix(plane.to_matrix() * local * plane.to_local_matrix())
    }

    /// Affine map sending each source point onto its target.
    ///
    /// Takes three or four pairs; three are lifted off their triangle
    /// along its normal. A degenerate (coplanar or collinear) source gives
    /// the identity.
    pub fn map_points(source: &[Point3], target: &[Point3]) -> Result<Self, TransformError> {
        let arity = TransformError::CorrespondenceArity {
            source_len: source.len(),
            target_len: target.len(),
        };
        if source.len() != target.len() {
            return Err(arity);
        }
        match (source, target) {
            ([a, b, c, d], [e, f, g, h]) => Ok(Self::correspondence(&[*a, *b, *c, *d], &[*e, *f, *g, *h])),
            ([a, b, c], [e, f, g]) => Ok(Self::triangle_mapping(&[*a, *b, *c], &[*e, *f, *g])),
            _ => Err(arity),
        }
    }

    fn correspondence(source: &[Point3; 4], target: &[Point3; 4]) -> Self {
        let column = |p: &Point3| Vector4::new(p.x, p.y, p.z, 1.0);
        let p = Mat4::from_columns(&source.map(|s| column(&s)));
        let q = Mat4::from_columns(&target.map(|t| column(&t)));
        match p.try_inverse() {
            Some(inv) if (q * inv).iter().all(|v| v.is_finite()) => Self::from_matrix(q * inv),
            _ => {
                tracing::debug!("degenerate point correspondence, using identity");
                Self::identity()
            }
        }
    }

    /// Map one triangle onto another.
    pub fn triangle_mapping(source: &[Point3; 3], target: &[Point3; 3]) -> Self {
        match (lift_triangle(source), lift_triangle(target)) {
            (Some(s), Some(t)) => Self::correspondence(
                &[source[0], source[1], source[2], s],
                &[target[0], target[1], target[2], t],
            ),
            _ => {
                tracing::debug!("degenerate triangle mapping, using identity");
                Self::identity()
            }
        }
    }

    /// Map one rectangle onto another, corner to corner.
    pub fn rectangle_mapping(source: &Rectangle, target: &Rectangle) -> Self {
        let [s0, s1, _, s3] = source.corners();
        let [t0, t1, _, t3] = target.corners();
        Self::triangle_mapping(&[s0, s1, s3], &[t0, t1, t3])
    }

    /// Map one box onto another, corner to corner.
    pub fn box_mapping(source: &OrientedBox, target: &OrientedBox) -> Self {
        let s = source.corners();
        let t = target.corners();
        Self::correspondence(&[s[0], s[1], s[3], s[4]], &[t[0], t[1], t[3], t[4]])
    }

    /// Orthogonal projection onto `plane`.
    pub fn project(plane: &Plane) -> Self {
        let n = plane.normal();
        let linear = Mat3::identity() - n * n.transpose();
        let translation = n * n.dot(&plane.origin.coords);
        Self::from_matrix(linear_to_mat4(&linear, &translation))
    }

    /// Parallel projection onto `plane` along `direction`.
    ///
    /// Every point moves along the same direction, so the result stays
    /// affine and composes with the other builders. See
    /// [`Transform::project_from_point`] for the central variant. A
    /// direction parallel to the plane gives the identity.
    pub fn project_along(plane: &Plane, direction: &Vec3) -> Self {
        let n = plane.normal();
        let denom = n.dot(direction);
        if denom.abs() < 1e-12 {
            tracing::debug!("projection direction parallel to plane, using identity");
            return Self::identity();
        }
        let linear = Mat3::identity() - direction * n.transpose() / denom;
        let translation = direction * (n.dot(&plane.origin.coords) / denom);
        Self::from_matrix(linear_to_mat4(&linear, &translation))
    }

    /// Perspective projection onto `plane` through the centre `eye`.
    ///
    /// Each point slides along its ray from `eye` until it meets the plane.
    /// The matrix is projective (its last row is not `[0 0 0 1]`) and has
    /// no inverse. An eye on the plane gives the identity.
    pub fn project_from_point(plane: &Plane, eye: &Point3) -> Self {
        let n = plane.normal();
        let e = eye.coords;
        let depth = n.dot(&(plane.origin.coords - e));
        if depth.abs() < 1e-12 {
            tracing::debug!("projection centre lies on the plane, using identity");
            return Self::identity();
        }
        let linear = e * n.transpose() + Mat3::identity() * depth;
        let translation = -e * n.dot(&plane.origin.coords);
        let mut m = linear_to_mat4(&linear, &translation);
        m[(3, 0)] = n.x;
        m[(3, 1)] = n.y;
        m[(3, 2)] = n.z;
        m[(3, 3)] = -n.dot(&e);
        Self::from_matrix(m)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_point_eq(a: Point3, b: Point3, eps: f64) {
        assert!((a - b).norm() < eps, "{a:?} != {b:?}");
    }

    #[test]
    fn test_compose_applies_in_order() {
        let t = Transform::compose(&[
            Transform::translation(&Vec3::new(1.0, 0.0, 0.0)),
            Transform::rotation_about_axis(&Vec3::z_axis(), FRAC_PI_2),
        ]);
        assert_eq!(t.fragments().len(), 2);
        assert_point_eq(t.apply_point(&Point3::origin()), Point3::new(0.0, 1.0, 0.0), 1e-12);
        assert!(Transform::compose(&[]).is_identity(0.0));
    }

    #[test]
    fn test_inverse_of_near_singular_composite() {
        let t = Transform::compose(&[
            Transform::scale_about(&Point3::new(3.0, -2.0, 1.0), 1e-7),
            Transform::translation(&Vec3::new(5.0, 6.0, 7.0)),
            Transform::rotation_axis(0.7, &Line::new(Point3::origin(), Point3::new(1.0, 1.0, 0.0))),
            Transform::scale_non_uniform(&Plane::world_xy(), 1e6, 1.0, 1e-5),
        ]);
        let inv = t.inverse().unwrap();
        assert_eq!(inv.fragments().len(), 4);
        for p in [Point3::new(1.0, 2.0, 3.0), Point3::new(-4.0, 0.5, 9.0)] {
            let back = inv.apply_point(&t.apply_point(&p));
            assert_point_eq(back, p, 1e-6);
        }
    }

    #[test]
    fn test_inverse_singular_fragment() {
        let flat = Transform::scale_non_uniform(&Plane::world_xy(), 1.0, 1.0, 0.0);
        assert!(flat.inverse().is_none());
        assert!(Transform::identity().inverse().unwrap().is_identity(0.0));
    }

    #[test]
    fn test_rotation_axis_offset() {
        let axis = Line::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 1.0));
        let t = Transform::rotation_axis(PI, &axis);
        assert_point_eq(t.apply_point(&Point3::origin()), Point3::new(2.0, 0.0, 0.0), 1e-12);
        let degenerate = Line::new(Point3::origin(), Point3::origin());
        assert!(Transform::rotation_axis(1.0, &degenerate).is_identity(0.0));
    }

    #[test]
    fn test_rotation_directions() {
        let c = Point3::new(1.0, 1.0, 1.0);
        let t = Transform::rotation_directions(&Vec3::x(), &Vec3::y(), &c);
        assert_abs_diff_eq!((t.apply_vector(&Vec3::x()) - Vec3::y()).norm(), 0.0, epsilon = 1e-12);
        assert_point_eq(t.apply_point(&c), c, 1e-12);

        let flip = Transform::rotation_directions(&Vec3::z(), &-Vec3::z(), &Point3::origin());
        assert_abs_diff_eq!((flip.apply_vector(&Vec3::z()) + Vec3::z()).norm(), 0.0, epsilon = 1e-12);
        assert!(flip.is_similarity(1e-9));
    }

    #[test]
    fn test_mirror_is_involution() {
        let plane = Plane::from_origin_normal(Point3::new(0.0, 0.0, 2.0), Vec3::z());
        let m = Transform::mirror(&plane);
        assert_point_eq(m.apply_point(&Point3::new(1.0, 1.0, 5.0)), Point3::new(1.0, 1.0, -1.0), 1e-12);
        assert!(m.then(&m).is_identity(1e-12));
        assert!(m.is_similarity(1e-12));
    }

    #[test]
    fn test_orient_and_basis() {
        let source = Plane::world_xy();
        let target = Plane::from_origin_axes(Point3::new(1.0, 2.0, 3.0), Vec3::y(), Vec3::z());
        let t = Transform::orient(&source, &target);
        assert_point_eq(t.apply_point(&Point3::new(1.0, 0.0, 0.0)), Point3::new(1.0, 3.0, 3.0), 1e-12);
        let there = Transform::from_plane_basis(&target).then(&Transform::to_plane_basis(&target));
        assert!(there.is_identity(1e-12));
    }

    #[test]
    fn test_scale_and_shear() {
        let plane = Plane::world_xy_at(Point3::new(0.0, 0.0, 1.0));
        let s = Transform::scale_non_uniform(&plane, 2.0, 3.0, 4.0);
        assert_point_eq(s.apply_point(&Point3::new(1.0, 1.0, 2.0)), Point3::new(2.0, 3.0, 5.0), 1e-12);
        assert!(!s.is_similarity(1e-9));
        assert!(Transform::scale_about(&Point3::origin(), 2.0).is_similarity(1e-12));

        let sh = Transform::shear(&Plane::world_xy(), &Point3::new(0.0, 0.0, 2.0), &Point3::new(1.0, 0.0, 2.0));
        assert_point_eq(sh.apply_point(&Point3::new(0.0, 0.0, 4.0)), Point3::new(2.0, 0.0, 4.0), 1e-12);
        let sa = Transform::shear_angle(&Plane::world_xy(), PI / 4.0, 0.0);
        assert_point_eq(sa.apply_point(&Point3::new(0.0, 0.0, 1.0)), Point3::new(1.0, 0.0, 1.0), 1e-12);
    }

    #[test]
    fn test_map_points() {
        let src = [
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let dst = src.map(|p| Point3::new(2.0 * p.x + 1.0, p.y - p.z, 3.0 * p.z));
        let t = Transform::map_points(&src, &dst).unwrap();
        let q = Point3::new(0.3, -0.7, 2.0);
        assert_point_eq(t.apply_point(&q), Point3::new(1.6, -2.7, 6.0), 1e-12);

        let flat = [src[0], src[1], src[2], Point3::new(1.0, 1.0, 0.0)];
        assert!(Transform::map_points(&flat, &dst).unwrap().is_identity(0.0));
        assert_eq!(
            Transform::map_points(&src[..2], &dst[..2]),
            Err(TransformError::CorrespondenceArity { source_len: 2, target_len: 2 })
        );
        assert!(Transform::map_points(&src, &dst[..3]).is_err());
    }

    #[test]
    fn test_rectangle_triangle_box_mapping() {
        let a = Rectangle::new(Plane::world_xy(), Domain::new(0.0, 1.0), Domain::new(0.0, 1.0));
        let b = Rectangle::new(Plane::world_xz(), Domain::new(2.0, 4.0), Domain::new(0.0, 2.0));
        let t = Transform::rectangle_mapping(&a, &b);
        for (s, d) in a.corners().iter().zip(b.corners()) {
            assert_point_eq(t.apply_point(s), d, 1e-9);
        }

        let tri = [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        let moved = tri.map(|p| p + Vec3::new(0.0, 0.0, 5.0));
        let t = Transform::triangle_mapping(&tri, &moved);
        assert_point_eq(t.apply_point(&Point3::new(0.5, 0.5, 1.0)), Point3::new(0.5, 0.5, 6.0), 1e-9);

        let ob = OrientedBox::from_corners(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let big = OrientedBox::from_corners(Point3::new(-1.0, -1.0, -1.0), Point3::new(3.0, 1.0, 2.0));
        let t = Transform::box_mapping(&ob, &big);
        for (s, d) in ob.corners().iter().zip(big.corners()) {
            assert_point_eq(t.apply_point(s), d, 1e-9);
        }
    }

    #[test]
    fn test_projections() {
        let plane = Plane::world_xy_at(Point3::new(0.0, 0.0, 1.0));
        let p = Point3::new(2.0, 3.0, 7.0);
        assert_point_eq(Transform::project(&plane).apply_point(&p), Point3::new(2.0, 3.0, 1.0), 1e-12);
        let along = Transform::project_along(&plane, &Vec3::new(1.0, 0.0, 1.0));
        assert_point_eq(along.apply_point(&p), Point3::new(-4.0, 3.0, 1.0), 1e-12);
        assert!(Transform::project_along(&plane, &Vec3::x()).is_identity(0.0));
    }

    #[test]
    fn test_perspective_projection() {
        let plane = Plane::world_xy_at(Point3::new(0.0, 0.0, 1.0));
        let eye = Point3::new(0.0, 0.0, 3.0);
        let t = Transform::project_from_point(&plane, &eye);
        let cases = [
            (Point3::new(1.0, 1.0, 0.0), Point3::new(2.0 / 3.0, 2.0 / 3.0, 1.0)),
            (Point3::new(2.0, 0.0, 5.0), Point3::new(-2.0, 0.0, 1.0)),
            (Point3::new(3.0, -1.0, 1.0), Point3::new(3.0, -1.0, 1.0)),
        ];
        for (p, expected) in cases {
            assert_point_eq(t.apply_point(&p), expected, 1e-12);
        }
        assert!(t.inverse().is_none());
        assert!(Transform::project_from_point(&plane, &Point3::new(4.0, 2.0, 1.0)).is_identity(0.0));
    }
}
