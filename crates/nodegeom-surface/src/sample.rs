//! Regular sampling, triangulation and area integration of surfaces.

use nodegeom_math::{Point3, Vec3, MAX_SAMPLE_POINTS};

use crate::analysis::{surface_frame, DifferentialOptions};
use crate::mesh::Mesh;
use crate::surface::Surface;

/// A regular `(nu + 1) × (nv + 1)` lattice of surface samples.
///
/// `points[i * (nu + 1) + j]` is the sample at `(us[j], vs[i])`: rows run
/// along v, columns along u.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    /// Segments in u.
    pub nu: usize,
    /// Segments in v.
    pub nv: usize,
    /// u parameters, `nu + 1` values.
    pub us: Vec<f64>,
    /// v parameters, `nv + 1` values.
    pub vs: Vec<f64>,
    /// Row-major samples.
    pub points: Vec<Point3>,
}

impl SurfaceGrid {
    /// Sample at lattice position `(i, j)`: row `i` along v, column `j` along u.
    pub fn at(&self, i: usize, j: usize) -> Point3 {
        self.points[i * (self.nu + 1) + j]
    }

    /// Lattice rows (one `Vec` per v parameter).
    pub fn rows(&self) -> Vec<Vec<Point3>> {
        self.points.chunks(self.nu + 1).map(|r| r.to_vec()).collect()
    }
}

/// Clamp segment counts so the lattice stays under the sampling cap.
fn capped_counts(nu: usize, nv: usize) -> (usize, usize) {
    let (mut nu, mut nv) = (nu.max(1), nv.max(1));
    while (nu + 1) * (nv + 1) > MAX_SAMPLE_POINTS && (nu > 1 || nv > 1) {
        if nu >= nv {
            nu = (nu / 2).max(1);
        } else {
            nv = (nv / 2).max(1);
        }
    }
    (nu, nv)
}

/// Evaluate a regular lattice over the surface's domains.
///
/// Segment counts below 1 are raised to 1; lattices larger than
/// [`MAX_SAMPLE_POINTS`] are coarsened.
pub fn sample_surface_grid(surface: &Surface, nu: usize, nv: usize) -> SurfaceGrid {
    let (cu, cv) = capped_counts(nu, nv);
    if (cu, cv) != (nu.max(1), nv.max(1)) {
        tracing::debug!(nu, nv, cu, cv, "surface grid coarsened to sampling cap");
    }
    let us = surface.domain_u.samples(cu);
    let vs = surface.domain_v.samples(cv);
    let points = vs
        .iter()
        .flat_map(|&v| us.iter().map(move |&u| (u, v)))
        .map(|(u, v)| surface.evaluate(u, v))
        .collect();
    SurfaceGrid {
        nu: cu,
        nv: cv,
        us,
        vs,
        points,
    }
}

/// Triangulate the sample lattice.
///
/// Each quad `(i, j)` splits along its `(i, j)`–`(i + 1, j + 1)` diagonal
/// into `[a, b, c]` and `[a, c, d]`.
pub fn triangulate_surface_grid(surface: &Surface, nu: usize, nv: usize) -> Mesh {
    let grid = sample_surface_grid(surface, nu, nv);
    let stride = grid.nu + 1;
    let mut faces = Vec::with_capacity(2 * grid.nu * grid.nv);
    for i in 0..grid.nv {
        for j in 0..grid.nu {
            let a = i * stride + j;
            let b = a + 1;
            let c = a + stride + 1;
            let d = a + stride;
            faces.push(vec![a, b, c]);
            faces.push(vec![a, c, d]);
        }
    }
    Mesh::new(grid.points, faces)
}

/// Area and area-weighted centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaProperties {
    /// Total area.
    pub area: f64,
    /// Area centroid; `None` when the area is zero.
    pub centroid: Option<Point3>,
}

/// Approximate area and centroid from the triangulated lattice.
///
/// Zero-area triangles contribute nothing.
pub fn surface_area(surface: &Surface, nu: usize, nv: usize) -> AreaProperties {
    let mesh = triangulate_surface_grid(surface, nu, nv);
    let mut area = 0.0;
    let mut moment = Vec3::zeros();
    for f in &mesh.faces {
        let (a, b, c) = (mesh.vertices[f[0]], mesh.vertices[f[1]], mesh.vertices[f[2]]);
        let t = 0.5 * (b - a).cross(&(c - a)).norm();
        if t <= 1e-15 {
            continue;
        }
        area += t;
        moment += (a.coords + b.coords + c.coords) * (t / 3.0);
    }
    AreaProperties {
        area,
        centroid: (area > 0.0).then(|| Point3::from(moment / area)),
    }
}

/// Points, normals and parameters from [`divide_surface`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfacePoints {
    /// Sample positions, row-major as in [`SurfaceGrid`].
    pub points: Vec<Point3>,
    /// Unit normals at the samples.
    pub normals: Vec<Vec3>,
    /// `(u, v)` parameters of the samples.
    pub parameters: Vec<(f64, f64)>,
}

/// Divide a surface into a regular lattice of points with normals.
pub fn divide_surface(surface: &Surface, nu: usize, nv: usize) -> SurfacePoints {
    let grid = sample_surface_grid(surface, nu, nv);
    let options = DifferentialOptions::default();
    let mut out = SurfacePoints::default();
    for &v in &grid.vs {
        for &u in &grid.us {
            let frame = surface_frame(surface, u, v, &options);
            out.points.push(frame.point);
            out.normals.push(frame.normal);
            out.parameters.push((u, v));
        }
    }
    out
}
