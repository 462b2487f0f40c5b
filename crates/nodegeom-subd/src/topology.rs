//! SubD topology: vertices, shared edges and faces with incidence lists.

use std::collections::HashMap;

use nodegeom_box::Aabb3;
use nodegeom_frame::Metadata;
use nodegeom_math::{centroid, Point3, MERGE_TOLERANCE};
use nodegeom_surface::Mesh;
use serde::{Deserialize, Serialize};

use crate::tags::{EdgeTag, VertexTag};
use crate::SubdError;

/// A control vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubdVertex {
    /// Index into [`SubD::vertices`].
    pub id: usize,
    /// Position.
    pub point: Point3,
    /// Sharpness tag.
    pub tag: VertexTag,
}

/// An edge shared by every face that uses its vertex pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubdEdge {
    /// Index into [`SubD::edges`].
    pub id: usize,
    /// Endpoint vertex ids, in the order first seen.
    pub vertices: [usize; 2],
    /// Incident face ids.
    pub faces: Vec<usize>,
    /// Sharpness tag.
    pub tag: EdgeTag,
}

/// A polygonal face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubdFace {
    /// Index into [`SubD::faces`].
    pub id: usize,
    /// Vertex ids in loop order.
    pub vertices: Vec<usize>,
    /// Edge ids; `edges[k]` joins `vertices[k]` and `vertices[k + 1]`.
    pub edges: Vec<usize>,
    /// Average of the face's vertex positions.
    pub centroid: Point3,
}

/// Classification of an edge by incident face count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// No incident faces.
    Naked,
    /// One incident face.
    Boundary,
    /// Two incident faces.
    Interior,
    /// Three or more incident faces.
    NonManifold,
}

/// A tagged polygon control cage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubD {
    /// Vertices; `vertices[i].id == i`.
    pub vertices: Vec<SubdVertex>,
    /// Edges; `edges[i].id == i`.
    pub edges: Vec<SubdEdge>,
    /// Faces; `faces[i].id == i`.
    pub faces: Vec<SubdFace>,
    /// Free-form metadata.
    pub metadata: Metadata,
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Merges points closer than a tolerance using a uniform hash grid.
struct VertexWelder {
    tolerance: f64,
    cells: HashMap<(i64, i64, i64), Vec<usize>>,
    points: Vec<Point3>,
}

impl VertexWelder {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.abs().max(1e-15),
            cells: HashMap::new(),
            points: Vec::new(),
        }
    }

    fn cell(&self, p: &Point3) -> (i64, i64, i64) {
        let s = self.tolerance;
        (
            (p.x / s).floor() as i64,
            (p.y / s).floor() as i64,
            (p.z / s).floor() as i64,
        )
    }

    /// Id of an already inserted point within tolerance of `p`.
    fn find(&self, p: &Point3) -> Option<usize> {
        let (cx, cy, cz) = self.cell(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(ids) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) {
                        if let Some(&id) = ids
                            .iter()
                            .find(|&&id| (self.points[id] - p).norm() <= self.tolerance)
                        {
                            return Some(id);
                        }
                    }
                }
            }
        }
        None
    }

    fn insert(&mut self, p: Point3) -> usize {
        match self.find(&p) {
            Some(id) => id,
            None => self.push(p),
        }
    }

    fn push(&mut self, p: Point3) -> usize {
        let cell = self.cell(&p);
        let id = self.points.len();
        self.points.push(p);
        self.cells.entry(cell).or_default().push(id);
        id
    }
}

impl SubD {
    /// Build from polygon rings, merging vertices within `tolerance`.
    ///
    /// Rings that collapse to fewer than three distinct vertices are
    /// dropped. Errors only when `polygons` is empty.
    pub fn from_polygons(polygons: &[Vec<Point3>], tolerance: f64) -> Result<SubD, SubdError> {
        if polygons.is_empty() {
            return Err(SubdError::EmptyInput);
        }
        Ok(Self::weld(polygons, tolerance))
    }

    /// Welding builder shared by generators and booleans; accepts no input.
    pub(crate) fn weld(polygons: &[Vec<Point3>], tolerance: f64) -> SubD {
        let mut welder = VertexWelder::new(tolerance);
        let faces: Vec<Vec<usize>> = polygons
            .iter()
            .map(|ring| ring.iter().map(|p| welder.insert(*p)).collect())
            .collect();
        Self::build(welder.points, faces)
    }

    /// Build from shared vertices and index loops.
    ///
    /// Points closer than [`MERGE_TOLERANCE`] are merged and the loops
    /// remapped, so duplicated seam vertices still share edges.
    pub fn from_faces(points: Vec<Point3>, faces: Vec<Vec<usize>>) -> Result<SubD, SubdError> {
        for (face, loop_) in faces.iter().enumerate() {
            if let Some(&vertex) = loop_.iter().find(|&&v| v >= points.len()) {
                return Err(SubdError::MissingVertex { face, vertex });
            }
        }
        let mut welder = VertexWelder::new(MERGE_TOLERANCE);
        let remap: Vec<usize> = points.iter().map(|p| welder.insert(*p)).collect();
        let faces: Vec<Vec<usize>> = faces
            .into_iter()
            .map(|loop_| loop_.into_iter().map(|v| remap[v]).collect())
            .collect();
        Ok(Self::build(welder.points, faces))
    }

    /// Control cage from a polygon mesh.
    pub fn from_mesh(mesh: &Mesh) -> Result<SubD, SubdError> {
        Self::from_faces(mesh.vertices.clone(), mesh.faces.clone())
    }

    /// Copy tags from `sources` onto this cage.
    ///
    /// Vertices match by position within `tolerance`; edges match when both
    /// endpoints do. Sources earlier in the list win on conflicts.
    pub(crate) fn inherit_tags(&mut self, sources: &[&SubD], tolerance: f64) {
        let mut welder = VertexWelder::new(tolerance);
        for v in &self.vertices {
            welder.push(v.point);
        }
        let lookup: HashMap<(usize, usize), usize> = self
            .edges
            .iter()
            .map(|e| (edge_key(e.vertices[0], e.vertices[1]), e.id))
            .collect();

        let mut vertex_set = vec![false; self.vertices.len()];
        let mut edge_set = vec![false; self.edges.len()];
        for source in sources {
            let remap: Vec<Option<usize>> =
                source.vertices.iter().map(|v| welder.find(&v.point)).collect();
            for v in source.vertices.iter().filter(|v| v.tag != VertexTag::Smooth) {
                if let Some(id) = remap[v.id].filter(|&id| !vertex_set[id]) {
                    self.vertices[id].tag = v.tag;
                    vertex_set[id] = true;
                }
            }
            for e in source.edges.iter().filter(|e| e.tag != EdgeTag::Smooth) {
                let (Some(a), Some(b)) = (remap[e.vertices[0]], remap[e.vertices[1]]) else {
                    continue;
                };
                if let Some(&id) = lookup.get(&edge_key(a, b)) {
                    if !edge_set[id] {
                        self.edges[id].tag = e.tag;
                        edge_set[id] = true;
                    }
                }
            }
        }
    }

    /// Assemble topology from validated index loops.
    pub(crate) fn build(points: Vec<Point3>, faces: Vec<Vec<usize>>) -> SubD {
        let vertices: Vec<SubdVertex> = points
            .into_iter()
            .enumerate()
            .map(|(id, point)| SubdVertex {
                id,
                point,
                tag: VertexTag::Smooth,
            })
            .collect();

        let mut edges: Vec<SubdEdge> = Vec::new();
        let mut lookup: HashMap<(usize, usize), usize> = HashMap::new();
        let mut out_faces: Vec<SubdFace> = Vec::with_capacity(faces.len());

        for mut loop_ in faces {
            // Drop repeated consecutive vertices (including the wrap-around).
            loop_.dedup();
            while loop_.len() > 1 && loop_.first() == loop_.last() {
                loop_.pop();
            }
            if loop_.len() < 3 {
                continue;
            }

            let face_id = out_faces.len();
            let n = loop_.len();
            let mut face_edges = Vec::with_capacity(n);
            for k in 0..n {
                let (a, b) = (loop_[k], loop_[(k + 1) % n]);
                let id = *lookup.entry(edge_key(a, b)).or_insert_with(|| {
                    edges.push(SubdEdge {
                        id: edges.len(),
                        vertices: [a, b],
                        faces: Vec::new(),
                        tag: EdgeTag::Smooth,
                    });
                    edges.len() - 1
                });
                if !edges[id].faces.contains(&face_id) {
                    edges[id].faces.push(face_id);
                }
                face_edges.push(id);
            }

            let corner_points: Vec<Point3> = loop_.iter().map(|&v| vertices[v].point).collect();
            out_faces.push(SubdFace {
                id: face_id,
                centroid: centroid(&corner_points).unwrap_or_else(Point3::origin),
                vertices: loop_,
                edges: face_edges,
            });
        }

        SubD {
            vertices,
            edges,
            faces: out_faces,
            metadata: Metadata::new(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Classification of edge `id`.
    pub fn edge_kind(&self, id: usize) -> EdgeKind {
        match self.edges[id].faces.len() {
            0 => EdgeKind::Naked,
            1 => EdgeKind::Boundary,
            2 => EdgeKind::Interior,
            _ => EdgeKind::NonManifold,
        }
    }

    /// Ids of edges with fewer than two incident faces (the open border).
    pub fn naked_edges(&self) -> Vec<usize> {
        self.edges
            .iter()
            .filter(|e| e.faces.len() < 2)
            .map(|e| e.id)
            .collect()
    }

    /// True when every edge has exactly two incident faces.
    pub fn is_closed(&self) -> bool {
        !self.edges.is_empty() && self.edges.iter().all(|e| e.faces.len() == 2)
    }

    /// Incident edge ids per vertex.
    pub fn vertex_edges(&self) -> Vec<Vec<usize>> {
        let mut map = vec![Vec::new(); self.vertices.len()];
        for e in &self.edges {
            map[e.vertices[0]].push(e.id);
            map[e.vertices[1]].push(e.id);
        }
        map
    }

    /// Incident face ids per vertex.
    pub fn vertex_faces(&self) -> Vec<Vec<usize>> {
        let mut map = vec![Vec::new(); self.vertices.len()];
        for f in &self.faces {
            for &v in &f.vertices {
                map[v].push(f.id);
            }
        }
        map
    }

    /// Vertices joined to `id` by an edge.
    pub fn vertex_neighbors(&self, id: usize) -> Vec<usize> {
        self.edges
            .iter()
            .filter_map(|e| match e.vertices {
                [a, b] if a == id => Some(b),
                [a, b] if b == id => Some(a),
                _ => None,
            })
            .collect()
    }

    /// The vertex at the other end of edge `edge` from `vertex`.
    pub fn other_vertex(&self, edge: usize, vertex: usize) -> usize {
        let [a, b] = self.edges[edge].vertices;
        if a == vertex {
            b
        } else {
            a
        }
    }

    /// True for an edge that stays sharp: tagged crease, or on the border.
    pub fn is_sharp_edge(&self, id: usize) -> bool {
        let e = &self.edges[id];
        e.tag == EdgeTag::Crease || e.faces.len() <= 1
    }

    /// True when any incident edge is sharp.
    pub fn is_boundary_vertex(&self, id: usize) -> bool {
        self.edges
            .iter()
            .any(|e| (e.vertices[0] == id || e.vertices[1] == id) && self.is_sharp_edge(e.id))
    }

    /// Edge id joining two vertices, if any.
    pub fn edge_between(&self, a: usize, b: usize) -> Option<usize> {
        self.edges
            .iter()
            .find(|e| edge_key(e.vertices[0], e.vertices[1]) == edge_key(a, b))
            .map(|e| e.id)
    }

    /// World bounds of the vertices.
    pub fn bounds(&self) -> Option<Aabb3> {
        Aabb3::from_points(self.vertices.iter().map(|v| &v.point))
    }

    /// Vertex positions.
    pub fn points(&self) -> Vec<Point3> {
        self.vertices.iter().map(|v| v.point).collect()
    }

    /// Face rings as point lists.
    pub fn polygons(&self) -> Vec<Vec<Point3>> {
        self.faces
            .iter()
            .map(|f| f.vertices.iter().map(|&v| self.vertices[v].point).collect())
            .collect()
    }

    // =========================================================================
    // Editing (each returns a new value)
    // =========================================================================

    /// The same SubD with vertex `id` re-tagged. Unknown ids are ignored.
    pub fn with_vertex_tag(&self, id: usize, tag: VertexTag) -> SubD {
        let mut out = self.clone();
        if let Some(v) = out.vertices.get_mut(id) {
            v.tag = tag;
        }
        out
    }

    /// The same SubD with edge `id` re-tagged. Unknown ids are ignored.
    pub fn with_edge_tag(&self, id: usize, tag: EdgeTag) -> SubD {
        let mut out = self.clone();
        if let Some(e) = out.edges.get_mut(id) {
            e.tag = tag;
        }
        out
    }

    /// The same topology with every vertex passed through `f`; face
    /// centroids are recomputed.
    pub fn map_points(&self, f: impl Fn(&Point3) -> Point3) -> SubD {
        let mut out = self.clone();
        for v in &mut out.vertices {
            v.point = f(&v.point);
        }
        out.refresh_centroids();
        out
    }

    pub(crate) fn refresh_centroids(&mut self) {
        for face in &mut self.faces {
            let pts: Vec<Point3> = face
                .vertices
                .iter()
                .map(|&v| self.vertices[v].point)
                .collect();
            face.centroid = centroid(&pts).unwrap_or(face.centroid);
        }
    }

    /// The control cage as a polygon mesh.
    pub fn to_mesh(&self) -> Mesh {
        Mesh::new(
            self.points(),
            self.faces.iter().map(|f| f.vertices.clone()).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64) -> Vec<Point3> {
        vec![
            Point3::new(x0, y0, 0.0),
            Point3::new(x0 + 1.0, y0, 0.0),
            Point3::new(x0 + 1.0, y0 + 1.0, 0.0),
            Point3::new(x0, y0 + 1.0, 0.0),
        ]
    }

    #[test]
    fn test_shared_edges_are_merged() {
        let s = SubD::from_polygons(&[square(0.0, 0.0), square(1.0, 0.0)], 1e-6).unwrap();
        assert_eq!(s.vertices.len(), 6);
        assert_eq!(s.edges.len(), 7);
        assert_eq!(s.faces.len(), 2);
        let shared = s.edges.iter().filter(|e| e.faces.len() == 2).count();
        assert_eq!(shared, 1);
        assert_eq!(s.naked_edges().len(), 6);
        assert!(!s.is_closed());
    }

    #[test]
    fn test_near_coincident_vertices_weld() {
        let mut b = square(1.0, 0.0);
        b[0].x += 4e-7;
        let s = SubD::from_polygons(&[square(0.0, 0.0), b], 1e-6).unwrap();
        assert_eq!(s.vertices.len(), 6);
    }

    #[test]
    fn test_degenerate_rings_dropped() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let s = SubD::from_polygons(&[vec![p, p, p], square(0.0, 0.0)], 1e-6).unwrap();
        assert_eq!(s.faces.len(), 1);
        assert!(SubD::from_polygons(&[], 1e-6).is_err());
    }

    #[test]
    fn test_edge_kinds() {
        // Three quads sharing one edge: non-manifold.
        let fin = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
        ];
        let s = SubD::from_polygons(&[square(0.0, 0.0), square(1.0, 0.0), fin], 1e-6).unwrap();
        let shared = s.edge_between(1, 2).unwrap();
        assert_eq!(s.edge_kind(shared), EdgeKind::NonManifold);
        assert_eq!(s.edge_kind(0), EdgeKind::Boundary);

        let loose = SubD {
            edges: vec![SubdEdge {
                id: 0,
                vertices: [0, 1],
                faces: vec![],
                tag: EdgeTag::Smooth,
            }],
            ..SubD::default()
        };
        assert_eq!(loose.edge_kind(0), EdgeKind::Naked);
    }

    #[test]
    fn test_from_faces_merges_duplicated_points() {
        // Two triangles sharing the diagonal through duplicated points.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let s = SubD::from_faces(points, vec![vec![0, 1, 2], vec![3, 4, 5]]).unwrap();
        assert_eq!(s.vertices.len(), 4);
        assert_eq!(s.edges.len(), 5);
        let interior: Vec<_> = s
            .edges
            .iter()
            .filter(|e| s.edge_kind(e.id) == EdgeKind::Interior)
            .collect();
        assert_eq!(interior.len(), 1);
    }

    #[test]
    fn test_missing_vertex() {
        let err = SubD::from_faces(vec![Point3::origin(); 3], vec![vec![0, 1, 5]]).unwrap_err();
        assert_eq!(err, SubdError::MissingVertex { face: 0, vertex: 5 });
    }

    #[test]
    fn test_tags_and_neighbors() {
        let s = SubD::from_polygons(&[square(0.0, 0.0)], 1e-6).unwrap();
        let mut n = s.vertex_neighbors(0);
        n.sort_unstable();
        assert_eq!(n, vec![1, 3]);
        assert!(s.is_boundary_vertex(0));

        let tagged = s.with_vertex_tag(2, VertexTag::Corner).with_edge_tag(0, EdgeTag::Crease);
        assert_eq!(tagged.vertices[2].tag, VertexTag::Corner);
        assert_eq!(tagged.edges[0].tag, EdgeTag::Crease);
        assert_eq!(s.vertices[2].tag, VertexTag::Smooth);
    }

    #[test]
    fn test_mesh_round_trip_and_bounds() {
        let s = SubD::from_polygons(&[square(0.0, 0.0), square(0.0, 1.0)], 1e-6).unwrap();
        let m = s.to_mesh();
        assert_eq!(m.num_faces(), 2);
        let back = SubD::from_mesh(&m).unwrap();
        assert_eq!(back.edges.len(), s.edges.len());
        let b = s.bounds().unwrap();
        assert_eq!(b.max, Point3::new(1.0, 2.0, 0.0));
    }
}
