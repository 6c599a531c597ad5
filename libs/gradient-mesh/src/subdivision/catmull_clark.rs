//! # Catmull-Clark Refinement
//!
//! Uniform quad refinement carrying positions and half-edge colors.
//!
//! ## Index layout
//!
//! With `V` parent vertices, `H` parent half-edges, `F` parent faces and `S`
//! face half-edges:
//!
//! ```text
//! vertices:    vertex point  v                (0..V)
//!              edge point    V + k            (k-th undirected edge)
//!              face point    V + H/2 + f
//! half-edges:  4h + k, k in 0..4              (face half-edge h)
//!              2S + 2h + k, k in 0..2         (boundary half-edge h)
//! faces:       h                              (the quad at the origin of h)
//! ```
//!
//! ```text
//! *-----*-----*
//! |    2|3    |
//! |  0  |  1  |
//! *-----*-----*
//!  -----h---->
//! ```
//!
//! Parent vertex indices survive, and child face `h` sits at the origin
//! corner of parent half-edge `h`. The propagation code relies on both.
//!
//! Every child value is produced by one of the point rules below, so a
//! partial refresh through [`refresh_positions`] and [`refresh_colors`]
//! gives bit-identical results to a full [`catmull_clark`].

use glam::{DVec2, DVec3};

use crate::mesh::{Face, FaceId, HalfEdge, HalfEdgeId, Mesh, Vertex, VertexId};

// =============================================================================
// LAYOUT
// =============================================================================

/// What a child vertex was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSource {
    /// Vertex point of a parent vertex.
    Vertex(VertexId),
    /// Edge point of a parent edge, identified by its lower face half-edge.
    Edge(HalfEdgeId),
    /// Face point of a parent face.
    Face(FaceId),
}

/// Index correspondence between a parent mesh and its refinement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatmullClarkLayout {
    vertex_count: u32,
    edge_count: u32,
    face_half_edges: u32,
    /// Child vertex of the edge point, per parent half-edge.
    edge_vertex: Vec<VertexId>,
    /// Lower face half-edge, per undirected edge.
    edge_owner: Vec<HalfEdgeId>,
}

impl CatmullClarkLayout {
    /// Numbers the undirected edges of `parent` in ascending order of their
    /// lower face half-edge.
    pub fn new(parent: &Mesh) -> Self {
        let vertex_count = parent.vertex_count() as u32;
        let face_half_edges = parent.face_half_edge_count() as u32;
        let mut edge_vertex = vec![0; parent.half_edge_count()];
        let mut edge_owner = Vec::with_capacity(parent.half_edge_count() / 2);

        for h in 0..face_half_edges {
            let twin = parent.twin(h);
            if h > twin {
                continue;
            }
            let idx = vertex_count + edge_owner.len() as u32;
            edge_vertex[h as usize] = idx;
            edge_vertex[twin as usize] = idx;
            edge_owner.push(h);
        }

        Self {
            vertex_count,
            edge_count: edge_owner.len() as u32,
            face_half_edges,
            edge_vertex,
            edge_owner,
        }
    }

    /// Child vertex placed on the edge of `h`.
    pub fn edge_point(&self, h: HalfEdgeId) -> VertexId {
        self.edge_vertex[h as usize]
    }

    /// Child vertex placed inside face `f`.
    pub fn face_point(&self, f: FaceId) -> VertexId {
        self.vertex_count + self.edge_count + f
    }

    /// Number of face half-edges of the parent.
    pub fn face_half_edges(&self) -> u32 {
        self.face_half_edges
    }

    /// Decodes a child vertex index.
    pub fn source(&self, child: VertexId) -> ChildSource {
        if child < self.vertex_count {
            ChildSource::Vertex(child)
        } else if child < self.vertex_count + self.edge_count {
            ChildSource::Edge(self.edge_owner[(child - self.vertex_count) as usize])
        } else {
            ChildSource::Face(child - self.vertex_count - self.edge_count)
        }
    }
}

// =============================================================================
// POINT RULES
// =============================================================================

/// Face point: mean of the corners, summed from the face side.
pub fn face_point_position(parent: &Mesh, f: FaceId) -> DVec2 {
    parent.mean_face_position(parent.face(f).side)
}

/// Face point color: mean of the corner colors, summed from the face side.
pub fn face_point_color(parent: &Mesh, f: FaceId) -> DVec3 {
    parent.mean_face_color(parent.face(f).side)
}

/// Edge point of the edge of face half-edge `h`.
///
/// Interior edges average both endpoints and both face points; boundary
/// edges take the midpoint.
pub fn edge_point_position(parent: &Mesh, h: HalfEdgeId) -> DVec2 {
    let twin = parent.twin(h);
    match (parent.face_of(h), parent.face_of(twin)) {
        (Some(f), Some(g)) => {
            (parent.target_position(h)
                + parent.target_position(twin)
                + face_point_position(parent, f)
                + face_point_position(parent, g))
                / 4.0
        }
        _ => (parent.target_position(h) + parent.target_position(twin)) / 2.0,
    }
}

/// Color on the face side of an edge point, for face half-edge `h`.
///
/// Smooth edges blend in both face colors; sharp edges interpolate the two
/// corner colors on the side of `h` only.
pub fn edge_point_color(parent: &Mesh, h: HalfEdgeId) -> DVec3 {
    let twin = parent.twin(h);
    match (parent.face_of(h), parent.face_of(twin)) {
        (Some(f), Some(g)) if !parent.is_sharp_edge(h) => {
            (parent.color(h)
                + parent.color(parent.next(h))
                + face_point_color(parent, f)
                + face_point_color(parent, g))
                / 4.0
        }
        _ => parent.edge_mid_color(h),
    }
}

/// Vertex point of parent vertex `v`.
///
/// Boundary corners (valence 2) stay put, other boundary vertices use the
/// 1-6-1 rule along the boundary, interior vertices the classic weighting.
pub fn vertex_point_position(parent: &Mesh, v: VertexId) -> DVec2 {
    let position = parent.position(v);
    let e = parent.ccw_boundary_edge(parent.out(v));
    if parent.face_of(e).is_none() {
        if parent.valence(v) == 2 {
            return position;
        }
        let other = parent.target_position(parent.twin(parent.prev(e)));
        return (parent.target_position(e) + 6.0 * position + other) / 8.0;
    }

    let n = parent.valence(v) as f64;
    let mut star = DVec2::ZERO;
    let mut faces = DVec2::ZERO;
    for spoke in parent.spokes(v) {
        star += parent.target_position(spoke);
        if let Some(f) = parent.face_of(spoke) {
            faces += face_point_position(parent, f);
        }
    }
    ((n - 2.0) * position + star / n + faces / n) / n
}

/// Color of the child corner at the vertex point, for face half-edge `h`
/// leaving that vertex.
///
/// Mirrors [`vertex_point_position`] with smoothness in place of interior
/// and sharp walks in place of boundary walks.
pub fn vertex_point_color(parent: &Mesh, h: HalfEdgeId) -> DVec3 {
    let v = parent.origin(h);
    if parent.is_smooth_vertex(v) {
        let n = parent.valence(v) as f64;
        let mut star = DVec3::ZERO;
        let mut faces = DVec3::ZERO;
        for spoke in parent.spokes(v) {
            star += (parent.color(parent.next(spoke)) + parent.color(parent.twin(spoke))) / 2.0;
            if let Some(f) = parent.face_of(spoke) {
                faces += face_point_color(parent, f);
            }
        }
        return ((n - 2.0) * parent.color(parent.out(v)) + star / n + faces / n) / n;
    }

    if parent.is_sharp_edge(h) && parent.is_sharp_edge(parent.prev(h)) {
        return parent.color(h);
    }

    let first = parent.ccw_sharp_edge(parent.twin(parent.prev(h)));
    let last = parent.cw_sharp_edge(h);
    (parent.color(parent.twin(first)) + 6.0 * parent.color(h) + parent.color(parent.next(last)))
        / 8.0
}

// =============================================================================
// REFINEMENT
// =============================================================================

/// One step of Catmull-Clark refinement. Every child face is a quad.
pub fn catmull_clark(parent: &Mesh) -> Mesh {
    let layout = CatmullClarkLayout::new(parent);
    let nv = parent.vertex_count();
    let sfv = layout.face_half_edges();
    let child_vertices = nv + layout.edge_count as usize + parent.face_count();

    let mut child = Mesh {
        vertices: Vec::with_capacity(child_vertices),
        half_edges: vec![HalfEdge::new(0); 2 * parent.half_edge_count() + 2 * sfv as usize],
        faces: Vec::with_capacity(sfv as usize),
    };

    for v in 0..nv as u32 {
        let vertex = parent.vertex(v);
        child.vertices.push(Vertex {
            position: DVec2::ZERO,
            out: 4 * vertex.out,
            valence: vertex.valence,
        });
    }
    for &h in &layout.edge_owner {
        child.vertices.push(Vertex {
            position: DVec2::ZERO,
            out: 4 * h + 2,
            valence: if parent.is_boundary_edge(h) { 3 } else { 4 },
        });
    }
    for face in &parent.faces {
        child.vertices.push(Vertex {
            position: DVec2::ZERO,
            out: 4 * face.side + 3,
            valence: face.valence,
        });
    }

    let boundary_child = |h: HalfEdgeId, k: u32| 2 * sfv + 2 * h + k;
    for e in 0..sfv {
        let next = parent.next(e);
        let prev = parent.prev(e);
        let twin = parent.twin(e);
        let twin_has_face = parent.face_of(twin).is_some();
        let edge_point = layout.edge_point(e);
        let face_point = layout.face_point(parent.face_of(e).unwrap_or_default());

        let links = [
            (
                edge_point,
                4 * e + 2,
                4 * prev + 1,
                if twin_has_face { 4 * twin + 1 } else { boundary_child(twin, 1) },
                e,
            ),
            (
                parent.target(e),
                4 * next,
                4 * e + 3,
                if twin_has_face { 4 * twin } else { boundary_child(twin, 0) },
                next,
            ),
            (face_point, 4 * prev + 3, 4 * e, 4 * e + 3, e),
            (edge_point, 4 * e + 1, 4 * next + 2, 4 * e + 2, next),
        ];
        for (k, (target, next, prev, twin, face)) in links.into_iter().enumerate() {
            let he = child.he_mut(4 * e + k as u32);
            he.target = target;
            he.next = next;
            he.prev = prev;
            he.twin = twin;
            he.face = Some(face);
        }
    }

    for e in sfv..parent.half_edge_count() as u32 {
        let twin = parent.twin(e);
        let links = [
            (
                layout.edge_point(e),
                boundary_child(e, 1),
                boundary_child(parent.prev(e), 1),
                4 * twin + 1,
            ),
            (
                parent.target(e),
                boundary_child(parent.next(e), 0),
                boundary_child(e, 0),
                4 * twin,
            ),
        ];
        for (k, (target, next, prev, twin)) in links.into_iter().enumerate() {
            let he = child.he_mut(boundary_child(e, k as u32));
            he.target = target;
            he.next = next;
            he.prev = prev;
            he.twin = twin;
        }
    }

    for e in 0..sfv {
        child.faces.push(Face {
            side: 4 * e,
            valence: 4,
        });
    }

    let all_vertices: Vec<VertexId> = (0..child_vertices as u32).collect();
    refresh_positions(parent, &mut child, &layout, &all_vertices);
    refresh_colors(parent, &mut child, 0..sfv);

    tracing::trace!(
        vertices = child.vertex_count(),
        half_edges = child.half_edge_count(),
        faces = child.face_count(),
        "catmull-clark refinement"
    );
    child
}

/// Recomputes the positions of the given child vertices from `parent`.
pub fn refresh_positions(
    parent: &Mesh,
    child: &mut Mesh,
    layout: &CatmullClarkLayout,
    vertices: &[VertexId],
) {
    for &v in vertices {
        let position = match layout.source(v) {
            ChildSource::Vertex(p) => vertex_point_position(parent, p),
            ChildSource::Edge(h) => edge_point_position(parent, h),
            ChildSource::Face(f) => face_point_position(parent, f),
        };
        child.vertices[v as usize].position = position;
    }
}

/// Recomputes colors and sharp marks of the four children of each given
/// parent face half-edge.
///
/// Child `4h` carries the vertex point color, `4h + 1` and `4h + 2` the edge
/// point color, `4h + 3` the face point color of the face of `h`. The two
/// children along the parent edge inherit its sharp mark.
pub fn refresh_colors<I>(parent: &Mesh, child: &mut Mesh, half_edges: I)
where
    I: IntoIterator<Item = HalfEdgeId>,
{
    for h in half_edges {
        let Some(f) = parent.face_of(h) else {
            continue;
        };
        let vertex_color = vertex_point_color(parent, h);
        let edge_color = edge_point_color(parent, h);
        let face_color = face_point_color(parent, f);
        let sharp = parent.he(h).sharp;

        let base = 4 * h;
        child.he_mut(base).color = vertex_color;
        child.he_mut(base).sharp = sharp;
        child.he_mut(base + 1).color = edge_color;
        child.he_mut(base + 1).sharp = sharp;
        child.he_mut(base + 2).color = edge_color;
        child.he_mut(base + 2).sharp = false;
        child.he_mut(base + 3).color = face_color;
        child.he_mut(base + 3).sharp = false;
    }
}
