//! # Topology Queries
//!
//! Traversals and predicates built purely on the half-edge links.
//!
//! Walks around a vertex step with `twin(prev(h))` (counter-clockwise) or
//! `next(twin(h))` (clockwise) and never take more steps than the vertex
//! valence, so a corrupted arena cannot make them loop forever.
//!
//! ## Sharpness
//!
//! An edge is sharp when either half is explicitly marked or either side is
//! the mesh boundary. Sharp edges split the color one-ring the way the
//! boundary splits the geometric one-ring, which is why every walk exists in
//! a boundary flavour and a sharp flavour.

use std::collections::BTreeSet;

use glam::{DVec2, DVec3};

use crate::mesh::{FaceId, HalfEdgeId, Mesh, VertexId};

// =============================================================================
// ITERATORS
// =============================================================================

/// Half-edges of a face loop, starting at a given half-edge.
#[derive(Debug, Clone)]
pub struct FaceEdges<'a> {
    mesh: &'a Mesh,
    current: HalfEdgeId,
    remaining: u32,
}

impl Iterator for FaceEdges<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let h = self.current;
        self.current = self.mesh.next(h);
        self.remaining -= 1;
        Some(h)
    }
}

/// Half-edges leaving a vertex, counter-clockwise from a given spoke.
#[derive(Debug, Clone)]
pub struct VertexEdges<'a> {
    mesh: &'a Mesh,
    current: HalfEdgeId,
    remaining: u32,
}

impl Iterator for VertexEdges<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let h = self.current;
        self.current = self.mesh.twin(self.mesh.prev(h));
        self.remaining -= 1;
        Some(h)
    }
}

impl Mesh {
    /// Half-edges of the face owning `h`, starting at `h`.
    ///
    /// A boundary half-edge yields nothing.
    pub fn face_edges(&self, h: HalfEdgeId) -> FaceEdges<'_> {
        FaceEdges {
            mesh: self,
            current: h,
            remaining: self.face_valence_of(h),
        }
    }

    /// Half-edges leaving the origin of `h`, starting at `h`.
    pub fn vertex_edges(&self, h: HalfEdgeId) -> VertexEdges<'_> {
        VertexEdges {
            mesh: self,
            current: h,
            remaining: self.valence(self.origin(h)),
        }
    }

    /// Half-edges leaving `v`, starting at its `out`.
    pub fn spokes(&self, v: VertexId) -> VertexEdges<'_> {
        self.vertex_edges(self.out(v))
    }

    // =========================================================================
    // PREDICATES
    // =========================================================================

    /// A vertex is on the boundary when its counter-clockwise boundary walk
    /// ends on a half-edge without a face.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        self.face_of(self.ccw_boundary_edge(self.out(v))).is_none()
    }

    /// An edge is on the boundary when either half lacks a face.
    pub fn is_boundary_edge(&self, h: HalfEdgeId) -> bool {
        !(self.face_of(h).is_some() && self.face_of(self.twin(h)).is_some())
    }

    /// Explicitly marked (on either half) or on the boundary.
    pub fn is_sharp_edge(&self, h: HalfEdgeId) -> bool {
        let twin = self.twin(h);
        self.he(h).sharp || self.he(twin).sharp || self.is_boundary_edge(h)
    }

    /// A vertex is smooth (color-regular) when at most one incident edge is
    /// sharp.
    pub fn is_smooth_vertex(&self, v: VertexId) -> bool {
        self.spokes(v).filter(|&h| self.is_sharp_edge(h)).count() <= 1
    }

    /// True when some face sharing an edge with `f` is not a quad.
    pub fn has_irregular_neighbour(&self, f: FaceId) -> bool {
        self.face_edges(self.face(f).side).any(|h| {
            let twin = self.twin(h);
            self.face_of(twin).is_some() && self.face_valence_of(twin) != 4
        })
    }

    // =========================================================================
    // WALKS
    // =========================================================================

    /// Walks clockwise from `h` until the spoke whose twin has no face.
    pub fn cw_boundary_edge(&self, mut h: HalfEdgeId) -> HalfEdgeId {
        let valence = self.valence(self.origin(h));
        for _ in 0..valence {
            if self.face_of(self.twin(h)).is_none() {
                break;
            }
            h = self.next(self.twin(h));
        }
        h
    }

    /// Walks counter-clockwise from `h` until a spoke without a face.
    pub fn ccw_boundary_edge(&self, mut h: HalfEdgeId) -> HalfEdgeId {
        let valence = self.valence(self.origin(h));
        for _ in 0..valence {
            if self.face_of(h).is_none() {
                break;
            }
            h = self.twin(self.prev(h));
        }
        h
    }

    /// Walks clockwise from `h` until a sharp spoke.
    pub fn cw_sharp_edge(&self, mut h: HalfEdgeId) -> HalfEdgeId {
        let valence = self.valence(self.origin(h));
        for _ in 0..valence {
            if self.is_sharp_edge(h) {
                break;
            }
            h = self.next(self.twin(h));
        }
        h
    }

    /// Walks counter-clockwise from `h` until a sharp spoke.
    pub fn ccw_sharp_edge(&self, mut h: HalfEdgeId) -> HalfEdgeId {
        let valence = self.valence(self.origin(h));
        for _ in 0..valence {
            if self.is_sharp_edge(h) {
                break;
            }
            h = self.twin(self.prev(h));
        }
        h
    }

    /// Number of edges in the color sector containing `h`.
    ///
    /// A smooth vertex has a single sector spanning its whole valence. At a
    /// non-smooth vertex the sector runs between two sharp spokes, both
    /// counted.
    pub fn color_valence(&self, h: HalfEdgeId) -> u32 {
        let v = self.origin(h);
        let valence = self.valence(v);
        if self.is_smooth_vertex(v) {
            return valence;
        }
        let mut e = self.twin(self.prev(self.cw_sharp_edge(h)));
        let mut count = 2;
        while !self.is_sharp_edge(e) && count <= valence {
            e = self.twin(self.prev(e));
            count += 1;
        }
        count
    }

    // =========================================================================
    // AVERAGES
    // =========================================================================

    /// Mean position of the corners of the face owning `h`, summed from `h`.
    pub fn mean_face_position(&self, h: HalfEdgeId) -> DVec2 {
        let n = self.face_valence_of(h);
        let sum: DVec2 = self.face_edges(h).map(|e| self.target_position(e)).sum();
        sum / n as f64
    }

    /// Mean corner color of the face owning `h`, summed from `h`.
    pub fn mean_face_color(&self, h: HalfEdgeId) -> DVec3 {
        let n = self.face_valence_of(h);
        let sum: DVec3 = self.face_edges(h).map(|e| self.color(e)).sum();
        sum / n as f64
    }

    /// Midpoint of the edge of `h`.
    pub fn edge_midpoint(&self, h: HalfEdgeId) -> DVec2 {
        (self.origin_position(h) + self.target_position(h)) / 2.0
    }

    /// Average of the colors at both ends of `h` on its own side.
    pub fn edge_mid_color(&self, h: HalfEdgeId) -> DVec3 {
        (self.color(h) + self.color(self.next(h))) / 2.0
    }

    // =========================================================================
    // NEIGHBOURHOODS
    // =========================================================================

    /// Faces within `rings` face rings of the seed vertices.
    ///
    /// Ring one holds every face touching a seed, ring two every face
    /// touching a vertex of ring one, and so on.
    pub fn padded_faces<I>(&self, seeds: I, rings: usize) -> BTreeSet<FaceId>
    where
        I: IntoIterator<Item = VertexId>,
    {
        let mut processed_vertices: BTreeSet<VertexId> = BTreeSet::new();
        let mut processed_faces: BTreeSet<FaceId> = BTreeSet::new();
        let mut frontier: BTreeSet<VertexId> = seeds.into_iter().collect();

        for _ in 0..rings {
            let mut ring_faces = BTreeSet::new();
            for &v in &frontier {
                processed_vertices.insert(v);
                for h in self.spokes(v) {
                    if let Some(f) = self.face_of(h) {
                        if !processed_faces.contains(&f) {
                            ring_faces.insert(f);
                        }
                    }
                }
            }

            frontier.clear();
            for &f in &ring_faces {
                processed_faces.insert(f);
                for h in self.face_edges(self.face(f).side) {
                    let v = self.target(h);
                    if !processed_vertices.contains(&v) {
                        frontier.insert(v);
                    }
                }
            }
            if frontier.is_empty() && ring_faces.is_empty() {
                break;
            }
        }

        processed_faces
    }

    /// Corner vertices of the given faces.
    pub fn face_vertices<'a, I>(&self, faces: I) -> BTreeSet<VertexId>
    where
        I: IntoIterator<Item = &'a FaceId>,
    {
        faces
            .into_iter()
            .flat_map(|&f| self.face_edges(self.face(f).side))
            .map(|h| self.target(h))
            .collect()
    }

    /// Half-edges of the given faces.
    pub fn face_half_edges<'a, I>(&self, faces: I) -> BTreeSet<HalfEdgeId>
    where
        I: IntoIterator<Item = &'a FaceId>,
    {
        faces
            .into_iter()
            .flat_map(|&f| self.face_edges(self.face(f).side))
            .collect()
    }

    /// Canonical side half-edge of each face.
    pub fn face_sides<'a, I>(&self, faces: I) -> Vec<HalfEdgeId>
    where
        I: IntoIterator<Item = &'a FaceId>,
    {
        faces.into_iter().map(|&f| self.face(f).side).collect()
    }
}
