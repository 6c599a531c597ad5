//! # Half-Edge Mesh
//!
//! Arena half-edge mesh for 2D gradient meshes.
//!
//! ## Overview
//!
//! A [`Mesh`] owns three parallel arrays of records. Every cross reference is
//! an index into one of these arrays, and the index of a record is its
//! position in its array:
//!
//! ```text
//! HalfEdge: [target, next, prev, twin, face?, color, sharp]
//! Vertex:   [position, out, valence]
//! Face:     [side, valence]
//! ```
//!
//! ## Layout invariant
//!
//! Half-edges that belong to a face occupy the indices
//! `0..face_half_edge_count()`. Boundary half-edges (no face) follow. Every
//! refinement operator in this crate relies on this layout, and every
//! constructor preserves it.

mod build;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};

/// Index type for vertices.
pub type VertexId = u32;
/// Index type for half-edges.
pub type HalfEdgeId = u32;
/// Index type for faces.
pub type FaceId = u32;

/// Color of a half-edge that was never painted.
#[inline]
pub fn default_color() -> DVec3 {
    DVec3::from_array(config::constants::DEFAULT_HALF_EDGE_COLOR)
}

// =============================================================================
// RECORDS
// =============================================================================

/// Vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Position in the plane.
    pub position: DVec2,
    /// An outgoing half-edge. Always one that belongs to a face.
    pub out: HalfEdgeId,
    /// Number of outgoing half-edges, boundary ones included.
    pub valence: u32,
}

/// Half-edge record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfEdge {
    /// Vertex this half-edge points to.
    pub target: VertexId,
    /// Next half-edge around the face (or around the boundary loop).
    pub next: HalfEdgeId,
    /// Previous half-edge around the face (or around the boundary loop).
    pub prev: HalfEdgeId,
    /// Opposite half-edge.
    pub twin: HalfEdgeId,
    /// Owning face, `None` on the boundary.
    pub face: Option<FaceId>,
    /// Color of the corner at the origin of this half-edge.
    pub color: DVec3,
    /// Explicit sharpness mark set by color edits.
    pub sharp: bool,
}

impl HalfEdge {
    /// Creates an unlinked half-edge pointing at `target`.
    pub fn new(target: VertexId) -> Self {
        Self {
            target,
            next: 0,
            prev: 0,
            twin: 0,
            face: None,
            color: default_color(),
            sharp: false,
        }
    }
}

/// Face record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Canonical first half-edge of the face loop.
    pub side: HalfEdgeId,
    /// Number of sides.
    pub valence: u32,
}

// =============================================================================
// MESH
// =============================================================================

/// Arena half-edge mesh.
///
/// ## Example
///
/// ```rust
/// use glam::DVec2;
/// use gradient_mesh::Mesh;
///
/// let square = [
///     DVec2::new(0.0, 0.0),
///     DVec2::new(1.0, 0.0),
///     DVec2::new(1.0, 1.0),
///     DVec2::new(0.0, 1.0),
/// ];
/// let mesh = Mesh::from_polygons(&square, &[vec![0, 1, 2, 3]]).unwrap();
/// assert_eq!(mesh.face_count(), 1);
/// assert_eq!(mesh.half_edge_count(), 8);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// All vertices.
    pub vertices: Vec<Vertex>,
    /// All half-edges, face half-edges first.
    pub half_edges: Vec<HalfEdge>,
    /// All faces.
    pub faces: Vec<Face>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the mesh has no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edges.
    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Sum of face valences, which is also the number of face half-edges.
    pub fn face_half_edge_count(&self) -> usize {
        self.faces.iter().map(|f| f.valence as usize).sum()
    }

    // -------------------------------------------------------------------------
    // Record access
    // -------------------------------------------------------------------------

    /// Half-edge record. Panics on an index outside the arena.
    #[inline]
    pub fn he(&self, h: HalfEdgeId) -> &HalfEdge {
        &self.half_edges[h as usize]
    }

    /// Mutable half-edge record.
    #[inline]
    pub fn he_mut(&mut self, h: HalfEdgeId) -> &mut HalfEdge {
        &mut self.half_edges[h as usize]
    }

    /// Vertex record. Panics on an index outside the arena.
    #[inline]
    pub fn vertex(&self, v: VertexId) -> &Vertex {
        &self.vertices[v as usize]
    }

    /// Face record. Panics on an index outside the arena.
    #[inline]
    pub fn face(&self, f: FaceId) -> &Face {
        &self.faces[f as usize]
    }

    /// Checked vertex access.
    pub fn get_vertex(&self, v: VertexId) -> MeshResult<&Vertex> {
        self.vertices
            .get(v as usize)
            .ok_or(MeshError::InvalidVertex(v))
    }

    /// Checked half-edge access.
    pub fn get_half_edge(&self, h: HalfEdgeId) -> MeshResult<&HalfEdge> {
        self.half_edges
            .get(h as usize)
            .ok_or(MeshError::InvalidHalfEdge(h))
    }

    /// Checked face access.
    pub fn get_face(&self, f: FaceId) -> MeshResult<&Face> {
        self.faces.get(f as usize).ok_or(MeshError::InvalidFace(f))
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    #[inline]
    pub fn next(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.he(h).next
    }

    #[inline]
    pub fn prev(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.he(h).prev
    }

    #[inline]
    pub fn twin(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.he(h).twin
    }

    #[inline]
    pub fn target(&self, h: HalfEdgeId) -> VertexId {
        self.he(h).target
    }

    /// Vertex a half-edge leaves from.
    #[inline]
    pub fn origin(&self, h: HalfEdgeId) -> VertexId {
        self.target(self.prev(h))
    }

    /// Owning face of a half-edge.
    #[inline]
    pub fn face_of(&self, h: HalfEdgeId) -> Option<FaceId> {
        self.he(h).face
    }

    /// Valence of the face owning `h`, zero on the boundary.
    #[inline]
    pub fn face_valence_of(&self, h: HalfEdgeId) -> u32 {
        self.face_of(h).map_or(0, |f| self.face(f).valence)
    }

    #[inline]
    pub fn color(&self, h: HalfEdgeId) -> DVec3 {
        self.he(h).color
    }

    #[inline]
    pub fn position(&self, v: VertexId) -> DVec2 {
        self.vertex(v).position
    }

    #[inline]
    pub fn valence(&self, v: VertexId) -> u32 {
        self.vertex(v).valence
    }

    /// Outgoing half-edge of a vertex.
    #[inline]
    pub fn out(&self, v: VertexId) -> HalfEdgeId {
        self.vertex(v).out
    }

    /// Position of the target of `h`.
    #[inline]
    pub fn target_position(&self, h: HalfEdgeId) -> DVec2 {
        self.position(self.target(h))
    }

    /// Position of the origin of `h`.
    #[inline]
    pub fn origin_position(&self, h: HalfEdgeId) -> DVec2 {
        self.position(self.origin(h))
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Checks every structural invariant of the arena.
    ///
    /// - all references are in range
    /// - `twin(twin(h)) == h`, `next(prev(h)) == h`, `prev(next(h)) == h`
    /// - face loops close after `valence` steps and carry the face index
    /// - face half-edges precede boundary half-edges
    /// - vertex `out` leaves the vertex, has a face, and valences match
    pub fn validate(&self) -> MeshResult<()> {
        let nv = self.vertices.len();
        let nh = self.half_edges.len();
        let nf = self.faces.len();
        let sfv = self.face_half_edge_count();

        for (i, e) in self.half_edges.iter().enumerate() {
            let h = i as HalfEdgeId;
            if e.target as usize >= nv {
                return Err(MeshError::InvalidVertex(e.target));
            }
            for link in [e.next, e.prev, e.twin] {
                if link as usize >= nh {
                    return Err(MeshError::InvalidHalfEdge(link));
                }
            }
            if let Some(f) = e.face {
                if f as usize >= nf {
                    return Err(MeshError::InvalidFace(f));
                }
            }
            if self.twin(e.twin) != h || e.twin == h {
                return Err(MeshError::invalid_topology(format!(
                    "half-edge {h} is not the twin of its twin"
                )));
            }
            if self.prev(e.next) != h || self.next(e.prev) != h {
                return Err(MeshError::invalid_topology(format!(
                    "next/prev links of half-edge {h} are inconsistent"
                )));
            }
            if (i < sfv) != e.face.is_some() {
                return Err(MeshError::invalid_topology(format!(
                    "half-edge {h} breaks the face-first layout"
                )));
            }
            if e.face.is_none() && self.he(e.twin).face.is_none() {
                return Err(MeshError::invalid_topology(format!(
                    "boundary half-edge {h} has a boundary twin"
                )));
            }
            if self.origin(e.twin) != e.target {
                return Err(MeshError::invalid_topology(format!(
                    "half-edge {h} and its twin do not share endpoints"
                )));
            }
        }

        for (i, face) in self.faces.iter().enumerate() {
            let f = i as FaceId;
            if face.side as usize >= nh {
                return Err(MeshError::InvalidHalfEdge(face.side));
            }
            if face.valence < 3 {
                return Err(MeshError::invalid_topology(format!(
                    "face {f} has fewer than three sides"
                )));
            }
            let mut h = face.side;
            for _ in 0..face.valence {
                if self.face_of(h) != Some(f) {
                    return Err(MeshError::invalid_topology(format!(
                        "half-edge {h} in the loop of face {f} belongs elsewhere"
                    )));
                }
                h = self.next(h);
            }
            if h != face.side {
                return Err(MeshError::invalid_topology(format!(
                    "loop of face {f} does not close after {} steps",
                    face.valence
                )));
            }
        }

        let mut outgoing = vec![0u32; nv];
        for e in &self.half_edges {
            outgoing[self.target(e.prev) as usize] += 1;
        }
        for (i, vertex) in self.vertices.iter().enumerate() {
            let v = i as VertexId;
            if vertex.out as usize >= nh {
                return Err(MeshError::InvalidHalfEdge(vertex.out));
            }
            if self.origin(vertex.out) != v {
                return Err(MeshError::invalid_topology(format!(
                    "outgoing half-edge of vertex {v} does not leave it"
                )));
            }
            if self.face_of(vertex.out).is_none() {
                return Err(MeshError::invalid_topology(format!(
                    "outgoing half-edge of vertex {v} is a boundary half-edge"
                )));
            }
            if outgoing[i] != vertex.valence {
                return Err(MeshError::invalid_topology(format!(
                    "vertex {v} has valence {} but {} outgoing half-edges",
                    vertex.valence, outgoing[i]
                )));
            }
        }

        Ok(())
    }
}
