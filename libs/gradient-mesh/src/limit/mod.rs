//! # Limit Surface Evaluation
//!
//! Closed-form approximations of where a vertex (and the color at a face
//! corner) ends up after infinitely many refinements.
//!
//! ## Limit points
//!
//! For an interior vertex of valence `n` with position `v`:
//!
//! ```text
//! L(v) = (n-3)/(n+5) * v + 4/(n(n+5)) * sum_spokes(meanFace(e) + edgeMid(e))
//! ```
//!
//! Boundary corners (valence 2) are fixed points, other boundary vertices
//! use a 1-4-1 rule along the boundary. Colors follow the same rules with
//! smoothness in place of interior and sharp walks in place of boundary
//! walks.
//!
//! ## Patches
//!
//! [`acc1`] and [`acc2`] build per-face control nets. [`patch`] picks one
//! of them per face.

pub mod acc1;
pub mod acc2;
pub mod patch;
pub mod regularity;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::mesh::{HalfEdgeId, Mesh, VertexId};

pub use patch::{
    classify_face, irregular_patch, regular_patch, transition_patch, Constellation, Patch,
    PatchKind, Scheme,
};
pub use regularity::{is_regular_face, is_regular_vertex};

/// A control point of a patch: a position and the color attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlPoint {
    pub position: DVec2,
    pub color: DVec3,
}

impl ControlPoint {
    pub fn new(position: DVec2, color: DVec3) -> Self {
        Self { position, color }
    }
}

// =============================================================================
// LIMIT POINTS
// =============================================================================

/// Limit position of the origin of `h`.
pub fn limit_position(mesh: &Mesh, h: HalfEdgeId) -> DVec2 {
    let v = mesh.origin(h);
    let position = mesh.position(v);
    let valence = mesh.valence(v);

    if !mesh.is_boundary_vertex(v) {
        let n = valence as f64;
        let sum: DVec2 = mesh
            .spokes(v)
            .map(|e| mesh.mean_face_position(e) + mesh.edge_midpoint(e))
            .sum();
        (n - 3.0) / (n + 5.0) * position + 4.0 / (n * (n + 5.0)) * sum
    } else if valence == 2 {
        position
    } else {
        let first = mesh.target_position(mesh.ccw_boundary_edge(h));
        let last = mesh.target_position(mesh.cw_boundary_edge(h));
        (first + 4.0 * position + last) / 6.0
    }
}

/// Limit color of the corner at the origin of `h`.
pub fn limit_color(mesh: &Mesh, h: HalfEdgeId) -> DVec3 {
    let v = mesh.origin(h);
    let color = mesh.color(h);

    if mesh.is_smooth_vertex(v) {
        let n = mesh.valence(v) as f64;
        let sum: DVec3 = mesh
            .spokes(v)
            .map(|e| {
                mesh.mean_face_color(e)
                    + (mesh.edge_mid_color(e) + mesh.edge_mid_color(mesh.twin(e))) / 2.0
            })
            .sum();
        (n - 3.0) / (n + 5.0) * color + 4.0 / (n * (n + 5.0)) * sum
    } else if mesh.is_sharp_edge(h) && mesh.is_sharp_edge(mesh.prev(h)) {
        color
    } else {
        let first = mesh.ccw_sharp_edge(mesh.twin(mesh.prev(h)));
        let last = mesh.cw_sharp_edge(h);
        (mesh.color(mesh.twin(first)) + 4.0 * color + mesh.color(mesh.next(last))) / 6.0
    }
}

/// Position `v` must take so that its limit position becomes `limit`, with
/// the rest of its one-ring held fixed.
pub fn inverse_limit_position(mesh: &Mesh, v: VertexId, limit: DVec2) -> DVec2 {
    let valence = mesh.valence(v);

    if !mesh.is_boundary_vertex(v) {
        let n = valence as f64;
        let mut sum = DVec2::ZERO;
        let mut own_weight = 0.0;
        for e in mesh.spokes(v) {
            sum += mesh.mean_face_position(e) + mesh.edge_midpoint(e);
            own_weight += 1.0 / mesh.face_valence_of(e) as f64 + 0.5;
        }
        let ring = sum - own_weight * mesh.position(v);
        let scale = 4.0 / (n * (n + 5.0));
        (limit - scale * ring) / ((n - 3.0) / (n + 5.0) + scale * own_weight)
    } else if valence == 2 {
        limit
    } else {
        let out = mesh.out(v);
        let first = mesh.target_position(mesh.ccw_boundary_edge(out));
        let last = mesh.target_position(mesh.cw_boundary_edge(out));
        (6.0 * limit - first - last) / 4.0
    }
}

// =============================================================================
// LIMIT MESH
// =============================================================================

/// Copy of `edited` with every vertex moved to its limit position and every
/// half-edge colored with its limit color.
pub fn limit_mesh(edited: &Mesh) -> Mesh {
    let mut limit = edited.clone();
    let vertices: Vec<VertexId> = (0..edited.vertex_count() as u32).collect();
    refresh_limit_positions(edited, &mut limit, vertices);
    refresh_limit_colors(edited, &mut limit, 0..edited.half_edge_count() as u32);
    limit
}

/// Recomputes the limit positions of `vertices`.
pub fn refresh_limit_positions<I>(edited: &Mesh, limit: &mut Mesh, vertices: I)
where
    I: IntoIterator<Item = VertexId>,
{
    for v in vertices {
        limit.vertices[v as usize].position = limit_position(edited, edited.out(v));
    }
}

/// Recomputes the limit colors of `half_edges`.
pub fn refresh_limit_colors<I>(edited: &Mesh, limit: &mut Mesh, half_edges: I)
where
    I: IntoIterator<Item = HalfEdgeId>,
{
    for h in half_edges {
        limit.half_edges[h as usize].color = limit_color(edited, h);
    }
}

#[cfg(test)]
mod tests;
