//! # Selection
//!
//! Picking on the limit mesh of the edit level. Distances are measured in
//! screen units: a world-space distance times the view scale.

use std::collections::BTreeSet;

use config::constants::COLOR_EDIT_POINT_OFFSET;
use glam::DVec2;
use gradient_mesh::{HalfEdgeId, Mesh, VertexId};

/// Nearest of `candidates` to `point`, if closer than `radius` on screen.
pub fn nearest_vertex<I>(
    mesh: &Mesh,
    candidates: I,
    point: DVec2,
    scale: f64,
    radius: f64,
) -> Option<VertexId>
where
    I: IntoIterator<Item = VertexId>,
{
    candidates
        .into_iter()
        .map(|v| (v, scale * mesh.position(v).distance(point)))
        .filter(|&(_, distance)| distance < radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(v, _)| v)
}

/// Handle drawn for the corner of face half-edge `e`: pushed from the
/// corner vertex into the face, along the bisector of its two sides.
pub fn sector_handle(mesh: &Mesh, e: HalfEdgeId, scale: f64) -> DVec2 {
    let corner = mesh.origin_position(e);
    let side = (mesh.target_position(e) - corner).normalize_or_zero();
    let other = (mesh.origin_position(mesh.prev(e)) - corner).normalize_or_zero();
    corner + COLOR_EDIT_POINT_OFFSET / scale * (side + other)
}

/// Face spokes of the `editable` vertices whose handle lies within `radius`
/// of `point` on screen.
pub fn select_sectors<'a, I>(
    mesh: &Mesh,
    editable: I,
    point: DVec2,
    scale: f64,
    radius: f64,
) -> BTreeSet<HalfEdgeId>
where
    I: IntoIterator<Item = &'a VertexId>,
{
    editable
        .into_iter()
        .flat_map(|&v| mesh.spokes(v))
        .filter(|&e| mesh.face_of(e).is_some())
        .filter(|&e| scale * sector_handle(mesh, e, scale).distance(point) < radius)
        .collect()
}
