//! Computing and replaying edits on a mesh.

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use config::constants::{COORDS_FOOTPRINT_RINGS, EPSILON};
use glam::DVec2;
use gradient_mesh::{HalfEdgeId, Mesh, VertexId};

use super::{ColorEdit, CoordsEdit};

// =============================================================================
// COORDINATES
// =============================================================================

/// Face sides of the faces within `rings` of `v`, ascending.
pub fn footprint_sides(mesh: &Mesh, v: VertexId, rings: usize) -> Vec<HalfEdgeId> {
    let faces = mesh.padded_faces([v], rings);
    let mut sides = mesh.face_sides(&faces);
    sides.sort_unstable();
    sides
}

fn polar_angle(v: DVec2) -> f64 {
    v.y.atan2(v.x)
}

fn wrap_positive(angle: f64) -> f64 {
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}

/// Vectors from the origin of `e1` to the targets of `e1` and of the next
/// spoke counter-clockwise.
fn sector_vectors(mesh: &Mesh, e1: HalfEdgeId) -> (DVec2, DVec2) {
    let e2 = mesh.twin(mesh.prev(e1));
    let origin = mesh.origin_position(e1);
    (
        mesh.target_position(e1) - origin,
        mesh.target_position(e2) - origin,
    )
}

fn sector_start(mesh: &Mesh, edit: &CoordsEdit) -> HalfEdgeId {
    if edit.boundary {
        mesh.twin(edit.edge)
    } else {
        edit.edge
    }
}

/// Vertex moved by `edit`.
pub fn coords_anchor(mesh: &Mesh, edit: &CoordsEdit) -> VertexId {
    mesh.origin(sector_start(mesh, edit))
}

/// Displacement encoded by `edit`, evaluated on `original`.
pub fn coords_delta(original: &Mesh, edit: &CoordsEdit) -> DVec2 {
    let (vec1, vec2) = sector_vectors(original, sector_start(original, edit));
    if !edit.boundary {
        return edit.first * vec1 + edit.second * vec2;
    }

    let alpha = wrap_positive(polar_angle(vec2) - polar_angle(vec1));
    let angle = polar_angle(vec1) + alpha * edit.first;
    let scale = (vec1.length_squared() * vec2.length_squared()).sqrt();
    let length = (edit.second * scale).max(0.0).sqrt();
    length * DVec2::new(angle.cos(), angle.sin())
}

/// Encodes moving vertex `v` of `original` by `delta`.
///
/// Walks the spokes counter-clockwise until the direction of `delta` falls
/// into the sector between a spoke and its successor. Returns `None` when
/// no sector contains the direction, which only happens on folded stars.
pub fn compute_coords_edit(original: &Mesh, v: VertexId, delta: DVec2) -> Option<CoordsEdit> {
    for e1 in original.spokes(v) {
        let (vec1, vec2) = sector_vectors(original, e1);
        let alpha = wrap_positive(polar_angle(vec2) - polar_angle(vec1));
        let phi = wrap_positive(polar_angle(delta) - polar_angle(vec1));
        if phi > alpha {
            continue;
        }

        let footprint = footprint_sides(original, v, COORDS_FOOTPRINT_RINGS);
        if original.face_of(e1).is_some() {
            let det = vec1.perp_dot(vec2);
            if det.abs() < EPSILON {
                continue;
            }
            return Some(CoordsEdit {
                edge: e1,
                first: delta.perp_dot(vec2) / det,
                second: vec1.perp_dot(delta) / det,
                boundary: false,
                footprint,
            });
        }

        let scale = (vec1.length_squared() * vec2.length_squared()).sqrt();
        if alpha < EPSILON || scale < EPSILON {
            continue;
        }
        return Some(CoordsEdit {
            edge: original.twin(e1),
            first: phi / alpha,
            second: delta.length_squared() / scale,
            boundary: true,
            footprint,
        });
    }
    None
}

/// Moves the anchor of `edit` in `edited` to its original position plus the
/// encoded displacement. Returns the anchor.
pub fn apply_coords_edit(original: &Mesh, edited: &mut Mesh, edit: &CoordsEdit) -> VertexId {
    let v = coords_anchor(original, edit);
    edited.vertices[v as usize].position = original.position(v) + coords_delta(original, edit);
    v
}

// =============================================================================
// COLORS
// =============================================================================

/// Vertex whose corners `edit` paints.
pub fn color_anchor(mesh: &Mesh, edit: &ColorEdit) -> VertexId {
    mesh.origin(edit.edge)
}

/// Half-edges that take over the color of face spoke `e`.
fn sector_half_edges(mesh: &Mesh, e: HalfEdgeId) -> [HalfEdgeId; 8] {
    let next = mesh.next(e);
    let next_twin = mesh.twin(next);
    let far = mesh.next(next);
    let far_twin = mesh.twin(far);
    [
        next,
        mesh.next(next_twin),
        far,
        next_twin,
        mesh.twin(mesh.prev(next_twin)),
        mesh.next(far_twin),
        mesh.prev(e),
        far_twin,
    ]
}

/// Both halves of the three edges continuing straight on from `e`.
fn forward_crease(mesh: &Mesh, e: HalfEdgeId) -> [HalfEdgeId; 6] {
    let step = |h: HalfEdgeId| mesh.next(mesh.twin(mesh.next(h)));
    let second = step(e);
    let third = step(second);
    [
        e,
        mesh.twin(e),
        second,
        mesh.twin(second),
        third,
        mesh.twin(third),
    ]
}

/// Both halves of the three edges continuing straight on from `prev(e)`.
fn backward_crease(mesh: &Mesh, e: HalfEdgeId) -> [HalfEdgeId; 6] {
    let step = |h: HalfEdgeId| mesh.prev(mesh.twin(mesh.prev(h)));
    let first = mesh.prev(e);
    let second = step(first);
    let third = step(second);
    [
        first,
        mesh.twin(first),
        second,
        mesh.twin(second),
        third,
        mesh.twin(third),
    ]
}

/// Paints the edited corner and copies the color of every spoke of its
/// vertex onto the corners sharing its sector.
pub fn apply_color_patch(mesh: &mut Mesh, edit: &ColorEdit) {
    mesh.he_mut(edit.edge).color = edit.color;

    let spokes: Vec<HalfEdgeId> = mesh.vertex_edges(edit.edge).collect();
    for e in spokes {
        if mesh.face_of(e).is_none() {
            continue;
        }
        let color = mesh.color(e);
        for h in sector_half_edges(mesh, e) {
            mesh.he_mut(h).color = color;
        }
    }
}

/// Marks the creases on either side of the edited corner where its color
/// differs from the neighbouring corner, or where that corner is outside
/// the mesh.
pub fn apply_color_sharpness(mesh: &mut Mesh, edit: &ColorEdit) {
    let e = edit.edge;
    let color = mesh.color(e);

    let twin = mesh.twin(e);
    if mesh.face_of(twin).is_none() || color != mesh.color(mesh.next(twin)) {
        for h in forward_crease(mesh, e) {
            mesh.he_mut(h).sharp = true;
        }
    }

    let prev_twin = mesh.twin(mesh.prev(e));
    if mesh.face_of(prev_twin).is_none() || color != mesh.color(prev_twin) {
        for h in backward_crease(mesh, e) {
            mesh.he_mut(h).sharp = true;
        }
    }
}

/// Applies color edits in order: every patch first, then every crease.
pub fn apply_color_edits<'a, I>(mesh: &mut Mesh, edits: I)
where
    I: IntoIterator<Item = &'a ColorEdit>,
{
    let edits: Vec<&ColorEdit> = edits.into_iter().collect();
    for edit in &edits {
        apply_color_patch(mesh, edit);
    }
    for edit in &edits {
        apply_color_sharpness(mesh, edit);
    }
}

/// Every half-edge a color edit on `edge` reads or may write.
pub fn color_edit_reach(mesh: &Mesh, edge: HalfEdgeId) -> BTreeSet<HalfEdgeId> {
    let mut reach = BTreeSet::new();
    for e in mesh.vertex_edges(edge) {
        reach.insert(e);
        if mesh.face_of(e).is_some() {
            reach.extend(sector_half_edges(mesh, e));
        }
    }
    reach.extend(forward_crease(mesh, edge));
    reach.extend(backward_crease(mesh, edge));
    reach
}

// =============================================================================
// EDITED MESH
// =============================================================================

/// `original` with the given edits applied.
pub fn edited_mesh<'a, C, K>(original: &Mesh, coords: C, colors: K) -> Mesh
where
    C: IntoIterator<Item = &'a CoordsEdit>,
    K: IntoIterator<Item = &'a ColorEdit>,
{
    let mut edited = original.clone();
    for edit in coords {
        apply_coords_edit(original, &mut edited, edit);
    }
    apply_color_edits(&mut edited, colors);
    edited
}
