//! Regularity tests that decide between the ACC1 and ACC2 schemes.

use crate::mesh::{FaceId, HalfEdgeId, Mesh};

/// True when the origin of `h` looks like a grid vertex, both for positions
/// and for colors seen from `h`.
///
/// Every adjacent face must be a quad. Interior vertices need valence 4 and
/// boundary vertices at most 3; smooth corners need color valence 4 and
/// non-smooth corners at most 3.
pub fn is_regular_vertex(mesh: &Mesh, h: HalfEdgeId) -> bool {
    let v = mesh.origin(h);

    let all_quads = mesh
        .spokes(v)
        .all(|e| mesh.face_of(e).is_none() || mesh.face_valence_of(e) == 4);
    if !all_quads {
        return false;
    }

    let valence = mesh.valence(v);
    let position_regular = if mesh.is_boundary_vertex(v) {
        valence <= 3
    } else {
        valence == 4
    };

    let color_valence = mesh.color_valence(h);
    let color_regular = if mesh.is_smooth_vertex(v) {
        color_valence == 4
    } else {
        color_valence <= 3
    };

    position_regular && color_regular
}

/// True for a quad whose four corners are regular.
pub fn is_regular_face(mesh: &Mesh, f: FaceId) -> bool {
    let face = mesh.face(f);
    face.valence == 4
        && mesh
            .face_edges(face.side)
            .all(|e| is_regular_vertex(mesh, e))
}
