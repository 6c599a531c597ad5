//! # Patch Classification
//!
//! Picks a control-net scheme per face:
//!
//! - **Regular**: a quad with four regular corners, ACC1
//! - **Irregular**: anything else, ACC2
//! - **Transition**: a face of the finest level bordering a face that is
//!   refined further; the scheme follows the face, and the constellation
//!   records which of its sides are shared with finer geometry
//!
//! Transition nets start at the first transition edge that follows a
//! non-transition edge, so the constellation always reads in a fixed
//! orientation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{acc1, acc2, is_regular_face, ControlPoint};
use crate::mesh::{FaceId, HalfEdgeId, Mesh};

/// Control-net scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
    /// Sixteen bicubic points per quad.
    Acc1,
    /// Five points per side.
    Acc2,
}

/// Arrangement of transition edges around a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constellation {
    /// One transition edge.
    C1,
    /// Two adjacent transition edges.
    C2,
    /// Two opposite transition edges.
    C3,
    /// Three transition edges.
    C4,
    /// Four transition edges.
    C5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatchKind {
    Regular,
    Irregular,
    Transition(Constellation),
}

/// Control net of one face, ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub face: FaceId,
    pub kind: PatchKind,
    pub scheme: Scheme,
    pub control_points: Vec<ControlPoint>,
}

/// Regular or irregular, from the face's own neighbourhood.
pub fn classify_face(mesh: &Mesh, f: FaceId) -> PatchKind {
    if is_regular_face(mesh, f) {
        PatchKind::Regular
    } else {
        PatchKind::Irregular
    }
}

/// ACC1 net for face `f`.
pub fn regular_patch(mesh: &Mesh, f: FaceId) -> Patch {
    Patch {
        face: f,
        kind: PatchKind::Regular,
        scheme: Scheme::Acc1,
        control_points: acc1::patch(mesh, f),
    }
}

/// ACC2 net for face `f`.
pub fn irregular_patch(mesh: &Mesh, f: FaceId) -> Patch {
    Patch {
        face: f,
        kind: PatchKind::Irregular,
        scheme: Scheme::Acc2,
        control_points: acc2::patch(mesh, f),
    }
}

/// Patch for `f` given the set of half-edges that border finer geometry.
///
/// Only the face's own half-edges are looked at in `transition_edges`. A
/// face with none of them gets a plain regular or irregular patch.
pub fn transition_patch(mesh: &Mesh, f: FaceId, transition_edges: &BTreeSet<HalfEdgeId>) -> Patch {
    let side = mesh.face(f).side;
    let own: Vec<HalfEdgeId> = mesh
        .face_edges(side)
        .filter(|e| transition_edges.contains(e))
        .collect();

    let Some((constellation, start)) = constellation(mesh, side, &own) else {
        return match classify_face(mesh, f) {
            PatchKind::Regular => regular_patch(mesh, f),
            _ => irregular_patch(mesh, f),
        };
    };

    let (scheme, control_points) = if is_regular_face(mesh, f) {
        (Scheme::Acc1, acc1::patch_from(mesh, start))
    } else {
        (Scheme::Acc2, acc2::patch_from(mesh, start))
    };

    Patch {
        face: f,
        kind: PatchKind::Transition(constellation),
        scheme,
        control_points,
    }
}

/// Constellation and starting half-edge for a face whose transition edges
/// are `own`.
fn constellation(
    mesh: &Mesh,
    side: HalfEdgeId,
    own: &[HalfEdgeId],
) -> Option<(Constellation, HalfEdgeId)> {
    let is_transition = |e: HalfEdgeId| own.contains(&e);

    let plain = mesh
        .face_edges(side)
        .find(|&e| !is_transition(e))
        .unwrap_or(side);
    let start = mesh
        .face_edges(plain)
        .find(|&e| is_transition(e))
        .unwrap_or(plain);

    let constellation = match own.len() {
        1 => Constellation::C1,
        2 if is_transition(mesh.next(start)) => Constellation::C2,
        2 => Constellation::C3,
        3 => Constellation::C4,
        4 => Constellation::C5,
        _ => return None,
    };
    Some((constellation, start))
}
