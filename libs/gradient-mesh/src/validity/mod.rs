//! # Validity Check
//!
//! Detects folds in the surface near a moved vertex.
//!
//! A quad is folded when the partial derivatives of its ACC1 net disagree in
//! orientation. Faces that cannot be judged directly (non-quads, or quads
//! flagged by the derivative test) are refined locally with Catmull-Clark
//! and re-tested, up to a depth limit. A fold that survives every level is
//! reported; the check never prevents the edit itself.

use std::collections::BTreeSet;

use config::constants::SELF_INTERSECTION_SEED_RINGS;
use glam::DVec2;

use crate::limit::acc1;
use crate::mesh::{FaceId, Mesh, VertexId};
use crate::subdivision::{catmull_clark, extract_submesh};

/// Net indices whose differences give the derivatives along `u`.
///
/// The sixteen ACC1 points of a quad sit on the grid
///
/// ```text
/// 12--10--9---8
/// 13--15--11--6
/// 14--3---7---5
/// 0---1---2---4
/// ```
const U_DERIVATIVES: [(usize, usize); 12] = [
    (1, 0),
    (2, 1),
    (4, 2),
    (3, 14),
    (7, 3),
    (5, 7),
    (15, 13),
    (11, 15),
    (6, 11),
    (10, 12),
    (9, 10),
    (8, 9),
];

/// Net indices whose differences give the derivatives along `v`.
const V_DERIVATIVES: [(usize, usize); 12] = [
    (14, 0),
    (13, 14),
    (12, 13),
    (3, 1),
    (15, 3),
    (10, 15),
    (7, 2),
    (11, 7),
    (9, 11),
    (5, 4),
    (6, 5),
    (8, 6),
];

/// True when the ACC1 net of quad `f` folds over itself.
///
/// Every pair of a `u` and a `v` derivative must turn the same way as the
/// pair at the first corner. A zero cross product counts as a fold.
pub fn is_face_folded(mesh: &Mesh, f: FaceId) -> bool {
    let net: Vec<DVec2> = acc1::patch(mesh, f)
        .into_iter()
        .map(|p| p.position)
        .collect();
    if net.len() != 16 {
        return true;
    }

    let derivative = |(a, b): (usize, usize)| net[a] - net[b];
    let us: Vec<DVec2> = U_DERIVATIVES.iter().copied().map(derivative).collect();
    let vs: Vec<DVec2> = V_DERIVATIVES.iter().copied().map(derivative).collect();

    let reference = us[0].perp_dot(vs[0]);
    us.iter()
        .any(|u| vs.iter().any(|v| u.perp_dot(*v) * reference <= 0.0))
}

/// True when moving `vertex` to its current position folds the surface.
///
/// Faces within two rings of the vertex are tested first. Flagged faces are
/// padded by one ring, cut out, refined once and every face of the result
/// not belonging to the padding is tested again. Returns false as soon as
/// a level is clean and true if faces are still flagged at `max_depth`.
pub fn is_self_intersecting(mesh: &Mesh, vertex: VertexId, max_depth: usize) -> bool {
    let mut current = mesh.clone();
    let mut padding: BTreeSet<FaceId> = BTreeSet::new();

    for level in 0.. {
        let candidates: Vec<FaceId> = if level == 0 {
            current
                .padded_faces([vertex], SELF_INTERSECTION_SEED_RINGS)
                .into_iter()
                .collect()
        } else {
            (0..current.face_count() as FaceId).collect()
        };

        let flagged: BTreeSet<FaceId> = candidates
            .into_iter()
            .filter(|f| !padding.contains(f))
            .filter(|&f| current.face(f).valence != 4 || is_face_folded(&current, f))
            .collect();

        if flagged.is_empty() {
            tracing::trace!(vertex, level, "no fold");
            return false;
        }
        if level >= max_depth {
            tracing::debug!(vertex, level, flagged = flagged.len(), "fold persists");
            return true;
        }

        let flagged_vertices = current.face_vertices(&flagged);
        padding = current
            .padded_faces(flagged_vertices, 1)
            .difference(&flagged)
            .copied()
            .collect();

        let region: BTreeSet<FaceId> = padding.union(&flagged).copied().collect();
        let sub = extract_submesh(&current, &region);
        let refined = catmull_clark(&sub.mesh);

        // Child faces of a refined face are numbered by its half-edges
        padding = padding
            .iter()
            .filter_map(|f| sub.half_edge_map.get(&current.face(*f).side))
            .flat_map(|&side| sub.mesh.face_edges(side))
            .collect();
        current = refined;
    }
    true
}
