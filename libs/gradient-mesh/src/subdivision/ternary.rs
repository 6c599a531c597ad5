//! # Ternary Bootstrap
//!
//! One-shot split of an arbitrary polygon mesh into an all-quad mesh with
//! every edge cut in three.
//!
//! ## Index layout
//!
//! With `V` parent vertices, `H` parent half-edges and `S` face half-edges:
//!
//! ```text
//! vertices:    a = v                 (0..V)
//!              b = V + h             (one per half-edge, 1/3 along it)
//!              c = V + H + h         (one per face corner, inside the face)
//! half-edges:  9h + k, k in 0..9     (face half-edge h)
//!              6S + 3h + k, k in 0..3 (boundary half-edge h)
//! faces:       2h, 2h + 1            (the two quads along face half-edge h)
//!              2S + f                (the shrunken copy of face f)
//! ```
//!
//! ```text
//!       |  8  |
//! *-----c-----*-----*
//! |     |  7  |     |
//! |    3|4   5|6    |
//! |  0  |  1  |  2  |
//! a-----b-----*-----*
//!  --------h------->
//! ```

use glam::DVec2;

use crate::mesh::{Face, HalfEdge, HalfEdgeId, Mesh, Vertex, VertexId};

/// Splits every face of `parent` into quads.
///
/// A face of valence `n` becomes `2n` quads around its edges plus one
/// shrunken `n`-gon in the middle, so only the middle faces keep the input
/// valence. Half-edge colors are carried to the matching children; sharp
/// marks are not.
pub fn ternary(parent: &Mesh) -> Mesh {
    let nv = parent.vertex_count() as u32;
    let nh = parent.half_edge_count() as u32;
    let sfv = parent.face_half_edge_count() as u32;

    let b = |h: HalfEdgeId| -> VertexId { nv + h };
    let c = |h: HalfEdgeId| -> VertexId { nv + nh + h };
    // Child `k` of parent half-edge `h`, boundary or not
    let child = |h: HalfEdgeId, k: u32| -> HalfEdgeId {
        if parent.face_of(h).is_some() {
            9 * h + k
        } else {
            6 * sfv + 3 * h + k
        }
    };

    let mut vertices = Vec::with_capacity((nv + nh + sfv) as usize);

    for v in 0..nv {
        let vertex = parent.vertex(v);
        vertices.push(Vertex {
            position: vertex.position,
            out: 9 * vertex.out,
            valence: vertex.valence,
        });
    }

    for h in 0..nh {
        let p0 = parent.origin_position(h);
        let p3 = parent.target_position(h);
        let twin = parent.twin(h);
        vertices.push(Vertex {
            position: p0 + (p3 - p0) / 3.0,
            out: if parent.face_of(h).is_some() {
                9 * h + 1
            } else {
                9 * twin + 2
            },
            valence: if parent.is_boundary_edge(h) { 3 } else { 4 },
        });
    }

    // Face corners are visited in half-edge order so that `c(h)` lands at
    // index V + H + h.
    for h in 0..sfv {
        vertices.push(Vertex {
            position: corner_point(parent, h),
            out: 9 * h + 8,
            valence: 4,
        });
    }

    let mut half_edges = vec![HalfEdge::new(0); (6 * sfv + 3 * nh) as usize];
    let mut set = |idx: HalfEdgeId, target, next, prev, twin, face, color| {
        half_edges[idx as usize] = HalfEdge {
            target,
            next,
            prev,
            twin,
            face: Some(face),
            color,
            sharp: false,
        };
    };

    for e in 0..sfv {
        let next = parent.next(e);
        let prev = parent.prev(e);
        let twin = parent.twin(e);
        let ce = parent.color(e);
        let cn = parent.color(next);
        let face = parent.face_of(e).unwrap_or_default();

        set(9 * e, b(e), 9 * e + 3, 9 * prev + 2, child(twin, 2), 2 * e, ce);
        set(9 * e + 1, b(twin), 9 * e + 5, 9 * e + 4, child(twin, 1), 2 * e + 1, ce);
        set(9 * e + 2, parent.target(e), 9 * next, 9 * e + 6, child(twin, 0), 2 * next, cn);
        set(9 * e + 3, c(e), 9 * prev + 6, 9 * e, 9 * e + 4, 2 * e, ce);
        set(9 * e + 4, b(e), 9 * e + 1, 9 * e + 7, 9 * e + 3, 2 * e + 1, ce);
        set(9 * e + 5, c(next), 9 * e + 7, 9 * e + 1, 9 * e + 6, 2 * e + 1, cn);
        set(9 * e + 6, b(twin), 9 * e + 2, 9 * next + 3, 9 * e + 5, 2 * next, cn);
        set(9 * e + 7, c(e), 9 * e + 4, 9 * e + 5, 9 * e + 8, 2 * e + 1, cn);
        set(9 * e + 8, c(next), 9 * next + 8, 9 * prev + 8, 9 * e + 7, 2 * sfv + face, ce);
    }

    for e in sfv..nh {
        let base = 6 * sfv + 3 * e;
        let twin = parent.twin(e);
        let links = [
            (b(e), base + 1, 6 * sfv + 3 * parent.prev(e) + 2, 9 * twin + 2),
            (b(twin), base + 2, base, 9 * twin + 1),
            (parent.target(e), 6 * sfv + 3 * parent.next(e), base + 1, 9 * twin),
        ];
        for (k, (target, next, prev, twin)) in links.into_iter().enumerate() {
            let he = &mut half_edges[(base + k as u32) as usize];
            *he = HalfEdge::new(target);
            he.next = next;
            he.prev = prev;
            he.twin = twin;
        }
    }

    let mut faces = Vec::with_capacity((2 * sfv) as usize + parent.face_count());
    for e in 0..sfv {
        faces.push(Face {
            side: 9 * e,
            valence: 4,
        });
        faces.push(Face {
            side: 9 * e + 1,
            valence: 4,
        });
    }
    for face in &parent.faces {
        faces.push(Face {
            side: 9 * face.side + 8,
            valence: face.valence,
        });
    }

    tracing::trace!(
        vertices = vertices.len(),
        half_edges = half_edges.len(),
        faces = faces.len(),
        "ternary split"
    );

    Mesh {
        vertices,
        half_edges,
        faces,
    }
}

/// Interior point near the origin corner of face half-edge `h`.
///
/// A bilinear blend of the corner, the face centroid and the midpoints of
/// the two face edges meeting at the corner, weighted by how far the
/// one-third points sit along those edges.
fn corner_point(parent: &Mesh, h: HalfEdgeId) -> DVec2 {
    let center = parent.mean_face_position(parent.face(parent.face_of(h).unwrap_or_default()).side);
    let v0 = parent.origin_position(h);
    let v1 = parent.target_position(h);
    let v2 = parent.origin_position(parent.prev(h));

    let d1 = (v1 - v0) / 3.0;
    let d2 = (v2 - v0) / 3.0;
    let l1 = (v0 - v1).length();
    let l2 = (v0 - v2).length();
    let e1 = v0 + l1 * d1.normalize_or_zero() / 2.0;
    let e2 = v0 + l2 * d2.normalize_or_zero() / 2.0;
    let t1 = ratio(2.0 * d1.length(), l1);
    let t2 = ratio(2.0 * d2.length(), l2);

    (1.0 - t1) * (1.0 - t2) * v0 + t1 * t2 * center + t2 * (1.0 - t1) * e1 + t1 * (1.0 - t2) * e2
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > config::constants::EPSILON {
        numerator / denominator
    } else {
        0.0
    }
}
