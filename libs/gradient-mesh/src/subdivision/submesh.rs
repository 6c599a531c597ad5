//! # Sub-Mesh Extraction
//!
//! Copies a subset of faces into a fresh arena. Half-edges on the border of
//! the subset become boundary half-edges of the new mesh.

use std::collections::{BTreeMap, BTreeSet};

use crate::mesh::{Face, FaceId, HalfEdge, HalfEdgeId, Mesh, Vertex, VertexId};

/// Result of [`extract_submesh`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubMesh {
    /// The extracted arena.
    pub mesh: Mesh,
    /// Old half-edge index to new half-edge index.
    pub half_edge_map: BTreeMap<HalfEdgeId, HalfEdgeId>,
    /// Old face index to new face index.
    pub face_map: BTreeMap<FaceId, FaceId>,
}

/// Extracts `faces` from `mesh`.
///
/// Faces keep their ascending order. Vertices and face half-edges are
/// numbered in the order the face loops visit them, then the twins on the
/// border of the set are appended as boundary half-edges. Colors and sharp
/// marks are copied; valences are recounted.
pub fn extract_submesh(mesh: &Mesh, faces: &BTreeSet<FaceId>) -> SubMesh {
    let face_map: BTreeMap<FaceId, FaceId> = faces
        .iter()
        .enumerate()
        .map(|(i, &f)| (f, i as FaceId))
        .collect();
    let in_set = |h: HalfEdgeId| mesh.face_of(h).is_some_and(|f| face_map.contains_key(&f));

    let mut vertex_map: BTreeMap<VertexId, VertexId> = BTreeMap::new();
    let mut vertex_order: Vec<VertexId> = Vec::new();
    let mut half_edge_map: BTreeMap<HalfEdgeId, HalfEdgeId> = BTreeMap::new();
    let mut half_edge_order: Vec<HalfEdgeId> = Vec::new();

    for &f in faces {
        for h in mesh.face_edges(mesh.face(f).side) {
            let v = mesh.target(h);
            if !vertex_map.contains_key(&v) {
                vertex_map.insert(v, vertex_order.len() as VertexId);
                vertex_order.push(v);
            }
            half_edge_map.insert(h, half_edge_order.len() as HalfEdgeId);
            half_edge_order.push(h);
        }
    }
    for &f in faces {
        for h in mesh.face_edges(mesh.face(f).side) {
            let twin = mesh.twin(h);
            if !half_edge_map.contains_key(&twin) {
                half_edge_map.insert(twin, half_edge_order.len() as HalfEdgeId);
                half_edge_order.push(twin);
            }
        }
    }

    let map_he = |h: HalfEdgeId| half_edge_map.get(&h).copied().unwrap_or_default();

    let mut half_edges = Vec::with_capacity(half_edge_order.len());
    let mut valences = vec![0u32; vertex_order.len()];
    for &h in &half_edge_order {
        let source = mesh.he(h);
        let target = vertex_map.get(&source.target).copied().unwrap_or_default();
        valences[target as usize] += 1;

        let (next, prev, face) = if in_set(h) {
            (
                map_he(source.next),
                map_he(source.prev),
                source.face.and_then(|f| face_map.get(&f).copied()),
            )
        } else {
            (
                map_he(border_walk(mesh, source.next, &in_set, |e| mesh.next(e))),
                map_he(border_walk(mesh, source.prev, &in_set, |e| mesh.prev(e))),
                None,
            )
        };

        half_edges.push(HalfEdge {
            target,
            next,
            prev,
            twin: map_he(source.twin),
            face,
            color: source.color,
            sharp: source.sharp,
        });
    }

    let vertices = vertex_order
        .iter()
        .zip(&valences)
        .map(|(&v, &valence)| {
            let mut out = mesh.out(v);
            for _ in 0..mesh.valence(v) {
                if in_set(out) {
                    break;
                }
                out = mesh.twin(mesh.prev(out));
            }
            Vertex {
                position: mesh.position(v),
                out: map_he(out),
                valence,
            }
        })
        .collect();

    let new_faces = faces
        .iter()
        .map(|&f| {
            let face = mesh.face(f);
            Face {
                side: map_he(face.side),
                valence: face.valence,
            }
        })
        .collect();

    tracing::trace!(
        faces = faces.len(),
        vertices = vertex_order.len(),
        half_edges = half_edge_order.len(),
        "extracted sub-mesh"
    );

    SubMesh {
        mesh: Mesh {
            vertices,
            half_edges,
            faces: new_faces,
        },
        half_edge_map,
        face_map,
    }
}

/// Rotates around the vertex shared with `start` until reaching a half-edge
/// whose twin lies in the set. `step` is `next` for the successor walk and
/// `prev` for the predecessor walk.
fn border_walk<F, S>(mesh: &Mesh, start: HalfEdgeId, in_set: &F, step: S) -> HalfEdgeId
where
    F: Fn(HalfEdgeId) -> bool,
    S: Fn(HalfEdgeId) -> HalfEdgeId,
{
    let mut e = start;
    let bound = mesh.half_edge_count();
    for _ in 0..bound {
        if in_set(mesh.twin(e)) {
            break;
        }
        e = step(mesh.twin(e));
    }
    e
}
