//! # Feature-Adaptive Patches
//!
//! Partitions a model into patches across a shrinking sequence of
//! sub-meshes. Faces far from irregularities and from finer edits are
//! emitted at the coarsest level that represents them; the rest is
//! extracted, refined once more and visited again.
//!
//! ## Per iteration
//!
//! ```text
//! edited = current + edits[0]
//! affected = footprints of finer edits ∪ non-quads ∪ neighbours of non-quads
//!            cascaded through irregular corners
//! emit every face that is neither affected nor padding
//! current = catmull_clark(submesh(affected + one vertex ring))
//! edits[k] → edits[k - 1], remapped into the sub-mesh
//! ```
//!
//! Refined child indices keep their parent's index in the top base-4 digits,
//! which is what makes the remapping a digit swap.

use std::collections::BTreeSet;

use gradient_mesh::limit::{
    irregular_patch, is_regular_face, is_regular_vertex, regular_patch, transition_patch,
};
use gradient_mesh::subdivision::{catmull_clark, extract_submesh, SubMesh};
use gradient_mesh::{FaceId, HalfEdgeId, Mesh, Patch};
use serde::{Deserialize, Serialize};

use crate::edit::{edited_mesh, ColorEdit, CoordsEdit, EditHierarchy};

/// Patches emitted while visiting one refinement level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchLevel {
    pub level: usize,
    pub patches: Vec<Patch>,
}

// =============================================================================
// INDEX ARITHMETIC
// =============================================================================

fn child_span(levels: usize) -> HalfEdgeId {
    4u32.saturating_pow(levels as u32)
}

/// Half-edge `levels` refinements up that `index` descends from.
pub fn parent_edge_index(index: HalfEdgeId, levels: usize) -> HalfEdgeId {
    index / child_span(levels)
}

/// Replaces the ancestor of `child` `levels` refinements up with `parent`,
/// keeping the path below it.
pub fn swap_parent_edge_index(child: HalfEdgeId, parent: HalfEdgeId, levels: usize) -> HalfEdgeId {
    let span = child_span(levels);
    parent.saturating_mul(span).saturating_add(child % span)
}

// =============================================================================
// FACE SETS
// =============================================================================

/// Edits still to come, with levels relative to the mesh being visited.
#[derive(Debug, Clone, Default)]
struct PendingEdits {
    coords: Vec<(usize, CoordsEdit)>,
    colors: Vec<(usize, ColorEdit)>,
}

impl PendingEdits {
    fn from_hierarchy(edits: &EditHierarchy) -> Self {
        Self {
            coords: edits
                .coords_edits()
                .map(|(level, _, edit)| (level, edit.clone()))
                .collect(),
            colors: edits
                .color_edits()
                .map(|(level, _, edit)| (level, edit.clone()))
                .collect(),
        }
    }

    fn max_level(&self) -> usize {
        self.coords
            .iter()
            .map(|(level, _)| *level)
            .chain(self.colors.iter().map(|(level, _)| *level))
            .max()
            .unwrap_or(0)
    }

    /// Footprint sides of every edit below the current level.
    fn finer_footprints(&self) -> impl Iterator<Item = (usize, HalfEdgeId)> + '_ {
        let coords = self
            .coords
            .iter()
            .filter(|(level, _)| *level > 0)
            .flat_map(|(level, edit)| edit.footprint.iter().map(move |&h| (*level, h)));
        let colors = self
            .colors
            .iter()
            .filter(|(level, _)| *level > 0)
            .flat_map(|(level, edit)| edit.footprint.iter().map(move |&h| (*level, h)));
        coords.chain(colors)
    }

    /// `current` with the edits of the current level applied.
    fn apply(&self, current: &Mesh, iteration: usize) -> Mesh {
        let face_half_edges = current.face_half_edge_count();
        let in_range = |edge: HalfEdgeId| {
            let ok = (edge as usize) < face_half_edges;
            if !ok {
                tracing::warn!(iteration, edge, "skipping edit outside the sub-mesh");
            }
            ok
        };
        edited_mesh(
            current,
            self.coords
                .iter()
                .filter(|(level, edit)| *level == 0 && in_range(edit.edge))
                .map(|(_, edit)| edit),
            self.colors
                .iter()
                .filter(|(level, edit)| *level == 0 && in_range(edit.edge))
                .map(|(_, edit)| edit),
        )
    }

    /// Moves every finer edit one level up, into the numbering of `sub`.
    /// Edits whose ancestor is not part of the sub-mesh are dropped.
    fn descend(self, sub: &SubMesh, iteration: usize) -> Self {
        let remap = |edge: HalfEdgeId, level: usize| {
            let parent = parent_edge_index(edge, level);
            let mapped = sub.half_edge_map.get(&parent).copied();
            if mapped.is_none() {
                tracing::warn!(iteration, level, edge, "edit ancestor outside the sub-mesh");
            }
            mapped.map(|p| swap_parent_edge_index(edge, p, level))
        };
        let remap_footprint = |footprint: &[HalfEdgeId], level: usize| -> Vec<HalfEdgeId> {
            footprint.iter().filter_map(|&h| remap(h, level)).collect()
        };

        let coords = self
            .coords
            .into_iter()
            .filter(|(level, _)| *level > 0)
            .filter_map(|(level, mut edit)| {
                edit.edge = remap(edit.edge, level)?;
                edit.footprint = remap_footprint(&edit.footprint, level);
                Some((level - 1, edit))
            })
            .collect();
        let colors = self
            .colors
            .into_iter()
            .filter(|(level, _)| *level > 0)
            .filter_map(|(level, mut edit)| {
                edit.edge = remap(edit.edge, level)?;
                edit.footprint = remap_footprint(&edit.footprint, level);
                Some((level - 1, edit))
            })
            .collect();
        Self { coords, colors }
    }
}

/// Faces that cannot be emitted at this level.
fn affected_faces(mesh: &Mesh, pending: &PendingEdits) -> BTreeSet<FaceId> {
    let mut affected: BTreeSet<FaceId> = pending
        .finer_footprints()
        .filter_map(|(level, h)| {
            let parent = parent_edge_index(h, level);
            ((parent as usize) < mesh.half_edge_count())
                .then(|| mesh.face_of(parent))
                .flatten()
        })
        .collect();
    affected.extend(
        (0..mesh.face_count() as FaceId)
            .filter(|&f| mesh.face(f).valence != 4 || mesh.has_irregular_neighbour(f)),
    );
    cascade_irregular(mesh, affected)
}

/// Closes `faces` under adding every face around one of their irregular
/// corners.
fn cascade_irregular(mesh: &Mesh, faces: BTreeSet<FaceId>) -> BTreeSet<FaceId> {
    let mut stack: Vec<FaceId> = faces.iter().copied().collect();
    let mut cascaded = faces;
    while let Some(f) = stack.pop() {
        for h in mesh.face_edges(mesh.face(f).side) {
            if is_regular_vertex(mesh, h) {
                continue;
            }
            for e in mesh.vertex_edges(h) {
                if let Some(g) = mesh.face_of(e) {
                    if cascaded.insert(g) {
                        stack.push(g);
                    }
                }
            }
        }
    }
    cascaded
}

/// Every face touching a corner of `faces`.
fn padded(mesh: &Mesh, faces: &BTreeSet<FaceId>) -> BTreeSet<FaceId> {
    mesh.padded_faces(mesh.face_vertices(faces), 1)
}

/// Edges of `f` whose twin face is affected.
fn transition_edges(mesh: &Mesh, f: FaceId, affected: &BTreeSet<FaceId>) -> BTreeSet<HalfEdgeId> {
    mesh.face_edges(mesh.face(f).side)
        .filter(|&h| {
            mesh.face_of(mesh.twin(h))
                .is_some_and(|g| affected.contains(&g))
        })
        .collect()
}

/// Child faces of the padding faces, after refining the sub-mesh.
fn refined_padding(
    mesh: &Mesh,
    sub: &SubMesh,
    padding: impl Iterator<Item = FaceId>,
) -> BTreeSet<FaceId> {
    let mut children = BTreeSet::new();
    for f in padding {
        let Some(&side) = sub.half_edge_map.get(&mesh.face(f).side) else {
            continue;
        };
        children.extend(sub.mesh.face_edges(side));
    }
    children
}

// =============================================================================
// PARTITION
// =============================================================================

/// Patches for the whole model, coarsest level first.
///
/// `original` is the unedited level-0 mesh. The loop stops when the sub-mesh
/// runs out of faces or after `max edit level + 2` iterations; the last
/// iteration emits its affected faces as well, since irregular corners
/// never become regular.
///
/// On quad meshes the partition is exact: every face of `original` is
/// covered once, by itself or by descendants at a single level each.
pub fn adaptive_patches(original: &Mesh, edits: &EditHierarchy) -> Vec<PatchLevel> {
    let mut pending = PendingEdits::from_hierarchy(edits);
    let last = pending.max_level() + 1;

    let mut current = original.clone();
    let mut padding: BTreeSet<FaceId> = BTreeSet::new();
    let mut levels = Vec::new();

    for iteration in 0..=last {
        if current.face_count() == 0 {
            break;
        }
        let mesh = pending.apply(&current, iteration);
        // Padding was emitted one level up and must not be refined again.
        let affected: BTreeSet<FaceId> = if iteration == last {
            BTreeSet::new()
        } else {
            affected_faces(&mesh, &pending)
                .difference(&padding)
                .copied()
                .collect()
        };

        let patches: Vec<Patch> = (0..mesh.face_count() as FaceId)
            .filter(|f| !affected.contains(f) && !padding.contains(f))
            .map(|f| {
                let edges = transition_edges(&mesh, f, &affected);
                if !edges.is_empty() {
                    transition_patch(&mesh, f, &edges)
                } else if is_regular_face(&mesh, f) {
                    regular_patch(&mesh, f)
                } else {
                    irregular_patch(&mesh, f)
                }
            })
            .collect();

        tracing::debug!(
            iteration,
            faces = mesh.face_count(),
            affected = affected.len(),
            patches = patches.len(),
            "adaptive level"
        );
        levels.push(PatchLevel {
            level: iteration,
            patches,
        });

        if affected.is_empty() {
            break;
        }

        let region = padded(&mesh, &affected);
        let sub = extract_submesh(&mesh, &region);
        padding = refined_padding(&mesh, &sub, region.difference(&affected).copied());
        pending = pending.descend(&sub, iteration);
        current = catmull_clark(&sub.mesh);
    }
    levels
}
