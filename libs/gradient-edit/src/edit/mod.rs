//! # Edit Model
//!
//! Coordinate and color edits, keyed by refinement level.
//!
//! An edit at level `L` is stored relative to the *original* mesh of that
//! level, the mesh Catmull-Clark produced before any level-`L` edit was
//! applied. Because the stored parameters are relative to the one-ring of
//! the edited vertex, replaying an edit after a coarser level changed moves
//! the vertex along with its neighbourhood.
//!
//! ## Parameterization
//!
//! ```text
//! interior:  delta = first * vec1 + second * vec2
//! boundary:  angle = atan2(vec1) + first * alpha
//!            |delta|^2 = second * |vec1| * |vec2|
//! ```
//!
//! `vec1` and `vec2` point from the vertex to the targets of two
//! consecutive spokes; `alpha` is the angle of the sector between them.

mod apply;

use std::collections::BTreeMap;

use glam::DVec3;
use gradient_mesh::{HalfEdgeId, Mesh, VertexId};
use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};

pub use apply::{
    apply_color_edits, apply_color_patch, apply_color_sharpness, apply_coords_edit,
    color_anchor, color_edit_reach, compute_coords_edit, coords_anchor, coords_delta,
    edited_mesh, footprint_sides,
};

// =============================================================================
// EDITS
// =============================================================================

/// Displacement of one vertex, relative to its original one-ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordsEdit {
    /// Face half-edge that fixes the sector. Interior edits store the first
    /// spoke of the sector; boundary edits store the twin of the boundary
    /// spoke.
    pub edge: HalfEdgeId,
    /// Weight of `vec1` (interior) or fraction of the sector angle
    /// (boundary).
    pub first: f64,
    /// Weight of `vec2` (interior) or normalized squared length (boundary).
    pub second: f64,
    /// True when the sector lies outside the mesh.
    pub boundary: bool,
    /// Face sides of the two-ring around the vertex at the edit level.
    pub footprint: Vec<HalfEdgeId>,
}

/// Color painted on one face corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEdit {
    /// The painted face half-edge.
    pub edge: HalfEdgeId,
    pub color: DVec3,
    /// Face sides of the three-ring around the origin of `edge`.
    pub footprint: Vec<HalfEdgeId>,
}

impl ColorEdit {
    /// Paints `edge` of `original` with `color` and caches the footprint.
    pub fn new(original: &Mesh, edge: HalfEdgeId, color: DVec3) -> Self {
        Self {
            edge,
            color,
            footprint: footprint_sides(
                original,
                original.origin(edge),
                config::constants::COLOR_FOOTPRINT_RINGS,
            ),
        }
    }
}

/// Direction in which a coordinate drag is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EditFlag {
    /// Move along the drag.
    #[default]
    Apply,
    /// Move against the drag.
    Invert,
}

impl EditFlag {
    /// `+1` or `-1`.
    pub fn sign(self) -> f64 {
        match self {
            EditFlag::Apply => 1.0,
            EditFlag::Invert => -1.0,
        }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Checks that `edit` references a face half-edge of `mesh`.
pub fn validate_coords_edit(mesh: &Mesh, level: usize, edit: &CoordsEdit) -> EditResult<()> {
    validate_face_edge(mesh, level, edit.edge)
}

/// Checks that `edit` references a face half-edge of `mesh`.
pub fn validate_color_edit(mesh: &Mesh, level: usize, edit: &ColorEdit) -> EditResult<()> {
    validate_face_edge(mesh, level, edit.edge)
}

fn validate_face_edge(mesh: &Mesh, level: usize, edge: HalfEdgeId) -> EditResult<()> {
    if (edge as usize) < mesh.face_half_edge_count() {
        Ok(())
    } else {
        Err(EditError::UnknownEdge { level, edge })
    }
}

// =============================================================================
// HIERARCHY
// =============================================================================

/// All edits of a model, per level.
///
/// Coordinate edits are keyed by the edited vertex and color edits by the
/// painted half-edge, both as indices of the mesh at that level. Iteration
/// is always in ascending key order, which is the order edits are applied
/// in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditHierarchy {
    coords: BTreeMap<usize, BTreeMap<VertexId, CoordsEdit>>,
    colors: BTreeMap<usize, BTreeMap<HalfEdgeId, ColorEdit>>,
}

impl EditHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty() && self.colors.is_empty()
    }

    /// Deepest level holding an edit.
    pub fn max_level(&self) -> Option<usize> {
        let coords = self.coords.keys().next_back().copied();
        let colors = self.colors.keys().next_back().copied();
        coords.max(colors)
    }

    pub fn coords_count(&self) -> usize {
        self.coords.values().map(BTreeMap::len).sum()
    }

    pub fn color_count(&self) -> usize {
        self.colors.values().map(BTreeMap::len).sum()
    }

    /// Coordinate edit of `vertex` at `level`.
    pub fn coords_edit(&self, level: usize, vertex: VertexId) -> Option<&CoordsEdit> {
        self.coords.get(&level)?.get(&vertex)
    }

    /// Color edit of `edge` at `level`.
    pub fn color_edit(&self, level: usize, edge: HalfEdgeId) -> Option<&ColorEdit> {
        self.colors.get(&level)?.get(&edge)
    }

    /// Coordinate edits at `level`, by vertex.
    pub fn coords_at(&self, level: usize) -> impl Iterator<Item = (VertexId, &CoordsEdit)> + '_ {
        self.coords
            .get(&level)
            .into_iter()
            .flat_map(|edits| edits.iter().map(|(&v, e)| (v, e)))
    }

    /// Color edits at `level`, by half-edge.
    pub fn colors_at(&self, level: usize) -> impl Iterator<Item = (HalfEdgeId, &ColorEdit)> + '_ {
        self.colors
            .get(&level)
            .into_iter()
            .flat_map(|edits| edits.iter().map(|(&h, e)| (h, e)))
    }

    /// Every coordinate edit as `(level, vertex, edit)`.
    pub fn coords_edits(&self) -> impl Iterator<Item = (usize, VertexId, &CoordsEdit)> + '_ {
        self.coords
            .iter()
            .flat_map(|(&level, edits)| edits.iter().map(move |(&v, e)| (level, v, e)))
    }

    /// Every color edit as `(level, edge, edit)`.
    pub fn color_edits(&self) -> impl Iterator<Item = (usize, HalfEdgeId, &ColorEdit)> + '_ {
        self.colors
            .iter()
            .flat_map(|(&level, edits)| edits.iter().map(move |(&h, e)| (level, h, e)))
    }

    /// Stores `edit` for `vertex`, returning the edit it replaces.
    pub fn insert_coords(
        &mut self,
        level: usize,
        vertex: VertexId,
        edit: CoordsEdit,
    ) -> Option<CoordsEdit> {
        self.coords.entry(level).or_default().insert(vertex, edit)
    }

    /// Stores `edit` under its half-edge, returning the edit it replaces.
    pub fn insert_color(&mut self, level: usize, edit: ColorEdit) -> Option<ColorEdit> {
        self.colors.entry(level).or_default().insert(edit.edge, edit)
    }

    pub fn remove_coords(&mut self, level: usize, vertex: VertexId) -> Option<CoordsEdit> {
        let edits = self.coords.get_mut(&level)?;
        let removed = edits.remove(&vertex);
        if edits.is_empty() {
            self.coords.remove(&level);
        }
        removed
    }

    pub fn remove_color(&mut self, level: usize, edge: HalfEdgeId) -> Option<ColorEdit> {
        let edits = self.colors.get_mut(&level)?;
        let removed = edits.remove(&edge);
        if edits.is_empty() {
            self.colors.remove(&level);
        }
        removed
    }

    /// Edited mesh of `level` from its original mesh.
    pub fn apply(&self, level: usize, original: &Mesh) -> Mesh {
        edited_mesh(
            original,
            self.coords_at(level).map(|(_, e)| e),
            self.colors_at(level).map(|(_, e)| e),
        )
    }
}

#[cfg(test)]
mod tests;
