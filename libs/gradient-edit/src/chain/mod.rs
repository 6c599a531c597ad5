//! # Refinement Chain
//!
//! The sequence of meshes an editor works on, one [`Level`] per refinement
//! step:
//!
//! ```text
//! input ─ternary→ original[0] ─edits[0]→ edited[0] ─limit→ limit[0]
//!                                  │
//!                            catmull_clark
//!                                  ↓
//!                 original[1] ─edits[1]→ edited[1] ─limit→ limit[1]
//!                                  ⋮
//! ```
//!
//! Deepening only appends levels. Editing mutates existing levels in place
//! through [`RefinementChain::propagate`]. A reload builds a new chain.

mod propagate;

use std::collections::BTreeSet;

use gradient_mesh::limit::limit_mesh;
use gradient_mesh::subdivision::{catmull_clark, ternary, CatmullClarkLayout};
use gradient_mesh::{Mesh, VertexId};

use crate::edit::{validate_color_edit, validate_coords_edit, ColorEdit, CoordsEdit, EditHierarchy};
use crate::error::{EditError, EditResult};

pub use propagate::{color_radius, coords_radius, ChangeSet, Seed, SeedKind};

/// One refinement level.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Refinement of the previous edited mesh, before this level's edits.
    pub original: Mesh,
    /// `original` with this level's edits applied.
    pub edited: Mesh,
    /// `edited` evaluated at its limit positions and colors.
    pub limit: Mesh,
    /// Vertices accepting coordinate and color edits.
    pub editable: BTreeSet<VertexId>,
    /// Vertices accepting coordinate edits only.
    pub gradient: BTreeSet<VertexId>,
    /// Layout of the refinement that produced `original`. `None` at level 0.
    refinement: Option<CatmullClarkLayout>,
}

impl Level {
    fn new(
        original: Mesh,
        refinement: Option<CatmullClarkLayout>,
        edits: &EditHierarchy,
        level: usize,
        input_vertices: u32,
    ) -> Self {
        let edited = crate::edit::edited_mesh(
            &original,
            valid_coords_edits(edits, level, &original),
            valid_color_edits(edits, level, &original),
        );
        let limit = limit_mesh(&edited);
        let editable = editable_vertices(&edited, input_vertices);
        let gradient = (0..edited.vertex_count() as VertexId)
            .filter(|v| !editable.contains(v))
            .collect();

        tracing::debug!(
            level,
            vertices = edited.vertex_count(),
            half_edges = edited.half_edge_count(),
            faces = edited.face_count(),
            "built level"
        );

        Self {
            original,
            edited,
            limit,
            editable,
            gradient,
            refinement,
        }
    }
}

/// Coordinate edits at `level` that reference `mesh`, in key order.
pub(crate) fn valid_coords_edits<'a>(
    edits: &'a EditHierarchy,
    level: usize,
    mesh: &'a Mesh,
) -> impl Iterator<Item = &'a CoordsEdit> + 'a {
    edits.coords_at(level).filter_map(move |(vertex, edit)| {
        match validate_coords_edit(mesh, level, edit) {
            Ok(()) => Some(edit),
            Err(err) => {
                tracing::warn!(level, vertex, %err, "skipping coordinate edit");
                None
            }
        }
    })
}

/// Color edits at `level` that reference `mesh`, in key order.
pub(crate) fn valid_color_edits<'a>(
    edits: &'a EditHierarchy,
    level: usize,
    mesh: &'a Mesh,
) -> impl Iterator<Item = &'a ColorEdit> + 'a {
    edits.colors_at(level).filter_map(move |(edge, edit)| {
        match validate_color_edit(mesh, level, edit) {
            Ok(()) => Some(edit),
            Err(err) => {
                tracing::warn!(level, edge, %err, "skipping color edit");
                None
            }
        }
    })
}

// =============================================================================
// CHAIN
// =============================================================================

/// Original, edited and limit meshes for every computed level.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementChain {
    input_vertices: u32,
    levels: Vec<Level>,
}

impl RefinementChain {
    /// Builds levels `0..=depth` of `input` with `edits` applied.
    pub fn build(input: &Mesh, edits: &EditHierarchy, depth: usize) -> Self {
        let input_vertices = input.vertex_count() as u32;
        let level0 = Level::new(ternary(input), None, edits, 0, input_vertices);
        let mut chain = Self {
            input_vertices,
            levels: vec![level0],
        };
        chain.deepen(depth, edits);
        chain
    }

    /// Appends levels until `depth` is computed. Existing levels are left
    /// untouched.
    pub fn deepen(&mut self, depth: usize, edits: &EditHierarchy) {
        while self.depth() < depth {
            let level = self.levels.len();
            let Some(parent) = self.levels.last() else {
                return;
            };
            let layout = CatmullClarkLayout::new(&parent.edited);
            let original = catmull_clark(&parent.edited);
            let next = Level::new(original, Some(layout), edits, level, self.input_vertices);
            self.levels.push(next);
        }
    }

    /// Deepest computed level.
    pub fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Number of vertices of the input mesh. Both refinements keep these
    /// indices.
    pub fn input_vertex_count(&self) -> u32 {
        self.input_vertices
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, level: usize) -> EditResult<&Level> {
        self.levels.get(level).ok_or(EditError::UnknownLevel(level))
    }

    /// Fails unless `vertex` exists at `level`.
    pub fn check_vertex(&self, level: usize, vertex: VertexId) -> EditResult<()> {
        let mesh = &self.level(level)?.edited;
        if (vertex as usize) < mesh.vertex_count() {
            Ok(())
        } else {
            Err(EditError::UnknownVertex { level, vertex })
        }
    }
}

// =============================================================================
// EDITABLE VERTICES
// =============================================================================

/// Vertices reached from the input vertices by walking three edges straight
/// on along any spoke, repeatedly.
///
/// Along the boundary the walk follows the boundary loop instead.
pub fn editable_vertices(mesh: &Mesh, input_vertices: u32) -> BTreeSet<VertexId> {
    let count = (input_vertices as usize).min(mesh.vertex_count()) as VertexId;
    let mut processed: BTreeSet<VertexId> = (0..count).collect();
    let mut stack: Vec<VertexId> = (0..count).collect();

    while let Some(v) = stack.pop() {
        for e in mesh.spokes(v) {
            let reached = if mesh.face_of(e).is_none() {
                mesh.target(mesh.next(mesh.next(e)))
            } else {
                let second = mesh.next(mesh.twin(mesh.next(e)));
                mesh.target(mesh.next(mesh.twin(mesh.next(second))))
            };
            if processed.insert(reached) {
                stack.push(reached);
            }
        }
    }
    processed
}
