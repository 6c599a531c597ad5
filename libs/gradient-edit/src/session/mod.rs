//! # Editor Session
//!
//! Explicit editing context: one loaded model, its refinement chain, the
//! current selection and the renderer that displays the view level.
//!
//! Every operation either completes or leaves the session as it was.
//! Renderers are told about changes through [`MeshRenderer`] and only need
//! to re-read the indices they are given.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec2;
//! use gradient_edit::edit::EditFlag;
//! use gradient_edit::session::{EditorSession, NullRenderer};
//! use gradient_mesh::Mesh;
//!
//! let mut session = EditorSession::new(NullRenderer);
//! session.set_input_mesh(Mesh::grid(2, 2, 1.0).unwrap());
//! session.set_edit_level(1);
//! let center = session.chain().unwrap().level(1).unwrap().limit.position(4);
//! session.select_at(center, 1.0).unwrap();
//! session.move_selected_vertex(DVec2::new(0.1, 0.0), EditFlag::Apply).unwrap();
//! assert_eq!(session.edits().coords_count(), 1);
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use config::constants::EditorConfig;
use glam::{DVec2, DVec3};
use gradient_mesh::limit::inverse_limit_position;
use gradient_mesh::validity::is_self_intersecting;
use gradient_mesh::{default_color, HalfEdgeId, Mesh, MeshError, VertexId};

use crate::adaptive::{adaptive_patches, PatchLevel};
use crate::chain::{ChangeSet, RefinementChain, Seed};
use crate::edit::{compute_coords_edit, ColorEdit, EditFlag, EditHierarchy};
use crate::error::{EditError, EditResult};
use crate::records::{self, Model};
use crate::selection::{nearest_vertex, select_sectors};

// =============================================================================
// RENDERER SEAM
// =============================================================================

/// Receives the limit mesh of the view level.
pub trait MeshRenderer {
    /// Replaces the displayed mesh.
    fn set_mesh(&mut self, limit: &Mesh);

    /// Positions of `changes.vertices` moved.
    fn update_mesh_coords(&mut self, limit: &Mesh, changes: &ChangeSet);

    /// Colors and creases of `changes.half_edges` changed.
    fn update_mesh_colors(&mut self, limit: &Mesh, changes: &ChangeSet);
}

/// Renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl MeshRenderer for NullRenderer {
    fn set_mesh(&mut self, _limit: &Mesh) {}

    fn update_mesh_coords(&mut self, _limit: &Mesh, _changes: &ChangeSet) {}

    fn update_mesh_colors(&mut self, _limit: &Mesh, _changes: &ChangeSet) {}
}

/// Which renderer update a propagation calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Update {
    Coords,
    Colors,
}

// =============================================================================
// SESSION
// =============================================================================

/// Editing state for one model.
#[derive(Debug)]
pub struct EditorSession<R: MeshRenderer> {
    input: Option<Mesh>,
    edits: EditHierarchy,
    chain: Option<RefinementChain>,
    edit_level: usize,
    view_level: usize,
    selected_vertex: Option<VertexId>,
    selected_edges: BTreeSet<HalfEdgeId>,
    brush_color: DVec3,
    config: EditorConfig,
    renderer: R,
}

impl<R: MeshRenderer> EditorSession<R> {
    /// Creates an empty session with the default configuration.
    pub fn new(renderer: R) -> Self {
        Self::with_config(renderer, EditorConfig::default())
    }

    pub fn with_config(renderer: R, config: EditorConfig) -> Self {
        Self {
            input: None,
            edits: EditHierarchy::new(),
            chain: None,
            edit_level: 0,
            view_level: 0,
            selected_vertex: None,
            selected_edges: BTreeSet::new(),
            brush_color: default_color(),
            config,
            renderer,
        }
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Replaces the model with the one in `text`. On error the session is
    /// unchanged.
    pub fn load_str(&mut self, text: &str) -> EditResult<()> {
        let model = records::parse(text)?;
        self.install(model);
        Ok(())
    }

    /// Replaces the model with the one stored at `path`. On error the
    /// session is unchanged.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> EditResult<()> {
        let model = records::load_file(path)?;
        self.install(model);
        Ok(())
    }

    /// Writes the input mesh and all edits to `path`.
    pub fn save_file(&self, path: impl AsRef<Path>) -> EditResult<()> {
        let input = self.input.as_ref().ok_or(EditError::NoModel)?;
        records::save_file(path, input, &self.edits)?;
        Ok(())
    }

    /// Starts over from `input` without edits.
    pub fn set_input_mesh(&mut self, input: Mesh) {
        self.install(Model {
            input,
            edits: EditHierarchy::new(),
        });
    }

    fn install(&mut self, model: Model) {
        let depth = self.edit_level.max(self.view_level);
        let chain = RefinementChain::build(&model.input, &model.edits, depth);
        tracing::info!(
            depth,
            vertices = model.input.vertex_count(),
            coords_edits = model.edits.coords_count(),
            color_edits = model.edits.color_count(),
            "installed model"
        );

        self.input = Some(model.input);
        self.edits = model.edits;
        self.chain = Some(chain);
        self.clear_selection();
        self.refresh_view();
    }

    // -------------------------------------------------------------------------
    // Levels
    // -------------------------------------------------------------------------

    /// Level that edits are recorded at. Computes it if needed and clears
    /// the selection, whose indices belong to the old level.
    pub fn set_edit_level(&mut self, level: usize) {
        self.edit_level = level;
        self.deepen(level);
        self.clear_selection();
    }

    /// Level shown by the renderer. Computes it if needed.
    pub fn set_view_level(&mut self, level: usize) {
        self.view_level = level;
        self.deepen(level);
        self.refresh_view();
    }

    fn deepen(&mut self, level: usize) {
        if let Some(chain) = self.chain.as_mut() {
            chain.deepen(level, &self.edits);
        }
    }

    fn refresh_view(&mut self) {
        let Some(chain) = self.chain.as_ref() else {
            return;
        };
        if let Ok(level) = chain.level(self.view_level) {
            self.renderer.set_mesh(&level.limit);
        }
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Selects the vertex nearest to `point` and the corner handles around
    /// it, both on the limit mesh of the edit level. `scale` converts world
    /// distances to screen distances.
    pub fn select_at(&mut self, point: DVec2, scale: f64) -> EditResult<Option<VertexId>> {
        let chain = self.chain.as_ref().ok_or(EditError::NoModel)?;
        let level = chain.level(self.edit_level)?;
        let radius = self.config.brush_radius;

        let candidates = level.editable.iter().chain(&level.gradient).copied();
        self.selected_vertex = nearest_vertex(&level.limit, candidates, point, scale, radius);
        self.selected_edges = select_sectors(&level.limit, &level.editable, point, scale, radius);

        tracing::trace!(
            vertex = ?self.selected_vertex,
            edges = self.selected_edges.len(),
            "selection"
        );
        Ok(self.selected_vertex)
    }

    pub fn clear_selection(&mut self) {
        self.selected_vertex = None;
        self.selected_edges.clear();
    }

    // -------------------------------------------------------------------------
    // Coordinate edits
    // -------------------------------------------------------------------------

    /// Drags the selected vertex so that its limit position moves by
    /// `delta`, reversed for [`EditFlag::Invert`].
    ///
    /// The edit is recorded relative to the original mesh of the edit level
    /// and propagated to every computed level.
    pub fn move_selected_vertex(
        &mut self,
        delta: DVec2,
        flag: EditFlag,
    ) -> EditResult<Vec<ChangeSet>> {
        let v = self.selected_vertex.ok_or(EditError::NothingSelected)?;
        let chain = self.chain.as_ref().ok_or(EditError::NoModel)?;
        chain.check_vertex(self.edit_level, v)?;
        let level = chain.level(self.edit_level)?;

        let destination = level.limit.position(v) + flag.sign() * delta;
        let position = inverse_limit_position(&level.edited, v, destination);

        if self.config.reject_self_intersections {
            let mut probe = level.edited.clone();
            probe.vertices[v as usize].position = position;
            if is_self_intersecting(&probe, v, self.config.max_self_intersection_depth) {
                tracing::debug!(vertex = v, level = self.edit_level, "rejected folding move");
                return Err(EditError::SelfIntersecting { vertex: v });
            }
        }

        let delta = position - level.original.position(v);
        let edit = compute_coords_edit(&level.original, v, delta).ok_or_else(|| {
            MeshError::degenerate(format!("no sector of vertex {v} contains the move"))
        })?;

        self.edits.insert_coords(self.edit_level, v, edit);
        self.propagate(&[Seed::coords(self.edit_level, v)], Update::Coords)
    }

    /// Deletes the coordinate edit of the selected vertex, if any.
    pub fn remove_selected_coords_edit(&mut self) -> EditResult<Vec<ChangeSet>> {
        let v = self.selected_vertex.ok_or(EditError::NothingSelected)?;
        if self.chain.is_none() {
            return Err(EditError::NoModel);
        }
        if self.edits.remove_coords(self.edit_level, v).is_none() {
            return Ok(Vec::new());
        }
        self.propagate(&[Seed::coords(self.edit_level, v)], Update::Coords)
    }

    // -------------------------------------------------------------------------
    // Color edits
    // -------------------------------------------------------------------------

    /// Paints every selected corner with `color`.
    pub fn paint_selected_edges(&mut self, color: DVec3) -> EditResult<Vec<ChangeSet>> {
        if self.selected_edges.is_empty() {
            return Err(EditError::NothingSelected);
        }
        let chain = self.chain.as_ref().ok_or(EditError::NoModel)?;
        let original = &chain.level(self.edit_level)?.original;

        let mut edits = Vec::with_capacity(self.selected_edges.len());
        let mut seeds = Vec::with_capacity(self.selected_edges.len());
        for &edge in &self.selected_edges {
            if (edge as usize) >= original.face_half_edge_count() {
                return Err(EditError::UnknownEdge {
                    level: self.edit_level,
                    edge,
                });
            }
            edits.push(ColorEdit::new(original, edge, color));
            seeds.push(Seed::color(self.edit_level, original.origin(edge)));
        }

        for edit in edits {
            self.edits.insert_color(self.edit_level, edit);
        }
        self.propagate(&seeds, Update::Colors)
    }

    /// Paints the selection with the brush color.
    pub fn paint_with_brush(&mut self) -> EditResult<Vec<ChangeSet>> {
        self.paint_selected_edges(self.brush_color)
    }

    /// Deletes the color edits on the selected corners.
    pub fn clear_selected_color_edits(&mut self) -> EditResult<Vec<ChangeSet>> {
        if self.selected_edges.is_empty() {
            return Err(EditError::NothingSelected);
        }
        let chain = self.chain.as_ref().ok_or(EditError::NoModel)?;
        let original = &chain.level(self.edit_level)?.original;

        let mut seeds = Vec::new();
        for &edge in &self.selected_edges {
            if self.edits.remove_color(self.edit_level, edge).is_some() {
                seeds.push(Seed::color(self.edit_level, original.origin(edge)));
            }
        }
        if seeds.is_empty() {
            return Ok(Vec::new());
        }
        self.propagate(&seeds, Update::Colors)
    }

    fn propagate(&mut self, seeds: &[Seed], update: Update) -> EditResult<Vec<ChangeSet>> {
        let chain = self.chain.as_mut().ok_or(EditError::NoModel)?;
        let changes = chain.propagate(&self.edits, seeds)?;

        let view = changes.iter().find(|c| c.level == self.view_level);
        if let (Some(changes), Ok(level)) = (view, chain.level(self.view_level)) {
            match update {
                Update::Coords => self.renderer.update_mesh_coords(&level.limit, changes),
                Update::Colors => self.renderer.update_mesh_colors(&level.limit, changes),
            }
        }
        Ok(changes)
    }

    // -------------------------------------------------------------------------
    // Patches
    // -------------------------------------------------------------------------

    /// Feature-adaptive patch partition of the current model.
    pub fn adaptive_patches(&self) -> EditResult<Vec<PatchLevel>> {
        let chain = self.chain.as_ref().ok_or(EditError::NoModel)?;
        Ok(adaptive_patches(&chain.level(0)?.original, &self.edits))
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn input(&self) -> Option<&Mesh> {
        self.input.as_ref()
    }

    pub fn edits(&self) -> &EditHierarchy {
        &self.edits
    }

    pub fn chain(&self) -> Option<&RefinementChain> {
        self.chain.as_ref()
    }

    pub fn edit_level(&self) -> usize {
        self.edit_level
    }

    pub fn view_level(&self) -> usize {
        self.view_level
    }

    pub fn selected_vertex(&self) -> Option<VertexId> {
        self.selected_vertex
    }

    pub fn selected_edges(&self) -> &BTreeSet<HalfEdgeId> {
        &self.selected_edges
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Validated through [`EditorConfig::new`].
    pub fn set_brush_radius(&mut self, radius: f64) -> EditResult<()> {
        self.config = EditorConfig::new(
            radius,
            self.config.max_self_intersection_depth,
            self.config.reject_self_intersections,
        )?;
        Ok(())
    }

    pub fn brush_color(&self) -> DVec3 {
        self.brush_color
    }

    pub fn set_brush_color(&mut self, color: DVec3) {
        self.brush_color = color;
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
mod tests;
