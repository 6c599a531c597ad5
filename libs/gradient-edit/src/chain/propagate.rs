//! # Incremental Propagation
//!
//! Brings a chain up to date after edits changed, touching only a bounded
//! neighbourhood of each change at each level.
//!
//! ## Seeds and radii
//!
//! A [`Seed`] is a vertex where something changed at a given level. Vertex
//! indices survive Catmull-Clark, so the same index keeps describing the
//! seed at every finer level. Each refinement doubles the ring distance a
//! change has spread, so the region around a seed doubles with it:
//!
//! ```text
//! coordinates:  rings = 2 * 2^(L - S)
//! colors:       rings = 3 * 2^(L - S + 1)
//! ```
//!
//! ## Per level
//!
//! 1. Redo the refinement of the parent faces in the previous region.
//! 2. Grow the seed set until it is closed: a coordinate edit in the region
//!    whose result moved, or a color edit whose reach overlaps the region,
//!    becomes a seed itself.
//! 3. Reset the region of the edited mesh from the original and replay the
//!    edits anchored in it, in key order.
//! 4. Re-evaluate the limit mesh inside the region.
//!
//! Every value is produced by the same point rules a full rebuild uses, so
//! the result matches a rebuild exactly.

use std::collections::BTreeSet;

use config::constants::{COLOR_FOOTPRINT_RINGS, COORDS_FOOTPRINT_RINGS};
use gradient_mesh::limit::{refresh_limit_colors, refresh_limit_positions};
use gradient_mesh::subdivision::{refresh_colors, refresh_positions};
use gradient_mesh::{FaceId, HalfEdgeId, Mesh, VertexId};
use serde::{Deserialize, Serialize};

use super::{valid_color_edits, valid_coords_edits, Level, RefinementChain};
use crate::edit::{
    apply_color_edits, apply_coords_edit, color_anchor, color_edit_reach, coords_anchor,
    coords_delta, ColorEdit, EditHierarchy,
};
use crate::error::{EditError, EditResult};

/// What changed at a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeedKind {
    /// A vertex position.
    Coords,
    /// Corner colors or creases around a vertex.
    Color,
}

/// Start of a propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Seed {
    pub level: usize,
    pub vertex: VertexId,
    pub kind: SeedKind,
}

impl Seed {
    pub fn coords(level: usize, vertex: VertexId) -> Self {
        Self {
            level,
            vertex,
            kind: SeedKind::Coords,
        }
    }

    pub fn color(level: usize, vertex: VertexId) -> Self {
        Self {
            level,
            vertex,
            kind: SeedKind::Color,
        }
    }

    /// Rings around the seed recomputed at `level`.
    fn radius(&self, level: usize) -> usize {
        let depth = level - self.level;
        match self.kind {
            SeedKind::Coords => coords_radius(depth),
            SeedKind::Color => color_radius(depth),
        }
    }
}

/// Rings recomputed around a moved vertex, `depth` levels below the edit.
pub fn coords_radius(depth: usize) -> usize {
    COORDS_FOOTPRINT_RINGS << depth
}

/// Rings recomputed around a painted vertex, `depth` levels below the edit.
pub fn color_radius(depth: usize) -> usize {
    COLOR_FOOTPRINT_RINGS << (depth + 1)
}

/// Indices whose values a propagation recomputed at one level, sorted.
///
/// `vertices` carry new positions, `half_edges` new colors and creases, and
/// `faces` is every face touched by either.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub level: usize,
    pub vertices: Vec<VertexId>,
    pub faces: Vec<FaceId>,
    pub half_edges: Vec<HalfEdgeId>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty() && self.half_edges.is_empty()
    }
}

/// Faces recomputed at one level.
#[derive(Debug, Clone, Default)]
struct Region {
    positions: BTreeSet<FaceId>,
    colors: BTreeSet<FaceId>,
}

impl Region {
    fn around(mesh: &Mesh, seeds: &BTreeSet<Seed>, level: usize) -> Self {
        let mut region = Self::default();
        for seed in seeds.iter().filter(|s| s.level <= level) {
            let faces = mesh.padded_faces([seed.vertex], seed.radius(level));
            match seed.kind {
                SeedKind::Coords => region.positions.extend(faces),
                SeedKind::Color => region.colors.extend(faces),
            }
        }
        region
    }

    /// Corners of the position faces.
    fn vertices(&self, mesh: &Mesh) -> BTreeSet<VertexId> {
        mesh.face_vertices(&self.positions)
    }

    /// Half-edges of the color faces and their twins.
    fn half_edges(&self, mesh: &Mesh) -> BTreeSet<HalfEdgeId> {
        let mut half_edges = mesh.face_half_edges(&self.colors);
        let twins: Vec<HalfEdgeId> = half_edges.iter().map(|&h| mesh.twin(h)).collect();
        half_edges.extend(twins);
        half_edges
    }
}

impl RefinementChain {
    /// Recomputes everything that depends on the `seeds`, from the coarsest
    /// seed level down to the deepest computed level.
    ///
    /// `edits` must already hold the new state of the hierarchy. Returns one
    /// [`ChangeSet`] per visited level.
    pub fn propagate(
        &mut self,
        edits: &EditHierarchy,
        seeds: &[Seed],
    ) -> EditResult<Vec<ChangeSet>> {
        for seed in seeds {
            self.check_vertex(seed.level, seed.vertex)?;
        }
        let Some(start) = seeds.iter().map(|s| s.level).min() else {
            return Ok(Vec::new());
        };

        let mut seeds: BTreeSet<Seed> = seeds.iter().copied().collect();
        let mut parent_region: Option<Region> = None;
        let mut changes = Vec::with_capacity(self.depth() + 1 - start);

        for level in start..=self.depth() {
            if let Some(parent_region) = &parent_region {
                self.refine_region(level, parent_region)?;
            }
            let region = self.settle_level(level, edits, &mut seeds)?;
            changes.push(self.refresh_level(level, &region)?);
            parent_region = Some(region);
        }

        tracing::debug!(
            start,
            depth = self.depth(),
            seeds = seeds.len(),
            "propagated edits"
        );
        Ok(changes)
    }

    /// Redoes the refinement of the parent faces in `parent_region`.
    fn refine_region(&mut self, level: usize, parent_region: &Region) -> EditResult<()> {
        let (coarser, finer) = self.levels.split_at_mut(level);
        let parent = &coarser
            .last()
            .ok_or(EditError::UnknownLevel(level.wrapping_sub(1)))?
            .edited;
        let Level {
            original,
            refinement,
            ..
        } = finer.first_mut().ok_or(EditError::UnknownLevel(level))?;
        let Some(layout) = refinement.as_ref() else {
            return Ok(());
        };

        let mut vertices = BTreeSet::new();
        for &f in &parent_region.positions {
            vertices.insert(layout.face_point(f));
            for h in parent.face_edges(parent.face(f).side) {
                vertices.insert(parent.target(h));
                vertices.insert(layout.edge_point(h));
            }
        }
        let vertices: Vec<VertexId> = vertices.into_iter().collect();
        refresh_positions(parent, original, layout, &vertices);
        refresh_colors(parent, original, parent.face_half_edges(&parent_region.colors));

        tracing::trace!(
            level,
            vertices = vertices.len(),
            faces = parent_region.colors.len(),
            "refined region"
        );
        Ok(())
    }

    /// Closes the seed set at `level`, then resets the region of the edited
    /// mesh and replays the edits inside it.
    fn settle_level(
        &mut self,
        level: usize,
        edits: &EditHierarchy,
        seeds: &mut BTreeSet<Seed>,
    ) -> EditResult<Region> {
        let Level {
            original, edited, ..
        } = self
            .levels
            .get_mut(level)
            .ok_or(EditError::UnknownLevel(level))?;

        let (region, vertices, half_edges) = loop {
            let region = Region::around(original, seeds, level);
            let vertices = region.vertices(original);
            let half_edges = region.half_edges(original);

            let mut grown = Vec::new();
            for edit in valid_coords_edits(edits, level, original) {
                let v = coords_anchor(original, edit);
                if !vertices.contains(&v) || is_seeded(seeds, v, level, SeedKind::Coords) {
                    continue;
                }
                let position = original.position(v) + coords_delta(original, edit);
                if position != edited.position(v) {
                    grown.push(Seed::coords(level, v));
                }
            }
            for edit in valid_color_edits(edits, level, original) {
                let v = color_anchor(original, edit);
                if is_seeded(seeds, v, level, SeedKind::Color) {
                    continue;
                }
                if color_edit_reach(original, edit.edge)
                    .iter()
                    .any(|h| half_edges.contains(h))
                {
                    grown.push(Seed::color(level, v));
                }
            }

            if grown.is_empty() {
                break (region, vertices, half_edges);
            }
            tracing::trace!(level, grown = grown.len(), "seed set grown");
            seeds.extend(grown);
        };

        for &v in &vertices {
            edited.vertices[v as usize].position = original.position(v);
        }
        for edit in valid_coords_edits(edits, level, original) {
            if vertices.contains(&coords_anchor(original, edit)) {
                apply_coords_edit(original, edited, edit);
            }
        }

        for &h in &half_edges {
            let source = original.he(h);
            let (color, sharp) = (source.color, source.sharp);
            let target = edited.he_mut(h);
            target.color = color;
            target.sharp = sharp;
        }
        let replayed: Vec<&ColorEdit> = valid_color_edits(edits, level, original)
            .filter(|edit| {
                color_edit_reach(original, edit.edge)
                    .iter()
                    .any(|h| half_edges.contains(h))
            })
            .collect();
        apply_color_edits(edited, replayed);

        Ok(region)
    }

    /// Re-evaluates the limit mesh inside `region` and reports it.
    fn refresh_level(&mut self, level: usize, region: &Region) -> EditResult<ChangeSet> {
        let Level { edited, limit, .. } = self
            .levels
            .get_mut(level)
            .ok_or(EditError::UnknownLevel(level))?;

        let vertices: Vec<VertexId> = region.vertices(edited).into_iter().collect();
        let half_edges: Vec<HalfEdgeId> = region.half_edges(edited).into_iter().collect();

        refresh_limit_positions(edited, limit, vertices.iter().copied());
        refresh_limit_colors(edited, limit, half_edges.iter().copied());
        for &h in &half_edges {
            limit.he_mut(h).sharp = edited.he(h).sharp;
        }

        let faces: Vec<FaceId> = region.positions.union(&region.colors).copied().collect();
        tracing::trace!(
            level,
            vertices = vertices.len(),
            faces = faces.len(),
            half_edges = half_edges.len(),
            "refreshed limit region"
        );
        Ok(ChangeSet {
            level,
            vertices,
            faces,
            half_edges,
        })
    }
}

/// True when a seed of `kind` at `vertex` is active at `level`.
fn is_seeded(seeds: &BTreeSet<Seed>, vertex: VertexId, level: usize, kind: SeedKind) -> bool {
    seeds
        .iter()
        .any(|s| s.vertex == vertex && s.kind == kind && s.level <= level)
}
