//! # Mesh and Edit Records
//!
//! Line-based text format for an input mesh and its edits:
//!
//! ```text
//! v x y                                  vertex
//! f i1 i2 ... ik                         face, 1-based, counter-clockwise
//! ve level vertex edge first second b    coordinate edit, b is 0 or 1
//! ce level edge r g b                    color edit
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Loading is all or
//! nothing: any error leaves the caller's state alone because nothing is
//! returned.
//!
//! ## Example
//!
//! ```rust
//! use gradient_edit::records;
//!
//! let text = "v 0 0\nv 1 0\nv 1 1\nv 0 1\nf 1 2 3 4\nce 0 0 1 0 0\n";
//! let model = records::parse(text).unwrap();
//! assert_eq!(model.input.face_count(), 1);
//! assert_eq!(model.edits.color_count(), 1);
//! assert_eq!(records::format(&model.input, &model.edits), text);
//! ```

use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use config::constants::{COLOR_FOOTPRINT_RINGS, COORDS_FOOTPRINT_RINGS};
use glam::{DVec2, DVec3};
use gradient_mesh::subdivision::{catmull_clark, ternary};
use gradient_mesh::{HalfEdgeId, Mesh, MeshError, VertexId};
use thiserror::Error;

use crate::edit::{coords_anchor, footprint_sides, ColorEdit, CoordsEdit, EditHierarchy};

/// Errors raised while reading or writing records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line does not follow the format.
    #[error("Line {line}: cannot parse `{text}`")]
    Parse { line: usize, text: String },

    /// A face refers to a vertex that was never declared.
    #[error("Line {line}: face index {index} out of range")]
    FaceIndex { line: usize, index: usize },

    /// The faces do not form a valid mesh.
    #[error("Invalid mesh: {0}")]
    Mesh(#[from] MeshError),

    /// An edit refers to a half-edge the refined mesh does not have.
    #[error("Edit at level {level} references unknown half-edge {edge}")]
    UnknownEdge { level: usize, edge: HalfEdgeId },
}

/// An input mesh with its edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub input: Mesh,
    pub edits: EditHierarchy,
}

// =============================================================================
// PARSING
// =============================================================================

fn field<T: FromStr>(fields: &[&str], i: usize, line: usize, text: &str) -> Result<T, RecordError> {
    fields
        .get(i)
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| RecordError::Parse {
            line,
            text: text.to_string(),
        })
}

/// Parses a whole file.
///
/// Footprints are recomputed on the unedited refinement chain up to the
/// deepest edit level, since only its topology matters.
pub fn parse(text: &str) -> Result<Model, RecordError> {
    let mut positions: Vec<DVec2> = Vec::new();
    let mut faces: Vec<(usize, Vec<usize>)> = Vec::new();
    let mut coords: Vec<(usize, usize, VertexId, CoordsEdit)> = Vec::new();
    let mut colors: Vec<(usize, ColorEdit)> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let expect_len = |n: usize| {
            if fields.len() == n {
                Ok(())
            } else {
                Err(RecordError::Parse {
                    line,
                    text: trimmed.to_string(),
                })
            }
        };

        match fields[0] {
            "v" => {
                expect_len(3)?;
                positions.push(DVec2::new(
                    field(&fields, 1, line, trimmed)?,
                    field(&fields, 2, line, trimmed)?,
                ));
            }
            "f" => {
                let indices = (1..fields.len())
                    .map(|k| field::<usize>(&fields, k, line, trimmed))
                    .collect::<Result<Vec<_>, _>>()?;
                faces.push((line, indices));
            }
            "ve" => {
                expect_len(7)?;
                let boundary = match field::<u8>(&fields, 6, line, trimmed)? {
                    0 => false,
                    1 => true,
                    _ => {
                        return Err(RecordError::Parse {
                            line,
                            text: trimmed.to_string(),
                        })
                    }
                };
                coords.push((
                    line,
                    field(&fields, 1, line, trimmed)?,
                    field(&fields, 2, line, trimmed)?,
                    CoordsEdit {
                        edge: field(&fields, 3, line, trimmed)?,
                        first: field(&fields, 4, line, trimmed)?,
                        second: field(&fields, 5, line, trimmed)?,
                        boundary,
                        footprint: Vec::new(),
                    },
                ));
            }
            "ce" => {
                expect_len(6)?;
                colors.push((
                    field(&fields, 1, line, trimmed)?,
                    ColorEdit {
                        edge: field(&fields, 2, line, trimmed)?,
                        color: DVec3::new(
                            field(&fields, 3, line, trimmed)?,
                            field(&fields, 4, line, trimmed)?,
                            field(&fields, 5, line, trimmed)?,
                        ),
                        footprint: Vec::new(),
                    },
                ));
            }
            _ => {
                return Err(RecordError::Parse {
                    line,
                    text: trimmed.to_string(),
                })
            }
        }
    }

    let mut polygons = Vec::with_capacity(faces.len());
    for (line, indices) in faces {
        let polygon = indices
            .into_iter()
            .map(|index| {
                if (1..=positions.len()).contains(&index) {
                    Ok((index - 1) as VertexId)
                } else {
                    Err(RecordError::FaceIndex { line, index })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        polygons.push(polygon);
    }
    let input = Mesh::from_polygons(&positions, &polygons)?;

    let max_level = coords
        .iter()
        .map(|(_, level, _, _)| *level)
        .chain(colors.iter().map(|(level, _)| *level))
        .max();
    let mut topology = Vec::new();
    if let Some(max_level) = max_level {
        topology.push(ternary(&input));
        for level in 0..max_level {
            let refined = catmull_clark(&topology[level]);
            topology.push(refined);
        }
    }

    let mut edits = EditHierarchy::new();
    for (line, level, vertex, mut edit) in coords {
        let mesh = level_mesh(&topology, level, edit.edge)?;
        let anchor = coords_anchor(mesh, &edit);
        // The key must name the vertex the edit moves.
        if anchor != vertex {
            return Err(RecordError::Parse {
                line,
                text: format!("ve {level} {vertex} {}: edge moves vertex {anchor}", edit.edge),
            });
        }
        edit.footprint = footprint_sides(mesh, anchor, COORDS_FOOTPRINT_RINGS);
        edits.insert_coords(level, vertex, edit);
    }
    for (level, mut edit) in colors {
        let mesh = level_mesh(&topology, level, edit.edge)?;
        edit.footprint = footprint_sides(mesh, mesh.origin(edit.edge), COLOR_FOOTPRINT_RINGS);
        edits.insert_color(level, edit);
    }

    Ok(Model { input, edits })
}

/// Mesh of `level`, provided `edge` is one of its face half-edges.
fn level_mesh(topology: &[Mesh], level: usize, edge: HalfEdgeId) -> Result<&Mesh, RecordError> {
    topology
        .get(level)
        .filter(|mesh| (edge as usize) < mesh.face_half_edge_count())
        .ok_or(RecordError::UnknownEdge { level, edge })
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Writes `input` and `edits`, edits ordered by level and key.
pub fn format(input: &Mesh, edits: &EditHierarchy) -> String {
    let mut out = String::new();
    for vertex in &input.vertices {
        let _ = writeln!(out, "v {} {}", vertex.position.x, vertex.position.y);
    }
    for face in &input.faces {
        out.push('f');
        for h in input.face_edges(face.side) {
            let _ = write!(out, " {}", input.target(h) + 1);
        }
        out.push('\n');
    }
    for (level, vertex, edit) in edits.coords_edits() {
        let _ = writeln!(
            out,
            "ve {} {} {} {} {} {}",
            level,
            vertex,
            edit.edge,
            edit.first,
            edit.second,
            u8::from(edit.boundary)
        );
    }
    for (level, edge, edit) in edits.color_edits() {
        let _ = writeln!(
            out,
            "ce {} {} {} {} {}",
            level, edge, edit.color.x, edit.color.y, edit.color.z
        );
    }
    out
}

// =============================================================================
// FILES
// =============================================================================

/// Reads and parses a record file.
pub fn load_file(path: impl AsRef<Path>) -> Result<Model, RecordError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let model = parse(&text)?;
    tracing::info!(
        file = %path.display(),
        vertices = model.input.vertex_count(),
        faces = model.input.face_count(),
        coords_edits = model.edits.coords_count(),
        color_edits = model.edits.color_count(),
        "loaded model"
    );
    Ok(model)
}

/// Formats and writes a record file.
pub fn save_file(
    path: impl AsRef<Path>,
    input: &Mesh,
    edits: &EditHierarchy,
) -> Result<(), RecordError> {
    let path = path.as_ref();
    std::fs::write(path, format(input, edits))?;
    tracing::info!(
        file = %path.display(),
        vertices = input.vertex_count(),
        faces = input.face_count(),
        coords_edits = edits.coords_count(),
        color_edits = edits.color_count(),
        "saved model"
    );
    Ok(())
}

#[cfg(test)]
mod tests;
