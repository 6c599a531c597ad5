//! # Edit Errors
//!
//! Error types for edits, the refinement chain and the editor session.

use config::constants::ConfigError;
use gradient_mesh::{HalfEdgeId, MeshError, VertexId};
use thiserror::Error;

use crate::records::RecordError;

/// Errors that can occur while editing.
#[derive(Debug, Error)]
pub enum EditError {
    /// A mesh operation failed.
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// A record file could not be loaded or saved.
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// A session setting was rejected.
    #[error("Invalid setting: {0}")]
    Config(#[from] ConfigError),

    /// The level has not been computed.
    #[error("Unknown level: {0}")]
    UnknownLevel(usize),

    /// The vertex does not exist at the level.
    #[error("Unknown vertex {vertex} at level {level}")]
    UnknownVertex { level: usize, vertex: VertexId },

    /// The half-edge does not exist at the level.
    #[error("Unknown half-edge {edge} at level {level}")]
    UnknownEdge { level: usize, edge: HalfEdgeId },

    /// The move folds the surface and the session refuses such moves.
    #[error("Moving vertex {vertex} folds the surface")]
    SelfIntersecting { vertex: VertexId },

    /// No mesh is loaded.
    #[error("No model loaded")]
    NoModel,

    /// The operation needs a selection.
    #[error("Nothing selected")]
    NothingSelected,
}

/// Result alias for edit operations.
pub type EditResult<T> = Result<T, EditError>;
