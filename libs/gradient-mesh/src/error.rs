//! # Mesh Errors
//!
//! Error types for mesh construction and topology validation.

use thiserror::Error;

use crate::mesh::{FaceId, HalfEdgeId, VertexId};

/// Errors that can occur while building or validating a mesh.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// A vertex index is outside the vertex arena.
    #[error("Invalid vertex reference: {0}")]
    InvalidVertex(VertexId),

    /// A half-edge index is outside the half-edge arena.
    #[error("Invalid half-edge reference: {0}")]
    InvalidHalfEdge(HalfEdgeId),

    /// A face index is outside the face arena.
    #[error("Invalid face reference: {0}")]
    InvalidFace(FaceId),

    /// Broken connectivity (unpaired edges, bad loops, isolated vertices).
    #[error("Invalid topology: {message}")]
    InvalidTopology { message: String },

    /// Geometry that a stencil cannot handle.
    #[error("Degenerate geometry: {message}")]
    DegenerateGeometry { message: String },
}

impl MeshError {
    /// Creates an invalid topology error.
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            message: message.into(),
        }
    }
}

/// Result alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
