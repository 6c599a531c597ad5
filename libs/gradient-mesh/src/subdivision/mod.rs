//! # Subdivision
//!
//! Refinement operators and the helpers the edit propagator needs to redo
//! part of a refinement.
//!
//! - [`ternary`]: one-shot bootstrap, any polygon mesh to an all-quad mesh
//! - [`catmull_clark`]: uniform quad refinement, applied once per level
//! - [`extract_submesh`]: copy a face subset into its own arena
//!
//! Both refinements write boundary half-edges after face half-edges, keeping
//! the layout invariant of [`Mesh`](crate::Mesh).

mod catmull_clark;
mod submesh;
mod ternary;

pub use catmull_clark::{
    catmull_clark, edge_point_color, edge_point_position, face_point_color, face_point_position,
    refresh_colors, refresh_positions, vertex_point_color, vertex_point_position, CatmullClarkLayout,
    ChildSource,
};
pub use submesh::{extract_submesh, SubMesh};
pub use ternary::ternary;
