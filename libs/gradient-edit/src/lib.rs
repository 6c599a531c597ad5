//! # Gradient Edit
//!
//! Multi-resolution editing of gradient meshes: coordinate and color edits
//! recorded per refinement level, kept consistent across finer levels by
//! incremental propagation.
//!
//! ## Architecture
//!
//! ```text
//! records ──parse──→ Model { input, edits }
//!                          ↓
//!                   RefinementChain ──propagate(seeds)──→ ChangeSet per level
//!                          ↓                                   ↓
//!                   EditorSession ─────────────────────→ MeshRenderer
//!                          ↓
//!                   adaptive_patches → PatchLevel per level
//! ```
//!
//! ## Modules
//!
//! - [`edit`]: edit records, their parameterization and replay
//! - [`chain`]: original / edited / limit meshes per level, propagation
//! - [`adaptive`]: feature-adaptive patch partition
//! - [`selection`]: vertex and corner picking
//! - [`records`]: text format for meshes and edits
//! - [`session`]: editing context with the renderer seam
//!
//! ## Usage
//!
//! ```rust
//! use glam::DVec3;
//! use gradient_edit::chain::{RefinementChain, Seed};
//! use gradient_edit::edit::{ColorEdit, EditHierarchy};
//! use gradient_mesh::Mesh;
//!
//! let input = Mesh::grid(1, 1, 1.0).unwrap();
//! let mut edits = EditHierarchy::new();
//! let mut chain = RefinementChain::build(&input, &edits, 2);
//!
//! let original = &chain.level(0).unwrap().original;
//! let edit = ColorEdit::new(original, 0, DVec3::new(1.0, 0.0, 0.0));
//! let seed = Seed::color(0, original.origin(0));
//! edits.insert_color(0, edit);
//!
//! let changes = chain.propagate(&edits, &[seed]).unwrap();
//! assert_eq!(changes.len(), 3);
//! assert!(changes.iter().all(|c| !c.half_edges.is_empty()));
//! ```

pub mod adaptive;
pub mod chain;
pub mod edit;
pub mod error;
pub mod records;
pub mod selection;
pub mod session;

pub use chain::{ChangeSet, RefinementChain, Seed, SeedKind};
pub use edit::{ColorEdit, CoordsEdit, EditFlag, EditHierarchy};
pub use error::{EditError, EditResult};
pub use records::{Model, RecordError};
pub use session::{EditorSession, MeshRenderer, NullRenderer};
