//! # Gradient Mesh
//!
//! Half-edge meshes for 2D color gradients, their refinement and the
//! analytic approximation of the limit surface.
//!
//! ## Architecture
//!
//! ```text
//! polygons → Mesh ─ternary→ level 0 ─catmull_clark→ level 1 → ...
//!                               ↓                       ↓
//!                          limit_mesh              limit_mesh
//! ```
//!
//! ## Modules
//!
//! - [`mesh`]: arena records, construction from polygons, validation
//! - [`topology`]: face loops, vertex stars, boundary and sharp walks
//! - [`subdivision`]: ternary bootstrap, Catmull-Clark, sub-mesh extraction
//! - [`limit`]: limit points, ACC1/ACC2 control nets, patch classification
//! - [`validity`]: recursive fold detection around a moved vertex
//!
//! ## Usage
//!
//! ```rust
//! use gradient_mesh::{limit::limit_mesh, subdivision::{catmull_clark, ternary}, Mesh};
//!
//! let input = Mesh::grid(1, 1, 1.0).unwrap();
//! let level0 = ternary(&input);
//! let level1 = catmull_clark(&level0);
//! let limit = limit_mesh(&level1);
//! assert_eq!(limit.vertex_count(), level1.vertex_count());
//! ```

pub mod error;
pub mod limit;
pub mod mesh;
pub mod subdivision;
pub mod topology;
pub mod validity;

pub use error::{MeshError, MeshResult};
pub use limit::{ControlPoint, Patch, PatchKind, Scheme};
pub use mesh::{default_color, Face, FaceId, HalfEdge, HalfEdgeId, Mesh, Vertex, VertexId};
