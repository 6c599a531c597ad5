//! # Config Crate
//!
//! Centralized configuration constants for the gradient mesh editor.
//! All ring paddings, recursion limits, default colors and tolerances are
//! defined here so the mesh and edit crates agree on them.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{COORDS_FOOTPRINT_RINGS, EPSILON};
//!
//! // Guard a division by a vanishing edge length
//! let length: f64 = 1e-12;
//! assert!(length < EPSILON);
//!
//! // A coordinate edit caches the faces of its two-ring
//! assert_eq!(COORDS_FOOTPRINT_RINGS, 2);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Validated Snapshots**: Runtime settings go through [`constants::EditorConfig::new`]
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;
