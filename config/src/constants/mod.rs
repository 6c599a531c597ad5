//! Centralized configuration values shared across the gradient mesh crates.
//!
//! Each public item in this module documents its purpose and provides a minimal
//! usage example so that downstream crates can remain declarative and avoid
//! scattering literals.

use std::fmt;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for degenerate-length guards.
///
/// Edge lengths and determinants below this value are treated as zero.
///
/// # Examples
/// ```
/// use config::constants::EPSILON;
/// assert!(EPSILON < 1.0e-6);
/// ```
pub const EPSILON: f64 = 1e-10;

// =============================================================================
// EDIT FOOTPRINTS
// =============================================================================

/// Face rings around the edited vertex cached as a coordinate edit footprint.
///
/// # Examples
/// ```
/// use config::constants::COORDS_FOOTPRINT_RINGS;
/// assert_eq!(COORDS_FOOTPRINT_RINGS, 2);
/// ```
pub const COORDS_FOOTPRINT_RINGS: usize = 2;

/// Face rings around the origin of the edited half-edge cached as a color
/// edit footprint.
///
/// # Examples
/// ```
/// use config::constants::{COLOR_FOOTPRINT_RINGS, COORDS_FOOTPRINT_RINGS};
/// assert!(COLOR_FOOTPRINT_RINGS > COORDS_FOOTPRINT_RINGS);
/// ```
pub const COLOR_FOOTPRINT_RINGS: usize = 3;

// =============================================================================
// VALIDITY CHECK
// =============================================================================

/// Maximum refinement depth of the recursive self-intersection check.
///
/// # Examples
/// ```
/// use config::constants::MAX_SELF_INTERSECTION_DEPTH;
/// assert_eq!(MAX_SELF_INTERSECTION_DEPTH, 5);
/// ```
pub const MAX_SELF_INTERSECTION_DEPTH: usize = 5;

/// Face rings inspected around the moved vertex before any refinement.
///
/// # Examples
/// ```
/// use config::constants::SELF_INTERSECTION_SEED_RINGS;
/// assert_eq!(SELF_INTERSECTION_SEED_RINGS, 2);
/// ```
pub const SELF_INTERSECTION_SEED_RINGS: usize = 2;

// =============================================================================
// COLORS AND SELECTION
// =============================================================================

/// Color given to half-edges that were never painted.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_HALF_EDGE_COLOR;
/// assert_eq!(DEFAULT_HALF_EDGE_COLOR, [1.0, 1.0, 1.0]);
/// ```
pub const DEFAULT_HALF_EDGE_COLOR: [f64; 3] = [1.0, 1.0, 1.0];

/// Screen-space distance between a vertex and the handle of one of its
/// color sectors.
///
/// # Examples
/// ```
/// use config::constants::COLOR_EDIT_POINT_OFFSET;
/// assert!(COLOR_EDIT_POINT_OFFSET > 0.0);
/// ```
pub const COLOR_EDIT_POINT_OFFSET: f64 = 0.03;

/// Default screen-space brush radius used for picking.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_BRUSH_RADIUS;
/// assert!(DEFAULT_BRUSH_RADIUS > 0.0);
/// ```
pub const DEFAULT_BRUSH_RADIUS: f64 = 0.05;

// =============================================================================
// EDITOR CONFIG
// =============================================================================

/// Immutable snapshot of editor settings shared by the edit session.
///
/// # Examples
/// ```
/// use config::constants::EditorConfig;
/// let config = EditorConfig::default();
/// assert!(config.brush_radius > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    /// Screen-space picking radius.
    pub brush_radius: f64,
    /// Depth limit handed to the self-intersection check.
    pub max_self_intersection_depth: usize,
    /// Whether coordinate edits that fold the surface are refused.
    pub reject_self_intersections: bool,
}

impl EditorConfig {
    /// Builds a configuration enforcing strict validation of the supplied
    /// brush radius and recursion depth.
    ///
    /// # Examples
    /// ```
    /// use config::constants::EditorConfig;
    /// let cfg = EditorConfig::new(0.1, 3, true).expect("valid config");
    /// assert_eq!(cfg.max_self_intersection_depth, 3);
    /// ```
    pub fn new(
        brush_radius: f64,
        max_self_intersection_depth: usize,
        reject_self_intersections: bool,
    ) -> Result<Self, ConfigError> {
        if !brush_radius.is_finite() || brush_radius <= 0.0 {
            return Err(ConfigError::InvalidBrushRadius(brush_radius));
        }
        if max_self_intersection_depth == 0 {
            return Err(ConfigError::InvalidDepth(max_self_intersection_depth));
        }
        Ok(Self {
            brush_radius,
            max_self_intersection_depth,
            reject_self_intersections,
        })
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            brush_radius: DEFAULT_BRUSH_RADIUS,
            max_self_intersection_depth: MAX_SELF_INTERSECTION_DEPTH,
            reject_self_intersections: false,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when the brush radius is not a positive finite number.
    InvalidBrushRadius(f64),
    /// Raised when the self-intersection depth is zero.
    InvalidDepth(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBrushRadius(value) => {
                write!(f, "brush_radius must be positive and finite: {value}")
            }
            ConfigError::InvalidDepth(value) => {
                write!(f, "max_self_intersection_depth must be >= 1: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
