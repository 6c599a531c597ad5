//! # Edit Model Tests
//!
//! Parameterization of coordinate edits, color patches and creases, and
//! the per-level hierarchy.

use super::*;
use approx::assert_relative_eq;
use config::constants::COORDS_FOOTPRINT_RINGS;
use glam::DVec2;
use gradient_mesh::subdivision::ternary;
use proptest::prelude::*;

fn red() -> DVec3 {
    DVec3::new(1.0, 0.0, 0.0)
}

/// Level-0 mesh of a 3x3 grid: a 9x9 grid with spacing 1/3. Input vertex 5
/// sits at (1, 1), input vertex 0 at the corner.
fn level0() -> Mesh {
    ternary(&Mesh::grid(3, 3, 1.0).unwrap())
}

fn face_spoke(mesh: &Mesh, v: VertexId) -> HalfEdgeId {
    mesh.spokes(v).find(|&h| mesh.face_of(h).is_some()).unwrap()
}

fn assert_vec2_eq(actual: DVec2, expected: DVec2) {
    assert_relative_eq!(actual.x, expected.x, epsilon = 1e-12);
    assert_relative_eq!(actual.y, expected.y, epsilon = 1e-12);
}

// =============================================================================
// COORDINATE EDITS
// =============================================================================

#[test]
fn test_interior_edit_reproduces_delta() {
    let mesh = level0();
    let delta = DVec2::new(0.07, -0.02);
    let edit = compute_coords_edit(&mesh, 5, delta).unwrap();
    assert!(!edit.boundary);
    assert_eq!(coords_anchor(&mesh, &edit), 5);
    assert_vec2_eq(coords_delta(&mesh, &edit), delta);
}

#[test]
fn test_interior_weights_are_sector_coordinates() {
    let mesh = level0();
    // Along a spoke one weight carries the whole move.
    let e = face_spoke(&mesh, 5);
    let direction = mesh.target_position(e) - mesh.position(5);
    let edit = compute_coords_edit(&mesh, 5, 0.5 * direction).unwrap();
    assert!(edit.first > -1e-12 && edit.second > -1e-12);
    assert_relative_eq!(edit.first + edit.second, 0.5, epsilon = 1e-9);
}

#[test]
fn test_boundary_edit_reproduces_delta() {
    let mesh = level0();
    // Vertex 1 of the input is on the bottom edge; moving down leaves the
    // mesh.
    let delta = DVec2::new(0.01, -0.1);
    let edit = compute_coords_edit(&mesh, 1, delta).unwrap();
    assert!(edit.boundary);
    assert!(mesh.face_of(edit.edge).is_some());
    assert_eq!(coords_anchor(&mesh, &edit), 1);
    assert_vec2_eq(coords_delta(&mesh, &edit), delta);
}

#[test]
fn test_edit_footprint_is_two_ring() {
    let mesh = level0();
    let edit = compute_coords_edit(&mesh, 5, DVec2::new(0.01, 0.01)).unwrap();
    assert_eq!(edit.footprint, footprint_sides(&mesh, 5, COORDS_FOOTPRINT_RINGS));
    assert_eq!(edit.footprint.len(), 16);
    assert!(edit.footprint.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_apply_moves_anchor_only() {
    let original = level0();
    let mut edited = original.clone();
    let delta = DVec2::new(0.05, 0.05);
    let edit = compute_coords_edit(&original, 5, delta).unwrap();
    assert_eq!(apply_coords_edit(&original, &mut edited, &edit), 5);

    for v in 0..original.vertex_count() as VertexId {
        if v == 5 {
            assert_vec2_eq(edited.position(v), original.position(v) + delta);
        } else {
            assert_eq!(edited.position(v), original.position(v));
        }
    }
}

#[test]
fn test_edit_follows_scaled_neighbourhood() {
    let original = level0();
    let edit = compute_coords_edit(&original, 5, DVec2::new(0.05, 0.02)).unwrap();

    let mut scaled = original.clone();
    for vertex in &mut scaled.vertices {
        vertex.position *= 2.0;
    }
    assert_vec2_eq(coords_delta(&scaled, &edit), DVec2::new(0.1, 0.04));
}

proptest! {
    #[test]
    fn prop_interior_delta_roundtrip(x in -0.1f64..0.1, y in -0.1f64..0.1) {
        prop_assume!(x.abs() + y.abs() > 1e-6);
        let mesh = level0();
        let delta = DVec2::new(x, y);
        let edit = compute_coords_edit(&mesh, 5, delta).unwrap();
        let back = coords_delta(&mesh, &edit);
        prop_assert!((back - delta).length() < 1e-12);
    }
}

// =============================================================================
// COLOR EDITS
// =============================================================================

#[test]
fn test_color_edit_footprint_is_three_ring() {
    let mesh = level0();
    let e = face_spoke(&mesh, 5);
    let edit = ColorEdit::new(&mesh, e, red());
    assert_eq!(color_anchor(&mesh, &edit), 5);
    assert_eq!(edit.footprint, footprint_sides(&mesh, 5, 3));
    assert_eq!(edit.footprint.len(), 36);
}

#[test]
fn test_color_patch_spreads_sector() {
    let mut mesh = level0();
    let e = face_spoke(&mesh, 5);
    let edit = ColorEdit::new(&mesh, e, red());
    apply_color_patch(&mut mesh, &edit);

    assert_eq!(mesh.color(e), red());
    // The far corners of the painted quad take the sector color.
    assert_eq!(mesh.color(mesh.next(e)), red());
    assert_eq!(mesh.color(mesh.next(mesh.next(e))), red());
    assert_eq!(mesh.color(mesh.prev(e)), red());
}

#[test]
fn test_sharpness_marks_both_creases() {
    let mut mesh = level0();
    let e = face_spoke(&mesh, 5);
    let edit = ColorEdit::new(&mesh, e, red());
    apply_color_edits(&mut mesh, [&edit]);

    let twin = mesh.twin(e);
    assert!(mesh.he(e).sharp && mesh.he(twin).sharp);
    let prev = mesh.prev(e);
    assert!(mesh.he(prev).sharp && mesh.he(mesh.twin(prev)).sharp);
    let sharp = mesh.half_edges.iter().filter(|h| h.sharp).count();
    // Two creases of three edges, both halves each
    assert_eq!(sharp, 12);
}

#[test]
fn test_same_color_neighbour_is_not_creased() {
    let mut mesh = level0();
    let e = face_spoke(&mesh, 5);
    let neighbour = mesh.next(mesh.twin(e));
    let first = ColorEdit::new(&mesh, e, red());
    let second = ColorEdit::new(&mesh, neighbour, red());
    apply_color_edits(&mut mesh, [&first, &second]);
    assert!(!mesh.he(e).sharp);
}

#[test]
fn test_reach_covers_written_half_edges() {
    let original = level0();
    let e = face_spoke(&original, 5);
    let edit = ColorEdit::new(&original, e, red());
    let mut painted = original.clone();
    apply_color_edits(&mut painted, [&edit]);

    let reach = color_edit_reach(&original, e);
    for h in 0..original.half_edge_count() as HalfEdgeId {
        if painted.he(h) != original.he(h) {
            assert!(reach.contains(&h), "half-edge {h} written outside reach");
        }
    }
}

// =============================================================================
// FLAGS AND VALIDATION
// =============================================================================

#[test]
fn test_edit_flag_sign() {
    assert_eq!(EditFlag::default(), EditFlag::Apply);
    assert_eq!(EditFlag::Apply.sign(), 1.0);
    assert_eq!(EditFlag::Invert.sign(), -1.0);
}

#[test]
fn test_validation_rejects_boundary_half_edges() {
    let mesh = level0();
    let edit = ColorEdit {
        edge: mesh.face_half_edge_count() as HalfEdgeId,
        color: red(),
        footprint: Vec::new(),
    };
    assert!(matches!(
        validate_color_edit(&mesh, 2, &edit),
        Err(EditError::UnknownEdge { level: 2, .. })
    ));
    let edit = ColorEdit { edge: 0, ..edit };
    assert!(validate_color_edit(&mesh, 2, &edit).is_ok());
}

// =============================================================================
// HIERARCHY
// =============================================================================

#[test]
fn test_hierarchy_counts_and_levels() {
    let mesh = level0();
    let mut edits = EditHierarchy::new();
    assert!(edits.is_empty());
    assert_eq!(edits.max_level(), None);

    let coords = compute_coords_edit(&mesh, 5, DVec2::new(0.01, 0.0)).unwrap();
    edits.insert_coords(0, 5, coords.clone());
    edits.insert_color(2, ColorEdit::new(&mesh, 3, red()));
    assert_eq!(edits.coords_count(), 1);
    assert_eq!(edits.color_count(), 1);
    assert_eq!(edits.max_level(), Some(2));
    assert_eq!(edits.coords_edit(0, 5), Some(&coords));
    assert!(edits.color_edit(2, 3).is_some());
}

#[test]
fn test_insert_replaces_same_key() {
    let mesh = level0();
    let mut edits = EditHierarchy::new();
    assert!(edits.insert_color(0, ColorEdit::new(&mesh, 3, red())).is_none());
    let replaced = edits.insert_color(0, ColorEdit::new(&mesh, 3, DVec3::ONE));
    assert_eq!(replaced.map(|e| e.color), Some(red()));
    assert_eq!(edits.color_count(), 1);
}

#[test]
fn test_remove_drops_empty_levels() {
    let mesh = level0();
    let mut edits = EditHierarchy::new();
    edits.insert_color(1, ColorEdit::new(&mesh, 3, red()));
    assert!(edits.remove_color(1, 4).is_none());
    assert!(edits.remove_color(1, 3).is_some());
    assert!(edits.is_empty());
    assert_eq!(edits.max_level(), None);
}

#[test]
fn test_iteration_is_key_ordered() {
    let mesh = level0();
    let mut edits = EditHierarchy::new();
    for edge in [40, 7, 19] {
        edits.insert_color(0, ColorEdit::new(&mesh, edge, red()));
    }
    let keys: Vec<HalfEdgeId> = edits.colors_at(0).map(|(h, _)| h).collect();
    assert_eq!(keys, vec![7, 19, 40]);
}

#[test]
fn test_apply_matches_edited_mesh() {
    let original = level0();
    let mut edits = EditHierarchy::new();
    let coords = compute_coords_edit(&original, 5, DVec2::new(0.02, 0.03)).unwrap();
    edits.insert_coords(0, 5, coords);
    edits.insert_color(0, ColorEdit::new(&original, face_spoke(&original, 6), red()));

    let edited = edits.apply(0, &original);
    assert_ne!(edited, original);
    assert_eq!(edits.apply(1, &original), original);
}

#[test]
fn test_hierarchy_serializes() {
    let mesh = level0();
    let mut edits = EditHierarchy::new();
    edits.insert_color(0, ColorEdit::new(&mesh, 3, red()));
    let json = serde_json::to_string(&edits).unwrap();
    let back: EditHierarchy = serde_json::from_str(&json).unwrap();
    assert_eq!(back, edits);
}
