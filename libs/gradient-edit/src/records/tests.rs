//! # Record Format Tests

use super::*;
use crate::edit::compute_coords_edit;

const SQUARE: &str = "v 0 0\nv 1 0\nv 1 1\nv 0 1\nf 1 2 3 4\n";

/// A 2x2 grid with a move of its interior vertex at level 0 and a color
/// edit at level 1.
fn sample_model() -> Model {
    let input = Mesh::grid(2, 2, 1.0).unwrap();
    let level0 = ternary(&input);
    let level1 = catmull_clark(&level0);

    let mut edits = EditHierarchy::new();
    let coords = compute_coords_edit(&level0, 4, DVec2::new(0.01, 0.02)).unwrap();
    edits.insert_coords(0, 4, coords);
    edits.insert_color(1, ColorEdit::new(&level1, 5, DVec3::new(0.25, 0.5, 1.0)));
    Model { input, edits }
}

fn assert_parse_error(text: &str, expected_line: usize) {
    match parse(text) {
        Err(RecordError::Parse { line, .. }) => assert_eq!(line, expected_line),
        other => panic!("expected parse error on line {expected_line}, got {other:?}"),
    }
}

// =============================================================================
// ROUNDTRIP
// =============================================================================

#[test]
fn test_format_then_parse_restores_model() {
    let model = sample_model();
    let text = format(&model.input, &model.edits);
    let parsed = parse(&text).unwrap();
    assert_eq!(parsed, model);
}

#[test]
fn test_format_orders_edits_by_level() {
    let model = sample_model();
    let text = format(&model.input, &model.edits);
    let edit_lines: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with("ve") || l.starts_with("ce"))
        .collect();
    assert_eq!(edit_lines.len(), 2);
    assert!(edit_lines[0].starts_with("ve 0 4 "));
    assert_eq!(edit_lines[1], "ce 1 5 0.25 0.5 1");
}

#[test]
fn test_faces_keep_corner_order() {
    let text = "v 0 0\nv 1 0\nv 1 1\nv 0 1\nf 2 3 4 1\n";
    let model = parse(text).unwrap();
    assert_eq!(format(&model.input, &model.edits), text);
}

#[test]
fn test_comments_and_blank_lines_are_skipped() {
    let text = format!("# square\n\n{SQUARE}   \n# done\n");
    let model = parse(&text).unwrap();
    assert_eq!(model.input.vertex_count(), 4);
    assert_eq!(model.input.face_count(), 1);
    assert!(model.edits.is_empty());
}

#[test]
fn test_footprints_are_recomputed() {
    let text = format!("{SQUARE}ce 0 0 1 0 0\n");
    let model = parse(&text).unwrap();
    let level0 = ternary(&model.input);
    let edit = model.edits.color_edit(0, 0).unwrap();
    assert_eq!(
        edit.footprint,
        footprint_sides(&level0, level0.origin(0), COLOR_FOOTPRINT_RINGS)
    );
    assert!(!edit.footprint.is_empty());
}

// =============================================================================
// ERRORS
// =============================================================================

#[test]
fn test_unknown_keyword_is_rejected() {
    assert_parse_error("v 0 0\nx 1 2\n", 2);
}

#[test]
fn test_wrong_field_count_is_rejected() {
    assert_parse_error("v 0\n", 1);
    assert_parse_error(&format!("{SQUARE}ce 0 0 1 0\n"), 6);
}

#[test]
fn test_bad_number_is_rejected() {
    assert_parse_error("v 0 zero\n", 1);
}

#[test]
fn test_boundary_flag_must_be_binary() {
    assert_parse_error(&format!("{SQUARE}ve 0 0 0 0.1 0.2 2\n"), 6);
}

#[test]
fn test_coords_key_must_match_moved_vertex() {
    let model = sample_model();
    let text = format(&model.input, &model.edits).replace("ve 0 4 ", "ve 0 5 ");
    let line = text.lines().position(|l| l.starts_with("ve")).unwrap() + 1;
    assert_parse_error(&text, line);
}

#[test]
fn test_face_index_out_of_range() {
    let text = "v 0 0\nv 1 0\nv 0 1\nf 1 2 4\n";
    assert!(matches!(
        parse(text),
        Err(RecordError::FaceIndex { line: 4, index: 4 })
    ));
    let text = "v 0 0\nv 1 0\nv 0 1\nf 0 1 2\n";
    assert!(matches!(
        parse(text),
        Err(RecordError::FaceIndex { line: 4, index: 0 })
    ));
}

#[test]
fn test_degenerate_face_is_a_mesh_error() {
    assert!(matches!(
        parse("v 0 0\nv 1 0\nf 1 2\n"),
        Err(RecordError::Mesh(_))
    ));
}

#[test]
fn test_edit_on_unknown_edge_is_rejected() {
    let text = format!("{SQUARE}ce 0 999 1 0 0\n");
    assert!(matches!(
        parse(&text),
        Err(RecordError::UnknownEdge { level: 0, edge: 999 })
    ));
}

// =============================================================================
// FILES
// =============================================================================

#[test]
fn test_file_roundtrip() {
    let model = sample_model();
    let path = std::env::temp_dir().join(format!("gradient-records-{}.txt", std::process::id()));
    save_file(&path, &model.input, &model.edits).unwrap();
    let loaded = load_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, model);
}

#[test]
fn test_missing_file_is_io_error() {
    let path = std::env::temp_dir().join("gradient-records-missing/none.txt");
    assert!(matches!(load_file(&path), Err(RecordError::Io(_))));
}
