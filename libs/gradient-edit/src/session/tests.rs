//! # Editor Session Tests

use super::*;
use crate::records::RecordError;
use approx::assert_relative_eq;

/// Renderer call, as seen by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Set { vertices: usize },
    Coords(ChangeSet),
    Colors(ChangeSet),
}

#[derive(Debug, Default)]
struct RecordingRenderer {
    calls: Vec<Call>,
}

impl MeshRenderer for RecordingRenderer {
    fn set_mesh(&mut self, limit: &Mesh) {
        self.calls.push(Call::Set {
            vertices: limit.vertex_count(),
        });
    }

    fn update_mesh_coords(&mut self, _limit: &Mesh, changes: &ChangeSet) {
        self.calls.push(Call::Coords(changes.clone()));
    }

    fn update_mesh_colors(&mut self, _limit: &Mesh, changes: &ChangeSet) {
        self.calls.push(Call::Colors(changes.clone()));
    }
}

const SQUARE: &str = "v 0 0\nv 1 0\nv 1 1\nv 0 1\nf 1 2 3 4\n";

fn red() -> DVec3 {
    DVec3::new(1.0, 0.0, 0.0)
}

/// 3x3 grid session; input vertex 5 sits at (1, 1).
fn grid_session() -> EditorSession<RecordingRenderer> {
    let mut session = EditorSession::new(RecordingRenderer::default());
    session.set_input_mesh(Mesh::grid(3, 3, 1.0).unwrap());
    session.renderer_mut().calls.clear();
    session
}

fn limit_position(session: &EditorSession<RecordingRenderer>, v: VertexId) -> DVec2 {
    let level = session.chain().unwrap().level(session.edit_level()).unwrap();
    level.limit.position(v)
}

// =============================================================================
// LOADING
// =============================================================================

#[test]
fn test_empty_session_has_no_model() {
    let mut session = EditorSession::new(NullRenderer);
    assert!(session.input().is_none());
    assert!(matches!(
        session.select_at(DVec2::ZERO, 1.0),
        Err(EditError::NoModel)
    ));
    assert!(matches!(session.adaptive_patches(), Err(EditError::NoModel)));
}

#[test]
fn test_set_input_mesh_notifies_renderer() {
    let mut session = EditorSession::new(RecordingRenderer::default());
    session.set_input_mesh(Mesh::grid(1, 1, 1.0).unwrap());
    assert_eq!(session.renderer().calls, vec![Call::Set { vertices: 16 }]);
    assert_eq!(session.chain().unwrap().depth(), 0);
}

#[test]
fn test_load_str_replaces_model() {
    let mut session = grid_session();
    session.load_str(SQUARE).unwrap();
    assert_eq!(session.input().unwrap().face_count(), 1);
    assert!(session.edits().is_empty());
    assert_eq!(session.renderer().calls.len(), 1);
}

#[test]
fn test_failed_load_keeps_state() {
    let mut session = grid_session();
    session.set_edit_level(1);
    let before = session.chain().unwrap().clone();

    let err = session.load_str("v 0 0\nf 1 2 3\n").unwrap_err();
    assert!(matches!(
        err,
        EditError::Record(RecordError::FaceIndex { line: 2, .. })
    ));
    assert_eq!(session.chain().unwrap(), &before);
    assert_eq!(session.input().unwrap().face_count(), 9);
    assert!(session.renderer().calls.is_empty());
}

#[test]
fn test_save_and_load_file() {
    let mut session = grid_session();
    session.select_at(DVec2::new(1.0, 1.0), 1.0).unwrap();
    session
        .move_selected_vertex(DVec2::new(0.05, 0.0), EditFlag::Apply)
        .unwrap();

    let path = std::env::temp_dir().join(format!("gradient-session-{}.txt", std::process::id()));
    session.save_file(&path).unwrap();

    let mut restored = EditorSession::new(NullRenderer);
    restored.load_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(restored.edits(), session.edits());
    assert_eq!(restored.input(), session.input());
}

#[test]
fn test_save_without_model_fails() {
    let session = EditorSession::new(NullRenderer);
    assert!(matches!(
        session.save_file("unused.txt"),
        Err(EditError::NoModel)
    ));
}

// =============================================================================
// LEVELS
// =============================================================================

#[test]
fn test_view_level_deepens_and_redraws() {
    let mut session = grid_session();
    session.set_view_level(2);
    let chain = session.chain().unwrap();
    assert_eq!(chain.depth(), 2);
    let vertices = chain.level(2).unwrap().limit.vertex_count();
    assert_eq!(session.renderer().calls, vec![Call::Set { vertices }]);
}

#[test]
fn test_edit_level_clears_selection() {
    let mut session = grid_session();
    session.select_at(DVec2::new(1.0, 1.0), 1.0).unwrap();
    assert!(session.selected_vertex().is_some());
    session.set_edit_level(1);
    assert!(session.selected_vertex().is_none());
    assert_eq!(session.chain().unwrap().depth(), 1);
}

#[test]
fn test_levels_survive_reload() {
    let mut session = grid_session();
    session.set_edit_level(2);
    session.load_str(SQUARE).unwrap();
    assert_eq!(session.chain().unwrap().depth(), 2);
}

// =============================================================================
// SELECTION
// =============================================================================

#[test]
fn test_select_nearest_vertex() {
    let mut session = grid_session();
    let picked = session.select_at(DVec2::new(1.01, 0.99), 1.0).unwrap();
    assert_eq!(picked, Some(5));
}

#[test]
fn test_select_outside_brush_is_empty() {
    let mut session = grid_session();
    let picked = session.select_at(DVec2::new(1.5, 1.5), 1.0).unwrap();
    assert_eq!(picked, None);
    assert!(session.selected_edges().is_empty());
}

#[test]
fn test_select_single_corner_handle() {
    let mut session = grid_session();
    // Handle of the corner of vertex 5 opening towards +x and +y
    session.select_at(DVec2::new(1.03, 1.03), 1.0).unwrap();
    assert_eq!(session.selected_edges().len(), 1);
}

#[test]
fn test_brush_radius_is_validated() {
    let mut session = grid_session();
    assert!(matches!(
        session.set_brush_radius(-1.0),
        Err(EditError::Config(_))
    ));
    session.set_brush_radius(0.5).unwrap();
    assert_relative_eq!(session.config().brush_radius, 0.5);
    assert_eq!(session.select_at(DVec2::new(1.1, 1.1), 1.0).unwrap(), Some(5));
}

// =============================================================================
// COORDINATE EDITS
// =============================================================================

#[test]
fn test_move_requires_selection() {
    let mut session = grid_session();
    assert!(matches!(
        session.move_selected_vertex(DVec2::X, EditFlag::Apply),
        Err(EditError::NothingSelected)
    ));
}

#[test]
fn test_move_hits_limit_destination() {
    let mut session = grid_session();
    session.select_at(DVec2::new(1.0, 1.0), 1.0).unwrap();
    let before = limit_position(&session, 5);

    let delta = DVec2::new(0.1, -0.05);
    let changes = session.move_selected_vertex(delta, EditFlag::Apply).unwrap();

    let after = limit_position(&session, 5);
    assert_relative_eq!(after.x, before.x + delta.x, epsilon = 1e-9);
    assert_relative_eq!(after.y, before.y + delta.y, epsilon = 1e-9);
    assert_eq!(changes.len(), 1);
    assert!(changes[0].vertices.contains(&5));
    assert_eq!(session.edits().coords_count(), 1);

    match session.renderer().calls.as_slice() {
        [Call::Coords(sent)] => assert_eq!(sent, &changes[0]),
        calls => panic!("unexpected renderer calls: {calls:?}"),
    }
}

#[test]
fn test_inverted_move_goes_backwards() {
    let mut session = grid_session();
    session.select_at(DVec2::new(1.0, 1.0), 1.0).unwrap();
    let before = limit_position(&session, 5);
    session
        .move_selected_vertex(DVec2::new(0.1, 0.0), EditFlag::Invert)
        .unwrap();
    let after = limit_position(&session, 5);
    assert_relative_eq!(after.x, before.x - 0.1, epsilon = 1e-9);
}

#[test]
fn test_folding_move_is_rejected() {
    let config = EditorConfig::new(0.05, 2, true).unwrap();
    let mut session = EditorSession::with_config(NullRenderer, config);
    session.set_input_mesh(Mesh::grid(3, 3, 1.0).unwrap());
    session.select_at(DVec2::new(1.0, 1.0), 1.0).unwrap();
    let before = session.chain().unwrap().clone();

    let err = session
        .move_selected_vertex(DVec2::new(1.9, 1.9), EditFlag::Apply)
        .unwrap_err();
    assert!(matches!(err, EditError::SelfIntersecting { vertex: 5 }));
    assert!(session.edits().is_empty());
    assert_eq!(session.chain().unwrap(), &before);
}

#[test]
fn test_view_below_edit_level_gets_no_update() {
    let mut session = grid_session();
    session.set_edit_level(1);
    session.renderer_mut().calls.clear();
    session.select_at(DVec2::new(1.0, 1.0), 1.0).unwrap();
    session
        .move_selected_vertex(DVec2::new(0.05, 0.0), EditFlag::Apply)
        .unwrap();
    assert!(session.renderer().calls.is_empty());
}

#[test]
fn test_remove_coords_edit_restores_level() {
    let mut session = grid_session();
    session.set_view_level(1);
    session.select_at(DVec2::new(1.0, 1.0), 1.0).unwrap();
    session
        .move_selected_vertex(DVec2::new(0.1, 0.1), EditFlag::Apply)
        .unwrap();

    let changes = session.remove_selected_coords_edit().unwrap();
    assert_eq!(changes.len(), 2);
    assert!(session.edits().is_empty());
    let level = session.chain().unwrap().level(0).unwrap();
    assert_eq!(level.edited.vertices, level.original.vertices);

    // Nothing left to remove
    assert!(session.remove_selected_coords_edit().unwrap().is_empty());
}

// =============================================================================
// COLOR EDITS
// =============================================================================

#[test]
fn test_paint_requires_selected_corners() {
    let mut session = grid_session();
    assert!(matches!(
        session.paint_selected_edges(red()),
        Err(EditError::NothingSelected)
    ));
}

#[test]
fn test_paint_records_and_notifies() {
    let mut session = grid_session();
    session.select_at(DVec2::new(1.03, 1.03), 1.0).unwrap();
    let edge = *session.selected_edges().iter().next().unwrap();

    let changes = session.paint_selected_edges(red()).unwrap();
    assert_eq!(session.edits().color_count(), 1);
    assert!(changes[0].half_edges.contains(&edge));

    let level = session.chain().unwrap().level(0).unwrap();
    assert_eq!(level.edited.color(edge), red());
    match session.renderer().calls.as_slice() {
        [Call::Colors(sent)] => assert!(sent.half_edges.contains(&edge)),
        calls => panic!("unexpected renderer calls: {calls:?}"),
    }
}

#[test]
fn test_paint_with_brush_uses_brush_color() {
    let mut session = grid_session();
    session.set_brush_color(DVec3::new(0.0, 0.0, 1.0));
    session.select_at(DVec2::new(1.03, 1.03), 1.0).unwrap();
    session.paint_with_brush().unwrap();
    let (_, _, edit) = session.edits().color_edits().next().unwrap();
    assert_eq!(edit.color, session.brush_color());
}

#[test]
fn test_clear_color_edits_restores_colors() {
    let mut session = grid_session();
    session.set_view_level(1);
    session.select_at(DVec2::new(1.03, 1.03), 1.0).unwrap();
    session.paint_selected_edges(red()).unwrap();

    let changes = session.clear_selected_color_edits().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(session.edits().color_count(), 0);
    let level = session.chain().unwrap().level(0).unwrap();
    assert_eq!(level.edited.half_edges, level.original.half_edges);

    assert!(session.clear_selected_color_edits().unwrap().is_empty());
}

// =============================================================================
// PATCHES
// =============================================================================

#[test]
fn test_session_patches_cover_level_zero() {
    let session = grid_session();
    let levels = session.adaptive_patches().unwrap();
    // Ternary refinement of a regular grid is a regular grid.
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].patches.len(), 81);
}
