//! # Limit Evaluation Tests
//!
//! Limit points, their inverse, the ACC1/ACC2 control nets and patch
//! classification.

use super::*;
use crate::mesh::Mesh;
use crate::subdivision::{catmull_clark, ternary};
use approx::assert_relative_eq;
use glam::{DVec2, DVec3};
use std::collections::BTreeSet;

fn red() -> DVec3 {
    DVec3::new(1.0, 0.0, 0.0)
}

fn quad_and_triangle() -> Mesh {
    let positions = [
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(1.0, 1.0),
        DVec2::new(0.0, 1.0),
        DVec2::new(2.0, 0.5),
    ];
    Mesh::from_polygons(&positions, &[vec![0, 1, 2, 3], vec![1, 4, 2]]).unwrap()
}

fn paint(mesh: &mut Mesh, color: DVec3) {
    for h in 0..mesh.face_half_edge_count() {
        mesh.half_edges[h].color = color;
    }
}

fn assert_vec2_eq(actual: DVec2, expected: DVec2) {
    assert_relative_eq!(actual.x, expected.x, epsilon = 1e-12);
    assert_relative_eq!(actual.y, expected.y, epsilon = 1e-12);
}

// =============================================================================
// LIMIT POSITIONS
// =============================================================================

#[test]
fn test_limit_position_uniform_grid_is_identity() {
    let mesh = Mesh::grid(3, 3, 1.0).unwrap();
    for v in [5, 6, 9, 10] {
        assert_vec2_eq(limit_position(&mesh, mesh.out(v)), mesh.position(v));
    }
}

#[test]
fn test_limit_position_interior_stencil() {
    let mut mesh = Mesh::grid(2, 2, 1.0).unwrap();
    mesh.vertices[4].position = DVec2::new(1.2, 1.0);
    // (4v + 5 * center) / 9 for a displaced valence-4 vertex
    let limit = limit_position(&mesh, mesh.out(4));
    assert_relative_eq!(limit.x, 9.8 / 9.0, epsilon = 1e-12);
    assert_relative_eq!(limit.y, 1.0, epsilon = 1e-12);
}

#[test]
fn test_limit_position_boundary_stencil() {
    let mut mesh = Mesh::grid(2, 2, 1.0).unwrap();
    mesh.vertices[1].position = DVec2::new(1.0, 0.3);
    let limit = limit_position(&mesh, mesh.out(1));
    assert_relative_eq!(limit.x, 1.0, epsilon = 1e-12);
    assert_relative_eq!(limit.y, 4.0 * 0.3 / 6.0, epsilon = 1e-12);
}

#[test]
fn test_boundary_corner_is_fixed_point() {
    let mut mesh = Mesh::grid(2, 2, 1.0).unwrap();
    mesh.vertices[0].position = DVec2::new(-0.3, 0.1);
    assert_eq!(mesh.valence(0), 2);
    assert_eq!(limit_position(&mesh, mesh.out(0)), DVec2::new(-0.3, 0.1));
}

#[test]
fn test_single_quad_corners_after_refinement() {
    let positions = [
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(1.0, 1.0),
        DVec2::new(0.0, 1.0),
    ];
    let input = Mesh::from_polygons(&positions, &[vec![0, 1, 2, 3]]).unwrap();
    let refined = catmull_clark(&ternary(&input));
    let limit = limit_mesh(&refined);

    for (v, &expected) in positions.iter().enumerate() {
        let v = v as u32;
        assert_eq!(refined.valence(v), 2);
        assert_eq!(limit.position(v), expected);
    }
}

// =============================================================================
// INVERSE
// =============================================================================

#[test]
fn test_inverse_limit_interior_roundtrip() {
    let mut mesh = Mesh::grid(3, 3, 1.0).unwrap();
    let target = DVec2::new(1.1, 0.95);
    let pre_image = inverse_limit_position(&mesh, 5, target);
    mesh.vertices[5].position = pre_image;
    assert_vec2_eq(limit_position(&mesh, mesh.out(5)), target);
}

#[test]
fn test_inverse_limit_boundary_roundtrip() {
    let mut mesh = Mesh::grid(3, 3, 1.0).unwrap();
    let target = DVec2::new(1.2, 0.1);
    let pre_image = inverse_limit_position(&mesh, 1, target);
    mesh.vertices[1].position = pre_image;
    assert_vec2_eq(limit_position(&mesh, mesh.out(1)), target);
}

#[test]
fn test_inverse_limit_corner_is_identity() {
    let mesh = Mesh::grid(3, 3, 1.0).unwrap();
    let target = DVec2::new(0.2, -0.1);
    assert_eq!(inverse_limit_position(&mesh, 0, target), target);
}

#[test]
fn test_inverse_limit_next_to_triangle() {
    let mut mesh = catmull_clark(&ternary(&quad_and_triangle()));
    let v = (0..mesh.vertex_count() as u32)
        .find(|&v| !mesh.is_boundary_vertex(v))
        .unwrap();
    let target = mesh.position(v) + DVec2::new(0.01, 0.02);
    mesh.vertices[v as usize].position = inverse_limit_position(&mesh, v, target);
    assert_vec2_eq(limit_position(&mesh, mesh.out(v)), target);
}

// =============================================================================
// LIMIT COLORS
// =============================================================================

#[test]
fn test_limit_color_uniform_interior() {
    let mut mesh = Mesh::grid(3, 3, 1.0).unwrap();
    paint(&mut mesh, red());
    for h in mesh.spokes(5).collect::<Vec<_>>() {
        let c = limit_color(&mesh, h);
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(c.z, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_limit_color_sharp_corner_is_fixed() {
    let mut mesh = Mesh::grid(2, 2, 1.0).unwrap();
    let out = mesh.out(0);
    mesh.he_mut(out).color = red();
    assert_eq!(limit_color(&mesh, out), red());
}

#[test]
fn test_limit_color_smooth_stencil() {
    let mut mesh = Mesh::grid(2, 2, 1.0).unwrap();
    let out = mesh.out(4);
    mesh.he_mut(out).color = DVec3::ZERO;
    // A single dark corner pulls the limit below white but not to black
    let c = limit_color(&mesh, out);
    assert!(c.x > 0.0 && c.x < 1.0);
    assert_relative_eq!(c.x, c.y, epsilon = 1e-12);
}

#[test]
fn test_limit_mesh_keeps_connectivity() {
    let mesh = catmull_clark(&ternary(&quad_and_triangle()));
    let limit = limit_mesh(&mesh);
    assert_eq!(limit.vertex_count(), mesh.vertex_count());
    assert_eq!(limit.half_edge_count(), mesh.half_edge_count());
    for (a, b) in limit.half_edges.iter().zip(&mesh.half_edges) {
        assert_eq!(a.next, b.next);
        assert_eq!(a.twin, b.twin);
        assert_eq!(a.sharp, b.sharp);
    }
}

#[test]
fn test_refresh_limit_matches_full() {
    let mut mesh = Mesh::grid(3, 3, 1.0).unwrap();
    let mut limit = limit_mesh(&mesh);
    mesh.vertices[5].position += DVec2::new(0.2, 0.1);
    let out = mesh.out(5);
    mesh.he_mut(out).color = red();

    let vertices: Vec<u32> = (0..mesh.vertex_count() as u32).collect();
    refresh_limit_positions(&mesh, &mut limit, vertices);
    refresh_limit_colors(&mesh, &mut limit, 0..mesh.half_edge_count() as u32);
    assert_eq!(limit, limit_mesh(&mesh));
}

// =============================================================================
// REGULARITY
// =============================================================================

#[test]
fn test_grid_faces_are_regular() {
    let mesh = Mesh::grid(3, 3, 1.0).unwrap();
    for f in 0..mesh.face_count() as u32 {
        assert!(is_regular_face(&mesh, f), "face {f}");
        assert_eq!(classify_face(&mesh, f), PatchKind::Regular);
    }
}

#[test]
fn test_ternary_square_is_regular() {
    let mesh = ternary(&Mesh::grid(1, 1, 1.0).unwrap());
    for f in 0..mesh.face_count() as u32 {
        assert!(is_regular_face(&mesh, f));
    }
}

#[test]
fn test_triangle_neighbourhood_is_irregular() {
    let mesh = quad_and_triangle();
    assert!(!is_regular_face(&mesh, 0));
    assert!(!is_regular_face(&mesh, 1));
    assert_eq!(classify_face(&mesh, 1), PatchKind::Irregular);
}

#[test]
fn test_crease_stays_regular() {
    let mut mesh = Mesh::grid(3, 3, 1.0).unwrap();
    // Straight crease through vertex 5 along the row
    for (a, b) in [(4, 5), (5, 6)] {
        let h = mesh.spokes(a).find(|&h| mesh.target(h) == b).unwrap();
        mesh.he_mut(h).sharp = true;
    }
    assert!(!mesh.is_smooth_vertex(5));
    for h in mesh.spokes(5).collect::<Vec<_>>() {
        if mesh.face_of(h).is_some() {
            assert!(is_regular_vertex(&mesh, h));
        }
    }
}

#[test]
fn test_classification_is_stable() {
    let mut mesh = catmull_clark(&ternary(&quad_and_triangle()));
    let before: Vec<PatchKind> = (0..mesh.face_count() as u32)
        .map(|f| classify_face(&mesh, f))
        .collect();
    mesh.vertices[3].position += DVec2::ZERO;
    let after: Vec<PatchKind> = (0..mesh.face_count() as u32)
        .map(|f| classify_face(&mesh, f))
        .collect();
    assert_eq!(before, after);
    assert!(before.contains(&PatchKind::Regular));
    assert!(before.contains(&PatchKind::Irregular));
}

// =============================================================================
// ACC1
// =============================================================================

#[test]
fn test_acc1_uniform_lattice() {
    let mesh = Mesh::grid(3, 3, 1.0).unwrap();
    let points = acc1::patch(&mesh, 4);
    assert_eq!(points.len(), 16);

    let mut seen = BTreeSet::new();
    for p in &points {
        let x = p.position.x * 3.0;
        let y = p.position.y * 3.0;
        assert_relative_eq!(x, x.round(), epsilon = 1e-12);
        assert_relative_eq!(y, y.round(), epsilon = 1e-12);
        assert!((3.0..=6.0).contains(&x.round()));
        assert!((3.0..=6.0).contains(&y.round()));
        seen.insert((x.round() as i32, y.round() as i32));
    }
    assert_eq!(seen.len(), 16);
}

#[test]
fn test_acc1_interior_point() {
    let mesh = Mesh::grid(3, 3, 1.0).unwrap();
    let h = mesh
        .spokes(5)
        .find(|&h| mesh.target(h) == 6 && mesh.face_of(h).is_some())
        .unwrap();
    let p = acc1::interior_point(&mesh, h);
    let face_center = mesh.mean_face_position(h);
    // One third of the way from the vertex to the opposite corner
    assert_vec2_eq(p.position, mesh.position(5) + (face_center - mesh.position(5)) * 2.0 / 3.0);
}

#[test]
fn test_acc1_boundary_edge_thirds() {
    let mesh = Mesh::grid(1, 1, 1.0).unwrap();
    let side = mesh.face(0).side;
    let p = acc1::edge_point(&mesh, side, true);
    let origin = mesh.origin_position(side);
    let target = mesh.target_position(side);
    assert_vec2_eq(p.position, (2.0 * origin + target) / 3.0);
}

#[test]
fn test_acc1_uniform_color() {
    let mut mesh = Mesh::grid(3, 3, 1.0).unwrap();
    paint(&mut mesh, red());
    for p in acc1::patch(&mesh, 4) {
        assert_relative_eq!(p.color.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.color.y, 0.0, epsilon = 1e-12);
    }
}

// =============================================================================
// ACC2
// =============================================================================

#[test]
fn test_weight_functions() {
    assert_relative_eq!(lambda_of(4), 0.5, epsilon = 1e-12);
    assert_relative_eq!(acc2::sigma(4), 4.5f64.powf(-0.5), epsilon = 1e-12);
}

fn lambda_of(n: u32) -> f64 {
    acc2::lambda(n)
}

#[test]
fn test_acc2_point_counts() {
    let mesh = quad_and_triangle();
    assert_eq!(acc2::patch(&mesh, 0).len(), 20);
    assert_eq!(acc2::patch(&mesh, 1).len(), 15);
}

#[test]
fn test_acc2_corners_are_limit_points() {
    let mesh = catmull_clark(&ternary(&quad_and_triangle()));
    for f in 0..mesh.face_count() as u32 {
        let points = acc2::patch(&mesh, f);
        for (i, e) in mesh.face_edges(mesh.face(f).side).enumerate() {
            assert_eq!(points[5 * i].position, limit_position(&mesh, e));
        }
    }
}

#[test]
fn test_acc2_unit_square_golden() {
    let mesh = Mesh::grid(1, 1, 1.0).unwrap();
    let side = mesh.face(0).side;
    let origin = mesh.origin_position(side);
    let target = mesh.target_position(side);
    let inward = mesh.target_position(mesh.twin(mesh.prev(side))) - origin;
    let points = acc2::patch(&mesh, 0);

    // p, e+, e-, f+, f- for the first side
    assert_vec2_eq(points[0].position, origin);
    assert_vec2_eq(points[1].position, origin + (target - origin) / 3.0);
    assert_vec2_eq(points[2].position, origin + 2.0 * (target - origin) / 3.0);
    assert_vec2_eq(points[3].position, origin + (target - origin) / 3.0 + inward / 3.0);
    assert_vec2_eq(points[4].position, origin + 2.0 * (target - origin) / 3.0 + inward / 3.0);
    let white = crate::mesh::default_color();
    for p in &points {
        assert_relative_eq!(p.color.x, white.x, epsilon = 1e-12);
        assert_relative_eq!(p.color.z, white.z, epsilon = 1e-12);
    }
}

#[test]
fn test_acc2_boundary_face_point_golden() {
    // Unit square with the top-right corner pulled to (2, 1)
    let positions = [
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(2.0, 1.0),
        DVec2::new(0.0, 1.0),
    ];
    let mesh = Mesh::from_polygons(&positions, &[vec![0, 1, 2, 3]]).unwrap();
    let h = mesh
        .face_edges(mesh.face(0).side)
        .find(|&h| mesh.origin(h) == 0)
        .unwrap();
    let corner = acc2::corner_point(&mesh, h);
    let ep = acc2::edge_point(&mesh, h, corner, true);
    let next_corner = acc2::corner_point(&mesh, mesh.next(h));
    let em = acc2::edge_point(&mesh, mesh.twin(h), next_corner, false);

    assert_vec2_eq(ep.position, DVec2::new(1.0 / 3.0, 0.0));
    assert_vec2_eq(em.position, DVec2::new(2.0 / 3.0, 0.0));

    let fp = acc2::face_point(&mesh, h, ep, em, 3.0, true);
    assert_vec2_eq(fp.position, DVec2::new(4.0 / 9.0, 1.0 / 3.0));
}

// =============================================================================
// PATCHES
// =============================================================================

#[test]
fn test_patch_builders() {
    let mesh = quad_and_triangle();
    let regular = regular_patch(&Mesh::grid(1, 1, 1.0).unwrap(), 0);
    assert_eq!(regular.scheme, Scheme::Acc1);
    assert_eq!(regular.control_points.len(), 16);

    let irregular = irregular_patch(&mesh, 1);
    assert_eq!(irregular.scheme, Scheme::Acc2);
    assert_eq!(irregular.kind, PatchKind::Irregular);
    assert_eq!(irregular.face, 1);
}

fn transition_kind(mesh: &Mesh, f: u32, edges: &[u32]) -> PatchKind {
    let set: BTreeSet<u32> = edges.iter().copied().collect();
    transition_patch(mesh, f, &set).kind
}

#[test]
fn test_transition_constellations() {
    let mesh = Mesh::grid(3, 3, 1.0).unwrap();
    let s = mesh.face(4).side;
    let n1 = mesh.next(s);
    let n2 = mesh.next(n1);
    let n3 = mesh.next(n2);

    assert_eq!(transition_kind(&mesh, 4, &[]), PatchKind::Regular);
    assert_eq!(
        transition_kind(&mesh, 4, &[n2]),
        PatchKind::Transition(Constellation::C1)
    );
    assert_eq!(
        transition_kind(&mesh, 4, &[s, n1]),
        PatchKind::Transition(Constellation::C2)
    );
    assert_eq!(
        transition_kind(&mesh, 4, &[n3, s]),
        PatchKind::Transition(Constellation::C2)
    );
    assert_eq!(
        transition_kind(&mesh, 4, &[s, n2]),
        PatchKind::Transition(Constellation::C3)
    );
    assert_eq!(
        transition_kind(&mesh, 4, &[s, n1, n2]),
        PatchKind::Transition(Constellation::C4)
    );
    assert_eq!(
        transition_kind(&mesh, 4, &[s, n1, n2, n3]),
        PatchKind::Transition(Constellation::C5)
    );
}

#[test]
fn test_transition_ignores_foreign_edges() {
    let mesh = Mesh::grid(3, 3, 1.0).unwrap();
    let foreign = mesh.face(0).side;
    assert_eq!(transition_kind(&mesh, 4, &[foreign]), PatchKind::Regular);
}

#[test]
fn test_transition_starts_after_plain_edge() {
    let mesh = Mesh::grid(3, 3, 1.0).unwrap();
    let s = mesh.face(4).side;
    let n1 = mesh.next(s);
    let n3 = mesh.next(mesh.next(n1));

    // Edges n3 and s are adjacent; the walk starts at n3
    let set: BTreeSet<u32> = [n3, s].into_iter().collect();
    let patch = transition_patch(&mesh, 4, &set);
    assert_eq!(patch.scheme, Scheme::Acc1);
    assert_eq!(patch.control_points[0], acc1::corner_point(&mesh, n3));
    assert_eq!(patch.control_points, acc1::patch_from(&mesh, n3));
}

#[test]
fn test_transition_irregular_uses_acc2() {
    let mesh = quad_and_triangle();
    let side = mesh.face(1).side;
    let set: BTreeSet<u32> = [side].into_iter().collect();
    let patch = transition_patch(&mesh, 1, &set);
    assert_eq!(patch.scheme, Scheme::Acc2);
    assert_eq!(patch.kind, PatchKind::Transition(Constellation::C1));
    assert_eq!(patch.control_points.len(), 15);
}
