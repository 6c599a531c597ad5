//! Property tests over randomly generated quad/triangle grids.

use glam::DVec2;
use gradient_mesh::limit::{inverse_limit_position, limit_position};
use gradient_mesh::subdivision::{catmull_clark, ternary};
use gradient_mesh::Mesh;
use proptest::prelude::*;

/// A jittered grid where every cell is a quad or, when its flag is set, two
/// triangles.
fn grid_mesh(columns: u32, rows: u32, split: &[bool], jitter: &[(i8, i8)]) -> Mesh {
    let stride = columns + 1;
    let positions: Vec<DVec2> = (0..=rows)
        .flat_map(|j| (0..=columns).map(move |i| (i, j)))
        .enumerate()
        .map(|(k, (i, j))| {
            let (dx, dy) = jitter[k % jitter.len()];
            DVec2::new(
                i as f64 + dx as f64 * 0.002,
                j as f64 + dy as f64 * 0.002,
            )
        })
        .collect();

    let mut polygons = Vec::new();
    for j in 0..rows {
        for i in 0..columns {
            let v = j * stride + i;
            let corners = [v, v + 1, v + 1 + stride, v + stride];
            if split[((j * columns + i) as usize) % split.len()] {
                polygons.push(vec![corners[0], corners[1], corners[2]]);
                polygons.push(vec![corners[0], corners[2], corners[3]]);
            } else {
                polygons.push(corners.to_vec());
            }
        }
    }
    Mesh::from_polygons(&positions, &polygons).unwrap()
}

fn mesh_strategy() -> impl Strategy<Value = Mesh> {
    (
        1u32..4,
        1u32..4,
        prop::collection::vec(any::<bool>(), 1..9),
        prop::collection::vec((any::<i8>(), any::<i8>()), 1..16),
    )
        .prop_map(|(columns, rows, split, jitter)| grid_mesh(columns, rows, &split, &jitter))
}

fn check_links(mesh: &Mesh) {
    mesh.validate().unwrap();
    for h in 0..mesh.half_edge_count() as u32 {
        assert_eq!(mesh.next(mesh.prev(h)), h);
        assert_eq!(mesh.prev(mesh.next(h)), h);
        assert_eq!(mesh.twin(mesh.twin(h)), h);
        assert_eq!(mesh.origin(h), mesh.target(mesh.twin(h)));
    }
    for v in 0..mesh.vertex_count() as u32 {
        assert!(mesh.face_of(mesh.out(v)).is_some());
        assert_eq!(mesh.spokes(v).count() as u32, mesh.valence(v));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_construction_links(mesh in mesh_strategy()) {
        check_links(&mesh);
    }

    #[test]
    fn prop_refinement_links(mesh in mesh_strategy()) {
        let level0 = ternary(&mesh);
        check_links(&level0);
        let level1 = catmull_clark(&level0);
        check_links(&level1);
        prop_assert!(level1.faces.iter().all(|f| f.valence == 4));
    }

    #[test]
    fn prop_catmull_clark_counts(mesh in mesh_strategy()) {
        let edges = mesh.half_edge_count() / 2;
        let child = catmull_clark(&mesh);
        prop_assert_eq!(child.vertex_count(), mesh.vertex_count() + edges + mesh.face_count());
        prop_assert_eq!(child.face_count(), mesh.face_half_edge_count());
    }

    #[test]
    fn prop_inverse_limit_roundtrip(mesh in mesh_strategy(), dx in -0.05f64..0.05, dy in -0.05f64..0.05) {
        let mut mesh = catmull_clark(&ternary(&mesh));
        let offset = DVec2::new(dx, dy);
        for v in 0..mesh.vertex_count() as u32 {
            let target = limit_position(&mesh, mesh.out(v)) + offset;
            let before = mesh.vertices[v as usize].position;
            mesh.vertices[v as usize].position = inverse_limit_position(&mesh, v, target);
            let reached = limit_position(&mesh, mesh.out(v));
            prop_assert!((reached - target).length() < 1e-9);
            mesh.vertices[v as usize].position = before;
        }
    }
}
