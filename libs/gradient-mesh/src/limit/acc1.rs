//! # ACC1 Control Nets
//!
//! Bicubic control points for regular quads. Each side of a face
//! contributes four points in the order corner, forward edge, backward edge,
//! interior, so a quad yields sixteen.
//!
//! Positions treat boundary vertices the way colors treat non-smooth
//! vertices: the valence is replaced by a doubled boundary valence and the
//! boundary edge itself becomes a 2-1 cubic edge.

use glam::{DVec2, DVec3};

use super::ControlPoint;
use crate::mesh::{FaceId, HalfEdgeId, Mesh};

/// Points emitted per face side.
pub const POINTS_PER_SIDE: usize = 4;

/// Interior control point next to the origin of `h`.
pub fn interior_point(mesh: &Mesh, h: HalfEdgeId) -> ControlPoint {
    ControlPoint::new(interior_position(mesh, h), interior_color(mesh, h))
}

fn interior_position(mesh: &Mesh, h: HalfEdgeId) -> DVec2 {
    let v = mesh.origin(h);
    let position = mesh.position(v);
    let next = mesh.next(h);
    let ring = 2.0 * mesh.target_position(h)
        + mesh.target_position(next)
        + 2.0 * mesh.target_position(mesh.next(next));
    let valence = mesh.valence(v);

    if !mesh.is_boundary_vertex(v) {
        let n = valence as f64;
        (n * position + ring) / (n + 5.0)
    } else if valence == 2 {
        (4.0 * position + ring) / 9.0
    } else {
        let k = (valence - 1) as f64;
        (2.0 * k * position + ring) / (5.0 + 2.0 * k)
    }
}

fn interior_color(mesh: &Mesh, h: HalfEdgeId) -> DVec3 {
    let next = mesh.next(h);
    let ring =
        2.0 * mesh.color(next) + mesh.color(mesh.next(next)) + 2.0 * mesh.color(mesh.prev(h));
    let color = mesh.color(h);

    if mesh.is_smooth_vertex(mesh.origin(h)) {
        let n = mesh.valence(mesh.origin(h)) as f64;
        (n * color + ring) / (n + 5.0)
    } else if mesh.is_sharp_edge(h) && mesh.is_sharp_edge(mesh.prev(h)) {
        (4.0 * color + ring) / 9.0
    } else {
        let k = (mesh.color_valence(h) - 1) as f64;
        (2.0 * k * color + ring) / (5.0 + 2.0 * k)
    }
}

/// Edge control point on `h`, one third of the way from its origin.
///
/// `forward` is false when `h` is the twin of the face edge the patch is
/// being built for; the color then comes from the face side of the edge.
pub fn edge_point(mesh: &Mesh, h: HalfEdgeId, forward: bool) -> ControlPoint {
    ControlPoint::new(edge_position(mesh, h), edge_color(mesh, h, forward))
}

fn edge_position(mesh: &Mesh, h: HalfEdgeId) -> DVec2 {
    let v = mesh.origin(h);
    let position = mesh.position(v);

    if mesh.is_boundary_edge(h) {
        return (2.0 * position + mesh.target_position(h)) / 3.0;
    }

    let valence = mesh.valence(v);
    let n = if mesh.is_boundary_vertex(v) {
        (2 * valence - 2) as f64
    } else {
        valence as f64
    };
    let next = mesh.next(h);
    let twin_next = mesh.next(mesh.twin(h));
    (2.0 * n * position
        + 4.0 * mesh.target_position(h)
        + mesh.target_position(next)
        + 2.0 * mesh.target_position(mesh.next(next))
        + 2.0 * mesh.target_position(twin_next)
        + mesh.target_position(mesh.next(twin_next)))
        / (2.0 * n + 10.0)
}

fn edge_color(mesh: &Mesh, h: HalfEdgeId, forward: bool) -> DVec3 {
    let twin = mesh.twin(h);

    if mesh.is_sharp_edge(h) {
        return if forward {
            (2.0 * mesh.color(h) + mesh.color(mesh.next(h))) / 3.0
        } else {
            (2.0 * mesh.color(mesh.next(twin)) + mesh.color(twin)) / 3.0
        };
    }

    let color_valence = mesh.color_valence(h);
    let n = if mesh.is_smooth_vertex(mesh.origin(h)) {
        color_valence as f64
    } else {
        (2 * (color_valence - 1)) as f64
    };
    let next = mesh.next(h);
    let twin_next = mesh.next(twin);
    (2.0 * n * mesh.color(h)
        + 4.0 * mesh.color(next)
        + mesh.color(mesh.next(next))
        + 2.0 * mesh.color(mesh.prev(h))
        + 2.0 * mesh.color(mesh.next(twin_next))
        + mesh.color(mesh.prev(twin)))
        / (2.0 * n + 10.0)
}

/// Corner control point at the origin of `h`. This is the limit point of
/// the uniform bicubic case.
pub fn corner_point(mesh: &Mesh, h: HalfEdgeId) -> ControlPoint {
    ControlPoint::new(corner_position(mesh, h), corner_color(mesh, h))
}

fn corner_position(mesh: &Mesh, h: HalfEdgeId) -> DVec2 {
    let v = mesh.origin(h);
    let position = mesh.position(v);
    let valence = mesh.valence(v);

    if !mesh.is_boundary_vertex(v) {
        let n = valence as f64;
        let ring: DVec2 = mesh
            .vertex_edges(h)
            .map(|e| 4.0 * mesh.target_position(e) + mesh.target_position(mesh.next(e)))
            .sum();
        (n * n * position + ring) / (n * n + 5.0 * n)
    } else if valence == 2 {
        position
    } else {
        (4.0 * position
            + mesh.target_position(mesh.ccw_boundary_edge(h))
            + mesh.target_position(mesh.cw_boundary_edge(h)))
            / 6.0
    }
}

fn corner_color(mesh: &Mesh, h: HalfEdgeId) -> DVec3 {
    let v = mesh.origin(h);
    let color = mesh.color(h);

    if mesh.is_smooth_vertex(v) {
        let n = mesh.valence(v) as f64;
        let ring: DVec3 = mesh
            .vertex_edges(h)
            .map(|e| {
                let next = mesh.next(e);
                4.0 * mesh.color(next) + mesh.color(mesh.next(next))
            })
            .sum();
        (n * n * color + ring) / (n * n + 5.0 * n)
    } else if mesh.color_valence(h) == 2 {
        color
    } else {
        let first = mesh.ccw_sharp_edge(mesh.twin(mesh.prev(h)));
        let last = mesh.cw_sharp_edge(h);
        (4.0 * color + mesh.color(mesh.twin(first)) + mesh.color(mesh.next(last))) / 6.0
    }
}

/// Control net of the face owning `start`, walking its loop from `start`.
pub fn patch_from(mesh: &Mesh, start: HalfEdgeId) -> Vec<ControlPoint> {
    let mut points = Vec::with_capacity(POINTS_PER_SIDE * mesh.face_valence_of(start) as usize);
    for e in mesh.face_edges(start) {
        points.push(corner_point(mesh, e));
        points.push(edge_point(mesh, e, true));
        points.push(edge_point(mesh, mesh.twin(e), false));
        points.push(interior_point(mesh, e));
    }
    points
}

/// Control net of face `f`, starting at its side half-edge.
pub fn patch(mesh: &Mesh, f: FaceId) -> Vec<ControlPoint> {
    patch_from(mesh, mesh.face(f).side)
}
