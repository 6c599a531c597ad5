//! # ACC2 Control Nets
//!
//! Gregory-style control points for faces next to extraordinary vertices.
//! Each side of a face contributes five points: the corner (a limit point),
//! the two edge points on the side and the two face points that pull the
//! side into the interior.
//!
//! Triangles and quads are both supported; the face-point denominator is 4
//! for triangles and 3 otherwise.

use std::f64::consts::PI;

use glam::{DVec2, DVec3};

use super::{limit_color, limit_position, ControlPoint};
use crate::mesh::{FaceId, HalfEdgeId, Mesh};

/// Points emitted per face side.
pub const POINTS_PER_SIDE: usize = 5;

pub fn sigma(n: u32) -> f64 {
    let c = (PI / n as f64).cos();
    (4.0 + c * c).powf(-0.5)
}

/// Subdominant eigenvalue of the Catmull-Clark subdivision matrix for
/// valence `n`.
pub fn lambda(n: u32) -> f64 {
    let n = n as f64;
    let c1 = (PI / n).cos();
    let c2 = (2.0 * PI / n).cos();
    (5.0 + c2 + c1 * (18.0 + 2.0 * c2).sqrt()) / 16.0
}

/// Corner point at the origin of `h`.
pub fn corner_point(mesh: &Mesh, h: HalfEdgeId) -> ControlPoint {
    ControlPoint::new(limit_position(mesh, h), limit_color(mesh, h))
}

/// Number of `prev.twin` steps from `from` to `to` around their common
/// origin.
fn spoke_index(mesh: &Mesh, from: HalfEdgeId, to: HalfEdgeId) -> u32 {
    let bound = mesh.valence(mesh.origin(from));
    let mut e = from;
    let mut j = 0;
    while e != to && j < bound {
        e = mesh.twin(mesh.prev(e));
        j += 1;
    }
    j
}

/// Coefficients shared by the boundary tangent formulas.
struct BoundaryTangent {
    k: f64,
    c: f64,
    s: f64,
}

impl BoundaryTangent {
    fn new(k: u32) -> Self {
        let k = k as f64;
        Self {
            k,
            c: (PI / k).cos(),
            s: (PI / k).sin(),
        }
    }

    fn denominator(&self) -> f64 {
        3.0 * self.k + self.c
    }

    fn gamma(&self) -> f64 {
        -4.0 * self.s / self.denominator()
    }

    fn alpha_end(&self) -> f64 {
        -((1.0 + 2.0 * self.c) * (1.0 + self.c).sqrt())
            / (self.denominator() * (1.0 - self.c).sqrt())
    }

    fn alpha(&self, i: u32) -> f64 {
        4.0 * self.si(i) / self.denominator()
    }

    fn beta(&self, i: u32) -> f64 {
        (self.si(i) + self.si(i + 1)) / self.denominator()
    }

    fn si(&self, i: u32) -> f64 {
        (PI * i as f64 / self.k).sin()
    }

    fn mix(&self, j: u32) -> (f64, f64) {
        let angle = PI * j as f64 / self.k;
        (angle.cos(), angle.sin())
    }
}

// =============================================================================
// EDGE POINTS
// =============================================================================

/// Edge point on `h` next to corner point `p`.
///
/// `forward` is false when `h` is the twin of the face edge; the colors of
/// the corner then come from the face side.
pub fn edge_point(mesh: &Mesh, h: HalfEdgeId, p: ControlPoint, forward: bool) -> ControlPoint {
    ControlPoint::new(
        edge_position(mesh, h, p.position),
        edge_color(mesh, h, p.color, forward),
    )
}

fn edge_position(mesh: &Mesh, h: HalfEdgeId, p: DVec2) -> DVec2 {
    let v = mesh.origin(h);
    let position = mesh.position(v);
    let valence = mesh.valence(v);

    if !mesh.is_boundary_vertex(v) {
        let n = valence as f64;
        let s = sigma(valence);
        let mut q = DVec2::ZERO;
        let mut e = h;
        for i in 0..valence {
            let i = i as f64;
            q += (1.0 - s * (PI / n).cos()) * (2.0 * PI * i / n).cos() * mesh.edge_midpoint(e)
                + 2.0 * s * ((2.0 * PI * i + PI) / n).cos() * mesh.mean_face_position(e);
            e = mesh.twin(mesh.prev(e));
        }
        q *= 2.0 / n;
        return p + 2.0 * lambda(valence) * q / 3.0;
    }

    if valence == 2 {
        let q = mesh.target_position(h) - position;
        return p + 2.0 * lambda(4) * q / 3.0;
    }

    let out = mesh.out(v);
    let first = mesh.ccw_boundary_edge(out);
    let last = mesh.cw_boundary_edge(out);
    let j = spoke_index(mesh, last, h);
    let r0 = (mesh.target_position(last) - mesh.target_position(first)) / 2.0;

    let k = valence - 1;
    let t = BoundaryTangent::new(k);
    let mut r1 = t.gamma() * position;
    let mut e = last;
    for i in 0..=k {
        let alpha = if i == 0 || i == k {
            t.alpha_end()
        } else {
            t.alpha(i)
        };
        r1 += alpha * mesh.target_position(e);

        if i != k {
            let across = match mesh.face_valence_of(e) {
                4 => mesh.target_position(mesh.next(e)),
                3 => 3.0 * (mesh.mean_face_position(e) - position) + position,
                _ => 2.0 * (mesh.mean_face_position(e) - position) + position,
            };
            r1 += t.beta(i) * across;
        }
        e = mesh.twin(mesh.prev(e));
    }

    let (cos, sin) = t.mix(j);
    let q = cos * r0 + sin * r1;
    p + 2.0 * lambda(2 * k) * q / 3.0
}

fn edge_color(mesh: &Mesh, h: HalfEdgeId, p: DVec3, forward: bool) -> DVec3 {
    let v = mesh.origin(h);
    let twin = mesh.twin(h);
    let corner = if forward { h } else { mesh.next(twin) };
    let origin_color = mesh.color(corner);
    let target_color = if forward {
        mesh.color(mesh.next(h))
    } else {
        mesh.color(twin)
    };
    let color_valence = mesh.color_valence(corner);

    if mesh.is_sharp_edge(h) {
        return if forward {
            (2.0 * mesh.color(h) + mesh.color(mesh.next(h))) / 3.0
        } else {
            (2.0 * mesh.color(mesh.next(twin)) + mesh.color(twin)) / 3.0
        };
    }

    if mesh.is_smooth_vertex(v) {
        let valence = mesh.valence(v);
        let n = valence as f64;
        let s = sigma(valence);
        let mut q = DVec3::ZERO;
        let mut e = h;
        for i in 0..valence {
            let i = i as f64;
            q += (1.0 - s * (PI / n).cos()) * (2.0 * PI * i / n).cos() * mesh.edge_mid_color(e)
                + 2.0 * s * ((2.0 * PI * i + PI) / n).cos() * mesh.mean_face_color(e);
            e = mesh.twin(mesh.prev(e));
        }
        q *= 2.0 / n;
        return p + 2.0 * lambda(valence) * q / 3.0;
    }

    if color_valence == 2 {
        let q = target_color - origin_color;
        return p + 2.0 * lambda(4) * q / 3.0;
    }

    let first = mesh.ccw_sharp_edge(if forward { mesh.twin(mesh.prev(h)) } else { h });
    let last = mesh.cw_sharp_edge(if forward { h } else { mesh.next(twin) });
    let j = spoke_index(mesh, last, h);
    let r0 = (mesh.color(mesh.next(last)) - mesh.color(mesh.twin(first))) / 2.0;

    let k = color_valence - 1;
    let t = BoundaryTangent::new(k);
    let mut r1 = t.gamma() * origin_color;
    let mut e = last;
    for i in 0..=k {
        r1 += if i == 0 {
            t.alpha_end() * mesh.color(mesh.next(e))
        } else if i == k {
            t.alpha_end() * mesh.color(mesh.twin(e))
        } else {
            t.alpha(i) * mesh.color(mesh.next(e))
        };

        if i != k {
            let own = mesh.color(e);
            let across = match mesh.face_valence_of(e) {
                4 => mesh.color(mesh.next(mesh.next(e))),
                3 => 3.0 * (mesh.mean_face_color(e) - own) + own,
                _ => 2.0 * (mesh.mean_face_color(e) - own) + own,
            };
            r1 += t.beta(i) * across;
        }
        e = mesh.twin(mesh.prev(e));
    }

    let (cos, sin) = t.mix(j);
    let q = cos * r0 + sin * r1;
    p + 2.0 * lambda(2 * k) * q / 3.0
}

// =============================================================================
// FACE POINTS
// =============================================================================

/// Face point on the side of `h`, from the edge points `ep` (on `h`) and
/// `em` (on its twin) and the denominator `d`.
pub fn face_point(
    mesh: &Mesh,
    h: HalfEdgeId,
    ep: ControlPoint,
    em: ControlPoint,
    d: f64,
    forward: bool,
) -> ControlPoint {
    ControlPoint::new(
        face_position(mesh, h, ep.position, em.position, d, forward),
        face_color(mesh, h, ep.color, em.color, d, forward),
    )
}

fn face_position(mesh: &Mesh, h: HalfEdgeId, ep: DVec2, em: DVec2, d: f64, forward: bool) -> DVec2 {
    let origin = mesh.origin(h);
    let target = mesh.target(h);
    let origin_position = mesh.position(origin);
    let target_position = mesh.position(target);
    let twin = mesh.twin(h);

    let (origin_valence, target_valence, rp) =
        if mesh.face_of(h).is_some() && mesh.face_of(twin).is_some() {
            let valence = |v| {
                if mesh.is_boundary_vertex(v) {
                    2 * mesh.valence(v) - 2
                } else {
                    mesh.valence(v)
                }
            };
            let rp = (mesh.edge_midpoint(mesh.prev(h)) - mesh.edge_midpoint(mesh.next(twin)))
                / 3.0
                + 2.0 * (mesh.mean_face_position(h) - mesh.mean_face_position(twin)) / 3.0;
            (
                valence(origin),
                valence(target),
                if forward { rp } else { -rp },
            )
        } else {
            let valence = |v| match mesh.valence(v) {
                2 => 4,
                n => 2 * n - 2,
            };
            let (mean_face, mid) = if mesh.face_of(h).is_none() {
                (
                    mesh.mean_face_position(twin),
                    mesh.target_position(mesh.next(twin)) - origin_position,
                )
            } else {
                (
                    mesh.mean_face_position(h),
                    mesh.target_position(mesh.twin(mesh.prev(h))) - origin_position,
                )
            };
            let face = 2.0 * (mean_face - (target_position + origin_position) / 2.0);
            (valence(origin), valence(target), mid / 3.0 + 2.0 * face / 3.0)
        };

    let c0 = (2.0 * PI / origin_valence as f64).cos();
    let c1 = (2.0 * PI / target_valence as f64).cos();
    (c1 * origin_position + (d - 2.0 * c0 - c1) * ep + 2.0 * c0 * em + rp) / d
}

fn face_color(mesh: &Mesh, h: HalfEdgeId, ep: DVec3, em: DVec3, d: f64, forward: bool) -> DVec3 {
    let origin = mesh.origin(h);
    let target = mesh.target(h);
    let twin = mesh.twin(h);
    let origin_corner = if forward { h } else { mesh.next(twin) };
    let target_corner = if forward { mesh.next(h) } else { twin };
    let origin_color_valence = mesh.color_valence(origin_corner);
    let target_color_valence = mesh.color_valence(target_corner);

    let (origin_valence, target_valence, rp, origin_color) = if !mesh.is_sharp_edge(h) {
        let valence = |v, n: u32| {
            if mesh.is_smooth_vertex(v) {
                n
            } else {
                2 * n - 2
            }
        };
        let rp = (mesh.edge_mid_color(mesh.prev(h)) - mesh.edge_mid_color(mesh.next(twin))) / 3.0
            + 2.0 * (mesh.mean_face_color(h) - mesh.mean_face_color(twin)) / 3.0;
        (
            valence(origin, origin_color_valence),
            valence(target, target_color_valence),
            if forward { rp } else { -rp },
            mesh.color(h),
        )
    } else {
        let valence = |v, n: u32| {
            if mesh.is_smooth_vertex(v) {
                n
            } else if n == 2 {
                4
            } else {
                2 * n - 2
            }
        };
        let (face, mid) = if forward {
            (
                2.0 * (mesh.mean_face_color(h) - mesh.edge_mid_color(h)),
                mesh.color(mesh.prev(h)) - mesh.color(h),
            )
        } else {
            let twin_next = mesh.next(twin);
            (
                2.0 * (mesh.mean_face_color(twin) - mesh.edge_mid_color(twin)),
                mesh.color(mesh.next(twin_next)) - mesh.color(twin_next),
            )
        };
        (
            valence(origin, origin_color_valence),
            valence(target, target_color_valence),
            mid / 3.0 + 2.0 * face / 3.0,
            mesh.color(origin_corner),
        )
    };

    let c0 = (2.0 * PI / origin_valence as f64).cos();
    let c1 = (2.0 * PI / target_valence as f64).cos();
    (c1 * origin_color + (d - 2.0 * c0 - c1) * ep + 2.0 * c0 * em + rp) / d
}

// =============================================================================
// PATCH
// =============================================================================

/// Control net of the face owning `start`, walking its loop from `start`.
pub fn patch_from(mesh: &Mesh, start: HalfEdgeId) -> Vec<ControlPoint> {
    let sides: Vec<HalfEdgeId> = mesh.face_edges(start).collect();
    let corners: Vec<ControlPoint> = sides.iter().map(|&e| corner_point(mesh, e)).collect();
    let d = if sides.len() == 3 { 4.0 } else { 3.0 };

    let mut points = Vec::with_capacity(POINTS_PER_SIDE * sides.len());
    for (i, &e) in sides.iter().enumerate() {
        let twin = mesh.twin(e);
        let p = corners[i];
        let p1 = corners[(i + 1) % corners.len()];
        let ep = edge_point(mesh, e, p, true);
        let em = edge_point(mesh, twin, p1, false);
        let fp = face_point(mesh, e, ep, em, d, true);
        let fm = face_point(mesh, twin, em, ep, d, false);
        points.extend([p, ep, em, fp, fm]);
    }
    points
}

/// Control net of face `f`, starting at its side half-edge.
pub fn patch(mesh: &Mesh, f: FaceId) -> Vec<ControlPoint> {
    patch_from(mesh, mesh.face(f).side)
}
