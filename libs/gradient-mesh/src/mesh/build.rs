//! Construction of a half-edge mesh from indexed polygons.

use std::collections::HashMap;

use glam::DVec2;

use super::{Face, HalfEdge, HalfEdgeId, Mesh, Vertex, VertexId};
use crate::error::{MeshError, MeshResult};

impl Mesh {
    /// Builds a mesh from vertex positions and counter-clockwise polygons
    /// given as zero-based vertex indices.
    ///
    /// Interior twins are paired by their endpoints. Every unpaired face
    /// half-edge receives a boundary twin, appended after all face
    /// half-edges, and the boundary twins are linked into loops.
    ///
    /// # Errors
    ///
    /// - a polygon with fewer than three corners or a repeated corner
    /// - a vertex index outside `positions`
    /// - a directed edge used twice (non-manifold or inconsistent winding)
    /// - a vertex that no polygon references
    /// - a boundary loop that cannot be closed around a vertex
    pub fn from_polygons(positions: &[DVec2], polygons: &[Vec<VertexId>]) -> MeshResult<Self> {
        let mut vertex_out: Vec<Option<HalfEdgeId>> = vec![None; positions.len()];
        let mut valences = vec![0u32; positions.len()];
        let mut half_edges: Vec<HalfEdge> = Vec::new();
        let mut faces: Vec<Face> = Vec::with_capacity(polygons.len());

        for (f, polygon) in polygons.iter().enumerate() {
            let k = polygon.len();
            if k < 3 {
                return Err(MeshError::invalid_topology(format!(
                    "face {f} has {k} corners, at least 3 are required"
                )));
            }
            for (i, &v) in polygon.iter().enumerate() {
                if v as usize >= positions.len() {
                    return Err(MeshError::InvalidVertex(v));
                }
                if polygon[..i].contains(&v) {
                    return Err(MeshError::invalid_topology(format!(
                        "face {f} visits vertex {v} twice"
                    )));
                }
            }

            let first = half_edges.len();
            faces.push(Face {
                side: first as HalfEdgeId,
                valence: k as u32,
            });
            for (i, &v) in polygon.iter().enumerate() {
                let leaving = (first + (i + 1) % k) as HalfEdgeId;
                let slot = &mut vertex_out[v as usize];
                if slot.is_none() {
                    *slot = Some(leaving);
                }
                valences[v as usize] += 1;

                let mut he = HalfEdge::new(v);
                he.next = leaving;
                he.prev = (first + (i + k - 1) % k) as HalfEdgeId;
                he.face = Some(f as u32);
                half_edges.push(he);
            }
        }

        // Pair interior twins by (origin, target)
        let face_half_edges = half_edges.len();
        let mut directed: HashMap<(VertexId, VertexId), HalfEdgeId> =
            HashMap::with_capacity(face_half_edges);
        for h in 0..face_half_edges {
            let origin = half_edges[half_edges[h].prev as usize].target;
            let target = half_edges[h].target;
            if directed.insert((origin, target), h as HalfEdgeId).is_some() {
                return Err(MeshError::invalid_topology(format!(
                    "directed edge {origin} -> {target} is used by more than one face"
                )));
            }
        }

        let mut paired = vec![false; face_half_edges];
        for h in 0..face_half_edges {
            if paired[h] {
                continue;
            }
            let origin = half_edges[half_edges[h].prev as usize].target;
            let target = half_edges[h].target;
            match directed.get(&(target, origin)) {
                Some(&t) => {
                    half_edges[h].twin = t;
                    half_edges[t as usize].twin = h as HalfEdgeId;
                    paired[h] = true;
                    paired[t as usize] = true;
                }
                None => {
                    // Synthesize the boundary twin
                    let b = half_edges.len() as HalfEdgeId;
                    let mut twin = HalfEdge::new(origin);
                    twin.twin = h as HalfEdgeId;
                    half_edges.push(twin);
                    half_edges[h].twin = b;
                    valences[origin as usize] += 1;
                    paired[h] = true;
                }
            }
        }

        let mut vertices = Vec::with_capacity(positions.len());
        for (v, &position) in positions.iter().enumerate() {
            let out = vertex_out[v].ok_or_else(|| {
                MeshError::invalid_topology(format!("vertex {v} is not used by any face"))
            })?;
            vertices.push(Vertex {
                position,
                out,
                valence: valences[v],
            });
        }

        let mut mesh = Mesh {
            vertices,
            half_edges,
            faces,
        };

        // Link boundary loops: the successor of a boundary half-edge is the
        // boundary half-edge leaving its target.
        for b in face_half_edges..mesh.half_edges.len() {
            let b = b as HalfEdgeId;
            let successor = mesh.ccw_boundary_edge(mesh.out(mesh.target(b)));
            if mesh.face_of(successor).is_some() {
                return Err(MeshError::invalid_topology(format!(
                    "boundary at vertex {} cannot be closed",
                    mesh.target(b)
                )));
            }
            mesh.he_mut(b).next = successor;
            mesh.he_mut(successor).prev = b;
        }

        mesh.validate()?;
        Ok(mesh)
    }

    /// Builds a `columns` x `rows` grid of unit-spaced quads scaled by
    /// `cell`, with the lower left corner at the origin.
    ///
    /// Vertex `(i, j)` has index `j * (columns + 1) + i`.
    pub fn grid(columns: u32, rows: u32, cell: f64) -> MeshResult<Self> {
        if columns == 0 || rows == 0 {
            return Err(MeshError::invalid_topology("a grid needs at least one cell"));
        }
        if !(cell.is_finite() && cell > 0.0) {
            return Err(MeshError::degenerate(format!("grid cell size {cell}")));
        }
        let stride = columns + 1;
        let positions: Vec<DVec2> = (0..=rows)
            .flat_map(|j| (0..=columns).map(move |i| DVec2::new(i as f64, j as f64) * cell))
            .collect();
        let polygons: Vec<Vec<VertexId>> = (0..rows)
            .flat_map(|j| {
                (0..columns).map(move |i| {
                    let v = j * stride + i;
                    vec![v, v + 1, v + 1 + stride, v + stride]
                })
            })
            .collect();
        Self::from_polygons(&positions, &polygons)
    }
}
