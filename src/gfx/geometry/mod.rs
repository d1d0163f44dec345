//! # Procedural Geometry Generation
//!
//! Primitive shapes generated in code, so scenes and tests need no model
//! files. Every primitive is centred on the origin, Y-up, with outward faces
//! wound so that `cross(b - a, c - a)` points along the face normal
//! (clockwise front faces in the left-handed view space).
//!
//! ```rust
//! use forward_sandbox::gfx::geometry::{generate_cube, generate_plane, generate_sphere};
//!
//! let cube = generate_cube();
//! let sphere = generate_sphere(32, 16);
//! let floor = generate_plane(10.0, 10.0, 4, 4);
//! assert_eq!(cube.triangle_count(), 12);
//! ```

pub mod primitives;

pub use primitives::*;

use cgmath::{InnerSpace, Vector2, Vector3, Zero};

use crate::gfx::scene::vertex::Vertex;

/// Generated geometry, ready to become a [`Mesh`](crate::gfx::scene::Mesh).
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    pub positions: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves the attribute streams and fills in tangents.
    ///
    /// Missing normals default to +Y and missing texture coordinates to 0.
    pub fn to_vertices(&self) -> Vec<Vertex> {
        let mut vertices: Vec<Vertex> = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                Vertex::new(
                    *position,
                    self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                )
            })
            .collect();
        calculate_tangents(&mut vertices, &self.indices);
        vertices
    }
}

/// Averaged per-vertex normals from triangle faces.
///
/// Used for meshes that arrive without normals.
pub fn calculate_face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut sums = vec![Vector3::<f32>::zero(); positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let p0 = Vector3::from(positions[a]);
        let edge1 = Vector3::from(positions[b]) - p0;
        let edge2 = Vector3::from(positions[c]) - p0;
        let face_normal = edge1.cross(edge2);

        for index in [a, b, c] {
            sums[index] += face_normal;
        }
    }

    sums.into_iter()
        .map(|sum| {
            if sum.magnitude2() > 0.0 {
                sum.normalize().into()
            } else {
                [0.0, 0.0, 0.0]
            }
        })
        .collect()
}

/// Fills each vertex's tangent from its triangles' UV gradients.
///
/// The tangent is Gram-Schmidt orthogonalised against the vertex normal.
/// Triangles with degenerate UVs contribute nothing.
pub fn calculate_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    let mut sums = vec![Vector3::<f32>::zero(); vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        if a >= vertices.len() || b >= vertices.len() || c >= vertices.len() {
            continue;
        }

        let p0 = Vector3::from(vertices[a].position);
        let e1 = Vector3::from(vertices[b].position) - p0;
        let e2 = Vector3::from(vertices[c].position) - p0;

        let uv0 = Vector2::from(vertices[a].uv);
        let d1 = Vector2::from(vertices[b].uv) - uv0;
        let d2 = Vector2::from(vertices[c].uv) - uv0;

        let det = d1.x * d2.y - d2.x * d1.y;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let tangent = (e1 * d2.y - e2 * d1.y) / det;

        for index in [a, b, c] {
            sums[index] += tangent;
        }
    }

    for (vertex, sum) in vertices.iter_mut().zip(sums) {
        let normal = Vector3::from(vertex.normal);
        let orthogonal = sum - normal * normal.dot(sum);
        vertex.tangent = if orthogonal.magnitude2() > 0.0 {
            orthogonal.normalize().into()
        } else {
            [0.0, 0.0, 0.0]
        };
    }
}
