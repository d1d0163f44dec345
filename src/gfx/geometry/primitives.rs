//! # Primitive Shape Generation

use std::f32::consts::PI;

use cgmath::Vector3;

use super::GeometryData;

/// Unit cube spanning -0.5..0.5 on every axis.
///
/// Each face has its own four vertices so normals and UVs stay per-face.
pub fn generate_cube() -> GeometryData {
    // (normal, right, up) with right x up == normal
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut data = GeometryData::new();
    for (normal, right, up) in faces {
        let base = data.positions.len() as u32;
        let (n, r, u) = (
            Vector3::from(normal),
            Vector3::from(right),
            Vector3::from(up),
        );

        for ((sr, su), uv) in corners.iter().zip(uvs) {
            let position = (n + r * *sr + u * *su) * 0.5;
            data.positions.push(position.into());
            data.normals.push(normal);
            data.tex_coords.push(uv);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// UV sphere of radius 1.
///
/// # Arguments
/// * `longitude_segments` - Slices around the Y axis (at least 3)
/// * `latitude_segments` - Stacks from pole to pole (at least 2)
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let slices = longitude_segments.max(3);
    let stacks = latitude_segments.max(2);
    let mut data = GeometryData::new();

    for stack in 0..=stacks {
        let v = stack as f32 / stacks as f32;
        let theta = v * PI;
        for slice in 0..=slices {
            let u = slice as f32 / slices as f32;
            let phi = u * 2.0 * PI;

            let point = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];
            data.positions.push(point);
            data.normals.push(point);
            data.tex_coords.push([u, v]);
        }
    }

    let row = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let top = stack * row + slice;
            let bottom = top + row;
            data.indices
                .extend_from_slice(&[top, top + 1, bottom, bottom, top + 1, bottom + 1]);
        }
    }

    data
}

/// Horizontal plane in XZ facing +Y.
///
/// # Arguments
/// * `width` - Extent along X
/// * `depth` - Extent along Z
/// * `width_segments` / `depth_segments` - Subdivisions (at least 1)
pub fn generate_plane(width: f32, depth: f32, width_segments: u32, depth_segments: u32) -> GeometryData {
    let columns = width_segments.max(1);
    let rows = depth_segments.max(1);
    let mut data = GeometryData::new();

    for z in 0..=rows {
        let fz = z as f32 / rows as f32;
        for x in 0..=columns {
            let fx = x as f32 / columns as f32;
            data.positions.push([(fx - 0.5) * width, 0.0, (fz - 0.5) * depth]);
            data.normals.push([0.0, 1.0, 0.0]);
            data.tex_coords.push([fx, 1.0 - fz]);
        }
    }

    let stride = columns + 1;
    for z in 0..rows {
        for x in 0..columns {
            let i = z * stride + x;
            let next = i + stride;
            data.indices
                .extend_from_slice(&[i, next, i + 1, next, next + 1, i + 1]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::super::{calculate_face_normals, calculate_tangents};
    use super::*;
    use cgmath::InnerSpace;

    /// Every triangle's winding normal must agree with its vertex normals.
    fn assert_outward(data: &GeometryData) {
        for tri in data.indices.chunks_exact(3) {
            let p: Vec<Vector3<f32>> = tri
                .iter()
                .map(|&i| Vector3::from(data.positions[i as usize]))
                .collect();
            let winding = (p[1] - p[0]).cross(p[2] - p[0]);
            if winding.magnitude2() < 1e-12 {
                continue; // collapsed pole triangles
            }
            let normal = Vector3::from(data.normals[tri[0] as usize])
                + Vector3::from(data.normals[tri[1] as usize])
                + Vector3::from(data.normals[tri[2] as usize]);
            assert!(winding.dot(normal) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube
            .positions
            .iter()
            .all(|p| p.iter().all(|c| (c.abs() - 0.5).abs() < 1e-6)));
        assert_outward(&cube);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert_eq!(sphere.vertex_count(), 9 * 7);
        assert_eq!(sphere.indices.len(), 8 * 6 * 6);
        assert_eq!(sphere.positions.len(), sphere.normals.len());
        assert_eq!(sphere.positions.len(), sphere.tex_coords.len());
        assert_outward(&sphere);
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertex_count(), 9);
        assert_eq!(plane.indices.len(), 24);
        assert_outward(&plane);
    }

    #[test]
    fn test_face_normals_match_generated() {
        let plane = generate_plane(4.0, 4.0, 1, 1);
        let normals = calculate_face_normals(&plane.positions, &plane.indices);
        for n in normals {
            assert!((n[1] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_tangents_follow_u_direction() {
        let plane = generate_plane(2.0, 2.0, 1, 1);
        let mut vertices = plane.to_vertices();
        for v in &vertices {
            assert!((v.tangent[0] - 1.0).abs() < 1e-5, "{:?}", v.tangent);
        }

        // Degenerate UVs leave tangents zeroed
        for v in vertices.iter_mut() {
            v.uv = [0.0, 0.0];
        }
        calculate_tangents(&mut vertices, &plane.indices);
        assert!(vertices.iter().all(|v| v.tangent == [0.0; 3]));
    }
}
