use std::path::Path;

use anyhow::Context;
use log::{debug, info};

use super::vertex::Vertex;
use crate::gfx::geometry::{calculate_face_normals, calculate_tangents, GeometryData};
use crate::gfx::rendering::DeviceContext;
use crate::gfx::resources::MeshId;

/// Indexed triangle geometry.
///
/// The mesh keeps its CPU-side data; device buffers are created from it by
/// [`GpuResources::upload_mesh`](crate::wgpu_utils::GpuResources::upload_mesh)
/// and addressed through [`Mesh::id`].
#[derive(Debug, Clone)]
pub struct Mesh {
    id: MeshId,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            id: MeshId::next(),
            vertices,
            indices,
        }
    }

    pub fn from_geometry(data: &GeometryData) -> Self {
        Self::new(data.to_vertices(), data.indices.clone())
    }

    /// Loads every model of an OBJ file into a single mesh.
    ///
    /// Normals are computed when the file has none; tangents are always
    /// computed from the texture coordinates.
    pub fn load_obj(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .with_context(|| format!("failed to load OBJ file {}", path.display()))?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for model in &models {
            let mesh = &model.mesh;
            let positions: Vec<[f32; 3]> = mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();

            let normals: Vec<[f32; 3]> = if mesh.normals.len() == mesh.positions.len() {
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| [n[0], n[1], n[2]])
                    .collect()
            } else {
                debug!("Model '{}' has no normals, computing face normals", model.name);
                calculate_face_normals(&positions, &mesh.indices)
            };

            let base = vertices.len() as u32;
            for (i, position) in positions.iter().enumerate() {
                // OBJ texture space has v pointing up
                let uv = mesh
                    .texcoords
                    .get(i * 2..i * 2 + 2)
                    .map(|t| [t[0], 1.0 - t[1]])
                    .unwrap_or([0.0, 0.0]);
                vertices.push(Vertex::new(*position, normals[i], uv));
            }
            indices.extend(mesh.indices.iter().map(|index| base + index));
        }

        calculate_tangents(&mut vertices, &indices);

        info!(
            "Loaded {} ({} models, {} vertices, {} triangles)",
            path.display(),
            models.len(),
            vertices.len(),
            indices.len() / 3
        );

        Ok(Self::new(vertices, indices))
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Binds this mesh's buffers and draws every index once.
    pub fn set_buffers_and_draw(&self, ctx: &mut dyn DeviceContext) {
        ctx.set_mesh_buffers(self.id);
        ctx.draw_indexed(self.index_count(), 0, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;
    use crate::gfx::rendering::{CommandList, RenderCommand};
    use std::io::Write;

    #[test]
    fn test_from_geometry() {
        let mesh = Mesh::from_geometry(&generate_cube());
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert!(mesh.vertices().iter().all(|v| v.tangent != [0.0; 3]));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Mesh::new(Vec::new(), Vec::new());
        let b = Mesh::new(Vec::new(), Vec::new());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_set_buffers_and_draw() {
        let mesh = Mesh::from_geometry(&generate_cube());
        let mut ctx = CommandList::new();
        mesh.set_buffers_and_draw(&mut ctx);
        assert_eq!(
            ctx.commands(),
            &[
                RenderCommand::SetMeshBuffers { mesh: mesh.id() },
                RenderCommand::DrawIndexed {
                    index_count: 36,
                    start_index: 0,
                    base_vertex: 0
                },
            ]
        );
    }

    #[test]
    fn test_empty_mesh_draws_zero_indices() {
        let mesh = Mesh::new(Vec::new(), Vec::new());
        let mut ctx = CommandList::new();
        mesh.set_buffers_and_draw(&mut ctx);
        assert_eq!(ctx.draw_calls(), vec![(0, 0, 0)]);
    }

    #[test]
    fn test_load_obj() {
        let path = std::env::temp_dir().join(format!("mesh_test_{}.obj", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nf 1/1 2/2 3/3 4/4"
        )
        .unwrap();
        drop(file);

        let mesh = Mesh::load_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        // The quad is triangulated
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.vertex_count(), 4);
        for v in mesh.vertices() {
            assert!((v.normal[2].abs() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_load_missing_obj_fails() {
        let err = Mesh::load_obj("does/not/exist.obj").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.obj"));
    }
}
