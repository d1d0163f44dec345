use std::rc::Rc;

use super::mesh::Mesh;
use crate::gfx::camera::Camera;
use crate::gfx::rendering::DeviceContext;
use crate::gfx::resources::material::{check_shader_pair, SharedShader};
use crate::gfx::resources::{
    ParamLayout, SamplerHandle, ShaderError, TextureHandle, UniformKind,
};

pub const CUBE_MAP_SLOT: &str = "CubeMap";
pub const SKY_SAMPLER_SLOT: &str = "BasicSampler";

/// Uniform block expected by sky vertex shaders.
pub fn sky_vertex_layout() -> ParamLayout {
    ParamLayout::new()
        .with("view", UniformKind::Matrix4x4)
        .with("projection", UniformKind::Matrix4x4)
}

/// Cube-mapped background drawn after the scene's entities.
///
/// The sky's pipeline draws the inside of its mesh and tests depth with
/// less-or-equal, so the shader is expected to push every vertex to the far
/// plane.
#[derive(Debug, Clone)]
pub struct Sky {
    mesh: Rc<Mesh>,
    vertex_shader: SharedShader,
    pixel_shader: SharedShader,
    cube_map: TextureHandle,
    sampler: SamplerHandle,
}

impl Sky {
    pub fn new(
        mesh: Rc<Mesh>,
        vertex_shader: SharedShader,
        pixel_shader: SharedShader,
        cube_map: TextureHandle,
        sampler: SamplerHandle,
    ) -> Self {
        Self {
            mesh,
            vertex_shader,
            pixel_shader,
            cube_map,
            sampler,
        }
    }

    pub fn cube_map(&self) -> TextureHandle {
        self.cube_map
    }

    pub fn set_cube_map(&mut self, cube_map: TextureHandle) {
        self.cube_map = cube_map;
    }

    pub fn draw(&self, ctx: &mut dyn DeviceContext, camera: &Camera) -> Result<(), ShaderError> {
        check_shader_pair(&self.vertex_shader, &self.pixel_shader)?;
        let mut vs = self.vertex_shader.borrow_mut();
        let ps = self.pixel_shader.borrow();

        vs.set_shader(ctx);
        ps.set_shader(ctx);

        vs.set_matrix4x4("view", camera.view())?;
        vs.set_matrix4x4("projection", camera.projection())?;
        vs.copy_all_buffer_data(ctx);
        ps.copy_all_buffer_data(ctx);

        ps.set_shader_resource_view(ctx, CUBE_MAP_SLOT, self.cube_map)?;
        ps.set_sampler_state(ctx, SKY_SAMPLER_SLOT, self.sampler)?;

        self.mesh.set_buffers_and_draw(ctx);
        Ok(())
    }
}
