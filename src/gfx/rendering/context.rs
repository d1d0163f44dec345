//! Device context abstraction
//!
//! Everything above this module issues GPU work through [`DeviceContext`].
//! The in-crate implementation is [`CommandList`], which records commands
//! in submission order; a recorded list can be inspected directly or
//! replayed onto a `wgpu::RenderPass` via
//! [`GpuResources`](crate::wgpu_utils::GpuResources).

use cgmath::Vector2;

use crate::gfx::resources::{MeshId, SamplerHandle, ShaderId, ShaderStage, TextureHandle};

/// Immediate-mode device operations used by the scene layer.
pub trait DeviceContext {
    fn set_shader(&mut self, stage: ShaderStage, shader: ShaderId);
    fn update_uniforms(&mut self, stage: ShaderStage, shader: ShaderId, data: &[u8]);
    fn bind_texture(&mut self, stage: ShaderStage, binding: u32, texture: TextureHandle);
    fn bind_sampler(&mut self, stage: ShaderStage, binding: u32, sampler: SamplerHandle);
    fn set_mesh_buffers(&mut self, mesh: MeshId);
    fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32);
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    SetShader {
        stage: ShaderStage,
        shader: ShaderId,
    },
    UpdateUniforms {
        stage: ShaderStage,
        shader: ShaderId,
        data: Vec<u8>,
    },
    BindTexture {
        stage: ShaderStage,
        binding: u32,
        texture: TextureHandle,
    },
    BindSampler {
        stage: ShaderStage,
        binding: u32,
        sampler: SamplerHandle,
    },
    SetMeshBuffers {
        mesh: MeshId,
    },
    DrawIndexed {
        index_count: u32,
        start_index: u32,
        base_vertex: i32,
    },
}

/// Per-frame values shared by every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub delta_time: f32,
    /// Viewport size in pixels
    pub resolution: Vector2<f32>,
}

impl FrameParams {
    pub fn new(delta_time: f32, width: f32, height: f32) -> Self {
        Self {
            delta_time,
            resolution: Vector2::new(width, height),
        }
    }
}

/// Recording [`DeviceContext`].
#[derive(Debug, Clone, Default)]
pub struct CommandList {
    commands: Vec<RenderCommand>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Every `DrawIndexed` in the list as `(index_count, start_index, base_vertex)`.
    pub fn draw_calls(&self) -> Vec<(u32, u32, i32)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::DrawIndexed {
                    index_count,
                    start_index,
                    base_vertex,
                } => Some((*index_count, *start_index, *base_vertex)),
                _ => None,
            })
            .collect()
    }

    /// Uniform blocks uploaded for a given stage, oldest first.
    pub fn uniform_uploads(&self, stage: ShaderStage) -> Vec<&[u8]> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::UpdateUniforms { stage: s, data, .. } if *s == stage => {
                    Some(data.as_slice())
                }
                _ => None,
            })
            .collect()
    }
}

impl DeviceContext for CommandList {
    fn set_shader(&mut self, stage: ShaderStage, shader: ShaderId) {
        self.commands.push(RenderCommand::SetShader { stage, shader });
    }

    fn update_uniforms(&mut self, stage: ShaderStage, shader: ShaderId, data: &[u8]) {
        self.commands.push(RenderCommand::UpdateUniforms {
            stage,
            shader,
            data: data.to_vec(),
        });
    }

    fn bind_texture(&mut self, stage: ShaderStage, binding: u32, texture: TextureHandle) {
        self.commands.push(RenderCommand::BindTexture {
            stage,
            binding,
            texture,
        });
    }

    fn bind_sampler(&mut self, stage: ShaderStage, binding: u32, sampler: SamplerHandle) {
        self.commands.push(RenderCommand::BindSampler {
            stage,
            binding,
            sampler,
        });
    }

    fn set_mesh_buffers(&mut self, mesh: MeshId) {
        self.commands.push(RenderCommand::SetMeshBuffers { mesh });
    }

    fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32) {
        self.commands.push(RenderCommand::DrawIndexed {
            index_count,
            start_index,
            base_vertex,
        });
    }
}
