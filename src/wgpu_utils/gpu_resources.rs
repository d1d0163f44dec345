//! wgpu backing for the scene's opaque resource ids
//!
//! [`GpuResources`] owns every device object the scene refers to by id and
//! replays a recorded [`CommandList`] onto a render pass. Each stage's
//! resources live in their own bind group (vertex = group 0, pixel =
//! group 1) with the uniform block at binding 0.

use std::collections::HashMap;

use log::{debug, trace};
use thiserror::Error;
use wgpu::util::DeviceExt;

use super::binding_types;
use super::texture_resource::TextureResource;
use crate::gfx::rendering::{CommandList, RenderCommand};
use crate::gfx::resources::{
    MeshId, SamplerHandle, ShaderId, ShaderProgram, ShaderStage, TextureDimension, TextureHandle,
};
use crate::gfx::scene::{Mesh, Vertex};

#[derive(Debug, Error, PartialEq)]
pub enum ReplayError {
    #[error("shader {0:?} was never registered")]
    UnknownShader(ShaderId),

    #[error("mesh {0:?} was never uploaded")]
    UnknownMesh(MeshId),

    #[error("texture {0:?} was never registered")]
    UnknownTexture(TextureHandle),

    #[error("sampler {0:?} was never registered")]
    UnknownSampler(SamplerHandle),

    #[error("draw issued without an active {0:?} shader")]
    NoActiveShader(ShaderStage),

    #[error("draw issued without mesh buffers")]
    NoMeshBuffers,

    #[error("{stage:?} binding {binding} has nothing bound")]
    UnboundSlot { stage: ShaderStage, binding: u32 },

    #[error("{0:?} shader has uniforms but no matching block was uploaded")]
    MissingUniforms(ShaderStage),
}

/// Fixed-function state for a vertex/pixel pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineStyle {
    /// Back-face culled, depth tested and written
    #[default]
    Opaque,
    /// Inside faces, depth tested less-or-equal without writes
    Sky,
}

struct GpuShader {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
    entry_point: String,
    layout: wgpu::BindGroupLayout,
    uniform_size: usize,
    textures: Vec<(u32, TextureDimension)>,
    samplers: Vec<u32>,
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

/// Per-replay binding state, mirroring what the commands have set so far.
#[derive(Default)]
struct BindState {
    vertex_shader: Option<ShaderId>,
    pixel_shader: Option<ShaderId>,
    uniforms: HashMap<ShaderId, Vec<u8>>,
    textures: HashMap<(ShaderStage, u32), TextureHandle>,
    samplers: HashMap<(ShaderStage, u32), SamplerHandle>,
    mesh: Option<MeshId>,
}

impl BindState {
    /// Latest block uploaded for `shader`, rejected unless it fills the
    /// shader's whole layout.
    fn uniforms_for(
        &self,
        shader: ShaderId,
        stage: ShaderStage,
        size: usize,
    ) -> Result<&[u8], ReplayError> {
        match self.uniforms.get(&shader) {
            Some(data) if data.len() == size => Ok(data.as_slice()),
            _ => Err(ReplayError::MissingUniforms(stage)),
        }
    }
}

pub struct GpuResources {
    color_format: wgpu::TextureFormat,
    shaders: HashMap<ShaderId, GpuShader>,
    meshes: HashMap<MeshId, GpuMesh>,
    textures: Vec<wgpu::TextureView>,
    samplers: Vec<wgpu::Sampler>,
    styles: HashMap<(ShaderId, ShaderId), PipelineStyle>,
    pipelines: HashMap<(ShaderId, ShaderId), wgpu::RenderPipeline>,
}

impl GpuResources {
    pub fn new(color_format: wgpu::TextureFormat) -> Self {
        Self {
            color_format,
            shaders: HashMap::new(),
            meshes: HashMap::new(),
            textures: Vec::new(),
            samplers: Vec::new(),
            styles: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Compiles WGSL for `program` and builds its bind group layout from the
    /// program's declared uniforms, textures and samplers.
    pub fn register_shader(
        &mut self,
        device: &wgpu::Device,
        program: &ShaderProgram,
        wgsl: &str,
        entry_point: &str,
    ) {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program.label()),
            source: wgpu::ShaderSource::Wgsl(wgsl.into()),
        });

        let visibility = binding_types::visibility(program.stage());
        let uniform_size = program.layout().size();
        let mut textures: Vec<(u32, TextureDimension)> = program
            .texture_slots()
            .map(|(_, slot)| (slot.binding, slot.dimension))
            .collect();
        textures.sort_unstable_by_key(|(binding, _)| *binding);
        let mut samplers: Vec<u32> = program.sampler_slots().map(|(_, binding)| binding).collect();
        samplers.sort_unstable();

        let mut entries = Vec::new();
        if uniform_size > 0 {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility,
                ty: binding_types::uniform(),
                count: None,
            });
        }
        entries.extend(textures.iter().map(|(binding, dimension)| wgpu::BindGroupLayoutEntry {
            binding: *binding,
            visibility,
            ty: binding_types::texture(*dimension),
            count: None,
        }));
        entries.extend(samplers.iter().map(|binding| wgpu::BindGroupLayoutEntry {
            binding: *binding,
            visibility,
            ty: binding_types::sampler(),
            count: None,
        }));

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} Bind Group Layout", program.label())),
            entries: &entries,
        });

        debug!(
            "Registered {:?} shader '{}' ({} textures, {} samplers)",
            program.stage(),
            program.label(),
            textures.len(),
            samplers.len()
        );

        self.shaders.insert(
            program.id(),
            GpuShader {
                stage: program.stage(),
                module,
                entry_point: entry_point.to_string(),
                layout,
                uniform_size,
                textures,
                samplers,
            },
        );
    }

    pub fn upload_mesh(&mut self, device: &wgpu::Device, mesh: &Mesh) {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.meshes.insert(
            mesh.id(),
            GpuMesh {
                vertex_buffer,
                index_buffer,
            },
        );
    }

    pub fn add_texture(&mut self, texture: &TextureResource) -> TextureHandle {
        self.textures.push(texture.view.clone());
        TextureHandle(self.textures.len() as u32 - 1)
    }

    pub fn add_sampler(&mut self, sampler: wgpu::Sampler) -> SamplerHandle {
        self.samplers.push(sampler);
        SamplerHandle(self.samplers.len() as u32 - 1)
    }

    /// Overrides the fixed-function state for one shader pairing.
    pub fn set_pipeline_style(&mut self, vertex: ShaderId, pixel: ShaderId, style: PipelineStyle) {
        self.styles.insert((vertex, pixel), style);
        self.pipelines.remove(&(vertex, pixel));
    }

    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Replays recorded commands onto `pass`.
    ///
    /// Uniform uploads become one buffer per draw, so every draw sees the
    /// block that was current when it was recorded.
    pub fn replay(
        &mut self,
        device: &wgpu::Device,
        commands: &CommandList,
        pass: &mut wgpu::RenderPass<'_>,
    ) -> Result<(), ReplayError> {
        let mut state = BindState::default();

        for command in commands.commands() {
            match command {
                RenderCommand::SetShader { stage, shader } => {
                    if !self.shaders.contains_key(shader) {
                        return Err(ReplayError::UnknownShader(*shader));
                    }
                    match stage {
                        ShaderStage::Vertex => state.vertex_shader = Some(*shader),
                        ShaderStage::Pixel => state.pixel_shader = Some(*shader),
                    }
                }
                RenderCommand::UpdateUniforms { shader, data, .. } => {
                    state.uniforms.insert(*shader, data.clone());
                }
                RenderCommand::BindTexture {
                    stage,
                    binding,
                    texture,
                } => {
                    state.textures.insert((*stage, *binding), *texture);
                }
                RenderCommand::BindSampler {
                    stage,
                    binding,
                    sampler,
                } => {
                    state.samplers.insert((*stage, *binding), *sampler);
                }
                RenderCommand::SetMeshBuffers { mesh } => {
                    let gpu_mesh = self.meshes.get(mesh).ok_or(ReplayError::UnknownMesh(*mesh))?;
                    pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    state.mesh = Some(*mesh);
                }
                RenderCommand::DrawIndexed {
                    index_count,
                    start_index,
                    base_vertex,
                } => {
                    if state.mesh.is_none() {
                        return Err(ReplayError::NoMeshBuffers);
                    }
                    let vs = state
                        .vertex_shader
                        .ok_or(ReplayError::NoActiveShader(ShaderStage::Vertex))?;
                    let ps = state
                        .pixel_shader
                        .ok_or(ReplayError::NoActiveShader(ShaderStage::Pixel))?;

                    self.ensure_pipeline(device, vs, ps)?;
                    if let Some(pipeline) = self.pipelines.get(&(vs, ps)) {
                        pass.set_pipeline(pipeline);
                    }

                    for shader in [vs, ps] {
                        let (group, bind_group) = self.stage_bind_group(device, shader, &state)?;
                        pass.set_bind_group(group, &bind_group, &[]);
                    }

                    trace!("draw_indexed({}, {}, {})", index_count, start_index, base_vertex);
                    pass.draw_indexed(
                        *start_index..*start_index + *index_count,
                        *base_vertex,
                        0..1,
                    );
                }
            }
        }

        Ok(())
    }

    fn shader(&self, id: ShaderId) -> Result<&GpuShader, ReplayError> {
        self.shaders.get(&id).ok_or(ReplayError::UnknownShader(id))
    }

    fn stage_bind_group(
        &self,
        device: &wgpu::Device,
        id: ShaderId,
        state: &BindState,
    ) -> Result<(u32, wgpu::BindGroup), ReplayError> {
        let shader = self.shader(id)?;
        let stage = shader.stage;

        let uniform_buffer = if shader.uniform_size > 0 {
            let data = state.uniforms_for(id, stage, shader.uniform_size)?;
            Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Draw Uniforms"),
                contents: data,
                usage: wgpu::BufferUsages::UNIFORM,
            }))
        } else {
            None
        };

        let mut entries = Vec::new();
        if let Some(buffer) = &uniform_buffer {
            entries.push(wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            });
        }
        for (binding, _) in &shader.textures {
            let handle = state
                .textures
                .get(&(stage, *binding))
                .ok_or(ReplayError::UnboundSlot {
                    stage,
                    binding: *binding,
                })?;
            let view = self
                .textures
                .get(handle.0 as usize)
                .ok_or(ReplayError::UnknownTexture(*handle))?;
            entries.push(wgpu::BindGroupEntry {
                binding: *binding,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        for binding in &shader.samplers {
            let handle = state
                .samplers
                .get(&(stage, *binding))
                .ok_or(ReplayError::UnboundSlot {
                    stage,
                    binding: *binding,
                })?;
            let sampler = self
                .samplers
                .get(handle.0 as usize)
                .ok_or(ReplayError::UnknownSampler(*handle))?;
            entries.push(wgpu::BindGroupEntry {
                binding: *binding,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout: &shader.layout,
            entries: &entries,
        });
        Ok((stage.bind_group(), bind_group))
    }

    fn ensure_pipeline(
        &mut self,
        device: &wgpu::Device,
        vs_id: ShaderId,
        ps_id: ShaderId,
    ) -> Result<(), ReplayError> {
        if self.pipelines.contains_key(&(vs_id, ps_id)) {
            return Ok(());
        }

        let vs = self.shader(vs_id)?;
        let ps = self.shader(ps_id)?;
        let style = self.styles.get(&(vs_id, ps_id)).copied().unwrap_or_default();

        let (cull_mode, depth_write_enabled, depth_compare) = match style {
            PipelineStyle::Opaque => (wgpu::Face::Back, true, wgpu::CompareFunction::Less),
            PipelineStyle::Sky => (wgpu::Face::Front, false, wgpu::CompareFunction::LessEqual),
        };

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Draw Pipeline Layout"),
            bind_group_layouts: &[&vs.layout, &ps.layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Draw Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &vs.module,
                entry_point: Some(vs.entry_point.as_str()),
                buffers: &[Vertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &ps.module,
                entry_point: Some(ps.entry_point.as_str()),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                // Left-handed view space: clockwise triangles face the camera
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(cull_mode),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: TextureResource::DEPTH_FORMAT,
                depth_write_enabled,
                depth_compare,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        debug!("Created {:?} pipeline for {:?} + {:?}", style, vs_id, ps_id);
        self.pipelines.insert((vs_id, ps_id), pipeline);
        Ok(())
    }
}

impl CommandList {
    /// Replays this list onto `pass` using `resources` for every id.
    pub fn replay(
        &self,
        resources: &mut GpuResources,
        device: &wgpu::Device,
        pass: &mut wgpu::RenderPass<'_>,
    ) -> Result<(), ReplayError> {
        resources.replay(device, self, pass)
    }
}

/// Records one frame's render pass (clear, replay) into a new encoder and
/// submits it.
pub fn render_frame(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    resources: &mut GpuResources,
    commands: &CommandList,
    target: &wgpu::TextureView,
    depth: &TextureResource,
    clear_color: wgpu::Color,
) -> Result<(), ReplayError> {
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Frame Encoder"),
    });

    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Forward Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        resources.replay(device, commands, &mut pass)?;
    }

    queue.submit(std::iter::once(encoder.finish()));
    Ok(())
}
