// src/wgpu_utils/mod.rs
//! wgpu backend for the recorded command stream
//!
//! Owns the device objects behind the scene's resource ids and replays a
//! [`CommandList`](crate::gfx::rendering::CommandList) onto a render pass.

pub mod binding_types;
pub mod builtin_shaders;
pub mod gpu_resources;
pub mod texture_resource;

pub use builtin_shaders::{entity_programs, register_builtin_shaders, sky_programs};
pub use gpu_resources::{render_frame, GpuResources, PipelineStyle, ReplayError};
pub use texture_resource::{create_sampler, TextureResource};
