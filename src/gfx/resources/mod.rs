//! Shader, material and light resources
//!
//! Everything here is CPU-side: GPU objects are referred to by the opaque
//! handles in [`handles`].

pub mod handles;
pub mod light;
pub mod material;
pub mod shader;

pub use handles::{MeshId, SamplerHandle, ShaderId, TextureHandle};
pub use light::{Light, LIGHT_TYPE_DIRECTIONAL, LIGHT_TYPE_POINT, LIGHT_TYPE_SPOT, MAX_LIGHTS};
pub use material::{
    check_shader_pair, default_lit_pixel_layout, entity_pixel_layout, entity_vertex_layout,
    lit_pixel_layout, Material, SharedMaterial, SharedShader,
};
pub use shader::{
    ParamEntry, ParamLayout, ShaderError, ShaderProgram, ShaderStage, TextureDimension,
    TextureSlot, UniformKind, UniformValue,
};
