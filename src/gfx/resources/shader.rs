//! Shader programs and their named parameters
//!
//! A [`ShaderProgram`] is one pipeline stage plus the reflection data needed
//! to address its parameters by name: a [`ParamLayout`] describing the
//! uniform block, and the binding slots of its textures and samplers.
//!
//! Uniform writes land in a CPU staging block and reach the GPU only when
//! [`ShaderProgram::copy_all_buffer_data`] is called. Unknown names are
//! rejected with a [`ShaderError`].

use std::collections::HashMap;

use cgmath::Matrix4;
use thiserror::Error;

use super::handles::{SamplerHandle, ShaderId, TextureHandle};
use crate::gfx::rendering::DeviceContext;

/// Pipeline stage a program runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    /// Bind group index used for this stage's resources.
    pub fn bind_group(self) -> u32 {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::Pixel => 1,
        }
    }
}

/// Shape of a texture slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    D2,
    Cube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSlot {
    pub binding: u32,
    pub dimension: TextureDimension,
}

/// Type of a uniform-block member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Matrix4x4,
    /// Raw bytes, e.g. an array of structs
    Data(usize),
}

impl UniformKind {
    pub fn size(self) -> usize {
        match self {
            UniformKind::Float | UniformKind::Int => 4,
            UniformKind::Float2 => 8,
            UniformKind::Float3 => 12,
            UniformKind::Float4 => 16,
            UniformKind::Matrix4x4 => 64,
            UniformKind::Data(size) => size,
        }
    }

    /// Alignment under WGSL uniform address space rules.
    fn alignment(self) -> usize {
        match self {
            UniformKind::Float | UniformKind::Int => 4,
            UniformKind::Float2 => 8,
            _ => 16,
        }
    }
}

/// A typed uniform value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
    Int(i32),
    Matrix4x4(Matrix4<f32>),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Float2(_) => UniformKind::Float2,
            UniformValue::Float3(_) => UniformKind::Float3,
            UniformValue::Float4(_) => UniformKind::Float4,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Matrix4x4(_) => UniformKind::Matrix4x4,
        }
    }

    fn write_to(&self, dst: &mut [u8]) {
        match self {
            UniformValue::Float(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Float2(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Float3(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Float4(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Int(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Matrix4x4(m) => {
                let data: &[f32; 16] = m.as_ref();
                dst.copy_from_slice(bytemuck::cast_slice(data));
            }
        }
    }

    fn read_from(kind: UniformKind, src: &[u8]) -> Option<Self> {
        let value = match kind {
            UniformKind::Float => UniformValue::Float(bytemuck::pod_read_unaligned(src)),
            UniformKind::Float2 => UniformValue::Float2(bytemuck::pod_read_unaligned(src)),
            UniformKind::Float3 => UniformValue::Float3(bytemuck::pod_read_unaligned(src)),
            UniformKind::Float4 => UniformValue::Float4(bytemuck::pod_read_unaligned(src)),
            UniformKind::Int => UniformValue::Int(bytemuck::pod_read_unaligned(src)),
            UniformKind::Matrix4x4 => {
                let m: [[f32; 4]; 4] = bytemuck::pod_read_unaligned(src);
                UniformValue::Matrix4x4(m.into())
            }
            UniformKind::Data(_) => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShaderError {
    #[error("shader '{shader}' has no variable named '{name}'")]
    UnknownVariable { shader: String, name: String },

    #[error("variable '{name}' in shader '{shader}' is {expected:?}, got {actual:?}")]
    TypeMismatch {
        shader: String,
        name: String,
        expected: UniformKind,
        actual: UniformKind,
    },

    #[error("shader '{shader}' has no texture named '{name}'")]
    UnknownTexture { shader: String, name: String },

    #[error("shader '{shader}' has no sampler named '{name}'")]
    UnknownSampler { shader: String, name: String },

    #[error("shader '{shader}' is a {actual:?} shader, expected {expected:?}")]
    StageMismatch {
        shader: String,
        expected: ShaderStage,
        actual: ShaderStage,
    },
}

/// One member of a uniform block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamEntry {
    pub name: String,
    pub kind: UniformKind,
    pub offset: usize,
}

/// Reflected layout of a uniform block.
///
/// Members are packed in declaration order; each starts at the next offset
/// satisfying its alignment and the block size is rounded up to 16 bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamLayout {
    entries: Vec<ParamEntry>,
    end: usize,
}

impl ParamLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: append a member
    pub fn with(mut self, name: &str, kind: UniformKind) -> Self {
        let align = kind.alignment();
        let offset = self.end.div_ceil(align) * align;
        self.entries.push(ParamEntry {
            name: name.to_string(),
            kind,
            offset,
        });
        self.end = offset + kind.size();
        self
    }

    pub fn entries(&self) -> &[ParamEntry] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&ParamEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Block size in bytes, padded to a multiple of 16.
    pub fn size(&self) -> usize {
        self.end.div_ceil(16) * 16
    }

    /// Decodes a member from a staging block laid out by this layout.
    pub fn read(&self, block: &[u8], name: &str) -> Option<UniformValue> {
        let entry = self.find(name)?;
        let bytes = block.get(entry.offset..entry.offset + entry.kind.size())?;
        UniformValue::read_from(entry.kind, bytes)
    }
}

/// A single shader stage with named, validated parameters.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    id: ShaderId,
    label: String,
    stage: ShaderStage,
    layout: ParamLayout,
    staging: Vec<u8>,
    textures: HashMap<String, TextureSlot>,
    samplers: HashMap<String, u32>,
}

impl ShaderProgram {
    pub fn new(label: &str, stage: ShaderStage, layout: ParamLayout) -> Self {
        let staging = vec![0; layout.size()];
        Self {
            id: ShaderId::next(),
            label: label.to_string(),
            stage,
            layout,
            staging,
            textures: HashMap::new(),
            samplers: HashMap::new(),
        }
    }

    /// Builder pattern: declare a 2D texture slot
    pub fn with_texture(mut self, name: &str, binding: u32) -> Self {
        let slot = TextureSlot {
            binding,
            dimension: TextureDimension::D2,
        };
        self.textures.insert(name.to_string(), slot);
        self
    }

    /// Builder pattern: declare a cube-map slot
    pub fn with_cube_texture(mut self, name: &str, binding: u32) -> Self {
        let slot = TextureSlot {
            binding,
            dimension: TextureDimension::Cube,
        };
        self.textures.insert(name.to_string(), slot);
        self
    }

    /// Builder pattern: declare a sampler slot
    pub fn with_sampler(mut self, name: &str, binding: u32) -> Self {
        self.samplers.insert(name.to_string(), binding);
        self
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn layout(&self) -> &ParamLayout {
        &self.layout
    }

    pub fn texture_slots(&self) -> impl Iterator<Item = (&str, TextureSlot)> + '_ {
        self.textures.iter().map(|(name, slot)| (name.as_str(), *slot))
    }

    pub fn sampler_slots(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.samplers.iter().map(|(name, binding)| (name.as_str(), *binding))
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.layout.find(name).is_some()
    }

    /// Size in bytes of a declared variable.
    pub fn variable_size(&self, name: &str) -> Option<usize> {
        self.layout.find(name).map(|entry| entry.kind.size())
    }

    /// Reads back a staged value.
    pub fn staged(&self, name: &str) -> Option<UniformValue> {
        self.layout.read(&self.staging, name)
    }

    pub fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), ShaderError> {
        let entry = self.entry(name)?;
        if entry.kind != value.kind() {
            return Err(self.type_mismatch(name, entry.kind, value.kind()));
        }

        let range = entry.offset..entry.offset + entry.kind.size();
        value.write_to(&mut self.staging[range]);
        Ok(())
    }

    pub fn set_matrix4x4(&mut self, name: &str, value: Matrix4<f32>) -> Result<(), ShaderError> {
        self.set_uniform(name, UniformValue::Matrix4x4(value))
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<(), ShaderError> {
        self.set_uniform(name, UniformValue::Float(value))
    }

    pub fn set_float2(&mut self, name: &str, value: [f32; 2]) -> Result<(), ShaderError> {
        self.set_uniform(name, UniformValue::Float2(value))
    }

    pub fn set_float3(&mut self, name: &str, value: [f32; 3]) -> Result<(), ShaderError> {
        self.set_uniform(name, UniformValue::Float3(value))
    }

    pub fn set_float4(&mut self, name: &str, value: [f32; 4]) -> Result<(), ShaderError> {
        self.set_uniform(name, UniformValue::Float4(value))
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> Result<(), ShaderError> {
        self.set_uniform(name, UniformValue::Int(value))
    }

    /// Copies raw bytes into a `Data` variable. Shorter data leaves the tail untouched.
    pub fn set_data(&mut self, name: &str, data: &[u8]) -> Result<(), ShaderError> {
        let entry = self.entry(name)?;
        match entry.kind {
            UniformKind::Data(size) if data.len() <= size => {
                self.staging[entry.offset..entry.offset + data.len()].copy_from_slice(data);
                Ok(())
            }
            kind => Err(self.type_mismatch(name, kind, UniformKind::Data(data.len()))),
        }
    }

    /// Makes this program the active one for its stage.
    pub fn set_shader(&self, ctx: &mut dyn DeviceContext) {
        ctx.set_shader(self.stage, self.id);
    }

    /// Uploads the whole staging block. Programs without uniforms upload nothing.
    pub fn copy_all_buffer_data(&self, ctx: &mut dyn DeviceContext) {
        if self.staging.is_empty() {
            return;
        }
        ctx.update_uniforms(self.stage, self.id, &self.staging);
    }

    pub fn set_shader_resource_view(
        &self,
        ctx: &mut dyn DeviceContext,
        name: &str,
        texture: TextureHandle,
    ) -> Result<(), ShaderError> {
        let slot = self.textures.get(name).copied().ok_or_else(|| {
            log::warn!("Texture '{}' is not declared by shader '{}'", name, self.label);
            ShaderError::UnknownTexture {
                shader: self.label.clone(),
                name: name.to_string(),
            }
        })?;
        ctx.bind_texture(self.stage, slot.binding, texture);
        Ok(())
    }

    pub fn set_sampler_state(
        &self,
        ctx: &mut dyn DeviceContext,
        name: &str,
        sampler: SamplerHandle,
    ) -> Result<(), ShaderError> {
        let binding = self.samplers.get(name).copied().ok_or_else(|| {
            log::warn!("Sampler '{}' is not declared by shader '{}'", name, self.label);
            ShaderError::UnknownSampler {
                shader: self.label.clone(),
                name: name.to_string(),
            }
        })?;
        ctx.bind_sampler(self.stage, binding, sampler);
        Ok(())
    }

    fn entry(&self, name: &str) -> Result<ParamEntry, ShaderError> {
        self.layout.find(name).cloned().ok_or_else(|| {
            log::warn!("Variable '{}' is not declared by shader '{}'", name, self.label);
            ShaderError::UnknownVariable {
                shader: self.label.clone(),
                name: name.to_string(),
            }
        })
    }

    fn type_mismatch(&self, name: &str, expected: UniformKind, actual: UniformKind) -> ShaderError {
        ShaderError::TypeMismatch {
            shader: self.label.clone(),
            name: name.to_string(),
            expected,
            actual,
        }
    }
}
