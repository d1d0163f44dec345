//! Opaque resource identifiers
//!
//! The scene layer never touches GPU objects directly. Textures, samplers,
//! shader programs and meshes are referred to by small copyable ids; the
//! device backend ([`GpuResources`](crate::wgpu_utils::GpuResources)) maps
//! them to the real resources.

use std::sync::atomic::{AtomicU32, Ordering};

/// Texture view registered with the device backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Sampler registered with the device backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SamplerHandle(pub u32);

/// Identity of a [`ShaderProgram`](super::shader::ShaderProgram).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

/// Identity of a [`Mesh`](crate::gfx::scene::Mesh).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

static NEXT_SHADER_ID: AtomicU32 = AtomicU32::new(1);
static NEXT_MESH_ID: AtomicU32 = AtomicU32::new(1);

impl ShaderId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SHADER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl MeshId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}
