//! # Prelude
//!
//! Common imports for building and drawing a scene.
//!
//! ```rust
//! use forward_sandbox::prelude::*;
//!
//! let mut transform = Transform::new();
//! transform.move_absolute(Vector3::new(0.0, 1.0, 0.0));
//! assert_eq!(transform.position(), Vector3::new(0.0, 1.0, 0.0));
//! ```

pub use crate::gfx::camera::{Camera, CameraBindings, CameraConfig};
pub use crate::gfx::geometry::{generate_cube, generate_plane, generate_sphere, GeometryData};
pub use crate::gfx::rendering::{CommandList, DeviceContext, FrameParams, RenderCommand};
pub use crate::gfx::resources::{
    Light, Material, ParamLayout, SamplerHandle, ShaderError, ShaderProgram, ShaderStage,
    SharedMaterial, TextureHandle, UniformKind,
};
pub use crate::gfx::scene::{Entity, Mesh, Scene, SceneError, Sky};
pub use crate::gfx::transform::Transform;
pub use crate::input::{InputSnapshot, InputSource, InputState};
pub use crate::logging::{init_logging, LoggingConfig};

pub use cgmath::{Vector2, Vector3};
