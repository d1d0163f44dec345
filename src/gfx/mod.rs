//! # Graphics Module
//!
//! - **Transform** ([`transform`]) - position / pitch-yaw-roll / scale with lazily cached matrices
//! - **Camera** ([`camera`]) - first-person fly camera with left-handed view and projection
//! - **Resources** ([`resources`]) - shader programs, materials, lights and opaque handles
//! - **Rendering** ([`rendering`]) - the device context the scene records into
//! - **Scene** ([`scene`]) - meshes, entities, the sky and the frame driver
//! - **Geometry** ([`geometry`]) - procedural primitives
//!
//! Per frame the [`Scene`] updates its active camera from input, then each
//! entity activates its material's shaders, uploads transform, camera and
//! material parameters, binds textures and samplers, and issues one indexed
//! draw.

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod transform;

pub use camera::Camera;
pub use scene::Scene;
pub use transform::Transform;
