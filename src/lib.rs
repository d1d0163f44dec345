// src/lib.rs
//! Forward Sandbox
//!
//! The scene layer of a small forward renderer built on cgmath and wgpu:
//! lazily cached transforms, a first-person camera, materials that bind a
//! shader pair with named parameters and resources, and entities that turn
//! all of it into one indexed draw each.
//!
//! Drawing is recorded through [`gfx::rendering::DeviceContext`]. The
//! recorded [`gfx::rendering::CommandList`] can be inspected directly or
//! replayed onto a wgpu render pass with [`wgpu_utils::GpuResources`].

pub mod gfx;
pub mod input;
pub mod logging;
pub mod prelude;
pub mod wgpu_utils;

pub use logging::{init_logging, LoggingConfig};
