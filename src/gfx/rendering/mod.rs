//! Device-facing rendering interface
//!
//! The scene records its work through [`DeviceContext`]; [`CommandList`] is
//! the recording implementation used for replay and inspection.

pub mod context;

pub use context::{CommandList, DeviceContext, FrameParams, RenderCommand};
