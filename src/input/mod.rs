//! # Input
//!
//! Per-frame input snapshots for camera navigation.
//!
//! [`InputState`] is fed winit events as they arrive and hands out one
//! [`InputSnapshot`] per frame. Consumers such as
//! [`Camera::update`](crate::gfx::camera::Camera::update) only see the
//! [`InputSource`] trait, so there is no global input singleton.

pub mod state;

pub use state::{InputSnapshot, InputState};

use winit::keyboard::KeyCode;

/// Read-only view of the input devices for one frame.
pub trait InputSource {
    fn key_down(&self, key: KeyCode) -> bool;

    /// Whether mouse-look is enabled (left mouse button held).
    fn mouse_left_down(&self) -> bool;

    /// Pointer movement since the previous frame, in pixels.
    fn mouse_delta(&self) -> (f32, f32);
}
