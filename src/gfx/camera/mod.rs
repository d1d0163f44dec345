pub mod camera_controller;
pub mod camera_utils;
pub mod fly_camera;

// Re-export main types
pub use camera_controller::{CameraBindings, CameraConfig};
pub use camera_utils::{FAR_CLIP, NEAR_CLIP};
pub use fly_camera::Camera;
