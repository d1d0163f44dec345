use std::f32::consts::FRAC_PI_4;

use cgmath::{Vector3, Zero};
use winit::keyboard::KeyCode;

use crate::input::InputSource;

/// Scale applied to raw pointer deltas before the look sensitivity.
pub const MOUSE_LOOK_SCALE: f32 = 0.001;

/// Keys driving the six movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraBindings {
    pub forward: KeyCode,
    pub back: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub up: KeyCode,
    pub down: KeyCode,
}

impl Default for CameraBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            back: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            up: KeyCode::Space,
            down: KeyCode::KeyX,
        }
    }
}

impl CameraBindings {
    /// Local-space movement steps for every held key, in application order:
    /// forward, back, left, right, up, down.
    pub fn movement_steps(&self, input: &impl InputSource, distance: f32) -> Vec<Vector3<f32>> {
        [
            (self.forward, Vector3::new(0.0, 0.0, distance)),
            (self.back, Vector3::new(0.0, 0.0, -distance)),
            (self.left, Vector3::new(-distance, 0.0, 0.0)),
            (self.right, Vector3::new(distance, 0.0, 0.0)),
            (self.up, Vector3::new(0.0, distance, 0.0)),
            (self.down, Vector3::new(0.0, -distance, 0.0)),
        ]
        .into_iter()
        .filter(|(key, _)| input.key_down(*key))
        .map(|(_, step)| step)
        .collect()
    }
}

/// Pitch/yaw/roll delta for this frame's mouse-look, or zero when look is off.
pub fn look_delta(input: &impl InputSource, look_sensitivity: f32) -> Vector3<f32> {
    if !input.mouse_left_down() {
        return Vector3::zero();
    }

    let (dx, dy) = input.mouse_delta();
    let scale = MOUSE_LOOK_SCALE * look_sensitivity;
    Vector3::new(scale * dy, scale * dx, 0.0)
}

/// Camera construction parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub move_speed: f32,
    pub look_sensitivity: f32,
    /// Vertical field of view in radians
    pub fov: f32,
    pub bindings: CameraBindings,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            look_sensitivity: 1.0,
            fov: FRAC_PI_4,
            bindings: CameraBindings::default(),
        }
    }
}

impl CameraConfig {
    /// Builder pattern: Set movement speed in units per second
    pub fn with_move_speed(mut self, move_speed: f32) -> Self {
        self.move_speed = move_speed;
        self
    }

    /// Builder pattern: Set mouse-look sensitivity
    pub fn with_look_sensitivity(mut self, look_sensitivity: f32) -> Self {
        self.look_sensitivity = look_sensitivity;
        self
    }

    /// Builder pattern: Set vertical field of view in radians
    pub fn with_fov(mut self, fov: f32) -> Self {
        self.fov = fov;
        self
    }

    /// Builder pattern: Replace the key bindings
    pub fn with_bindings(mut self, bindings: CameraBindings) -> Self {
        self.bindings = bindings;
        self
    }
}
