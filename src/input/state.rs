use std::collections::HashSet;

use winit::event::{DeviceEvent, ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::InputSource;

/// Input captured for a single frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    keys_down: HashSet<KeyCode>,
    mouse_left_down: bool,
    mouse_delta: (f32, f32),
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: mark a key as held
    pub fn with_key(mut self, key: KeyCode) -> Self {
        self.keys_down.insert(key);
        self
    }

    /// Builder pattern: hold the left mouse button
    pub fn with_mouse_left(mut self, down: bool) -> Self {
        self.mouse_left_down = down;
        self
    }

    /// Builder pattern: set the pointer delta
    pub fn with_mouse_delta(mut self, dx: f32, dy: f32) -> Self {
        self.mouse_delta = (dx, dy);
        self
    }
}

impl InputSource for InputSnapshot {
    fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    fn mouse_left_down(&self) -> bool {
        self.mouse_left_down
    }

    fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }
}

/// Accumulates winit events between frames.
///
/// Keyboard and mouse can be captured by an overlay (e.g. a debug UI); while
/// captured, snapshots report no keys or no mouse respectively.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    mouse_left_down: bool,
    mouse_delta: (f32, f32),
    keyboard_captured: bool,
    mouse_captured: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.set_key(key, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.mouse_left_down = *state == ElementState::Pressed;
            }
            WindowEvent::Focused(false) => {
                // Releases never arrive for keys held while focus is lost
                self.keys_down.clear();
                self.mouse_left_down = false;
            }
            _ => (),
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.add_mouse_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_down.insert(key);
        } else {
            self.keys_down.remove(&key);
        }
    }

    pub fn set_mouse_left(&mut self, pressed: bool) {
        self.mouse_left_down = pressed;
    }

    pub fn add_mouse_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    pub fn set_keyboard_capture(&mut self, captured: bool) {
        self.keyboard_captured = captured;
    }

    pub fn set_mouse_capture(&mut self, captured: bool) {
        self.mouse_captured = captured;
    }

    /// Takes the input for this frame and resets the accumulated pointer delta.
    pub fn snapshot(&mut self) -> InputSnapshot {
        let mouse_delta = std::mem::take(&mut self.mouse_delta);

        InputSnapshot {
            keys_down: if self.keyboard_captured {
                HashSet::new()
            } else {
                self.keys_down.clone()
            },
            mouse_left_down: self.mouse_left_down && !self.mouse_captured,
            mouse_delta: if self.mouse_captured {
                (0.0, 0.0)
            } else {
                mouse_delta
            },
        }
    }
}
