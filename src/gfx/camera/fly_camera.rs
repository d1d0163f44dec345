use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};

use super::camera_controller::{look_delta, CameraBindings, CameraConfig};
use super::camera_utils::{look_to_lh, perspective_fov_lh, FAR_CLIP, NEAR_CLIP};
use crate::gfx::transform::Transform;
use crate::input::InputSource;

/// First-person fly camera.
///
/// The view matrix is rebuilt on every [`Camera::update_view_matrix`] call and
/// is *not* tracked against transform changes: after editing the transform
/// directly, call `update_view_matrix` before the next draw. The projection is
/// only rebuilt when the field of view or aspect ratio changes.
#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    pub move_speed: f32,
    pub look_sensitivity: f32,
    pub bindings: CameraBindings,
    fov: f32,
    aspect_ratio: f32,
}

impl Camera {
    pub fn new(
        position: Vector3<f32>,
        move_speed: f32,
        look_sensitivity: f32,
        fov: f32,
        aspect_ratio: f32,
    ) -> Self {
        let mut transform = Transform::new();
        transform.set_position(position);

        let mut camera = Self {
            transform,
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            move_speed,
            look_sensitivity,
            bindings: CameraBindings::default(),
            fov,
            aspect_ratio,
        };
        camera.update_view_matrix();
        camera.update_projection_matrix(fov, aspect_ratio);
        camera
    }

    pub fn from_config(position: Vector3<f32>, aspect_ratio: f32, config: &CameraConfig) -> Self {
        let mut camera = Self::new(
            position,
            config.move_speed,
            config.look_sensitivity,
            config.fov,
            aspect_ratio,
        );
        camera.bindings = config.bindings;
        camera
    }

    /// Applies one frame of navigation input, then rebuilds the view matrix.
    pub fn update(&mut self, delta_time: f32, input: &impl InputSource) {
        let speed = self.move_speed * delta_time;
        for step in self.bindings.movement_steps(input, speed) {
            self.transform.move_relative(step);
        }

        if input.mouse_left_down() {
            self.transform
                .rotate(look_delta(input, self.look_sensitivity));
        }

        self.update_view_matrix();
    }

    pub fn update_view_matrix(&mut self) {
        let position = self.transform.position();
        let forward = self.transform.forward();
        self.view = look_to_lh(position, forward, Vector3::unit_y());
    }

    pub fn update_projection_matrix(&mut self, fov: f32, aspect_ratio: f32) {
        self.fov = fov;
        self.aspect_ratio = aspect_ratio;
        self.projection = perspective_fov_lh(Rad(fov), aspect_ratio, NEAR_CLIP, FAR_CLIP);
    }

    /// Rebuilds the projection for a new viewport, keeping the field of view.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.update_projection_matrix(self.fov, aspect_ratio);
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn position(&self) -> Vector3<f32> {
        self.transform.position()
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }
}
