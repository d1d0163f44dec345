//! # Transform
//!
//! Hierarchy-free spatial state for entities and cameras.
//!
//! A [`Transform`] stores position, pitch/yaw/roll and a componentwise scale,
//! and derives its world matrix and basis vectors lazily. Two independent
//! dirty flags guard the caches:
//!
//! - the matrix flag is raised by every position, rotation or scale change
//! - the vectors flag is raised by rotation changes only
//!
//! Nothing is recomputed until the corresponding getter is called.
//!
//! ## Conventions
//!
//! The world matrix is `Scale, then Rotation, then Translation`. cgmath uses
//! column vectors, so the product is written `T * R * S`; its memory layout is
//! the same as the row-vector `S * R * T` form shaders expect. The rotation
//! applies roll (Z) first, then pitch (X), then yaw (Y).

use cgmath::{
    Matrix, Matrix4, Quaternion, Rad, Rotation, Rotation3, SquareMatrix, Vector3, Zero,
};

#[derive(Debug, Clone)]
pub struct Transform {
    position: Vector3<f32>,
    pitch_yaw_roll: Vector3<f32>,
    scale: Vector3<f32>,

    forward: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,

    world_matrix: Matrix4<f32>,
    world_inverse_transpose: Matrix4<f32>,

    matrix_dirty: bool,
    vectors_dirty: bool,

    #[cfg(test)]
    matrix_recomputes: u32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Identity transform: origin, no rotation, unit scale.
    pub fn new() -> Self {
        Self {
            position: Vector3::zero(),
            pitch_yaw_roll: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            forward: Vector3::unit_z(),
            right: Vector3::unit_x(),
            up: Vector3::unit_y(),
            world_matrix: Matrix4::identity(),
            world_inverse_transpose: Matrix4::identity(),
            matrix_dirty: false,
            vectors_dirty: false,
            #[cfg(test)]
            matrix_recomputes: 0,
        }
    }

    // Setters

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
        self.matrix_dirty = true;
    }

    /// Sets pitch (x), yaw (y) and roll (z) in radians.
    pub fn set_rotation(&mut self, pitch_yaw_roll: Vector3<f32>) {
        self.pitch_yaw_roll = pitch_yaw_roll;
        self.matrix_dirty = true;
        self.vectors_dirty = true;
    }

    /// Sets the scale. Zero components are accepted and yield a singular matrix.
    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
        self.matrix_dirty = true;
    }

    // Raw state

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn pitch_yaw_roll(&self) -> Vector3<f32> {
        self.pitch_yaw_roll
    }

    pub fn scale_factors(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn is_matrix_dirty(&self) -> bool {
        self.matrix_dirty
    }

    pub fn is_vectors_dirty(&self) -> bool {
        self.vectors_dirty
    }

    // Transformers

    /// Moves along the world axes.
    pub fn move_absolute(&mut self, offset: Vector3<f32>) {
        self.position += offset;
        self.matrix_dirty = true;
    }

    /// Moves along the transform's own axes: the offset is rotated by the
    /// current orientation before it is applied.
    pub fn move_relative(&mut self, offset: Vector3<f32>) {
        self.position += self.orientation().rotate_vector(offset);
        self.matrix_dirty = true;
    }

    /// Adds to pitch/yaw/roll. This is plain Euler accumulation, so two
    /// rotations compose componentwise rather than as rotation matrices.
    pub fn rotate(&mut self, pitch_yaw_roll: Vector3<f32>) {
        self.pitch_yaw_roll += pitch_yaw_roll;
        self.matrix_dirty = true;
        self.vectors_dirty = true;
    }

    /// Multiplies the current scale componentwise.
    pub fn scale(&mut self, factor: Vector3<f32>) {
        self.scale.x *= factor.x;
        self.scale.y *= factor.y;
        self.scale.z *= factor.z;
        self.matrix_dirty = true;
    }

    // Derived state

    /// Orientation quaternion built from pitch/yaw/roll (roll, then pitch, then yaw).
    pub fn orientation(&self) -> Quaternion<f32> {
        Quaternion::from_angle_y(Rad(self.pitch_yaw_roll.y))
            * Quaternion::from_angle_x(Rad(self.pitch_yaw_roll.x))
            * Quaternion::from_angle_z(Rad(self.pitch_yaw_roll.z))
    }

    pub fn world_matrix(&mut self) -> Matrix4<f32> {
        if self.matrix_dirty {
            self.update_matrices();
        }
        self.world_matrix
    }

    /// Inverse of the transposed world matrix, for transforming normals.
    /// A singular world matrix yields the zero matrix.
    pub fn world_inverse_transpose_matrix(&mut self) -> Matrix4<f32> {
        if self.matrix_dirty {
            self.update_matrices();
        }
        self.world_inverse_transpose
    }

    pub fn forward(&mut self) -> Vector3<f32> {
        self.update_vectors();
        self.forward
    }

    pub fn right(&mut self) -> Vector3<f32> {
        self.update_vectors();
        self.right
    }

    pub fn up(&mut self) -> Vector3<f32> {
        self.update_vectors();
        self.up
    }

    fn update_matrices(&mut self) {
        let t = Matrix4::from_translation(self.position);
        let r = Matrix4::from_angle_y(Rad(self.pitch_yaw_roll.y))
            * Matrix4::from_angle_x(Rad(self.pitch_yaw_roll.x))
            * Matrix4::from_angle_z(Rad(self.pitch_yaw_roll.z));
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);

        let world = t * r * s;
        self.world_matrix = world;
        self.world_inverse_transpose = world
            .transpose()
            .invert()
            .unwrap_or_else(Matrix4::zero);
        self.matrix_dirty = false;

        #[cfg(test)]
        {
            self.matrix_recomputes += 1;
        }
    }

    fn update_vectors(&mut self) {
        if !self.vectors_dirty {
            return;
        }

        let orientation = self.orientation();
        self.forward = orientation.rotate_vector(Vector3::unit_z());
        self.right = orientation.rotate_vector(Vector3::unit_x());
        self.up = orientation.rotate_vector(Vector3::unit_y());
        self.vectors_dirty = false;
    }
}
