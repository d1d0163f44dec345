use cgmath::{InnerSpace, Matrix4, Rad, Vector3};

/// Near clip distance shared by every camera.
pub const NEAR_CLIP: f32 = 0.01;
/// Far clip distance shared by every camera.
pub const FAR_CLIP: f32 = 1000.0;

/// Left-handed perspective projection with a [0, 1] depth range.
///
/// Stored in cgmath's column-major layout, which matches the row-major layout
/// of the equivalent row-vector matrix.
pub fn perspective_fov_lh(fov: Rad<f32>, aspect_ratio: f32, near: f32, far: f32) -> Matrix4<f32> {
    let h = 1.0 / (fov.0 * 0.5).tan();
    let w = h / aspect_ratio;
    let range = far / (far - near);

    #[rustfmt::skip]
    let projection = Matrix4::new(
        w,   0.0, 0.0,            0.0,
        0.0, h,   0.0,            0.0,
        0.0, 0.0, range,          1.0,
        0.0, 0.0, -range * near,  0.0,
    );
    projection
}

/// Left-handed view matrix looking from `eye` along `direction`.
pub fn look_to_lh(eye: Vector3<f32>, direction: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    let f = direction.normalize();
    let s = up.cross(f).normalize();
    let u = f.cross(s);

    #[rustfmt::skip]
    let view = Matrix4::new(
        s.x,          u.x,          f.x,          0.0,
        s.y,          u.y,          f.y,          0.0,
        s.z,          u.z,          f.z,          0.0,
        -eye.dot(s),  -eye.dot(u),  -eye.dot(f),  1.0,
    );
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector4, Zero};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_perspective_maps_near_and_far_to_unit_depth() {
        let proj = perspective_fov_lh(Rad(FRAC_PI_2), 1.0, NEAR_CLIP, FAR_CLIP);

        let near = proj * Vector4::new(0.0, 0.0, NEAR_CLIP, 1.0);
        let far = proj * Vector4::new(0.0, 0.0, FAR_CLIP, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_perspective_aspect_only_scales_x() {
        let square = perspective_fov_lh(Rad(FRAC_PI_2), 1.0, NEAR_CLIP, FAR_CLIP);
        let wide = perspective_fov_lh(Rad(FRAC_PI_2), 2.0, NEAR_CLIP, FAR_CLIP);
        assert!((wide.x.x - square.x.x * 0.5).abs() < 1e-6);
        assert_eq!(wide.y.y, square.y.y);
        assert_eq!(wide.z, square.z);
    }

    #[test]
    fn test_look_to_is_left_handed() {
        let view = look_to_lh(Vector3::zero(), Vector3::unit_z(), Vector3::unit_y());
        // Looking down +z in a left-handed view is the identity
        let point = view * Vector4::new(1.0f32, 2.0, 3.0, 1.0);
        let expected = Vector4::new(1.0f32, 2.0, 3.0, 1.0);
        for i in 0..4 {
            assert!((point[i] - expected[i]).abs() < 1e-5);
        }

        let moved = look_to_lh(Vector3::new(0.0, 0.0, -5.0), Vector3::unit_z(), Vector3::unit_y());
        let origin = moved * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.z - 5.0).abs() < 1e-5);
    }
}
