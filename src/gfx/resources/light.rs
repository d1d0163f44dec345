use cgmath::{InnerSpace, Vector3};

pub const LIGHT_TYPE_DIRECTIONAL: i32 = 0;
pub const LIGHT_TYPE_POINT: i32 = 1;
pub const LIGHT_TYPE_SPOT: i32 = 2;

/// Upper bound on lights uploaded per draw.
pub const MAX_LIGHTS: usize = 10;

/// GPU light record.
///
/// 64 bytes, matching the pixel shader's `Light` struct: every `vec3` opens
/// a 16-byte row and is followed by a scalar.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Light {
    pub direction: [f32; 3],
    pub light_type: i32,
    pub position: [f32; 3],
    pub range: f32,
    pub color: [f32; 3],
    pub intensity: f32,
    pub spot_falloff: f32,
    pub padding: [f32; 3],
}

/// Unit direction, or zero for a zero-length input.
fn unit_direction(direction: Vector3<f32>) -> [f32; 3] {
    if direction.magnitude2() == 0.0 {
        return [0.0; 3];
    }
    direction.normalize().into()
}

impl Light {
    pub fn directional(direction: Vector3<f32>, color: [f32; 3], intensity: f32) -> Self {
        Self {
            light_type: LIGHT_TYPE_DIRECTIONAL,
            direction: unit_direction(direction),
            color,
            intensity,
            ..bytemuck::Zeroable::zeroed()
        }
    }

    pub fn point(position: Vector3<f32>, range: f32, color: [f32; 3], intensity: f32) -> Self {
        Self {
            light_type: LIGHT_TYPE_POINT,
            position: position.into(),
            range,
            color,
            intensity,
            ..bytemuck::Zeroable::zeroed()
        }
    }

    pub fn spot(
        position: Vector3<f32>,
        direction: Vector3<f32>,
        range: f32,
        spot_falloff: f32,
        color: [f32; 3],
        intensity: f32,
    ) -> Self {
        Self {
            light_type: LIGHT_TYPE_SPOT,
            position: position.into(),
            direction: unit_direction(direction),
            range,
            spot_falloff,
            color,
            intensity,
            ..bytemuck::Zeroable::zeroed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;

    #[test]
    fn test_light_record_is_four_rows() {
        assert_eq!(std::mem::size_of::<Light>(), 64);
        assert_eq!(std::mem::offset_of!(Light, position), 16);
        assert_eq!(std::mem::offset_of!(Light, color), 32);
        assert_eq!(std::mem::offset_of!(Light, spot_falloff), 48);
    }

    #[test]
    fn test_constructors_normalize_direction() {
        let light = Light::directional(Vector3::new(0.0, -2.0, 0.0), [1.0, 1.0, 1.0], 1.0);
        assert_eq!(light.light_type, LIGHT_TYPE_DIRECTIONAL);
        assert_eq!(light.direction, [0.0, -1.0, 0.0]);

        let spot = Light::spot(
            Vector3::new(0.0, 3.0, 0.0),
            Vector3::new(3.0, 0.0, 4.0),
            10.0,
            25.0,
            [1.0, 0.5, 0.0],
            2.0,
        );
        assert_eq!(spot.light_type, LIGHT_TYPE_SPOT);
        assert!((spot.direction[0] - 0.6).abs() < 1e-6);
        assert!((spot.direction[2] - 0.8).abs() < 1e-6);
        assert_eq!(spot.position, [0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_zero_direction_stays_finite() {
        let light = Light::directional(Vector3::zero(), [1.0; 3], 1.0);
        assert_eq!(light.direction, [0.0; 3]);

        let spot = Light::spot(Vector3::zero(), Vector3::zero(), 5.0, 8.0, [1.0; 3], 1.0);
        assert!(spot.direction.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_point_light_has_no_direction() {
        let light = Light::point(Vector3::new(1.0, 2.0, 3.0), 8.0, [0.0, 1.0, 0.0], 1.5);
        assert_eq!(light.light_type, LIGHT_TYPE_POINT);
        assert_eq!(light.direction, [0.0; 3]);
        assert_eq!(light.range, 8.0);
    }
}
