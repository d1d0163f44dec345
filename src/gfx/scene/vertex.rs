//! # Vertex Data Structures
//!
//! GPU vertex format shared by every mesh in the sandbox.

/// A mesh vertex with position, normal, texture coordinate and tangent.
///
/// `#[repr(C)]` keeps the layout stable for direct upload into a vertex
/// buffer; attribute locations follow field order.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Surface tangent, used for normal mapping
    pub tangent: [f32; 3],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            tangent: [0.0; 3],
        }
    }

    /// Vertex buffer layout for pipeline creation.
    ///
    /// - Location 0: position (Float32x3)
    /// - Location 1: normal (Float32x3)
    /// - Location 2: uv (Float32x2)
    /// - Location 3: tangent (Float32x3)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
            3 => Float32x3,
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}
