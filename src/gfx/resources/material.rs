//! Materials: a shader pair plus the resources and parameters it draws with
//!
//! A material is created once during scene setup and shared by every entity
//! that uses it ([`SharedMaterial`]). Edits made through any handle are seen
//! by all of them on their next draw.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use cgmath::Vector3;

use super::handles::{SamplerHandle, TextureHandle};
use super::light::{Light, MAX_LIGHTS};
use super::shader::{ParamLayout, ShaderError, ShaderProgram, ShaderStage, UniformKind};
use crate::gfx::camera::Camera;
use crate::gfx::rendering::{DeviceContext, FrameParams};
use crate::gfx::transform::Transform;

pub type SharedShader = Rc<RefCell<ShaderProgram>>;
pub type SharedMaterial = Rc<RefCell<Material>>;

/// Checks that `vertex_shader` and `pixel_shader` run in their named stages.
///
/// Passing one program for both slots always fails here, before either is
/// borrowed mutably.
pub fn check_shader_pair(
    vertex_shader: &SharedShader,
    pixel_shader: &SharedShader,
) -> Result<(), ShaderError> {
    for (shader, expected) in [
        (vertex_shader, ShaderStage::Vertex),
        (pixel_shader, ShaderStage::Pixel),
    ] {
        let shader = shader.borrow();
        if shader.stage() != expected {
            log::warn!(
                "Shader '{}' bound as {:?} but built for {:?}",
                shader.label(),
                expected,
                shader.stage()
            );
            return Err(ShaderError::StageMismatch {
                shader: shader.label().to_string(),
                expected,
                actual: shader.stage(),
            });
        }
    }
    Ok(())
}

/// Uniform block expected by entity vertex shaders.
pub fn entity_vertex_layout() -> ParamLayout {
    ParamLayout::new()
        .with("world", UniformKind::Matrix4x4)
        .with("view", UniformKind::Matrix4x4)
        .with("projection", UniformKind::Matrix4x4)
        .with("worldInvTranspose", UniformKind::Matrix4x4)
}

/// Uniform block expected by unlit entity pixel shaders.
pub fn entity_pixel_layout() -> ParamLayout {
    ParamLayout::new()
        .with("colorTint", UniformKind::Float4)
        .with("cameraPosition", UniformKind::Float3)
        .with("roughness", UniformKind::Float)
        .with("screenResolution", UniformKind::Float2)
        .with("deltaTime", UniformKind::Float)
}

/// Entity pixel block extended with scene lighting.
pub fn lit_pixel_layout(max_lights: usize) -> ParamLayout {
    entity_pixel_layout()
        .with("ambientColor", UniformKind::Float3)
        .with("lightCount", UniformKind::Int)
        .with(
            "lights",
            UniformKind::Data(max_lights * std::mem::size_of::<Light>()),
        )
}

/// Convenience for a lit pixel shader sized for [`MAX_LIGHTS`].
pub fn default_lit_pixel_layout() -> ParamLayout {
    lit_pixel_layout(MAX_LIGHTS)
}

pub struct Material {
    pub name: String,
    color_tint: [f32; 4],
    roughness: f32,
    vertex_shader: SharedShader,
    pixel_shader: SharedShader,
    textures: BTreeMap<String, TextureHandle>,
    samplers: BTreeMap<String, SamplerHandle>,
}

impl Material {
    pub fn new(
        name: &str,
        color_tint: [f32; 4],
        roughness: f32,
        vertex_shader: SharedShader,
        pixel_shader: SharedShader,
    ) -> Self {
        Self {
            name: name.to_string(),
            color_tint,
            roughness,
            vertex_shader,
            pixel_shader,
            textures: BTreeMap::new(),
            samplers: BTreeMap::new(),
        }
    }

    /// Wraps the material for sharing between entities.
    pub fn shared(self) -> SharedMaterial {
        Rc::new(RefCell::new(self))
    }

    /// Builder pattern: Set RGBA tint
    pub fn with_tint(mut self, color_tint: [f32; 4]) -> Self {
        self.color_tint = color_tint;
        self
    }

    /// Builder pattern: Set roughness
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    /// Builder pattern: Register a texture under a shader resource name
    pub fn with_texture(mut self, name: &str, texture: TextureHandle) -> Self {
        self.add_texture_srv(name, texture);
        self
    }

    /// Builder pattern: Register a sampler under a shader resource name
    pub fn with_sampler(mut self, name: &str, sampler: SamplerHandle) -> Self {
        self.add_sampler(name, sampler);
        self
    }

    /// Inserts or replaces the texture bound under `name`.
    pub fn add_texture_srv(&mut self, name: &str, texture: TextureHandle) {
        self.textures.insert(name.to_string(), texture);
    }

    /// Inserts or replaces the sampler bound under `name`.
    pub fn add_sampler(&mut self, name: &str, sampler: SamplerHandle) {
        self.samplers.insert(name.to_string(), sampler);
    }

    pub fn color_tint(&self) -> [f32; 4] {
        self.color_tint
    }

    pub fn set_color_tint(&mut self, color_tint: [f32; 4]) {
        self.color_tint = color_tint;
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn set_roughness(&mut self, roughness: f32) {
        self.roughness = roughness;
    }

    pub fn vertex_shader(&self) -> &SharedShader {
        &self.vertex_shader
    }

    pub fn set_vertex_shader(&mut self, shader: SharedShader) {
        self.vertex_shader = shader;
    }

    pub fn pixel_shader(&self) -> &SharedShader {
        &self.pixel_shader
    }

    pub fn set_pixel_shader(&mut self, shader: SharedShader) {
        self.pixel_shader = shader;
    }

    pub fn textures(&self) -> &BTreeMap<String, TextureHandle> {
        &self.textures
    }

    pub fn samplers(&self) -> &BTreeMap<String, SamplerHandle> {
        &self.samplers
    }

    /// Stages and binds everything one draw with this material needs.
    ///
    /// Fails with [`ShaderError::StageMismatch`] before recording anything if
    /// the shaders are not a vertex/pixel pair.
    ///
    /// Commands reach `ctx` in a fixed order: both shaders are activated,
    /// uniforms are written and flushed for the vertex then pixel stage, and
    /// finally every texture and sampler is bound to the pixel stage.
    /// `deltaTime` and `screenResolution` are only written when the pixel
    /// shader declares them.
    pub fn set_resources(
        &self,
        transform: &mut Transform,
        camera: &Camera,
        frame: &FrameParams,
        ctx: &mut dyn DeviceContext,
    ) -> Result<(), ShaderError> {
        check_shader_pair(&self.vertex_shader, &self.pixel_shader)?;
        let mut vs = self.vertex_shader.borrow_mut();
        let mut ps = self.pixel_shader.borrow_mut();

        vs.set_shader(ctx);
        ps.set_shader(ctx);

        vs.set_matrix4x4("world", transform.world_matrix())?;
        vs.set_matrix4x4("view", camera.view())?;
        vs.set_matrix4x4("projection", camera.projection())?;
        vs.set_matrix4x4("worldInvTranspose", transform.world_inverse_transpose_matrix())?;

        let eye: Vector3<f32> = camera.position();
        ps.set_float4("colorTint", self.color_tint)?;
        ps.set_float("roughness", self.roughness)?;
        ps.set_float3("cameraPosition", eye.into())?;
        if ps.has_variable("deltaTime") {
            ps.set_float("deltaTime", frame.delta_time)?;
        }
        if ps.has_variable("screenResolution") {
            ps.set_float2("screenResolution", frame.resolution.into())?;
        }

        vs.copy_all_buffer_data(ctx);
        ps.copy_all_buffer_data(ctx);

        for (name, texture) in &self.textures {
            ps.set_shader_resource_view(ctx, name, *texture)?;
        }
        for (name, sampler) in &self.samplers {
            ps.set_sampler_state(ctx, name, *sampler)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name)
            .field("color_tint", &self.color_tint)
            .field("roughness", &self.roughness)
            .field("vertex_shader", &self.vertex_shader.try_borrow().map(|s| s.label().to_string()).ok())
            .field("pixel_shader", &self.pixel_shader.try_borrow().map(|s| s.label().to_string()).ok())
            .field("textures", &self.textures)
            .field("samplers", &self.samplers)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gfx::rendering::{CommandList, RenderCommand};
    use crate::gfx::resources::UniformValue;
    use cgmath::{Matrix4, SquareMatrix};
    use std::f32::consts::FRAC_PI_4;

    pub(crate) fn test_shaders() -> (SharedShader, SharedShader) {
        let vs = ShaderProgram::new("entity_vs", ShaderStage::Vertex, entity_vertex_layout());
        let ps = ShaderProgram::new("entity_ps", ShaderStage::Pixel, entity_pixel_layout())
            .with_texture("SurfaceTexture", 0)
            .with_texture("NormalMap", 1)
            .with_sampler("BasicSampler", 2);
        (Rc::new(RefCell::new(vs)), Rc::new(RefCell::new(ps)))
    }

    pub(crate) fn test_camera() -> Camera {
        Camera::new(Vector3::new(0.0, 0.0, -5.0), 5.0, 1.0, FRAC_PI_4, 16.0 / 9.0)
    }

    #[test]
    fn test_add_resources_overwrites_by_name() {
        let (vs, ps) = test_shaders();
        let mut material = Material::new("m", [1.0; 4], 0.5, vs, ps);
        material.add_texture_srv("SurfaceTexture", TextureHandle(1));
        material.add_texture_srv("SurfaceTexture", TextureHandle(2));
        material.add_sampler("BasicSampler", SamplerHandle(3));

        assert_eq!(material.textures().len(), 1);
        assert_eq!(material.textures()["SurfaceTexture"], TextureHandle(2));
        assert_eq!(material.samplers()["BasicSampler"], SamplerHandle(3));
    }

    #[test]
    fn test_set_resources_command_order() {
        let (vs, ps) = test_shaders();
        let material = Material::new("m", [1.0, 0.0, 0.0, 1.0], 0.5, vs.clone(), ps.clone())
            .with_texture("SurfaceTexture", TextureHandle(10))
            .with_texture("NormalMap", TextureHandle(11))
            .with_sampler("BasicSampler", SamplerHandle(20));
        let mut transform = Transform::new();
        let camera = test_camera();
        let frame = FrameParams::new(0.016, 1280.0, 720.0);
        let mut ctx = CommandList::new();

        material
            .set_resources(&mut transform, &camera, &frame, &mut ctx)
            .unwrap();

        let vs_id = vs.borrow().id();
        let ps_id = ps.borrow().id();
        let kinds: Vec<&RenderCommand> = ctx.commands().iter().collect();
        assert_eq!(kinds.len(), 7);
        assert_eq!(
            *kinds[0],
            RenderCommand::SetShader { stage: ShaderStage::Vertex, shader: vs_id }
        );
        assert_eq!(
            *kinds[1],
            RenderCommand::SetShader { stage: ShaderStage::Pixel, shader: ps_id }
        );
        assert!(matches!(kinds[2], RenderCommand::UpdateUniforms { stage: ShaderStage::Vertex, .. }));
        assert!(matches!(kinds[3], RenderCommand::UpdateUniforms { stage: ShaderStage::Pixel, .. }));
        // Texture binds follow name order
        assert_eq!(
            *kinds[4],
            RenderCommand::BindTexture { stage: ShaderStage::Pixel, binding: 1, texture: TextureHandle(11) }
        );
        assert_eq!(
            *kinds[5],
            RenderCommand::BindTexture { stage: ShaderStage::Pixel, binding: 0, texture: TextureHandle(10) }
        );
        assert_eq!(
            *kinds[6],
            RenderCommand::BindSampler { stage: ShaderStage::Pixel, binding: 2, sampler: SamplerHandle(20) }
        );
    }

    #[test]
    fn test_set_resources_uploads_values() {
        let (vs, ps) = test_shaders();
        let material = Material::new("m", [0.2, 0.4, 0.6, 1.0], 0.75, vs.clone(), ps.clone());
        let mut transform = Transform::new();
        transform.set_position(Vector3::new(1.0, 2.0, 3.0));
        let camera = test_camera();
        let frame = FrameParams::new(0.5, 800.0, 600.0);
        let mut ctx = CommandList::new();

        material
            .set_resources(&mut transform, &camera, &frame, &mut ctx)
            .unwrap();

        let vertex = ctx.uniform_uploads(ShaderStage::Vertex);
        let pixel = ctx.uniform_uploads(ShaderStage::Pixel);
        let vs_layout = vs.borrow().layout().clone();
        let ps_layout = ps.borrow().layout().clone();

        assert_eq!(
            vs_layout.read(vertex[0], "world"),
            Some(UniformValue::Matrix4x4(Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0))))
        );
        assert_eq!(
            vs_layout.read(vertex[0], "view"),
            Some(UniformValue::Matrix4x4(camera.view()))
        );
        assert_eq!(
            vs_layout.read(vertex[0], "projection"),
            Some(UniformValue::Matrix4x4(camera.projection()))
        );
        assert_eq!(
            ps_layout.read(pixel[0], "colorTint"),
            Some(UniformValue::Float4([0.2, 0.4, 0.6, 1.0]))
        );
        assert_eq!(ps_layout.read(pixel[0], "roughness"), Some(UniformValue::Float(0.75)));
        assert_eq!(
            ps_layout.read(pixel[0], "cameraPosition"),
            Some(UniformValue::Float3([0.0, 0.0, -5.0]))
        );
        assert_eq!(ps_layout.read(pixel[0], "deltaTime"), Some(UniformValue::Float(0.5)));
        assert_eq!(
            ps_layout.read(pixel[0], "screenResolution"),
            Some(UniformValue::Float2([800.0, 600.0]))
        );
    }

    #[test]
    fn test_optional_frame_values_are_skipped() {
        let vs = Rc::new(RefCell::new(ShaderProgram::new(
            "vs",
            ShaderStage::Vertex,
            entity_vertex_layout(),
        )));
        let minimal = ParamLayout::new()
            .with("colorTint", UniformKind::Float4)
            .with("cameraPosition", UniformKind::Float3)
            .with("roughness", UniformKind::Float);
        let ps = Rc::new(RefCell::new(ShaderProgram::new("ps", ShaderStage::Pixel, minimal)));
        let material = Material::new("m", [1.0; 4], 0.0, vs, ps);

        let mut ctx = CommandList::new();
        let result = material.set_resources(
            &mut Transform::new(),
            &test_camera(),
            &FrameParams::new(0.1, 10.0, 10.0),
            &mut ctx,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_unknown_texture_name_is_an_error() {
        let (vs, ps) = test_shaders();
        let material =
            Material::new("m", [1.0; 4], 0.5, vs, ps).with_texture("Albedo", TextureHandle(1));
        let mut ctx = CommandList::new();

        let err = material
            .set_resources(
                &mut Transform::new(),
                &test_camera(),
                &FrameParams::new(0.0, 1.0, 1.0),
                &mut ctx,
            )
            .unwrap_err();
        assert_eq!(
            err,
            ShaderError::UnknownTexture {
                shader: "entity_ps".to_string(),
                name: "Albedo".to_string()
            }
        );
    }

    #[test]
    fn test_identity_transform_uploads_identity_world() {
        let (vs, ps) = test_shaders();
        let material = Material::new("m", [1.0; 4], 0.5, vs.clone(), ps);
        let mut ctx = CommandList::new();
        material
            .set_resources(
                &mut Transform::new(),
                &test_camera(),
                &FrameParams::new(0.0, 1.0, 1.0),
                &mut ctx,
            )
            .unwrap();

        let layout = vs.borrow().layout().clone();
        let upload = ctx.uniform_uploads(ShaderStage::Vertex)[0];
        assert_eq!(
            layout.read(upload, "world"),
            Some(UniformValue::Matrix4x4(Matrix4::identity()))
        );
        assert_eq!(
            layout.read(upload, "worldInvTranspose"),
            Some(UniformValue::Matrix4x4(Matrix4::identity()))
        );
    }

    #[test]
    fn test_one_program_in_both_slots_is_rejected() {
        let (_, ps) = test_shaders();
        let material = Material::new("m", [1.0; 4], 0.5, ps.clone(), ps);
        let mut ctx = CommandList::new();
        let result = material.set_resources(
            &mut Transform::new(),
            &test_camera(),
            &FrameParams::new(0.0, 1.0, 1.0),
            &mut ctx,
        );

        assert_eq!(
            result,
            Err(ShaderError::StageMismatch {
                shader: "entity_ps".to_string(),
                expected: ShaderStage::Vertex,
                actual: ShaderStage::Pixel,
            })
        );
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_swapped_shaders_are_rejected() {
        let (vs, ps) = test_shaders();
        let mut material = Material::new("m", [1.0; 4], 0.5, vs.clone(), ps.clone());
        material.set_pixel_shader(vs);
        let result = material.set_resources(
            &mut Transform::new(),
            &test_camera(),
            &FrameParams::new(0.0, 1.0, 1.0),
            &mut CommandList::new(),
        );
        assert!(matches!(
            result,
            Err(ShaderError::StageMismatch { expected: ShaderStage::Pixel, .. })
        ));
    }

    #[test]
    fn test_lit_layout_reserves_light_array() {
        let layout = lit_pixel_layout(4);
        let lights = layout.find("lights").unwrap();
        assert_eq!(lights.kind, UniformKind::Data(256));
        assert_eq!(lights.offset % 16, 0);
    }
}
