//! Bundled WGSL programs
//!
//! `shaders/entity.wgsl` and `shaders/sky.wgsl` paired with the
//! [`ShaderProgram`] declarations that describe their parameter blocks.

use std::cell::RefCell;
use std::rc::Rc;

use super::gpu_resources::{GpuResources, PipelineStyle};
use crate::gfx::resources::{
    default_lit_pixel_layout, entity_vertex_layout, ParamLayout, SharedShader, ShaderProgram,
    ShaderStage,
};
use crate::gfx::scene::sky::{CUBE_MAP_SLOT, SKY_SAMPLER_SLOT};
use crate::gfx::scene::sky_vertex_layout;

pub const ENTITY_WGSL: &str = include_str!("../../shaders/entity.wgsl");
pub const SKY_WGSL: &str = include_str!("../../shaders/sky.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

pub const SURFACE_TEXTURE_SLOT: &str = "SurfaceTexture";
pub const SPECULAR_TEXTURE_SLOT: &str = "SpecularTexture";
pub const SURFACE_SAMPLER_SLOT: &str = "BasicSampler";

/// Lit entity shader pair. Materials using it bind `SurfaceTexture`,
/// `SpecularTexture` and `BasicSampler`.
pub fn entity_programs() -> (ShaderProgram, ShaderProgram) {
    let vs = ShaderProgram::new("entity_vs", ShaderStage::Vertex, entity_vertex_layout());
    let ps = ShaderProgram::new("entity_ps", ShaderStage::Pixel, default_lit_pixel_layout())
        .with_texture(SURFACE_TEXTURE_SLOT, 1)
        .with_sampler(SURFACE_SAMPLER_SLOT, 2)
        .with_texture(SPECULAR_TEXTURE_SLOT, 3);
    (vs, ps)
}

pub fn sky_programs() -> (ShaderProgram, ShaderProgram) {
    let vs = ShaderProgram::new("sky_vs", ShaderStage::Vertex, sky_vertex_layout());
    let ps = ShaderProgram::new("sky_ps", ShaderStage::Pixel, ParamLayout::new())
        .with_cube_texture(CUBE_MAP_SLOT, 0)
        .with_sampler(SKY_SAMPLER_SLOT, 1);
    (vs, ps)
}

/// Compiles both bundled pairs on `device` and returns them ready to share.
///
/// The sky pair gets [`PipelineStyle::Sky`].
pub fn register_builtin_shaders(
    resources: &mut GpuResources,
    device: &wgpu::Device,
) -> ((SharedShader, SharedShader), (SharedShader, SharedShader)) {
    let (entity_vs, entity_ps) = entity_programs();
    resources.register_shader(device, &entity_vs, ENTITY_WGSL, VERTEX_ENTRY);
    resources.register_shader(device, &entity_ps, ENTITY_WGSL, FRAGMENT_ENTRY);

    let (sky_vs, sky_ps) = sky_programs();
    resources.register_shader(device, &sky_vs, SKY_WGSL, VERTEX_ENTRY);
    resources.register_shader(device, &sky_ps, SKY_WGSL, FRAGMENT_ENTRY);
    resources.set_pipeline_style(sky_vs.id(), sky_ps.id(), PipelineStyle::Sky);

    (
        (share(entity_vs), share(entity_ps)),
        (share(sky_vs), share(sky_ps)),
    )
}

fn share(program: ShaderProgram) -> SharedShader {
    Rc::new(RefCell::new(program))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_declares(wgsl: &str, program: &ShaderProgram) {
        for entry in program.layout().entries() {
            assert!(
                wgsl.contains(&format!("{}:", entry.name)),
                "'{}' missing from WGSL for {}",
                entry.name,
                program.label()
            );
        }
        for (name, slot) in program.texture_slots() {
            let decl = format!("@binding({}) var {}:", slot.binding, name);
            assert!(wgsl.contains(&decl), "missing `{}`", decl);
        }
        for (name, binding) in program.sampler_slots() {
            let decl = format!("@binding({}) var {}:", binding, name);
            assert!(wgsl.contains(&decl), "missing `{}`", decl);
        }
    }

    #[test]
    fn test_entity_wgsl_matches_declarations() {
        let (vs, ps) = entity_programs();
        assert_declares(ENTITY_WGSL, &vs);
        assert_declares(ENTITY_WGSL, &ps);
        assert!(ENTITY_WGSL.contains("array<Light, 10>"));
        assert_eq!(ps.texture_slots().count(), 2);
        assert!(ENTITY_WGSL.contains("@binding(3) var SpecularTexture: texture_2d<f32>"));
    }

    #[test]
    fn test_textured_material_binds_surface_and_specular() {
        use crate::gfx::camera::Camera;
        use crate::gfx::rendering::{CommandList, FrameParams, RenderCommand};
        use crate::gfx::resources::{Material, SamplerHandle, TextureHandle};
        use crate::gfx::transform::Transform;
        use cgmath::Vector3;

        let (vs, ps) = entity_programs();
        let material = Material::new("bronze", [1.0; 4], 0.2, share(vs), share(ps))
            .with_texture(SURFACE_TEXTURE_SLOT, TextureHandle(5))
            .with_texture(SPECULAR_TEXTURE_SLOT, TextureHandle(6))
            .with_sampler(SURFACE_SAMPLER_SLOT, SamplerHandle(7));

        let camera = Camera::new(Vector3::new(0.0, 0.0, -5.0), 5.0, 1.0, 0.785, 1.0);
        let mut transform = Transform::new();
        let mut ctx = CommandList::new();
        material
            .set_resources(&mut transform, &camera, &FrameParams::new(0.016, 800.0, 600.0), &mut ctx)
            .unwrap();

        assert!(ctx.commands().contains(&RenderCommand::BindTexture {
            stage: ShaderStage::Pixel,
            binding: 3,
            texture: TextureHandle(6)
        }));
        assert!(ctx.commands().contains(&RenderCommand::BindTexture {
            stage: ShaderStage::Pixel,
            binding: 1,
            texture: TextureHandle(5)
        }));
    }

    #[test]
    fn test_sky_wgsl_matches_declarations() {
        let (vs, ps) = sky_programs();
        assert_declares(SKY_WGSL, &vs);
        assert_declares(SKY_WGSL, &ps);
        assert!(SKY_WGSL.contains("texture_cube<f32>"));
        assert_eq!(ps.layout().size(), 0);
    }

    #[test]
    fn test_uniform_slot_is_free() {
        let (_, ps) = entity_programs();
        assert!(ps.texture_slots().all(|(_, slot)| slot.binding != 0));
        assert!(ps.sampler_slots().all(|(_, binding)| binding != 0));
    }

    #[test]
    fn test_entry_points_present() {
        for wgsl in [ENTITY_WGSL, SKY_WGSL] {
            assert!(wgsl.contains(&format!("fn {}(", VERTEX_ENTRY)));
            assert!(wgsl.contains(&format!("fn {}(", FRAGMENT_ENTRY)));
        }
    }
}
