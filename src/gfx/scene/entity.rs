use std::rc::Rc;

use cgmath::Vector2;

use super::mesh::Mesh;
use crate::gfx::camera::Camera;
use crate::gfx::rendering::{DeviceContext, FrameParams};
use crate::gfx::resources::{ShaderError, SharedMaterial};
use crate::gfx::transform::Transform;

/// One drawable: an owned transform over a shared mesh and material.
#[derive(Debug, Clone)]
pub struct Entity {
    transform: Transform,
    mesh: Rc<Mesh>,
    material: SharedMaterial,
}

impl Entity {
    pub fn new(mesh: Rc<Mesh>, material: SharedMaterial) -> Self {
        Self {
            transform: Transform::new(),
            mesh,
            material,
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn mesh(&self) -> &Rc<Mesh> {
        &self.mesh
    }

    pub fn material(&self) -> &SharedMaterial {
        &self.material
    }

    pub fn set_material(&mut self, material: SharedMaterial) {
        self.material = material;
    }

    /// Binds the material's state for this entity and issues one indexed draw.
    ///
    /// Nothing is cached between calls: every draw re-uploads the transform,
    /// camera and material parameters and rebinds every resource.
    pub fn draw(
        &mut self,
        ctx: &mut dyn DeviceContext,
        camera: &Camera,
        delta_time: f32,
        viewport: Vector2<f32>,
    ) -> Result<(), ShaderError> {
        let frame = FrameParams {
            delta_time,
            resolution: viewport,
        };

        self.material
            .borrow()
            .set_resources(&mut self.transform, camera, &frame, ctx)?;
        self.mesh.set_buffers_and_draw(ctx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::material::tests::{test_camera, test_shaders};
    use crate::gfx::resources::{Material, ShaderStage, UniformValue};
    use crate::gfx::rendering::{CommandList, RenderCommand};
    use crate::gfx::scene::vertex::Vertex;
    use cgmath::{Matrix4, SquareMatrix, Vector3};

    /// Eight shared corners, twelve triangles.
    fn corner_cube() -> Mesh {
        let vertices = (0..8)
            .map(|i| {
                let p = [
                    if i & 1 == 0 { -0.5 } else { 0.5 },
                    if i & 2 == 0 { -0.5 } else { 0.5 },
                    if i & 4 == 0 { -0.5 } else { 0.5 },
                ];
                Vertex::new(p, p, [0.0, 0.0])
            })
            .collect();
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 3, 3, 1, 0,
            4, 5, 7, 7, 6, 4,
            0, 4, 6, 6, 2, 0,
            1, 3, 7, 7, 5, 1,
            2, 6, 7, 7, 3, 2,
            0, 1, 5, 5, 4, 0,
        ];
        Mesh::new(vertices, indices)
    }

    fn draw_once(entity: &mut Entity, camera: &Camera) -> CommandList {
        let mut ctx = CommandList::new();
        entity
            .draw(&mut ctx, camera, 0.016, Vector2::new(1280.0, 720.0))
            .unwrap();
        ctx
    }

    fn uploaded_tint(ctx: &CommandList, material: &SharedMaterial) -> Option<UniformValue> {
        let layout = material.borrow().pixel_shader().borrow().layout().clone();
        let uploads = ctx.uniform_uploads(ShaderStage::Pixel);
        layout.read(uploads.last()?, "colorTint")
    }

    #[test]
    fn test_cube_draw_scenario() {
        let (vs, ps) = test_shaders();
        let material = Material::new("red", [1.0, 0.0, 0.0, 1.0], 0.5, vs.clone(), ps.clone()).shared();
        let mesh = Rc::new(corner_cube());
        assert_eq!(mesh.vertex_count(), 8);

        let mut entity = Entity::new(mesh.clone(), material.clone());
        let ctx = draw_once(&mut entity, &test_camera());

        let vs_layout = vs.borrow().layout().clone();
        let ps_layout = ps.borrow().layout().clone();
        let vertex = ctx.uniform_uploads(ShaderStage::Vertex);
        let pixel = ctx.uniform_uploads(ShaderStage::Pixel);
        assert_eq!(vertex.len(), 1);
        assert_eq!(pixel.len(), 1);

        assert_eq!(
            vs_layout.read(vertex[0], "world"),
            Some(UniformValue::Matrix4x4(Matrix4::identity()))
        );
        assert_eq!(
            ps_layout.read(pixel[0], "colorTint"),
            Some(UniformValue::Float4([1.0, 0.0, 0.0, 1.0]))
        );
        assert_eq!(ps_layout.read(pixel[0], "roughness"), Some(UniformValue::Float(0.5)));
        assert_eq!(ctx.draw_calls(), vec![(36, 0, 0)]);

        // Mesh buffers are bound immediately before the draw
        let n = ctx.len();
        assert_eq!(
            ctx.commands()[n - 2],
            RenderCommand::SetMeshBuffers { mesh: mesh.id() }
        );
    }

    #[test]
    fn test_shared_material_tint_change_reaches_both_entities() {
        let (vs, ps) = test_shaders();
        let material = Material::new("shared", [1.0, 1.0, 1.0, 1.0], 0.5, vs, ps).shared();
        let mesh = Rc::new(corner_cube());
        let camera = test_camera();

        let mut first = Entity::new(mesh.clone(), material.clone());
        let mut second = Entity::new(mesh, material.clone());
        first.transform_mut().set_position(Vector3::new(-2.0, 0.0, 0.0));
        second.transform_mut().set_position(Vector3::new(2.0, 0.0, 0.0));

        material.borrow_mut().set_color_tint([0.0, 1.0, 0.0, 1.0]);

        let green = Some(UniformValue::Float4([0.0, 1.0, 0.0, 1.0]));
        assert_eq!(uploaded_tint(&draw_once(&mut first, &camera), &material), green);
        assert_eq!(uploaded_tint(&draw_once(&mut second, &camera), &material), green);
    }

    #[test]
    fn test_each_entity_uploads_its_own_world() {
        let (vs, ps) = test_shaders();
        let material = Material::new("m", [1.0; 4], 0.5, vs.clone(), ps).shared();
        let mesh = Rc::new(corner_cube());
        let camera = test_camera();

        let mut a = Entity::new(mesh.clone(), material.clone());
        let mut b = Entity::new(mesh, material);
        b.transform_mut().set_position(Vector3::new(0.0, 3.0, 0.0));

        let mut ctx = CommandList::new();
        let viewport = Vector2::new(640.0, 480.0);
        a.draw(&mut ctx, &camera, 0.0, viewport).unwrap();
        b.draw(&mut ctx, &camera, 0.0, viewport).unwrap();

        let layout = vs.borrow().layout().clone();
        let uploads = ctx.uniform_uploads(ShaderStage::Vertex);
        assert_eq!(
            layout.read(uploads[0], "world"),
            Some(UniformValue::Matrix4x4(Matrix4::identity()))
        );
        assert_eq!(
            layout.read(uploads[1], "world"),
            Some(UniformValue::Matrix4x4(Matrix4::from_translation(Vector3::new(0.0, 3.0, 0.0))))
        );
        assert_eq!(ctx.draw_calls().len(), 2);
    }

    #[test]
    fn test_set_material_swaps_shaders() {
        let (vs_a, ps_a) = test_shaders();
        let (vs_b, ps_b) = test_shaders();
        let mut entity = Entity::new(
            Rc::new(corner_cube()),
            Material::new("a", [1.0; 4], 0.5, vs_a, ps_a).shared(),
        );
        entity.set_material(Material::new("b", [1.0; 4], 0.5, vs_b.clone(), ps_b).shared());

        let ctx = draw_once(&mut entity, &test_camera());
        assert_eq!(
            ctx.commands()[0],
            RenderCommand::SetShader {
                stage: ShaderStage::Vertex,
                shader: vs_b.borrow().id()
            }
        );
    }

    #[test]
    fn test_draw_failure_issues_no_draw() {
        let (vs, ps) = test_shaders();
        let material = Material::new("m", [1.0; 4], 0.5, vs, ps)
            .with_sampler("Missing", crate::gfx::resources::SamplerHandle(1))
            .shared();
        let mut entity = Entity::new(Rc::new(corner_cube()), material);

        let mut ctx = CommandList::new();
        let result = entity.draw(&mut ctx, &test_camera(), 0.0, Vector2::new(1.0, 1.0));
        assert!(result.is_err());
        assert!(ctx.draw_calls().is_empty());
    }
}
