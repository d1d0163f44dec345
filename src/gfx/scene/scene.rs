use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::rc::Rc;

use cgmath::Vector3;
use log::{debug, info, warn};
use thiserror::Error;

use super::entity::Entity;
use super::mesh::Mesh;
use super::sky::Sky;
use crate::gfx::camera::Camera;
use crate::gfx::rendering::DeviceContext;
use crate::gfx::resources::{Light, ShaderError, SharedMaterial};
use crate::input::InputSource;

/// Ambient term uploaded to lit shaders unless overridden.
pub const DEFAULT_AMBIENT: [f32; 3] = [0.1, 0.1, 0.25];

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("camera index {index} is out of range ({count} cameras)")]
    CameraOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Frame driver: cameras, drawables, lights and the sky.
///
/// Exactly one camera is active. Switching cameras only changes which one
/// later updates and draws use; the previous camera is left untouched.
#[derive(Debug)]
pub struct Scene {
    cameras: Vec<Camera>,
    active_camera: usize,
    entities: Vec<Entity>,
    meshes: Vec<Rc<Mesh>>,
    materials: Vec<SharedMaterial>,
    lights: Vec<Light>,
    ambient_color: [f32; 3],
    sky: Option<Sky>,
}

impl Scene {
    /// Creates a scene whose only (and active) camera is `camera`.
    pub fn new(camera: Camera) -> Self {
        Self {
            cameras: vec![camera],
            active_camera: 0,
            entities: Vec::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            lights: Vec::new(),
            ambient_color: DEFAULT_AMBIENT,
            sky: None,
        }
    }

    /// Scene with the sandbox's three preset viewpoints.
    ///
    /// Camera 0 looks down +Z from `(0, 0, -5)`; cameras 1 and 2 are a wide
    /// high-left view and a narrow low-right view.
    pub fn with_default_cameras(aspect_ratio: f32) -> Self {
        let mut scene = Self::new(Camera::new(
            Vector3::new(0.0, 0.0, -5.0),
            5.0,
            1.0,
            FRAC_PI_4,
            aspect_ratio,
        ));
        scene.add_camera(Camera::new(
            Vector3::new(-5.0, 5.0, -10.0),
            5.0,
            1.0,
            FRAC_PI_2,
            aspect_ratio,
        ));
        scene.add_camera(Camera::new(
            Vector3::new(5.0, -5.0, -7.5),
            5.0,
            1.0,
            FRAC_PI_4 / 2.0,
            aspect_ratio,
        ));
        scene
    }

    /// Adds a camera and returns its index.
    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    pub fn set_active_camera(&mut self, index: usize) -> Result<(), SceneError> {
        if index >= self.cameras.len() {
            return Err(SceneError::CameraOutOfRange {
                index,
                count: self.cameras.len(),
            });
        }
        if index != self.active_camera {
            debug!("Active camera {} -> {}", self.active_camera, index);
            self.active_camera = index;
        }
        Ok(())
    }

    pub fn active_camera_index(&self) -> usize {
        self.active_camera
    }

    pub fn active_camera(&self) -> &Camera {
        &self.cameras[self.active_camera]
    }

    pub fn active_camera_mut(&mut self) -> &mut Camera {
        &mut self.cameras[self.active_camera]
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn camera_mut(&mut self, index: usize) -> Option<&mut Camera> {
        self.cameras.get_mut(index)
    }

    /// Registers a mesh so it outlives the entities that use it.
    pub fn add_mesh(&mut self, mesh: Mesh) -> Rc<Mesh> {
        let mesh = Rc::new(mesh);
        self.meshes.push(mesh.clone());
        mesh
    }

    pub fn add_material(&mut self, material: SharedMaterial) -> SharedMaterial {
        self.materials.push(material.clone());
        material
    }

    /// Adds an entity and returns its index.
    pub fn add_entity(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    /// Removes an entity, releasing its share of the mesh and material.
    pub fn remove_entity(&mut self, index: usize) -> Option<Entity> {
        (index < self.entities.len()).then(|| self.entities.remove(index))
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index)
    }

    pub fn meshes(&self) -> &[Rc<Mesh>] {
        &self.meshes
    }

    pub fn materials(&self) -> &[SharedMaterial] {
        &self.materials
    }

    pub fn add_light(&mut self, light: Light) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut Vec<Light> {
        &mut self.lights
    }

    pub fn ambient_color(&self) -> [f32; 3] {
        self.ambient_color
    }

    pub fn set_ambient_color(&mut self, ambient_color: [f32; 3]) {
        self.ambient_color = ambient_color;
    }

    pub fn sky(&self) -> Option<&Sky> {
        self.sky.as_ref()
    }

    pub fn set_sky(&mut self, sky: Option<Sky>) {
        self.sky = sky;
    }

    /// Update phase: moves the active camera from this frame's input.
    pub fn update(&mut self, delta_time: f32, input: &impl InputSource) {
        self.cameras[self.active_camera].update(delta_time, input);
    }

    /// Rebuilds every camera's projection for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let aspect_ratio = width as f32 / height as f32;
        info!("Viewport resized to {}x{}", width, height);
        for camera in &mut self.cameras {
            camera.set_aspect_ratio(aspect_ratio);
        }
    }

    /// Draw phase: every entity with the active camera, then the sky.
    pub fn draw(
        &mut self,
        ctx: &mut dyn DeviceContext,
        delta_time: f32,
        resolution: cgmath::Vector2<f32>,
    ) -> Result<(), SceneError> {
        let camera = &self.cameras[self.active_camera];

        for entity in &mut self.entities {
            Self::upload_lighting(entity, &self.lights, self.ambient_color)?;
            entity.draw(ctx, camera, delta_time, resolution)?;
        }

        if let Some(sky) = &self.sky {
            sky.draw(ctx, camera)?;
        }
        Ok(())
    }

    /// Stages lights and ambient colour into a lit pixel shader. Unlit shaders
    /// are left alone.
    fn upload_lighting(
        entity: &Entity,
        lights: &[Light],
        ambient_color: [f32; 3],
    ) -> Result<(), ShaderError> {
        let material = entity.material().borrow();
        let mut ps = material.pixel_shader().borrow_mut();

        let Some(capacity) = ps.variable_size("lights") else {
            return Ok(());
        };
        let max_lights = capacity / std::mem::size_of::<Light>();
        let count = if lights.len() > max_lights {
            warn!(
                "Shader '{}' holds {} lights, dropping {}",
                ps.label(),
                max_lights,
                lights.len() - max_lights
            );
            max_lights
        } else {
            lights.len()
        };

        ps.set_data("lights", bytemuck::cast_slice(&lights[..count]))?;
        if ps.has_variable("lightCount") {
            ps.set_int("lightCount", count as i32)?;
        }
        if ps.has_variable("ambientColor") {
            ps.set_float3("ambientColor", ambient_color)?;
        }
        Ok(())
    }
}
