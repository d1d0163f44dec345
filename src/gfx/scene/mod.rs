//! # Scene Module
//!
//! Drawables and the frame driver that owns them.
//!
//! - [`Mesh`] - indexed geometry, shared between entities through `Rc`
//! - [`Entity`] - one transform over a shared mesh and material; one draw call
//! - [`Sky`] - cube-mapped background drawn after the entities
//! - [`Scene`] - cameras, entities, lights and the per-frame update/draw
//!
//! ```no_run
//! use std::rc::Rc;
//! use forward_sandbox::gfx::geometry::generate_cube;
//! use forward_sandbox::gfx::rendering::CommandList;
//! use forward_sandbox::gfx::scene::{Entity, Mesh, Scene};
//! # fn material() -> forward_sandbox::gfx::resources::SharedMaterial { unimplemented!() }
//!
//! let mut scene = Scene::with_default_cameras(16.0 / 9.0);
//! let cube = scene.add_mesh(Mesh::from_geometry(&generate_cube()));
//! scene.add_entity(Entity::new(cube, material()));
//!
//! let mut commands = CommandList::new();
//! scene.draw(&mut commands, 0.016, cgmath::Vector2::new(1280.0, 720.0)).unwrap();
//! ```

pub mod entity;
pub mod mesh;
pub mod scene;
pub mod sky;
pub mod vertex;

pub use entity::Entity;
pub use mesh::Mesh;
pub use scene::{Scene, SceneError, DEFAULT_AMBIENT};
pub use sky::{sky_vertex_layout, Sky};
pub use vertex::Vertex;
