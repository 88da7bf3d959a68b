//! # Scene Engine
//!
//! A minimal real-time 3D scene engine: a flat scene of cameras, textured
//! mesh entities and lights, driven by a single-threaded frame loop over a
//! fixed-function drawing API.
//!
//! ## Features
//!
//! - **Scene Objects**: transform, active flag, start/update behaviours
//! - **Compiled Meshes**: OBJ geometry compiled once into replayable lists
//! - **Fixed-Function Lighting**: directional, point and spot lights
//! - **Pluggable Backends**: any [`DrawApi`] and [`WindowSurface`] pair
//! - **Headless Operation**: recording backend and headless window for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let config = EngineConfig::default();
//!     let window = HeadlessWindow::new("demo", 640, 480).with_frame_limit(60);
//!     let mut engine = Engine::new(config, window, RecordingBackend::new())?;
//!
//!     let camera = SceneObject::camera(
//!         Transform::from_position(Vec3::new(0.0, 0.0, -10.0)),
//!         Camera::frustum(0.01, 1000.0)?,
//!     );
//!     let sun = SceneObject::light(Transform::default(), Light::directional(LightSlot::Light0, [1.0; 4]));
//!     let mut scene = Scene::new([1.0; 4], camera, vec![sun])?;
//!
//!     engine.run(&mut scene)
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;

pub mod foundation;
pub mod assets;
pub mod render;
pub mod scene;

mod engine;

#[cfg(test)]
mod tests;

pub use core::config::{EngineConfig, WindowConfig};
pub use engine::{Engine, EngineError};
pub use scene::{Scene, SceneObject};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineConfig, EngineError, WindowConfig,
        config::Config,
        foundation::{
            logging,
            math::{Color, Vec3, Vec4},
        },
        assets::{AssetError, ImageData, ObjLoader},
        render::{
            api::{DrawApi, LightSlot},
            window::{HeadlessWindow, WindowSurface},
            Mesh, MeshData, RecordingBackend, RenderError, Texture,
        },
        scene::{
            Attenuation, BehaviorError, BehaviorResult, Camera, Entity, Light, LightKind, ObjectId,
            ObjectKind, Projection, Scene, SceneCommands, SceneObject, Transform,
        },
    };
}
