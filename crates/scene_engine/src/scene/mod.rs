//! Scene management system
//!
//! A [`Scene`] owns one camera object, an insertion-ordered list of scene
//! objects and a background colour. There is no hierarchy: every object is
//! positioned in world space by its own [`Transform`].
//!
//! ## Ordering
//!
//! ```text
//! start:   camera, objects...          (once)
//! update:  camera, objects...          (every frame, all before any render)
//! render:  clear colour, camera, objects...
//! ```
//!
//! Structural changes made while the engine is iterating go through
//! [`SceneCommands`] and are applied between frames.

pub mod behavior;
pub mod camera;
pub mod commands;
pub mod entity;
pub mod light;
pub mod object;
pub mod transform;

pub use behavior::{BehaviorError, BehaviorResult, RenderHook, StartBehavior, UpdateBehavior};
pub use camera::{Camera, Projection};
pub use commands::{SceneCommand, SceneCommands};
pub use entity::Entity;
pub use light::{Attenuation, Light, LightKind};
pub use object::{ObjectId, ObjectKind, SceneObject};
pub use transform::Transform;

use thiserror::Error;

use crate::engine::EngineError;
use crate::foundation::math::Color;
use crate::render::api::DrawApi;
use crate::render::RenderResult;

/// Scene state errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The object is not part of the scene
    #[error("Scene object {0} not found")]
    ObjectNotFound(ObjectId),
}

/// Camera, ordered objects and background colour
#[derive(Debug)]
pub struct Scene {
    background_color: Color,
    camera: SceneObject,
    objects: Vec<SceneObject>,
    commands: SceneCommands,
}

impl Scene {
    /// Build a scene; `camera` must be a camera object
    pub fn new(background_color: Color, camera: SceneObject, objects: Vec<SceneObject>) -> Result<Self, EngineError> {
        if !matches!(camera.kind(), ObjectKind::Camera(_)) {
            return Err(EngineError::Configuration(format!(
                "scene camera must be a camera object, got {} {}",
                camera.kind().name(),
                camera.id()
            )));
        }

        log::info!("Created scene with {} objects", objects.len());
        Ok(Self {
            background_color,
            camera,
            objects,
            commands: SceneCommands::new(),
        })
    }

    /// The camera object
    pub fn camera(&self) -> &SceneObject {
        &self.camera
    }

    /// Mutable camera object
    pub fn camera_mut(&mut self) -> &mut SceneObject {
        &mut self.camera
    }

    /// Objects in insertion order
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Look up an object by id
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id() == id)
    }

    /// Mutable lookup by id
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|object| object.id() == id)
    }

    /// Number of objects, camera excluded
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene holds no objects besides the camera
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Background colour
    pub fn background_color(&self) -> Color {
        self.background_color
    }

    /// Replace the background colour
    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    /// Handle for queueing structural changes from behaviours
    pub fn commands(&self) -> SceneCommands {
        self.commands.clone()
    }

    /// Append an object
    pub fn instantiate(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id();
        log::debug!("Instantiated {} {}", object.kind().name(), id);
        self.objects.push(object);
        id
    }

    /// Remove an object, releasing an entity's mesh and texture
    ///
    /// Destroying an id that is not in the scene is a
    /// [`SceneError::ObjectNotFound`]. Releasing a mesh that was already
    /// freed is a [`RenderError::DoubleFree`](crate::render::RenderError::DoubleFree);
    /// the texture is released and the object removed either way.
    pub fn destroy(&mut self, id: ObjectId, api: &mut dyn DrawApi) -> Result<SceneObject, EngineError> {
        let index = self
            .objects
            .iter()
            .position(|object| object.id() == id)
            .ok_or(SceneError::ObjectNotFound(id))?;
        let mut object = self.objects.remove(index);

        if let Some(entity) = object.as_entity_mut() {
            let freed = entity.mesh_mut().free(api);
            let released = entity.release(api);
            freed?;
            released?;
        }
        log::debug!("Destroyed {} {}", object.kind().name(), id);
        Ok(object)
    }

    /// Apply queued commands in submission order
    ///
    /// Newly instantiated objects are started immediately so their first
    /// update already follows their start behaviour. Returns the number of
    /// commands applied. The first failing command stops the pass; objects
    /// still waiting to be instantiated are released and dropped.
    pub fn apply_commands(&mut self, api: &mut dyn DrawApi) -> Result<usize, EngineError> {
        let mut pending = self.commands.drain().into_iter();
        let mut applied = 0;
        while let Some(command) = pending.next() {
            if let Err(e) = self.apply_command(command, api) {
                discard_commands(pending, api);
                return Err(e);
            }
            applied += 1;
        }
        Ok(applied)
    }

    fn apply_command(&mut self, command: SceneCommand, api: &mut dyn DrawApi) -> Result<(), EngineError> {
        match command {
            SceneCommand::Instantiate(mut object) => {
                if let Err(e) = object.start() {
                    release_or_warn(&mut object, api);
                    return Err(e.into());
                }
                self.instantiate(object);
            }
            SceneCommand::Destroy(id) => {
                self.destroy(id, api)?;
            }
        }
        Ok(())
    }

    /// Start the camera, then every object
    pub fn start(&mut self) -> BehaviorResult {
        self.camera.start()?;
        for object in &mut self.objects {
            object.start()?;
        }
        Ok(())
    }

    /// Update the camera, then every object, with the same delta time
    pub fn update(&mut self, delta_time: f32) -> BehaviorResult {
        self.camera.update(delta_time)?;
        for object in &mut self.objects {
            object.update(delta_time)?;
        }
        Ok(())
    }

    /// Set the clear colour, render the camera, then every object
    pub fn render(&mut self, api: &mut dyn DrawApi) -> Result<(), EngineError> {
        api.clear_color(self.background_color);
        self.camera.render(api)?;
        for object in &mut self.objects {
            object.render(api)?;
        }
        Ok(())
    }

    /// Forward the framebuffer size to the camera
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if let Some(camera) = self.camera.as_camera_mut() {
            camera.set_viewport(width, height);
        }
    }

    /// Release every backend resource still held by the scene
    ///
    /// Keeps going after a failure so one bad handle does not leak the rest;
    /// the first error is returned.
    pub fn release_resources(&mut self, api: &mut dyn DrawApi) -> RenderResult<()> {
        discard_commands(self.commands.drain(), api);

        let mut first_error = None;
        for object in &mut self.objects {
            if let Err(e) = object.release_resources(api) {
                log::warn!("Failed to release {} {}: {}", object.kind().name(), object.id(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Drop queued commands, releasing objects that were never instantiated
fn discard_commands(commands: impl IntoIterator<Item = SceneCommand>, api: &mut dyn DrawApi) {
    for command in commands {
        if let SceneCommand::Instantiate(mut object) = command {
            log::debug!("Discarding queued {} {}", object.kind().name(), object.id());
            release_or_warn(&mut object, api);
        }
    }
}

fn release_or_warn(object: &mut SceneObject, api: &mut dyn DrawApi) {
    if let Err(e) = object.release_resources(api) {
        log::warn!("Failed to release {} {}: {}", object.kind().name(), object.id(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ObjLoader;
    use crate::foundation::math::Vec3;
    use crate::render::{Mesh, RecordingBackend, RenderError};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn camera() -> SceneObject {
        SceneObject::camera(Transform::default(), Camera::frustum(0.01, 100.0).unwrap())
    }

    fn entity(api: &mut RecordingBackend) -> SceneObject {
        let data = ObjLoader::parse_str("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n").unwrap();
        let mesh = Mesh::new(data, api).unwrap();
        SceneObject::entity(Transform::default(), Entity::new(mesh, None, api).unwrap())
    }

    #[test]
    fn test_camera_must_be_a_camera() {
        let result = Scene::new([0.0; 4], SceneObject::empty(Transform::default()), Vec::new());
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_instantiate_appends_in_order() {
        let mut scene = Scene::new([0.0; 4], camera(), Vec::new()).unwrap();
        let first = scene.instantiate(SceneObject::empty(Transform::default()));
        let second = scene.instantiate(SceneObject::empty(Transform::default()));

        let ids: Vec<ObjectId> = scene.objects().iter().map(SceneObject::id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_destroy_releases_mesh_once() {
        let mut api = RecordingBackend::new();
        let object = entity(&mut api);
        let id = object.id();
        let mut scene = Scene::new([0.0; 4], camera(), vec![object]).unwrap();
        assert_eq!(api.compiled_list_count(), 1);

        let mut removed = scene.destroy(id, &mut api).unwrap();
        assert!(scene.is_empty());
        assert_eq!(api.compiled_list_count(), 0);
        assert_eq!(api.texture_count(), 0);

        let entity = removed.as_entity_mut().unwrap();
        assert_eq!(entity.mesh_mut().free(&mut api), Err(RenderError::DoubleFree("mesh")));
    }

    #[test]
    fn test_destroy_missing_object_is_state_error() {
        let mut api = RecordingBackend::new();
        let mut scene = Scene::new([0.0; 4], camera(), Vec::new()).unwrap();
        let stray = SceneObject::empty(Transform::default());

        let err = scene.destroy(stray.id(), &mut api).unwrap_err();
        assert!(matches!(err, EngineError::State(SceneError::ObjectNotFound(id)) if id == stray.id()));

        let camera_id = scene.camera().id();
        assert!(scene.destroy(camera_id, &mut api).is_err());
    }

    #[test]
    fn test_queued_commands_apply_between_frames() {
        let mut api = RecordingBackend::new();
        let started = Rc::new(RefCell::new(false));
        let flag = started.clone();
        let mut scene = Scene::new([0.0; 4], camera(), Vec::new()).unwrap();

        let spawner_commands = scene.commands();
        let spawner = SceneObject::empty(Transform::default()).with_update(move |this, _| {
            let flag = flag.clone();
            spawner_commands.instantiate(
                SceneObject::empty(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))).with_start(move |_| {
                    *flag.borrow_mut() = true;
                    Ok(())
                }),
            );
            spawner_commands.destroy(this.id());
            Ok(())
        });
        scene.instantiate(spawner);

        scene.update(0.01).unwrap();
        assert_eq!(scene.len(), 1);

        assert_eq!(scene.apply_commands(&mut api).unwrap(), 2);
        assert_eq!(scene.len(), 1);
        assert!(*started.borrow());
        assert!(scene.objects()[0].is_started());
        assert_eq!(scene.objects()[0].transform().position(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_destroy_after_manual_free_still_releases_texture() {
        let mut api = RecordingBackend::new();
        let mut object = entity(&mut api);
        let id = object.id();
        object.as_entity_mut().unwrap().mesh_mut().free(&mut api).unwrap();
        let mut scene = Scene::new([0.0; 4], camera(), vec![object]).unwrap();

        let err = scene.destroy(id, &mut api).unwrap_err();
        assert!(matches!(err, EngineError::Resource(RenderError::DoubleFree("mesh"))));
        assert!(scene.is_empty());
        assert_eq!(api.texture_count(), 0);

        scene.release_resources(&mut api).unwrap();
        assert_eq!(api.texture_count(), 0);
    }

    #[test]
    fn test_failed_command_releases_remaining_queue() {
        let mut api = RecordingBackend::new();
        let mut scene = Scene::new([0.0; 4], camera(), Vec::new()).unwrap();
        let commands = scene.commands();

        let stray = SceneObject::empty(Transform::default());
        commands.destroy(stray.id());
        commands.instantiate(entity(&mut api));
        assert_eq!(api.compiled_list_count(), 1);

        let err = scene.apply_commands(&mut api).unwrap_err();
        assert!(matches!(err, EngineError::State(SceneError::ObjectNotFound(_))));
        assert!(scene.is_empty());
        assert!(commands.is_empty());
        assert_eq!(api.compiled_list_count(), 0);
        assert_eq!(api.texture_count(), 0);
    }

    #[test]
    fn test_failed_start_releases_instantiated_entity() {
        let mut api = RecordingBackend::new();
        let mut scene = Scene::new([0.0; 4], camera(), Vec::new()).unwrap();
        scene
            .commands()
            .instantiate(entity(&mut api).with_start(|_| Err(BehaviorError::failed("no fuel"))));

        assert!(matches!(scene.apply_commands(&mut api), Err(EngineError::Behavior(_))));
        assert!(scene.is_empty());
        assert_eq!(api.compiled_list_count(), 0);
        assert_eq!(api.texture_count(), 0);
    }

    #[test]
    fn test_release_resources_drains_queued_entities() {
        let mut api = RecordingBackend::new();
        let mut scene = Scene::new([0.0; 4], camera(), Vec::new()).unwrap();
        scene.commands().instantiate(entity(&mut api));

        scene.release_resources(&mut api).unwrap();
        assert!(scene.commands().is_empty());
        assert_eq!(api.compiled_list_count(), 0);
        assert_eq!(api.texture_count(), 0);
    }

    #[test]
    fn test_release_resources_frees_every_entity() {
        let mut api = RecordingBackend::new();
        let objects = vec![entity(&mut api), entity(&mut api)];
        let mut scene = Scene::new([0.0; 4], camera(), objects).unwrap();

        scene.release_resources(&mut api).unwrap();
        assert_eq!(api.compiled_list_count(), 0);
        assert_eq!(api.texture_count(), 0);

        // Already released resources are skipped
        scene.release_resources(&mut api).unwrap();
    }
}
