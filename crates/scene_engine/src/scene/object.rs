//! Scene object lifecycle
//!
//! ```text
//! constructed (active) --start()--> started --update()/render()--> ...
//!        |                                   ^
//!        +--- set_active(false) ---> inactive +--- set_active(true)
//! ```
//!
//! - `start` invokes the start behaviour at most once, and only if the
//!   object is active at that moment. Reactivating an object never runs it.
//! - `update` samples `active` once at entry. A behaviour that deactivates
//!   its own object does not stop later behaviours in the same pass.
//! - `render` draws nothing for an inactive object.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::EngineError;
use crate::render::api::DrawApi;
use crate::render::RenderResult;
use crate::scene::behavior::{BehaviorResult, StartBehavior, UpdateBehavior};
use crate::scene::{Camera, Entity, Light, Transform};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a scene object draws
#[derive(Debug)]
pub enum ObjectKind {
    /// Behaviour-only object with nothing to draw
    Empty,
    /// Establishes projection and view
    Camera(Camera),
    /// Textured mesh
    Entity(Entity),
    /// Fixed-function light source
    Light(Light),
}

impl ObjectKind {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Empty => "empty",
            ObjectKind::Camera(_) => "camera",
            ObjectKind::Entity(_) => "entity",
            ObjectKind::Light(_) => "light",
        }
    }
}

/// A placeable object with a transform and start/update/render lifecycle
pub struct SceneObject {
    id: ObjectId,
    transform: Transform,
    active: bool,
    started: bool,
    kind: ObjectKind,
    start: Option<StartBehavior>,
    updates: Vec<UpdateBehavior>,
}

impl fmt::Debug for SceneObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneObject")
            .field("id", &self.id)
            .field("transform", &self.transform)
            .field("active", &self.active)
            .field("started", &self.started)
            .field("kind", &self.kind)
            .field("has_start", &self.start.is_some())
            .field("updates", &self.updates.len())
            .finish()
    }
}

impl SceneObject {
    /// Create an active object of the given kind
    pub fn new(transform: Transform, kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::next(),
            transform,
            active: true,
            started: false,
            kind,
            start: None,
            updates: Vec::new(),
        }
    }

    /// Object that only runs behaviours
    pub fn empty(transform: Transform) -> Self {
        Self::new(transform, ObjectKind::Empty)
    }

    /// Camera object
    pub fn camera(transform: Transform, camera: Camera) -> Self {
        Self::new(transform, ObjectKind::Camera(camera))
    }

    /// Renderable entity object
    pub fn entity(transform: Transform, entity: Entity) -> Self {
        Self::new(transform, ObjectKind::Entity(entity))
    }

    /// Light object
    pub fn light(transform: Transform, light: Light) -> Self {
        Self::new(transform, ObjectKind::Light(light))
    }

    /// Builder: set the start behaviour
    pub fn with_start<F>(mut self, start: F) -> Self
    where
        F: FnOnce(&mut SceneObject) -> BehaviorResult + 'static,
    {
        self.start = Some(Box::new(start));
        self
    }

    /// Builder: append an update behaviour
    pub fn with_update<F>(mut self, update: F) -> Self
    where
        F: FnMut(&mut SceneObject, f32) -> BehaviorResult + 'static,
    {
        self.add_update(update);
        self
    }

    /// Append an update behaviour
    ///
    /// Behaviours added while an update pass is running take effect from
    /// the next pass.
    pub fn add_update<F>(&mut self, update: F)
    where
        F: FnMut(&mut SceneObject, f32) -> BehaviorResult + 'static,
    {
        self.updates.push(Box::new(update));
    }

    /// Identity of this object
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable transform
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Whether update and render currently do anything
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activate or deactivate the object
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether [`start`](Self::start) has already been called
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Number of registered update behaviours
    pub fn update_count(&self) -> usize {
        self.updates.len()
    }

    /// The object's kind
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Mutable access to the kind
    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    /// Camera data, if this is a camera
    pub fn as_camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.kind {
            ObjectKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Entity data, if this is an entity
    pub fn as_entity(&self) -> Option<&Entity> {
        match &self.kind {
            ObjectKind::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Mutable entity data, if this is an entity
    pub fn as_entity_mut(&mut self) -> Option<&mut Entity> {
        match &mut self.kind {
            ObjectKind::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Light data, if this is a light
    pub fn as_light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Run the start behaviour once, if active
    ///
    /// The first call marks the object started whether or not it was active,
    /// so an object that starts inactive never runs its start behaviour.
    pub fn start(&mut self) -> BehaviorResult {
        if self.started {
            return Ok(());
        }
        self.started = true;

        if !self.active {
            log::debug!("Skipping start of inactive {} {}", self.kind.name(), self.id);
            return Ok(());
        }

        match self.start.take() {
            Some(start) => start(self),
            None => Ok(()),
        }
    }

    /// Run every update behaviour in registration order, if active
    pub fn update(&mut self, delta_time: f32) -> BehaviorResult {
        if !self.active {
            return Ok(());
        }

        // Behaviours receive `&mut self`, so the list is detached while they run
        let mut updates = std::mem::take(&mut self.updates);
        let mut result = Ok(());
        for update in &mut updates {
            result = update(self, delta_time);
            if result.is_err() {
                break;
            }
        }
        updates.append(&mut self.updates);
        self.updates = updates;

        result
    }

    /// Draw the object, if active, and flush
    pub fn render(&mut self, api: &mut dyn DrawApi) -> Result<(), EngineError> {
        if !self.active {
            return Ok(());
        }

        match &mut self.kind {
            ObjectKind::Empty => {}
            ObjectKind::Camera(camera) => camera.render(&self.transform, api)?,
            ObjectKind::Entity(entity) => entity.render(&self.transform, api)?,
            ObjectKind::Light(light) => light.render(&self.transform, api)?,
        }
        api.flush();
        Ok(())
    }

    /// Release backend resources still held by an entity
    pub fn release_resources(&mut self, api: &mut dyn DrawApi) -> RenderResult<()> {
        match &mut self.kind {
            ObjectKind::Entity(entity) => entity.release(api),
            _ => Ok(()),
        }
    }
}
