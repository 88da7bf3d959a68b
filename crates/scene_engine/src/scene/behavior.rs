//! Injected behaviours
//!
//! Scene objects do not subclass; they carry closures. A start behaviour
//! runs at most once, update behaviours run every frame in registration
//! order, and render hooks let cameras and lights push extra state after
//! their built-in setup.

use thiserror::Error;

use crate::render::api::DrawApi;
use crate::render::RenderError;
use crate::scene::SceneObject;

/// Failure raised from inside a caller-supplied behaviour
///
/// The frame loop does not catch these: the first one halts the frame and
/// is returned from [`Engine::run`](crate::Engine::run).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BehaviorError {
    /// Application-defined failure
    #[error("Behavior failed: {0}")]
    Failed(String),

    /// A drawing call made by the behaviour failed
    #[error("Render error in behavior: {0}")]
    Render(#[from] RenderError),
}

impl BehaviorError {
    /// Convenience constructor for application failures
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Result type returned by behaviours
pub type BehaviorResult = Result<(), BehaviorError>;

/// Runs once, before the object's first update
pub type StartBehavior = Box<dyn FnOnce(&mut SceneObject) -> BehaviorResult>;

/// Runs every frame with the clamped delta time in seconds
pub type UpdateBehavior = Box<dyn FnMut(&mut SceneObject, f32) -> BehaviorResult>;

/// Extra drawing state pushed while a camera or light renders
pub type RenderHook = Box<dyn FnMut(&mut dyn DrawApi) -> BehaviorResult>;
