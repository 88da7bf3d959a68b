//! Deferred structural changes
//!
//! Behaviours run while the scene's object list is being iterated, so they
//! cannot add or remove objects directly. They capture a [`SceneCommands`]
//! handle instead and queue requests; the engine applies the queue between
//! frames.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::scene::{ObjectId, SceneObject};

/// A queued structural change
pub enum SceneCommand {
    /// Append an object (it is started before its first update)
    Instantiate(SceneObject),
    /// Remove an object and release its resources
    Destroy(ObjectId),
}

impl fmt::Debug for SceneCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneCommand::Instantiate(object) => write!(f, "Instantiate({} {})", object.kind().name(), object.id()),
            SceneCommand::Destroy(id) => write!(f, "Destroy({})", id),
        }
    }
}

/// Cloneable single-threaded queue of [`SceneCommand`]s
#[derive(Clone, Default)]
pub struct SceneCommands {
    queue: Rc<RefCell<Vec<SceneCommand>>>,
}

impl fmt::Debug for SceneCommands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneCommands").field("pending", &self.len()).finish()
    }
}

impl SceneCommands {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `object` for insertion and return its id
    pub fn instantiate(&self, object: SceneObject) -> ObjectId {
        let id = object.id();
        self.queue.borrow_mut().push(SceneCommand::Instantiate(object));
        id
    }

    /// Queue removal of the object with `id`
    pub fn destroy(&self, id: ObjectId) {
        self.queue.borrow_mut().push(SceneCommand::Destroy(id));
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Take every queued command in submission order
    pub fn drain(&self) -> Vec<SceneCommand> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}
