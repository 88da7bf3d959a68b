//! Window management subsystem
//!
//! The frame loop only needs a handful of things from a window: its
//! framebuffer size, a clock, a title, buffer presentation and event
//! polling. [`WindowSurface`] captures exactly that.
//!
//! # Module Organization
//!
//! - **`backend`**: the [`WindowSurface`] contract
//! - **`headless`**: fixed-size surface with a wall clock, for tests and CI
//! - **`glfw_window`**: GLFW window with a current GL context (feature `glfw`)

pub mod backend;
pub mod headless;

#[cfg(feature = "glfw")]
pub mod glfw_window;

pub use backend::WindowSurface;
pub use headless::HeadlessWindow;

#[cfg(feature = "glfw")]
pub use glfw_window::GlfwWindow;

use thiserror::Error;

/// Window management errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// The windowing library could not be initialised
    #[error("Window system initialization failed: {0}")]
    InitializationFailed(String),

    /// The window (or its context) could not be created
    #[error("Window creation failed: {0}")]
    CreationFailed(String),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;
