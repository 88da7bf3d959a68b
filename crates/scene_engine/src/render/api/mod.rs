//! Public rendering API
//!
//! This module contains the drawing capability trait the engine renders
//! through, together with the handle and parameter types it exchanges.

pub mod render_backend;

// Re-export commonly used types
pub use render_backend::{
    BackendResult, Capability, ClearFlags, DrawApi, DrawCommand, LightParam, LightSlot, ListHandle,
    MatrixMode, PolygonMode, TextureFilter, TextureHandle, TextureParams,
};
