//! Rendering subsystem
//!
//! - [`api`]: the [`DrawApi`] capability trait every backend implements
//! - [`mesh`]: face-indexed geometry compiled once into a replayable list
//! - [`texture`]: RGBA uploads and the missing-albedo fallback
//! - [`recording`]: an in-memory reference backend
//! - [`window`]: the window surface the frame loop presents to

use thiserror::Error;

pub mod api;
pub mod mesh;
pub mod recording;
pub mod texture;
pub mod window;

pub use api::{DrawApi, DrawCommand, ListHandle, TextureHandle};
pub use mesh::{Face, Mesh, MeshData};
pub use recording::{DrawEvent, RecordingBackend};
pub use texture::Texture;
pub use window::{WindowError, WindowSurface};

/// Rendering resource errors
///
/// Covers the resource side of the engine error taxonomy: handle lifetime
/// violations and malformed upload data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A compiled resource was released twice
    #[error("{0} was already released")]
    DoubleFree(&'static str),

    /// A released resource was used for drawing
    #[error("{0} used after release")]
    UseAfterRelease(&'static str),

    /// The backend does not know the handle
    #[error("Unknown {kind} handle {id}")]
    UnknownHandle {
        /// Resource kind ("list" or "texture")
        kind: &'static str,
        /// Raw handle value
        id: u64,
    },

    /// A face references an element outside its attribute array
    #[error("Face {face} references {attribute} index {index}, but only {len} are defined")]
    IndexOutOfRange {
        /// Zero-based face number
        face: usize,
        /// Attribute name ("vertex", "normal" or "texcoord")
        attribute: &'static str,
        /// The offending 1-based index
        index: usize,
        /// Number of elements available
        len: usize,
    },

    /// A face is malformed (too few vertices or mismatched index lists)
    #[error("Face {face} is malformed: {reason}")]
    MalformedFace {
        /// Zero-based face number
        face: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Pixel data does not match the declared dimensions
    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    /// The backend refused an upload
    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
