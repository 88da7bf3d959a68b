//! Asset loading
//!
//! Turns files on disk into plain data the render layer consumes: OBJ text
//! into [`MeshData`](crate::render::MeshData) and image files into RGBA
//! [`ImageData`].

pub mod image_loader;
pub mod obj_loader;

pub use image_loader::ImageData;
pub use obj_loader::ObjLoader;

use thiserror::Error;

/// Asset system errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Reading the source failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of a text asset could not be parsed
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// The asset parsed but its contents are unusable
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Decoding a binary asset failed
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),
}
