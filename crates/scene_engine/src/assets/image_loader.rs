//! Image loading utilities for texture data
//!
//! Decodes any format the `image` crate supports into RGBA8 rows ordered
//! bottom-up, which is the origin texture uploads expect.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::assets::AssetError;

/// Loaded image data ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of color channels (always 4 for RGBA)
    pub channels: u8,
}

impl ImageData {
    /// Load an image from a file path, flipped so row 0 is the bottom row
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path_ref = path.as_ref();

        log::debug!("Loading image from: {:?}", path_ref);

        let img = image::open(path_ref)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to load image {:?}: {}", path_ref, e)))?;

        let image = Self::from_rgba(imageops::flip_vertical(&img.to_rgba8()));
        log::info!("Loaded image {}x{} from {:?}", image.width, image.height, path_ref);
        Ok(image)
    }

    /// Load image from memory, flipped like [`from_file`](Self::from_file)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to load image from bytes: {}", e)))?;

        let image = Self::from_rgba(imageops::flip_vertical(&img.to_rgba8()));
        log::debug!("Loaded image {}x{} from memory", image.width, image.height);
        Ok(image)
    }

    /// Create a solid color image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::from_rgba(RgbaImage::from_pixel(width, height, image::Rgba(color)))
    }

    /// Square checkerboard of `size` pixels with `block`-sized cells
    ///
    /// The cell at the origin uses `even`; neighbours alternate with `odd`.
    pub fn checkerboard(size: u32, block: u32, even: [u8; 4], odd: [u8; 4]) -> Self {
        let block = block.max(1);
        Self::from_rgba(RgbaImage::from_fn(size, size, |x, y| {
            if (x / block + y / block) % 2 == 0 {
                image::Rgba(even)
            } else {
                image::Rgba(odd)
            }
        }))
    }

    /// Check that the buffer holds exactly `width * height` RGBA pixels
    pub fn validate(&self) -> Result<(), AssetError> {
        if self.width == 0 || self.height == 0 {
            return Err(AssetError::InvalidFormat(format!(
                "image has zero extent ({}x{})",
                self.width, self.height
            )));
        }
        let expected = self.width as usize * self.height as usize * 4;
        if self.channels != 4 || self.data.len() != expected {
            return Err(AssetError::InvalidFormat(format!(
                "expected {} RGBA bytes for {}x{}, found {} bytes with {} channels",
                expected,
                self.width,
                self.height,
                self.data.len(),
                self.channels
            )));
        }
        Ok(())
    }

    /// Full mip chain, starting with level 1 and halving down to 1x1
    ///
    /// Level 0 (the image itself) is not included.
    pub fn mip_chain(&self) -> Result<Vec<ImageData>, AssetError> {
        self.validate()?;
        let base = RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| AssetError::InvalidFormat("pixel buffer does not match extent".to_string()))?;

        let mut levels = Vec::new();
        let (mut width, mut height) = (self.width, self.height);
        while width > 1 || height > 1 {
            width = (width / 2).max(1);
            height = (height / 2).max(1);
            levels.push(Self::from_rgba(imageops::resize(&base, width, height, FilterType::Triangle)));
        }
        Ok(levels)
    }

    /// Get the size of the image data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
            channels: 4,
        }
    }
}
