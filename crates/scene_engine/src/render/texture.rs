//! 2D textures
//!
//! A [`Texture`] owns one uploaded backend slot. Uploads always use linear
//! filtering with a generated mip chain. Entities built without an albedo
//! texture fall back to [`Texture::missing_albedo`], a purple and black
//! checkerboard that makes the omission obvious on screen.

use crate::assets::ImageData;
use crate::render::api::{DrawApi, TextureHandle, TextureParams};
use crate::render::{RenderError, RenderResult};

/// Edge length of the missing-albedo checkerboard
pub const MISSING_ALBEDO_SIZE: u32 = 256;

/// Cells per row of the missing-albedo checkerboard
pub const MISSING_ALBEDO_CELLS: u32 = 8;

/// Checkerboard colour of the cell at the origin
pub const MISSING_ALBEDO_DARK: [u8; 4] = [0, 0, 0, 255];

/// Alternate checkerboard colour
pub const MISSING_ALBEDO_LIGHT: [u8; 4] = [128, 0, 128, 255];

/// An uploaded 2D texture
#[derive(Debug)]
pub struct Texture {
    handle: Option<TextureHandle>,
    width: u32,
    height: u32,
}

impl Texture {
    /// Upload `image` into a new backend slot
    pub fn upload(api: &mut dyn DrawApi, image: &ImageData) -> RenderResult<Self> {
        image
            .validate()
            .map_err(|e| RenderError::InvalidImage(e.to_string()))?;
        let handle = api.upload_texture(image, TextureParams::default())?;
        log::debug!("Uploaded texture {:?} ({}x{})", handle, image.width, image.height);
        Ok(Self {
            handle: Some(handle),
            width: image.width,
            height: image.height,
        })
    }

    /// Upload the checkerboard used when an entity has no albedo texture
    pub fn missing_albedo(api: &mut dyn DrawApi) -> RenderResult<Self> {
        Self::upload(api, &Self::missing_albedo_image(MISSING_ALBEDO_SIZE))
    }

    /// Checkerboard pixels of the given edge length, 8 cells per row
    pub fn missing_albedo_image(size: u32) -> ImageData {
        ImageData::checkerboard(
            size,
            size / MISSING_ALBEDO_CELLS,
            MISSING_ALBEDO_DARK,
            MISSING_ALBEDO_LIGHT,
        )
    }

    /// Bind this texture for subsequent draws
    pub fn bind(&self, api: &mut dyn DrawApi) -> RenderResult<()> {
        let handle = self.handle.ok_or(RenderError::UseAfterRelease("texture"))?;
        api.bind_texture(Some(handle))
    }

    /// Release the backend slot; a second call is [`RenderError::DoubleFree`]
    pub fn free(&mut self, api: &mut dyn DrawApi) -> RenderResult<()> {
        let handle = self.handle.take().ok_or(RenderError::DoubleFree("texture"))?;
        log::debug!("Releasing texture {:?}", handle);
        api.delete_texture(handle)
    }

    /// Backend handle, or `None` after [`free`](Self::free)
    pub fn handle(&self) -> Option<TextureHandle> {
        self.handle
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }
}
