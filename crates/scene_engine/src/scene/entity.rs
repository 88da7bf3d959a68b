//! Textured mesh entities

use crate::render::api::{DrawApi, MatrixMode, PolygonMode};
use crate::render::{Mesh, RenderResult, Texture};
use crate::scene::Transform;

/// A compiled mesh drawn with an albedo texture
#[derive(Debug)]
pub struct Entity {
    mesh: Mesh,
    texture: Texture,
}

impl Entity {
    /// Pair a mesh with its albedo, uploading the missing-albedo checkerboard when `texture` is `None`
    ///
    /// If the fallback upload fails the mesh is freed before the error is returned.
    pub fn new(mut mesh: Mesh, texture: Option<Texture>, api: &mut dyn DrawApi) -> RenderResult<Self> {
        let texture = match texture {
            Some(texture) => texture,
            None => match Texture::missing_albedo(api) {
                Ok(texture) => texture,
                Err(e) => {
                    if let Err(free_error) = mesh.free(api) {
                        log::warn!("Failed to free mesh after texture upload error: {}", free_error);
                    }
                    return Err(e);
                }
            },
        };
        Ok(Self { mesh, texture })
    }

    /// The compiled mesh
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Mutable mesh, e.g. to free it early
    pub fn mesh_mut(&mut self) -> &mut Mesh {
        &mut self.mesh
    }

    /// The albedo texture
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Draw the mesh under `transform` with the albedo bound
    pub fn render(&self, transform: &Transform, api: &mut dyn DrawApi) -> RenderResult<()> {
        api.matrix_mode(MatrixMode::ModelView);
        api.load_identity();
        api.polygon_mode(PolygonMode::Fill);

        self.texture.bind(api)?;
        transform.apply_transformations(api);
        self.mesh.build(api)?;
        api.bind_texture(None)
    }

    /// Free the mesh and texture if they are still held
    ///
    /// Used on shutdown, where an entity may already have been released.
    pub fn release(&mut self, api: &mut dyn DrawApi) -> RenderResult<()> {
        if self.mesh.is_compiled() {
            self.mesh.free(api)?;
        }
        if self.texture.handle().is_some() {
            self.texture.free(api)?;
        }
        Ok(())
    }
}
