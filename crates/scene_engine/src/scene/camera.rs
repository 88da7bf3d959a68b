//! Camera projections
//!
//! A camera renders into the projection matrix: it loads the projection for
//! its kind, runs an optional custom hook, then multiplies in a look-at from
//! its position along its forward vector with its up vector.

use std::fmt;

use crate::engine::EngineError;
use crate::foundation::math::Vec3;
use crate::render::api::{DrawApi, MatrixMode};
use crate::scene::behavior::{BehaviorResult, RenderHook};
use crate::scene::Transform;

/// Projection kind, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Frustum with `-aspect..aspect` by `-1..1` bounds on the near plane
    Frustum {
        /// Near clip plane
        near: f32,
        /// Far clip plane
        far: f32,
    },
    /// Orthographic projection spanning the viewport in pixels, centred
    Orthographic {
        /// Near clip plane
        near: f32,
        /// Far clip plane
        far: f32,
    },
    /// Symmetric perspective from a vertical field of view
    Perspective {
        /// Vertical field of view in degrees
        fov: f32,
        /// Near clip plane
        near: f32,
        /// Far clip plane
        far: f32,
    },
}

/// Camera state attached to a scene object
pub struct Camera {
    projection: Projection,
    viewport: (u32, u32),
    render_hook: Option<RenderHook>,
}

impl fmt::Debug for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Camera")
            .field("projection", &self.projection)
            .field("viewport", &self.viewport)
            .field("has_render_hook", &self.render_hook.is_some())
            .finish()
    }
}

impl Camera {
    /// Frustum camera
    pub fn frustum(near: f32, far: f32) -> Result<Self, EngineError> {
        validate_perspective_planes(near, far)?;
        Ok(Self::with_projection(Projection::Frustum { near, far }))
    }

    /// Orthographic camera
    pub fn orthographic(near: f32, far: f32) -> Result<Self, EngineError> {
        if !near.is_finite() || !far.is_finite() || (far - near).abs() <= f32::EPSILON {
            return Err(EngineError::Configuration(format!(
                "orthographic clip planes must be finite and distinct, got near={} far={}",
                near, far
            )));
        }
        Ok(Self::with_projection(Projection::Orthographic { near, far }))
    }

    /// Perspective camera with a vertical field of view in degrees
    pub fn perspective(fov: f32, near: f32, far: f32) -> Result<Self, EngineError> {
        validate_fov(fov)?;
        validate_perspective_planes(near, far)?;
        Ok(Self::with_projection(Projection::Perspective { fov, near, far }))
    }

    fn with_projection(projection: Projection) -> Self {
        Self {
            projection,
            viewport: (1, 1),
            render_hook: None,
        }
    }

    /// Builder: run `hook` after the projection is loaded and before the view
    pub fn with_render_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut dyn DrawApi) -> BehaviorResult + 'static,
    {
        self.render_hook = Some(Box::new(hook));
        self
    }

    /// Projection kind and parameters
    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Field of view, for perspective cameras
    pub fn fov(&self) -> Option<f32> {
        match self.projection {
            Projection::Perspective { fov, .. } => Some(fov),
            _ => None,
        }
    }

    /// Change the field of view of a perspective camera
    pub fn set_fov(&mut self, value: f32) -> Result<(), EngineError> {
        validate_fov(value)?;
        match &mut self.projection {
            Projection::Perspective { fov, .. } => {
                *fov = value;
                Ok(())
            }
            other => Err(EngineError::Configuration(format!(
                "field of view only applies to perspective cameras, this one is {:?}",
                other
            ))),
        }
    }

    /// Record the viewport size the next render projects into
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
    }

    /// Current viewport size
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Width over height of the current viewport
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    /// Load projection and view into the projection matrix
    #[allow(clippy::cast_precision_loss)]
    pub fn render(&mut self, transform: &Transform, api: &mut dyn DrawApi) -> Result<(), EngineError> {
        api.matrix_mode(MatrixMode::Projection);
        api.load_identity();

        let aspect = self.aspect_ratio();
        match self.projection {
            Projection::Frustum { near, far } => api.frustum(-aspect, aspect, -1.0, 1.0, near, far),
            Projection::Orthographic { near, far } => {
                let half_width = self.viewport.0 as f32 / 2.0;
                let half_height = self.viewport.1 as f32 / 2.0;
                api.ortho(-half_width, half_width, -half_height, half_height, near, far);
            }
            Projection::Perspective { fov, near, far } => api.perspective(fov, aspect, near, far),
        }

        if let Some(hook) = self.render_hook.as_mut() {
            hook(&mut *api)?;
        }

        let eye: Vec3 = transform.position();
        api.look_at(eye, eye + transform.forward(), transform.up());
        Ok(())
    }
}

fn validate_perspective_planes(near: f32, far: f32) -> Result<(), EngineError> {
    if near.is_finite() && far.is_finite() && near > 0.0 && far > near {
        Ok(())
    } else {
        Err(EngineError::Configuration(format!(
            "clip planes must satisfy 0 < near < far, got near={} far={}",
            near, far
        )))
    }
}

fn validate_fov(fov: f32) -> Result<(), EngineError> {
    if fov > 0.0 && fov < 180.0 {
        Ok(())
    } else {
        Err(EngineError::Configuration(format!(
            "field of view must be within (0, 180) degrees, got {}",
            fov
        )))
    }
}
