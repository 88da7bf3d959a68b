//! Core engine implementation
//!
//! [`Engine`] owns the window surface, the drawing backend and the frame
//! clock, and drives a [`Scene`] through the frame loop:
//!
//! ```text
//! start scene
//! while window open:
//!     viewport <- framebuffer size
//!     clear colour + depth
//!     update camera, objects       (delta time of the previous frame)
//!     clear colour <- background
//!     render camera, objects
//!     swap buffers, poll events
//!     measure frame, retitle, apply queued scene commands
//! release scene resources
//! ```
//!
//! The loop is single-threaded and never suspends inside a frame. Errors from
//! behaviours or the backend end the loop; resources are released either way.

use thiserror::Error;

use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::core::config::EngineConfig;
use crate::foundation::time::FrameClock;
use crate::render::api::{Capability, ClearFlags, DrawApi};
use crate::render::{RenderError, WindowError, WindowSurface};
use crate::scene::{BehaviorError, Scene, SceneError};

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed construction arguments or configuration values
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backend resource failure (double free, bad handle, upload)
    #[error("Resource error: {0}")]
    Resource(#[from] RenderError),

    /// Invalid scene operation
    #[error("Scene state error: {0}")]
    State(#[from] SceneError),

    /// Asset loading failure
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Window system failure
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Configuration file failure
    #[error("Config file error: {0}")]
    Config(#[from] ConfigError),

    /// A behaviour returned an error
    #[error("Behavior error: {0}")]
    Behavior(#[from] BehaviorError),
}

/// Main engine struct
///
/// Generic over the window surface and the drawing backend so the same loop
/// runs against a real window or headless in tests.
pub struct Engine<W: WindowSurface, D: DrawApi> {
    config: EngineConfig,
    window: W,
    api: D,
    clock: FrameClock,
}

impl<W: WindowSurface, D: DrawApi> Engine<W, D> {
    /// Create a new engine instance
    ///
    /// Validates `config` and switches on lighting, depth testing, colour
    /// material and, when more than one sample is configured, multisampling.
    pub fn new(config: EngineConfig, window: W, mut api: D) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Initializing engine: '{}' {}x{}, {} samples",
            config.window.title,
            config.window.width,
            config.window.height,
            config.window.samples
        );

        api.enable(Capability::Lighting);
        api.enable(Capability::DepthTest);
        if config.window.samples > 1 {
            api.enable(Capability::Multisample);
        }
        api.enable(Capability::ColorMaterial);

        let clock = FrameClock::new(config.frame.min_delta_time);
        Ok(Self {
            config,
            window,
            api,
            clock,
        })
    }

    /// Start `scene` and run frames until the window closes
    ///
    /// Every entity's mesh and texture is released when the loop ends, also
    /// when it ends with an error. The loop's own error takes precedence over
    /// a release failure.
    pub fn run(&mut self, scene: &mut Scene) -> Result<(), EngineError> {
        log::info!("Starting frame loop with {} objects", scene.len());
        let result = self.run_frames(scene);

        let released = scene.release_resources(&mut self.api);
        match &result {
            Ok(()) => log::info!("Frame loop finished after {} frames", self.clock.frame_count()),
            Err(e) => log::warn!("Frame loop aborted after {} frames: {}", self.clock.frame_count(), e),
        }

        result?;
        released?;
        Ok(())
    }

    fn run_frames(&mut self, scene: &mut Scene) -> Result<(), EngineError> {
        scene.start()?;
        while !self.window.should_close() {
            self.step(scene)?;
        }
        Ok(())
    }

    /// Run a single frame step
    pub fn step(&mut self, scene: &mut Scene) -> Result<(), EngineError> {
        self.clock.begin_frame(self.window.time());

        let (width, height) = self.window.framebuffer_size();
        if width == 0 || height == 0 {
            log::warn!("Rendering into a zero-sized framebuffer ({}x{})", width, height);
        }
        self.api.viewport(0, 0, width, height);
        scene.set_viewport(width, height);
        self.api.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

        scene.update(self.clock.delta_time())?;
        scene.render(&mut self.api)?;

        self.window.swap_buffers();
        self.window.poll_events();

        let delta_time = self.clock.end_frame(self.window.time());
        log::trace!("Frame {}: dt {:.4}s, {} fps", self.clock.frame_count(), delta_time, self.fps());

        if self.config.window.show_fps_in_title {
            let title = format!("{} {}", self.config.window.title, self.fps());
            self.window.set_title(&title);
        }

        let applied = scene.apply_commands(&mut self.api)?;
        if applied > 0 {
            log::debug!("Applied {} scene commands", applied);
        }
        Ok(())
    }

    /// Frames per second derived from the current delta time
    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }

    /// Delta time the next update pass receives
    pub fn delta_time(&self) -> f32 {
        self.clock.delta_time()
    }

    /// Number of completed frames
    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Window surface
    pub fn window(&self) -> &W {
        &self.window
    }

    /// Mutable window surface
    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    /// Drawing backend
    pub fn api(&self) -> &D {
        &self.api
    }

    /// Mutable drawing backend, e.g. to compile meshes before running
    pub fn api_mut(&mut self) -> &mut D {
        &mut self.api
    }

    /// Split into window and backend
    pub fn into_parts(self) -> (W, D) {
        (self.window, self.api)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WindowConfig;
    use crate::render::window::HeadlessWindow;
    use crate::render::RecordingBackend;

    #[test]
    fn test_new_enables_pipeline_state() {
        let config = EngineConfig::default().with_window(WindowConfig::new("t", 8, 8).with_samples(4));
        let engine = Engine::new(config, HeadlessWindow::new("t", 8, 8), RecordingBackend::new()).unwrap();

        let api = engine.api();
        assert!(api.is_enabled(Capability::Lighting));
        assert!(api.is_enabled(Capability::DepthTest));
        assert!(api.is_enabled(Capability::ColorMaterial));
        assert!(api.is_enabled(Capability::Multisample));
    }

    #[test]
    fn test_single_sample_skips_multisampling() {
        let engine = Engine::new(
            EngineConfig::default(),
            HeadlessWindow::new("t", 8, 8),
            RecordingBackend::new(),
        )
        .unwrap();
        assert!(!engine.api().is_enabled(Capability::Multisample));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::default().with_min_delta_time(-1.0);
        let result = Engine::new(config, HeadlessWindow::new("t", 8, 8), RecordingBackend::new());
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }
}
