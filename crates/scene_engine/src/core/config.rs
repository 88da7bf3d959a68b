//! # Engine Configuration
//!
//! Replaces process-wide window preferences with an explicit configuration
//! value that is handed to the frame loop and the window surface.
//!
//! ## Configuration Categories
//!
//! - **Window**: title, initial size, multisampling, vsync, FPS readout
//! - **Frame**: delta-time floor for the update loop
//! - **Logging**: default log filter
//!
//! All sections deserialize with defaults, so a partial TOML/RON file only
//! needs to name the values it changes.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::EngineError;
use crate::foundation::time::MIN_DELTA_TIME;

/// # Window Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title (the FPS readout is appended when enabled)
    pub title: String,
    /// Initial window width in pixels
    pub width: u32,
    /// Initial window height in pixels
    pub height: u32,
    /// Multisample anti-aliasing samples (1 = disabled)
    pub samples: u32,
    /// Whether buffer swaps wait for vertical sync
    pub vsync: bool,
    /// Append the current FPS to the window title every frame
    pub show_fps_in_title: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: 1280,
            height: 720,
            samples: 1,
            vsync: false,
            show_fps_in_title: true,
        }
    }
}

impl WindowConfig {
    /// Create a window configuration with the given title and size
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Default::default()
        }
    }

    /// Set the multisample count
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    /// Aspect ratio of the configured size
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// # Frame Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Floor applied to the measured frame time, in seconds
    pub min_delta_time: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            min_delta_time: MIN_DELTA_TIME,
        }
    }
}

/// # Logging Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log filter (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// # Complete Engine Configuration
///
/// Top-level configuration handed to [`Engine::new`](crate::Engine::new).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window configuration
    pub window: WindowConfig,
    /// Frame loop configuration
    pub frame: FrameConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Builder pattern: set window configuration
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Builder pattern: set the delta-time floor
    pub fn with_min_delta_time(mut self, min_delta_time: f32) -> Self {
        self.frame.min_delta_time = min_delta_time;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(EngineError::Configuration(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.window.samples == 0 {
            return Err(EngineError::Configuration(
                "multisample count must be at least 1".to_string(),
            ));
        }
        if self.frame.min_delta_time.is_nan() || self.frame.min_delta_time <= 0.0 {
            return Err(EngineError::Configuration(format!(
                "min_delta_time must be positive, got {}",
                self.frame.min_delta_time
            )));
        }
        Ok(())
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_window() {
        let config = EngineConfig::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.window.samples, 1);
        assert!((config.frame.min_delta_time - 0.005).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [window]
            title = "Rocket"
            samples = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.window.title, "Rocket");
        assert_eq!(config.window.samples, 4);
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_ron_roundtrip_through_file() {
        let path = std::env::temp_dir().join(format!("scene_engine_config_{}.ron", std::process::id()));
        let path = path.to_str().unwrap();

        let config = EngineConfig::default()
            .with_window(WindowConfig::new("Saved", 640, 480).with_samples(2));
        config.save_to_file(path).unwrap();
        let loaded = EngineConfig::load_from_file(path).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let result = EngineConfig::default().save_to_file("engine.yaml");
        assert!(matches!(result, Err(crate::config::ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_validation_rejects_degenerate_values() {
        let zero_size = EngineConfig::default().with_window(WindowConfig::new("", 0, 720));
        assert!(matches!(zero_size.validate(), Err(EngineError::Configuration(_))));

        let no_samples = EngineConfig::default().with_window(WindowConfig::new("", 10, 10).with_samples(0));
        assert!(no_samples.validate().is_err());

        let zero_floor = EngineConfig::default().with_min_delta_time(0.0);
        assert!(zero_floor.validate().is_err());
    }
}
