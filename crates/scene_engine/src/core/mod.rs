//! # Core Engine Module
//!
//! Shared configuration types used by the frame loop, the window surface and
//! the logging setup.

pub mod config;

// Re-export commonly used config types
pub use config::{EngineConfig, FrameConfig, LoggingConfig, WindowConfig};
pub use crate::config::{Config, ConfigError};
