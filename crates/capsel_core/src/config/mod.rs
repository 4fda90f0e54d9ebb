//! Configuration management for the capture pipeline.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use capsel_core::config::{ConfigManager, ConfigSection};
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".config/capsel.toml");
//! config.load_or_create().unwrap();
//!
//! // Read settings
//! println!("Select mode: {:?}", config.settings().selection.mode);
//!
//! // Modify a setting
//! config.settings_mut().camera.dismiss_on_reject = true;
//!
//! // Save just the camera section atomically
//! config.update_section(ConfigSection::Camera).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    CameraSettings, ConfigSection, ExportSettings, LoggingSettings, SelectionSettings, Settings,
};
