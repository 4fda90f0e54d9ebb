//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.
//! A loaded `Settings` is frozen behind an `Arc` and threaded through every
//! pipeline run; nothing reads policy from shared mutable state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::models::{AlbumViewMode, CameraBackend, CaptureKind, ExportPreset, SelectMode};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Selection rules and picker behaviour.
    #[serde(default)]
    pub selection: SelectionSettings,

    /// Camera presentation and capture policy.
    #[serde(default)]
    pub camera: CameraSettings,

    /// Trim export options.
    #[serde(default)]
    pub export: ExportSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Check values that serde cannot range-check.
    pub fn validate(&self) -> Result<(), String> {
        if self.export.quality > 10 {
            return Err(format!(
                "export.quality must be between 0 and 10, got {}",
                self.export.quality
            ));
        }
        let s = &self.selection;
        if s.max_total == 0 {
            return Err("selection.max_total must be at least 1".to_string());
        }
        if let (Some(min), Some(max)) = (s.min_video_secs, s.max_video_secs) {
            if min > max {
                return Err(format!(
                    "selection.min_video_secs ({}) exceeds max_video_secs ({})",
                    min, max
                ));
            }
        }
        if !s.allow_photos && !s.allow_videos {
            return Err("selection must allow photos, videos, or both".to_string());
        }
        Ok(())
    }

    /// Whether an accepted capture completes a single-select session.
    pub fn finishes_on_capture(&self) -> bool {
        self.selection.mode == SelectMode::Single && self.camera.finish_after_capture
    }

    /// Whether an accepted capture enters the ordered selection.
    ///
    /// A finishing capture is always selected, even in listing-only mode.
    pub fn selects_on_capture(&self) -> bool {
        self.selection.select_after_capture || self.finishes_on_capture()
    }

    /// Capture kind derived from the allowed media.
    pub fn capture_kind(&self) -> CaptureKind {
        match (self.selection.allow_photos, self.selection.allow_videos) {
            (true, true) => CaptureKind::All,
            (false, true) => CaptureKind::Video,
            _ => CaptureKind::Photo,
        }
    }
}

/// Selection rules enforced by the eligibility gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionSettings {
    /// Single or multiple selection.
    #[serde(default)]
    pub mode: SelectMode,

    /// Maximum number of selected items.
    #[serde(default = "default_max_total")]
    pub max_total: usize,

    /// Maximum number of selected photos (0 = no separate limit).
    #[serde(default)]
    pub max_photos: usize,

    /// Maximum number of selected videos (0 = no separate limit).
    #[serde(default)]
    pub max_videos: usize,

    /// Allow photos and videos in the same selection.
    #[serde(default = "default_true")]
    pub allow_mixed: bool,

    /// Photos may be picked or captured.
    #[serde(default = "default_true")]
    pub allow_photos: bool,

    /// Videos may be picked or captured.
    #[serde(default = "default_true")]
    pub allow_videos: bool,

    /// Shortest selectable video in seconds.
    #[serde(default)]
    pub min_video_secs: Option<u64>,

    /// Longest selectable video in seconds.
    #[serde(default)]
    pub max_video_secs: Option<u64>,

    /// Select captures automatically; when off they only appear in the list.
    #[serde(default = "default_true")]
    pub select_after_capture: bool,

    /// How the album list is presented.
    #[serde(default)]
    pub album_view: AlbumViewMode,
}

fn default_true() -> bool {
    true
}

fn default_max_total() -> usize {
    9
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            mode: SelectMode::default(),
            max_total: default_max_total(),
            max_photos: 0,
            max_videos: 0,
            allow_mixed: true,
            allow_photos: true,
            allow_videos: true,
            min_video_secs: None,
            max_video_secs: None,
            select_after_capture: true,
            album_view: AlbumViewMode::default(),
        }
    }
}

impl SelectionSettings {
    pub fn min_video_duration(&self) -> Option<Duration> {
        self.min_video_secs.map(Duration::from_secs)
    }

    pub fn max_video_duration(&self) -> Option<Duration> {
        self.max_video_secs.map(Duration::from_secs)
    }
}

/// Camera presentation and capture policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Which camera UI to present.
    #[serde(default)]
    pub backend: CameraBackend,

    /// In single-select mode, finish the whole session after a capture.
    #[serde(default)]
    pub finish_after_capture: bool,

    /// Mirror captures into the system library.
    #[serde(default)]
    pub save_to_system_album: bool,

    /// Album to save captures into (library default when unset).
    #[serde(default)]
    pub custom_album_name: Option<String>,

    /// Dismiss the capture UI when a capture is rejected.
    #[serde(default)]
    pub dismiss_on_reject: bool,

    /// Dismiss the capture UI as soon as a result arrives.
    #[serde(default)]
    pub dismiss_on_receive: bool,

    /// Dismiss the capture UI once a run completes successfully.
    #[serde(default = "default_true")]
    pub auto_dismiss: bool,

    /// Native camera: longest recordable video in seconds.
    #[serde(default = "default_video_max_secs")]
    pub video_max_secs: u64,

    /// Native camera: allow in-place editing (trim, crop).
    #[serde(default)]
    pub allows_editing: bool,

    /// Native camera: explicit media type list (derived when empty).
    #[serde(default)]
    pub media_types: Vec<String>,
}

fn default_video_max_secs() -> u64 {
    60
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            backend: CameraBackend::default(),
            finish_after_capture: false,
            save_to_system_album: false,
            custom_album_name: None,
            dismiss_on_reject: false,
            dismiss_on_receive: false,
            auto_dismiss: true,
            video_max_secs: default_video_max_secs(),
            allows_editing: false,
            media_types: Vec::new(),
        }
    }
}

/// Trim export options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Export preset.
    #[serde(default)]
    pub preset: ExportPreset,

    /// Encoder quality from 0 (smallest) to 10 (best).
    #[serde(default = "default_quality")]
    pub quality: u8,
}

fn default_quality() -> u8 {
    6
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            preset: ExportPreset::default(),
            quality: default_quality(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for run logs.
    #[serde(default)]
    pub level: LogLevel,

    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of recent lines replayed when a run fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Folder for the session log file (no file when unset).
    #[serde(default)]
    pub logs_folder: Option<String>,
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            error_tail: default_error_tail(),
            logs_folder: None,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Selection,
    Camera,
    Export,
    Logging,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::Selection,
        ConfigSection::Camera,
        ConfigSection::Export,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Selection => "selection",
            ConfigSection::Camera => "camera",
            ConfigSection::Export => "export",
            ConfigSection::Logging => "logging",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[selection]"));
        assert!(toml.contains("[camera]"));
        assert!(toml.contains("max_total"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[selection]\nmode = \"single\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        // Custom value preserved
        assert_eq!(parsed.selection.mode, SelectMode::Single);
        // Defaults applied for missing
        assert_eq!(parsed.selection.max_total, 9);
        assert!(parsed.camera.auto_dismiss);
        assert_eq!(parsed.export.quality, 6);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.export.quality = 11;
        assert!(settings.validate().unwrap_err().contains("export.quality"));

        settings.export.quality = 5;
        settings.selection.min_video_secs = Some(30);
        settings.selection.max_video_secs = Some(10);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn finish_policy_requires_single_mode() {
        let mut settings = Settings::default();
        settings.camera.finish_after_capture = true;
        assert!(!settings.finishes_on_capture());

        settings.selection.mode = SelectMode::Single;
        assert!(settings.finishes_on_capture());

        settings.selection.select_after_capture = false;
        assert!(settings.finishes_on_capture());
        assert!(settings.selects_on_capture());

        settings.camera.finish_after_capture = false;
        assert!(!settings.selects_on_capture());
    }

    #[test]
    fn capture_kind_follows_allowed_media() {
        let mut settings = Settings::default();
        assert_eq!(settings.capture_kind(), CaptureKind::All);
        settings.selection.allow_photos = false;
        assert_eq!(settings.capture_kind(), CaptureKind::Video);
        settings.selection.allow_photos = true;
        settings.selection.allow_videos = false;
        assert_eq!(settings.capture_kind(), CaptureKind::Photo);
    }
}
