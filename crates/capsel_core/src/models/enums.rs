//! Core enums used throughout the pipeline.

use serde::{Deserialize, Serialize};

/// Kind of captured media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Photo => write!(f, "photo"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Whether the picker session selects one item or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectMode {
    Single,
    #[default]
    Multiple,
}

/// Which camera UI produced a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureOrigin {
    /// In-app camera.
    Custom,
    /// Platform camera UI.
    Native,
}

impl std::fmt::Display for CaptureOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureOrigin::Custom => write!(f, "custom camera"),
            CaptureOrigin::Native => write!(f, "native camera"),
        }
    }
}

/// Camera UI the session presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraBackend {
    #[default]
    Custom,
    Native,
}

/// What the custom camera is allowed to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Photo,
    Video,
    All,
}

/// How the album list is shown alongside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumViewMode {
    /// Album list drops down over the grid; refreshed in place when visible.
    #[default]
    Popup,
    /// Album list is its own screen; refreshed when navigated to.
    Separate,
}

/// Export preset for trimmed videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPreset {
    LowQuality,
    MediumQuality,
    #[default]
    HighQuality,
    #[serde(rename = "ratio_640x480")]
    Ratio640x480,
    #[serde(rename = "ratio_960x540")]
    Ratio960x540,
    #[serde(rename = "ratio_1280x720")]
    Ratio1280x720,
}

impl ExportPreset {
    /// Target frame size, if the preset pins one.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        match self {
            ExportPreset::Ratio640x480 => Some((640, 480)),
            ExportPreset::Ratio960x540 => Some((960, 540)),
            ExportPreset::Ratio1280x720 => Some((1280, 720)),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExportPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportPreset::LowQuality => write!(f, "low quality"),
            ExportPreset::MediumQuality => write!(f, "medium quality"),
            ExportPreset::HighQuality => write!(f, "high quality"),
            ExportPreset::Ratio640x480 => write!(f, "640x480"),
            ExportPreset::Ratio960x540 => write!(f, "960x540"),
            ExportPreset::Ratio1280x720 => write!(f, "1280x720"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_serializes_with_ratio_names() {
        let json = serde_json::to_string(&ExportPreset::Ratio960x540).unwrap();
        assert_eq!(json, "\"ratio_960x540\"");
        let json = serde_json::to_string(&ExportPreset::MediumQuality).unwrap();
        assert_eq!(json, "\"medium_quality\"");
    }

    #[test]
    fn only_ratio_presets_pin_frame_size() {
        assert_eq!(ExportPreset::HighQuality.frame_size(), None);
        assert_eq!(ExportPreset::Ratio1280x720.frame_size(), Some((1280, 720)));
    }
}
