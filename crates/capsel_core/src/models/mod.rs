//! Data models for the capture pipeline.
//!
//! This module contains the core data structures:
//! - Enums for media kinds, select modes, capture origins, export presets
//! - Capture results as emitted by the camera UIs
//! - Media items and their content references
//! - The per-session selection model

mod capture;
mod enums;
mod media;
mod selection;

// Re-export all public types
pub use capture::{
    CaptureEvent, CaptureResult, GeoLocation, ImagePayload, NativeCaptureInfo, NativeMediaType,
    TrimWindow,
};
pub use enums::{
    AlbumViewMode, CameraBackend, CaptureKind, CaptureOrigin, ExportPreset, MediaKind, SelectMode,
};
pub use media::{ContentKey, LibraryAssetId, MediaContent, MediaItem};
pub use selection::{AlbumSummary, SelectionState};
