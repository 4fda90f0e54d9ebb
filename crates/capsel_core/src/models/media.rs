//! Media items as they live in the selection model.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::capture::ImagePayload;
use super::enums::MediaKind;

/// Opaque identifier of an asset inside the system media library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibraryAssetId(pub String);

impl LibraryAssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LibraryAssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an item's content lives. Exactly one location per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaContent {
    /// Still image held in memory.
    Memory(Arc<ImagePayload>),
    /// Local file (captured or exported video).
    File(PathBuf),
    /// Asset persisted in the system library.
    Library(LibraryAssetId),
}

/// Identity used for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentKey {
    Digest(String),
    Path(PathBuf),
    Asset(LibraryAssetId),
}

impl MediaContent {
    pub fn key(&self) -> ContentKey {
        match self {
            MediaContent::Memory(image) => ContentKey::Digest(image.digest()),
            MediaContent::File(path) => ContentKey::Path(path.clone()),
            MediaContent::Library(id) => ContentKey::Asset(id.clone()),
        }
    }

    /// Whether the content is backed by the system library.
    pub fn is_library(&self) -> bool {
        matches!(self, MediaContent::Library(_))
    }
}

/// Canonical unit entering the selection model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: Uuid,
    pub kind: MediaKind,
    pub content: MediaContent,
    /// Playback length, videos only. `None` when it could not be probed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    /// Taken during this picker session rather than picked from the library.
    pub captured: bool,
    /// Still image for the album cover when the content is not in memory.
    #[serde(skip)]
    pub preview: Option<Arc<ImagePayload>>,
}

impl MediaItem {
    fn build(kind: MediaKind, content: MediaContent, duration: Option<Duration>, captured: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content,
            duration,
            captured,
            preview: None,
        }
    }

    /// Attach the image to show as album cover.
    pub fn with_preview(mut self, image: Arc<ImagePayload>) -> Self {
        self.preview = Some(image);
        self
    }

    /// Photo captured this session and kept in memory.
    pub fn captured_photo(image: ImagePayload) -> Self {
        Self::build(MediaKind::Photo, MediaContent::Memory(Arc::new(image)), None, true)
    }

    /// Video captured this session and kept as a local file.
    pub fn captured_video(file: impl Into<PathBuf>, duration: Option<Duration>) -> Self {
        Self::build(MediaKind::Video, MediaContent::File(file.into()), duration, true)
    }

    /// Capture that has been persisted into the system library.
    pub fn captured_in_library(
        kind: MediaKind,
        asset: LibraryAssetId,
        duration: Option<Duration>,
    ) -> Self {
        Self::build(kind, MediaContent::Library(asset), duration, true)
    }

    /// Pre-existing library asset picked by the user.
    pub fn from_library(kind: MediaKind, asset: LibraryAssetId, duration: Option<Duration>) -> Self {
        Self::build(kind, MediaContent::Library(asset), duration, false)
    }

    pub fn key(&self) -> ContentKey {
        self.content.key()
    }

    /// Not backed by the system library yet.
    pub fn is_local(&self) -> bool {
        !self.content.is_library()
    }

    /// Image usable as an album cover: the in-memory content, else the preview.
    pub fn cover_image(&self) -> Option<Arc<ImagePayload>> {
        match &self.content {
            MediaContent::Memory(image) => Some(Arc::clone(image)),
            _ => self.preview.clone(),
        }
    }

    /// Short label for logs.
    pub fn display_name(&self) -> String {
        let location = match &self.content {
            MediaContent::Memory(image) => format!("memory {}x{}", image.width, image.height),
            MediaContent::File(path) => path.display().to_string(),
            MediaContent::Library(id) => format!("library {}", id),
        };
        format!("{} ({})", self.kind, location)
    }
}
