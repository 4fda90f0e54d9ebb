//! Background collaborators: transcoding primitives and the system library.
//!
//! Implementations run on worker contexts and may take arbitrarily long.
//! Timeouts are theirs to enforce; they surface as a `BackendError`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::BackendResult;
use crate::models::{ExportPreset, GeoLocation, ImagePayload, LibraryAssetId, MediaKind, TrimWindow};

/// Track metadata of a video once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    pub duration: Duration,
    pub track_count: usize,
}

/// One trim/re-encode job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimRequest {
    pub source: PathBuf,
    pub window: TrimWindow,
    pub preset: ExportPreset,
    /// 0 (smallest) to 10 (best).
    pub quality: u8,
}

/// Video transcoding primitives.
#[async_trait]
pub trait VideoExporter: Send + Sync {
    /// Load the track metadata of `source`.
    async fn load_tracks(&self, source: &Path) -> BackendResult<VideoInfo>;

    /// Trim and re-encode, returning the path of a new file.
    async fn trim(&self, request: &TrimRequest) -> BackendResult<PathBuf>;
}

/// Payload handed to the system library.
#[derive(Debug, Clone, PartialEq)]
pub enum SavePayload {
    Image(Arc<ImagePayload>),
    Video(PathBuf),
}

impl SavePayload {
    pub fn kind(&self) -> MediaKind {
        match self {
            SavePayload::Image(_) => MediaKind::Photo,
            SavePayload::Video(_) => MediaKind::Video,
        }
    }
}

/// The system-managed media library.
///
/// `save` is all-or-nothing: a failed save must not leave an asset behind.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    async fn save(
        &self,
        payload: &SavePayload,
        album: Option<&str>,
        location: Option<GeoLocation>,
    ) -> BackendResult<LibraryAssetId>;
}
