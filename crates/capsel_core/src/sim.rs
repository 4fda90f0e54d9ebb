//! In-memory collaborators.
//!
//! These stand in for the camera UI, the transcoder and the system library
//! when the pipeline runs headless: in tests and in the replay binary.
//! Every call is recorded so callers can assert on what happened.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{GeoLocation, ImagePayload, LibraryAssetId, MediaItem, MediaKind};
use crate::services::{
    Anchor, BackendError, BackendResult, BusyIndicator, CameraDevice, CaptureSurface,
    MediaLibrary, NoticePresenter, PickerSession, SavePayload, SelectionObserver, TrimRequest,
    VideoExporter, VideoInfo,
};

/// Transcoder that never touches the filesystem.
#[derive(Debug)]
pub struct SimExporter {
    duration: Duration,
    track_count: usize,
    probe_failure: Option<String>,
    trim_failure: Option<String>,
    probes: AtomicUsize,
    trims: Mutex<Vec<TrimRequest>>,
}

impl SimExporter {
    /// Exporter whose sources all last `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            track_count: 1,
            probe_failure: None,
            trim_failure: None,
            probes: AtomicUsize::new(0),
            trims: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_probe(mut self, message: impl Into<String>) -> Self {
        self.probe_failure = Some(message.into());
        self
    }

    pub fn failing_trim(mut self, message: impl Into<String>) -> Self {
        self.trim_failure = Some(message.into());
        self
    }

    pub fn with_track_count(mut self, track_count: usize) -> Self {
        self.track_count = track_count;
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn trims(&self) -> Vec<TrimRequest> {
        self.trims.lock().clone()
    }
}

impl Default for SimExporter {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl VideoExporter for SimExporter {
    async fn load_tracks(&self, _source: &Path) -> BackendResult<VideoInfo> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.probe_failure {
            return Err(BackendError::new(message.clone()));
        }
        Ok(VideoInfo {
            duration: self.duration,
            track_count: self.track_count,
        })
    }

    async fn trim(&self, request: &TrimRequest) -> BackendResult<PathBuf> {
        self.trims.lock().push(request.clone());
        if let Some(message) = &self.trim_failure {
            return Err(BackendError::new(message.clone()));
        }
        let stem = request
            .source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "capture".to_string());
        Ok(request.source.with_file_name(format!("{}_trimmed.mp4", stem)))
    }
}

/// An asset written to the simulated library.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedAsset {
    pub id: LibraryAssetId,
    pub payload: SavePayload,
    pub album: Option<String>,
    pub location: Option<GeoLocation>,
}

/// System library kept in a vector.
#[derive(Debug, Default)]
pub struct SimLibrary {
    failure: Option<String>,
    attempts: AtomicUsize,
    assets: Mutex<Vec<SavedAsset>>,
}

impl SimLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library whose every write fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn assets(&self) -> Vec<SavedAsset> {
        self.assets.lock().clone()
    }
}

#[async_trait]
impl MediaLibrary for SimLibrary {
    async fn save(
        &self,
        payload: &SavePayload,
        album: Option<&str>,
        location: Option<GeoLocation>,
    ) -> BackendResult<LibraryAssetId> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(BackendError::new(message.clone()));
        }
        let id = LibraryAssetId::new(Uuid::new_v4().to_string());
        self.assets.lock().push(SavedAsset {
            id: id.clone(),
            payload: payload.clone(),
            album: album.map(str::to_string),
            location,
        });
        Ok(id)
    }
}

/// One observable effect on the simulated UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum UiEvent {
    BusyShown { anchor: Anchor },
    BusyHidden { anchor: Anchor },
    Warning { anchor: Anchor, message: String },
    ItemAdded { id: Uuid, kind: MediaKind },
    SelectionCountChanged { count: usize },
    CoverUpdated { has_cover: bool, count: usize },
    RefreshIfVisible,
    SessionFinished { count: usize },
    CaptureDismissed,
}

/// Records every UI-side call in order.
///
/// Implements all UI collaborator traits so one instance can back a whole
/// session.
#[derive(Debug)]
pub struct UiRecorder {
    events: Mutex<Vec<UiEvent>>,
    camera_available: bool,
    allow_camera: bool,
}

impl UiRecorder {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            camera_available: true,
            allow_camera: true,
        }
    }

    /// Recorder whose camera hardware reports unavailable.
    pub fn without_camera(mut self) -> Self {
        self.camera_available = false;
        self
    }

    /// Recorder whose session vetoes camera presentation.
    pub fn vetoing_camera(mut self) -> Self {
        self.allow_camera = false;
        self
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&UiEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }

    pub fn busy_shown(&self) -> usize {
        self.count(|e| matches!(e, UiEvent::BusyShown { .. }))
    }

    pub fn busy_hidden(&self) -> usize {
        self.count(|e| matches!(e, UiEvent::BusyHidden { .. }))
    }

    pub fn dismissals(&self) -> usize {
        self.count(|e| matches!(e, UiEvent::CaptureDismissed))
    }

    pub fn finishes(&self) -> usize {
        self.count(|e| matches!(e, UiEvent::SessionFinished { .. }))
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                UiEvent::Warning { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: UiEvent) {
        tracing::trace!(?event, "ui");
        self.events.lock().push(event);
    }
}

impl Default for UiRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyIndicator for UiRecorder {
    fn show(&self, anchor: Anchor) {
        self.record(UiEvent::BusyShown { anchor });
    }

    fn hide(&self, anchor: Anchor) {
        self.record(UiEvent::BusyHidden { anchor });
    }
}

impl NoticePresenter for UiRecorder {
    fn show_warning(&self, anchor: Anchor, message: &str) {
        self.record(UiEvent::Warning {
            anchor,
            message: message.to_string(),
        });
    }
}

impl SelectionObserver for UiRecorder {
    fn item_added(&self, item: &MediaItem) {
        self.record(UiEvent::ItemAdded {
            id: item.id,
            kind: item.kind,
        });
    }

    fn selection_count_changed(&self, items: &[MediaItem]) {
        self.record(UiEvent::SelectionCountChanged { count: items.len() });
    }

    fn cover_updated(&self, cover: Option<&ImagePayload>, count: usize) {
        self.record(UiEvent::CoverUpdated {
            has_cover: cover.is_some(),
            count,
        });
    }

    fn refresh_if_visible(&self) {
        self.record(UiEvent::RefreshIfVisible);
    }
}

impl PickerSession for UiRecorder {
    fn should_present_camera(&self) -> bool {
        self.allow_camera
    }

    fn finish_selection(&self, items: &[MediaItem]) {
        self.record(UiEvent::SessionFinished { count: items.len() });
    }
}

impl CaptureSurface for UiRecorder {
    fn dismiss(&self) {
        self.record(UiEvent::CaptureDismissed);
    }
}

impl CameraDevice for UiRecorder {
    fn is_available(&self) -> bool {
        self.camera_available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExportPreset, TrimWindow};

    #[tokio::test]
    async fn exporter_writes_next_to_source() {
        let exporter = SimExporter::default();
        let request = TrimRequest {
            source: PathBuf::from("/tmp/clip.mov"),
            window: TrimWindow::new(Duration::from_secs(1), Duration::from_secs(2)),
            preset: ExportPreset::HighQuality,
            quality: 6,
        };
        let out = exporter.trim(&request).await.unwrap();
        assert_eq!(out, PathBuf::from("/tmp/clip_trimmed.mp4"));
        assert_eq!(exporter.trims().len(), 1);
    }

    #[tokio::test]
    async fn failing_library_keeps_nothing() {
        let library = SimLibrary::failing("disk full");
        let payload = SavePayload::Video(PathBuf::from("/tmp/a.mov"));
        let err = library.save(&payload, None, None).await.unwrap_err();
        assert_eq!(err.message, "disk full");
        assert_eq!(library.attempts(), 1);
        assert!(library.assets().is_empty());
    }

    #[test]
    fn recorder_counts_events() {
        let ui = UiRecorder::new();
        ui.show(Anchor::Picker);
        ui.hide(Anchor::Picker);
        ui.show_warning(Anchor::Picker, "Save failed");
        ui.dismiss();
        assert_eq!(ui.busy_shown(), 1);
        assert_eq!(ui.busy_hidden(), 1);
        assert_eq!(ui.dismissals(), 1);
        assert_eq!(ui.warnings(), vec!["Save failed".to_string()]);
    }
}
