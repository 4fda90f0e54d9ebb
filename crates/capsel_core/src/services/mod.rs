//! Collaborator interfaces consumed by the pipeline.
//!
//! Background services (`VideoExporter`, `MediaLibrary`) are async and run
//! off the UI domain. UI services are plain traits invoked only from the UI
//! domain task.

mod background;
mod ui;

pub use background::{MediaLibrary, SavePayload, TrimRequest, VideoExporter, VideoInfo};
pub use ui::{
    Anchor, BusyIndicator, CameraDevice, CaptureSurface, NoticePresenter, PickerSession,
    SelectionObserver,
};

use thiserror::Error;

/// Failure reported by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type for collaborator calls.
pub type BackendResult<T> = Result<T, BackendError>;
