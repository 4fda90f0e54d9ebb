//! Error types for the capture pipeline.
//!
//! Errors carry context that chains through layers:
//! Run → Stage → Detail

use std::path::PathBuf;

use thiserror::Error;

use crate::models::MediaKind;

/// Top-level pipeline error with run context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A stage failed; the run completed without committing.
    #[error("Run '{run_id}' failed at stage '{stage}': {source}")]
    StageFailed {
        run_id: String,
        stage: String,
        #[source]
        source: StageError,
    },

    /// The capture UI cannot be presented; no run was started.
    #[error("Capture unavailable: {reason}")]
    CaptureUnavailable { reason: String },

    /// The UI domain stopped before the run could finish.
    #[error("Run '{run_id}' lost the UI domain")]
    UiDomainClosed { run_id: String },
}

impl PipelineError {
    /// Create a stage failed error.
    pub fn stage_failed(
        run_id: impl Into<String>,
        stage: impl Into<String>,
        source: impl Into<StageError>,
    ) -> Self {
        Self::StageFailed {
            run_id: run_id.into(),
            stage: stage.into(),
            source: source.into(),
        }
    }

    /// Create a capture unavailable error.
    pub fn capture_unavailable(reason: impl Into<String>) -> Self {
        Self::CaptureUnavailable {
            reason: reason.into(),
        }
    }

    pub fn ui_domain_closed(run_id: impl Into<String>) -> Self {
        Self::UiDomainClosed {
            run_id: run_id.into(),
        }
    }

    /// The underlying stage error, if any.
    pub fn stage_error(&self) -> Option<&StageError> {
        match self {
            PipelineError::StageFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Error from one pipeline stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Rejected(#[from] EligibilityRejection),
}

impl StageError {
    /// Text for the warning overlay.
    pub fn user_message(&self) -> String {
        match self {
            StageError::Export(_) => "Video export failed".to_string(),
            StageError::Persistence(_) => "Save failed".to_string(),
            StageError::Rejected(rejection) => rejection.reason.to_string(),
        }
    }
}

/// Failure of the trim/re-encode export.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Track metadata could not be loaded.
    #[error("Video source '{path}' unavailable: {message}")]
    SourceUnavailable { path: PathBuf, message: String },

    /// The trim window was unusable or the encoder failed.
    #[error("Video encoding failed: {message}")]
    EncodingFailed { message: String },
}

impl ExportError {
    pub fn source_unavailable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }
}

/// Failure writing into the system library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Library write failed: {message}")]
    WriteFailed { message: String },
}

impl PersistenceError {
    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::WriteFailed {
            message: message.into(),
        }
    }
}

/// Why the eligibility gate turned a capture away.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("This item is already selected")]
    Duplicate,

    #[error("You can select at most {max} items")]
    SelectionFull { max: usize },

    #[error("You can select at most {max} photos")]
    PhotoLimit { max: usize },

    #[error("You can select at most {max} videos")]
    VideoLimit { max: usize },

    #[error("Photos and videos cannot be selected together")]
    MixedKinds,

    #[error("Selecting a {kind} is not allowed")]
    KindNotAllowed { kind: MediaKind },

    #[error("Videos must be at least {min_secs} seconds long")]
    VideoTooShort { min_secs: u64 },

    #[error("Videos must be at most {max_secs} seconds long")]
    VideoTooLong { max_secs: u64 },
}

impl RejectReason {
    /// Stable token for the reason.
    pub fn token(&self) -> &'static str {
        match self {
            RejectReason::Duplicate => "duplicate",
            RejectReason::SelectionFull { .. } => "selection_full",
            RejectReason::PhotoLimit { .. } => "photo_limit",
            RejectReason::VideoLimit { .. } => "video_limit",
            RejectReason::MixedKinds => "mixed_kinds",
            RejectReason::KindNotAllowed { .. } => "kind_not_allowed",
            RejectReason::VideoTooShort { .. } => "video_too_short",
            RejectReason::VideoTooLong { .. } => "video_too_long",
        }
    }
}

/// The eligibility gate's rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Capture rejected: {reason}")]
pub struct EligibilityRejection {
    pub reason: RejectReason,
}

impl From<RejectReason> for EligibilityRejection {
    fn from(reason: RejectReason) -> Self {
        Self { reason }
    }
}

/// Result type for stage operations.
pub type StageResult<T> = Result<T, StageError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
