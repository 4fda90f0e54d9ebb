//! Capture pipeline orchestration.
//!
//! This module provides:
//! - `CapturePipeline` - sequences export, persistence, gate and commit
//! - `UiDomain` / `UiHandle` - the single-writer task owning the selection
//! - `DismissCoordinator` - closes the capture UI exactly once per run
//! - `CaptureLauncher` - decides whether and how a camera is presented
//! - `CaptureSession` - all of the above wired for one picker session
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use capsel_core::config::Settings;
//! use capsel_core::logging::{LogConfig, SessionLog};
//! use capsel_core::models::{CaptureEvent, CaptureOrigin, CaptureResult, ImagePayload};
//! use capsel_core::orchestrator::{CaptureSession, SessionServices};
//! use capsel_core::services::CaptureSurface;
//!
//! # async fn demo(services: SessionServices, surface: Arc<dyn CaptureSurface>) {
//! let log = Arc::new(SessionLog::new(LogConfig::default(), None));
//! let session = CaptureSession::start(Arc::new(Settings::default()), services, log);
//!
//! let event = CaptureEvent::new(
//!     CaptureOrigin::Custom,
//!     CaptureResult::image(ImagePayload::new(1, 1, vec![0; 4])),
//! );
//! let report = session.capture(event, surface).await;
//! println!("{:?}", report.outcome);
//! # }
//! ```

mod dismiss;
mod errors;
mod launch;
mod pipeline;
mod session;
mod types;
mod ui_domain;

pub mod steps;

pub use dismiss::{DismissCoordinator, DismissTrigger};
pub use errors::{
    EligibilityRejection, ExportError, PersistenceError, PipelineError, PipelineResult,
    RejectReason, StageError, StageResult,
};
pub use launch::{CaptureLauncher, CaptureRequest, NATIVE_IMAGE_TYPE, NATIVE_MOVIE_TYPE};
pub use pipeline::CapturePipeline;
pub use session::{CaptureSession, SessionServices};
pub use types::{CompletionCallback, PipelineRun, RunOutcome, RunPhase, RunReport};
pub use ui_domain::{UiDomain, UiHandle, UiServices};
