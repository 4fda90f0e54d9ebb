//! Capture pipeline that carries one capture from camera to selection.
//!
//! ```text
//! Received → (Exporting?) → (Persisting?) → Evaluating → (Committing | Rejected) → Completed
//! ```
//!
//! Export and persistence run on the calling task (the background domain).
//! Gate, commit, busy indicator, warnings and dismissal are marshaled to
//! the UI domain through its handle.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::task::JoinHandle;

use super::dismiss::{DismissCoordinator, DismissTrigger};
use super::errors::{EligibilityRejection, PipelineError, PipelineResult, StageError};
use super::steps::{ExportStage, PersistenceStage};
use super::types::{PhaseTrack, PipelineRun, RunOutcome, RunPhase, RunReport};
use super::ui_domain::{Admission, BusyLease, UiHandle};
use crate::config::Settings;
use crate::logging::{RunLogger, SessionLog};
use crate::models::{CaptureEvent, CaptureResult, ImagePayload, MediaItem, MediaKind};
use crate::services::{Anchor, MediaLibrary, SavePayload, VideoExporter};

/// Finished media before it becomes a `MediaItem`.
enum Finished {
    Image(Arc<ImagePayload>),
    Video {
        path: PathBuf,
        duration: Option<Duration>,
    },
}

impl Finished {
    fn kind(&self) -> MediaKind {
        match self {
            Finished::Image(_) => MediaKind::Photo,
            Finished::Video { .. } => MediaKind::Video,
        }
    }

    fn duration(&self) -> Option<Duration> {
        match self {
            Finished::Image(_) => None,
            Finished::Video { duration, .. } => *duration,
        }
    }

    fn preview(&self) -> Option<Arc<ImagePayload>> {
        match self {
            Finished::Image(image) => Some(Arc::clone(image)),
            Finished::Video { .. } => None,
        }
    }

    fn save_payload(&self) -> SavePayload {
        match self {
            Finished::Image(image) => SavePayload::Image(Arc::clone(image)),
            Finished::Video { path, .. } => SavePayload::Video(path.clone()),
        }
    }

    fn into_local_item(self) -> MediaItem {
        match self {
            Finished::Image(image) => {
                MediaItem::captured_photo(Arc::try_unwrap(image).unwrap_or_else(|a| (*a).clone()))
            }
            Finished::Video { path, duration } => MediaItem::captured_video(path, duration),
        }
    }
}

/// Runs capture events through export, persistence, gate and commit.
pub struct CapturePipeline {
    settings: Arc<Settings>,
    export: ExportStage,
    persistence: PersistenceStage,
    ui: UiHandle,
    log: Arc<SessionLog>,
}

impl CapturePipeline {
    pub fn new(
        settings: Arc<Settings>,
        exporter: Arc<dyn VideoExporter>,
        library: Arc<dyn MediaLibrary>,
        ui: UiHandle,
        log: Arc<SessionLog>,
    ) -> Self {
        Self {
            settings,
            export: ExportStage::new(exporter),
            persistence: PersistenceStage::new(library),
            ui,
            log,
        }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Run `run` on its own background task.
    ///
    /// Runs from different captures proceed concurrently; their commits are
    /// serialized by the UI domain.
    pub fn spawn(self: &Arc<Self>, run: PipelineRun) -> JoinHandle<RunReport> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.run(run).await })
    }

    /// Drive one run to `Completed`.
    ///
    /// Never fails: the outcome, including any error, is in the report. The
    /// completion callback fires exactly once, after every UI effect of the
    /// run has been applied.
    pub async fn run(&self, run: PipelineRun) -> RunReport {
        let PipelineRun {
            id,
            event,
            dismiss,
            completion,
        } = run;
        let started_at = Local::now().to_rfc3339();
        let logger = self.log.run_logger(id.as_str());
        let mut phases = PhaseTrack::new();

        logger.phase(&format!("Received {} from {}", event.result.kind(), event.origin));

        let result = self
            .process(&id, &event, &dismiss, &logger, &mut phases)
            .await;
        let last = phases.current();
        phases.advance(RunPhase::Completed);

        // Queued UI effects (hide, warn, dismiss) land before the report.
        self.ui.flush().await;

        let (outcome, error) = match result {
            Ok(Admission::Committed {
                item,
                selected,
                finished_session,
            }) => {
                logger.success(&format!("Committed {}", item.display_name()));
                (
                    RunOutcome::Committed {
                        item,
                        selected,
                        finished_session,
                    },
                    None,
                )
            }
            Ok(Admission::Rejected(reason)) => {
                logger.warn(&format!("Rejected: {}", reason));
                let outcome = RunOutcome::Rejected {
                    token: reason.token().to_string(),
                    reason: reason.to_string(),
                };
                let error = PipelineError::stage_failed(
                    &id,
                    RunPhase::Evaluating.name(),
                    EligibilityRejection::from(reason),
                );
                (outcome, Some(error))
            }
            Err(err) => {
                logger.error(&err.to_string());
                logger.show_tail("Run failed");
                let outcome = RunOutcome::Failed {
                    stage: last.name().to_string(),
                    message: err.to_string(),
                };
                (outcome, Some(err))
            }
        };

        let report = RunReport {
            run_id: id,
            origin: event.origin,
            started_at,
            outcome,
            phases: phases.into_history(),
            dismissed_by: dismiss.trigger(),
            error,
        };

        if let Some(completion) = completion {
            completion(&report);
        }
        report
    }

    async fn process(
        &self,
        id: &str,
        event: &CaptureEvent,
        dismiss: &Arc<DismissCoordinator>,
        logger: &RunLogger,
        phases: &mut PhaseTrack,
    ) -> PipelineResult<Admission> {
        let settings = &self.settings;

        let lease = self
            .ui
            .show_busy(Anchor::Picker)
            .ok_or_else(|| PipelineError::ui_domain_closed(id))?;

        if settings.camera.dismiss_on_receive {
            self.ui.dismiss(dismiss, DismissTrigger::Received);
        }

        let finished = match &event.result {
            CaptureResult::Image { image } => Finished::Image(Arc::new(image.clone())),
            CaptureResult::Video { file, trim } => {
                if trim.is_some() {
                    phases.advance(RunPhase::Exporting);
                    logger.section(self.export.name());
                }
                let exported = self
                    .export
                    .export(file, *trim, settings.export.quality, settings.export.preset)
                    .await;
                let video = match exported {
                    Ok(video) => video,
                    Err(e) => {
                        return Err(self.fail(id, RunPhase::Exporting, e.into(), lease, dismiss, logger))
                    }
                };
                if video.exported {
                    logger.info(&format!("Exported to {}", video.path.display()));
                }

                let duration = match video.duration {
                    Some(duration) => Some(duration),
                    None => self.export.probe_duration(&video.path).await,
                };
                Finished::Video {
                    path: video.path,
                    duration,
                }
            }
        };

        let item = if settings.camera.save_to_system_album {
            phases.advance(RunPhase::Persisting);
            logger.section(self.persistence.name());

            let album = settings.camera.custom_album_name.as_deref();
            let saved = self
                .persistence
                .persist(&finished.save_payload(), album, event.location)
                .await;
            match saved {
                Ok(asset) => {
                    logger.info(&format!("Saved as library asset {}", asset));
                    let item =
                        MediaItem::captured_in_library(finished.kind(), asset, finished.duration());
                    match finished.preview() {
                        Some(image) => item.with_preview(image),
                        None => item,
                    }
                }
                Err(e) => {
                    return Err(self.fail(id, RunPhase::Persisting, e.into(), lease, dismiss, logger))
                }
            }
        } else {
            finished.into_local_item()
        };

        phases.advance(RunPhase::Evaluating);
        logger.debug(&format!("Evaluating {}", item.display_name()));

        let admission = self
            .ui
            .admit(item, lease, dismiss)
            .await
            .ok_or_else(|| PipelineError::ui_domain_closed(id))?;

        match &admission {
            Admission::Committed { .. } => phases.advance(RunPhase::Committing),
            Admission::Rejected(_) => phases.advance(RunPhase::Rejected),
        };
        Ok(admission)
    }

    /// Hand a stage failure to the UI domain and build the run error.
    fn fail(
        &self,
        id: &str,
        phase: RunPhase,
        error: StageError,
        lease: BusyLease,
        dismiss: &Arc<DismissCoordinator>,
        logger: &RunLogger,
    ) -> PipelineError {
        logger.error(&format!("{} failed: {}", phase, error));
        self.ui.fail(lease, error.user_message(), dismiss);
        PipelineError::stage_failed(id, phase.name(), error)
    }
}
