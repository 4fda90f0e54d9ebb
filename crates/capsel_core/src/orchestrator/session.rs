//! A picker session wired end to end.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::errors::PipelineResult;
use super::launch::{CaptureLauncher, CaptureRequest};
use super::pipeline::CapturePipeline;
use super::types::{CompletionCallback, PipelineRun, RunReport};
use super::ui_domain::{UiDomain, UiHandle, UiServices};
use crate::config::Settings;
use crate::logging::SessionLog;
use crate::models::{CaptureEvent, CaptureOrigin, NativeCaptureInfo, SelectionState};
use crate::services::{CameraDevice, CaptureSurface, MediaLibrary, VideoExporter};

/// Everything a session talks to.
#[derive(Clone)]
pub struct SessionServices {
    pub exporter: Arc<dyn VideoExporter>,
    pub library: Arc<dyn MediaLibrary>,
    pub ui: UiServices,
}

/// Owns the UI domain, the pipeline and the launcher for one picker session.
///
/// Must be started inside a tokio runtime.
pub struct CaptureSession {
    ui: UiHandle,
    pipeline: Arc<CapturePipeline>,
    launcher: CaptureLauncher,
}

impl CaptureSession {
    /// Start a session with an empty selection.
    pub fn start(settings: Arc<Settings>, services: SessionServices, log: Arc<SessionLog>) -> Self {
        let state = SelectionState::new(settings.selection.mode);
        Self::start_with(settings, state, services, log)
    }

    /// Start a session on top of an existing selection.
    pub fn start_with(
        settings: Arc<Settings>,
        state: SelectionState,
        services: SessionServices,
        log: Arc<SessionLog>,
    ) -> Self {
        let picker = Arc::clone(&services.ui.session);
        let ui = UiDomain::new(Arc::clone(&settings), state, services.ui).spawn();
        let pipeline = Arc::new(CapturePipeline::new(
            Arc::clone(&settings),
            services.exporter,
            services.library,
            ui.clone(),
            log,
        ));
        let launcher = CaptureLauncher::new(settings, ui.clone(), picker);
        tracing::info!("Capture session started");
        Self {
            ui,
            pipeline,
            launcher,
        }
    }

    pub fn ui(&self) -> &UiHandle {
        &self.ui
    }

    pub fn pipeline(&self) -> &Arc<CapturePipeline> {
        &self.pipeline
    }

    /// Ask for a camera to be presented.
    pub fn open_camera(&self, device: &dyn CameraDevice) -> PipelineResult<Option<CaptureRequest>> {
        self.launcher.open(device)
    }

    /// Submit a capture and return its background task.
    pub fn submit(
        &self,
        event: CaptureEvent,
        surface: Arc<dyn CaptureSurface>,
        completion: Option<CompletionCallback>,
    ) -> JoinHandle<RunReport> {
        let mut run = PipelineRun::new(event, surface);
        if let Some(completion) = completion {
            run = run.with_completion(completion);
        }
        tracing::debug!(run_id = run.id(), origin = %run.origin(), "Capture submitted");
        self.pipeline.spawn(run)
    }

    /// Submit what the native camera reported.
    ///
    /// Reports without usable media start no run.
    pub fn submit_native(
        &self,
        info: NativeCaptureInfo,
        surface: Arc<dyn CaptureSurface>,
        completion: Option<CompletionCallback>,
    ) -> Option<JoinHandle<RunReport>> {
        let Some(result) = info.into_capture_result() else {
            tracing::warn!("Native camera reported no usable media");
            return None;
        };
        Some(self.submit(
            CaptureEvent::new(CaptureOrigin::Native, result),
            surface,
            completion,
        ))
    }

    /// Run a capture to completion on the current task.
    pub async fn capture(&self, event: CaptureEvent, surface: Arc<dyn CaptureSurface>) -> RunReport {
        self.pipeline.run(PipelineRun::new(event, surface)).await
    }

    /// Current selection, `None` once the UI domain is gone.
    pub async fn selection(&self) -> Option<SelectionState> {
        self.ui.selection().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::logging::LogConfig;
    use crate::models::{ImagePayload, MediaContent, NativeMediaType};
    use crate::orchestrator::{DismissTrigger, RunOutcome, RunPhase};
    use crate::sim::{SimExporter, SimLibrary, UiRecorder};

    fn session(settings: Settings, ui: &Arc<UiRecorder>) -> CaptureSession {
        let services = SessionServices {
            exporter: Arc::new(SimExporter::new(Duration::from_secs(10))),
            library: Arc::new(SimLibrary::new()),
            ui: UiServices {
                busy: ui.clone(),
                notices: ui.clone(),
                session: ui.clone(),
                observers: vec![ui.clone()],
            },
        };
        let log = Arc::new(SessionLog::new(LogConfig::default(), None));
        CaptureSession::start(Arc::new(settings), services, log)
    }

    #[tokio::test]
    async fn native_edit_runs_through_export() {
        let ui = Arc::new(UiRecorder::new());
        let session = session(Settings::default(), &ui);

        let info = NativeCaptureInfo {
            media_type: Some(NativeMediaType::Movie),
            media_url: Some(PathBuf::from("/tmp/edit.mov")),
            editing_start: Some(1.0),
            editing_end: Some(4.5),
            ..NativeCaptureInfo::default()
        };
        let report = session
            .submit_native(info, ui.clone(), None)
            .unwrap()
            .await
            .unwrap();

        assert!(report.visited(RunPhase::Exporting));
        let RunOutcome::Committed { item, .. } = report.outcome else {
            panic!("expected commit");
        };
        assert_eq!(
            item.content,
            MediaContent::File(PathBuf::from("/tmp/edit_trimmed.mp4"))
        );
        assert_eq!(item.duration, Some(Duration::from_millis(3500)));
    }

    #[tokio::test]
    async fn native_report_without_media_starts_nothing() {
        let ui = Arc::new(UiRecorder::new());
        let session = session(Settings::default(), &ui);

        let info = NativeCaptureInfo {
            media_type: Some(NativeMediaType::Image),
            ..NativeCaptureInfo::default()
        };
        assert!(session.submit_native(info, ui.clone(), None).is_none());
        session.ui().flush().await;
        assert_eq!(ui.busy_shown(), 0);
    }

    #[tokio::test]
    async fn launch_then_capture() {
        let ui = Arc::new(UiRecorder::new());
        let session = session(Settings::default(), &ui);

        assert!(session.open_camera(ui.as_ref()).unwrap().is_some());
        let event = CaptureEvent::new(
            CaptureOrigin::Custom,
            crate::models::CaptureResult::image(ImagePayload::new(1, 1, vec![9; 4])),
        );
        let report = session.capture(event, ui.clone()).await;

        assert_eq!(report.dismissed_by, Some(DismissTrigger::Completed));
        assert_eq!(session.selection().await.unwrap().len(), 1);
    }
}
