//! Capture launch - decides whether and how a camera UI is presented.

use std::sync::Arc;

use serde::Serialize;

use super::errors::{PipelineError, PipelineResult};
use super::ui_domain::UiHandle;
use crate::config::Settings;
use crate::models::{CameraBackend, CaptureKind};
use crate::services::{Anchor, CameraDevice, PickerSession};

/// Media type identifier for still images on the native camera.
pub const NATIVE_IMAGE_TYPE: &str = "public.image";
/// Media type identifier for movies on the native camera.
pub const NATIVE_MOVIE_TYPE: &str = "public.movie";

/// How to configure the camera UI that is about to be presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "backend")]
pub enum CaptureRequest {
    /// In-app camera.
    Custom {
        kind: CaptureKind,
        /// The camera itself never writes to the library; the pipeline does.
        save_to_library: bool,
    },
    /// Platform camera UI.
    Native {
        media_types: Vec<String>,
        video_max_secs: u64,
        allows_editing: bool,
    },
}

/// Opens camera UIs on behalf of a picker session.
pub struct CaptureLauncher {
    settings: Arc<Settings>,
    ui: UiHandle,
    session: Arc<dyn PickerSession>,
}

impl CaptureLauncher {
    pub fn new(settings: Arc<Settings>, ui: UiHandle, session: Arc<dyn PickerSession>) -> Self {
        Self {
            settings,
            ui,
            session,
        }
    }

    /// Build the request for presenting a camera.
    ///
    /// Returns `Ok(None)` when the session vetoes presentation, and
    /// `CaptureUnavailable` (after warning the user) when there is no camera.
    pub fn open(&self, device: &dyn CameraDevice) -> PipelineResult<Option<CaptureRequest>> {
        if !device.is_available() {
            tracing::warn!("Camera unavailable");
            self.ui.warn(Anchor::Picker, "Camera unavailable");
            return Err(PipelineError::capture_unavailable("camera device not available"));
        }

        if !self.session.should_present_camera() {
            tracing::debug!("Camera presentation vetoed by session");
            return Ok(None);
        }

        let request = match self.settings.camera.backend {
            CameraBackend::Custom => CaptureRequest::Custom {
                kind: self.settings.capture_kind(),
                save_to_library: false,
            },
            CameraBackend::Native => CaptureRequest::Native {
                media_types: self.native_media_types(),
                video_max_secs: self.settings.camera.video_max_secs,
                allows_editing: self.settings.camera.allows_editing,
            },
        };
        tracing::debug!(?request, "Presenting camera");
        Ok(Some(request))
    }

    fn native_media_types(&self) -> Vec<String> {
        let camera = &self.settings.camera;
        if !camera.media_types.is_empty() {
            return camera.media_types.clone();
        }
        let selection = &self.settings.selection;
        let mut types = Vec::with_capacity(2);
        if selection.allow_photos {
            types.push(NATIVE_IMAGE_TYPE.to_string());
        }
        if selection.allow_videos {
            types.push(NATIVE_MOVIE_TYPE.to_string());
        }
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SelectionState;
    use crate::orchestrator::ui_domain::{UiDomain, UiServices};
    use crate::sim::UiRecorder;

    fn launcher(settings: Settings, ui: &Arc<UiRecorder>) -> (CaptureLauncher, UiHandle) {
        let settings = Arc::new(settings);
        let services = UiServices {
            busy: ui.clone(),
            notices: ui.clone(),
            session: ui.clone(),
            observers: Vec::new(),
        };
        let handle = UiDomain::new(
            Arc::clone(&settings),
            SelectionState::new(settings.selection.mode),
            services,
        )
        .spawn();
        (
            CaptureLauncher::new(settings, handle.clone(), ui.clone()),
            handle,
        )
    }

    #[tokio::test]
    async fn unavailable_camera_warns() {
        let ui = Arc::new(UiRecorder::new().without_camera());
        let (launcher, handle) = launcher(Settings::default(), &ui);

        let err = launcher.open(ui.as_ref()).unwrap_err();
        handle.flush().await;

        assert!(matches!(err, PipelineError::CaptureUnavailable { .. }));
        assert_eq!(ui.warnings(), vec!["Camera unavailable".to_string()]);
    }

    #[tokio::test]
    async fn veto_skips_launch_silently() {
        let ui = Arc::new(UiRecorder::new().vetoing_camera());
        let (launcher, handle) = launcher(Settings::default(), &ui);

        assert_eq!(launcher.open(ui.as_ref()).unwrap(), None);
        handle.flush().await;
        assert!(ui.events().is_empty());
    }

    #[tokio::test]
    async fn custom_camera_gets_capture_kind() {
        let ui = Arc::new(UiRecorder::new());
        let mut settings = Settings::default();
        settings.selection.allow_photos = false;
        let (launcher, _handle) = launcher(settings, &ui);

        assert_eq!(
            launcher.open(ui.as_ref()).unwrap(),
            Some(CaptureRequest::Custom {
                kind: CaptureKind::Video,
                save_to_library: false,
            })
        );
    }

    #[tokio::test]
    async fn native_camera_derives_media_types() {
        let ui = Arc::new(UiRecorder::new());
        let mut settings = Settings::default();
        settings.camera.backend = CameraBackend::Native;
        settings.camera.allows_editing = true;
        settings.camera.video_max_secs = 30;
        let (launcher, _handle) = launcher(settings, &ui);

        assert_eq!(
            launcher.open(ui.as_ref()).unwrap(),
            Some(CaptureRequest::Native {
                media_types: vec![NATIVE_IMAGE_TYPE.to_string(), NATIVE_MOVIE_TYPE.to_string()],
                video_max_secs: 30,
                allows_editing: true,
            })
        );
    }

    #[tokio::test]
    async fn native_camera_keeps_explicit_media_types() {
        let ui = Arc::new(UiRecorder::new());
        let mut settings = Settings::default();
        settings.camera.backend = CameraBackend::Native;
        settings.camera.media_types = vec![NATIVE_MOVIE_TYPE.to_string()];
        let (launcher, _handle) = launcher(settings, &ui);

        let Some(CaptureRequest::Native { media_types, .. }) = launcher.open(ui.as_ref()).unwrap()
        else {
            panic!("expected native request");
        };
        assert_eq!(media_types, vec![NATIVE_MOVIE_TYPE.to_string()]);
    }
}
