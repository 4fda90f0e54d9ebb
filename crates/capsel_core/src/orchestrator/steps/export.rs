//! Export stage - trims and re-encodes edited videos.
//!
//! Only videos that carry a trim window need work. Everything else passes
//! through untouched. The stage:
//! 1. Rejects empty windows before touching the source
//! 2. Loads track metadata (probe)
//! 3. Checks the window against the probed duration
//! 4. Hands the trim to the exporter with the configured preset/quality

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::models::{ExportPreset, TrimWindow};
use crate::orchestrator::errors::ExportError;
use crate::services::{TrimRequest, VideoExporter};

/// Video ready to be persisted or selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedVideo {
    pub path: PathBuf,
    /// Known when the export produced it (the window length).
    pub duration: Option<Duration>,
    /// Whether a new file was written.
    pub exported: bool,
}

/// Export stage for trimmed videos.
pub struct ExportStage {
    exporter: Arc<dyn VideoExporter>,
}

impl ExportStage {
    pub fn new(exporter: Arc<dyn VideoExporter>) -> Self {
        Self { exporter }
    }

    pub fn name(&self) -> &'static str {
        "Export"
    }

    /// Produce the final video for `source`.
    ///
    /// Without a window the source is returned as is.
    pub async fn export(
        &self,
        source: &Path,
        window: Option<TrimWindow>,
        quality: u8,
        preset: ExportPreset,
    ) -> Result<FinalizedVideo, ExportError> {
        let Some(window) = window else {
            return Ok(FinalizedVideo {
                path: source.to_path_buf(),
                duration: None,
                exported: false,
            });
        };

        if !window.is_well_formed() {
            return Err(ExportError::encoding_failed(format!(
                "trim window {:.3}s..{:.3}s is empty",
                window.start.as_secs_f64(),
                window.end.as_secs_f64()
            )));
        }

        let info = self
            .exporter
            .load_tracks(source)
            .await
            .map_err(|e| ExportError::source_unavailable(source, e.message))?;

        if info.track_count == 0 {
            return Err(ExportError::source_unavailable(source, "no tracks loaded"));
        }

        if !window.fits(info.duration) {
            return Err(ExportError::encoding_failed(format!(
                "trim window ends at {:.3}s but source is {:.3}s long",
                window.end.as_secs_f64(),
                info.duration.as_secs_f64()
            )));
        }

        let request = TrimRequest {
            source: source.to_path_buf(),
            window,
            preset,
            quality: quality.min(10),
        };
        let path = self
            .exporter
            .trim(&request)
            .await
            .map_err(|e| ExportError::encoding_failed(e.message))?;

        Ok(FinalizedVideo {
            path,
            duration: Some(window.length()),
            exported: true,
        })
    }

    /// Duration of a finished video, `None` when the probe fails.
    pub async fn probe_duration(&self, video: &Path) -> Option<Duration> {
        match self.exporter.load_tracks(video).await {
            Ok(info) => Some(info.duration),
            Err(e) => {
                tracing::debug!(path = %video.display(), error = %e, "Duration probe failed");
                None
            }
        }
    }
}
