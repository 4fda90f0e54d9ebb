//! Capsel replay tool
//!
//! Replays a JSON script of camera interactions through the capture
//! pipeline with in-memory collaborators and prints what happened.
//!
//! Usage:
//!   capsel-replay replay script.json --config capsel.toml
//!   capsel-replay replay script.json --library-fails "disk full"
//!   capsel-replay config --config capsel.toml

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use capsel_core::config::{ConfigManager, Settings};
use capsel_core::logging::{init_tracing, LogConfig, SessionLog};
use capsel_core::models::{CaptureEvent, NativeCaptureInfo, SelectionState};
use capsel_core::orchestrator::{
    CaptureRequest, CaptureSession, PipelineError, RunReport, SessionServices, UiServices,
};
use capsel_core::sim::{SimExporter, SimLibrary, UiEvent, UiRecorder};

#[derive(Parser)]
#[command(name = "capsel-replay")]
#[command(about = "Replay camera captures through the capture-to-selection pipeline")]
#[command(version)]
struct Cli {
    /// Config file (created with defaults when missing)
    #[arg(short, long, global = true, default_value = "capsel.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script of camera interactions
    Replay {
        /// JSON array of steps
        script: PathBuf,

        /// Duration every simulated video source reports, in seconds
        #[arg(long, default_value = "10")]
        source_secs: u64,

        /// Make every track probe fail with this message
        #[arg(long)]
        probe_fails: Option<String>,

        /// Make every library write fail with this message
        #[arg(long)]
        library_fails: Option<String>,

        /// Pretend the device has no camera
        #[arg(long)]
        no_camera: bool,

        /// Submit all captures before waiting for any of them
        #[arg(long)]
        concurrent: bool,
    },

    /// Print the effective settings as JSON
    Config,
}

/// One step of a replay script.
#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
enum ScriptStep {
    /// Ask for the camera to be presented.
    Open,
    /// A capture result from either camera.
    Capture(CaptureEvent),
    /// Raw completion info from the native camera.
    Native(NativeCaptureInfo),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
enum LaunchRecord {
    Presented { request: CaptureRequest },
    Vetoed,
    Unavailable { reason: String },
}

#[derive(Debug, Serialize)]
struct ReplayOutput {
    launches: Vec<LaunchRecord>,
    reports: Vec<RunReport>,
    selection: Option<SelectionState>,
    ui_events: Vec<UiEvent>,
}

fn load_settings(path: &Path) -> Result<ConfigManager> {
    let mut config = ConfigManager::new(path);
    config
        .load_or_create()
        .with_context(|| format!("loading config from {}", path.display()))?;
    Ok(config)
}

fn read_script(path: &Path) -> Result<Vec<ScriptStep>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    let steps: Vec<ScriptStep> = serde_json::from_str(&text)
        .with_context(|| format!("parsing script {}", path.display()))?;
    Ok(steps)
}

fn session_log(settings: &Settings) -> Result<Arc<SessionLog>> {
    let config = LogConfig::from(&settings.logging);
    // Run lines already reach stderr through tracing; the file is extra.
    let log = match &settings.logging.logs_folder {
        Some(folder) => {
            let session = format!("replay-{}", std::process::id());
            SessionLog::with_file(&session, folder, config, None)
                .with_context(|| format!("creating session log in {}", folder))?
        }
        None => SessionLog::new(config, None),
    };
    Ok(Arc::new(log))
}

struct ReplayOptions {
    source_secs: u64,
    probe_fails: Option<String>,
    library_fails: Option<String>,
    no_camera: bool,
    concurrent: bool,
}

async fn replay(
    settings: Arc<Settings>,
    steps: Vec<ScriptStep>,
    opts: ReplayOptions,
) -> Result<ReplayOutput> {
    let mut ui = UiRecorder::new();
    if opts.no_camera {
        ui = ui.without_camera();
    }
    let ui = Arc::new(ui);

    let mut exporter = SimExporter::new(Duration::from_secs(opts.source_secs));
    if let Some(message) = opts.probe_fails {
        exporter = exporter.failing_probe(message);
    }
    let library = match opts.library_fails {
        Some(message) => SimLibrary::failing(message),
        None => SimLibrary::new(),
    };

    let services = SessionServices {
        exporter: Arc::new(exporter),
        library: Arc::new(library),
        ui: UiServices {
            busy: ui.clone(),
            notices: ui.clone(),
            session: ui.clone(),
            observers: vec![ui.clone()],
        },
    };
    let log = session_log(&settings)?;
    let session = CaptureSession::start(settings, services, log.clone());

    let mut launches = Vec::new();
    let mut pending = Vec::new();
    let mut reports = Vec::new();

    for step in steps {
        let handle = match step {
            ScriptStep::Open => {
                let record = match session.open_camera(ui.as_ref()) {
                    Ok(Some(request)) => LaunchRecord::Presented { request },
                    Ok(None) => LaunchRecord::Vetoed,
                    Err(PipelineError::CaptureUnavailable { reason }) => {
                        LaunchRecord::Unavailable { reason }
                    }
                    Err(e) => bail!(e),
                };
                launches.push(record);
                continue;
            }
            ScriptStep::Capture(event) => session.submit(event, ui.clone(), None),
            ScriptStep::Native(info) => match session.submit_native(info, ui.clone(), None) {
                Some(handle) => handle,
                None => continue,
            },
        };

        if opts.concurrent {
            pending.push(handle);
        } else {
            reports.push(handle.await.context("pipeline task panicked")?);
        }
    }

    for handle in pending {
        reports.push(handle.await.context("pipeline task panicked")?);
    }

    session.ui().flush().await;
    let selection = session.selection().await;
    log.flush();

    Ok(ReplayOutput {
        launches,
        reports,
        selection,
        ui_events: ui.events(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_settings(&cli.config)?;
    let settings = config.snapshot();
    if let Err(reason) = settings.validate() {
        bail!("invalid config {}: {}", cli.config.display(), reason);
    }

    init_tracing(settings.logging.level);
    tracing::info!(version = capsel_core::version(), "capsel-replay starting");

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(settings.as_ref())?);
        }
        Commands::Replay {
            script,
            source_secs,
            probe_fails,
            library_fails,
            no_camera,
            concurrent,
        } => {
            let steps = read_script(&script)?;
            tracing::info!(steps = steps.len(), script = %script.display(), "Replaying");
            let output = replay(
                settings,
                steps,
                ReplayOptions {
                    source_secs,
                    probe_fails,
                    library_fails,
                    no_camera,
                    concurrent,
                },
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_step_kind() {
        let script = r#"[
            { "step": "open" },
            {
                "step": "capture",
                "origin": "custom",
                "result": { "type": "video", "file": "/tmp/a.mov", "trim": { "start": 1.0, "end": 2.5 } }
            },
            { "step": "native", "media_type": "image", "original_image": { "width": 1, "height": 1, "bytes": [0] } }
        ]"#;

        let steps: Vec<ScriptStep> = serde_json::from_str(script).unwrap();

        assert_eq!(steps.len(), 3);
        assert!(matches!(steps[0], ScriptStep::Open));
        assert!(matches!(steps[1], ScriptStep::Capture(_)));
        let ScriptStep::Native(info) = &steps[2] else {
            panic!("expected native step");
        };
        assert!(info.clone().into_capture_result().is_some());
    }

    #[tokio::test]
    async fn replay_reports_each_capture() {
        let steps: Vec<ScriptStep> = serde_json::from_str(
            r#"[
                { "step": "open" },
                { "step": "capture", "origin": "custom",
                  "result": { "type": "image", "image": { "width": 1, "height": 1, "bytes": [5] } } }
            ]"#,
        )
        .unwrap();
        let opts = ReplayOptions {
            source_secs: 10,
            probe_fails: None,
            library_fails: None,
            no_camera: false,
            concurrent: false,
        };

        let output = replay(Arc::new(Settings::default()), steps, opts)
            .await
            .unwrap();

        assert_eq!(output.launches.len(), 1);
        assert_eq!(output.reports.len(), 1);
        assert!(output.reports[0].outcome.is_committed());
        assert_eq!(output.selection.map(|s| s.len()), Some(1));
    }
}
