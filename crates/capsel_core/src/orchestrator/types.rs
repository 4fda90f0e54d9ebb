//! Core types for a pipeline run.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::dismiss::{DismissCoordinator, DismissTrigger};
use super::errors::PipelineError;
use crate::models::{CaptureEvent, CaptureOrigin, MediaItem};
use crate::services::CaptureSurface;

/// Callback fired exactly once when a run reaches `Completed`.
pub type CompletionCallback = Box<dyn FnOnce(&RunReport) + Send>;

/// Phase of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Received,
    Exporting,
    Persisting,
    Evaluating,
    Committing,
    Rejected,
    Completed,
}

impl RunPhase {
    /// Check if this phase transition is valid.
    ///
    /// Every non-terminal phase may jump straight to `Completed`, which is
    /// how failure paths end a run.
    pub fn can_transition_to(&self, target: RunPhase) -> bool {
        use RunPhase::*;

        match (self, target) {
            (Completed, _) => false,
            (_, Completed) => true,

            (Received, Exporting | Persisting | Evaluating) => true,
            (Exporting, Persisting | Evaluating) => true,
            (Persisting, Evaluating) => true,
            (Evaluating, Committing | Rejected) => true,

            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RunPhase::Received => "Received",
            RunPhase::Exporting => "Exporting",
            RunPhase::Persisting => "Persisting",
            RunPhase::Evaluating => "Evaluating",
            RunPhase::Committing => "Committing",
            RunPhase::Rejected => "Rejected",
            RunPhase::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Phases a run has visited, in order.
#[derive(Debug, Clone)]
pub(crate) struct PhaseTrack {
    history: Vec<RunPhase>,
}

impl PhaseTrack {
    pub(crate) fn new() -> Self {
        Self {
            history: vec![RunPhase::Received],
        }
    }

    pub(crate) fn current(&self) -> RunPhase {
        self.history
            .last()
            .copied()
            .unwrap_or(RunPhase::Received)
    }

    /// Move to `next`. Invalid transitions are logged and ignored.
    pub(crate) fn advance(&mut self, next: RunPhase) -> bool {
        let current = self.current();
        if !current.can_transition_to(next) {
            tracing::error!(from = %current, to = %next, "Invalid run phase transition");
            return false;
        }
        self.history.push(next);
        true
    }

    pub(crate) fn into_history(self) -> Vec<RunPhase> {
        self.history
    }
}

/// Per-capture context, consumed by exactly one pipeline run.
pub struct PipelineRun {
    pub(crate) id: String,
    pub(crate) event: CaptureEvent,
    pub(crate) dismiss: Arc<DismissCoordinator>,
    pub(crate) completion: Option<CompletionCallback>,
}

impl PipelineRun {
    /// Create a run for `event` captured through `surface`.
    pub fn new(event: CaptureEvent, surface: Arc<dyn CaptureSurface>) -> Self {
        let id = Uuid::new_v4().simple().to_string()[..8].to_string();
        Self {
            id,
            event,
            dismiss: Arc::new(DismissCoordinator::new(surface)),
            completion: None,
        }
    }

    /// Set the completion callback.
    pub fn with_completion(mut self, callback: CompletionCallback) -> Self {
        self.completion = Some(callback);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn origin(&self) -> CaptureOrigin {
        self.event.origin
    }

    /// Coordinator guarding this run's capture UI.
    pub fn dismiss_coordinator(&self) -> Arc<DismissCoordinator> {
        Arc::clone(&self.dismiss)
    }
}

/// How a run ended.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunOutcome {
    /// The gate accepted and the committer recorded the item.
    Committed {
        item: MediaItem,
        /// Appended to the ordered selection (false when captures are only listed).
        selected: bool,
        /// The session was finished by this run.
        finished_session: bool,
    },
    /// The gate turned the item away.
    Rejected { token: String, reason: String },
    /// A stage failed or the UI domain went away.
    Failed { stage: String, message: String },
}

impl RunOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, RunOutcome::Committed { .. })
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub origin: CaptureOrigin,
    pub started_at: String,
    pub outcome: RunOutcome,
    pub phases: Vec<RunPhase>,
    /// What closed the capture UI, if anything did.
    pub dismissed_by: Option<DismissTrigger>,
    /// Typed failure, when the outcome is `Failed`.
    #[serde(skip)]
    pub error: Option<PipelineError>,
}

impl RunReport {
    pub fn visited(&self, phase: RunPhase) -> bool {
        self.phases.contains(&phase)
    }
}
