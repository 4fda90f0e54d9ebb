//! One-way dismissal of the presented capture UI.
//!
//! Several branches of a run can each conclude that the capture UI must
//! close. The coordinator turns all of them into at most one real
//! `dismiss` call: the first trigger wins, later ones are no-ops.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::services::CaptureSurface;

/// Branch that asked for the capture UI to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissTrigger {
    /// Result arrived and the session dismisses on receipt.
    Received,
    /// The eligibility gate rejected the capture.
    Rejected,
    /// Export or persistence failed.
    Failed,
    /// Single-select session finished after capture.
    AutoFinish,
    /// The run completed and auto-dismiss is on.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DismissState {
    Presented,
    Dismissed(DismissTrigger),
}

/// Per-run guard around the capture UI's dismissal.
pub struct DismissCoordinator {
    state: Mutex<DismissState>,
    surface: Arc<dyn CaptureSurface>,
}

impl DismissCoordinator {
    pub fn new(surface: Arc<dyn CaptureSurface>) -> Self {
        Self {
            state: Mutex::new(DismissState::Presented),
            surface,
        }
    }

    /// Dismiss the capture UI unless it already is.
    ///
    /// Returns `true` when this call performed the dismissal.
    pub fn dismiss(&self, trigger: DismissTrigger) -> bool {
        {
            let mut state = self.state.lock();
            if let DismissState::Dismissed(_) = *state {
                return false;
            }
            *state = DismissState::Dismissed(trigger);
        }
        tracing::debug!(?trigger, "Dismissing capture UI");
        self.surface.dismiss();
        true
    }

    pub fn is_dismissed(&self) -> bool {
        matches!(*self.state.lock(), DismissState::Dismissed(_))
    }

    /// Trigger that performed the dismissal.
    pub fn trigger(&self) -> Option<DismissTrigger> {
        match *self.state.lock() {
            DismissState::Presented => None,
            DismissState::Dismissed(trigger) => Some(trigger),
        }
    }
}

impl std::fmt::Debug for DismissCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DismissCoordinator")
            .field("state", &*self.state.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSurface {
        dismissed: AtomicUsize,
    }

    impl CaptureSurface for CountingSurface {
        fn dismiss(&self) {
            self.dismissed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn first_trigger_wins() {
        let surface = Arc::new(CountingSurface::default());
        let coordinator = DismissCoordinator::new(surface.clone());
        assert!(!coordinator.is_dismissed());

        assert!(coordinator.dismiss(DismissTrigger::Rejected));
        assert!(!coordinator.dismiss(DismissTrigger::Completed));
        assert!(!coordinator.dismiss(DismissTrigger::AutoFinish));

        assert_eq!(surface.dismissed.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.trigger(), Some(DismissTrigger::Rejected));
    }

    #[test]
    fn concurrent_triggers_dismiss_once() {
        let surface = Arc::new(CountingSurface::default());
        let coordinator = Arc::new(DismissCoordinator::new(surface.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let coordinator = Arc::clone(&coordinator);
                std::thread::spawn(move || coordinator.dismiss(DismissTrigger::Failed))
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(wins, 1);
        assert_eq!(surface.dismissed.load(Ordering::SeqCst), 1);
    }
}
