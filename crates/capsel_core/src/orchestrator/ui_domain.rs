//! The UI-confined domain.
//!
//! A single task owns the `SelectionState` and is the only place that talks
//! to the UI collaborators. Background runs reach it by message passing
//! through a [`UiHandle`]; commands are handled one at a time in arrival
//! order, so gate evaluation and commit for one run can never interleave
//! with another run's commit.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::dismiss::{DismissCoordinator, DismissTrigger};
use super::errors::RejectReason;
use super::steps::{
    EligibilityGate, EligibilityRules, Notification, SelectionCommitter, Verdict,
};
use crate::config::Settings;
use crate::models::{MediaItem, SelectionState};
use crate::services::{Anchor, BusyIndicator, NoticePresenter, PickerSession, SelectionObserver};

/// UI collaborators owned by the domain.
#[derive(Clone)]
pub struct UiServices {
    pub busy: Arc<dyn BusyIndicator>,
    pub notices: Arc<dyn NoticePresenter>,
    pub session: Arc<dyn PickerSession>,
    pub observers: Vec<Arc<dyn SelectionObserver>>,
}

/// What the domain decided for a candidate.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Admission {
    Committed {
        item: MediaItem,
        selected: bool,
        finished_session: bool,
    },
    Rejected(RejectReason),
}

pub(crate) enum UiCommand {
    ShowBusy(Anchor),
    HideBusy(Anchor),
    Warn {
        anchor: Anchor,
        message: String,
    },
    Dismiss {
        coordinator: Arc<DismissCoordinator>,
        trigger: DismissTrigger,
    },
    /// Terminal failure of a background stage.
    Fail {
        lease: BusyLease,
        message: String,
        coordinator: Arc<DismissCoordinator>,
    },
    /// Gate the item and commit it when accepted.
    Admit {
        item: MediaItem,
        lease: BusyLease,
        coordinator: Arc<DismissCoordinator>,
        reply: oneshot::Sender<Admission>,
    },
    Snapshot {
        reply: oneshot::Sender<SelectionState>,
    },
    Flush {
        reply: oneshot::Sender<()>,
    },
}

/// Proof that the busy indicator was shown for a run.
///
/// Handing the lease back to the domain hides the indicator. A lease that
/// is dropped anywhere else queues the hide itself, so every show is
/// matched by exactly one hide.
pub(crate) struct BusyLease {
    anchor: Anchor,
    fallback: Option<mpsc::UnboundedSender<UiCommand>>,
}

impl BusyLease {
    fn disarm(mut self) -> Anchor {
        self.fallback = None;
        self.anchor
    }
}

impl Drop for BusyLease {
    fn drop(&mut self) {
        if let Some(tx) = self.fallback.take() {
            let _ = tx.send(UiCommand::HideBusy(self.anchor));
        }
    }
}

/// Cloneable sender side of the UI domain.
#[derive(Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiCommand>,
}

impl UiHandle {
    /// Whether the domain task is still running.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Show the warning overlay.
    pub fn warn(&self, anchor: Anchor, message: impl Into<String>) -> bool {
        self.send(UiCommand::Warn {
            anchor,
            message: message.into(),
        })
    }

    /// Copy of the current selection state.
    pub async fn selection(&self) -> Option<SelectionState> {
        let (reply, rx) = oneshot::channel();
        if !self.send(UiCommand::Snapshot { reply }) {
            return None;
        }
        rx.await.ok()
    }

    /// Wait until every command queued so far has been handled.
    pub async fn flush(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        if !self.send(UiCommand::Flush { reply }) {
            return false;
        }
        rx.await.is_ok()
    }

    pub(crate) fn show_busy(&self, anchor: Anchor) -> Option<BusyLease> {
        if !self.send(UiCommand::ShowBusy(anchor)) {
            return None;
        }
        Some(BusyLease {
            anchor,
            fallback: Some(self.tx.clone()),
        })
    }

    pub(crate) fn dismiss(&self, coordinator: &Arc<DismissCoordinator>, trigger: DismissTrigger) -> bool {
        self.send(UiCommand::Dismiss {
            coordinator: Arc::clone(coordinator),
            trigger,
        })
    }

    pub(crate) fn fail(
        &self,
        lease: BusyLease,
        message: impl Into<String>,
        coordinator: &Arc<DismissCoordinator>,
    ) -> bool {
        self.send(UiCommand::Fail {
            lease,
            message: message.into(),
            coordinator: Arc::clone(coordinator),
        })
    }

    pub(crate) async fn admit(
        &self,
        item: MediaItem,
        lease: BusyLease,
        coordinator: &Arc<DismissCoordinator>,
    ) -> Option<Admission> {
        let (reply, rx) = oneshot::channel();
        let sent = self.send(UiCommand::Admit {
            item,
            lease,
            coordinator: Arc::clone(coordinator),
            reply,
        });
        if !sent {
            return None;
        }
        rx.await.ok()
    }

    fn send(&self, command: UiCommand) -> bool {
        self.tx.send(command).is_ok()
    }
}

/// State and collaborators confined to the UI domain task.
pub struct UiDomain {
    settings: Arc<Settings>,
    state: SelectionState,
    gate: EligibilityGate,
    committer: SelectionCommitter,
    services: UiServices,
    session_finished: bool,
}

impl UiDomain {
    pub fn new(settings: Arc<Settings>, state: SelectionState, services: UiServices) -> Self {
        let gate = EligibilityGate::new(EligibilityRules::from(settings.as_ref()));
        let committer = SelectionCommitter::new(&settings);
        Self {
            settings,
            state,
            gate,
            committer,
            services,
            session_finished: false,
        }
    }

    /// Start the domain task. It stops once every handle and lease is gone.
    pub fn spawn(self) -> UiHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(self.run(rx));
        UiHandle { tx }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<UiCommand>) {
        tracing::debug!("UI domain started");
        while let Some(command) = rx.recv().await {
            self.handle(command);
        }
        tracing::debug!("UI domain stopped");
    }

    fn handle(&mut self, command: UiCommand) {
        match command {
            UiCommand::ShowBusy(anchor) => self.services.busy.show(anchor),
            UiCommand::HideBusy(anchor) => self.services.busy.hide(anchor),
            UiCommand::Warn { anchor, message } => {
                self.services.notices.show_warning(anchor, &message)
            }
            UiCommand::Dismiss {
                coordinator,
                trigger,
            } => {
                coordinator.dismiss(trigger);
            }
            UiCommand::Fail {
                lease,
                message,
                coordinator,
            } => {
                let anchor = self.release(lease);
                self.services.notices.show_warning(anchor, &message);
                coordinator.dismiss(DismissTrigger::Failed);
            }
            UiCommand::Admit {
                item,
                lease,
                coordinator,
                reply,
            } => {
                let admission = self.admit(item, lease, &coordinator);
                let _ = reply.send(admission);
            }
            UiCommand::Snapshot { reply } => {
                let _ = reply.send(self.state.clone());
            }
            UiCommand::Flush { reply } => {
                let _ = reply.send(());
            }
        }
    }

    fn admit(
        &mut self,
        item: MediaItem,
        lease: BusyLease,
        coordinator: &DismissCoordinator,
    ) -> Admission {
        if let Verdict::Reject(reason) = self.gate.evaluate(&item, &self.state) {
            if self.settings.camera.dismiss_on_reject {
                coordinator.dismiss(DismissTrigger::Rejected);
            }
            let anchor = self.release(lease);
            self.services.notices.show_warning(anchor, &reason.to_string());
            return Admission::Rejected(reason);
        }

        let effects = self.committer.commit(&mut self.state, item.clone());
        for notification in &effects.notifications {
            self.notify(notification);
        }
        self.release(lease);

        let finished_session = effects.finish_session && !self.session_finished;
        if finished_session {
            self.session_finished = true;
            self.services.session.finish_selection(self.state.items());
            coordinator.dismiss(DismissTrigger::AutoFinish);
        } else if self.settings.camera.auto_dismiss {
            coordinator.dismiss(DismissTrigger::Completed);
        }

        Admission::Committed {
            item,
            selected: effects.selected,
            finished_session,
        }
    }

    fn notify(&self, notification: &Notification) {
        for observer in &self.services.observers {
            match notification {
                Notification::CoverUpdated { cover, count } => {
                    observer.cover_updated(cover.as_deref(), *count)
                }
                Notification::RefreshIfVisible => observer.refresh_if_visible(),
                Notification::ItemAdded(item) => observer.item_added(item),
                Notification::SelectionCountChanged(items) => {
                    observer.selection_count_changed(items)
                }
            }
        }
    }

    fn release(&self, lease: BusyLease) -> Anchor {
        let anchor = lease.disarm();
        self.services.busy.hide(anchor);
        anchor
    }
}
