//! UI-domain collaborators.
//!
//! Every method here is called from the UI domain task only, one call at a
//! time. Implementations forward to whatever view layer hosts the picker.

use serde::{Deserialize, Serialize};

use crate::models::{ImagePayload, MediaItem};

/// View an overlay is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// The picker's own navigation view.
    Picker,
}

/// Loading overlay.
pub trait BusyIndicator: Send + Sync {
    fn show(&self, anchor: Anchor);
    fn hide(&self, anchor: Anchor);
}

/// Transient warning overlay.
pub trait NoticePresenter: Send + Sync {
    fn show_warning(&self, anchor: Anchor, message: &str);
}

/// Views that follow the selection model.
///
/// All entry points default to no-ops so a view only implements what it
/// renders.
pub trait SelectionObserver: Send + Sync {
    /// A capture was inserted into the asset list.
    fn item_added(&self, _item: &MediaItem) {}

    /// Selected items changed (toolbar, finish control, cell badges).
    fn selection_count_changed(&self, _items: &[MediaItem]) {}

    /// Capture album got a new cover and/or count.
    fn cover_updated(&self, _cover: Option<&ImagePayload>, _count: usize) {}

    /// Album list should reload if currently on screen.
    fn refresh_if_visible(&self) {}
}

/// The presented capture UI (custom or native camera).
pub trait CaptureSurface: Send + Sync {
    fn dismiss(&self);
}

/// The enclosing picker session.
pub trait PickerSession: Send + Sync {
    /// Veto hook consulted before a camera is presented.
    fn should_present_camera(&self) -> bool {
        true
    }

    /// Complete the session with the given selection.
    fn finish_selection(&self, items: &[MediaItem]);
}

/// Camera hardware availability.
pub trait CameraDevice: Send + Sync {
    fn is_available(&self) -> bool;
}
