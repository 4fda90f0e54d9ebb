//! Selection committer - records an accepted capture.
//!
//! The committer is the only writer of `SelectionState`. It runs on the UI
//! domain right after the gate accepted, and returns the notification batch
//! for the observers instead of calling them itself.

use std::sync::Arc;

use crate::config::Settings;
use crate::models::{AlbumViewMode, ImagePayload, MediaItem, SelectionState};

/// One change notification for the selection observers.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    CoverUpdated {
        cover: Option<Arc<ImagePayload>>,
        count: usize,
    },
    RefreshIfVisible,
    ItemAdded(MediaItem),
    SelectionCountChanged(Vec<MediaItem>),
}

/// Result of one commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitEffects {
    /// Notifications in dispatch order.
    pub notifications: Vec<Notification>,
    /// Item went into the ordered selection.
    pub selected: bool,
    /// Session should finish with the current selection.
    pub finish_session: bool,
}

/// Applies accepted captures to the selection model.
#[derive(Debug, Clone)]
pub struct SelectionCommitter {
    selects: bool,
    finish_on_capture: bool,
    album_view: AlbumViewMode,
}

impl SelectionCommitter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            selects: settings.selects_on_capture(),
            finish_on_capture: settings.finishes_on_capture(),
            album_view: settings.selection.album_view,
        }
    }

    /// Record `item` and describe what changed.
    pub fn commit(&self, state: &mut SelectionState, item: MediaItem) -> CommitEffects {
        let mut notifications = Vec::with_capacity(4);

        state.bump_album(item.cover_image(), 1);
        notifications.push(Notification::CoverUpdated {
            cover: state.album().cover.clone(),
            count: state.album().count,
        });
        if self.album_view == AlbumViewMode::Popup {
            notifications.push(Notification::RefreshIfVisible);
        }

        if item.is_local() {
            state.record_local_capture(item.clone());
        }
        notifications.push(Notification::ItemAdded(item.clone()));

        if self.selects {
            state.push(item);
            notifications.push(Notification::SelectionCountChanged(state.items().to_vec()));
        }

        CommitEffects {
            notifications,
            selected: self.selects,
            finish_session: self.finish_on_capture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LibraryAssetId, MediaKind, SelectMode};

    fn photo(fill: u8) -> MediaItem {
        MediaItem::captured_photo(ImagePayload::new(1, 1, vec![fill; 4]))
    }

    #[test]
    fn appends_and_notifies_in_order() {
        let committer = SelectionCommitter::new(&Settings::default());
        let mut state = SelectionState::new(SelectMode::Multiple);
        let item = photo(1);

        let effects = committer.commit(&mut state, item.clone());

        assert_eq!(state.items(), &[item.clone()]);
        assert_eq!(state.local_captures().len(), 1);
        assert_eq!(state.album().count, 1);
        assert!(effects.selected);
        assert!(!effects.finish_session);

        assert!(matches!(
            effects.notifications[0],
            Notification::CoverUpdated { cover: Some(_), count: 1 }
        ));
        assert_eq!(effects.notifications[1], Notification::RefreshIfVisible);
        assert_eq!(effects.notifications[2], Notification::ItemAdded(item.clone()));
        assert_eq!(
            effects.notifications[3],
            Notification::SelectionCountChanged(vec![item])
        );
    }

    #[test]
    fn library_items_skip_local_bookkeeping() {
        let committer = SelectionCommitter::new(&Settings::default());
        let mut state = SelectionState::new(SelectMode::Multiple);
        let item = MediaItem::captured_in_library(MediaKind::Video, LibraryAssetId::new("A1"), None);

        committer.commit(&mut state, item);

        assert!(state.local_captures().is_empty());
        assert_eq!(state.len(), 1);
        assert!(state.album().cover.is_none());
    }

    #[test]
    fn separate_album_view_is_not_refreshed() {
        let mut settings = Settings::default();
        settings.selection.album_view = AlbumViewMode::Separate;
        let committer = SelectionCommitter::new(&settings);
        let mut state = SelectionState::new(SelectMode::Multiple);

        let effects = committer.commit(&mut state, photo(1));

        assert!(!effects
            .notifications
            .contains(&Notification::RefreshIfVisible));
    }

    #[test]
    fn single_select_with_finish_requests_finish() {
        let mut settings = Settings::default();
        settings.selection.mode = SelectMode::Single;
        settings.camera.finish_after_capture = true;
        let committer = SelectionCommitter::new(&settings);
        let mut state = SelectionState::new(SelectMode::Single);

        committer.commit(&mut state, photo(1));
        let effects = committer.commit(&mut state, photo(2));

        assert!(effects.finish_session);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn listing_only_keeps_selection_untouched() {
        let mut settings = Settings::default();
        settings.selection.select_after_capture = false;
        let committer = SelectionCommitter::new(&settings);
        let mut state = SelectionState::new(SelectMode::Multiple);

        let effects = committer.commit(&mut state, photo(1));

        assert!(state.is_empty());
        assert_eq!(state.local_captures().len(), 1);
        assert!(!effects.selected);
        assert!(!effects.finish_session);
        assert!(!effects
            .notifications
            .iter()
            .any(|n| matches!(n, Notification::SelectionCountChanged(_))));
    }

    #[test]
    fn listing_only_finish_still_selects_the_capture() {
        let mut settings = Settings::default();
        settings.selection.mode = SelectMode::Single;
        settings.selection.select_after_capture = false;
        settings.camera.finish_after_capture = true;
        let committer = SelectionCommitter::new(&settings);
        let mut state = SelectionState::new(SelectMode::Single);
        let item = photo(1);

        let effects = committer.commit(&mut state, item.clone());

        assert_eq!(state.items(), &[item.clone()]);
        assert!(effects.selected);
        assert!(effects.finish_session);
        assert_eq!(
            effects.notifications.last(),
            Some(&Notification::SelectionCountChanged(vec![item]))
        );
    }
}
