//! Selection model for one picker session.
//!
//! The state is read by every UI observer but written only by the
//! selection committer running on the UI domain. Mutators are therefore
//! crate-private.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use super::capture::ImagePayload;
use super::enums::{MediaKind, SelectMode};
use super::media::{ContentKey, MediaItem};

/// Cover and item count of the album captures land in.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlbumSummary {
    pub cover: Option<Arc<ImagePayload>>,
    pub count: usize,
}

/// Ordered, deduplicated selection plus per-session capture bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionState {
    mode: SelectMode,
    /// Selected items in the order the user picked them.
    items: Vec<MediaItem>,
    /// Captures from this session that are not library-backed.
    local_captures: Vec<MediaItem>,
    /// Album bookkeeping for the capture album.
    album: AlbumSummary,
}

impl SelectionState {
    pub fn new(mode: SelectMode) -> Self {
        Self {
            mode,
            items: Vec::new(),
            local_captures: Vec::new(),
            album: AlbumSummary::default(),
        }
    }

    /// Seed the album bookkeeping with what the library reported.
    pub fn with_album(mut self, album: AlbumSummary) -> Self {
        self.album = album;
        self
    }

    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of selected items of a kind.
    pub fn count_of(&self, kind: MediaKind) -> usize {
        self.items.iter().filter(|i| i.kind == kind).count()
    }

    /// Whether an item with the same content is already selected.
    pub fn contains_key(&self, key: &ContentKey) -> bool {
        self.items.iter().any(|i| &i.key() == key)
    }

    pub fn local_captures(&self) -> &[MediaItem] {
        &self.local_captures
    }

    pub fn album(&self) -> &AlbumSummary {
        &self.album
    }

    /// Put this session's local captures in front of a refreshed listing.
    ///
    /// A library refresh knows nothing about captures that were never
    /// persisted, so they are re-inserted, newest first, unless the listing
    /// already carries the same content.
    pub fn merge_local_captures(&self, listing: Vec<MediaItem>) -> Vec<MediaItem> {
        let present: HashSet<ContentKey> = listing.iter().map(MediaItem::key).collect();
        let mut merged: Vec<MediaItem> = self
            .local_captures
            .iter()
            .rev()
            .filter(|c| !present.contains(&c.key()))
            .cloned()
            .collect();
        merged.extend(listing);
        merged
    }

    /// Append to the selection. Single mode keeps only the newest item.
    pub(crate) fn push(&mut self, item: MediaItem) {
        if self.mode == SelectMode::Single {
            self.items.clear();
        }
        self.items.push(item);
    }

    pub(crate) fn record_local_capture(&mut self, item: MediaItem) {
        if !self.local_captures.iter().any(|c| c.key() == item.key()) {
            self.local_captures.push(item);
        }
    }

    pub(crate) fn bump_album(&mut self, cover: Option<Arc<ImagePayload>>, added: usize) {
        if cover.is_some() {
            self.album.cover = cover;
        }
        self.album.count += added;
    }
}
