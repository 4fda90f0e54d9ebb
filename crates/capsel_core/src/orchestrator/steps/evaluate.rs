//! Eligibility gate - decides whether a capture may join the selection.
//!
//! Rules are checked in a fixed order and the first violation wins:
//! 1. Media kind allowed at all
//! 2. Video duration bounds (only when the duration is known)
//! 3. Duplicate content
//! 4. Total, per-kind and mixing limits (multiple select only)
//!
//! When captures are only listed and not selected, steps 3 and 4 do not
//! apply: the selection is left untouched anyway.

use std::time::Duration;

use crate::config::{SelectionSettings, Settings};
use crate::models::{MediaItem, MediaKind, SelectMode, SelectionState};
use crate::orchestrator::errors::RejectReason;

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Rule set the gate enforces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityRules {
    pub max_total: usize,
    /// 0 = no separate limit.
    pub max_photos: usize,
    /// 0 = no separate limit.
    pub max_videos: usize,
    pub allow_mixed: bool,
    pub allow_photos: bool,
    pub allow_videos: bool,
    pub min_video: Option<Duration>,
    pub max_video: Option<Duration>,
    /// Accepted captures are appended to the selection.
    pub selects: bool,
}

impl From<&SelectionSettings> for EligibilityRules {
    fn from(s: &SelectionSettings) -> Self {
        Self {
            max_total: s.max_total,
            max_photos: s.max_photos,
            max_videos: s.max_videos,
            allow_mixed: s.allow_mixed,
            allow_photos: s.allow_photos,
            allow_videos: s.allow_videos,
            min_video: s.min_video_duration(),
            max_video: s.max_video_duration(),
            selects: s.select_after_capture,
        }
    }
}

impl From<&Settings> for EligibilityRules {
    fn from(settings: &Settings) -> Self {
        Self {
            selects: settings.selects_on_capture(),
            ..Self::from(&settings.selection)
        }
    }
}

/// The single checkpoint in front of the selection committer.
#[derive(Debug, Clone)]
pub struct EligibilityGate {
    rules: EligibilityRules,
}

impl EligibilityGate {
    pub fn new(rules: EligibilityRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &EligibilityRules {
        &self.rules
    }

    /// Evaluate `candidate` against the current selection. Never mutates.
    pub fn evaluate(&self, candidate: &MediaItem, selection: &SelectionState) -> Verdict {
        match self.check(candidate, selection) {
            Ok(()) => Verdict::Accept,
            Err(reason) => Verdict::Reject(reason),
        }
    }

    fn check(&self, candidate: &MediaItem, selection: &SelectionState) -> Result<(), RejectReason> {
        let rules = &self.rules;
        let kind = candidate.kind;

        let allowed = match kind {
            MediaKind::Photo => rules.allow_photos,
            MediaKind::Video => rules.allow_videos,
        };
        if !allowed {
            return Err(RejectReason::KindNotAllowed { kind });
        }

        if kind == MediaKind::Video {
            if let Some(duration) = candidate.duration {
                if let Some(min) = rules.min_video.filter(|min| duration < *min) {
                    return Err(RejectReason::VideoTooShort {
                        min_secs: min.as_secs(),
                    });
                }
                if let Some(max) = rules.max_video.filter(|max| duration > *max) {
                    return Err(RejectReason::VideoTooLong {
                        max_secs: max.as_secs(),
                    });
                }
            }
        }

        if !rules.selects {
            return Ok(());
        }

        if selection.contains_key(&candidate.key()) {
            return Err(RejectReason::Duplicate);
        }

        // Single select replaces the current item, so counts do not apply.
        if selection.mode() == SelectMode::Single {
            return Ok(());
        }

        if selection.len() >= rules.max_total {
            return Err(RejectReason::SelectionFull {
                max: rules.max_total,
            });
        }

        let other = match kind {
            MediaKind::Photo => MediaKind::Video,
            MediaKind::Video => MediaKind::Photo,
        };
        if !rules.allow_mixed && selection.count_of(other) > 0 {
            return Err(RejectReason::MixedKinds);
        }

        let (limit, reason) = match kind {
            MediaKind::Photo => (
                rules.max_photos,
                RejectReason::PhotoLimit {
                    max: rules.max_photos,
                },
            ),
            MediaKind::Video => (
                rules.max_videos,
                RejectReason::VideoLimit {
                    max: rules.max_videos,
                },
            ),
        };
        if limit > 0 && selection.count_of(kind) >= limit {
            return Err(reason);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImagePayload;

    fn rules() -> EligibilityRules {
        EligibilityRules::from(&SelectionSettings::default())
    }

    fn photo(fill: u8) -> MediaItem {
        MediaItem::captured_photo(ImagePayload::new(1, 1, vec![fill; 4]))
    }

    fn video(name: &str, secs: u64) -> MediaItem {
        MediaItem::captured_video(format!("/tmp/{}.mov", name), Some(Duration::from_secs(secs)))
    }

    fn selection_of(mode: SelectMode, items: Vec<MediaItem>) -> SelectionState {
        let mut state = SelectionState::new(mode);
        for item in items {
            state.push(item);
        }
        state
    }

    #[test]
    fn accepts_into_empty_selection() {
        let gate = EligibilityGate::new(rules());
        let state = SelectionState::new(SelectMode::Multiple);
        assert!(gate.evaluate(&photo(1), &state).is_accept());
    }

    #[test]
    fn rejects_duplicate_content() {
        let gate = EligibilityGate::new(rules());
        let state = selection_of(SelectMode::Multiple, vec![photo(1)]);
        assert_eq!(
            gate.evaluate(&photo(1), &state),
            Verdict::Reject(RejectReason::Duplicate)
        );
    }

    #[test]
    fn rejects_when_full_without_mutating() {
        let gate = EligibilityGate::new(EligibilityRules {
            max_total: 2,
            ..rules()
        });
        let state = selection_of(SelectMode::Multiple, vec![photo(1), photo(2)]);
        let before = state.items().to_vec();

        assert_eq!(
            gate.evaluate(&photo(3), &state),
            Verdict::Reject(RejectReason::SelectionFull { max: 2 })
        );
        assert_eq!(state.items(), before.as_slice());
    }

    #[test]
    fn enforces_per_kind_limits() {
        let gate = EligibilityGate::new(EligibilityRules {
            max_videos: 1,
            ..rules()
        });
        let state = selection_of(SelectMode::Multiple, vec![video("a", 3), photo(1)]);

        assert_eq!(
            gate.evaluate(&video("b", 3), &state),
            Verdict::Reject(RejectReason::VideoLimit { max: 1 })
        );
        assert!(gate.evaluate(&photo(2), &state).is_accept());
    }

    #[test]
    fn rejects_mixing_when_disallowed() {
        let gate = EligibilityGate::new(EligibilityRules {
            allow_mixed: false,
            ..rules()
        });
        let state = selection_of(SelectMode::Multiple, vec![photo(1)]);
        assert_eq!(
            gate.evaluate(&video("a", 3), &state),
            Verdict::Reject(RejectReason::MixedKinds)
        );
    }

    #[test]
    fn enforces_video_duration_bounds() {
        let gate = EligibilityGate::new(EligibilityRules {
            min_video: Some(Duration::from_secs(3)),
            max_video: Some(Duration::from_secs(30)),
            ..rules()
        });
        let state = SelectionState::new(SelectMode::Multiple);

        assert_eq!(
            gate.evaluate(&video("short", 1), &state),
            Verdict::Reject(RejectReason::VideoTooShort { min_secs: 3 })
        );
        assert_eq!(
            gate.evaluate(&video("long", 45), &state),
            Verdict::Reject(RejectReason::VideoTooLong { max_secs: 30 })
        );

        let unknown = MediaItem::captured_video("/tmp/unknown.mov", None);
        assert!(gate.evaluate(&unknown, &state).is_accept());
    }

    #[test]
    fn rejects_disallowed_kind() {
        let gate = EligibilityGate::new(EligibilityRules {
            allow_videos: false,
            ..rules()
        });
        let state = SelectionState::new(SelectMode::Multiple);
        assert_eq!(
            gate.evaluate(&video("a", 3), &state),
            Verdict::Reject(RejectReason::KindNotAllowed {
                kind: MediaKind::Video
            })
        );
    }

    #[test]
    fn single_select_ignores_counts() {
        let gate = EligibilityGate::new(EligibilityRules {
            max_total: 1,
            ..rules()
        });
        let state = selection_of(SelectMode::Single, vec![photo(1)]);
        assert!(gate.evaluate(&photo(2), &state).is_accept());
    }

    #[test]
    fn listing_only_skips_selection_limits() {
        let gate = EligibilityGate::new(EligibilityRules {
            max_total: 1,
            selects: false,
            ..rules()
        });
        let state = selection_of(SelectMode::Multiple, vec![photo(1)]);
        assert!(gate.evaluate(&photo(2), &state).is_accept());
    }

    #[test]
    fn finishing_capture_is_checked_as_selected() {
        let mut settings = Settings::default();
        settings.selection.mode = SelectMode::Single;
        settings.selection.select_after_capture = false;
        settings.camera.finish_after_capture = true;
        let gate = EligibilityGate::new(EligibilityRules::from(&settings));

        let first = photo(1);
        let state = selection_of(SelectMode::Single, vec![first.clone()]);
        assert_eq!(
            gate.evaluate(&first, &state),
            Verdict::Reject(RejectReason::Duplicate)
        );
    }
}
