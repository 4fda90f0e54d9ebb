//! Capture results as emitted by the camera UIs.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::enums::{CaptureOrigin, MediaKind};

/// Decoded still image handed over by the camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub width: u32,
    pub height: u32,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            width,
            height,
            bytes,
        }
    }

    /// SHA256 of the encoded bytes, hex encoded.
    ///
    /// Two in-memory captures with the same bytes are the same content.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        hasher.update(&self.bytes);
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

/// In-place edit window reported by the native camera.
///
/// Offsets are measured from the start of the captured video. A usable
/// window satisfies `start < end <= source duration`; the export step
/// refuses anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimWindow {
    #[serde(with = "secs")]
    pub start: Duration,
    #[serde(with = "secs")]
    pub end: Duration,
}

impl TrimWindow {
    pub fn new(start: Duration, end: Duration) -> Self {
        Self { start, end }
    }

    /// Build from second offsets. Negative or non-finite offsets yield `None`.
    pub fn from_secs_f64(start: f64, end: f64) -> Option<Self> {
        let start = Duration::try_from_secs_f64(start).ok()?;
        let end = Duration::try_from_secs_f64(end).ok()?;
        Some(Self { start, end })
    }

    /// Non-empty window (`start < end`).
    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    /// Window lies inside a source of the given duration.
    pub fn fits(&self, source_duration: Duration) -> bool {
        self.is_well_formed() && self.end <= source_duration
    }

    pub fn length(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

/// Raw output of one camera interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum CaptureResult {
    Image { image: ImagePayload },
    Video {
        file: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trim: Option<TrimWindow>,
    },
}

impl CaptureResult {
    pub fn image(image: ImagePayload) -> Self {
        Self::Image { image }
    }

    pub fn video(file: impl Into<PathBuf>) -> Self {
        Self::Video {
            file: file.into(),
            trim: None,
        }
    }

    pub fn trimmed_video(file: impl Into<PathBuf>, trim: TrimWindow) -> Self {
        Self::Video {
            file: file.into(),
            trim: Some(trim),
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            CaptureResult::Image { .. } => MediaKind::Photo,
            CaptureResult::Video { .. } => MediaKind::Video,
        }
    }
}

/// Where a capture was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
}

/// A capture result together with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureEvent {
    pub origin: CaptureOrigin,
    pub result: CaptureResult,
    #[serde(default)]
    pub location: Option<GeoLocation>,
}

impl CaptureEvent {
    pub fn new(origin: CaptureOrigin, result: CaptureResult) -> Self {
        Self {
            origin,
            result,
            location: None,
        }
    }

    pub fn with_location(mut self, location: GeoLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Media type reported by the native camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeMediaType {
    Image,
    Movie,
}

/// Loose bag of fields the native camera reports on completion.
///
/// Which fields are populated depends on the media type and on whether the
/// user edited the capture. [`NativeCaptureInfo::into_capture_result`] folds
/// it into a [`CaptureResult`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeCaptureInfo {
    pub media_type: Option<NativeMediaType>,
    #[serde(default)]
    pub edited_image: Option<ImagePayload>,
    #[serde(default)]
    pub original_image: Option<ImagePayload>,
    #[serde(default)]
    pub media_url: Option<PathBuf>,
    /// Edit start offset in seconds.
    #[serde(default)]
    pub editing_start: Option<f64>,
    /// Edit end offset in seconds.
    #[serde(default)]
    pub editing_end: Option<f64>,
}

impl NativeCaptureInfo {
    /// Normalize into a tagged capture result.
    ///
    /// The edited image wins over the original. A movie only carries a trim
    /// window when both offsets are present. Returns `None` when the
    /// reported media is missing.
    pub fn into_capture_result(self) -> Option<CaptureResult> {
        match self.media_type? {
            NativeMediaType::Image => self
                .edited_image
                .or(self.original_image)
                .map(CaptureResult::image),
            NativeMediaType::Movie => {
                let file = self.media_url?;
                let trim = match (self.editing_start, self.editing_end) {
                    // Malformed offsets still go through export, which refuses them.
                    (Some(start), Some(end)) => Some(
                        TrimWindow::from_secs_f64(start, end)
                            .unwrap_or(TrimWindow::new(Duration::ZERO, Duration::ZERO)),
                    ),
                    _ => None,
                };
                Some(CaptureResult::Video { file, trim })
            }
        }
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(fill: u8) -> ImagePayload {
        ImagePayload::new(2, 2, vec![fill; 16])
    }

    #[test]
    fn trim_window_rejects_empty_and_overlong() {
        let window = TrimWindow::from_secs_f64(2.0, 5.0).unwrap();
        assert!(window.fits(Duration::from_secs(10)));
        assert!(!window.fits(Duration::from_secs(4)));
        assert_eq!(window.length(), Duration::from_secs(3));

        let inverted = TrimWindow::from_secs_f64(5.0, 2.0).unwrap();
        assert!(!inverted.is_well_formed());
        assert!(!inverted.fits(Duration::from_secs(10)));

        assert!(TrimWindow::from_secs_f64(-1.0, 2.0).is_none());
    }

    #[test]
    fn native_info_prefers_edited_image() {
        let info = NativeCaptureInfo {
            media_type: Some(NativeMediaType::Image),
            edited_image: Some(image(1)),
            original_image: Some(image(2)),
            ..Default::default()
        };
        assert_eq!(info.into_capture_result(), Some(CaptureResult::image(image(1))));
    }

    #[test]
    fn native_info_movie_needs_both_offsets_for_trim() {
        let info = NativeCaptureInfo {
            media_type: Some(NativeMediaType::Movie),
            media_url: Some(PathBuf::from("/tmp/capture.mov")),
            editing_start: Some(2.0),
            ..Default::default()
        };
        assert_eq!(
            info.into_capture_result(),
            Some(CaptureResult::video("/tmp/capture.mov"))
        );

        let info = NativeCaptureInfo {
            media_type: Some(NativeMediaType::Movie),
            media_url: Some(PathBuf::from("/tmp/capture.mov")),
            editing_start: Some(2.0),
            editing_end: Some(5.0),
            ..Default::default()
        };
        let expected = TrimWindow::new(Duration::from_secs(2), Duration::from_secs(5));
        assert_eq!(
            info.into_capture_result(),
            Some(CaptureResult::trimmed_video("/tmp/capture.mov", expected))
        );
    }

    #[test]
    fn native_info_without_media_yields_nothing() {
        let info = NativeCaptureInfo {
            media_type: Some(NativeMediaType::Movie),
            ..Default::default()
        };
        assert_eq!(info.into_capture_result(), None);
        assert_eq!(NativeCaptureInfo::default().into_capture_result(), None);
    }

    #[test]
    fn capture_result_reads_trim_in_seconds() {
        let json = r#"{"type":"video","file":"/tmp/a.mov","trim":{"start":2.0,"end":5.5}}"#;
        let parsed: CaptureResult = serde_json::from_str(json).unwrap();
        match parsed {
            CaptureResult::Video { trim: Some(trim), .. } => {
                assert_eq!(trim.end, Duration::from_millis(5500));
            }
            other => panic!("unexpected capture: {:?}", other),
        }
    }

    #[test]
    fn digest_tracks_content() {
        assert_eq!(image(1).digest(), image(1).digest());
        assert_ne!(image(1).digest(), image(2).digest());
    }
}
