// Data models for the parsed format catalog and selection results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Video stream details from a format row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStream {
    pub width: u32,
    pub height: u32,
    /// Definition label (e.g., "1080p", "720p60")
    pub definition: String,
    pub bitrate_kbps: f64,
    /// Codec as printed by the tool (e.g., "avc1.640028")
    pub codec: String,
    pub frame_rate: f64,
}

/// Audio stream details from a format row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStream {
    /// Codec text before the sample rate (e.g., "opus @160k", "mp4a.40.2@128k")
    pub codec: String,
    pub bitrate_kbps: f64,
    pub sample_rate_hz: f64,
}

/// What kind of media a record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    AudioOnly,
    VideoOnly,
    Combined,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AudioOnly => write!(f, "audio only"),
            Self::VideoOnly => write!(f, "video only"),
            Self::Combined => write!(f, "combined"),
        }
    }
}

/// One row of the format catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatRecord {
    /// Format code (e.g., "137", "140"), passed back to the downloader
    pub code: String,
    /// File extension (mp4, webm, m4a)
    pub extension: String,
    /// File size in bytes, 0 when the row has no size column
    pub file_size: u64,
    pub video: Option<VideoStream>,
    pub audio: Option<AudioStream>,
}

impl FormatRecord {
    pub fn is_audio_only(&self) -> bool {
        self.audio.is_some() && self.video.is_none()
    }

    pub fn is_video_only(&self) -> bool {
        self.video.is_some() && self.audio.is_none()
    }

    pub fn is_combined(&self) -> bool {
        self.video.is_some() && self.audio.is_some()
    }

    /// Media kind of this record.
    ///
    /// The parser never produces a record without streams; such a record
    /// falls back to `AudioOnly` here while `is_audio_only` stays false.
    pub fn media_kind(&self) -> MediaKind {
        match (&self.video, &self.audio) {
            (Some(_), Some(_)) => MediaKind::Combined,
            (Some(_), None) => MediaKind::VideoOnly,
            (None, Some(_)) => MediaKind::AudioOnly,
            (None, None) => MediaKind::AudioOnly,
        }
    }

    /// Check whether the video stream has the given (normalized) definition
    pub fn has_definition(&self, definition: &Definition) -> bool {
        self.video
            .as_ref()
            .map_or(false, |v| v.definition.to_lowercase() == definition.as_str())
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.extension.eq_ignore_ascii_case(extension)
    }
}

/// Normalized definition label: lowercase and always ending in "p"
///
/// `1080`, `1080p` and `1080P` all normalize to `1080p`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Definition(String);

impl Definition {
    pub fn new(raw: &str) -> Self {
        let mut label = raw.trim().to_lowercase();
        if !label.ends_with('p') {
            label.push('p');
        }
        Self(label)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Definition {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Definition {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<u32> for Definition {
    fn from(height: u32) -> Self {
        Self::new(&height.to_string())
    }
}

/// Why a selection came back empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    /// No standalone audio track is published
    NoAudioOnly,
    /// No video-only stream at the requested definition
    NoVideoOnlyAtDefinition,
    /// No combined stream at the requested definition
    NoCombinedAtDefinition,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAudioOnly => write!(f, "no audio-only format available"),
            Self::NoVideoOnlyAtDefinition => {
                write!(f, "no video-only format at the requested definition")
            }
            Self::NoCombinedAtDefinition => {
                write!(f, "no combined format at the requested definition")
            }
        }
    }
}

/// Result of picking formats for one target definition
///
/// `NotFound` is a normal outcome, not a failure. Callers decide whether a
/// missing definition is fatal for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    /// A single row already carries video and audio
    Combined { format: FormatRecord },
    /// Video-only and audio-only rows to be merged by the downloader
    Paired {
        video_only: FormatRecord,
        audio_only: FormatRecord,
    },
    NotFound { reason: NotFoundReason },
}

impl Selection {
    pub fn is_found(&self) -> bool {
        !matches!(self, Self::NotFound { .. })
    }

    /// Codes in download order (video first for pairs)
    pub fn codes(&self) -> Vec<&str> {
        match self {
            Self::Combined { format } => vec![format.code.as_str()],
            Self::Paired {
                video_only,
                audio_only,
            } => vec![video_only.code.as_str(), audio_only.code.as_str()],
            Self::NotFound { .. } => Vec::new(),
        }
    }

    /// Total size in bytes of everything that would be downloaded
    pub fn total_size(&self) -> u64 {
        match self {
            Self::Combined { format } => format.file_size,
            Self::Paired {
                video_only,
                audio_only,
            } => video_only.file_size.saturating_add(audio_only.file_size),
            Self::NotFound { .. } => 0,
        }
    }
}
