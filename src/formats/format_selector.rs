// FormatSelector - picks the download formats for a target definition
//
// Ranking rules (same for audio, video and combined candidates):
// - Largest file size first; ties keep catalog order (stable sort)
// - Within the top two only, a preferred container wins
//   (m4a for audio, mp4 for video by default)
//
// The tool's own "(best)" annotation is not used here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::errors::{FormatError, FormatResult};
use super::models::{Definition, FormatRecord, NotFoundReason, Selection};

/// How many of the largest candidates the container preference may reorder
const TIE_BREAK_WINDOW: usize = 2;

/// Which kind of result the selector should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Video-only + audio-only pair
    #[default]
    Paired,
    /// Single muxed stream
    Combined,
    /// Pair if possible, otherwise a muxed stream
    #[serde(alias = "auto")]
    PairedOrCombined,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paired => write!(f, "paired"),
            Self::Combined => write!(f, "combined"),
            Self::PairedOrCombined => write!(f, "auto"),
        }
    }
}

impl FromStr for SelectionMode {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paired" => Ok(Self::Paired),
            "combined" => Ok(Self::Combined),
            "auto" | "paired_or_combined" => Ok(Self::PairedOrCombined),
            other => Err(FormatError::Config(format!("unknown selection mode: {}", other))),
        }
    }
}

/// Selector preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Container preferred for audio within the top two (None disables)
    pub preferred_audio_extension: Option<String>,
    /// Container preferred for video within the top two (None disables)
    pub preferred_video_extension: Option<String>,
    /// Mode used by `select_configured`
    pub mode: SelectionMode,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            preferred_audio_extension: Some("m4a".to_string()),
            preferred_video_extension: Some("mp4".to_string()),
            mode: SelectionMode::Paired,
        }
    }
}

impl SelectorConfig {
    pub fn from_json_str(json: &str) -> FormatResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_preferred_audio_extension(mut self, ext: Option<String>) -> Self {
        self.preferred_audio_extension = ext;
        self
    }

    pub fn with_preferred_video_extension(mut self, ext: Option<String>) -> Self {
        self.preferred_video_extension = ext;
        self
    }

    pub fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Format selector over a parsed catalog
#[derive(Debug, Clone, Default)]
pub struct FormatSelector {
    config: SelectorConfig,
}

impl FormatSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Best video-only + audio-only pair at `target` (e.g. "1080", "720p")
    pub fn select(&self, records: &[FormatRecord], target: &str) -> Selection {
        let definition = Definition::new(target);
        let selection = self.select_paired(records, &definition);
        Self::log_outcome(&definition, SelectionMode::Paired, &selection);
        selection
    }

    /// Best single muxed stream at `target`
    pub fn select_combined(&self, records: &[FormatRecord], target: &str) -> Selection {
        let definition = Definition::new(target);
        let selection = self.find_combined(records, &definition);
        Self::log_outcome(&definition, SelectionMode::Combined, &selection);
        selection
    }

    pub fn select_with_mode(
        &self,
        records: &[FormatRecord],
        target: &str,
        mode: SelectionMode,
    ) -> Selection {
        match mode {
            SelectionMode::Paired => self.select(records, target),
            SelectionMode::Combined => self.select_combined(records, target),
            SelectionMode::PairedOrCombined => {
                let paired = self.select(records, target);
                if paired.is_found() {
                    return paired;
                }
                match self.select_combined(records, target) {
                    combined @ Selection::Combined { .. } => combined,
                    _ => paired,
                }
            }
        }
    }

    /// Select using the mode from this selector's config
    pub fn select_configured(&self, records: &[FormatRecord], target: &str) -> Selection {
        self.select_with_mode(records, target, self.config.mode)
    }

    fn select_paired(&self, records: &[FormatRecord], definition: &Definition) -> Selection {
        let audio_candidates: Vec<&FormatRecord> =
            records.iter().filter(|f| f.is_audio_only()).collect();

        // A video-only stream is useless without an audio partner
        let Some(audio_only) = Self::rank_by_size(
            audio_candidates,
            self.config.preferred_audio_extension.as_deref(),
        ) else {
            return Selection::NotFound {
                reason: NotFoundReason::NoAudioOnly,
            };
        };

        let video_candidates: Vec<&FormatRecord> = records
            .iter()
            .filter(|f| f.is_video_only() && f.has_definition(definition))
            .collect();

        let Some(video_only) = Self::rank_by_size(
            video_candidates,
            self.config.preferred_video_extension.as_deref(),
        ) else {
            return Selection::NotFound {
                reason: NotFoundReason::NoVideoOnlyAtDefinition,
            };
        };

        Selection::Paired {
            video_only: video_only.clone(),
            audio_only: audio_only.clone(),
        }
    }

    fn find_combined(&self, records: &[FormatRecord], definition: &Definition) -> Selection {
        let candidates: Vec<&FormatRecord> = records
            .iter()
            .filter(|f| f.is_combined() && f.has_definition(definition))
            .collect();

        match Self::rank_by_size(candidates, self.config.preferred_video_extension.as_deref()) {
            Some(format) => Selection::Combined {
                format: format.clone(),
            },
            None => Selection::NotFound {
                reason: NotFoundReason::NoCombinedAtDefinition,
            },
        }
    }

    /// Largest candidate, unless one of the two largest has the preferred extension
    fn rank_by_size<'a>(
        mut candidates: Vec<&'a FormatRecord>,
        preferred_extension: Option<&str>,
    ) -> Option<&'a FormatRecord> {
        candidates.sort_by(|a, b| b.file_size.cmp(&a.file_size));

        let preferred = preferred_extension.and_then(|ext| {
            candidates
                .iter()
                .take(TIE_BREAK_WINDOW)
                .find(|f| f.has_extension(ext))
                .copied()
        });

        preferred.or_else(|| candidates.first().copied())
    }

    /// Definitions offered by video-only streams, highest resolution first
    pub fn available_definitions(records: &[FormatRecord]) -> Vec<String> {
        let mut videos: Vec<_> = records
            .iter()
            .filter(|f| f.is_video_only())
            .filter_map(|f| f.video.as_ref())
            .collect();
        videos.sort_by(|a, b| b.height.cmp(&a.height));

        let mut labels: Vec<String> = Vec::new();
        for video in videos {
            let label = video.definition.to_lowercase();
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    fn log_outcome(definition: &Definition, mode: SelectionMode, selection: &Selection) {
        match selection {
            Selection::NotFound { reason } => {
                debug!("[FormatSelector] {} @ {}: {}", mode, definition, reason)
            }
            found => debug!(
                "[FormatSelector] {} @ {}: {}",
                mode,
                definition,
                found.codes().join("+")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::models::{AudioStream, VideoStream};

    fn make_video_format(code: &str, height: u32, ext: &str, size: u64) -> FormatRecord {
        FormatRecord {
            code: code.to_string(),
            extension: ext.to_string(),
            file_size: size,
            video: Some(VideoStream {
                width: height * 16 / 9,
                height,
                definition: format!("{}p", height),
                bitrate_kbps: 1000.0,
                codec: "avc1.640028".to_string(),
                frame_rate: 30.0,
            }),
            audio: None,
        }
    }

    fn make_audio_format(code: &str, ext: &str, size: u64) -> FormatRecord {
        FormatRecord {
            code: code.to_string(),
            extension: ext.to_string(),
            file_size: size,
            video: None,
            audio: Some(AudioStream {
                codec: "opus".to_string(),
                bitrate_kbps: 128.0,
                sample_rate_hz: 48000.0,
            }),
        }
    }

    fn make_combined_format(code: &str, height: u32, ext: &str, size: u64) -> FormatRecord {
        FormatRecord {
            audio: make_audio_format(code, ext, size).audio,
            ..make_video_format(code, height, ext, size)
        }
    }

    fn paired_codes(selection: &Selection) -> (String, String) {
        match selection {
            Selection::Paired {
                video_only,
                audio_only,
            } => (video_only.code.clone(), audio_only.code.clone()),
            other => panic!("expected a pair, got {:?}", other),
        }
    }

    #[test]
    fn test_largest_audio_wins_without_m4a() {
        let formats = vec![
            make_audio_format("249", "webm", 1_000),
            make_audio_format("251", "webm", 3_000),
            make_video_format("137", 1080, "mp4", 50_000),
        ];
        let selection = FormatSelector::default().select(&formats, "1080p");
        assert_eq!(paired_codes(&selection), ("137".to_string(), "251".to_string()));
    }

    #[test]
    fn test_m4a_preferred_within_top_two() {
        let formats = vec![
            make_audio_format("251", "webm", 3_200),
            make_audio_format("140", "M4A", 3_000),
            make_audio_format("249", "webm", 1_000),
            make_video_format("137", 1080, "mp4", 50_000),
        ];
        let selection = FormatSelector::default().select(&formats, "1080");
        assert_eq!(paired_codes(&selection).1, "140");
    }

    #[test]
    fn test_m4a_outside_top_two_is_ignored() {
        let formats = vec![
            make_audio_format("251", "webm", 3_200),
            make_audio_format("250", "webm", 3_100),
            make_audio_format("140", "m4a", 100),
            make_video_format("137", 1080, "mp4", 50_000),
        ];
        let selection = FormatSelector::default().select(&formats, "1080");
        assert_eq!(paired_codes(&selection).1, "251");
    }

    #[test]
    fn test_mp4_preferred_within_top_two() {
        let formats = vec![
            make_audio_format("140", "m4a", 3_000),
            make_video_format("248", 1080, "webm", 60_000),
            make_video_format("137", 1080, "mp4", 50_000),
            make_video_format("399", 1080, "mp4", 10_000),
        ];
        let selection = FormatSelector::default().select(&formats, "1080p");
        assert_eq!(paired_codes(&selection).0, "137");
    }

    #[test]
    fn test_equal_sizes_keep_catalog_order() {
        let formats = vec![
            make_audio_format("250", "webm", 3_000),
            make_audio_format("251", "webm", 3_000),
            make_video_format("137", 1080, "mp4", 50_000),
        ];
        let selection = FormatSelector::default().select(&formats, "1080p");
        assert_eq!(paired_codes(&selection).1, "250");
    }

    #[test]
    fn test_only_matching_definition() {
        let formats = vec![
            make_audio_format("140", "m4a", 3_000),
            make_video_format("137", 1080, "mp4", 90_000),
            make_video_format("136", 720, "mp4", 40_000),
            make_video_format("247", 720, "webm", 45_000),
        ];
        let selection = FormatSelector::default().select(&formats, "720");
        assert_eq!(paired_codes(&selection).0, "136");
    }

    #[test]
    fn test_no_audio_only_is_not_found() {
        let formats = vec![
            make_video_format("137", 1080, "mp4", 90_000),
            make_combined_format("22", 720, "mp4", 20_000),
        ];
        let selection = FormatSelector::default().select(&formats, "1080p");
        assert_eq!(
            selection,
            Selection::NotFound {
                reason: NotFoundReason::NoAudioOnly
            }
        );
    }

    #[test]
    fn test_missing_definition_is_not_found() {
        let formats = vec![
            make_audio_format("140", "m4a", 3_000),
            make_video_format("136", 720, "mp4", 40_000),
        ];
        let selection = FormatSelector::default().select(&formats, "2160p");
        assert_eq!(
            selection,
            Selection::NotFound {
                reason: NotFoundReason::NoVideoOnlyAtDefinition
            }
        );
    }

    #[test]
    fn test_combined_mode() {
        let formats = vec![
            make_combined_format("18", 360, "mp4", 11_000),
            make_combined_format("43", 360, "webm", 12_000),
            make_combined_format("22", 720, "mp4", 0),
            make_video_format("134", 360, "mp4", 90_000),
        ];
        let selector = FormatSelector::default();

        match selector.select_combined(&formats, "360") {
            Selection::Combined { format } => assert_eq!(format.code, "18"),
            other => panic!("expected combined, got {:?}", other),
        }
        assert_eq!(
            selector.select_combined(&formats, "1080"),
            Selection::NotFound {
                reason: NotFoundReason::NoCombinedAtDefinition
            }
        );
    }

    #[test]
    fn test_paired_or_combined_falls_back() {
        let formats = vec![
            make_video_format("136", 720, "mp4", 40_000),
            make_combined_format("22", 720, "mp4", 0),
        ];
        let selector = FormatSelector::default();

        match selector.select_with_mode(&formats, "720p", SelectionMode::PairedOrCombined) {
            Selection::Combined { format } => assert_eq!(format.code, "22"),
            other => panic!("expected combined fallback, got {:?}", other),
        }

        // Both fail: the paired reason is reported
        assert_eq!(
            selector.select_with_mode(&formats, "1080p", SelectionMode::PairedOrCombined),
            Selection::NotFound {
                reason: NotFoundReason::NoAudioOnly
            }
        );
    }

    #[test]
    fn test_disabled_preference_uses_size_only() {
        let formats = vec![
            make_audio_format("251", "webm", 3_200),
            make_audio_format("140", "m4a", 3_000),
            make_video_format("137", 1080, "mp4", 50_000),
        ];
        let selector =
            FormatSelector::new(SelectorConfig::default().with_preferred_audio_extension(None));
        assert_eq!(paired_codes(&selector.select(&formats, "1080p")).1, "251");
    }

    #[test]
    fn test_config_from_json() {
        let config = SelectorConfig::from_json_str(
            r#"{"preferred_video_extension": "webm", "mode": "auto"}"#,
        )
        .unwrap();
        assert_eq!(config.preferred_video_extension.as_deref(), Some("webm"));
        assert_eq!(config.preferred_audio_extension.as_deref(), Some("m4a"));
        assert_eq!(config.mode, SelectionMode::PairedOrCombined);

        assert!(matches!(
            SelectorConfig::from_json_str("{\"mode\": 3}"),
            Err(FormatError::Config(_))
        ));
    }

    #[test]
    fn test_selection_mode_from_str() {
        assert_eq!("Paired".parse::<SelectionMode>().unwrap(), SelectionMode::Paired);
        assert_eq!("auto".parse::<SelectionMode>().unwrap(), SelectionMode::PairedOrCombined);
        assert!("best".parse::<SelectionMode>().is_err());
    }

    #[test]
    fn test_available_definitions() {
        let formats = vec![
            make_video_format("136", 720, "mp4", 40_000),
            make_video_format("137", 1080, "mp4", 90_000),
            make_video_format("247", 720, "webm", 45_000),
            make_combined_format("18", 360, "mp4", 11_000),
        ];
        assert_eq!(
            FormatSelector::available_definitions(&formats),
            vec!["1080p".to_string(), "720p".to_string()]
        );
    }
}
