// Download argument builder - turns a Selection into downloader arguments
//
// Only builds the argument list; running the downloader is up to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::models::Selection;

const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";
const DEFAULT_FILENAME_PATTERN: &str = "%(title)s_%(id)s.%(ext)s";

pub fn video_url(video_id: &str) -> String {
    format!("{}/watch?v={}", YOUTUBE_BASE_URL, video_id)
}

pub fn channel_url(channel_id: &str) -> String {
    format!("{}/channel/{}", YOUTUBE_BASE_URL, channel_id)
}

/// Value for the downloader's `-f` option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DownloadFormat {
    /// Raw format spec understood by the downloader (e.g. "best")
    Spec { spec: String },
    /// One format code
    Single { code: String },
    /// Video and audio codes merged by the downloader
    Pair { video: String, audio: String },
}

impl DownloadFormat {
    pub fn from_selection(selection: &Selection) -> Option<Self> {
        match selection {
            Selection::Combined { format } => Some(Self::Single {
                code: format.code.clone(),
            }),
            Selection::Paired {
                video_only,
                audio_only,
            } => Some(Self::Pair {
                video: video_only.code.clone(),
                audio: audio_only.code.clone(),
            }),
            Selection::NotFound { .. } => None,
        }
    }

    pub fn format_spec(&self) -> String {
        match self {
            Self::Spec { spec } => spec.clone(),
            Self::Single { code } => code.clone(),
            Self::Pair { video, audio } => format!("{}+{}", video, audio),
        }
    }
}

impl Default for DownloadFormat {
    fn default() -> Self {
        Self::Spec {
            spec: "best".to_string(),
        }
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_spec())
    }
}

/// Download options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadOptions {
    /// Directory joined in front of the filename pattern
    pub output_dir: Option<PathBuf>,
    /// Output template (empty to let the downloader decide)
    pub filename_pattern: String,
    pub format: DownloadFormat,
    pub write_description: bool,
    pub write_auto_sub: bool,
    pub write_thumbnail: bool,
    pub write_info_json: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            filename_pattern: DEFAULT_FILENAME_PATTERN.to_string(),
            format: DownloadFormat::default(),
            write_description: false,
            write_auto_sub: false,
            write_thumbnail: false,
            write_info_json: false,
        }
    }
}

impl DownloadOptions {
    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_filename_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.filename_pattern = pattern.into();
        self
    }

    pub fn with_format(mut self, format: DownloadFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_write_description(mut self, enabled: bool) -> Self {
        self.write_description = enabled;
        self
    }

    pub fn with_write_auto_sub(mut self, enabled: bool) -> Self {
        self.write_auto_sub = enabled;
        self
    }

    pub fn with_write_thumbnail(mut self, enabled: bool) -> Self {
        self.write_thumbnail = enabled;
        self
    }

    pub fn with_write_info_json(mut self, enabled: bool) -> Self {
        self.write_info_json = enabled;
        self
    }

    /// Output path template passed with `-o`
    pub fn output_template(&self) -> Option<String> {
        if self.filename_pattern.is_empty() {
            return None;
        }
        Some(match &self.output_dir {
            Some(dir) => dir.join(&self.filename_pattern).to_string_lossy().to_string(),
            None => self.filename_pattern.clone(),
        })
    }

    /// Build the downloader argument list for a video
    pub fn to_args(&self, video_id: &str) -> Vec<String> {
        let mut args = vec!["-f".to_string(), self.format.format_spec()];

        if let Some(template) = self.output_template() {
            args.push("-o".to_string());
            args.push(template);
        }

        let flags = [
            (self.write_description, "--write-description"),
            (self.write_auto_sub, "--write-auto-sub"),
            (self.write_thumbnail, "--write-thumbnail"),
            (self.write_info_json, "--write-info-json"),
        ];
        for (enabled, flag) in flags {
            if enabled {
                args.push(flag.to_string());
            }
        }

        args.push(video_url(video_id));
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::models::{AudioStream, FormatRecord, NotFoundReason};

    fn make_format(code: &str) -> FormatRecord {
        FormatRecord {
            code: code.to_string(),
            extension: "m4a".to_string(),
            file_size: 0,
            video: None,
            audio: Some(AudioStream {
                codec: "mp4a.40.2".to_string(),
                bitrate_kbps: 128.0,
                sample_rate_hz: 44100.0,
            }),
        }
    }

    #[test]
    fn test_urls() {
        assert_eq!(video_url("abc123"), "https://www.youtube.com/watch?v=abc123");
        assert_eq!(channel_url("UC42"), "https://www.youtube.com/channel/UC42");
    }

    #[test]
    fn test_format_from_selection() {
        let paired = Selection::Paired {
            video_only: make_format("137"),
            audio_only: make_format("140"),
        };
        assert_eq!(
            DownloadFormat::from_selection(&paired).unwrap().format_spec(),
            "137+140"
        );

        let combined = Selection::Combined {
            format: make_format("22"),
        };
        assert_eq!(
            DownloadFormat::from_selection(&combined).unwrap().to_string(),
            "22"
        );

        let missing = Selection::NotFound {
            reason: NotFoundReason::NoAudioOnly,
        };
        assert!(DownloadFormat::from_selection(&missing).is_none());
    }

    #[test]
    fn test_default_args() {
        let args = DownloadOptions::default().to_args("abc123");
        assert_eq!(
            args,
            vec![
                "-f",
                "best",
                "-o",
                "%(title)s_%(id)s.%(ext)s",
                "https://www.youtube.com/watch?v=abc123",
            ]
        );
    }

    #[test]
    fn test_full_args() {
        let options = DownloadOptions::default()
            .with_output_dir(Some(PathBuf::from("videos")))
            .with_format(DownloadFormat::Pair {
                video: "137".to_string(),
                audio: "140".to_string(),
            })
            .with_write_description(true)
            .with_write_thumbnail(true)
            .with_write_info_json(true);

        let args = options.to_args("abc123");
        let expected_output = PathBuf::from("videos")
            .join("%(title)s_%(id)s.%(ext)s")
            .to_string_lossy()
            .to_string();

        assert_eq!(args[0..2], ["-f", "137+140"]);
        assert_eq!(args[2], "-o");
        assert_eq!(args[3], expected_output);
        assert_eq!(
            args[4..7],
            ["--write-description", "--write-thumbnail", "--write-info-json"]
        );
        assert!(!args.contains(&"--write-auto-sub".to_string()));
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc123");
    }

    #[test]
    fn test_empty_pattern_skips_output() {
        let args = DownloadOptions::default()
            .with_filename_pattern("")
            .with_write_auto_sub(true)
            .to_args("x");
        assert_eq!(
            args,
            vec!["-f", "best", "--write-auto-sub", "https://www.youtube.com/watch?v=x"]
        );
    }
}
