//! Parse `youtube-dl -F` format listings and pick the formats to download.
//!
//! ```
//! use ytdl_formats::{parse_formats, DownloadFormat, FormatSelector};
//!
//! let report = "\
//! format code  extension  resolution note
//! 140          m4a        audio only tiny  128k , m4a_dash container, mp4a.40.2@128k (44100Hz), 3.5MiB
//! 137          mp4        1920x1080  1080p 4453k , avc1.640028, 30fps, video only, 99.9MiB
//! ";
//!
//! let formats = parse_formats(report);
//! let selection = FormatSelector::default().select(&formats, "1080");
//! let format = DownloadFormat::from_selection(&selection).unwrap();
//! assert_eq!(format.format_spec(), "137+140");
//! ```

pub mod formats;

pub use formats::{
    catalog_body, channel_url, parse_formats, parse_formats_strict, video_url, AudioStream,
    Definition, DownloadFormat, DownloadOptions, FormatError, FormatRecord, FormatResult,
    FormatSelector, MediaKind, NotFoundReason, Selection, SelectionMode, SelectorConfig,
    VideoStream,
};
