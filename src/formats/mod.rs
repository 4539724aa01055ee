// Format catalog module - parsing and selection of youtube-dl formats

pub mod download_args;
pub mod errors;
pub mod format_selector;
pub mod models;
pub mod parser;
pub mod units;

pub use download_args::{channel_url, video_url, DownloadFormat, DownloadOptions};
pub use errors::{FormatError, FormatResult};
pub use format_selector::{FormatSelector, SelectionMode, SelectorConfig};
pub use models::{
    AudioStream, Definition, FormatRecord, MediaKind, NotFoundReason, Selection, VideoStream,
};
pub use parser::{catalog_body, parse_formats, parse_formats_strict};
