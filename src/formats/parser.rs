// Format catalog parser - turns `youtube-dl -F` output into FormatRecords
//
// Expected layout after the header line:
//   249   webm   audio only tiny   50k , opus @ 50k (48000Hz), 1.2MiB
//   140   m4a    audio only tiny  128k , m4a_dash container, mp4a.40.2@128k (44100Hz), 3.5MiB
//   137   mp4    1920x1080  1080p 4453k , avc1.640028, 30fps, video only, 99.9MiB
//   22    mp4    1280x720   720p  1000k , avc1.64001F, 30fps, mp4a.40.2@192k (44100Hz) (best)
//
// Every row is parsed on its own. A row that does not fit is logged and
// dropped; it never fails the whole listing.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use super::errors::{FormatError, FormatResult};
use super::models::{AudioStream, FormatRecord, VideoStream};
use super::units::{
    parse_bitrate_kbps, parse_dimension, parse_file_size, parse_frame_rate, parse_magnitude,
};

lazy_static! {
    static ref HEADER_RE: Regex =
        Regex::new(r"(?i)format\s+code\s+extension\s+resolution\s+note").unwrap();
    static ref CODE_RE: Regex = Regex::new(r"^(\d+)\s+").unwrap();
    static ref VIDEO_START_RE: Regex =
        Regex::new(r"(?i)^\d+\s+(.*?)\s+(\d+)x(\d+)\s+(.*?)\s+(.*?)$").unwrap();
    static ref AUDIO_ONLY_START_RE: Regex =
        Regex::new(r"(?i)^\d+\s+(.*?)\s+audio only\s+(.*?)\s+(\d+k)").unwrap();
    static ref AUDIO_SEGMENT_RE: Regex = Regex::new(r"^(.*?)\s*\((\d+)Hz\)").unwrap();
}

/// Trailing annotation the tool puts on its own pick. Selection ignores it.
const BEST_MARKER: &str = "(best)";

/// Field count of an audio-only row: note, audio codec, size
const AUDIO_ONLY_FIELDS: usize = 3;
/// Field count of a video-only row: start, codec, fps, "video only", size
const VIDEO_ONLY_FIELDS: usize = 5;
/// Combined rows: start, codec, fps, audio, and an optional size
const COMBINED_FIELDS: usize = 4;

/// Kind of row, decided once from the row text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    AudioOnly,
    VideoOnly,
    Combined,
}

impl RowKind {
    pub fn classify(line: &str) -> Self {
        if line.contains("audio only") {
            Self::AudioOnly
        } else if line.contains("video only") {
            Self::VideoOnly
        } else {
            Self::Combined
        }
    }
}

/// A catalog line with a format code, split into comma fields
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow<'a> {
    pub code: &'a str,
    pub kind: RowKind,
    pub fields: Vec<&'a str>,
}

/// Video columns shared by video-only and combined rows
#[derive(Debug, Clone, PartialEq)]
struct VideoStart {
    extension: String,
    width: u32,
    height: u32,
    definition: String,
    bitrate_kbps: f64,
}

/// Text after the header line, or None if the report lists no formats
pub fn catalog_body(report: &str) -> Option<&str> {
    HEADER_RE.find(report).map(|m| &report[m.end()..])
}

/// Parse a full `-F` report. Missing header or bad rows never fail the call.
pub fn parse_formats(report: &str) -> Vec<FormatRecord> {
    let Some(body) = catalog_body(report) else {
        debug!("[FormatParser] No format header found in report");
        return Vec::new();
    };

    let formats: Vec<FormatRecord> = body.lines().filter_map(parse_line).collect();
    debug!("[FormatParser] Parsed {} format(s)", formats.len());
    formats
}

/// Like `parse_formats`, but a report without a header is an error
pub fn parse_formats_strict(report: &str) -> FormatResult<Vec<FormatRecord>> {
    let body = catalog_body(report).ok_or(FormatError::NoFormatsListed)?;
    Ok(body.lines().filter_map(parse_line).collect())
}

fn parse_line(line: &str) -> Option<FormatRecord> {
    let row = classify_row(line)?;

    match parse_row(&row) {
        Ok(record) => {
            trace!(code = record.code.as_str(), kind = %record.media_kind(), "[FormatParser] Accepted row");
            Some(record)
        }
        Err(e) => {
            debug!(code = row.code, error = %e, "[FormatParser] Dropping row");
            None
        }
    }
}

/// Trim a line, drop the best marker, and split it into a classified row.
/// Lines without a leading numeric code give None.
pub fn classify_row(line: &str) -> Option<CatalogRow<'_>> {
    let mut line = line.trim();
    if let Some(stripped) = line.strip_suffix(BEST_MARKER) {
        line = stripped.trim();
    }

    let code = CODE_RE.captures(line)?.get(1)?.as_str();

    Some(CatalogRow {
        code,
        kind: RowKind::classify(line),
        fields: line.split(',').collect(),
    })
}

/// Remove the tool's optional second column.
///
/// youtube-dl sometimes inserts a container column (e.g. "m4a_dash container")
/// right after the first field. A row with exactly one field more than
/// `canonical` has field 1 removed; any other count except `canonical` is rejected.
pub fn normalize_optional_column<'a>(
    mut fields: Vec<&'a str>,
    canonical: usize,
) -> Option<Vec<&'a str>> {
    if fields.len() == canonical + 1 {
        fields.remove(1);
    }
    (fields.len() == canonical).then_some(fields)
}

pub fn parse_row(row: &CatalogRow<'_>) -> FormatResult<FormatRecord> {
    match row.kind {
        RowKind::AudioOnly => parse_audio_only(row),
        RowKind::VideoOnly => parse_video_only(row),
        RowKind::Combined => parse_combined(row),
    }
}

fn parse_audio_only(row: &CatalogRow<'_>) -> FormatResult<FormatRecord> {
    let fields = normalize_optional_column(row.fields.clone(), AUDIO_ONLY_FIELDS).ok_or_else(
        || FormatError::malformed(row.code, format!("{} audio-only fields", row.fields.len())),
    )?;

    let caps = AUDIO_ONLY_START_RE
        .captures(fields[0])
        .ok_or_else(|| FormatError::malformed(row.code, "unrecognized audio-only columns"))?;

    let mut audio = parse_audio_segment(row.code, fields[1])?;
    audio.bitrate_kbps = parse_bitrate_kbps(&caps[3])?;

    Ok(FormatRecord {
        code: row.code.to_string(),
        extension: caps[1].trim().to_string(),
        file_size: parse_file_size(fields[2])?,
        video: None,
        audio: Some(audio),
    })
}

fn parse_video_only(row: &CatalogRow<'_>) -> FormatResult<FormatRecord> {
    let fields = normalize_optional_column(row.fields.clone(), VIDEO_ONLY_FIELDS).ok_or_else(
        || FormatError::malformed(row.code, format!("{} video-only fields", row.fields.len())),
    )?;

    let start = parse_video_start(row.code, fields[0])?;
    let codec = fields[1].trim().to_string();
    let frame_rate = parse_frame_rate(fields[2])?;
    let file_size = parse_file_size(fields[4])?;

    Ok(FormatRecord {
        code: row.code.to_string(),
        extension: start.extension,
        file_size,
        video: Some(VideoStream {
            width: start.width,
            height: start.height,
            definition: start.definition,
            bitrate_kbps: start.bitrate_kbps,
            codec,
            frame_rate,
        }),
        audio: None,
    })
}

fn parse_combined(row: &CatalogRow<'_>) -> FormatResult<FormatRecord> {
    let fields = &row.fields;
    if fields.len() != COMBINED_FIELDS && fields.len() != COMBINED_FIELDS + 1 {
        return Err(FormatError::malformed(
            row.code,
            format!("{} combined fields", fields.len()),
        ));
    }

    let start = parse_video_start(row.code, fields[0])?;
    let codec = fields[1].trim().to_string();
    let frame_rate = parse_frame_rate(fields[2])?;
    let audio = parse_audio_segment(row.code, fields[3])?;
    let file_size = match fields.get(COMBINED_FIELDS) {
        Some(size) => parse_file_size(size)?,
        None => 0,
    };

    Ok(FormatRecord {
        code: row.code.to_string(),
        extension: start.extension,
        file_size,
        video: Some(VideoStream {
            width: start.width,
            height: start.height,
            definition: start.definition,
            bitrate_kbps: start.bitrate_kbps,
            codec,
            frame_rate,
        }),
        audio: Some(audio),
    })
}

/// `<code> <ext> <w>x<h> <definition> <bitrate>`
fn parse_video_start(code: &str, seg: &str) -> FormatResult<VideoStart> {
    let caps = VIDEO_START_RE
        .captures(seg.trim())
        .ok_or_else(|| FormatError::malformed(code, "unrecognized video columns"))?;

    Ok(VideoStart {
        extension: caps[1].trim().to_string(),
        width: parse_dimension("width", &caps[2])?,
        height: parse_dimension("height", &caps[3])?,
        definition: caps[4].trim().to_string(),
        bitrate_kbps: parse_bitrate_kbps(&caps[5])?,
    })
}

/// `<codec text> (<rate>Hz)`. Bitrate is left at 0 for the caller to fill.
fn parse_audio_segment(code: &str, seg: &str) -> FormatResult<AudioStream> {
    let caps = AUDIO_SEGMENT_RE
        .captures(seg.trim())
        .ok_or_else(|| FormatError::malformed(code, "unrecognized audio segment"))?;

    Ok(AudioStream {
        codec: caps[1].to_string(),
        bitrate_kbps: 0.0,
        sample_rate_hz: parse_magnitude(&caps[2])?,
    })
}
