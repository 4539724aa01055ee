// Numeric helpers for human-readable magnitudes in format listings
//
// Handles tokens such as "128k", "48000", "2.5M", "10.5MiB" and "30fps".

use lazy_static::lazy_static;
use regex::Regex;

use super::errors::{FormatError, FormatResult};

lazy_static! {
    static ref MAGNITUDE_RE: Regex =
        Regex::new(r"^~?\s*(\d*\.?\d+)\s*([kKMGT]i?)?([A-Za-z]*)$").unwrap();
}

/// Multiplier for a unit prefix. `Ki`/`Mi`/... are binary, plain letters are decimal.
fn prefix_factor(prefix: &str) -> f64 {
    let (letter, binary) = match prefix.strip_suffix('i') {
        Some(letter) => (letter, true),
        None => (prefix, false),
    };
    let power = match letter {
        "k" | "K" => 1,
        "M" => 2,
        "G" => 3,
        "T" => 4,
        _ => 0,
    };
    let base: f64 = if binary { 1024.0 } else { 1000.0 };
    base.powi(power)
}

/// Parse a human-readable magnitude into its raw value
///
/// A leading `~` (approximate size) is accepted. Trailing unit text such as
/// `B`, `iB`, `Hz` or `bps` is ignored once the prefix has been applied.
pub fn parse_magnitude(token: &str) -> FormatResult<f64> {
    let trimmed = token.trim();
    let caps = MAGNITUDE_RE
        .captures(trimmed)
        .ok_or_else(|| FormatError::InvalidMagnitude(trimmed.to_string()))?;

    let value: f64 = caps[1]
        .parse()
        .map_err(|_| FormatError::InvalidMagnitude(trimmed.to_string()))?;
    let factor = caps.get(2).map_or(1.0, |m| prefix_factor(m.as_str()));
    let result = value * factor;

    if !result.is_finite() {
        return Err(FormatError::InvalidMagnitude(trimmed.to_string()));
    }
    Ok(result)
}

/// Bitrate token (e.g. "2500k") to kbit/s
pub fn parse_bitrate_kbps(token: &str) -> FormatResult<f64> {
    Ok(parse_magnitude(token)? / 1000.0)
}

/// Frame-rate column (e.g. "30fps", "60FPS", "24")
pub fn parse_frame_rate(token: &str) -> FormatResult<f64> {
    let lower = token.trim().to_lowercase();
    let number = lower.strip_suffix("fps").unwrap_or(&lower);
    parse_magnitude(number)
}

/// File-size column (e.g. "10.5MiB") to whole bytes
pub fn parse_file_size(token: &str) -> FormatResult<u64> {
    let bytes = parse_magnitude(token)?.round();
    // u64::MAX as f64 rounds up to 2^64, which no longer fits
    if bytes >= u64::MAX as f64 {
        return Err(FormatError::InvalidMagnitude(token.trim().to_string()));
    }
    Ok(bytes as u64)
}

/// Plain unsigned integer column such as a width or height
pub fn parse_dimension(field: &'static str, token: &str) -> FormatResult<u32> {
    token.trim().parse().map_err(|_| FormatError::InvalidNumber {
        field,
        value: token.to_string(),
    })
}
