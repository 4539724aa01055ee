// Error types for format parsing and selection

use thiserror::Error;

pub type FormatResult<T> = Result<T, FormatError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Human-readable magnitude like "3.5MiB" or "128k" could not be read
    #[error("Invalid magnitude: {0:?}")]
    InvalidMagnitude(String),

    /// Plain integer column (width, height) could not be read
    #[error("Invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// Row had a code but its columns did not match the expected layout
    #[error("Malformed row {code}: {reason}")]
    MalformedRow { code: String, reason: String },

    /// Report had no "format code extension resolution note" header
    #[error("No format listed")]
    NoFormatsListed,

    /// Selector configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),
}

impl FormatError {
    pub fn malformed(code: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            code: code.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
