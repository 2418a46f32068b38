//! Error types for the rich-text engine.

use std::path::PathBuf;

/// Result type alias for rich-text operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing, importing or configuring.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A character range or offset lies outside the document.
    #[error("Invalid range {start}..{end} for document of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// Malformed HTML.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// File I/O error.
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a range error.
    pub fn invalid_range(start: usize, end: usize, len: usize) -> Self {
        Self::InvalidRange { start, end, len }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// HTML that is not well-formed for the supported tag subset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("HTML parse error at byte {offset}: {message}")]
pub struct ParseError {
    /// Description of the problem.
    pub message: String,
    /// Byte offset into the input where the problem was detected.
    pub offset: usize,
}

impl ParseError {
    /// Create a parse error.
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Invalid editor configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The minimum font size exceeds the maximum.
    #[error("min_font_size ({min}) exceeds max_font_size ({max})")]
    FontSizeBounds { min: f32, max: f32 },

    /// A size or step value is not a positive, finite number.
    #[error("'{field}' must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    /// The configuration text is not valid TOML for an editor config.
    #[error("Invalid configuration: {0}")]
    Syntax(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range_message() {
        let err = Error::invalid_range(3, 9, 5);
        assert_eq!(err.to_string(), "Invalid range 3..9 for document of length 5");
    }

    #[test]
    fn test_parse_error_converts() {
        let err: Error = ParseError::new("unclosed tag <b>", 4).into();
        assert!(matches!(err, Error::Parse(ref e) if e.offset == 4));
        assert_eq!(err.to_string(), "HTML parse error at byte 4: unclosed tag <b>");
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::FontSizeBounds { min: 20.0, max: 10.0 };
        assert_eq!(err.to_string(), "min_font_size (20) exceeds max_font_size (10)");
    }
}
