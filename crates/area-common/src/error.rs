//! Error types for AREA decoding.

use thiserror::Error;

/// Result type alias using AreaError.
pub type AreaResult<T> = Result<T, AreaError>;

/// Primary error type for AREA operations.
#[derive(Debug, Error)]
pub enum AreaError {
    // === I/O Errors ===
    #[error("I/O error ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Short read of {what} at byte {offset}: expected {expected} bytes, found {found}")]
    ShortRead {
        what: String,
        offset: u64,
        expected: usize,
        found: usize,
    },

    // === Format Errors ===
    #[error("Invalid value {value} for header field '{field}': {reason}")]
    InvalidField {
        field: &'static str,
        value: i64,
        reason: String,
    },

    #[error("Invalid AREA header: {0}")]
    InvalidHeader(String),

    #[error("Unsupported data layout: {0}")]
    UnsupportedLayout(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AreaError {
    /// Create an Io error with a description of what was being read.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an InvalidField error.
    pub fn invalid_field(field: &'static str, value: i64, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            value,
            reason: reason.into(),
        }
    }

    /// Create an InvalidHeader error.
    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    /// True for errors raised by the underlying resource rather than its contents.
    pub fn is_io(&self) -> bool {
        matches!(self, AreaError::Io { .. } | AreaError::ShortRead { .. })
    }
}

impl From<std::io::Error> for AreaError {
    fn from(err: std::io::Error) -> Self {
        AreaError::Io {
            context: "unspecified read".to_string(),
            source: err,
        }
    }
}
