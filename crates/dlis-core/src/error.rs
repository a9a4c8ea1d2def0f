//! Error types for DLIS file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while scanning, indexing, or parsing a DLIS file.
#[derive(Debug, Error)]
pub enum DlisError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Pattern absent in a bounded scan window.
    #[error("searched {searched} bytes, but could not find {target}")]
    NotFound {
        target: &'static str,
        searched: usize,
    },

    /// Incomplete structure: the input ends mid-record or mid-field.
    #[error("truncated: {message}")]
    Truncated { message: String },

    /// Valid-looking fields that disagree with each other.
    #[error("inconsistent: {message}")]
    Inconsistent { message: String },

    /// A field outside its domain.
    #[error("unexpected value: {message}")]
    UnexpectedValue { message: String },

    /// Representation code outside [1, 27].
    #[error("invalid representation code {code}")]
    InvalidRepcode { code: u16 },

    /// Unknown character in a pack format string.
    #[error("invalid format character '{ch}'")]
    InvalidFormat { ch: char },

    /// Caller-supplied argument rejected before any work began.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for DLIS operations.
pub type Result<T> = std::result::Result<T, DlisError>;

/// Coarse error classification.
///
/// Collapses the variants of [`DlisError`] onto the failure kinds callers
/// branch on: whether to give up on the file, skip a record, or fix their
/// own arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Underlying read failure or unexpected end of file.
    Io,
    /// Bounded scan did not find its pattern.
    NotFound,
    /// Structure ends before its declared extent.
    Truncated,
    /// Fields disagree with each other.
    Inconsistent,
    /// Field outside its domain.
    UnexpectedValue,
    /// Caller error, detected before any work began.
    InvalidArgument,
}

impl DlisError {
    /// Create a Truncated error.
    pub fn truncated(message: impl Into<String>) -> Self {
        Self::Truncated {
            message: message.into(),
        }
    }

    /// Create an Inconsistent error.
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent {
            message: message.into(),
        }
    }

    /// Create an UnexpectedValue error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedValue {
            message: message.into(),
        }
    }

    /// Create an InvalidArgument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Classify this error into the coarse taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. } | Self::Io(_) => ErrorKind::Io,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Truncated { .. } => ErrorKind::Truncated,
            Self::Inconsistent { .. } => ErrorKind::Inconsistent,
            Self::UnexpectedValue { .. } | Self::InvalidRepcode { .. } => {
                ErrorKind::UnexpectedValue
            }
            Self::InvalidFormat { .. } | Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DlisError::NotFound {
            target: "storage unit label",
            searched: 200,
        };
        assert_eq!(
            format!("{err}"),
            "searched 200 bytes, but could not find storage unit label"
        );

        let err = DlisError::InvalidRepcode { code: 42 };
        assert_eq!(format!("{err}"), "invalid representation code 42");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "test");
        let err: DlisError = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            DlisError::truncated("short").kind(),
            ErrorKind::Truncated
        );
        assert_eq!(
            DlisError::InvalidRepcode { code: 99 }.kind(),
            ErrorKind::UnexpectedValue
        );
        assert_eq!(
            DlisError::InvalidFormat { ch: '?' }.kind(),
            ErrorKind::InvalidArgument
        );
    }
}
