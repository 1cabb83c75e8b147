//! Error types for papercut.
//!
//! Library crates use [`PapercutError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all papercut operations.
#[derive(Debug, thiserror::Error)]
pub enum PapercutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error while reading.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failure to write an output file (question PDF or composed document).
    #[error("write error at {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// PDF parsing, content decoding, or encoding error.
    #[error("pdf error: {0}")]
    Pdf(String),

    /// CSV index read/write error.
    #[error("index error: {0}")]
    Index(String),

    /// Source filename does not follow the paper naming convention.
    #[error("naming error: {message}")]
    Naming { message: String },

    /// Question anchors are missing or out of sequence.
    #[error("ordering error: {message}")]
    Ordering { message: String },

    /// Invalid input (bad predicate, unknown column, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PapercutError>;

impl PapercutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a naming error from any displayable message.
    pub fn naming(msg: impl Into<String>) -> Self {
        Self::Naming {
            message: msg.into(),
        }
    }

    /// Create an ordering error from any displayable message.
    pub fn ordering(msg: impl Into<String>) -> Self {
        Self::Ordering {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a failed output write with the target path.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Whether this error rejected a document because of its anchors.
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Ordering { .. })
    }
}
