//! Error types for stdpdf.
//!
//! Library crates use [`StdpdfError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all stdpdf operations.
#[derive(Debug, thiserror::Error)]
pub enum StdpdfError {
    /// Config, catalog or availability file missing, unreadable or malformed.
    /// Always fatal, raised before any network activity.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP failure on a single candidate URL.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but failed the size or signature gate.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StdpdfError>;

impl StdpdfError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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
}
