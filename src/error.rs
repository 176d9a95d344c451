//! Error taxonomy for conversions.
//!
//! Configuration and input-validation failures surface immediately. Chunk-level
//! decode failures are not errors from the caller's point of view: the
//! orchestrator records them as discards and keeps going (see
//! [`ConversionReport`](crate::convert::ConversionReport)).

use std::path::PathBuf;

use arrow::error::ArrowError;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// A conversion parameter is out of range (worker count, chunk size).
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("unsupported file type: {}. Expected a .{expected} file", .path.display())]
    UnsupportedFileType { path: PathBuf, expected: &'static str },

    #[error("failed to read metadata of {}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The decoder failed on a row range.
    #[error("failed to decode rows {offset}..{} of {}", range_end(.offset, .rows), .path.display())]
    Decode {
        path: PathBuf,
        offset: usize,
        rows: usize,
        #[source]
        source: anyhow::Error,
    },

    /// The decoder failed to read a file in one piece.
    #[error("failed to read {} in full", .path.display())]
    FullRead {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The operator declined the high-process-count confirmation.
    ///
    /// This is an intentional termination. Do not retry; binaries should exit
    /// with a non-zero status.
    #[error("aborted by user: {requested} worker processes were not confirmed")]
    UserAborted { requested: usize },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to merge fragments: {0}")]
    Arrow(#[from] ArrowError),
}

fn range_end(offset: &usize, rows: &usize) -> usize {
    offset.saturating_add(*rows)
}

impl ConvertError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Whether this error came from an interactive refusal rather than a fault.
    #[must_use]
    pub fn is_user_abort(&self) -> bool {
        matches!(self, Self::UserAborted { .. })
    }
}
