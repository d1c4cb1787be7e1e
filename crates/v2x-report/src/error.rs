//! Error types for v2x-report.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while rendering artifacts.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot prepare output directory {}: {source}", .path.display())]
    OutputDir {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("cannot replace {}: not a regular file", .path.display())]
    TargetNotFile {
        path: PathBuf,
    },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot draw {artifact}: {message}")]
    Chart {
        artifact: &'static str,
        message:  String,
    },

    #[cfg(feature = "parquet")]
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl RenderError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| RenderError::Io { path, source }
    }
}

/// Alias for `Result<T, RenderError>`.
pub type RenderResult<T> = Result<T, RenderError>;
