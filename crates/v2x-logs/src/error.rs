use std::path::PathBuf;

use thiserror::Error;

/// Input-data defects found while loading one log file.
///
/// Every variant carries the offending path; structural and field errors also
/// carry the 1-based line of the element that failed.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("{}:{line}: malformed log: {reason}", .path.display())]
    MalformedLog {
        path:   PathBuf,
        line:   usize,
        reason: String,
    },

    #[error("{}:{line}: <{element}> is missing required attribute `{field}`", .path.display())]
    MissingField {
        path:    PathBuf,
        line:    usize,
        element: &'static str,
        field:   &'static str,
    },

    #[error("{}: log contains no <{element}> records", .path.display())]
    EmptyLog {
        path:    PathBuf,
        element: &'static str,
    },

    #[error("{}: I/O error: {source}", .path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LogError {
    /// Path of the file the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            LogError::MalformedLog { path, .. }
            | LogError::MissingField { path, .. }
            | LogError::EmptyLog { path, .. }
            | LogError::Io { path, .. } => path,
        }
    }
}

pub type LogResult<T> = Result<T, LogError>;
