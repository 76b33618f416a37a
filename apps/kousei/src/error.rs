//! Error types shared by the check, fix, and restructure passes.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by kousei operations.
///
/// Per-file I/O problems are usually caught by the batch runners and turned
/// into [`crate::models::FileFailure`] records; the variants here reach the
/// top level only for configuration or target problems.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid pattern for rule '{id}': {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },

    #[error("duplicate rule id '{0}'")]
    DuplicateRule(String),

    #[error("target not found: {}", .0.display())]
    TargetNotFound(PathBuf),

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backup already exists: {}", .0.display())]
    BackupExists(PathBuf),
}

impl Error {
    /// Wrap an `io::Error` with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
