//! Error taxonomy for the ingest library.
//!
//! Only configuration problems are errors in the `Result` sense. Grammar
//! mismatches are `None`, orphan lines are events, and file access failures
//! are captured per file as [`FileOutcome::Failed`] and never cross a file
//! boundary.
//!
//! [`FileOutcome::Failed`]: crate::model::FileOutcome::Failed

use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration problems, reported before any scanning starts.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Log root does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Log root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("APPDATA is not set; use --root or set APPDATA")]
    NoDefaultRoot,

    #[error("APPDATA does not resolve to a directory: {}", .0.display())]
    BadAppData(PathBuf),

    #[error("Invalid timestamp grammar '{name}': {reason}")]
    InvalidGrammar { name: String, reason: String },

    #[error("Unknown profile '{0}' (expected one of: logs, jupyter, exthost)")]
    UnknownProfile(String),

    #[error("Worker count must be at least 1")]
    ZeroWorkers,

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),
}

impl IngestError {
    /// True for errors caused by the caller's settings rather than the environment.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, IngestError::WorkerPool(_))
    }
}
