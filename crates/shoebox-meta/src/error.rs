//! Extraction errors.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors from running the metadata tool or reading its output.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The tool could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran past its time limit and was killed.
    #[error("Metadata extraction timed out after {timeout:?}: {path}")]
    Timeout { path: PathBuf, timeout: Duration },

    /// The tool exited unsuccessfully without usable output.
    #[error("Metadata tool failed on {path} (exit {status}): {stderr}")]
    Failed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    /// The tool reported an error for this file.
    #[error("Metadata tool rejected {path}: {message}")]
    Rejected { path: PathBuf, message: String },

    /// Output was not the expected JSON.
    #[error("Malformed metadata for {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Output parsed but held no metadata groups.
    #[error("No metadata found for {path}")]
    Empty { path: PathBuf },
}

impl ExtractError {
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Spawn { .. } => None,
            Self::Timeout { path, .. }
            | Self::Failed { path, .. }
            | Self::Rejected { path, .. }
            | Self::Parse { path, .. }
            | Self::Empty { path } => Some(path),
        }
    }
}
