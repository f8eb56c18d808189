//! Error types for scanning and ingestion.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while walking, ingesting or reconciling a tree.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scan was cancelled or ran past its deadline.
    #[error("Operation interrupted")]
    Interrupted,

    /// The incoming scan request is malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Scan root is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The catalog store rejected an operation.
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// Metadata could not be extracted where it is required.
    #[error("Metadata extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Whether this error ends the whole scan rather than one directory.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Interrupted | Self::InvalidRequest { .. } | Self::InvalidConfig { .. }
        )
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error reading a file or directory.
    ReadError,
    /// A directory's transaction was rolled back.
    DirectoryFailed,
}

/// Non-fatal problem recorded while scanning; folded into the response's
/// error message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Build a warning from a scan error, keeping its path where it has one.
    pub fn from_error(path: impl Into<PathBuf>, error: &ScanError) -> Self {
        let kind = match error {
            ScanError::PermissionDenied { .. } => WarningKind::PermissionDenied,
            ScanError::Io { .. } | ScanError::NotFound { .. } | ScanError::NotADirectory { .. } => {
                WarningKind::ReadError
            }
            _ => WarningKind::DirectoryFailed,
        };
        Self::new(path, error.to_string(), kind)
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("Error processing file: {} - {error}", path.display()),
            path,
            kind: WarningKind::ReadError,
        }
    }
}
