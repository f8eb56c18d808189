//! Catalog errors.

use std::path::PathBuf;

use thiserror::Error;

use shoebox_core::ScanError;

/// Errors from the catalog store.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored row could not be turned back into a record.
    #[error("Corrupt catalog row: {message}")]
    Corrupt { message: String },

    #[error("Cannot create catalog directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

impl From<CatalogError> for ScanError {
    fn from(err: CatalogError) -> Self {
        ScanError::Catalog {
            message: err.to_string(),
        }
    }
}
