//! Scan requests and the responses produced for them.

use serde::{Deserialize, Serialize};

use crate::entry::EntrySummary;
use crate::error::ScanError;
use crate::records::ExportRecord;

const MIN_PATH_LEN: usize = 2;
const MAX_PATH_LEN: usize = 4096;

/// Which subtrees of the configured roots to scan.
///
/// Paths are relative to their root and start with `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub original_directory: Option<String>,
    #[serde(default)]
    pub export_directory: Option<String>,
}

impl ScanRequest {
    pub fn original(directory: impl Into<String>) -> Self {
        Self {
            original_directory: Some(directory.into()),
            export_directory: None,
        }
    }

    pub fn export(directory: impl Into<String>) -> Self {
        Self {
            original_directory: None,
            export_directory: Some(directory.into()),
        }
    }

    /// Check both paths and require at least one of them.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.original_directory.is_none() && self.export_directory.is_none() {
            return Err(ScanError::invalid_request(
                "at least one of original or export directory is required",
            ));
        }
        if let Some(ref directory) = self.original_directory {
            validate_directory(directory)?;
        }
        if let Some(ref directory) = self.export_directory {
            validate_directory(directory)?;
        }
        Ok(())
    }
}

/// A request directory starts with `/`, is 2 to 4096 characters long and
/// holds `/`-separated segments of letters, digits, `-` and `_`.
pub fn validate_directory(directory: &str) -> Result<(), ScanError> {
    let length = directory.chars().count();
    if !(MIN_PATH_LEN..=MAX_PATH_LEN).contains(&length) {
        return Err(ScanError::invalid_request(format!(
            "directory must be between {MIN_PATH_LEN} and {MAX_PATH_LEN} characters: {directory}"
        )));
    }
    let Some(rest) = directory.strip_prefix('/') else {
        return Err(ScanError::invalid_request(format!(
            "directory must start with '/': {directory}"
        )));
    };
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    let valid = rest.split('/').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    });
    if !valid {
        return Err(ScanError::invalid_request(format!(
            "directory contains invalid characters: {directory}"
        )));
    }
    Ok(())
}

/// Result of ingesting an original tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub success: bool,
    pub error_message: String,
    pub scanned_files_count: u64,
    pub new_files_count: u64,
    pub failed_files: Vec<String>,
    pub successful_files: Vec<EntrySummary>,
}

impl ScanResponse {
    /// A response for a scan that could not start.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: message.into(),
            ..Self::default()
        }
    }

    /// Append a line to the error message.
    pub fn push_error(&mut self, message: &str) {
        if !self.error_message.is_empty() {
            self.error_message.push('\n');
        }
        self.error_message.push_str(message);
    }

    /// `scanned == new` and no recorded IO fault.
    ///
    /// Legitimate skips (unchanged files, duplicate document ids) also make
    /// this false.
    pub fn compute_success(&self) -> bool {
        self.error_message.is_empty() && self.scanned_files_count == self.new_files_count
    }
}

/// Result of reconciling an export tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportScanResponse {
    pub success: bool,
    pub error_message: String,
    pub scanned_files_count: u64,
    pub new_files_count: u64,
    pub orphaned_files: Vec<String>,
    pub successful_files: Vec<ExportRecord>,
}

impl ExportScanResponse {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: message.into(),
            ..Self::default()
        }
    }
}

/// Combined response for a request naming one or both trees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResponses {
    pub original: Option<ScanResponse>,
    pub export: Option<ExportScanResponse>,
}

impl ScanResponses {
    pub fn success(&self) -> bool {
        self.original.as_ref().is_none_or(|r| r.success)
            && self.export.as_ref().is_none_or(|r| r.success)
    }
}
