//! Core types for shoebox.
//!
//! This crate provides the data structures shared by the rest of the
//! workspace: file categories and the MIME classifier, catalog entries and
//! records, scan requests and responses, configuration and errors.

mod category;
mod config;
mod entry;
mod error;
mod records;
mod request;

pub use category::FileCategory;
pub use config::{CatalogConfig, CatalogConfigBuilder};
pub use entry::{
    AclId, ArchiveDetails, AudioDetails, BinaryDetails, CatalogEntry, ContentHash, DataDetails,
    DocumentDetails, EntryDetails, EntryId, EntrySummary, ExecutableDetails, ExportId,
    FontDetails, GpsId, GroupId, IconDetails, ImageDetails, InteractiveDetails, TagId,
    ThumbDetails, VectorDetails, VideoDetails, external_file_id,
};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use records::{ExportRecord, FileGroup, GpsCoordinate, GroupSummary, MetadataFact, Tag};
pub use request::{
    ExportScanResponse, ScanRequest, ScanResponse, ScanResponses, validate_directory,
};

// Re-exported so dependents share one decimal type for coordinates.
pub use rust_decimal::Decimal;
