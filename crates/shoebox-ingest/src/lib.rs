//! Ingestion pipeline for shoebox.
//!
//! # Overview
//!
//! `shoebox-ingest` ties the other crates together:
//!
//! - **[`ScanCoordinator`]** walks the requested subtree, hashes each leaf
//!   directory and runs it in its own catalog transaction
//! - **[`Ingestor`]** takes one file through extraction, classification,
//!   de-duplication, GPS canonicalization, ACL issuance and persistence,
//!   inside a per-file savepoint
//! - **[`ExportReconciler`]** links exported derivatives to their originals
//!   by document id
//!
//! A failing file ends up in the response's failed list; a failing
//! directory is rolled back and reported; only cancellation, an expired
//! deadline or an invalid request stop a scan.
//!
//! # Example
//!
//! ```rust,no_run
//! use shoebox_core::{CatalogConfig, ScanRequest};
//! use shoebox_ingest::ScanCoordinator;
//!
//! let config = CatalogConfig::new("/srv/photos");
//! let mut coordinator = ScanCoordinator::from_config(config).unwrap();
//! let responses = coordinator.scan(&ScanRequest::original("/2024")).unwrap();
//! println!("success: {}", responses.success());
//! ```

mod acl;
mod coordinator;
mod gps;
mod guard;
mod orchestrator;
mod reconciler;

pub use acl::{AclError, AclFlags, AclIssuer, SequentialAclIssuer};
pub use coordinator::ScanCoordinator;
pub use gps::canonicalize;
pub use guard::{CancellationFlag, ScanGuard};
pub use orchestrator::{DirectoryOutcome, FileFault, Ingestor};
pub use reconciler::ExportReconciler;

// Re-export progress types for subscribers
pub use shoebox_scan::IngestProgress;
