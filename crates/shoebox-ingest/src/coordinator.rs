//! Scan coordination: walks the trees, owns the directory transactions
//! and publishes progress.

use std::path::Path;

use tokio::sync::broadcast;
use tracing::{error, info, warn};

use shoebox_catalog::Catalog;
use shoebox_core::{
    CatalogConfig, ExportScanResponse, ScanError, ScanRequest, ScanResponse, ScanResponses,
};
use shoebox_meta::{ExifTool, MagicProbe, MetadataExtractor, MimeProbe};
use shoebox_scan::{DirectoryWalker, Hasher, IngestProgress, ProgressTracker, list_files};

use crate::acl::{AclIssuer, SequentialAclIssuer};
use crate::guard::{CancellationFlag, ScanGuard};
use crate::orchestrator::{DirectoryOutcome, Ingestor};
use crate::reconciler::ExportReconciler;

/// Runs scan requests against one catalog.
pub struct ScanCoordinator {
    config: CatalogConfig,
    catalog: Catalog,
    extractor: Box<dyn MetadataExtractor>,
    probe: Box<dyn MimeProbe>,
    acl: Box<dyn AclIssuer>,
    walker: DirectoryWalker,
    hasher: Hasher,
    progress_tx: broadcast::Sender<IngestProgress>,
    cancel: CancellationFlag,
}

impl ScanCoordinator {
    /// Create a coordinator from explicit collaborators.
    pub fn new(
        config: CatalogConfig,
        catalog: Catalog,
        extractor: Box<dyn MetadataExtractor>,
        probe: Box<dyn MimeProbe>,
        acl: Box<dyn AclIssuer>,
    ) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            walker: DirectoryWalker::with_threads(config.hash_threads),
            hasher: Hasher::with_threads(config.hash_threads),
            config,
            catalog,
            extractor,
            probe,
            acl,
            progress_tx,
            cancel: CancellationFlag::new(),
        }
    }

    /// Open the configured catalog and wire up `exiftool`, magic-byte
    /// probing and sequential ACL ids.
    pub fn from_config(config: CatalogConfig) -> Result<Self, ScanError> {
        let catalog = Catalog::open(&config.database)?;
        let extractor = ExifTool::new(config.exiftool.clone(), config.extractor_timeout())
            .map_err(|e| ScanError::InvalidConfig {
                message: e.to_string(),
            })?;
        let acl = SequentialAclIssuer::from_catalog(&catalog)?;
        info!(database = %config.database.display(), "catalog ready");
        Ok(Self::new(
            config,
            catalog,
            Box::new(extractor),
            Box::new(MagicProbe::new()),
            Box::new(acl),
        ))
    }

    /// Subscribe to ingestion progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<IngestProgress> {
        self.progress_tx.subscribe()
    }

    /// Flag that stops the running scan between files once set.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Run the original and/or export phase named by `request`.
    ///
    /// Only an invalid request or an interruption is an `Err`; every other
    /// problem is reported inside the responses.
    pub fn scan(&mut self, request: &ScanRequest) -> Result<ScanResponses, ScanError> {
        request.validate()?;
        let guard = ScanGuard::new(self.cancel.clone(), self.config.scan_timeout());

        let mut responses = ScanResponses::default();
        if let Some(ref directory) = request.original_directory {
            responses.original = Some(self.scan_originals(directory, &guard)?);
        }
        if let Some(ref directory) = request.export_directory {
            responses.export = Some(self.scan_exports(directory, &guard)?);
        }
        Ok(responses)
    }

    /// Ingest every leaf directory below `directory`, one transaction each.
    pub fn scan_originals(
        &mut self,
        directory: &str,
        guard: &ScanGuard,
    ) -> Result<ScanResponse, ScanError> {
        let root = self.config.original_root.clone();
        let leaves = match self.walker.find_leaf_directories(&root, directory) {
            Ok(leaves) => leaves,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(root = %root.display(), %directory, error = %err, "cannot walk original tree");
                return Ok(ScanResponse::failed(err.to_string()));
            }
        };
        info!(%directory, leaves = leaves.len(), "scanning originals");

        let ingestor = Ingestor::new(
            self.extractor.as_ref(),
            self.probe.as_ref(),
            self.acl.as_ref(),
            self.config.user_id,
        );
        let mut tracker = ProgressTracker::new();
        tracker.set_directories_total(leaves.len() as u64);
        let mut response = ScanResponse::default();

        for leaf in leaves {
            tracker.start_directory(leaf.clone());
            // No subscribers is fine.
            let _ = self.progress_tx.send(tracker.snapshot());

            let files = match list_files(&leaf) {
                Ok(files) => files,
                Err(err) => {
                    warn!(path = %leaf.display(), error = %err, "cannot list directory");
                    response.push_error(&err.to_string());
                    tracker.finish_directory(0, 0, 0);
                    continue;
                }
            };
            let digests = self.hasher.hash_all(&files);

            let mut uow = self.catalog.begin()?;
            let result = ingestor.ingest_directory(&mut uow, &root, &leaf, &files, digests, guard);
            match result {
                Ok(outcome) => match uow.commit() {
                    Ok(()) => {
                        tracker.finish_directory(
                            outcome.scanned,
                            outcome.new,
                            outcome.failed_files.len() as u64,
                        );
                        merge(&mut response, outcome);
                    }
                    Err(err) => {
                        error!(path = %leaf.display(), error = %err, "directory commit failed");
                        response.push_error(&directory_failed(&leaf, &err.to_string()));
                        tracker.finish_directory(0, 0, 0);
                    }
                },
                Err(err) => {
                    if let Err(rollback) = uow.rollback() {
                        error!(path = %leaf.display(), error = %rollback, "rollback failed");
                    }
                    if err.is_fatal() {
                        warn!(path = %leaf.display(), error = %err, "scan stopped");
                        return Err(err);
                    }
                    error!(path = %leaf.display(), error = %err, "directory rolled back");
                    response.push_error(&directory_failed(&leaf, &err.to_string()));
                    tracker.finish_directory(0, 0, 0);
                }
            }
        }

        let _ = self.progress_tx.send(tracker.snapshot());
        response.success = response.compute_success();
        info!(
            %directory,
            scanned = response.scanned_files_count,
            new = response.new_files_count,
            failed = response.failed_files.len(),
            success = response.success,
            "original scan done"
        );
        Ok(response)
    }

    /// Reconcile the export tree below `directory`.
    pub fn scan_exports(
        &mut self,
        directory: &str,
        guard: &ScanGuard,
    ) -> Result<ExportScanResponse, ScanError> {
        let Some(root) = self.config.export_root.clone() else {
            warn!("no export root configured");
            return Ok(ExportScanResponse::failed(
                "No export root directory configured",
            ));
        };
        info!(%directory, root = %root.display(), "reconciling exports");

        let reconciler = ExportReconciler::new(
            self.extractor.as_ref(),
            self.probe.as_ref(),
            &self.walker,
            &self.hasher,
        );
        match reconciler.reconcile(&mut self.catalog, &root, directory, guard) {
            Ok(response) => Ok(response),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                error!(%directory, error = %err, "export reconciliation rolled back");
                Ok(ExportScanResponse::failed(err.to_string()))
            }
        }
    }
}

fn merge(response: &mut ScanResponse, outcome: DirectoryOutcome) {
    let message = outcome.error_message();
    if !message.is_empty() {
        response.push_error(&message);
    }
    response.scanned_files_count += outcome.scanned;
    response.new_files_count += outcome.new;
    response.failed_files.extend(outcome.failed_files);
    response.successful_files.extend(outcome.successful_files);
}

fn directory_failed(leaf: &Path, reason: &str) -> String {
    format!("Directory {} was rolled back: {reason}", leaf.display())
}
