//! Links exported derivatives back to their originals.

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info, warn};

use shoebox_catalog::{Catalog, CatalogStore, UnitOfWork};
use shoebox_core::{ExportRecord, ExportScanResponse, ScanError};
use shoebox_meta::{MetadataExtractor, MimeProbe, document_id, mime_type};
use shoebox_scan::{DirectoryWalker, Hasher, list_files, relative_directory};

use crate::guard::ScanGuard;

/// Reconciles an export tree against the catalog in a single transaction.
pub struct ExportReconciler<'a> {
    extractor: &'a dyn MetadataExtractor,
    probe: &'a dyn MimeProbe,
    walker: &'a DirectoryWalker,
    hasher: &'a Hasher,
}

impl<'a> ExportReconciler<'a> {
    pub fn new(
        extractor: &'a dyn MetadataExtractor,
        probe: &'a dyn MimeProbe,
        walker: &'a DirectoryWalker,
        hasher: &'a Hasher,
    ) -> Self {
        Self {
            extractor,
            probe,
            walker,
            hasher,
        }
    }

    /// Register every file below `root/directory` whose document id names
    /// a cataloged original.
    ///
    /// A walk failure yields a failed response. A file whose metadata
    /// cannot be read is an `Err` for the whole call and nothing from it
    /// is kept.
    pub fn reconcile(
        &self,
        catalog: &mut Catalog,
        root: &Path,
        directory: &str,
        guard: &ScanGuard,
    ) -> Result<ExportScanResponse, ScanError> {
        let leaves = match self.walker.find_leaf_directories(root, directory) {
            Ok(leaves) => leaves,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(root = %root.display(), %directory, error = %err, "cannot walk export tree");
                return Ok(ExportScanResponse::failed(err.to_string()));
            }
        };

        let mut response = ExportScanResponse::default();
        let uow = catalog.begin()?;

        for leaf in &leaves {
            let files = list_files(leaf)?;
            if files.is_empty() {
                warn!(path = %leaf.display(), "export directory is empty");
                continue;
            }
            let digests = self.hasher.hash_all(&files);
            for (file, digest) in files.iter().zip(digests) {
                guard.check()?;
                response.scanned_files_count += 1;
                self.reconcile_file(&uow, root, file, digest?.to_hex(), &mut response)?;
            }
        }

        uow.commit()?;
        response.success = response.orphaned_files.is_empty() && response.error_message.is_empty();
        info!(
            %directory,
            scanned = response.scanned_files_count,
            new = response.new_files_count,
            orphaned = response.orphaned_files.len(),
            "export reconciliation done"
        );
        Ok(response)
    }

    fn reconcile_file(
        &self,
        uow: &UnitOfWork<'_>,
        root: &Path,
        file: &Path,
        digest: String,
        response: &mut ExportScanResponse,
    ) -> Result<(), ScanError> {
        let file_path = relative_directory(root, file);
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(existing) = uow.find_export_by_location(&file_path, &filename)? {
            if existing.digest == digest {
                debug!(path = %file.display(), "export unchanged, skipping");
                return Ok(());
            }
            if let Some(id) = existing.id {
                info!(path = %file.display(), %id, "export content changed, re-registering");
                uow.delete_export(id)?;
            }
        }

        let document = self
            .extractor
            .extract(file)
            .map_err(|err| ScanError::Extraction {
                path: file.to_path_buf(),
                message: err.to_string(),
            })?;
        let document_id = document_id(&document);

        if let Some(ref id) = document_id {
            if uow.find_export_by_document_id(id)?.is_some() {
                info!(path = %file.display(), document_id = %id, "export already registered");
                return Ok(());
            }
        }

        response.new_files_count += 1;

        let original = match document_id {
            Some(ref id) => uow.find_entry_by_document_id(id)?,
            None => None,
        };
        let Some(original) = original else {
            warn!(path = %file.display(), "no original found for exported file");
            response.orphaned_files.push(filename);
            return Ok(());
        };
        let Some(entry_id) = original.id else {
            response.orphaned_files.push(filename);
            return Ok(());
        };

        let file_size = std::fs::metadata(file)
            .map_err(|e| ScanError::io(file, e))?
            .len();
        let mut record = ExportRecord {
            id: None,
            entry_id,
            filename,
            file_path,
            mime_type: mime_type(&document).or_else(|| self.probe.probe(file)),
            file_size,
            digest,
            document_id,
            created: Utc::now(),
        };
        record.id = Some(uow.insert_export(&record)?);
        info!(path = %file.display(), original = %original.filename, "registered exported file");
        response.successful_files.push(record);
        Ok(())
    }
}

