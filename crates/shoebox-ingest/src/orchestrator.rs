//! Per-directory ingestion of original files.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use shoebox_catalog::{CatalogError, CatalogStore, FileScope, UnitOfWork};
use shoebox_core::{
    CatalogEntry, ContentHash, EntrySummary, FileCategory, GroupId, ScanError, ScanWarning,
    WarningKind, external_file_id,
};
use shoebox_meta::{
    CommonFields, DetailSource, ExtractError, MetadataExtractor, MimeProbe, extract_details,
    gps_coordinate, mime_type,
};
use shoebox_scan::{relative_directory, relative_path};

use crate::acl::{AclError, AclFlags, AclIssuer};
use crate::gps::canonicalize;
use crate::guard::ScanGuard;

/// Why a single file could not be ingested. The file lands in the
/// failed list; its directory carries on.
#[derive(Debug, Error)]
pub enum FileFault {
    #[error(transparent)]
    Io(#[from] ScanError),

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error("No MIME type could be determined for {path}")]
    NoMimeType { path: PathBuf },

    #[error("Unsupported file type {mime_type} for {path}")]
    Unsupported { path: PathBuf, mime_type: String },

    #[error("Failed to create access control for {path}: {source}")]
    Acl {
        path: PathBuf,
        #[source]
        source: AclError,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// What happened to one file that did not fail.
#[derive(Debug)]
enum FileOutcome {
    /// Stored as a new entry.
    Added(Box<CatalogEntry>),
    /// Its document id already belongs to another entry.
    Duplicate,
}

/// Counters and lists for one leaf directory.
#[derive(Debug, Default)]
pub struct DirectoryOutcome {
    pub scanned: u64,
    pub new: u64,
    pub failed_files: Vec<String>,
    pub successful_files: Vec<EntrySummary>,
    /// IO faults, reported through the response's error message.
    pub warnings: Vec<ScanWarning>,
}

impl DirectoryOutcome {
    /// Warning messages joined one per line.
    pub fn error_message(&self) -> String {
        self.warnings
            .iter()
            .map(|w| w.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Runs the per-file pipeline against a directory's unit of work.
pub struct Ingestor<'a> {
    extractor: &'a dyn MetadataExtractor,
    probe: &'a dyn MimeProbe,
    acl: &'a dyn AclIssuer,
    user_id: i64,
}

impl<'a> Ingestor<'a> {
    pub fn new(
        extractor: &'a dyn MetadataExtractor,
        probe: &'a dyn MimeProbe,
        acl: &'a dyn AclIssuer,
        user_id: i64,
    ) -> Self {
        Self {
            extractor,
            probe,
            acl,
            user_id,
        }
    }

    /// Ingest the files of one leaf directory.
    ///
    /// `digests` holds one hash result per file, in the same order. Each
    /// file runs in its own savepoint, so a failed file leaves nothing
    /// behind. An `Err` means the directory as a whole failed and the
    /// caller should roll the unit of work back.
    pub fn ingest_directory(
        &self,
        uow: &mut UnitOfWork<'_>,
        root: &Path,
        leaf: &Path,
        files: &[PathBuf],
        digests: Vec<Result<ContentHash, ScanError>>,
        guard: &ScanGuard,
    ) -> Result<DirectoryOutcome, ScanError> {
        let mut outcome = DirectoryOutcome::default();
        if files.is_empty() {
            return Ok(outcome);
        }

        let group_path = relative_path(root, leaf);
        let group_name = leaf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| group_path.clone());
        let group = uow.find_or_create_group(&group_path, &group_name)?;
        debug!(group = %group.path, files = files.len(), "ingesting directory");

        for (file, digest) in files.iter().zip(digests) {
            guard.check()?;
            outcome.scanned += 1;

            let digest = match digest {
                Ok(hash) => hash.to_hex(),
                Err(err) => {
                    warn!(path = %file.display(), error = %err, "cannot hash file");
                    outcome.warnings.push(ScanWarning::new(
                        file,
                        format!("Error processing file: {} - {err}", file.display()),
                        WarningKind::ReadError,
                    ));
                    continue;
                }
            };

            let file_path = relative_directory(root, file);
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            if let Some(existing) = uow.find_entry_by_location(&file_path, &filename)? {
                if existing.digest == digest {
                    debug!(path = %file.display(), "unchanged, skipping");
                    continue;
                }
                // Same location, new content: the old entry goes.
                if let Some(id) = existing.id {
                    info!(path = %file.display(), %id, "content changed, replacing entry");
                    uow.delete_entry(id)?;
                }
            }

            let scope = uow.file_scope()?;
            let location = FileLocation {
                path: file,
                file_path,
                filename,
                digest,
                group: group.id,
            };
            match self.ingest_file(&scope, &location) {
                Ok(FileOutcome::Added(entry)) => {
                    scope.commit()?;
                    outcome.new += 1;
                    outcome.successful_files.push(EntrySummary::from(entry.as_ref()));
                }
                Ok(FileOutcome::Duplicate) => {}
                Err(fault) => {
                    warn!(path = %file.display(), error = %fault, "file failed");
                    outcome.failed_files.push(location.filename);
                }
            }
        }

        info!(
            group = %group.path,
            scanned = outcome.scanned,
            new = outcome.new,
            failed = outcome.failed_files.len(),
            "directory done"
        );
        Ok(outcome)
    }

    fn ingest_file(
        &self,
        scope: &FileScope<'_>,
        location: &FileLocation<'_>,
    ) -> Result<FileOutcome, FileFault> {
        let path = location.path;
        let document = self.extractor.extract(path)?;

        let mime = self
            .probe
            .probe(path)
            .or_else(|| mime_type(&document))
            .ok_or_else(|| FileFault::NoMimeType {
                path: path.to_path_buf(),
            })?;
        let category = FileCategory::from_mime(Some(mime.as_str()));
        if !category.is_known() {
            return Err(FileFault::Unsupported {
                path: path.to_path_buf(),
                mime_type: mime,
            });
        }

        let fields = CommonFields::from_document(&document);
        if let Some(document_id) = &fields.original_document_id {
            if let Some(owner) = scope.find_entry_by_document_id(document_id)? {
                info!(
                    path = %path.display(),
                    %document_id,
                    owner = %owner.filename,
                    "document id already cataloged, skipping"
                );
                return Ok(FileOutcome::Duplicate);
            }
        }

        let gps_id = gps_coordinate(&document)
            .map(|coordinate| canonicalize(scope, &coordinate))
            .transpose()?;

        let acl_id = self
            .acl
            .create_acl(self.user_id, AclFlags::FULL)
            .map_err(|source| FileFault::Acl {
                path: path.to_path_buf(),
                source,
            })?;

        let source = DetailSource {
            document: &document,
            path,
            mime_type: &mime,
            extractor: self.extractor,
        };
        let details =
            extract_details(category, &source)?.ok_or_else(|| FileFault::Unsupported {
                path: path.to_path_buf(),
                mime_type: mime.clone(),
            })?;

        let file_size = std::fs::metadata(path)
            .map_err(|e| ScanError::io(path, e))?
            .len();

        let mut entry = CatalogEntry {
            id: None,
            group_id: location.group,
            filename: location.filename.clone(),
            file_path: location.file_path.clone(),
            mime_type: mime,
            file_size,
            external_file_id: external_file_id(category, &location.digest),
            digest: location.digest.clone(),
            created: Utc::now(),
            creator_user: self.user_id,
            acl_id,
            original_datetime: fields.original_datetime,
            original_second_fraction: fields.original_second_fraction,
            original_document_id: fields.original_document_id,
            description: fields.description,
            label: fields.label,
            rights_holder: fields.rights_holder,
            rights_terms: fields.rights_terms,
            rights_url: fields.rights_url,
            creator_name: fields.creator_name,
            creator_email: fields.creator_email,
            creator_country: fields.creator_country,
            creator_url: fields.creator_url,
            gps_id,
            gps_timestamp: fields.gps_timestamp,
            metadata_raw: Some(document.to_json()),
            tags: Vec::new(),
            details,
        };
        let id = scope.insert_entry(&entry)?;
        entry.id = Some(id);

        for subject in &fields.subjects {
            let tag = scope.upsert_tag(subject)?;
            scope.link_tag(id, tag.id)?;
        }
        entry.tags = fields.subjects;

        let facts = document.facts();
        scope.insert_facts(id, &facts)?;

        debug!(path = %path.display(), %id, %category, "entry stored");
        Ok(FileOutcome::Added(Box::new(entry)))
    }
}

/// Where a file sits and what it hashed to.
struct FileLocation<'p> {
    path: &'p Path,
    file_path: String,
    filename: String,
    digest: String,
    group: GroupId,
}
