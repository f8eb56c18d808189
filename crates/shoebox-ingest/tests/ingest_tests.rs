use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use shoebox_catalog::{Catalog, CatalogStore};
use shoebox_core::{AclId, CatalogConfig, ScanError, ScanRequest};
use shoebox_ingest::{AclError, AclFlags, AclIssuer, ScanCoordinator, SequentialAclIssuer};
use shoebox_meta::{ExtractError, MetadataDocument, MetadataExtractor, MimeProbe, TagValues};
use tempfile::TempDir;

/// Serves canned metadata by file name; unknown files fail extraction.
#[derive(Default, Clone)]
struct FakeTool {
    docs: HashMap<String, String>,
}

impl FakeTool {
    fn with(mut self, filename: &str, doc: Value) -> Self {
        self.docs.insert(filename.to_string(), json!([doc]).to_string());
        self
    }
}

impl MetadataExtractor for FakeTool {
    fn extract(&self, path: &Path) -> Result<MetadataDocument, ExtractError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let json = self.docs.get(&name).ok_or_else(|| ExtractError::Empty {
            path: path.to_path_buf(),
        })?;
        MetadataDocument::from_json(json).map_err(|source| ExtractError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn extract_tags(&self, _path: &Path, _tags: &[&str]) -> Result<TagValues, ExtractError> {
        Ok(TagValues::default())
    }
}

/// Leaves MIME detection to the metadata document.
struct NoProbe;

impl MimeProbe for NoProbe {
    fn probe(&self, _path: &Path) -> Option<String> {
        None
    }
}

/// Refuses the n-th ACL request (1-based) and grants the rest.
struct FlakyAcl {
    calls: AtomicUsize,
    fail_on: usize,
}

impl FlakyAcl {
    fn failing_on(fail_on: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on,
        }
    }
}

impl AclIssuer for FlakyAcl {
    fn create_acl(&self, _user_id: i64, _flags: AclFlags) -> Result<AclId, AclError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(AclError::Unavailable {
                message: "connection reset".to_string(),
            });
        }
        Ok(AclId(call as i64))
    }
}

fn with_subjects(mut doc: Value, subjects: &[&str]) -> Value {
    doc["XMP-dc"] = json!({ "Subject": subjects });
    doc
}

fn photo(document_id: &str) -> Value {
    json!({
        "File": { "MIMEType": "image/jpeg" },
        "ExifIFD": { "DateTimeOriginal": "2024:02:11 22:41:07+02:00" },
        "XMP-dc": { "Subject": ["aurora", "lapland"] },
        "XMP-xmpMM": { "DocumentID": document_id },
        "Composite": { "ImageSize": "6000x4000" }
    })
}

fn with_gps(mut doc: Value, city: Option<&str>) -> Value {
    doc["GPS"] = json!({
        "GPSLatitudeRef": "North",
        "GPSLatitude": "68 deg 39' 36.00\"",
        "GPSLongitudeRef": "East",
        "GPSLongitude": "27 deg 32' 24.00\""
    });
    if let Some(city) = city {
        doc["XMP-photoshop"] = json!({ "City": city });
    }
    doc
}

struct Fixture {
    temp: TempDir,
}

impl Fixture {
    // TempDir names start with a dot, so the trees live one level down.
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("photos")).unwrap();
        fs::create_dir_all(temp.path().join("exports")).unwrap();
        Self { temp }
    }

    fn originals(&self) -> PathBuf {
        self.temp.path().join("photos")
    }

    fn exports(&self) -> PathBuf {
        self.temp.path().join("exports")
    }

    fn write(&self, root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn config(&self, export_root: Option<PathBuf>) -> CatalogConfig {
        CatalogConfig::builder()
            .original_root(self.originals())
            .export_root(export_root)
            .database(self.temp.path().join("db/shoebox.db"))
            .build()
            .unwrap()
    }

    /// A fresh coordinator over the same on-disk catalog.
    fn coordinator(&self, tool: FakeTool) -> ScanCoordinator {
        self.coordinator_with(tool, Some(self.exports()))
    }

    fn coordinator_with(&self, tool: FakeTool, export_root: Option<PathBuf>) -> ScanCoordinator {
        let config = self.config(export_root);
        let catalog = Catalog::open(&config.database).unwrap();
        let acl = SequentialAclIssuer::from_catalog(&catalog).unwrap();
        ScanCoordinator::new(config, catalog, Box::new(tool), Box::new(NoProbe), Box::new(acl))
    }

    fn coordinator_with_acl(&self, tool: FakeTool, acl: impl AclIssuer + 'static) -> ScanCoordinator {
        let config = self.config(Some(self.exports()));
        let catalog = Catalog::open(&config.database).unwrap();
        ScanCoordinator::new(config, catalog, Box::new(tool), Box::new(NoProbe), Box::new(acl))
    }
}

#[test]
fn test_ingest_and_rescan_is_idempotent() {
    let fx = Fixture::new();
    fx.write(&fx.originals(), "2024/lapland/aurora.jpg", "aurora bytes");
    fx.write(&fx.originals(), "2024/lapland/reindeer.jpg", "reindeer bytes");
    let tool = FakeTool::default()
        .with("aurora.jpg", photo("xmp.did:aurora"))
        .with("reindeer.jpg", photo("xmp.did:reindeer"));

    let mut coordinator = fx.coordinator(tool.clone());
    let responses = coordinator.scan(&ScanRequest::original("/2024")).unwrap();
    let first = responses.original.unwrap();
    assert!(first.success);
    assert_eq!(first.scanned_files_count, 2);
    assert_eq!(first.new_files_count, 2);
    assert!(first.failed_files.is_empty());
    assert_eq!(first.successful_files.len(), 2);
    assert_eq!(first.successful_files[0].file_path, "/2024/lapland");
    assert_eq!(first.successful_files[0].tags, vec!["aurora", "lapland"]);

    let catalog = coordinator.catalog();
    let stored = catalog
        .find_entry_by_location("/2024/lapland", "aurora.jpg")
        .unwrap()
        .unwrap();
    assert!(stored.external_file_id.starts_with("IMAGE-"));
    assert_eq!(stored.file_size, "aurora bytes".len() as u64);
    assert!(!catalog.entry_facts(stored.id.unwrap()).unwrap().is_empty());
    let groups = catalog.list_groups().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].group.path, "/2024/lapland");
    assert_eq!(groups[0].group.name, "lapland");
    assert_eq!(groups[0].entry_count, 2);

    // Nothing changed: every file is scanned, none is new.
    let second = coordinator
        .scan(&ScanRequest::original("/2024"))
        .unwrap()
        .original
        .unwrap();
    assert_eq!(second.scanned_files_count, 2);
    assert_eq!(second.new_files_count, 0);
    assert!(second.failed_files.is_empty());
    assert!(second.error_message.is_empty());
    assert!(!second.success);
    assert_eq!(coordinator.catalog().count_entries().unwrap(), 2);
}

#[test]
fn test_changed_content_replaces_entry() {
    let fx = Fixture::new();
    let path = fx.write(&fx.originals(), "2024/lapland/aurora.jpg", "first version");
    let mut first = with_subjects(photo("xmp.did:aurora"), &["old"]);
    first["XMP-old"] = json!({ "Note": "first edit" });
    let mut second = with_subjects(photo("xmp.did:aurora"), &["new"]);
    second["XMP-new"] = json!({ "Note": "second edit" });

    fx.coordinator(FakeTool::default().with("aurora.jpg", first))
        .scan(&ScanRequest::original("/2024"))
        .unwrap();

    fs::write(&path, "second version").unwrap();
    let mut coordinator = fx.coordinator(FakeTool::default().with("aurora.jpg", second));
    let response = coordinator
        .scan(&ScanRequest::original("/2024"))
        .unwrap()
        .original
        .unwrap();
    assert_eq!(response.new_files_count, 1);
    assert!(response.success);

    let catalog = coordinator.catalog();
    assert_eq!(catalog.count_entries().unwrap(), 1);
    let stored = catalog
        .find_entry_by_location("/2024/lapland", "aurora.jpg")
        .unwrap()
        .unwrap();
    assert_eq!(stored.file_size, "second version".len() as u64);
    assert_eq!(response.successful_files[0].digest, stored.digest);

    let id = stored.id.unwrap();
    assert_eq!(catalog.entry_tags(id).unwrap(), vec!["new"]);
    let facts = catalog.entry_facts(id).unwrap();
    assert!(facts.iter().any(|f| f.group == "XMP-new" && f.value == "second edit"));
    assert!(facts.iter().all(|f| f.group != "XMP-old"));
}

#[test]
fn test_duplicate_document_id_is_skipped() {
    let fx = Fixture::new();
    fx.write(&fx.originals(), "2024/a/one.jpg", "one");
    fx.write(&fx.originals(), "2024/b/two.jpg", "two");
    let tool = FakeTool::default()
        .with("one.jpg", photo("xmp.did:same"))
        .with("two.jpg", photo("xmp.did:same"));

    let mut coordinator = fx.coordinator(tool);
    let response = coordinator
        .scan(&ScanRequest::original("/2024"))
        .unwrap()
        .original
        .unwrap();
    assert_eq!(response.scanned_files_count, 2);
    assert_eq!(response.new_files_count, 1);
    assert!(response.failed_files.is_empty());
    assert_eq!(coordinator.catalog().count_entries().unwrap(), 1);
    let owner = coordinator
        .catalog()
        .find_entry_by_document_id("xmp.did:same")
        .unwrap()
        .unwrap();
    assert_eq!(owner.filename, "one.jpg");
}

#[test]
fn test_gps_is_shared_and_enriched() {
    let fx = Fixture::new();
    fx.write(&fx.originals(), "2024/lapland/a.jpg", "a");
    fx.write(&fx.originals(), "2024/lapland/b.jpg", "b");
    let tool = FakeTool::default()
        .with("a.jpg", with_gps(photo("xmp.did:a"), None))
        .with("b.jpg", with_gps(photo("xmp.did:b"), Some("Saariselkä")));

    let mut coordinator = fx.coordinator(tool);
    let response = coordinator
        .scan(&ScanRequest::original("/2024"))
        .unwrap()
        .original
        .unwrap();
    assert_eq!(response.new_files_count, 2);

    let catalog = coordinator.catalog();
    assert_eq!(catalog.count_gps().unwrap(), 1);
    let a = catalog.find_entry_by_location("/2024/lapland", "a.jpg").unwrap().unwrap();
    let b = catalog.find_entry_by_location("/2024/lapland", "b.jpg").unwrap().unwrap();
    assert!(a.gps_id.is_some());
    assert_eq!(a.gps_id, b.gps_id);

    let stored = catalog
        .find_gps("68.66000".parse().unwrap(), "N", "27.54000".parse().unwrap(), "E")
        .unwrap()
        .unwrap();
    assert_eq!(stored.city.as_deref(), Some("Saariselkä"));
}

#[test]
fn test_bad_files_fail_alone() {
    let fx = Fixture::new();
    fx.write(&fx.originals(), "2024/mixed/aurora.jpg", "aurora");
    fx.write(&fx.originals(), "2024/mixed/broken.jpg", "garbage");
    fx.write(&fx.originals(), "2024/mixed/protein.pdb", "ATOM");
    let tool = FakeTool::default()
        .with("aurora.jpg", photo("xmp.did:aurora"))
        .with("protein.pdb", json!({ "File": { "MIMEType": "chemical/x-pdb" } }));

    let mut coordinator = fx.coordinator(tool);
    let response = coordinator
        .scan(&ScanRequest::original("/2024"))
        .unwrap()
        .original
        .unwrap();
    assert_eq!(response.scanned_files_count, 3);
    assert_eq!(response.new_files_count, 1);
    assert_eq!(response.failed_files.len(), 2);
    assert_eq!(response.failed_files, vec!["broken.jpg", "protein.pdb"]);
    assert!(!response.success);

    let catalog = coordinator.catalog();
    assert_eq!(catalog.count_entries().unwrap(), 1);
    assert!(catalog
        .find_entry_by_location("/2024/mixed", "broken.jpg")
        .unwrap()
        .is_none());
}

#[test]
fn test_acl_failure_fails_only_that_file() {
    let fx = Fixture::new();
    fx.write(&fx.originals(), "2024/lapland/a.jpg", "a");
    fx.write(&fx.originals(), "2024/lapland/b.jpg", "b");
    fx.write(&fx.originals(), "2024/lapland/c.jpg", "c");
    let tool = FakeTool::default()
        .with("a.jpg", photo("xmp.did:a"))
        .with("b.jpg", with_subjects(with_gps(photo("xmp.did:b"), Some("Inari")), &["only-b"]))
        .with("c.jpg", photo("xmp.did:c"));

    let mut coordinator = fx.coordinator_with_acl(tool, FlakyAcl::failing_on(2));
    let response = coordinator
        .scan(&ScanRequest::original("/2024"))
        .unwrap()
        .original
        .unwrap();
    assert_eq!(response.scanned_files_count, 3);
    assert_eq!(response.new_files_count, 2);
    assert_eq!(response.failed_files, vec!["b.jpg"]);
    assert!(!response.success);

    let catalog = coordinator.catalog();
    assert_eq!(catalog.count_entries().unwrap(), 2);
    assert!(catalog.find_entry_by_location("/2024/lapland", "a.jpg").unwrap().is_some());
    assert!(catalog.find_entry_by_location("/2024/lapland", "b.jpg").unwrap().is_none());
    assert!(catalog.find_entry_by_location("/2024/lapland", "c.jpg").unwrap().is_some());
    // The coordinate b.jpg brought in goes with its savepoint.
    assert_eq!(catalog.count_gps().unwrap(), 0);
    let only_b: i64 = catalog
        .conn()
        .query_row("SELECT COUNT(*) FROM tags WHERE name = ?1", ["only-b"], |row| row.get(0))
        .unwrap();
    assert_eq!(only_b, 0);
}

#[test]
fn test_export_reconciliation() {
    let fx = Fixture::new();
    fx.write(&fx.originals(), "2024/lapland/aurora.jpg", "aurora");
    fx.write(&fx.exports(), "web/aurora-small.jpg", "small aurora");
    fx.write(&fx.exports(), "web/stray.jpg", "stray");
    let tool = FakeTool::default()
        .with("aurora.jpg", photo("xmp.did:aurora"))
        .with("aurora-small.jpg", photo("xmp.did:aurora"))
        .with("stray.jpg", photo("xmp.did:unknown"));

    let mut coordinator = fx.coordinator(tool);
    let request = ScanRequest {
        original_directory: Some("/2024".to_string()),
        export_directory: Some("/web".to_string()),
    };
    let responses = coordinator.scan(&request).unwrap();
    assert!(responses.original.as_ref().unwrap().success);

    let export = responses.export.clone().unwrap();
    assert_eq!(export.scanned_files_count, 2);
    assert_eq!(export.new_files_count, 2);
    assert_eq!(export.orphaned_files, vec!["stray.jpg".to_string()]);
    assert!(!export.success);
    assert!(!responses.success());

    assert_eq!(export.successful_files.len(), 1);
    let record = &export.successful_files[0];
    assert_eq!(record.file_path, "/web");
    assert_eq!(record.mime_type.as_deref(), Some("image/jpeg"));

    let original = coordinator
        .catalog()
        .find_entry_by_document_id("xmp.did:aurora")
        .unwrap()
        .unwrap();
    assert_eq!(record.entry_id, original.id.unwrap());

    // The registered export is skipped; the orphan is still an orphan.
    let again = coordinator
        .scan(&ScanRequest::export("/web"))
        .unwrap()
        .export
        .unwrap();
    assert!(again.successful_files.is_empty());
    assert_eq!(again.orphaned_files, vec!["stray.jpg".to_string()]);
    assert_eq!(
        coordinator
            .catalog()
            .entry_exports(original.id.unwrap())
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_unreadable_export_rolls_back_reconciliation() {
    let fx = Fixture::new();
    fx.write(&fx.originals(), "2024/lapland/aurora.jpg", "aurora");
    fx.write(&fx.exports(), "web/a-small.jpg", "small aurora");
    fx.write(&fx.exports(), "web/b-unreadable.jpg", "???");
    let tool = FakeTool::default()
        .with("aurora.jpg", photo("xmp.did:aurora"))
        .with("a-small.jpg", photo("xmp.did:aurora"));

    let mut coordinator = fx.coordinator(tool);
    coordinator.scan(&ScanRequest::original("/2024")).unwrap();
    let export = coordinator
        .scan(&ScanRequest::export("/web"))
        .unwrap()
        .export
        .unwrap();
    assert!(!export.success);
    assert!(export.error_message.contains("b-unreadable.jpg"));
    assert!(coordinator
        .catalog()
        .find_export_by_location("/web", "a-small.jpg")
        .unwrap()
        .is_none());
}

#[test]
fn test_missing_export_root() {
    let fx = Fixture::new();
    let mut coordinator = fx.coordinator_with(FakeTool::default(), None);
    let export = coordinator
        .scan(&ScanRequest::export("/web"))
        .unwrap()
        .export
        .unwrap();
    assert!(!export.success);
    assert!(!export.error_message.is_empty());
}

#[test]
fn test_missing_original_directory() {
    let fx = Fixture::new();
    let mut coordinator = fx.coordinator(FakeTool::default());
    let response = coordinator
        .scan(&ScanRequest::original("/1999"))
        .unwrap()
        .original
        .unwrap();
    assert!(!response.success);
    assert!(response.error_message.contains("not found"));
}

#[test]
fn test_invalid_request() {
    let fx = Fixture::new();
    let mut coordinator = fx.coordinator(FakeTool::default());
    let err = coordinator.scan(&ScanRequest::original("no-slash")).unwrap_err();
    assert!(matches!(err, ScanError::InvalidRequest { .. }));
    assert!(matches!(
        coordinator.scan(&ScanRequest::default()).unwrap_err(),
        ScanError::InvalidRequest { .. }
    ));
}

#[test]
fn test_cancelled_scan_rolls_back() {
    let fx = Fixture::new();
    fx.write(&fx.originals(), "2024/lapland/aurora.jpg", "aurora");
    let tool = FakeTool::default().with("aurora.jpg", photo("xmp.did:aurora"));

    let mut coordinator = fx.coordinator(tool);
    coordinator.cancellation().cancel();
    let err = coordinator.scan(&ScanRequest::original("/2024")).unwrap_err();
    assert!(matches!(err, ScanError::Interrupted));
    assert!(coordinator.catalog().list_groups().unwrap().is_empty());
    assert_eq!(coordinator.catalog().count_entries().unwrap(), 0);
}

#[test]
fn test_empty_leaf_creates_no_group() {
    let fx = Fixture::new();
    fs::create_dir_all(fx.originals().join("2024/empty")).unwrap();
    let mut coordinator = fx.coordinator(FakeTool::default());
    let response = coordinator
        .scan(&ScanRequest::original("/2024"))
        .unwrap()
        .original
        .unwrap();
    assert_eq!(response.scanned_files_count, 0);
    assert!(response.success);
    assert!(coordinator.catalog().list_groups().unwrap().is_empty());
}

#[test]
fn test_progress_is_published() {
    let fx = Fixture::new();
    fx.write(&fx.originals(), "2024/lapland/aurora.jpg", "aurora");
    let tool = FakeTool::default().with("aurora.jpg", photo("xmp.did:aurora"));

    let mut coordinator = fx.coordinator(tool);
    let mut progress = coordinator.subscribe();
    coordinator.scan(&ScanRequest::original("/2024")).unwrap();

    let mut last = None;
    while let Ok(snapshot) = progress.try_recv() {
        last = Some(snapshot);
    }
    let last = last.unwrap();
    assert_eq!(last.directories_total, 1);
    assert_eq!(last.directories_done, 1);
    assert_eq!(last.files_new, 1);
}
