use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use shoebox_catalog::{Catalog, CatalogStore};
use shoebox_core::{
    AclId, CatalogEntry, Decimal, EntryDetails, EntryId, ExecutableDetails, ExportRecord,
    GpsCoordinate, GroupId, ImageDetails, MetadataFact, external_file_id,
};

fn created() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 11, 20, 0, 0).unwrap()
}

fn entry(group: GroupId, filename: &str, digest: &str, details: EntryDetails) -> CatalogEntry {
    let category = details.category();
    CatalogEntry {
        id: None,
        group_id: group,
        filename: filename.to_string(),
        file_path: "/2024/lapland".to_string(),
        mime_type: "image/jpeg".to_string(),
        file_size: 1234,
        digest: digest.to_string(),
        created: created(),
        creator_user: 1,
        acl_id: AclId(7),
        external_file_id: external_file_id(category, digest),
        original_datetime: DateTime::parse_from_rfc3339("2024-02-11T22:41:07+02:00").ok(),
        original_second_fraction: 35,
        original_document_id: None,
        description: Some("Northern lights".to_string()),
        label: None,
        rights_holder: None,
        rights_terms: None,
        rights_url: None,
        creator_name: Some("Maija".to_string()),
        creator_email: None,
        creator_country: None,
        creator_url: None,
        gps_id: None,
        gps_timestamp: None,
        metadata_raw: Some("{}".to_string()),
        tags: Vec::new(),
        details,
    }
}

fn image() -> EntryDetails {
    EntryDetails::Image(ImageDetails {
        width: Some(6000),
        height: Some(4000),
        color_depth: 24,
        dpi: 240,
        group_label: Some("Blue".to_string()),
    })
}

#[test]
fn test_entry_round_trip_with_tags_and_facts() {
    let catalog = Catalog::open_in_memory().unwrap();
    let group = catalog.find_or_create_group("/2024/lapland", "lapland").unwrap();

    let id = catalog
        .insert_entry(&entry(group.id, "aurora.jpg", "abc", image()))
        .unwrap();
    for name in ["aurora", "lapland", "aurora"] {
        let tag = catalog.upsert_tag(name).unwrap();
        catalog.link_tag(id, tag.id).unwrap();
    }
    catalog
        .insert_facts(id, &[MetadataFact::new("IFD0", "Make", "Canon")])
        .unwrap();

    let stored = catalog
        .find_entry_by_location("/2024/lapland", "aurora.jpg")
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, Some(id));
    assert_eq!(stored.details, image());
    assert_eq!(stored.created, created());
    assert_eq!(stored.original_datetime.unwrap().to_rfc3339(), "2024-02-11T22:41:07+02:00");
    assert_eq!(stored.tags, vec!["aurora".to_string(), "lapland".to_string()]);
    assert_eq!(stored.external_file_id, "IMAGE-abc");
    assert_eq!(catalog.entry_facts(id).unwrap().len(), 1);
    assert_eq!(catalog.max_acl_id().unwrap(), Some(7));

    assert!(catalog.find_entry_by_location("/2024/lapland", "other.jpg").unwrap().is_none());
}

#[test]
fn test_delete_cascades() {
    let catalog = Catalog::open_in_memory().unwrap();
    let group = catalog.find_or_create_group("/2024/lapland", "lapland").unwrap();
    let id = catalog
        .insert_entry(&entry(group.id, "aurora.jpg", "abc", image()))
        .unwrap();
    let tag = catalog.upsert_tag("aurora").unwrap();
    catalog.link_tag(id, tag.id).unwrap();
    catalog
        .insert_facts(id, &[MetadataFact::new("File", "FileType", "JPEG")])
        .unwrap();
    catalog
        .insert_export(&ExportRecord {
            id: None,
            entry_id: id,
            filename: "aurora-web.jpg".to_string(),
            file_path: "/web".to_string(),
            mime_type: Some("image/jpeg".to_string()),
            file_size: 100,
            digest: "def".to_string(),
            document_id: Some("xmp.did:1".to_string()),
            created: created(),
        })
        .unwrap();

    assert!(catalog.delete_entry(id).unwrap());
    assert!(catalog.get_entry(id).unwrap().is_none());
    assert!(catalog.entry_facts(id).unwrap().is_empty());
    assert!(catalog.entry_tags(id).unwrap().is_empty());
    assert!(catalog.entry_exports(id).unwrap().is_empty());
    // The tag itself survives.
    assert_eq!(catalog.upsert_tag("aurora").unwrap().id, tag.id);
    assert!(!catalog.delete_entry(id).unwrap());
}

#[test]
fn test_document_id_is_unique() {
    let catalog = Catalog::open_in_memory().unwrap();
    let group = catalog.find_or_create_group("/a", "a").unwrap();

    let mut first = entry(group.id, "one.jpg", "111", image());
    first.original_document_id = Some("xmp.did:same".to_string());
    let mut second = entry(group.id, "two.jpg", "222", image());
    second.original_document_id = Some("xmp.did:same".to_string());

    let id = catalog.insert_entry(&first).unwrap();
    assert!(catalog.insert_entry(&second).is_err());
    assert_eq!(
        catalog.find_entry_by_document_id("xmp.did:same").unwrap().unwrap().id,
        Some(id)
    );

    // Entries without a document id never collide.
    catalog.insert_entry(&entry(group.id, "three.jpg", "333", image())).unwrap();
    catalog.insert_entry(&entry(group.id, "four.jpg", "444", image())).unwrap();
    assert_eq!(catalog.count_entries().unwrap(), 3);
}

#[test]
fn test_groups_are_reused_and_counted() {
    let catalog = Catalog::open_in_memory().unwrap();
    let first = catalog.find_or_create_group("/2024/lapland", "lapland").unwrap();
    let again = catalog.find_or_create_group("/2024/lapland", "lapland").unwrap();
    assert_eq!(first.id, again.id);
    catalog.find_or_create_group("/2024/helsinki", "helsinki").unwrap();

    catalog.insert_entry(&entry(first.id, "a.jpg", "a", image())).unwrap();
    catalog.insert_entry(&entry(first.id, "b.jpg", "b", image())).unwrap();

    let groups = catalog.list_groups().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].group.name, "helsinki");
    assert_eq!(groups[0].entry_count, 0);
    assert_eq!(groups[1].entry_count, 2);

    let members = catalog.group_entries(first.id).unwrap();
    let names: Vec<_> = members.iter().map(|e| e.filename.as_str()).collect();
    assert_eq!(names, vec!["a.jpg", "b.jpg"]);
}

#[test]
fn test_gps_upsert_keeps_identity_and_scale() {
    let catalog = Catalog::open_in_memory().unwrap();
    let mut observed = GpsCoordinate::new(
        Decimal::from_str("60.17500").unwrap(),
        "N",
        Decimal::from_str("24.96667").unwrap(),
        "E",
    );
    observed.city = Some("Helsinki".to_string());

    let (stored, inserted) = catalog.upsert_gps(&observed).unwrap();
    assert!(inserted);
    assert_eq!(stored.latitude.to_string(), "60.17500");
    assert_eq!(stored.city.as_deref(), Some("Helsinki"));

    observed.city = Some("Espoo".to_string());
    let (again, inserted) = catalog.upsert_gps(&observed).unwrap();
    assert!(!inserted);
    assert_eq!(again.id, stored.id);
    assert_eq!(again.city.as_deref(), Some("Helsinki"));

    // A different hemisphere is a different coordinate.
    let south = GpsCoordinate::new(
        Decimal::from_str("60.17500").unwrap(),
        "S",
        Decimal::from_str("24.96667").unwrap(),
        "E",
    );
    let (other, inserted) = catalog.upsert_gps(&south).unwrap();
    assert!(inserted);
    assert_ne!(other.id, stored.id);
    assert_eq!(catalog.count_gps().unwrap(), 2);

    let mut enriched = again.clone();
    enriched.country = Some("Finland".to_string());
    catalog.update_gps_details(&enriched).unwrap();
    let found = catalog
        .find_gps(stored.latitude, "N", stored.longitude, "E")
        .unwrap()
        .unwrap();
    assert_eq!(found.country.as_deref(), Some("Finland"));
}

#[test]
fn test_executable_details_round_trip() {
    let catalog = Catalog::open_in_memory().unwrap();
    let group = catalog.find_or_create_group("/bin", "bin").unwrap();
    let details = EntryDetails::Executable(ExecutableDetails {
        operating_systems: BTreeSet::from(["linux".to_string(), "macos".to_string()]),
        script: true,
    });
    let mut exe = entry(group.id, "run.sh", "eee", details.clone());
    exe.mime_type = "application/x-sh".to_string();
    let id = catalog.insert_entry(&exe).unwrap();

    let stored = catalog.get_entry(id).unwrap().unwrap();
    assert_eq!(stored.details, details);
    assert_eq!(stored.external_file_id, "EXECUTABLEeee");
    assert!(catalog.get_entry(EntryId(id.0 + 100)).unwrap().is_none());
}

#[test]
fn test_export_lookups() {
    let catalog = Catalog::open_in_memory().unwrap();
    let group = catalog.find_or_create_group("/a", "a").unwrap();
    let id = catalog.insert_entry(&entry(group.id, "a.jpg", "a", image())).unwrap();

    let export_id = catalog
        .insert_export(&ExportRecord {
            id: None,
            entry_id: id,
            filename: "a-small.jpg".to_string(),
            file_path: "/web/a".to_string(),
            mime_type: None,
            file_size: 10,
            digest: "small".to_string(),
            document_id: Some("xmp.did:a".to_string()),
            created: created(),
        })
        .unwrap();

    let by_location = catalog
        .find_export_by_location("/web/a", "a-small.jpg")
        .unwrap()
        .unwrap();
    assert_eq!(by_location.id, Some(export_id));
    assert_eq!(by_location.entry_id, id);
    assert!(catalog.find_export_by_document_id("xmp.did:a").unwrap().is_some());

    assert!(catalog.delete_export(export_id).unwrap());
    assert!(catalog.find_export_by_location("/web/a", "a-small.jpg").unwrap().is_none());
}
