//! Header fields shared by every category.

use chrono::{DateTime, FixedOffset};
use itertools::Itertools;

use crate::datetime::{gps_timestamp, parse_capture_datetime};
use crate::document::{Locations, MetadataDocument};

const MIME_TYPE: Locations<'static> = &[("File", &["MIMEType"]), ("XMP", &["MIMEType"])];

const DESCRIPTION: Locations<'static> = &[
    ("XMP", &["Description"]),
    ("XMP-dc", &["Description"]),
    ("IPTC", &["Caption-Abstract"]),
];

const ORIGINAL_DATETIME: Locations<'static> = &[
    ("ExifIFD", &["DateTimeOriginal", "CreateDate"]),
    ("EXIF", &["DateTimeOriginal"]),
    ("XMP-xmp", &["CreateDate"]),
    ("XMP", &["DateTimeOriginal"]),
    ("XMP-exif", &["DateTimeOriginal"]),
    (
        "Composite",
        &[
            "DateTimeOriginal",
            "DigitalCreationDateTime",
            "SubSecCreateDate",
            "SubSecDateTimeOriginal",
        ],
    ),
    ("XMP-photoshop", &["DateCreated"]),
];

const SECOND_FRACTION: Locations<'static> =
    &[("ExifIFD", &["SubSecTimeOriginal", "SubSecTimeDigitized"])];

const DOCUMENT_ID_KEYS: &[&str] = &[
    "OriginalDocumentID",
    "DocumentID",
    "InstanceID",
    "DerivedFromOriginalDocumentID",
];

const DOCUMENT_ID: Locations<'static> = &[("XMP-xmpMM", DOCUMENT_ID_KEYS), ("XMP", DOCUMENT_ID_KEYS)];

const SUBJECTS: Locations<'static> = &[
    ("XMP", &["Subject"]),
    ("XMP-dc", &["Subject"]),
    ("XMP-lr", &["HierarchicalSubject", "WeightedFlatSubject"]),
    ("IPTC", &["Keywords"]),
];

const RIGHTS_HOLDER: Locations<'static> = &[("XMP-dc", &["Rights"]), ("IFD0", &["Copyright"])];
const RIGHTS_TERMS: Locations<'static> = &[("XMP-xmpRights", &["UsageTerms"])];
const RIGHTS_URL: Locations<'static> = &[("XMP-xmpRights", &["WebStatement"])];
const CREATOR_NAME: Locations<'static> = &[("IFD0", &["Artist"]), ("XMP-dc", &["Creator"])];
const CREATOR_EMAIL: Locations<'static> = &[("XMP-iptcCore", &["CreatorWorkEmail"])];
const CREATOR_COUNTRY: Locations<'static> = &[("XMP-iptcCore", &["CreatorCountry"])];
const CREATOR_URL: Locations<'static> = &[("XMP-iptcCore", &["CreatorWorkURL"])];
const LABEL: Locations<'static> = &[("XMP-xmp", &["Label"])];

/// Descriptive header values read from a metadata document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonFields {
    pub description: Option<String>,
    pub label: Option<String>,
    pub original_datetime: Option<DateTime<FixedOffset>>,
    pub original_second_fraction: i64,
    pub original_document_id: Option<String>,
    pub rights_holder: Option<String>,
    pub rights_terms: Option<String>,
    pub rights_url: Option<String>,
    pub creator_name: Option<String>,
    pub creator_email: Option<String>,
    pub creator_country: Option<String>,
    pub creator_url: Option<String>,
    pub gps_timestamp: Option<DateTime<FixedOffset>>,
    /// Keywords in first-seen order, without duplicates.
    pub subjects: Vec<String>,
}

impl CommonFields {
    pub fn from_document(doc: &MetadataDocument) -> Self {
        Self {
            description: doc.first_string(DESCRIPTION),
            label: doc.first_string(LABEL),
            original_datetime: original_datetime(doc),
            original_second_fraction: doc
                .first_string(SECOND_FRACTION)
                .and_then(|text| text.parse().ok())
                .unwrap_or(0),
            original_document_id: document_id(doc),
            rights_holder: doc.first_string(RIGHTS_HOLDER),
            rights_terms: doc.first_string(RIGHTS_TERMS),
            rights_url: doc.first_string(RIGHTS_URL),
            creator_name: doc.first_string(CREATOR_NAME),
            creator_email: doc.first_string(CREATOR_EMAIL),
            creator_country: doc.first_string(CREATOR_COUNTRY),
            creator_url: doc.first_string(CREATOR_URL),
            gps_timestamp: gps_timestamp(doc),
            subjects: subjects(doc),
        }
    }
}

/// MIME type as reported by the metadata tool.
pub fn mime_type(doc: &MetadataDocument) -> Option<String> {
    doc.first_string(MIME_TYPE)
}

/// Cross-system document identity, if the file carries one.
pub fn document_id(doc: &MetadataDocument) -> Option<String> {
    doc.first_string(DOCUMENT_ID)
}

/// First capture timestamp that parses.
fn original_datetime(doc: &MetadataDocument) -> Option<DateTime<FixedOffset>> {
    ORIGINAL_DATETIME.iter().find_map(|(group, keys)| {
        keys.iter()
            .filter_map(|key| doc.string(group, key))
            .find_map(|text| parse_capture_datetime(&text))
    })
}

fn subjects(doc: &MetadataDocument) -> Vec<String> {
    doc.first_list(SUBJECTS).into_iter().unique().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn test_common_fields() {
        let doc = MetadataDocument::from_value(json!({
            "File": { "MIMEType": "image/jpeg" },
            "ExifIFD": {
                "DateTimeOriginal": "2006:11:19 00:04:34+02:00",
                "SubSecTimeOriginal": "42"
            },
            "IFD0": { "Artist": "Maija Meikäläinen", "Copyright": "Maija" },
            "XMP-dc": { "Subject": ["aurora", "lapland", "aurora"], "Description": "Northern lights" },
            "XMP-xmpMM": { "DocumentID": "xmp.did:0001" },
            "XMP-xmpRights": { "UsageTerms": "All rights reserved" },
            "XMP-xmp": { "Label": "Red" }
        }));
        let fields = CommonFields::from_document(&doc);

        assert_eq!(mime_type(&doc).as_deref(), Some("image/jpeg"));
        assert_eq!(fields.original_datetime.unwrap().year(), 2006);
        assert_eq!(fields.original_second_fraction, 42);
        assert_eq!(fields.original_document_id.as_deref(), Some("xmp.did:0001"));
        assert_eq!(fields.creator_name.as_deref(), Some("Maija Meikäläinen"));
        assert_eq!(fields.rights_holder.as_deref(), Some("Maija"));
        assert_eq!(fields.rights_terms.as_deref(), Some("All rights reserved"));
        assert_eq!(fields.description.as_deref(), Some("Northern lights"));
        assert_eq!(fields.label.as_deref(), Some("Red"));
        assert_eq!(fields.subjects, vec!["aurora".to_string(), "lapland".to_string()]);
    }

    #[test]
    fn test_unparseable_date_falls_through() {
        let doc = MetadataDocument::from_value(json!({
            "ExifIFD": { "DateTimeOriginal": "0000:00:00 00:00:00" },
            "XMP-xmp": { "CreateDate": "2014:06:24 09:34:01.761+03:00" }
        }));
        let fields = CommonFields::from_document(&doc);
        assert_eq!(fields.original_datetime.unwrap().year(), 2014);
        assert_eq!(fields.original_second_fraction, 0);
    }

    #[test]
    fn test_document_id_order() {
        let doc = MetadataDocument::from_value(json!({
            "XMP": { "DocumentID": "fallback" },
            "XMP-xmpMM": { "InstanceID": "xmp.iid:9", "OriginalDocumentID": "xmp.did:1" }
        }));
        assert_eq!(document_id(&doc).as_deref(), Some("xmp.did:1"));

        let doc = MetadataDocument::from_value(json!({ "XMP": { "DocumentID": "fallback" } }));
        assert_eq!(document_id(&doc).as_deref(), Some("fallback"));
        assert_eq!(document_id(&MetadataDocument::default()), None);
    }
}
