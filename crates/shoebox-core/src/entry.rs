//! Catalog entries and their category-specific details.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::category::FileCategory;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw row id.
            pub fn new(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Row id of a catalog entry.
    EntryId
);
id_type!(
    /// Row id of a file group.
    GroupId
);
id_type!(
    /// Row id of a canonical GPS coordinate.
    GpsId
);
id_type!(
    /// Row id of a tag.
    TagId
);
id_type!(
    /// Row id of an export record.
    ExportId
);
id_type!(
    /// Access-control identifier issued for an entry.
    AclId
);

/// BLAKE3 content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveDetails {
    pub compression: Option<String>,
    pub uncompressed_size: Option<i64>,
    pub content_count: Option<i64>,
    pub encrypted: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioDetails {
    /// Duration in seconds.
    pub duration: Option<f64>,
    pub bit_rate: Option<String>,
    pub sample_rate: Option<i64>,
    pub codec: Option<String>,
    pub channels: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryDetails {
    pub software_name: Option<String>,
    pub software_major_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataDetails {
    /// Structure of the payload: json, xml, csv, yaml, ...
    pub data_structure: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentDetails {
    pub page_count: Option<i64>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutableDetails {
    pub operating_systems: BTreeSet<String>,
    pub script: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontDetails {
    pub family: Option<String>,
    pub weight: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IconDetails {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub scalable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDetails {
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// Bits per pixel, summed over channels.
    pub color_depth: i64,
    pub dpi: i64,
    pub group_label: Option<String>,
}

impl Default for ImageDetails {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            color_depth: 8,
            dpi: 72,
            group_label: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractiveDetails {
    pub technology: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThumbDetails {
    pub target_entry: Option<EntryId>,
    pub relation_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorDetails {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub layers: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub frame_rate: Option<f64>,
    /// Duration in seconds.
    pub duration: Option<f64>,
    pub codec: Option<String>,
}

/// Category-specific part of an entry. One variant per storable category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum EntryDetails {
    Archive(ArchiveDetails),
    Audio(AudioDetails),
    Binary(BinaryDetails),
    Data(DataDetails),
    Document(DocumentDetails),
    Executable(ExecutableDetails),
    Font(FontDetails),
    Icon(IconDetails),
    Image(ImageDetails),
    Interactive(InteractiveDetails),
    Thumb(ThumbDetails),
    Vector(VectorDetails),
    Video(VideoDetails),
}

impl EntryDetails {
    /// Empty details for a category; `None` for [`FileCategory::Unknown`].
    pub fn empty(category: FileCategory) -> Option<Self> {
        let details = match category {
            FileCategory::Archive => Self::Archive(ArchiveDetails::default()),
            FileCategory::Audio => Self::Audio(AudioDetails::default()),
            FileCategory::Binary => Self::Binary(BinaryDetails::default()),
            FileCategory::Data => Self::Data(DataDetails::default()),
            FileCategory::Document => Self::Document(DocumentDetails::default()),
            FileCategory::Executable => Self::Executable(ExecutableDetails::default()),
            FileCategory::Font => Self::Font(FontDetails::default()),
            FileCategory::Icon => Self::Icon(IconDetails::default()),
            FileCategory::Image => Self::Image(ImageDetails::default()),
            FileCategory::Interactive => Self::Interactive(InteractiveDetails::default()),
            FileCategory::Thumb => Self::Thumb(ThumbDetails::default()),
            FileCategory::Vector => Self::Vector(VectorDetails::default()),
            FileCategory::Video => Self::Video(VideoDetails::default()),
            FileCategory::Unknown => return None,
        };
        Some(details)
    }

    /// Category this variant belongs to.
    pub fn category(&self) -> FileCategory {
        match self {
            Self::Archive(_) => FileCategory::Archive,
            Self::Audio(_) => FileCategory::Audio,
            Self::Binary(_) => FileCategory::Binary,
            Self::Data(_) => FileCategory::Data,
            Self::Document(_) => FileCategory::Document,
            Self::Executable(_) => FileCategory::Executable,
            Self::Font(_) => FileCategory::Font,
            Self::Icon(_) => FileCategory::Icon,
            Self::Image(_) => FileCategory::Image,
            Self::Interactive(_) => FileCategory::Interactive,
            Self::Thumb(_) => FileCategory::Thumb,
            Self::Vector(_) => FileCategory::Vector,
            Self::Video(_) => FileCategory::Video,
        }
    }
}

/// A cataloged file: shared header plus category details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Row id, `None` until stored.
    pub id: Option<EntryId>,
    pub group_id: GroupId,
    pub filename: String,
    /// Directory of the file relative to the scan root, `/`-separated.
    pub file_path: String,
    pub mime_type: String,
    pub file_size: u64,
    /// Hex content digest.
    pub digest: String,
    pub created: DateTime<Utc>,
    pub creator_user: i64,
    pub acl_id: AclId,
    pub external_file_id: String,
    pub original_datetime: Option<DateTime<FixedOffset>>,
    pub original_second_fraction: i64,
    pub original_document_id: Option<String>,
    pub description: Option<String>,
    pub label: Option<String>,
    pub rights_holder: Option<String>,
    pub rights_terms: Option<String>,
    pub rights_url: Option<String>,
    pub creator_name: Option<String>,
    pub creator_email: Option<String>,
    pub creator_country: Option<String>,
    pub creator_url: Option<String>,
    pub gps_id: Option<GpsId>,
    pub gps_timestamp: Option<DateTime<FixedOffset>>,
    /// Full metadata document as text.
    pub metadata_raw: Option<String>,
    pub tags: Vec<String>,
    pub details: EntryDetails,
}

impl CatalogEntry {
    pub fn category(&self) -> FileCategory {
        self.details.category()
    }
}

/// External identifier: `IMAGE-<digest>` for images, `<CATEGORY><digest>`
/// for everything else.
pub fn external_file_id(category: FileCategory, digest: &str) -> String {
    let prefix = category.short_name().to_ascii_uppercase();
    if category == FileCategory::Image {
        format!("{prefix}-{digest}")
    } else {
        format!("{prefix}{digest}")
    }
}

/// Response view of an entry without the raw metadata payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub id: Option<EntryId>,
    pub group_id: GroupId,
    pub category: FileCategory,
    pub filename: String,
    pub file_path: String,
    pub mime_type: String,
    pub file_size: u64,
    pub digest: String,
    pub created: DateTime<Utc>,
    pub external_file_id: String,
    pub original_datetime: Option<DateTime<FixedOffset>>,
    pub original_document_id: Option<String>,
    pub description: Option<String>,
    pub creator_name: Option<String>,
    pub rights_holder: Option<String>,
    pub gps_id: Option<GpsId>,
    pub tags: Vec<String>,
    pub details: EntryDetails,
}

impl From<&CatalogEntry> for EntrySummary {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id,
            group_id: entry.group_id,
            category: entry.category(),
            filename: entry.filename.clone(),
            file_path: entry.file_path.clone(),
            mime_type: entry.mime_type.clone(),
            file_size: entry.file_size,
            digest: entry.digest.clone(),
            created: entry.created,
            external_file_id: entry.external_file_id.clone(),
            original_datetime: entry.original_datetime,
            original_document_id: entry.original_document_id.clone(),
            description: entry.description.clone(),
            creator_name: entry.creator_name.clone(),
            rights_holder: entry.rights_holder.clone(),
            gps_id: entry.gps_id,
            tags: entry.tags.clone(),
            details: entry.details.clone(),
        }
    }
}
