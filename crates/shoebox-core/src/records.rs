//! Catalog records other than entries: groups, coordinates, tags, facts
//! and export records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entry::{EntryId, ExportId, GpsId, GroupId, TagId};

/// Entries that came from the same leaf directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileGroup {
    pub id: GroupId,
    /// Relative directory path, `/`-separated.
    pub path: String,
    /// Directory name.
    pub name: String,
    pub created: DateTime<Utc>,
}

/// A group together with how many entries it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: FileGroup,
    pub entry_count: u64,
}

/// Canonical GPS coordinate.
///
/// Identity is `(latitude, latitude_ref, longitude, longitude_ref)`;
/// coordinates carry exactly five fractional digits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinate {
    pub id: Option<GpsId>,
    pub latitude: Decimal,
    pub latitude_ref: String,
    pub longitude: Decimal,
    pub longitude_ref: String,
    /// Metres.
    pub altitude: Option<f64>,
    /// Image direction in degrees.
    pub direction: Option<f64>,
    pub satellites: Option<i64>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub sub_location: Option<String>,
}

impl GpsCoordinate {
    /// Create a bare coordinate with no descriptive fields.
    pub fn new(
        latitude: Decimal,
        latitude_ref: impl Into<String>,
        longitude: Decimal,
        longitude_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            latitude,
            latitude_ref: latitude_ref.into(),
            longitude,
            longitude_ref: longitude_ref.into(),
            altitude: None,
            direction: None,
            satellites: None,
            country: None,
            state: None,
            city: None,
            street: None,
            sub_location: None,
        }
    }

    /// Fill descriptive fields that are still empty from a newer
    /// observation. Existing values are never replaced.
    ///
    /// Returns `true` if anything changed.
    pub fn enrich(&mut self, observed: &GpsCoordinate) -> bool {
        let mut changed = false;
        for (slot, candidate) in [
            (&mut self.country, &observed.country),
            (&mut self.state, &observed.state),
            (&mut self.city, &observed.city),
            (&mut self.street, &observed.street),
            (&mut self.sub_location, &observed.sub_location),
        ] {
            if slot.is_none() && candidate.is_some() {
                *slot = candidate.clone();
                changed = true;
            }
        }
        changed
    }
}

/// A keyword attached to entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// One leaf of the grouped metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFact {
    pub group: String,
    pub key: String,
    pub value: String,
}

impl MetadataFact {
    pub fn new(group: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A derivative file linked back to its original entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub id: Option<ExportId>,
    pub entry_id: EntryId,
    pub filename: String,
    /// Directory relative to the export root, `/`-separated.
    pub file_path: String,
    pub mime_type: Option<String>,
    pub file_size: u64,
    pub digest: String,
    pub document_id: Option<String>,
    pub created: DateTime<Utc>,
}
