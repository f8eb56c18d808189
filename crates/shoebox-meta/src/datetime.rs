//! Capture timestamps as the metadata tool prints them.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};

use crate::document::MetadataDocument;

const EXIF_FORMAT: &str = "%Y:%m:%d %H:%M:%S%.f";
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse `YYYY:MM:DD HH:MM:SS[.fff][Z|±HH:MM]`.
///
/// Timestamps without an offset are taken to be in the local zone.
pub fn parse_capture_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let (local, offset) = split_offset(text);
    let naive = NaiveDateTime::parse_from_str(local, EXIF_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(local, ISO_FORMAT))
        .ok()?;

    match offset {
        Some(offset) => offset.from_local_datetime(&naive).single(),
        None => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.fixed_offset()),
    }
}

/// When the GPS fix was taken. Falls back to the separate date and time
/// stamps, which are always UTC.
pub fn gps_timestamp(doc: &MetadataDocument) -> Option<DateTime<FixedOffset>> {
    if let Some(text) = doc.string("Composite", "GPSDateTime") {
        return parse_capture_datetime(&text);
    }
    let date = doc.string("GPS", "GPSDateStamp")?;
    let time = doc.string("GPS", "GPSTimeStamp")?;
    parse_capture_datetime(&format!("{date} {time}Z"))
}

fn split_offset(text: &str) -> (&str, Option<FixedOffset>) {
    if let Some(head) = text.strip_suffix('Z') {
        return (head, FixedOffset::east_opt(0));
    }
    if text.len() > 6 && text.is_char_boundary(text.len() - 6) {
        let (head, tail) = text.split_at(text.len() - 6);
        if let Some(offset) = parse_offset(tail) {
            return (head, Some(offset));
        }
    }
    (text, None)
}

fn parse_offset(tail: &str) -> Option<FixedOffset> {
    let sign = match tail.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let (hours, minutes) = tail.get(1..)?.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
