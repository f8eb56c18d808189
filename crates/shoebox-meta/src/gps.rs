//! GPS position extraction.
//!
//! Coordinates arrive as degree/minute/second text such as
//! `60 deg 10' 30.00" N`. They are converted to signed decimal degrees
//! with five fractional digits; southern and western values are negative.

use rust_decimal::{Decimal, RoundingStrategy};

use shoebox_core::GpsCoordinate;

use crate::document::{MetadataDocument, value_to_number};

const SCALE: u32 = 5;

/// Convert `deg min sec` text to decimal degrees.
///
/// `reference` is the hemisphere letter; without one the coordinate is
/// meaningless and `None` is returned, as it is for text with fewer than
/// three numeric parts or parts too large to add up.
pub fn convert_coordinate(text: &str, reference: Option<char>) -> Option<Decimal> {
    let reference = reference?.to_ascii_uppercase();

    let parts: Vec<Decimal> = text
        .split(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+' || c == '-'))
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<Decimal>().ok())
        .collect::<Option<_>>()?;
    let [degrees, minutes, seconds, ..] = parts.as_slice() else {
        return None;
    };

    let minutes = round(minutes.checked_div(Decimal::from(60))?);
    let seconds = round(seconds.checked_div(Decimal::from(3600))?);
    let mut value = round(degrees.checked_add(minutes)?.checked_add(seconds)?);
    value.rescale(SCALE);

    Some(match reference {
        'S' | 'W' => -value,
        _ => value,
    })
}

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Split a trailing hemisphere letter off a coordinate.
fn trailing_reference(text: &str) -> Option<char> {
    text.trim_end()
        .chars()
        .last()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| matches!(c, 'N' | 'S' | 'E' | 'W'))
}

/// The reference tag gives a word such as `North`; only its first letter
/// matters.
fn reference_tag(doc: &MetadataDocument, key: &str) -> Option<char> {
    doc.string("GPS", key)
        .and_then(|text| text.chars().next())
        .map(|c| c.to_ascii_uppercase())
}

/// Coordinate and hemisphere for one axis.
fn axis(doc: &MetadataDocument, key: &str, ref_key: &str) -> Option<(Decimal, char)> {
    let text = doc.first_string(&[("GPS", &[key]), ("Composite", &[key])])?;
    let reference = reference_tag(doc, ref_key).or_else(|| trailing_reference(&text))?;
    convert_coordinate(&text, Some(reference)).map(|value| (value, reference))
}

/// Both axes from a combined `lat, lon` position string.
fn combined(text: &str) -> Option<((Decimal, char), (Decimal, char))> {
    let (lat, lon) = text.split_once(',')?;
    if lon.contains(',') {
        return None;
    }
    let lat_ref = trailing_reference(lat)?;
    let lon_ref = trailing_reference(lon)?;
    Some((
        (convert_coordinate(lat, Some(lat_ref))?, lat_ref),
        (convert_coordinate(lon, Some(lon_ref))?, lon_ref),
    ))
}

/// Altitude in metres from text such as `12.3 m Above Sea Level`.
fn altitude(doc: &MetadataDocument) -> Option<f64> {
    let text = doc.first_string(&[("GPS", &["GPSAltitude"]), ("Composite", &["GPSAltitude"])])?;
    let metres: f64 = text.split_whitespace().next()?.parse().ok()?;
    if text.contains("Below") { Some(-metres) } else { Some(metres) }
}

/// The file's GPS position with whatever location names it carries.
///
/// `None` unless both latitude and longitude resolve with a hemisphere.
pub fn gps_coordinate(doc: &MetadataDocument) -> Option<GpsCoordinate> {
    let position = doc
        .first_string(&[("Composite", &["GPSPosition", "GPSLocation"])])
        .filter(|text| text.contains(','));

    let ((latitude, lat_ref), (longitude, lon_ref)) = match position {
        Some(text) => combined(&text)?,
        None => (
            axis(doc, "GPSLatitude", "GPSLatitudeRef")?,
            axis(doc, "GPSLongitude", "GPSLongitudeRef")?,
        ),
    };

    let mut coordinate =
        GpsCoordinate::new(latitude, lat_ref.to_string(), longitude, lon_ref.to_string());
    coordinate.altitude = altitude(doc);
    coordinate.direction = doc.get("GPS", "GPSImgDirection").and_then(value_to_number);
    coordinate.satellites = doc
        .string("GPS", "GPSSatellites")
        .and_then(|text| text.parse().ok());
    coordinate.country = doc.first_string(&[
        ("XMP-iptcCore", &["Country"]),
        ("XMP-photoshop", &["Country"]),
    ]);
    coordinate.state = doc.string("XMP-photoshop", "State");
    coordinate.city = doc.string("XMP-photoshop", "City");
    coordinate.street = doc.string("XMP-iptcCore", "Location");
    coordinate.sub_location = doc.first_string(&[(
        "XMP-iptcExt",
        &["LocationShownSublocation", "LocationCreatedSublocation"],
    )]);
    Some(coordinate)
}
