//! GPS coordinate rows.
//!
//! Latitude and longitude are stored as decimal text so the five-digit
//! scale survives and identity comparisons stay exact.

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use shoebox_core::{GpsCoordinate, GpsId};

use crate::error::CatalogError;

const GPS_COLUMNS: &str = "id, latitude, latitude_ref, longitude, longitude_ref, altitude, \
     direction, satellites, country, state, city, street, sub_location";

fn decimal(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn coordinate_from_row(row: &Row<'_>) -> rusqlite::Result<GpsCoordinate> {
    Ok(GpsCoordinate {
        id: Some(GpsId(row.get(0)?)),
        latitude: decimal(row, 1)?,
        latitude_ref: row.get(2)?,
        longitude: decimal(row, 3)?,
        longitude_ref: row.get(4)?,
        altitude: row.get(5)?,
        direction: row.get(6)?,
        satellites: row.get(7)?,
        country: row.get(8)?,
        state: row.get(9)?,
        city: row.get(10)?,
        street: row.get(11)?,
        sub_location: row.get(12)?,
    })
}

/// Look a coordinate up by its identity fields.
pub(crate) fn find(
    conn: &Connection,
    latitude: Decimal,
    latitude_ref: &str,
    longitude: Decimal,
    longitude_ref: &str,
) -> Result<Option<GpsCoordinate>, CatalogError> {
    let sql = format!(
        "SELECT {GPS_COLUMNS} FROM gps_coordinates
         WHERE latitude = ?1 AND latitude_ref = ?2 AND longitude = ?3 AND longitude_ref = ?4"
    );
    Ok(conn
        .query_row(
            &sql,
            params![
                latitude.to_string(),
                latitude_ref,
                longitude.to_string(),
                longitude_ref
            ],
            coordinate_from_row,
        )
        .optional()?)
}

/// Insert the coordinate unless its identity is already stored, then
/// return the stored row and whether it was created just now.
pub(crate) fn upsert(
    conn: &Connection,
    coordinate: &GpsCoordinate,
) -> Result<(GpsCoordinate, bool), CatalogError> {
    let inserted = conn.execute(
        "INSERT INTO gps_coordinates (latitude, latitude_ref, longitude, longitude_ref, altitude,
             direction, satellites, country, state, city, street, sub_location)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(latitude, latitude_ref, longitude, longitude_ref) DO NOTHING",
        params![
            coordinate.latitude.to_string(),
            coordinate.latitude_ref,
            coordinate.longitude.to_string(),
            coordinate.longitude_ref,
            coordinate.altitude,
            coordinate.direction,
            coordinate.satellites,
            coordinate.country,
            coordinate.state,
            coordinate.city,
            coordinate.street,
            coordinate.sub_location,
        ],
    )?;

    let stored = find(
        conn,
        coordinate.latitude,
        &coordinate.latitude_ref,
        coordinate.longitude,
        &coordinate.longitude_ref,
    )?
    .ok_or_else(|| CatalogError::corrupt("coordinate vanished after upsert"))?;
    Ok((stored, inserted > 0))
}

/// Write back the descriptive fields of a stored coordinate.
pub(crate) fn update_details(
    conn: &Connection,
    coordinate: &GpsCoordinate,
) -> Result<(), CatalogError> {
    let id = coordinate
        .id
        .ok_or_else(|| CatalogError::corrupt("cannot update an unsaved coordinate"))?;
    conn.execute(
        "UPDATE gps_coordinates
         SET country = ?1, state = ?2, city = ?3, street = ?4, sub_location = ?5
         WHERE id = ?6",
        params![
            coordinate.country,
            coordinate.state,
            coordinate.city,
            coordinate.street,
            coordinate.sub_location,
            id.0,
        ],
    )?;
    Ok(())
}

pub(crate) fn count(conn: &Connection) -> Result<u64, CatalogError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM gps_coordinates", [], |row| row.get(0))?;
    Ok(count as u64)
}
