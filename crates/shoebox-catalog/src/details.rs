//! Per-category detail rows.

use std::collections::BTreeSet;

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use shoebox_core::{
    ArchiveDetails, AudioDetails, BinaryDetails, DataDetails, DocumentDetails, EntryDetails,
    EntryId, ExecutableDetails, FileCategory, FontDetails, IconDetails, ImageDetails,
    InteractiveDetails, ThumbDetails, VectorDetails, VideoDetails,
};

use crate::error::CatalogError;
use crate::schema::details_table;

/// Write the detail row for an entry into its category table.
pub(crate) fn insert_details(
    conn: &Connection,
    entry: EntryId,
    details: &EntryDetails,
) -> Result<(), CatalogError> {
    let id = entry.0;
    match details {
        EntryDetails::Archive(d) => conn.execute(
            "INSERT INTO archive_entries (entry_id, compression, uncompressed_size, content_count, encrypted)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, d.compression, d.uncompressed_size, d.content_count, d.encrypted],
        )?,
        EntryDetails::Audio(d) => conn.execute(
            "INSERT INTO audio_entries (entry_id, duration, bit_rate, sample_rate, codec, channels)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, d.duration, d.bit_rate, d.sample_rate, d.codec, d.channels],
        )?,
        EntryDetails::Binary(d) => conn.execute(
            "INSERT INTO binary_entries (entry_id, software_name, software_major_version)
             VALUES (?1, ?2, ?3)",
            params![id, d.software_name, d.software_major_version],
        )?,
        EntryDetails::Data(d) => conn.execute(
            "INSERT INTO data_entries (entry_id, data_structure) VALUES (?1, ?2)",
            params![id, d.data_structure],
        )?,
        EntryDetails::Document(d) => conn.execute(
            "INSERT INTO document_entries (entry_id, page_count, format) VALUES (?1, ?2, ?3)",
            params![id, d.page_count, d.format],
        )?,
        EntryDetails::Executable(d) => {
            let systems = serde_json::to_string(&d.operating_systems)
                .map_err(|e| CatalogError::corrupt(format!("operating systems: {e}")))?;
            conn.execute(
                "INSERT INTO executable_entries (entry_id, operating_systems, script)
                 VALUES (?1, ?2, ?3)",
                params![id, systems, d.script],
            )?
        }
        EntryDetails::Font(d) => conn.execute(
            "INSERT INTO font_entries (entry_id, family, weight, style) VALUES (?1, ?2, ?3, ?4)",
            params![id, d.family, d.weight, d.style],
        )?,
        EntryDetails::Icon(d) => conn.execute(
            "INSERT INTO icon_entries (entry_id, width, height, scalable) VALUES (?1, ?2, ?3, ?4)",
            params![id, d.width, d.height, d.scalable],
        )?,
        EntryDetails::Image(d) => conn.execute(
            "INSERT INTO image_entries (entry_id, width, height, color_depth, dpi, group_label)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, d.width, d.height, d.color_depth, d.dpi, d.group_label],
        )?,
        EntryDetails::Interactive(d) => conn.execute(
            "INSERT INTO interactive_entries (entry_id, technology) VALUES (?1, ?2)",
            params![id, d.technology],
        )?,
        EntryDetails::Thumb(d) => conn.execute(
            "INSERT INTO thumb_entries (entry_id, target_entry, relation_type) VALUES (?1, ?2, ?3)",
            params![id, d.target_entry.map(|t| t.0), d.relation_type],
        )?,
        EntryDetails::Vector(d) => conn.execute(
            "INSERT INTO vector_entries (entry_id, width, height, layers) VALUES (?1, ?2, ?3, ?4)",
            params![id, d.width, d.height, d.layers],
        )?,
        EntryDetails::Video(d) => conn.execute(
            "INSERT INTO video_entries (entry_id, width, height, frame_rate, duration, codec)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, d.width, d.height, d.frame_rate, d.duration, d.codec],
        )?,
    };
    Ok(())
}

/// Read an entry's detail row back from its category table.
pub(crate) fn load_details(
    conn: &Connection,
    entry: EntryId,
    category: FileCategory,
) -> Result<EntryDetails, CatalogError> {
    let table = details_table(category)
        .ok_or_else(|| CatalogError::corrupt(format!("entry {entry} has no storable category")))?;
    let sql = format!("SELECT * FROM {table} WHERE entry_id = ?1");

    conn.query_row(&sql, params![entry.0], |row| details_from_row(category, row))
        .optional()?
        .ok_or_else(|| CatalogError::corrupt(format!("entry {entry} is missing its {table} row")))
}

fn details_from_row(category: FileCategory, row: &Row<'_>) -> rusqlite::Result<EntryDetails> {
    let details = match category {
        FileCategory::Archive => EntryDetails::Archive(ArchiveDetails {
            compression: row.get("compression")?,
            uncompressed_size: row.get("uncompressed_size")?,
            content_count: row.get("content_count")?,
            encrypted: row.get("encrypted")?,
        }),
        FileCategory::Audio => EntryDetails::Audio(AudioDetails {
            duration: row.get("duration")?,
            bit_rate: row.get("bit_rate")?,
            sample_rate: row.get("sample_rate")?,
            codec: row.get("codec")?,
            channels: row.get("channels")?,
        }),
        FileCategory::Binary => EntryDetails::Binary(BinaryDetails {
            software_name: row.get("software_name")?,
            software_major_version: row.get("software_major_version")?,
        }),
        FileCategory::Data => EntryDetails::Data(DataDetails {
            data_structure: row.get("data_structure")?,
        }),
        FileCategory::Document => EntryDetails::Document(DocumentDetails {
            page_count: row.get("page_count")?,
            format: row.get("format")?,
        }),
        FileCategory::Executable => {
            let raw: String = row.get("operating_systems")?;
            let operating_systems: BTreeSet<String> = serde_json::from_str(&raw)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
            EntryDetails::Executable(ExecutableDetails {
                operating_systems,
                script: row.get("script")?,
            })
        }
        FileCategory::Font => EntryDetails::Font(FontDetails {
            family: row.get("family")?,
            weight: row.get("weight")?,
            style: row.get("style")?,
        }),
        FileCategory::Icon => EntryDetails::Icon(IconDetails {
            width: row.get("width")?,
            height: row.get("height")?,
            scalable: row.get("scalable")?,
        }),
        FileCategory::Image => EntryDetails::Image(ImageDetails {
            width: row.get("width")?,
            height: row.get("height")?,
            color_depth: row.get("color_depth")?,
            dpi: row.get("dpi")?,
            group_label: row.get("group_label")?,
        }),
        FileCategory::Interactive => EntryDetails::Interactive(InteractiveDetails {
            technology: row.get("technology")?,
        }),
        FileCategory::Thumb => EntryDetails::Thumb(ThumbDetails {
            target_entry: row.get::<_, Option<i64>>("target_entry")?.map(EntryId),
            relation_type: row.get("relation_type")?,
        }),
        FileCategory::Vector => EntryDetails::Vector(VectorDetails {
            width: row.get("width")?,
            height: row.get("height")?,
            layers: row.get("layers")?,
        }),
        FileCategory::Video => EntryDetails::Video(VideoDetails {
            width: row.get("width")?,
            height: row.get("height")?,
            frame_rate: row.get("frame_rate")?,
            duration: row.get("duration")?,
            codec: row.get("codec")?,
        }),
        FileCategory::Unknown => return Err(rusqlite::Error::QueryReturnedNoRows),
    };
    Ok(details)
}
