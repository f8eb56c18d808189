//! Export records.

use rusqlite::{Connection, OptionalExtension, Params, Row, params};

use shoebox_core::{EntryId, ExportId, ExportRecord};

use crate::error::CatalogError;

const EXPORT_COLUMNS: &str =
    "id, entry_id, filename, file_path, mime_type, file_size, digest, document_id, created";

fn export_from_row(row: &Row<'_>) -> rusqlite::Result<ExportRecord> {
    Ok(ExportRecord {
        id: Some(ExportId(row.get(0)?)),
        entry_id: EntryId(row.get(1)?),
        filename: row.get(2)?,
        file_path: row.get(3)?,
        mime_type: row.get(4)?,
        file_size: row.get::<_, i64>(5)? as u64,
        digest: row.get(6)?,
        document_id: row.get(7)?,
        created: row.get(8)?,
    })
}

fn find_one(
    conn: &Connection,
    clause: &str,
    params: impl Params,
) -> Result<Option<ExportRecord>, CatalogError> {
    let sql = format!("SELECT {EXPORT_COLUMNS} FROM exports WHERE {clause}");
    Ok(conn.query_row(&sql, params, export_from_row).optional()?)
}

pub(crate) fn find_by_location(
    conn: &Connection,
    file_path: &str,
    filename: &str,
) -> Result<Option<ExportRecord>, CatalogError> {
    find_one(
        conn,
        "file_path = ?1 AND filename = ?2",
        params![file_path, filename],
    )
}

pub(crate) fn find_by_document_id(
    conn: &Connection,
    document_id: &str,
) -> Result<Option<ExportRecord>, CatalogError> {
    find_one(conn, "document_id = ?1", params![document_id])
}

pub(crate) fn insert(conn: &Connection, record: &ExportRecord) -> Result<ExportId, CatalogError> {
    conn.execute(
        "INSERT INTO exports (entry_id, filename, file_path, mime_type, file_size, digest,
             document_id, created)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.entry_id.0,
            record.filename,
            record.file_path,
            record.mime_type,
            record.file_size as i64,
            record.digest,
            record.document_id,
            record.created,
        ],
    )?;
    Ok(ExportId(conn.last_insert_rowid()))
}

pub(crate) fn delete(conn: &Connection, id: ExportId) -> Result<bool, CatalogError> {
    let removed = conn.execute("DELETE FROM exports WHERE id = ?1", params![id.0])?;
    Ok(removed > 0)
}

pub(crate) fn for_entry(conn: &Connection, entry: EntryId) -> Result<Vec<ExportRecord>, CatalogError> {
    let sql = format!("SELECT {EXPORT_COLUMNS} FROM exports WHERE entry_id = ?1 ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map(params![entry.0], export_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}
