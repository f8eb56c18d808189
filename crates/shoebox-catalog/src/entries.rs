//! Entry rows.

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Params, Row, params};

use shoebox_core::{AclId, CatalogEntry, EntryDetails, EntryId, FileCategory, GpsId, GroupId};

use crate::details::{insert_details, load_details};
use crate::error::CatalogError;
use crate::tags;

const ENTRY_COLUMNS: &str = "id, group_id, category, filename, file_path, mime_type, file_size, \
     digest, created, creator_user, acl_id, external_file_id, original_datetime, \
     original_second_fraction, original_document_id, description, label, rights_holder, \
     rights_terms, rights_url, creator_name, creator_email, creator_country, creator_url, \
     gps_id, gps_timestamp, metadata_raw";

/// Header row plus the category needed to find its details.
fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<(CatalogEntry, FileCategory)> {
    let category: String = row.get("category")?;
    let category: FileCategory = category
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    // Placeholder until the detail row is loaded.
    let details = EntryDetails::empty(category).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            "unknown category stored".into(),
        )
    })?;

    let entry = CatalogEntry {
        id: Some(EntryId(row.get("id")?)),
        group_id: GroupId(row.get("group_id")?),
        filename: row.get("filename")?,
        file_path: row.get("file_path")?,
        mime_type: row.get("mime_type")?,
        file_size: row.get::<_, i64>("file_size")? as u64,
        digest: row.get("digest")?,
        created: row.get("created")?,
        creator_user: row.get("creator_user")?,
        acl_id: AclId(row.get("acl_id")?),
        external_file_id: row.get("external_file_id")?,
        original_datetime: row.get("original_datetime")?,
        original_second_fraction: row.get("original_second_fraction")?,
        original_document_id: row.get("original_document_id")?,
        description: row.get("description")?,
        label: row.get("label")?,
        rights_holder: row.get("rights_holder")?,
        rights_terms: row.get("rights_terms")?,
        rights_url: row.get("rights_url")?,
        creator_name: row.get("creator_name")?,
        creator_email: row.get("creator_email")?,
        creator_country: row.get("creator_country")?,
        creator_url: row.get("creator_url")?,
        gps_id: row.get::<_, Option<i64>>("gps_id")?.map(GpsId),
        gps_timestamp: row.get("gps_timestamp")?,
        metadata_raw: row.get("metadata_raw")?,
        tags: Vec::new(),
        details,
    };
    Ok((entry, category))
}

/// Attach details and tags to a header row.
fn complete(
    conn: &Connection,
    (mut entry, category): (CatalogEntry, FileCategory),
) -> Result<CatalogEntry, CatalogError> {
    let Some(id) = entry.id else {
        return Err(CatalogError::corrupt("entry row without id"));
    };
    entry.details = load_details(conn, id, category)?;
    entry.tags = tags::for_entry(conn, id)?;
    Ok(entry)
}

fn find_one(
    conn: &Connection,
    clause: &str,
    params: impl Params,
) -> Result<Option<CatalogEntry>, CatalogError> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE {clause}");
    conn.query_row(&sql, params, entry_from_row)
        .optional()?
        .map(|row| complete(conn, row))
        .transpose()
}

pub(crate) fn get(conn: &Connection, id: EntryId) -> Result<Option<CatalogEntry>, CatalogError> {
    find_one(conn, "id = ?1", params![id.0])
}

pub(crate) fn find_by_location(
    conn: &Connection,
    file_path: &str,
    filename: &str,
) -> Result<Option<CatalogEntry>, CatalogError> {
    find_one(
        conn,
        "file_path = ?1 AND filename = ?2",
        params![file_path, filename],
    )
}

pub(crate) fn find_by_document_id(
    conn: &Connection,
    document_id: &str,
) -> Result<Option<CatalogEntry>, CatalogError> {
    find_one(conn, "original_document_id = ?1", params![document_id])
}

pub(crate) fn in_group(conn: &Connection, group: GroupId) -> Result<Vec<CatalogEntry>, CatalogError> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE group_id = ?1 ORDER BY filename");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![group.0], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(|row| complete(conn, row)).collect()
}

/// Store the header and its detail row. Tags are linked separately.
pub(crate) fn insert(conn: &Connection, entry: &CatalogEntry) -> Result<EntryId, CatalogError> {
    conn.execute(
        "INSERT INTO entries (group_id, category, filename, file_path, mime_type, file_size,
             digest, created, creator_user, acl_id, external_file_id, original_datetime,
             original_second_fraction, original_document_id, description, label, rights_holder,
             rights_terms, rights_url, creator_name, creator_email, creator_country, creator_url,
             gps_id, gps_timestamp, metadata_raw)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
             ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)",
        params![
            entry.group_id.0,
            entry.category().short_name(),
            entry.filename,
            entry.file_path,
            entry.mime_type,
            entry.file_size as i64,
            entry.digest,
            entry.created,
            entry.creator_user,
            entry.acl_id.0,
            entry.external_file_id,
            entry.original_datetime,
            entry.original_second_fraction,
            entry.original_document_id,
            entry.description,
            entry.label,
            entry.rights_holder,
            entry.rights_terms,
            entry.rights_url,
            entry.creator_name,
            entry.creator_email,
            entry.creator_country,
            entry.creator_url,
            entry.gps_id.map(|id| id.0),
            entry.gps_timestamp,
            entry.metadata_raw,
        ],
    )?;
    let id = EntryId(conn.last_insert_rowid());
    insert_details(conn, id, &entry.details)?;
    Ok(id)
}

/// Remove an entry; details, facts, tag links and exports go with it.
pub(crate) fn delete(conn: &Connection, id: EntryId) -> Result<bool, CatalogError> {
    let removed = conn.execute("DELETE FROM entries WHERE id = ?1", params![id.0])?;
    Ok(removed > 0)
}

pub(crate) fn max_acl_id(conn: &Connection) -> Result<Option<i64>, CatalogError> {
    Ok(conn.query_row("SELECT MAX(acl_id) FROM entries", [], |row| row.get(0))?)
}

pub(crate) fn count(conn: &Connection) -> Result<u64, CatalogError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
    Ok(count as u64)
}
