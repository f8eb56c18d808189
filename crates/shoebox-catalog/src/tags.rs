//! Tags, tag links and flattened metadata facts.

use rusqlite::{Connection, params};

use shoebox_core::{EntryId, MetadataFact, Tag, TagId};

use crate::error::CatalogError;

/// Find or create a tag by exact name.
pub(crate) fn upsert(conn: &Connection, name: &str) -> Result<Tag, CatalogError> {
    conn.execute(
        "INSERT INTO tags (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        params![name],
    )?;
    let id: i64 = conn.query_row("SELECT id FROM tags WHERE name = ?1", params![name], |row| {
        row.get(0)
    })?;
    Ok(Tag {
        id: TagId(id),
        name: name.to_string(),
    })
}

/// Link a tag to an entry. Returns `false` if the link already existed.
pub(crate) fn link(conn: &Connection, entry: EntryId, tag: TagId) -> Result<bool, CatalogError> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO entry_tags (entry_id, tag_id) VALUES (?1, ?2)",
        params![entry.0, tag.0],
    )?;
    Ok(inserted > 0)
}

/// Tag names of an entry in the order they were linked.
pub(crate) fn for_entry(conn: &Connection, entry: EntryId) -> Result<Vec<String>, CatalogError> {
    let mut stmt = conn.prepare_cached(
        "SELECT t.name FROM entry_tags et JOIN tags t ON t.id = et.tag_id
         WHERE et.entry_id = ?1 ORDER BY et.rowid",
    )?;
    let names = stmt
        .query_map(params![entry.0], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

pub(crate) fn insert_facts(
    conn: &Connection,
    entry: EntryId,
    facts: &[MetadataFact],
) -> Result<usize, CatalogError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO metadata_facts (entry_id, group_name, tag_key, tag_value)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for fact in facts {
        stmt.execute(params![entry.0, fact.group, fact.key, fact.value])?;
    }
    Ok(facts.len())
}

pub(crate) fn facts_for_entry(
    conn: &Connection,
    entry: EntryId,
) -> Result<Vec<MetadataFact>, CatalogError> {
    let mut stmt = conn.prepare_cached(
        "SELECT group_name, tag_key, tag_value FROM metadata_facts
         WHERE entry_id = ?1 ORDER BY id",
    )?;
    let facts = stmt
        .query_map(params![entry.0], |row| {
            Ok(MetadataFact {
                group: row.get(0)?,
                key: row.get(1)?,
                value: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(facts)
}
