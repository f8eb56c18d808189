//! File groups.

use chrono::Utc;
use rusqlite::{Connection, params};

use shoebox_core::{FileGroup, GroupId, GroupSummary};

use crate::error::CatalogError;

/// Find the group for a directory, creating it on first use.
pub(crate) fn find_or_create(
    conn: &Connection,
    path: &str,
    name: &str,
) -> Result<FileGroup, CatalogError> {
    conn.execute(
        "INSERT INTO file_groups (path, name, created) VALUES (?1, ?2, ?3)
         ON CONFLICT(path, name) DO NOTHING",
        params![path, name, Utc::now()],
    )?;
    let group = conn.query_row(
        "SELECT id, path, name, created FROM file_groups WHERE path = ?1 AND name = ?2",
        params![path, name],
        |row| {
            Ok(FileGroup {
                id: GroupId(row.get(0)?),
                path: row.get(1)?,
                name: row.get(2)?,
                created: row.get(3)?,
            })
        },
    )?;
    Ok(group)
}

/// Every group with its entry count, ordered by path.
pub(crate) fn list(conn: &Connection) -> Result<Vec<GroupSummary>, CatalogError> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.path, g.name, g.created, COUNT(e.id)
         FROM file_groups g LEFT JOIN entries e ON e.group_id = g.id
         GROUP BY g.id ORDER BY g.path, g.name",
    )?;
    let groups = stmt
        .query_map([], |row| {
            Ok(GroupSummary {
                group: FileGroup {
                    id: GroupId(row.get(0)?),
                    path: row.get(1)?,
                    name: row.get(2)?,
                    created: row.get(3)?,
                },
                entry_count: row.get::<_, i64>(4)? as u64,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(groups)
}
