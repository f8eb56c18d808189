//! Catalog handle and its transaction scopes.

use std::path::Path;

use rusqlite::{Connection, Savepoint, Transaction};
use tracing::debug;

use crate::error::CatalogError;
use crate::schema;
use crate::store::CatalogStore;

/// SQLite-backed catalog.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    /// Open or create a catalog at `path` in WAL mode.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| CatalogError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::initialize(&conn)?;
        debug!(path = %path.display(), "catalog opened");
        Ok(Self { conn })
    }

    /// Open an in-memory catalog.
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Start a unit of work. Nothing it writes is visible until
    /// [`UnitOfWork::commit`]; dropping it rolls back.
    pub fn begin(&mut self) -> Result<UnitOfWork<'_>, CatalogError> {
        Ok(UnitOfWork {
            tx: self.conn.transaction()?,
        })
    }
}

impl CatalogStore for Catalog {
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// One top-level transaction, e.g. one leaf directory.
pub struct UnitOfWork<'c> {
    tx: Transaction<'c>,
}

impl UnitOfWork<'_> {
    /// Open a nested scope whose writes can be undone on their own.
    pub fn file_scope(&mut self) -> Result<FileScope<'_>, CatalogError> {
        Ok(FileScope {
            sp: self.tx.savepoint()?,
        })
    }

    pub fn commit(self) -> Result<(), CatalogError> {
        self.tx.commit()?;
        Ok(())
    }

    pub fn rollback(self) -> Result<(), CatalogError> {
        self.tx.rollback()?;
        Ok(())
    }
}

impl CatalogStore for UnitOfWork<'_> {
    fn conn(&self) -> &Connection {
        &self.tx
    }
}

/// Savepoint for one file. Dropping it without [`FileScope::commit`]
/// discards the file's writes and keeps the rest of the unit of work.
pub struct FileScope<'u> {
    sp: Savepoint<'u>,
}

impl FileScope<'_> {
    pub fn commit(self) -> Result<(), CatalogError> {
        self.sp.commit()?;
        Ok(())
    }
}

impl CatalogStore for FileScope<'_> {
    fn conn(&self) -> &Connection {
        &self.sp
    }
}
