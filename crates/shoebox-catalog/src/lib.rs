//! SQLite catalog storage for shoebox.
//!
//! # Overview
//!
//! A [`Catalog`] owns one SQLite connection. Work is grouped into a
//! [`UnitOfWork`] (one transaction, e.g. one leaf directory) with nested
//! [`FileScope`] savepoints so a single file's writes can be discarded
//! without losing its neighbours. All three implement [`CatalogStore`],
//! which carries the keyed operations:
//!
//! - entries with their per-category detail rows
//! - file groups
//! - canonical GPS coordinates
//! - tags, tag links and flattened metadata facts
//! - export records
//!
//! Find-or-create operations are single `INSERT ... ON CONFLICT DO NOTHING`
//! statements followed by a lookup.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use shoebox_catalog::{Catalog, CatalogStore};
//!
//! let mut catalog = Catalog::open(Path::new("/var/lib/shoebox/shoebox.db")).unwrap();
//! let uow = catalog.begin().unwrap();
//! let group = uow.find_or_create_group("/2024/lapland", "lapland").unwrap();
//! uow.commit().unwrap();
//! println!("group {}", group.id);
//! ```

mod catalog;
mod details;
mod entries;
mod error;
mod exports;
mod gps;
mod groups;
pub mod schema;
mod store;
mod tags;

pub use catalog::{Catalog, FileScope, UnitOfWork};
pub use error::CatalogError;
pub use store::CatalogStore;
