//! Keyed catalog operations.

use rusqlite::Connection;
use rust_decimal::Decimal;

use shoebox_core::{
    CatalogEntry, EntryId, ExportId, ExportRecord, FileGroup, GpsCoordinate, GroupId,
    GroupSummary, MetadataFact, Tag, TagId,
};

use crate::error::CatalogError;
use crate::{entries, exports, gps, groups, tags};

/// Every read and write the ingestion pipeline performs.
///
/// Implemented for the catalog itself, for an open directory transaction
/// and for a per-file savepoint, so the same calls work at every level.
pub trait CatalogStore {
    /// Connection (or transaction) the operations run against.
    fn conn(&self) -> &Connection;

    // ── Entries ──────────────────────────────────────────────────────

    fn get_entry(&self, id: EntryId) -> Result<Option<CatalogEntry>, CatalogError> {
        entries::get(self.conn(), id)
    }

    fn find_entry_by_location(
        &self,
        file_path: &str,
        filename: &str,
    ) -> Result<Option<CatalogEntry>, CatalogError> {
        entries::find_by_location(self.conn(), file_path, filename)
    }

    fn find_entry_by_document_id(
        &self,
        document_id: &str,
    ) -> Result<Option<CatalogEntry>, CatalogError> {
        entries::find_by_document_id(self.conn(), document_id)
    }

    fn insert_entry(&self, entry: &CatalogEntry) -> Result<EntryId, CatalogError> {
        entries::insert(self.conn(), entry)
    }

    fn delete_entry(&self, id: EntryId) -> Result<bool, CatalogError> {
        entries::delete(self.conn(), id)
    }

    fn count_entries(&self) -> Result<u64, CatalogError> {
        entries::count(self.conn())
    }

    /// Highest ACL id handed out so far.
    fn max_acl_id(&self) -> Result<Option<i64>, CatalogError> {
        entries::max_acl_id(self.conn())
    }

    // ── Groups ───────────────────────────────────────────────────────

    fn find_or_create_group(&self, path: &str, name: &str) -> Result<FileGroup, CatalogError> {
        groups::find_or_create(self.conn(), path, name)
    }

    fn group_entries(&self, group: GroupId) -> Result<Vec<CatalogEntry>, CatalogError> {
        entries::in_group(self.conn(), group)
    }

    fn list_groups(&self) -> Result<Vec<GroupSummary>, CatalogError> {
        groups::list(self.conn())
    }

    // ── GPS ──────────────────────────────────────────────────────────

    fn find_gps(
        &self,
        latitude: Decimal,
        latitude_ref: &str,
        longitude: Decimal,
        longitude_ref: &str,
    ) -> Result<Option<GpsCoordinate>, CatalogError> {
        gps::find(self.conn(), latitude, latitude_ref, longitude, longitude_ref)
    }

    /// Stored coordinate for the observation's identity, and whether it
    /// was created by this call.
    fn upsert_gps(&self, coordinate: &GpsCoordinate) -> Result<(GpsCoordinate, bool), CatalogError> {
        gps::upsert(self.conn(), coordinate)
    }

    fn update_gps_details(&self, coordinate: &GpsCoordinate) -> Result<(), CatalogError> {
        gps::update_details(self.conn(), coordinate)
    }

    fn count_gps(&self) -> Result<u64, CatalogError> {
        gps::count(self.conn())
    }

    // ── Tags and facts ───────────────────────────────────────────────

    fn upsert_tag(&self, name: &str) -> Result<Tag, CatalogError> {
        tags::upsert(self.conn(), name)
    }

    fn link_tag(&self, entry: EntryId, tag: TagId) -> Result<bool, CatalogError> {
        tags::link(self.conn(), entry, tag)
    }

    fn entry_tags(&self, entry: EntryId) -> Result<Vec<String>, CatalogError> {
        tags::for_entry(self.conn(), entry)
    }

    fn insert_facts(&self, entry: EntryId, facts: &[MetadataFact]) -> Result<usize, CatalogError> {
        tags::insert_facts(self.conn(), entry, facts)
    }

    fn entry_facts(&self, entry: EntryId) -> Result<Vec<MetadataFact>, CatalogError> {
        tags::facts_for_entry(self.conn(), entry)
    }

    // ── Exports ──────────────────────────────────────────────────────

    fn find_export_by_location(
        &self,
        file_path: &str,
        filename: &str,
    ) -> Result<Option<ExportRecord>, CatalogError> {
        exports::find_by_location(self.conn(), file_path, filename)
    }

    fn find_export_by_document_id(
        &self,
        document_id: &str,
    ) -> Result<Option<ExportRecord>, CatalogError> {
        exports::find_by_document_id(self.conn(), document_id)
    }

    fn insert_export(&self, record: &ExportRecord) -> Result<ExportId, CatalogError> {
        exports::insert(self.conn(), record)
    }

    fn delete_export(&self, id: ExportId) -> Result<bool, CatalogError> {
        exports::delete(self.conn(), id)
    }

    fn entry_exports(&self, entry: EntryId) -> Result<Vec<ExportRecord>, CatalogError> {
        exports::for_entry(self.conn(), entry)
    }
}
