//! GPS coordinate canonicalization.

use tracing::debug;

use shoebox_catalog::{CatalogError, CatalogStore};
use shoebox_core::{GpsCoordinate, GpsId};

/// Resolve an observed coordinate to its canonical stored row.
///
/// The first observation of an identity creates the row. Later ones only
/// fill descriptive fields the stored row is still missing.
pub fn canonicalize(
    store: &impl CatalogStore,
    observed: &GpsCoordinate,
) -> Result<GpsId, CatalogError> {
    let (mut stored, inserted) = store.upsert_gps(observed)?;
    if !inserted && stored.enrich(observed) {
        debug!(id = ?stored.id, "enriching stored coordinate");
        store.update_gps_details(&stored)?;
    }
    stored
        .id
        .ok_or_else(|| CatalogError::corrupt("stored coordinate without id"))
}
