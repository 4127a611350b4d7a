//! Idempotent setup of the store catalog.

use super::measurand::{Measurand, SOURCE_CODE, SOURCE_DESCRIPTION};
use crate::Result;
use crate::store::Store;
use std::path::Path;
use strum::IntoEnumIterator;

const LOG_TARGET: &str = " bootstrap";

/// Open the store at `store_location` for writing, creating it first if needed.
///
/// A new store gets the data source registered. Every measurand is then made sure to exist, so
/// calling this against an already complete store changes nothing.
pub async fn ensure_catalog(store_location: impl AsRef<Path>) -> Result<Store> {
    let store_location = store_location.as_ref();

    let (mut store, created) = Store::open_or_create(store_location).await?;
    if created {
        log::info!(target: LOG_TARGET, "Registering source {SOURCE_CODE} in new store at '{}'", store_location.display());
        let _ = store.add_source(SOURCE_CODE, SOURCE_DESCRIPTION)?;
    }

    for measurand in Measurand::iter() {
        let _ = ensure_measurand(&mut store, measurand)?;
    }

    Ok(store)
}

/// Register a measurand unless it already is; returns whether it was created
pub fn ensure_measurand(store: &mut Store, measurand: Measurand) -> Result<bool> {
    let created = store.add_measurand(measurand.code(), measurand.name(), measurand.description())?;
    if created {
        log::info!(target: LOG_TARGET, "Registered measurand {} ({})", measurand.code(), measurand.name());
    }

    Ok(created)
}
