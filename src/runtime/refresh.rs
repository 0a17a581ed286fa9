use std::sync::Arc;

use super::controller::{Listing, PolicyHandle};
use crate::{
    catalog::{AppRecord, CatalogProvider, load_catalog_or_empty},
    error::RouteError,
    policy::Resolution,
};

/// Enumerate the catalog on its own task
///
/// A panicking or cancelled enumeration is treated like a failed one: the
/// result is an empty catalog and the caller may simply retry.
pub async fn fetch_catalog<P: CatalogProvider>(provider: Arc<P>) -> Vec<AppRecord> {
    let task = tokio::spawn(async move { load_catalog_or_empty(provider.as_ref()).await });

    match task.await {
        Ok(apps) => apps,
        Err(err) => {
            log::warn!("Catalog enumeration aborted, using empty catalog: {err}");
            Vec::new()
        }
    }
}

/// Fresh catalog snapshot resolved against the current store
pub async fn refresh_resolution<P: CatalogProvider>(
    handle: &PolicyHandle,
    provider: Arc<P>,
) -> Result<Resolution, RouteError> {
    let catalog = fetch_catalog(provider).await;
    handle.resolve(catalog).await
}

/// Fresh catalog snapshot turned into the presented listing
pub async fn refresh_listing<P: CatalogProvider>(
    handle: &PolicyHandle,
    provider: Arc<P>,
) -> Result<Listing, RouteError> {
    let catalog = fetch_catalog(provider).await;
    handle.listing(catalog).await
}
