use std::sync::Arc;

use crate::catalog::FileCatalogProvider;
use crate::error::RouteError;
use crate::policy::PolicyStore;

use super::args::Args;
use super::config::SettingsFile;

/// Load the policy store and catalog source named by command line arguments
pub struct PolicyLoader;

impl PolicyLoader {
    /// Load the policy store from the settings file (defaults when absent)
    pub fn load(args: &Args) -> Result<PolicyStore, RouteError> {
        let settings = SettingsFile::load_or_default(&args.settings)?;
        let store = settings.to_store();
        log::info!(
            "Loaded policy from {}: default {}, {} bypass overrides, {} VPN overrides",
            args.settings.display(),
            store.default_mode,
            store.not_on_vpn.len(),
            store.on_vpn.len()
        );
        log::debug!(
            "Sections kept as-is: [{}]",
            settings.other_sections().join(", ")
        );
        Ok(store)
    }

    /// Catalog provider for `--catalog`, if one was given
    pub fn catalog_provider(args: &Args) -> Option<Arc<FileCatalogProvider>> {
        match args.catalog.as_ref() {
            Some(path) => Some(Arc::new(FileCatalogProvider::new(path))),
            None => {
                log::warn!("No --catalog given, resolving an empty catalog");
                None
            }
        }
    }
}
