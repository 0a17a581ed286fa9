use std::collections::HashSet;

use serde::Serialize;

use super::AppRecord;
use crate::policy::{PolicyStore, Resolution, Route};

/// One row of the application listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub package: String,
    pub label: String,
    pub system: bool,
    pub route: Route,
}

/// Applications to present for editing, sorted by label
///
/// The host package never appears. System applications are hidden unless
/// the store asks to show them. Routes come from `resolution`; records the
/// resolution does not know about are skipped.
pub fn visible_entries(
    catalog: &[AppRecord],
    store: &PolicyStore,
    resolution: &Resolution,
    host_package: &str,
) -> Vec<ListEntry> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(catalog.len());

    let mut entries: Vec<ListEntry> = catalog
        .iter()
        .filter(|record| record.package != host_package)
        .filter(|record| store.show_system_apps || !record.system)
        .filter(|&record| seen.insert(record.package.as_str()))
        .filter_map(|record| {
            let route = resolution.route_of(&record.package)?;
            Some(ListEntry {
                package: record.package.clone(),
                label: record.display_label().to_string(),
                system: record.system,
                route,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        a.label
            .to_lowercase()
            .cmp(&b.label.to_lowercase())
            .then_with(|| a.package.cmp(&b.package))
    });

    entries
}
