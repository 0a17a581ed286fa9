pub mod provider;
pub mod view;

use serde::{Deserialize, Serialize};

pub use provider::{CatalogProvider, FileCatalogProvider, load_catalog_or_empty};
pub use view::{ListEntry, visible_entries};

/// Snapshot of one installed application
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppRecord {
    /// Package identifier, unique within a catalog
    pub package: String,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Whether the application ships with the system image
    #[serde(default)]
    pub system: bool,
}

impl AppRecord {
    pub fn new(package: impl Into<String>, label: impl Into<String>, system: bool) -> Self {
        Self {
            package: package.into(),
            label: label.into(),
            system,
        }
    }

    /// Label to show, falling back to the package identifier
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.package
        } else {
            &self.label
        }
    }
}
