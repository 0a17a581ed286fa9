use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

#[cfg(test)]
use mockall::automock;

use super::AppRecord;
use crate::{error::RouteError, format::FileFormat};

/// Source of installed-application snapshots
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync + 'static {
    async fn installed_apps(&self) -> Result<Vec<AppRecord>, RouteError>;
}

#[derive(Debug, Deserialize, Default)]
struct CatalogFile {
    #[serde(default, rename = "app")]
    apps: Vec<AppRecord>,
}

/// Catalog read from a TOML or JSON file listing `[[app]]` records
pub struct FileCatalogProvider {
    path: PathBuf,
}

impl FileCatalogProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn parse(&self, content: &str) -> Result<Vec<AppRecord>, RouteError> {
        let file: CatalogFile = match FileFormat::from_path(&self.path) {
            FileFormat::Toml => {
                toml::from_str(content).map_err(|source| RouteError::CatalogParse {
                    path: self.path.clone(),
                    source,
                })?
            }
            FileFormat::Json => {
                serde_json::from_str(content).map_err(|source| RouteError::CatalogParseJson {
                    path: self.path.clone(),
                    source,
                })?
            }
        };

        Ok(file.apps)
    }
}

#[async_trait]
impl CatalogProvider for FileCatalogProvider {
    async fn installed_apps(&self) -> Result<Vec<AppRecord>, RouteError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let apps = self.parse(&content)?;
        log::debug!("Loaded {} apps from {}", apps.len(), self.path.display());
        Ok(apps)
    }
}

/// Fetch the catalog, treating any enumeration failure as an empty catalog
pub async fn load_catalog_or_empty<P: CatalogProvider + ?Sized>(provider: &P) -> Vec<AppRecord> {
    match provider.installed_apps().await {
        Ok(apps) => apps,
        Err(err) => {
            log::warn!("Failed to enumerate installed apps, using empty catalog: {err}");
            Vec::new()
        }
    }
}
