use std::path::{Path, PathBuf};

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{cli::config::SettingsFile, error::RouteError, policy::PolicyStore};

/// Destination for policy store writes
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SettingsSink: Send + Sync + 'static {
    async fn persist(&self, store: &PolicyStore) -> Result<(), RouteError>;
}

/// Writes the allowlist section into a settings file, keeping the other sections
pub struct FileSettingsSink {
    path: PathBuf,
}

impl FileSettingsSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SettingsSink for FileSettingsSink {
    async fn persist(&self, store: &PolicyStore) -> Result<(), RouteError> {
        let path = self.path.clone();
        let store = store.clone();

        // Re-read so sections written by other components since load survive
        tokio::task::spawn_blocking(move || {
            let mut settings = SettingsFile::load_or_default(&path)?;
            settings.apply_store(&store);
            settings.save(&path)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DefaultMode;
    use std::fs;

    #[tokio::test]
    async fn persist_merges_into_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"watchDog": true, "allowlist": {"defaultMode": 0}}"#).unwrap();

        let mut store = PolicyStore::new(DefaultMode::NotOnVpn);
        store.on_vpn.insert("org.example.browser".to_string());

        FileSettingsSink::new(&path).persist(&store).await.unwrap();

        let settings = SettingsFile::load(&path).unwrap();
        assert_eq!(settings.to_store(), store);
        assert_eq!(settings.other_sections(), vec!["watchDog"]);
    }

    #[tokio::test]
    async fn persist_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let sink = FileSettingsSink::new(&path);

        sink.persist(&PolicyStore::new(DefaultMode::Intelligent))
            .await
            .unwrap();

        let store = SettingsFile::load(&path).unwrap().to_store();
        assert_eq!(store.default_mode, DefaultMode::Intelligent);
    }
}
