use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::RouteError,
    format::FileFormat,
    policy::{DefaultMode, PolicyStore},
};

const ALLOWLIST_SECTION: &str = "allowlist";

/// Settings file as stored on disk
///
/// Only the `allowlist` section is interpreted. The whole document is kept
/// in its on-disk representation, so rewriting the file leaves every other
/// section (and unknown keys inside `allowlist`) exactly as they were.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsFile {
    pub allowlist: AllowlistConfig,
    document: Document,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AllowlistConfig {
    /// Show system applications in listings
    #[serde(default)]
    pub show_system_apps: bool,
    /// Integer-encoded default mode (0 = on VPN, 1 = not on VPN, 2 = intelligent)
    #[serde(default)]
    pub default_mode: DefaultMode,
    /// Packages forced to bypass the VPN
    #[serde(default)]
    pub items: Vec<String>,
    /// Packages forced through the VPN
    #[serde(default)]
    pub items_on_vpn: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Document {
    Toml(toml::Table),
    Json(Map<String, Value>),
}

impl Default for Document {
    fn default() -> Self {
        Self::Json(Map::new())
    }
}

impl SettingsFile {
    /// Load settings file
    pub fn load(path: &Path) -> Result<Self, RouteError> {
        let content = fs::read_to_string(path)?;
        match FileFormat::from_path(path) {
            FileFormat::Toml => {
                Self::from_toml(&content).map_err(|source| RouteError::SettingsParse {
                    path: PathBuf::from(path),
                    source,
                })
            }
            FileFormat::Json => {
                Self::from_json(&content).map_err(|source| RouteError::SettingsParseJson {
                    path: PathBuf::from(path),
                    source,
                })
            }
        }
    }

    fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = toml::from_str(content)?;
        let allowlist: AllowlistConfig = match table.get(ALLOWLIST_SECTION) {
            Some(section) => section.clone().try_into()?,
            None => AllowlistConfig::default(),
        };
        Ok(Self {
            allowlist,
            document: Document::Toml(table),
        })
    }

    fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let map: Map<String, Value> = serde_json::from_str(content)?;
        let allowlist: AllowlistConfig = match map.get(ALLOWLIST_SECTION) {
            Some(section) => serde_json::from_value(section.clone())?,
            None => AllowlistConfig::default(),
        };
        Ok(Self {
            allowlist,
            document: Document::Json(map),
        })
    }

    /// Load settings file, falling back to defaults when it does not exist yet
    pub fn load_or_default(path: &Path) -> Result<Self, RouteError> {
        if !path.exists() {
            log::info!(
                "Settings file {} not found, starting from defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Names of the top-level sections carried through untouched
    pub fn other_sections(&self) -> Vec<&str> {
        let mut names: Vec<&str> = match &self.document {
            Document::Toml(table) => table.keys().map(String::as_str).collect(),
            Document::Json(map) => map.keys().map(String::as_str).collect(),
        };
        names.retain(|name| *name != ALLOWLIST_SECTION);
        names.sort_unstable();
        names
    }

    /// Build the in-memory policy store from the allowlist section
    pub fn to_store(&self) -> PolicyStore {
        let store = PolicyStore {
            default_mode: self.allowlist.default_mode,
            show_system_apps: self.allowlist.show_system_apps,
            not_on_vpn: self.allowlist.items.iter().cloned().collect(),
            on_vpn: self.allowlist.items_on_vpn.iter().cloned().collect(),
        };

        let overlap = store.overlapping_overrides();
        if !overlap.is_empty() {
            log::warn!(
                "Packages overridden both on and off the VPN, bypass wins: {}",
                overlap.join(", ")
            );
        }

        store
    }

    /// Replace the allowlist section with the contents of `store`
    pub fn apply_store(&mut self, store: &PolicyStore) {
        let mut items: Vec<String> = store.not_on_vpn.iter().cloned().collect();
        let mut items_on_vpn: Vec<String> = store.on_vpn.iter().cloned().collect();
        items.sort();
        items_on_vpn.sort();

        self.allowlist.show_system_apps = store.show_system_apps;
        self.allowlist.default_mode = store.default_mode;
        self.allowlist.items = items;
        self.allowlist.items_on_vpn = items_on_vpn;
    }

    fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let mut table = match &self.document {
            Document::Toml(table) => table.clone(),
            Document::Json(map) => match toml::Value::try_from(map)? {
                toml::Value::Table(table) => table,
                _ => toml::Table::new(),
            },
        };
        let fields = match toml::Value::try_from(&self.allowlist)? {
            toml::Value::Table(fields) => fields,
            _ => toml::Table::new(),
        };

        let section = table
            .entry(ALLOWLIST_SECTION)
            .or_insert(toml::Value::Table(toml::Table::new()));
        match section {
            toml::Value::Table(existing) => {
                for (key, value) in fields {
                    existing.insert(key, value);
                }
            }
            other => *other = toml::Value::Table(fields),
        }

        toml::to_string_pretty(&table)
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut map = match &self.document {
            Document::Json(map) => map.clone(),
            Document::Toml(table) => match serde_json::to_value(table)? {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        };
        let fields = match serde_json::to_value(&self.allowlist)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };

        let section = map
            .entry(ALLOWLIST_SECTION)
            .or_insert_with(|| Value::Object(Map::new()));
        match section {
            Value::Object(existing) => existing.extend(fields),
            other => *other = Value::Object(fields),
        }

        serde_json::to_string_pretty(&map)
    }

    /// Write settings file atomically (temporary sibling file, then rename)
    pub fn save(&self, path: &Path) -> Result<(), RouteError> {
        let content = match FileFormat::from_path(path) {
            FileFormat::Toml => self.to_toml().map_err(|source| RouteError::SettingsSerialize {
                path: PathBuf::from(path),
                source,
            })?,
            FileFormat::Json => {
                self.to_json()
                    .map_err(|source| RouteError::SettingsSerializeJson {
                        path: PathBuf::from(path),
                        source,
                    })?
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, content)?;
        if let Err(err) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        log::debug!("Settings written to {}", path.display());
        Ok(())
    }
}
