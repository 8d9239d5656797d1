//! Persisted application configuration.
//!
//! The config is a single JSON object holding the AddOns folder and the
//! provenance of every managed addon. It is always read and written whole.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::ConfigError;
use crate::tracker::ModRecord;

/// File name used for the config file.
pub const CONFIG_FILE_NAME: &str = "ezwow_config.json";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub addons_folder: Option<Utf8PathBuf>,
    /// Provenance records keyed by folder name.
    #[serde(default)]
    pub installed: BTreeMap<String, ModRecord>,
}

/// Owner of the persisted config.
///
/// `load` returns the default config when nothing has been saved yet.
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<AppConfig, ConfigError>;
    fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;
}

/// Loads the config, falling back to defaults if it cannot be read or parsed.
pub fn load_or_default(store: &dyn ConfigStore) -> AppConfig {
    match store.load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring unreadable config: {}", e);
            AppConfig::default()
        }
    }
}

/// [`ConfigStore`] backed by a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: Utf8PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Result<AppConfig, ConfigError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(AppConfig::default()),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(config)?;
        replace_file(&self.path, |file| file.write_all(&data)).map_err(|e| self.io_error(e))
    }
}

/// Replaces `path` with the output of `write`.
///
/// The content goes to a temp file next to `path`, which is then renamed over
/// it. If `write` fails the temp file is discarded and `path` is untouched.
fn replace_file(
    path: &Utf8Path,
    write: impl FnOnce(&mut NamedTempFile) -> io::Result<()>,
) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    write(&mut file)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// [`ConfigStore`] kept in memory, for embedding hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Mutex<AppConfig>,
}

impl MemoryConfigStore {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AppConfig> {
        self.config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<AppConfig, ConfigError> {
        Ok(self.lock().clone())
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        *self.lock() = config.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::VersionMarker;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> JsonConfigStore {
        let path = Utf8PathBuf::from_path_buf(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        JsonConfigStore::new(path)
    }

    #[test]
    fn test_missing_file_loads_default() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        assert_eq!(store.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error_but_load_or_default_recovers() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        fs::write(store.path(), b"{ not json").unwrap();

        assert!(matches!(store.load(), Err(ConfigError::Json(_))));
        assert_eq!(load_or_default(&store), AppConfig::default());
    }

    #[test]
    fn test_legacy_folder_only_config_loads() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        fs::write(store.path(), br#"{"addons_folder": "C:/Games/Turtle WoW/Interface/AddOns"}"#)
            .unwrap();

        let config = store.load().unwrap();
        assert_eq!(
            config.addons_folder.as_deref().map(|p| p.as_str()),
            Some("C:/Games/Turtle WoW/Interface/AddOns")
        );
        assert!(config.installed.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);

        let mut config = AppConfig {
            addons_folder: Some(Utf8PathBuf::from("/games/AddOns")),
            ..Default::default()
        };
        config.installed.insert(
            "pfQuest".to_string(),
            ModRecord {
                reference: "https://github.com/shagu/pfQuest".to_string(),
                version: VersionMarker::Branch {
                    branch: "master".to_string(),
                    commit: Some("abc".to_string()),
                },
            },
        );

        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap(), config);

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw["installed"]["pfQuest"]["kind"], "branch");
        assert_eq!(raw["installed"]["pfQuest"]["commit"], "abc");
    }

    #[test]
    fn test_interrupted_write_keeps_previous_config() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let config = AppConfig {
            addons_folder: Some(Utf8PathBuf::from("/games/AddOns")),
            ..Default::default()
        };
        store.save(&config).unwrap();

        let result = replace_file(store.path(), |file| {
            file.write_all(br#"{"addons_folder": "/ga"#)?;
            Err(io::Error::other("disk full"))
        });

        assert!(result.is_err());
        assert_eq!(store.load().unwrap(), config);
        let leftovers = fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_save_creates_missing_parent() {
        let temp = tempdir().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let store = JsonConfigStore::new(dir.join("nested").join(CONFIG_FILE_NAME));

        store.save(&AppConfig::default()).unwrap();
        assert_eq!(store.load().unwrap(), AppConfig::default());
    }
}
