//! Installed-set tracking.
//!
//! The folder on disk is the source of truth for whether an addon is present;
//! the records kept here only remember where a folder came from so it can be
//! checked for updates later.

use std::collections::BTreeMap;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::config::{load_or_default, ConfigStore};
use crate::error::ConfigError;
use crate::resolver::VersionMarker;

/// Provenance of an installed addon folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModRecord {
    /// The reference the addon was installed from.
    pub reference: String,
    #[serde(flatten)]
    pub version: VersionMarker,
}

/// Folder-name keyed view over the records in a [`ConfigStore`].
///
/// Every mutation reloads the whole config and writes it back immediately.
pub struct InstalledSet<'a> {
    store: &'a dyn ConfigStore,
}

impl<'a> InstalledSet<'a> {
    pub fn new(store: &'a dyn ConfigStore) -> Self {
        Self { store }
    }

    /// Insert or replace the record for `folder_name`.
    pub fn record(
        &self,
        folder_name: &str,
        reference: &str,
        version: VersionMarker,
    ) -> Result<(), ConfigError> {
        let mut config = load_or_default(self.store);
        config.installed.insert(
            folder_name.to_string(),
            ModRecord {
                reference: reference.to_string(),
                version,
            },
        );
        self.store.save(&config)
    }

    /// Drop the record for `folder_name`. Does nothing if there is none.
    pub fn remove(&self, folder_name: &str) -> Result<(), ConfigError> {
        let mut config = load_or_default(self.store);
        if config.installed.remove(folder_name).is_none() {
            return Ok(());
        }
        self.store.save(&config)
    }

    /// The record for `folder_name`, or `None` if the folder is unmanaged.
    pub fn get(&self, folder_name: &str) -> Option<ModRecord> {
        load_or_default(self.store).installed.remove(folder_name)
    }

    pub fn records(&self) -> BTreeMap<String, ModRecord> {
        load_or_default(self.store).installed
    }

    /// Folder names that have a record but no directory under `root`.
    pub fn orphans(&self, root: &Utf8Path) -> Vec<String> {
        self.records()
            .into_keys()
            .filter(|name| !root.join(name).is_dir())
            .collect()
    }
}
