mod config;
mod install;
mod list;
mod remove;
mod update;

pub use config::*;
pub use install::*;
pub use list::*;
pub use remove::*;
pub use update::*;

use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::default_config_path;
use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use ezwow_core::{
    is_valid_addons_folder, load_or_default, ConfigStore, GithubClient, HttpFetcher,
    JsonConfigStore,
};

/// State shared by every command: the config file and the AddOns folder
/// override from the command line.
pub struct Context {
    store: JsonConfigStore,
    addons_folder: Option<Utf8PathBuf>,
}

impl Context {
    pub fn new(config_path: Option<Utf8PathBuf>, addons_folder: Option<Utf8PathBuf>) -> Self {
        let path = config_path.unwrap_or_else(default_config_path);
        tracing::debug!("Using config file {}", path);
        Self {
            store: JsonConfigStore::new(path),
            addons_folder,
        }
    }

    pub fn store(&self) -> &JsonConfigStore {
        &self.store
    }

    pub fn config_path(&self) -> &Utf8Path {
        self.store.path()
    }

    /// Resolve the AddOns folder: the `--addons-folder` flag, then the
    /// configured folder, then auto-detection (which is saved on success).
    pub fn addons_folder(&self) -> Result<Utf8PathBuf, CliError> {
        self.resolve_addons_folder(ezwow_core::auto_detect_addons_folder)
    }

    fn resolve_addons_folder(
        &self,
        detect: impl FnOnce() -> Option<Utf8PathBuf>,
    ) -> Result<Utf8PathBuf, CliError> {
        if let Some(path) = &self.addons_folder {
            return existing_folder(path.clone());
        }

        let mut cfg = load_or_default(&self.store);
        if let Some(path) = cfg.addons_folder {
            return existing_folder(path);
        }

        let detected = detect().ok_or(CliError::AddonsFolderNotSet)?;
        println_pad!(
            "{} {}",
            "Detected AddOns folder:".bright_cyan(),
            detected.as_str().bright_green()
        );

        cfg.addons_folder = Some(detected.clone());
        if let Err(e) = self.store.save(&cfg) {
            tracing::warn!("Could not save detected AddOns folder: {}", e);
        }
        Ok(detected)
    }

    /// The GitHub API client and archive fetcher used by the install pipeline.
    pub fn clients(&self) -> Result<(GithubClient, HttpFetcher), CliError> {
        let api = GithubClient::new().map_err(CliError::http_client)?;
        let fetcher = HttpFetcher::new().map_err(CliError::http_client)?;
        Ok((api, fetcher))
    }
}

fn existing_folder(path: Utf8PathBuf) -> Result<Utf8PathBuf, CliError> {
    if is_valid_addons_folder(&path) {
        Ok(path)
    } else {
        Err(CliError::AddonsFolderMissing { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezwow_core::AppConfig;
    use tempfile::tempdir;

    fn utf8(path: &std::path::Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
    }

    #[test]
    fn test_flag_wins_over_config() {
        let temp = tempdir().unwrap();
        let root = utf8(temp.path());
        let flag_dir = root.join("flag");
        let cfg_dir = root.join("cfg");
        std::fs::create_dir(&flag_dir).unwrap();
        std::fs::create_dir(&cfg_dir).unwrap();

        let ctx = Context::new(Some(root.join("ezwow_config.json")), Some(flag_dir.clone()));
        ctx.store()
            .save(&AppConfig {
                addons_folder: Some(cfg_dir),
                ..Default::default()
            })
            .unwrap();

        let resolved = ctx.resolve_addons_folder(|| panic!("detection must not run")).unwrap();
        assert_eq!(resolved, flag_dir);
    }

    #[test]
    fn test_missing_configured_folder_is_an_error() {
        let temp = tempdir().unwrap();
        let root = utf8(temp.path());
        let ctx = Context::new(Some(root.join("ezwow_config.json")), None);
        ctx.store()
            .save(&AppConfig {
                addons_folder: Some(root.join("gone")),
                ..Default::default()
            })
            .unwrap();

        let result = ctx.resolve_addons_folder(|| None);
        assert!(matches!(result, Err(CliError::AddonsFolderMissing { .. })));
    }

    #[test]
    fn test_detected_folder_is_saved() {
        let temp = tempdir().unwrap();
        let root = utf8(temp.path());
        let ctx = Context::new(Some(root.join("ezwow_config.json")), None);

        let resolved = ctx.resolve_addons_folder(|| Some(root.clone())).unwrap();

        assert_eq!(resolved, root);
        assert_eq!(ctx.store().load().unwrap().addons_folder, Some(root));
    }

    #[test]
    fn test_nothing_configured_or_detected() {
        let temp = tempdir().unwrap();
        let ctx = Context::new(Some(utf8(temp.path()).join("ezwow_config.json")), None);

        let result = ctx.resolve_addons_folder(|| None);
        assert!(matches!(result, Err(CliError::AddonsFolderNotSet)));
    }
}
