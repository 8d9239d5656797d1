//! Core logic for the EZWow addon manager.
//!
//! Turns a GitHub repository or archive URL into an installed addon folder:
//!
//! 1. [`resolve`] the reference into an [`InstallPlan`] (release, branch or
//!    direct archive)
//! 2. download it with an [`ArchiveFetcher`]
//! 3. [`install_archive`] into `<AddOns>/<folder>`, stripping the wrapper
//!    directory GitHub puts around source archives
//! 4. remember where it came from in the [`InstalledSet`] so that
//!    [`check_for_update`] can tell when upstream moved on
//!
//! [`AddonManager`] ties these steps together. The CLI in the `ezwow` crate is
//! a thin front end over it.

mod addons_path;
mod checker;
mod config;
pub mod error;
mod extract;
mod fetch;
mod github;
mod manager;
mod recommended;
mod reference;
mod resolver;
mod tracker;

#[cfg(test)]
mod test_utils;

pub use addons_path::{auto_detect_addons_folder, is_valid_addons_folder};
pub use checker::{check_for_update, UpdateStatus};
pub use config::{
    load_or_default, AppConfig, ConfigStore, JsonConfigStore, MemoryConfigStore, CONFIG_FILE_NAME,
};
pub use error::{ApiError, ConfigError, Error, ExtractionError, Result};
pub use extract::{install_archive, validate_folder_name};
pub use fetch::{ArchiveFetcher, HttpFetcher};
pub use github::{GithubClient, HostingApi, Release, ReleaseAsset};
pub use manager::{
    list_installed, uninstall, AddonEntry, AddonManager, Confirm, InstallOutcome, InstalledAddon,
    UninstallOutcome, UpdateOutcome,
};
pub use recommended::{find_recommended, RecommendedAddon, RECOMMENDED_ADDONS};
pub use reference::{is_archive_url, parse_reference, parse_repository, AddonReference, RepoRef};
pub use resolver::{resolve, InstallPlan, VersionMarker, FALLBACK_BRANCH};
pub use tracker::{InstalledSet, ModRecord};
