//! The install, update and uninstall pipeline.
//!
//! Each operation runs to completion on the calling thread. Callers are
//! expected to serialize operations that target the same AddOns folder.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::checker::{check_for_update, UpdateStatus};
use crate::config::ConfigStore;
use crate::error::{Error, Result};
use crate::extract::{install_archive, validate_folder_name};
use crate::fetch::ArchiveFetcher;
use crate::github::HostingApi;
use crate::resolver::{resolve, VersionMarker};
use crate::tracker::{InstalledSet, ModRecord};

/// Asked before an existing folder is overwritten or deleted. Receives the
/// folder name; returning `false` aborts the operation.
pub type Confirm<'c> = &'c mut dyn FnMut(&str) -> bool;

/// A freshly installed addon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledAddon {
    pub folder_name: String,
    pub path: Utf8PathBuf,
    pub version: VersionMarker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(InstalledAddon),
    /// The user declined to overwrite the existing folder.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate,
    Updated {
        status: UpdateStatus,
        addon: InstalledAddon,
    },
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    Removed,
    Cancelled,
}

/// An addon folder found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonEntry {
    pub folder_name: String,
    /// `None` for folders installed by other means.
    pub record: Option<ModRecord>,
}

impl AddonEntry {
    pub fn is_managed(&self) -> bool {
        self.record.is_some()
    }
}

/// Runs the resolve, fetch, extract and record steps against a hosting API
/// and an archive fetcher.
#[derive(Clone, Copy)]
pub struct AddonManager<'a> {
    api: &'a dyn HostingApi,
    fetcher: &'a dyn ArchiveFetcher,
}

impl<'a> AddonManager<'a> {
    pub fn new(api: &'a dyn HostingApi, fetcher: &'a dyn ArchiveFetcher) -> Self {
        Self { api, fetcher }
    }

    /// Install an addon from `reference` into `root`.
    ///
    /// The folder name defaults to the project name of the reference.
    /// `confirm` is only consulted when the folder already exists.
    pub fn install(
        &self,
        store: &dyn ConfigStore,
        root: &Utf8Path,
        reference: &str,
        folder_name: Option<&str>,
        confirm: Confirm<'_>,
    ) -> Result<InstallOutcome> {
        ensure_root(root)?;

        let plan = resolve(self.api, reference)?;
        let folder_name = folder_name
            .map(str::to_string)
            .or(plan.folder_name)
            .ok_or_else(|| Error::MissingFolderName(reference.trim().to_string()))?;
        validate_folder_name(&folder_name)?;

        if root.join(&folder_name).exists() && !confirm(&folder_name) {
            tracing::info!("Overwrite of {} declined", folder_name);
            return Ok(InstallOutcome::Cancelled);
        }

        let bytes = self.fetcher.fetch(&plan.archive_url)?;
        let path = install_archive(&bytes, root, &folder_name)?;

        if let Err(e) =
            InstalledSet::new(store).record(&folder_name, reference.trim(), plan.version.clone())
        {
            tracing::warn!("Installed {} but could not record it: {}", folder_name, e);
        }

        tracing::info!("Installed {} ({})", folder_name, plan.version);
        Ok(InstallOutcome::Installed(InstalledAddon {
            folder_name,
            path,
            version: plan.version,
        }))
    }

    /// Check a managed addon for updates without installing anything.
    pub fn check(
        &self,
        store: &dyn ConfigStore,
        root: &Utf8Path,
        folder_name: &str,
    ) -> Result<UpdateStatus> {
        let record = managed_record(store, root, folder_name)?;
        Ok(check_for_update(self.api, &record))
    }

    /// Reinstall a managed addon from its stored reference unless it is up to date.
    ///
    /// A failed update check counts as stale, so the addon is reinstalled. When
    /// the reinstall cannot tell which commit it got (branch archive links), the
    /// head commit seen by the check is recorded instead.
    pub fn update(
        &self,
        store: &dyn ConfigStore,
        root: &Utf8Path,
        folder_name: &str,
        confirm: Confirm<'_>,
    ) -> Result<UpdateOutcome> {
        let record = managed_record(store, root, folder_name)?;
        let status = check_for_update(self.api, &record);
        if !status.needs_reinstall() {
            tracing::info!("{} is up to date", folder_name);
            return Ok(UpdateOutcome::UpToDate);
        }

        tracing::info!("Updating {}: {}", folder_name, status);
        let mut addon =
            match self.install(store, root, &record.reference, Some(folder_name), confirm)? {
                InstallOutcome::Installed(addon) => addon,
                InstallOutcome::Cancelled => return Ok(UpdateOutcome::Cancelled),
            };

        if let UpdateStatus::UpdateAvailable(latest) = &status {
            if adopts_checked_commit(&addon.version, latest) {
                addon.version = latest.clone();
                if let Err(e) =
                    InstalledSet::new(store).record(folder_name, &record.reference, latest.clone())
                {
                    tracing::warn!("Updated {} but could not record it: {}", folder_name, e);
                }
            }
        }

        Ok(UpdateOutcome::Updated { status, addon })
    }
}

/// Delete an addon folder and forget its record.
///
/// Unmanaged folders can be removed too. A record whose folder is already gone
/// is dropped without asking.
pub fn uninstall(
    store: &dyn ConfigStore,
    root: &Utf8Path,
    folder_name: &str,
    confirm: Confirm<'_>,
) -> Result<UninstallOutcome> {
    validate_folder_name(folder_name)?;

    let tracker = InstalledSet::new(store);
    let dir = root.join(folder_name);
    let has_dir = dir.is_dir();

    if !has_dir && tracker.get(folder_name).is_none() {
        return Err(Error::NotInstalled(folder_name.to_string()));
    }

    if has_dir {
        if !confirm(folder_name) {
            return Ok(UninstallOutcome::Cancelled);
        }
        fs::remove_dir_all(&dir)?;
        tracing::info!("Removed {}", dir);
    }

    if let Err(e) = tracker.remove(folder_name) {
        tracing::warn!("Removed {} but could not update config: {}", folder_name, e);
    }

    Ok(UninstallOutcome::Removed)
}

/// List the addon folders under `root`, sorted by name.
pub fn list_installed(store: &dyn ConfigStore, root: &Utf8Path) -> Result<Vec<AddonEntry>> {
    ensure_root(root)?;

    let mut records = InstalledSet::new(store).records();
    let mut entries = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let folder_name = entry.file_name().to_string_lossy().into_owned();
        let record = records.remove(&folder_name);
        entries.push(AddonEntry {
            folder_name,
            record,
        });
    }

    entries.sort_by(|a, b| a.folder_name.cmp(&b.folder_name));
    Ok(entries)
}

/// Whether an install of an unknown commit of `branch` should take the head
/// commit reported by the update check.
fn adopts_checked_commit(installed: &VersionMarker, latest: &VersionMarker) -> bool {
    match (installed, latest) {
        (
            VersionMarker::Branch {
                branch,
                commit: None,
            },
            VersionMarker::Branch {
                branch: latest_branch,
                commit: Some(_),
            },
        ) => branch == latest_branch,
        _ => false,
    }
}

fn ensure_root(root: &Utf8Path) -> Result<()> {
    if !root.is_dir() {
        return Err(Error::AddonsFolderMissing(root.to_path_buf()));
    }
    Ok(())
}

fn managed_record(store: &dyn ConfigStore, root: &Utf8Path, folder_name: &str) -> Result<ModRecord> {
    if !root.join(folder_name).is_dir() {
        return Err(Error::NotInstalled(folder_name.to_string()));
    }
    InstalledSet::new(store)
        .get(folder_name)
        .ok_or_else(|| Error::Unmanaged(folder_name.to_string()))
}
