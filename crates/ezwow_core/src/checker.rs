//! Update checks for tracked addons.

use std::fmt;

use crate::github::HostingApi;
use crate::reference::parse_reference;
use crate::resolver::VersionMarker;
use crate::tracker::ModRecord;

/// Result of comparing a record against upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    /// Upstream moved on; carries the upstream version.
    UpdateAvailable(VersionMarker),
    /// Upstream could not be queried. Callers reinstall anyway.
    Unknown,
}

impl UpdateStatus {
    pub fn needs_reinstall(&self) -> bool {
        !matches!(self, UpdateStatus::UpToDate)
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStatus::UpToDate => write!(f, "up to date"),
            UpdateStatus::UpdateAvailable(latest) => write!(f, "update available ({})", latest),
            UpdateStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Compare the stored version marker of `record` with the current upstream one.
///
/// Records installed from a GitHub branch archive are checked against that
/// branch of the archive's repository.
pub fn check_for_update(api: &dyn HostingApi, record: &ModRecord) -> UpdateStatus {
    if matches!(record.version, VersionMarker::Untracked) {
        return UpdateStatus::Unknown;
    }

    let repo = match parse_reference(&record.reference) {
        Ok(reference) => match reference.repository() {
            Some(repo) => repo.clone(),
            None => {
                tracing::warn!("{} names no repository to check", record.reference);
                return UpdateStatus::Unknown;
            }
        },
        Err(e) => {
            tracing::warn!("Cannot check {} for updates: {}", record.reference, e);
            return UpdateStatus::Unknown;
        }
    };

    let latest = match &record.version {
        VersionMarker::Release { .. } => api.latest_release(&repo).map(|release| {
            release.map(|r| VersionMarker::Release { tag: r.tag_name })
        }),
        VersionMarker::Branch { branch, .. } => api.branch_head(&repo, branch).map(|head| {
            head.map(|sha| VersionMarker::Branch {
                branch: branch.clone(),
                commit: Some(sha),
            })
        }),
        VersionMarker::Untracked => return UpdateStatus::Unknown,
    };

    match latest {
        Ok(Some(latest)) if latest.marker() == record.version.marker() => UpdateStatus::UpToDate,
        Ok(Some(latest)) => UpdateStatus::UpdateAvailable(latest),
        Ok(None) => {
            tracing::debug!("{} returned no version marker", repo);
            UpdateStatus::Unknown
        }
        Err(e) => {
            tracing::warn!("Update check for {} failed: {}", repo, e);
            UpdateStatus::Unknown
        }
    }
}
