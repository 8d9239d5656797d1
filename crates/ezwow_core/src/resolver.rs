//! Resolution of a reference into a concrete install plan.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::github::HostingApi;
use crate::reference::{parse_reference, AddonReference, RepoRef};

/// Branch used when neither the reference nor the API names one.
pub const FALLBACK_BRANCH: &str = "master";

/// What an installed copy was built from, used to detect staleness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VersionMarker {
    /// A tagged release.
    Release { tag: String },
    /// The head of a branch. The commit is unknown if the API lookup failed.
    Branch {
        branch: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        commit: Option<String>,
    },
    /// A direct archive download with no release or branch tracking.
    Untracked,
}

impl VersionMarker {
    /// The value compared during update checks (tag or commit SHA).
    pub fn marker(&self) -> Option<&str> {
        match self {
            VersionMarker::Release { tag } => Some(tag),
            VersionMarker::Branch { commit, .. } => commit.as_deref(),
            VersionMarker::Untracked => None,
        }
    }
}

impl fmt::Display for VersionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionMarker::Release { tag } => write!(f, "release {}", tag),
            VersionMarker::Branch {
                branch,
                commit: Some(sha),
            } => write!(f, "{} @ {}", branch, short_sha(sha)),
            VersionMarker::Branch { branch, commit: None } => write!(f, "{} @ unknown", branch),
            VersionMarker::Untracked => write!(f, "untracked"),
        }
    }
}

/// Abbreviates a commit SHA for display.
fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

/// The result of resolving a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub archive_url: String,
    /// Defaults to the project name; `None` if the reference names no project.
    pub folder_name: Option<String>,
    pub repository: Option<RepoRef>,
    pub version: VersionMarker,
}

/// Resolve a reference into an [`InstallPlan`].
///
/// Direct archive URLs are used as-is and never hit the hosting API. A GitHub
/// branch archive is tracked as that branch with its commit still unknown.
/// Repository URLs resolve to the latest release when one exists, otherwise to
/// a branch archive (explicit branch, default branch, or [`FALLBACK_BRANCH`]).
pub fn resolve(api: &dyn HostingApi, reference: &str) -> Result<InstallPlan> {
    match parse_reference(reference)? {
        AddonReference::Archive { url, repository } => {
            tracing::debug!("{} is a direct archive URL", url);
            let version = match repository.as_ref().and_then(|r| r.branch.clone()) {
                Some(branch) => VersionMarker::Branch {
                    branch,
                    commit: None,
                },
                None => VersionMarker::Untracked,
            };
            Ok(InstallPlan {
                archive_url: url,
                folder_name: repository.as_ref().map(|r| r.project.clone()),
                repository,
                version,
            })
        }
        AddonReference::Repository(repo) => resolve_repository(api, reference, repo),
    }
}

fn resolve_repository(api: &dyn HostingApi, reference: &str, repo: RepoRef) -> Result<InstallPlan> {
    let mut release_unreachable = false;

    if repo.branch.is_none() {
        match api.latest_release(&repo) {
            Ok(Some(release)) => {
                if let Some(url) = release.archive_url() {
                    tracing::debug!("{} resolved to release {}", repo, release.tag_name);
                    return Ok(InstallPlan {
                        archive_url: url.to_string(),
                        folder_name: Some(repo.project.clone()),
                        repository: Some(repo),
                        version: VersionMarker::Release {
                            tag: release.tag_name,
                        },
                    });
                }
                tracing::debug!(
                    "Release {} of {} has no downloadable archive",
                    release.tag_name,
                    repo
                );
            }
            Ok(None) => tracing::debug!("{} has no releases", repo),
            Err(e) => {
                tracing::warn!("Release lookup for {} failed: {}", repo, e);
                release_unreachable = e.is_unreachable();
            }
        }
    }

    let branch = match &repo.branch {
        Some(branch) => branch.clone(),
        None => match api.default_branch(&repo) {
            Ok(Some(branch)) => branch,
            Ok(None) => FALLBACK_BRANCH.to_string(),
            Err(e) if release_unreachable && e.is_unreachable() => {
                return Err(Error::ResolutionNetwork {
                    reference: reference.to_string(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::warn!(
                    "Default branch lookup for {} failed, using {}: {}",
                    repo,
                    FALLBACK_BRANCH,
                    e
                );
                FALLBACK_BRANCH.to_string()
            }
        },
    };

    let commit = match api.branch_head(&repo, &branch) {
        Ok(commit) => commit,
        Err(e) => {
            tracing::warn!("Head commit lookup for {}@{} failed: {}", repo, branch, e);
            None
        }
    };

    tracing::debug!("{} resolved to branch {}", repo, branch);
    Ok(InstallPlan {
        archive_url: repo.branch_archive_url(&branch),
        folder_name: Some(repo.project.clone()),
        repository: Some(repo),
        version: VersionMarker::Branch { branch, commit },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{Release, ReleaseAsset};
    use crate::test_utils::{FakeFailure, FakeHost};

    fn release(tag: &str, assets: Vec<ReleaseAsset>) -> Release {
        Release {
            tag_name: tag.to_string(),
            zipball_url: Some(format!(
                "https://api.github.com/repos/acme/Foo/zipball/{}",
                tag
            )),
            assets,
        }
    }

    #[test]
    fn test_resolve_default_branch_without_releases() {
        let host = FakeHost::default()
            .with_default_branch("main")
            .with_head("main", "1111111aaaa");

        let plan = resolve(&host, "https://github.com/acme/Foo").unwrap();

        assert_eq!(
            plan.archive_url,
            "https://github.com/acme/Foo/archive/refs/heads/main.zip"
        );
        assert_eq!(plan.folder_name.as_deref(), Some("Foo"));
        assert_eq!(
            plan.version,
            VersionMarker::Branch {
                branch: "main".to_string(),
                commit: Some("1111111aaaa".to_string()),
            }
        );
    }

    #[test]
    fn test_resolve_release_without_assets_uses_source_archive() {
        let host = FakeHost::default().with_release(release("v2.0", vec![]));

        let plan = resolve(&host, "https://github.com/acme/Foo").unwrap();

        assert_eq!(
            plan.archive_url,
            "https://api.github.com/repos/acme/Foo/zipball/v2.0"
        );
        assert_eq!(plan.folder_name.as_deref(), Some("Foo"));
        assert_eq!(
            plan.version,
            VersionMarker::Release {
                tag: "v2.0".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_release_prefers_zip_asset() {
        let assets = vec![
            ReleaseAsset {
                name: "checksums.txt".to_string(),
                browser_download_url: "https://example.com/checksums.txt".to_string(),
            },
            ReleaseAsset {
                name: "Foo.zip".to_string(),
                browser_download_url: "https://example.com/Foo.zip".to_string(),
            },
        ];
        let host = FakeHost::default().with_release(release("v3", assets));

        let plan = resolve(&host, "https://github.com/acme/Foo").unwrap();
        assert_eq!(plan.archive_url, "https://example.com/Foo.zip");
    }

    #[test]
    fn test_resolve_explicit_branch_ignores_release_and_default() {
        let host = FakeHost::default()
            .with_release(release("v2.0", vec![]))
            .with_default_branch("main")
            .with_head("dev", "2222222bbbb");

        let plan = resolve(&host, "https://github.com/acme/Foo/tree/dev").unwrap();

        assert_eq!(
            plan.archive_url,
            "https://github.com/acme/Foo/archive/refs/heads/dev.zip"
        );
        assert_eq!(
            plan.version,
            VersionMarker::Branch {
                branch: "dev".to_string(),
                commit: Some("2222222bbbb".to_string()),
            }
        );
    }

    #[test]
    fn test_resolve_archive_url_never_calls_api() {
        let host = FakeHost::default().with_release(release("v1", vec![]));
        let url = "https://github.com/shagu/pfQuest/archive/refs/heads/master.zip";

        let plan = resolve(&host, url).unwrap();

        assert_eq!(host.call_count(), 0);
        assert_eq!(plan.archive_url, url);
        assert_eq!(plan.folder_name.as_deref(), Some("pfQuest"));
        assert_eq!(
            plan.version,
            VersionMarker::Branch {
                branch: "master".to_string(),
                commit: None,
            }
        );
    }

    #[test]
    fn test_resolve_foreign_archive_has_no_folder() {
        let host = FakeHost::default();
        let plan = resolve(&host, "https://example.com/Addon.zip").unwrap();
        assert!(plan.folder_name.is_none());
        assert_eq!(plan.version, VersionMarker::Untracked);
        assert_eq!(host.call_count(), 0);
    }

    #[test]
    fn test_resolve_api_status_errors_fall_back_to_master() {
        let host = FakeHost::default().failing(FakeFailure::Status(403));

        let plan = resolve(&host, "https://github.com/acme/Foo").unwrap();

        assert_eq!(
            plan.archive_url,
            "https://github.com/acme/Foo/archive/refs/heads/master.zip"
        );
        assert_eq!(
            plan.version,
            VersionMarker::Branch {
                branch: FALLBACK_BRANCH.to_string(),
                commit: None,
            }
        );
    }

    #[test]
    fn test_resolve_unreachable_host_is_network_error() {
        let host = FakeHost::default().failing(FakeFailure::Unreachable);
        let result = resolve(&host, "https://github.com/acme/Foo");
        assert!(matches!(result, Err(Error::ResolutionNetwork { .. })));
    }

    #[test]
    fn test_resolve_explicit_branch_survives_unreachable_host() {
        let host = FakeHost::default().failing(FakeFailure::Unreachable);
        let plan = resolve(&host, "https://github.com/acme/Foo/tree/dev").unwrap();
        assert_eq!(
            plan.version,
            VersionMarker::Branch {
                branch: "dev".to_string(),
                commit: None,
            }
        );
    }

    #[test]
    fn test_resolve_invalid_reference() {
        let host = FakeHost::default();
        assert!(matches!(
            resolve(&host, "not a url"),
            Err(Error::InvalidReference(_))
        ));
    }

    #[test]
    fn test_version_marker_serialization() {
        let marker = VersionMarker::Branch {
            branch: "main".to_string(),
            commit: None,
        };
        let json = serde_json::to_value(&marker).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "branch", "branch": "main"}));

        let parsed: VersionMarker =
            serde_json::from_str(r#"{"kind": "release", "tag": "v1.2"}"#).unwrap();
        assert_eq!(parsed.marker(), Some("v1.2"));
    }
}
