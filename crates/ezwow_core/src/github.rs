//! GitHub hosting API access.
//!
//! The pipeline only talks to the host through the [`HostingApi`] trait so that
//! resolution and update checks can run against an in-memory host in tests.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::fetch::http_client;
use crate::reference::{encode_branch, RepoRef};

const GITHUB_API: &str = "https://api.github.com";
const API_TIMEOUT: Duration = Duration::from_secs(15);

/// A published release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    /// Auto-generated source archive for the release's tag.
    #[serde(default)]
    pub zipball_url: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

impl Release {
    /// Picks the download URL for this release.
    ///
    /// A `.zip` asset is preferred, then the first asset of any kind, then the
    /// auto-generated source archive.
    pub fn archive_url(&self) -> Option<&str> {
        self.assets
            .iter()
            .find(|asset| asset.name.to_ascii_lowercase().ends_with(".zip"))
            .or_else(|| self.assets.first())
            .map(|asset| asset.browser_download_url.as_str())
            .or(self.zipball_url.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct BranchInfo {
    commit: CommitInfo,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    sha: String,
}

/// Read-only queries against the hosting service.
///
/// A resource that does not exist (no releases, unknown branch) is reported as
/// `Ok(None)`, never as an error.
pub trait HostingApi: Send + Sync {
    /// Latest published release of the repository.
    fn latest_release(&self, repo: &RepoRef) -> Result<Option<Release>, ApiError>;

    /// Name of the repository's default branch.
    fn default_branch(&self, repo: &RepoRef) -> Result<Option<String>, ApiError>;

    /// Commit SHA at the head of `branch`.
    fn branch_head(&self, repo: &RepoRef, branch: &str) -> Result<Option<String>, ApiError>;
}

/// [`HostingApi`] backed by the public GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    api_base: String,
}

impl GithubClient {
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self {
            client: http_client(API_TIMEOUT)?,
            api_base: GITHUB_API.to_string(),
        })
    }

    /// Point the client at a different API root (GitHub Enterprise, mirrors).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<Option<T>, ApiError> {
        tracing::debug!("GET {}", url);
        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .map_err(|e| ApiError::Unreachable {
                url: url.clone(),
                source: Box::new(e),
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
            });
        }

        resp.json::<T>().map(Some).map_err(|e| ApiError::Decode {
            url,
            source: Box::new(e),
        })
    }
}

impl HostingApi for GithubClient {
    fn latest_release(&self, repo: &RepoRef) -> Result<Option<Release>, ApiError> {
        self.get_json(format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base, repo.user, repo.project
        ))
    }

    fn default_branch(&self, repo: &RepoRef) -> Result<Option<String>, ApiError> {
        let info: Option<RepositoryInfo> = self.get_json(format!(
            "{}/repos/{}/{}",
            self.api_base, repo.user, repo.project
        ))?;
        Ok(info.map(|i| i.default_branch))
    }

    fn branch_head(&self, repo: &RepoRef, branch: &str) -> Result<Option<String>, ApiError> {
        let info: Option<BranchInfo> = self.get_json(format!(
            "{}/repos/{}/{}/branches/{}",
            self.api_base,
            repo.user,
            repo.project,
            encode_branch(branch)
        ))?;
        Ok(info.map(|i| i.commit.sha))
    }
}
