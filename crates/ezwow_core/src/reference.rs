//! Parsing of user supplied addon references.
//!
//! A reference is either a direct `.zip` URL or a GitHub repository URL,
//! optionally pointing at a branch through a `/tree/<branch>` segment.

use std::fmt;
use std::sync::LazyLock;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::error::{Error, Result};

static REPOSITORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?i:www\.)?(?i:github\.com)/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$")
        .expect("repository pattern is valid")
});

static ARCHIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?i:www\.|codeload\.)?(?i:github\.com)/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)/(?:archive/refs/heads/(.+)\.(?i:zip)$)?",
    )
    .expect("archive pattern is valid")
});

static TREE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://[^/]+/[^/]+/[^/]+)/tree/(.+)$").expect("tree pattern is valid")
});

/// Unreserved characters stay as they are in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes a branch name for a URL path, keeping its `/` separators.
pub(crate) fn encode_branch(branch: &str) -> String {
    branch
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// A GitHub repository, optionally pinned to a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub user: String,
    pub project: String,
    pub branch: Option<String>,
}

impl RepoRef {
    pub fn new(user: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            project: project.into(),
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Archive URL following GitHub's branch archive convention.
    pub fn branch_archive_url(&self, branch: &str) -> String {
        format!(
            "https://github.com/{}/{}/archive/refs/heads/{}.zip",
            self.user,
            self.project,
            encode_branch(branch)
        )
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.project)?;
        if let Some(branch) = &self.branch {
            write!(f, "@{}", branch)?;
        }
        Ok(())
    }
}

/// A parsed addon reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddonReference {
    /// A direct link to a ZIP archive. The repository is only known when the
    /// URL is hosted on GitHub, and carries the branch for
    /// `/archive/refs/heads/<branch>.zip` links.
    Archive {
        url: String,
        repository: Option<RepoRef>,
    },
    /// A repository URL, resolved through the hosting API.
    Repository(RepoRef),
}

impl AddonReference {
    pub fn repository(&self) -> Option<&RepoRef> {
        match self {
            AddonReference::Archive { repository, .. } => repository.as_ref(),
            AddonReference::Repository(repo) => Some(repo),
        }
    }
}

/// Returns true if the reference points straight at a ZIP archive.
pub fn is_archive_url(reference: &str) -> bool {
    reference.trim().to_ascii_lowercase().ends_with(".zip")
}

/// Parse a reference string into an [`AddonReference`].
pub fn parse_reference(input: &str) -> Result<AddonReference> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidReference(input.to_string()));
    }

    if is_archive_url(input) {
        return Ok(AddonReference::Archive {
            url: input.to_string(),
            repository: parse_archive_repository(input),
        });
    }

    parse_repository(input).map(AddonReference::Repository)
}

/// Parse a GitHub repository URL, extracting a `/tree/<branch>` segment if present.
pub fn parse_repository(url: &str) -> Result<RepoRef> {
    let mut bare = url.trim().trim_end_matches('/');
    if let Some(stripped) = bare.strip_suffix(".git") {
        bare = stripped;
    }

    let mut branch = None;
    if let Some(caps) = TREE_RE.captures(bare) {
        let (Some(repo), Some(name)) = (caps.get(1), caps.get(2)) else {
            return Err(Error::InvalidReference(url.to_string()));
        };
        branch = Some(decode_branch(name.as_str()));
        bare = repo.as_str();
        if let Some(stripped) = bare.strip_suffix(".git") {
            bare = stripped;
        }
    }

    let caps = REPOSITORY_RE
        .captures(bare)
        .ok_or_else(|| Error::InvalidReference(url.to_string()))?;

    let repo = RepoRef::new(&caps[1], &caps[2]);
    Ok(match branch {
        Some(branch) => repo.with_branch(branch),
        None => repo,
    })
}

fn parse_archive_repository(url: &str) -> Option<RepoRef> {
    let caps = ARCHIVE_RE.captures(url)?;
    let repo = RepoRef::new(&caps[1], &caps[2]);
    Some(match caps.get(3) {
        Some(branch) => repo.with_branch(decode_branch(branch.as_str())),
        None => repo,
    })
}

fn decode_branch(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
