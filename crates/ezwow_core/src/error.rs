//! Error types for the install pipeline.
//!
//! All fallible pipeline functions return [`Result<T>`], which uses [`Error`]
//! as the error type. Archive failures are grouped under [`ExtractionError`],
//! hosting API failures under [`ApiError`] and config store failures under
//! [`ConfigError`].

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, downloading or installing an addon.
#[derive(Error, Debug)]
pub enum Error {
    /// The reference string could not be parsed as an archive or repository URL.
    #[error("Invalid addon reference: {0}")]
    InvalidReference(String),

    /// The folder name is not a single plain path component.
    #[error("Invalid addon folder name: {0:?}")]
    InvalidFolderName(String),

    /// A direct archive URL without a recognizable project needs an explicit folder name.
    #[error("Cannot derive a folder name from {0}")]
    MissingFolderName(String),

    /// The hosting API could not be reached at all while resolving a reference.
    #[error("Could not reach the hosting API while resolving {reference}")]
    ResolutionNetwork {
        reference: String,
        #[source]
        source: ApiError,
    },

    /// The archive download failed (transport error or non-success status).
    #[error("Download failed for {url}")]
    Download {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The archive could not be extracted.
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// The config store could not be read or written.
    #[error("Config error: {0}")]
    ConfigIo(#[from] ConfigError),

    /// The configured AddOns folder does not exist.
    #[error("AddOns folder does not exist: {0}")]
    AddonsFolderMissing(Utf8PathBuf),

    /// Filesystem access outside of extraction failed (listing, removal).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Neither a folder nor a tracker record exists for this name.
    #[error("Addon is not installed: {0}")]
    NotInstalled(String),

    /// The folder exists but has no provenance record, so it cannot be updated.
    #[error("Addon is not managed by ezwow: {0}")]
    Unmanaged(String),
}

/// Errors that can occur while extracting an archive.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An entry would be written outside the install folder.
    #[error("Archive entry escapes the install folder: {0}")]
    UnsafePath(String),

    #[error("Archive contains no entries")]
    Empty,
}

/// Errors returned by a [`HostingApi`](crate::HostingApi) implementation.
///
/// A missing resource (HTTP 404) is not an error; implementations return `Ok(None)`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No response was received (DNS, connect, TLS, timeout).
    #[error("Request to {url} failed")]
    Unreachable {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The host answered with an unexpected status code.
    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response body did not have the expected shape.
    #[error("Malformed response from {url}")]
    Decode {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApiError {
    /// Whether the host could not be reached at the transport level.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Unreachable { .. })
    }
}

/// Errors that can occur while persisting the config.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Json(#[from] serde_json::Error),
}
