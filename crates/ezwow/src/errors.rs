use camino::Utf8PathBuf;
use ezwow_core::{ConfigError, Error as CoreError};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("AddOns folder is not configured")]
    #[diagnostic(
        code(config::addons_folder_not_set),
        help("Run 'ezwow config auto-detect' or 'ezwow config set-addons-folder <path>'")
    )]
    AddonsFolderNotSet,

    #[error("AddOns folder does not exist: {path}")]
    #[diagnostic(
        code(config::addons_folder_missing),
        help("Point ezwow at '<Turtle WoW>/Interface/AddOns' with 'ezwow config set-addons-folder <path>'")
    )]
    AddonsFolderMissing { path: Utf8PathBuf },

    #[error("Invalid addon reference: {reference}")]
    #[diagnostic(
        code(reference::invalid),
        help("Use a GitHub repository URL (https://github.com/<user>/<project>, optionally ending in /tree/<branch>) or a direct .zip link")
    )]
    InvalidReference { reference: String },

    #[error("Invalid folder name: {name:?}")]
    #[diagnostic(
        code(reference::invalid_folder),
        help("Folder names must be a single directory name without path separators")
    )]
    InvalidFolderName { name: String },

    #[error("Cannot derive a folder name from {reference}")]
    #[diagnostic(
        code(reference::missing_folder),
        help("Pass the folder name the addon expects with --folder <name>")
    )]
    MissingFolderName { reference: String },

    #[error("Unknown recommended addon: {name}")]
    #[diagnostic(
        code(reference::unknown_recommended),
        help("Run 'ezwow recommended' to see the curated list")
    )]
    UnknownRecommended { name: String },

    #[error("Network request failed")]
    #[diagnostic(
        code(network::failed),
        help("Check your internet connection and try again")
    )]
    Network {
        #[source]
        source: CoreError,
    },

    #[error("Extraction failed")]
    #[diagnostic(
        code(install::extraction_failed),
        help("The addon folder may be incomplete. Install the addon again to repair it")
    )]
    ExtractionFailed {
        #[source]
        source: CoreError,
    },

    #[error("Addon is not installed: {name}")]
    #[diagnostic(code(addon::not_installed), help("Run 'ezwow list' to see installed addons"))]
    NotInstalled { name: String },

    #[error("Addon is not managed by ezwow: {name}")]
    #[diagnostic(
        code(addon::unmanaged),
        help("Reinstall it with 'ezwow install <url> --folder {name}' to enable update checks")
    )]
    Unmanaged { name: String },

    #[error("Failed to save configuration")]
    #[diagnostic(code(config::save_failed), help("Check that the config file location is writable"))]
    ConfigSaveFailed {
        #[source]
        source: ConfigError,
    },

    #[error("Failed to initialize the HTTP client")]
    #[diagnostic(code(network::client))]
    HttpClient {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn unknown_recommended(name: String) -> Self {
        Self::UnknownRecommended { name }
    }

    pub fn http_client(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::HttpClient {
            source: Box::new(source),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(source: ConfigError) -> Self {
        Self::ConfigSaveFailed { source }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidReference(reference) => Self::InvalidReference { reference },
            CoreError::InvalidFolderName(name) => Self::InvalidFolderName { name },
            CoreError::MissingFolderName(reference) => Self::MissingFolderName { reference },
            CoreError::AddonsFolderMissing(path) => Self::AddonsFolderMissing { path },
            CoreError::NotInstalled(name) => Self::NotInstalled { name },
            CoreError::Unmanaged(name) => Self::Unmanaged { name },
            CoreError::ConfigIo(source) => Self::ConfigSaveFailed { source },
            CoreError::Io(source) => Self::IoError { source },
            err @ (CoreError::ResolutionNetwork { .. } | CoreError::Download { .. }) => {
                Self::Network { source: err }
            }
            err @ CoreError::Extraction(_) => Self::ExtractionFailed { source: err },
        }
    }
}
