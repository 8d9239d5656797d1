//! Locating the config file.

use camino::Utf8PathBuf;
use ezwow_core::CONFIG_FILE_NAME;
use std::env;

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

/// Returns the default config file path, next to the executable.
///
/// Falls back to the working directory when the executable's location is
/// unknown or not valid UTF-8.
pub fn default_config_path() -> Utf8PathBuf {
    install_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| Utf8PathBuf::from(CONFIG_FILE_NAME))
}
