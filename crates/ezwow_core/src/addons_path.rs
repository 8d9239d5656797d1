//! Turtle WoW AddOns folder detection and validation.

use camino::{Utf8Path, Utf8PathBuf};
use directories_next::BaseDirs;
use sysinfo::Disks;

/// An AddOns folder is valid if it is an existing directory.
pub fn is_valid_addons_folder(path: &Utf8Path) -> bool {
    path.is_dir()
}

/// `Interface/AddOns` below a client installation root.
fn addons_below(client_root: Utf8PathBuf) -> Utf8PathBuf {
    client_root.join("Interface").join("AddOns")
}

/// The launcher's default location under the user's home directory.
fn detect_from_home() -> Option<Utf8PathBuf> {
    let home = BaseDirs::new()?.home_dir().to_path_buf();
    let home = Utf8PathBuf::from_path_buf(home).ok()?;

    let candidate = addons_below(home.join("Games").join("Turtle WoW").join("_classic_"));
    is_valid_addons_folder(&candidate).then_some(candidate)
}

/// Get all mount points using sysinfo (cross-platform).
fn get_available_drives() -> Vec<Utf8PathBuf> {
    let disks = Disks::new_with_refreshed_list();

    let mut drives: Vec<Utf8PathBuf> = disks
        .iter()
        .filter_map(|disk| disk.mount_point().to_str().map(Utf8PathBuf::from))
        .collect();

    // Fallback to common Windows drives if detection fails
    if drives.is_empty() && cfg!(target_os = "windows") {
        drives = ["C:\\", "D:\\", "E:\\"]
            .into_iter()
            .map(Utf8PathBuf::from)
            .collect();
    }

    drives
}

/// Check common install locations on every mounted disk.
fn detect_from_common_paths() -> Option<Utf8PathBuf> {
    get_available_drives()
        .into_iter()
        .flat_map(|drive| {
            [
                addons_below(drive.join("Turtle WoW")),
                addons_below(drive.join("Games").join("Turtle WoW")),
            ]
        })
        .find(|path| is_valid_addons_folder(path))
}

/// Auto-detect the Turtle WoW AddOns folder.
///
/// Detection order:
/// 1. `~/Games/Turtle WoW/_classic_/Interface/AddOns`
/// 2. `Turtle WoW/Interface/AddOns` and `Games/Turtle WoW/Interface/AddOns`
///    at the root of every mounted disk
pub fn auto_detect_addons_folder() -> Option<Utf8PathBuf> {
    let found = detect_from_home().or_else(detect_from_common_paths);
    match &found {
        Some(path) => tracing::debug!("Detected AddOns folder at {}", path),
        None => tracing::debug!("No AddOns folder detected"),
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_valid_addons_folder() {
        let temp = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let addons = addons_below(root.join("Turtle WoW"));

        assert!(!is_valid_addons_folder(&addons));
        std::fs::create_dir_all(&addons).unwrap();
        assert!(is_valid_addons_folder(&addons));
        assert!(addons.ends_with("Interface/AddOns"));
    }
}
