//! Extraction of downloaded archives into the AddOns folder.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Cursor;
use std::path::{Component, PathBuf};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use zip::ZipArchive;

use crate::error::{Error, ExtractionError, Result};

/// An archive entry with its path split into plain components.
struct Entry {
    index: usize,
    components: Vec<OsString>,
    is_dir: bool,
}

/// Checks that `name` is a single plain folder name.
pub fn validate_folder_name(name: &str) -> Result<()> {
    let mut components = Utf8Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Utf8Component::Normal(_)), None)
    );

    if !single_normal || name.contains(['/', '\\']) {
        return Err(Error::InvalidFolderName(name.to_string()));
    }
    Ok(())
}

/// Extract a ZIP archive into `root/folder_name`, replacing any previous copy.
///
/// When every entry lives under one top-level directory, that directory is
/// treated as a wrapper and stripped, so the archive content lands directly in
/// `root/folder_name`. Otherwise the archive is extracted unchanged.
///
/// The archive is validated before the existing folder is removed. A failure
/// while writing leaves the folder in an unspecified state.
pub fn install_archive(bytes: &[u8], root: &Utf8Path, folder_name: &str) -> Result<Utf8PathBuf> {
    validate_folder_name(folder_name)?;

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(ExtractionError::from)?;
    let mut entries = read_entries(&mut archive)?;
    if entries.is_empty() {
        return Err(ExtractionError::Empty.into());
    }

    let wrapped = has_single_wrapper(&entries);
    if wrapped {
        for entry in &mut entries {
            entry.components.remove(0);
        }
    }

    let dest = root.join(folder_name);
    replace_dir(dest.as_std_path()).map_err(ExtractionError::from)?;

    for entry in &entries {
        if entry.components.is_empty() {
            continue;
        }

        let out_path: PathBuf = dest
            .as_std_path()
            .join(entry.components.iter().collect::<PathBuf>());

        if entry.is_dir {
            fs::create_dir_all(&out_path).map_err(ExtractionError::from)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(ExtractionError::from)?;
        }
        let mut file = archive
            .by_index(entry.index)
            .map_err(ExtractionError::from)?;
        let mut outfile = File::create(&out_path).map_err(ExtractionError::from)?;
        std::io::copy(&mut file, &mut outfile).map_err(ExtractionError::from)?;
    }

    tracing::info!(
        "Extracted {} entries into {}{}",
        entries.len(),
        dest,
        if wrapped { " (wrapper stripped)" } else { "" }
    );

    Ok(dest)
}

fn read_entries(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<Vec<Entry>> {
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let file = archive.by_index(index).map_err(ExtractionError::from)?;
        let path = file
            .enclosed_name()
            .ok_or_else(|| ExtractionError::UnsafePath(file.name().to_string()))?;

        let components: Vec<OsString> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_os_string()),
                _ => None,
            })
            .collect();

        if components.is_empty() {
            continue;
        }

        entries.push(Entry {
            index,
            components,
            is_dir: file.is_dir(),
        });
    }

    Ok(entries)
}

/// A single top-level segment counts as a wrapper only if it is a directory.
fn has_single_wrapper(entries: &[Entry]) -> bool {
    let top_level: BTreeSet<&OsString> = entries.iter().map(|e| &e.components[0]).collect();
    if top_level.len() != 1 {
        return false;
    }

    entries
        .iter()
        .any(|e| e.is_dir || e.components.len() > 1)
}

fn replace_dir(dest: &std::path::Path) -> std::io::Result<()> {
    if dest.is_dir() {
        tracing::debug!("Removing previous install at {}", dest.display());
        fs::remove_dir_all(dest)?;
    } else if dest.exists() {
        fs::remove_file(dest)?;
    }
    fs::create_dir_all(dest)
}
