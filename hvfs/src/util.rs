use std::path::Path;

use hvfs_format::name::{self, IntoEntryNameError};
use hvfs_format::Archive;

use crate::error::{Error, Result};

pub fn load_archive(path: &Path) -> Result<Archive> {
    let mut archive = Archive::new();
    archive
        .load_fs(path)
        .map_err(|source| Error::OpenArchive {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(archive)
}

pub fn store_archive(archive: &Archive, path: &Path) -> Result<()> {
    archive.store_fs(path).map_err(|source| Error::StoreArchive {
        path: path.to_path_buf(),
        source,
    })
}

/// A file given on the command line is stored under its own file name, not its full
/// path, optionally below `prefix`.
pub fn file_entry_name(path: &Path, prefix: Option<&str>) -> Result<String> {
    let invalid = |source| Error::InvalidPath {
        path: path.to_path_buf(),
        source,
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| invalid(IntoEntryNameError::Empty))?;
    let entry_name = name::from_path(file_name).map_err(invalid)?;
    name::with_prefix(prefix, &entry_name).map_err(invalid)
}

/// Format file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    use humansize::{FormatSize, BINARY};
    bytes.format_size(BINARY)
}
