use std::path::PathBuf;

use hvfs_format::IntoEntryNameError;
use miette::Diagnostic;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("Cannot handle path `{}`", .path.display())]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: IntoEntryNameError,
    },

    #[error("Cannot open archive `{}`", .path.display())]
    #[diagnostic(help("Is this a valid .hvfs file?"))]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: hvfs_format::Error,
    },

    #[error("Cannot write archive `{}`", .path.display())]
    StoreArchive {
        path: PathBuf,
        #[source]
        source: hvfs_format::Error,
    },

    #[error("Archive already exists: `{}`", .path.display())]
    #[diagnostic(help("Use -f/--force to overwrite"))]
    ArchiveExists { path: PathBuf },

    #[error("No files specified to add to archive")]
    #[diagnostic(help("Specify one or more files or directories to archive"))]
    NoFilesSpecified,

    #[error("Cannot add `{}` to archive", .path.display())]
    AddFile {
        path: PathBuf,
        #[source]
        source: hvfs_format::Error,
    },

    #[error("Cannot update entry `{name}`")]
    #[diagnostic(help("Without --atomic the old entry is removed before the new file is read"))]
    UpdateEntry {
        name: String,
        #[source]
        source: hvfs_format::Error,
    },

    #[error("Cannot modify archive")]
    Modify {
        #[source]
        source: hvfs_format::Error,
    },

    #[error("Cannot extract files")]
    Extract {
        #[source]
        source: hvfs_format::Error,
    },

    #[error("Archive `{}` is corrupt", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: hvfs_format::Error,
    },

    #[error("Archive `{}` has stale payload offsets", .path.display())]
    #[diagnostic(help("Loading and storing the archive again recomputes them"))]
    Inconsistent { path: PathBuf },

    #[error("Cannot serialize listing")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot determine current directory")]
    CurrentDir {
        #[source]
        source: std::io::Error,
    },
}
