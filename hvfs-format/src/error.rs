use std::path::PathBuf;

use crate::header::MAX_NAME_LEN;
use crate::name::IntoEntryNameError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O failed. Path: '{}'", .path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Entry name is too long: {len} bytes (at most {} allowed)", MAX_NAME_LEN - 1)]
    NameTooLong { len: usize },

    #[error("Invalid entry name: {0}")]
    InvalidName(#[from] IntoEntryNameError),

    #[error("An entry named '{0}' already exists in the archive")]
    DuplicateName(String),

    #[error("No entry named '{0}' in the archive")]
    NotFound(String),

    #[error("Corrupt archive at offset {offset:#x}: {reason}")]
    CorruptArchive { offset: usize, reason: &'static str },

    #[error("Payload range {start:#x}+{len:#x} lies outside the archive ({archive_len} bytes)")]
    OutOfBounds {
        start: u64,
        len: u64,
        archive_len: usize,
    },

    #[error("Decoding payload failed")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn io<P: Into<PathBuf>>(source: std::io::Error, path: P) -> Error {
        Error::Io {
            source,
            path: path.into(),
        }
    }
}
