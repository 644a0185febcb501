//! Whole-file I/O. Archives and ingested files are always read and written in one go.

use std::path::Path;

use crate::{Error, Result};

pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| Error::io(source, path))?;
    tracing::trace!(path = %path.display(), bytes = bytes.len(), "read file");
    Ok(bytes)
}

pub fn write_file<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, bytes).map_err(|source| Error::io(source, path))?;
    tracing::trace!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}
