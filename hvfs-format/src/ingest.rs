//! Recursive ingestion of directory trees into an [`Archive`].
//!
//! A single bad entry never aborts an ingest: it is recorded in the caller's
//! [`Diagnostics`] and the walk moves on.

use std::fmt;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use crate::{io, name, Archive, Error, Result};

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Prepended to every entry name, separated by [`name::NAME_SEP`].
    pub prefix: Option<String>,
    pub include_hidden: bool,
    pub follow_links: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            prefix: None,
            include_hidden: true,
            follow_links: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Collects the entries an operation skipped, and why.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    pub fn push<P: Into<PathBuf>, M: fmt::Display>(&mut self, path: P, message: M) {
        let diagnostic = Diagnostic {
            path: path.into(),
            message: message.to_string(),
        };
        tracing::warn!(
            path = %diagnostic.path.display(),
            message = %diagnostic.message,
            "skipped entry"
        );
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub files_added: u64,
    pub bytes_added: u64,
    pub skipped: u64,
}

/// Adds every regular file below `dir`, named by its path relative to `dir`.
///
/// Fails only if `dir` itself is not a readable directory.
pub fn add_directory<P: AsRef<Path>>(
    archive: &mut Archive,
    dir: P,
    options: &IngestOptions,
    diagnostics: &mut Diagnostics,
) -> Result<IngestStats> {
    let root = dir.as_ref();
    let meta = std::fs::metadata(root).map_err(|source| Error::io(source, root))?;
    if !meta.is_dir() {
        return Err(Error::io(
            std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
            root,
        ));
    }

    let mut stats = IngestStats::default();

    let walker = WalkDir::new(root)
        .sort(true)
        .skip_hidden(!options.include_hidden)
        .follow_links(options.follow_links);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                diagnostics.push(root, err);
                stats.skipped += 1;
                continue;
            }
        };

        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            continue;
        }

        if !file_type.is_file() {
            diagnostics.push(path, "neither a regular file nor a directory");
            stats.skipped += 1;
            continue;
        }

        match add_one(archive, root, &path, options) {
            Ok(bytes) => {
                stats.files_added += 1;
                stats.bytes_added += bytes;
            }
            Err(err) => {
                diagnostics.push(path, err);
                stats.skipped += 1;
            }
        }
    }

    tracing::info!(
        root = %root.display(),
        files = stats.files_added,
        bytes = stats.bytes_added,
        skipped = stats.skipped,
        "ingested directory"
    );

    Ok(stats)
}

fn add_one(archive: &mut Archive, root: &Path, path: &Path, options: &IngestOptions) -> Result<u64> {
    let relative = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    let entry_name = name::from_path(&relative)?;
    let entry_name = name::with_prefix(options.prefix.as_deref(), &entry_name)?;

    if archive.contains(&entry_name) {
        return Err(Error::DuplicateName(entry_name));
    }

    let payload = io::read_file(path)?;
    let header = archive.add_file(&entry_name, &payload)?;
    Ok(header.payload_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub").join("deeper")).unwrap();
        std::fs::write(dir.path().join("top.txt"), b"top").unwrap();
        std::fs::write(dir.path().join("sub").join("mid.bin"), [1u8, 2, 3]).unwrap();
        std::fs::write(dir.path().join("sub").join("deeper").join("low.txt"), b"low").unwrap();
        dir
    }

    #[test]
    fn ingests_recursively() {
        let dir = tree();
        let mut archive = Archive::new();
        let mut diagnostics = Diagnostics::new();

        let stats = add_directory(
            &mut archive,
            dir.path(),
            &IngestOptions::default(),
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(stats.files_added, 3);
        assert_eq!(stats.bytes_added, 9);
        assert!(diagnostics.is_empty());

        let reader = archive.reader().unwrap();
        assert_eq!(reader.bytes("top.txt").unwrap(), b"top");
        assert_eq!(reader.bytes("sub/mid.bin").unwrap(), &[1, 2, 3]);
        assert_eq!(reader.bytes("sub/deeper/low.txt").unwrap(), b"low");
    }

    #[test]
    fn prefix_applies_to_every_entry() {
        let dir = tree();
        let mut archive = Archive::new();
        let options = IngestOptions {
            prefix: Some("assets".into()),
            ..IngestOptions::default()
        };

        add_directory(&mut archive, dir.path(), &options, &mut Diagnostics::new()).unwrap();

        assert!(archive.contains("assets/top.txt"));
        assert!(archive.contains("assets/sub/deeper/low.txt"));
        assert!(!archive.contains("top.txt"));
    }

    #[test]
    fn failures_are_collected_not_propagated() {
        let dir = tree();
        let mut archive = Archive::new();
        archive.add_file("top.txt", b"already here").unwrap();

        let mut diagnostics = Diagnostics::new();
        let stats = add_directory(
            &mut archive,
            dir.path(),
            &IngestOptions::default(),
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(stats.files_added, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(diagnostics.len(), 1);

        let diagnostic = diagnostics.iter().next().unwrap();
        assert!(diagnostic.path.ends_with("top.txt"));
        assert_eq!(
            archive.reader().unwrap().bytes("top.txt").unwrap(),
            b"already here"
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped_unless_followed() {
        let dir = tree();
        std::os::unix::fs::symlink(dir.path().join("top.txt"), dir.path().join("link.txt"))
            .unwrap();

        let mut archive = Archive::new();
        let mut diagnostics = Diagnostics::new();
        add_directory(
            &mut archive,
            dir.path(),
            &IngestOptions::default(),
            &mut diagnostics,
        )
        .unwrap();

        assert!(!archive.contains("link.txt"));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = Archive::new();
        let result = add_directory(
            &mut archive,
            dir.path().join("missing"),
            &IngestOptions::default(),
            &mut Diagnostics::new(),
        );
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
