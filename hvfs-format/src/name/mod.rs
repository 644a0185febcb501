//! Entry names.
//!
//! A name is any non-empty byte string without NUL bytes that fits the header's name
//! field. Names are compared as exact bytes. Names produced from filesystem paths are
//! sanitised first and always use [`NAME_SEP`] between components.

use std::path::{Path, PathBuf};

use crate::header::MAX_NAME_LEN;
use crate::{Error, Result};

mod error;

pub use self::error::IntoEntryNameError;

/// The separator placed between path components of names built from paths.
pub const NAME_SEP: &str = "/";

/// Checks that `name` can be stored in a header.
pub fn check(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(IntoEntryNameError::Empty.into());
    }
    if name.len() >= MAX_NAME_LEN {
        return Err(Error::NameTooLong { len: name.len() });
    }
    if name.as_bytes().contains(&0) {
        return Err(IntoEntryNameError::ContainsNul.into());
    }
    Ok(())
}

/// Splits `path` into clean name components.
///
/// `.`, roots and prefixes are dropped and `..` pops the previous component. Returns
/// `None` if any component is not UTF-8, is blank, or holds a backslash, a control
/// character or a non-space separator.
pub fn sanitize<P: AsRef<Path>>(path: P) -> Option<Vec<String>> {
    use std::path::Component;

    let mut parts = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(part) => parts.push(clean_component(part.to_str()?)?),
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    Some(parts)
}

fn clean_component(part: &str) -> Option<String> {
    use unic_normal::StrNormalForm;
    use unic_ucd::GeneralCategory;

    let part = part.trim();
    let forbidden = |c: char| {
        let category = GeneralCategory::of(c);
        c == '\\' || category == GeneralCategory::Control || (category.is_separator() && c != ' ')
    };

    if part.is_empty() || part.chars().any(forbidden) {
        return None;
    }
    Some(part.nfc().collect())
}

/// Builds an entry name from a filesystem path.
pub fn from_path<P: AsRef<Path>>(path: P) -> std::result::Result<String, IntoEntryNameError> {
    let out = sanitize(&path).ok_or(IntoEntryNameError::UnrepresentableStr)?;

    if out.is_empty() {
        return Err(IntoEntryNameError::Empty);
    }

    Ok(out.join(NAME_SEP))
}

/// Prepends `prefix` (itself sanitised) to a name built by [`from_path`].
pub fn with_prefix(prefix: Option<&str>, name: &str) -> std::result::Result<String, IntoEntryNameError> {
    match prefix.map(from_path).transpose()? {
        Some(prefix) => Ok(format!("{}{}{}", prefix, NAME_SEP, name)),
        None => Ok(name.to_string()),
    }
}

/// The relative filesystem path an entry extracts to. Never escapes its destination.
pub fn to_relative_path(name: &str) -> std::result::Result<PathBuf, IntoEntryNameError> {
    let parts = sanitize(Path::new(name)).ok_or(IntoEntryNameError::UnrepresentableStr)?;

    if parts.is_empty() {
        return Err(IntoEntryNameError::Empty);
    }

    Ok(parts.iter().collect())
}
