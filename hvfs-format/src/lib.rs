//! Herein lies the brains of the `hvfs` archive format.
//!
//! An archive is one contiguous byte buffer of `(header, payload)` blocks. Use
//! [Archive][Archive] to build and mutate one, and [ArchiveReader][ArchiveReader]
//! to look entries up by name without copying their payloads.

mod error;
pub mod header;
pub mod io;
pub mod name;
pub mod validate;

#[cfg(feature = "writer")]
mod archive;
#[cfg(feature = "writer")]
pub mod ingest;
#[cfg(feature = "reader")]
mod reader;

#[cfg(feature = "writer")]
pub use archive::Archive;
pub use error::{Error, Result};
pub use header::{EntryHeader, HEADER_SIZE, MAX_NAME_LEN};
pub use name::IntoEntryNameError;
#[cfg(feature = "reader")]
pub use reader::{ArchiveReader, DecodePayload, MappedArchive, Selector};
pub use validate::{is_consistent, is_valid, walk};
