//! Fixed-layout entry headers.
//!
//! Every entry in an archive is preceded by a header of exactly [`HEADER_SIZE`] bytes:
//!
//! | offset | size           | field                                   |
//! |--------|----------------|-----------------------------------------|
//! | 0      | `MAX_NAME_LEN` | name bytes, zero padded                 |
//! | 4096   | 8              | payload size, `u64` little-endian       |
//! | 4104   | 8              | payload offset, `u64` little-endian     |
//!
//! The payload offset is absolute from the start of the archive. It is redundant with
//! the block layout and is kept equal to it by the archive on every mutation.

use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};

use crate::{name, Result};

/// Width of the name field. A stored name is always shorter than this so the field
/// holds at least one zero terminator.
pub const MAX_NAME_LEN: usize = 4096;

pub(crate) const SIZE_FIELD: usize = MAX_NAME_LEN;
pub(crate) const OFFSET_FIELD: usize = SIZE_FIELD + 8;

/// Size in bytes of an encoded [`EntryHeader`].
pub const HEADER_SIZE: usize = OFFSET_FIELD + 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryHeader {
    pub(crate) name: String,

    /// The exact length of the payload following this header.
    pub payload_size: u64,

    /// Absolute position of the first payload byte in the archive.
    pub payload_offset: u64,
}

impl EntryHeader {
    pub fn new(name: &str, payload_size: u64, payload_offset: u64) -> Result<EntryHeader> {
        name::check(name)?;
        Ok(EntryHeader {
            name: name.to_string(),
            payload_size,
            payload_offset,
        })
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The byte range of the payload, or `None` if it cannot be addressed on this platform.
    pub fn payload_range(&self) -> Option<Range<usize>> {
        let start = usize::try_from(self.payload_offset).ok()?;
        let len = usize::try_from(self.payload_size).ok()?;
        Some(start..start.checked_add(len)?)
    }

    /// Bytes occupied by this entry's block: header plus payload.
    #[inline(always)]
    pub fn block_len(&self) -> u64 {
        HEADER_SIZE as u64 + self.payload_size
    }

    pub fn encode(&self) -> Result<[u8; HEADER_SIZE]> {
        encode(&self.name, self.payload_size, self.payload_offset)
    }

    /// Reinterprets a header window. Any bit pattern is a structurally valid header;
    /// whether it fits its buffer is checked by [`crate::validate`].
    ///
    /// # Panics
    ///
    /// If `window` is shorter than [`HEADER_SIZE`].
    pub fn decode(window: &[u8]) -> EntryHeader {
        let name = String::from_utf8_lossy(name_field(window)).into_owned();
        let payload_size = LittleEndian::read_u64(&window[SIZE_FIELD..OFFSET_FIELD]);
        let payload_offset = LittleEndian::read_u64(&window[OFFSET_FIELD..HEADER_SIZE]);

        tracing::trace!(
            %name,
            payload_size,
            payload_offset = format_args!("{:#x}", payload_offset),
            "decoded EntryHeader"
        );

        EntryHeader {
            name,
            payload_size,
            payload_offset,
        }
    }
}

/// Encodes a header, name left-justified and zero padded.
pub fn encode(name: &str, payload_size: u64, payload_offset: u64) -> Result<[u8; HEADER_SIZE]> {
    name::check(name)?;

    let mut out = [0u8; HEADER_SIZE];
    write_name_field(&mut out, name.as_bytes());
    write_size_field(&mut out, payload_size);
    write_offset_field(&mut out, payload_offset);
    Ok(out)
}

/// The raw name bytes of a header window, up to the first zero.
pub(crate) fn name_field(window: &[u8]) -> &[u8] {
    let field = &window[..MAX_NAME_LEN];
    let end = field.iter().position(|&b| b == 0).unwrap_or(MAX_NAME_LEN);
    &field[..end]
}

/// Overwrites the whole name field. `name` must already be checked.
pub(crate) fn write_name_field(window: &mut [u8], name: &[u8]) {
    let field = &mut window[..MAX_NAME_LEN];
    field.fill(0);
    field[..name.len()].copy_from_slice(name);
}

pub(crate) fn write_size_field(window: &mut [u8], payload_size: u64) {
    LittleEndian::write_u64(&mut window[SIZE_FIELD..OFFSET_FIELD], payload_size);
}

pub(crate) fn write_offset_field(window: &mut [u8], payload_offset: u64) {
    LittleEndian::write_u64(&mut window[OFFSET_FIELD..HEADER_SIZE], payload_offset);
}

pub(crate) fn read_offset_field(window: &[u8]) -> u64 {
    LittleEndian::read_u64(&window[OFFSET_FIELD..HEADER_SIZE])
}

pub(crate) fn read_size_field(window: &[u8]) -> u64 {
    LittleEndian::read_u64(&window[SIZE_FIELD..OFFSET_FIELD])
}
