//! Structural validation of archive buffers.
//!
//! Every buffer that did not come from this crate's own mutations must pass through
//! here before any header in it is trusted: a payload size read from a foreign header
//! is used directly to index memory.

use std::collections::HashSet;
use std::ops::Range;

use crate::header::{self, EntryHeader, HEADER_SIZE};
use crate::{Error, Result};

/// The position of one `(header, payload)` block in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Block {
    pub(crate) start: usize,
    pub(crate) payload_len: usize,
}

impl Block {
    #[inline(always)]
    pub(crate) fn payload_start(&self) -> usize {
        self.start + HEADER_SIZE
    }

    #[inline(always)]
    pub(crate) fn end(&self) -> usize {
        self.payload_start() + self.payload_len
    }

    #[inline(always)]
    pub(crate) fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    #[inline(always)]
    pub(crate) fn header_range(&self) -> Range<usize> {
        self.start..self.payload_start()
    }
}

/// Walks the blocks of a buffer front to back without decoding names.
///
/// Yields one error and then stops if the buffer is malformed.
#[derive(Debug, Clone)]
pub(crate) struct Blocks<'a> {
    bytes: &'a [u8],
    ptr: usize,
    failed: bool,
}

impl<'a> Blocks<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Blocks<'a> {
        Blocks {
            bytes,
            ptr: 0,
            failed: false,
        }
    }

    fn fail(&mut self, reason: &'static str) -> Option<Result<Block>> {
        self.failed = true;
        Some(Err(corrupt(self.ptr, reason)))
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.ptr == self.bytes.len() {
            return None;
        }

        let remaining = self.bytes.len() - self.ptr;
        if remaining < HEADER_SIZE {
            return self.fail("truncated header");
        }

        let window = &self.bytes[self.ptr..self.ptr + HEADER_SIZE];
        let payload_len = match usize::try_from(header::read_size_field(window)) {
            Ok(len) if len <= remaining - HEADER_SIZE => len,
            _ => return self.fail("payload runs past the end of the archive"),
        };

        let block = Block {
            start: self.ptr,
            payload_len,
        };
        self.ptr = block.end();
        Some(Ok(block))
    }
}

fn corrupt(offset: usize, reason: &'static str) -> Error {
    tracing::debug!(offset = format_args!("{:#x}", offset), reason, "archive walk failed");
    Error::CorruptArchive { offset, reason }
}

/// The exact name of the entry at `block`. Empty names and names that are not UTF-8
/// are faults: they could not be looked up or told apart.
pub(crate) fn entry_name<'a>(bytes: &'a [u8], block: &Block) -> Result<&'a str> {
    let field = header::name_field(&bytes[block.header_range()]);
    if field.is_empty() {
        return Err(corrupt(block.start, "empty entry name"));
    }
    std::str::from_utf8(field).map_err(|_| corrupt(block.start, "entry name is not valid UTF-8"))
}

/// Decoded headers of a buffer in archive order, paired with the offset each header
/// starts at.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    blocks: Blocks<'a>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = Result<(usize, EntryHeader)>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.blocks.bytes;
        self.blocks.next().map(|block| {
            block.map(|block| {
                (
                    block.start,
                    EntryHeader::decode(&bytes[block.header_range()]),
                )
            })
        })
    }
}

/// Walks `bytes` structurally. Names are decoded lossily and not checked; see
/// [`check_names`].
pub fn walk(bytes: &[u8]) -> Walk<'_> {
    Walk {
        blocks: Blocks::new(bytes),
    }
}

/// Runs the full structural walk, returning the number of entries or the first fault.
pub fn check(bytes: &[u8]) -> Result<usize> {
    Blocks::new(bytes).try_fold(0, |count, block| block.map(|_| count + 1))
}

/// Like [`check`], and additionally every name is non-empty UTF-8 and occurs once.
pub fn check_names(bytes: &[u8]) -> Result<usize> {
    let mut seen = HashSet::new();
    for block in Blocks::new(bytes) {
        let block = block?;
        if !seen.insert(entry_name(bytes, &block)?) {
            return Err(corrupt(block.start, "duplicate entry name"));
        }
    }
    Ok(seen.len())
}

/// Whether `bytes` decodes into a sequence of in-bounds blocks that ends exactly at
/// the end of the buffer.
pub fn is_valid(bytes: &[u8]) -> bool {
    check(bytes).is_ok()
}

/// Like [`is_valid`], and additionally every stored payload offset matches the
/// layout.
pub fn is_consistent(bytes: &[u8]) -> bool {
    Blocks::new(bytes).all(|block| match block {
        Ok(block) => {
            header::read_offset_field(&bytes[block.header_range()])
                == block.payload_start() as u64
        }
        Err(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::encode;

    fn block(name: &str, payload: &[u8], offset: usize) -> Vec<u8> {
        let mut out = encode(name, payload.len() as u64, offset as u64)
            .unwrap()
            .to_vec();
        out.extend_from_slice(payload);
        out
    }

    fn raw_block(name: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut out = block("placeholder", payload, 0);
        header::write_name_field(&mut out, name);
        out
    }

    fn two_entries() -> Vec<u8> {
        let mut buf = block("a.txt", b"hello", HEADER_SIZE);
        let next = buf.len() + HEADER_SIZE;
        buf.extend(block("b.bin", &[0, 1, 2], next));
        buf
    }

    #[test]
    fn empty_is_valid() {
        assert!(is_valid(&[]));
        assert!(is_consistent(&[]));
        assert_eq!(check(&[]).unwrap(), 0);
    }

    #[test]
    fn walks_entries() {
        let buf = two_entries();
        assert_eq!(check(&buf).unwrap(), 2);

        let headers = walk(&buf).collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(headers[0].0, 0);
        assert_eq!(headers[0].1.name(), "a.txt");
        assert_eq!(headers[1].0, HEADER_SIZE + 5);
        assert_eq!(headers[1].1.name(), "b.bin");
        assert_eq!(headers[1].1.payload_offset, (2 * HEADER_SIZE + 5) as u64);
    }

    #[test]
    fn truncated_payload() {
        let mut buf = two_entries();
        buf.pop();
        assert!(!is_valid(&buf));
        match check(&buf) {
            Err(Error::CorruptArchive { offset, .. }) => assert_eq!(offset, HEADER_SIZE + 5),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn truncated_header() {
        let buf = two_entries();
        assert!(!is_valid(&buf[..HEADER_SIZE - 1]));
        assert!(!is_valid(&buf[..HEADER_SIZE + 5 + 10]));
    }

    #[test]
    fn trailing_garbage() {
        let mut buf = two_entries();
        buf.push(0);
        assert!(!is_valid(&buf));
    }

    #[test]
    fn huge_payload_size() {
        let buf = encode("big", u64::MAX, HEADER_SIZE as u64).unwrap();
        assert!(!is_valid(&buf));
    }

    #[test]
    fn walk_stops_after_fault() {
        let mut buf = two_entries();
        buf.truncate(buf.len() - 1);
        let items = walk(&buf).collect::<Vec<_>>();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }

    #[test]
    fn validation_does_not_mutate() {
        let buf = two_entries();
        let copy = buf.clone();
        assert_eq!(is_valid(&buf), is_valid(&buf));
        assert_eq!(buf, copy);
    }

    #[test]
    fn stale_offset_is_valid_but_inconsistent() {
        let mut buf = block("a.txt", b"hello", 7);
        assert!(is_valid(&buf));
        assert!(!is_consistent(&buf));

        header::write_offset_field(&mut buf, HEADER_SIZE as u64);
        assert!(is_consistent(&buf));
    }

    #[test]
    fn names_checked_as_exact_bytes() {
        assert_eq!(check_names(&two_entries()).unwrap(), 2);

        let mut buf = raw_block(&[0xff], b"1");
        buf.extend(raw_block(&[0xfe], b"2"));
        assert!(is_valid(&buf));
        match check_names(&buf) {
            Err(Error::CorruptArchive { offset, reason }) => {
                assert_eq!(offset, 0);
                assert_eq!(reason, "entry name is not valid UTF-8");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn empty_and_repeated_names() {
        let empty = raw_block(b"", b"x");
        assert!(is_valid(&empty));
        assert!(matches!(
            check_names(&empty),
            Err(Error::CorruptArchive { reason: "empty entry name", .. })
        ));

        let mut twice = block("dup", b"1", HEADER_SIZE);
        twice.extend(block("dup", b"2", 2 * HEADER_SIZE + 1));
        match check_names(&twice) {
            Err(Error::CorruptArchive { offset, reason }) => {
                assert_eq!(offset, HEADER_SIZE + 1);
                assert_eq!(reason, "duplicate entry name");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
