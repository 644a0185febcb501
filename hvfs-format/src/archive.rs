use std::path::Path;

use crate::header::{self, EntryHeader, HEADER_SIZE};
use crate::reader::ArchiveReader;
use crate::validate::{self, Block, Blocks};
use crate::{io, name, Error, Result};

/// A whole archive held in one growable buffer.
///
/// The buffer is always structurally valid and every header's payload offset always
/// matches the layout. Names are unique. Lookups scan front to back, so they are linear
/// in the number of entries; appends are amortised constant time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Archive {
    buf: Vec<u8>,
}

impl Archive {
    pub fn new() -> Archive {
        Archive::default()
    }

    /// Adopts a foreign buffer after validating it. Besides the structural walk, every
    /// name must be non-empty UTF-8 and unique. Stored payload offsets are recomputed
    /// from the layout rather than trusted.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Archive> {
        validate::check_names(&bytes)?;
        let mut archive = Archive { buf: bytes };
        let corrected = archive.realign();
        if corrected > 0 {
            tracing::warn!(corrected, "recomputed stale payload offsets");
        }
        Ok(archive)
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[inline(always)]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Length of the archive in bytes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.blocks().count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Headers in archive order.
    pub fn headers(&self) -> impl Iterator<Item = EntryHeader> + '_ {
        self.blocks()
            .map(move |block| EntryHeader::decode(&self.buf[block.header_range()]))
    }

    pub fn header(&self, name: &str) -> Result<EntryHeader> {
        self.find(name)
            .map(|block| EntryHeader::decode(&self.buf[block.header_range()]))
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Builds an index over the current contents. The borrow keeps the archive from
    /// being mutated while the reader is alive.
    pub fn reader(&self) -> Result<ArchiveReader<'_>> {
        ArchiveReader::new(&self.buf)
    }

    /// Appends a new entry at the end of the archive.
    pub fn add_file(&mut self, name: &str, payload: &[u8]) -> Result<EntryHeader> {
        name::check(name)?;

        if self.contains(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }

        Ok(self.append(name, payload))
    }

    /// Reads `path` and adds it under the name derived from the path itself.
    pub fn add_path<P: AsRef<Path>>(&mut self, path: P) -> Result<EntryHeader> {
        let name = name::from_path(path.as_ref())?;
        self.add_path_as(path, &name)
    }

    /// Reads `path` and adds it under `name`, as if it were added under its own
    /// path-derived name and then renamed.
    ///
    /// Fails with [`Error::DuplicateName`] if either the path-derived name or `name` is
    /// already taken. Every check happens before the file is read or the archive is
    /// touched, so a failure leaves it unchanged.
    pub fn add_path_as<P: AsRef<Path>>(&mut self, path: P, name: &str) -> Result<EntryHeader> {
        name::check(name)?;
        self.check_source_name(path.as_ref(), None)?;

        if self.contains(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }

        let payload = io::read_file(path)?;
        Ok(self.append(name, &payload))
    }

    /// Excises an entry and re-aligns every header after it.
    pub fn remove(&mut self, name: &str) -> Result<EntryHeader> {
        let block = self
            .find(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        let header = EntryHeader::decode(&self.buf[block.header_range()]);

        self.buf.drain(block.range());
        let corrected = self.realign();

        tracing::debug!(
            name,
            start = format_args!("{:#x}", block.start),
            bytes = block.end() - block.start,
            corrected,
            "removed entry"
        );

        Ok(header)
    }

    /// Rewrites the name field of an entry in place. Payload, size and every offset are
    /// untouched, as the name field has a fixed width.
    pub fn rename(&mut self, original_name: &str, new_name: &str) -> Result<()> {
        name::check(new_name)?;

        let block = self
            .find(original_name)
            .ok_or_else(|| Error::NotFound(original_name.to_string()))?;

        if self.contains(new_name) {
            return Err(Error::DuplicateName(new_name.to_string()));
        }

        header::write_name_field(&mut self.buf[block.header_range()], new_name.as_bytes());

        tracing::debug!(original_name, new_name, "renamed entry");
        Ok(())
    }

    /// Removes `original_name`, then adds the contents of `path` as `new_name`.
    ///
    /// This is not a transaction: if reading `path` or adding the new entry fails, the
    /// original entry is already gone and is not restored. Use
    /// [`replace_file`](Archive::replace_file) when that matters, or clone the archive
    /// first.
    pub fn update_file<P: AsRef<Path>>(
        &mut self,
        original_name: &str,
        path: P,
        new_name: &str,
    ) -> Result<EntryHeader> {
        self.remove(original_name)?;
        self.add_path_as(path, new_name)
    }

    /// Replaces `original_name` with the contents of `path` stored as `new_name`.
    ///
    /// The new payload is read and every name check is made before the archive is
    /// mutated, so on failure the archive is unchanged.
    pub fn replace_file<P: AsRef<Path>>(
        &mut self,
        original_name: &str,
        path: P,
        new_name: &str,
    ) -> Result<EntryHeader> {
        name::check(new_name)?;

        if !self.contains(original_name) {
            return Err(Error::NotFound(original_name.to_string()));
        }
        self.check_source_name(path.as_ref(), Some(original_name))?;
        if new_name != original_name && self.contains(new_name) {
            return Err(Error::DuplicateName(new_name.to_string()));
        }

        let payload = io::read_file(path)?;

        self.remove(original_name)?;
        Ok(self.append(new_name, &payload))
    }

    /// Re-reads an entry from the file it names, resolved against `root`.
    ///
    /// Same hazard as [`update_file`](Archive::update_file): the entry is removed
    /// before the file is read and stays removed if reading fails.
    pub fn refresh<P: AsRef<Path>>(&mut self, root: P, name: &str) -> Result<EntryHeader> {
        let path = root.as_ref().join(name::to_relative_path(name)?);
        self.update_file(name, path, name)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        tracing::debug!(bytes = self.buf.len(), "cleared archive");
        self.buf.clear();
    }

    /// Writes the archive verbatim to `path`.
    pub fn store_fs<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        io::write_file(path.as_ref(), &self.buf)?;
        tracing::info!(
            path = %path.as_ref().display(),
            bytes = self.buf.len(),
            "stored archive"
        );
        Ok(())
    }

    /// Replaces the contents of this archive with the archive stored at `path`.
    ///
    /// If the file cannot be read or is not a valid archive, this archive is left
    /// unchanged.
    pub fn load_fs<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let bytes = io::read_file(path.as_ref())?;
        let loaded = Archive::from_bytes(bytes).map_err(|err| {
            tracing::warn!(path = %path.as_ref().display(), %err, "refusing to load archive");
            err
        })?;

        *self = loaded;
        tracing::info!(
            path = %path.as_ref().display(),
            bytes = self.buf.len(),
            "loaded archive"
        );
        Ok(())
    }

    /// Rewrites every header's payload offset to match the layout. Returns how many
    /// headers had to change.
    pub fn realign(&mut self) -> usize {
        let blocks = self.blocks().collect::<Vec<_>>();
        let mut corrected = 0;

        for block in blocks {
            let window = &mut self.buf[block.header_range()];
            let expected = block.payload_start() as u64;
            if header::read_offset_field(window) != expected {
                header::write_offset_field(window, expected);
                corrected += 1;
            }
        }

        corrected
    }

    #[inline(always)]
    fn append(&mut self, name: &str, payload: &[u8]) -> EntryHeader {
        let header = EntryHeader {
            name: name.to_string(),
            payload_size: payload.len() as u64,
            payload_offset: (self.buf.len() + HEADER_SIZE) as u64,
        };

        let mut window = [0u8; HEADER_SIZE];
        header::write_name_field(&mut window, name.as_bytes());
        header::write_size_field(&mut window, header.payload_size);
        header::write_offset_field(&mut window, header.payload_offset);

        self.buf.reserve(HEADER_SIZE + payload.len());
        self.buf.extend_from_slice(&window);
        self.buf.extend_from_slice(payload);

        tracing::debug!(
            name,
            data = format_args!("{:#x}", header.payload_offset),
            bytes = payload.len(),
            "added entry"
        );

        header
    }

    /// The name `path` would be stored under by [`add_path`](Archive::add_path) must be
    /// free, unless it is `vacating`, which is about to be removed.
    fn check_source_name(&self, path: &Path, vacating: Option<&str>) -> Result<()> {
        let source = name::from_path(path)?;
        if Some(source.as_str()) != vacating && self.contains(&source) {
            return Err(Error::DuplicateName(source));
        }
        Ok(())
    }

    /// Blocks of the buffer. The buffer is valid by construction, so the walk cannot
    /// fault.
    fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        Blocks::new(&self.buf).map_while(|block| block.ok())
    }

    fn find(&self, name: &str) -> Option<Block> {
        self.blocks()
            .find(|block| header::name_field(&self.buf[block.header_range()]) == name.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{is_consistent, is_valid};

    fn scenario() -> Archive {
        let mut archive = Archive::new();
        archive.add_file("a.txt", b"hello").unwrap();
        archive.add_file("b.bin", &[0x00, 0x01, 0x02]).unwrap();
        archive
    }

    #[test]
    fn two_entries_layout() {
        let archive = scenario();
        assert_eq!(archive.len(), 2 * HEADER_SIZE + 8);
        assert_eq!(archive.entry_count(), 2);
        assert!(is_consistent(archive.as_bytes()));

        let b = archive.header("b.bin").unwrap();
        assert_eq!(b.payload_offset, (2 * HEADER_SIZE + 5) as u64);
        assert_eq!(b.payload_size, 3);
    }

    #[test]
    fn remove_realigns_following_entries() {
        let mut archive = scenario();
        let removed = archive.remove("a.txt").unwrap();
        assert_eq!(removed.payload_size, 5);

        assert_eq!(archive.len(), HEADER_SIZE + 3);
        assert!(is_consistent(archive.as_bytes()));

        let reader = archive.reader().unwrap();
        let b = reader.get_header("b.bin").unwrap();
        assert_eq!(b.payload_offset, HEADER_SIZE as u64);
        assert_eq!(reader.get_bytes(b).unwrap(), &[0x00, 0x01, 0x02]);
        assert!(!archive.contains("a.txt"));
    }

    #[test]
    fn remove_missing() {
        let mut archive = scenario();
        let before = archive.clone();
        assert!(matches!(archive.remove("c"), Err(Error::NotFound(n)) if n == "c"));
        assert_eq!(archive, before);
    }

    #[test]
    fn duplicate_rejected_without_mutation() {
        let mut archive = scenario();
        let before = archive.clone();
        assert!(matches!(
            archive.add_file("a.txt", b"other"),
            Err(Error::DuplicateName(_))
        ));
        assert_eq!(archive, before);
    }

    #[test]
    fn invalid_names_rejected() {
        let mut archive = Archive::new();
        assert!(matches!(
            archive.add_file(&"x".repeat(crate::MAX_NAME_LEN), b""),
            Err(Error::NameTooLong { .. })
        ));
        assert!(matches!(
            archive.add_file("", b""),
            Err(Error::InvalidName(_))
        ));
        assert!(archive.is_empty());
    }

    #[test]
    fn empty_payload() {
        let mut archive = Archive::new();
        archive.add_file("empty", b"").unwrap();
        archive.add_file("next", b"x").unwrap();
        assert_eq!(archive.len(), 2 * HEADER_SIZE + 1);
        assert!(is_consistent(archive.as_bytes()));
        assert_eq!(archive.reader().unwrap().bytes("empty").unwrap(), b"");
    }

    #[test]
    fn rename_in_place() {
        let mut archive = scenario();
        let len = archive.len();
        archive.rename("a.txt", "greeting.txt").unwrap();

        assert_eq!(archive.len(), len);
        assert!(!archive.contains("a.txt"));
        assert!(is_consistent(archive.as_bytes()));

        let reader = archive.reader().unwrap();
        assert_eq!(reader.bytes("greeting.txt").unwrap(), b"hello");
        assert_eq!(
            reader.get_header("greeting.txt").unwrap().payload_offset,
            HEADER_SIZE as u64
        );
    }

    #[test]
    fn rename_to_shorter_name_clears_old_bytes() {
        let mut archive = Archive::new();
        archive.add_file("a-long-name", b"1").unwrap();
        archive.rename("a-long-name", "ab").unwrap();
        assert!(archive.contains("ab"));
        assert!(!archive.contains("ab-long-name"));
        assert_eq!(archive.header("ab").unwrap().name(), "ab");
    }

    #[test]
    fn rename_errors() {
        let mut archive = scenario();
        let before = archive.clone();

        assert!(matches!(
            archive.rename("missing", "c"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            archive.rename("a.txt", "b.bin"),
            Err(Error::DuplicateName(n)) if n == "b.bin"
        ));
        assert!(matches!(
            archive.rename("a.txt", &"y".repeat(crate::MAX_NAME_LEN)),
            Err(Error::NameTooLong { .. })
        ));
        assert_eq!(archive, before);
    }

    #[test]
    fn remove_then_readd_is_equivalent() {
        let mut first = Archive::new();
        first.add_file("A", b"x").unwrap();
        first.add_file("B", b"y").unwrap();
        first.remove("A").unwrap();
        first.add_file("A", b"x").unwrap();

        let mut second = Archive::new();
        second.add_file("B", b"y").unwrap();
        second.add_file("A", b"x").unwrap();

        let a = first.reader().unwrap();
        let b = second.reader().unwrap();
        assert_eq!(a.len(), b.len());
        for (name, _) in a.iter() {
            assert_eq!(a.bytes(name).unwrap(), b.bytes(name).unwrap());
        }
        assert!(is_consistent(first.as_bytes()));
    }

    #[test]
    fn from_bytes_recomputes_offsets() {
        let mut bytes = scenario().into_bytes();
        header::write_offset_field(&mut bytes[..HEADER_SIZE], 999);
        assert!(is_valid(&bytes));
        assert!(!is_consistent(&bytes));

        let archive = Archive::from_bytes(bytes).unwrap();
        assert!(is_consistent(archive.as_bytes()));
        assert_eq!(archive, scenario());
    }

    #[test]
    fn from_bytes_rejects_corrupt() {
        let mut bytes = scenario().into_bytes();
        bytes.pop();
        assert!(matches!(
            Archive::from_bytes(bytes),
            Err(Error::CorruptArchive { .. })
        ));
    }

    #[test]
    fn headers_in_order() {
        let archive = scenario();
        let names = archive
            .headers()
            .map(|h| h.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["a.txt", "b.bin"]);
    }

    #[test]
    fn from_bytes_rejects_repeated_or_empty_names() {
        let mut twice = scenario().into_bytes();
        twice.extend_from_slice(scenario().as_bytes());
        assert!(is_valid(&twice));
        assert!(matches!(
            Archive::from_bytes(twice),
            Err(Error::CorruptArchive { reason: "duplicate entry name", .. })
        ));

        let mut unnamed = scenario().into_bytes();
        header::write_name_field(&mut unnamed[..HEADER_SIZE], b"");
        assert!(matches!(
            Archive::from_bytes(unnamed),
            Err(Error::CorruptArchive { offset: 0, reason: "empty entry name" })
        ));
    }

    #[test]
    fn clear_drops_everything() {
        let mut archive = scenario();
        archive.clear();
        assert!(archive.is_empty());
        assert_eq!(archive.entry_count(), 0);
        assert_eq!(archive, Archive::new());

        archive.add_file("a.txt", b"again").unwrap();
        assert_eq!(archive.header("a.txt").unwrap().payload_offset, HEADER_SIZE as u64);
    }
}
