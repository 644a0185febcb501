use std::borrow::Cow;
use std::collections::hash_map::{Entry, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::header::{self, EntryHeader};
use crate::validate::{self, Blocks};
use crate::{io, name, Error, Result};

/// A name index over an archive buffer.
///
/// The reader borrows the buffer it was built from and hands out views into it, so the
/// buffer cannot be mutated or dropped while the reader or any view is alive. Build a
/// new reader after every mutation.
#[derive(Debug, Clone)]
pub struct ArchiveReader<'a> {
    bytes: &'a [u8],
    index: HashMap<String, EntryHeader>,
}

impl<'a> ArchiveReader<'a> {
    /// Indexes `bytes` in one walk, failing if the buffer is not a valid archive or
    /// holds a name that is empty or not UTF-8.
    ///
    /// Payload offsets in the index are derived from the layout; stored offsets are not
    /// trusted. If a name occurs more than once, the first occurrence wins.
    pub fn new(bytes: &'a [u8]) -> Result<ArchiveReader<'a>> {
        let mut index = HashMap::new();

        for block in Blocks::new(bytes) {
            let block = block?;
            let name = validate::entry_name(bytes, &block)?;

            let derived = block.payload_start() as u64;
            let stored = header::read_offset_field(&bytes[block.header_range()]);
            if stored != derived {
                tracing::debug!(
                    name,
                    stored = format_args!("{:#x}", stored),
                    derived = format_args!("{:#x}", derived),
                    "stale payload offset"
                );
            }

            match index.entry(name.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(EntryHeader {
                        name: name.to_string(),
                        payload_size: block.payload_len as u64,
                        payload_offset: derived,
                    });
                }
                Entry::Occupied(_) => {
                    tracing::warn!(
                        name,
                        start = format_args!("{:#x}", block.start),
                        "ignoring duplicate entry"
                    );
                }
            }
        }

        tracing::debug!(entries = index.len(), bytes = bytes.len(), "indexed archive");

        Ok(ArchiveReader { bytes, index })
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline(always)]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries of the index, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntryHeader)> + '_ {
        self.index.iter().map(|(name, header)| (name.as_str(), header))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.keys().map(String::as_str)
    }

    pub fn get_header(&self, name: &str) -> Result<&EntryHeader> {
        self.index
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// The payload described by `header`, borrowed from the archive buffer.
    pub fn get_bytes(&self, header: &EntryHeader) -> Result<&'a [u8]> {
        let out_of_bounds = || Error::OutOfBounds {
            start: header.payload_offset,
            len: header.payload_size,
            archive_len: self.bytes.len(),
        };

        let range = header.payload_range().ok_or_else(out_of_bounds)?;
        self.bytes.get(range).ok_or_else(out_of_bounds)
    }

    /// A copy of the payload described by `header`, independent of the buffer.
    pub fn get_owned_bytes(&self, header: &EntryHeader) -> Result<Vec<u8>> {
        self.get_bytes(header).map(<[u8]>::to_vec)
    }

    /// The payload of `entry`, a name or a header, borrowed from the archive buffer.
    pub fn bytes<S: Selector + ?Sized>(&self, entry: &S) -> Result<&'a [u8]> {
        let header = entry.resolve(self)?;
        self.get_bytes(header)
    }

    pub fn owned_bytes<S: Selector + ?Sized>(&self, entry: &S) -> Result<Vec<u8>> {
        let header = entry.resolve(self)?;
        self.get_owned_bytes(header)
    }

    /// Applies `decode` to the payload of `entry`, handing it either a borrowed view or
    /// an owned copy.
    pub fn decode_as<S, T, F>(&self, entry: &S, zero_copy: bool, decode: F) -> Result<T>
    where
        S: Selector + ?Sized,
        F: FnOnce(Cow<'a, [u8]>) -> T,
    {
        let header = entry.resolve(self)?;
        let payload = if zero_copy {
            Cow::Borrowed(self.get_bytes(header)?)
        } else {
            Cow::Owned(self.get_owned_bytes(header)?)
        };
        Ok(decode(payload))
    }

    #[inline(always)]
    pub fn decode_value<V: DecodePayload, S: Selector + ?Sized>(&self, entry: &S) -> Result<V> {
        V::decode_payload(self.bytes(entry)?)
    }

    /// Writes the payload of `name` to `dest` joined with the sanitised entry name.
    pub fn extract<P: AsRef<Path>>(&self, name: &str, dest: P) -> Result<PathBuf> {
        let header = self.get_header(name)?;
        self.extract_inner(header, dest.as_ref())
    }

    /// Writes every payload under `dest`. Returns the number of files written.
    pub fn extract_all<P: AsRef<Path>>(&self, dest: P) -> Result<usize> {
        let mut headers = self.index.values().collect::<Vec<_>>();
        headers.sort_by_key(|header| header.payload_offset);

        for header in headers.iter() {
            self.extract_inner(header, dest.as_ref())?;
        }
        Ok(headers.len())
    }

    fn extract_inner(&self, header: &EntryHeader, dest: &Path) -> Result<PathBuf> {
        let path = dest.join(name::to_relative_path(header.name())?);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| Error::io(source, parent))?;
        }
        io::write_file(&path, self.get_bytes(header)?)?;
        tracing::debug!(name = header.name(), path = %path.display(), "extracted entry");
        Ok(path)
    }
}

/// Something that identifies an entry of an [`ArchiveReader`]: its name or its header.
pub trait Selector {
    fn resolve<'r>(&'r self, reader: &'r ArchiveReader<'_>) -> Result<&'r EntryHeader>;
}

impl Selector for str {
    fn resolve<'r>(&'r self, reader: &'r ArchiveReader<'_>) -> Result<&'r EntryHeader> {
        reader.get_header(self)
    }
}

impl Selector for String {
    fn resolve<'r>(&'r self, reader: &'r ArchiveReader<'_>) -> Result<&'r EntryHeader> {
        reader.get_header(self)
    }
}

impl Selector for EntryHeader {
    fn resolve<'r>(&'r self, _reader: &'r ArchiveReader<'_>) -> Result<&'r EntryHeader> {
        Ok(self)
    }
}

/// Values that can be decoded from a payload.
pub trait DecodePayload: Sized {
    fn decode_payload(bytes: &[u8]) -> Result<Self>;
}

impl DecodePayload for Vec<u8> {
    fn decode_payload(bytes: &[u8]) -> Result<Self> {
        Ok(bytes.to_vec())
    }
}

impl DecodePayload for String {
    fn decode_payload(bytes: &[u8]) -> Result<Self> {
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::Decode(Box::new(e)))
    }
}

/// An archive file mapped read-only into memory and validated.
#[derive(Debug)]
pub struct MappedArchive {
    path: PathBuf,
    mmap: Option<Mmap>,
}

impl MappedArchive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<MappedArchive> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::io(source, path))?;
        let len = file
            .metadata()
            .map_err(|source| Error::io(source, path))?
            .len();

        // Zero-length mappings are rejected on some platforms; an empty archive needs none.
        let mmap = if len == 0 {
            None
        } else {
            Some(unsafe { Mmap::map(&file) }.map_err(|source| Error::io(source, path))?)
        };

        let archive = MappedArchive {
            path: path.to_path_buf(),
            mmap,
        };

        let entries = validate::check(archive.as_bytes())?;
        tracing::info!(path = %path.display(), len, entries, "mapped archive");

        Ok(archive)
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    pub fn reader(&self) -> Result<ArchiveReader<'_>> {
        ArchiveReader::new(self.as_bytes())
    }
}
