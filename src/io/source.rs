//! Re-openable tractography input.
//!
//! Both loading passes and the TrackVis endianness check each need their own
//! cursor starting at byte 0. A [`TractSource`] hands out a fresh
//! [`ByteDecoder`] on every call to [`TractSource::reader`], backed by a
//! memory map, a reopened file handle, or an in-memory buffer.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::Mmap;

use super::ByteDecoder;
use crate::util::{Error, Result};

/// Read buffer size for the buffered-file mode.
const FILE_BUFFER_SIZE: usize = 1024 * 1024;

/// Shared immutable bytes (mapped or owned).
#[derive(Clone)]
pub enum SharedBytes {
    Mapped(Arc<Mmap>),
    Owned(Arc<[u8]>),
}

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            SharedBytes::Mapped(m) => &m[..],
            SharedBytes::Owned(b) => &b[..],
        }
    }
}

/// A file (or buffer) that can be read from the start any number of times.
#[derive(Clone)]
pub struct TractSource {
    inner: SourceInner,
    path: Option<PathBuf>,
    len: u64,
}

#[derive(Clone)]
enum SourceInner {
    /// Whole contents already addressable
    Bytes(SharedBytes),
    /// Reopen the file for every pass
    File(PathBuf),
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })
}

impl TractSource {
    /// Open a file, memory-mapping it when the `mmap` feature is enabled.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, cfg!(feature = "mmap"))
    }

    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = open_file(path)?;
        let len = file.metadata()?.len();

        let inner = if use_mmap && len > 0 {
            // Safety: File is opened read-only; callers must not truncate it while loading
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            SourceInner::Bytes(SharedBytes::Mapped(Arc::new(mmap)))
        } else {
            SourceInner::File(path.to_path_buf())
        };

        Ok(Self { inner, path: Some(path.to_path_buf()), len })
    }

    /// Wrap an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        let len = bytes.len() as u64;
        Self {
            inner: SourceInner::Bytes(SharedBytes::Owned(bytes)),
            path: None,
            len,
        }
    }

    /// Total length in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True for a zero-length source.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Path this source was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True when reads are served from a memory map.
    pub fn is_mapped(&self) -> bool {
        matches!(self.inner, SourceInner::Bytes(SharedBytes::Mapped(_)))
    }

    /// Fresh decoder positioned at byte 0, independent of any other reader.
    pub fn reader(&self) -> Result<ByteDecoder<SourceReader>> {
        let reader = match &self.inner {
            SourceInner::Bytes(bytes) => SourceReader::Bytes(Cursor::new(bytes.clone())),
            SourceInner::File(path) => {
                SourceReader::File(BufReader::with_capacity(FILE_BUFFER_SIZE, open_file(path)?))
            }
        };
        Ok(ByteDecoder::new(reader))
    }
}

impl std::fmt::Debug for TractSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TractSource")
            .field("path", &self.path)
            .field("len", &self.len)
            .field("mapped", &self.is_mapped())
            .finish()
    }
}

/// Sequential reader over a [`TractSource`].
pub enum SourceReader {
    Bytes(Cursor<SharedBytes>),
    File(BufReader<File>),
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            SourceReader::Bytes(c) => c.read(buf),
            SourceReader::File(f) => f.read(buf),
        }
    }
}

impl BufRead for SourceReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            SourceReader::Bytes(c) => c.fill_buf(),
            SourceReader::File(f) => f.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            SourceReader::Bytes(c) => c.consume(amt),
            SourceReader::File(f) => f.consume(amt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Endian;
    use std::io::Write;

    #[test]
    fn test_readers_are_independent() {
        let src = TractSource::from_bytes(vec![0u8, 0, 0, 7, 0, 0, 0, 9]);
        let mut a = src.reader().unwrap();
        assert_eq!(a.read_i32(Endian::Big).unwrap(), 7);
        let mut b = src.reader().unwrap();
        assert_eq!(b.read_i32(Endian::Big).unwrap(), 7);
        assert_eq!(a.read_i32(Endian::Big).unwrap(), 9);
        assert_eq!(src.len(), 8);
        assert!(src.path().is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let err = TractSource::open("/definitely/not/here.tck").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_open_both_modes() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&[1, 2, 3]).unwrap();
        tmp.flush().unwrap();

        for use_mmap in [true, false] {
            let src = TractSource::open_opts(tmp.path(), use_mmap).unwrap();
            assert_eq!(src.is_mapped(), use_mmap);
            assert_eq!(src.len(), 3);
            let mut r = src.reader().unwrap();
            assert_eq!(r.read_u8().unwrap(), 1);
            r.skip(2).unwrap();
            assert!(r.read_u8().unwrap_err().is_truncation());
        }
    }
}
