//! Endianness-aware scalar and string decoding over a forward-only stream.

use std::io::{self, BufRead, Read};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::util::{Error, Result};

/// Byte order of multi-byte scalars in a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

impl std::fmt::Display for Endian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endian::Little => write!(f, "little-endian"),
            Endian::Big => write!(f, "big-endian"),
        }
    }
}

/// Forward-only decoder that tracks its absolute byte position.
///
/// Every read consumes exactly the width of the value. A read that runs out
/// of input fails with [`Error::TruncatedStream`] carrying the position the
/// read started at.
pub struct ByteDecoder<R> {
    inner: R,
    pos: u64,
}

impl<R: BufRead> ByteDecoder<R> {
    /// Wrap a reader positioned at byte 0.
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }

    /// Absolute position of the next byte to be read.
    #[inline]
    pub fn position(&self) -> u64 {
        self.pos
    }

    #[inline]
    fn advance<T>(&mut self, read: io::Result<T>, width: u64) -> Result<T> {
        match read {
            Ok(v) => {
                self.pos += width;
                Ok(v)
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(Error::TruncatedStream { pos: self.pos })
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let v = self.inner.read_u8();
        self.advance(v, 1)
    }

    /// Look at the next byte without consuming it. `None` at end of input.
    pub fn peek_u8(&mut self) -> Result<Option<u8>> {
        let buf = self.inner.fill_buf()?;
        Ok(buf.first().copied())
    }

    /// Read a 16-bit signed integer.
    pub fn read_i16(&mut self, endian: Endian) -> Result<i16> {
        let v = match endian {
            Endian::Little => self.inner.read_i16::<LittleEndian>(),
            Endian::Big => self.inner.read_i16::<BigEndian>(),
        };
        self.advance(v, 2)
    }

    /// Read a 32-bit signed integer.
    pub fn read_i32(&mut self, endian: Endian) -> Result<i32> {
        let v = match endian {
            Endian::Little => self.inner.read_i32::<LittleEndian>(),
            Endian::Big => self.inner.read_i32::<BigEndian>(),
        };
        self.advance(v, 4)
    }

    /// Read a 32-bit float.
    pub fn read_f32(&mut self, endian: Endian) -> Result<f32> {
        let v = match endian {
            Endian::Little => self.inner.read_f32::<LittleEndian>(),
            Endian::Big => self.inner.read_f32::<BigEndian>(),
        };
        self.advance(v, 4)
    }

    /// Read a 64-bit float.
    pub fn read_f64(&mut self, endian: Endian) -> Result<f64> {
        let v = match endian {
            Endian::Little => self.inner.read_f64::<LittleEndian>(),
            Endian::Big => self.inner.read_f64::<BigEndian>(),
        };
        self.advance(v, 8)
    }

    /// Read exactly `buf.len()` bytes.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let v = self.inner.read_exact(buf);
        self.advance(v, buf.len() as u64)
    }

    /// Read a fixed-width NUL-padded ASCII field.
    ///
    /// Always consumes `max_chars` bytes; characters after the first NUL are
    /// dropped.
    pub fn read_fixed_string(&mut self, max_chars: usize) -> Result<String> {
        let mut buf = vec![0u8; max_chars];
        self.read_exact(&mut buf)?;
        let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Ok(buf[..len].iter().map(|&b| b as char).collect())
    }

    /// Discard `count` bytes.
    pub fn skip(&mut self, count: u64) -> Result<()> {
        let copied = io::copy(&mut (&mut self.inner).take(count), &mut io::sink())?;
        self.pos += copied;
        if copied < count {
            return Err(Error::TruncatedStream { pos: self.pos });
        }
        Ok(())
    }
}
