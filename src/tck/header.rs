//! MRtrix text header and sample datatype.

use std::fmt;
use std::io::BufRead;

use crate::io::{ByteDecoder, Endian};
use crate::util::{Error, Result};

/// On-disk type of one coordinate.
///
/// The unsuffixed variants are read big-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Float32,
    Float32BE,
    Float32LE,
    Float64,
    Float64BE,
    Float64LE,
}

impl DataType {
    /// Parse a header value (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        [
            Self::Float32,
            Self::Float32BE,
            Self::Float32LE,
            Self::Float64,
            Self::Float64BE,
            Self::Float64LE,
        ]
        .into_iter()
        .find(|dt| dt.name().eq_ignore_ascii_case(name))
    }

    /// Header spelling of this datatype.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Float32 => "Float32",
            Self::Float32BE => "Float32BE",
            Self::Float32LE => "Float32LE",
            Self::Float64 => "Float64",
            Self::Float64BE => "Float64BE",
            Self::Float64LE => "Float64LE",
        }
    }

    /// Bytes per coordinate.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Float32 | Self::Float32BE | Self::Float32LE => 4,
            Self::Float64 | Self::Float64BE | Self::Float64LE => 8,
        }
    }

    /// Byte order of each coordinate.
    #[inline]
    pub const fn endian(self) -> Endian {
        match self {
            Self::Float32LE | Self::Float64LE => Endian::Little,
            _ => Endian::Big,
        }
    }

    /// Bytes per (x, y, z) triple.
    #[inline]
    pub const fn triple_bytes(self) -> usize {
        3 * self.num_bytes()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsed `key: value` header of a `.tck` file.
#[derive(Clone, Debug, PartialEq)]
pub struct TckHeader {
    /// Every `key: value` line in file order, trimmed
    pub entries: Vec<(String, String)>,
    pub datatype: DataType,
    /// Byte offset just past the `end` line
    pub header_len: u64,
}

impl TckHeader {
    /// Read header lines up to and including the `end` line.
    pub fn read<R: BufRead>(r: &mut ByteDecoder<R>) -> Result<Self> {
        let mut entries = Vec::new();
        let mut datatype: Option<DataType> = None;
        let mut datatype_raw: Option<String> = None;

        loop {
            let line = read_line(r)?.ok_or_else(|| {
                Error::header(format!("input ended at byte {} before the 'end' line", r.position()))
            })?;
            let line = line.trim();
            if line.eq_ignore_ascii_case("end") {
                break;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                continue;
            }
            if key.eq_ignore_ascii_case("datatype") {
                // An unrecognized value leaves any earlier valid one in place.
                if let Some(dt) = DataType::from_name(value) {
                    datatype = Some(dt);
                }
                datatype_raw = Some(value.to_string());
            }
            entries.push((key.to_string(), value.to_string()));
        }

        let datatype = datatype.ok_or_else(|| {
            Error::UnsupportedDataType(datatype_raw.unwrap_or_else(|| "missing datatype key".to_string()))
        })?;

        Ok(Self { entries, datatype, header_len: r.position() })
    }

    /// First value for `key` (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Track count from the `count` key, if present and numeric.
    pub fn declared_count(&self) -> Option<u64> {
        self.get("count")?.parse().ok()
    }
}

impl fmt::Display for TckHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in &self.entries {
            writeln!(f, "{}: {}", k, v)?;
        }
        write!(f, "header bytes: {}", self.header_len)
    }
}

/// Read one line terminated by LF, CR, or CRLF.
///
/// Returns `None` at end of input when nothing was read. Bytes are taken as
/// Latin-1.
pub fn read_line<R: BufRead>(r: &mut ByteDecoder<R>) -> Result<Option<String>> {
    let mut line = String::new();
    loop {
        let Some(b) = r.peek_u8()? else {
            return Ok((!line.is_empty()).then_some(line));
        };
        r.read_u8()?;
        match b {
            b'\n' => return Ok(Some(line)),
            b'\r' => {
                if r.peek_u8()? == Some(b'\n') {
                    r.read_u8()?;
                }
                return Ok(Some(line));
            }
            _ => line.push(b as char),
        }
    }
}
