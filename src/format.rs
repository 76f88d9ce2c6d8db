//! Input format selection and the header of either format.

use std::fmt;
use std::path::Path;

use crate::tck::TckHeader;
use crate::trk::TrkHeader;
use crate::util::{Error, Result};

/// Supported tractography file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TractFormat {
    /// TrackVis `.trk`
    Trk,
    /// MRtrix `.tck`
    Tck,
}

impl TractFormat {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("trk") => Ok(Self::Trk),
            Some("tck") => Ok(Self::Tck),
            _ => Err(Error::UnknownFormat(path.to_path_buf())),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Trk => "TrackVis",
            Self::Tck => "MRtrix",
        }
    }
}

impl fmt::Display for TractFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Header returned by a traversal of either format.
#[derive(Clone, Debug, PartialEq)]
pub enum TractHeader {
    Trk(TrkHeader),
    Tck(TckHeader),
}

impl TractHeader {
    pub fn format(&self) -> TractFormat {
        match self {
            Self::Trk(_) => TractFormat::Trk,
            Self::Tck(_) => TractFormat::Tck,
        }
    }

    /// Track count the header claims, if it records one.
    pub fn declared_count(&self) -> Option<u64> {
        match self {
            Self::Trk(h) => h.declared_track_count(),
            Self::Tck(h) => h.declared_count(),
        }
    }

    pub fn as_trk(&self) -> Option<&TrkHeader> {
        match self {
            Self::Trk(h) => Some(h),
            Self::Tck(_) => None,
        }
    }

    pub fn as_tck(&self) -> Option<&TckHeader> {
        match self {
            Self::Tck(h) => Some(h),
            Self::Trk(_) => None,
        }
    }
}

impl fmt::Display for TractHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trk(h) => h.fmt(f),
            Self::Tck(h) => h.fmt(f),
        }
    }
}
