//! Error types for the tractstore library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tractography loading and storage.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File extension maps to neither supported format
    #[error("Unknown tractography format: {0}")]
    UnknownFormat(PathBuf),

    /// Fewer bytes remained than a decode requested
    #[error("Truncated stream at byte {pos}")]
    TruncatedStream { pos: u64 },

    /// Header is malformed, truncated, or never terminates
    #[error("Header integrity check failed: {0}")]
    HeaderIntegrity(String),

    /// Missing or unrecognized sample datatype
    #[error("Unsupported datatype: {0}")]
    UnsupportedDataType(String),

    /// Malformed track body
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Counting and filling passes disagree on totals
    #[error("Count/fill mismatch: counted {counted:?} (tracks, scalars), filled {filled:?}")]
    CountFillMismatch { counted: (u64, u64), filled: (u64, u64) },

    /// Store capacity would be exceeded by a placement
    #[error("Capacity exceeded: need {needed} bytes at offset {offset}, capacity {capacity}")]
    CapacityExceeded { offset: usize, needed: usize, capacity: usize },

    /// Chain index outside the store
    #[error("Index {index} out of range (count: {count})")]
    IndexOutOfRange { index: u64, count: u64 },

    /// Placement skipped or repeated an index
    #[error("Placement out of order: got index {index}, expected {expected}")]
    PlacementOrder { index: u64, expected: u64 },

    /// Slot read or updated before it was placed
    #[error("Slot {0} has not been placed")]
    UnplacedSlot(u64),

    /// Overwrite larger than the slot it replaces
    #[error("Slot {index} holds {slot} bytes, replacement needs {needed}")]
    SlotOverflow { index: u64, slot: usize, needed: usize },

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create a header integrity error.
    pub fn header(msg: impl Into<String>) -> Self {
        Self::HeaderIntegrity(msg.into())
    }

    /// True for the end-of-stream signal.
    #[inline]
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::TruncatedStream { .. })
    }
}

/// Result type alias for tractstore operations.
pub type Result<T> = std::result::Result<T, Error>;
