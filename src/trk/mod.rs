//! TrackVis (`.trk`) reader.
//!
//! ## File Structure
//!
//! ```text
//! +----------------------+
//! | Header               |  1000 bytes, hdr_size (= 1000) at offset 996
//! +----------------------+
//! | i32 point count P    |
//! | P x (3 + Ns) f32     |  x, y, z, then Ns per-point scalars
//! | Np f32               |  per-track properties
//! +----------------------+
//! | ... next track ...   |  until the input ends
//! +----------------------+
//! ```
//!
//! Byte order is not stored explicitly. `hdr_size` read big-endian equals
//! 1000 only in big-endian files.

mod header;
mod reader;

pub use header::*;
pub use reader::*;

/// Magic prefix of the id string.
pub const MAGIC: &str = "TRACK";

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 1000;

/// Offset of the `hdr_size` field.
pub const HDR_SIZE_OFFSET: u64 = 996;

/// Width of the id string field.
pub const ID_LEN: usize = 6;

/// Number of scalar/property name slots.
pub const MAX_NAMES: usize = 10;

/// Width of each scalar/property name.
pub const NAME_LEN: usize = 20;

/// Width of the reserved block.
pub const RESERVED_LEN: usize = 444;

/// Per-chain store overhead for TrackVis input.
pub const CHAIN_OVERHEAD_BYTES: usize = crate::ragged::CHAIN_HEADER_BYTES;
