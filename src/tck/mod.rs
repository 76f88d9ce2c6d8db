//! MRtrix (`.tck`) reader.
//!
//! ## File Structure
//!
//! ```text
//! mrtrix tracks            <- text lines, LF / CR / CRLF
//! datatype: Float32LE
//! count: 42
//! end
//! [cruft]                  <- (len - pos) mod triple size, skipped
//! x y z x y z ...          <- one track's points
//! NaN NaN NaN              <- end of track
//! ...
//! Inf Inf Inf              <- end of data
//! ```

mod header;
mod reader;

pub use header::*;
pub use reader::*;

/// Per-chain store overhead for MRtrix input.
pub const CHAIN_OVERHEAD_BYTES: usize = crate::ragged::CHAIN_HEADER_BYTES;
