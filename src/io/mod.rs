//! Byte-level input: sources that can be reopened per pass and the decoder
//! that reads scalars and fixed-width strings from them.

mod decoder;
mod source;

pub use decoder::*;
pub use source::*;
