//! # tractstore
//!
//! Loader for tractography streamline files into a compact, exactly sized
//! in-memory store, with axis-aligned box queries.
//!
//! Two input formats are supported: TrackVis (`.trk`, fixed binary header
//! with length-prefixed tracks) and MRtrix (`.tck`, text header with
//! sentinel-delimited tracks). Loading makes two passes over the file: the
//! first counts chains and coordinates, the second serializes every chain
//! into a [`ragged::RaggedStore`] allocated for exactly those totals.
//!
//! ## Modules
//!
//! - [`util`] - Errors, bounding boxes, vector types
//! - [`io`] - Byte decoding and re-readable file sources
//! - [`trk`] - TrackVis reader
//! - [`tck`] - MRtrix reader
//! - [`geom`] - Chains, bounds and box search
//! - [`ragged`] - Exact-capacity chain store
//! - [`pipeline`] - Counting/filling sinks and file loading
//!
//! ## Example
//!
//! ```ignore
//! use tractstore::prelude::*;
//!
//! let tracts = load("subject01.trk", &LoadOptions::default())?;
//! println!("{} tracks, {} points", tracts.len(), tracts.stats.point_count());
//!
//! let hits = tracts.search(Vec3::new(-10.0, -10.0, -10.0), Vec3::splat(10.0))?;
//! ```

pub mod util;
pub mod io;
pub mod format;
pub mod trk;
pub mod tck;
pub mod geom;
pub mod ragged;
pub mod pipeline;

// Re-export commonly used types
pub use util::{BBox3f, Error, Result, Vec3};
pub use format::{TractFormat, TractHeader};
pub use pipeline::{load, load_many, LoadOptions, LoadedTracts};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{BBox3f, Error, Result, Vec3};
    pub use crate::format::{TractFormat, TractHeader};
    pub use crate::io::TractSource;
    pub use crate::geom::{search, Chain};
    pub use crate::ragged::RaggedStore;
    pub use crate::pipeline::{
        count, load, load_many, load_source, ChainCounter, ChainSink, ChainStats, LoadOptions,
        LoadedTracts,
    };
}
