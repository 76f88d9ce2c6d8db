//! Two-pass loading: count, allocate exactly, fill.
//!
//! The first traversal feeds a [`ChainCounter`]; its totals size a
//! [`RaggedStore`] to the byte. The second traversal places every chain
//! with a [`StoreFiller`]. Both passes must agree on the chain and
//! coordinate totals or the load fails.
//!
//! # Example
//!
//! ```ignore
//! use tractstore::pipeline::{load, LoadOptions};
//!
//! let tracts = load("subject01.tck", &LoadOptions::default())?;
//! println!("{} tracks", tracts.len());
//! let hits = tracts.search(min, max)?;
//! ```

mod sink;

pub use sink::*;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::format::{TractFormat, TractHeader};
use crate::geom;
use crate::io::TractSource;
use crate::ragged::RaggedStore;
use crate::tck::TckReader;
use crate::trk::TrkReader;
use crate::util::{Error, Result, Vec3};

/// Options for [`load`] and friends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Memory-map input files instead of buffered reads
    pub use_mmap: bool,
    /// Compute and store per-chain bounds after filling
    pub compute_bounds: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { use_mmap: cfg!(feature = "mmap"), compute_bounds: true }
    }
}

impl LoadOptions {
    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_bounds(mut self, compute_bounds: bool) -> Self {
        self.compute_bounds = compute_bounds;
        self
    }
}

/// Wall time spent in each loading stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoadTimings {
    pub count: Duration,
    pub fill: Duration,
    pub bounds: Duration,
}

impl LoadTimings {
    /// Sum of all stages.
    pub fn total(&self) -> Duration {
        self.count + self.fill + self.bounds
    }
}

/// A fully loaded file.
#[derive(Debug)]
pub struct LoadedTracts {
    pub path: Option<PathBuf>,
    pub format: TractFormat,
    pub header: TractHeader,
    pub stats: ChainStats,
    pub store: RaggedStore,
    pub timings: LoadTimings,
}

impl LoadedTracts {
    /// Number of chains.
    pub fn len(&self) -> u64 {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Indices of chains overlapping `[box_min, box_max]`.
    pub fn search(&self, box_min: Vec3, box_max: Vec3) -> Result<Vec<u64>> {
        geom::search(&self.store, box_min, box_max)
    }
}

/// Run one traversal of `source` into `sink`.
///
/// Each call opens a fresh reader, so a source can be traversed any number
/// of times.
pub fn traverse<S: ChainSink + ?Sized>(
    source: &TractSource,
    format: TractFormat,
    sink: &mut S,
) -> Result<TractHeader> {
    match format {
        TractFormat::Trk => Ok(TractHeader::Trk(TrkReader::open(source)?.traverse(sink)?)),
        TractFormat::Tck => Ok(TractHeader::Tck(TckReader::open(source)?.traverse(sink)?)),
    }
}

/// Counting pass only.
pub fn count(source: &TractSource, format: TractFormat) -> Result<(TractHeader, ChainStats)> {
    let mut counter = ChainCounter::new();
    let header = traverse(source, format, &mut counter)?;
    Ok((header, counter.stats()))
}

/// Filling pass into a store sized for `expected`.
pub fn fill(
    source: &TractSource,
    format: TractFormat,
    store: &mut RaggedStore,
    expected: ChainStats,
) -> Result<ChainStats> {
    let mut filler = StoreFiller::new(store, expected);
    traverse(source, format, &mut filler)?;
    filler.finish()
}

/// Count, allocate, and fill from an already opened source.
#[tracing::instrument(skip_all, fields(format = %format, bytes = source.len()))]
pub fn load_source(source: &TractSource, format: TractFormat, opts: &LoadOptions) -> Result<LoadedTracts> {
    let mut timings = LoadTimings::default();

    let start = Instant::now();
    let (header, stats) = count(source, format)?;
    timings.count = start.elapsed();
    info!(
        chains = stats.element_count,
        scalars = stats.scalar_count,
        capacity = stats.capacity_bytes(),
        "counting pass done"
    );

    if let Some(declared) = header.declared_count() {
        if declared != stats.element_count {
            warn!(declared, counted = stats.element_count, "header track count differs from data");
        }
    }

    let start = Instant::now();
    let mut store = RaggedStore::for_totals(&stats)?;
    let filled = fill(source, format, &mut store, stats)?;
    timings.fill = start.elapsed();
    if !store.is_full() {
        return Err(Error::CountFillMismatch { counted: stats.totals(), filled: filled.totals() });
    }

    if opts.compute_bounds {
        let start = Instant::now();
        geom::compute_bounds(&mut store)?;
        timings.bounds = start.elapsed();
    }

    info!(
        chains = stats.element_count,
        points = stats.point_count(),
        bytes = store.capacity(),
        "loaded tracts"
    );

    Ok(LoadedTracts {
        path: source.path().map(Path::to_path_buf),
        format,
        header,
        stats,
        store,
        timings,
    })
}

/// Load a `.trk` or `.tck` file.
pub fn load(path: impl AsRef<Path>, opts: &LoadOptions) -> Result<LoadedTracts> {
    let path = path.as_ref();
    let format = TractFormat::from_path(path)?;
    let source = TractSource::open_opts(path, opts.use_mmap)?;
    load_source(&source, format, opts)
}

/// Load several files in parallel. Results keep the order of `paths`.
pub fn load_many<P: AsRef<Path> + Sync>(paths: &[P], opts: &LoadOptions) -> Vec<Result<LoadedTracts>> {
    paths.par_iter().map(|p| load(p, opts)).collect()
}
