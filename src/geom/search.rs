//! Per-chain bounds and axis-aligned box queries over a [`RaggedStore`].
//!
//! Queries are a linear scan: the store is built once for offline bulk
//! querying and carries no spatial index.

use tracing::debug;

use super::Chain;
use crate::ragged::RaggedStore;
use crate::util::{BBox3f, Result, Vec3};

/// Compute every chain's bounding box and write it back into the store.
pub fn compute_bounds(store: &mut RaggedStore) -> Result<()> {
    let mut chain = Chain::new();
    for index in 0..store.len() {
        store.get(index, &mut chain)?;
        chain.set_cached_bounds(None);
        chain.bounds();
        store.set(index, &chain)?;
    }
    debug!(chains = store.len(), "bounds written back");
    Ok(())
}

/// True iff the chain's bounding box overlaps `[box_min, box_max]` on all
/// three axes. Touching boundaries count as overlap.
pub fn intersects(box_min: Vec3, box_max: Vec3, chain: &mut Chain) -> bool {
    BBox3f::new(box_min, box_max).intersects(&chain.bounds())
}

/// Indices of all chains whose bounding box overlaps the query box.
///
/// Stored bounds are used when present; chains without them are bounded
/// on the fly (nothing is written back).
pub fn search(store: &RaggedStore, box_min: Vec3, box_max: Vec3) -> Result<Vec<u64>> {
    let query = BBox3f::new(box_min, box_max);
    let mut found = Vec::new();
    if query.is_empty() {
        return Ok(found);
    }

    let mut chain = Chain::new();
    for index in 0..store.len() {
        let bounds = match store.bounds(index)? {
            Some(b) => b,
            None => {
                store.get(index, &mut chain)?;
                chain.compute_bounds()
            }
        };
        if query.intersects(&bounds) {
            found.push(index);
        }
    }
    Ok(found)
}

/// Number of chains overlapping the query box.
pub fn count_matches(store: &RaggedStore, box_min: Vec3, box_max: Vec3) -> Result<u64> {
    Ok(search(store, box_min, box_max)?.len() as u64)
}
