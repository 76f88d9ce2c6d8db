//! Exact-capacity ragged storage for chains.
//!
//! A [`RaggedStore`] is one zero-filled byte arena allocated once, to the
//! byte, plus a directory mapping each dense index to the `(offset, length)`
//! of its serialized chain. Chains are placed in increasing index order
//! exactly once; after that any slot can be read, and rewritten in place as
//! long as the rewrite is not larger than the original record.

mod record;

pub use record::*;

use tracing::debug;

use crate::geom::Chain;
use crate::pipeline::ChainStats;
use crate::util::{BBox3f, Error, Result};

/// Directory entry for one placed chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Slot {
    offset: usize,
    len: usize,
}

/// Packed, randomly addressable chain store sized once at construction.
pub struct RaggedStore {
    data: Vec<u8>,
    slots: Vec<Slot>,
    /// First unused byte in `data`
    cursor: usize,
    /// Number of placed slots; the next index to place
    placed: u64,
}

impl RaggedStore {
    /// Allocate a store for `element_count` chains in exactly `capacity_bytes`.
    pub fn new(element_count: u64, capacity_bytes: u64) -> Result<Self> {
        let capacity = usize::try_from(capacity_bytes)
            .map_err(|_| Error::other(format!("capacity {} does not fit in memory", capacity_bytes)))?;
        let count = usize::try_from(element_count)
            .map_err(|_| Error::other(format!("element count {} does not fit in memory", element_count)))?;

        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|e| Error::other(format!("cannot allocate {} bytes: {}", capacity, e)))?;
        data.resize(capacity, 0);

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(count)
            .map_err(|e| Error::other(format!("cannot allocate directory of {} slots: {}", count, e)))?;
        slots.resize(count, Slot::default());

        debug!(element_count, capacity_bytes, "allocated ragged store");
        Ok(Self { data, slots, cursor: 0, placed: 0 })
    }

    /// Allocate a store sized exactly for the totals of a counting pass.
    pub fn for_totals(stats: &ChainStats) -> Result<Self> {
        Self::new(stats.element_count, stats.capacity_bytes())
    }

    /// Number of slots (placed or not).
    #[inline]
    pub fn len(&self) -> u64 {
        self.slots.len() as u64
    }

    /// True if the store has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots placed so far.
    #[inline]
    pub fn placed(&self) -> u64 {
        self.placed
    }

    /// Total arena size in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes consumed by placed records.
    #[inline]
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// True once every slot is placed and every byte is used.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.placed == self.len() && self.cursor == self.data.len()
    }

    fn check_index(&self, index: u64) -> Result<usize> {
        if index >= self.len() {
            return Err(Error::IndexOutOfRange { index, count: self.len() });
        }
        Ok(index as usize)
    }

    fn placed_slot(&self, index: u64) -> Result<Slot> {
        let i = self.check_index(index)?;
        if index >= self.placed {
            return Err(Error::UnplacedSlot(index));
        }
        Ok(self.slots[i])
    }

    fn record(&self, index: u64) -> Result<&[u8]> {
        let slot = self.placed_slot(index)?;
        Ok(&self.data[slot.offset..slot.offset + slot.len])
    }

    /// Serialize `chain` into the next unused region and bind it to `index`.
    ///
    /// `index` must be the next unplaced index.
    pub fn place(&mut self, index: u64, chain: &Chain) -> Result<()> {
        let i = self.check_index(index)?;
        if index != self.placed {
            return Err(Error::PlacementOrder { index, expected: self.placed });
        }

        let needed = record_size(chain.len());
        let offset = self.cursor;
        if needed > self.data.len() - offset {
            return Err(Error::CapacityExceeded { offset, needed, capacity: self.data.len() });
        }

        write_record(&mut self.data[offset..offset + needed], chain)?;
        self.slots[i] = Slot { offset, len: needed };
        self.cursor += needed;
        self.placed += 1;
        Ok(())
    }

    /// Decode the chain at `index` into `out`, reusing its point buffer.
    pub fn get(&self, index: u64, out: &mut Chain) -> Result<()> {
        read_record(self.record(index)?, out)
    }

    /// Stored bounds of the chain at `index`, if they have been written.
    pub fn bounds(&self, index: u64) -> Result<Option<BBox3f>> {
        Ok(read_header(self.record(index)?)?.valid_bounds())
    }

    /// Point count of the chain at `index`.
    pub fn num_points(&self, index: u64) -> Result<usize> {
        Ok(read_header(self.record(index)?)?.num_points as usize)
    }

    /// Overwrite the chain at a placed `index`.
    ///
    /// The new record must fit inside the original slot; this is for writing
    /// bounds back, not for growing geometry.
    pub fn set(&mut self, index: u64, chain: &Chain) -> Result<()> {
        let slot = self.placed_slot(index)?;
        let needed = record_size(chain.len());
        if needed > slot.len {
            return Err(Error::SlotOverflow { index, slot: slot.len, needed });
        }

        write_record(&mut self.data[slot.offset..slot.offset + needed], chain)?;
        Ok(())
    }
}

impl std::fmt::Debug for RaggedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaggedStore")
            .field("len", &self.len())
            .field("placed", &self.placed)
            .field("used", &self.cursor)
            .field("capacity", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Vec3;

    fn chain(n: usize) -> Chain {
        Chain::from_points((0..n).map(|i| Vec3::splat(i as f32)).collect())
    }

    #[test]
    fn test_exact_fill() {
        let sizes = [3usize, 1, 7];
        let stats = ChainStats {
            element_count: 3,
            scalar_count: 3 * sizes.iter().sum::<usize>() as u64,
        };
        let mut store = RaggedStore::for_totals(&stats).unwrap();
        assert_eq!(store.capacity(), 32 * 3 + 12 * 11);

        for (i, &n) in sizes.iter().enumerate() {
            store.place(i as u64, &chain(n)).unwrap();
        }
        assert!(store.is_full());

        let mut out = Chain::new();
        for (i, &n) in sizes.iter().enumerate() {
            store.get(i as u64, &mut out).unwrap();
            assert_eq!(out.points(), chain(n).points());
            assert_eq!(store.num_points(i as u64).unwrap(), n);
        }
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut store = RaggedStore::new(2, record_size(2) as u64).unwrap();
        store.place(0, &chain(1)).unwrap();
        let err = store.place(1, &chain(1)).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { .. }));
        assert_eq!(store.placed(), 1);
    }

    #[test]
    fn test_index_contract() {
        let mut store = RaggedStore::new(2, 2 * record_size(1) as u64).unwrap();
        let mut out = Chain::new();

        assert!(matches!(store.place(2, &chain(1)), Err(Error::IndexOutOfRange { index: 2, count: 2 })));
        assert!(matches!(store.place(1, &chain(1)), Err(Error::PlacementOrder { index: 1, expected: 0 })));
        assert!(matches!(store.get(0, &mut out), Err(Error::UnplacedSlot(0))));

        store.place(0, &chain(1)).unwrap();
        assert!(matches!(store.place(0, &chain(1)), Err(Error::PlacementOrder { .. })));
        assert!(matches!(store.get(5, &mut out), Err(Error::IndexOutOfRange { .. })));
        assert!(matches!(store.set(1, &chain(1)), Err(Error::UnplacedSlot(1))));
    }

    #[test]
    fn test_set_in_place() {
        let mut store = RaggedStore::new(2, 2 * record_size(2) as u64).unwrap();
        store.place(0, &chain(2)).unwrap();
        store.place(1, &chain(2)).unwrap();

        let mut c = Chain::new();
        store.get(0, &mut c).unwrap();
        let b = c.bounds();
        store.set(0, &c).unwrap();
        assert_eq!(store.bounds(0).unwrap(), Some(b));
        assert_eq!(store.bounds(1).unwrap(), None);

        // Neighbour untouched.
        let mut other = Chain::new();
        store.get(1, &mut other).unwrap();
        assert_eq!(other.points(), chain(2).points());

        let err = store.set(0, &chain(3)).unwrap_err();
        assert!(matches!(err, Error::SlotOverflow { index: 0, .. }));
    }

    #[test]
    fn test_set_keeps_original_slot_size() {
        let mut store = RaggedStore::new(2, 2 * record_size(2) as u64).unwrap();
        store.place(0, &chain(2)).unwrap();
        store.place(1, &chain(2)).unwrap();

        store.set(0, &chain(1)).unwrap();
        assert_eq!(store.num_points(0).unwrap(), 1);

        // Growing back up to the size of the first record still fits.
        let mut grown = chain(2);
        grown.bounds();
        store.set(0, &grown).unwrap();

        let mut out = Chain::new();
        store.get(0, &mut out).unwrap();
        assert_eq!(out.points(), chain(2).points());
        assert_eq!(store.bounds(0).unwrap(), grown.cached_bounds());
        assert!(store.is_full());

        store.get(1, &mut out).unwrap();
        assert_eq!(out.points(), chain(2).points());

        let err = store.set(0, &chain(3)).unwrap_err();
        assert!(matches!(err, Error::SlotOverflow { index: 0, slot: 56, needed: 68 }));
    }

    #[test]
    fn test_empty_store() {
        let store = RaggedStore::new(0, 0).unwrap();
        assert!(store.is_empty());
        assert!(store.is_full());
    }
}
