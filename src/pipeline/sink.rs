//! Per-chain callbacks for the counting and filling passes.

use crate::geom::Chain;
use crate::ragged::{capacity_for, RaggedStore};
use crate::util::{Error, Result, Vec3};

/// Receiver of decoded chains, one call per chain in file order.
///
/// `points` is only valid for the duration of the call.
pub trait ChainSink {
    fn on_chain(&mut self, points: &[Vec3]) -> Result<()>;
}

impl<F> ChainSink for F
where
    F: FnMut(&[Vec3]) -> Result<()>,
{
    #[inline]
    fn on_chain(&mut self, points: &[Vec3]) -> Result<()> {
        self(points)
    }
}

/// Totals gathered by one traversal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChainStats {
    /// Number of chains
    pub element_count: u64,
    /// Number of f32 coordinates (3 per point)
    pub scalar_count: u64,
}

impl ChainStats {
    /// Stats with the given totals.
    pub const fn new(element_count: u64, scalar_count: u64) -> Self {
        Self { element_count, scalar_count }
    }

    /// Total points across all chains.
    #[inline]
    pub fn point_count(&self) -> u64 {
        self.scalar_count / 3
    }

    /// Mean points per chain, or 0 for no chains.
    pub fn average_chain_len(&self) -> f64 {
        if self.element_count == 0 {
            0.0
        } else {
            self.point_count() as f64 / self.element_count as f64
        }
    }

    /// Exact store capacity needed to hold these chains.
    #[inline]
    pub fn capacity_bytes(&self) -> u64 {
        capacity_for(self.element_count, self.scalar_count)
    }

    /// `(element_count, scalar_count)`.
    #[inline]
    pub fn totals(&self) -> (u64, u64) {
        (self.element_count, self.scalar_count)
    }

    fn record(&mut self, points: &[Vec3]) {
        self.element_count += 1;
        self.scalar_count += 3 * points.len() as u64;
    }
}

/// First-pass sink: tallies chains and coordinates.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChainCounter {
    stats: ChainStats,
}

impl ChainCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals so far.
    #[inline]
    pub fn stats(&self) -> ChainStats {
        self.stats
    }
}

impl ChainSink for ChainCounter {
    #[inline]
    fn on_chain(&mut self, points: &[Vec3]) -> Result<()> {
        self.stats.record(points);
        Ok(())
    }
}

/// Second-pass sink: places each chain into the next store slot.
pub struct StoreFiller<'a> {
    store: &'a mut RaggedStore,
    scratch: Chain,
    filled: ChainStats,
    expected: ChainStats,
}

impl<'a> StoreFiller<'a> {
    /// Fill `store`, which was sized for `expected`.
    pub fn new(store: &'a mut RaggedStore, expected: ChainStats) -> Self {
        Self { store, scratch: Chain::new(), filled: ChainStats::default(), expected }
    }

    /// Totals placed so far.
    #[inline]
    pub fn filled(&self) -> ChainStats {
        self.filled
    }

    /// Fail unless the fill reproduced the expected totals.
    pub fn finish(self) -> Result<ChainStats> {
        if self.filled != self.expected {
            return Err(Error::CountFillMismatch {
                counted: self.expected.totals(),
                filled: self.filled.totals(),
            });
        }
        Ok(self.filled)
    }
}

impl ChainSink for StoreFiller<'_> {
    fn on_chain(&mut self, points: &[Vec3]) -> Result<()> {
        let index = self.filled.element_count;
        if index >= self.store.len() {
            // The second traversal produced more chains than the first.
            let mut filled = self.filled;
            filled.record(points);
            return Err(Error::CountFillMismatch {
                counted: self.expected.totals(),
                filled: filled.totals(),
            });
        }
        self.scratch.assign(points);
        self.store.place(index, &self.scratch)?;
        self.filled.record(points);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_totals() {
        let mut counter = ChainCounter::new();
        counter.on_chain(&[Vec3::ZERO, Vec3::ONE]).unwrap();
        counter.on_chain(&[]).unwrap();
        counter.on_chain(&[Vec3::X]).unwrap();

        let stats = counter.stats();
        assert_eq!(stats.totals(), (3, 9));
        assert_eq!(stats.point_count(), 3);
        assert!((stats.average_chain_len() - 1.0).abs() < 1e-12);
        assert_eq!(stats.capacity_bytes(), 3 * 32 + 9 * 4);
    }

    #[test]
    fn test_empty_stats() {
        let stats = ChainStats::default();
        assert_eq!(stats.average_chain_len(), 0.0);
        assert_eq!(stats.capacity_bytes(), 0);
    }

    #[test]
    fn test_filler_places_in_order() {
        let chains = [vec![Vec3::ONE, Vec3::ZERO], vec![Vec3::Y]];
        let mut counter = ChainCounter::new();
        for c in &chains {
            counter.on_chain(c).unwrap();
        }
        let expected = counter.stats();

        let mut store = RaggedStore::for_totals(&expected).unwrap();
        let mut filler = StoreFiller::new(&mut store, expected);
        for c in &chains {
            filler.on_chain(c).unwrap();
        }
        assert_eq!(filler.finish().unwrap(), expected);
        assert!(store.is_full());

        let mut out = Chain::new();
        store.get(1, &mut out).unwrap();
        assert_eq!(out.points(), &[Vec3::Y]);
    }

    #[test]
    fn test_filler_extra_chain_is_mismatch() {
        let expected = ChainStats::new(1, 3);
        let mut store = RaggedStore::for_totals(&expected).unwrap();
        let mut filler = StoreFiller::new(&mut store, expected);
        filler.on_chain(&[Vec3::X]).unwrap();
        let err = filler.on_chain(&[Vec3::Y]).unwrap_err();
        assert!(matches!(err, Error::CountFillMismatch { counted: (1, 3), filled: (2, 6) }));
    }

    #[test]
    fn test_filler_short_fill_is_mismatch() {
        let expected = ChainStats::new(2, 6);
        let mut store = RaggedStore::for_totals(&expected).unwrap();
        let mut filler = StoreFiller::new(&mut store, expected);
        filler.on_chain(&[Vec3::X]).unwrap();
        assert!(matches!(filler.finish(), Err(Error::CountFillMismatch { .. })));
    }

    #[test]
    fn test_closure_sink() {
        let mut lens = Vec::new();
        let mut sink = |pts: &[Vec3]| -> Result<()> {
            lens.push(pts.len());
            Ok(())
        };
        sink.on_chain(&[Vec3::X, Vec3::Y]).unwrap();
        assert_eq!(lens, vec![2]);
    }
}
