//! Polygonal chain (one streamline).

use crate::util::{BBox3f, Vec3};

/// Ordered 3D polyline with a lazily computed bounding box.
///
/// Point data is fixed once the chain is built; only the cached bounds
/// change. Reading a chain out of a [`RaggedStore`](crate::ragged::RaggedStore)
/// reuses the point buffer of the chain passed in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chain {
    points: Vec<Vec3>,
    bounds: Option<BBox3f>,
}

impl Chain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chain from its points.
    pub fn from_points(points: Vec<Vec3>) -> Self {
        Self { points, bounds: None }
    }

    /// Points in order.
    #[inline]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the chain has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box, computing and caching it on first use.
    pub fn bounds(&mut self) -> BBox3f {
        match self.bounds {
            Some(b) => b,
            None => {
                let b = BBox3f::from_points(&self.points);
                self.bounds = Some(b);
                b
            }
        }
    }

    /// Bounding box if already computed.
    #[inline]
    pub fn cached_bounds(&self) -> Option<BBox3f> {
        self.bounds
    }

    /// Bounding box without caching it.
    pub fn compute_bounds(&self) -> BBox3f {
        self.bounds.unwrap_or_else(|| BBox3f::from_points(&self.points))
    }

    /// Replace the contents with `points`, keeping the allocation.
    pub fn assign(&mut self, points: &[Vec3]) {
        self.points.clear();
        self.points.extend_from_slice(points);
        self.bounds = None;
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<Vec3> {
        &mut self.points
    }

    pub(crate) fn set_cached_bounds(&mut self, bounds: Option<BBox3f>) {
        self.bounds = bounds;
    }
}
