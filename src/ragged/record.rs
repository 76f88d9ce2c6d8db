//! Serialized chain record layout.
//!
//! ```text
//! +-------------------+
//! | num_points  u32   |  4 bytes
//! | flags       u32   |  4 bytes (bit 0: bounds valid)
//! | bounds min  3xf32 | 12 bytes
//! | bounds max  3xf32 | 12 bytes
//! +-------------------+
//! | points  n x 3xf32 | 12 bytes each
//! +-------------------+
//! ```
//!
//! Fields are stored in native byte order; records never leave the process.

use bytemuck::{Pod, Zeroable};

use crate::geom::Chain;
use crate::util::{BBox3f, Error, Result, Vec3};

/// Size of the fixed record header in bytes.
pub const CHAIN_HEADER_BYTES: usize = 32;

/// Size of one stored point in bytes.
pub const POINT_BYTES: usize = 12;

/// Size of one stored coordinate in bytes.
pub const SCALAR_BYTES: usize = 4;

/// Flag bit set when the stored bounds are valid.
pub const FLAG_BOUNDS_VALID: u32 = 1;

/// Fixed prefix of every stored chain.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ChainRecordHeader {
    pub num_points: u32,
    pub flags: u32,
    pub bounds: BBox3f,
}

const _: () = assert!(std::mem::size_of::<ChainRecordHeader>() == CHAIN_HEADER_BYTES);
const _: () = assert!(std::mem::size_of::<Vec3>() == POINT_BYTES);

impl ChainRecordHeader {
    /// Stored bounds, if marked valid.
    #[inline]
    pub fn valid_bounds(&self) -> Option<BBox3f> {
        (self.flags & FLAG_BOUNDS_VALID != 0).then_some(self.bounds)
    }
}

/// Serialized size of a chain with `num_points` points.
#[inline]
pub const fn record_size(num_points: usize) -> usize {
    CHAIN_HEADER_BYTES + num_points * POINT_BYTES
}

/// Exact store capacity for the totals of a counting pass.
#[inline]
pub const fn capacity_for(element_count: u64, scalar_count: u64) -> u64 {
    element_count * CHAIN_HEADER_BYTES as u64 + scalar_count * SCALAR_BYTES as u64
}

/// Serialize `chain` into `dst`, which must be exactly `record_size(chain.len())` long.
pub(crate) fn write_record(dst: &mut [u8], chain: &Chain) -> Result<()> {
    let num_points = u32::try_from(chain.len())
        .map_err(|_| Error::invalid(format!("chain of {} points is too long", chain.len())))?;
    debug_assert_eq!(dst.len(), record_size(chain.len()));

    let header = match chain.cached_bounds() {
        Some(bounds) => ChainRecordHeader { num_points, flags: FLAG_BOUNDS_VALID, bounds },
        None => ChainRecordHeader { num_points, flags: 0, bounds: BBox3f::EMPTY },
    };
    let (head, body) = dst.split_at_mut(CHAIN_HEADER_BYTES);
    head.copy_from_slice(bytemuck::bytes_of(&header));
    body.copy_from_slice(bytemuck::cast_slice(chain.points()));
    Ok(())
}

/// Decode the header of a stored record.
pub(crate) fn read_header(src: &[u8]) -> Result<ChainRecordHeader> {
    if src.len() < CHAIN_HEADER_BYTES {
        return Err(Error::invalid("chain record shorter than its header"));
    }
    Ok(bytemuck::pod_read_unaligned(&src[..CHAIN_HEADER_BYTES]))
}

/// Decode a stored record into `out`, reusing its point buffer.
pub(crate) fn read_record(src: &[u8], out: &mut Chain) -> Result<()> {
    let header = read_header(src)?;
    let n = header.num_points as usize;
    let body = &src[CHAIN_HEADER_BYTES..];
    if body.len() < n * POINT_BYTES {
        return Err(Error::invalid(format!(
            "chain record holds {} bytes for {} points",
            body.len(),
            n
        )));
    }

    let points = out.buffer_mut();
    points.clear();
    points.extend(
        body[..n * POINT_BYTES]
            .chunks_exact(POINT_BYTES)
            .map(bytemuck::pod_read_unaligned::<Vec3>),
    );
    out.set_cached_bounds(header.valid_bounds());
    Ok(())
}
