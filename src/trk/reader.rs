//! TrackVis body traversal.

use std::io::BufRead;

use super::{detect_endian, TrkHeader};
use crate::io::{ByteDecoder, Endian, SourceReader, TractSource};
use crate::pipeline::ChainSink;
use crate::util::{Error, Result, Vec3};

/// Upper bound on the point buffer reserved up front from a length prefix.
const MAX_RESERVE_POINTS: usize = 1 << 16;

/// Single-use reader over one TrackVis stream.
///
/// Tracks are length-prefixed: `i32 count`, then `count` points of
/// `3 + n_scalars` floats, then `n_properties` floats. Only x, y, z are kept.
pub struct TrkReader<R> {
    decoder: ByteDecoder<R>,
    header: TrkHeader,
    points: Vec<Vec3>,
}

impl TrkReader<SourceReader> {
    /// Probe the byte order on one cursor, then parse the header on a fresh one.
    pub fn open(source: &TractSource) -> Result<Self> {
        let endian = detect_endian(source)?;
        Self::from_decoder(source.reader()?, endian)
    }
}

impl<R: BufRead> TrkReader<R> {
    /// Parse the header from a decoder positioned at byte 0.
    pub fn from_decoder(mut decoder: ByteDecoder<R>, endian: Endian) -> Result<Self> {
        let header = TrkHeader::read(&mut decoder, endian)?;
        Ok(Self { decoder, header, points: Vec::new() })
    }

    /// Header of this stream.
    pub fn header(&self) -> &TrkHeader {
        &self.header
    }

    /// Feed every track to `sink`, consuming the reader.
    ///
    /// A length prefix that cannot be read ends the stream normally. Running
    /// out of input anywhere inside a track is an error.
    pub fn traverse<S: ChainSink + ?Sized>(mut self, sink: &mut S) -> Result<TrkHeader> {
        let endian = self.header.endian;
        let skip_per_point = 4 * (self.header.floats_per_point() - 3) as u64;
        let skip_per_track = 4 * self.header.floats_per_track() as u64;

        loop {
            let prefix_pos = self.decoder.position();
            let count = match self.decoder.read_i32(endian) {
                Ok(count) => count,
                Err(e) if e.is_truncation() => break,
                Err(e) => return Err(e),
            };
            if count < 0 {
                return Err(Error::invalid(format!(
                    "negative point count {} at byte {}",
                    count, prefix_pos
                )));
            }

            self.points.clear();
            self.points.reserve((count as usize).min(MAX_RESERVE_POINTS));
            for _ in 0..count {
                let x = self.decoder.read_f32(endian)?;
                let y = self.decoder.read_f32(endian)?;
                let z = self.decoder.read_f32(endian)?;
                if skip_per_point > 0 {
                    self.decoder.skip(skip_per_point)?;
                }
                self.points.push(Vec3::new(x, y, z));
            }
            if skip_per_track > 0 {
                self.decoder.skip(skip_per_track)?;
            }

            sink.on_chain(&self.points)?;
        }

        Ok(self.header)
    }
}
