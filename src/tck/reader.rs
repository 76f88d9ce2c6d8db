//! MRtrix body traversal.

use std::io::BufRead;

use tracing::debug;

use super::{DataType, TckHeader};
use crate::io::{ByteDecoder, SourceReader, TractSource};
use crate::pipeline::ChainSink;
use crate::util::{Result, Vec3};

/// What a decoded triple means in the point stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Triple {
    /// All three +Inf: end of all data
    EndOfStream,
    /// All three NaN: end of the current track
    EndOfTrack,
    Point(Vec3),
}

impl Triple {
    /// Classify a decoded single-precision triple.
    pub fn classify(x: f32, y: f32, z: f32) -> Self {
        if x == f32::INFINITY && y == f32::INFINITY && z == f32::INFINITY {
            Triple::EndOfStream
        } else if x.is_nan() && y.is_nan() && z.is_nan() {
            Triple::EndOfTrack
        } else {
            Triple::Point(Vec3::new(x, y, z))
        }
    }

    /// Classify a decoded double-precision triple.
    ///
    /// Sentinels are recognized before narrowing, so finite values that
    /// overflow `f32` are kept as points.
    pub fn classify_f64(x: f64, y: f64, z: f64) -> Self {
        if x == f64::INFINITY && y == f64::INFINITY && z == f64::INFINITY {
            Triple::EndOfStream
        } else if x.is_nan() && y.is_nan() && z.is_nan() {
            Triple::EndOfTrack
        } else {
            Triple::Point(Vec3::new(x as f32, y as f32, z as f32))
        }
    }
}

/// Single-use reader over one MRtrix track stream.
pub struct TckReader<R> {
    decoder: ByteDecoder<R>,
    header: TckHeader,
    cruft: u64,
    points: Vec<Vec3>,
}

impl TckReader<SourceReader> {
    /// Parse the header and align to the first triple.
    pub fn open(source: &TractSource) -> Result<Self> {
        Self::from_decoder(source.reader()?, source.len())
    }
}

impl<R: BufRead> TckReader<R> {
    /// Parse the header from a decoder at byte 0 over a stream of `total_len` bytes.
    ///
    /// The text header does not end on a triple boundary, so the bytes left
    /// over after it are split into whole triples counted back from the end
    /// and the remainder is skipped.
    pub fn from_decoder(mut decoder: ByteDecoder<R>, total_len: u64) -> Result<Self> {
        let header = TckHeader::read(&mut decoder)?;
        let remaining = total_len.saturating_sub(decoder.position());
        let cruft = remaining % header.datatype.triple_bytes() as u64;
        decoder.skip(cruft)?;
        debug!(datatype = %header.datatype, header_len = header.header_len, cruft, "tck header parsed");
        Ok(Self { decoder, header, cruft, points: Vec::new() })
    }

    /// Header of this stream.
    pub fn header(&self) -> &TckHeader {
        &self.header
    }

    /// Bytes skipped between the header and the first triple.
    pub fn cruft(&self) -> u64 {
        self.cruft
    }

    fn read_triple(&mut self) -> Result<Triple> {
        let dt = self.header.datatype;
        let endian = dt.endian();
        match dt {
            DataType::Float32 | DataType::Float32BE | DataType::Float32LE => {
                let x = self.decoder.read_f32(endian)?;
                let y = self.decoder.read_f32(endian)?;
                let z = self.decoder.read_f32(endian)?;
                Ok(Triple::classify(x, y, z))
            }
            DataType::Float64 | DataType::Float64BE | DataType::Float64LE => {
                let x = self.decoder.read_f64(endian)?;
                let y = self.decoder.read_f64(endian)?;
                let z = self.decoder.read_f64(endian)?;
                Ok(Triple::classify_f64(x, y, z))
            }
        }
    }

    /// Feed every non-empty track to `sink`, consuming the reader.
    ///
    /// A NaN triple closes the current track; tracks with no points are
    /// dropped. A +Inf triple ends the stream and closes any open track.
    /// Input that runs out before the +Inf triple is an error.
    pub fn traverse<S: ChainSink + ?Sized>(mut self, sink: &mut S) -> Result<TckHeader> {
        self.points.clear();
        loop {
            match self.read_triple()? {
                Triple::EndOfStream => break,
                Triple::EndOfTrack => {
                    if !self.points.is_empty() {
                        sink.on_chain(&self.points)?;
                        self.points.clear();
                    }
                }
                Triple::Point(p) => self.points.push(p),
            }
        }
        if !self.points.is_empty() {
            sink.on_chain(&self.points)?;
        }
        Ok(self.header)
    }
}
