//! TrackVis fixed 1000-byte header.

use std::fmt;
use std::io::BufRead;

use tracing::debug;

use super::*;
use crate::io::{ByteDecoder, Endian, TractSource};
use crate::util::{Error, Mat4, Result, Vec3};

/// Decoded TrackVis header.
#[derive(Clone, Debug, PartialEq)]
pub struct TrkHeader {
    /// Magic, `"TRACK"` in conforming files
    pub id_string: String,
    pub dim: [i16; 3],
    pub voxel_size: Vec3,
    pub origin: Vec3,
    /// Extra floats stored after x,y,z for every point
    pub n_scalars: i16,
    pub scalar_names: Vec<String>,
    /// Floats stored after the points of every track
    pub n_properties: i16,
    pub property_names: Vec<String>,
    /// Voxel-to-RAS matrix, row-major as stored
    pub vox_to_ras: [[f32; 4]; 4],
    pub reserved: Vec<u8>,
    pub voxel_order: String,
    pub pad2: [u8; 4],
    pub image_orientation_patient: [f32; 6],
    pub pad1: [u8; 2],
    pub invert_x: u8,
    pub invert_y: u8,
    pub invert_z: u8,
    pub swap_xy: u8,
    pub swap_yz: u8,
    pub swap_zx: u8,
    /// Track count, 0 when unknown
    pub n_count: i32,
    pub version: i32,
    pub hdr_size: i32,
    /// Byte order detected for this file
    pub endian: Endian,
}

/// Determine the byte order of a TrackVis file.
///
/// Reads the header-size field as big-endian from its own cursor; any value
/// other than 1000 means the file is little-endian.
pub fn detect_endian(source: &TractSource) -> Result<Endian> {
    let mut cursor = source.reader()?;
    let hdr_size = cursor
        .skip(HDR_SIZE_OFFSET)
        .and_then(|_| cursor.read_i32(Endian::Big))
        .map_err(truncated_header)?;
    let endian = if hdr_size == HEADER_SIZE as i32 { Endian::Big } else { Endian::Little };
    debug!(%endian, "detected trk byte order");
    Ok(endian)
}

fn truncated_header(e: Error) -> Error {
    match e {
        Error::TruncatedStream { pos } => Error::header(format!(
            "input ends at byte {}, inside the {}-byte trk header",
            pos, HEADER_SIZE
        )),
        other => other,
    }
}

impl TrkHeader {
    /// Decode the header from a reader positioned at byte 0.
    pub fn read<R: BufRead>(r: &mut ByteDecoder<R>, endian: Endian) -> Result<Self> {
        let start = r.position();
        let header = Self::read_fields(r, endian).map_err(truncated_header)?;
        debug_assert_eq!(r.position() - start, HEADER_SIZE as u64);
        header.validate()?;
        Ok(header)
    }

    fn read_fields<R: BufRead>(r: &mut ByteDecoder<R>, endian: Endian) -> Result<Self> {
        let id_string = r.read_fixed_string(ID_LEN)?;
        let dim = [r.read_i16(endian)?, r.read_i16(endian)?, r.read_i16(endian)?];
        let voxel_size = read_vec3(r, endian)?;
        let origin = read_vec3(r, endian)?;

        let n_scalars = r.read_i16(endian)?;
        let scalar_names = read_names(r)?;
        let n_properties = r.read_i16(endian)?;
        let property_names = read_names(r)?;

        let mut vox_to_ras = [[0f32; 4]; 4];
        for row in vox_to_ras.iter_mut() {
            for v in row.iter_mut() {
                *v = r.read_f32(endian)?;
            }
        }

        let mut reserved = vec![0u8; RESERVED_LEN];
        r.read_exact(&mut reserved)?;
        let voxel_order = r.read_fixed_string(4)?;
        let mut pad2 = [0u8; 4];
        r.read_exact(&mut pad2)?;

        let mut image_orientation_patient = [0f32; 6];
        for v in image_orientation_patient.iter_mut() {
            *v = r.read_f32(endian)?;
        }
        let mut pad1 = [0u8; 2];
        r.read_exact(&mut pad1)?;

        let mut flags = [0u8; 6];
        r.read_exact(&mut flags)?;

        let n_count = r.read_i32(endian)?;
        let version = r.read_i32(endian)?;
        let hdr_size = r.read_i32(endian)?;

        Ok(Self {
            id_string,
            dim,
            voxel_size,
            origin,
            n_scalars,
            scalar_names,
            n_properties,
            property_names,
            vox_to_ras,
            reserved,
            voxel_order,
            pad2,
            image_orientation_patient,
            pad1,
            invert_x: flags[0],
            invert_y: flags[1],
            invert_z: flags[2],
            swap_xy: flags[3],
            swap_yz: flags[4],
            swap_zx: flags[5],
            n_count,
            version,
            hdr_size,
            endian,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.hdr_size != HEADER_SIZE as i32 {
            return Err(Error::header(format!(
                "header size field is {} ({}), expected {}",
                self.hdr_size, self.endian, HEADER_SIZE
            )));
        }
        if self.n_scalars < 0 || self.n_properties < 0 {
            return Err(Error::header(format!(
                "negative per-point scalar count {} or per-track property count {}",
                self.n_scalars, self.n_properties
            )));
        }
        Ok(())
    }

    /// Floats stored per point (x, y, z and the extra scalars).
    #[inline]
    pub fn floats_per_point(&self) -> usize {
        3 + self.n_scalars.max(0) as usize
    }

    /// Floats stored after each track's points.
    #[inline]
    pub fn floats_per_track(&self) -> usize {
        self.n_properties.max(0) as usize
    }

    /// Names of the declared per-point scalars.
    pub fn active_scalar_names(&self) -> &[String] {
        let n = (self.n_scalars.max(0) as usize).min(MAX_NAMES);
        &self.scalar_names[..n]
    }

    /// Names of the declared per-track properties.
    pub fn active_property_names(&self) -> &[String] {
        let n = (self.n_properties.max(0) as usize).min(MAX_NAMES);
        &self.property_names[..n]
    }

    /// Track count from the header, `None` when the writer left it at 0.
    pub fn declared_track_count(&self) -> Option<u64> {
        (self.n_count > 0).then_some(self.n_count as u64)
    }

    /// Voxel-to-RAS transform, `None` when element [3][3] is 0 (matrix unset).
    pub fn vox_to_ras(&self) -> Option<Mat4> {
        if self.vox_to_ras[3][3] == 0.0 {
            return None;
        }
        Some(Mat4::from_cols_array_2d(&self.vox_to_ras).transpose())
    }

    /// True if the magic starts with `TRACK`.
    pub fn has_magic(&self) -> bool {
        self.id_string.starts_with(MAGIC)
    }
}

fn read_vec3<R: BufRead>(r: &mut ByteDecoder<R>, endian: Endian) -> Result<Vec3> {
    Ok(Vec3::new(r.read_f32(endian)?, r.read_f32(endian)?, r.read_f32(endian)?))
}

fn read_names<R: BufRead>(r: &mut ByteDecoder<R>) -> Result<Vec<String>> {
    (0..MAX_NAMES).map(|_| r.read_fixed_string(NAME_LEN)).collect()
}

impl fmt::Display for TrkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id string: {}", self.id_string)?;
        writeln!(f, "byte order: {}", self.endian)?;
        writeln!(f, "hdr size: {}", self.hdr_size)?;
        writeln!(f, "version: {}", self.version)?;
        writeln!(f, "dim: {} x {} x {}", self.dim[0], self.dim[1], self.dim[2])?;
        writeln!(f, "voxel size: {} {} {}", self.voxel_size.x, self.voxel_size.y, self.voxel_size.z)?;
        writeln!(f, "origin: {} {} {}", self.origin.x, self.origin.y, self.origin.z)?;
        writeln!(f, "n_scalars: {}", self.n_scalars)?;
        for (i, name) in self.active_scalar_names().iter().enumerate() {
            writeln!(f, "  scalar {} name: {}", i, name)?;
        }
        writeln!(f, "n_properties: {}", self.n_properties)?;
        for (i, name) in self.active_property_names().iter().enumerate() {
            writeln!(f, "  property {} name: {}", i, name)?;
        }
        match self.vox_to_ras() {
            Some(_) => {
                for row in &self.vox_to_ras {
                    writeln!(f, "vox_to_ras: {:>12} {:>12} {:>12} {:>12}", row[0], row[1], row[2], row[3])?;
                }
            }
            None => writeln!(f, "vox_to_ras: unset")?,
        }
        writeln!(f, "voxel order: {}", self.voxel_order)?;
        writeln!(f, "image orientation patient: {:?}", self.image_orientation_patient)?;
        writeln!(
            f,
            "invert x/y/z: {} {} {}",
            self.invert_x, self.invert_y, self.invert_z
        )?;
        writeln!(f, "swap xy/yz/zx: {} {} {}", self.swap_xy, self.swap_yz, self.swap_zx)?;
        write!(f, "track count: {}", self.n_count)
    }
}
