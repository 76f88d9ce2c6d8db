//! Synthetic TrackVis and MRtrix writers for integration tests.
#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use tempfile::TempDir;

pub type Track = Vec<[f32; 3]>;

/// Tracks used across tests: mixed lengths, one far away.
pub fn sample_tracks() -> Vec<Track> {
    vec![
        vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]],
        vec![[10.0, 10.0, 10.0], [11.0, 10.0, 10.0]],
        vec![[-5.0, 0.5, 0.5], [5.0, 0.5, 0.5]],
        vec![[100.0, 100.0, 100.0]],
    ]
}

/// TrackVis header fields a test may want to control.
#[derive(Clone, Debug, Default)]
pub struct TrkLayout {
    pub n_scalars: i16,
    pub n_properties: i16,
    pub n_count: i32,
    pub scalar_names: Vec<&'static str>,
}

fn write_name<W: Write>(w: &mut W, name: &str, len: usize) {
    let mut buf = vec![0u8; len];
    buf[..name.len()].copy_from_slice(name.as_bytes());
    w.write_all(&buf).unwrap();
}

fn trk_bytes_bo<B: ByteOrder>(layout: &TrkLayout, tracks: &[Track]) -> Vec<u8> {
    let mut w = Vec::new();
    write_name(&mut w, "TRACK", 6);
    for d in [64i16, 64, 32] {
        w.write_i16::<B>(d).unwrap();
    }
    for _ in 0..3 {
        w.write_f32::<B>(2.0).unwrap();
    }
    for _ in 0..3 {
        w.write_f32::<B>(0.0).unwrap();
    }
    w.write_i16::<B>(layout.n_scalars).unwrap();
    for i in 0..10 {
        write_name(&mut w, layout.scalar_names.get(i).copied().unwrap_or(""), 20);
    }
    w.write_i16::<B>(layout.n_properties).unwrap();
    for _ in 0..10 {
        write_name(&mut w, "", 20);
    }
    for row in 0..4 {
        for col in 0..4 {
            w.write_f32::<B>(if row == col { 1.0 } else { 0.0 }).unwrap();
        }
    }
    w.write_all(&[0u8; 444]).unwrap();
    write_name(&mut w, "LPS", 4);
    w.write_all(&[0u8; 4]).unwrap();
    for _ in 0..6 {
        w.write_f32::<B>(0.0).unwrap();
    }
    w.write_all(&[0u8; 2]).unwrap();
    w.write_all(&[0u8; 6]).unwrap();
    w.write_i32::<B>(layout.n_count).unwrap();
    w.write_i32::<B>(2).unwrap();
    w.write_i32::<B>(1000).unwrap();
    assert_eq!(w.len(), 1000);

    for track in tracks {
        w.write_i32::<B>(track.len() as i32).unwrap();
        for p in track {
            for &v in p {
                w.write_f32::<B>(v).unwrap();
            }
            for s in 0..layout.n_scalars {
                w.write_f32::<B>(0.25 * s as f32).unwrap();
            }
        }
        for p in 0..layout.n_properties {
            w.write_f32::<B>(p as f32).unwrap();
        }
    }
    w
}

/// Serialize a TrackVis file.
pub fn trk_bytes(little: bool, layout: &TrkLayout, tracks: &[Track]) -> Vec<u8> {
    if little {
        trk_bytes_bo::<LittleEndian>(layout, tracks)
    } else {
        trk_bytes_bo::<BigEndian>(layout, tracks)
    }
}

/// Serialize an MRtrix file. `datatype` must be one of the float spellings.
pub fn tck_bytes(datatype: &str, extra_keys: &[&str], tracks: &[Track], terminate: bool) -> Vec<u8> {
    let mut w = Vec::new();
    writeln!(w, "mrtrix tracks").unwrap();
    writeln!(w, "datatype: {}", datatype).unwrap();
    for k in extra_keys {
        writeln!(w, "{}", k).unwrap();
    }
    writeln!(w, "file: . 0").unwrap();
    writeln!(w, "end").unwrap();

    // Align the body on a triple boundary counted from the end of the file.
    let lower = datatype.to_ascii_lowercase();
    let width = if lower.starts_with("float64") { 8 } else { 4 };
    let little = lower.ends_with("le");
    let n_triples: usize =
        tracks.iter().map(|t| t.len() + 1).sum::<usize>() + usize::from(terminate);
    let body = n_triples * 3 * width;
    let pad = (3 * width - (w.len() % (3 * width))) % (3 * width);
    w.extend(std::iter::repeat(b' ').take(pad));
    let start = w.len();

    let put = |w: &mut Vec<u8>, v: f32| match (width, little) {
        (4, true) => w.write_f32::<LittleEndian>(v).unwrap(),
        (4, false) => w.write_f32::<BigEndian>(v).unwrap(),
        (_, true) => w.write_f64::<LittleEndian>(v as f64).unwrap(),
        (_, false) => w.write_f64::<BigEndian>(v as f64).unwrap(),
    };
    for track in tracks {
        for p in track {
            for &v in p {
                put(&mut w, v);
            }
        }
        for _ in 0..3 {
            put(&mut w, f32::NAN);
        }
    }
    if terminate {
        for _ in 0..3 {
            put(&mut w, f32::INFINITY);
        }
    }
    assert_eq!(w.len() - start, body);
    w
}

/// Serialize a double-precision MRtrix file from raw triples, sentinels included.
pub fn tck_f64_triples(datatype: &str, triples: &[[f64; 3]]) -> Vec<u8> {
    let mut w = Vec::new();
    writeln!(w, "mrtrix tracks").unwrap();
    writeln!(w, "datatype: {}", datatype).unwrap();
    writeln!(w, "end").unwrap();
    let little = datatype.to_ascii_lowercase().ends_with("le");
    for t in triples {
        for &v in t {
            if little {
                w.write_f64::<LittleEndian>(v).unwrap();
            } else {
                w.write_f64::<BigEndian>(v).unwrap();
            }
        }
    }
    w
}

/// Write `bytes` to `<dir>/<name>` and return the path.
pub fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
