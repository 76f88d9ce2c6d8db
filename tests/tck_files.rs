//! MRtrix files read from disk.

mod common;

use common::*;
use tractstore::geom::Chain;
use tractstore::io::TractSource;
use tractstore::pipeline::{load, LoadOptions};
use tractstore::tck::{DataType, TckReader};
use tractstore::{Error, TractFormat, Vec3};

const DATATYPES: [&str; 6] = ["Float32", "Float32BE", "Float32LE", "Float64", "Float64BE", "Float64LE"];

#[test]
fn test_every_datatype_loads_the_same_tracks() {
    let dir = tempfile::tempdir().unwrap();
    let tracks = sample_tracks();

    for dt in DATATYPES {
        let path = write_file(&dir, &format!("{}.tck", dt), &tck_bytes(dt, &["count: 4"], &tracks, true));
        let loaded = load(&path, &LoadOptions::default()).unwrap();

        assert_eq!(loaded.format, TractFormat::Tck);
        assert_eq!(loaded.header.as_tck().unwrap().datatype, DataType::from_name(dt).unwrap());
        assert_eq!(loaded.header.declared_count(), Some(4));
        assert_eq!(loaded.stats.totals(), (4, 24), "datatype {}", dt);

        let mut chain = Chain::new();
        for (i, expected) in tracks.iter().enumerate() {
            loaded.store.get(i as u64, &mut chain).unwrap();
            let expected: Vec<Vec3> = expected.iter().map(|p| Vec3::from_array(*p)).collect();
            assert_eq!(chain.points(), expected.as_slice());
        }
    }
}

#[test]
fn test_cruft_before_body() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = tck_bytes("Float32LE", &["comment: with padding"], &sample_tracks(), true);
    let path = write_file(&dir, "c.tck", &bytes);

    let source = TractSource::open(&path).unwrap();
    let reader = TckReader::open(&source).unwrap();
    let header_len = reader.header().header_len;
    assert_eq!(reader.cruft(), (source.len() - header_len) % 12);
    assert_eq!(reader.header().get("comment"), Some("with padding"));
}

#[test]
fn test_header_only_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "e.tck", &tck_bytes("Float32BE", &["count: 0"], &[], true));

    let loaded = load(&path, &LoadOptions::default()).unwrap();
    assert!(loaded.is_empty());
    assert_eq!(loaded.stats.totals(), (0, 0));
    assert_eq!(loaded.store.capacity(), 0);
}

#[test]
fn test_missing_terminator_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "u.tck", &tck_bytes("Float32LE", &[], &sample_tracks(), false));

    let err = load(&path, &LoadOptions::default()).unwrap_err();
    assert!(err.is_truncation());
}

#[test]
fn test_unsupported_datatype() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "i.tck", b"mrtrix tracks\ndatatype: Int32LE\nend\n");

    let err = load(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedDataType(_)));
}

#[test]
fn test_header_without_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "n.tck", b"mrtrix tracks\ndatatype: Float32LE\ncount: 1\n");

    let err = load(&path, &LoadOptions::default().with_mmap(false)).unwrap_err();
    assert!(matches!(err, Error::HeaderIntegrity(_)));
}

#[test]
fn test_crlf_header() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = b"mrtrix tracks\r\ndatatype: Float32LE\r\nend\r\n".to_vec();
    for v in [1.0f32, 2.0, 3.0, f32::NAN, f32::NAN, f32::NAN] {
        bytes.extend(v.to_le_bytes());
    }
    for _ in 0..3 {
        bytes.extend(f32::INFINITY.to_le_bytes());
    }
    let path = write_file(&dir, "crlf.tck", &bytes);

    let loaded = load(&path, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.stats.totals(), (1, 3));
}

#[test]
fn test_float64_odd_triples_are_points() {
    let dir = tempfile::tempdir().unwrap();
    let (inf, nan) = (f64::INFINITY, f64::NAN);
    let triples = [
        [1e300; 3],
        [1.0, 2.0, 3.0],
        [nan, 0.0, nan],
        [f64::NEG_INFINITY; 3],
        [inf, inf, 1.0],
        [nan; 3],
        [4.0, 5.0, 6.0],
        [nan; 3],
        [inf; 3],
    ];

    for dt in ["Float64", "Float64LE"] {
        let path = write_file(&dir, &format!("odd-{}.tck", dt), &tck_f64_triples(dt, &triples));
        let loaded = load(&path, &LoadOptions::default()).unwrap();
        assert_eq!(loaded.stats.totals(), (2, 18), "datatype {}", dt);

        let mut chain = Chain::new();
        loaded.store.get(0, &mut chain).unwrap();
        let pts = chain.points();
        assert_eq!(pts.len(), 5);
        // 1e300 overflows f32 once the triple is known to be a point.
        assert_eq!(pts[0], Vec3::INFINITY);
        assert_eq!(pts[1], Vec3::new(1.0, 2.0, 3.0));
        assert!(pts[2].x.is_nan() && pts[2].y == 0.0 && pts[2].z.is_nan());
        assert_eq!(pts[3], Vec3::NEG_INFINITY);
        assert_eq!(pts[4], Vec3::new(f32::INFINITY, f32::INFINITY, 1.0));

        loaded.store.get(1, &mut chain).unwrap();
        assert_eq!(chain.points(), &[Vec3::new(4.0, 5.0, 6.0)]);
    }
}
