//! Integration tests: read TH1 histograms from ROOT files on disk.

use hdump_root::fixture::{FixtureHistogram, RootFileBuilder};
use hdump_root::{RootError, RootFile};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn tmp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("hdump_root_{}_{}_{}", std::process::id(), nanos, name));
    p
}

#[test]
fn open_mmapped_file_and_walk_keys() {
    let path = tmp_path("walk.root");
    RootFileBuilder::new()
        .compressed(true)
        .histogram(&FixtureHistogram::uniform("signal", 0.0, 2.0, &[5.0, 3.0]))
        .object("events", "TTree", 1, vec![0u8; 32])
        .histogram(
            &FixtureHistogram::variable("background", &[0.0, 1.0, 4.0], &[10.0, 2.0])
                .with_class("TH1F")
                .with_sumw2(&[16.0, 1.0]),
        )
        .write_to(&path)
        .unwrap();

    let f = RootFile::open(&path).expect("failed to open ROOT file");
    assert_eq!(f.path(), path.as_path());

    let keys = f.keys().unwrap();
    let names: Vec<&str> = keys.iter().map(|k| k.name.as_str()).collect();
    assert_eq!(names, vec!["signal", "events", "background"]);

    let signal = f.read_histogram(&keys[0]).unwrap();
    let rows: Vec<(f64, f64, f64)> = signal.bins().map(|b| (b.low_edge, b.content, b.width)).collect();
    assert_eq!(rows, vec![(0.0, 5.0, 1.0), (1.0, 3.0, 1.0)]);

    assert!(matches!(f.read_histogram(&keys[1]), Err(RootError::UnsupportedClass(_))));

    let bkg = f.read_histogram(&keys[2]).unwrap();
    assert_eq!(bkg.width(2), 3.0);
    assert_eq!(bkg.error(1), 4.0);
    assert_eq!(bkg.error(2), 1.0);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn garbage_file_is_rejected() {
    let path = tmp_path("garbage.root");
    std::fs::write(&path, b"this is definitely not a ROOT file, just some plain text bytes....")
        .unwrap();
    assert!(matches!(RootFile::open(&path), Err(RootError::BadMagic)));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn truncated_file_fails_on_enumeration_or_open() {
    let path = tmp_path("truncated.root");
    let mut bytes = RootFileBuilder::new()
        .histogram(&FixtureHistogram::uniform("h", 0.0, 1.0, &[1.0]))
        .build();
    bytes.truncate(bytes.len() - 20);
    std::fs::write(&path, &bytes).unwrap();

    let result = RootFile::open(&path).and_then(|f| f.keys());
    assert!(result.is_err());
    let _ = std::fs::remove_file(&path);
}
