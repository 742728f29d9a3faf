//! On-disk inject/extract round trips over synthetic containers

#![allow(clippy::unwrap_used, clippy::panic)]

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use sevenz_format::{MAGIC, ParseOptions, crc};
use sevenz_steg::{Carrier, Slot, StegError, resolve_pattern};

/// A valid container image with one pack stream covering `body`
fn build_container(body: &[u8], bottom: &[u8]) -> Vec<u8> {
    let trailer = [
        0x01, // Header
        0x04, // MainStreamsInfo
        0x06, 0x00, 0x01, // PackInfo: data offset 0, 1 stream
        0x09, body.len() as u8, // Size
        0x00, // End
    ];
    let mut image = Vec::new();
    image.extend_from_slice(&MAGIC);
    image.extend_from_slice(&[0x00, 0x04]);
    image.extend_from_slice(&[0; 4]);
    image.extend_from_slice(&(body.len() as u64).to_le_bytes());
    image.extend_from_slice(&(trailer.len() as u64).to_le_bytes());
    image.extend_from_slice(&crc::crc32(&trailer).to_be_bytes());
    image.extend_from_slice(body);
    image.extend_from_slice(&trailer);
    image.extend_from_slice(bottom);
    let header_crc = crc::header_crc(&image);
    image[8..12].copy_from_slice(&header_crc.to_be_bytes());
    image
}

fn write_fixtures(dir: &tempfile::TempDir, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.path().join(format!("part{}.7z", i + 1));
            fs::write(&path, build_container(b"BODY", b"")).unwrap();
            path
        })
        .collect()
}

#[test]
fn payload_round_trips_across_files_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_fixtures(&dir, 3);
    let payload = b"attack at dawn, bring snacks".to_vec();

    let mut carrier = Carrier::open(paths.clone(), ParseOptions::default()).unwrap();
    carrier.inject(&payload, Slot::Center);
    carrier.commit().unwrap();

    // a fresh carrier over the same files recovers the payload
    let reopened = Carrier::open(paths, ParseOptions::default()).unwrap();
    assert_eq!(reopened.extract(Slot::Center), payload);
    for file in reopened.files() {
        assert!(file.archive().header_crc_valid());
        assert!(file.archive().trailer_crc_valid());
    }
}

#[test]
fn bottom_slot_round_trips_and_leaves_offsets_alone() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_fixtures(&dir, 2);
    let payload = vec![0xA5u8; 33];

    let mut carrier = Carrier::open(paths.clone(), ParseOptions::default()).unwrap();
    let starts: Vec<u64> = carrier
        .files()
        .iter()
        .map(|f| f.archive().descriptor().trailer_start_relative)
        .collect();
    carrier.inject(&payload, Slot::Bottom);
    carrier.commit().unwrap();

    let reopened = Carrier::open(paths, ParseOptions::default()).unwrap();
    assert_eq!(reopened.extract(Slot::Bottom), payload);
    let starts_after: Vec<u64> = reopened
        .files()
        .iter()
        .map(|f| f.archive().descriptor().trailer_start_relative)
        .collect();
    assert_eq!(starts_after, starts);
}

#[test]
fn natural_ordering_governs_stripe_order() {
    let dir = tempfile::tempdir().unwrap();
    // created out of order on purpose
    for name in ["part10.7z", "part2.7z", "part1.7z"] {
        fs::write(dir.path().join(name), build_container(b"BODY", b"")).unwrap();
    }
    let pattern = dir.path().join("part*.7z");
    let files = resolve_pattern(&pattern.to_string_lossy(), false).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["part1.7z", "part2.7z", "part10.7z"]);

    let payload = b"123456789".to_vec();
    let mut carrier = Carrier::open(files.clone(), ParseOptions::default()).unwrap();
    carrier.inject(&payload, Slot::Center);
    carrier.commit().unwrap();
    assert_eq!(
        Carrier::open(files, ParseOptions::default())
            .unwrap()
            .extract(Slot::Center),
        payload
    );
}

#[test]
fn a_corrupt_member_blocks_the_batch_and_originals_survive() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_fixtures(&dir, 2);
    let originals: Vec<Vec<u8>> = paths.iter().map(|p| fs::read(p).unwrap()).collect();

    // damage the second file's magic
    let mut damaged = originals[1].clone();
    damaged[0] = b'X';
    fs::write(&paths[1], &damaged).unwrap();

    let result = Carrier::open(paths.clone(), ParseOptions::default());
    match result {
        Err(StegError::Format { path, .. }) => assert_eq!(path, paths[1]),
        other => panic!("expected a parse failure, got {other:?}"),
    }

    // nothing was written: the first file is byte-identical
    assert_eq!(fs::read(&paths[0]).unwrap(), originals[0]);
    assert_eq!(fs::read(&paths[1]).unwrap(), damaged);
}

#[test]
fn regex_pattern_mode_matches_the_stem() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(&dir, 2);
    fs::write(dir.path().join("other.dat"), b"not a container").unwrap();

    let pattern = dir.path().join("part[0-9]+");
    let files = resolve_pattern(&pattern.to_string_lossy(), true).unwrap();
    assert_eq!(files.len(), 2);
}
