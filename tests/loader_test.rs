//! Loading raw dumps and metadata sidecars from disk.

mod common;

use common::{fixtures, DumpDir};
use diffrant::error::LoadError;
use diffrant::loaders::{load_metadata, load_raw};
use diffrant_core::BitDepth;
use pretty_assertions::assert_eq;

#[test]
fn test_load_dump_and_sidecar() {
    let dump = DumpDir::new();
    let metadata = load_metadata(&dump.metadata).unwrap();
    assert_eq!(metadata.panel_size, (fixtures::PANEL, fixtures::PANEL));
    assert_eq!(metadata.image_depth, BitDepth::Sixteen);
    assert_eq!(metadata.panel_distance_mm, 20.0);
    assert_eq!(metadata.beam_energy_kev, Some(12.4));

    let image = load_raw(&dump.image, &metadata).unwrap();
    assert_eq!((image.width(), image.height()), (64, 64));
    assert_eq!(image.get(0, 10), Some(fixtures::MASKED_VALUE as u32));
    assert_eq!(image.get(42, 32), Some(100));
}

#[test]
fn test_sidecar_without_energy() {
    let dump = DumpDir::with(&fixtures::panel_samples(), &fixtures::metadata_json(None));
    let metadata = load_metadata(&dump.metadata).unwrap();
    assert_eq!(metadata.beam_energy_kev, None);
}

#[test]
fn test_truncated_dump_is_rejected() {
    let mut samples = fixtures::panel_samples();
    samples.pop();
    let dump = DumpDir::with(&samples, &fixtures::metadata_json(Some(12.4)));
    let metadata = load_metadata(&dump.metadata).unwrap();
    match load_raw(&dump.image, &metadata) {
        Err(LoadError::SizeMismatch {
            expected, actual, ..
        }) => {
            assert_eq!(expected, 64 * 64 * 2);
            assert_eq!(actual, 64 * 64 * 2 - 2);
        }
        other => panic!("expected size mismatch, got {other:?}"),
    }
}

#[test]
fn test_missing_files_are_io_errors() {
    let dump = DumpDir::new();
    let missing = dump.dir.path().join("nope.json");
    assert!(matches!(load_metadata(&missing), Err(LoadError::Io(_))));

    let metadata = load_metadata(&dump.metadata).unwrap();
    let missing = dump.dir.path().join("nope.raw");
    assert!(matches!(load_raw(&missing, &metadata), Err(LoadError::Io(_))));
}

#[test]
fn test_malformed_sidecar() {
    let dump = DumpDir::with(&fixtures::panel_samples(), "{ \"beam_center\": ");
    assert!(matches!(
        load_metadata(&dump.metadata),
        Err(LoadError::MetadataParse(_))
    ));
}
