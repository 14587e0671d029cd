//! Tests for grid extraction from ZIP archives.

use std::io::Cursor;

use sst_api::archive::{extract_grid_entry, extract_grid_file};
use sst_api::ApiError;
use sst_renderer::{GridError, RenderError};
use test_utils::zip_archive;

const LIMIT: usize = 1024;

#[test]
fn test_first_grid_entry_wins() {
    let bytes = zip_archive(&[
        ("readme.txt", b"hello".as_slice()),
        ("a/first.grid", &[1, 2, 3]),
        ("b/second.grid", &[4, 5, 6]),
    ]);
    let entry = extract_grid_entry(Cursor::new(bytes), LIMIT).unwrap();
    assert_eq!(entry.name, "a/first.grid");
    assert_eq!(entry.bytes, vec![1, 2, 3]);
}

#[test]
fn test_suffix_must_match_exactly() {
    let bytes = zip_archive(&[
        ("data.grid.bak", [1u8].as_slice()),
        ("grid", &[2]),
        ("x.GRID", &[3]),
    ]);
    let err = extract_grid_entry(Cursor::new(bytes), LIMIT).unwrap_err();
    assert!(matches!(err, ApiError::NoGridEntry));
}

#[test]
fn test_empty_archive() {
    let bytes = zip_archive(&[]);
    let err = extract_grid_entry(Cursor::new(bytes), LIMIT).unwrap_err();
    assert!(matches!(err, ApiError::NoGridEntry));
}

#[test]
fn test_garbage_is_invalid_archive() {
    let err = extract_grid_entry(Cursor::new(vec![b'x'; 64]), LIMIT).unwrap_err();
    assert!(matches!(err, ApiError::InvalidArchive(_)));
    assert_eq!(err.http_status_code(), 400);
}

#[test]
fn test_extract_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.zip");
    std::fs::write(&path, zip_archive(&[("sst.grid", [9u8; 16].as_slice())])).unwrap();

    let entry = extract_grid_file(&path, LIMIT).unwrap();
    assert_eq!(entry.name, "sst.grid");
    assert_eq!(entry.bytes.len(), 16);
}

// ============================================================================
// Size limit
// ============================================================================

#[test]
fn test_entry_at_limit_is_accepted() {
    let bytes = zip_archive(&[("sst.grid", [7u8; 32].as_slice())]);
    let entry = extract_grid_entry(Cursor::new(bytes), 32).unwrap();
    assert_eq!(entry.bytes.len(), 32);
}

#[test]
fn test_highly_compressible_entry_rejected() {
    // 64 MiB of zeros deflates to a few dozen KiB
    let zeros = vec![0u8; 64 * 1024 * 1024];
    let bytes = zip_archive(&[("sst.grid", zeros.as_slice())]);
    drop(zeros);
    assert!(bytes.len() < 1024 * 1024);

    let err = extract_grid_entry(Cursor::new(bytes), LIMIT).unwrap_err();
    match err {
        ApiError::Render(RenderError::MalformedGrid(GridError::Oversized { size, limit })) => {
            assert_eq!(limit, LIMIT);
            assert!(size > LIMIT as u64);
        }
        other => panic!("expected oversized grid, got {:?}", other),
    }
}

#[test]
fn test_oversized_entry_is_unprocessable() {
    let bytes = zip_archive(&[("sst.grid", [1u8; 33].as_slice())]);
    let err = extract_grid_entry(Cursor::new(bytes), 32).unwrap_err();
    assert_eq!(err.http_status_code(), 422);
}
