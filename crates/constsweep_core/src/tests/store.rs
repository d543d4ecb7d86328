//! Tests for the result store
//!
//! These tests verify that:
//! - Upserting the same kernel/constants/model path keeps a single, latest entry
//! - Saving and loading reproduces the store exactly
//! - Missing and empty stores load as empty, corrupt stores fail loudly
//! - An interrupted save never touches the existing store file

use std::fs;

use serde_json::json;
use tempfile::tempdir;

use crate::error::StoreError;
use crate::store::{AnalysisResult, ConstantsKey, ResultStore};

fn key(pairs: &[(&str, i64)]) -> ConstantsKey {
    ConstantsKey::new(pairs.iter().map(|&(n, v)| (n.to_string(), v)).collect())
}

fn sample_store() -> ResultStore {
    let mut store = ResultStore::new();
    store.upsert(
        "triad.c",
        key(&[("N", 1000), ("M", 8)]),
        "ECM",
        json!({ "T_OL": 12.5, "T_nOL": [3.0, 4.25], "unit": "cy/CL" }).into(),
    );
    store.upsert(
        "triad.c",
        key(&[("N", 1000), ("M", 8)]),
        "Roofline",
        json!({ "bottleneck": "L3", "performance": 1.2345678901234567e9 }).into(),
    );
    store.upsert(
        "jacobi.c",
        key(&[("N", 500)]),
        "ECM",
        json!({ "T_OL": 0.1 }).into(),
    );
    store
}

#[test]
fn test_upsert_creates_levels() {
    let store = sample_store();

    assert_eq!(store.len(), 3);
    assert_eq!(store.kernels().collect::<Vec<_>>(), vec!["jacobi.c", "triad.c"]);
    assert_eq!(
        store
            .models("triad.c", &key(&[("N", 1000), ("M", 8)]))
            .map(|m| m.keys().cloned().collect::<Vec<_>>()),
        Some(vec!["ECM".to_string(), "Roofline".to_string()])
    );
    assert!(store.get("triad.c", &key(&[("N", 1000)]), "ECM").is_none());
}

#[test]
fn test_upsert_same_path_overwrites() {
    let mut store = ResultStore::new();
    let constants = key(&[("N", 10)]);

    let first = store.upsert("k.c", constants.clone(), "ECM", json!(1).into());
    let second = store.upsert("k.c", constants.clone(), "ECM", json!(2).into());

    assert!(first.is_none());
    assert_eq!(second, Some(AnalysisResult::new(json!(1))));
    assert_eq!(store.len(), 1);
    assert_eq!(
        store.get("k.c", &constants, "ECM").map(AnalysisResult::value),
        Some(&json!(2))
    );
}

#[test]
fn test_constant_order_distinguishes_keys() {
    let mut store = ResultStore::new();
    store.upsert("k.c", key(&[("N", 1), ("M", 2)]), "ECM", json!("a").into());
    store.upsert("k.c", key(&[("M", 2), ("N", 1)]), "ECM", json!("b").into());

    assert_eq!(store.entries("k.c").map(|e| e.len()), Some(2));
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    let store = sample_store();

    store.save(&path).unwrap();
    let loaded = ResultStore::load(&path).unwrap();

    assert_eq!(loaded, store);
}

#[test]
fn test_serialized_keys_keep_constant_order() {
    let mut store = ResultStore::new();
    store.upsert("k.c", key(&[("N", 1), ("M", 2)]), "ECM", json!(null).into());

    let value: serde_json::Value = serde_json::from_slice(&store.to_bytes().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({ "k.c": [ { "constants": [["N", 1], ["M", 2]], "models": { "ECM": null } } ] })
    );
}

#[test]
fn test_save_overwrites_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");

    let mut store = ResultStore::new();
    store.save(&path).unwrap();
    store.upsert("k.c", key(&[("N", 1)]), "ECM", json!(1).into());
    store.save(&path).unwrap();

    assert_eq!(ResultStore::load(&path).unwrap().len(), 1);
    // Only the store itself remains, no temporary files
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_load_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = ResultStore::load(&dir.path().join("absent.json")).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_load_empty_file_is_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    fs::write(&path, b"").unwrap();

    let store = ResultStore::load(&path).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_load_truncated_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    let bytes = sample_store().to_bytes().unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let err = ResultStore::load(&path).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }), "got {err:?}");
}

#[test]
fn test_load_garbage_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    fs::write(&path, b"\x80\x04\x95 not a store").unwrap();

    assert!(matches!(
        ResultStore::load(&path),
        Err(StoreError::Corrupt { .. })
    ));
}

#[test]
fn test_load_directory_is_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        ResultStore::load(dir.path()),
        Err(StoreError::Io { .. })
    ));
}

#[test]
fn test_interrupted_save_leaves_original_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");

    let mut store = sample_store();
    store.save(&path).unwrap();
    let original = fs::read(&path).unwrap();

    store.upsert("new.c", key(&[("N", 7)]), "ECM", json!(7).into());
    let staged = store.stage(&path).unwrap();
    let temp_path = staged.path().to_path_buf();

    // The new contents are fully written next to the target...
    assert_eq!(temp_path.parent(), Some(dir.path()));
    assert_eq!(fs::read(&temp_path).unwrap(), store.to_bytes().unwrap());
    assert_eq!(fs::read(&path).unwrap(), original);

    // ...and abandoning the save before the rename keeps the old store.
    drop(staged);
    assert!(!temp_path.exists());
    assert_eq!(fs::read(&path).unwrap(), original);
    assert_eq!(ResultStore::load(&path).unwrap(), sample_store());
}

#[test]
fn test_staged_save_commit_replaces_target() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    fs::write(&path, b"").unwrap();

    let store = sample_store();
    store.stage(&path).unwrap().commit().unwrap();

    assert_eq!(ResultStore::load(&path).unwrap(), store);
}
