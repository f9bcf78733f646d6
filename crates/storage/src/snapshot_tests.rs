// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let state = load(&dir.path().join("nope.json")).unwrap();
    assert_eq!(serde_json::to_value(&state).unwrap(), serde_json::to_value(RepositoryState::default()).unwrap());
}

#[test]
fn corrupt_file_is_moved_aside() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repository.json");
    fs::write(&path, b"{ not json").unwrap();

    load(&path).unwrap();

    assert!(!path.exists());
    assert_eq!(fs::read(path.with_extension("bak")).unwrap(), b"{ not json");
}

#[test]
fn newer_version_is_moved_aside() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repository.json");
    fs::write(&path, br#"{"v": 99, "saved_at": "2026-01-30T08:14:09Z", "state": {}}"#).unwrap();

    load(&path).unwrap();

    assert!(path.with_extension("bak").exists());
}

#[test]
fn backups_rotate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repository.json");
    for n in 0..4 {
        fs::write(&path, format!("garbage {n}")).unwrap();
        load(&path).unwrap();
    }

    assert_eq!(fs::read_to_string(path.with_extension("bak")).unwrap(), "garbage 3");
    assert_eq!(fs::read_to_string(path.with_extension("bak.2")).unwrap(), "garbage 2");
    assert_eq!(fs::read_to_string(path.with_extension("bak.3")).unwrap(), "garbage 1");
}

#[test]
fn save_writes_versioned_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repository.json");

    save(&path, &RepositoryState::default()).unwrap();

    let doc: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(doc["v"], CURRENT_SNAPSHOT_VERSION);
    assert!(doc["state"].is_object());
}
