// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON snapshot persistence for [`MemoryRepository`](crate::MemoryRepository).
//!
//! The whole repository is written to one file after every change, through a
//! temporary file and a rename so a crash never leaves a half-written file.
//! A file that fails to parse is moved aside to `.bak` and the repository
//! starts empty.

use crate::memory::RepositoryState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current snapshot schema version
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    #[serde(rename = "v")]
    version: u32,
    saved_at: DateTime<Utc>,
    state: RepositoryState,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    #[serde(rename = "v")]
    version: u32,
    saved_at: DateTime<Utc>,
    state: &'a RepositoryState,
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

/// Load the state at `path`. Missing file: empty state.
pub(crate) fn load(path: &Path) -> Result<RepositoryState, std::io::Error> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(RepositoryState::default()),
        Err(e) => return Err(e),
    };
    match serde_json::from_str::<Snapshot>(&content) {
        Ok(snapshot) if snapshot.version <= CURRENT_SNAPSHOT_VERSION => Ok(snapshot.state),
        Ok(snapshot) => {
            tracing::warn!(
                path = %path.display(),
                version = snapshot.version,
                "snapshot is newer than this build, starting empty"
            );
            set_aside(path)?;
            Ok(RepositoryState::default())
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "corrupt snapshot, starting empty");
            set_aside(path)?;
            Ok(RepositoryState::default())
        }
    }
}

fn set_aside(path: &Path) -> Result<(), std::io::Error> {
    let bak = rotate_bak_path(path);
    fs::rename(path, &bak)
}

/// Atomically replace the snapshot at `path`.
pub(crate) fn save(path: &Path, state: &RepositoryState) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let snapshot =
        SnapshotRef { version: CURRENT_SNAPSHOT_VERSION, saved_at: Utc::now(), state };
    let json = serde_json::to_vec_pretty(&snapshot).map_err(std::io::Error::other)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
