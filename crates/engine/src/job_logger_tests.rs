// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

// 2026-01-30T08:14:09Z
const AT: u64 = 1_769_760_849_000;

#[test]
fn appends_timestamped_lines() {
    let dir = TempDir::new().unwrap();
    let logger = JobLogger::new(dir.path().to_path_buf());

    logger.append("job-1", AT, "run", "attempt 1 started");
    logger.append("job-1", AT + 1_000, "portal", "authenticated");

    let content = fs::read_to_string(dir.path().join("job-1/job.log")).unwrap();
    assert_eq!(
        content,
        "2026-01-30T08:14:09Z [run] attempt 1 started\n\
         2026-01-30T08:14:10Z [portal] authenticated\n"
    );
}

#[test]
fn unsafe_ids_write_nothing() {
    let dir = TempDir::new().unwrap();
    let logger = JobLogger::new(dir.path().join("artifacts"));

    logger.append("../escape", AT, "run", "nope");

    assert!(!dir.path().join("escape").exists());
    assert!(!dir.path().join("artifacts").exists());
}

#[test]
fn write_failures_are_swallowed() {
    let dir = TempDir::new().unwrap();
    // A file where the artifacts directory should be
    let blocked = dir.path().join("artifacts");
    fs::write(&blocked, "not a dir").unwrap();
    let logger = JobLogger::new(blocked);

    logger.append("job-1", AT, "run", "lost");
}
