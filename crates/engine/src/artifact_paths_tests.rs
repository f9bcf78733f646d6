// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

type PathFn = fn(&Path, &str) -> PathBuf;

#[yare::parameterized(
    root_of_job = { job_dir as PathFn,      "job-001", "job-001" },
    log_file    = { job_log_path as PathFn, "job-001", "job-001/job.log" },
    recordings  = { video_dir as PathFn,    "job-001", "job-001/video" },
)]
fn path_builds_expected(func: PathFn, id: &str, expected_suffix: &str) {
    assert_eq!(
        func(Path::new("/state/artifacts"), id),
        PathBuf::from(format!("/state/artifacts/{}", expected_suffix))
    );
}

#[yare::parameterized(
    nanoid     = { "job-V1StGXR8_Z5jdHi6", true },
    plain      = { "abc123", true },
    empty      = { "", false },
    parent     = { "..", false },
    traversal  = { "../etc", false },
    slash      = { "a/b", false },
    dot        = { "job.1", false },
)]
fn safe_job_ids(id: &str, expected: bool) {
    assert_eq!(is_safe_job_id(id), expected);
}
