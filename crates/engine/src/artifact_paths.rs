// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path builders for per-job artifact files.
//!
//! ```text
//! <artifacts>/<job_id>/step-01-login-page.png
//! <artifacts>/<job_id>/job.log
//! <artifacts>/<job_id>/video/recording.webm
//! ```

use std::path::{Path, PathBuf};

/// Job ids become directory names, so only a safe alphabet is accepted.
pub fn is_safe_job_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

pub fn job_dir(root: &Path, job_id: &str) -> PathBuf {
    root.join(job_id)
}

pub fn job_log_path(root: &Path, job_id: &str) -> PathBuf {
    job_dir(root, job_id).join("job.log")
}

pub fn video_dir(root: &Path, job_id: &str) -> PathBuf {
    job_dir(root, job_id).join("video")
}

#[cfg(test)]
#[path = "artifact_paths_tests.rs"]
mod tests;
