// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only per-job activity log on disk.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::artifact_paths::{self, is_safe_job_id};
use dp_core::format_utc;

/// Writes human-readable timestamped lines to `<artifacts>/<job_id>/job.log`.
///
/// Each `append()` call opens, writes, and closes the file, which is fine for
/// the handful of lines a run produces.
pub struct JobLogger {
    root: PathBuf,
}

impl JobLogger {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn path_for(&self, job_id: &str) -> PathBuf {
        artifact_paths::job_log_path(&self.root, job_id)
    }

    /// Append a line for the given job.
    ///
    /// Format: `2026-01-30T08:14:09Z [stage] message`
    ///
    /// Failures are logged via tracing and otherwise ignored.
    pub fn append(&self, job_id: &str, at_ms: u64, stage: &str, message: &str) {
        if !is_safe_job_id(job_id) {
            tracing::warn!(job_id, "refusing to write job log for unsafe id");
            return;
        }
        let path = self.path_for(job_id);
        if let Err(e) = write_line(&path, at_ms, stage, message) {
            tracing::warn!(job_id, error = %e, "failed to write job log");
        }
    }
}

fn write_line(path: &Path, at_ms: u64, stage: &str, message: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{} [{}] {}", format_utc(at_ms), stage, message)?;
    Ok(())
}

#[cfg(test)]
#[path = "job_logger_tests.rs"]
mod tests;
