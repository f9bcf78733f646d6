// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamped job log lines.

use crate::time_fmt::format_utc;
use serde::{Deserialize, Serialize};

/// One entry of a job's append-only activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub at_ms: u64,
    pub message: String,
}

impl LogLine {
    pub fn new(at_ms: u64, message: impl Into<String>) -> Self {
        Self { at_ms, message: message.into() }
    }
}

impl std::fmt::Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", format_utc(self.at_ms), self.message)
    }
}
