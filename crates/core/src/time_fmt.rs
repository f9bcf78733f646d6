// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp and duration formatting helpers.

use chrono::{DateTime, Utc};

/// Format epoch milliseconds as `2026-01-30T08:14:09Z`.
pub fn format_utc(epoch_ms: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64)
        .unwrap_or_default()
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// Format the current time as `2026-01-30T08:14:09Z`.
pub fn format_utc_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Format a millisecond duration as a compact human string (`850ms`, `12s`, `3m05s`).
pub fn format_elapsed_ms(ms: u64) -> String {
    if ms < 1_000 {
        return format!("{}ms", ms);
    }
    let secs = ms / 1_000;
    if secs < 60 {
        return format!("{}s", secs);
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{}m{:02}s", mins, secs % 60);
    }
    format!("{}h{:02}m", mins / 60, mins % 60)
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
