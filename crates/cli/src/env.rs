// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the `dp` binary.

use dp_adapters::ChromiumConfig;
use dp_engine::{EngineConfig, DEFAULT_LOG_POLL_INTERVAL, DEFAULT_MAX_CONCURRENCY};
use std::path::PathBuf;
use std::time::Duration;

/// Resolve state directory: DP_STATE_DIR > XDG_STATE_HOME/dp > ~/.local/state/dp
pub fn state_dir() -> anyhow::Result<PathBuf> {
    if let Some(dir) = non_empty("DP_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("dp"));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("cannot determine a state directory, set DP_STATE_DIR"))?;
    Ok(home.join(".local/state/dp"))
}

/// Snapshot file of the job repository.
pub fn repository_path(state_dir: &std::path::Path) -> PathBuf {
    state_dir.join("repository.json")
}

/// Root of per-job screenshots, recordings and `job.log` files.
pub fn artifacts_dir(state_dir: &std::path::Path) -> PathBuf {
    state_dir.join("artifacts")
}

/// Browser sessions run at once (default 3).
pub fn max_sessions() -> usize {
    parsed::<usize>("DP_MAX_SESSIONS").filter(|n| *n > 0).unwrap_or(DEFAULT_MAX_CONCURRENCY)
}

/// Log follower poll interval (default 1s).
pub fn log_poll_interval() -> Duration {
    millis("DP_LOG_POLL_MS").unwrap_or(DEFAULT_LOG_POLL_INTERVAL)
}

/// Run Chrome without a window. Anything but `0`/`false` keeps the default.
pub fn headless() -> bool {
    !matches!(non_empty("DP_HEADLESS").as_deref(), Some("0") | Some("false"))
}

pub fn chrome_path() -> Option<PathBuf> {
    non_empty("DP_CHROME_PATH").map(PathBuf::from)
}

pub fn settle_timeout() -> Option<Duration> {
    millis("DP_SETTLE_TIMEOUT_MS")
}

/// Command that turns stored ciphertext into the portal password.
pub fn decrypt_command() -> Option<String> {
    non_empty("DP_DECRYPT_COMMAND")
}

/// Tracing filter directives (default `info`).
pub fn log_filter() -> String {
    non_empty("DP_LOG").unwrap_or_else(|| "info".to_string())
}

pub fn engine_config(state_dir: &std::path::Path) -> EngineConfig {
    EngineConfig::new(artifacts_dir(state_dir))
        .max_concurrency(max_sessions())
        .log_poll_interval(log_poll_interval())
}

pub fn chromium_config() -> ChromiumConfig {
    let defaults = ChromiumConfig::default();
    ChromiumConfig {
        headless: headless(),
        executable: chrome_path(),
        settle_timeout: settle_timeout().unwrap_or(defaults.settle_timeout),
        ..defaults
    }
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty(key).and_then(|s| s.trim().parse::<T>().ok())
}

fn millis(key: &str) -> Option<Duration> {
    parsed::<u64>(key).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
