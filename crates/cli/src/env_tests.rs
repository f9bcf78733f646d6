// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::path::Path;

const VARS: &[&str] = &[
    "DP_STATE_DIR",
    "XDG_STATE_HOME",
    "DP_MAX_SESSIONS",
    "DP_LOG_POLL_MS",
    "DP_HEADLESS",
    "DP_CHROME_PATH",
    "DP_SETTLE_TIMEOUT_MS",
    "DP_DECRYPT_COMMAND",
    "DP_LOG",
];

fn clear() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn state_dir_prefers_explicit_override() {
    clear();
    std::env::set_var("DP_STATE_DIR", "/tmp/dp-state");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");

    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/dp-state"));
    clear();
}

#[test]
#[serial]
fn state_dir_falls_back_to_xdg() {
    clear();
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");

    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/xdg/dp"));
    clear();
}

#[test]
#[serial]
fn state_dir_ignores_blank_override() {
    clear();
    std::env::set_var("DP_STATE_DIR", "  ");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");

    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/xdg/dp"));
    clear();
}

#[test]
fn state_files_live_under_the_state_dir() {
    let root = Path::new("/var/lib/dp");
    assert_eq!(repository_path(root), PathBuf::from("/var/lib/dp/repository.json"));
    assert_eq!(artifacts_dir(root), PathBuf::from("/var/lib/dp/artifacts"));
}

#[test]
#[serial]
fn defaults_apply_when_unset() {
    clear();

    assert_eq!(max_sessions(), 3);
    assert_eq!(log_poll_interval(), Duration::from_secs(1));
    assert!(headless());
    assert_eq!(chrome_path(), None);
    assert_eq!(decrypt_command(), None);
    assert_eq!(log_filter(), "info");
}

#[test]
#[serial]
fn invalid_session_limit_uses_default() {
    for value in ["many", "0", "-2"] {
        clear();
        std::env::set_var("DP_MAX_SESSIONS", value);
        assert_eq!(max_sessions(), 3, "DP_MAX_SESSIONS={value}");
    }
    clear();
}

#[test]
#[serial]
fn numeric_overrides_are_read() {
    clear();
    std::env::set_var("DP_MAX_SESSIONS", "5");
    std::env::set_var("DP_LOG_POLL_MS", "250");
    std::env::set_var("DP_SETTLE_TIMEOUT_MS", "30000");

    let config = engine_config(Path::new("/tmp/dp"));
    assert_eq!(config.max_concurrency, 5);
    assert_eq!(config.log_poll_interval, Duration::from_millis(250));
    assert_eq!(config.artifacts_dir, PathBuf::from("/tmp/dp/artifacts"));
    assert_eq!(chromium_config().settle_timeout, Duration::from_secs(30));
    clear();
}

#[test]
#[serial]
fn headless_flag() {
    for (value, expected) in [("0", false), ("false", false), ("1", true), ("true", true)] {
        clear();
        std::env::set_var("DP_HEADLESS", value);
        assert_eq!(headless(), expected, "DP_HEADLESS={value}");
        assert_eq!(chromium_config().headless, expected);
    }
    clear();
}

#[test]
#[serial]
fn chrome_and_decrypt_overrides() {
    clear();
    std::env::set_var("DP_CHROME_PATH", "/opt/chrome/chrome");
    std::env::set_var("DP_DECRYPT_COMMAND", "dp-decrypt --key /etc/dp.key");
    std::env::set_var("DP_LOG", "dp_engine=debug");

    assert_eq!(chromium_config().executable, Some(PathBuf::from("/opt/chrome/chrome")));
    assert_eq!(decrypt_command().as_deref(), Some("dp-decrypt --key /etc/dp.key"));
    assert_eq!(log_filter(), "dp_engine=debug");
    clear();
}
