// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator configuration

use crate::journal::DEFAULT_RETAINED_FINISHED;
use dp_adapters::SessionOptions;
use dp_portal::protocol::DEFAULT_DEPENDENT_FIELDS_DELAY;
use std::path::PathBuf;
use std::time::Duration;

/// Default number of jobs that may drive a browser page at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 3;

/// Default interval between log stream polls.
pub const DEFAULT_LOG_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Settings for [`Orchestrator`](crate::Orchestrator).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root of per-job artifact directories.
    pub artifacts_dir: PathBuf,
    pub max_concurrency: usize,
    pub log_poll_interval: Duration,
    /// Pause after choosing a category so dependent fields can render.
    pub dependent_fields_delay: Duration,
    pub session: SessionOptions,
    /// Finished jobs whose status and log stay in memory.
    pub retained_finished_jobs: usize,
}

impl EngineConfig {
    pub fn new(artifacts_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            log_poll_interval: DEFAULT_LOG_POLL_INTERVAL,
            dependent_fields_delay: DEFAULT_DEPENDENT_FIELDS_DELAY,
            session: SessionOptions::default(),
            retained_finished_jobs: DEFAULT_RETAINED_FINISHED,
        }
    }

    /// Clamped to at least one.
    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    pub fn log_poll_interval(mut self, interval: Duration) -> Self {
        self.log_poll_interval = interval;
        self
    }

    pub fn dependent_fields_delay(mut self, delay: Duration) -> Self {
        self.dependent_fields_delay = delay;
        self
    }

    pub fn session(mut self, session: SessionOptions) -> Self {
        self.session = session;
        self
    }

    pub fn retained_finished_jobs(mut self, n: usize) -> Self {
        self.retained_finished_jobs = n;
        self
    }
}
