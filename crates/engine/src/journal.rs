// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory mirror of job status and log lines.
//!
//! Status and log reads are served from here while a job is active, so
//! pollers and log followers never touch the repository on each tick. The
//! repository stays the durable copy; entries are seeded from it on first
//! access.
//!
//! Finished jobs are retired once their last write is persisted. Only the
//! most recently retired ones stay in memory; older ones are read back from
//! the repository.

use dp_core::{AutomationJob, JobId, JobStatus, LogLine};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// Finished jobs kept in memory after they are retired.
pub const DEFAULT_RETAINED_FINISHED: usize = 64;

struct Entry {
    status: JobStatus,
    lines: Vec<LogLine>,
}

#[derive(Default)]
struct State {
    entries: HashMap<JobId, Entry>,
    /// Retired jobs, oldest first.
    retired: VecDeque<JobId>,
}

pub struct JobJournal {
    state: Mutex<State>,
    retain: usize,
}

impl Default for JobJournal {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETAINED_FINISHED)
    }
}

impl JobJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `retain` retired jobs in memory.
    pub fn with_retention(retain: usize) -> Self {
        Self { state: Mutex::new(State::default()), retain }
    }

    /// Track `job` unless it is already tracked.
    pub fn seed(&self, job: &AutomationJob) {
        self.state
            .lock()
            .entries
            .entry(job.id.clone())
            .or_insert_with(|| Entry { status: job.status, lines: job.logs.clone() });
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.state.lock().entries.contains_key(id)
    }

    pub fn set_status(&self, id: &JobId, status: JobStatus) {
        if let Some(entry) = self.state.lock().entries.get_mut(id) {
            entry.status = status;
        }
    }

    /// Append a line. Untracked jobs are ignored.
    pub fn append(&self, id: &JobId, line: LogLine) {
        if let Some(entry) = self.state.lock().entries.get_mut(id) {
            entry.lines.push(line);
        }
    }

    pub fn status(&self, id: &JobId) -> Option<JobStatus> {
        self.state.lock().entries.get(id).map(|e| e.status)
    }

    pub fn lines(&self, id: &JobId) -> Option<Vec<LogLine>> {
        self.state.lock().entries.get(id).map(|e| e.lines.clone())
    }

    /// Lines from index `cursor` on, with the status at the time of reading.
    pub fn read_from(&self, id: &JobId, cursor: usize) -> Option<(Vec<LogLine>, JobStatus)> {
        self.state
            .lock()
            .entries
            .get(id)
            .map(|e| (e.lines.get(cursor..).unwrap_or_default().to_vec(), e.status))
    }

    pub fn remove(&self, id: &JobId) {
        let mut state = self.state.lock();
        state.entries.remove(id);
        state.retired.retain(|r| r != id);
    }

    /// Mark a finished job as evictable. Jobs that are not tracked or not
    /// terminal are left alone. Evicts the oldest retired jobs beyond the
    /// retention limit, unless a retry made them active again.
    pub fn retire(&self, id: &JobId) {
        let mut state = self.state.lock();
        let finished = state.entries.get(id).is_some_and(|e| e.status.is_terminal());
        if !finished || state.retired.contains(id) {
            return;
        }
        state.retired.push_back(id.clone());
        while state.retired.len() > self.retain {
            let Some(oldest) = state.retired.pop_front() else {
                break;
            };
            if state.entries.get(&oldest).is_some_and(|e| e.status.is_terminal()) {
                state.entries.remove(&oldest);
            }
        }
    }

    /// Number of tracked jobs.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
