// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live log following.
//!
//! A follower polls the [`JobJournal`] on a fixed interval and forwards new
//! lines until the job reaches a terminal state. Following a job that is
//! already terminal replays its log once and ends without polling. Dropping
//! the receiver stops the poller at its next tick.

use crate::journal::JobJournal;
use dp_core::{JobId, JobStatus, LogLine};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// One item of a followed log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Line(LogLine),
    /// Final event; the stream closes after it.
    Done(JobStatus),
}

/// Follow `job_id`. The job should already be tracked by the journal; an
/// untracked job yields a closed stream.
pub fn follow(
    journal: Arc<JobJournal>,
    job_id: JobId,
    interval: Duration,
) -> mpsc::UnboundedReceiver<StreamEvent> {
    match journal.read_from(&job_id, 0) {
        Some((lines, status)) if status.is_terminal() => replay(lines, status),
        Some(_) => {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(poll(journal, job_id, interval, tx));
            rx
        }
        None => mpsc::unbounded_channel().1,
    }
}

/// A finished stream: every line, then `Done(status)`.
pub fn replay(lines: Vec<LogLine>, status: JobStatus) -> mpsc::UnboundedReceiver<StreamEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    for line in lines {
        let _ = tx.send(StreamEvent::Line(line));
    }
    let _ = tx.send(StreamEvent::Done(status));
    rx
}

async fn poll(
    journal: Arc<JobJournal>,
    job_id: JobId,
    interval: Duration,
    tx: mpsc::UnboundedSender<StreamEvent>,
) {
    let mut cursor = 0;
    loop {
        if tx.is_closed() {
            tracing::debug!(job_id = %job_id, "log follower went away");
            return;
        }
        let Some((lines, status)) = journal.read_from(&job_id, cursor) else {
            // Job deleted or evicted while followed
            return;
        };
        cursor += lines.len();
        for line in lines {
            if tx.send(StreamEvent::Line(line)).is_err() {
                return;
            }
        }
        if status.is_terminal() {
            let _ = tx.send(StreamEvent::Done(status));
            return;
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
