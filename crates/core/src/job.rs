// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Automation job record and its status state machine.

use crate::clock::Clock;
use crate::id::{JobId, RecordId, UserId};
use crate::log::LogLine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of an automation job.
///
/// ```text
/// PENDING ──▶ RUNNING ──▶ COMPLETED | FAILED | CANCELLED | WAITING_CONFIRMATION
/// WAITING_CONFIRMATION ──▶ COMPLETED | FAILED | CANCELLED
/// PENDING ──▶ CANCELLED            (cancel before the run starts)
/// FAILED  ──▶ PENDING              (explicit retry only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    WaitingConfirmation,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Pending,
        JobStatus::Running,
        JobStatus::WaitingConfirmation,
        JobStatus::Completed,
        JobStatus::Failed,
        JobStatus::Cancelled,
    ];

    /// Terminal states never transition automatically.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }

    /// Whether `self -> next` is an edge of the state machine.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Cancelled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Cancelled)
                | (Running, WaitingConfirmation)
                | (WaitingConfirmation, Completed)
                | (WaitingConfirmation, Failed)
                | (WaitingConfirmation, Cancelled)
                | (Failed, Pending)
        )
    }
}

crate::enum_labels! {
    JobStatus {
        Pending => "PENDING",
        Running => "RUNNING",
        WaitingConfirmation => "WAITING_CONFIRMATION",
        Completed => "COMPLETED",
        Failed => "FAILED",
        Cancelled => "CANCELLED",
    }
}

/// What a job does once it has a browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Authenticate, fill the deduction form, then submit or wait for confirmation.
    #[default]
    SubmitDeduction,
    /// Authenticate and reach the application only.
    VerifyLogin,
}

crate::enum_labels! {
    JobKind {
        SubmitDeduction => "submit_deduction",
        VerifyLogin => "verify_login",
    }
}

/// Rejected status change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid job transition {from} -> {to}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// A unit of portal automation work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationJob {
    pub id: JobId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    pub kind: JobKind,
    pub status: JobStatus,
    /// Number of orchestration runs started for this job.
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the last failure was an anti-automation challenge.
    #[serde(default)]
    pub challenge_detected: bool,
    #[serde(default)]
    pub logs: Vec<LogLine>,
    /// Filename of the screenshot shown for manual confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
}

impl AutomationJob {
    pub fn new(
        id: JobId,
        user_id: UserId,
        kind: JobKind,
        record_id: Option<RecordId>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id,
            user_id,
            record_id,
            kind,
            status: JobStatus::Pending,
            attempts: 0,
            error: None,
            challenge_detected: false,
            logs: Vec::new(),
            screenshot: None,
            created_at_ms: clock.epoch_ms(),
            started_at_ms: None,
            completed_at_ms: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move to `next`, keeping `completed_at_ms` set exactly in terminal states.
    pub fn transition(&mut self, next: JobStatus, now_ms: u64) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError { from: self.status, to: next });
        }
        self.status = next;
        self.completed_at_ms = next.is_terminal().then_some(now_ms);
        Ok(())
    }

    /// Enter `RUNNING` for a new orchestration run. Returns the attempt number.
    pub fn begin_attempt(&mut self, now_ms: u64) -> Result<u32, TransitionError> {
        self.transition(JobStatus::Running, now_ms)?;
        self.attempts += 1;
        self.started_at_ms = Some(now_ms);
        self.error = None;
        self.challenge_detected = false;
        Ok(self.attempts)
    }

    /// Move to `FAILED` with a displayable message.
    pub fn fail(
        &mut self,
        message: impl Into<String>,
        challenge: bool,
        now_ms: u64,
    ) -> Result<(), TransitionError> {
        self.transition(JobStatus::Failed, now_ms)?;
        let message = message.into();
        self.error = Some(if message.trim().is_empty() {
            "automation failed".to_string()
        } else {
            message
        });
        self.challenge_detected = challenge;
        Ok(())
    }

    /// Return a failed job to `PENDING` so it can be processed again.
    pub fn reset_for_retry(&mut self, now_ms: u64) -> Result<(), TransitionError> {
        self.transition(JobStatus::Pending, now_ms)?;
        self.error = None;
        self.challenge_detected = false;
        self.screenshot = None;
        Ok(())
    }
}

crate::builder! {
    pub struct AutomationJobBuilder => AutomationJob {
        into {
            id: JobId = "job-1",
            user_id: UserId = "user-1",
        }
        set {
            kind: JobKind = JobKind::SubmitDeduction,
            status: JobStatus = JobStatus::Pending,
            attempts: u32 = 0,
            challenge_detected: bool = false,
            logs: Vec<LogLine> = Vec::new(),
            created_at_ms: u64 = 1_000_000,
            started_at_ms: Option<u64> = None,
            completed_at_ms: Option<u64> = None,
        }
        option {
            record_id: RecordId = Some(RecordId::from("rec-1")),
            error: String = None,
            screenshot: String = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
