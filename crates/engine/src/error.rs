// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error types

use crate::artifacts::ArtifactError;
use crate::queue::QueueError;
use dp_adapters::{BrowserError, DecryptError};
use dp_core::{JobId, JobStatus, RecordId, TransitionError};
use dp_portal::ProtocolError;
use dp_storage::RepositoryError;
use thiserror::Error;

/// Errors from orchestrator operations and job runs.
///
/// The `Display` text of run-time variants becomes the job's stored error
/// message, so it is written for the person reading the job status.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job {id} is {status}: {hint}")]
    Conflict { id: JobId, status: JobStatus, hint: String },
    #[error("no stored portal credentials for this user")]
    MissingCredentials,
    #[error("no deduction record linked to this job")]
    MissingRecord,
    #[error("deduction record {0} not found")]
    RecordNotFound(RecordId),
    #[error("could not decrypt stored credentials: {0}")]
    Decrypt(#[from] DecryptError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub(crate) fn conflict(id: &JobId, status: JobStatus, hint: impl Into<String>) -> Self {
        EngineError::Conflict { id: id.clone(), status, hint: hint.into() }
    }

    /// Whether the failure was an anti-automation challenge on the portal.
    pub fn is_challenge(&self) -> bool {
        matches!(self, EngineError::Protocol(e) if e.is_challenge())
    }
}
