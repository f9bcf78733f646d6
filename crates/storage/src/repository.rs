// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence collaborator.

use async_trait::async_trait;
use dp_core::{
    AutomationJob, DeductionRecord, JobId, RecordId, RecordStatus, ScreenshotArtifact,
    StoredCredential, UserId, UserProfile,
};
use thiserror::Error;

/// Errors from repository operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RepositoryError {
    pub fn job_not_found(id: &JobId) -> Self {
        RepositoryError::NotFound { kind: "job", id: id.to_string() }
    }

    pub fn record_not_found(id: &RecordId) -> Self {
        RepositoryError::NotFound { kind: "record", id: id.to_string() }
    }
}

/// Durable store for jobs, users and deduction records.
///
/// Reads return `Ok(None)` for missing rows; writes to missing rows are
/// [`RepositoryError::NotFound`].
#[async_trait]
pub trait Repository: Clone + Send + Sync + 'static {
    // ── Jobs ──────────────────────────────────────────────────────────
    async fn create_job(&self, job: &AutomationJob) -> Result<(), RepositoryError>;
    async fn get_job(&self, id: &JobId) -> Result<Option<AutomationJob>, RepositoryError>;
    async fn update_job(&self, job: &AutomationJob) -> Result<(), RepositoryError>;
    /// Returns whether a job was removed.
    async fn delete_job(&self, id: &JobId) -> Result<bool, RepositoryError>;
    /// All jobs, oldest first.
    async fn list_jobs(&self) -> Result<Vec<AutomationJob>, RepositoryError>;
    async fn jobs_for_record(&self, id: &RecordId) -> Result<Vec<AutomationJob>, RepositoryError>;

    // ── Screenshot metadata ───────────────────────────────────────────
    async fn record_screenshot(
        &self,
        job: &JobId,
        artifact: &ScreenshotArtifact,
    ) -> Result<(), RepositoryError>;
    /// Screenshots for a job, in step order.
    async fn screenshots(&self, job: &JobId) -> Result<Vec<ScreenshotArtifact>, RepositoryError>;

    // ── Users ─────────────────────────────────────────────────────────
    async fn get_profile(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError>;
    async fn put_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError>;
    /// Creates the profile when missing.
    async fn set_auto_submit(&self, id: &UserId, enabled: bool) -> Result<(), RepositoryError>;
    async fn get_credential(&self, id: &UserId)
        -> Result<Option<StoredCredential>, RepositoryError>;
    async fn put_credential(&self, credential: &StoredCredential) -> Result<(), RepositoryError>;

    // ── Deduction records ─────────────────────────────────────────────
    async fn get_record(&self, id: &RecordId) -> Result<Option<DeductionRecord>, RepositoryError>;
    async fn put_record(&self, record: &DeductionRecord) -> Result<(), RepositoryError>;
    async fn set_record_status(
        &self,
        id: &RecordId,
        status: RecordStatus,
    ) -> Result<(), RepositoryError>;
}
