// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job creation, cancellation, deletion and startup reconciliation.

use super::Orchestrator;
use crate::error::EngineError;
use dp_adapters::{BrowserAdapter, CredentialDecryptor};
use dp_core::{AutomationJob, Clock, JobId, JobKind, JobStatus, RecordId, RecordStatus, UserId};
use dp_storage::Repository;

/// Error stored on jobs found `RUNNING` at startup.
pub const INTERRUPTED_BY_RESTART: &str = "interrupted by restart";

impl<B, R, D, C> Orchestrator<B, R, D, C>
where
    B: BrowserAdapter,
    R: Repository,
    D: CredentialDecryptor,
    C: Clock,
{
    /// Create a `PENDING` job. A linked record must exist.
    pub async fn create_job(
        &self,
        user_id: &UserId,
        kind: JobKind,
        record_id: Option<RecordId>,
    ) -> Result<AutomationJob, EngineError> {
        if let Some(record_id) = &record_id {
            if self.inner.repo.get_record(record_id).await?.is_none() {
                return Err(EngineError::RecordNotFound(record_id.clone()));
            }
        }
        let mut job =
            AutomationJob::new(JobId::new(), user_id.clone(), kind, record_id, &self.inner.clock);
        self.inner.journal.seed(&job);
        self.log(&job.id, "job", &format!("{} job created", kind));
        job.logs = self.inner.journal.lines(&job.id).unwrap_or_default();
        self.inner.repo.create_job(&job).await?;
        tracing::info!(job_id = %job.id, user_id = %user_id, kind = %kind, "job created");
        Ok(job)
    }

    /// Cancel a job that has not finished.
    ///
    /// An in-flight run is not interrupted; it notices the cancellation at its
    /// next checkpoint and stops there.
    pub async fn cancel(&self, id: &JobId) -> Result<AutomationJob, EngineError> {
        let (job, ()) = self
            .mutate(id, |job, now| {
                if job.is_terminal() {
                    return Err(EngineError::conflict(
                        &job.id,
                        job.status,
                        "job has already finished",
                    ));
                }
                job.transition(JobStatus::Cancelled, now)?;
                Ok(())
            })
            .await?;
        self.log(id, "job", "job cancelled");
        self.persist_logs(id).await;
        self.retire(id);
        self.set_record_status(&job, RecordStatus::Pending).await;
        tracing::info!(job_id = %id, "job cancelled");
        Ok(job)
    }

    /// Delete a finished job. Its files stay on disk.
    ///
    /// When no other job references the linked record, the record goes back
    /// to pending.
    pub async fn delete(&self, id: &JobId) -> Result<(), EngineError> {
        let job = {
            let _writes = self.inner.writes.lock().await;
            let job = self.load(id).await?;
            if !job.is_terminal() {
                return Err(EngineError::conflict(id, job.status, "cancel the job first"));
            }
            self.inner.repo.delete_job(id).await?;
            job
        };
        self.inner.journal.remove(id);
        self.inner.artifacts.clear(id);

        if let Some(record_id) = &job.record_id {
            if self.inner.repo.jobs_for_record(record_id).await?.is_empty() {
                self.set_record_status(&job, RecordStatus::Pending).await;
            }
        }
        tracing::info!(job_id = %id, "job deleted");
        Ok(())
    }

    /// Fail jobs left `RUNNING` by a previous process. Returns how many.
    pub async fn reconcile(&self) -> Result<usize, EngineError> {
        let mut orphans = 0;
        for job in self.inner.repo.list_jobs().await? {
            if job.status != JobStatus::Running {
                continue;
            }
            self.inner.journal.seed(&job);
            self.log(&job.id, "run", &format!("job failed: {}", INTERRUPTED_BY_RESTART));
            let (job, ()) = self
                .mutate(&job.id, |job, now| {
                    job.fail(INTERRUPTED_BY_RESTART, false, now)?;
                    Ok(())
                })
                .await?;
            self.set_record_status(&job, RecordStatus::Pending).await;
            self.retire(&job.id);
            tracing::warn!(job_id = %job.id, "orphaned run marked failed");
            orphans += 1;
        }
        Ok(orphans)
    }
}
