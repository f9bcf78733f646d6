// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job orchestrator.
//!
//! Owns the execution queue, the artifact store and the journal, and drives
//! each job through the portal protocol:
//!
//! ```text
//! process ──▶ queue slot ──▶ user lease ──▶ RUNNING ──▶ credential, record, secret
//!         ──▶ session + recorded page ──▶ authenticate ──▶ reach application
//!         ──▶ fill ──▶ submit (auto) | WAITING_CONFIRMATION (manual)
//!         ──▶ release session ──▶ finalize video
//! ```
//!
//! Every status change is written to the repository together with the
//! current log lines, then mirrored into the journal.

mod lifecycle;
mod queries;
mod recorder;
mod run;

pub use lifecycle::INTERRUPTED_BY_RESTART;

use crate::artifacts::ArtifactStore;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::job_logger::JobLogger;
use crate::journal::JobJournal;
use crate::queue::ExecutionQueue;
use dp_adapters::{BrowserAdapter, CredentialDecryptor};
use dp_core::{AutomationJob, Clock, JobId, LogLine, RecordStatus, UserId};
use dp_portal::PortalProtocol;
use dp_storage::Repository;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Collaborators the orchestrator is built from.
pub struct OrchestratorDeps<B, R, D> {
    pub browser: B,
    pub repository: R,
    pub decryptor: D,
}

/// Writes one activity line to tracing, the job log file and the journal.
#[derive(Clone)]
pub(crate) struct Activity {
    journal: Arc<JobJournal>,
    logger: Arc<JobLogger>,
}

impl Activity {
    pub(crate) fn line(&self, job_id: &JobId, at_ms: u64, stage: &str, message: &str) {
        tracing::info!(job_id = %job_id, stage, line = message, "job activity");
        self.logger.append(job_id.as_str(), at_ms, stage, message);
        self.journal.append(job_id, LogLine::new(at_ms, message));
    }
}

/// Marks a job as queued until the guard drops.
struct RunClaim {
    id: JobId,
    scheduled: Arc<Mutex<HashSet<JobId>>>,
}

impl Drop for RunClaim {
    fn drop(&mut self) {
        self.scheduled.lock().remove(&self.id);
    }
}

struct Inner<B: BrowserAdapter, R, D, C> {
    queue: ExecutionQueue<B>,
    repo: R,
    decryptor: D,
    clock: C,
    config: EngineConfig,
    protocol: PortalProtocol,
    artifacts: Arc<ArtifactStore>,
    journal: Arc<JobJournal>,
    activity: Activity,
    /// Serializes read-modify-write of job records.
    writes: tokio::sync::Mutex<()>,
    scheduled: Arc<Mutex<HashSet<JobId>>>,
    leases: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

/// Runs automation jobs against the portal.
pub struct Orchestrator<B, R, D, C>
where
    B: BrowserAdapter,
    R: Repository,
    D: CredentialDecryptor,
    C: Clock,
{
    inner: Arc<Inner<B, R, D, C>>,
}

impl<B, R, D, C> Clone for Orchestrator<B, R, D, C>
where
    B: BrowserAdapter,
    R: Repository,
    D: CredentialDecryptor,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<B, R, D, C> Orchestrator<B, R, D, C>
where
    B: BrowserAdapter,
    R: Repository,
    D: CredentialDecryptor,
    C: Clock,
{
    /// Build the orchestrator. Spawns the queue dispatcher, so this must run
    /// inside a tokio runtime.
    pub fn new(deps: OrchestratorDeps<B, R, D>, clock: C, config: EngineConfig) -> Self {
        let queue =
            ExecutionQueue::new(deps.browser, config.session.clone(), config.max_concurrency);
        let journal = Arc::new(JobJournal::with_retention(config.retained_finished_jobs));
        let logger = Arc::new(JobLogger::new(config.artifacts_dir.clone()));
        let protocol =
            PortalProtocol::default().with_dependent_fields_delay(config.dependent_fields_delay);
        Self {
            inner: Arc::new(Inner {
                queue,
                repo: deps.repository,
                decryptor: deps.decryptor,
                clock,
                protocol,
                artifacts: Arc::new(ArtifactStore::new(config.artifacts_dir.clone())),
                activity: Activity { journal: Arc::clone(&journal), logger },
                journal,
                config,
                writes: tokio::sync::Mutex::new(()),
                scheduled: Arc::new(Mutex::new(HashSet::new())),
                leases: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn queue(&self) -> &ExecutionQueue<B> {
        &self.inner.queue
    }

    /// Stop the queue and the browser. Safe to call twice.
    pub async fn shutdown(&self) {
        self.inner.queue.shutdown().await;
    }

    // ── Helpers shared by the operation modules ───────────────────────

    async fn load(&self, id: &JobId) -> Result<AutomationJob, EngineError> {
        self.inner.repo.get_job(id).await?.ok_or_else(|| EngineError::NotFound(id.clone()))
    }

    /// Apply `f` to the stored job and persist it with the journal's log
    /// lines. Nothing is written when `f` fails.
    async fn mutate<T>(
        &self,
        id: &JobId,
        f: impl FnOnce(&mut AutomationJob, u64) -> Result<T, EngineError>,
    ) -> Result<(AutomationJob, T), EngineError> {
        let _writes = self.inner.writes.lock().await;
        let mut job = self.load(id).await?;
        let fresh = !self.inner.journal.contains(id);
        self.inner.journal.seed(&job);
        let out = match f(&mut job, self.inner.clock.epoch_ms()) {
            Ok(out) => out,
            Err(e) => {
                if fresh {
                    self.inner.journal.remove(id);
                }
                return Err(e);
            }
        };
        if let Some(lines) = self.inner.journal.lines(id) {
            job.logs = lines;
        }
        self.inner.repo.update_job(&job).await?;
        self.inner.journal.set_status(id, job.status);
        Ok((job, out))
    }

    /// Write log lines added since the last status change.
    async fn persist_logs(&self, id: &JobId) {
        if let Err(e) = self.mutate(id, |_, _| Ok(())).await {
            tracing::warn!(job_id = %id, error = %e, "failed to persist job log");
        }
    }

    /// The job's final write is persisted; let the journal evict it.
    fn retire(&self, id: &JobId) {
        self.inner.journal.retire(id);
    }

    fn log(&self, id: &JobId, stage: &str, message: &str) {
        self.inner.activity.line(id, self.inner.clock.epoch_ms(), stage, message);
    }

    /// Record status follows the job; failures here never fail the job.
    async fn set_record_status(&self, job: &AutomationJob, status: RecordStatus) {
        let Some(record_id) = &job.record_id else {
            return;
        };
        if let Err(e) = self.inner.repo.set_record_status(record_id, status).await {
            tracing::warn!(
                job_id = %job.id,
                record_id = %record_id,
                error = %e,
                "failed to update deduction record status"
            );
        }
    }

    fn claim(&self, job: &AutomationJob) -> Result<RunClaim, EngineError> {
        if !self.inner.scheduled.lock().insert(job.id.clone()) {
            return Err(EngineError::conflict(&job.id, job.status, "a run is already queued"));
        }
        Ok(RunClaim { id: job.id.clone(), scheduled: Arc::clone(&self.inner.scheduled) })
    }

    fn lease(&self, user: &UserId) -> Arc<tokio::sync::Mutex<()>> {
        let mut leases = self.inner.leases.lock();
        leases.retain(|_, lease| Arc::strong_count(lease) > 1);
        Arc::clone(leases.entry(user.clone()).or_default())
    }
}

#[cfg(test)]
#[path = "../orchestrator_tests/mod.rs"]
mod tests;
