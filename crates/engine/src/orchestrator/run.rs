// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestration runs: `process` and `confirm`.

use super::recorder::JobRecorder;
use super::{Orchestrator, RunClaim};
use crate::error::EngineError;
use crate::queue::TaskHandle;
use dp_adapters::{BrowserAdapter, BrowserSession, CredentialDecryptor};
use dp_core::{
    AutomationJob, Clock, DeductionRecord, JobId, JobKind, JobStatus, RecordStatus,
    ScreenshotArtifact, Secret,
};
use dp_portal::{PortalPage, SubmitOutcome};
use dp_storage::Repository;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    /// First run (or retry): ends submitted or waiting for confirmation.
    Process,
    /// Human confirmed the preview: refill and submit.
    Confirm,
}

/// Everything a run needs before it touches the browser.
struct Prepared {
    identity: String,
    secret: Secret,
    record: Option<DeductionRecord>,
    auto_submit: bool,
}

/// How the protocol part of a run ended.
enum Finish {
    LoginVerified,
    AwaitingConfirmation(ScreenshotArtifact),
    Submitted(SubmitOutcome),
    Stopped,
}

impl<B, R, D, C> Orchestrator<B, R, D, C>
where
    B: BrowserAdapter,
    R: Repository,
    D: CredentialDecryptor,
    C: Clock,
{
    /// Queue a run for a `PENDING` job, or retry a `FAILED` one.
    ///
    /// Returns once the run is queued. The handle resolves when the run ends;
    /// callers that only fire and forget can drop it.
    pub async fn process(&self, id: &JobId) -> Result<TaskHandle<()>, EngineError> {
        let job = self.load(id).await?;
        if !matches!(job.status, JobStatus::Pending | JobStatus::Failed) {
            return Err(EngineError::conflict(
                id,
                job.status,
                "only pending or failed jobs can be processed",
            ));
        }
        let claim = self.claim(&job)?;
        if job.status == JobStatus::Failed {
            self.mutate(id, |job, now| {
                job.reset_for_retry(now)?;
                Ok(())
            })
            .await?;
            self.log(id, "run", "retry requested");
        }
        self.log(id, "run", "queued");
        Ok(self.enqueue(claim, RunMode::Process))
    }

    /// Submit a job that waits for confirmation.
    ///
    /// Any other status is a [`EngineError::Conflict`] and changes nothing.
    pub async fn confirm(&self, id: &JobId) -> Result<TaskHandle<()>, EngineError> {
        let job = self.load(id).await?;
        if job.status != JobStatus::WaitingConfirmation {
            return Err(EngineError::conflict(
                id,
                job.status,
                "only jobs waiting for confirmation can be confirmed",
            ));
        }
        let claim = self.claim(&job)?;
        self.inner.journal.seed(&job);
        self.log(id, "run", "confirmation queued");
        Ok(self.enqueue(claim, RunMode::Confirm))
    }

    fn enqueue(&self, claim: RunClaim, mode: RunMode) -> TaskHandle<()> {
        let this = self.clone();
        self.inner.queue.submit(move || async move {
            let id = claim.id.clone();
            this.run(&id, mode).await;
            drop(claim);
        })
    }

    async fn run(&self, id: &JobId, mode: RunMode) {
        let user_id = match self.inner.repo.get_job(id).await {
            Ok(Some(job)) => job.user_id,
            Ok(None) => {
                tracing::warn!(job_id = %id, "job deleted before its run started");
                return;
            }
            Err(e) => {
                tracing::error!(job_id = %id, error = %e, "failed to load job for run");
                return;
            }
        };
        let span = tracing::info_span!("job.run", job_id = %id, user_id = %user_id, mode = ?mode);
        async {
            if let Err(e) = self.run_leased(id, mode).await {
                tracing::error!(error = %e, "job run aborted");
            }
        }
        .instrument(span)
        .await
    }

    /// Take the user's lease, then run. Jobs of one user never overlap.
    async fn run_leased(&self, id: &JobId, mode: RunMode) -> Result<(), EngineError> {
        let job = self.load(id).await?;
        let lease = self.lease(&job.user_id);
        let _lease = match Arc::clone(&lease).try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                self.log(id, "run", "waiting for another job of this user");
                lease.lock_owned().await
            }
        };

        let expected = match mode {
            RunMode::Process => JobStatus::Pending,
            RunMode::Confirm => JobStatus::WaitingConfirmation,
        };
        let (job, started) = self
            .mutate(id, |job, now| {
                if job.status != expected {
                    return Ok(None);
                }
                match mode {
                    RunMode::Process => Ok(Some(job.begin_attempt(now)?)),
                    RunMode::Confirm => Ok(Some(job.attempts)),
                }
            })
            .await?;
        let Some(attempt) = started else {
            self.log(id, "run", &format!("run skipped, job is {}", job.status));
            self.persist_logs(id).await;
            self.retire(id);
            return Ok(());
        };
        match mode {
            RunMode::Process => {
                self.log(id, "run", &format!("attempt {} started", attempt));
                self.set_record_status(&job, RecordStatus::Processing).await;
            }
            RunMode::Confirm => self.log(id, "run", "confirmation started"),
        }

        let outcome = match self.prepare(&job).await {
            Ok(prepared) => self.drive_in_session(&job, &prepared, mode).await,
            Err(e) => Err(e),
        };
        let finished = self.finish(&job, outcome).await;
        self.inner.queue.release_session(&job.user_id).await;
        self.finalize_video(id).await;
        self.persist_logs(id).await;
        self.retire(id);
        finished
    }

    /// Credential, record, preference and decrypted secret.
    async fn prepare(&self, job: &AutomationJob) -> Result<Prepared, EngineError> {
        let repo = &self.inner.repo;
        let credential =
            repo.get_credential(&job.user_id).await?.ok_or(EngineError::MissingCredentials)?;
        let record = match job.kind {
            JobKind::VerifyLogin => None,
            JobKind::SubmitDeduction => {
                let record_id = job.record_id.as_ref().ok_or(EngineError::MissingRecord)?;
                let record = repo
                    .get_record(record_id)
                    .await?
                    .ok_or_else(|| EngineError::RecordNotFound(record_id.clone()))?;
                Some(record)
            }
        };
        let auto_submit =
            repo.get_profile(&job.user_id).await?.map(|p| p.auto_submit).unwrap_or(false);

        let decryptor = self.inner.decryptor.clone();
        let encrypted = credential.secret;
        let secret = tokio::task::spawn_blocking(move || decryptor.decrypt(&encrypted))
            .await
            .map_err(|e| EngineError::Internal(e.to_string()))??;
        self.log(&job.id, "run", "credentials decrypted");

        Ok(Prepared { identity: credential.identity, secret, record, auto_submit })
    }

    /// Acquire the session, open a recorded page and run the protocol on it.
    /// The session stays cached for the caller to release.
    async fn drive_in_session(
        &self,
        job: &AutomationJob,
        prepared: &Prepared,
        mode: RunMode,
    ) -> Result<Finish, EngineError> {
        let session = self.inner.queue.acquire_session(&job.user_id).await?;
        if self.should_stop(&job.id) {
            return Ok(Finish::Stopped);
        }
        let video_dir = self.inner.artifacts.video_dir(&job.id)?;
        let page = session.open_page(Some(video_dir.as_path())).await?;

        let result = AssertUnwindSafe(self.drive(&page, job, prepared, mode))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(EngineError::Internal("protocol step panicked".to_string())));

        if let Err(e) = page.close().await {
            tracing::warn!(job_id = %job.id, error = %e, "failed to close page");
        }
        result
    }

    async fn drive<P: PortalPage>(
        &self,
        page: &P,
        job: &AutomationJob,
        prepared: &Prepared,
        mode: RunMode,
    ) -> Result<Finish, EngineError> {
        let recorder = JobRecorder::begin(
            job.id.clone(),
            Arc::clone(&self.inner.artifacts),
            self.inner.activity.clone(),
            self.inner.repo.clone(),
            self.inner.clock.clone(),
        )
        .await?;
        let protocol = &self.inner.protocol;

        protocol.authenticate(page, &recorder, &prepared.identity, &prepared.secret).await?;
        if self.should_stop(&job.id) {
            return Ok(Finish::Stopped);
        }
        protocol.reach_application(page, &recorder).await?;

        let record = match (job.kind, &prepared.record) {
            (JobKind::VerifyLogin, _) => return Ok(Finish::LoginVerified),
            (JobKind::SubmitDeduction, Some(record)) => record,
            (JobKind::SubmitDeduction, None) => return Err(EngineError::MissingRecord),
        };
        let filled = protocol.fill_deduction(page, &recorder, record).await?;
        if self.should_stop(&job.id) {
            return Ok(Finish::Stopped);
        }

        if mode == RunMode::Process && !prepared.auto_submit {
            return Ok(Finish::AwaitingConfirmation(filled.screenshot));
        }
        let outcome = protocol.submit(page, &recorder).await?;
        Ok(Finish::Submitted(outcome))
    }

    /// Checkpoint between protocol stages. A run keeps going only while its
    /// job is still active; a cancelled or deleted job stops it.
    fn should_stop(&self, id: &JobId) -> bool {
        !matches!(
            self.inner.journal.status(id),
            Some(JobStatus::Running | JobStatus::WaitingConfirmation)
        )
    }

    /// Apply the run's outcome to the job and its record. A job cancelled
    /// while the run was in flight keeps its `CANCELLED` status.
    async fn finish(
        &self,
        job: &AutomationJob,
        outcome: Result<Finish, EngineError>,
    ) -> Result<(), EngineError> {
        let id = &job.id;
        if self.should_stop(id) || matches!(outcome, Ok(Finish::Stopped)) {
            self.log(id, "run", "run stopped after cancellation");
            return Ok(());
        }

        let (next, record_status) = match &outcome {
            Ok(Finish::LoginVerified) => {
                self.log(id, "run", "login verified");
                (JobStatus::Completed, None)
            }
            Ok(Finish::AwaitingConfirmation(shot)) => {
                self.log(id, "run", "form filled, waiting for confirmation");
                tracing::debug!(job_id = %id, screenshot = %shot.filename(), "preview ready");
                (JobStatus::WaitingConfirmation, Some(RecordStatus::PreviewReady))
            }
            Ok(Finish::Submitted(SubmitOutcome::Confirmed(message))) => {
                self.log(id, "run", &format!("submitted: {}", message));
                (JobStatus::Completed, Some(RecordStatus::Submitted))
            }
            Ok(Finish::Submitted(SubmitOutcome::Unconfirmed)) => {
                self.log(id, "run", "submitted without explicit confirmation");
                (JobStatus::Completed, Some(RecordStatus::Submitted))
            }
            Ok(Finish::Stopped) => return Ok(()),
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, challenge = e.is_challenge(), "job failed");
                self.log(id, "run", &format!("job failed: {}", e));
                (JobStatus::Failed, Some(RecordStatus::Pending))
            }
        };

        let (updated, moved) = self
            .mutate(id, |job, now| {
                if job.status == JobStatus::Cancelled {
                    return Ok(false);
                }
                match &outcome {
                    Err(e) => job.fail(e.to_string(), e.is_challenge(), now)?,
                    Ok(Finish::AwaitingConfirmation(shot)) => {
                        job.transition(next, now)?;
                        job.screenshot = Some(shot.filename());
                    }
                    Ok(_) => job.transition(next, now)?,
                }
                Ok(true)
            })
            .await?;
        if !moved {
            self.log(id, "run", "run stopped after cancellation");
            return Ok(());
        }
        if let Some(status) = record_status {
            self.set_record_status(&updated, status).await;
        }
        Ok(())
    }

    /// Rename the run's recording. Failures are logged only.
    async fn finalize_video(&self, id: &JobId) {
        match self.inner.artifacts.finalize_video(id).await {
            Ok(Some(filename)) => self.log(id, "video", &format!("recording saved as {}", filename)),
            Ok(None) => tracing::debug!(job_id = %id, "no recording to finalize"),
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, "failed to finalize video");
                self.log(id, "video", "recording could not be finalized");
            }
        }
    }
}
