// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step recorder handed to the portal protocol for one run.

use super::Activity;
use crate::artifacts::ArtifactStore;
use crate::error::EngineError;
use async_trait::async_trait;
use dp_core::{Clock, JobId, ScreenshotArtifact};
use dp_portal::{RecordError, StepRecorder};
use dp_storage::Repository;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub(super) struct JobRecorder<R, C> {
    job_id: JobId,
    artifacts: Arc<ArtifactStore>,
    activity: Activity,
    repo: R,
    clock: C,
    next_step: AtomicU32,
}

impl<R: Repository, C: Clock> JobRecorder<R, C> {
    /// Continue the job's step numbering after whatever earlier runs saved.
    pub(super) async fn begin(
        job_id: JobId,
        artifacts: Arc<ArtifactStore>,
        activity: Activity,
        repo: R,
        clock: C,
    ) -> Result<Self, EngineError> {
        if artifacts.indexed(&job_id).is_none() {
            artifacts.prime(&job_id, repo.screenshots(&job_id).await?);
        }
        let last = artifacts.last_step(&job_id).await?;
        Ok(Self { job_id, artifacts, activity, repo, clock, next_step: AtomicU32::new(last + 1) })
    }
}

#[async_trait]
impl<R: Repository, C: Clock> StepRecorder for JobRecorder<R, C> {
    async fn save_screenshot(
        &self,
        slug: &str,
        label: &str,
        png: Vec<u8>,
    ) -> Result<ScreenshotArtifact, RecordError> {
        let step = self.next_step.fetch_add(1, Ordering::SeqCst);
        let artifact = self
            .artifacts
            .save_screenshot(&self.job_id, step, slug, label, &png, self.clock.epoch_ms())
            .await
            .map_err(|e| RecordError(e.to_string()))?;
        self.repo
            .record_screenshot(&self.job_id, &artifact)
            .await
            .map_err(|e| RecordError(e.to_string()))?;
        tracing::debug!(job_id = %self.job_id, step, slug, "screenshot saved");
        Ok(artifact)
    }

    fn log(&self, message: &str) {
        self.activity.line(&self.job_id, self.clock.epoch_ms(), "portal", message);
    }
}
