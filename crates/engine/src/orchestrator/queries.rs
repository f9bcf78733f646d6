// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only accessors. The journal and the artifact index answer first;
//! the repository and the disk answer for jobs this process has not seen.

use super::Orchestrator;
use crate::artifacts::{ArtifactError, VideoFile};
use crate::error::EngineError;
use crate::stream::{self, StreamEvent};
use dp_adapters::{BrowserAdapter, CredentialDecryptor};
use dp_core::{AutomationJob, Clock, JobId, JobStatus, LogLine, ScreenshotArtifact};
use dp_storage::Repository;
use std::sync::Arc;
use tokio::sync::mpsc;

impl<B, R, D, C> Orchestrator<B, R, D, C>
where
    B: BrowserAdapter,
    R: Repository,
    D: CredentialDecryptor,
    C: Clock,
{
    /// The durable job record.
    pub async fn get_job(&self, id: &JobId) -> Result<AutomationJob, EngineError> {
        self.load(id).await
    }

    /// All jobs, oldest first.
    pub async fn list_jobs(&self) -> Result<Vec<AutomationJob>, EngineError> {
        Ok(self.inner.repo.list_jobs().await?)
    }

    pub async fn get_status(&self, id: &JobId) -> Result<JobStatus, EngineError> {
        if let Some(status) = self.inner.journal.status(id) {
            return Ok(status);
        }
        Ok(self.load(id).await?.status)
    }

    pub async fn get_logs(&self, id: &JobId) -> Result<Vec<LogLine>, EngineError> {
        if let Some(lines) = self.inner.journal.lines(id) {
            return Ok(lines);
        }
        Ok(self.load(id).await?.logs)
    }

    /// Screenshot metadata in step order.
    pub async fn get_screenshots(
        &self,
        id: &JobId,
    ) -> Result<Vec<ScreenshotArtifact>, EngineError> {
        if let Some(shots) = self.inner.artifacts.indexed(id).filter(|s| !s.is_empty()) {
            return Ok(shots);
        }
        let stored = self.inner.repo.screenshots(id).await?;
        if !stored.is_empty() {
            return Ok(stored);
        }
        match self.inner.artifacts.scan_screenshots(id).await {
            Ok(shots) => Ok(shots),
            Err(ArtifactError::InvalidJobId(_)) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_video_filenames(&self, id: &JobId) -> Result<Vec<String>, EngineError> {
        Ok(self.inner.artifacts.video_filenames(id).await?)
    }

    /// Screenshot bytes, or `None` for unknown or invalid names.
    pub async fn read_screenshot_file(
        &self,
        id: &JobId,
        filename: &str,
    ) -> Result<Option<Vec<u8>>, EngineError> {
        Ok(self.inner.artifacts.read_screenshot(id, filename).await?)
    }

    pub async fn read_video_file(&self, id: &JobId) -> Result<Option<VideoFile>, EngineError> {
        Ok(self.inner.artifacts.read_video(id).await?)
    }

    /// Follow a job's log until it finishes. Finished jobs that are no
    /// longer in memory are replayed from the repository.
    pub async fn follow(
        &self,
        id: &JobId,
    ) -> Result<mpsc::UnboundedReceiver<StreamEvent>, EngineError> {
        if !self.inner.journal.contains(id) {
            let job = self.load(id).await?;
            if job.is_terminal() {
                return Ok(stream::replay(job.logs, job.status));
            }
            self.inner.journal.seed(&job);
        }
        Ok(stream::follow(
            Arc::clone(&self.inner.journal),
            id.clone(),
            self.inner.config.log_poll_interval,
        ))
    }
}
