// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory repository with optional snapshot file.

use crate::repository::{Repository, RepositoryError};
use crate::snapshot;
use async_trait::async_trait;
use dp_core::{
    AutomationJob, DeductionRecord, JobId, RecordId, RecordStatus, ScreenshotArtifact,
    StoredCredential, UserId, UserProfile,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything the repository holds, keyed by id string.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(crate) struct RepositoryState {
    #[serde(default)]
    jobs: BTreeMap<String, AutomationJob>,
    #[serde(default)]
    screenshots: BTreeMap<String, Vec<ScreenshotArtifact>>,
    #[serde(default)]
    profiles: BTreeMap<String, UserProfile>,
    #[serde(default)]
    credentials: BTreeMap<String, StoredCredential>,
    #[serde(default)]
    records: BTreeMap<String, DeductionRecord>,
}

struct Inner {
    state: RepositoryState,
    snapshot_path: Option<PathBuf>,
}

impl Inner {
    /// Persist after a change. The lock is held so snapshots land in order.
    fn commit(&self) -> Result<(), RepositoryError> {
        if let Some(path) = &self.snapshot_path {
            snapshot::save(path, &self.state)?;
        }
        Ok(())
    }
}

/// Repository backed by maps in memory.
#[derive(Clone)]
pub struct MemoryRepository {
    inner: Arc<Mutex<Inner>>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    /// Volatile repository.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: RepositoryState::default(),
                snapshot_path: None,
            })),
        }
    }

    /// Repository persisted to `path` after every change.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();
        let state = snapshot::load(&path)?;
        tracing::debug!(path = %path.display(), jobs = state.jobs.len(), "repository loaded");
        Ok(Self { inner: Arc::new(Mutex::new(Inner { state, snapshot_path: Some(path) })) })
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_job(&self, job: &AutomationJob) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock();
        let key = job.id.to_string();
        if inner.state.jobs.contains_key(&key) {
            return Err(RepositoryError::AlreadyExists { kind: "job", id: key });
        }
        inner.state.jobs.insert(key, job.clone());
        inner.commit()
    }

    async fn get_job(&self, id: &JobId) -> Result<Option<AutomationJob>, RepositoryError> {
        Ok(self.inner.lock().state.jobs.get(id.as_str()).cloned())
    }

    async fn update_job(&self, job: &AutomationJob) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock();
        match inner.state.jobs.get_mut(job.id.as_str()) {
            Some(stored) => *stored = job.clone(),
            None => return Err(RepositoryError::job_not_found(&job.id)),
        }
        inner.commit()
    }

    async fn delete_job(&self, id: &JobId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.lock();
        let removed = inner.state.jobs.remove(id.as_str()).is_some();
        inner.state.screenshots.remove(id.as_str());
        if removed {
            inner.commit()?;
        }
        Ok(removed)
    }

    async fn list_jobs(&self) -> Result<Vec<AutomationJob>, RepositoryError> {
        let mut jobs: Vec<_> = self.inner.lock().state.jobs.values().cloned().collect();
        jobs.sort_by(|a, b| a.created_at_ms.cmp(&b.created_at_ms).then_with(|| a.id.cmp(&b.id)));
        Ok(jobs)
    }

    async fn jobs_for_record(&self, id: &RecordId) -> Result<Vec<AutomationJob>, RepositoryError> {
        Ok(self
            .inner
            .lock()
            .state
            .jobs
            .values()
            .filter(|job| job.record_id.as_ref() == Some(id))
            .cloned()
            .collect())
    }

    async fn record_screenshot(
        &self,
        job: &JobId,
        artifact: &ScreenshotArtifact,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock();
        if !inner.state.jobs.contains_key(job.as_str()) {
            return Err(RepositoryError::job_not_found(job));
        }
        let shots = inner.state.screenshots.entry(job.to_string()).or_default();
        shots.retain(|s| s.step != artifact.step);
        shots.push(artifact.clone());
        shots.sort_by_key(|s| s.step);
        inner.commit()
    }

    async fn screenshots(&self, job: &JobId) -> Result<Vec<ScreenshotArtifact>, RepositoryError> {
        Ok(self.inner.lock().state.screenshots.get(job.as_str()).cloned().unwrap_or_default())
    }

    async fn get_profile(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.inner.lock().state.profiles.get(id.as_str()).cloned())
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock();
        inner.state.profiles.insert(profile.id.to_string(), profile.clone());
        inner.commit()
    }

    async fn set_auto_submit(&self, id: &UserId, enabled: bool) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock();
        inner
            .state
            .profiles
            .entry(id.to_string())
            .or_insert_with(|| UserProfile { id: id.clone(), auto_submit: false })
            .auto_submit = enabled;
        inner.commit()
    }

    async fn get_credential(
        &self,
        id: &UserId,
    ) -> Result<Option<StoredCredential>, RepositoryError> {
        Ok(self.inner.lock().state.credentials.get(id.as_str()).cloned())
    }

    async fn put_credential(&self, credential: &StoredCredential) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock();
        inner.state.credentials.insert(credential.user_id.to_string(), credential.clone());
        inner.commit()
    }

    async fn get_record(&self, id: &RecordId) -> Result<Option<DeductionRecord>, RepositoryError> {
        Ok(self.inner.lock().state.records.get(id.as_str()).cloned())
    }

    async fn put_record(&self, record: &DeductionRecord) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock();
        inner.state.records.insert(record.id.to_string(), record.clone());
        inner.commit()
    }

    async fn set_record_status(
        &self,
        id: &RecordId,
        status: RecordStatus,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock();
        match inner.state.records.get_mut(id.as_str()) {
            Some(record) => record.status = status,
            None => return Err(RepositoryError::record_not_found(id)),
        }
        inner.commit()
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
