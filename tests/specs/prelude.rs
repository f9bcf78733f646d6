// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared setup for the specs.

pub use dp_adapters::{FakeBrowserAdapter, FakeDecryptor};
pub use dp_core::test_support::{credential, profile};
pub use dp_core::{
    AutomationJob, AutomationJobBuilder, DeductionRecordBuilder, FakeClock, JobId, JobKind,
    JobStatus, RecordId, RecordStatus, UserId,
};
pub use dp_engine::{EngineConfig, EngineError, Orchestrator, OrchestratorDeps};
pub use dp_portal::{FakePage, PORTAL};
pub use dp_storage::{MemoryRepository, Repository};
pub use std::time::Duration;

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub type SpecOrchestrator =
    Orchestrator<FakeBrowserAdapter, MemoryRepository, FakeDecryptor, FakeClock>;

/// One engine over a snapshot-backed repository in a temp state dir.
pub struct World {
    pub engine: SpecOrchestrator,
    pub browser: FakeBrowserAdapter,
    pub repo: MemoryRepository,
    pub clock: FakeClock,
    state: TempDir,
}

impl World {
    pub fn new() -> Self {
        Self::with_browser(FakeBrowserAdapter::new())
    }

    pub fn with_browser(browser: FakeBrowserAdapter) -> Self {
        let state = TempDir::new().unwrap();
        let repo = MemoryRepository::open(snapshot_path(state.path())).unwrap();
        let clock = FakeClock::new();
        let engine = engine(browser.clone(), repo.clone(), clock.clone(), state.path());
        Self { engine, browser, repo, clock, state }
    }

    /// A fresh process over the same state dir: the repository is reloaded
    /// from its snapshot and nothing in memory carries over.
    pub fn restart(self) -> Self {
        let Self { state, .. } = self;
        let browser = FakeBrowserAdapter::new();
        let repo = MemoryRepository::open(snapshot_path(state.path())).unwrap();
        let clock = FakeClock::new();
        let engine = engine(browser.clone(), repo.clone(), clock.clone(), state.path());
        Self { engine, browser, repo, clock, state }
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.state.path().join("artifacts")
    }

    pub async fn user(&self, id: &str, auto_submit: bool) {
        self.repo.put_credential(&credential(id, "12345678909", "s3cret")).await.unwrap();
        self.repo.put_profile(&profile(id, auto_submit)).await.unwrap();
    }

    pub async fn record(&self, id: &str, user: &str) -> RecordId {
        let record = DeductionRecordBuilder::default()
            .id(id)
            .user_id(user)
            .provider_tax_id("12345678000190")
            .amount_cents(15_000)
            .build();
        self.repo.put_record(&record).await.unwrap();
        record.id
    }

    pub async fn deduction_job(&self, user: &str) -> AutomationJob {
        let record = self.record(&format!("rec-{}", user), user).await;
        self.engine
            .create_job(&UserId::from(user), JobKind::SubmitDeduction, Some(record))
            .await
            .unwrap()
    }

    pub async fn process(&self, id: &JobId) -> AutomationJob {
        self.engine.process(id).await.unwrap().join().await.unwrap();
        self.engine.get_job(id).await.unwrap()
    }

    pub async fn confirm(&self, id: &JobId) -> AutomationJob {
        self.engine.confirm(id).await.unwrap().join().await.unwrap();
        self.engine.get_job(id).await.unwrap()
    }

    pub async fn record_status(&self, job: &AutomationJob) -> RecordStatus {
        let id = job.record_id.as_ref().unwrap();
        self.repo.get_record(id).await.unwrap().unwrap().status
    }

    pub async fn steps(&self, id: &JobId) -> Vec<(u32, String)> {
        self.engine
            .get_screenshots(id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.step, s.slug))
            .collect()
    }
}

fn snapshot_path(state: &Path) -> PathBuf {
    state.join("repository.json")
}

fn engine(
    browser: FakeBrowserAdapter,
    repo: MemoryRepository,
    clock: FakeClock,
    state: &Path,
) -> SpecOrchestrator {
    let config = EngineConfig::new(state.join("artifacts"))
        .max_concurrency(2)
        .dependent_fields_delay(Duration::ZERO)
        .log_poll_interval(Duration::from_millis(10));
    Orchestrator::new(
        OrchestratorDeps { browser, repository: repo, decryptor: FakeDecryptor::new() },
        clock,
        config,
    )
}

pub fn messages(job: &AutomationJob) -> Vec<&str> {
    job.logs.iter().map(|l| l.message.as_str()).collect()
}
