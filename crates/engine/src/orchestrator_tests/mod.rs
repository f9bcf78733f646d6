// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dp_adapters::{FakeBrowserAdapter, FakeDecryptor};
use dp_core::test_support::{credential, profile};
use dp_core::{DeductionRecordBuilder, FakeClock, JobKind, JobStatus, RecordId};
use dp_storage::MemoryRepository;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

mod checkpoints;
mod lifecycle;
mod queries;
mod run;

type TestOrchestrator =
    Orchestrator<FakeBrowserAdapter, MemoryRepository, FakeDecryptor, FakeClock>;

struct Harness {
    orchestrator: TestOrchestrator,
    browser: FakeBrowserAdapter,
    repo: MemoryRepository,
    decryptor: FakeDecryptor,
    _dir: TempDir,
    artifacts_dir: PathBuf,
}

impl Harness {
    fn new() -> Self {
        Self::with_browser(FakeBrowserAdapter::new())
    }

    fn with_browser(browser: FakeBrowserAdapter) -> Self {
        let dir = TempDir::new().unwrap();
        let artifacts_dir = dir.path().join("artifacts");
        let repo = MemoryRepository::new();
        let decryptor = FakeDecryptor::new();
        let orchestrator = build(browser.clone(), repo.clone(), decryptor.clone(), &artifacts_dir);
        Self { orchestrator, browser, repo, decryptor, _dir: dir, artifacts_dir }
    }

    /// Keeps no finished job in memory once its run is over.
    fn forgetful() -> Self {
        let dir = TempDir::new().unwrap();
        let artifacts_dir = dir.path().join("artifacts");
        let browser = FakeBrowserAdapter::new();
        let repo = MemoryRepository::new();
        let decryptor = FakeDecryptor::new();
        let config = test_config(&artifacts_dir).retained_finished_jobs(0);
        let orchestrator = build_with(browser.clone(), repo.clone(), decryptor.clone(), config);
        Self { orchestrator, browser, repo, decryptor, _dir: dir, artifacts_dir }
    }

    /// A second orchestrator over the same repository and artifact files,
    /// as after a process restart.
    fn restarted(&self) -> TestOrchestrator {
        build(
            FakeBrowserAdapter::new(),
            self.repo.clone(),
            self.decryptor.clone(),
            &self.artifacts_dir,
        )
    }

    async fn seed_user(&self, user: &str, auto_submit: bool) {
        self.repo.put_credential(&credential(user, "12345678909", "hunter2")).await.unwrap();
        self.repo.put_profile(&profile(user, auto_submit)).await.unwrap();
    }

    async fn seed_record(&self, id: &str, user: &str) {
        let record = DeductionRecordBuilder::default().id(id).user_id(user).build();
        self.repo.put_record(&record).await.unwrap();
    }

    /// User with credentials, a record and a deduction job for it.
    async fn deduction_job(&self, user: &str, auto_submit: bool) -> AutomationJob {
        self.seed_user(user, auto_submit).await;
        let record = format!("rec-{}", user);
        self.seed_record(&record, user).await;
        self.orchestrator
            .create_job(&UserId::from(user), JobKind::SubmitDeduction, Some(RecordId::from(record)))
            .await
            .unwrap()
    }

    /// Process and wait for the run to end.
    async fn run(&self, id: &JobId) -> AutomationJob {
        self.orchestrator.process(id).await.unwrap().join().await.unwrap();
        self.job(id).await
    }

    async fn confirm(&self, id: &JobId) -> AutomationJob {
        self.orchestrator.confirm(id).await.unwrap().join().await.unwrap();
        self.job(id).await
    }

    async fn job(&self, id: &JobId) -> AutomationJob {
        self.repo.get_job(id).await.unwrap().unwrap()
    }

    async fn record_status(&self, job: &AutomationJob) -> RecordStatus {
        let id = job.record_id.as_ref().unwrap();
        self.repo.get_record(id).await.unwrap().unwrap().status
    }

    async fn slugs(&self, id: &JobId) -> Vec<String> {
        self.orchestrator
            .get_screenshots(id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.slug)
            .collect()
    }
}

fn build<R: Repository>(
    browser: FakeBrowserAdapter,
    repo: R,
    decryptor: FakeDecryptor,
    artifacts_dir: &std::path::Path,
) -> Orchestrator<FakeBrowserAdapter, R, FakeDecryptor, FakeClock> {
    build_with(browser, repo, decryptor, test_config(artifacts_dir))
}

fn test_config(artifacts_dir: &std::path::Path) -> EngineConfig {
    EngineConfig::new(artifacts_dir)
        .dependent_fields_delay(Duration::ZERO)
        .log_poll_interval(Duration::from_millis(10))
}

fn build_with<R: Repository>(
    browser: FakeBrowserAdapter,
    repo: R,
    decryptor: FakeDecryptor,
    config: EngineConfig,
) -> Orchestrator<FakeBrowserAdapter, R, FakeDecryptor, FakeClock> {
    Orchestrator::new(
        OrchestratorDeps { browser, repository: repo, decryptor },
        FakeClock::new(),
        config,
    )
}

fn messages(job: &AutomationJob) -> Vec<&str> {
    job.logs.iter().map(|l| l.message.as_str()).collect()
}
