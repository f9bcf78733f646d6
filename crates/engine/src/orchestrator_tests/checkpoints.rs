// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs held at a screenshot while the job changes underneath them.

use super::*;
use async_trait::async_trait;
use dp_core::{DeductionRecord, ScreenshotArtifact, StoredCredential, UserProfile};
use dp_portal::PORTAL;
use dp_storage::RepositoryError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Parks the first run that records `slug` until released.
struct Gate {
    slug: &'static str,
    armed: AtomicBool,
    reached: Notify,
    release: Notify,
}

/// Memory repository that holds a run at one screenshot.
#[derive(Clone)]
struct GatedRepository {
    inner: MemoryRepository,
    gate: Arc<Gate>,
}

#[async_trait]
impl Repository for GatedRepository {
    async fn create_job(&self, job: &AutomationJob) -> Result<(), RepositoryError> {
        self.inner.create_job(job).await
    }
    async fn get_job(&self, id: &JobId) -> Result<Option<AutomationJob>, RepositoryError> {
        self.inner.get_job(id).await
    }
    async fn update_job(&self, job: &AutomationJob) -> Result<(), RepositoryError> {
        self.inner.update_job(job).await
    }
    async fn delete_job(&self, id: &JobId) -> Result<bool, RepositoryError> {
        self.inner.delete_job(id).await
    }
    async fn list_jobs(&self) -> Result<Vec<AutomationJob>, RepositoryError> {
        self.inner.list_jobs().await
    }
    async fn jobs_for_record(&self, id: &RecordId) -> Result<Vec<AutomationJob>, RepositoryError> {
        self.inner.jobs_for_record(id).await
    }

    async fn record_screenshot(
        &self,
        job: &JobId,
        artifact: &ScreenshotArtifact,
    ) -> Result<(), RepositoryError> {
        let saved = self.inner.record_screenshot(job, artifact).await;
        if artifact.slug == self.gate.slug && self.gate.armed.swap(false, Ordering::SeqCst) {
            self.gate.reached.notify_one();
            self.gate.release.notified().await;
        }
        saved
    }
    async fn screenshots(&self, job: &JobId) -> Result<Vec<ScreenshotArtifact>, RepositoryError> {
        self.inner.screenshots(job).await
    }

    async fn get_profile(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        self.inner.get_profile(id).await
    }
    async fn put_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        self.inner.put_profile(profile).await
    }
    async fn set_auto_submit(&self, id: &UserId, enabled: bool) -> Result<(), RepositoryError> {
        self.inner.set_auto_submit(id, enabled).await
    }
    async fn get_credential(
        &self,
        id: &UserId,
    ) -> Result<Option<StoredCredential>, RepositoryError> {
        self.inner.get_credential(id).await
    }
    async fn put_credential(&self, credential: &StoredCredential) -> Result<(), RepositoryError> {
        self.inner.put_credential(credential).await
    }

    async fn get_record(&self, id: &RecordId) -> Result<Option<DeductionRecord>, RepositoryError> {
        self.inner.get_record(id).await
    }
    async fn put_record(&self, record: &DeductionRecord) -> Result<(), RepositoryError> {
        self.inner.put_record(record).await
    }
    async fn set_record_status(
        &self,
        id: &RecordId,
        status: RecordStatus,
    ) -> Result<(), RepositoryError> {
        self.inner.set_record_status(id, status).await
    }
}

struct Held {
    orchestrator: Orchestrator<FakeBrowserAdapter, GatedRepository, FakeDecryptor, FakeClock>,
    browser: FakeBrowserAdapter,
    repo: MemoryRepository,
    gate: Arc<Gate>,
    _dir: TempDir,
}

impl Held {
    fn at(slug: &'static str) -> Self {
        let dir = TempDir::new().unwrap();
        let browser = FakeBrowserAdapter::new();
        let repo = MemoryRepository::new();
        let gate = Arc::new(Gate {
            slug,
            armed: AtomicBool::new(true),
            reached: Notify::new(),
            release: Notify::new(),
        });
        let gated = GatedRepository { inner: repo.clone(), gate: Arc::clone(&gate) };
        let orchestrator =
            build(browser.clone(), gated, FakeDecryptor::new(), &dir.path().join("artifacts"));
        Self { orchestrator, browser, repo, gate, _dir: dir }
    }

    /// Auto-submitting user, so an unhindered run would click save.
    async fn submitting_job(&self) -> AutomationJob {
        self.repo.put_credential(&credential("alice", "12345678909", "hunter2")).await.unwrap();
        self.repo.put_profile(&profile("alice", true)).await.unwrap();
        let record = DeductionRecordBuilder::default().id("rec-1").user_id("alice").build();
        self.repo.put_record(&record).await.unwrap();
        self.orchestrator
            .create_job(&UserId::from("alice"), JobKind::SubmitDeduction, Some(record.id))
            .await
            .unwrap()
    }

    async fn record_status(&self) -> RecordStatus {
        self.repo.get_record(&RecordId::from("rec-1")).await.unwrap().unwrap().status
    }
}

#[tokio::test]
async fn cancel_mid_run_stops_before_saving() {
    let held = Held::at("services-directory");
    let job = held.submitting_job().await;

    let run = held.orchestrator.process(&job.id).await.unwrap();
    held.gate.reached.notified().await;
    let cancelled = held.orchestrator.cancel(&job.id).await.unwrap();
    assert_eq!(cancelled.status, JobStatus::Cancelled);
    held.gate.release.notify_one();
    run.join().await.unwrap();

    let job = held.repo.get_job(&job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);
    assert_eq!(job.attempts, 1);
    assert!(job.completed_at_ms.is_some());
    assert!(messages(&job).contains(&"run stopped after cancellation"));

    let page = held.browser.last_page().unwrap();
    assert!(!page.was_clicked(PORTAL.deduction.save));
    assert!(page.is_closed());
    assert_eq!(held.browser.open_sessions(), 0);
    assert_eq!(held.record_status().await, RecordStatus::Pending);
}

#[tokio::test]
async fn deleting_a_cancelled_job_mid_run_stops_it_too() {
    let held = Held::at("form-filled");
    let job = held.submitting_job().await;

    let run = held.orchestrator.process(&job.id).await.unwrap();
    held.gate.reached.notified().await;
    held.orchestrator.cancel(&job.id).await.unwrap();
    held.orchestrator.delete(&job.id).await.unwrap();
    held.gate.release.notify_one();
    run.join().await.unwrap();

    assert!(held.repo.get_job(&job.id).await.unwrap().is_none());
    let page = held.browser.last_page().unwrap();
    assert!(!page.was_clicked(PORTAL.deduction.save));
    assert_eq!(held.browser.open_sessions(), 0);
    assert_eq!(held.record_status().await, RecordStatus::Pending);
}
