// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dp_core::test_support::{credential, profile};
use dp_core::JobStatus;

fn job(id: &str, record: &str, created_at_ms: u64) -> AutomationJob {
    AutomationJob::builder().id(id).record_id(record).created_at_ms(created_at_ms).build()
}

fn shot(step: u32, slug: &str) -> ScreenshotArtifact {
    ScreenshotArtifact {
        step,
        slug: slug.to_string(),
        label: slug.to_string(),
        captured_at_ms: u64::from(step),
    }
}

#[tokio::test]
async fn job_crud() {
    let repo = MemoryRepository::new();
    let mut j = job("job-a", "rec-1", 10);

    repo.create_job(&j).await.unwrap();
    assert!(matches!(
        repo.create_job(&j).await.unwrap_err(),
        RepositoryError::AlreadyExists { kind: "job", .. }
    ));

    j.status = JobStatus::Running;
    repo.update_job(&j).await.unwrap();
    assert_eq!(repo.get_job(&j.id).await.unwrap().unwrap().status, JobStatus::Running);

    assert!(repo.delete_job(&j.id).await.unwrap());
    assert!(!repo.delete_job(&j.id).await.unwrap());
    assert_eq!(repo.get_job(&j.id).await.unwrap(), None);
}

#[tokio::test]
async fn updating_a_missing_job_fails() {
    let repo = MemoryRepository::new();
    let err = repo.update_job(&job("job-x", "rec-1", 0)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { kind: "job", .. }));
}

#[tokio::test]
async fn list_is_oldest_first_and_filters_by_record() {
    let repo = MemoryRepository::new();
    repo.create_job(&job("job-b", "rec-1", 20)).await.unwrap();
    repo.create_job(&job("job-a", "rec-2", 10)).await.unwrap();
    repo.create_job(&job("job-c", "rec-1", 30)).await.unwrap();

    let ids: Vec<_> = repo.list_jobs().await.unwrap().into_iter().map(|j| j.id).collect();
    assert_eq!(ids, vec!["job-a", "job-b", "job-c"]);

    let for_record = repo.jobs_for_record(&RecordId::from("rec-1")).await.unwrap();
    assert_eq!(for_record.len(), 2);
}

#[tokio::test]
async fn screenshots_are_kept_in_step_order_and_dropped_with_the_job() {
    let repo = MemoryRepository::new();
    let j = job("job-a", "rec-1", 0);
    repo.create_job(&j).await.unwrap();

    repo.record_screenshot(&j.id, &shot(2, "identity-submitted")).await.unwrap();
    repo.record_screenshot(&j.id, &shot(1, "login-page")).await.unwrap();
    let steps: Vec<_> = repo.screenshots(&j.id).await.unwrap().iter().map(|s| s.step).collect();
    assert_eq!(steps, vec![1, 2]);

    repo.delete_job(&j.id).await.unwrap();
    assert!(repo.screenshots(&j.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn screenshot_for_unknown_job_is_rejected() {
    let repo = MemoryRepository::new();
    let err = repo.record_screenshot(&JobId::from("job-zz"), &shot(1, "x")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn auto_submit_creates_profile_on_demand() {
    let repo = MemoryRepository::new();
    let user = UserId::from("usr-1");
    assert_eq!(repo.get_profile(&user).await.unwrap(), None);

    repo.set_auto_submit(&user, true).await.unwrap();
    assert_eq!(repo.get_profile(&user).await.unwrap(), Some(profile("usr-1", true)));

    repo.set_auto_submit(&user, false).await.unwrap();
    assert!(!repo.get_profile(&user).await.unwrap().unwrap().auto_submit);
}

#[tokio::test]
async fn record_status_updates() {
    let repo = MemoryRepository::new();
    let record = DeductionRecord::builder().id("rec-9").build();
    repo.put_record(&record).await.unwrap();

    repo.set_record_status(&record.id, RecordStatus::PreviewReady).await.unwrap();
    assert_eq!(
        repo.get_record(&record.id).await.unwrap().unwrap().status,
        RecordStatus::PreviewReady
    );

    let err =
        repo.set_record_status(&RecordId::from("rec-missing"), RecordStatus::Pending).await;
    assert!(matches!(err.unwrap_err(), RepositoryError::NotFound { kind: "record", .. }));
}

#[tokio::test]
async fn snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("repository.json");

    {
        let repo = MemoryRepository::open(&path).unwrap();
        repo.create_job(&job("job-a", "rec-1", 5)).await.unwrap();
        repo.put_credential(&credential("usr-1", "12345678909", "pw")).await.unwrap();
        repo.set_auto_submit(&UserId::from("usr-1"), true).await.unwrap();
        repo.record_screenshot(&JobId::from("job-a"), &shot(1, "login-page")).await.unwrap();
    }

    let repo = MemoryRepository::open(&path).unwrap();
    assert!(repo.get_job(&JobId::from("job-a")).await.unwrap().is_some());
    assert_eq!(
        repo.get_credential(&UserId::from("usr-1")).await.unwrap(),
        Some(credential("usr-1", "12345678909", "pw"))
    );
    assert!(repo.get_profile(&UserId::from("usr-1")).await.unwrap().unwrap().auto_submit);
    assert_eq!(repo.screenshots(&JobId::from("job-a")).await.unwrap().len(), 1);
    assert!(!path.with_extension("json.tmp").exists());
}
