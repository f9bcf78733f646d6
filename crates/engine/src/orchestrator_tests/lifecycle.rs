// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::EngineError;
use dp_core::AutomationJobBuilder;

#[tokio::test]
async fn create_job_starts_pending_with_a_log_line() {
    let h = Harness::new();
    h.seed_record("rec-1", "alice").await;

    let job = h
        .orchestrator
        .create_job(&UserId::from("alice"), JobKind::SubmitDeduction, Some(RecordId::from("rec-1")))
        .await
        .unwrap();

    assert!(job.id.as_str().starts_with("job-"));
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.attempts, 0);
    assert_eq!(messages(&job), vec!["submit_deduction job created"]);
    assert_eq!(h.job(&job.id).await, job);
}

#[tokio::test]
async fn create_job_rejects_unknown_record() {
    let h = Harness::new();

    let err = h
        .orchestrator
        .create_job(&UserId::from("alice"), JobKind::SubmitDeduction, Some(RecordId::from("nope")))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::RecordNotFound(ref id) if *id == "nope"));
    assert!(h.repo.list_jobs().await.unwrap().is_empty());
}

#[tokio::test]
async fn cancel_pending_job() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;

    let cancelled = h.orchestrator.cancel(&job.id).await.unwrap();

    assert_eq!(cancelled.status, JobStatus::Cancelled);
    assert!(cancelled.completed_at_ms.is_some());
    let stored = h.job(&job.id).await;
    assert_eq!(stored.status, JobStatus::Cancelled);
    assert!(messages(&stored).contains(&"job cancelled"));
    assert_eq!(h.record_status(&stored).await, RecordStatus::Pending);
}

#[tokio::test]
async fn cancel_job_waiting_for_confirmation() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;
    assert_eq!(h.run(&job.id).await.status, JobStatus::WaitingConfirmation);

    h.orchestrator.cancel(&job.id).await.unwrap();

    let job = h.job(&job.id).await;
    assert_eq!(job.status, JobStatus::Cancelled);
    assert_eq!(h.record_status(&job).await, RecordStatus::Pending);
    assert!(h.orchestrator.confirm(&job.id).await.is_err());
}

#[yare::parameterized(
    completed = { JobStatus::Completed },
    failed    = { JobStatus::Failed },
    cancelled = { JobStatus::Cancelled },
)]
fn cancel_rejects_finished_jobs(status: JobStatus) {
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let h = Harness::new();
        let job = AutomationJobBuilder::default().id("job-x").status(status).build();
        h.repo.create_job(&job).await.unwrap();

        let err = h.orchestrator.cancel(&job.id).await.unwrap_err();

        match err {
            EngineError::Conflict { hint, .. } => assert_eq!(hint, "job has already finished"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(h.job(&job.id).await, job);
    });
}

#[tokio::test]
async fn cancel_unknown_job_is_not_found() {
    let h = Harness::new();
    let err = h.orchestrator.cancel(&JobId::from("job-missing")).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[yare::parameterized(
    pending = { JobStatus::Pending },
    running = { JobStatus::Running },
    waiting = { JobStatus::WaitingConfirmation },
)]
fn delete_requires_a_finished_job(status: JobStatus) {
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let h = Harness::new();
        let job = AutomationJobBuilder::default().id("job-x").status(status).build();
        h.repo.create_job(&job).await.unwrap();

        let err = h.orchestrator.delete(&job.id).await.unwrap_err();

        assert!(matches!(err, EngineError::Conflict { status: s, .. } if s == status));
        assert_eq!(h.job(&job.id).await, job);
    });
}

#[tokio::test]
async fn delete_finished_job_resets_its_record() {
    let h = Harness::new();
    let job = h.deduction_job("alice", true).await;
    assert_eq!(h.run(&job.id).await.status, JobStatus::Completed);

    h.orchestrator.delete(&job.id).await.unwrap();

    assert!(h.repo.get_job(&job.id).await.unwrap().is_none());
    assert!(matches!(h.orchestrator.get_status(&job.id).await, Err(EngineError::NotFound(_))));
    let record = h.repo.get_record(&RecordId::from("rec-alice")).await.unwrap().unwrap();
    assert_eq!(record.status, RecordStatus::Pending);
    // Files stay on disk
    assert!(h.artifacts_dir.join(job.id.as_str()).join("job.log").exists());
}

#[tokio::test]
async fn delete_keeps_record_status_while_other_jobs_reference_it() {
    let h = Harness::new();
    let first = h.deduction_job("alice", true).await;
    h.run(&first.id).await;
    let second = h
        .orchestrator
        .create_job(
            &UserId::from("alice"),
            JobKind::SubmitDeduction,
            Some(RecordId::from("rec-alice")),
        )
        .await
        .unwrap();
    h.orchestrator.cancel(&second.id).await.unwrap();
    h.repo.set_record_status(&RecordId::from("rec-alice"), RecordStatus::Submitted).await.unwrap();

    h.orchestrator.delete(&second.id).await.unwrap();

    let record = h.repo.get_record(&RecordId::from("rec-alice")).await.unwrap().unwrap();
    assert_eq!(record.status, RecordStatus::Submitted);
}

#[tokio::test]
async fn reconcile_fails_orphaned_runs() {
    let h = Harness::new();
    h.seed_record("rec-1", "alice").await;
    h.repo.set_record_status(&RecordId::from("rec-1"), RecordStatus::Processing).await.unwrap();
    let running = AutomationJobBuilder::default()
        .id("job-running")
        .status(JobStatus::Running)
        .attempts(1)
        .started_at_ms(Some(1_000_000))
        .build();
    let waiting = AutomationJobBuilder::default()
        .id("job-waiting")
        .record_id("rec-2")
        .status(JobStatus::WaitingConfirmation)
        .build();
    h.repo.create_job(&running).await.unwrap();
    h.repo.create_job(&waiting).await.unwrap();

    let orphans = h.restarted().reconcile().await.unwrap();

    assert_eq!(orphans, 1);
    let job = h.job(&running.id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some(INTERRUPTED_BY_RESTART));
    assert!(job.completed_at_ms.is_some());
    assert!(messages(&job).contains(&"job failed: interrupted by restart"));
    assert_eq!(h.record_status(&job).await, RecordStatus::Pending);
    assert_eq!(h.job(&waiting.id).await, waiting);
}

#[tokio::test]
async fn reconciled_job_can_be_retried() {
    let h = Harness::new();
    let job = h.deduction_job("alice", true).await;
    let mut stuck = h.job(&job.id).await;
    stuck.status = JobStatus::Running;
    stuck.attempts = 1;
    h.repo.update_job(&stuck).await.unwrap();

    h.orchestrator.reconcile().await.unwrap();
    let job = h.run(&job.id).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.attempts, 2);
}
