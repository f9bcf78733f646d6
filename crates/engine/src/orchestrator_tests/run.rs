// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::EngineError;
use dp_adapters::BrowserCall;
use dp_core::{AutomationJobBuilder, EncryptedSecret};
use dp_portal::{Effect, FakePage, PORTAL};

#[tokio::test]
async fn missing_credential_fails_without_a_session() {
    let h = Harness::new();
    h.seed_record("rec-1", "alice").await;
    let job = h
        .orchestrator
        .create_job(&UserId::from("alice"), JobKind::SubmitDeduction, Some(RecordId::from("rec-1")))
        .await
        .unwrap();

    let job = h.run(&job.id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("no stored portal credentials for this user"));
    assert_eq!(job.attempts, 1);
    assert!(job.completed_at_ms.is_some());
    assert!(h.browser.calls().is_empty());
    assert_eq!(h.record_status(&job).await, RecordStatus::Pending);
}

#[tokio::test]
async fn challenge_fails_with_the_flag_and_screenshots() {
    let h = Harness::with_browser(
        FakeBrowserAdapter::new().with_pages(|| FakePage::happy_path().with_element(PORTAL.login.challenge)),
    );
    let job = h.deduction_job("alice", false).await;

    let job = h.run(&job.id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.challenge_detected);
    assert!(job.error.as_deref().unwrap().contains("challenge"));
    assert_eq!(h.slugs(&job.id).await, vec!["login-page", "challenge-detected"]);
    assert_eq!(h.browser.open_sessions(), 0);
    assert_eq!(h.record_status(&job).await, RecordStatus::Pending);
}

#[tokio::test]
async fn manual_submission_waits_for_confirmation() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;

    let job = h.run(&job.id).await;

    assert_eq!(job.status, JobStatus::WaitingConfirmation);
    assert_eq!(job.screenshot.as_deref(), Some("step-06-form-filled.png"));
    assert!(job.completed_at_ms.is_none());
    assert_eq!(h.record_status(&job).await, RecordStatus::PreviewReady);
    assert_eq!(
        h.slugs(&job.id).await,
        vec![
            "login-page",
            "identity-submitted",
            "password-submitted",
            "services-directory",
            "application",
            "form-filled"
        ]
    );
    let page = h.browser.last_page().unwrap();
    assert!(!page.was_clicked(PORTAL.deduction.save));
    assert!(page.is_closed());
    assert_eq!(h.browser.open_sessions(), 0);
}

#[tokio::test]
async fn auto_submit_completes_and_marks_the_record() {
    let h = Harness::new();
    let job = h.deduction_job("alice", true).await;

    let job = h.run(&job.id).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.completed_at_ms.is_some());
    assert_eq!(job.error, None);
    assert_eq!(h.record_status(&job).await, RecordStatus::Submitted);
    assert_eq!(h.slugs(&job.id).await.last().map(String::as_str), Some("after-save"));
    assert!(messages(&job).contains(&"submitted: Pagamento salvo com sucesso"));
}

#[tokio::test]
async fn confirmation_refills_and_submits() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;
    h.run(&job.id).await;

    let job = h.confirm(&job.id).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.attempts, 1);
    assert_eq!(h.record_status(&job).await, RecordStatus::Submitted);
    assert_eq!(h.browser.pages().len(), 2);
    assert!(h.browser.last_page().unwrap().was_clicked(PORTAL.deduction.save));

    let steps: Vec<u32> =
        h.orchestrator.get_screenshots(&job.id).await.unwrap().iter().map(|s| s.step).collect();
    assert_eq!(steps, (1..=13).collect::<Vec<_>>());
}

#[yare::parameterized(
    pending   = { JobStatus::Pending },
    running   = { JobStatus::Running },
    completed = { JobStatus::Completed },
    failed    = { JobStatus::Failed },
    cancelled = { JobStatus::Cancelled },
)]
fn confirm_requires_waiting_confirmation(status: JobStatus) {
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let h = Harness::new();
        let job = AutomationJobBuilder::default().id("job-x").status(status).build();
        h.repo.create_job(&job).await.unwrap();

        let err = h.orchestrator.confirm(&job.id).await.err().unwrap();

        assert!(matches!(err, EngineError::Conflict { status: s, .. } if s == status));
        assert_eq!(h.job(&job.id).await, job);
    });
}

#[yare::parameterized(
    running   = { JobStatus::Running },
    waiting   = { JobStatus::WaitingConfirmation },
    completed = { JobStatus::Completed },
    cancelled = { JobStatus::Cancelled },
)]
fn process_rejects_other_states(status: JobStatus) {
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let h = Harness::new();
        let job = AutomationJobBuilder::default().id("job-x").status(status).build();
        h.repo.create_job(&job).await.unwrap();

        let err = h.orchestrator.process(&job.id).await.err().unwrap();

        assert!(matches!(err, EngineError::Conflict { .. }));
        assert_eq!(h.job(&job.id).await, job);
    });
}

#[tokio::test]
async fn failed_job_can_be_retried() {
    let h = Harness::new();
    h.seed_record("rec-1", "alice").await;
    let job = h
        .orchestrator
        .create_job(&UserId::from("alice"), JobKind::SubmitDeduction, Some(RecordId::from("rec-1")))
        .await
        .unwrap();
    assert_eq!(h.run(&job.id).await.status, JobStatus::Failed);

    h.seed_user("alice", true).await;
    let job = h.run(&job.id).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.attempts, 2);
    assert_eq!(job.error, None);
    assert!(messages(&job).contains(&"retry requested"));
}

#[tokio::test]
async fn verify_login_needs_no_record() {
    let h = Harness::new();
    h.seed_user("alice", false).await;
    let job =
        h.orchestrator.create_job(&UserId::from("alice"), JobKind::VerifyLogin, None).await.unwrap();

    let job = h.run(&job.id).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(h.slugs(&job.id).await.last().map(String::as_str), Some("application"));
    assert!(messages(&job).contains(&"login verified"));
}

#[tokio::test]
async fn deduction_job_without_record_fails() {
    let h = Harness::new();
    h.seed_user("alice", false).await;
    let job = h
        .orchestrator
        .create_job(&UserId::from("alice"), JobKind::SubmitDeduction, None)
        .await
        .unwrap();

    let job = h.run(&job.id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("no deduction record linked to this job"));
    assert!(h.browser.calls().is_empty());
}

#[tokio::test]
async fn portal_rejection_fails_the_job() {
    let form = PORTAL.deduction;
    let h = Harness::with_browser(FakeBrowserAdapter::new().with_pages(move || {
        FakePage::happy_path()
            .replace_on_click(form.save, vec![Effect::Show(form.error_banner)])
            .with_text(form.error_banner, "Valor inválido")
    }));
    let job = h.deduction_job("alice", true).await;

    let job = h.run(&job.id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("portal reported an error: Valor inválido"));
    assert!(!job.challenge_detected);
    assert_eq!(h.record_status(&job).await, RecordStatus::Pending);
}

#[tokio::test]
async fn undecryptable_credential_fails() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;
    let mut stored = credential("alice", "12345678909", "x");
    stored.secret = EncryptedSecret {
        ciphertext: "garbage".to_string(),
        iv: "iv".to_string(),
        auth_tag: "tag".to_string(),
    };
    h.repo.put_credential(&stored).await.unwrap();

    let job = h.run(&job.id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.as_deref().unwrap().starts_with("could not decrypt stored credentials"));
    assert!(h.browser.calls().is_empty());
}

#[tokio::test]
async fn browser_launch_failure_fails_the_job() {
    let h = Harness::with_browser(FakeBrowserAdapter::new().fail_start());
    let job = h.deduction_job("alice", false).await;

    let job = h.run(&job.id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.as_deref().unwrap().contains("chrome binary not found"));
    assert_eq!(h.record_status(&job).await, RecordStatus::Pending);
    assert!(h.orchestrator.queue().session_users().await.is_empty());
}

#[tokio::test]
async fn second_process_while_queued_is_rejected() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;

    let handle = h.orchestrator.process(&job.id).await.unwrap();
    let err = h.orchestrator.process(&job.id).await.err().unwrap();
    handle.join().await.unwrap();

    match err {
        EngineError::Conflict { hint, .. } => assert_eq!(hint, "a run is already queued"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn jobs_of_one_user_never_share_a_session() {
    let h = Harness::new();
    let first = h.deduction_job("alice", true).await;
    h.seed_record("rec-2", "alice").await;
    let second = h
        .orchestrator
        .create_job(&UserId::from("alice"), JobKind::SubmitDeduction, Some(RecordId::from("rec-2")))
        .await
        .unwrap();

    let a = h.orchestrator.process(&first.id).await.unwrap();
    let b = h.orchestrator.process(&second.id).await.unwrap();
    a.join().await.unwrap();
    b.join().await.unwrap();

    assert_eq!(h.job(&first.id).await.status, JobStatus::Completed);
    assert_eq!(h.job(&second.id).await.status, JobStatus::Completed);
    let sessions: Vec<_> = h
        .browser
        .calls()
        .into_iter()
        .filter(|c| matches!(c, BrowserCall::NewSession { .. } | BrowserCall::CloseSession { .. }))
        .collect();
    assert_eq!(
        sessions,
        vec![
            BrowserCall::NewSession { session: 1 },
            BrowserCall::CloseSession { session: 1 },
            BrowserCall::NewSession { session: 2 },
            BrowserCall::CloseSession { session: 2 },
        ]
    );
}

#[tokio::test]
async fn job_cancelled_while_queued_never_runs() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;

    let handle = h.orchestrator.process(&job.id).await.unwrap();
    h.orchestrator.cancel(&job.id).await.unwrap();
    handle.join().await.unwrap();

    let job = h.job(&job.id).await;
    assert_eq!(job.status, JobStatus::Cancelled);
    assert_eq!(job.attempts, 0);
    assert!(h.browser.calls().is_empty());
    assert!(messages(&job).contains(&"run skipped, job is CANCELLED"));
}

#[tokio::test]
async fn recording_is_finalized_after_the_run() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;

    let job = h.run(&job.id).await;

    assert_eq!(h.orchestrator.get_video_filenames(&job.id).await.unwrap(), vec!["recording.webm"]);
    assert!(messages(&job).contains(&"recording saved as recording.webm"));
}

#[tokio::test]
async fn job_log_file_mirrors_activity() {
    let h = Harness::new();
    let job = h.deduction_job("alice", true).await;

    h.run(&job.id).await;

    let log = std::fs::read_to_string(h.artifacts_dir.join(job.id.as_str()).join("job.log")).unwrap();
    assert!(log.contains("[run] attempt 1 started"));
    assert!(log.contains("[portal] authenticated"));
    assert!(!log.contains("hunter2"));
}
