// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outcomes of a single processing run.

use crate::prelude::*;

#[tokio::test]
async fn missing_credentials_fail_before_any_session() {
    let world = World::new();
    let record = world.record("rec-1", "ana").await;
    let job = world
        .engine
        .create_job(&UserId::from("ana"), JobKind::SubmitDeduction, Some(record))
        .await
        .unwrap();

    let job = world.process(&job.id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.as_deref().unwrap().contains("credentials"));
    assert!(job.completed_at_ms.is_some());
    assert_eq!(world.browser.sessions_created(), 0);
    assert_eq!(world.browser.starts(), 0);
}

#[tokio::test]
async fn challenge_on_login_fails_with_the_flag_set() {
    let world = World::with_browser(
        FakeBrowserAdapter::new()
            .with_pages(|| FakePage::happy_path().with_element(PORTAL.login.challenge)),
    );
    world.user("ana", true).await;
    let job = world.deduction_job("ana").await;

    let job = world.process(&job.id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.challenge_detected);
    let steps = world.steps(&job.id).await;
    let login = steps.iter().position(|(_, slug)| slug == "login-page").unwrap();
    let challenge = steps.iter().position(|(_, slug)| slug == "challenge-detected").unwrap();
    assert!(login < challenge);
    assert_eq!(world.browser.open_sessions(), 0);
}

#[tokio::test]
async fn manual_mode_stops_at_the_preview() {
    let world = World::new();
    world.user("ana", false).await;
    let job = world.deduction_job("ana").await;

    let job = world.process(&job.id).await;

    assert_eq!(job.status, JobStatus::WaitingConfirmation);
    assert_eq!(world.record_status(&job).await, RecordStatus::PreviewReady);
    let preview = job.screenshot.clone().unwrap();
    let png = world.engine.read_screenshot_file(&job.id, &preview).await.unwrap();
    assert!(png.is_some());
    assert!(!world.browser.last_page().unwrap().was_clicked(PORTAL.deduction.save));
}

#[tokio::test]
async fn auto_submit_completes_on_success_banner() {
    let world = World::new();
    world.user("ana", true).await;
    let job = world.deduction_job("ana").await;

    let job = world.process(&job.id).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.completed_at_ms.is_some());
    assert_eq!(world.record_status(&job).await, RecordStatus::Submitted);
    assert!(messages(&job).iter().any(|m| m.starts_with("submitted: ")));
}

#[tokio::test]
async fn deleting_a_running_job_is_a_conflict() {
    let world = World::new();
    let running = AutomationJobBuilder::default()
        .id("job-running")
        .user_id("ana")
        .status(JobStatus::Running)
        .attempts(1)
        .started_at_ms(Some(1_000_000))
        .build();
    world.repo.create_job(&running).await.unwrap();

    let err = world.engine.delete(&running.id).await.unwrap_err();

    assert!(matches!(err, EngineError::Conflict { status: JobStatus::Running, .. }));
    assert_eq!(world.engine.get_job(&running.id).await.unwrap(), running);
}

#[tokio::test]
async fn users_run_in_parallel_up_to_the_limit() {
    let world = World::new();
    let mut ids = Vec::new();
    for user in ["ana", "bia", "caio", "davi"] {
        world.user(user, true).await;
        ids.push(world.deduction_job(user).await.id);
    }

    let mut handles = Vec::new();
    for id in &ids {
        handles.push(world.engine.process(id).await.unwrap());
    }
    for handle in handles {
        handle.join().await.unwrap();
    }

    for id in &ids {
        assert_eq!(world.engine.get_status(id).await.unwrap(), JobStatus::Completed);
    }
    assert_eq!(world.browser.sessions_created(), 4);
    assert_eq!(world.browser.open_sessions(), 0);
}

#[tokio::test]
async fn step_numbers_start_at_one_and_never_repeat() {
    let world = World::new();
    world.user("ana", false).await;
    let job = world.deduction_job("ana").await;
    world.process(&job.id).await;
    world.confirm(&job.id).await;

    let steps: Vec<u32> = world.steps(&job.id).await.into_iter().map(|(n, _)| n).collect();

    assert_eq!(steps.first(), Some(&1));
    assert!(steps.windows(2).all(|w| w[1] == w[0] + 1));
}
