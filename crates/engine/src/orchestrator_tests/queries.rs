// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::EngineError;
use crate::stream::StreamEvent;
use tokio::sync::mpsc;

async fn drain(mut rx: mpsc::UnboundedReceiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    let collect = async {
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
    };
    tokio::time::timeout(Duration::from_secs(5), collect).await.unwrap();
    events
}

#[tokio::test]
async fn status_and_logs_survive_a_restart() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;
    h.run(&job.id).await;
    let before = h.orchestrator.get_logs(&job.id).await.unwrap();

    let restarted = h.restarted();

    assert_eq!(restarted.get_status(&job.id).await.unwrap(), JobStatus::WaitingConfirmation);
    assert_eq!(restarted.get_logs(&job.id).await.unwrap(), before);
    assert_eq!(restarted.get_job(&job.id).await.unwrap().logs, before);
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let h = Harness::new();
    let id = JobId::from("job-missing");

    assert!(matches!(h.orchestrator.get_status(&id).await, Err(EngineError::NotFound(_))));
    assert!(matches!(h.orchestrator.get_logs(&id).await, Err(EngineError::NotFound(_))));
    assert!(matches!(h.orchestrator.follow(&id).await, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn list_jobs_returns_every_job() {
    let h = Harness::new();
    let a = h.deduction_job("alice", false).await;
    let b = h.deduction_job("bob", false).await;

    let ids: Vec<JobId> =
        h.orchestrator.list_jobs().await.unwrap().into_iter().map(|j| j.id).collect();

    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a.id) && ids.contains(&b.id));
}

#[tokio::test]
async fn screenshots_come_from_the_repository_after_restart() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;
    h.run(&job.id).await;
    let live = h.orchestrator.get_screenshots(&job.id).await.unwrap();

    let restarted = h.restarted().get_screenshots(&job.id).await.unwrap();

    assert_eq!(restarted, live);
}

#[tokio::test]
async fn screenshots_are_rebuilt_from_disk_without_metadata() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;
    h.run(&job.id).await;
    let fresh = build(
        FakeBrowserAdapter::new(),
        MemoryRepository::new(),
        FakeDecryptor::new(),
        &h.artifacts_dir,
    );

    let shots = fresh.get_screenshots(&job.id).await.unwrap();

    let names: Vec<String> = shots.iter().map(|s| s.filename()).collect();
    assert_eq!(names[0], "step-01-login-page.png");
    assert_eq!(names[5], "step-06-form-filled.png");
    assert_eq!(shots[0].label, "login page");
}

#[tokio::test]
async fn screenshots_of_an_unusable_id_are_empty() {
    let h = Harness::new();
    let shots = h.orchestrator.get_screenshots(&JobId::from("../etc")).await.unwrap();
    assert!(shots.is_empty());
}

#[tokio::test]
async fn reads_screenshot_bytes_by_filename() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;
    h.run(&job.id).await;
    let o = &h.orchestrator;

    let png = o.read_screenshot_file(&job.id, "step-01-login-page.png").await.unwrap().unwrap();
    assert!(png.starts_with(dp_portal::fake::FAKE_PNG_HEADER));

    assert_eq!(o.read_screenshot_file(&job.id, "step-99-nothing.png").await.unwrap(), None);
    assert_eq!(o.read_screenshot_file(&job.id, "../job.log").await.unwrap(), None);
    assert_eq!(o.read_screenshot_file(&JobId::from("../x"), "step-01-a.png").await.unwrap(), None);
}

#[tokio::test]
async fn reads_the_recording() {
    let h = Harness::new();
    let job = h.deduction_job("alice", false).await;
    h.run(&job.id).await;

    let video = h.orchestrator.read_video_file(&job.id).await.unwrap().unwrap();

    assert_eq!(video.filename, "recording.webm");
    assert!(!video.bytes.is_empty());
}

#[tokio::test]
async fn job_without_recording_has_no_video() {
    let h = Harness::with_browser(FakeBrowserAdapter::new().without_video());
    let job = h.deduction_job("alice", false).await;
    h.run(&job.id).await;

    assert!(h.orchestrator.get_video_filenames(&job.id).await.unwrap().is_empty());
    assert!(h.orchestrator.read_video_file(&job.id).await.unwrap().is_none());
}

#[tokio::test]
async fn follow_finished_job_replays_its_log() {
    let h = Harness::new();
    let job = h.deduction_job("alice", true).await;
    let job = h.run(&job.id).await;

    let events = drain(h.restarted().follow(&job.id).await.unwrap()).await;

    let (done, lines) = events.split_last().unwrap();
    assert_eq!(*done, StreamEvent::Done(JobStatus::Completed));
    let lines: Vec<LogLine> = lines
        .iter()
        .map(|e| match e {
            StreamEvent::Line(line) => line.clone(),
            other => panic!("unexpected event: {other:?}"),
        })
        .collect();
    assert_eq!(lines, job.logs);
}

#[tokio::test]
async fn follow_streams_a_live_run_to_the_end() {
    let h = Harness::new();
    let job = h.deduction_job("alice", true).await;
    let rx = h.orchestrator.follow(&job.id).await.unwrap();

    h.run(&job.id).await;
    let events = drain(rx).await;

    assert_eq!(events.last(), Some(&StreamEvent::Done(JobStatus::Completed)));
    let messages: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Line(line) => Some(line.message.as_str()),
            StreamEvent::Done(_) => None,
        })
        .collect();
    assert_eq!(messages.first(), Some(&"submit_deduction job created"));
    assert!(messages.contains(&"attempt 1 started"));
    assert!(messages.contains(&"submitted: Pagamento salvo com sucesso"));
}

#[tokio::test]
async fn finished_jobs_are_served_from_the_repository_once_evicted() {
    let h = Harness::forgetful();
    let job = h.deduction_job("alice", true).await;
    let job = h.run(&job.id).await;

    assert!(h.orchestrator.inner.journal.is_empty());
    assert_eq!(h.orchestrator.get_status(&job.id).await.unwrap(), JobStatus::Completed);
    let logs = h.orchestrator.get_logs(&job.id).await.unwrap();
    assert_eq!(logs, job.logs);
    assert!(!logs.is_empty());

    let events = drain(h.orchestrator.follow(&job.id).await.unwrap()).await;
    assert_eq!(events.last(), Some(&StreamEvent::Done(JobStatus::Completed)));
    assert_eq!(events.len(), logs.len() + 1);
    assert!(h.orchestrator.inner.journal.is_empty());
}

#[tokio::test]
async fn waiting_jobs_stay_in_memory() {
    let h = Harness::forgetful();
    let job = h.deduction_job("alice", false).await;
    h.run(&job.id).await;

    assert_eq!(h.orchestrator.inner.journal.status(&job.id), Some(JobStatus::WaitingConfirmation));
}
