// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavior across a process restart.

use crate::prelude::*;

#[tokio::test]
async fn finished_job_is_readable_after_restart() {
    let world = World::new();
    world.user("ana", false).await;
    let job = world.deduction_job("ana").await;
    let before = world.process(&job.id).await;
    let steps = world.steps(&job.id).await;

    let world = world.restart();

    assert_eq!(world.engine.get_status(&job.id).await.unwrap(), JobStatus::WaitingConfirmation);
    assert_eq!(world.engine.get_logs(&job.id).await.unwrap(), before.logs);
    assert_eq!(world.steps(&job.id).await, steps);
    assert_eq!(world.engine.get_video_filenames(&job.id).await.unwrap(), vec!["recording.webm"]);
    let log = std::fs::read_to_string(world.artifacts_dir().join(job.id.as_str()).join("job.log"))
        .unwrap();
    assert_eq!(log.lines().count(), before.logs.len());
}

#[tokio::test]
async fn confirmation_survives_a_restart() {
    let world = World::new();
    world.user("ana", false).await;
    let job = world.deduction_job("ana").await;
    world.process(&job.id).await;

    let world = world.restart();
    let job = world.confirm(&job.id).await;

    assert_eq!(job.status, JobStatus::Completed);
    let steps = world.steps(&job.id).await;
    assert_eq!(steps[6], (7, "login-page".to_string()));
    assert_eq!(steps.last().map(|(_, slug)| slug.as_str()), Some("after-save"));
}

#[tokio::test]
async fn orphaned_run_is_failed_on_startup() {
    let world = World::new();
    world.user("ana", true).await;
    let job = world.deduction_job("ana").await;
    let mut stuck = world.engine.get_job(&job.id).await.unwrap();
    stuck.status = JobStatus::Running;
    stuck.attempts = 1;
    world.repo.update_job(&stuck).await.unwrap();

    let world = world.restart();
    assert_eq!(world.engine.reconcile().await.unwrap(), 1);

    let job = world.engine.get_job(&job.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some(dp_engine::INTERRUPTED_BY_RESTART));
    assert_eq!(world.record_status(&job).await, RecordStatus::Pending);

    let job = world.process(&job.id).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.attempts, 2);
}
