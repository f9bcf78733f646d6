// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human confirmation of a previewed submission.

use crate::prelude::*;

#[tokio::test]
async fn confirming_a_preview_submits_it() {
    let world = World::new();
    world.user("ana", false).await;
    let job = world.deduction_job("ana").await;
    world.process(&job.id).await;

    world.clock.advance(Duration::from_secs(90));
    let job = world.confirm(&job.id).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.attempts, 1);
    assert_eq!(job.completed_at_ms, Some(1_090_000));
    assert_eq!(world.record_status(&job).await, RecordStatus::Submitted);
    assert!(world.browser.last_page().unwrap().was_clicked(PORTAL.deduction.save));
}

#[tokio::test]
async fn confirm_outside_the_preview_changes_nothing() {
    let world = World::new();
    world.user("ana", true).await;
    let job = world.deduction_job("ana").await;

    let err = world.engine.confirm(&job.id).await.err().unwrap();
    assert!(matches!(err, EngineError::Conflict { status: JobStatus::Pending, .. }));
    assert_eq!(world.engine.get_job(&job.id).await.unwrap(), job);

    let done = world.process(&job.id).await;
    let err = world.engine.confirm(&job.id).await.err().unwrap();
    assert!(matches!(err, EngineError::Conflict { status: JobStatus::Completed, .. }));
    assert_eq!(world.engine.get_job(&job.id).await.unwrap(), done);
}

#[tokio::test]
async fn cancelled_preview_cannot_be_confirmed() {
    let world = World::new();
    world.user("ana", false).await;
    let job = world.deduction_job("ana").await;
    world.process(&job.id).await;

    let cancelled = world.engine.cancel(&job.id).await.unwrap();

    assert_eq!(cancelled.status, JobStatus::Cancelled);
    assert_eq!(world.record_status(&cancelled).await, RecordStatus::Pending);
    assert!(world.engine.confirm(&job.id).await.is_err());
}
