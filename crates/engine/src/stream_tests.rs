// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dp_core::{AutomationJobBuilder, JobStatus};

fn tracked(status: JobStatus, lines: &[&str]) -> (Arc<JobJournal>, JobId) {
    let journal = Arc::new(JobJournal::new());
    let logs = lines.iter().enumerate().map(|(i, m)| LogLine::new(i as u64, *m)).collect();
    let job = AutomationJobBuilder::default().status(status).logs(logs).build();
    journal.seed(&job);
    (journal, job.id)
}

async fn drain(mut rx: mpsc::UnboundedReceiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn messages(events: &[StreamEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Line(line) => Some(line.message.as_str()),
            StreamEvent::Done(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn terminal_job_replays_and_completes_at_once() {
    let (journal, id) = tracked(JobStatus::Completed, &["authenticated", "submitted"]);

    let mut rx = follow(journal, id, Duration::from_secs(3600));

    // Everything is already buffered; no poller was spawned
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(messages(&events), vec!["authenticated", "submitted"]);
    assert_eq!(events.last(), Some(&StreamEvent::Done(JobStatus::Completed)));
    assert!(rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn live_job_streams_new_lines_until_terminal() {
    let (journal, id) = tracked(JobStatus::Running, &["attempt 1 started"]);
    let rx = follow(Arc::clone(&journal), id.clone(), Duration::from_secs(1));

    tokio::time::sleep(Duration::from_millis(1500)).await;
    journal.append(&id, LogLine::new(10, "authenticated"));
    tokio::time::sleep(Duration::from_secs(1)).await;
    journal.append(&id, LogLine::new(11, "job failed"));
    journal.set_status(&id, JobStatus::Failed);

    let events = drain(rx).await;
    assert_eq!(messages(&events), vec!["attempt 1 started", "authenticated", "job failed"]);
    assert_eq!(events.last(), Some(&StreamEvent::Done(JobStatus::Failed)));
}

#[tokio::test(start_paused = true)]
async fn dropped_receiver_stops_polling() {
    let (journal, id) = tracked(JobStatus::Running, &[]);
    let rx = follow(Arc::clone(&journal), id, Duration::from_secs(1));
    drop(rx);

    tokio::time::sleep(Duration::from_secs(5)).await;
    // The poller held the only other reference to the journal
    assert_eq!(Arc::strong_count(&journal), 1);
}

#[tokio::test]
async fn untracked_job_yields_a_closed_stream() {
    let journal = Arc::new(JobJournal::new());
    let mut rx = follow(journal, JobId::from("job-none"), Duration::from_secs(1));
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn replay_needs_no_journal_entry() {
    let lines = vec![LogLine::new(1, "logged in"), LogLine::new(2, "cancelled")];

    let events = drain(replay(lines, JobStatus::Cancelled)).await;

    assert_eq!(messages(&events), vec!["logged in", "cancelled"]);
    assert_eq!(events.last(), Some(&StreamEvent::Done(JobStatus::Cancelled)));
}
