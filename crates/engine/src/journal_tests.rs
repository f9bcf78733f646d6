// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dp_core::AutomationJobBuilder;

fn line(at_ms: u64, message: &str) -> LogLine {
    LogLine::new(at_ms, message)
}

#[test]
fn seed_copies_status_and_lines_once() {
    let journal = JobJournal::new();
    let job = AutomationJobBuilder::default().logs(vec![line(1, "job created")]).build();

    journal.seed(&job);
    journal.set_status(&job.id, JobStatus::Running);
    journal.seed(&job);

    assert_eq!(journal.status(&job.id), Some(JobStatus::Running));
    assert_eq!(journal.lines(&job.id).unwrap(), vec![line(1, "job created")]);
}

#[test]
fn untracked_jobs_are_ignored() {
    let journal = JobJournal::new();
    let id = JobId::from("job-ghost");

    journal.append(&id, line(1, "lost"));
    journal.set_status(&id, JobStatus::Failed);

    assert!(!journal.contains(&id));
    assert_eq!(journal.status(&id), None);
    assert_eq!(journal.read_from(&id, 0), None);
}

#[test]
fn read_from_returns_the_tail() {
    let journal = JobJournal::new();
    let job = AutomationJobBuilder::default().build();
    journal.seed(&job);
    for (i, msg) in ["a", "b", "c"].iter().enumerate() {
        journal.append(&job.id, line(i as u64, msg));
    }

    let (tail, status) = journal.read_from(&job.id, 1).unwrap();
    assert_eq!(tail, vec![line(1, "b"), line(2, "c")]);
    assert_eq!(status, JobStatus::Pending);
    assert!(journal.read_from(&job.id, 3).unwrap().0.is_empty());
    assert!(journal.read_from(&job.id, 10).unwrap().0.is_empty());
}

#[test]
fn remove_forgets_the_job() {
    let journal = JobJournal::new();
    let job = AutomationJobBuilder::default().build();
    journal.seed(&job);
    journal.remove(&job.id);
    assert!(!journal.contains(&job.id));
}

fn finished(id: &str) -> AutomationJob {
    AutomationJobBuilder::default().id(id).status(JobStatus::Completed).build()
}

#[test]
fn retired_jobs_beyond_the_limit_are_evicted_oldest_first() {
    let journal = JobJournal::with_retention(2);
    for id in ["job-1", "job-2", "job-3"] {
        journal.seed(&finished(id));
        journal.retire(&JobId::from(id));
    }

    assert!(!journal.contains(&JobId::from("job-1")));
    assert!(journal.contains(&JobId::from("job-2")));
    assert!(journal.contains(&JobId::from("job-3")));
    assert_eq!(journal.len(), 2);
}

#[test]
fn active_jobs_are_never_retired() {
    let journal = JobJournal::with_retention(0);
    let job = AutomationJobBuilder::default().id("job-live").status(JobStatus::Running).build();
    journal.seed(&job);

    journal.retire(&job.id);

    assert_eq!(journal.status(&job.id), Some(JobStatus::Running));
}

#[test]
fn retried_job_survives_its_old_retirement() {
    let journal = JobJournal::with_retention(1);
    let job = finished("job-retry");
    journal.seed(&job);
    journal.retire(&job.id);
    journal.set_status(&job.id, JobStatus::Pending);

    journal.seed(&finished("job-other"));
    journal.retire(&JobId::from("job-other"));

    assert_eq!(journal.status(&job.id), Some(JobStatus::Pending));
}

#[test]
fn zero_retention_evicts_on_retire() {
    let journal = JobJournal::with_retention(0);
    let job = finished("job-done");
    journal.seed(&job);

    journal.retire(&job.id);

    assert!(journal.is_empty());
}
