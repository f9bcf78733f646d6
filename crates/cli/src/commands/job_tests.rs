// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::Parser;

#[derive(Parser)]
struct TestCli {
    #[command(subcommand)]
    command: JobCommand,
}

#[test]
fn kind_defaults_to_submit() {
    let cli = TestCli::try_parse_from(["dp", "create", "--user", "usr-1", "--record", "rec-1"])
        .unwrap();
    match cli.command {
        JobCommand::Create { user, record, kind } => {
            assert_eq!(user, "usr-1");
            assert_eq!(record.as_deref(), Some("rec-1"));
            assert_eq!(JobKind::from(kind), JobKind::SubmitDeduction);
        }
        _ => panic!("expected create"),
    }
}

#[test]
fn verify_kind_needs_no_record() {
    let cli = TestCli::try_parse_from(["dp", "create", "--user", "usr-1", "--kind", "verify"])
        .unwrap();
    assert!(matches!(
        cli.command,
        JobCommand::Create { record: None, kind: KindArg::Verify, .. }
    ));
}

#[test]
fn process_accepts_short_follow() {
    let cli = TestCli::try_parse_from(["dp", "process", "job-1", "-f"]).unwrap();
    assert!(matches!(cli.command, JobCommand::Process { follow: true, .. }));
}

#[yare::parameterized(
    pending   = { JobStatus::Pending, false },
    running   = { JobStatus::Running, false },
    waiting   = { JobStatus::WaitingConfirmation, true },
    completed = { JobStatus::Completed, true },
    failed    = { JobStatus::Failed, true },
    cancelled = { JobStatus::Cancelled, true },
)]
fn settled_statuses(status: JobStatus, settled: bool) {
    assert_eq!(is_settled(status), settled);
}

#[tokio::test]
async fn print_from_tracks_the_offset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.log");

    assert_eq!(print_from(&path, 0).await.unwrap(), 0);

    std::fs::write(&path, "2026-01-30T08:14:09Z [job] created\n").unwrap();
    let offset = print_from(&path, 0).await.unwrap();
    assert_eq!(offset, 35);

    assert_eq!(print_from(&path, offset).await.unwrap(), offset);
}

#[tokio::test]
async fn print_from_holds_back_a_half_written_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.log");
    let first = "2026-01-30T08:14:09Z [job] created\n";
    let second = "2026-01-30T08:14:10Z [fill] city Carnê-Leão\n";
    // Cut inside the two-byte "ê"
    let cut = first.len() + second.find('ê').unwrap() + 1;
    let written = [first, second].concat();
    std::fs::write(&path, &written.as_bytes()[..cut]).unwrap();

    let offset = print_from(&path, 0).await.unwrap();
    assert_eq!(offset, first.len());
    assert_eq!(print_from(&path, offset).await.unwrap(), offset);

    std::fs::write(&path, &written).unwrap();
    assert_eq!(print_from(&path, offset).await.unwrap(), written.len());
}

#[tokio::test]
async fn print_rest_tolerates_a_missing_log() {
    let dir = tempfile::tempdir().unwrap();
    print_rest(&dir.path().join("job.log"), 0).await.unwrap();
}
