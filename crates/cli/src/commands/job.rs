// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dp job` - Job management commands

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

use dp_core::{Clock, JobId, JobKind, JobStatus, RecordId, ScreenshotArtifact, SystemClock, UserId};
use dp_engine::{JobLogger, StreamEvent, TaskHandle};
use dp_storage::{MemoryRepository, Repository};

use crate::color;
use crate::context::Context;
use crate::env;
use crate::exit_error::{self, ExitError};
use crate::output::{format_or_json, handle_list, write_job_detail, write_job_rows, write_screenshots};

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// Create a pending job
    Create {
        /// Owner of the job
        #[arg(long)]
        user: String,

        /// Deduction record to submit (required for `submit`)
        #[arg(long)]
        record: Option<String>,

        #[arg(long, value_enum, default_value_t = KindArg::Submit)]
        kind: KindArg,
    },
    /// Run a pending job, or retry a failed one, and wait for it
    Process {
        id: String,

        /// Print log lines as the run produces them
        #[arg(long, short = 'f')]
        follow: bool,
    },
    /// Submit a job that waits for confirmation
    Confirm {
        id: String,

        #[arg(long, short = 'f')]
        follow: bool,
    },
    /// Cancel a job that has not finished
    Cancel { id: String },
    /// Delete a finished job (its files stay on disk)
    Delete { id: String },
    /// List all jobs
    List,
    /// Show a job
    Status { id: String },
    /// Show a job's activity log
    Logs {
        id: String,

        /// Keep printing until the job stops
        #[arg(long, short = 'f')]
        follow: bool,
    },
    /// List screenshots and recordings of a job
    Artifacts { id: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Fill and submit a deduction record
    Submit,
    /// Only check that the stored credentials log in
    Verify,
}

impl From<KindArg> for JobKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Submit => JobKind::SubmitDeduction,
            KindArg::Verify => JobKind::VerifyLogin,
        }
    }
}

#[derive(Serialize)]
struct ArtifactListing {
    directory: String,
    screenshots: Vec<ScreenshotArtifact>,
    videos: Vec<String>,
}

pub async fn handle(command: JobCommand, ctx: &Context) -> Result<()> {
    let o = &ctx.orchestrator;
    match command {
        JobCommand::Create { user, record, kind } => {
            let job = o
                .create_job(&UserId::from(user), kind.into(), record.map(RecordId::from))
                .await
                .map_err(ExitError::from)?;
            format_or_json(ctx.format, &job, || println!("{}", job.id))?;
        }
        JobCommand::Process { id, follow } => {
            let id = JobId::from(id);
            let handle = o.process(&id).await.map_err(ExitError::from)?;
            wait_and_report(ctx, &id, handle, follow).await?;
        }
        JobCommand::Confirm { id, follow } => {
            let id = JobId::from(id);
            let handle = o.confirm(&id).await.map_err(ExitError::from)?;
            wait_and_report(ctx, &id, handle, follow).await?;
        }
        JobCommand::Cancel { id } => {
            let job = o.cancel(&JobId::from(id)).await.map_err(ExitError::from)?;
            format_or_json(ctx.format, &job, || {
                println!("{} {}", job.id, color::status(job.status))
            })?;
        }
        JobCommand::Delete { id } => {
            let id = JobId::from(id);
            o.delete(&id).await.map_err(ExitError::from)?;
            println!("deleted {}", id);
        }
        JobCommand::List => {
            let jobs = o.list_jobs().await.map_err(ExitError::from)?;
            handle_list(ctx.format, &jobs, "No jobs", |items, out| write_job_rows(items, out))?;
        }
        JobCommand::Status { id } => {
            let job = o.get_job(&JobId::from(id)).await.map_err(ExitError::from)?;
            let now = SystemClock.epoch_ms();
            format_or_json(ctx.format, &job, || {
                write_job_detail(&job, now, &mut std::io::stdout())
            })?;
        }
        JobCommand::Logs { id, follow } => {
            let id = JobId::from(id);
            if follow {
                tail_job_log(ctx, &id).await?;
            } else {
                let lines = o.get_logs(&id).await.map_err(ExitError::from)?;
                format_or_json(ctx.format, &lines, || {
                    for line in &lines {
                        println!("{}", line);
                    }
                })?;
            }
        }
        JobCommand::Artifacts { id } => {
            let id = JobId::from(id);
            o.get_job(&id).await.map_err(ExitError::from)?;
            let listing = ArtifactListing {
                directory: ctx.artifacts_dir().join(id.as_str()).display().to_string(),
                screenshots: o.get_screenshots(&id).await.map_err(ExitError::from)?,
                videos: o.get_video_filenames(&id).await.map_err(ExitError::from)?,
            };
            format_or_json(ctx.format, &listing, || {
                println!("{} {}", color::header("Artifacts"), listing.directory);
                write_screenshots(&listing.screenshots, &mut std::io::stdout());
                for video in &listing.videos {
                    println!("  video/{}", video);
                }
            })?;
        }
    }
    Ok(())
}

/// Wait for a queued run, optionally streaming its log, then print the job.
/// A run that ends `FAILED` exits non-zero.
async fn wait_and_report(
    ctx: &Context,
    id: &JobId,
    handle: TaskHandle<()>,
    follow: bool,
) -> Result<()> {
    let o = &ctx.orchestrator;
    if follow {
        let mut events = o.follow(id).await.map_err(ExitError::from)?;
        let mut printed = 0;
        let run = handle.join();
        tokio::pin!(run);
        loop {
            tokio::select! {
                result = &mut run => {
                    result?;
                    break;
                }
                Some(event) = events.recv() => {
                    if let StreamEvent::Line(line) = event {
                        println!("{}", line);
                        printed += 1;
                    }
                }
            }
        }
        // Lines the follower had not picked up yet
        for line in o.get_logs(id).await.map_err(ExitError::from)?.iter().skip(printed) {
            println!("{}", line);
        }
    } else {
        handle.join().await?;
    }

    let job = o.get_job(id).await.map_err(ExitError::from)?;
    let now = SystemClock.epoch_ms();
    format_or_json(ctx.format, &job, || write_job_detail(&job, now, &mut std::io::stdout()))?;
    if job.status == JobStatus::Failed {
        let reason = job.error.as_deref().unwrap_or("automation failed");
        return Err(ExitError::new(exit_error::FAILURE, format!("job failed: {}", reason)).into());
    }
    Ok(())
}

/// Follow `job.log` across processes until the job stops moving.
async fn tail_job_log(ctx: &Context, id: &JobId) -> Result<()> {
    let path = JobLogger::new(ctx.artifacts_dir()).path_for(id.as_str());
    let snapshot = env::repository_path(&ctx.state_dir);
    let mut offset = 0;
    let mut ticker = tokio::time::interval(env::log_poll_interval());
    loop {
        ticker.tick().await;
        offset = print_from(&path, offset).await?;

        // Another process owns the run; reread its snapshot for the status
        let status = MemoryRepository::open(&snapshot)?.get_job(id).await?.map(|job| job.status);
        match status {
            None => {
                let message = format!("job not found: {}", id);
                return Err(ExitError::new(exit_error::NOT_FOUND, message).into());
            }
            Some(status) if is_settled(status) => {
                let offset = print_from(&path, offset).await?;
                print_rest(&path, offset).await?;
                println!("{}", color::status(status));
                return Ok(());
            }
            Some(_) => {}
        }
    }
}

/// Whether a job will not move again without a new command.
pub(crate) fn is_settled(status: JobStatus) -> bool {
    status.is_terminal() || status == JobStatus::WaitingConfirmation
}

/// Print the complete lines past `offset`. Returns the offset just after
/// the last newline printed, so a line still being written (possibly cut
/// inside a multi-byte character) waits for the next poll.
async fn print_from(path: &Path, offset: usize) -> Result<usize> {
    let Some(bytes) = read_log(path).await? else {
        return Ok(offset);
    };
    let pending = bytes.get(offset..).unwrap_or_default();
    let Some(last_newline) = pending.iter().rposition(|b| *b == b'\n') else {
        return Ok(offset);
    };
    let complete = &pending[..=last_newline];
    print!("{}", String::from_utf8_lossy(complete));
    Ok(offset + complete.len())
}

/// Print whatever is left past `offset`, complete or not.
async fn print_rest(path: &Path, offset: usize) -> Result<()> {
    if let Some(bytes) = read_log(path).await? {
        if let Some(rest) = bytes.get(offset..).filter(|rest| !rest.is_empty()) {
            println!("{}", String::from_utf8_lossy(rest));
        }
    }
    Ok(())
}

async fn read_log(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
