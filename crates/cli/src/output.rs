// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::color;
use clap::ValueEnum;
use dp_core::{format_elapsed_ms, format_utc, AutomationJob, ScreenshotArtifact};
use serde::Serialize;
use std::io::Write;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render as JSON when `format` is `Json`, otherwise call `text_fn`.
pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    data: &T,
    text_fn: impl FnOnce(),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => text_fn(),
    }
    Ok(())
}

/// Render a list as text or JSON. Handles the empty case.
pub fn handle_list<T: Serialize>(
    format: OutputFormat,
    items: &[T],
    empty_msg: &str,
    render_text: impl FnOnce(&[T], &mut dyn Write),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
        OutputFormat::Text if items.is_empty() => println!("{}", empty_msg),
        OutputFormat::Text => render_text(items, &mut std::io::stdout()),
    }
    Ok(())
}

/// How long a job ran, or has been running as of `now_ms`.
pub fn format_duration(job: &AutomationJob, now_ms: u64) -> String {
    match job.started_at_ms {
        Some(start) => format_elapsed_ms(job.completed_at_ms.unwrap_or(now_ms).saturating_sub(start)),
        None => "-".to_string(),
    }
}

/// One row per job: id, kind, status, attempts, user.
pub fn write_job_rows(jobs: &[AutomationJob], out: &mut dyn Write) {
    let _ = writeln!(out, "{:<26} {:<18} {:<22} {:>3}  USER", "ID", "KIND", "STATUS", "TRY");
    for job in jobs {
        let _ = writeln!(
            out,
            "{:<26} {:<18} {:<22} {:>3}  {}",
            job.id.as_str(),
            job.kind,
            job.status,
            job.attempts,
            job.user_id
        );
    }
}

/// Multi-line detail view of one job.
pub fn write_job_detail(job: &AutomationJob, now_ms: u64, out: &mut dyn Write) {
    let _ = writeln!(out, "{} {}", color::header("Job"), job.id);
    let _ = writeln!(out, "  status:    {}", color::status(job.status));
    let _ = writeln!(out, "  kind:      {}", job.kind);
    let _ = writeln!(out, "  user:      {}", job.user_id);
    if let Some(record) = &job.record_id {
        let _ = writeln!(out, "  record:    {}", record);
    }
    let _ = writeln!(out, "  attempts:  {}", job.attempts);
    let _ = writeln!(out, "  created:   {}", format_utc(job.created_at_ms));
    let _ = writeln!(out, "  duration:  {}", format_duration(job, now_ms));
    if let Some(error) = &job.error {
        let _ = writeln!(out, "  error:     {}", error);
    }
    if job.challenge_detected {
        let _ = writeln!(out, "  {}", color::context("portal showed an anti-automation challenge"));
    }
    if let Some(shot) = &job.screenshot {
        let _ = writeln!(out, "  preview:   {}", shot);
    }
}

pub fn write_screenshots(shots: &[ScreenshotArtifact], out: &mut dyn Write) {
    for shot in shots {
        let _ = writeln!(out, "  {:<34} {}", shot.filename(), color::context(&shot.label));
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
