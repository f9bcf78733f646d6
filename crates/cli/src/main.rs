// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dp`: run and inspect deduction portal automation jobs.

mod color;
mod commands;
mod context;
mod env;
mod exit_error;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{job, record, user};
use context::Context;
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "dp", version, about = "Deduction portal automation", styles = color::styles())]
struct Cli {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Automation jobs
    Job(job::JobArgs),
    /// Deduction records
    Record(record::RecordArgs),
    /// User preferences and credentials
    User(user::UserArgs),
}

fn main() {
    let cli = Cli::parse();
    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|rt| rt.block_on(run(cli)));

    if let Err(e) = result {
        let code = match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("error: {}", exit.message);
                exit.code
            }
            None => {
                eprintln!("error: {:#}", e);
                exit_error::FAILURE
            }
        };
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let state_dir = env::state_dir()?;
    let _log_guard = logging::init(&state_dir, &env::log_filter())?;
    tracing::debug!(state_dir = %state_dir.display(), "starting");

    let ctx = Context::open(state_dir, cli.output).await?;
    let result = match cli.command {
        Commands::Job(args) => job::handle(args.command, &ctx).await,
        Commands::Record(args) => record::handle(args.command, &ctx).await,
        Commands::User(args) => user::handle(args.command, &ctx).await,
    };
    ctx.close().await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }
    result
}
