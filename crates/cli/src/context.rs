// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring of the production orchestrator.

use crate::env;
use crate::output::OutputFormat;
use dp_adapters::{ChromiumAdapter, CommandDecryptor};
use dp_core::SystemClock;
use dp_engine::{Orchestrator, OrchestratorDeps};
use dp_storage::MemoryRepository;
use std::path::PathBuf;

pub type App = Orchestrator<ChromiumAdapter, MemoryRepository, CommandDecryptor, SystemClock>;

pub struct Context {
    pub state_dir: PathBuf,
    pub repo: MemoryRepository,
    pub orchestrator: App,
    pub format: OutputFormat,
}

impl Context {
    /// Open the repository snapshot and build the orchestrator. Runs left
    /// `RUNNING` by an earlier process are failed here.
    pub async fn open(state_dir: PathBuf, format: OutputFormat) -> anyhow::Result<Self> {
        let repo = MemoryRepository::open(env::repository_path(&state_dir))?;
        let decryptor = match env::decrypt_command() {
            Some(command) => CommandDecryptor::new(command),
            None => CommandDecryptor::unconfigured(),
        };
        let orchestrator = Orchestrator::new(
            OrchestratorDeps {
                browser: ChromiumAdapter::new(env::chromium_config()),
                repository: repo.clone(),
                decryptor,
            },
            SystemClock,
            env::engine_config(&state_dir),
        );

        match orchestrator.reconcile().await {
            Ok(0) => {}
            Ok(n) => tracing::warn!(count = n, "failed jobs interrupted by a previous process"),
            Err(e) => tracing::warn!(error = %e, "startup reconciliation failed"),
        }
        Ok(Self { state_dir, repo, orchestrator, format })
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        env::artifacts_dir(&self.state_dir)
    }

    pub async fn close(&self) {
        self.orchestrator.shutdown().await;
    }
}
