// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dp-engine: job orchestration for portal automation
//!
//! - [`queue`]: bounded FIFO execution and per-user browser sessions
//! - [`artifacts`]: screenshots and recordings on disk
//! - [`journal`] and [`stream`]: live status and log following
//! - [`orchestrator`]: the job state machine driving the portal protocol

pub mod artifact_paths;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod job_logger;
pub mod journal;
pub mod orchestrator;
pub mod queue;
pub mod stream;

pub use artifacts::{ArtifactError, ArtifactStore, VideoFile};
pub use config::{EngineConfig, DEFAULT_LOG_POLL_INTERVAL, DEFAULT_MAX_CONCURRENCY};
pub use error::EngineError;
pub use job_logger::JobLogger;
pub use journal::JobJournal;
pub use orchestrator::{Orchestrator, OrchestratorDeps, INTERRUPTED_BY_RESTART};
pub use queue::{ExecutionQueue, QueueError, TaskHandle};
pub use stream::StreamEvent;
