// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sink for what the protocol observes while it runs.

use async_trait::async_trait;
use dp_core::ScreenshotArtifact;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to record step: {0}")]
pub struct RecordError(pub String);

/// Receives screenshots and progress messages from protocol steps.
///
/// Step numbering belongs to the recorder: the protocol only names each
/// capture, the recorder decides its position in the job's sequence.
#[async_trait]
pub trait StepRecorder: Send + Sync {
    async fn save_screenshot(
        &self,
        slug: &str,
        label: &str,
        png: Vec<u8>,
    ) -> Result<ScreenshotArtifact, RecordError>;

    /// Append a human-readable progress line. Never fails.
    fn log(&self, message: &str);
}
