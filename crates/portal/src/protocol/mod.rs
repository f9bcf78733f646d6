// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Portal interaction protocol.
//!
//! Two cooperating step sequences:
//!
//! ```text
//! authenticate ──▶ reach_application          (login gateway, services directory)
//! fill_deduction ──▶ submit                   (deduction form inside the application)
//! ```
//!
//! Every step performs one browser action, captures a full-page screenshot
//! through the [`StepRecorder`], and logs a line. Steps run strictly in order;
//! the first failure ends the sequence.

mod deduction;
mod login;

pub use deduction::{FilledForm, SubmitOutcome};

use crate::mapping::MappingError;
use crate::page::{PageError, PortalPage};
use crate::recorder::{RecordError, StepRecorder};
use crate::selectors::{PortalSelectors, PORTAL};
use dp_core::ScreenshotArtifact;
use std::time::Duration;
use thiserror::Error;

/// Pause after choosing a category, while the portal renders the fields
/// that depend on it.
pub const DEFAULT_DEPENDENT_FIELDS_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("anti-automation challenge detected on the login page")]
    ChallengeDetected,
    #[error("portal rejected the login: {0}")]
    LoginRejected(String),
    #[error("still on the login page after submitting credentials")]
    StillOnLoginPage,
    #[error("application link not found")]
    ApplicationNotFound,
    #[error("expected page element missing: {0}")]
    ElementMissing(String),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error("portal reported an error: {0}")]
    PortalRejected(String),
    #[error(transparent)]
    Page(PageError),
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl ProtocolError {
    /// Challenge failures are not worth retrying right away.
    pub fn is_challenge(&self) -> bool {
        matches!(self, ProtocolError::ChallengeDetected)
    }
}

impl From<PageError> for ProtocolError {
    fn from(e: PageError) -> Self {
        match e {
            PageError::ElementNotFound(what) => ProtocolError::ElementMissing(what),
            other => ProtocolError::Page(other),
        }
    }
}

/// Drives the portal through its step sequences.
#[derive(Debug, Clone)]
pub struct PortalProtocol {
    selectors: PortalSelectors,
    dependent_fields_delay: Duration,
}

impl Default for PortalProtocol {
    fn default() -> Self {
        Self::new(PORTAL)
    }
}

impl PortalProtocol {
    pub fn new(selectors: PortalSelectors) -> Self {
        Self { selectors, dependent_fields_delay: DEFAULT_DEPENDENT_FIELDS_DELAY }
    }

    pub fn with_dependent_fields_delay(mut self, delay: Duration) -> Self {
        self.dependent_fields_delay = delay;
        self
    }

    pub fn selectors(&self) -> &PortalSelectors {
        &self.selectors
    }

    /// Screenshot the page and hand it to the recorder.
    async fn capture<P, R>(
        &self,
        page: &P,
        recorder: &R,
        slug: &str,
        label: &str,
    ) -> Result<ScreenshotArtifact, ProtocolError>
    where
        P: PortalPage + ?Sized,
        R: StepRecorder + ?Sized,
    {
        let png = page.screenshot().await?;
        let artifact = recorder.save_screenshot(slug, label, png).await?;
        tracing::debug!(step = artifact.step, slug, "captured step screenshot");
        Ok(artifact)
    }
}

#[cfg(test)]
#[path = "../protocol_tests/mod.rs"]
mod tests;
