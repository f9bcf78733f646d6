// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Page capability abstraction.
//!
//! The protocol only needs a handful of things from a browser tab: navigate,
//! check whether an element is there, read its text, fill it, click it, pick
//! an option by label, and wait for the page to go quiet. Anything that can do
//! those can be driven by the protocol, including the scripted fake used in
//! tests.

use crate::selectors::Locator;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from page operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("element not found: {0}")]
    ElementNotFound(String),
    #[error("no option '{label}' in {locator}")]
    OptionNotFound { locator: String, label: String },
    #[error("timed out waiting for {0}")]
    Timeout(String),
    #[error("page script failed: {0}")]
    Script(String),
    #[error("screenshot failed: {0}")]
    Capture(String),
    #[error("page is closed")]
    Closed,
}

impl PageError {
    pub fn element_not_found(locator: Locator) -> Self {
        PageError::ElementNotFound(locator.to_string())
    }
}

/// Outcome of a presence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Found,
    NotFound,
}

impl Presence {
    pub fn is_found(self) -> bool {
        matches!(self, Presence::Found)
    }
}

impl From<bool> for Presence {
    fn from(found: bool) -> Self {
        if found {
            Presence::Found
        } else {
            Presence::NotFound
        }
    }
}

/// A single browser tab the protocol can drive.
#[async_trait]
pub trait PortalPage: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), PageError>;

    /// Whether an element matching `locator` is currently attached and visible.
    async fn find(&self, locator: Locator) -> Result<Presence, PageError>;

    /// Trimmed text content of the first match, `None` when absent.
    async fn text(&self, locator: Locator) -> Result<Option<String>, PageError>;

    async fn fill(&self, locator: Locator, value: &str) -> Result<(), PageError>;

    async fn click(&self, locator: Locator) -> Result<(), PageError>;

    /// Select the option whose visible label equals `label` exactly.
    async fn select_option(&self, locator: Locator, label: &str) -> Result<(), PageError>;

    /// Wait until navigation and network activity triggered by the last action settle.
    async fn wait_for_settle(&self) -> Result<(), PageError>;

    /// Fixed pause, used where the portal renders dependent fields lazily.
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn url(&self) -> Result<String, PageError>;

    /// Full-page PNG.
    async fn screenshot(&self) -> Result<Vec<u8>, PageError>;

    async fn close(&self) -> Result<(), PageError>;
}
