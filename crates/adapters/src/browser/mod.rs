// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Browser adapters
//!
//! One shared browser process with an explicit lifecycle, and isolated
//! per-user sessions carved out of it.
//!
//! ```text
//! BrowserAdapter   - the shared process (start, is_alive, stop)
//!      │
//!      └── BrowserSession  - isolated cookies/storage, fixed locale/timezone/viewport
//!               │
//!               └── Page   - one tab, optionally recorded into a video directory
//! ```

mod chromium;

pub use chromium::{ChromiumAdapter, ChromiumConfig, ChromiumPage, ChromiumSession};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BrowserCall, FakeBrowserAdapter, FakeSession};

use async_trait::async_trait;
use dp_portal::PortalPage;
use std::path::Path;
use thiserror::Error;

/// Errors from browser adapter operations
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),
    #[error("browser is not running")]
    NotRunning,
    #[error("session error: {0}")]
    Session(String),
    #[error("page error: {0}")]
    Page(String),
    #[error("recording error: {0}")]
    Recording(String),
}

/// Fixed emulation settings applied to every page of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub locale: String,
    pub timezone: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            locale: "pt-BR".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            viewport_width: 1366,
            viewport_height: 768,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// The shared browser process.
///
/// Implementations are cheap to clone; clones share the same process.
#[async_trait]
pub trait BrowserAdapter: Clone + Send + Sync + 'static {
    type Session: BrowserSession;

    /// Launch the process if it is not already running.
    async fn start(&self) -> Result<(), BrowserError>;

    /// Whether the process is running and responsive.
    async fn is_alive(&self) -> bool;

    /// Stop the process. Stopping a stopped browser is a no-op.
    async fn stop(&self) -> Result<(), BrowserError>;

    /// Create an isolated session (own cookies and storage).
    async fn new_session(&self, options: &SessionOptions) -> Result<Self::Session, BrowserError>;
}

/// An isolated browsing context bound to one user.
#[async_trait]
pub trait BrowserSession: Send + Sync + 'static {
    type Page: PortalPage + 'static;

    /// Open a tab. With `video_dir`, the tab is recorded into a raw file there
    /// until it closes.
    async fn open_page(&self, video_dir: Option<&Path>) -> Result<Self::Page, BrowserError>;

    /// Close every tab and discard the context.
    async fn close(&self) -> Result<(), BrowserError>;
}
