// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake browser adapter for testing

use super::{BrowserAdapter, BrowserError, BrowserSession, SessionOptions};
use async_trait::async_trait;
use dp_portal::FakePage;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded browser call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserCall {
    Start,
    Stop,
    NewSession { session: u32 },
    OpenPage { session: u32, video_dir: Option<PathBuf> },
    CloseSession { session: u32 },
}

type PageFactory = Arc<dyn Fn() -> FakePage + Send + Sync>;

struct FakeBrowserState {
    running: bool,
    starts: u32,
    next_session: u32,
    open_sessions: Vec<u32>,
    fail_start: bool,
    fail_new_session: bool,
    fail_close: bool,
    write_video: bool,
    page_factory: PageFactory,
    pages: Vec<FakePage>,
    calls: Vec<BrowserCall>,
}

/// Fake browser whose pages come from a factory (default: [`FakePage::happy_path`]).
#[derive(Clone)]
pub struct FakeBrowserAdapter {
    inner: Arc<Mutex<FakeBrowserState>>,
}

impl Default for FakeBrowserAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeBrowserState {
                running: false,
                starts: 0,
                next_session: 1,
                open_sessions: Vec::new(),
                fail_start: false,
                fail_new_session: false,
                fail_close: false,
                write_video: true,
                page_factory: Arc::new(FakePage::happy_path),
                pages: Vec::new(),
                calls: Vec::new(),
            })),
        }
    }
}

impl FakeBrowserAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every new page with `factory`.
    pub fn with_pages(self, factory: impl Fn() -> FakePage + Send + Sync + 'static) -> Self {
        self.inner.lock().page_factory = Arc::new(factory);
        self
    }

    pub fn fail_start(self) -> Self {
        self.inner.lock().fail_start = true;
        self
    }

    pub fn fail_new_session(self) -> Self {
        self.inner.lock().fail_new_session = true;
        self
    }

    /// Make every session close report an error (the session is still gone).
    pub fn fail_close(self) -> Self {
        self.inner.lock().fail_close = true;
        self
    }

    /// Do not write a raw recording when a page opens with a video directory.
    pub fn without_video(self) -> Self {
        self.inner.lock().write_video = false;
        self
    }

    /// Simulate the browser process dying.
    pub fn crash(&self) {
        self.inner.lock().running = false;
    }

    // ── Inspection ────────────────────────────────────────────────────

    pub fn calls(&self) -> Vec<BrowserCall> {
        self.inner.lock().calls.clone()
    }

    pub fn starts(&self) -> u32 {
        self.inner.lock().starts
    }

    pub fn sessions_created(&self) -> u32 {
        self.inner.lock().next_session - 1
    }

    pub fn open_sessions(&self) -> usize {
        self.inner.lock().open_sessions.len()
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    /// Pages opened so far, oldest first.
    pub fn pages(&self) -> Vec<FakePage> {
        self.inner.lock().pages.clone()
    }

    pub fn last_page(&self) -> Option<FakePage> {
        self.inner.lock().pages.last().cloned()
    }
}

#[async_trait]
impl BrowserAdapter for FakeBrowserAdapter {
    type Session = FakeSession;

    async fn start(&self) -> Result<(), BrowserError> {
        let mut state = self.inner.lock();
        state.calls.push(BrowserCall::Start);
        if state.fail_start {
            return Err(BrowserError::LaunchFailed("chrome binary not found".to_string()));
        }
        if !state.running {
            state.running = true;
            state.starts += 1;
            // Contexts do not survive their process
            state.open_sessions.clear();
        }
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        self.inner.lock().running
    }

    async fn stop(&self) -> Result<(), BrowserError> {
        let mut state = self.inner.lock();
        state.calls.push(BrowserCall::Stop);
        state.running = false;
        state.open_sessions.clear();
        Ok(())
    }

    async fn new_session(&self, _options: &SessionOptions) -> Result<FakeSession, BrowserError> {
        let mut state = self.inner.lock();
        if !state.running {
            return Err(BrowserError::NotRunning);
        }
        if state.fail_new_session {
            return Err(BrowserError::Session("context limit reached".to_string()));
        }
        let id = state.next_session;
        state.next_session += 1;
        state.open_sessions.push(id);
        state.calls.push(BrowserCall::NewSession { session: id });
        Ok(FakeSession { id, browser: Arc::clone(&self.inner) })
    }
}

/// Session handed out by [`FakeBrowserAdapter`].
pub struct FakeSession {
    id: u32,
    browser: Arc<Mutex<FakeBrowserState>>,
}

impl FakeSession {
    pub fn id(&self) -> u32 {
        self.id
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Page = FakePage;

    async fn open_page(&self, video_dir: Option<&Path>) -> Result<FakePage, BrowserError> {
        let (page, write_video) = {
            let mut state = self.browser.lock();
            state.calls.push(BrowserCall::OpenPage {
                session: self.id,
                video_dir: video_dir.map(Path::to_path_buf),
            });
            let page = (state.page_factory)();
            state.pages.push(page.clone());
            (page, state.write_video)
        };
        if let (Some(dir), true) = (video_dir, write_video) {
            std::fs::create_dir_all(dir).map_err(|e| BrowserError::Recording(e.to_string()))?;
            let raw = dir.join(format!("raw-{}.webm", self.id));
            std::fs::write(&raw, b"\x1a\x45\xdf\xa3fake-webm")
                .map_err(|e| BrowserError::Recording(e.to_string()))?;
        }
        Ok(page)
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let mut state = self.browser.lock();
        state.calls.push(BrowserCall::CloseSession { session: self.id });
        state.open_sessions.retain(|id| *id != self.id);
        if state.fail_close {
            return Err(BrowserError::Session("target crashed while closing".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
