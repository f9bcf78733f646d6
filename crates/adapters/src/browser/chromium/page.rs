// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::recorder::FrameRecorder;
use super::script;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use dp_portal::{Locator, PageError, PortalPage, Presence};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Poll interval while waiting for `document.readyState`.
const READY_POLL: Duration = Duration::from_millis(100);
/// Quiet period after the document is ready, for late XHR-driven rendering.
const QUIET_PERIOD: Duration = Duration::from_millis(300);

/// A CDP-driven tab.
pub struct ChromiumPage {
    page: Page,
    settle_timeout: Duration,
    recorder: Mutex<Option<FrameRecorder>>,
}

impl ChromiumPage {
    pub(super) fn new(page: Page, settle_timeout: Duration, recorder: Option<FrameRecorder>) -> Self {
        Self { page, settle_timeout, recorder: Mutex::new(recorder) }
    }

    async fn eval<T: DeserializeOwned>(&self, expression: String) -> Result<T, PageError> {
        let result =
            self.page.evaluate(expression).await.map_err(|e| PageError::Script(e.to_string()))?;
        result.into_value::<T>().map_err(|e| PageError::Script(e.to_string()))
    }
}

#[async_trait]
impl PortalPage for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<(), PageError> {
        let navigate = self.page.goto(url);
        match tokio::time::timeout(self.settle_timeout, navigate).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => {
                Err(PageError::Navigation { url: url.to_string(), reason: e.to_string() })
            }
            Err(_) => Err(PageError::Timeout(format!("navigation to {}", url))),
        }
    }

    async fn find(&self, locator: Locator) -> Result<Presence, PageError> {
        let found: bool = self.eval(script::exists(locator)).await?;
        Ok(Presence::from(found))
    }

    async fn text(&self, locator: Locator) -> Result<Option<String>, PageError> {
        let lookup: script::TextLookup = self.eval(script::text(locator)).await?;
        Ok(lookup.found.then_some(lookup.text))
    }

    async fn fill(&self, locator: Locator, value: &str) -> Result<(), PageError> {
        let filled: bool = self.eval(script::fill(locator, value)).await?;
        if filled {
            Ok(())
        } else {
            Err(PageError::element_not_found(locator))
        }
    }

    async fn click(&self, locator: Locator) -> Result<(), PageError> {
        let clicked: bool = self.eval(script::click(locator)).await?;
        if clicked {
            Ok(())
        } else {
            Err(PageError::element_not_found(locator))
        }
    }

    async fn select_option(&self, locator: Locator, label: &str) -> Result<(), PageError> {
        let outcome: String = self.eval(script::select(locator, label)).await?;
        match outcome.as_str() {
            script::SELECTED => Ok(()),
            script::MISSING_OPTION => Err(PageError::OptionNotFound {
                locator: locator.to_string(),
                label: label.to_string(),
            }),
            _ => Err(PageError::element_not_found(locator)),
        }
    }

    async fn wait_for_settle(&self) -> Result<(), PageError> {
        let deadline = Instant::now() + self.settle_timeout;

        // Returns immediately when no navigation is pending
        if tokio::time::timeout(self.settle_timeout, self.page.wait_for_navigation()).await.is_err()
        {
            return Err(PageError::Timeout("navigation to finish".to_string()));
        }

        loop {
            let state: String = self.eval(script::READY_STATE.to_string()).await?;
            if state == "complete" {
                break;
            }
            if Instant::now() >= deadline {
                return Err(PageError::Timeout("page to finish loading".to_string()));
            }
            tokio::time::sleep(READY_POLL).await;
        }

        tokio::time::sleep(QUIET_PERIOD).await;
        Ok(())
    }

    async fn url(&self) -> Result<String, PageError> {
        let url = self.page.url().await.map_err(|e| PageError::Script(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, PageError> {
        let params =
            ScreenshotParams::builder().format(CaptureScreenshotFormat::Png).full_page(true).build();
        self.page.screenshot(params).await.map_err(|e| PageError::Capture(e.to_string()))
    }

    async fn close(&self) -> Result<(), PageError> {
        if let Some(recorder) = self.recorder.lock().await.take() {
            recorder.stop().await;
        }
        self.page.clone().close().await.map_err(|e| PageError::Script(e.to_string()))
    }
}
