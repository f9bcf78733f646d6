// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chrome over the DevTools protocol.
//!
//! One `Browser` process with its CDP handler task. Each session is a CDP
//! browser context, so cookies and storage never leak between users.

mod page;
mod recorder;
mod script;

pub use page::ChromiumPage;

use super::{BrowserAdapter, BrowserError, BrowserSession, SessionOptions};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::{BrowserContextId, CloseParams};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetLocaleOverrideParams, SetTimezoneOverrideParams,
    SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use recorder::FrameRecorder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// How long a liveness check may take before the browser counts as hung.
const LIVENESS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ChromiumConfig {
    pub headless: bool,
    /// Chrome binary; discovered on the system when unset.
    pub executable: Option<PathBuf>,
    /// Upper bound for navigation and page-settle waits.
    pub settle_timeout: Duration,
    /// Interval between recorded video frames.
    pub frame_interval: Duration,
    pub no_sandbox: bool,
}

impl Default for ChromiumConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            settle_timeout: Duration::from_secs(15),
            frame_interval: Duration::from_millis(250),
            no_sandbox: false,
        }
    }
}

struct Running {
    browser: Arc<Browser>,
    handler: JoinHandle<()>,
}

/// Shared Chrome process.
#[derive(Clone)]
pub struct ChromiumAdapter {
    config: Arc<ChromiumConfig>,
    running: Arc<Mutex<Option<Running>>>,
}

impl ChromiumAdapter {
    pub fn new(config: ChromiumConfig) -> Self {
        Self { config: Arc::new(config), running: Arc::new(Mutex::new(None)) }
    }

    async fn launch(&self) -> Result<Running, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--lang=pt-BR");
        if !self.config.headless {
            builder = builder.with_head();
        }
        if self.config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.config.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(BrowserError::LaunchFailed)?;

        let (browser, mut handler) =
            Browser::launch(config).await.map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler stopped");
                    break;
                }
            }
        });
        tracing::info!(headless = self.config.headless, "browser started");
        Ok(Running { browser: Arc::new(browser), handler })
    }

    async fn browser(&self) -> Result<Arc<Browser>, BrowserError> {
        self.running
            .lock()
            .await
            .as_ref()
            .map(|r| Arc::clone(&r.browser))
            .ok_or(BrowserError::NotRunning)
    }
}

#[async_trait]
impl BrowserAdapter for ChromiumAdapter {
    type Session = ChromiumSession;

    async fn start(&self) -> Result<(), BrowserError> {
        let mut running = self.running.lock().await;
        if running.as_ref().is_some_and(|r| !r.handler.is_finished()) {
            return Ok(());
        }
        if let Some(stale) = running.take() {
            stale.handler.abort();
        }
        *running = Some(self.launch().await?);
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        let browser = {
            let running = self.running.lock().await;
            match running.as_ref() {
                Some(r) if !r.handler.is_finished() => Arc::clone(&r.browser),
                _ => return false,
            }
        };
        matches!(tokio::time::timeout(LIVENESS_TIMEOUT, browser.version()).await, Ok(Ok(_)))
    }

    async fn stop(&self) -> Result<(), BrowserError> {
        let Some(running) = self.running.lock().await.take() else {
            return Ok(());
        };
        let closed = tokio::time::timeout(LIVENESS_TIMEOUT, running.browser.execute(CloseParams::default()))
            .await;
        running.handler.abort();
        match closed {
            Ok(Ok(_)) => {
                tracing::info!("browser stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(BrowserError::Session(e.to_string())),
            Err(_) => Err(BrowserError::Session("browser did not close in time".to_string())),
        }
    }

    async fn new_session(&self, options: &SessionOptions) -> Result<ChromiumSession, BrowserError> {
        let browser = self.browser().await?;
        let created = browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))?;
        Ok(ChromiumSession {
            browser,
            context: created.result.browser_context_id.clone(),
            options: options.clone(),
            config: Arc::clone(&self.config),
        })
    }
}

/// One CDP browser context.
pub struct ChromiumSession {
    browser: Arc<Browser>,
    context: BrowserContextId,
    options: SessionOptions,
    config: Arc<ChromiumConfig>,
}

impl ChromiumSession {
    async fn emulate(&self, page: &Page) -> Result<(), BrowserError> {
        let opts = &self.options;
        let err = |e: chromiumoxide::error::CdpError| BrowserError::Page(e.to_string());

        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(opts.user_agent.clone())
            .accept_language(opts.locale.clone())
            .build()
            .map_err(BrowserError::Page)?;
        page.execute(user_agent).await.map_err(err)?;
        page.execute(SetTimezoneOverrideParams::new(opts.timezone.clone())).await.map_err(err)?;
        page.execute(SetLocaleOverrideParams { locale: Some(opts.locale.clone()) })
            .await
            .map_err(err)?;
        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(opts.viewport_width),
            i64::from(opts.viewport_height),
            1.0,
            false,
        ))
        .await
        .map_err(err)?;
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    type Page = ChromiumPage;

    async fn open_page(&self, video_dir: Option<&Path>) -> Result<ChromiumPage, BrowserError> {
        let mut target = CreateTargetParams::new("about:blank");
        target.browser_context_id = Some(self.context.clone());
        let page =
            self.browser.new_page(target).await.map_err(|e| BrowserError::Page(e.to_string()))?;
        self.emulate(&page).await?;

        let recorder = match video_dir {
            Some(dir) => Some(
                FrameRecorder::start(page.clone(), dir, self.config.frame_interval)
                    .await
                    .map_err(|e| BrowserError::Recording(e.to_string()))?,
            ),
            None => None,
        };
        Ok(ChromiumPage::new(page, self.config.settle_timeout, recorder))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.browser
            .execute(DisposeBrowserContextParams::new(self.context.clone()))
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))?;
        Ok(())
    }
}
