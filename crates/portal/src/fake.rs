// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted page and recorder for tests.
//!
//! [`FakePage`] models the portal as a flat set of visible elements. Actions
//! can be wired to [`Effect`]s (show or hide an element, change its text,
//! navigate) so a test can script how the page reacts.

use crate::mapping;
use crate::page::{PageError, PortalPage, Presence};
use crate::recorder::{RecordError, StepRecorder};
use crate::selectors::{Locator, PortalSelectors, PORTAL};
use async_trait::async_trait;
use dp_core::ScreenshotArtifact;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Minimal PNG signature, enough for anything that sniffs the format.
pub const FAKE_PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Recorded page call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCall {
    Goto(String),
    Find(Locator),
    Text(Locator),
    Fill(Locator, String),
    Click(Locator),
    Select(Locator, String),
    Settle,
    Pause(Duration),
    Url,
    Screenshot,
    Close,
}

/// Reaction to a page action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Show(Locator),
    Hide(Locator),
    SetText(Locator, String),
    Navigate(String),
}

#[derive(Default)]
struct FakePageState {
    url: String,
    visible: HashSet<Locator>,
    texts: HashMap<Locator, String>,
    options: HashMap<Locator, Vec<String>>,
    values: HashMap<Locator, String>,
    on_click: HashMap<Locator, Vec<Effect>>,
    on_fill: HashMap<Locator, Vec<Effect>>,
    on_goto: HashMap<String, Vec<Effect>>,
    fail_screenshots: bool,
    fail_navigation: bool,
    screenshots: u32,
    closed: bool,
    calls: Vec<PageCall>,
}

impl FakePageState {
    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Show(locator) => {
                    self.visible.insert(locator);
                }
                Effect::Hide(locator) => {
                    self.visible.remove(&locator);
                }
                Effect::SetText(locator, text) => {
                    self.texts.insert(locator, text);
                }
                Effect::Navigate(url) => self.url = url,
            }
        }
    }

    fn ensure_open(&self) -> Result<(), PageError> {
        if self.closed {
            Err(PageError::Closed)
        } else {
            Ok(())
        }
    }

    fn ensure_visible(&self, locator: Locator) -> Result<(), PageError> {
        self.ensure_open()?;
        if self.visible.contains(&locator) {
            Ok(())
        } else {
            Err(PageError::element_not_found(locator))
        }
    }
}

/// Fake page for testing the protocol without a browser
#[derive(Clone)]
pub struct FakePage {
    inner: Arc<Mutex<FakePageState>>,
}

impl Default for FakePage {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePage {
    /// Blank page with no elements.
    pub fn new() -> Self {
        let state = FakePageState { url: "about:blank".to_string(), ..Default::default() };
        Self { inner: Arc::new(Mutex::new(state)) }
    }

    /// A portal where every step succeeds and saving shows a success banner.
    pub fn happy_path() -> Self {
        Self::happy_path_for(&PORTAL)
    }

    pub fn happy_path_for(selectors: &PortalSelectors) -> Self {
        let login = &selectors.login;
        let directory = &selectors.directory;
        let form = &selectors.deduction;
        Self::new()
            .with_element(login.identity_input)
            .with_element(login.identity_submit)
            .with_element(login.secret_input)
            .with_element(login.secret_submit)
            .on_click(
                login.secret_submit,
                Effect::Navigate("https://cav.receita.fazenda.gov.br/ecac/home".to_string()),
            )
            .with_element(directory.search_input)
            .with_element(directory.app_link)
            .on_click(
                directory.app_link,
                Effect::Navigate("https://cav.receita.fazenda.gov.br/carne-leao".to_string()),
            )
            .with_element(form.section_link)
            .with_element(form.add_new)
            .with_options(form.category, mapping::category_labels())
            .with_element(form.provider_tax_id)
            .with_options(form.document_type, mapping::document_type_labels())
            .with_element(form.amount)
            .with_element(form.save)
            .on_click(form.save, Effect::Show(form.success_banner))
            .with_text(form.success_banner, "Pagamento salvo com sucesso")
    }

    pub fn with_element(self, locator: Locator) -> Self {
        self.inner.lock().visible.insert(locator);
        self
    }

    pub fn without_element(self, locator: Locator) -> Self {
        self.inner.lock().visible.remove(&locator);
        self
    }

    /// Set the text an element shows once visible. Does not make it visible.
    pub fn with_text(self, locator: Locator, text: impl Into<String>) -> Self {
        self.inner.lock().texts.insert(locator, text.into());
        self
    }

    /// Make a select visible with the given option labels.
    pub fn with_options<I, S>(self, locator: Locator, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = self.inner.lock();
            state.visible.insert(locator);
            state.options.insert(locator, labels.into_iter().map(Into::into).collect());
        }
        self
    }

    pub fn on_click(self, locator: Locator, effect: Effect) -> Self {
        self.inner.lock().on_click.entry(locator).or_default().push(effect);
        self
    }

    /// Replace every reaction to clicking `locator`.
    pub fn replace_on_click(self, locator: Locator, effects: Vec<Effect>) -> Self {
        self.inner.lock().on_click.insert(locator, effects);
        self
    }

    pub fn on_fill(self, locator: Locator, effect: Effect) -> Self {
        self.inner.lock().on_fill.entry(locator).or_default().push(effect);
        self
    }

    pub fn on_goto(self, url: impl Into<String>, effect: Effect) -> Self {
        self.inner.lock().on_goto.entry(url.into()).or_default().push(effect);
        self
    }

    pub fn fail_screenshots(self) -> Self {
        self.inner.lock().fail_screenshots = true;
        self
    }

    pub fn fail_navigation(self) -> Self {
        self.inner.lock().fail_navigation = true;
        self
    }

    // ── Inspection ────────────────────────────────────────────────────

    pub fn calls(&self) -> Vec<PageCall> {
        self.inner.lock().calls.clone()
    }

    pub fn value_of(&self, locator: Locator) -> Option<String> {
        self.inner.lock().values.get(&locator).cloned()
    }

    pub fn current_url(&self) -> String {
        self.inner.lock().url.clone()
    }

    pub fn screenshot_count(&self) -> u32 {
        self.inner.lock().screenshots
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn was_clicked(&self, locator: Locator) -> bool {
        self.inner.lock().calls.iter().any(|c| *c == PageCall::Click(locator))
    }
}

#[async_trait]
impl PortalPage for FakePage {
    async fn goto(&self, url: &str) -> Result<(), PageError> {
        let mut state = self.inner.lock();
        state.calls.push(PageCall::Goto(url.to_string()));
        state.ensure_open()?;
        if state.fail_navigation {
            return Err(PageError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        state.url = url.to_string();
        let effects = state.on_goto.get(url).cloned().unwrap_or_default();
        state.apply(effects);
        Ok(())
    }

    async fn find(&self, locator: Locator) -> Result<Presence, PageError> {
        let mut state = self.inner.lock();
        state.calls.push(PageCall::Find(locator));
        state.ensure_open()?;
        Ok(Presence::from(state.visible.contains(&locator)))
    }

    async fn text(&self, locator: Locator) -> Result<Option<String>, PageError> {
        let mut state = self.inner.lock();
        state.calls.push(PageCall::Text(locator));
        state.ensure_open()?;
        if !state.visible.contains(&locator) {
            return Ok(None);
        }
        Ok(Some(state.texts.get(&locator).cloned().unwrap_or_default()))
    }

    async fn fill(&self, locator: Locator, value: &str) -> Result<(), PageError> {
        let mut state = self.inner.lock();
        state.calls.push(PageCall::Fill(locator, value.to_string()));
        state.ensure_visible(locator)?;
        state.values.insert(locator, value.to_string());
        let effects = state.on_fill.get(&locator).cloned().unwrap_or_default();
        state.apply(effects);
        Ok(())
    }

    async fn click(&self, locator: Locator) -> Result<(), PageError> {
        let mut state = self.inner.lock();
        state.calls.push(PageCall::Click(locator));
        state.ensure_visible(locator)?;
        let effects = state.on_click.get(&locator).cloned().unwrap_or_default();
        state.apply(effects);
        Ok(())
    }

    async fn select_option(&self, locator: Locator, label: &str) -> Result<(), PageError> {
        let mut state = self.inner.lock();
        state.calls.push(PageCall::Select(locator, label.to_string()));
        state.ensure_visible(locator)?;
        let known = state.options.get(&locator).is_some_and(|opts| opts.iter().any(|o| o == label));
        if !known {
            return Err(PageError::OptionNotFound {
                locator: locator.to_string(),
                label: label.to_string(),
            });
        }
        state.values.insert(locator, label.to_string());
        Ok(())
    }

    async fn wait_for_settle(&self) -> Result<(), PageError> {
        let mut state = self.inner.lock();
        state.calls.push(PageCall::Settle);
        state.ensure_open()
    }

    async fn pause(&self, duration: Duration) {
        self.inner.lock().calls.push(PageCall::Pause(duration));
    }

    async fn url(&self) -> Result<String, PageError> {
        let mut state = self.inner.lock();
        state.calls.push(PageCall::Url);
        state.ensure_open()?;
        Ok(state.url.clone())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, PageError> {
        let mut state = self.inner.lock();
        state.calls.push(PageCall::Screenshot);
        state.ensure_open()?;
        if state.fail_screenshots {
            return Err(PageError::Capture("renderer crashed".to_string()));
        }
        state.screenshots += 1;
        let mut png = FAKE_PNG_HEADER.to_vec();
        png.extend_from_slice(&state.screenshots.to_be_bytes());
        Ok(png)
    }

    async fn close(&self) -> Result<(), PageError> {
        let mut state = self.inner.lock();
        state.calls.push(PageCall::Close);
        state.closed = true;
        Ok(())
    }
}

// ── Recorder ──────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeRecorderState {
    screenshots: Vec<ScreenshotArtifact>,
    logs: Vec<String>,
    fail: bool,
}

/// In-memory [`StepRecorder`] numbering steps from 1.
#[derive(Clone, Default)]
pub struct FakeRecorder {
    inner: Arc<Mutex<FakeRecorderState>>,
}

impl FakeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every screenshot.
    pub fn failing() -> Self {
        let recorder = Self::default();
        recorder.inner.lock().fail = true;
        recorder
    }

    pub fn screenshots(&self) -> Vec<ScreenshotArtifact> {
        self.inner.lock().screenshots.clone()
    }

    pub fn slugs(&self) -> Vec<String> {
        self.inner.lock().screenshots.iter().map(|s| s.slug.clone()).collect()
    }

    pub fn logs(&self) -> Vec<String> {
        self.inner.lock().logs.clone()
    }
}

#[async_trait]
impl StepRecorder for FakeRecorder {
    async fn save_screenshot(
        &self,
        slug: &str,
        label: &str,
        _png: Vec<u8>,
    ) -> Result<ScreenshotArtifact, RecordError> {
        let mut state = self.inner.lock();
        if state.fail {
            return Err(RecordError("disk full".to_string()));
        }
        let step = state.screenshots.len() as u32 + 1;
        let artifact = ScreenshotArtifact {
            step,
            slug: slug.to_string(),
            label: label.to_string(),
            captured_at_ms: u64::from(step) * 1_000,
        };
        state.screenshots.push(artifact.clone());
        Ok(artifact)
    }

    fn log(&self, message: &str) {
        self.inner.lock().logs.push(message.to_string());
    }
}
