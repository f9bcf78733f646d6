// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dp_portal::PortalPage;

#[tokio::test]
async fn sessions_require_a_running_browser() {
    let browser = FakeBrowserAdapter::new();
    let err = browser.new_session(&SessionOptions::default()).await.err().unwrap();
    assert!(matches!(err, BrowserError::NotRunning));

    browser.start().await.unwrap();
    browser.start().await.unwrap();
    assert_eq!(browser.starts(), 1);
    assert!(browser.new_session(&SessionOptions::default()).await.is_ok());
}

#[tokio::test]
async fn crash_and_restart_drops_open_sessions() {
    let browser = FakeBrowserAdapter::new();
    browser.start().await.unwrap();
    let _session = browser.new_session(&SessionOptions::default()).await.unwrap();
    assert_eq!(browser.open_sessions(), 1);

    browser.crash();
    assert!(!browser.is_alive().await);
    browser.start().await.unwrap();

    assert_eq!(browser.starts(), 2);
    assert_eq!(browser.open_sessions(), 0);
}

#[tokio::test]
async fn failing_close_still_forgets_the_session() {
    let browser = FakeBrowserAdapter::new().fail_close();
    browser.start().await.unwrap();
    let session = browser.new_session(&SessionOptions::default()).await.unwrap();

    assert!(session.close().await.is_err());
    assert_eq!(browser.open_sessions(), 0);
}

#[tokio::test]
async fn open_page_writes_a_raw_recording() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("video");
    let browser = FakeBrowserAdapter::new();
    browser.start().await.unwrap();
    let session = browser.new_session(&SessionOptions::default()).await.unwrap();

    let page = session.open_page(Some(&video)).await.unwrap();
    page.goto("https://example.test").await.unwrap();

    assert!(video.join(format!("raw-{}.webm", session.id())).exists());
    assert_eq!(browser.pages().len(), 1);
    assert_eq!(browser.last_page().unwrap().current_url(), "https://example.test");
}

#[tokio::test]
async fn page_factory_is_used_per_page() {
    let browser = FakeBrowserAdapter::new()
        .without_video()
        .with_pages(|| FakePage::new().with_element(dp_portal::PORTAL.login.challenge));
    browser.start().await.unwrap();
    let session = browser.new_session(&SessionOptions::default()).await.unwrap();

    let page = session.open_page(None).await.unwrap();

    assert!(page.find(dp_portal::PORTAL.login.challenge).await.unwrap().is_found());
}

#[test]
fn default_session_options() {
    let options = SessionOptions::default();
    assert_eq!(options.locale, "pt-BR");
    assert_eq!(options.timezone, "America/Sao_Paulo");
    assert_eq!((options.viewport_width, options.viewport_height), (1366, 768));
    assert!(options.user_agent.starts_with("Mozilla/5.0"));
}
