// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn authenticate_happy_path() {
    let page = FakePage::happy_path();
    let recorder = FakeRecorder::new();

    protocol().authenticate(&page, &recorder, "12345678909", &secret()).await.unwrap();

    assert_eq!(recorder.slugs(), vec!["login-page", "identity-submitted", "password-submitted"]);
    assert_eq!(page.value_of(PORTAL.login.identity_input).as_deref(), Some("12345678909"));
    assert_eq!(page.value_of(PORTAL.login.secret_input).as_deref(), Some("s3nha-forte"));
    assert!(recorder.logs().iter().any(|l| l == "authenticated"));
}

#[tokio::test]
async fn secret_never_reaches_the_log() {
    let page = FakePage::happy_path();
    let recorder = FakeRecorder::new();

    protocol().authenticate(&page, &recorder, "12345678909", &secret()).await.unwrap();

    assert!(recorder.logs().iter().all(|l| !l.contains("s3nha-forte")));
}

#[tokio::test]
async fn challenge_stops_before_credentials_are_typed() {
    let page = FakePage::happy_path().with_element(PORTAL.login.challenge);
    let recorder = FakeRecorder::new();

    let err = protocol().authenticate(&page, &recorder, "12345678909", &secret()).await.unwrap_err();

    assert_eq!(err, ProtocolError::ChallengeDetected);
    assert!(err.is_challenge());
    assert_eq!(recorder.slugs(), vec!["login-page", "challenge-detected"]);
    assert_eq!(page.value_of(PORTAL.login.identity_input), None);
}

#[tokio::test]
async fn error_banner_text_becomes_the_failure() {
    let page = FakePage::happy_path()
        .on_click(PORTAL.login.secret_submit, Effect::Show(PORTAL.login.error_banner))
        .with_text(PORTAL.login.error_banner, "  Usuário e/ou senha inválidos ");
    let recorder = FakeRecorder::new();

    let err = protocol().authenticate(&page, &recorder, "12345678909", &secret()).await.unwrap_err();

    assert_eq!(err, ProtocolError::LoginRejected("Usuário e/ou senha inválidos".to_string()));
    assert!(!err.is_challenge());
    assert_eq!(recorder.slugs().last().map(String::as_str), Some("login-error"));
}

#[tokio::test]
async fn empty_error_banner_still_has_a_message() {
    let page = FakePage::happy_path()
        .on_click(PORTAL.login.secret_submit, Effect::Show(PORTAL.login.error_banner));
    let recorder = FakeRecorder::new();

    let err = protocol().authenticate(&page, &recorder, "12345678909", &secret()).await.unwrap_err();

    assert_eq!(err, ProtocolError::LoginRejected("login failed".to_string()));
}

#[tokio::test]
async fn staying_on_login_page_fails() {
    let page = FakePage::happy_path().replace_on_click(PORTAL.login.secret_submit, Vec::new());
    let recorder = FakeRecorder::new();

    let err = protocol().authenticate(&page, &recorder, "12345678909", &secret()).await.unwrap_err();

    assert_eq!(err, ProtocolError::StillOnLoginPage);
}

#[tokio::test]
async fn missing_identity_field_is_an_element_failure() {
    let page = FakePage::happy_path().without_element(PORTAL.login.identity_input);
    let recorder = FakeRecorder::new();

    let err = protocol().authenticate(&page, &recorder, "12345678909", &secret()).await.unwrap_err();

    assert_eq!(err, ProtocolError::ElementMissing(PORTAL.login.identity_input.to_string()));
}

#[tokio::test]
async fn navigation_failure_propagates() {
    let page = FakePage::happy_path().fail_navigation();
    let recorder = FakeRecorder::new();

    let err = protocol().authenticate(&page, &recorder, "12345678909", &secret()).await.unwrap_err();

    assert!(matches!(err, ProtocolError::Page(PageError::Navigation { .. })));
    assert!(recorder.slugs().is_empty());
}

#[tokio::test]
async fn screenshot_failure_fails_the_step() {
    let page = FakePage::happy_path().fail_screenshots();
    let recorder = FakeRecorder::new();

    let err = protocol().authenticate(&page, &recorder, "12345678909", &secret()).await.unwrap_err();

    assert!(matches!(err, ProtocolError::Page(PageError::Capture(_))));
}

#[tokio::test]
async fn recorder_failure_fails_the_step() {
    let page = FakePage::happy_path();
    let recorder = FakeRecorder::failing();

    let err = protocol().authenticate(&page, &recorder, "12345678909", &secret()).await.unwrap_err();

    assert!(matches!(err, ProtocolError::Record(_)));
}

#[tokio::test]
async fn reach_application_uses_direct_link() {
    let page = FakePage::happy_path();
    let recorder = FakeRecorder::new();

    protocol().reach_application(&page, &recorder).await.unwrap();

    assert_eq!(recorder.slugs(), vec!["services-directory", "application"]);
    assert!(page.was_clicked(PORTAL.directory.app_link));
    assert_eq!(page.value_of(PORTAL.directory.search_input), None);
}

#[tokio::test]
async fn reach_application_falls_back_to_search() {
    let page = FakePage::happy_path()
        .without_element(PORTAL.directory.app_link)
        .on_fill(PORTAL.directory.search_input, Effect::Show(PORTAL.directory.app_link));
    let recorder = FakeRecorder::new();

    protocol().reach_application(&page, &recorder).await.unwrap();

    assert_eq!(page.value_of(PORTAL.directory.search_input).as_deref(), Some("Carnê-Leão"));
    assert!(page.was_clicked(PORTAL.directory.app_link));
}

#[tokio::test]
async fn reach_application_without_link_fails() {
    let page = FakePage::happy_path().without_element(PORTAL.directory.app_link);
    let recorder = FakeRecorder::new();

    let err = protocol().reach_application(&page, &recorder).await.unwrap_err();

    assert_eq!(err, ProtocolError::ApplicationNotFound);
    assert_eq!(err.to_string(), "application link not found");
    assert!(!page.calls().contains(&PageCall::Click(PORTAL.directory.app_link)));
}
