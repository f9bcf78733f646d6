// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn record() -> DeductionRecord {
    DeductionRecord::builder()
        .category("DENTAL")
        .document_type("INVOICE")
        .provider_tax_id("12345678000195")
        .amount_cents(123_456)
        .build()
}

#[tokio::test]
async fn fill_uses_mapped_labels_and_waits_for_dependent_fields() {
    let page = FakePage::happy_path();
    let recorder = FakeRecorder::new();
    let protocol = protocol().with_dependent_fields_delay(Duration::from_millis(40));

    let filled = protocol.fill_deduction(&page, &recorder, &record()).await.unwrap();

    let form = PORTAL.deduction;
    assert_eq!(page.value_of(form.category).as_deref(), Some("Dentistas no Brasil"));
    assert_eq!(page.value_of(form.document_type).as_deref(), Some("Nota fiscal"));
    assert_eq!(page.value_of(form.provider_tax_id).as_deref(), Some("12345678000195"));
    assert_eq!(page.value_of(form.amount).as_deref(), Some("1.234,56"));
    assert!(page.calls().contains(&PageCall::Pause(Duration::from_millis(40))));
    assert_eq!(filled.screenshot.slug, "form-filled");
    assert_eq!(recorder.slugs(), vec!["form-filled"]);
}

#[tokio::test]
async fn category_is_selected_before_dependent_fields() {
    let page = FakePage::happy_path();
    let recorder = FakeRecorder::new();

    protocol().fill_deduction(&page, &recorder, &record()).await.unwrap();

    let calls = page.calls();
    let position = |wanted: &PageCall| calls.iter().position(|c| c == wanted);
    let select = position(&PageCall::Select(
        PORTAL.deduction.category,
        "Dentistas no Brasil".to_string(),
    ));
    let pause = position(&PageCall::Pause(DEFAULT_DEPENDENT_FIELDS_DELAY));
    let tax_id =
        position(&PageCall::Fill(PORTAL.deduction.provider_tax_id, "12345678000195".to_string()));
    assert!(select < pause && pause < tax_id, "{:?}", calls);
}

#[tokio::test]
async fn unknown_category_touches_nothing() {
    let page = FakePage::happy_path();
    let recorder = FakeRecorder::new();
    let record = DeductionRecord::builder().category("VETERINARY").build();

    let err = protocol().fill_deduction(&page, &recorder, &record).await.unwrap_err();

    assert!(matches!(err, ProtocolError::Mapping(_)));
    assert!(page.calls().is_empty());
}

#[tokio::test]
async fn section_link_is_optional() {
    let page = FakePage::happy_path().without_element(PORTAL.deduction.section_link);
    let recorder = FakeRecorder::new();

    protocol().fill_deduction(&page, &recorder, &record()).await.unwrap();

    assert!(!page.was_clicked(PORTAL.deduction.section_link));
    assert!(page.was_clicked(PORTAL.deduction.add_new));
}

#[tokio::test]
async fn missing_add_button_fails() {
    let page = FakePage::happy_path().without_element(PORTAL.deduction.add_new);
    let recorder = FakeRecorder::new();

    let err = protocol().fill_deduction(&page, &recorder, &record()).await.unwrap_err();

    assert_eq!(err, ProtocolError::ElementMissing(PORTAL.deduction.add_new.to_string()));
    assert!(recorder.slugs().is_empty());
}

#[tokio::test]
async fn missing_option_label_fails() {
    let page = FakePage::happy_path().with_options(PORTAL.deduction.category, ["Outros"]);
    let recorder = FakeRecorder::new();

    let err = protocol().fill_deduction(&page, &recorder, &record()).await.unwrap_err();

    assert!(matches!(err, ProtocolError::Page(PageError::OptionNotFound { .. })));
}

#[tokio::test]
async fn submit_with_success_banner() {
    let page = FakePage::happy_path();
    let recorder = FakeRecorder::new();

    let outcome = protocol().submit(&page, &recorder).await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Confirmed("Pagamento salvo com sucesso".to_string()));
    assert_eq!(recorder.slugs(), vec!["after-save"]);
}

#[tokio::test]
async fn submit_accepts_confirmation_modal() {
    let form = PORTAL.deduction;
    let page = FakePage::happy_path()
        .replace_on_click(form.save, vec![Effect::Show(form.confirm_modal)])
        .on_click(form.confirm_modal, Effect::Hide(form.confirm_modal))
        .on_click(form.confirm_modal, Effect::Show(form.success_banner));
    let recorder = FakeRecorder::new();

    let outcome = protocol().submit(&page, &recorder).await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Confirmed(_)));
    assert_eq!(recorder.slugs(), vec!["after-save", "after-confirm"]);
}

#[tokio::test]
async fn submit_with_error_banner_fails_with_its_text() {
    let form = PORTAL.deduction;
    let page = FakePage::happy_path()
        .replace_on_click(form.save, vec![Effect::Show(form.error_banner)])
        .with_text(form.error_banner, "CPF/CNPJ do beneficiário inválido");
    let recorder = FakeRecorder::new();

    let err = protocol().submit(&page, &recorder).await.unwrap_err();

    assert_eq!(err, ProtocolError::PortalRejected("CPF/CNPJ do beneficiário inválido".to_string()));
}

#[tokio::test]
async fn submit_without_any_banner_is_a_soft_success() {
    let page = FakePage::happy_path().replace_on_click(PORTAL.deduction.save, Vec::new());
    let recorder = FakeRecorder::new();

    let outcome = protocol().submit(&page, &recorder).await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Unconfirmed);
    assert!(recorder.logs().iter().any(|l| l == "processed without explicit confirmation"));
}

#[tokio::test]
async fn steps_across_a_full_run_are_strictly_increasing() {
    let page = FakePage::happy_path();
    let recorder = FakeRecorder::new();
    let protocol = protocol();

    protocol.authenticate(&page, &recorder, "12345678909", &secret()).await.unwrap();
    protocol.reach_application(&page, &recorder).await.unwrap();
    protocol.fill_deduction(&page, &recorder, &record()).await.unwrap();
    protocol.submit(&page, &recorder).await.unwrap();

    let steps: Vec<u32> = recorder.screenshots().iter().map(|s| s.step).collect();
    assert_eq!(steps, (1..=steps.len() as u32).collect::<Vec<_>>());
    assert_eq!(page.screenshot_count() as usize, steps.len());
}
