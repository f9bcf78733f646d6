// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fill the deduction form and submit it.

use super::login::non_empty_or;
use super::{PortalProtocol, ProtocolError};
use crate::mapping::{category_label, document_type_label, format_amount};
use crate::page::PortalPage;
use crate::recorder::StepRecorder;
use dp_core::{DeductionRecord, ScreenshotArtifact};

/// A filled, not yet saved, deduction form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledForm {
    /// Screenshot of the form as filled, shown to a human for confirmation.
    pub screenshot: ScreenshotArtifact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The portal showed a success banner with this text.
    Confirmed(String),
    /// Neither banner appeared after saving.
    Unconfirmed,
}

impl PortalProtocol {
    /// Open a new deduction entry and fill it from `record`.
    ///
    /// Codes are mapped to portal labels before the page is touched, so an
    /// unknown code fails without any browser action.
    pub async fn fill_deduction<P, R>(
        &self,
        page: &P,
        recorder: &R,
        record: &DeductionRecord,
    ) -> Result<FilledForm, ProtocolError>
    where
        P: PortalPage + ?Sized,
        R: StepRecorder + ?Sized,
    {
        let form = &self.selectors.deduction;
        let category = category_label(&record.category)?;
        let document_type = document_type_label(&record.document_type)?;

        if page.find(form.section_link).await?.is_found() {
            page.click(form.section_link).await?;
            page.wait_for_settle().await?;
        }

        if !page.find(form.add_new).await?.is_found() {
            return Err(ProtocolError::ElementMissing(form.add_new.to_string()));
        }
        page.click(form.add_new).await?;
        page.wait_for_settle().await?;
        recorder.log("opened a new deduction entry");

        page.select_option(form.category, category).await?;
        page.pause(self.dependent_fields_delay).await;
        recorder.log(&format!("category: {}", category));

        page.fill(form.provider_tax_id, &record.provider_tax_id).await?;
        page.select_option(form.document_type, document_type).await?;
        page.fill(form.amount, &format_amount(record.amount_cents)).await?;
        recorder.log(&format!(
            "document type: {}, amount: {}",
            document_type,
            format_amount(record.amount_cents)
        ));

        let screenshot = self.capture(page, recorder, "form-filled", "Deduction form filled").await?;
        recorder.log("form filled");
        Ok(FilledForm { screenshot })
    }

    /// Save the filled form and read the portal's verdict.
    pub async fn submit<P, R>(&self, page: &P, recorder: &R) -> Result<SubmitOutcome, ProtocolError>
    where
        P: PortalPage + ?Sized,
        R: StepRecorder + ?Sized,
    {
        let form = &self.selectors.deduction;

        page.click(form.save).await?;
        page.wait_for_settle().await?;
        self.capture(page, recorder, "after-save", "After save").await?;
        recorder.log("form saved");

        if page.find(form.confirm_modal).await?.is_found() {
            page.click(form.confirm_modal).await?;
            page.wait_for_settle().await?;
            self.capture(page, recorder, "after-confirm", "After confirmation").await?;
            recorder.log("confirmation dialog accepted");
        }

        if let Some(text) = page.text(form.success_banner).await? {
            let message = non_empty_or(text, "saved");
            recorder.log(&format!("portal confirmed: {}", message));
            return Ok(SubmitOutcome::Confirmed(message));
        }

        if let Some(text) = page.text(form.error_banner).await? {
            let message = non_empty_or(text, "the portal rejected the entry");
            recorder.log(&format!("portal rejected the entry: {}", message));
            return Err(ProtocolError::PortalRejected(message));
        }

        recorder.log("processed without explicit confirmation");
        Ok(SubmitOutcome::Unconfirmed)
    }
}
