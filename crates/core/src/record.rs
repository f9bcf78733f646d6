// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deduction records and per-user automation preferences.

use crate::id::{RecordId, UserId};
use serde::{Deserialize, Serialize};

/// Where a deduction record stands relative to the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    #[default]
    Pending,
    /// A job is currently working on it.
    Processing,
    /// The form was filled and awaits a human confirmation.
    PreviewReady,
    Submitted,
}

crate::enum_labels! {
    RecordStatus {
        Pending => "PENDING",
        Processing => "PROCESSING",
        PreviewReady => "PREVIEW_READY",
        Submitted => "SUBMITTED",
    }
}

/// A tax-deduction expense to be registered on the portal.
///
/// `category` and `document_type` are internal codes; the field mapping table
/// turns them into the labels the portal displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub category: String,
    pub document_type: String,
    /// CPF or CNPJ of the service provider, digits only.
    pub provider_tax_id: String,
    pub amount_cents: u64,
    #[serde(default)]
    pub status: RecordStatus,
}

/// User-level automation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    /// Submit without waiting for a human confirmation.
    #[serde(default)]
    pub auto_submit: bool,
}

crate::builder! {
    pub struct DeductionRecordBuilder => DeductionRecord {
        into {
            id: RecordId = "rec-1",
            user_id: UserId = "user-1",
            category: String = "MEDICAL",
            document_type: String = "RECEIPT",
            provider_tax_id: String = "11222333000181",
        }
        set {
            amount_cents: u64 = 150_000,
            status: RecordStatus = RecordStatus::Pending,
        }
    }
}
