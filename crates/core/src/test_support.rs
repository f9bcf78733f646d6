// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::credential::{EncryptedSecret, StoredCredential};
use crate::id::UserId;
use crate::record::UserProfile;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::job::JobStatus;
    use proptest::prelude::*;

    pub fn arb_job_status() -> impl Strategy<Value = JobStatus> {
        prop::sample::select(JobStatus::ALL.to_vec())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────

/// Credential whose ciphertext the fake decryptor maps to `plaintext`.
pub fn credential(user_id: &str, identity: &str, plaintext: &str) -> StoredCredential {
    StoredCredential {
        user_id: UserId::from(user_id),
        identity: identity.to_string(),
        secret: EncryptedSecret {
            ciphertext: format!("enc:{}", plaintext),
            iv: "iv".to_string(),
            auth_tag: "tag".to_string(),
        },
    }
}

pub fn profile(user_id: &str, auto_submit: bool) -> UserProfile {
    UserProfile { id: UserId::from(user_id), auto_submit }
}
