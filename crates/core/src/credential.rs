// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stored portal credentials.
//!
//! The portal password is only ever held encrypted at rest. Decryption is
//! delegated to an external collaborator; the plaintext travels as a
//! [`Secret`] which never prints its contents.

use crate::id::UserId;
use serde::{Deserialize, Serialize};

/// AES-GCM style ciphertext triple as persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSecret {
    pub ciphertext: String,
    pub iv: String,
    pub auth_tag: String,
}

impl std::fmt::Debug for EncryptedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedSecret").field("ciphertext_len", &self.ciphertext.len()).finish()
    }
}

/// Portal login for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub user_id: UserId,
    /// Portal login identity (CPF), stored in clear.
    pub identity: String,
    pub secret: EncryptedSecret,
}

/// Decrypted secret. `Debug` and `Display` are redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}
