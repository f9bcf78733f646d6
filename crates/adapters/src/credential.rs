// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential decryption.
//!
//! Stored portal passwords are AES-GCM triples (ciphertext, iv, auth tag).
//! The key lives outside this process, so decryption is delegated:
//!
//! ```text
//! CommandDecryptor:
//!   sh -c "$DP_DECRYPT_COMMAND"
//!     env DP_CIPHERTEXT, DP_IV, DP_AUTH_TAG
//!     stdout (trimmed) = plaintext
//! ```

use dp_core::{EncryptedSecret, Secret};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Errors from credential decryption
#[derive(Debug, Error)]
pub enum DecryptError {
    #[error("no decrypt command configured")]
    NotConfigured,
    #[error("failed to run decrypt command: {0}")]
    Spawn(String),
    #[error("decrypt command exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("decrypt command produced no plaintext")]
    Empty,
    #[error("decrypted secret is not valid UTF-8")]
    InvalidUtf8,
}

/// Turns a stored ciphertext triple into the plaintext secret.
pub trait CredentialDecryptor: Clone + Send + Sync + 'static {
    fn decrypt(&self, secret: &EncryptedSecret) -> Result<Secret, DecryptError>;
}

/// Runs an external command to decrypt.
#[derive(Debug, Clone, Default)]
pub struct CommandDecryptor {
    command: Option<String>,
}

impl CommandDecryptor {
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        Self { command: (!command.trim().is_empty()).then_some(command) }
    }

    /// A decryptor that refuses everything.
    pub fn unconfigured() -> Self {
        Self { command: None }
    }
}

impl CredentialDecryptor for CommandDecryptor {
    fn decrypt(&self, secret: &EncryptedSecret) -> Result<Secret, DecryptError> {
        let command = self.command.as_deref().ok_or(DecryptError::NotConfigured)?;

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .env("DP_CIPHERTEXT", &secret.ciphertext)
            .env("DP_IV", &secret.iv)
            .env("DP_AUTH_TAG", &secret.auth_tag)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| DecryptError::Spawn(e.to_string()))?;

        if !output.status.success() {
            return Err(DecryptError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let plaintext = String::from_utf8(output.stdout).map_err(|_| DecryptError::InvalidUtf8)?;
        let plaintext = plaintext.trim_end_matches(['\r', '\n']);
        if plaintext.is_empty() {
            return Err(DecryptError::Empty);
        }
        Ok(Secret::new(plaintext))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CredentialDecryptor, DecryptError};
    use dp_core::{EncryptedSecret, Secret};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Fake decryptor: `"enc:<plaintext>"` decrypts to `<plaintext>`.
    #[derive(Clone, Default)]
    pub struct FakeDecryptor {
        calls: Arc<Mutex<u32>>,
    }

    impl FakeDecryptor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> u32 {
            *self.calls.lock()
        }
    }

    impl CredentialDecryptor for FakeDecryptor {
        fn decrypt(&self, secret: &EncryptedSecret) -> Result<Secret, DecryptError> {
            *self.calls.lock() += 1;
            secret.ciphertext.strip_prefix("enc:").map(Secret::new).ok_or_else(|| {
                DecryptError::Failed {
                    status: "exit status: 1".to_string(),
                    stderr: "authentication tag mismatch".to_string(),
                }
            })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDecryptor;

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
