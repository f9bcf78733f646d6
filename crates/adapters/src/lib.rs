// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dp-adapters: browser and credential collaborators

pub mod browser;
pub mod credential;

pub use browser::{
    BrowserAdapter, BrowserError, BrowserSession, ChromiumAdapter, ChromiumConfig, SessionOptions,
};
pub use credential::{CommandDecryptor, CredentialDecryptor, DecryptError};

// Test support
#[cfg(any(test, feature = "test-support"))]
pub use browser::{BrowserCall, FakeBrowserAdapter, FakeSession};
#[cfg(any(test, feature = "test-support"))]
pub use credential::FakeDecryptor;
