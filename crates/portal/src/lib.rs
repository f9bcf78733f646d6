// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dp-portal: how the deduction portal is driven
//!
//! - [`selectors`]: where things are on the portal
//! - [`mapping`]: internal codes to portal labels
//! - [`page`]: the browser capabilities the protocol needs
//! - [`protocol`]: the scripted login and submission steps

pub mod mapping;
pub mod page;
pub mod protocol;
pub mod recorder;
pub mod selectors;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use mapping::{category_label, document_type_label, format_amount, MappingError};
pub use page::{PageError, PortalPage, Presence};
pub use protocol::{FilledForm, PortalProtocol, ProtocolError, SubmitOutcome};
pub use recorder::{RecordError, StepRecorder};
pub use selectors::{Locator, PortalSelectors, PORTAL, SELECTORS_VERSION};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{Effect, FakePage, FakeRecorder, PageCall};
