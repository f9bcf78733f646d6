// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dp-core: shared domain types for the deduction portal automation engine

pub mod macros;

pub mod artifact;
pub mod clock;
pub mod credential;
pub mod id;
pub mod job;
pub mod log;
pub mod record;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use artifact::{
    canonical_video_name, is_canonical_video_name, parse_screenshot_filename,
    screenshot_filename, slugify, ScreenshotArtifact,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use credential::{EncryptedSecret, Secret, StoredCredential};
pub use id::{JobId, RecordId, UserId};
#[cfg(any(test, feature = "test-support"))]
pub use job::AutomationJobBuilder;
pub use job::{AutomationJob, JobKind, JobStatus, TransitionError};
pub use log::LogLine;
#[cfg(any(test, feature = "test-support"))]
pub use record::DeductionRecordBuilder;
pub use record::{DeductionRecord, RecordStatus, UserProfile};
pub use time_fmt::{format_elapsed_ms, format_utc, format_utc_now};
