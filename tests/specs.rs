// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end behavior of the automation engine, driven through its public
//! API with a scripted portal and a fake browser.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/job"]
mod job {
    mod confirmation;
    mod restart;
    mod scenarios;
}
