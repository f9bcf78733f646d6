// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fake::{Effect, FakePage, FakeRecorder, PageCall};
use crate::page::PageError;
use crate::selectors::PORTAL;
use dp_core::{DeductionRecord, Secret};

mod deduction;
mod login;

fn protocol() -> PortalProtocol {
    PortalProtocol::default()
}

fn secret() -> Secret {
    Secret::new("s3nha-forte")
}
