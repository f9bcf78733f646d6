// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dp-storage: persistence for jobs, users and deduction records

mod memory;
mod repository;
mod snapshot;

pub use memory::MemoryRepository;
pub use repository::{Repository, RepositoryError};
pub use snapshot::CURRENT_SNAPSHOT_VERSION;
