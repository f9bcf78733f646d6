// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error that carries a process exit code.
//!
//! Commands return `ExitError` instead of exiting, so `main()` owns process
//! termination and the log writer gets flushed.

use dp_engine::EngineError;
use std::fmt;

/// Generic failure.
pub const FAILURE: i32 = 1;
/// The job or record does not exist.
pub const NOT_FOUND: i32 = 3;
/// The job is in the wrong state for the command.
pub const CONFLICT: i32 = 4;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl From<EngineError> for ExitError {
    fn from(e: EngineError) -> Self {
        let code = match &e {
            EngineError::NotFound(_) | EngineError::RecordNotFound(_) => NOT_FOUND,
            EngineError::Conflict { .. } => CONFLICT,
            _ => FAILURE,
        };
        Self::new(code, e.to_string())
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExitError {}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
