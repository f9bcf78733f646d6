// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dp_core::{JobId, JobStatus, RecordId};

fn running_conflict() -> EngineError {
    EngineError::Conflict {
        id: JobId::from("job-1"),
        status: JobStatus::Running,
        hint: "cancel the job first".to_string(),
    }
}

#[yare::parameterized(
    not_found = { EngineError::NotFound(JobId::from("job-1")), NOT_FOUND },
    no_record = { EngineError::RecordNotFound(RecordId::from("rec-1")), NOT_FOUND },
    conflict  = { running_conflict(), CONFLICT },
    missing   = { EngineError::MissingCredentials, FAILURE },
)]
fn engine_errors_map_to_exit_codes(error: EngineError, code: i32) {
    let message = error.to_string();
    let exit = ExitError::from(error);
    assert_eq!(exit.code, code);
    assert_eq!(exit.message, message);
}

#[test]
fn conflict_message_names_the_status() {
    let exit = ExitError::from(running_conflict());
    assert_eq!(exit.to_string(), "job job-1 is RUNNING: cancel the job first");
}
