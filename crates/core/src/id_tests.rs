// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

#[test]
fn generated_ids_carry_prefix_and_differ() {
    let a = JobId::new();
    let b = JobId::new();
    assert!(a.starts_with("job-"));
    assert_eq!(a.len(), 23);
    assert_ne!(a, b);
}

#[test]
fn external_ids_keep_their_shape() {
    let id = UserId::from("42");
    assert_eq!(id.as_str(), "42");
    assert_eq!(id.to_string(), "42");
}

#[test]
fn ids_work_as_hash_map_keys() {
    let mut map = HashMap::new();
    map.insert(RecordId::from("rec-1"), 7);
    assert_eq!(map.get("rec-1"), Some(&7));
}

#[test]
fn id_serializes_transparently() {
    let id = JobId::from("job-abc");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"job-abc\"");
    let parsed: JobId = serde_json::from_str("\"job-abc\"").unwrap();
    assert_eq!(parsed, id);
}

#[yare::parameterized(
    job    = { JobId::new().to_string(),    "job-" },
    user   = { UserId::new().to_string(),   "usr-" },
    record = { RecordId::new().to_string(), "rec-" },
)]
fn each_id_type_mints_its_own_prefix(id: String, prefix: &str) {
    assert!(id.starts_with(prefix), "{id}");
    assert_eq!(id.len(), prefix.len() + 19);
}
