// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn encrypted(ciphertext: &str) -> EncryptedSecret {
    EncryptedSecret {
        ciphertext: ciphertext.to_string(),
        iv: "aXYtMTIz".to_string(),
        auth_tag: "dGFnLTQ1Ng==".to_string(),
    }
}

#[test]
fn unconfigured_decryptor_refuses() {
    let err = CommandDecryptor::unconfigured().decrypt(&encrypted("x")).unwrap_err();
    assert!(matches!(err, DecryptError::NotConfigured));
}

#[test]
fn blank_command_is_unconfigured() {
    let err = CommandDecryptor::new("   ").decrypt(&encrypted("x")).unwrap_err();
    assert!(matches!(err, DecryptError::NotConfigured));
}

#[cfg(unix)]
#[test]
fn command_receives_the_triple_in_its_environment() {
    let decryptor = CommandDecryptor::new(r#"printf '%s|%s|%s\n' "$DP_CIPHERTEXT" "$DP_IV" "$DP_AUTH_TAG""#);
    let secret = decryptor.decrypt(&encrypted("Y2lwaGVy")).unwrap();
    assert_eq!(secret.expose(), "Y2lwaGVy|aXYtMTIz|dGFnLTQ1Ng==");
}

#[cfg(unix)]
#[test]
fn failing_command_reports_stderr() {
    let decryptor = CommandDecryptor::new("echo 'bad tag' >&2; exit 3");
    match decryptor.decrypt(&encrypted("x")).unwrap_err() {
        DecryptError::Failed { stderr, .. } => assert_eq!(stderr, "bad tag"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn empty_output_is_an_error() {
    let decryptor = CommandDecryptor::new("true");
    assert!(matches!(decryptor.decrypt(&encrypted("x")).unwrap_err(), DecryptError::Empty));
}

#[cfg(unix)]
#[test]
fn surrounding_spaces_in_the_secret_are_kept() {
    let decryptor = CommandDecryptor::new("printf ' pass word \\n'");
    assert_eq!(decryptor.decrypt(&encrypted("x")).unwrap().expose(), " pass word ");
}

#[test]
fn fake_strips_prefix_and_counts_calls() {
    let fake = FakeDecryptor::new();
    assert_eq!(fake.decrypt(&encrypted("enc:hunter2")).unwrap().expose(), "hunter2");
    assert!(fake.decrypt(&encrypted("garbage")).is_err());
    assert_eq!(fake.calls(), 2);
}
