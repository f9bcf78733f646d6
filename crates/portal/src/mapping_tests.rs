// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    medical    = { "MEDICAL",         "Médicos no Brasil" },
    dental     = { "DENTAL",          "Dentistas no Brasil" },
    hospital   = { "HOSPITAL",        "Hospitais, clínicas e laboratórios no Brasil" },
    education  = { "EDUCATION",       "Instrução no Brasil" },
    pension    = { "PRIVATE_PENSION", "Previdência complementar" },
    lowercase  = { "medical",         "Médicos no Brasil" },
    padded     = { " DENTAL ",        "Dentistas no Brasil" },
)]
fn category_codes(code: &str, expected: &str) {
    assert_eq!(category_label(code).unwrap(), expected);
}

#[yare::parameterized(
    receipt   = { "RECEIPT",      "Recibo" },
    invoice   = { "INVOICE",      "Nota fiscal" },
    slip      = { "PAYMENT_SLIP", "Boleto bancário" },
)]
fn document_type_codes(code: &str, expected: &str) {
    assert_eq!(document_type_label(code).unwrap(), expected);
}

#[test]
fn lookups_are_stable() {
    let first = (category_label("PSYCHOLOGY").unwrap(), document_type_label("INVOICE").unwrap());
    for _ in 0..100 {
        let again =
            (category_label("PSYCHOLOGY").unwrap(), document_type_label("INVOICE").unwrap());
        assert_eq!(first, again);
    }
}

#[test]
fn unknown_codes_are_errors() {
    assert_eq!(
        category_label("VETERINARY"),
        Err(MappingError::UnknownCategory("VETERINARY".to_string()))
    );
    assert_eq!(
        document_type_label(""),
        Err(MappingError::UnknownDocumentType(String::new()))
    );
}

#[test]
fn labels_are_unique() {
    let mut labels: Vec<_> = category_labels().collect();
    let total = labels.len();
    labels.sort_unstable();
    labels.dedup();
    assert_eq!(labels.len(), total);
    assert_eq!(document_type_labels().count(), 5);
}

#[yare::parameterized(
    zero      = { 0,           "0,00" },
    cents     = { 7,           "0,07" },
    hundreds  = { 15_000,      "150,00" },
    thousands = { 123_456,     "1.234,56" },
    millions  = { 123_456_789, "1.234.567,89" },
)]
fn amount_formatting(cents: u64, expected: &str) {
    assert_eq!(format_amount(cents), expected);
}
