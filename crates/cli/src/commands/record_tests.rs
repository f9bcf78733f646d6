// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    whole        = { "150", 15_000 },
    dot          = { "150.00", 15_000 },
    comma        = { "150,5", 15_050 },
    cents        = { "0,99", 99 },
    padded       = { " 12.34 ", 1_234 },
)]
fn parses_amounts(input: &str, cents: u64) {
    assert_eq!(parse_amount_cents(input), Ok(cents));
}

#[yare::parameterized(
    empty        = { "" },
    zero         = { "0,00" },
    letters      = { "abc" },
    three_places = { "1.234" },
    thousands    = { "1.234,56" },
    negative     = { "-5" },
    no_whole     = { ",50" },
)]
fn rejects_malformed_amounts(input: &str) {
    assert!(parse_amount_cents(input).is_err());
}
