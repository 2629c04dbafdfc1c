// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    server = { 42, "42" },
    temporary = { -3, "L3" },
    first_temporary = { -1, "L1" },
)]
fn test_format_id(id: RecordId, expected: &str) {
    assert_eq!(format_id(id), expected);
}

#[parameterized(
    server = { "42", Some(42) },
    temporary = { "L3", Some(-3) },
    lowercase = { "l3", Some(-3) },
    padded = { " 7 ", Some(7) },
    zero = { "0", None },
    local_zero = { "L0", None },
    signed = { "+5", None },
    local_signed = { "L-5", None },
    code = { "A1", None },
    empty = { "", None },
)]
fn test_parse_id(input: &str, expected: Option<RecordId>) {
    assert_eq!(parse_id(input), expected);
}

#[test]
fn test_parse_reads_what_format_writes() {
    for id in [1, 99, -1, -12] {
        assert_eq!(parse_id(&format_id(id)), Some(id));
    }
}
