// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the backend contract types.

#![allow(clippy::unwrap_used)]

use super::backend::*;
use std::time::Duration;
use yare::parameterized;

#[parameterized(
    not_found = { 404, BackendError::NotFound },
    conflict = { 409, BackendError::Conflict("dup".into()) },
    bad_request = { 400, BackendError::Rejected { status: 400, message: "dup".into() } },
    unprocessable = { 422, BackendError::Rejected { status: 422, message: "dup".into() } },
    server = { 503, BackendError::Server { status: 503, message: "dup".into() } },
)]
fn status_classification(status: u16, expected: BackendError) {
    assert_eq!(BackendError::from_status(status, "dup".into()), expected);
}

#[parameterized(
    timeout = { BackendError::Timeout, true, true },
    unreachable = { BackendError::Unreachable("refused".into()), true, true },
    server = { BackendError::Server { status: 500, message: String::new() }, false, true },
    conflict = { BackendError::Conflict(String::new()), false, false },
    not_found = { BackendError::NotFound, false, false },
    decode = { BackendError::Decode(String::new()), false, false },
)]
fn error_predicates(err: BackendError, transport: bool, falls_back: bool) {
    assert_eq!(err.is_transport(), transport);
    assert_eq!(err.falls_back(), falls_back);
}

#[test]
fn addr_display_and_parse() {
    let addr: BackendAddr = "192.168.1.20:3000".parse().unwrap();
    assert_eq!(addr, BackendAddr::new("192.168.1.20", 3000));
    assert_eq!(addr.to_string(), "192.168.1.20:3000");
}

#[parameterized(
    no_port = { "192.168.1.20" },
    bad_port = { "host:http" },
    no_host = { ":3000" },
)]
fn addr_parse_errors(input: &str) {
    assert!(input.parse::<BackendAddr>().is_err());
}

#[tokio::test]
async fn bounded_times_out() {
    let slow: BackendFuture<'_, ()> = Box::pin(async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    });
    let result = bounded(Duration::from_millis(10), slow).await;
    assert_eq!(result, Err(BackendError::Timeout));
}

#[tokio::test]
async fn bounded_passes_result_through() {
    let fast: BackendFuture<'_, u8> = Box::pin(async { Err(BackendError::NotFound) });
    let result = bounded(Duration::from_secs(1), fast).await;
    assert_eq!(result, Err(BackendError::NotFound));
}

#[test]
fn idempotent_outcome_predicates() {
    assert!(BackendError::NotFound.is_not_found());
    assert!(!BackendError::NotFound.is_conflict());
    assert!(BackendError::Conflict("dup".into()).is_conflict());
    assert!(!BackendError::Timeout.is_not_found());
}
