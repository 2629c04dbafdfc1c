// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use sy_core::db::{SETTING_BACKEND_HOST, SETTING_BACKEND_PORT};
use tempfile::TempDir;

#[test]
fn test_init_creates_stores() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join("inv");

    run(&data_dir, None, None, true).unwrap();

    assert!(data_dir.join("config.toml").is_file());
    assert!(data_dir.join("stock.db").is_file());
    let config = Config::load(&data_dir).unwrap();
    assert!(!config.discovery.enabled);
}

#[test]
fn test_init_twice_fails() {
    let temp = TempDir::new().unwrap();
    run(temp.path(), None, None, false).unwrap();

    let err = run(temp.path(), None, None, false).unwrap_err();
    assert!(err.to_string().contains("already initialized"));
}

#[test]
fn test_init_records_host_and_port() {
    let db = Database::open_in_memory().unwrap();

    run_impl(&db, Some(" 10.0.0.5 "), Some(8080)).unwrap();

    assert_eq!(
        db.get_setting(SETTING_BACKEND_HOST).unwrap().as_deref(),
        Some("10.0.0.5")
    );
    assert_eq!(
        db.get_setting(SETTING_BACKEND_PORT).unwrap().as_deref(),
        Some("8080")
    );
}

#[test]
fn test_init_port_only_keeps_discovery_port() {
    let db = Database::open_in_memory().unwrap();

    run_impl(&db, None, Some(8080)).unwrap();

    assert!(db.get_setting(SETTING_BACKEND_HOST).unwrap().is_none());
    assert_eq!(
        db.get_setting(SETTING_BACKEND_PORT).unwrap().as_deref(),
        Some("8080")
    );
}

#[test]
fn test_init_rejects_url_as_host() {
    let db = Database::open_in_memory().unwrap();
    assert!(run_impl(&db, Some("http://10.0.0.5"), None).is_err());
}
