// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `stockyard` pointed at `data_dir`, isolated from the caller's environment.
pub fn sy(data_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("stockyard");
    cmd.arg("--data-dir")
        .arg(data_dir)
        .env_remove("STOCKYARD_DIR")
        .env_remove("STOCKYARD_LOG");
    cmd
}

/// Helper to create an initialized data directory with no backend and
/// discovery off, so every command runs offline.
pub fn init_offline() -> TempDir {
    let temp = TempDir::new().unwrap();
    sy(temp.path())
        .args(["init", "--no-discovery"])
        .assert()
        .success();
    temp
}

/// Helper to add a product.
pub fn add_product(temp: &TempDir, code: &str, quantity: i64) {
    sy(temp.path())
        .args(["product", "add", code, "Widget", &quantity.to_string()])
        .assert()
        .success();
}

/// Parse stdout as JSON.
pub fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}
