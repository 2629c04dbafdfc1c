// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use sy_core::db::SETTING_BACKEND_PORT;
use sy_core::Database;

use crate::config::{db_path, init_data_dir, queue_path, Config};
use crate::error::Result;
use crate::sync::SyncQueue;

use super::backend::{validate_host, write_address};

pub fn run(data_dir: &Path, host: Option<String>, port: Option<u16>, no_discovery: bool) -> Result<()> {
    if let Some(host) = &host {
        validate_host(host)?;
    }

    let mut config = Config::default();
    config.discovery.enabled = !no_discovery;
    init_data_dir(data_dir, &config)?;

    let db = Database::open(&db_path(data_dir))?;
    SyncQueue::open(&queue_path(data_dir))?;
    run_impl(&db, host.as_deref(), port)?;

    println!("Initialized stockyard at {}", data_dir.display());
    match host {
        Some(host) => println!(
            "Backend: {}:{}",
            host.trim(),
            port.unwrap_or(config.backend.port)
        ),
        None if no_discovery => {
            println!("No backend configured; set one with 'stockyard backend set <host>'")
        }
        None => println!("Backend: discovered on the local network when needed"),
    }
    Ok(())
}

/// Record the initial backend address, if one was given.
pub(crate) fn run_impl(db: &Database, host: Option<&str>, port: Option<u16>) -> Result<()> {
    match (host, port) {
        (Some(host), port) => {
            validate_host(host)?;
            write_address(db, host, port)?;
        }
        (None, Some(port)) => db.set_setting(SETTING_BACKEND_PORT, &port.to_string())?,
        (None, None) => {}
    }
    Ok(())
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
