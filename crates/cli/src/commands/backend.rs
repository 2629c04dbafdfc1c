// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use sy_core::db::{SETTING_BACKEND_HOST, SETTING_BACKEND_PORT};
use sy_core::Database;

use crate::cli::BackendCommand;
use crate::error::{Error, Result};
use crate::sync::{Backend, SyncContext};

use super::{block_on, open_context};

pub fn run(data_dir: &Path, cmd: BackendCommand) -> Result<()> {
    let (ctx, _) = open_context(data_dir)?;
    block_on(run_impl(&ctx, cmd))
}

pub(crate) async fn run_impl<B: Backend>(ctx: &SyncContext<B>, cmd: BackendCommand) -> Result<()> {
    match cmd {
        BackendCommand::Set { host, port } => {
            validate_host(&host)?;
            ctx.with_db(|db| write_address(db, &host, port)).await?;
            ctx.connectivity().forget_last_known_good().await;
            let port = port.unwrap_or(ctx.options().default_port);
            println!("Backend set to {}:{}", host.trim(), port);
            Ok(())
        }
        BackendCommand::Clear => {
            ctx.with_db(|db| {
                db.remove_setting(SETTING_BACKEND_HOST)?;
                db.remove_setting(SETTING_BACKEND_PORT)
            })
            .await?;
            ctx.connectivity().forget_last_known_good().await;
            println!("Backend address cleared");
            Ok(())
        }
        BackendCommand::Check => {
            let connectivity = ctx.connectivity();
            if !connectivity.check_connectivity().await {
                return Err(Error::Offline);
            }
            match connectivity.last_known_good() {
                Some(addr) => println!("online: {}", addr),
                None => println!("online"),
            }
            Ok(())
        }
        BackendCommand::Discover => match ctx.connectivity().discover_backend().await {
            Some(addr) => {
                println!("Found backend at {}", addr);
                Ok(())
            }
            None => Err(Error::Offline),
        },
    }
}

/// Reject values that are clearly not a bare host name or IP address.
pub(crate) fn validate_host(host: &str) -> Result<()> {
    let host = host.trim();
    let bad = host.is_empty()
        || host.contains("://")
        || host.contains(['/', ':'])
        || host.chars().any(char::is_whitespace);
    if bad {
        return Err(Error::InvalidAddress(host.to_string()));
    }
    Ok(())
}

/// Store a validated backend host, and the port if given, in the settings table.
pub(crate) fn write_address(db: &Database, host: &str, port: Option<u16>) -> sy_core::Result<()> {
    db.set_setting(SETTING_BACKEND_HOST, host.trim())?;
    match port {
        Some(port) => db.set_setting(SETTING_BACKEND_PORT, &port.to_string()),
        None => db.remove_setting(SETTING_BACKEND_PORT),
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
