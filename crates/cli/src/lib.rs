// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! syrs - the stockyard offline-first inventory client library.
//!
//! This crate provides the functionality behind the `stockyard` CLI: a local
//! SQLite copy of the inventory that keeps working without a network, and a
//! sync engine that replays queued changes against the LAN backend once it is
//! reachable.
//!
//! # Main Components
//!
//! - [`sync`] - connectivity, discovery, the pending queue, replay, and the
//!   write coordinator that decides between the backend and the queue
//! - [`Config`] - client configuration (`config.toml` in the data directory)
//! - [`Error`] - error types for all commands
//!
//! # Usage
//!
//! ```rust,ignore
//! use syrs::sync::{HttpBackend, SyncContext, SyncQueue, SystemLink};
//!
//! let config = Config::load(&data_dir)?;
//! let options = config.sync_options();
//! let ctx = SyncContext::new(
//!     HttpBackend::new(options.check_timeout)?,
//!     Database::open(&db_path(&data_dir))?,
//!     SyncQueue::open(&queue_path(&data_dir))?,
//!     SystemLink,
//!     options,
//! )?;
//!
//! ctx.coordinator().create_product(NewProduct::new("A1", "Widget", 10)).await?;
//! let report = ctx.reconciler().drain().await?;
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod error;
pub mod id;
pub mod sync;

pub use cli::{
    BackendCommand, Cli, Command, OutputFormat, ProductCommand, ProductFields, SettingCommand,
    StockCommand,
};
pub use config::{db_path, queue_path, resolve_data_dir, Config};
pub use error::{Error, Result};

/// Execute a parsed command line. This is the main entry point for library
/// users and provides a testable way to run commands without process
/// execution.
pub fn run(cli: Cli) -> Result<()> {
    let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;
    match cli.command {
        Command::Init {
            host,
            port,
            no_discovery,
        } => commands::init::run(&data_dir, host, port, no_discovery),
        Command::Product(cmd) => commands::product::run(&data_dir, cmd),
        Command::Stock(cmd) => commands::stock::run(&data_dir, cmd),
        Command::Setting(cmd) => commands::setting::run(&data_dir, cmd),
        Command::Backend(cmd) => commands::backend::run(&data_dir, cmd),
        Command::Status { output } => commands::status::run(&data_dir, output),
        Command::Sync { output } => commands::sync::run(&data_dir, output),
        Command::Watch { interval } => commands::watch::run(&data_dir, interval),
        Command::Dashboard { output } => commands::dashboard::run(&data_dir, output),
    }
}
