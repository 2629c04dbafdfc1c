// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use args::ProductFields;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Parse a quantity that must be strictly positive.
fn positive_quantity(s: &str) -> Result<i64, String> {
    match s.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err("must be greater than zero".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// Custom help template that groups commands into sections
const HELP_TEMPLATE: &str = "{about-with-newline}
{usage-heading} {usage}

{before-help}Options:
{options}{after-help}";

const COMMANDS_HELP: &str = "\
Inventory:
  product     Add, edit, remove and list products
  stock       Record stock movements and view history
  setting     Manage shared settings
  dashboard   Show a stock overview

Sync:
  status      Show connection state and pending changes
  sync        Push pending changes to the backend
  watch       Keep syncing on an interval
  backend     Configure and locate the backend

Setup:
  init        Initialize local data
";

const QUICKSTART_HELP: &str = "
Get started:
  stockyard init --host 192.168.1.20       Initialize and point at a backend
  stockyard product add A1 \"Widget\" 10     Add a product
  stockyard stock out A1 3                 Take three units out
  stockyard status                         See what is waiting to sync";

#[derive(Parser)]
#[command(name = "stockyard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "An offline-first inventory client that syncs with a LAN backend")]
#[command(
    long_about = "An offline-first inventory client.\n\n\
    Every change is applied locally first. When the backend is reachable, changes are sent \
    right away; otherwise they are queued and replayed by 'stockyard sync'."
)]
#[command(help_template = HELP_TEMPLATE)]
#[command(before_help = COMMANDS_HELP)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Use <path> for local data instead of the default data directory
    #[arg(long = "data-dir", global = true, value_name = "path")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize local data
    #[command(after_help = "\
Examples:
  stockyard init                            Discover the backend on the LAN
  stockyard init --host 10.0.0.5            Use a fixed backend host
  stockyard init --host inv.lan --port 8080 Use a non-default port
  stockyard init --no-discovery             Never sweep the network")]
    Init {
        /// Backend host name or IP address
        #[arg(long, value_parser = non_empty_string)]
        host: Option<String>,

        /// Backend port
        #[arg(long)]
        port: Option<u16>,

        /// Disable local network discovery
        #[arg(long)]
        no_discovery: bool,
    },

    /// Manage products
    #[command(subcommand)]
    Product(ProductCommand),

    /// Record stock movements
    #[command(subcommand)]
    Stock(StockCommand),

    /// Manage settings shared with the backend
    #[command(subcommand)]
    Setting(SettingCommand),

    /// Configure and locate the backend
    #[command(subcommand)]
    Backend(BackendCommand),

    /// Show connection state and pending changes
    Status {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Push pending changes to the backend and refresh local data
    Sync {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Sync on an interval until interrupted
    #[command(after_help = "\
Examples:
  stockyard watch                Sync every [sync] interval_secs
  stockyard watch -i 15          Sync every 15 seconds")]
    Watch {
        /// Seconds between sync passes
        #[arg(long, short)]
        interval: Option<u64>,
    },

    /// Show a stock overview
    Dashboard {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

/// Product management commands.
#[derive(Subcommand)]
pub enum ProductCommand {
    /// Add a product
    #[command(
        arg_required_else_help = true,
        after_help = "\
Examples:
  stockyard product add A1 \"Widget\"                 Add with zero stock
  stockyard product add A1 \"Widget\" 10 --min 2      Add with stock and a threshold
  stockyard product add B7 \"Bolt\" 500 -l \"Shelf 3\"  Add with a location"
    )]
    Add {
        /// Unique product code
        #[arg(value_parser = non_empty_string)]
        code: String,

        /// Product name
        #[arg(value_parser = non_empty_string)]
        name: String,

        /// Initial stock level
        #[arg(default_value_t = 0)]
        quantity: i64,

        #[command(flatten)]
        fields: ProductFields,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Edit a product
    ///
    /// Changing the quantity records an adjustment movement for the difference.
    #[command(
        arg_required_else_help = true,
        after_help = "\
Examples:
  stockyard product edit A1 --name \"Large widget\"   Rename
  stockyard product edit A1 --quantity 12           Correct the stock level
  stockyard product edit L1 --code A2               Edit a product not yet synced"
    )]
    Edit {
        /// Product id or code
        product: String,

        /// New product code
        #[arg(long, value_parser = non_empty_string)]
        code: Option<String>,

        /// New product name
        #[arg(long, value_parser = non_empty_string)]
        name: Option<String>,

        /// New stock level
        #[arg(long, short = 'q')]
        quantity: Option<i64>,

        #[command(flatten)]
        fields: ProductFields,
    },

    /// Remove a product
    #[command(arg_required_else_help = true)]
    Rm {
        /// Product id or code
        product: String,
    },

    /// List products
    List {
        /// Only products at or below their minimum stock level
        #[arg(long)]
        low: bool,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show product details and recent movements
    #[command(arg_required_else_help = true)]
    Show {
        /// Product id or code
        product: String,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

/// Stock movement commands.
#[derive(Subcommand)]
pub enum StockCommand {
    /// Record stock coming in
    #[command(
        arg_required_else_help = true,
        after_help = "\
Examples:
  stockyard stock in A1 20                    Receive 20 units
  stockyard stock in A1 5 -n \"PO 1182\"        Receive with a note"
    )]
    In {
        /// Product id or code
        product: String,

        /// Number of units
        #[arg(value_parser = positive_quantity)]
        quantity: i64,

        /// Note stored with the movement
        #[arg(long, short)]
        notes: Option<String>,
    },

    /// Record stock going out
    #[command(arg_required_else_help = true)]
    Out {
        /// Product id or code
        product: String,

        /// Number of units
        #[arg(value_parser = positive_quantity)]
        quantity: i64,

        /// Note stored with the movement
        #[arg(long, short)]
        notes: Option<String>,
    },

    /// Show movement history
    Log {
        /// Only movements for this product (id or code)
        product: Option<String>,

        /// Maximum number of movements
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

/// Shared setting commands.
#[derive(Subcommand)]
pub enum SettingCommand {
    /// Set a value
    #[command(arg_required_else_help = true)]
    Set {
        #[arg(value_parser = non_empty_string)]
        key: String,

        value: String,

        /// Description stored with the setting
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Print a value
    #[command(arg_required_else_help = true)]
    Get { key: String },

    /// List all settings
    List {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

/// Backend location commands.
#[derive(Subcommand)]
pub enum BackendCommand {
    /// Use a fixed backend address
    #[command(
        arg_required_else_help = true,
        after_help = "\
Examples:
  stockyard backend set 192.168.1.20          Use the default port
  stockyard backend set inv.lan --port 8080   Use a non-default port"
    )]
    Set {
        #[arg(value_parser = non_empty_string)]
        host: String,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Forget the configured and remembered backend addresses
    Clear,

    /// Check whether the backend is reachable, discovering it if needed
    Check,

    /// Sweep the local network for a backend
    Discover,
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
