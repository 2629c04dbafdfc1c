// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use syrs::Cli;

/// Environment variable holding the log filter (`tracing_subscriber` syntax).
const LOG_ENV: &str = "STOCKYARD_LOG";

fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    setup_logging();
    let cli = Cli::parse();
    if let Err(e) = syrs::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
