// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sy_core::QueueItem;

use crate::cli::OutputFormat;
use crate::display::format_pending_line;
use crate::error::Result;
use crate::sync::{Backend, Mode, SyncContext};

use super::{block_on, open_context, print_json, warm_connectivity};

/// Connection state and queue contents, as reported by `status`.
#[derive(Debug, Serialize)]
pub(crate) struct Status {
    pub mode: Mode,
    /// Address in use, or the configured one while offline.
    pub backend: Option<String>,
    pub last_contact: Option<DateTime<Utc>>,
    pub pending: Vec<QueueItem>,
}

pub fn run(data_dir: &Path, output: OutputFormat) -> Result<()> {
    let (ctx, _) = open_context(data_dir)?;
    block_on(async {
        let status = run_impl(&ctx).await?;
        match output {
            OutputFormat::Json => print_json(&status),
            OutputFormat::Text => {
                print_text(data_dir, &status);
                Ok(())
            }
        }
    })
}

pub(crate) async fn run_impl<B: Backend>(ctx: &SyncContext<B>) -> Result<Status> {
    warm_connectivity(ctx).await;
    let connectivity = ctx.connectivity();
    let state = connectivity.state();
    let backend = match state.last_known_good {
        Some(addr) => Some(addr),
        None => connectivity.configured_address().await,
    };
    Ok(Status {
        mode: state.mode,
        backend: backend.map(|addr| addr.to_string()),
        last_contact: state.last_contact,
        pending: ctx.pending().await?,
    })
}

fn print_text(data_dir: &Path, status: &Status) {
    println!("Data: {}", data_dir.display());
    match &status.backend {
        Some(addr) => println!("Backend: {} ({})", addr, status.mode),
        None => println!("Backend: not configured ({})", status.mode),
    }
    if status.pending.is_empty() {
        println!("Pending: none");
        return;
    }
    println!("Pending: {}", status.pending.len());
    for item in &status.pending {
        println!("{}", format_pending_line(item));
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
