// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use chrono::Local;
use tracing::warn;

use crate::display::format_drain_report;
use crate::error::Result;
use crate::sync::{Backend, DrainReport, SyncContext};

use super::{block_on, open_context};

pub fn run(data_dir: &Path, interval: Option<u64>) -> Result<()> {
    let (ctx, config) = open_context(data_dir)?;
    let every = match interval {
        Some(secs) => Duration::from_secs(secs.max(1)),
        None => config.watch_interval(),
    };
    println!("Syncing every {}s, Ctrl-C to stop", every.as_secs());
    block_on(run_impl(&ctx, every, shutdown_signal(), |report| {
        println!(
            "{}  {}",
            Local::now().format("%H:%M:%S"),
            format_drain_report(report)
        );
    }))
}

/// Drain on a timer until `shutdown` resolves.
pub(crate) async fn run_impl<B: Backend>(
    ctx: &SyncContext<B>,
    every: Duration,
    shutdown: impl Future<Output = ()>,
    on_pass: impl FnMut(&DrainReport),
) -> Result<()> {
    Ok(ctx
        .reconciler()
        .run_periodic(every, shutdown, on_pass)
        .await?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
