// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::cli::OutputFormat;
use crate::display::format_drain_report;
use crate::error::Result;
use crate::sync::{Backend, DrainReport, SyncContext};

use super::{block_on, open_context, print_json};

pub fn run(data_dir: &Path, output: OutputFormat) -> Result<()> {
    let (ctx, _) = open_context(data_dir)?;
    block_on(async {
        let report = run_impl(&ctx).await?;
        match output {
            OutputFormat::Json => print_json(&report),
            OutputFormat::Text => {
                println!("{}", format_drain_report(&report));
                Ok(())
            }
        }
    })
}

pub(crate) async fn run_impl<B: Backend>(ctx: &SyncContext<B>) -> Result<DrainReport> {
    Ok(ctx.reconciler().drain().await?)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
