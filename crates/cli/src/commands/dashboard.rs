// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::cli::OutputFormat;
use crate::display::{format_dashboard, product_codes};
use crate::error::Result;
use crate::sync::{Backend, SyncContext};

use super::{block_on, open_context, print_json, warm_connectivity};

pub fn run(data_dir: &Path, output: OutputFormat) -> Result<()> {
    let (ctx, _) = open_context(data_dir)?;
    block_on(run_impl(&ctx, output))
}

/// Print the dashboard, from the backend when reachable.
pub(crate) async fn run_impl<B: Backend>(ctx: &SyncContext<B>, output: OutputFormat) -> Result<()> {
    warm_connectivity(ctx).await;
    let coordinator = ctx.coordinator();
    let dashboard = coordinator.dashboard().await?;
    match output {
        OutputFormat::Json => print_json(&dashboard),
        OutputFormat::Text => {
            let codes = product_codes(&coordinator.products().await?);
            println!("{}", format_dashboard(&dashboard, &codes));
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
