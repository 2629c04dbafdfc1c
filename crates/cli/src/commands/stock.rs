// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use sy_core::{MovementKind, NewMovement};

use crate::cli::{OutputFormat, StockCommand};
use crate::display::{format_movement_line, product_codes};
use crate::error::Result;
use crate::sync::{Backend, SyncContext};

use super::{block_on, open_context, print_json, resolve_product, sync_note, warm_connectivity};

pub fn run(data_dir: &Path, cmd: StockCommand) -> Result<()> {
    let (ctx, _) = open_context(data_dir)?;
    block_on(run_impl(&ctx, cmd))
}

pub(crate) async fn run_impl<B: Backend>(ctx: &SyncContext<B>, cmd: StockCommand) -> Result<()> {
    match cmd {
        StockCommand::In {
            product,
            quantity,
            notes,
        } => record(ctx, &product, MovementKind::Inbound, quantity, notes).await,
        StockCommand::Out {
            product,
            quantity,
            notes,
        } => record(ctx, &product, MovementKind::Outbound, quantity, notes).await,
        StockCommand::Log {
            product,
            limit,
            output,
        } => log(ctx, product.as_deref(), limit, output).await,
    }
}

async fn record<B: Backend>(
    ctx: &SyncContext<B>,
    reference: &str,
    kind: MovementKind,
    quantity: i64,
    notes: Option<String>,
) -> Result<()> {
    let product = resolve_product(ctx, reference).await?;
    let movement = NewMovement {
        notes,
        ..NewMovement::new(product.id, kind, quantity)
    };

    warm_connectivity(ctx).await;
    let coordinator = ctx.coordinator();
    let applied = coordinator.record_movement(movement).await?;
    let level = coordinator.product(applied.value.product_id).await?.quantity;
    println!(
        "{} {} x{}, now {}{}",
        product.code,
        kind,
        quantity,
        level,
        sync_note(applied.synced)
    );
    Ok(())
}

async fn log<B: Backend>(
    ctx: &SyncContext<B>,
    reference: Option<&str>,
    limit: Option<usize>,
    output: OutputFormat,
) -> Result<()> {
    let coordinator = ctx.coordinator();
    let product_id = match reference {
        Some(reference) => Some(resolve_product(ctx, reference).await?.id),
        None => None,
    };
    let mut movements = coordinator.movements(product_id).await?;
    if let Some(limit) = limit {
        movements.truncate(limit);
    }

    match output {
        OutputFormat::Json => print_json(&movements),
        OutputFormat::Text => {
            if movements.is_empty() {
                println!("No movements");
                return Ok(());
            }
            let codes = product_codes(&coordinator.products().await?);
            for movement in &movements {
                let code = match product_id {
                    Some(_) => None,
                    None => codes.get(&movement.product_id).map(String::as_str),
                };
                println!("{}", format_movement_line(movement, code));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "stock_tests.rs"]
mod tests;
