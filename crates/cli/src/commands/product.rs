// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use serde::Serialize;
use sy_core::{Movement, NewProduct, Product, ProductPatch};

use crate::cli::{OutputFormat, ProductCommand, ProductFields};
use crate::display::{format_product_details, format_product_line};
use crate::error::{Error, Result};
use crate::id::format_id;
use crate::sync::{Backend, SyncContext};

use super::{block_on, open_context, print_json, resolve_product, sync_note, warm_connectivity};

/// Movements shown by `product show`.
const RECENT_MOVEMENTS: usize = 10;

#[derive(Serialize)]
struct ProductDetails {
    #[serde(flatten)]
    product: Product,
    movements: Vec<Movement>,
}

#[derive(Serialize)]
struct Written<'a> {
    #[serde(flatten)]
    product: &'a Product,
    synced: bool,
}

pub fn run(data_dir: &Path, cmd: ProductCommand) -> Result<()> {
    let (ctx, _) = open_context(data_dir)?;
    block_on(run_impl(&ctx, cmd))
}

pub(crate) async fn run_impl<B: Backend>(ctx: &SyncContext<B>, cmd: ProductCommand) -> Result<()> {
    match cmd {
        ProductCommand::Add {
            code,
            name,
            quantity,
            fields,
            output,
        } => add(ctx, new_product(code, name, quantity, fields), output).await,
        ProductCommand::Edit {
            product,
            code,
            name,
            quantity,
            fields,
        } => {
            let patch = ProductPatch {
                code,
                name,
                quantity,
                description: fields.description,
                min_quantity: fields.min_quantity,
                location: fields.location,
                supplier: fields.supplier,
                notes: fields.notes,
            };
            edit(ctx, &product, patch).await
        }
        ProductCommand::Rm { product } => remove(ctx, &product).await,
        ProductCommand::List { low, output } => list(ctx, low, output).await,
        ProductCommand::Show { product, output } => show(ctx, &product, output).await,
    }
}

fn new_product(code: String, name: String, quantity: i64, fields: ProductFields) -> NewProduct {
    NewProduct {
        description: fields.description,
        min_quantity: fields.min_quantity.unwrap_or(0),
        location: fields.location,
        supplier: fields.supplier,
        notes: fields.notes,
        ..NewProduct::new(code.trim(), name.trim(), quantity)
    }
}

async fn add<B: Backend>(ctx: &SyncContext<B>, product: NewProduct, output: OutputFormat) -> Result<()> {
    warm_connectivity(ctx).await;
    let applied = ctx.coordinator().create_product(product).await?;
    match output {
        OutputFormat::Json => print_json(&Written {
            product: &applied.value,
            synced: applied.synced,
        }),
        OutputFormat::Text => {
            println!(
                "Added {} [{}]{}",
                applied.value.code,
                format_id(applied.value.id),
                sync_note(applied.synced)
            );
            Ok(())
        }
    }
}

async fn edit<B: Backend>(ctx: &SyncContext<B>, reference: &str, patch: ProductPatch) -> Result<()> {
    if patch.is_empty() {
        return Err(Error::NothingToChange);
    }
    let product = resolve_product(ctx, reference).await?;
    warm_connectivity(ctx).await;
    let applied = ctx.coordinator().update_product(product.id, patch).await?;
    println!(
        "Updated {} [{}]{}",
        applied.value.code,
        format_id(applied.value.id),
        sync_note(applied.synced)
    );
    Ok(())
}

async fn remove<B: Backend>(ctx: &SyncContext<B>, reference: &str) -> Result<()> {
    let product = resolve_product(ctx, reference).await?;
    warm_connectivity(ctx).await;
    let applied = ctx.coordinator().delete_product(product.id).await?;
    println!(
        "Removed {} [{}]{}",
        applied.value.code,
        format_id(applied.value.id),
        sync_note(applied.synced)
    );
    Ok(())
}

async fn list<B: Backend>(ctx: &SyncContext<B>, low: bool, output: OutputFormat) -> Result<()> {
    let mut products = ctx.coordinator().products().await?;
    if low {
        products.retain(Product::is_low_stock);
    }
    match output {
        OutputFormat::Json => print_json(&products),
        OutputFormat::Text => {
            if products.is_empty() {
                println!("No products");
            }
            for product in &products {
                println!("{}", format_product_line(product));
            }
            Ok(())
        }
    }
}

async fn show<B: Backend>(ctx: &SyncContext<B>, reference: &str, output: OutputFormat) -> Result<()> {
    let product = resolve_product(ctx, reference).await?;
    let mut movements = ctx.coordinator().movements(Some(product.id)).await?;
    movements.truncate(RECENT_MOVEMENTS);
    match output {
        OutputFormat::Json => print_json(&ProductDetails { product, movements }),
        OutputFormat::Text => {
            println!("{}", format_product_details(&product, &movements));
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "product_tests.rs"]
mod tests;
