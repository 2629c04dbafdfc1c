// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod backend;
pub mod dashboard;
pub mod init;
pub mod product;
pub mod setting;
pub mod status;
pub mod stock;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
pub mod watch;

use std::future::Future;
use std::path::Path;

use serde::Serialize;
use sy_core::{Database, Product};

use crate::config::{db_path, ensure_initialized, queue_path, Config};
use crate::error::{Error, Result};
use crate::id::parse_id;
use crate::sync::{Backend, HttpBackend, SyncContext, SyncQueue, SystemLink};

/// The engine as the binary runs it.
pub type Context = SyncContext<HttpBackend>;

/// Open the local stores under `data_dir` and assemble the sync engine.
pub fn open_context(data_dir: &Path) -> Result<(Context, Config)> {
    ensure_initialized(data_dir)?;
    let config = Config::load(data_dir)?;
    let options = config.sync_options();
    let db = Database::open(&db_path(data_dir))?;
    let queue = SyncQueue::open(&queue_path(data_dir))?;
    let backend = HttpBackend::new(options.check_timeout)?;
    let ctx = SyncContext::new(backend, db, queue, SystemLink, options)?;
    Ok((ctx, config))
}

/// Run a command future to completion on a fresh runtime.
pub fn block_on<T>(future: impl Future<Output = Result<T>>) -> Result<T> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(future)
}

/// Find a product by id (`42`, `L3`) or, failing that, by code.
pub(crate) async fn resolve_product<B: Backend>(
    ctx: &SyncContext<B>,
    reference: &str,
) -> Result<Product> {
    let coordinator = ctx.coordinator();
    if let Some(id) = parse_id(reference) {
        match coordinator.product(id).await.map_err(Error::from) {
            Ok(product) => return Ok(product),
            Err(Error::ProductNotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }
    coordinator
        .product_by_code(reference.trim())
        .await?
        .ok_or_else(|| Error::ProductNotFound(reference.to_string()))
}

/// Refresh the cached mode before a write, without running discovery.
pub(crate) async fn warm_connectivity<B: Backend>(ctx: &SyncContext<B>) {
    ctx.connectivity().probe_known().await;
}

/// Suffix for a write confirmation.
pub(crate) fn sync_note(synced: bool) -> &'static str {
    if synced {
        ""
    } else {
        " (queued for sync)"
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
