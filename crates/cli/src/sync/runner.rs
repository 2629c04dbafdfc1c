// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue replay against the backend.
//!
//! A drain pass snapshots the queue, drops entries the eviction policy rules
//! out, and replays the rest in order. Outcomes per entry:
//!
//! - confirmed (including "already exists" for creates and "not found" for
//!   updates and deletes): removed from the queue
//! - transport failure: the pass stops, and this entry plus everything after
//!   it stays queued untouched
//! - any other failure: kept with its attempt counter bumped
//!
//! Temporary product ids are rewritten to server ids as creates are
//! confirmed, so later entries target the real product. The mapping is kept
//! in the local repository for entries queued after their create synced.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use sy_core::{ConfigurationValue, Mutation, QueueItem, RecordId};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::backend::{bounded, Backend, BackendAddr, BackendResult};
use super::context::{FlagGuard, SyncContext, SyncError, SyncResult};
use super::queue::Eviction;

/// Summary of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// False if the backend could not be reached and nothing was replayed.
    pub online: bool,
    pub succeeded: usize,
    /// Entries still queued after the pass.
    pub pending: usize,
    /// Entries discarded by the eviction policy or as orphans.
    pub evicted: usize,
    /// True if the local repository was refreshed from the backend.
    pub refreshed: bool,
}

/// Bookkeeping for a single pass.
#[derive(Default)]
struct Pass {
    /// Temporary id to server id, for creates confirmed so far.
    ids: HashMap<RecordId, RecordId>,
    /// Temporary ids whose create is still queued.
    waiting: HashSet<RecordId>,
    successor: Vec<QueueItem>,
    succeeded: usize,
    orphaned: usize,
    interrupted: bool,
}

impl Pass {
    fn remap(&self, item: QueueItem) -> QueueItem {
        let target = item
            .mutation
            .pending_reference()
            .and_then(|temp| self.ids.get(&temp).map(|real| (temp, *real)));
        match target {
            Some((temp, real)) => item.remap_product(temp, real),
            None => item,
        }
    }
}

/// Queue reconciler, borrowed from a [`SyncContext`].
pub struct Reconciler<'a, B: Backend> {
    ctx: &'a SyncContext<B>,
}

impl<'a, B: Backend> Reconciler<'a, B> {
    pub(super) fn new(ctx: &'a SyncContext<B>) -> Self {
        Reconciler { ctx }
    }

    /// Replay the pending queue against the backend.
    ///
    /// Offline, this returns immediately with the queue untouched. Only one
    /// pass runs at a time; a concurrent call gets
    /// [`SyncError::DrainInProgress`].
    pub async fn drain(&self) -> SyncResult<DrainReport> {
        let Some(_pass) = FlagGuard::acquire(&self.ctx.draining) else {
            return Err(SyncError::DrainInProgress);
        };

        let connectivity = self.ctx.connectivity();
        let addr = match connectivity.check_connectivity().await {
            true => connectivity.last_known_good(),
            false => None,
        };
        let Some(addr) = addr else {
            let pending = self.ctx.queue.lock().await.len()?;
            debug!(pending, "offline, not syncing");
            return Ok(DrainReport {
                pending,
                ..DrainReport::default()
            });
        };

        let mut queue = self.ctx.queue.lock().await;
        let Some(_claim) = queue.try_claim_drain()? else {
            return Err(SyncError::DrainInProgress);
        };

        let snapshot = queue.peek_all()?;
        let consumed = snapshot.len();
        let Eviction { kept, evicted } = self.ctx.options.eviction.evict(snapshot, Utc::now());
        for item in &evicted {
            warn!(
                attempts = item.attempts,
                enqueued_at = %item.enqueued_at,
                "discarding queued change: {}",
                item.mutation.describe()
            );
        }

        // Entries may still name a temporary id reconciled by an earlier pass.
        let mut pass = Pass {
            ids: self.ctx.db.lock().await.reconciled_ids()?,
            ..Pass::default()
        };
        let mut remaining = kept.into_iter();
        while let Some(item) = remaining.next() {
            let item = pass.remap(item);

            if let Some(temp) = item.mutation.pending_reference() {
                if pass.waiting.contains(&temp) {
                    pass.successor.push(item);
                } else {
                    warn!(
                        "discarding change for a product that was never created: {}",
                        item.mutation.describe()
                    );
                    pass.orphaned += 1;
                }
                continue;
            }

            match self.replay(&addr, &item.mutation).await {
                Ok(mapped) => {
                    debug!(change = %item.mutation.describe(), "synced");
                    pass.succeeded += 1;
                    if let Some((temp, real)) = mapped {
                        pass.ids.insert(temp, real);
                        let db = self.ctx.db.lock().await;
                        if let Err(e) = db.remap_product_id(temp, real) {
                            warn!(error = %e, temp, real, "could not rewrite local product id");
                        }
                    }
                }
                Err(e) if e.is_transport() => {
                    warn!(error = %e, "lost backend during sync, stopping");
                    connectivity.report_unreachable();
                    pass.successor.push(item);
                    for rest in remaining.by_ref() {
                        let rest = pass.remap(rest);
                        pass.successor.push(rest);
                    }
                    pass.interrupted = true;
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        attempts = item.attempts + 1,
                        "sync failed, will retry: {}",
                        item.mutation.describe()
                    );
                    if let Mutation::CreateProduct { local_id, .. } = &item.mutation {
                        pass.waiting.insert(*local_id);
                    }
                    pass.successor.push(item.with_failed_attempt());
                }
            }
        }

        queue.commit_pass(consumed, &pass.successor, &pass.ids)?;
        let still_pending = queue.peek_all()?;

        let mut refreshed = false;
        if pass.succeeded > 0 && !pass.interrupted {
            match self.refresh_from(&addr, &still_pending).await {
                Ok(()) => refreshed = true,
                Err(e) => {
                    if matches!(&e, SyncError::Backend(e) if e.is_transport()) {
                        connectivity.report_unreachable();
                    }
                    warn!(error = %e, "could not refresh local data after sync");
                }
            }
        }

        let report = DrainReport {
            online: true,
            succeeded: pass.succeeded,
            pending: still_pending.len(),
            evicted: evicted.len() + pass.orphaned,
            refreshed,
        };
        info!(
            succeeded = report.succeeded,
            pending = report.pending,
            evicted = report.evicted,
            "sync pass finished"
        );
        Ok(report)
    }

    /// Replace the local collections with the backend's, then re-apply
    /// whatever is still queued.
    ///
    /// Returns false without touching anything when offline.
    pub async fn refresh(&self) -> SyncResult<bool> {
        let connectivity = self.ctx.connectivity();
        if !connectivity.check_connectivity().await {
            return Ok(false);
        }
        let Some(addr) = connectivity.last_known_good() else {
            return Ok(false);
        };

        let queue = self.ctx.queue.lock().await;
        let pending = queue.peek_all()?;
        match self.refresh_from(&addr, &pending).await {
            Ok(()) => Ok(true),
            Err(e) => {
                if matches!(&e, SyncError::Backend(e) if e.is_transport()) {
                    connectivity.report_unreachable();
                }
                Err(e)
            }
        }
    }

    async fn refresh_from(&self, addr: &BackendAddr, pending: &[QueueItem]) -> SyncResult<()> {
        let backend = &self.ctx.backend;
        let limit = self.ctx.options.request_timeout;
        let products = bounded(limit, backend.list_products(addr)).await?;
        let movements = bounded(limit, backend.list_movements(addr)).await?;
        let configurations = bounded(limit, backend.list_configurations(addr)).await?;

        let db = self.ctx.db.lock().await;
        db.replace_all(&products, &movements, &configurations)?;
        for item in pending {
            db.apply(&item.mutation, item.enqueued_at)?;
        }
        debug!(
            products = products.len(),
            movements = movements.len(),
            pending = pending.len(),
            "refreshed local data"
        );
        Ok(())
    }

    /// Replay one mutation. On a confirmed create, returns the mapping from
    /// its temporary id to the server id.
    async fn replay(
        &self,
        addr: &BackendAddr,
        mutation: &Mutation,
    ) -> BackendResult<Option<(RecordId, RecordId)>> {
        let backend = &self.ctx.backend;
        let limit = self.ctx.options.request_timeout;
        match mutation {
            Mutation::CreateProduct { local_id, product } => {
                match bounded(limit, backend.create_product(addr, product)).await {
                    Ok(created) => Ok(Some((*local_id, created.id))),
                    Err(e) if e.is_conflict() => {
                        debug!(code = %product.code, "product already on backend");
                        // Without the server id, dependents cannot be replayed.
                        let existing =
                            bounded(limit, backend.get_product_by_code(addr, &product.code)).await?;
                        Ok(Some((*local_id, existing.id)))
                    }
                    Err(e) => Err(e),
                }
            }
            Mutation::UpdateProduct { id, patch } => {
                absent_is_done(bounded(limit, backend.update_product(addr, *id, patch)).await)
            }
            Mutation::DeleteProduct { id, .. } => {
                absent_is_done(bounded(limit, backend.delete_product(addr, *id)).await)
            }
            Mutation::CreateMovement { movement, .. } => {
                match bounded(limit, backend.create_movement(addr, movement)).await {
                    Ok(_) => Ok(None),
                    Err(e) if e.is_conflict() => Ok(None),
                    Err(e) => Err(e),
                }
            }
            Mutation::UpdateConfiguration {
                key,
                value,
                description,
            } => {
                let value = ConfigurationValue {
                    value: value.clone(),
                    description: description.clone(),
                };
                absent_is_done(bounded(limit, backend.update_configuration(addr, key, &value)).await)
            }
        }
    }

    /// Drain every `every` until `shutdown` resolves, reporting each pass.
    pub async fn run_periodic<F>(
        &self,
        every: Duration,
        shutdown: F,
        mut on_pass: impl FnMut(&DrainReport),
    ) -> SyncResult<()>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => match self.drain().await {
                    Ok(report) => on_pass(&report),
                    Err(SyncError::DrainInProgress) => debug!("previous sync still running"),
                    Err(e) => warn!(error = %e, "sync pass failed"),
                },
                _ = &mut shutdown => {
                    info!("stopping periodic sync");
                    return Ok(());
                }
            }
        }
    }
}

/// Updates and deletes of something the backend no longer has are done.
fn absent_is_done<T>(result: BackendResult<T>) -> BackendResult<Option<(RecordId, RecordId)>> {
    match result {
        Ok(_) => Ok(None),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
