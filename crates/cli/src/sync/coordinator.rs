// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Routes application writes to the backend or to the offline path.
//!
//! Every write is validated against the local repository first; a validation
//! failure never reaches the network or the queue. A validated write is then
//! expressed as one or more [`Mutation`]s, each executed in two phases:
//!
//! 1. remote attempt, skipped when offline, when the mutation refers to a
//!    product that only exists locally, or when an earlier queued change to
//!    the same entity is still pending
//! 2. on remote success the confirmed record is mirrored locally; on a
//!    transport failure or 5xx the mutation is applied locally and queued
//!
//! Any other 4xx is the backend refusing the change, and is returned to the
//! caller without touching the queue.

use chrono::{DateTime, Utc};
use sy_core::validate::{
    validate_configuration_key, validate_movement, validate_new_product, validate_product_patch,
};
use sy_core::{
    Configuration, ConfigurationValue, Dashboard, Movement, Mutation, NewMovement, NewProduct,
    Product, ProductPatch, QueueItem, RecordId,
};
use tracing::{debug, info, warn};

use super::backend::{bounded, Backend, BackendAddr, BackendError, BackendResult};
use super::connectivity::Mode;
use super::context::{SyncContext, SyncResult};

/// Outcome of a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied<T> {
    pub value: T,
    /// True if the backend confirmed every part of the write.
    pub synced: bool,
}

/// Record returned by the backend for a confirmed mutation.
#[derive(Debug)]
enum Confirmed {
    Product(Product),
    Deleted(RecordId),
    Movement(Movement),
    Configuration(Configuration),
}

/// How a single mutation was executed.
enum Executed {
    Remote(Confirmed),
    Local(DateTime<Utc>),
}

/// Write coordinator, borrowed from a [`SyncContext`].
pub struct Coordinator<'a, B: Backend> {
    ctx: &'a SyncContext<B>,
}

impl<'a, B: Backend> Coordinator<'a, B> {
    pub(super) fn new(ctx: &'a SyncContext<B>) -> Self {
        Coordinator { ctx }
    }

    pub async fn create_product(&self, product: NewProduct) -> SyncResult<Applied<Product>> {
        let local_id = {
            let db = self.ctx.db.lock().await;
            validate_new_product(&db, &product)?;
            db.allocate_temp_id()?
        };

        let executed = self
            .execute(Mutation::CreateProduct { local_id, product })
            .await?;
        match executed {
            Executed::Remote(Confirmed::Product(product)) => Ok(Applied {
                value: product,
                synced: true,
            }),
            _ => Ok(Applied {
                value: self.ctx.with_db(|db| db.get_product(local_id)).await?,
                synced: false,
            }),
        }
    }

    /// Update product fields. A quantity change is recorded as a stock
    /// adjustment movement rather than written directly.
    pub async fn update_product(
        &self,
        id: RecordId,
        patch: ProductPatch,
    ) -> SyncResult<Applied<Product>> {
        let mutations = {
            let db = self.ctx.db.lock().await;
            let current = validate_product_patch(&db, id, &patch)?;
            let mut mutations = Vec::new();
            let fields = patch.without_quantity();
            if !fields.is_empty() {
                mutations.push(Mutation::UpdateProduct { id, patch: fields });
            }
            let adjustment = patch
                .quantity
                .and_then(|target| NewMovement::adjustment(id, current.quantity, target));
            if let Some(movement) = adjustment {
                mutations.push(Mutation::CreateMovement {
                    local_id: db.allocate_temp_id()?,
                    movement,
                });
            }
            mutations
        };

        let mut synced = true;
        for mutation in mutations {
            synced &= matches!(self.execute(mutation).await?, Executed::Remote(_));
        }
        Ok(Applied {
            value: self.ctx.with_db(|db| db.get_product(id)).await?,
            synced,
        })
    }

    /// Delete a product. Returns the product as it was before deletion.
    pub async fn delete_product(&self, id: RecordId) -> SyncResult<Applied<Product>> {
        let product = self.ctx.with_db(|db| db.get_product(id)).await?;
        let mutation = Mutation::DeleteProduct {
            id,
            code: product.code.clone(),
        };
        let synced = matches!(self.execute(mutation).await?, Executed::Remote(_));
        Ok(Applied {
            value: product,
            synced,
        })
    }

    pub async fn record_movement(&self, movement: NewMovement) -> SyncResult<Applied<Movement>> {
        let local_id = {
            let db = self.ctx.db.lock().await;
            validate_movement(&db, &movement)?;
            db.allocate_temp_id()?
        };

        let mutation = Mutation::CreateMovement {
            local_id,
            movement: movement.clone(),
        };
        match self.execute(mutation).await? {
            Executed::Remote(Confirmed::Movement(confirmed)) => Ok(Applied {
                value: confirmed,
                synced: true,
            }),
            Executed::Remote(_) => Ok(Applied {
                value: Movement::from_new(local_id, &movement, Utc::now()),
                synced: true,
            }),
            Executed::Local(at) => Ok(Applied {
                value: Movement::from_new(local_id, &movement, at),
                synced: false,
            }),
        }
    }

    pub async fn set_configuration(
        &self,
        key: &str,
        value: &str,
        description: Option<String>,
    ) -> SyncResult<Applied<Configuration>> {
        validate_configuration_key(key)?;
        let key = key.trim().to_string();
        let mutation = Mutation::UpdateConfiguration {
            key: key.clone(),
            value: value.to_string(),
            description,
        };
        let synced = matches!(self.execute(mutation).await?, Executed::Remote(_));
        let stored = self.ctx.with_db(|db| db.get_configuration(&key)).await?;
        let value = stored.ok_or_else(|| sy_core::Error::CorruptedData(format!(
            "configuration '{key}' missing after write"
        )))?;
        Ok(Applied { value, synced })
    }

    // Reads are served from the local repository, which drains keep aligned
    // with the backend.

    pub async fn products(&self) -> SyncResult<Vec<Product>> {
        self.ctx.with_db(|db| db.list_products()).await
    }

    pub async fn product(&self, id: RecordId) -> SyncResult<Product> {
        self.ctx.with_db(|db| db.get_product(id)).await
    }

    pub async fn product_by_code(&self, code: &str) -> SyncResult<Option<Product>> {
        self.ctx.with_db(|db| db.find_product_by_code(code)).await
    }

    pub async fn movements(&self, product_id: Option<RecordId>) -> SyncResult<Vec<Movement>> {
        match product_id {
            Some(id) => self.ctx.with_db(|db| db.list_movements_for_product(id)).await,
            None => self.ctx.with_db(|db| db.list_movements()).await,
        }
    }

    pub async fn configurations(&self) -> SyncResult<Vec<Configuration>> {
        self.ctx.with_db(|db| db.list_configurations()).await
    }

    pub async fn configuration(&self, key: &str) -> SyncResult<Option<Configuration>> {
        self.ctx.with_db(|db| db.get_configuration(key)).await
    }

    /// Dashboard summary: from the backend when online, otherwise computed
    /// from the local repository.
    pub async fn dashboard(&self) -> SyncResult<Dashboard> {
        if let Some(addr) = self.online_address() {
            match bounded(self.ctx.options.request_timeout, self.ctx.backend.dashboard(&addr)).await
            {
                Ok(dashboard) => return Ok(dashboard),
                Err(e) => {
                    if e.is_transport() {
                        self.ctx.connectivity().report_unreachable();
                    }
                    debug!(error = %e, "remote dashboard unavailable, using local data");
                }
            }
        }
        self.ctx.with_db(|db| db.dashboard()).await
    }

    fn online_address(&self) -> Option<BackendAddr> {
        let connectivity = self.ctx.connectivity();
        match connectivity.current_mode() {
            Mode::Online => connectivity.last_known_good(),
            Mode::Offline => None,
        }
    }

    async fn execute(&self, mutation: Mutation) -> SyncResult<Executed> {
        match self.attempt_remote(&mutation).await? {
            Some(confirmed) => {
                self.mirror(&confirmed).await;
                Ok(Executed::Remote(confirmed))
            }
            None => {
                let at = self.apply_local_and_enqueue(mutation).await?;
                Ok(Executed::Local(at))
            }
        }
    }

    /// Try the backend. `Ok(None)` means the offline path should be taken.
    async fn attempt_remote(&self, mutation: &Mutation) -> SyncResult<Option<Confirmed>> {
        let Some(addr) = self.online_address() else {
            return Ok(None);
        };
        if let Some(temp) = mutation.pending_reference() {
            debug!(id = temp, "product not yet on backend, queueing");
            return Ok(None);
        }
        if self.has_pending_overlap(mutation).await? {
            debug!(change = %mutation.describe(), "earlier change still queued, queueing");
            return Ok(None);
        }

        match self.send(&addr, mutation).await {
            Ok(confirmed) => Ok(Some(confirmed)),
            Err(e) if e.falls_back() => {
                if e.is_transport() {
                    self.ctx.connectivity().report_unreachable();
                }
                info!(error = %e, change = %mutation.describe(), "backend unavailable, saving locally");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn has_pending_overlap(&self, mutation: &Mutation) -> SyncResult<bool> {
        let pending = self.ctx.queue.lock().await.peek_all()?;
        Ok(pending.iter().any(|item| item.mutation.overlaps(mutation)))
    }

    async fn send(&self, addr: &BackendAddr, mutation: &Mutation) -> BackendResult<Confirmed> {
        let backend = &self.ctx.backend;
        let limit = self.ctx.options.request_timeout;
        match mutation {
            Mutation::CreateProduct { product, .. } => {
                bounded(limit, backend.create_product(addr, product))
                    .await
                    .map(Confirmed::Product)
            }
            Mutation::UpdateProduct { id, patch } => {
                bounded(limit, backend.update_product(addr, *id, patch))
                    .await
                    .map(Confirmed::Product)
            }
            Mutation::DeleteProduct { id, .. } => {
                match bounded(limit, backend.delete_product(addr, *id)).await {
                    Ok(()) | Err(BackendError::NotFound) => Ok(Confirmed::Deleted(*id)),
                    Err(e) => Err(e),
                }
            }
            Mutation::CreateMovement { movement, .. } => {
                bounded(limit, backend.create_movement(addr, movement))
                    .await
                    .map(Confirmed::Movement)
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
                bounded(limit, backend.update_configuration(addr, key, &value))
                    .await
                    .map(Confirmed::Configuration)
            }
        }
    }

    /// Copy a confirmed record into the local repository. Failures are
    /// logged; the backend already holds the change.
    async fn mirror(&self, confirmed: &Confirmed) {
        let db = self.ctx.db.lock().await;
        let result = match confirmed {
            Confirmed::Product(product) => db.upsert_product(product),
            Confirmed::Deleted(id) => db.delete_product(*id).map(|_| ()),
            Confirmed::Movement(movement) => db.record_movement(movement),
            Confirmed::Configuration(config) => db.upsert_configuration(config),
        };
        if let Err(e) = result {
            warn!(error = %e, "change saved on backend but local copy not updated");
        }
    }

    async fn apply_local_and_enqueue(&self, mutation: Mutation) -> SyncResult<DateTime<Utc>> {
        let now = Utc::now();
        {
            let db = self.ctx.db.lock().await;
            if !db.apply(&mutation, now)? {
                debug!(change = %mutation.describe(), "local apply was a no-op");
            }
        }
        self.ctx
            .queue
            .lock()
            .await
            .enqueue(&QueueItem::new(mutation, now))?;
        Ok(now)
    }
}
