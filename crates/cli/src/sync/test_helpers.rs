// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use sy_core::db::{SETTING_BACKEND_HOST, SETTING_BACKEND_PORT};
use sy_core::{
    Configuration, ConfigurationValue, Dashboard, Database, Movement, MovementKind, Mutation,
    NewMovement, NewProduct, Product, ProductPatch, QueueItem, RecordId,
};
use tempfile::TempDir;

use super::backend::{Backend, BackendAddr, BackendError, BackendFuture, BackendResult};
use super::connectivity::NetworkLink;
use super::context::{DiscoveryOptions, SyncContext, SyncOptions};
use super::queue::{EvictionPolicy, SyncQueue};

/// Server-side state of a [`MockBackend`].
#[derive(Default)]
pub struct MockState {
    /// Addresses that answer. Everything else is unreachable.
    pub reachable: HashSet<BackendAddr>,
    pub products: BTreeMap<RecordId, Product>,
    pub movements: Vec<Movement>,
    pub configurations: BTreeMap<String, Configuration>,
    pub next_id: RecordId,
    /// Every probe, in order.
    pub probes: Vec<BackendAddr>,
    /// Every data call that reached a live address, in order.
    pub calls: Vec<String>,
    /// Errors returned by the next data calls, before any state change.
    pub scripted: VecDeque<BackendError>,
    /// After this many more data calls, every address stops answering.
    pub unreachable_after: Option<usize>,
}

/// In-memory backend with scriptable failures.
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        let state = MockState {
            next_id: 100,
            ..MockState::default()
        };
        MockBackend {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Answer requests on `addr`.
    pub fn serve(&self, addr: &BackendAddr) {
        self.state().reachable.insert(addr.clone());
    }

    /// Stop answering on every address.
    pub fn go_down(&self) {
        self.state().reachable.clear();
    }

    /// Fail the next data call with `err`.
    pub fn script(&self, err: BackendError) {
        self.state().scripted.push_back(err);
    }

    /// Let `calls` more data calls through, then go down.
    pub fn drop_after(&self, calls: usize) {
        self.state().unreachable_after = Some(calls);
    }

    pub fn probe_count(&self, addr: &BackendAddr) -> usize {
        self.state().probes.iter().filter(|p| *p == addr).count()
    }

    pub fn total_probes(&self) -> usize {
        self.state().probes.len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Data calls that change server state.
    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                c.starts_with("create_")
                    || c.starts_with("update_")
                    || c.starts_with("delete_")
            })
            .collect()
    }

    pub fn seed_product(&self, code: &str, quantity: i64) -> Product {
        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;
        let product = Product::from_new(id, &NewProduct::new(code, "Widget", quantity), Utc::now());
        state.products.insert(id, product.clone());
        product
    }

    pub fn product_by_code(&self, code: &str) -> Option<Product> {
        self.state()
            .products
            .values()
            .find(|p| p.code == code)
            .cloned()
    }

    fn enter(&self, addr: &BackendAddr, call: String) -> BackendResult<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        if state.unreachable_after == Some(0) {
            state.reachable.clear();
            state.unreachable_after = None;
        }
        if !state.reachable.contains(addr) {
            return Err(BackendError::Unreachable(format!("{addr} refused")));
        }
        if let Some(left) = state.unreachable_after.as_mut() {
            *left -= 1;
        }
        state.calls.push(call);
        if let Some(err) = state.scripted.pop_front() {
            return Err(err);
        }
        Ok(state)
    }

    fn ready<'a, T: Send + 'a>(result: BackendResult<T>) -> BackendFuture<'a, T> {
        Box::pin(std::future::ready(result))
    }
}

fn allocate(state: &mut MockState) -> RecordId {
    let id = state.next_id;
    state.next_id += 1;
    id
}

impl Backend for MockBackend {
    fn probe<'a>(&'a self, addr: &'a BackendAddr) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            // Let concurrent callers interleave, like a real network call.
            tokio::task::yield_now().await;
            let mut state = self.state();
            state.probes.push(addr.clone());
            if state.reachable.contains(addr) {
                Ok(())
            } else {
                Err(BackendError::Unreachable(format!("{addr} refused")))
            }
        })
    }

    fn list_products<'a>(&'a self, addr: &'a BackendAddr) -> BackendFuture<'a, Vec<Product>> {
        let result = self
            .enter(addr, "list_products".into())
            .map(|state| state.products.values().cloned().collect());
        Self::ready(result)
    }

    fn get_product<'a>(
        &'a self,
        addr: &'a BackendAddr,
        id: RecordId,
    ) -> BackendFuture<'a, Product> {
        let result = self
            .enter(addr, format!("get_product {id}"))
            .and_then(|state| state.products.get(&id).cloned().ok_or(BackendError::NotFound));
        Self::ready(result)
    }

    fn get_product_by_code<'a>(
        &'a self,
        addr: &'a BackendAddr,
        code: &'a str,
    ) -> BackendFuture<'a, Product> {
        let result = self
            .enter(addr, format!("get_product_by_code {code}"))
            .and_then(|state| {
                state
                    .products
                    .values()
                    .find(|p| p.code == code)
                    .cloned()
                    .ok_or(BackendError::NotFound)
            });
        Self::ready(result)
    }

    fn create_product<'a>(
        &'a self,
        addr: &'a BackendAddr,
        product: &'a NewProduct,
    ) -> BackendFuture<'a, Product> {
        let result = self
            .enter(addr, format!("create_product {}", product.code))
            .and_then(|mut state| {
                if state.products.values().any(|p| p.code == product.code) {
                    return Err(BackendError::Conflict(format!(
                        "code {} already exists",
                        product.code
                    )));
                }
                let id = allocate(&mut state);
                let created = Product::from_new(id, product, Utc::now());
                state.products.insert(id, created.clone());
                Ok(created)
            });
        Self::ready(result)
    }

    fn update_product<'a>(
        &'a self,
        addr: &'a BackendAddr,
        id: RecordId,
        patch: &'a ProductPatch,
    ) -> BackendFuture<'a, Product> {
        let result = self
            .enter(addr, format!("update_product {id}"))
            .and_then(|mut state| {
                let product = state.products.get_mut(&id).ok_or(BackendError::NotFound)?;
                patch.apply_to(product, Utc::now());
                Ok(product.clone())
            });
        Self::ready(result)
    }

    fn delete_product<'a>(&'a self, addr: &'a BackendAddr, id: RecordId) -> BackendFuture<'a, ()> {
        let result = self
            .enter(addr, format!("delete_product {id}"))
            .and_then(|mut state| {
                state
                    .products
                    .remove(&id)
                    .map(|_| ())
                    .ok_or(BackendError::NotFound)
            });
        Self::ready(result)
    }

    fn create_movement<'a>(
        &'a self,
        addr: &'a BackendAddr,
        movement: &'a NewMovement,
    ) -> BackendFuture<'a, Movement> {
        let result = self
            .enter(addr, format!("create_movement {}", movement.product_id))
            .and_then(|mut state| {
                let product = state
                    .products
                    .get_mut(&movement.product_id)
                    .ok_or(BackendError::NotFound)?;
                if movement.kind == MovementKind::Outbound && movement.quantity > product.quantity {
                    return Err(BackendError::Rejected {
                        status: 422,
                        message: "insufficient stock".into(),
                    });
                }
                product.quantity = movement.kind.apply(product.quantity, movement.quantity);
                let id = allocate(&mut state);
                let created = Movement::from_new(id, movement, Utc::now());
                state.movements.push(created.clone());
                Ok(created)
            });
        Self::ready(result)
    }

    fn list_movements<'a>(&'a self, addr: &'a BackendAddr) -> BackendFuture<'a, Vec<Movement>> {
        let result = self
            .enter(addr, "list_movements".into())
            .map(|state| state.movements.clone());
        Self::ready(result)
    }

    fn list_product_movements<'a>(
        &'a self,
        addr: &'a BackendAddr,
        product_id: RecordId,
    ) -> BackendFuture<'a, Vec<Movement>> {
        let result = self
            .enter(addr, format!("list_product_movements {product_id}"))
            .map(|state| {
                state
                    .movements
                    .iter()
                    .filter(|m| m.product_id == product_id)
                    .cloned()
                    .collect()
            });
        Self::ready(result)
    }

    fn get_configuration<'a>(
        &'a self,
        addr: &'a BackendAddr,
        key: &'a str,
    ) -> BackendFuture<'a, Configuration> {
        let result = self
            .enter(addr, format!("get_configuration {key}"))
            .and_then(|state| {
                state
                    .configurations
                    .get(key)
                    .cloned()
                    .ok_or(BackendError::NotFound)
            });
        Self::ready(result)
    }

    fn list_configurations<'a>(
        &'a self,
        addr: &'a BackendAddr,
    ) -> BackendFuture<'a, Vec<Configuration>> {
        let result = self
            .enter(addr, "list_configurations".into())
            .map(|state| state.configurations.values().cloned().collect());
        Self::ready(result)
    }

    fn update_configuration<'a>(
        &'a self,
        addr: &'a BackendAddr,
        key: &'a str,
        value: &'a ConfigurationValue,
    ) -> BackendFuture<'a, Configuration> {
        let result = self
            .enter(addr, format!("update_configuration {key}"))
            .map(|mut state| {
                let description = value.description.clone().or_else(|| {
                    state
                        .configurations
                        .get(key)
                        .and_then(|c| c.description.clone())
                });
                let config = Configuration {
                    key: key.to_string(),
                    value: value.value.clone(),
                    description,
                    updated_at: Utc::now(),
                };
                state.configurations.insert(key.to_string(), config.clone());
                config
            });
        Self::ready(result)
    }

    fn dashboard<'a>(&'a self, addr: &'a BackendAddr) -> BackendFuture<'a, Dashboard> {
        let result = self.enter(addr, "dashboard".into()).map(|state| Dashboard {
            product_count: state.products.len() as i64,
            total_quantity: state.products.values().map(|p| p.quantity).sum(),
            low_stock_count: state.products.values().filter(|p| p.is_low_stock()).count() as i64,
            movement_count: state.movements.len() as i64,
            recent_movements: state.movements.iter().rev().take(5).cloned().collect(),
        });
        Self::ready(result)
    }
}

/// Network link with a fixed answer.
pub struct FixedLink(pub Option<Ipv4Addr>);

impl FixedLink {
    /// A device at 192.168.1.50.
    pub fn lan() -> Self {
        FixedLink(Some(Ipv4Addr::new(192, 168, 1, 50)))
    }

    pub fn none() -> Self {
        FixedLink(None)
    }
}

impl NetworkLink for FixedLink {
    fn local_ipv4(&self) -> Option<Ipv4Addr> {
        self.0
    }
}

/// The backend address most tests serve on.
pub fn server_addr() -> BackendAddr {
    BackendAddr::new("192.168.1.20", 3000)
}

/// Options with short timeouts.
pub fn fast_options() -> SyncOptions {
    SyncOptions {
        default_port: 3000,
        check_timeout: Duration::from_millis(200),
        request_timeout: Duration::from_millis(500),
        discovery: DiscoveryOptions {
            priority_timeout: Duration::from_millis(100),
            probe_timeout: Duration::from_millis(100),
            ..DiscoveryOptions::default()
        },
        eviction: EvictionPolicy::default(),
    }
}

/// A context over a temporary data directory.
pub struct Harness {
    pub ctx: SyncContext<MockBackend>,
    pub backend: MockBackend,
    pub dir: TempDir,
}

impl Harness {
    pub fn new(backend: MockBackend, link: FixedLink, options: SyncOptions) -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self::in_dir(dir, backend, link, options)
    }

    /// Build a context over an existing directory, e.g. to simulate a restart.
    pub fn in_dir(dir: TempDir, backend: MockBackend, link: FixedLink, options: SyncOptions) -> Self {
        let db = Database::open(&dir.path().join("stock.db")).unwrap();
        let queue = SyncQueue::open(&dir.path().join("queue.jsonl")).unwrap();
        let ctx = SyncContext::new(backend.clone(), db, queue, link, options).unwrap();
        Harness { ctx, backend, dir }
    }

    /// Offline device on a LAN, no backend configured, discovery off.
    pub fn offline() -> Self {
        let mut options = fast_options();
        options.discovery.enabled = false;
        Self::new(MockBackend::new(), FixedLink::lan(), options)
    }

    /// Device configured for [`server_addr`] and already online.
    pub async fn online() -> Self {
        let harness = Self::offline();
        harness.backend.serve(&server_addr());
        harness.configure(&server_addr()).await;
        assert!(harness.ctx.connectivity().check_connectivity().await);
        harness
    }

    pub async fn configure(&self, addr: &BackendAddr) {
        self.ctx
            .with_db(|db| {
                db.set_setting(SETTING_BACKEND_HOST, &addr.host)?;
                db.set_setting(SETTING_BACKEND_PORT, &addr.port.to_string())
            })
            .await
            .unwrap();
    }

    pub async fn pending(&self) -> Vec<QueueItem> {
        self.ctx.pending().await.unwrap()
    }

    pub async fn local_products(&self) -> Vec<Product> {
        self.ctx.with_db(|db| db.list_products()).await.unwrap()
    }

    /// Enqueue an item directly, bypassing the coordinator.
    pub async fn enqueue(&self, item: QueueItem) {
        self.ctx.queue.lock().await.enqueue(&item).unwrap();
    }
}

/// A queued product create.
pub fn create_item(code: &str, local_id: RecordId) -> QueueItem {
    QueueItem::new(
        Mutation::CreateProduct {
            local_id,
            product: NewProduct::new(code, "Widget", 5),
        },
        Utc::now(),
    )
}

/// A queued configuration write.
pub fn config_item(key: &str, value: &str) -> QueueItem {
    QueueItem::new(
        Mutation::UpdateConfiguration {
            key: key.to_string(),
            value: value.to_string(),
            description: None,
        },
        Utc::now(),
    )
}

/// A queued movement.
pub fn movement_item(local_id: RecordId, product_id: RecordId, kind: MovementKind, quantity: i64) -> QueueItem {
    QueueItem::new(
        Mutation::CreateMovement {
            local_id,
            movement: NewMovement::new(product_id, kind, quantity),
        },
        Utc::now(),
    )
}
