// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state of the sync engine.
//!
//! One [`SyncContext`] owns the backend client, the local repository, the
//! pending queue and the connectivity state. The connectivity manager, the
//! coordinator and the reconciler are cheap views borrowed from it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use sy_core::db::SETTING_LAST_KNOWN_GOOD;
use sy_core::{Database, QueueItem};
use tokio::sync::Mutex;
use tracing::warn;

use super::backend::{Backend, BackendAddr, BackendError};
use super::connectivity::{Connectivity, ConnectivityState, NetworkLink};
use super::coordinator::Coordinator;
use super::queue::{EvictionPolicy, QueueError, SyncQueue};
use super::runner::Reconciler;

/// Error type for sync engine operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Local validation or repository failure.
    #[error(transparent)]
    Core(#[from] sy_core::Error),

    /// Queue persistence failure.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// The backend refused the change.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Another sync pass is running.
    #[error("a sync pass is already running")]
    DrainInProgress,
}

impl SyncError {
    /// True if the error is a local validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Core(e) if e.is_validation())
    }
}

/// Result type for sync engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Tuning for network discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    pub enabled: bool,
    /// Host suffixes probed first on each subnet.
    pub priority_hosts: Vec<u8>,
    /// Subnets (first three octets) swept after the local one.
    pub fallback_subnets: Vec<[u8; 3]>,
    /// Number of concurrent probes per batch.
    pub batch_size: usize,
    pub priority_timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        DiscoveryOptions {
            enabled: true,
            priority_hosts: vec![1, 2, 3, 4, 5, 100, 101, 150, 200, 254],
            fallback_subnets: vec![[192, 168, 0], [192, 168, 1], [10, 0, 0], [172, 16, 0]],
            batch_size: 10,
            priority_timeout: Duration::from_millis(1000),
            probe_timeout: Duration::from_millis(800),
        }
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Port used when only a host is configured.
    pub default_port: u16,
    /// Timeout for connectivity probes against a known address.
    pub check_timeout: Duration,
    /// Timeout for data requests.
    pub request_timeout: Duration,
    pub discovery: DiscoveryOptions,
    pub eviction: EvictionPolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            default_port: 3000,
            check_timeout: Duration::from_millis(3000),
            request_timeout: Duration::from_millis(12000),
            discovery: DiscoveryOptions::default(),
            eviction: EvictionPolicy::default(),
        }
    }
}

/// Owner of every piece of state the sync engine touches.
pub struct SyncContext<B: Backend> {
    pub(super) backend: B,
    pub(super) db: Mutex<Database>,
    pub(super) queue: Mutex<SyncQueue>,
    pub(super) link: Box<dyn NetworkLink>,
    pub(super) options: SyncOptions,
    state: RwLock<ConnectivityState>,
    pub(super) discovering: AtomicBool,
    pub(super) draining: AtomicBool,
}

impl<B: Backend> SyncContext<B> {
    /// Assemble a context. The engine starts offline, remembering the last
    /// backend address that answered in a previous run.
    pub fn new(
        backend: B,
        db: Database,
        queue: SyncQueue,
        link: impl NetworkLink + 'static,
        options: SyncOptions,
    ) -> SyncResult<Self> {
        let last_known_good = match db.get_setting(SETTING_LAST_KNOWN_GOOD)? {
            Some(value) => match value.parse::<BackendAddr>() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    warn!(error = %e, "ignoring stored backend address");
                    None
                }
            },
            None => None,
        };

        Ok(SyncContext {
            backend,
            db: Mutex::new(db),
            queue: Mutex::new(queue),
            link: Box::new(link),
            options,
            state: RwLock::new(ConnectivityState {
                last_known_good,
                ..ConnectivityState::default()
            }),
            discovering: AtomicBool::new(false),
            draining: AtomicBool::new(false),
        })
    }

    pub fn connectivity(&self) -> Connectivity<'_, B> {
        Connectivity::new(self)
    }

    pub fn coordinator(&self) -> Coordinator<'_, B> {
        Coordinator::new(self)
    }

    pub fn reconciler(&self) -> Reconciler<'_, B> {
        Reconciler::new(self)
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run `f` against the local repository.
    pub async fn with_db<T>(&self, f: impl FnOnce(&Database) -> sy_core::Result<T>) -> SyncResult<T> {
        let db = self.db.lock().await;
        Ok(f(&db)?)
    }

    /// Snapshot of the pending queue.
    pub async fn pending(&self) -> SyncResult<Vec<QueueItem>> {
        Ok(self.queue.lock().await.peek_all()?)
    }

    // A panic while holding the lock leaves a plain value behind; keep using it.
    pub(super) fn read_state(&self) -> RwLockReadGuard<'_, ConnectivityState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    pub(super) fn write_state(&self) -> RwLockWriteGuard<'_, ConnectivityState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Holds an [`AtomicBool`] claim and releases it on drop.
pub(super) struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    /// Claim `flag`, or return `None` if it is already held.
    pub(super) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlagGuard(flag))
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
