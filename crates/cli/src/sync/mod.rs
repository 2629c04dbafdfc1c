// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first sync engine.
//!
//! Keeps the local repository usable without a network and replays queued
//! changes against the inventory backend once it is reachable again.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ Coordinator │────►│   Backend    │────►│   Remote    │
//! │  (writes)   │◄────│   (trait)    │◄────│   Service   │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!        │                   ▲
//!        ▼                   │
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   Queue     │────►│  Reconciler  │     │Connectivity │
//! │  (JSONL)    │     │   (drain)    │     │ + discovery │
//! └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Local-first writes with a durable pending queue
//! - Temporary ids for records created offline, rewritten on sync
//! - Idempotent replay: "already exists" and "not found" count as done
//! - Eviction of entries older than 15 days or failed 5 times
//! - Backend discovery on the local /24 and common private subnets
//! - Injectable backend and network link for testing

mod backend;
mod connectivity;
mod context;
mod coordinator;
mod discovery;
mod http;
mod queue;
mod runner;

pub use backend::{bounded, Backend, BackendAddr, BackendError, BackendFuture, BackendResult};
pub use connectivity::{Connectivity, ConnectivityState, Mode, NetworkLink, SystemLink};
pub use context::{DiscoveryOptions, SyncContext, SyncError, SyncOptions, SyncResult};
pub use coordinator::{Applied, Coordinator};
pub use discovery::parse_subnet;
pub use http::HttpBackend;
pub use queue::{Eviction, EvictionPolicy, QueueError, SyncQueue};
pub use runner::{DrainReport, Reconciler};

#[cfg(test)]
pub(crate) mod test_helpers;

#[cfg(test)]
mod backend_tests;




#[cfg(test)]
mod http_tests;
