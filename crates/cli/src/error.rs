// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{QueueError, SyncError};

/// All possible errors surfaced by the stockyard command line.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: no stockyard data in {0}\n  hint: run 'stockyard init' first")]
    NotInitialized(String),

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("no data directory available\n  hint: pass --data-dir or set STOCKYARD_DIR")]
    NoDataDir,

    #[error("product not found: {0}\n  hint: use 'stockyard product list' to see products")]
    ProductNotFound(String),

    #[error("nothing to change\n  hint: pass at least one field to update")]
    NothingToChange,

    #[error("setting not found: {0}")]
    SettingNotFound(String),

    #[error("invalid backend address '{0}'\n  hint: use a host name or IP, with --port for a non-default port")]
    InvalidAddress(String),

    #[error("backend not reachable\n  hint: run 'stockyard backend check' or 'stockyard backend set <host>'")]
    Offline,

    #[error("a sync is already running\n  hint: wait for it to finish and try again")]
    SyncInProgress,

    #[error("{0}")]
    Core(sy_core::Error),

    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("backend error: {0}")]
    Backend(#[from] crate::sync::BackendError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for stockyard commands.
pub type Result<T> = std::result::Result<T, Error>;

impl From<sy_core::Error> for Error {
    fn from(e: sy_core::Error) -> Self {
        match e {
            sy_core::Error::ProductNotFound(id) => Error::ProductNotFound(id),
            e => Error::Core(e),
        }
    }
}

impl From<SyncError> for Error {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Core(e) => e.into(),
            SyncError::Queue(e) => Error::Queue(e),
            SyncError::Backend(e) => Error::Backend(e),
            SyncError::DrainInProgress => Error::SyncInProgress,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
