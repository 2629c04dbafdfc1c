// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backend contract abstraction.
//!
//! Provides a trait-based view of the remote inventory service that enables:
//! - A real HTTP client for production ([`HttpBackend`](super::HttpBackend))
//! - Mock backends for unit testing
//!
//! Status codes carry meaning: 404 becomes [`BackendError::NotFound`], 409
//! becomes [`BackendError::Conflict`], and anything that never produced a
//! response is a transport failure.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use sy_core::{
    Configuration, ConfigurationValue, Dashboard, Movement, NewMovement, NewProduct, Product,
    ProductPatch, RecordId,
};

/// Network address of a backend instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendAddr {
    pub host: String,
    pub port: u16,
}

impl BackendAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        BackendAddr {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for BackendAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for BackendAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("missing port in backend address '{s}'"))?;
        if host.is_empty() {
            return Err(format!("missing host in backend address '{s}'"));
        }
        let port = port
            .parse()
            .map_err(|_| format!("invalid port in backend address '{s}'"))?;
        Ok(BackendAddr::new(host, port))
    }
}

/// Error type for backend calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// No response within the allotted time.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be made or broke mid-request.
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// 404: the resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// 409: the resource already exists or the change conflicts.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other 4xx response.
    #[error("rejected by backend ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// 5xx response.
    #[error("backend error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A success response whose body could not be read.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The HTTP client could not be set up or the request could not be built.
    #[error("http client error: {0}")]
    Client(String),
}

impl BackendError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            404 => BackendError::NotFound,
            409 => BackendError::Conflict(message),
            400..=499 => BackendError::Rejected { status, message },
            _ => BackendError::Server { status, message },
        }
    }

    /// True if the backend never answered (connectivity loss).
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Timeout | BackendError::Unreachable(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, BackendError::Conflict(_))
    }

    /// True for errors where a direct online call should fall back to the
    /// offline path instead of surfacing the error.
    pub fn falls_back(&self) -> bool {
        self.is_transport() || matches!(self, BackendError::Server { .. })
    }
}

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Boxed future returned by [`Backend`] methods.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = BackendResult<T>> + Send + 'a>>;

/// The REST contract exposed by the remote inventory service.
///
/// Methods take `&self` so several probes can be in flight at once during
/// network discovery.
pub trait Backend: Send + Sync {
    /// Lightweight reachability probe ("list with a page size of 1").
    fn probe<'a>(&'a self, addr: &'a BackendAddr) -> BackendFuture<'a, ()>;

    fn list_products<'a>(&'a self, addr: &'a BackendAddr) -> BackendFuture<'a, Vec<Product>>;

    fn get_product<'a>(&'a self, addr: &'a BackendAddr, id: RecordId)
        -> BackendFuture<'a, Product>;

    fn get_product_by_code<'a>(
        &'a self,
        addr: &'a BackendAddr,
        code: &'a str,
    ) -> BackendFuture<'a, Product>;

    fn create_product<'a>(
        &'a self,
        addr: &'a BackendAddr,
        product: &'a NewProduct,
    ) -> BackendFuture<'a, Product>;

    fn update_product<'a>(
        &'a self,
        addr: &'a BackendAddr,
        id: RecordId,
        patch: &'a ProductPatch,
    ) -> BackendFuture<'a, Product>;

    fn delete_product<'a>(&'a self, addr: &'a BackendAddr, id: RecordId) -> BackendFuture<'a, ()>;

    /// Record a movement. The backend adjusts the product's stock itself.
    fn create_movement<'a>(
        &'a self,
        addr: &'a BackendAddr,
        movement: &'a NewMovement,
    ) -> BackendFuture<'a, Movement>;

    fn list_movements<'a>(&'a self, addr: &'a BackendAddr) -> BackendFuture<'a, Vec<Movement>>;

    fn list_product_movements<'a>(
        &'a self,
        addr: &'a BackendAddr,
        product_id: RecordId,
    ) -> BackendFuture<'a, Vec<Movement>>;

    fn get_configuration<'a>(
        &'a self,
        addr: &'a BackendAddr,
        key: &'a str,
    ) -> BackendFuture<'a, Configuration>;

    fn list_configurations<'a>(
        &'a self,
        addr: &'a BackendAddr,
    ) -> BackendFuture<'a, Vec<Configuration>>;

    fn update_configuration<'a>(
        &'a self,
        addr: &'a BackendAddr,
        key: &'a str,
        value: &'a ConfigurationValue,
    ) -> BackendFuture<'a, Configuration>;

    fn dashboard<'a>(&'a self, addr: &'a BackendAddr) -> BackendFuture<'a, Dashboard>;
}

/// Await a backend call, failing with [`BackendError::Timeout`] after `limit`.
pub async fn bounded<T>(limit: Duration, call: BackendFuture<'_, T>) -> BackendResult<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout),
    }
}
