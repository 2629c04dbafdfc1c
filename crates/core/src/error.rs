// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for sy-core operations.

use thiserror::Error;

/// All possible errors that can occur in sy-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("product code already in use: '{0}'\n  hint: product codes must be unique")]
    DuplicateCode(String),

    #[error("insufficient stock for product {product}: {available} available, {requested} requested")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    #[error("{field} cannot be empty")]
    FieldEmpty { field: &'static str },

    #[error("{field} cannot be negative (got {value})")]
    NegativeQuantity { field: &'static str, value: i64 },

    #[error("movement quantity must be greater than zero (got {0})")]
    NonPositiveMovement(i64),

    #[error("invalid movement kind: '{0}'\n  hint: valid kinds are: inbound, outbound")]
    InvalidMovementKind(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl Error {
    /// Returns true for input errors that are surfaced immediately and never
    /// queued or retried.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::ProductNotFound(_)
                | Error::DuplicateCode(_)
                | Error::InsufficientStock { .. }
                | Error::FieldEmpty { .. }
                | Error::NegativeQuantity { .. }
                | Error::NonPositiveMovement(_)
                | Error::InvalidMovementKind(_)
        )
    }
}

/// A specialized Result type for sy-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
