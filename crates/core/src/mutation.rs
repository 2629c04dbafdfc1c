// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Mutations waiting to be confirmed against the backend.
//!
//! Every change the application makes is expressed as a [`Mutation`]. When a
//! mutation cannot be confirmed remotely it is wrapped in a [`QueueItem`] and
//! persisted until a drain pass replays it. The payload of a queued item never
//! changes; only its attempt counter and temporary product references are
//! rewritten.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::inventory::{is_temporary_id, NewMovement, NewProduct, ProductPatch, RecordId};

/// The five kinds of queued change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    CreateMovement,
    UpdateConfiguration,
}

impl MutationKind {
    /// Returns the string representation used in logs and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::CreateProduct => "create-product",
            MutationKind::UpdateProduct => "update-product",
            MutationKind::DeleteProduct => "delete-product",
            MutationKind::CreateMovement => "create-movement",
            MutationKind::UpdateConfiguration => "update-configuration",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single intended change to the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Create a product. `local_id` is the temporary id it carries locally.
    CreateProduct {
        local_id: RecordId,
        product: NewProduct,
    },

    /// Update product fields (never quantity).
    UpdateProduct { id: RecordId, patch: ProductPatch },

    /// Delete a product. The code is kept for logging once the id is gone.
    DeleteProduct { id: RecordId, code: String },

    /// Record a stock movement. `local_id` is the temporary movement id.
    CreateMovement {
        local_id: RecordId,
        movement: NewMovement,
    },

    /// Upsert a configuration value.
    UpdateConfiguration {
        key: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::CreateProduct { .. } => MutationKind::CreateProduct,
            Mutation::UpdateProduct { .. } => MutationKind::UpdateProduct,
            Mutation::DeleteProduct { .. } => MutationKind::DeleteProduct,
            Mutation::CreateMovement { .. } => MutationKind::CreateMovement,
            Mutation::UpdateConfiguration { .. } => MutationKind::UpdateConfiguration,
        }
    }

    /// The product this mutation touches, if any.
    pub fn product_id(&self) -> Option<RecordId> {
        match self {
            Mutation::CreateProduct { local_id, .. } => Some(*local_id),
            Mutation::UpdateProduct { id, .. } | Mutation::DeleteProduct { id, .. } => Some(*id),
            Mutation::CreateMovement { movement, .. } => Some(movement.product_id),
            Mutation::UpdateConfiguration { .. } => None,
        }
    }

    /// The configuration key this mutation touches, if any.
    pub fn configuration_key(&self) -> Option<&str> {
        match self {
            Mutation::UpdateConfiguration { key, .. } => Some(key),
            _ => None,
        }
    }

    /// A temporary product id that must be reconciled before this mutation
    /// can be replayed.
    ///
    /// A create never depends on anything; its own `local_id` is the id being
    /// resolved.
    pub fn pending_reference(&self) -> Option<RecordId> {
        match self {
            Mutation::CreateProduct { .. } | Mutation::UpdateConfiguration { .. } => None,
            Mutation::UpdateProduct { id, .. } | Mutation::DeleteProduct { id, .. } => {
                is_temporary_id(*id).then_some(*id)
            }
            Mutation::CreateMovement { movement, .. } => {
                is_temporary_id(movement.product_id).then_some(movement.product_id)
            }
        }
    }

    /// Rewrites references to a temporary product id.
    pub fn remap_product(self, temp: RecordId, real: RecordId) -> Mutation {
        match self {
            Mutation::UpdateProduct { id, patch } if id == temp => {
                Mutation::UpdateProduct { id: real, patch }
            }
            Mutation::DeleteProduct { id, code } if id == temp => {
                Mutation::DeleteProduct { id: real, code }
            }
            Mutation::CreateMovement {
                local_id,
                mut movement,
            } if movement.product_id == temp => {
                movement.product_id = real;
                Mutation::CreateMovement { local_id, movement }
            }
            other => other,
        }
    }

    /// True if both mutations touch the same product or configuration key.
    pub fn overlaps(&self, other: &Mutation) -> bool {
        match (self.product_id(), other.product_id()) {
            (Some(a), Some(b)) => a == b,
            _ => match (self.configuration_key(), other.configuration_key()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Short human-readable description for logs and listings.
    pub fn describe(&self) -> String {
        match self {
            Mutation::CreateProduct { product, .. } => {
                format!("create product {} ({})", product.code, product.name)
            }
            Mutation::UpdateProduct { id, .. } => format!("update product {id}"),
            Mutation::DeleteProduct { code, .. } => format!("delete product {code}"),
            Mutation::CreateMovement { movement, .. } => format!(
                "{} {} units of product {}",
                movement.kind, movement.quantity, movement.product_id
            ),
            Mutation::UpdateConfiguration { key, .. } => format!("set configuration {key}"),
        }
    }
}

/// A queued mutation with its retry bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub mutation: Mutation,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default)]
    pub attempts: u32,
}

impl QueueItem {
    pub fn new(mutation: Mutation, enqueued_at: DateTime<Utc>) -> Self {
        QueueItem {
            mutation,
            enqueued_at,
            attempts: 0,
        }
    }

    /// Time elapsed since the item was enqueued.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.enqueued_at
    }

    /// The same item after one more failed replay.
    pub fn with_failed_attempt(self) -> Self {
        QueueItem {
            attempts: self.attempts.saturating_add(1),
            ..self
        }
    }

    /// The same item with a temporary product reference rewritten.
    pub fn remap_product(self, temp: RecordId, real: RecordId) -> Self {
        QueueItem {
            mutation: self.mutation.remap_product(temp, real),
            ..self
        }
    }
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
