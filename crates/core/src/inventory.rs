// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Inventory domain types.
//!
//! Products, stock movements, and key/value configurations, plus the
//! request shapes used to create or change them. Identifiers are `i64`:
//! positive values are assigned by the backend, negative values are
//! temporary identifiers handed out locally while offline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Identifier of a product or movement.
pub type RecordId = i64;

/// Returns true if the id was generated locally and has not been reconciled.
pub fn is_temporary_id(id: RecordId) -> bool {
    id < 0
}

/// A stocked product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub min_quantity: i64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Builds a product record from a creation request.
    pub fn from_new(id: RecordId, new: &NewProduct, now: DateTime<Utc>) -> Self {
        Product {
            id,
            code: new.code.clone(),
            name: new.name.clone(),
            description: new.description.clone(),
            quantity: new.quantity,
            min_quantity: new.min_quantity,
            location: new.location.clone(),
            supplier: new.supplier.clone(),
            notes: new.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True while the product only exists locally.
    pub fn is_temporary(&self) -> bool {
        is_temporary_id(self.id)
    }

    /// True when stock is at or below the minimum threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

/// Request to create a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub min_quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewProduct {
    /// Creates a request with just the required fields.
    pub fn new(code: impl Into<String>, name: impl Into<String>, quantity: i64) -> Self {
        NewProduct {
            code: code.into(),
            name: name.into(),
            quantity,
            ..Default::default()
        }
    }
}

/// Partial update of a product. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ProductPatch {
    /// True if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &ProductPatch::default()
    }

    /// The same patch with the quantity field removed.
    ///
    /// Stock levels only change through movements, so this is the shape that
    /// gets sent to the backend and queued.
    pub fn without_quantity(&self) -> ProductPatch {
        ProductPatch {
            quantity: None,
            ..self.clone()
        }
    }

    /// Applies the patch to a product record.
    pub fn apply_to(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(code) = &self.code {
            product.code = code.clone();
        }
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(min_quantity) = self.min_quantity {
            product.min_quantity = min_quantity;
        }
        if let Some(location) = &self.location {
            product.location = Some(location.clone());
        }
        if let Some(supplier) = &self.supplier {
            product.supplier = Some(supplier.clone());
        }
        if let Some(notes) = &self.notes {
            product.notes = Some(notes.clone());
        }
        product.updated_at = now;
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Stock received.
    Inbound,
    /// Stock issued.
    Outbound,
}

impl MovementKind {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Inbound => "inbound",
            MovementKind::Outbound => "outbound",
        }
    }

    /// Returns the stock level after moving `amount` units.
    ///
    /// Outbound movements clamp at zero.
    pub fn apply(&self, current: i64, amount: i64) -> i64 {
        match self {
            MovementKind::Inbound => current.saturating_add(amount),
            MovementKind::Outbound => current.saturating_sub(amount).max(0),
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "inbound" | "in" => Ok(MovementKind::Inbound),
            "outbound" | "out" => Ok(MovementKind::Outbound),
            _ => Err(Error::InvalidMovementKind(s.to_string())),
        }
    }
}

/// A recorded stock movement. Movements are append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: RecordId,
    pub product_id: RecordId,
    pub kind: MovementKind,
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    /// Builds a movement record from a request.
    pub fn from_new(id: RecordId, new: &NewMovement, now: DateTime<Utc>) -> Self {
        Movement {
            id,
            product_id: new.product_id,
            kind: new.kind,
            quantity: new.quantity,
            notes: new.notes.clone(),
            created_at: now,
        }
    }
}

/// Request to record a stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovement {
    pub product_id: RecordId,
    pub kind: MovementKind,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewMovement {
    pub fn new(product_id: RecordId, kind: MovementKind, quantity: i64) -> Self {
        NewMovement {
            product_id,
            kind,
            quantity,
            notes: None,
        }
    }

    /// Movement that takes a product from `from` units to `to` units.
    ///
    /// Returns `None` when the levels are equal.
    pub fn adjustment(product_id: RecordId, from: i64, to: i64) -> Option<Self> {
        let delta = to - from;
        if delta == 0 {
            return None;
        }
        let kind = if delta > 0 {
            MovementKind::Inbound
        } else {
            MovementKind::Outbound
        };
        Some(NewMovement {
            product_id,
            kind,
            quantity: delta.abs(),
            notes: Some(format!("stock adjusted from {from} to {to}")),
        })
    }
}

/// A key/value setting shared with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a configuration upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Read-only stock overview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub product_count: i64,
    pub total_quantity: i64,
    pub low_stock_count: i64,
    pub movement_count: i64,
    #[serde(default)]
    pub recent_movements: Vec<Movement>,
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod tests;
