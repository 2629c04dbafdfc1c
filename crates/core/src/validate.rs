// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronous input validation.
//!
//! These checks run against the local repository before any network or queue
//! interaction. A failure here is final: it is never queued or retried.

use crate::db::Database;
use crate::error::{Error, Result};
use crate::inventory::{MovementKind, NewMovement, NewProduct, Product, ProductPatch, RecordId};

fn require(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::FieldEmpty { field });
    }
    Ok(())
}

fn non_negative(value: i64, field: &'static str) -> Result<()> {
    if value < 0 {
        return Err(Error::NegativeQuantity { field, value });
    }
    Ok(())
}

/// Validate a product creation request.
pub fn validate_new_product(db: &Database, product: &NewProduct) -> Result<()> {
    require(&product.code, "Code")?;
    require(&product.name, "Name")?;
    non_negative(product.quantity, "Quantity")?;
    non_negative(product.min_quantity, "Minimum quantity")?;
    if db.code_in_use(&product.code, None)? {
        return Err(Error::DuplicateCode(product.code.clone()));
    }
    Ok(())
}

/// Validate a product update, returning the product as currently known.
pub fn validate_product_patch(
    db: &Database,
    id: RecordId,
    patch: &ProductPatch,
) -> Result<Product> {
    let current = db.get_product(id)?;
    if let Some(code) = &patch.code {
        require(code, "Code")?;
        if db.code_in_use(code, Some(id))? {
            return Err(Error::DuplicateCode(code.clone()));
        }
    }
    if let Some(name) = &patch.name {
        require(name, "Name")?;
    }
    if let Some(quantity) = patch.quantity {
        non_negative(quantity, "Quantity")?;
    }
    if let Some(min_quantity) = patch.min_quantity {
        non_negative(min_quantity, "Minimum quantity")?;
    }
    Ok(current)
}

/// Validate a stock movement against the locally known stock level.
pub fn validate_movement(db: &Database, movement: &NewMovement) -> Result<Product> {
    if movement.quantity <= 0 {
        return Err(Error::NonPositiveMovement(movement.quantity));
    }
    let product = db.get_product(movement.product_id)?;
    if movement.kind == MovementKind::Outbound && movement.quantity > product.quantity {
        return Err(Error::InsufficientStock {
            product: product.code.clone(),
            available: product.quantity,
            requested: movement.quantity,
        });
    }
    Ok(product)
}

/// Validate a configuration key.
pub fn validate_configuration_key(key: &str) -> Result<()> {
    require(key, "Configuration key")
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
