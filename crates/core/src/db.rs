// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed local repository.
//!
//! The [`Database`] holds the three inventory collections (products,
//! movements, configurations) plus a handful of scalar settings. It is the
//! source of truth for reads whenever the backend cannot be reached.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::inventory::{Configuration, Dashboard, Movement, MovementKind, Product, RecordId};
use crate::mutation::Mutation;

/// SQL schema for the local repository.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    quantity INTEGER NOT NULL DEFAULT 0,
    min_quantity INTEGER NOT NULL DEFAULT 0,
    location TEXT,
    supplier TEXT,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Append-only history; no foreign key so deleted products keep their trail
CREATE TABLE IF NOT EXISTS movements (
    id INTEGER PRIMARY KEY,
    product_id INTEGER NOT NULL,
    kind TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    notes TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS configurations (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    description TEXT,
    updated_at TEXT NOT NULL
);

-- Scalar settings (backend host/port, last-known-good address, id counter)
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Temporary product ids already reconciled, for changes queued after the fact
CREATE TABLE IF NOT EXISTS reconciled_ids (
    temp_id INTEGER PRIMARY KEY,
    real_id INTEGER NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_products_code ON products(code);
CREATE INDEX IF NOT EXISTS idx_movements_product ON movements(product_id);
CREATE INDEX IF NOT EXISTS idx_movements_created ON movements(created_at);
"#;

/// Setting key for the user-configured backend host.
pub const SETTING_BACKEND_HOST: &str = "backend.host";
/// Setting key for the user-configured backend port.
pub const SETTING_BACKEND_PORT: &str = "backend.port";
/// Setting key for the last backend address confirmed reachable.
pub const SETTING_LAST_KNOWN_GOOD: &str = "backend.last_known_good";
/// Setting key for the next temporary id to hand out.
const SETTING_NEXT_TEMP_ID: &str = "next_temp_id";

const PRODUCT_COLUMNS: &str = "id, code, name, description, quantity, min_quantity, location, \
                               supplier, notes, created_at, updated_at";
const MOVEMENT_COLUMNS: &str = "id, product_id, kind, quantity, notes, created_at";

/// Number of movements shown on the local dashboard.
const RECENT_MOVEMENTS: i64 = 5;

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

fn product_from_row(row: &Row<'_>) -> std::result::Result<Product, rusqlite::Error> {
    let created_str: String = row.get(9)?;
    let updated_str: String = row.get(10)?;
    Ok(Product {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        quantity: row.get(4)?,
        min_quantity: row.get(5)?,
        location: row.get(6)?,
        supplier: row.get(7)?,
        notes: row.get(8)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
        updated_at: parse_timestamp(&updated_str, "updated_at")?,
    })
}

fn movement_from_row(row: &Row<'_>) -> std::result::Result<Movement, rusqlite::Error> {
    let kind_str: String = row.get(2)?;
    let created_str: String = row.get(5)?;
    Ok(Movement {
        id: row.get(0)?,
        product_id: row.get(1)?,
        kind: parse_db(&kind_str, "kind")?,
        quantity: row.get(3)?,
        notes: row.get(4)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
    })
}

fn configuration_from_row(row: &Row<'_>) -> std::result::Result<Configuration, rusqlite::Error> {
    let updated_str: String = row.get(3)?;
    Ok(Configuration {
        key: row.get(0)?,
        value: row.get(1)?,
        description: row.get(2)?,
        updated_at: parse_timestamp(&updated_str, "updated_at")?,
    })
}

/// Run schema creation on a database connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Local repository for the inventory collections.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────

    /// Insert a product, replacing any row with the same id.
    pub fn upsert_product(&self, product: &Product) -> Result<()> {
        self.conn.execute(
            "INSERT INTO products (id, code, name, description, quantity, min_quantity,
             location, supplier, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                code = excluded.code,
                name = excluded.name,
                description = excluded.description,
                quantity = excluded.quantity,
                min_quantity = excluded.min_quantity,
                location = excluded.location,
                supplier = excluded.supplier,
                notes = excluded.notes,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![
                product.id,
                product.code,
                product.name,
                product.description,
                product.quantity,
                product.min_quantity,
                product.location,
                product.supplier,
                product.notes,
                product.created_at.to_rfc3339(),
                product.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a product by id.
    pub fn get_product(&self, id: RecordId) -> Result<Product> {
        self.find_product(id)?
            .ok_or_else(|| Error::ProductNotFound(id.to_string()))
    }

    /// Get a product by id, returning `None` if absent.
    pub fn find_product(&self, id: RecordId) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = self
            .conn
            .query_row(&sql, params![id], product_from_row)
            .optional()?;
        Ok(product)
    }

    /// Get a product by its unique code.
    pub fn find_product_by_code(&self, code: &str) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1");
        let product = self
            .conn
            .query_row(&sql, params![code], product_from_row)
            .optional()?;
        Ok(product)
    }

    /// Check whether a code is used by any product other than `except`.
    pub fn code_in_use(&self, code: &str, except: Option<RecordId>) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE code = ?1 AND (?2 IS NULL OR id != ?2)",
            params![code, except],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// List all products ordered by code.
    pub fn list_products(&self) -> Result<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY code");
        let mut stmt = self.conn.prepare(&sql)?;
        let products = stmt
            .query_map([], product_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(products)
    }

    /// Delete a product. Returns false if it did not exist.
    pub fn delete_product(&self, id: RecordId) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Set the tracked quantity of a product.
    pub fn set_product_quantity(&self, id: RecordId, quantity: i64) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE products SET quantity = ?1, updated_at = ?2 WHERE id = ?3",
            params![quantity, Utc::now().to_rfc3339(), id],
        )?;
        if affected == 0 {
            return Err(Error::ProductNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Apply a movement to the product's tracked quantity, if the product exists.
    fn adjust_quantity(&self, id: RecordId, kind: MovementKind, amount: i64) -> Result<()> {
        if let Some(product) = self.find_product(id)? {
            self.set_product_quantity(id, kind.apply(product.quantity, amount))?;
        }
        Ok(())
    }

    /// Replace a temporary product id with the id the backend assigned.
    ///
    /// Movements pointing at the temporary id follow it. If the backend id is
    /// already present locally, the temporary row is dropped instead. The
    /// mapping is remembered, see [`Database::reconciled_ids`].
    pub fn remap_product_id(&self, temp: RecordId, real: RecordId) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO reconciled_ids (temp_id, real_id) VALUES (?1, ?2)",
            params![temp, real],
        )?;
        if self.find_product(real)?.is_some() {
            tx.execute("DELETE FROM products WHERE id = ?1", params![temp])?;
        } else {
            tx.execute(
                "UPDATE products SET id = ?1 WHERE id = ?2",
                params![real, temp],
            )?;
        }
        tx.execute(
            "UPDATE movements SET product_id = ?1 WHERE product_id = ?2",
            params![real, temp],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Every temporary product id reconciled so far, mapped to its server id.
    pub fn reconciled_ids(&self) -> Result<HashMap<RecordId, RecordId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT temp_id, real_id FROM reconciled_ids")?;
        let ids = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(ids)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Movements
    // ─────────────────────────────────────────────────────────────────────

    /// Insert a movement record without touching stock levels.
    pub fn insert_movement(&self, movement: &Movement) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO movements (id, product_id, kind, quantity, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                movement.id,
                movement.product_id,
                movement.kind.as_str(),
                movement.quantity,
                movement.notes,
                movement.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Insert a movement and apply it to the product's quantity.
    pub fn record_movement(&self, movement: &Movement) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.insert_movement(movement)?;
        self.adjust_quantity(movement.product_id, movement.kind, movement.quantity)?;
        tx.commit()?;
        Ok(())
    }

    /// List all movements, newest first.
    pub fn list_movements(&self) -> Result<Vec<Movement>> {
        let sql =
            format!("SELECT {MOVEMENT_COLUMNS} FROM movements ORDER BY created_at DESC, id DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let movements = stmt
            .query_map([], movement_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(movements)
    }

    /// List movements for one product, newest first.
    pub fn list_movements_for_product(&self, product_id: RecordId) -> Result<Vec<Movement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements WHERE product_id = ?1
             ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let movements = stmt
            .query_map(params![product_id], movement_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(movements)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Configurations
    // ─────────────────────────────────────────────────────────────────────

    /// Insert or update a configuration value.
    pub fn upsert_configuration(&self, config: &Configuration) -> Result<()> {
        self.conn.execute(
            "INSERT INTO configurations (key, value, description, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                description = COALESCE(excluded.description, configurations.description),
                updated_at = excluded.updated_at",
            params![
                config.key,
                config.value,
                config.description,
                config.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a configuration by key.
    pub fn get_configuration(&self, key: &str) -> Result<Option<Configuration>> {
        let config = self
            .conn
            .query_row(
                "SELECT key, value, description, updated_at FROM configurations WHERE key = ?1",
                params![key],
                configuration_from_row,
            )
            .optional()?;
        Ok(config)
    }

    /// List all configurations ordered by key.
    pub fn list_configurations(&self) -> Result<Vec<Configuration>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, value, description, updated_at FROM configurations ORDER BY key",
        )?;
        let configs = stmt
            .query_map([], configuration_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(configs)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove_setting(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Hand out a fresh temporary (negative) id.
    ///
    /// The counter only moves down, so an id is never reused even after the
    /// record holding it is deleted or reconciled.
    pub fn allocate_temp_id(&self) -> Result<RecordId> {
        let stored: RecordId = match self.get_setting(SETTING_NEXT_TEMP_ID)? {
            Some(value) => value.parse().map_err(|_| {
                Error::CorruptedData(format!("invalid temporary id counter '{value}'"))
            })?,
            None => -1,
        };
        let lowest: Option<RecordId> = self.conn.query_row(
            "SELECT MIN(id) FROM (SELECT id FROM products UNION ALL SELECT id FROM movements)",
            [],
            |row| row.get(0),
        )?;
        let id = match lowest {
            Some(lowest) if lowest <= stored => lowest - 1,
            _ => stored,
        };
        self.set_setting(SETTING_NEXT_TEMP_ID, &(id - 1).to_string())?;
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Bulk operations
    // ─────────────────────────────────────────────────────────────────────

    /// Replace the three collections with authoritative copies.
    ///
    /// Settings are untouched. Runs in a single transaction.
    pub fn replace_all(
        &self,
        products: &[Product],
        movements: &[Movement],
        configurations: &[Configuration],
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(
            "DELETE FROM products;
             DELETE FROM movements;
             DELETE FROM configurations;",
        )?;
        for product in products {
            self.upsert_product(product)?;
        }
        for movement in movements {
            self.insert_movement(movement)?;
        }
        for config in configurations {
            self.upsert_configuration(config)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Apply a mutation to the local collections.
    ///
    /// This is the optimistic local write. Returns false when the mutation had
    /// nothing to act on (the product is gone, or a create collides with a
    /// record that already holds the id or code).
    pub fn apply(&self, mutation: &Mutation, now: DateTime<Utc>) -> Result<bool> {
        match mutation {
            Mutation::CreateProduct { local_id, product } => {
                if self.find_product(*local_id)?.is_some()
                    || self.code_in_use(&product.code, None)?
                {
                    return Ok(false);
                }
                self.upsert_product(&Product::from_new(*local_id, product, now))?;
                Ok(true)
            }
            Mutation::UpdateProduct { id, patch } => {
                let Some(mut product) = self.find_product(*id)? else {
                    return Ok(false);
                };
                if let Some(code) = &patch.code {
                    if self.code_in_use(code, Some(*id))? {
                        return Ok(false);
                    }
                }
                patch.apply_to(&mut product, now);
                self.upsert_product(&product)?;
                Ok(true)
            }
            Mutation::DeleteProduct { id, .. } => self.delete_product(*id),
            Mutation::CreateMovement { local_id, movement } => {
                self.record_movement(&Movement::from_new(*local_id, movement, now))?;
                Ok(true)
            }
            Mutation::UpdateConfiguration {
                key,
                value,
                description,
            } => {
                self.upsert_configuration(&Configuration {
                    key: key.clone(),
                    value: value.clone(),
                    description: description.clone(),
                    updated_at: now,
                })?;
                Ok(true)
            }
        }
    }

    /// Compute the stock overview from local data.
    pub fn dashboard(&self) -> Result<Dashboard> {
        let (product_count, total_quantity, low_stock_count): (i64, i64, i64) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(quantity), 0),
                    COALESCE(SUM(CASE WHEN quantity <= min_quantity THEN 1 ELSE 0 END), 0)
             FROM products",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        let movement_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM movements", [], |row| row.get(0))?;

        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements ORDER BY created_at DESC, id DESC LIMIT ?1"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let recent_movements = stmt
            .query_map(params![RECENT_MOVEMENTS], movement_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Dashboard {
            product_count,
            total_quantity,
            low_stock_count,
            movement_count,
            recent_movements,
        })
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
