// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sy-core: Shared library for the stockyard inventory client
//!
//! This crate provides the inventory data types, input validation, the
//! queued-mutation record, and the SQLite local repository used by the
//! stockyard sync engine.

pub mod db;
pub mod error;
pub mod inventory;
pub mod mutation;
pub mod validate;

pub use db::Database;
pub use error::{Error, Result};
pub use inventory::{
    is_temporary_id, Configuration, ConfigurationValue, Dashboard, Movement, MovementKind,
    NewMovement, NewProduct, Product, ProductPatch, RecordId,
};
pub use mutation::{Mutation, MutationKind, QueueItem};
