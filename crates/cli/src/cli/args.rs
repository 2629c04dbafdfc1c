// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.
//!
//! These structs are used with `#[command(flatten)]` so `product add` and
//! `product edit` accept the same optional fields.

use clap::Args;

/// Optional product fields.
#[derive(Args, Clone, Debug, Default)]
pub struct ProductFields {
    /// Longer description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Minimum stock level before the product counts as low
    #[arg(long = "min", value_name = "qty")]
    pub min_quantity: Option<i64>,

    /// Storage location (shelf, bin, room)
    #[arg(long, short)]
    pub location: Option<String>,

    /// Supplier name
    #[arg(long, short)]
    pub supplier: Option<String>,

    /// Free-form notes
    #[arg(long, short)]
    pub notes: Option<String>,
}
