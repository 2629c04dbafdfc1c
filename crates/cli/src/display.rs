// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sy_core::{Configuration, Dashboard, Movement, MovementKind, Product, QueueItem, RecordId};

use crate::id::format_id;
use crate::sync::DrainReport;

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Format a single product line for list output.
///
/// Products that only exist locally are marked `(unsynced)`; products at or
/// below their minimum are marked `(low)`.
pub fn format_product_line(product: &Product) -> String {
    let mut line = format!(
        "- {} [{}] {}: {}",
        product.code,
        format_id(product.id),
        product.name,
        product.quantity
    );
    if product.is_low_stock() {
        line.push_str(" (low)");
    }
    if product.is_temporary() {
        line.push_str(" (unsynced)");
    }
    line
}

/// Format product details and recent movements for the show command.
pub fn format_product_details(product: &Product, movements: &[Movement]) -> String {
    let mut output = Vec::new();

    output.push(format!("[{}] {}", format_id(product.id), product.code));
    output.push(format!("Name: {}", product.name));
    output.push(format!(
        "Quantity: {} (min {})",
        product.quantity, product.min_quantity
    ));
    if let Some(location) = &product.location {
        output.push(format!("Location: {}", location));
    }
    if let Some(supplier) = &product.supplier {
        output.push(format!("Supplier: {}", supplier));
    }
    output.push(format!("Created: {}", timestamp(&product.created_at)));
    output.push(format!("Updated: {}", timestamp(&product.updated_at)));

    if let Some(description) = &product.description {
        output.push(String::new());
        output.push("Description:".to_string());
        output.push(format!("  {}", description));
    }
    if let Some(notes) = &product.notes {
        output.push(String::new());
        output.push("Notes:".to_string());
        output.push(format!("  {}", notes));
    }

    if !movements.is_empty() {
        output.push(String::new());
        output.push("Movements:".to_string());
        for movement in movements {
            output.push(format!("  {}", format_movement_line(movement, None)));
        }
    }

    output.join("\n")
}

/// Format a movement for log output.
///
/// `code` names the product when the log spans several products.
pub fn format_movement_line(movement: &Movement, code: Option<&str>) -> String {
    let sign = match movement.kind {
        MovementKind::Inbound => '+',
        MovementKind::Outbound => '-',
    };
    let mut line = format!("{}  {}{}", timestamp(&movement.created_at), sign, movement.quantity);
    if let Some(code) = code {
        line.push_str(&format!("  {}", code));
    }
    if let Some(notes) = &movement.notes {
        line.push_str(&format!("  {}", notes));
    }
    line
}

/// Product codes by id, for labelling movements.
pub fn product_codes(products: &[Product]) -> HashMap<RecordId, String> {
    products.iter().map(|p| (p.id, p.code.clone())).collect()
}

pub fn format_configuration_line(config: &Configuration) -> String {
    match &config.description {
        Some(description) => format!("{} = {}  # {}", config.key, config.value, description),
        None => format!("{} = {}", config.key, config.value),
    }
}

pub fn format_dashboard(dashboard: &Dashboard, codes: &HashMap<RecordId, String>) -> String {
    let mut output = vec![
        format!("Products: {}", dashboard.product_count),
        format!("Units in stock: {}", dashboard.total_quantity),
        format!("Low stock: {}", dashboard.low_stock_count),
        format!("Movements: {}", dashboard.movement_count),
    ];
    if !dashboard.recent_movements.is_empty() {
        output.push(String::new());
        output.push("Recent movements:".to_string());
        for movement in &dashboard.recent_movements {
            let code = codes.get(&movement.product_id).map(String::as_str);
            output.push(format!("  {}", format_movement_line(movement, code)));
        }
    }
    output.join("\n")
}

/// Format a queued change for the status command.
pub fn format_pending_line(item: &QueueItem) -> String {
    let mut line = format!(
        "  {}  {}",
        timestamp(&item.enqueued_at),
        item.mutation.describe()
    );
    if item.attempts > 0 {
        line.push_str(&format!(" (failed {}x)", item.attempts));
    }
    line
}

/// One-line summary of a drain pass.
pub fn format_drain_report(report: &DrainReport) -> String {
    if !report.online {
        return match report.pending {
            0 => "offline, nothing to sync".to_string(),
            n => format!("offline, {} change(s) waiting", n),
        };
    }
    let mut line = format!("synced {}, pending {}", report.succeeded, report.pending);
    if report.evicted > 0 {
        line.push_str(&format!(", discarded {}", report.evicted));
    }
    line
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
