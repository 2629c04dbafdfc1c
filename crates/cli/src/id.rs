// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Product id formatting.
//!
//! Server ids print as plain numbers. Products created offline carry a
//! negative temporary id until their create is synced; these print as
//! `L<n>` ("local"), so `-3` is shown and accepted as `L3`.

use sy_core::{is_temporary_id, RecordId};

/// Render an id for display.
pub fn format_id(id: RecordId) -> String {
    if is_temporary_id(id) {
        format!("L{}", id.unsigned_abs())
    } else {
        id.to_string()
    }
}

/// Parse an id as printed by [`format_id`].
///
/// Returns `None` for anything that is not an id, so callers can fall back
/// to treating the input as a product code.
pub fn parse_id(input: &str) -> Option<RecordId> {
    let input = input.trim();
    if let Some(local) = input.strip_prefix(['L', 'l']) {
        return match local.parse::<RecordId>() {
            Ok(n) if n > 0 && local.bytes().all(|b| b.is_ascii_digit()) => Some(-n),
            _ => None,
        };
    }
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    input.parse::<RecordId>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
