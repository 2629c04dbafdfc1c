// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::inventory::MovementKind;
use yare::parameterized;

fn create(local_id: RecordId, code: &str) -> Mutation {
    Mutation::CreateProduct {
        local_id,
        product: NewProduct::new(code, "Widget", 10),
    }
}

fn movement(product_id: RecordId) -> Mutation {
    Mutation::CreateMovement {
        local_id: -50,
        movement: NewMovement::new(product_id, MovementKind::Inbound, 2),
    }
}

#[test]
fn mutation_json_is_tagged() {
    let json = serde_json::to_string(&create(-1, "A1")).unwrap();
    assert!(json.contains(r#""op":"create_product""#));
    assert!(json.contains(r#""local_id":-1"#));
}

#[test]
fn queue_item_json_defaults_attempts() {
    let json = r#"{"mutation":{"op":"delete_product","id":4,"code":"A1"},"enqueued_at":"2026-01-01T00:00:00Z"}"#;
    let item: QueueItem = serde_json::from_str(json).unwrap();
    assert_eq!(item.attempts, 0);
    assert_eq!(item.mutation.kind(), MutationKind::DeleteProduct);
}

#[parameterized(
    create_product = { create(-1, "A1"), None },
    update_real = { Mutation::UpdateProduct { id: 4, patch: ProductPatch::default() }, None },
    update_temp = { Mutation::UpdateProduct { id: -2, patch: ProductPatch::default() }, Some(-2) },
    delete_temp = { Mutation::DeleteProduct { id: -3, code: "A1".into() }, Some(-3) },
    movement_temp = { movement(-1), Some(-1) },
    movement_real = { movement(9), None },
)]
fn pending_reference(mutation: Mutation, expected: Option<RecordId>) {
    assert_eq!(mutation.pending_reference(), expected);
}

#[test]
fn remap_rewrites_matching_references_only() {
    let remapped = movement(-1).remap_product(-1, 12);
    assert_eq!(remapped.product_id(), Some(12));

    let untouched = movement(-2).remap_product(-1, 12);
    assert_eq!(untouched.product_id(), Some(-2));

    // A create keeps its own local id; the mapping is recorded elsewhere.
    let created = create(-1, "A1").remap_product(-1, 12);
    assert_eq!(created.product_id(), Some(-1));
}

#[test]
fn overlaps_by_product_and_key() {
    let update = Mutation::UpdateProduct {
        id: 4,
        patch: ProductPatch::default(),
    };
    assert!(update.overlaps(&movement(4)));
    assert!(!update.overlaps(&movement(5)));

    let config = |key: &str| Mutation::UpdateConfiguration {
        key: key.into(),
        value: "x".into(),
        description: None,
    };
    assert!(config("currency").overlaps(&config("currency")));
    assert!(!config("currency").overlaps(&config("locale")));
    assert!(!config("currency").overlaps(&update));
}

#[test]
fn failed_attempt_increments_counter_only() {
    let now = Utc::now();
    let item = QueueItem::new(create(-1, "A1"), now);
    let failed = item.clone().with_failed_attempt().with_failed_attempt();
    assert_eq!(failed.attempts, 2);
    assert_eq!(failed.mutation, item.mutation);
    assert_eq!(failed.enqueued_at, item.enqueued_at);
}

#[test]
fn age_is_measured_from_enqueue() {
    let now = Utc::now();
    let item = QueueItem::new(create(-1, "A1"), now - Duration::days(3));
    assert_eq!(item.age(now).num_days(), 3);
}
