// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::commands::testing::*;
use sy_core::Mutation;

fn add_cmd(code: &str, quantity: i64) -> ProductCommand {
    ProductCommand::Add {
        code: code.into(),
        name: "Widget".into(),
        quantity,
        fields: ProductFields::default(),
        output: OutputFormat::Text,
    }
}

fn edit_cmd(
    product: &str,
    code: Option<&str>,
    name: Option<&str>,
    quantity: Option<i64>,
) -> ProductCommand {
    ProductCommand::Edit {
        product: product.into(),
        code: code.map(String::from),
        name: name.map(String::from),
        quantity,
        fields: ProductFields::default(),
    }
}

#[tokio::test]
async fn test_add_offline_is_queued() {
    let harness = Harness::offline();

    run_impl(&harness.ctx, add_cmd("A1", 5)).await.unwrap();

    let product = local_product(&harness, "A1").await.unwrap();
    assert!(product.is_temporary());
    assert_eq!(product.quantity, 5);
    assert_eq!(harness.pending().await.len(), 1);
}

#[tokio::test]
async fn test_add_online_reaches_backend() {
    let harness = Harness::online().await;

    run_impl(&harness.ctx, add_cmd("A1", 5)).await.unwrap();

    assert_eq!(local_product(&harness, "A1").await.unwrap().id, 100);
    assert!(harness.backend.product_by_code("A1").is_some());
    assert!(harness.pending().await.is_empty());
}

#[tokio::test]
async fn test_add_with_optional_fields() {
    let harness = Harness::offline();
    let cmd = ProductCommand::Add {
        code: " B7 ".into(),
        name: "Bolt".into(),
        quantity: 500,
        fields: ProductFields {
            min_quantity: Some(50),
            location: Some("Shelf 3".into()),
            ..ProductFields::default()
        },
        output: OutputFormat::Json,
    };

    run_impl(&harness.ctx, cmd).await.unwrap();

    let product = local_product(&harness, "B7").await.unwrap();
    assert_eq!(product.min_quantity, 50);
    assert_eq!(product.location.as_deref(), Some("Shelf 3"));
}

#[tokio::test]
async fn test_add_duplicate_code_fails() {
    let harness = Harness::offline();
    add_product(&harness, "A1", 1).await;

    let err = run_impl(&harness.ctx, add_cmd("A1", 5)).await.unwrap_err();

    assert!(err.to_string().contains("already in use"));
}

#[tokio::test]
async fn test_edit_by_code_records_adjustment() {
    let harness = Harness::offline();
    add_product(&harness, "A1", 5).await;

    let cmd = edit_cmd("A1", None, Some("Large widget"), Some(9));
    run_impl(&harness.ctx, cmd).await.unwrap();

    let product = local_product(&harness, "A1").await.unwrap();
    assert_eq!(product.quantity, 9);
    assert_eq!(product.name, "Large widget");
    let pending = harness.pending().await;
    assert!(matches!(
        pending.last().unwrap().mutation,
        Mutation::CreateMovement { .. }
    ));
}

#[tokio::test]
async fn test_edit_by_local_id() {
    let harness = Harness::offline();
    let product = add_product(&harness, "A1", 5).await;
    let reference = crate::id::format_id(product.id);
    assert!(reference.starts_with('L'));

    let cmd = edit_cmd(&reference, Some("A2"), None, None);
    run_impl(&harness.ctx, cmd).await.unwrap();

    assert!(local_product(&harness, "A2").await.is_some());
    assert!(local_product(&harness, "A1").await.is_none());
}

#[tokio::test]
async fn test_edit_nothing_to_change() {
    let harness = Harness::offline();
    add_product(&harness, "A1", 5).await;

    let err = run_impl(&harness.ctx, edit_cmd("A1", None, None, None)).await.unwrap_err();

    assert!(matches!(err, Error::NothingToChange));
    assert_eq!(harness.pending().await.len(), 1);
}

#[tokio::test]
async fn test_rm_unknown_product() {
    let harness = Harness::offline();
    let err = run_impl(
        &harness.ctx,
        ProductCommand::Rm {
            product: "NOPE".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::ProductNotFound(ref r) if r == "NOPE"));
}

#[tokio::test]
async fn test_rm_online() {
    let harness = Harness::online().await;
    add_product(&harness, "A1", 5).await;

    run_impl(
        &harness.ctx,
        ProductCommand::Rm {
            product: "100".into(),
        },
    )
    .await
    .unwrap();

    assert!(local_product(&harness, "A1").await.is_none());
    assert!(harness.backend.product_by_code("A1").is_none());
}

#[tokio::test]
async fn test_numeric_code_falls_back_to_code_lookup() {
    let harness = Harness::offline();
    add_product(&harness, "4006381333931", 2).await;

    let found = resolve_product(&harness.ctx, "4006381333931").await.unwrap();

    assert_eq!(found.code, "4006381333931");
}

#[tokio::test]
async fn test_list_and_show_read_locally() {
    let harness = Harness::offline();
    add_product(&harness, "A1", 5).await;

    run_impl(
        &harness.ctx,
        ProductCommand::List {
            low: true,
            output: OutputFormat::Text,
        },
    )
    .await
    .unwrap();
    run_impl(
        &harness.ctx,
        ProductCommand::Show {
            product: "A1".into(),
            output: OutputFormat::Json,
        },
    )
    .await
    .unwrap();

    assert_eq!(harness.backend.total_probes(), 0);
}
