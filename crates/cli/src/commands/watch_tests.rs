// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::commands::testing::*;
use tokio::sync::oneshot;

#[tokio::test]
async fn test_watch_syncs_until_shutdown() {
    let harness = Harness::offline();
    add_product(&harness, "A1", 5).await;
    harness.backend.serve(&server_addr());
    harness.configure(&server_addr()).await;

    let (stop, stopped) = oneshot::channel::<()>();
    let mut stop = Some(stop);
    let mut reports = Vec::new();
    run_impl(
        &harness.ctx,
        Duration::from_secs(3600),
        async {
            let _ = stopped.await;
        },
        |report| {
            reports.push(*report);
            if let Some(stop) = stop.take() {
                let _ = stop.send(());
            }
        },
    )
    .await
    .unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].succeeded, 1);
    assert!(harness.pending().await.is_empty());
}
