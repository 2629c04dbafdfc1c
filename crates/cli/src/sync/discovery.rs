// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local-network backend discovery.
//!
//! Sweeps the device's own /24 first, then a few common home and office
//! subnets. On each subnet a short list of likely host suffixes is probed
//! before the remaining addresses are swept in fixed-size concurrent batches.

use std::net::Ipv4Addr;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use super::backend::{bounded, Backend, BackendAddr};
use super::connectivity::Connectivity;
use super::context::{FlagGuard, SyncContext};

/// Parse a subnet written as its first three octets, e.g. `192.168.1`.
pub fn parse_subnet(s: &str) -> Option<[u8; 3]> {
    let mut octets = [0u8; 3];
    let mut parts = s.trim().split('.');
    for octet in &mut octets {
        *octet = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

fn subnet_of(ip: Ipv4Addr) -> [u8; 3] {
    let [a, b, c, _] = ip.octets();
    [a, b, c]
}

/// Run one sweep. Returns `None` if nothing answered or another sweep is
/// already in progress.
pub(super) async fn discover<B: Backend>(connectivity: &Connectivity<'_, B>) -> Option<BackendAddr> {
    let ctx = connectivity.context();
    let Some(_sweep) = FlagGuard::acquire(&ctx.discovering) else {
        debug!("discovery already running");
        return None;
    };

    let Some(local) = ctx.link.local_ipv4() else {
        debug!("no network link, skipping discovery");
        return None;
    };
    let port = connectivity.configured_port().await;

    let own = subnet_of(local);
    let mut subnets = vec![own];
    subnets.extend(
        ctx.options
            .discovery
            .fallback_subnets
            .iter()
            .copied()
            .filter(|subnet| *subnet != own),
    );

    for subnet in subnets {
        info!(
            subnet = %format_args!("{}.{}.{}.0/24", subnet[0], subnet[1], subnet[2]),
            port,
            "searching for backend"
        );
        if let Some(found) = sweep_subnet(ctx, subnet, port).await {
            return Some(found);
        }
    }

    warn!("no backend found on the local network");
    None
}

async fn sweep_subnet<B: Backend>(
    ctx: &SyncContext<B>,
    subnet: [u8; 3],
    port: u16,
) -> Option<BackendAddr> {
    let options = &ctx.options.discovery;
    let batch_size = options.batch_size.max(1);

    let priority: Vec<u8> = options
        .priority_hosts
        .iter()
        .copied()
        .filter(|host| (1..=254).contains(host))
        .collect();
    for batch in priority.chunks(batch_size) {
        if let Some(found) = probe_batch(ctx, subnet, port, batch, options.priority_timeout).await {
            return Some(found);
        }
    }

    let rest: Vec<u8> = (1..=254u8).filter(|host| !priority.contains(host)).collect();
    for batch in rest.chunks(batch_size) {
        if let Some(found) = probe_batch(ctx, subnet, port, batch, options.probe_timeout).await {
            return Some(found);
        }
    }
    None
}

/// Probe `hosts` concurrently; the first responder in list order wins.
async fn probe_batch<B: Backend>(
    ctx: &SyncContext<B>,
    subnet: [u8; 3],
    port: u16,
    hosts: &[u8],
    timeout: Duration,
) -> Option<BackendAddr> {
    let candidates: Vec<BackendAddr> = hosts
        .iter()
        .map(|host| {
            let ip = Ipv4Addr::new(subnet[0], subnet[1], subnet[2], *host);
            BackendAddr::new(ip.to_string(), port)
        })
        .collect();

    let results = join_all(
        candidates
            .iter()
            .map(|addr| bounded(timeout, ctx.backend.probe(addr))),
    )
    .await;

    candidates
        .into_iter()
        .zip(results)
        .find_map(|(addr, result)| result.ok().map(|_| addr))
}
