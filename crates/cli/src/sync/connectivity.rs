// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline mode and backend address resolution.
//!
//! The mode flips to online only after a probe succeeds, and flips back to
//! offline on any transport failure. Address resolution order:
//!
//! 1. last-known-good address (cleared if it stops answering)
//! 2. configured host and port from settings
//! 3. network discovery, when enabled

use std::fmt;
use std::net::{Ipv4Addr, UdpSocket};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sy_core::db::{SETTING_BACKEND_HOST, SETTING_BACKEND_PORT, SETTING_LAST_KNOWN_GOOD};
use tracing::{debug, info, warn};

use super::backend::{bounded, Backend, BackendAddr};
use super::context::SyncContext;
use super::discovery;

/// Whether remote calls are currently attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Online,
    #[default]
    Offline,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Online => "online",
            Mode::Offline => "offline",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the connectivity manager's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityState {
    pub mode: Mode,
    pub last_known_good: Option<BackendAddr>,
    pub last_contact: Option<DateTime<Utc>>,
}

/// Source of the device's own network address.
pub trait NetworkLink: Send + Sync {
    /// The IPv4 address of the active interface, or `None` without a network.
    fn local_ipv4(&self) -> Option<Ipv4Addr>;
}

/// Reads the address of the interface the OS would route outbound traffic
/// through. No packet is sent.
pub struct SystemLink;

impl NetworkLink for SystemLink {
    fn local_ipv4(&self) -> Option<Ipv4Addr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
        socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).ok()?;
        match socket.local_addr().ok()?.ip() {
            std::net::IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
            _ => None,
        }
    }
}

/// Connectivity manager, borrowed from a [`SyncContext`].
pub struct Connectivity<'a, B: Backend> {
    ctx: &'a SyncContext<B>,
}

impl<'a, B: Backend> Connectivity<'a, B> {
    pub(super) fn new(ctx: &'a SyncContext<B>) -> Self {
        Connectivity { ctx }
    }

    /// Current mode, without any network activity.
    pub fn current_mode(&self) -> Mode {
        self.ctx.read_state().mode
    }

    pub fn state(&self) -> ConnectivityState {
        self.ctx.read_state().clone()
    }

    pub fn last_known_good(&self) -> Option<BackendAddr> {
        self.ctx.read_state().last_known_good.clone()
    }

    /// Address from the host and port settings, if a host is configured.
    pub async fn configured_address(&self) -> Option<BackendAddr> {
        let db = self.ctx.db.lock().await;
        let host = match db.get_setting(SETTING_BACKEND_HOST) {
            Ok(Some(host)) if !host.trim().is_empty() => host,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "could not read backend host setting");
                return None;
            }
        };
        Some(BackendAddr::new(host.trim(), self.port_setting(&db)))
    }

    /// Port to use for discovered hosts.
    pub async fn configured_port(&self) -> u16 {
        let db = self.ctx.db.lock().await;
        self.port_setting(&db)
    }

    fn port_setting(&self, db: &sy_core::Database) -> u16 {
        match db.get_setting(SETTING_BACKEND_PORT) {
            Ok(Some(port)) => port.trim().parse().unwrap_or_else(|_| {
                warn!(port = %port, "invalid backend port setting, using default");
                self.ctx.options.default_port
            }),
            Ok(None) => self.ctx.options.default_port,
            Err(e) => {
                warn!(error = %e, "could not read backend port setting");
                self.ctx.options.default_port
            }
        }
    }

    /// Decide whether the backend is reachable right now.
    ///
    /// A failing last-known-good address is forgotten and the check ends
    /// offline; the next check falls through to the configured address and
    /// discovery.
    pub async fn check_connectivity(&self) -> bool {
        if self.ctx.link.local_ipv4().is_none() {
            debug!("no network link");
            self.go_offline();
            return false;
        }

        if let Some(addr) = self.last_known_good() {
            if self.probe(&addr).await {
                self.go_online(addr).await;
                return true;
            }
            warn!(%addr, "backend stopped responding, forgetting address");
            self.forget_last_known_good().await;
            self.go_offline();
            return false;
        }

        if let Some(addr) = self.configured_address().await {
            if self.probe(&addr).await {
                self.go_online(addr).await;
                return true;
            }
            info!(%addr, "configured backend not responding");
        }

        if self.ctx.options.discovery.enabled && self.discover_backend().await.is_some() {
            return true;
        }

        self.go_offline();
        false
    }

    /// Probe the last-known-good or configured address only. Never runs
    /// discovery and never forgets an address.
    pub async fn probe_known(&self) -> bool {
        if self.ctx.link.local_ipv4().is_none() {
            self.go_offline();
            return false;
        }

        let known = self.last_known_good();
        if let Some(addr) = &known {
            if self.probe(addr).await {
                self.go_online(addr.clone()).await;
                return true;
            }
        }
        if let Some(addr) = self.configured_address().await {
            if known.as_ref() != Some(&addr) && self.probe(&addr).await {
                self.go_online(addr).await;
                return true;
            }
        }

        self.go_offline();
        false
    }

    /// Sweep the local network for a backend. On success the address is
    /// adopted as last-known-good and the mode goes online.
    ///
    /// Returns `None` without probing if a sweep is already running.
    pub async fn discover_backend(&self) -> Option<BackendAddr> {
        let found = discovery::discover(self).await?;
        info!(addr = %found, "discovered backend");
        self.go_online(found.clone()).await;
        Some(found)
    }

    /// Record that a request failed for lack of connectivity.
    pub fn report_unreachable(&self) {
        if self.current_mode() == Mode::Online {
            info!("backend unreachable, switching to offline mode");
        }
        self.go_offline();
    }

    pub(super) fn context(&self) -> &'a SyncContext<B> {
        self.ctx
    }

    async fn probe(&self, addr: &BackendAddr) -> bool {
        let result = bounded(self.ctx.options.check_timeout, self.ctx.backend.probe(addr)).await;
        if let Err(e) = &result {
            debug!(%addr, error = %e, "probe failed");
        }
        result.is_ok()
    }

    fn go_offline(&self) {
        self.ctx.write_state().mode = Mode::Offline;
    }

    async fn go_online(&self, addr: BackendAddr) {
        let changed = {
            let mut state = self.ctx.write_state();
            let changed = state.last_known_good.as_ref() != Some(&addr);
            state.mode = Mode::Online;
            state.last_known_good = Some(addr.clone());
            state.last_contact = Some(Utc::now());
            changed
        };
        if changed {
            let db = self.ctx.db.lock().await;
            if let Err(e) = db.set_setting(SETTING_LAST_KNOWN_GOOD, &addr.to_string()) {
                warn!(error = %e, "could not persist backend address");
            }
        }
    }

    /// Drop the remembered backend address, in memory and on disk.
    pub async fn forget_last_known_good(&self) {
        self.ctx.write_state().last_known_good = None;
        let db = self.ctx.db.lock().await;
        if let Err(e) = db.remove_setting(SETTING_LAST_KNOWN_GOOD) {
            warn!(error = %e, "could not clear stored backend address");
        }
    }
}
