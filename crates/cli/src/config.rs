// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is stored in `<data dir>/config.toml`. Every field has a
//! default, so a missing section or key falls back to the built-in value:
//! - `[backend]`: default port and request timeouts
//! - `[discovery]`: whether and how to sweep the local network
//! - `[sync]`: queue eviction limits and the `watch` interval
//!
//! The backend host itself is a setting in the local database, not part of
//! this file, so it can be changed from the command line without rewriting
//! the configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};
use crate::sync::{parse_subnet, DiscoveryOptions, EvictionPolicy, SyncOptions};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "STOCKYARD_DIR";

const APP_DIR_NAME: &str = "stockyard";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "stock.db";
const QUEUE_FILE_NAME: &str = "queue.jsonl";

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Port used when only a host is configured, and for discovery (default: 3000).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Timeout for probing a known backend address in milliseconds (default: 3000).
    #[serde(default = "default_check_timeout_ms")]
    pub check_timeout_ms: u64,
    /// Timeout for data requests in milliseconds (default: 12000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            port: default_port(),
            check_timeout_ms: default_check_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Local network discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Sweep the local network when no backend answers (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Per-probe timeout during a sweep in milliseconds (default: 800).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Per-probe timeout for priority hosts in milliseconds (default: 1000).
    #[serde(default = "default_priority_timeout_ms")]
    pub priority_timeout_ms: u64,
    /// Concurrent probes per batch (default: 10).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Host suffixes tried first on every subnet.
    #[serde(default = "default_priority_hosts")]
    pub priority_hosts: Vec<u8>,
    /// Subnets swept after the device's own, as first three octets ("192.168.0").
    #[serde(default = "default_subnets")]
    pub subnets: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            enabled: true,
            probe_timeout_ms: default_probe_timeout_ms(),
            priority_timeout_ms: default_priority_timeout_ms(),
            batch_size: default_batch_size(),
            priority_hosts: default_priority_hosts(),
            subnets: default_subnets(),
        }
    }
}

/// Pending queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Queued changes older than this many days are discarded (default: 15).
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,
    /// Queued changes that failed this many times are discarded (default: 5).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Seconds between passes for `stockyard watch` (default: 60).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            max_age_days: default_max_age_days(),
            max_attempts: default_max_attempts(),
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_check_timeout_ms() -> u64 {
    3_000
}

fn default_request_timeout_ms() -> u64 {
    12_000
}

fn default_true() -> bool {
    true
}

fn default_probe_timeout_ms() -> u64 {
    800
}

fn default_priority_timeout_ms() -> u64 {
    1_000
}

fn default_batch_size() -> usize {
    10
}

fn default_priority_hosts() -> Vec<u8> {
    vec![1, 2, 3, 4, 5, 100, 101, 150, 200, 254]
}

fn default_subnets() -> Vec<String> {
    ["192.168.0", "192.168.1", "10.0.0", "172.16.0"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_age_days() -> i64 {
    15
}

fn default_max_attempts() -> u32 {
    5
}

fn default_interval_secs() -> u64 {
    60
}

impl Config {
    /// Loads configuration from the given data directory.
    ///
    /// A missing file yields the defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_age().is_none() {
            return Err(Error::Config(format!(
                "sync.max_age_days must be a positive number of days (got {})",
                self.sync.max_age_days
            )));
        }
        Ok(())
    }

    fn max_age(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_days(self.sync.max_age_days)
            .filter(|age| *age > chrono::Duration::zero())
    }

    /// Saves configuration to the given data directory.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Engine options derived from this configuration.
    ///
    /// Unparseable fallback subnets are skipped with a warning.
    pub fn sync_options(&self) -> SyncOptions {
        let fallback_subnets = self
            .discovery
            .subnets
            .iter()
            .filter_map(|s| {
                let parsed = parse_subnet(s);
                if parsed.is_none() {
                    warn!(subnet = %s, "ignoring invalid discovery subnet");
                }
                parsed
            })
            .collect();

        SyncOptions {
            default_port: self.backend.port,
            check_timeout: Duration::from_millis(self.backend.check_timeout_ms),
            request_timeout: Duration::from_millis(self.backend.request_timeout_ms),
            discovery: DiscoveryOptions {
                enabled: self.discovery.enabled,
                priority_hosts: self.discovery.priority_hosts.clone(),
                fallback_subnets,
                batch_size: self.discovery.batch_size.max(1),
                priority_timeout: Duration::from_millis(self.discovery.priority_timeout_ms),
                probe_timeout: Duration::from_millis(self.discovery.probe_timeout_ms),
            },
            eviction: EvictionPolicy {
                max_age: self.max_age().unwrap_or(EvictionPolicy::default().max_age),
                max_attempts: self.sync.max_attempts,
            },
        }
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.sync.interval_secs.max(1))
    }
}

/// Resolve the data directory: explicit flag, then `STOCKYARD_DIR`, then the
/// platform data directory.
pub fn resolve_data_dir(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(Error::NoDataDir)
}

/// Fail unless `stockyard init` has been run for `data_dir`.
pub fn ensure_initialized(data_dir: &Path) -> Result<()> {
    if data_dir.join(CONFIG_FILE_NAME).is_file() {
        Ok(())
    } else {
        Err(Error::NotInitialized(data_dir.display().to_string()))
    }
}

/// Create the data directory and write `config`.
pub fn init_data_dir(data_dir: &Path, config: &Config) -> Result<()> {
    if data_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(data_dir.display().to_string()));
    }
    fs::create_dir_all(data_dir)?;
    config.save(data_dir)
}

pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE_NAME)
}

pub fn queue_path(data_dir: &Path) -> PathBuf {
    data_dir.join(QUEUE_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
