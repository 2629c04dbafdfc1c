// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use std::path::Path;

#[test]
fn test_init_defaults() {
    let cli = parse(&["stockyard", "init"]).unwrap();
    match cli.command {
        Command::Init {
            host,
            port,
            no_discovery,
        } => {
            assert!(host.is_none());
            assert!(port.is_none());
            assert!(!no_discovery);
        }
        _ => panic!("Expected Init command"),
    }
}

#[test]
fn test_init_with_host_and_port() {
    let cli = parse(&[
        "stockyard",
        "init",
        "--host",
        "10.0.0.5",
        "--port",
        "8080",
        "--no-discovery",
    ])
    .unwrap();
    match cli.command {
        Command::Init {
            host,
            port,
            no_discovery,
        } => {
            assert_eq!(host.as_deref(), Some("10.0.0.5"));
            assert_eq!(port, Some(8080));
            assert!(no_discovery);
        }
        _ => panic!("Expected Init command"),
    }
}

#[test]
fn test_data_dir_is_global() {
    let cli = parse(&["stockyard", "status", "--data-dir", "/tmp/inv"]).unwrap();
    assert_eq!(cli.data_dir.as_deref(), Some(Path::new("/tmp/inv")));
}

#[test]
fn test_backend_set() {
    let cli = parse(&["stockyard", "backend", "set", "inv.lan", "--port", "8080"]).unwrap();
    match cli.command {
        Command::Backend(BackendCommand::Set { host, port }) => {
            assert_eq!(host, "inv.lan");
            assert_eq!(port, Some(8080));
        }
        _ => panic!("Expected Backend Set command"),
    }
}

#[test]
fn test_backend_port_out_of_range() {
    assert!(parse(&["stockyard", "backend", "set", "inv.lan", "--port", "70000"]).is_err());
}

#[test]
fn test_sync_json_output() {
    let cli = parse(&["stockyard", "sync", "-o", "json"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Sync {
            output: OutputFormat::Json
        }
    ));
}

#[test]
fn test_watch_interval() {
    let cli = parse(&["stockyard", "watch", "-i", "15"]).unwrap();
    assert!(matches!(cli.command, Command::Watch { interval: Some(15) }));
}
