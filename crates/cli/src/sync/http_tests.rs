// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the HTTP backend against a throwaway local listener.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::time::Duration;

use chrono::Utc;
use sy_core::{NewProduct, Product};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::backend::{Backend, BackendAddr, BackendError};
use super::http::HttpBackend;

/// Accept one connection, answer it with `status` and `body`, and return the
/// raw request text.
async fn serve_once(status: &str, body: String) -> (BackendAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let status = status.to_string();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });
    (BackendAddr::new("127.0.0.1", port), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).to_string()
}

fn backend() -> HttpBackend {
    HttpBackend::new(Duration::from_secs(2)).unwrap()
}

#[test]
fn test_url_escapes_segments() {
    let addr = BackendAddr::new("192.168.1.20", 3000);
    let url = HttpBackend::url(&addr, &["products", "code", "A 1/x"]).unwrap();
    assert_eq!(
        url.as_str(),
        "http://192.168.1.20:3000/api/products/code/A%201%2Fx"
    );
}

#[tokio::test]
async fn test_probe_requests_single_product_page() {
    let (addr, server) = serve_once("200 OK", "[]".to_string()).await;
    backend().probe(&addr).await.unwrap();
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/products?limit=1 HTTP/1.1"));
}

#[tokio::test]
async fn test_get_product_decodes_body() {
    let product = Product::from_new(7, &NewProduct::new("A1", "Widget", 4), Utc::now());
    let body = serde_json::to_string(&product).unwrap();
    let (addr, server) = serve_once("200 OK", body).await;

    let fetched = backend().get_product(&addr, 7).await.unwrap();

    assert_eq!(fetched, product);
    assert!(server
        .await
        .unwrap()
        .starts_with("GET /api/products/7 HTTP/1.1"));
}

#[tokio::test]
async fn test_create_product_posts_json() {
    let product = Product::from_new(9, &NewProduct::new("A1", "Widget", 4), Utc::now());
    let (addr, server) = serve_once("201 Created", serde_json::to_string(&product).unwrap()).await;

    let created = backend()
        .create_product(&addr, &NewProduct::new("A1", "Widget", 4))
        .await
        .unwrap();

    assert_eq!(created.id, 9);
    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/products HTTP/1.1"));
    assert!(request.contains("\"code\":\"A1\""));
}

#[tokio::test]
async fn test_conflict_status() {
    let (addr, _server) = serve_once("409 Conflict", "\"duplicate\"".to_string()).await;
    let err = backend()
        .create_product(&addr, &NewProduct::new("A1", "Widget", 4))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Conflict(message) if message.contains("duplicate")));
}

#[tokio::test]
async fn test_not_found_status() {
    let (addr, _server) = serve_once("404 Not Found", String::new()).await;
    let err = backend().delete_product(&addr, 3).await.unwrap_err();
    assert_eq!(err, BackendError::NotFound);
}

#[tokio::test]
async fn test_server_error_status() {
    let (addr, _server) = serve_once("503 Service Unavailable", String::new()).await;
    let err = backend().dashboard(&addr).await.unwrap_err();
    assert!(matches!(err, BackendError::Server { status: 503, .. }));
    assert!(err.falls_back());
}

#[tokio::test]
async fn test_bad_body_is_decode_error() {
    let (addr, _server) = serve_once("200 OK", "{\"nope\":".to_string()).await;
    let err = backend().list_products(&addr).await.unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn test_refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = backend()
        .probe(&BackendAddr::new("127.0.0.1", port))
        .await
        .unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err:?}");
}
