// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP implementation of the backend contract using reqwest.
//!
//! All endpoints live under `http://<host>:<port>/api`. Request bodies and
//! responses are JSON. Call sites bound every request with
//! [`bounded`](super::backend::bounded), so the client carries no timeout of
//! its own beyond the connect timeout.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use sy_core::{
    Configuration, ConfigurationValue, Dashboard, Movement, NewMovement, NewProduct, Product,
    ProductPatch, RecordId,
};

use super::backend::{Backend, BackendAddr, BackendError, BackendFuture, BackendResult};

/// Backend reached over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
}

impl HttpBackend {
    /// Build a client whose connection attempts give up after `connect_timeout`.
    pub fn new(connect_timeout: Duration) -> BackendResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;
        Ok(HttpBackend { client })
    }

    pub(super) fn url(addr: &BackendAddr, segments: &[&str]) -> BackendResult<Url> {
        let mut url = Url::parse(&format!("http://{}:{}/", addr.host, addr.port))
            .map_err(|e| BackendError::Client(format!("invalid backend address {addr}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Client(format!("invalid backend address {addr}")))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        addr: &BackendAddr,
        segments: &[&str],
    ) -> BackendResult<RequestBuilder> {
        Ok(self.client.request(method, Self::url(addr, segments)?))
    }
}

fn send_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Unreachable(err.to_string())
    }
}

async fn send(request: RequestBuilder) -> BackendResult<Response> {
    let response = request.send().await.map_err(send_error)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(BackendError::from_status(status.as_u16(), message))
}

async fn json<T: DeserializeOwned>(request: RequestBuilder) -> BackendResult<T> {
    send(request)
        .await?
        .json::<T>()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::Decode(e.to_string())
            }
        })
}

async fn empty(request: RequestBuilder) -> BackendResult<()> {
    send(request).await.map(|_| ())
}

impl Backend for HttpBackend {
    fn probe<'a>(&'a self, addr: &'a BackendAddr) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let request = self
                .request(Method::GET, addr, &["products"])?
                .query(&[("limit", "1")]);
            empty(request).await
        })
    }

    fn list_products<'a>(&'a self, addr: &'a BackendAddr) -> BackendFuture<'a, Vec<Product>> {
        Box::pin(async move { json(self.request(Method::GET, addr, &["products"])?).await })
    }

    fn get_product<'a>(
        &'a self,
        addr: &'a BackendAddr,
        id: RecordId,
    ) -> BackendFuture<'a, Product> {
        Box::pin(async move {
            let id = id.to_string();
            json(self.request(Method::GET, addr, &["products", &id])?).await
        })
    }

    fn get_product_by_code<'a>(
        &'a self,
        addr: &'a BackendAddr,
        code: &'a str,
    ) -> BackendFuture<'a, Product> {
        Box::pin(async move {
            json(self.request(Method::GET, addr, &["products", "code", code])?).await
        })
    }

    fn create_product<'a>(
        &'a self,
        addr: &'a BackendAddr,
        product: &'a NewProduct,
    ) -> BackendFuture<'a, Product> {
        Box::pin(async move {
            json(self.request(Method::POST, addr, &["products"])?.json(product)).await
        })
    }

    fn update_product<'a>(
        &'a self,
        addr: &'a BackendAddr,
        id: RecordId,
        patch: &'a ProductPatch,
    ) -> BackendFuture<'a, Product> {
        Box::pin(async move {
            let id = id.to_string();
            json(self.request(Method::PUT, addr, &["products", &id])?.json(patch)).await
        })
    }

    fn delete_product<'a>(&'a self, addr: &'a BackendAddr, id: RecordId) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let id = id.to_string();
            empty(self.request(Method::DELETE, addr, &["products", &id])?).await
        })
    }

    fn create_movement<'a>(
        &'a self,
        addr: &'a BackendAddr,
        movement: &'a NewMovement,
    ) -> BackendFuture<'a, Movement> {
        Box::pin(async move {
            json(self.request(Method::POST, addr, &["movements"])?.json(movement)).await
        })
    }

    fn list_movements<'a>(&'a self, addr: &'a BackendAddr) -> BackendFuture<'a, Vec<Movement>> {
        Box::pin(async move { json(self.request(Method::GET, addr, &["movements"])?).await })
    }

    fn list_product_movements<'a>(
        &'a self,
        addr: &'a BackendAddr,
        product_id: RecordId,
    ) -> BackendFuture<'a, Vec<Movement>> {
        Box::pin(async move {
            let id = product_id.to_string();
            json(self.request(Method::GET, addr, &["products", &id, "movements"])?).await
        })
    }

    fn get_configuration<'a>(
        &'a self,
        addr: &'a BackendAddr,
        key: &'a str,
    ) -> BackendFuture<'a, Configuration> {
        Box::pin(async move {
            json(self.request(Method::GET, addr, &["configurations", key])?).await
        })
    }

    fn list_configurations<'a>(
        &'a self,
        addr: &'a BackendAddr,
    ) -> BackendFuture<'a, Vec<Configuration>> {
        Box::pin(async move { json(self.request(Method::GET, addr, &["configurations"])?).await })
    }

    fn update_configuration<'a>(
        &'a self,
        addr: &'a BackendAddr,
        key: &'a str,
        value: &'a ConfigurationValue,
    ) -> BackendFuture<'a, Configuration> {
        Box::pin(async move {
            json(
                self.request(Method::PUT, addr, &["configurations", key])?
                    .json(value),
            )
            .await
        })
    }

    fn dashboard<'a>(&'a self, addr: &'a BackendAddr) -> BackendFuture<'a, Dashboard> {
        Box::pin(async move { json(self.request(Method::GET, addr, &["dashboard"])?).await })
    }
}
