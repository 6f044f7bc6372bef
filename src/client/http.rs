// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP client implementation for the Presto REST protocol.
//!
//! This module provides a low-level HTTP client with:
//! - Identification header injection (`X-Presto-User`, `X-Presto-Catalog`, ...)
//! - Automatic retry with capped exponential backoff on `503 Service Unavailable`
//! - Configurable timeouts

use crate::error::{Error, Result};
use reqwest::header::HeaderValue;
use reqwest::{Client, Request, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

pub const USER_HEADER: &str = "X-Presto-User";
pub const SOURCE_HEADER: &str = "X-Presto-Source";
pub const CATALOG_HEADER: &str = "X-Presto-Catalog";
pub const SCHEMA_HEADER: &str = "X-Presto-Schema";

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Read timeout duration.
    pub read_timeout: Duration,
    /// Delay before the first retry of a busy (503) response.
    pub initial_retry_delay: Duration,
    /// Upper bound for the doubling retry delay.
    pub max_retry_delay: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            initial_retry_delay: Duration::from_millis(50),
            max_retry_delay: Duration::from_millis(800),
            user_agent: format!("presto-client-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Identification sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub user: String,
    pub catalog: String,
    pub schema: String,
    /// Sent as `X-Presto-Source` only when set.
    pub source: Option<String>,
}

/// Capped exponential backoff for busy responses.
///
/// Yields the initial delay first and doubles after every call, never
/// exceeding the maximum. There is no attempt limit.
#[derive(Debug, Clone)]
pub struct RetryBackoff {
    next: Duration,
    max: Duration,
}

impl RetryBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            next: initial.min(max),
            max,
        }
    }

    /// Returns the delay to wait now and advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = self.next.saturating_mul(2).min(self.max);
        delay
    }
}

/// HTTP client for communicating with a Presto coordinator.
///
/// This client handles:
/// - Connection pooling (via reqwest)
/// - Unbounded retry of `503` responses with capped exponential backoff
/// - User-Agent and identification header injection
///
/// Any other non-success status and any transport failure is returned
/// immediately.
#[derive(Debug)]
pub struct PrestoHttpClient {
    client: Client,
    config: HttpClientConfig,
    identity: ClientIdentity,
}

impl PrestoHttpClient {
    /// Creates a new HTTP client with the given configuration and identity.
    pub fn new(config: HttpClientConfig, identity: ClientIdentity) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            identity,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Returns the identification sent with each request.
    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    /// Returns the underlying reqwest client for building requests.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Execute a protocol request, expecting `200 OK`.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        self.execute_expecting(request, StatusCode::OK).await
    }

    /// Execute a request, treating `expected` as the only success status.
    ///
    /// `503 Service Unavailable` is retried indefinitely with a fresh
    /// [`RetryBackoff`] per call. Every other status fails with
    /// [`Error::UnexpectedStatus`].
    pub async fn execute_expecting(
        &self,
        request: Request,
        expected: StatusCode,
    ) -> Result<Response> {
        let mut attempts: u32 = 0;
        let mut backoff = RetryBackoff::new(
            self.config.initial_retry_delay,
            self.config.max_retry_delay,
        );

        // Clone the request parts we need for retries
        let method = request.method().clone();
        let url = request.url().clone();
        let headers = request.headers().clone();
        let body_bytes = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| b.to_vec());

        loop {
            attempts += 1;

            let mut req_builder = self
                .client
                .request(method.clone(), url.clone())
                .headers(headers.clone());
            req_builder = self.with_identity(req_builder)?;

            if let Some(ref body) = body_bytes {
                req_builder = req_builder.body(body.clone());
            }

            let request = req_builder
                .build()
                .map_err(|e| Error::Transport(format!("Failed to build request: {}", e)))?;

            debug!("Executing {} {} (attempt {})", method, url, attempts);

            let response = self
                .client
                .execute(request)
                .await
                .map_err(|e| Error::Transport(format!("{} {} failed: {}", method, url, e)))?;

            let status = response.status();
            if status == expected {
                return Ok(response);
            }

            if status == StatusCode::SERVICE_UNAVAILABLE {
                let delay = backoff.next_delay();
                warn!(
                    "Server busy for {} {} (attempt {}), retrying in {:?}",
                    method, url, attempts, delay
                );
                sleep(delay).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
    }

    /// Add the identification headers to a request.
    fn with_identity(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let mut builder = builder
            .header(USER_HEADER, Self::header_value(&self.identity.user)?)
            .header(CATALOG_HEADER, Self::header_value(&self.identity.catalog)?)
            .header(SCHEMA_HEADER, Self::header_value(&self.identity.schema)?);
        if let Some(ref source) = self.identity.source {
            builder = builder.header(SOURCE_HEADER, Self::header_value(source)?);
        }
        Ok(builder)
    }

    fn header_value(value: &str) -> Result<HeaderValue> {
        HeaderValue::from_str(value)
            .map_err(|e| Error::Transport(format!("Invalid header value {:?}: {}", value, e)))
    }
}
