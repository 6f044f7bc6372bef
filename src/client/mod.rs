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

//! Client implementations for communicating with a Presto coordinator.
//!
//! This module provides:
//! - `PrestoClient` trait: the request/decode operations the query driver needs
//! - `PrestoHttpClient`: low-level HTTP client with busy-retry logic
//! - `RestClient`: implementation over the REST statement protocol

pub mod http;
pub mod rest;

use crate::error::Result;
use crate::types::protocol::QueryResults;
use async_trait::async_trait;

pub use http::{ClientIdentity, HttpClientConfig, PrestoHttpClient, RetryBackoff};
pub use rest::RestClient;

/// Abstract interface over the statement protocol's requests.
///
/// Implementations send the request and decode the body. Interpreting the
/// decoded pages (failure detection, folding, state tracking) is left to
/// [`crate::driver::QueryDriver`].
#[async_trait]
pub trait PrestoClient: Send + Sync + std::fmt::Debug {
    /// Submit query text and return the first response page.
    async fn start_query(&self, sql: &str) -> Result<QueryResults>;

    /// Fetch the page behind a continuation URI.
    async fn fetch_next(&self, next_uri: &str) -> Result<QueryResults>;

    /// Cancel the query through its current continuation URI.
    async fn cancel_query(&self, next_uri: &str) -> Result<()>;

    /// Fetch the coordinator's detail document for a query.
    async fn get_query_info(&self, query_id: &str) -> Result<serde_json::Value>;
}
