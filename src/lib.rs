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

//! Presto client for Rust
//!
//! This crate drives queries through the Presto/Trino REST statement protocol:
//! a query is `POST`ed to the coordinator, which answers with a page pointing
//! to the next one through `nextUri`. The client follows those links until the
//! server stops returning them, collecting rows and column names on the way.
//!
//! ## Overview
//!
//! - [`Database`] - Coordinator endpoint, identification and timing configuration
//! - [`Query`] - Blocking handle for one query
//! - [`QueryDriver`] - Async driver behind [`Query`]
//! - [`PrestoHttpClient`] - HTTP client that retries `503` responses with backoff
//!
//! ## Example
//!
//! ```ignore
//! use presto_client::Database;
//!
//! let database = Database::new("http://coordinator:8080/v1/statement", "hive")
//!     .with_user("alice")
//!     .with_schema("web");
//!
//! let mut query = database.new_query()?;
//! let rows = query.execute("SELECT name, visits FROM pages")?.to_vec();
//! println!("{:?} -> {} rows", query.columns(), rows.len());
//! query.close()?;
//! ```
//!
//! ## Configuration Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `presto.user` | `presto` | `X-Presto-User` header |
//! | `presto.schema` | `default` | `X-Presto-Schema` header |
//! | `presto.poll_interval_ms` | 50 | Delay between page fetches |
//! | `presto.retry.initial_delay_ms` | 50 | First busy-retry delay |
//! | `presto.retry.max_delay_ms` | 800 | Busy-retry delay ceiling |

pub mod client;
pub mod database;
pub mod driver;
pub mod error;
pub(crate) mod logging;
pub mod query;
pub mod types;

// Re-export main types
pub use database::Database;
pub use driver::QueryDriver;
pub use error::{Error, Result};
pub use query::Query;

// Re-export client types for advanced users
pub use client::{ClientIdentity, HttpClientConfig, PrestoClient, PrestoHttpClient, RestClient};

pub use types::{QueryResults, QueryState, QueryStats, Row};
