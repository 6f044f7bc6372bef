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

//! Connection configuration for a Presto coordinator.

use crate::client::{ClientIdentity, HttpClientConfig, PrestoClient, PrestoHttpClient, RestClient};
use crate::driver::{QueryDriver, DEFAULT_POLL_INTERVAL};
use crate::error::{Error, Result};
use crate::logging::{init_logging, LogConfig};
use crate::query::Query;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// User sent in `X-Presto-User` unless configured.
pub const DEFAULT_USER: &str = "presto";
/// Schema sent in `X-Presto-Schema` unless configured.
pub const DEFAULT_SCHEMA: &str = "default";

/// Holds everything needed to talk to one coordinator: the statement endpoint,
/// the identification headers, and the polling and retry timings.
///
/// Queries created from a `Database` share its configuration but nothing else;
/// each one tracks its own statement.
#[derive(Debug, Clone)]
pub struct Database {
    /// Statement endpoint, e.g. `http://coordinator:8080/v1/statement`.
    uri: String,
    catalog: String,
    user: String,
    schema: String,
    source: Option<String>,

    poll_interval: Duration,

    // HTTP client configuration
    http_config: HttpClientConfig,

    log_config: LogConfig,
}

impl Database {
    /// Creates a configuration for the statement endpoint `uri` and `catalog`,
    /// with the default user and schema.
    pub fn new(uri: impl Into<String>, catalog: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            catalog: catalog.into(),
            user: DEFAULT_USER.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            source: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            http_config: HttpClientConfig::default(),
            log_config: LogConfig::default(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http_config.user_agent = user_agent.into();
        self
    }

    /// Delay between page fetches while a query is running.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Backoff bounds for retrying `503` responses.
    pub fn with_retry_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.http_config.initial_retry_delay = initial;
        self.http_config.max_retry_delay = max;
        self
    }

    /// Returns the statement endpoint.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn http_config(&self) -> &HttpClientConfig {
        &self.http_config
    }

    /// Set an option by key. Durations are given in milliseconds.
    ///
    /// | Option | Description |
    /// |--------|-------------|
    /// | `presto.uri` | Statement endpoint |
    /// | `presto.catalog` | Catalog header |
    /// | `presto.schema` | Schema header |
    /// | `presto.user` | User header |
    /// | `presto.source` | Source header |
    /// | `presto.user_agent` | User-Agent header |
    /// | `presto.poll_interval_ms` | Delay between page fetches |
    /// | `presto.retry.initial_delay_ms` | First busy-retry delay |
    /// | `presto.retry.max_delay_ms` | Busy-retry delay ceiling |
    /// | `presto.http.connect_timeout_ms` | Connect timeout |
    /// | `presto.http.read_timeout_ms` | Request timeout |
    /// | `presto.log_level` | Log level (`off` disables logging) |
    /// | `presto.log_file` | Log file path |
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "presto.uri" => self.uri = value.to_string(),
            "presto.catalog" => self.catalog = value.to_string(),
            "presto.schema" => self.schema = value.to_string(),
            "presto.user" => self.user = value.to_string(),
            "presto.source" => self.source = Some(value.to_string()),
            "presto.user_agent" => self.http_config.user_agent = value.to_string(),
            "presto.poll_interval_ms" => self.poll_interval = Self::parse_millis(key, value)?,
            "presto.retry.initial_delay_ms" => {
                self.http_config.initial_retry_delay = Self::parse_millis(key, value)?
            }
            "presto.retry.max_delay_ms" => {
                self.http_config.max_retry_delay = Self::parse_millis(key, value)?
            }
            "presto.http.connect_timeout_ms" => {
                self.http_config.connect_timeout = Self::parse_millis(key, value)?
            }
            "presto.http.read_timeout_ms" => {
                self.http_config.read_timeout = Self::parse_millis(key, value)?
            }
            "presto.log_level" => self.log_config.level = Some(value.to_string()),
            "presto.log_file" => self.log_config.file = Some(value.to_string()),
            _ => {
                return Err(Error::InvalidArgument(format!("unknown option '{}'", key)));
            }
        }
        Ok(())
    }

    /// Read an option back as a string.
    pub fn get_option(&self, key: &str) -> Result<String> {
        let value = match key {
            "presto.uri" => self.uri.clone(),
            "presto.catalog" => self.catalog.clone(),
            "presto.schema" => self.schema.clone(),
            "presto.user" => self.user.clone(),
            "presto.user_agent" => self.http_config.user_agent.clone(),
            "presto.poll_interval_ms" => self.poll_interval.as_millis().to_string(),
            "presto.retry.initial_delay_ms" => {
                self.http_config.initial_retry_delay.as_millis().to_string()
            }
            "presto.retry.max_delay_ms" => self.http_config.max_retry_delay.as_millis().to_string(),
            "presto.source" => self.source.clone().ok_or_else(|| not_set(key))?,
            "presto.log_level" => self.log_config.level.clone().ok_or_else(|| not_set(key))?,
            "presto.log_file" => self.log_config.file.clone().ok_or_else(|| not_set(key))?,
            _ => {
                return Err(Error::InvalidArgument(format!("unknown option '{}'", key)));
            }
        };
        Ok(value)
    }

    fn parse_millis(key: &str, value: &str) -> Result<Duration> {
        value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| {
                Error::InvalidArgument(format!(
                    "option '{}' expects milliseconds, got '{}'",
                    key, value
                ))
            })
    }

    fn identity(&self) -> ClientIdentity {
        ClientIdentity {
            user: self.user.clone(),
            catalog: self.catalog.clone(),
            schema: self.schema.clone(),
            source: self.source.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.uri.is_empty() {
            return Err(Error::InvalidArgument("uri not set".to_string()));
        }
        if self.catalog.is_empty() {
            return Err(Error::InvalidArgument("catalog not set".to_string()));
        }
        Ok(())
    }

    /// Creates an async driver for one query.
    pub fn new_driver(&self) -> Result<QueryDriver> {
        self.validate()?;
        init_logging(&self.log_config);

        debug!(
            "Creating query driver for {} (catalog={}, schema={}, user={})",
            self.uri, self.catalog, self.schema, self.user
        );

        let http_client = Arc::new(PrestoHttpClient::new(
            self.http_config.clone(),
            self.identity(),
        )?);
        let client: Arc<dyn PrestoClient> = Arc::new(RestClient::new(http_client, &self.uri));

        Ok(QueryDriver::new(client).with_poll_interval(self.poll_interval))
    }

    /// Creates a blocking query handle with its own tokio runtime.
    ///
    /// Must not be called from within an async context; use
    /// [`Database::new_driver`] there.
    pub fn new_query(&self) -> Result<Query> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create runtime: {}", e)))?;

        let driver = {
            let _guard = runtime.enter();
            self.new_driver()?
        };

        Ok(Query::new(driver, runtime))
    }
}

fn not_set(key: &str) -> Error {
    Error::InvalidState(format!("option '{}' is not set", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_defaults() {
        let db = Database::new("http://coordinator:8080/v1/statement", "hive");
        assert_eq!(db.uri(), "http://coordinator:8080/v1/statement");
        assert_eq!(db.catalog(), "hive");
        assert_eq!(db.user(), DEFAULT_USER);
        assert_eq!(db.schema(), DEFAULT_SCHEMA);
        assert!(db.source().is_none());
        assert_eq!(db.poll_interval(), Duration::from_millis(50));
        assert_eq!(db.http_config().initial_retry_delay, Duration::from_millis(50));
        assert_eq!(db.http_config().max_retry_delay, Duration::from_millis(800));
    }

    #[test]
    fn test_database_builder() {
        let db = Database::new("http://coordinator:8080/v1/statement", "hive")
            .with_user("alice")
            .with_schema("web")
            .with_source("etl")
            .with_user_agent("my-app/2.0")
            .with_poll_interval(Duration::from_millis(10))
            .with_retry_delays(Duration::from_millis(5), Duration::from_millis(40));

        assert_eq!(db.user(), "alice");
        assert_eq!(db.schema(), "web");
        assert_eq!(db.source(), Some("etl"));
        assert_eq!(db.http_config().user_agent, "my-app/2.0");
        assert_eq!(db.poll_interval(), Duration::from_millis(10));
        assert_eq!(db.http_config().max_retry_delay, Duration::from_millis(40));
    }

    #[test]
    fn test_database_set_options() {
        let mut db = Database::new("http://coordinator:8080/v1/statement", "hive");
        db.set_option("presto.user", "bob").unwrap();
        db.set_option("presto.schema", "sales").unwrap();
        db.set_option("presto.poll_interval_ms", "250").unwrap();
        db.set_option("presto.retry.max_delay_ms", "1600").unwrap();
        db.set_option("presto.http.read_timeout_ms", "5000").unwrap();

        assert_eq!(db.user(), "bob");
        assert_eq!(db.get_option("presto.schema").unwrap(), "sales");
        assert_eq!(db.get_option("presto.poll_interval_ms").unwrap(), "250");
        assert_eq!(db.http_config().max_retry_delay, Duration::from_millis(1600));
        assert_eq!(db.http_config().read_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_database_invalid_options() {
        let mut db = Database::new("http://coordinator:8080/v1/statement", "hive");
        assert!(matches!(
            db.set_option("presto.unknown", "x"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            db.set_option("presto.poll_interval_ms", "fast"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            db.get_option("presto.source"),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_database_new_query_missing_catalog() {
        let db = Database::new("http://coordinator:8080/v1/statement", "");
        assert!(matches!(db.new_query(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_database_new_query() {
        let db = Database::new("http://coordinator:8080/v1/statement", "hive");
        let query = db.new_query().unwrap();
        assert_eq!(query.state().as_str(), "UNINITIALIZED");
        assert!(!query.is_closed());
    }
}
