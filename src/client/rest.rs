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

//! REST statement protocol client.
//!
//! Implements [`PrestoClient`] on top of [`PrestoHttpClient`]:
//! - `POST {statement_url}` with the raw query text
//! - `GET {nextUri}` for every following page
//! - `DELETE {nextUri}` to cancel, answered with `204 No Content`
//! - `GET {statement_url minus last segment}/query/{id}?pretty` for details

use crate::client::{PrestoClient, PrestoHttpClient};
use crate::error::{Error, Result};
use crate::types::protocol::QueryResults;
use async_trait::async_trait;
use reqwest::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing::debug;

/// Client for the Presto REST statement protocol.
#[derive(Debug)]
pub struct RestClient {
    http_client: Arc<PrestoHttpClient>,
    statement_url: String,
}

impl RestClient {
    /// Create a client submitting queries to `statement_url`
    /// (typically `http://host:8080/v1/statement`).
    pub fn new(http_client: Arc<PrestoHttpClient>, statement_url: impl Into<String>) -> Self {
        Self {
            http_client,
            statement_url: statement_url.into(),
        }
    }

    pub fn statement_url(&self) -> &str {
        &self.statement_url
    }

    /// Replace the final path segment of the statement URL with
    /// `query/{id}?pretty`.
    fn query_info_url(&self, query_id: &str) -> String {
        let base = self
            .statement_url
            .rsplit_once('/')
            .map(|(base, _)| base)
            .unwrap_or(&self.statement_url);
        format!("{}/query/{}?pretty", base, query_id)
    }

    fn build_request(&self, method: Method, url: &str, body: Option<&str>) -> Result<Request> {
        let mut builder = self.http_client.inner().request(method, url);
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }
        builder
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build request: {}", e)))
    }

    async fn read_body(response: Response) -> Result<String> {
        response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response: {}", e)))
    }

    fn decode_page(body: &str) -> Result<QueryResults> {
        serde_json::from_str(body).map_err(|e| {
            Error::Decode(format!("Failed to parse query results: {} - body: {}", e, body))
        })
    }

    async fn request_page(&self, request: Request) -> Result<QueryResults> {
        let response = self.http_client.execute(request).await?;
        let body = Self::read_body(response).await?;
        let page = Self::decode_page(&body)?;

        debug!(
            "Page: id={}, state={}, rows={}, next_uri={:?}",
            page.id,
            page.stats.state,
            page.data.as_ref().map_or(0, Vec::len),
            page.next_uri
        );

        Ok(page)
    }
}

#[async_trait]
impl PrestoClient for RestClient {
    async fn start_query(&self, sql: &str) -> Result<QueryResults> {
        debug!("Submitting query to {}: {}", self.statement_url, sql);
        let request = self.build_request(Method::POST, &self.statement_url, Some(sql))?;
        self.request_page(request).await
    }

    async fn fetch_next(&self, next_uri: &str) -> Result<QueryResults> {
        let request = self.build_request(Method::GET, next_uri, None)?;
        self.request_page(request).await
    }

    async fn cancel_query(&self, next_uri: &str) -> Result<()> {
        debug!("Canceling query at {}", next_uri);
        let request = self.build_request(Method::DELETE, next_uri, None)?;
        self.http_client
            .execute_expecting(request, StatusCode::NO_CONTENT)
            .await?;
        Ok(())
    }

    async fn get_query_info(&self, query_id: &str) -> Result<serde_json::Value> {
        let url = self.query_info_url(query_id);
        debug!("Fetching query details at {}", url);
        let request = self.build_request(Method::GET, &url, None)?;
        let response = self.http_client.execute(request).await?;
        let body = Self::read_body(response).await?;
        serde_json::from_str(&body).map_err(|e| {
            Error::Decode(format!("Failed to parse query details: {} - body: {}", e, body))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientIdentity, HttpClientConfig};
    use serde_json::json;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(statement_url: &str) -> RestClient {
        let identity = ClientIdentity {
            user: "presto".to_string(),
            catalog: "hive".to_string(),
            schema: "default".to_string(),
            source: None,
        };
        let http_client =
            Arc::new(PrestoHttpClient::new(HttpClientConfig::default(), identity).unwrap());
        RestClient::new(http_client, statement_url)
    }

    #[tokio::test]
    async fn test_query_info_url() {
        let client = create_test_client("http://coordinator:8080/v1/statement");
        assert_eq!(
            client.query_info_url("20240101_000000_00001_abcde"),
            "http://coordinator:8080/v1/query/20240101_000000_00001_abcde?pretty"
        );
    }

    #[tokio::test]
    async fn test_query_info_url_trailing_slash() {
        let client = create_test_client("http://coordinator:8080/v1/statement/");
        assert_eq!(
            client.query_info_url("q1"),
            "http://coordinator:8080/v1/statement/query/q1?pretty"
        );
    }

    #[tokio::test]
    async fn test_start_query_posts_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/statement"))
            .and(body_string("SELECT 1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "q1",
                "nextUri": format!("{}/v1/statement/q1/1", server.uri()),
                "stats": {"state": "QUEUED"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&format!("{}/v1/statement", server.uri()));
        let page = client.start_query("SELECT 1").await.unwrap();
        assert_eq!(page.id, "q1");
        assert_eq!(page.stats.state, "QUEUED");
    }

    #[tokio::test]
    async fn test_fetch_next_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = create_test_client(&format!("{}/v1/statement", server.uri()));
        let err = client
            .fetch_next(&format!("{}/v1/statement/q1/1", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_cancel_query_expects_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/statement/q1/2"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&format!("{}/v1/statement", server.uri()));
        client
            .cancel_query(&format!("{}/v1/statement/q1/2", server.uri()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_query_other_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = create_test_client(&format!("{}/v1/statement", server.uri()));
        let err = client
            .cancel_query(&format!("{}/v1/statement/q1/2", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedStatus { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_get_query_info_returns_open_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/query/q1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "queryId": "q1",
                "state": "FINISHED",
                "queryStats": {"elapsedTime": "1.20s"}
            })))
            .mount(&server)
            .await;

        let client = create_test_client(&format!("{}/v1/statement", server.uri()));
        let info = client.get_query_info("q1").await.unwrap();
        assert_eq!(info["state"], "FINISHED");
        assert_eq!(info["queryStats"]["elapsedTime"], "1.20s");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("pretty"));
    }
}
