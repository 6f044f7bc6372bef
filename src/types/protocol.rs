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

//! Presto REST protocol response types.
//!
//! These types map to the JSON page returned by `POST /v1/statement` and by
//! every subsequent `GET` of a `nextUri`. All fields are optional on the wire;
//! an absent `nextUri` is the only signal that the page sequence is complete.

use serde::Deserialize;

/// One row of result data. Values are opaque to the driver.
pub type Row = Vec<serde_json::Value>;

/// A single response page of the statement protocol.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub info_uri: Option<String>,
    #[serde(default)]
    pub next_uri: Option<String>,
    #[serde(default, alias = "PartialCancelUri")]
    pub partial_cancel_uri: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Row>>,
    #[serde(default)]
    pub columns: Option<Vec<Column>>,
    #[serde(default)]
    pub error: Option<QueryError>,
    #[serde(default)]
    pub stats: QueryStats,
}

impl QueryResults {
    /// Failure message carried by this page, if the query failed.
    pub fn failure_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|e| e.failure_info.as_ref())
            .map(|f| f.message.as_str())
            .filter(|m| !m.is_empty())
    }
}

/// Column descriptor. Only the name is used by the driver.
#[derive(Debug, Clone, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
}

/// Error block of a failed query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryError {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub failure_info: Option<FailureInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FailureInfo {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

/// Execution statistics reported with each page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStats {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub scheduled: bool,
    #[serde(default)]
    pub completed_splits: i64,
    #[serde(default)]
    pub total_splits: i64,
}

impl QueryStats {
    /// Fraction of splits completed, in `0.0..=1.0`. `None` until the server
    /// knows how many splits the query has.
    pub fn progress(&self) -> Option<f64> {
        if self.total_splits <= 0 {
            return None;
        }
        Some((self.completed_splits as f64 / self.total_splits as f64).min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_queued_page() {
        let body = r#"{
            "id": "20240101_000000_00001_abcde",
            "infoUri": "http://coordinator:8080/ui/query.html?20240101_000000_00001_abcde",
            "nextUri": "http://coordinator:8080/v1/statement/queued/20240101_000000_00001_abcde/1",
            "stats": {"state": "QUEUED", "scheduled": false, "completedSplits": 0, "totalSplits": 0}
        }"#;

        let page: QueryResults = serde_json::from_str(body).unwrap();
        assert_eq!(page.id, "20240101_000000_00001_abcde");
        assert!(page.next_uri.is_some());
        assert!(page.data.is_none());
        assert!(page.columns.is_none());
        assert_eq!(page.stats.state, "QUEUED");
        assert!(page.failure_message().is_none());
    }

    #[test]
    fn test_decode_data_page_with_legacy_cancel_key() {
        let body = r#"{
            "id": "q1",
            "PartialCancelUri": "http://coordinator:8080/v1/stage/q1.0",
            "columns": [{"name": "a", "type": "bigint"}, {"name": "b", "type": "varchar"}],
            "data": [[1, "x"], [2, null]],
            "stats": {"state": "RUNNING", "scheduled": true, "completedSplits": 3, "totalSplits": 4}
        }"#;

        let page: QueryResults = serde_json::from_str(body).unwrap();
        assert_eq!(
            page.partial_cancel_uri.as_deref(),
            Some("http://coordinator:8080/v1/stage/q1.0")
        );
        let columns = page.columns.unwrap();
        assert_eq!(columns[0].name, "a");
        assert_eq!(columns[1].type_name.as_deref(), Some("varchar"));
        let data = page.data.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[1][1], serde_json::Value::Null);
        assert_eq!(page.stats.progress(), Some(0.75));
    }

    #[test]
    fn test_failure_message() {
        let body = r#"{
            "id": "q1",
            "error": {
                "errorCode": 1,
                "errorName": "SYNTAX_ERROR",
                "message": "line 1:1: mismatched input",
                "failureInfo": {"type": "io.prestosql.sql.parser.ParsingException", "message": "line 1:1: mismatched input"}
            },
            "stats": {"state": "FAILED"}
        }"#;

        let page: QueryResults = serde_json::from_str(body).unwrap();
        assert_eq!(page.failure_message(), Some("line 1:1: mismatched input"));
        assert_eq!(page.error.unwrap().error_code, 1);
    }

    #[test]
    fn test_empty_failure_message_is_not_a_failure() {
        let body = r#"{"id": "q1", "error": {"errorCode": 0, "failureInfo": {"message": ""}}}"#;
        let page: QueryResults = serde_json::from_str(body).unwrap();
        assert!(page.failure_message().is_none());
    }

    #[test]
    fn test_progress_unknown_without_splits() {
        assert_eq!(QueryStats::default().progress(), None);
    }
}
