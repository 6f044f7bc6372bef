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

//! Query lifecycle driver.
//!
//! A [`QueryDriver`] owns the state of exactly one query: it submits the
//! statement, follows `nextUri` links until the server stops handing them out,
//! and folds every page into the accumulated rows, column names and state.

use crate::client::PrestoClient;
use crate::error::{Error, Result};
use crate::types::protocol::{QueryResults, QueryStats, Row};
use crate::types::state::QueryState;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Default delay between two page fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Drives a single query through the statement protocol.
///
/// One instance tracks one query. All mutating operations take `&mut self`,
/// so a driver cannot be shared between concurrent callers; run several
/// queries by creating several drivers.
#[derive(Debug)]
pub struct QueryDriver {
    client: Arc<dyn PrestoClient>,
    /// Delay before each continuation fetch. Busy retries are handled
    /// separately by the HTTP client.
    poll_interval: Duration,
    state: QueryState,
    next_uri: Option<String>,
    info_uri: Option<String>,
    partial_cancel_uri: Option<String>,
    query_id: Option<String>,
    rows: Vec<Row>,
    columns: Vec<String>,
    stats: Option<QueryStats>,
    /// First page of the current submission, folded by `wait_for_completion`.
    pending: Option<QueryResults>,
    closed: bool,
}

impl QueryDriver {
    pub fn new(client: Arc<dyn PrestoClient>) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: QueryState::Uninitialized,
            next_uri: None,
            info_uri: None,
            partial_cancel_uri: None,
            query_id: None,
            rows: Vec::new(),
            columns: Vec::new(),
            stats: None,
            pending: None,
            closed: false,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Submit query text.
    ///
    /// Clears previously accumulated rows and the continuation pointer. On
    /// success the state is `RUNNING` regardless of what the server reported;
    /// the first page is folded when [`wait_for_completion`] starts.
    ///
    /// [`wait_for_completion`]: QueryDriver::wait_for_completion
    pub async fn submit(&mut self, sql: &str) -> Result<()> {
        self.ensure_open()?;

        self.rows.clear();
        self.next_uri = None;
        self.pending = None;

        let page = self.client.start_query(sql).await?;
        Self::check_failure(&page)?;

        if !page.id.is_empty() {
            self.query_id = Some(page.id.clone());
        }
        self.next_uri = non_empty(page.next_uri.clone());
        self.pending = Some(page);
        self.state = QueryState::Running;

        debug!("Submitted query {:?}", self.query_id);
        Ok(())
    }

    /// Poll until the server stops returning a continuation URI.
    ///
    /// Fails with [`Error::Protocol`] as soon as a page reports a failure and
    /// with [`Error::IncoherentState`] when the last page leaves the query in
    /// any state other than `FINISHED`.
    pub async fn wait_for_completion(&mut self) -> Result<()> {
        self.ensure_open()?;

        if let Some(page) = self.pending.take() {
            self.fold_page(page);
        }

        while let Some(next_uri) = self.next_uri.clone() {
            sleep(self.poll_interval).await;

            debug!("Polling query {:?} at {}", self.query_id, next_uri);
            let page = self.client.fetch_next(&next_uri).await?;
            Self::check_failure(&page)?;
            self.fold_page(page);
        }

        if !self.state.is_finished() {
            return Err(Error::IncoherentState {
                state: self.state.to_string(),
            });
        }

        debug!(
            "Query {:?} finished with {} rows",
            self.query_id,
            self.rows.len()
        );
        Ok(())
    }

    /// Accumulated rows, available only once the query is `FINISHED`.
    pub fn rows(&self) -> Option<&[Row]> {
        if self.state.is_finished() {
            Some(&self.rows)
        } else {
            None
        }
    }

    /// Column names captured so far; empty until a page carried columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn query_id(&self) -> Option<&str> {
        self.query_id.as_deref()
    }

    pub fn next_uri(&self) -> Option<&str> {
        self.next_uri.as_deref()
    }

    pub fn info_uri(&self) -> Option<&str> {
        self.info_uri.as_deref()
    }

    pub fn partial_cancel_uri(&self) -> Option<&str> {
        self.partial_cancel_uri.as_deref()
    }

    /// Stats of the most recently folded page.
    pub fn stats(&self) -> Option<&QueryStats> {
        self.stats.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Fetch the coordinator's detail document for the submitted query.
    pub async fn finished_query_details(&self) -> Result<serde_json::Value> {
        self.ensure_open()?;
        let query_id = self
            .query_id
            .as_deref()
            .ok_or_else(|| Error::InvalidState("no query has been submitted".to_string()))?;
        self.client.get_query_info(query_id).await
    }

    /// Cancel the query. Calling this again is a no-op.
    ///
    /// The session is marked closed before the request is sent, so it stays
    /// closed even if the cancel request fails. When the server has no more
    /// pages there is nothing to cancel and no request is made.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match self.next_uri.as_deref() {
            Some(next_uri) => self.client.cancel_query(next_uri).await,
            None => {
                debug!("Query {:?} has no continuation, nothing to cancel", self.query_id);
                Ok(())
            }
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::InvalidState("query has been closed".to_string()));
        }
        Ok(())
    }

    fn check_failure(page: &QueryResults) -> Result<()> {
        if let Some(message) = page.failure_message() {
            return Err(Error::Protocol {
                code: page.error.as_ref().map_or(0, |e| e.error_code),
                message: message.to_string(),
            });
        }
        Ok(())
    }

    fn fold_page(&mut self, page: QueryResults) {
        let QueryResults {
            info_uri,
            next_uri,
            partial_cancel_uri,
            data,
            columns,
            stats,
            ..
        } = page;

        self.next_uri = non_empty(next_uri);

        if let Some(data) = data {
            self.rows.extend(data);
        }

        if let Some(uri) = non_empty(info_uri) {
            self.info_uri = Some(uri);
        }
        if let Some(uri) = non_empty(partial_cancel_uri) {
            self.partial_cancel_uri = Some(uri);
        }

        if let Some(state) = QueryState::from_server(&stats.state) {
            self.state = state;
        }

        // Column names are captured once per session.
        if self.columns.is_empty() {
            if let Some(columns) = columns.filter(|c| !c.is_empty()) {
                self.columns = columns.into_iter().map(|c| c.name).collect();
            }
        }

        debug!(
            "Query {:?}: state={}, rows={}, progress={:?}",
            self.query_id,
            self.state,
            self.rows.len(),
            stats.progress()
        );
        self.stats = Some(stats);
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
