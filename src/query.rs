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

//! Blocking query handle.

use crate::driver::QueryDriver;
use crate::error::Result;
use crate::types::protocol::{QueryStats, Row};
use crate::types::state::QueryState;
use tokio::runtime::Runtime;
use tracing::debug;

/// A query executed against a Presto coordinator with blocking calls.
///
/// Wraps a [`QueryDriver`] together with the tokio runtime that runs it.
/// Each `Query` tracks exactly one statement; create another `Query` from the
/// [`Database`](crate::Database) to run statements concurrently.
#[derive(Debug)]
pub struct Query {
    driver: QueryDriver,
    runtime: Runtime,
}

impl Query {
    pub(crate) fn new(driver: QueryDriver, runtime: Runtime) -> Self {
        Self { driver, runtime }
    }

    /// Submit query text. See [`QueryDriver::submit`].
    pub fn submit(&mut self, sql: &str) -> Result<()> {
        self.runtime.block_on(self.driver.submit(sql))
    }

    /// Block until the server has delivered every page.
    /// See [`QueryDriver::wait_for_completion`].
    pub fn wait_for_completion(&mut self) -> Result<()> {
        self.runtime.block_on(self.driver.wait_for_completion())
    }

    /// Submit `sql`, wait for it to finish and return all rows.
    pub fn execute(&mut self, sql: &str) -> Result<&[Row]> {
        debug!("Executing query: {}", sql);
        self.submit(sql)?;
        self.wait_for_completion()?;
        Ok(self.driver.rows().unwrap_or_default())
    }

    /// Accumulated rows, `None` until the query is `FINISHED`.
    pub fn rows(&self) -> Option<&[Row]> {
        self.driver.rows()
    }

    pub fn columns(&self) -> &[String] {
        self.driver.columns()
    }

    pub fn state(&self) -> &QueryState {
        self.driver.state()
    }

    pub fn query_id(&self) -> Option<&str> {
        self.driver.query_id()
    }

    pub fn info_uri(&self) -> Option<&str> {
        self.driver.info_uri()
    }

    pub fn stats(&self) -> Option<&QueryStats> {
        self.driver.stats()
    }

    /// Fetch the coordinator's detail document for this query.
    pub fn finished_query_details(&self) -> Result<serde_json::Value> {
        self.runtime.block_on(self.driver.finished_query_details())
    }

    /// Cancel the query on the server. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        self.runtime.block_on(self.driver.close())
    }

    pub fn is_closed(&self) -> bool {
        self.driver.is_closed()
    }

    /// The underlying async driver.
    pub fn driver(&self) -> &QueryDriver {
        &self.driver
    }
}
