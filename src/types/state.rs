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

//! Query lifecycle state.

use std::fmt;

/// Lifecycle state of a query as last recorded by the driver.
///
/// The server reports its state as a free-form string in every page's
/// `stats.state`. Well-known values map to dedicated variants; anything else
/// is kept verbatim in [`QueryState::Other`]. Only [`QueryState::Finished`]
/// counts as success.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryState {
    /// No query has been submitted yet.
    #[default]
    Uninitialized,
    Queued,
    Waiting,
    Planning,
    Starting,
    Running,
    Finishing,
    Finished,
    Failed,
    Canceled,
    Other(String),
}

impl QueryState {
    /// Parse a server-reported state string. Returns `None` for an empty string,
    /// which the protocol uses to mean "no update".
    pub fn from_server(state: &str) -> Option<Self> {
        let parsed = match state {
            "" => return None,
            "QUEUED" => QueryState::Queued,
            "WAITING_FOR_RESOURCES" => QueryState::Waiting,
            "PLANNING" => QueryState::Planning,
            "STARTING" => QueryState::Starting,
            "RUNNING" => QueryState::Running,
            "FINISHING" => QueryState::Finishing,
            "FINISHED" => QueryState::Finished,
            "FAILED" => QueryState::Failed,
            "CANCELED" => QueryState::Canceled,
            other => QueryState::Other(other.to_string()),
        };
        Some(parsed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            QueryState::Uninitialized => "UNINITIALIZED",
            QueryState::Queued => "QUEUED",
            QueryState::Waiting => "WAITING_FOR_RESOURCES",
            QueryState::Planning => "PLANNING",
            QueryState::Starting => "STARTING",
            QueryState::Running => "RUNNING",
            QueryState::Finishing => "FINISHING",
            QueryState::Finished => "FINISHED",
            QueryState::Failed => "FAILED",
            QueryState::Canceled => "CANCELED",
            QueryState::Other(s) => s,
        }
    }

    /// True once the query completed successfully.
    pub fn is_finished(&self) -> bool {
        matches!(self, QueryState::Finished)
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_uninitialized() {
        assert_eq!(QueryState::default(), QueryState::Uninitialized);
        assert!(!QueryState::default().is_finished());
    }

    #[test]
    fn test_from_server_known_states() {
        assert_eq!(QueryState::from_server("QUEUED"), Some(QueryState::Queued));
        assert_eq!(
            QueryState::from_server("FINISHED"),
            Some(QueryState::Finished)
        );
        assert_eq!(QueryState::from_server("FAILED"), Some(QueryState::Failed));
    }

    #[test]
    fn test_from_server_empty_is_no_update() {
        assert_eq!(QueryState::from_server(""), None);
    }

    #[test]
    fn test_unknown_state_round_trips_through_display() {
        let state = QueryState::from_server("DISPATCHING").unwrap();
        assert_eq!(state, QueryState::Other("DISPATCHING".to_string()));
        assert_eq!(state.to_string(), "DISPATCHING");
        assert!(!state.is_finished());
    }
}
