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

//! Error types for the Presto client.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the query driver and the request executor.
///
/// None of these are retried internally. A `503 Service Unavailable` never
/// reaches the caller as an error; the executor retries it with backoff.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be built, sent, or its body read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status the protocol does not expect.
    #[error("unexpected http status: {status} - {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The server reported a query failure in a response page.
    #[error("query failed: {message}")]
    Protocol { code: i64, message: String },

    /// The page sequence ended without the query reaching `FINISHED`.
    #[error("incoherent state at end of query: {state}")]
    IncoherentState { state: String },

    /// A response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The operation is not valid for the current session state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A configuration option was unknown or had an unusable value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}
