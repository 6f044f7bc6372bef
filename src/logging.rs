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

//! Logging configuration for the Presto client.
//!
//! Initializes a `tracing-subscriber` with file or stderr output.
//!
//! ## Configuration priority
//!
//! 1. `presto.log_level` / `presto.log_file` options (highest)
//! 2. `RUST_LOG` environment variable
//! 3. Default: `warn`
//!
//! ## Usage
//!
//! ```bash
//! # Via environment variable
//! RUST_LOG=presto_client=debug ./my_app
//! ```
//!
//! Or programmatically via options:
//! ```ignore
//! database.set_option("presto.log_level", "debug")?;
//! database.set_option("presto.log_file", "/tmp/presto-client.log")?;
//! ```

use std::fs::{File, OpenOptions};
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt::{self, time::SystemTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const CRATE_TARGET: &str = "presto_client";

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Logging configuration passed via database options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LogConfig {
    /// Log level: "OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE".
    pub level: Option<String>,
    /// Log file path. If unset, logs go to stderr.
    pub file: Option<String>,
}

impl LogConfig {
    /// Filter directive for the configured level, `None` when logging is off.
    /// Without a configured level `RUST_LOG` decides, falling back to `warn`.
    fn filter(&self) -> Option<EnvFilter> {
        match self.level.as_deref() {
            Some(level) if level.eq_ignore_ascii_case("off") => None,
            Some(level) => Some(EnvFilter::new(directive(level))),
            None => Some(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(directive("warn"))),
            ),
        }
    }
}

fn directive(level: &str) -> String {
    format!("{}={}", CRATE_TARGET, level.to_lowercase())
}

fn open_log_file(path: &str) -> Option<File> {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("presto-client: failed to open log file {}: {}", path, e);
            None
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Uses `OnceLock` so only the first call per process has an effect; the
/// first query created from a `Database` configures logging.
pub(crate) fn init_logging(config: &LogConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        let Some(filter) = config.filter() else {
            return;
        };

        let registry = tracing_subscriber::registry().with(filter);
        match config.file.as_deref() {
            Some(path) => {
                let Some(file) = open_log_file(path) else {
                    return;
                };
                registry
                    .with(
                        fmt::layer()
                            .with_writer(file)
                            .with_target(false)
                            .with_ansi(false)
                            .with_timer(SystemTime),
                    )
                    .try_init()
                    .ok();
            }
            None => {
                registry
                    .with(
                        fmt::layer()
                            .with_writer(std::io::stderr)
                            .with_target(false)
                            .with_timer(SystemTime),
                    )
                    .try_init()
                    .ok();
            }
        }
    });
}
