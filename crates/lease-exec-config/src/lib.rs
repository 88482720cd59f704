//! Configuration for the `lease-exec` command-line tool.
//!
//! Values are layered by `ortho_config`: built-in defaults, then a TOML file
//! (named with `--config-path` or `LEASE_EXEC_CONFIG_PATH`), then
//! `LEASE_EXEC_*` environment variables, then command-line flags. The
//! `exec_*` fields hold the script command templates and are flattened into
//! the `exec.*` property keys the adapter is initialised from.

mod defaults;
mod logging;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Layered configuration for the lease adapter binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "LEASE_EXEC")]
pub struct Config {
    /// Tracing filter expression, for example `info` or `lease_exec=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Command template run for join requests.
    #[serde(default)]
    pub exec_join: Option<String>,
    /// Command template run for leave requests.
    #[serde(default)]
    pub exec_leave: Option<String>,
    /// Command template run for modify requests.
    #[serde(default)]
    pub exec_modify: Option<String>,
    /// Command template run for renew requests.
    #[serde(default)]
    pub exec_renew: Option<String>,
    /// Command template run for status requests.
    #[serde(default)]
    pub exec_status: Option<String>,
    /// Working directory for every script.
    #[serde(default)]
    pub exec_wd: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            exec_join: None,
            exec_leave: None,
            exec_modify: None,
            exec_renew: None,
            exec_status: None,
            exec_wd: None,
        }
    }
}

impl Config {
    /// Returns the tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Flattens the script settings into `exec.*` property keys.
    ///
    /// Unset fields are omitted so the adapter can report which key is
    /// missing.
    #[must_use]
    pub fn exec_properties(&self) -> BTreeMap<String, String> {
        [
            ("exec.join", &self.exec_join),
            ("exec.leave", &self.exec_leave),
            ("exec.modify", &self.exec_modify),
            ("exec.renew", &self.exec_renew),
            ("exec.status", &self.exec_status),
            ("exec.wd", &self.exec_wd),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|value| (key.to_owned(), value.clone())))
        .collect()
    }
}
