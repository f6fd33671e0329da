//! Shared configuration for the Warden control client.
//!
//! [`Config`] is layered by `ortho_config`: built-in defaults, then an
//! optional configuration file (`--config-path` or `WARDEN_CONFIG_PATH`),
//! then `WARDEN_*` environment variables, then command-line flags. The
//! client reads it once at start-up and treats it as immutable afterwards.

mod defaults;
mod logging;
mod runtime;
mod socket;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_SUPERVISOR_BINARY, DEFAULT_TCP_PORT, default_log_filter,
    default_log_filter_string, default_log_format, default_socket_endpoint,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use runtime::{RuntimePaths, RuntimePathsError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Layered configuration consumed by the `warden` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "WARDEN")]
#[serde(default)]
pub struct Config {
    /// Endpoint the supervisor listens on.
    pub supervisor_socket: SocketEndpoint,
    /// Explicit supervisor binary used when the client has to launch it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor_binary: Option<String>,
    /// `tracing` filter expression for client diagnostics.
    pub log_filter: String,
    /// Output format for client diagnostics.
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supervisor_socket: default_socket_endpoint(),
            supervisor_binary: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Endpoint the supervisor listens on.
    #[must_use]
    pub fn supervisor_socket(&self) -> &SocketEndpoint {
        &self.supervisor_socket
    }

    /// Supervisor binary override, if one was configured.
    #[must_use]
    pub fn supervisor_binary(&self) -> Option<&str> {
        self.supervisor_binary.as_deref()
    }

    /// Filter expression applied to client diagnostics.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Format used for client diagnostics.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Renders the configuration as a nested JSON mapping.
    ///
    /// The `config` command resolves dot-separated paths against this view,
    /// so `supervisor_socket.transport` names the socket transport.
    pub fn tree(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
