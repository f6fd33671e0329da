//! Supervisor connection and command errors.

use std::io;

use thiserror::Error;

use crate::lifecycle::LifecycleError;

/// Failures establishing or probing a supervisor connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to resolve supervisor address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    #[error("failed to connect to supervisor at {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    #[cfg(not(unix))]
    #[error("platform does not support Unix sockets: {0}")]
    UnsupportedUnixTransport(String),
    #[error("failed to prepare supervisor connection: {0}")]
    Stream(#[source] io::Error),
    #[error("failed to start supervisor: {0}")]
    Launch(#[from] LifecycleError),
    #[error("supervisor did not answer the status query: {0}")]
    StatusQuery(#[source] CommandError),
}

/// Failures of individual supervisor calls.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The supervisor rejected the request.
    #[error("{message}")]
    Supervisor { message: String },
    #[error("failed to serialise supervisor request: {0}")]
    Serialise(#[source] serde_json::Error),
    #[error("failed to send request to supervisor: {0}")]
    Send(#[source] io::Error),
    #[error("failed to read from supervisor: {0}")]
    Receive(#[source] io::Error),
    #[error("failed to parse supervisor message: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("supervisor sent {limit} consecutive empty lines")]
    EmptyLines { limit: usize },
    #[error("expected {expected} from supervisor but received {received}")]
    UnexpectedReply {
        expected: &'static str,
        received: &'static str,
    },
    #[error("supervisor closed the connection before replying")]
    Closed,
}
