//! Operator commands against the supervisor.
//!
//! [`Daemon`] owns a [`Connector`] and the configuration tree. Each command
//! opens its own connection and, apart from `logs`, releases it before
//! returning. All user-facing output goes through a [`DisplaySink`].

mod kill;
mod logs;
mod persistence;

use std::io;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::resolver::{render, resolve};
use crate::sink::DisplaySink;
use crate::supervisor::{CommandError, ConnectionError, Connector};

pub use kill::{KillOutcome, KillRequest};

/// Name operators know the supervisor by.
pub(crate) const SUPERVISOR_NAME: &str = "wardend";

/// Control client for the supervisor.
pub struct Daemon<C> {
    connector: C,
    config: Value,
}

/// Failures surfaced by [`Daemon`] commands.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("no configuration value at '{path}'")]
    UnknownConfigPath { path: String },
    #[error("failed to format log timestamp: {0}")]
    FormatDate(#[source] time::error::Format),
    #[error("failed to write command output: {0}")]
    Display(#[source] io::Error),
}

impl<C: Connector> Daemon<C> {
    /// Creates a client over `connector` with the nested configuration view.
    pub const fn new(connector: C, config: Value) -> Self {
        Self { connector, config }
    }

    /// Prints the configuration value at the dot-separated `path`.
    pub fn config<S>(&self, path: &str, sink: &mut S) -> Result<(), DaemonError>
    where
        S: DisplaySink + ?Sized,
    {
        let value = resolve(&self.config, path).ok_or_else(|| DaemonError::UnknownConfigPath {
            path: path.to_owned(),
        })?;
        sink.write_line(format_args!("{}", render(value)))
            .map_err(DaemonError::Display)
    }

    /// Prints whether the supervisor is running and returns the answer.
    pub fn status<S>(&mut self, sink: &mut S) -> Result<bool, DaemonError>
    where
        S: DisplaySink + ?Sized,
    {
        let running = self.connector.running()?;
        debug!(running, "queried supervisor state");
        let state = if running { "is running" } else { "is not running" };
        sink.write_line(format_args!("{SUPERVISOR_NAME} {state}"))
            .map_err(DaemonError::Display)?;
        Ok(running)
    }
}
