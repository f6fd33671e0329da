//! Error types for the CLI runtime.

use std::sync::Arc;

use thiserror::Error;

use crate::daemon::DaemonError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    /// Sentinel for bare invocation; help has already been written.
    #[error("bare invocation")]
    BareInvocation,
    #[error("invalid pid '{value}': expected a non-negative integer")]
    InvalidPid { value: String },
    #[error("failed to render configuration: {0}")]
    RenderConfiguration(serde_json::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Daemon(#[from] DaemonError),
}
