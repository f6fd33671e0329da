//! Errors raised while launching the supervisor.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use thiserror::Error;
use warden_config::{RuntimePathsError, SocketPreparationError};

/// Failures encountered while launching `wardend` and waiting for it.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to spawn supervisor binary '{binary:?}': {source}")]
    LaunchSupervisor {
        binary: OsString,
        #[source]
        source: io::Error,
    },
    #[error("supervisor exited before reporting ready (status: {exit_status:?})")]
    StartupFailed { exit_status: Option<i32> },
    #[error("supervisor reported 'stopping' before reaching ready; check health snapshot at {path:?}")]
    StartupAborted { path: PathBuf },
    #[error("timed out waiting for ready snapshot in {timeout_ms} ms at {health_path:?}")]
    StartupTimeout {
        health_path: PathBuf,
        timeout_ms: u128,
    },
    #[error("failed to monitor supervisor launch: {source}")]
    MonitorChild {
        #[source]
        source: io::Error,
    },
    #[error("failed to read health snapshot {path:?}: {source}")]
    ReadHealth {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse health snapshot {path:?}: {source}")]
    ParseHealth {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("system clock reports {time:?}, which precedes the Unix epoch")]
    InvalidSystemClock { time: SystemTime },
    #[error("failed to write launch notice: {0}")]
    Io(#[source] io::Error),
    #[error(transparent)]
    Paths(#[from] RuntimePathsError),
    #[error("failed to prepare supervisor socket: {source}")]
    Socket {
        #[from]
        source: SocketPreparationError,
    },
    #[error("failed to open runtime directory {path:?}: {source}")]
    OpenRuntimeDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
