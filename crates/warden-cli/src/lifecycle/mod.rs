//! Launching `wardend` when the client finds no supervisor listening.
//!
//! - [`error`] captures the launch failure surface.
//! - [`spawning`] resolves the supervisor binary and spawns it.
//! - [`monitoring`] polls the health snapshot until the supervisor is ready.

mod error;
mod monitoring;
mod spawning;

use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::time::{Duration, SystemTime};

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::{debug, info};
use warden_config::{Config, RuntimePaths};

pub use error::LifecycleError;
pub(crate) use monitoring::HealthSnapshot;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Inputs needed to launch the supervisor on the client's behalf.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LifecycleContext<'a> {
    pub(crate) config: &'a Config,
    /// Configuration flags the client was invoked with, including `argv[0]`.
    pub(crate) config_arguments: &'a [OsString],
    /// Binary to launch instead of `WARDEND_BIN` or the default name.
    pub(crate) supervisor_binary: Option<&'a OsStr>,
}

/// Launches the supervisor and blocks until it reports ready.
///
/// Writes a waiting notice to `stderr` first so operators know why the
/// command pauses.
pub(crate) fn start_supervisor<E: Write>(
    context: LifecycleContext<'_>,
    stderr: &mut E,
) -> Result<HealthSnapshot, LifecycleError> {
    writeln!(stderr, "Waiting for wardend to start...").map_err(LifecycleError::Io)?;
    stderr.flush().map_err(LifecycleError::Io)?;

    let paths = prepare_runtime(context.config)?;
    let started_at = SystemTime::now();
    let mut child = spawning::spawn_supervisor(context.config_arguments, context.supervisor_binary)?;
    debug!(pid = child.id(), "spawned supervisor");

    let snapshot = monitoring::wait_for_ready(&paths, &mut child, started_at, STARTUP_TIMEOUT)?;
    info!(pid = snapshot.pid, "supervisor reported ready");
    Ok(snapshot)
}

fn prepare_runtime(config: &Config) -> Result<RuntimePaths, LifecycleError> {
    config.supervisor_socket().prepare_filesystem()?;
    RuntimePaths::from_config(config).map_err(LifecycleError::from)
}

pub(super) fn open_runtime_dir(paths: &RuntimePaths) -> Result<Dir, LifecycleError> {
    Dir::open_ambient_dir(paths.runtime_dir(), ambient_authority()).map_err(|source| {
        LifecycleError::OpenRuntimeDir {
            path: paths.runtime_dir().to_path_buf(),
            source,
        }
    })
}
