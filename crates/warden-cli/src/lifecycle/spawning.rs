//! Supervisor process spawning.

use std::env;
use std::ffi::{OsStr, OsString};
use std::process::{Child, Command, Stdio};

use warden_config::DEFAULT_SUPERVISOR_BINARY;

use super::error::LifecycleError;

/// Environment variable naming the supervisor binary when no override is set.
pub(super) const SUPERVISOR_BINARY_ENV: &str = "WARDEND_BIN";

/// Spawns the supervisor with the client's configuration flags.
///
/// Uses the binary override if provided, otherwise `WARDEND_BIN`, otherwise
/// `wardend` from `PATH`.
pub(super) fn spawn_supervisor(
    config_arguments: &[OsString],
    binary_override: Option<&OsStr>,
) -> Result<Child, LifecycleError> {
    let binary = resolve_supervisor_binary(binary_override);
    let mut command = Command::new(&binary);
    // argv[0] is the client's own name; forward the flags after it verbatim.
    command.args(config_arguments.iter().skip(1));
    command
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    command
        .spawn()
        .map_err(|source| LifecycleError::LaunchSupervisor { binary, source })
}

fn resolve_supervisor_binary(binary_override: Option<&OsStr>) -> OsString {
    binary_override
        .map(OsString::from)
        .or_else(|| env::var_os(SUPERVISOR_BINARY_ENV))
        .unwrap_or_else(|| OsString::from(DEFAULT_SUPERVISOR_BINARY))
}
