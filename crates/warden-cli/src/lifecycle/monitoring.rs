//! Supervisor health monitoring.
//!
//! `wardend` writes `wardend.health` into its runtime directory as it moves
//! through startup. The client polls that snapshot after launching it and
//! treats the supervisor as usable once a fresh snapshot reports `ready`.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Child;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use cap_std::fs::Dir;
use serde::Deserialize;
use warden_config::RuntimePaths;

use super::error::LifecycleError;
use super::open_runtime_dir;

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const HEALTH_FILENAME: &str = "wardend.health";

/// Operational state reported by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SupervisorStatus {
    Starting,
    Ready,
    Stopping,
}

/// Contents of `wardend.health`.
///
/// `timestamp` is whole seconds since the Unix epoch and distinguishes a
/// fresh snapshot from one left behind by an earlier run.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub(crate) struct HealthSnapshot {
    pub status: SupervisorStatus,
    pub pid: u32,
    pub timestamp: u64,
}

#[derive(Debug)]
pub(crate) enum HealthCheckOutcome {
    Ready(HealthSnapshot),
    Aborted { path: PathBuf },
    Continue,
}

/// What the poller knows about the process it launched.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProcessMonitorContext {
    pub started_at: SystemTime,
    pub expected_pid: u32,
    /// The spawned process exited cleanly, so the supervisor forked away
    /// and the snapshot pid will not match the child.
    pub daemonized: bool,
}

/// Polls until the supervisor reports ready, exits, aborts, or `timeout`
/// elapses.
pub(super) fn wait_for_ready(
    paths: &RuntimePaths,
    child: &mut Child,
    started_at: SystemTime,
    timeout: Duration,
) -> Result<HealthSnapshot, LifecycleError> {
    let dir = open_runtime_dir(paths)?;
    let deadline = Instant::now() + timeout;
    let expected_pid = child.id();
    let mut daemonized = false;
    while Instant::now() < deadline {
        // Child status first, so a forked supervisor is recognised before its
        // snapshot pid is compared.
        if let Some(status) = child
            .try_wait()
            .map_err(|source| LifecycleError::MonitorChild { source })?
        {
            if !status.success() {
                return Err(LifecycleError::StartupFailed {
                    exit_status: status.code(),
                });
            }
            daemonized = true;
        }
        let monitor = ProcessMonitorContext {
            started_at,
            expected_pid,
            daemonized,
        };
        match check_health_snapshot(&dir, paths, monitor)? {
            HealthCheckOutcome::Ready(snapshot) => return Ok(snapshot),
            HealthCheckOutcome::Aborted { path } => {
                return Err(LifecycleError::StartupAborted { path });
            }
            HealthCheckOutcome::Continue => {}
        }
        thread::sleep(POLL_INTERVAL);
    }
    Err(LifecycleError::StartupTimeout {
        health_path: paths.health_path().to_path_buf(),
        timeout_ms: timeout.as_millis(),
    })
}

/// Reads and parses the health snapshot; `Ok(None)` while it does not exist.
pub(super) fn read_health(
    dir: &Dir,
    filename: &str,
    full_path: &Path,
) -> Result<Option<HealthSnapshot>, LifecycleError> {
    let content = match dir.read_to_string(filename) {
        Ok(content) => content,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LifecycleError::ReadHealth {
                path: full_path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| LifecycleError::ParseHealth {
            path: full_path.to_path_buf(),
            source,
        })
}

pub(crate) fn check_health_snapshot(
    dir: &Dir,
    paths: &RuntimePaths,
    monitor: ProcessMonitorContext,
) -> Result<HealthCheckOutcome, LifecycleError> {
    let health_filename = paths
        .health_path()
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(HEALTH_FILENAME);
    let Some(snapshot) = read_health(dir, health_filename, paths.health_path())? else {
        return Ok(HealthCheckOutcome::Continue);
    };
    let pid_ok = monitor.daemonized || snapshot.pid == monitor.expected_pid;
    if !pid_ok || !snapshot_is_recent(&snapshot, monitor.started_at)? {
        return Ok(HealthCheckOutcome::Continue);
    }
    Ok(match snapshot.status {
        SupervisorStatus::Ready => HealthCheckOutcome::Ready(snapshot),
        SupervisorStatus::Stopping => HealthCheckOutcome::Aborted {
            path: paths.health_path().to_path_buf(),
        },
        SupervisorStatus::Starting => HealthCheckOutcome::Continue,
    })
}

pub(crate) fn snapshot_is_recent(
    snapshot: &HealthSnapshot,
    started_at: SystemTime,
) -> Result<bool, LifecycleError> {
    // Snapshot timestamps carry whole seconds only.
    let started_secs = started_at
        .duration_since(UNIX_EPOCH)
        .map_err(|_| LifecycleError::InvalidSystemClock { time: started_at })?
        .as_secs();
    Ok(snapshot.timestamp >= started_secs)
}
