//! Conditional supervisor termination.

use tracing::{info, warn};
use warden_protocol::CommandOptions;

use super::{Daemon, DaemonError};
use crate::supervisor::{Connector, SupervisorHandle};

/// Shapes of the `kill` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillRequest {
    /// Kill the supervisor itself.
    Plain(CommandOptions),
    /// A positional argument was given. Per-process kills are not supported,
    /// so this form does nothing.
    WithPositionalArg(String, CommandOptions),
}

/// What `kill` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    /// The supervisor acknowledged the kill.
    Killed,
    /// The supervisor was not running; nothing was sent.
    NotRunning,
    /// A positional argument was given; nothing was sent.
    Skipped,
}

impl<C: Connector> Daemon<C> {
    /// Kills the supervisor if it is running.
    ///
    /// The run-state query and the kill share one connection, and that
    /// connection is never allowed to launch a stopped supervisor.
    pub fn kill(&mut self, request: KillRequest) -> Result<KillOutcome, DaemonError> {
        let options = match request {
            KillRequest::WithPositionalArg(argument, _) => {
                info!(%argument, "kill with an argument is not supported; skipping");
                return Ok(KillOutcome::Skipped);
            }
            KillRequest::Plain(options) => options,
        };

        let Some(mut supervisor) = self.connector.connect_existing()? else {
            info!("supervisor is not listening; nothing to kill");
            return Ok(KillOutcome::NotRunning);
        };
        if !supervisor.is_running()? {
            supervisor.disconnect()?;
            info!("supervisor is not running; nothing to kill");
            return Ok(KillOutcome::NotRunning);
        }

        if let Err(error) = supervisor.kill(&options) {
            if let Err(disconnect_error) = supervisor.disconnect() {
                warn!(%disconnect_error, "failed to disconnect after kill failure");
            }
            return Err(error.into());
        }
        supervisor.disconnect()?;
        info!("supervisor killed");
        Ok(KillOutcome::Killed)
    }
}
