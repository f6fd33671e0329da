//! Connections to the `wardend` supervisor.
//!
//! [`SupervisorHandle`] is the command surface of one established
//! connection and [`Connector`] produces handles. The socket implementations
//! speak the JSONL protocol from `warden-protocol`; tests substitute their
//! own.

mod client;
mod connector;
mod error;

use warden_protocol::{CommandOptions, LogChannel, LogEvent, ProcessInfo};

pub use error::{CommandError, ConnectionError};

pub(crate) use connector::SocketConnector;

/// An established connection to the supervisor.
///
/// Every call blocks until the supervisor answers it. Log events that arrive
/// while a call is waiting are kept and returned by [`Self::next_event`] in
/// arrival order.
pub trait SupervisorHandle {
    /// Subscribes to a log channel.
    fn on(&mut self, channel: LogChannel) -> Result<(), CommandError>;

    /// Waits for the next log event; `Ok(None)` once the supervisor closes
    /// the stream.
    fn next_event(&mut self) -> Result<Option<LogEvent>, CommandError>;

    /// Asks the supervisor whether it is running.
    fn is_running(&mut self) -> Result<bool, CommandError>;

    /// Asks the supervisor to terminate.
    fn kill(&mut self, options: &CommandOptions) -> Result<(), CommandError>;

    /// Asks the supervisor to persist its managed-process set.
    fn dump_processes(&mut self) -> Result<(), CommandError>;

    /// Asks the supervisor to reload its persisted process set.
    fn restore_processes(&mut self) -> Result<(), CommandError>;

    /// Looks up a managed process by pid.
    fn find_process_info_by_pid(&mut self, pid: u32) -> Result<Option<ProcessInfo>, CommandError>;

    /// Closes the connection. Consumes the handle.
    fn disconnect(self) -> Result<(), CommandError>
    where
        Self: Sized;
}

/// Produces supervisor connections, one per command.
pub trait Connector {
    /// Handle type returned by [`Self::connect`].
    type Handle: SupervisorHandle;

    /// Connects to the supervisor, launching it first if nothing listens.
    fn connect(&mut self) -> Result<Self::Handle, ConnectionError>;

    /// Connects only if the supervisor already listens. Never launches it.
    fn connect_existing(&mut self) -> Result<Option<Self::Handle>, ConnectionError>;

    /// Reports whether the supervisor is running without launching it.
    fn running(&mut self) -> Result<bool, ConnectionError> {
        let Some(mut supervisor) = self.connect_existing()? else {
            return Ok(false);
        };
        let running = supervisor.is_running().map_err(ConnectionError::StatusQuery)?;
        supervisor.disconnect().map_err(ConnectionError::StatusQuery)?;
        Ok(running)
    }
}
