//! Socket connector with supervisor auto-start.

use std::io::Write;

use tracing::{debug, info};

use super::client::SocketSupervisor;
use super::{ConnectionError, Connector};
use crate::lifecycle::{LifecycleContext, start_supervisor};
use crate::transport::{self, Connection, is_supervisor_not_running};

/// Connects to the configured supervisor socket.
///
/// When nothing listens on the endpoint, [`Connector::connect`] launches the
/// supervisor, waits for it to report ready, and retries once. Launch notices
/// go to `stderr`.
pub(crate) struct SocketConnector<'a, E: Write> {
    context: LifecycleContext<'a>,
    stderr: E,
}

impl<'a, E: Write> SocketConnector<'a, E> {
    pub(crate) const fn new(context: LifecycleContext<'a>, stderr: E) -> Self {
        Self { context, stderr }
    }

    fn open(connection: Connection) -> Result<SocketSupervisor, ConnectionError> {
        SocketSupervisor::open(connection).map_err(ConnectionError::Stream)
    }
}

impl<E: Write> Connector for SocketConnector<'_, E> {
    type Handle = SocketSupervisor;

    fn connect(&mut self) -> Result<Self::Handle, ConnectionError> {
        let endpoint = self.context.config.supervisor_socket();
        let connection = match transport::connect(endpoint) {
            Ok(connection) => connection,
            Err(error) if is_supervisor_not_running(&error) => {
                info!(%endpoint, "supervisor not listening; launching it");
                start_supervisor(self.context, &mut self.stderr)?;
                transport::connect(endpoint)?
            }
            Err(error) => return Err(error),
        };
        debug!(%endpoint, "connected to supervisor");
        Self::open(connection)
    }

    fn connect_existing(&mut self) -> Result<Option<Self::Handle>, ConnectionError> {
        let endpoint = self.context.config.supervisor_socket();
        match transport::connect(endpoint) {
            Ok(connection) => Self::open(connection).map(Some),
            Err(error) if is_supervisor_not_running(&error) => {
                debug!(%endpoint, "supervisor not listening");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }
}
