//! Dumping and restoring the supervisor's managed-process set.

use tracing::{debug, info};
use warden_protocol::CommandOptions;

use super::{Daemon, DaemonError};
use crate::supervisor::{Connector, SupervisorHandle};

impl<C: Connector> Daemon<C> {
    /// Asks the supervisor to persist its process list.
    ///
    /// A supervisor failure is returned as is and the connection is not
    /// explicitly closed; it is released when the handle drops.
    pub fn dump(&mut self, options: &CommandOptions) -> Result<(), DaemonError> {
        debug!(?options, "dumping processes");
        let mut supervisor = self.connector.connect()?;
        supervisor.dump_processes()?;
        supervisor.disconnect()?;
        info!("supervisor dumped its processes");
        Ok(())
    }

    /// Asks the supervisor to reload its persisted process list.
    ///
    /// Failure handling matches [`Self::dump`].
    pub fn restore(&mut self, options: &CommandOptions) -> Result<(), DaemonError> {
        debug!(?options, "restoring processes");
        let mut supervisor = self.connector.connect()?;
        supervisor.restore_processes()?;
        supervisor.disconnect()?;
        info!("supervisor restored its processes");
        Ok(())
    }
}
