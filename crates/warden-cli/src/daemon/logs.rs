//! Relaying the supervisor's log stream.

use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};
use warden_protocol::{CommandOptions, LogChannel, LogEvent};

use super::{Daemon, DaemonError};
use crate::sink::DisplaySink;
use crate::supervisor::{Connector, SupervisorHandle};

impl<C: Connector> Daemon<C> {
    /// Streams log entries to `sink` until the supervisor closes the
    /// connection.
    ///
    /// With `pid` set, only entries from that process are relayed. The
    /// connection is left to the supervisor to close.
    pub fn logs<S>(
        &mut self,
        pid: Option<u32>,
        options: &CommandOptions,
        sink: &mut S,
    ) -> Result<(), DaemonError>
    where
        S: DisplaySink + ?Sized,
    {
        debug!(?pid, ?options, "relaying supervisor logs");
        let mut supervisor = self.connector.connect()?;

        if let Some(pid) = pid {
            match supervisor.find_process_info_by_pid(pid)? {
                Some(process) => info!(pid, name = ?process.name, "relaying logs for process"),
                None => info!(pid, "supervisor does not know this pid yet; relaying anyway"),
            }
        }

        for channel in LogChannel::ALL {
            supervisor.on(channel)?;
        }

        while let Some(event) = supervisor.next_event()? {
            if pid.is_some_and(|wanted| event.process.pid != Some(wanted)) {
                continue;
            }
            write_event(&event, sink)?;
        }
        debug!("supervisor closed the log stream");
        Ok(())
    }
}

fn write_event<S>(event: &LogEvent, sink: &mut S) -> Result<(), DaemonError>
where
    S: DisplaySink + ?Sized,
{
    let date = event
        .entry
        .date
        .format(&Rfc3339)
        .map_err(DaemonError::FormatDate)?;
    let pid = event
        .process
        .pid
        .map_or_else(|| String::from("-"), |pid| pid.to_string());
    sink.write_line(format_args!(
        "{date} [{level}] {pid} {message}",
        level = event.entry.level,
        message = event.entry.message,
    ))
    .map_err(DaemonError::Display)
}
