//! In-memory [`Connector`] that records every supervisor call.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use warden_protocol::{CommandOptions, LogChannel, LogEvent, ProcessInfo};

use crate::supervisor::{CommandError, ConnectionError, Connector, SupervisorHandle};

/// A call observed by [`RecordingConnector`] or one of its handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(in crate::tests) enum Call {
    ConnectExisting,
    Connect,
    On(LogChannel),
    NextEvent,
    IsRunning,
    Kill(CommandOptions),
    DumpProcesses,
    RestoreProcesses,
    FindProcessInfoByPid(u32),
    Disconnect,
}

/// Connector whose handles answer from fixed data and log their calls.
#[derive(Debug, Default)]
pub(in crate::tests) struct RecordingConnector {
    /// Nothing listens, so only a launching connect succeeds.
    pub absent: bool,
    pub running: bool,
    /// Error message returned by `kill`, `dump_processes`, and
    /// `restore_processes`.
    pub failure: Option<String>,
    pub process: Option<ProcessInfo>,
    pub events: Vec<LogEvent>,
    calls: Rc<RefCell<Vec<Call>>>,
}

impl RecordingConnector {
    pub fn running(running: bool) -> Self {
        Self {
            running,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            running: true,
            failure: Some(message.to_owned()),
            ..Self::default()
        }
    }

    pub fn with_events(events: Vec<LogEvent>) -> Self {
        Self {
            running: true,
            events,
            ..Self::default()
        }
    }

    pub fn absent() -> Self {
        Self {
            absent: true,
            ..Self::default()
        }
    }

    /// Shared view of the call log; stays valid after the connector moves.
    pub fn calls(&self) -> Rc<RefCell<Vec<Call>>> {
        Rc::clone(&self.calls)
    }

    fn handle(&self) -> RecordingHandle {
        RecordingHandle {
            running: self.running,
            failure: self.failure.clone(),
            process: self.process.clone(),
            events: self.events.iter().cloned().collect(),
            subscribed: Vec::new(),
            calls: Rc::clone(&self.calls),
        }
    }
}

impl Connector for RecordingConnector {
    type Handle = RecordingHandle;

    fn connect(&mut self) -> Result<Self::Handle, ConnectionError> {
        self.calls.borrow_mut().push(Call::Connect);
        Ok(self.handle())
    }

    fn connect_existing(&mut self) -> Result<Option<Self::Handle>, ConnectionError> {
        self.calls.borrow_mut().push(Call::ConnectExisting);
        Ok((!self.absent).then(|| self.handle()))
    }
}

pub(in crate::tests) struct RecordingHandle {
    running: bool,
    failure: Option<String>,
    process: Option<ProcessInfo>,
    events: VecDeque<LogEvent>,
    subscribed: Vec<LogChannel>,
    calls: Rc<RefCell<Vec<Call>>>,
}

impl RecordingHandle {
    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn outcome(&self) -> Result<(), CommandError> {
        match &self.failure {
            Some(message) => Err(CommandError::Supervisor {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl SupervisorHandle for RecordingHandle {
    fn on(&mut self, channel: LogChannel) -> Result<(), CommandError> {
        self.record(Call::On(channel));
        self.subscribed.push(channel);
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<LogEvent>, CommandError> {
        self.record(Call::NextEvent);
        // Only channels subscribed through `on` deliver events.
        while let Some(event) = self.events.pop_front() {
            if self.subscribed.contains(&event.channel) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    fn is_running(&mut self) -> Result<bool, CommandError> {
        self.record(Call::IsRunning);
        Ok(self.running)
    }

    fn kill(&mut self, options: &CommandOptions) -> Result<(), CommandError> {
        self.record(Call::Kill(options.clone()));
        self.outcome()
    }

    fn dump_processes(&mut self) -> Result<(), CommandError> {
        self.record(Call::DumpProcesses);
        self.outcome()
    }

    fn restore_processes(&mut self) -> Result<(), CommandError> {
        self.record(Call::RestoreProcesses);
        self.outcome()
    }

    fn find_process_info_by_pid(&mut self, pid: u32) -> Result<Option<ProcessInfo>, CommandError> {
        self.record(Call::FindProcessInfoByPid(pid));
        Ok(self.process.clone())
    }

    fn disconnect(self) -> Result<(), CommandError> {
        self.record(Call::Disconnect);
        Ok(())
    }
}
