//! JSONL client for an established supervisor connection.

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Write};

use tracing::trace;
use warden_protocol::{CommandOptions, LogChannel, LogEvent, Message, ProcessInfo, Request};

use super::{CommandError, SupervisorHandle};
use crate::transport::Connection;

/// Consecutive blank lines tolerated before a read is abandoned.
pub(crate) const EMPTY_LINE_LIMIT: usize = 10;

/// Supervisor handle speaking JSONL over any buffered reader and writer.
#[derive(Debug)]
pub(crate) struct SupervisorClient<R, W> {
    reader: R,
    writer: W,
    pending: VecDeque<LogEvent>,
}

/// Supervisor handle over a socket connection.
pub(crate) type SocketSupervisor = SupervisorClient<BufReader<Connection>, Connection>;

impl SupervisorClient<BufReader<Connection>, Connection> {
    pub(crate) fn open(connection: Connection) -> io::Result<Self> {
        let writer = connection.try_clone()?;
        Ok(Self::new(BufReader::new(connection), writer))
    }
}

impl<R, W> SupervisorClient<R, W>
where
    R: BufRead,
    W: Write,
{
    pub(crate) fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            pending: VecDeque::new(),
        }
    }

    fn send(&mut self, request: &Request) -> Result<(), CommandError> {
        trace!(?request, "sending supervisor request");
        serde_json::to_writer(&mut self.writer, request).map_err(CommandError::Serialise)?;
        self.writer.write_all(b"\n").map_err(CommandError::Send)?;
        self.writer.flush().map_err(CommandError::Send)
    }

    /// Reads the next non-blank message; `Ok(None)` at end of stream.
    fn read_message(&mut self) -> Result<Option<Message>, CommandError> {
        let mut line = String::new();
        let mut consecutive_empty_lines = 0;
        loop {
            line.clear();
            if self
                .reader
                .read_line(&mut line)
                .map_err(CommandError::Receive)?
                == 0
            {
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                consecutive_empty_lines += 1;
                if consecutive_empty_lines >= EMPTY_LINE_LIMIT {
                    return Err(CommandError::EmptyLines {
                        limit: EMPTY_LINE_LIMIT,
                    });
                }
                continue;
            }
            return serde_json::from_str(trimmed)
                .map(Some)
                .map_err(CommandError::Parse);
        }
    }

    /// Sends `request` and, when the supervisor answers it, waits for the
    /// single reply. Events that arrive first are queued.
    fn exchange(&mut self, request: &Request) -> Result<Option<Message>, CommandError> {
        self.send(request)?;
        if !request.expects_reply() {
            return Ok(None);
        }
        loop {
            match self.read_message()? {
                None => return Err(CommandError::Closed),
                Some(Message::Event(event)) => self.pending.push_back(event),
                Some(Message::Error { message }) => {
                    return Err(CommandError::Supervisor { message });
                }
                Some(reply) => return Ok(Some(reply)),
            }
        }
    }

    fn exchange_expecting_ack(&mut self, request: &Request) -> Result<(), CommandError> {
        match self.exchange(request)? {
            Some(Message::Ack) => Ok(()),
            other => Err(unexpected("ack", other.as_ref())),
        }
    }
}

fn unexpected(expected: &'static str, received: Option<&Message>) -> CommandError {
    CommandError::UnexpectedReply {
        expected,
        received: received.map_or("nothing", Message::kind),
    }
}

impl<R, W> SupervisorHandle for SupervisorClient<R, W>
where
    R: BufRead,
    W: Write,
{
    fn on(&mut self, channel: LogChannel) -> Result<(), CommandError> {
        self.exchange_expecting_ack(&Request::Subscribe { channel })
    }

    fn next_event(&mut self) -> Result<Option<LogEvent>, CommandError> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }
        match self.read_message()? {
            None => Ok(None),
            Some(Message::Event(event)) => Ok(Some(event)),
            Some(Message::Error { message }) => Err(CommandError::Supervisor { message }),
            Some(other) => Err(unexpected("event", Some(&other))),
        }
    }

    fn is_running(&mut self) -> Result<bool, CommandError> {
        match self.exchange(&Request::Ping)? {
            Some(Message::Pong { running }) => Ok(running),
            other => Err(unexpected("pong", other.as_ref())),
        }
    }

    fn kill(&mut self, options: &CommandOptions) -> Result<(), CommandError> {
        self.exchange_expecting_ack(&Request::Kill {
            options: options.clone(),
        })
    }

    fn dump_processes(&mut self) -> Result<(), CommandError> {
        self.exchange_expecting_ack(&Request::DumpProcesses)
    }

    fn restore_processes(&mut self) -> Result<(), CommandError> {
        self.exchange_expecting_ack(&Request::RestoreProcesses)
    }

    fn find_process_info_by_pid(&mut self, pid: u32) -> Result<Option<ProcessInfo>, CommandError> {
        match self.exchange(&Request::FindProcessInfoByPid { pid })? {
            Some(Message::ProcessInfo { process }) => Ok(process),
            other => Err(unexpected("process_info", other.as_ref())),
        }
    }

    fn disconnect(mut self) -> Result<(), CommandError> {
        self.exchange(&Request::Disconnect).map(|_| ())
    }
}
