//! Wire types exchanged between the `warden` client and the `wardend`
//! supervisor.
//!
//! The transport carries JSON Lines: every request and every message is one
//! JSON object terminated by `\n`. Requests are tagged by `command` and
//! messages by `kind`. Each request except [`Request::Disconnect`] is answered
//! by exactly one reply message; [`Message::Event`] lines may interleave with
//! replies once a log channel has been subscribed.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Requests written by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    /// Asks whether the supervisor considers itself running.
    Ping,
    /// Asks the supervisor to terminate.
    Kill {
        /// Flags forwarded from the command line.
        #[serde(default)]
        options: CommandOptions,
    },
    /// Asks the supervisor to persist its managed-process set.
    DumpProcesses,
    /// Asks the supervisor to reload its persisted process set.
    RestoreProcesses,
    /// Looks up a managed process by operating-system pid.
    FindProcessInfoByPid {
        /// Process identifier to look up.
        pid: u32,
    },
    /// Subscribes the connection to a log channel.
    Subscribe {
        /// Channel to subscribe to.
        channel: LogChannel,
    },
    /// Announces that the client is closing the connection. Never answered.
    Disconnect,
}

impl Request {
    /// Whether the supervisor answers this request with a reply message.
    #[must_use]
    pub const fn expects_reply(&self) -> bool {
        !matches!(self, Self::Disconnect)
    }
}

/// Messages written by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    /// The request succeeded and carries no payload.
    Ack,
    /// Answer to [`Request::Ping`].
    Pong {
        /// Whether the supervisor is running.
        running: bool,
    },
    /// Answer to [`Request::FindProcessInfoByPid`].
    ProcessInfo {
        /// The managed process, when the pid is known.
        #[serde(default)]
        process: Option<ProcessInfo>,
    },
    /// The request failed inside the supervisor.
    Error {
        /// Supervisor-provided description.
        message: String,
    },
    /// A log entry published on a subscribed channel.
    Event(LogEvent),
}

impl Message {
    /// Wire tag of the message.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Ack => "ack",
            Self::Pong { .. } => "pong",
            Self::ProcessInfo { .. } => "process_info",
            Self::Error { .. } => "error",
            Self::Event(_) => "event",
        }
    }
}

/// Log channels published by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogChannel {
    /// Informational entries.
    #[serde(rename = "process:log:info")]
    Info,
    /// Error entries.
    #[serde(rename = "process:log:error")]
    Error,
    /// Warnings.
    #[serde(rename = "process:log:warn")]
    Warn,
    /// Debug entries.
    #[serde(rename = "process:log:debug")]
    Debug,
    /// Every entry regardless of level.
    #[serde(rename = "process:log")]
    All,
}

impl LogChannel {
    /// Every channel, in subscription order.
    pub const ALL: [Self; 5] = [Self::Info, Self::Error, Self::Warn, Self::Debug, Self::All];

    /// Wire name of the channel.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "process:log:info",
            Self::Error => "process:log:error",
            Self::Warn => "process:log:warn",
            Self::Debug => "process:log:debug",
            Self::All => "process:log",
        }
    }
}

impl fmt::Display for LogChannel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Severity attached to a [`LogEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Informational.
    Info,
    /// Warning.
    Warn,
    /// Error.
    Error,
    /// Debug.
    Debug,
}

impl LogLevel {
    /// Lower-case level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Managed process descriptor. Both fields are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessInfo {
    /// Operating-system process identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// Name the supervisor manages the process under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One log line produced by a managed process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log text without a trailing newline.
    pub message: String,
    /// When the supervisor recorded the entry.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Entry severity.
    pub level: LogLevel,
}

/// A log entry together with its channel and originating process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Channel the entry was published on.
    pub channel: LogChannel,
    /// Process that produced the entry.
    #[serde(default)]
    pub process: ProcessInfo,
    /// The entry itself.
    pub entry: LogEntry,
}

/// Ordered command-line flags forwarded to the supervisor unmodified.
///
/// Keys are flag names without their leading dashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandOptions(BTreeMap<String, Value>);

impl CommandOptions {
    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a flag, replacing any earlier value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Value recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl<K, V> FromIterator<(K, V)> for CommandOptions
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
