//! Test support for the warden CLI.
//!
//! Supplies a fake supervisor, a recording connector, runtime-directory
//! fixtures, and the behavioural test world so tests stay focused on their
//! assertions.

mod fake_supervisor;
mod recording;

use std::cell::RefCell;
use std::ffi::OsString;
use std::net::TcpListener;
use std::process::ExitCode;

use anyhow::{Context, Result, ensure};
use rstest::fixture;
use time::macros::datetime;
use warden_config::{Config, SocketEndpoint};
use warden_protocol::{LogChannel, LogEntry, LogEvent, LogLevel, ProcessInfo, Request};

use crate::{AppError, ConfigLoader, IoStreams, run_with_supervisor_binary};

pub(super) use fake_supervisor::{FakeSupervisor, Script};
pub(crate) use lifecycle::{temp_paths, write_health_json, write_health_snapshot};
pub(super) use recording::{Call, RecordingConnector};

/// A config loader that returns a fixed configuration.
pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// CLI state, fake supervisor, and captured output for one scenario.
#[derive(Default)]
pub(super) struct TestWorld {
    pub config: Config,
    pub script: Script,
    pub supervisor: Option<FakeSupervisor>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<ExitCode>,
    pub requests: Vec<Request>,
    /// Replaces the configured supervisor binary when auto-start runs.
    pub supervisor_binary: Option<OsString>,
}

impl TestWorld {
    pub fn start_supervisor(&mut self) -> Result<()> {
        let supervisor = FakeSupervisor::spawn(self.script.clone())?;
        self.config.supervisor_socket = SocketEndpoint::tcp("127.0.0.1", supervisor.port());
        self.supervisor = Some(supervisor);
        Ok(())
    }

    /// Points the client at a port nothing listens on and at a supervisor
    /// binary that cannot be spawned.
    pub fn configure_auto_start_failure(&mut self) -> Result<()> {
        self.config.supervisor_socket = SocketEndpoint::tcp("127.0.0.1", unused_local_port()?);
        self.supervisor_binary = Some(OsString::from("/nonexistent/wardend"));
        Ok(())
    }

    pub fn run(&mut self, command: &str) -> Result<()> {
        self.stdout.clear();
        self.stderr.clear();
        self.requests.clear();
        let args = build_args(command);
        let loader = StaticConfigLoader::new(self.config.clone());
        let supervisor_binary = self.supervisor_binary.as_deref();
        let mut io = IoStreams::new(&mut self.stdout, &mut self.stderr);
        let exit = run_with_supervisor_binary(args, &mut io, &loader, supervisor_binary);
        self.exit_code = Some(exit);
        if let Some(supervisor) = self.supervisor.as_mut() {
            self.requests = supervisor.take_requests()?;
        }
        self.supervisor = None;
        Ok(())
    }

    pub fn stdout_text(&self) -> Result<String> {
        decode_utf8(self.stdout.clone(), "stdout")
    }

    pub fn stderr_text(&self) -> Result<String> {
        decode_utf8(self.stderr.clone(), "stderr")
    }

    pub fn assert_success(&self) -> Result<()> {
        let exit = self.exit_code.context("exit code recorded")?;
        ensure!(
            exit == ExitCode::SUCCESS,
            "expected success, got {exit:?}; stderr: {:?}",
            self.stderr_text()?
        );
        Ok(())
    }

    pub fn assert_failure(&self) -> Result<()> {
        let exit = self.exit_code.context("exit code recorded")?;
        ensure!(
            exit == ExitCode::FAILURE,
            "expected failure exit code, got {exit:?}"
        );
        Ok(())
    }

    /// Wire names of the recorded requests, in order.
    pub fn request_names(&self) -> Result<Vec<String>> {
        self.requests.iter().map(request_name).collect()
    }
}

fn build_args(command: &str) -> Vec<OsString> {
    let mut args = vec![OsString::from("warden")];
    args.extend(
        command
            .trim()
            .trim_matches('"')
            .split_whitespace()
            .map(OsString::from),
    );
    args
}

fn request_name(request: &Request) -> Result<String> {
    let encoded = serde_json::to_value(request).context("encode request")?;
    encoded
        .get("command")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .context("request carries no command tag")
}

/// A loopback port that was free a moment ago.
///
/// Binds an ephemeral port and releases it, so connecting is refused.
pub(super) fn unused_local_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").context("bind ephemeral port")?;
    let port = listener.local_addr().context("read bound address")?.port();
    drop(listener);
    Ok(port)
}

pub(super) fn decode_utf8(buffer: Vec<u8>, label: &str) -> Result<String> {
    String::from_utf8(buffer).with_context(|| format!("{label} utf8"))
}

/// A log event from `pid` published on `channel` at a fixed instant.
pub(super) fn log_event(
    channel: LogChannel,
    pid: Option<u32>,
    level: LogLevel,
    message: &str,
) -> LogEvent {
    LogEvent {
        channel,
        process: ProcessInfo {
            pid,
            name: Some(String::from("web")),
        },
        entry: LogEntry {
            message: message.to_owned(),
            date: datetime!(2024-05-01 10:00:00 UTC),
            level,
        },
    }
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}
