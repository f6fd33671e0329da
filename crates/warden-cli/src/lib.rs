//! Control client for the `wardend` process supervisor.
//!
//! The crate owns argument parsing, configuration bootstrapping, the JSONL
//! supervisor client, and the operator commands built on it. [`run`] is the
//! binary's entry point; tests substitute the configuration loader, the
//! supervisor binary, and the IO streams.

use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use warden_config::Config;

mod cli;
mod config;
mod daemon;
mod errors;
mod lifecycle;
mod options;
mod resolver;
mod sink;
mod supervisor;
mod telemetry;
mod transport;


use cli::{Cli, Command, write_bare_help};
use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use lifecycle::LifecycleContext;
use options::CommandArguments;
use supervisor::SocketConnector;

pub use daemon::{Daemon, DaemonError, KillOutcome, KillRequest};
pub use lifecycle::LifecycleError;
pub use resolver::{render, resolve};
pub use sink::DisplaySink;
pub use supervisor::{CommandError, ConnectionError, Connector, SupervisorHandle};

/// CLI flags recognised by the configuration loader.
///
/// Must list every flag `warden_config::Config` derives.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--supervisor-socket",
    "--supervisor-binary",
    "--log-filter",
    "--log-format",
];

/// The writers the CLI reports through.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
    supervisor_binary: Option<&'a OsStr>,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self {
            io,
            loader,
            supervisor_binary: None,
        }
    }

    #[cfg(test)]
    const fn with_supervisor_binary(mut self, supervisor_binary: Option<&'a OsStr>) -> Self {
        self.supervisor_binary = supervisor_binary;
        self
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli_arguments = prepare_cli_arguments(&args, &split);

        let result = Cli::try_parse_from(cli_arguments)
            .map_err(AppError::CliUsage)
            .and_then(|cli| {
                let Some(command) = cli.command else {
                    // Best effort: the failure exit code still signals misuse.
                    let _ = write_bare_help(&mut *self.io.stderr);
                    return Err(AppError::BareInvocation);
                };
                let config = self.loader.load(&split.config_arguments)?;
                telemetry::initialise(&config)?;
                self.execute(command, &config, &split.config_arguments)
            });

        match result {
            Ok(exit_code) => exit_code,
            Err(AppError::BareInvocation) => ExitCode::FAILURE,
            Err(AppError::CliUsage(error))
                if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
            {
                let _ = write!(self.io.stdout, "{error}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                let _ = writeln!(self.io.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }

    fn execute(
        &mut self,
        command: Command,
        config: &Config,
        config_arguments: &[OsString],
    ) -> Result<ExitCode, AppError> {
        let tree = config.tree().map_err(AppError::RenderConfiguration)?;
        let context = LifecycleContext {
            config,
            config_arguments,
            supervisor_binary: self
                .supervisor_binary
                .or_else(|| config.supervisor_binary().map(OsStr::new)),
        };
        let connector = SocketConnector::new(context, &mut *self.io.stderr);
        let mut daemon = Daemon::new(connector, tree);
        let stdout = &mut *self.io.stdout;

        match command {
            Command::Config { path } => daemon.config(&path, stdout)?,
            Command::Status => {
                daemon.status(stdout)?;
            }
            Command::Kill { arguments } => {
                let CommandArguments {
                    positionals,
                    options,
                } = CommandArguments::parse(&arguments);
                let request = match positionals.into_iter().next() {
                    Some(argument) => KillRequest::WithPositionalArg(argument, options),
                    None => KillRequest::Plain(options),
                };
                daemon.kill(request)?;
            }
            Command::Logs { arguments } => {
                let CommandArguments {
                    positionals,
                    options,
                } = CommandArguments::parse(&arguments);
                let pid = positionals.first().map(|raw| parse_pid(raw)).transpose()?;
                daemon.logs(pid, &options, stdout)?;
            }
            Command::Dump { arguments } => {
                daemon.dump(&CommandArguments::parse(&arguments).options)?;
            }
            Command::Restore { arguments } => {
                daemon.restore(&CommandArguments::parse(&arguments).options)?;
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<'a, I, W, E, L>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}

/// Runs the CLI with a custom loader and supervisor binary.
#[cfg(test)]
pub(crate) fn run_with_supervisor_binary<'a, I, W, E, L>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
    supervisor_binary: Option<&'a OsStr>,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader)
        .with_supervisor_binary(supervisor_binary)
        .run(args)
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.iter().skip(split.command_start))
        .cloned()
        .collect()
}

fn parse_pid(raw: &str) -> Result<u32, AppError> {
    raw.parse().map_err(|_| AppError::InvalidPid {
        value: raw.to_owned(),
    })
}
