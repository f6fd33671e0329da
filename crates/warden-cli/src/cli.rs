//! Command-line interface definitions for the `warden` binary.

use std::io::{self, Write};

use clap::{Parser, Subcommand};

/// Control client for the `wardend` process supervisor.
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    disable_help_subcommand = true,
    after_help = "Configuration flags (--config-path, --supervisor-socket, \
                  --supervisor-binary, --log-filter, --log-format) must precede the command."
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

/// Operator commands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Prints the configuration value at a dot-separated path.
    Config {
        /// Path such as `supervisor_socket.transport`.
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Reports whether the supervisor is running.
    Status,
    /// Kills the supervisor when it is running.
    Kill {
        /// Optional argument followed by `--flag` options for the supervisor.
        #[arg(
            value_name = "ARG",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        arguments: Vec<String>,
    },
    /// Relays supervisor logs, optionally for a single pid.
    Logs {
        /// Optional pid followed by `--flag` options for the supervisor.
        #[arg(
            value_name = "ARG",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        arguments: Vec<String>,
    },
    /// Asks the supervisor to persist its process list.
    Dump {
        /// `--flag` options for the supervisor.
        #[arg(
            value_name = "ARG",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        arguments: Vec<String>,
    },
    /// Asks the supervisor to reload its persisted process list.
    Restore {
        /// `--flag` options for the supervisor.
        #[arg(
            value_name = "ARG",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        arguments: Vec<String>,
    },
}

const BARE_HELP: &str = "\
Usage: warden [OPTIONS] <COMMAND>

Commands:
  config   Print a configuration value
  status   Report whether wardend is running
  kill     Kill wardend
  logs     Relay wardend logs
  dump     Persist the managed process list
  restore  Reload the managed process list

Run 'warden --help' for details.
";

/// Writes the short guidance shown when `warden` runs without a command.
pub(crate) fn write_bare_help<W: Write>(writer: &mut W) -> io::Result<()> {
    writer.write_all(BARE_HELP.as_bytes())?;
    writer.flush()
}
