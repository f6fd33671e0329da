//! Entry point for the `warden` supervisor control client.
//!
//! Delegates to [`warden_cli::run`], which loads configuration, parses the
//! command, and talks to `wardend` over its control socket.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    warden_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
