//! Running `warden` without a command prints short help to stderr and fails
//! before configuration is loaded.

use std::ffi::OsString;
use std::process::ExitCode;

use warden_config::Config;

use crate::{AppError, ConfigLoader, IoStreams, run_with_loader};

/// Fails the test if configuration loading is attempted.
struct PanickingLoader;

impl ConfigLoader for PanickingLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        panic!("bare invocation must not attempt configuration loading");
    }
}

fn run_bare() -> (ExitCode, Vec<u8>, Vec<u8>) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut io = IoStreams::new(&mut stdout, &mut stderr);
    let exit = run_with_loader(vec![OsString::from("warden")], &mut io, &PanickingLoader);
    (exit, stdout, stderr)
}

#[test]
fn bare_invocation_exits_with_failure() {
    let (exit, _, _) = run_bare();
    assert_eq!(exit, ExitCode::FAILURE);
}

#[test]
fn bare_invocation_emits_help_to_stderr() {
    let (_, _, stderr) = run_bare();
    let stderr_text = String::from_utf8(stderr).expect("stderr utf8");
    assert!(stderr_text.starts_with("Usage: warden"));
    for command in ["config", "status", "kill", "logs", "dump", "restore"] {
        assert!(
            stderr_text.contains(command),
            "help should list {command}: {stderr_text:?}"
        );
    }
    assert_eq!(stderr_text.matches("warden --help").count(), 1);
}

#[test]
fn bare_invocation_produces_no_stdout() {
    let (_, stdout, _) = run_bare();
    assert!(stdout.is_empty(), "bare invocation must not write to stdout");
}
