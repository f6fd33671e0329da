//! Unit tests that drive the CLI and the daemon commands in process.

mod bare_invocation;
