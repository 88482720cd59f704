//! Entry point for the `lease-exec` binary.
//!
//! Delegates to [`lease_exec_cli::run`], which loads configuration, installs
//! telemetry, runs one lifecycle action and prints the result as JSON.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    lease_exec_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
