//! Entry point for `bbque-alloc`.
//!
//! Delegates to [`bbque_cli::run`], which loads configuration, connects to
//! the resource manager and prints the granted allocation.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    bbque_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
