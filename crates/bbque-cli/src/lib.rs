//! Runtime for the `bbque-alloc` command-line tool.
//!
//! The tool drives one complete allocation cycle: it loads the resource
//! manager endpoint from the environment, checks that the allocator is
//! selectable, requests nodes for the job described on the command line and
//! prints the granted allocation as JSON. Configuration loading and the IO
//! streams can be substituted so tests exercise the same path as the binary.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use bbque_config::Config;
use bbque_ras::{AllocationClient, AllocationStatus, InMemoryJobSubsystem, component, telemetry};
use clap::Parser;

mod cli;
mod errors;

use cli::Cli;
use errors::AppError;

/// Source of the configuration used by a run.
pub(crate) trait ConfigLoader {
    fn load(&self) -> Result<Config, AppError>;
}

/// Loads configuration from files and `BBQUE_*` environment variables.
pub(crate) struct EnvironmentConfigLoader;

impl ConfigLoader for EnvironmentConfigLoader {
    fn load(&self) -> Result<Config, AppError> {
        Config::load_from_environment().map_err(AppError::LoadConfiguration)
    }
}

/// Runs the tool with the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &EnvironmentConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => return report(stderr, &AppError::CliUsage(error)),
    };

    match loader
        .load()
        .and_then(|config| allocate(&cli, &config, stdout, stderr))
    {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(stderr, &error),
    }
}

fn allocate<W, E>(cli: &Cli, config: &Config, stdout: &mut W, stderr: &mut E) -> Result<(), AppError>
where
    W: Write,
    E: Write,
{
    telemetry::initialise(config)?;
    if !component::query(config).is_available() {
        return Err(AppError::NotConfigured);
    }

    let mut client = AllocationClient::connect(config, InMemoryJobSubsystem::new())?;
    let AllocationStatus::Pending = client.request_allocation(cli.job())?;
    let allocation = client.run_until_allocated()?;

    serde_json::to_writer(&mut *stdout, &allocation).map_err(AppError::SerialiseAllocation)?;
    writeln!(stdout).map_err(AppError::EmitAllocation)?;
    if let Some(error) = client.finalize() {
        let _ = writeln!(stderr, "warning: {error}");
    }
    Ok(())
}

fn report<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    let _ = writeln!(stderr, "{error}");
    error.exit_code()
}
