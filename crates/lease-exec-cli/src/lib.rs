//! Command-line driver for the `lease-exec` adapter.
//!
//! The runtime splits leading configuration flags from the command, loads
//! layered configuration, installs telemetry, builds a [`LeaseAdapter`] from
//! the `exec.*` properties and runs one lifecycle action. The result is
//! printed as pretty JSON on stdout; failures are reported on stderr with a
//! non-zero exit status.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use lease_exec::{LeaseAdapter, Properties, ScriptExecutor};
use lease_exec_config::Config;

mod cli;
mod command;
mod config;
mod errors;
mod telemetry;


use cli::Cli;
use command::CommandOutput;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use config::{command_arguments, split_config_arguments};
pub(crate) use errors::AppError;

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
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
    let args: Vec<OsString> = args.into_iter().collect();
    let result = parse_and_load(&args, loader).and_then(|(cli, config)| {
        telemetry::initialise(&config)?;
        let properties = adapter_properties(&config, &cli);
        let adapter = LeaseAdapter::initialize(&properties)?;
        run_command(&adapter, &properties, cli, stdout)
    });
    report(result, stdout, stderr)
}

fn parse_and_load<L: ConfigLoader>(
    args: &[OsString],
    loader: &L,
) -> Result<(Cli, Config), AppError> {
    let split = split_config_arguments(args);
    let cli = Cli::try_parse_from(command_arguments(args, &split)).map_err(AppError::CliUsage)?;
    let config = loader.load(&split.config_arguments)?;
    Ok((cli, config))
}

/// Loaded `exec.*` properties with any `--set` overrides applied on top.
fn adapter_properties(config: &Config, cli: &Cli) -> Properties {
    let mut properties: Properties = config.exec_properties().into_iter().collect();
    properties.extend(cli.overrides.iter().cloned());
    properties
}

fn run_command<E, W>(
    adapter: &LeaseAdapter<E>,
    properties: &Properties,
    cli: Cli,
    stdout: &mut W,
) -> Result<(), AppError>
where
    E: ScriptExecutor,
    W: Write,
{
    let output = command::execute(adapter, properties, cli.command)?;
    write_output(&output, stdout)
}

fn write_output<W: Write>(output: &CommandOutput, stdout: &mut W) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *stdout, output).map_err(AppError::SerialiseOutput)?;
    writeln!(stdout).map_err(AppError::WriteOutput)?;
    stdout.flush().map_err(AppError::WriteOutput)
}

fn report<W: Write, E: Write>(
    result: Result<(), AppError>,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        // `--help` and `--version` arrive as clap errors that belong on stdout.
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            write!(stdout, "{}", error.render()).ok();
            ExitCode::SUCCESS
        }
        Err(error) => {
            writeln!(stderr, "{error}").ok();
            ExitCode::FAILURE
        }
    }
}
