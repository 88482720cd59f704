//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};
use lease_exec::Properties;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Drives lease lifecycle scripts from the command line.
///
/// Configuration flags (`--config-path`, `--log-filter`, `--log-format` and
/// the `--exec-*` command templates) must come before any other argument.
#[derive(Parser, Debug)]
#[command(name = "lease-exec", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Overrides a configuration property, for example `exec.wd=/srv/lease`.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub(crate) overrides: Vec<(String, String)>,
    /// The lifecycle action to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Lifecycle actions and diagnostics.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Acquires a new lease.
    Join {
        /// Requested end of the lease (RFC 3339, defaults to now).
        #[arg(long, value_parser = parse_timestamp)]
        until: Option<OffsetDateTime>,
        #[command(flatten)]
        caller: CallerArgs,
    },
    /// Releases a lease.
    Leave {
        /// Reservation being released.
        reservation_id: String,
        #[command(flatten)]
        caller: CallerArgs,
        #[command(flatten)]
        scheduler: SchedulerArgs,
    },
    /// Changes the parameters of a lease.
    Modify {
        /// Reservation being modified.
        reservation_id: String,
        #[command(flatten)]
        caller: CallerArgs,
        #[command(flatten)]
        scheduler: SchedulerArgs,
    },
    /// Extends a lease.
    Renew {
        /// Reservation being renewed.
        reservation_id: String,
        /// Requested end of the lease (RFC 3339, defaults to now).
        #[arg(long, value_parser = parse_timestamp)]
        until: Option<OffsetDateTime>,
        #[command(flatten)]
        caller: CallerArgs,
        #[command(flatten)]
        scheduler: SchedulerArgs,
    },
    /// Queries the state of a lease.
    Status {
        /// Reservation being queried.
        reservation_id: String,
        #[command(flatten)]
        scheduler: SchedulerArgs,
    },
    /// Validates the configuration and prints the command table.
    Check,
}

/// Properties supplied by the party requesting the action.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct CallerArgs {
    /// Caller property (repeatable).
    #[arg(id = "caller", short = 'p', long = "caller", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub(crate) entries: Vec<(String, String)>,
}

/// Properties the scheduler already holds for the reservation.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct SchedulerArgs {
    /// Scheduler property (repeatable).
    #[arg(id = "scheduler", short = 's', long = "scheduler", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub(crate) entries: Vec<(String, String)>,
}

impl CallerArgs {
    pub(crate) fn properties(&self) -> Properties {
        self.entries.iter().cloned().collect()
    }
}

impl SchedulerArgs {
    pub(crate) fn properties(&self) -> Properties {
        self.entries.iter().cloned().collect()
    }
}

/// Splits `KEY=VALUE` at the first `=`; the value may itself contain `=`.
pub(crate) fn parse_property(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.trim().is_empty() {
        return Err(format!("empty property key in `{raw}`"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(raw, &Rfc3339)
}
