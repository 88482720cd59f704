//! Runs one parsed command against a lease adapter.

use std::collections::BTreeMap;
use std::path::PathBuf;

use lease_exec::{
    ActionKind, Environment, LeaseAdapter, LeaseReturn, Properties, ReservationId, ScriptExecutor,
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::AppError;
use crate::cli::CliCommand;

/// What a command prints on stdout.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum CommandOutput {
    Lease(LeaseReturn),
    Table(TableReport),
}

/// Validated command table together with the environment the configuration
/// properties convert to.
#[derive(Debug, Serialize)]
pub(crate) struct TableReport {
    commands: BTreeMap<&'static str, Vec<String>>,
    working_dir: Option<PathBuf>,
    environment: BTreeMap<String, String>,
}

impl TableReport {
    fn new<E>(adapter: &LeaseAdapter<E>, config: &Properties) -> Self {
        let settings = adapter.settings();
        let commands = ActionKind::ALL
            .into_iter()
            .map(|action| (action.as_str(), settings.commands().get(action).argv().to_vec()))
            .collect();
        let environment = Environment::from_properties(config)
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self {
            commands,
            working_dir: settings.working_dir().map(PathBuf::from),
            environment,
        }
    }
}

pub(crate) fn execute<E: ScriptExecutor>(
    adapter: &LeaseAdapter<E>,
    config: &Properties,
    command: CliCommand,
) -> Result<CommandOutput, AppError> {
    let returned = match command {
        CliCommand::Join { until, caller } => {
            adapter.join(until.unwrap_or_else(OffsetDateTime::now_utc), &caller.properties())?
        }
        CliCommand::Leave {
            reservation_id,
            caller,
            scheduler,
        } => adapter.leave(
            &ReservationId::new(reservation_id),
            &caller.properties(),
            &scheduler.properties(),
        )?,
        CliCommand::Modify {
            reservation_id,
            caller,
            scheduler,
        } => adapter.modify(
            &ReservationId::new(reservation_id),
            &caller.properties(),
            &scheduler.properties(),
        )?,
        CliCommand::Renew {
            reservation_id,
            until,
            caller,
            scheduler,
        } => adapter.renew(
            &ReservationId::new(reservation_id),
            until.unwrap_or_else(OffsetDateTime::now_utc),
            &caller.properties(),
            &scheduler.properties(),
        )?,
        CliCommand::Status {
            reservation_id,
            scheduler,
        } => adapter.status(&ReservationId::new(reservation_id), &scheduler.properties())?,
        CliCommand::Check => return Ok(CommandOutput::Table(TableReport::new(adapter, config))),
    };
    Ok(CommandOutput::Lease(returned))
}
