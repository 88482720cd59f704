//! Lifecycle handlers that drive the configured scripts.
//!
//! [`LeaseAdapter`] is the entry point the host calls. Each handler merges
//! the property bags it was given, picks the acting reservation id, builds
//! the argument vector, runs the script through a [`ScriptExecutor`], parses
//! the status line and assembles the [`LeaseReturn`].
//!
//! The merge rules differ per action:
//!
//! | Action | Environment from | Result bag |
//! |---|---|---|
//! | join | caller | caller |
//! | leave, modify | scheduler, then caller | scheduler, then caller, plus new id |
//! | renew | scheduler, then caller | scheduler, plus new id |
//! | status | scheduler | scheduler, plus acting id |
//!
//! Leave, modify, renew and status return the reservation id they were
//! called with. The id reported by the script travels back in the result bag
//! under [`NEW_RESERVATION_ID`].

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::command::{ActionKind, ExecSettings};
use crate::environment::Environment;
use crate::error::{ActionError, ConfigError, FailureCause};
use crate::process::{ProcessExecutor, ScriptExecutor, ScriptInvocation};
use crate::properties::{LeaseReturn, NEW_RESERVATION_ID, Properties, ReservationId};
use crate::protocol::StatusReport;

/// Tracing target for lifecycle dispatch.
const LIFECYCLE_TARGET: &str = "lease_exec::lifecycle";

/// Adapter translating lease lifecycle requests into script invocations.
///
/// Holds the validated settings and the executor; no state is kept between
/// calls, so a shared reference may be used from several threads at once
/// when the executor is `Sync`.
///
/// # Example
///
/// ```
/// use lease_exec::{ExecError, LeaseAdapter, Properties, ScriptExecutor, ScriptInvocation};
/// use time::OffsetDateTime;
///
/// struct Canned;
///
/// impl ScriptExecutor for Canned {
///     fn execute(&self, _invocation: ScriptInvocation) -> Result<String, ExecError> {
///         Ok(String::from("OK;lease-42"))
///     }
/// }
///
/// let config: Properties = ["join", "leave", "modify", "renew", "status"]
///     .into_iter()
///     .map(|action| (format!("exec.{action}"), format!("{action}.sh")))
///     .collect();
/// let adapter = LeaseAdapter::with_executor(&config, Canned)?;
///
/// let caller: Properties = [("a.b", "1")].into_iter().collect();
/// let joined = adapter.join(OffsetDateTime::now_utc(), &caller)?;
/// assert_eq!(joined.reservation_id().as_str(), "lease-42");
/// assert_eq!(joined.properties(), &caller);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct LeaseAdapter<E = ProcessExecutor> {
    settings: ExecSettings,
    executor: E,
}

impl LeaseAdapter {
    /// Validates configuration and builds an adapter that spawns real
    /// processes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first missing or empty
    /// `exec.*` command key.
    pub fn initialize(config: &Properties) -> Result<Self, ConfigError> {
        Self::with_executor(config, ProcessExecutor)
    }
}

impl<E> LeaseAdapter<E> {
    /// Validates configuration and builds an adapter around `executor`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first missing or empty
    /// `exec.*` command key.
    pub fn with_executor(config: &Properties, executor: E) -> Result<Self, ConfigError> {
        let settings = ExecSettings::from_properties(config)?;
        info!(
            target: LIFECYCLE_TARGET,
            join = %settings.commands().get(ActionKind::Join),
            leave = %settings.commands().get(ActionKind::Leave),
            modify = %settings.commands().get(ActionKind::Modify),
            renew = %settings.commands().get(ActionKind::Renew),
            status = %settings.commands().get(ActionKind::Status),
            working_dir = ?settings.working_dir(),
            "initialised exec adapter"
        );
        Ok(Self { settings, executor })
    }

    /// Validated settings.
    #[must_use]
    pub const fn settings(&self) -> &ExecSettings {
        &self.settings
    }

    /// Script executor.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E: ScriptExecutor> LeaseAdapter<E> {
    /// Creates a lease.
    ///
    /// The join script receives the caller properties as environment and no
    /// reservation id. Its status line must carry the new id, which becomes
    /// the returned id. The result bag is the caller bag unchanged. `until`
    /// is logged but not passed to the script.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] if the script cannot run, reports `ERROR`,
    /// or omits the reservation id.
    pub fn join(
        &self,
        until: OffsetDateTime,
        caller: &Properties,
    ) -> Result<LeaseReturn, ActionError> {
        let action = ActionKind::Join;
        debug!(target: LIFECYCLE_TARGET, %action, %until, "dispatching");

        let report = self.dispatch(action, None, Environment::from_properties(caller))?;
        let reservation_id = self.require_reservation_id(action, report)?;
        Ok(LeaseReturn::new(reservation_id, caller.clone()))
    }

    /// Releases a lease.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] if the script cannot run, reports `ERROR`,
    /// or omits the reservation id.
    pub fn leave(
        &self,
        reservation_id: &ReservationId,
        caller: &Properties,
        scheduler: &Properties,
    ) -> Result<LeaseReturn, ActionError> {
        self.replace(ActionKind::Leave, reservation_id, caller, scheduler)
    }

    /// Modifies a lease.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] if the script cannot run, reports `ERROR`,
    /// or omits the reservation id.
    pub fn modify(
        &self,
        reservation_id: &ReservationId,
        caller: &Properties,
        scheduler: &Properties,
    ) -> Result<LeaseReturn, ActionError> {
        self.replace(ActionKind::Modify, reservation_id, caller, scheduler)
    }

    /// Renews a lease.
    ///
    /// Unlike leave and modify, the caller (join) properties shape only the
    /// script environment; the result bag is built from the scheduler bag.
    /// `until` is logged but not passed to the script.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] if the script cannot run, reports `ERROR`,
    /// or omits the reservation id.
    pub fn renew(
        &self,
        reservation_id: &ReservationId,
        until: OffsetDateTime,
        caller: &Properties,
        scheduler: &Properties,
    ) -> Result<LeaseReturn, ActionError> {
        let action = ActionKind::Renew;
        let acting = acting_reservation_id(reservation_id, scheduler);
        debug!(
            target: LIFECYCLE_TARGET,
            %action,
            %reservation_id,
            %acting,
            %until,
            "dispatching"
        );

        let mut environment = Environment::from_properties(scheduler);
        environment.overlay(caller);
        let report = self.dispatch(action, Some(&acting), environment)?;
        let new_id = self.require_reservation_id(action, report)?;

        let mut properties = scheduler.clone();
        properties.insert(NEW_RESERVATION_ID, new_id.as_str());
        Ok(LeaseReturn::new(reservation_id.clone(), properties))
    }

    /// Queries a lease.
    ///
    /// The status script needs no reservation id in its reply; the acting id
    /// is echoed back under [`NEW_RESERVATION_ID`].
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] if the script cannot run or reports
    /// `ERROR`.
    pub fn status(
        &self,
        reservation_id: &ReservationId,
        scheduler: &Properties,
    ) -> Result<LeaseReturn, ActionError> {
        let action = ActionKind::Status;
        let acting = acting_reservation_id(reservation_id, scheduler);
        debug!(target: LIFECYCLE_TARGET, %action, %reservation_id, %acting, "dispatching");

        self.dispatch(action, Some(&acting), Environment::from_properties(scheduler))?;

        let mut properties = scheduler.clone();
        properties.insert(NEW_RESERVATION_ID, acting.as_str());
        Ok(LeaseReturn::new(reservation_id.clone(), properties))
    }

    /// Shared body of leave and modify.
    fn replace(
        &self,
        action: ActionKind,
        reservation_id: &ReservationId,
        caller: &Properties,
        scheduler: &Properties,
    ) -> Result<LeaseReturn, ActionError> {
        let acting = acting_reservation_id(reservation_id, scheduler);
        debug!(target: LIFECYCLE_TARGET, %action, %reservation_id, %acting, "dispatching");

        let mut environment = Environment::from_properties(scheduler);
        environment.overlay(caller);
        let report = self.dispatch(action, Some(&acting), environment)?;
        let new_id = self.require_reservation_id(action, report)?;

        let mut properties = scheduler.merged_with(caller);
        properties.insert(NEW_RESERVATION_ID, new_id.as_str());
        Ok(LeaseReturn::new(reservation_id.clone(), properties))
    }

    /// Runs the script for `action` and parses its status line.
    ///
    /// A script reporting `ERROR` is turned into an [`ActionError`] here, so
    /// callers only see successful reports.
    fn dispatch(
        &self,
        action: ActionKind,
        acting: Option<&ReservationId>,
        environment: Environment,
    ) -> Result<StatusReport, ActionError> {
        let template = self.settings.commands().get(action);
        let argv = acting.map_or_else(|| template.argv().to_vec(), |id| template.argv_with(id));
        let invocation = ScriptInvocation::new(argv, environment)
            .with_working_dir(self.settings.working_dir());

        let output = self
            .executor
            .execute(invocation)
            .map_err(|err| self.failure(action, FailureCause::from(err)))?;
        let report =
            StatusReport::parse(&output).map_err(|err| self.failure(action, err.into()))?;

        if report.is_ok() {
            debug!(
                target: LIFECYCLE_TARGET,
                %action,
                program = template.program(),
                message = report.message(),
                "script reported success"
            );
            return Ok(report);
        }
        Err(self.failure(
            action,
            FailureCause::ScriptReported {
                message: report.message().to_owned(),
            },
        ))
    }

    fn require_reservation_id(
        &self,
        action: ActionKind,
        report: StatusReport,
    ) -> Result<ReservationId, ActionError> {
        report
            .into_reservation_id()
            .map_err(|err| self.failure(action, err.into()))
    }

    fn failure(&self, action: ActionKind, cause: FailureCause) -> ActionError {
        let error = ActionError::new(action, self.settings.commands().get(action), cause);
        warn!(target: LIFECYCLE_TARGET, %action, %error, "lifecycle action failed");
        error
    }
}

/// Reservation id handed to the script: the scheduler's
/// [`NEW_RESERVATION_ID`] override if present, else the caller's id.
fn acting_reservation_id(reservation_id: &ReservationId, scheduler: &Properties) -> ReservationId {
    scheduler
        .get(NEW_RESERVATION_ID)
        .map_or_else(|| reservation_id.clone(), ReservationId::new)
}
