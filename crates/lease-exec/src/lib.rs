//! Script-driven lease lifecycle adapter.
//!
//! The `lease-exec` crate translates the lease lifecycle requests of an
//! orchestration host (join, leave, modify, renew, status) into invocations
//! of operator-supplied programs. Each action runs one short-lived process
//! whose argv comes from a configured [`CommandTemplate`], whose environment
//! carries the request's property bags, and whose first line of stdout is a
//! status line in the form `OK|ERROR [message][;reservation id]`.
//!
//! # Architecture
//!
//! [`LeaseAdapter`] owns an immutable [`CommandTable`] built once from the
//! `exec.*` configuration keys. Each handler merges property bags, converts
//! them into an [`Environment`], hands a [`ScriptInvocation`] to a
//! [`ScriptExecutor`], parses the reply into a [`StatusReport`] and returns a
//! [`LeaseReturn`]. The adapter keeps no state between calls; the host owns
//! timeouts, retries and reservation state.
//!
//! # Example
//!
//! ```rust,no_run
//! use lease_exec::{LeaseAdapter, Properties, ReservationId};
//!
//! let config: Properties = [
//!     ("exec.join", "/opt/lease/join.sh"),
//!     ("exec.leave", "/opt/lease/leave.sh"),
//!     ("exec.modify", "/opt/lease/modify.sh"),
//!     ("exec.renew", "/opt/lease/renew.sh"),
//!     ("exec.status", "/opt/lease/status.sh"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let adapter = LeaseAdapter::initialize(&config)?;
//! let status = adapter.status(&ReservationId::new("lease-42"), &Properties::new())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod command;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod process;
pub mod properties;
pub mod protocol;

#[cfg(test)]
mod tests;

pub use self::command::{ActionKind, CommandTable, CommandTemplate, ExecSettings, WORKING_DIR_KEY};
pub use self::environment::{Environment, environment_key};
pub use self::error::{ActionError, ConfigError, ExecError, FailureCause, ProtocolError};
pub use self::lifecycle::LeaseAdapter;
pub use self::process::{ProcessExecutor, ScriptExecutor, ScriptInvocation};
pub use self::properties::{LeaseReturn, NEW_RESERVATION_ID, Properties, ReservationId};
pub use self::protocol::{Outcome, StatusReport};
