//! Errors raised by the adapter.
//!
//! Configuration problems surface once, from initialisation, as
//! [`ConfigError`]. Every lifecycle handler folds its internal failures into
//! a single [`ActionError`] that names the failing command and carries the
//! root cause as a [`FailureCause`]. I/O errors are wrapped in `Arc` to
//! satisfy the `result_large_err` Clippy lint.

use std::sync::Arc;

use thiserror::Error;

use crate::command::{ActionKind, CommandTemplate};

/// Errors raised while building the command table from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required command template key is absent.
    #[error("exec adapter missing configuration property {key}")]
    MissingCommand {
        /// Configuration key that was looked up.
        key: &'static str,
    },

    /// A command template key is present but holds no tokens.
    #[error("exec adapter configuration property {key} is empty")]
    EmptyCommand {
        /// Configuration key holding the empty value.
        key: &'static str,
    },
}

impl ConfigError {
    /// Configuration key the error refers to.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::MissingCommand { key } | Self::EmptyCommand { key } => key,
        }
    }
}

/// Violations of the script status protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The script wrote nothing on its first output line.
    #[error("status string is empty, unable to determine script return status")]
    MissingStatus,

    /// The first line began with neither `OK` nor `ERROR`.
    #[error("unable to parse script return status: {status}")]
    UnrecognisedStatus {
        /// Offending status line.
        status: String,
    },

    /// A successful status line lacked the `;<reservation id>` segment.
    #[error("script return status did not provide a reservation id: {status}")]
    MissingReservationId {
        /// Offending status line.
        status: String,
    },
}

/// Failures spawning or talking to a script process.
#[derive(Debug, Clone, Error)]
pub enum ExecError {
    /// The argument vector had no program to run.
    #[error("cannot execute an empty command")]
    EmptyArgv,

    /// The process could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Feeding input to, or collecting output from, the process failed.
    #[error("I/O error communicating with '{program}': {source}")]
    Io {
        /// Program being executed.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Root cause of a failed lifecycle action.
#[derive(Debug, Clone, Error)]
pub enum FailureCause {
    /// The script output did not follow the status protocol.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The script reported `ERROR` on its status line.
    #[error("error status: {message}")]
    ScriptReported {
        /// Message text following the `ERROR` token.
        message: String,
    },

    /// The script could not be executed.
    #[error(transparent)]
    Execution(#[from] ExecError),
}

/// Uniform failure returned by every lifecycle handler.
///
/// # Example
///
/// ```
/// use lease_exec::{ActionError, ActionKind, CommandTemplate, FailureCause};
///
/// let command = CommandTemplate::parse("exec.status", Some("status.sh -v")).unwrap();
/// let error = ActionError::new(
///     ActionKind::Status,
///     &command,
///     FailureCause::ScriptReported { message: "not found".into() },
/// );
/// assert_eq!(error.script_message(), Some("not found"));
/// assert_eq!(
///     error.to_string(),
///     "unable to call status script [status.sh, -v]: error status: not found",
/// );
/// ```
#[derive(Debug, Clone, Error)]
#[error("unable to call {action} script {command}: {cause}")]
pub struct ActionError {
    action: ActionKind,
    command: String,
    #[source]
    cause: FailureCause,
}

impl ActionError {
    /// Builds an error for `action`, rendering `command` for the message.
    #[must_use]
    pub fn new(action: ActionKind, command: &CommandTemplate, cause: FailureCause) -> Self {
        Self {
            action,
            command: command.to_string(),
            cause,
        }
    }

    /// Action whose script failed.
    #[must_use]
    pub const fn action(&self) -> ActionKind {
        self.action
    }

    /// Rendered command template of the failing script.
    #[must_use]
    pub const fn command(&self) -> &str {
        self.command.as_str()
    }

    /// Root cause of the failure.
    #[must_use]
    pub const fn cause(&self) -> &FailureCause {
        &self.cause
    }

    /// Message reported by the script when it answered `ERROR`.
    #[must_use]
    pub fn script_message(&self) -> Option<&str> {
        match &self.cause {
            FailureCause::ScriptReported { message } => Some(message.as_str()),
            FailureCause::Protocol(_) | FailureCause::Execution(_) => None,
        }
    }
}

#[cfg(test)]
mod tests;
