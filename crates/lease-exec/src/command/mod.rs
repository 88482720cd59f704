//! Per-action command templates.
//!
//! Each [`ActionKind`] owns exactly one configuration key and one
//! [`CommandTemplate`]. The templates are parsed once when the adapter is
//! initialised and are read-only afterwards, so a [`CommandTable`] can be
//! shared between threads without synchronisation.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ConfigError;
use crate::properties::{Properties, ReservationId};

/// Configuration key naming the scripts' working directory.
pub const WORKING_DIR_KEY: &str = "exec.wd";

/// Lifecycle actions the adapter can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Create a new lease.
    Join,
    /// Release a lease.
    Leave,
    /// Change an active lease.
    Modify,
    /// Extend a lease.
    Renew,
    /// Query a lease.
    Status,
}

impl ActionKind {
    /// Every action, in configuration order.
    pub const ALL: [Self; 5] = [
        Self::Join,
        Self::Leave,
        Self::Modify,
        Self::Renew,
        Self::Status,
    ];

    /// Configuration key holding this action's command template.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::Join => "exec.join",
            Self::Leave => "exec.leave",
            Self::Modify => "exec.modify",
            Self::Renew => "exec.renew",
            Self::Status => "exec.status",
        }
    }

    /// Lower-case action name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Modify => "modify",
            Self::Renew => "renew",
            Self::Status => "status",
        }
    }

    /// Whether the acting reservation id is appended to the argv.
    ///
    /// Join creates the lease, so there is no id to pass yet.
    #[must_use]
    pub const fn takes_reservation_id(self) -> bool {
        !matches!(self, Self::Join)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument vector template for one action.
///
/// Built by splitting a configuration string on runs of whitespace. There is
/// no quoting support. A template always holds at least one token.
///
/// # Example
///
/// ```
/// use lease_exec::{CommandTemplate, ReservationId};
///
/// let template = CommandTemplate::parse("exec.leave", Some("leave.sh   -a  -b"))?;
/// assert_eq!(template.argv(), ["leave.sh", "-a", "-b"]);
///
/// let argv = template.argv_with(&ReservationId::new("lease-1"));
/// assert_eq!(argv, ["leave.sh", "-a", "-b", "lease-1"]);
/// # Ok::<(), lease_exec::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandTemplate {
    tokens: Vec<String>,
}

impl CommandTemplate {
    /// Parses the raw configuration value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCommand`] when `raw` is `None` and
    /// [`ConfigError::EmptyCommand`] when it contains no tokens.
    pub fn parse(key: &'static str, raw: Option<&str>) -> Result<Self, ConfigError> {
        let raw_value = raw.ok_or(ConfigError::MissingCommand { key })?;
        let tokens: Vec<String> = raw_value.split_whitespace().map(str::to_owned).collect();
        if tokens.is_empty() {
            return Err(ConfigError::EmptyCommand { key });
        }
        Ok(Self { tokens })
    }

    /// Template tokens, program first.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.tokens
    }

    /// Template tokens followed by `reservation_id`.
    #[must_use]
    pub fn argv_with(&self, reservation_id: &ReservationId) -> Vec<String> {
        let mut argv = self.tokens.clone();
        argv.push(reservation_id.as_str().to_owned());
        argv
    }

    /// Program token.
    #[must_use]
    pub fn program(&self) -> &str {
        self.tokens.first().map_or("", String::as_str)
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.tokens.join(", "))
    }
}

/// Immutable action-to-template table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandTable {
    join: CommandTemplate,
    leave: CommandTemplate,
    modify: CommandTemplate,
    renew: CommandTemplate,
    status: CommandTemplate,
}

impl CommandTable {
    /// Builds the table from configuration properties.
    ///
    /// Keys are validated in [`ActionKind::ALL`] order; the first missing or
    /// empty key is reported.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first missing or empty key.
    pub fn from_properties(config: &Properties) -> Result<Self, ConfigError> {
        let template = |action: ActionKind| {
            let key = action.config_key();
            CommandTemplate::parse(key, config.get(key))
        };
        Ok(Self {
            join: template(ActionKind::Join)?,
            leave: template(ActionKind::Leave)?,
            modify: template(ActionKind::Modify)?,
            renew: template(ActionKind::Renew)?,
            status: template(ActionKind::Status)?,
        })
    }

    /// Template for `action`.
    #[must_use]
    pub const fn get(&self, action: ActionKind) -> &CommandTemplate {
        match action {
            ActionKind::Join => &self.join,
            ActionKind::Leave => &self.leave,
            ActionKind::Modify => &self.modify,
            ActionKind::Renew => &self.renew,
            ActionKind::Status => &self.status,
        }
    }
}

/// Validated adapter settings: the command table and the optional working
/// directory for spawned scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecSettings {
    commands: CommandTable,
    working_dir: Option<PathBuf>,
}

impl ExecSettings {
    /// Reads the `exec.*` keys from configuration.
    ///
    /// An empty `exec.wd` is treated as unset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when any command template is missing or
    /// empty.
    pub fn from_properties(config: &Properties) -> Result<Self, ConfigError> {
        let commands = CommandTable::from_properties(config)?;
        let working_dir = config
            .get(WORKING_DIR_KEY)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            commands,
            working_dir,
        })
    }

    /// Command table.
    #[must_use]
    pub const fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Working directory for scripts, if configured.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }
}
