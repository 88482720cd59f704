//! Script status protocol.
//!
//! A script reports its result on the first line of standard output:
//!
//! ```text
//! status_line := ("OK" | "ERROR") [ message ] [ ";" reservation_id ]
//! ```
//!
//! Lines after the first are ignored, as is the process exit code. Matching of
//! the outcome token is a plain prefix test, so `OKAY` parses as `OK` with the
//! message `AY`.

use crate::error::ProtocolError;
use crate::properties::ReservationId;

const OK_TOKEN: &str = "OK";
const ERROR_TOKEN: &str = "ERROR";
const ID_SEPARATOR: char = ';';

/// Outcome token of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The script succeeded.
    Ok,
    /// The script reported a failure.
    Error,
}

/// Parsed status line.
///
/// # Example
///
/// ```
/// use lease_exec::{Outcome, StatusReport};
///
/// let report = StatusReport::parse("OK good to go;abc123\ntrailing noise")?;
/// assert_eq!(report.outcome(), Outcome::Ok);
/// assert_eq!(report.message(), "good to go");
/// assert_eq!(report.reservation_id().map(|id| id.as_str()), Some("abc123"));
/// # Ok::<(), lease_exec::ProtocolError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    outcome: Outcome,
    message: String,
    reservation_id: Option<ReservationId>,
    status_line: String,
}

impl StatusReport {
    /// Parses captured script output.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingStatus`] when the first line is empty
    /// and [`ProtocolError::UnrecognisedStatus`] when it starts with neither
    /// `OK` nor `ERROR`.
    pub fn parse(output: &str) -> Result<Self, ProtocolError> {
        let status_line = output.lines().next().unwrap_or_default();
        if status_line.is_empty() {
            return Err(ProtocolError::MissingStatus);
        }

        let (outcome, rest) = split_outcome(status_line).ok_or_else(|| {
            ProtocolError::UnrecognisedStatus {
                status: status_line.to_owned(),
            }
        })?;

        let mut segments = rest.split(ID_SEPARATOR);
        let message = segments.next().unwrap_or_default().trim().to_owned();
        // Trailing empty segments do not count, so `OK;` and `OK;;` carry no
        // id while `OK; ` and `OK;;x` carry an empty one.
        let reservation_id = segments
            .clone()
            .any(|segment| !segment.is_empty())
            .then(|| segments.next())
            .flatten()
            .map(|id| ReservationId::new(id.trim()));

        Ok(Self {
            outcome,
            message,
            reservation_id,
            status_line: status_line.to_owned(),
        })
    }

    /// Outcome token.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns whether the outcome is `OK`.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok)
    }

    /// Message text between the outcome token and the first `;`, trimmed.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Reservation id from the segment after the first `;`, if any.
    #[must_use]
    pub const fn reservation_id(&self) -> Option<&ReservationId> {
        self.reservation_id.as_ref()
    }

    /// Raw first line of script output.
    #[must_use]
    pub const fn status_line(&self) -> &str {
        self.status_line.as_str()
    }

    /// Takes the reservation id the script was required to provide.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingReservationId`] when the status line
    /// carried no id segment.
    pub fn into_reservation_id(self) -> Result<ReservationId, ProtocolError> {
        self.reservation_id
            .ok_or(ProtocolError::MissingReservationId {
                status: self.status_line,
            })
    }
}

fn split_outcome(line: &str) -> Option<(Outcome, &str)> {
    if let Some(rest) = line.strip_prefix(OK_TOKEN) {
        return Some((Outcome::Ok, rest));
    }
    line.strip_prefix(ERROR_TOKEN)
        .map(|rest| (Outcome::Error, rest))
}

#[cfg(test)]
mod tests;
