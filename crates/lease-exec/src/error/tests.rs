//! Unit tests for adapter error types.

use std::error::Error as _;
use std::sync::Arc;

use rstest::rstest;

use super::*;

fn template(raw: &str) -> CommandTemplate {
    CommandTemplate::parse("exec.leave", Some(raw)).expect("valid template")
}

#[rstest]
#[case::missing(ConfigError::MissingCommand { key: "exec.renew" }, "missing")]
#[case::empty(ConfigError::EmptyCommand { key: "exec.renew" }, "empty")]
fn config_error_names_the_key(#[case] error: ConfigError, #[case] detail: &str) {
    let message = error.to_string();
    assert!(
        message.contains("exec.renew"),
        "expected key in message: {message}"
    );
    assert!(
        message.contains(detail),
        "expected '{detail}' in message: {message}"
    );
    assert_eq!(error.key(), "exec.renew");
}

#[test]
fn protocol_error_includes_raw_status() {
    let error = ProtocolError::UnrecognisedStatus {
        status: "WEIRD text".into(),
    };
    let message = error.to_string();
    assert!(
        message.contains("WEIRD text"),
        "expected raw status in message: {message}"
    );
}

#[test]
fn action_error_names_command_and_cause() {
    let error = ActionError::new(
        ActionKind::Leave,
        &template("leave.sh -s"),
        FailureCause::Protocol(ProtocolError::MissingReservationId {
            status: "OK done".into(),
        }),
    );
    let message = error.to_string();
    assert!(message.contains("leave"), "expected action: {message}");
    assert!(
        message.contains("[leave.sh, -s]"),
        "expected command: {message}"
    );
    assert!(
        message.contains("did not provide a reservation id"),
        "expected cause: {message}"
    );
    assert_eq!(error.action(), ActionKind::Leave);
    assert_eq!(error.command(), "[leave.sh, -s]");
    assert!(error.script_message().is_none());
}

#[test]
fn action_error_exposes_execution_source_chain() {
    let error = ActionError::new(
        ActionKind::Leave,
        &template("leave.sh"),
        FailureCause::Execution(ExecError::Spawn {
            program: "leave.sh".into(),
            source: Arc::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
        }),
    );

    let cause = error.source().expect("action error has a cause");
    assert!(cause.to_string().contains("failed to start 'leave.sh'"));
    assert!(cause.source().is_some(), "expected the io error underneath");
}

#[test]
fn errors_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ActionError>();
    assert_send_sync::<ConfigError>();
}
