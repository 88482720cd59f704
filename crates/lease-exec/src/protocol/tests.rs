//! Unit tests for the status line parser.

use rstest::rstest;

use super::*;

#[rstest]
#[case::bare_id("OK;abc123", Outcome::Ok, "", Some("abc123"))]
#[case::message_and_id("OK good to go;abc123", Outcome::Ok, "good to go", Some("abc123"))]
#[case::error_message("ERROR disk full", Outcome::Error, "disk full", None)]
#[case::bare_ok("OK", Outcome::Ok, "", None)]
#[case::bare_error("ERROR", Outcome::Error, "", None)]
#[case::padded_id("OK done ;  lease-9  ", Outcome::Ok, "done", Some("lease-9"))]
#[case::extra_segments("OK;first;second", Outcome::Ok, "", Some("first"))]
#[case::error_with_id("ERROR gone;lease-1", Outcome::Error, "gone", Some("lease-1"))]
#[case::prefix_match("OKAY", Outcome::Ok, "AY", None)]
#[case::trailing_separator("OK;", Outcome::Ok, "", None)]
#[case::doubled_trailing_separator("OK;;", Outcome::Ok, "", None)]
#[case::blank_id("OK; ", Outcome::Ok, "", Some(""))]
#[case::empty_id_before_more_segments("OK;;x", Outcome::Ok, "", Some(""))]
fn parses_status_lines(
    #[case] input: &str,
    #[case] outcome: Outcome,
    #[case] message: &str,
    #[case] reservation_id: Option<&str>,
) {
    let report = StatusReport::parse(input).expect("parse");
    assert_eq!(report.outcome(), outcome);
    assert_eq!(report.message(), message);
    assert_eq!(report.reservation_id().map(ReservationId::as_str), reservation_id);
}

#[rstest]
#[case::unix("OK;lease-1\nsecond line\n")]
#[case::windows("OK;lease-1\r\nERROR ignored\r\n")]
fn only_the_first_line_is_significant(#[case] input: &str) {
    let report = StatusReport::parse(input).expect("parse");
    assert!(report.is_ok());
    assert_eq!(report.reservation_id().map(ReservationId::as_str), Some("lease-1"));
    assert_eq!(report.status_line(), "OK;lease-1");
}

#[rstest]
#[case::empty("")]
#[case::blank_first_line("\nOK;lease-1")]
fn missing_status_is_a_protocol_error(#[case] input: &str) {
    let error = StatusReport::parse(input).expect_err("should fail");
    assert_eq!(error, ProtocolError::MissingStatus);
}

#[rstest]
#[case::unknown_token("WEIRD text")]
#[case::lower_case("ok;lease-1")]
#[case::leading_space(" OK;lease-1")]
fn unrecognised_outcome_is_a_protocol_error(#[case] input: &str) {
    let error = StatusReport::parse(input).expect_err("should fail");
    assert_eq!(
        error,
        ProtocolError::UnrecognisedStatus {
            status: input.to_owned()
        }
    );
}

#[test]
fn required_reservation_id_is_returned() {
    let report = StatusReport::parse("OK;lease-42").expect("parse");
    let id = report.into_reservation_id().expect("id");
    assert_eq!(id, ReservationId::new("lease-42"));
}

#[rstest]
#[case::blank("OK; ")]
#[case::empty_then_more("OK;;lease-7")]
fn blank_reservation_id_is_still_present(#[case] input: &str) {
    let report = StatusReport::parse(input).expect("parse");
    let id = report.into_reservation_id().expect("id");
    assert_eq!(id.as_str(), "");
}

#[test]
fn missing_required_reservation_id_names_the_status() {
    let report = StatusReport::parse("OK done").expect("parse");
    let error = report.into_reservation_id().expect_err("should fail");
    assert_eq!(
        error,
        ProtocolError::MissingReservationId {
            status: "OK done".into()
        }
    );
}
