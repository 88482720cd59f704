//! Unit tests for configuration defaults and property flattening.

use rstest::rstest;

use super::*;

#[rstest]
fn defaults_log_at_info_in_json() {
    let config = Config::default();

    assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    assert_eq!(config.log_format(), LogFormat::Json);
    assert!(config.exec_properties().is_empty());
}

#[rstest]
fn exec_properties_use_dotted_keys() {
    let config = Config {
        exec_join: Some("/opt/join.sh".to_owned()),
        exec_leave: Some("/opt/leave.sh -s".to_owned()),
        exec_wd: Some("/srv/lease".to_owned()),
        ..Config::default()
    };

    let properties = config.exec_properties();

    assert_eq!(
        properties.into_iter().collect::<Vec<_>>(),
        vec![
            ("exec.join".to_owned(), "/opt/join.sh".to_owned()),
            ("exec.leave".to_owned(), "/opt/leave.sh -s".to_owned()),
            ("exec.wd".to_owned(), "/srv/lease".to_owned()),
        ]
    );
}

#[rstest]
#[case("json", LogFormat::Json)]
#[case("compact", LogFormat::Compact)]
#[case("COMPACT", LogFormat::Compact)]
fn log_format_parses_case_insensitively(#[case] text: &str, #[case] expected: LogFormat) {
    assert_eq!(text.parse::<LogFormat>().expect("valid format"), expected);
}

#[rstest]
fn unknown_log_format_is_rejected() {
    assert!("pretty".parse::<LogFormat>().is_err());
}

#[rstest]
fn log_format_displays_in_snake_case() {
    assert_eq!(LogFormat::Compact.to_string(), "compact");
}
