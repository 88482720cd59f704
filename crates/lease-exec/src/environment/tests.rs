//! Unit tests for property-to-environment conversion.

use rstest::rstest;

use super::*;

#[rstest]
#[case::dotted("new.reservationid", "NEW_RESERVATIONID")]
#[case::mixed_case("Unit.Ip", "UNIT_IP")]
#[case::already_upper("SITE", "SITE")]
#[case::repeated_dots("a..b.", "A__B_")]
#[case::empty("", "")]
fn keys_are_upper_cased_with_underscores(#[case] key: &str, #[case] expected: &str) {
    assert_eq!(environment_key(key), expected);
}

#[test]
fn values_pass_through_unchanged() {
    let properties: Properties = [("unit.name", "Mixed.Case value")].into_iter().collect();
    let environment = Environment::from_properties(&properties);
    assert_eq!(environment.get("UNIT_NAME"), Some("Mixed.Case value"));
    assert_eq!(environment.len(), 1);
}

#[test]
fn overlay_lets_the_later_bag_win() {
    let scheduler: Properties = [("a.b", "sched"), ("only.sched", "1")].into_iter().collect();
    let caller: Properties = [("a.b", "caller")].into_iter().collect();

    let mut environment = Environment::from_properties(&scheduler);
    environment.overlay(&caller);

    assert_eq!(environment.get("A_B"), Some("caller"));
    assert_eq!(environment.get("ONLY_SCHED"), Some("1"));
}

#[test]
fn keys_colliding_after_conversion_keep_one_value() {
    let scheduler: Properties = [("a.b", "dotted")].into_iter().collect();
    let caller: Properties = [("A_B", "plain")].into_iter().collect();

    let mut environment = Environment::from_properties(&scheduler);
    environment.overlay(&caller);

    assert_eq!(environment.len(), 1);
    assert_eq!(environment.get("A_B"), Some("plain"));
}

#[test]
fn conversion_is_independent_of_insertion_order() {
    let mut first = Properties::new();
    first.insert("x.one", "1");
    first.insert("y.two", "2");
    let mut second = Properties::new();
    second.insert("y.two", "2");
    second.insert("x.one", "1");

    assert_eq!(
        Environment::from_properties(&first),
        Environment::from_properties(&second)
    );
}
