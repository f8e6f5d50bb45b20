use crate::sim::SimTime;

#[test]
fn sim_time_unit_conversions() {
    assert_eq!(SimTime::from_micros(1), SimTime(1_000));
    assert_eq!(SimTime::from_millis(1), SimTime(1_000_000));
    assert_eq!(SimTime::from_secs(1), SimTime(1_000_000_000));
}

#[test]
fn sim_time_unit_conversions_saturate_on_overflow() {
    assert_eq!(SimTime::from_micros(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_millis(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_secs(u64::MAX), SimTime(u64::MAX));
}

#[test]
fn fractional_time_units_round_to_nanoseconds() {
    assert_eq!(SimTime::try_from_millis_f64(2.5), Some(SimTime(2_500_000)));
    assert_eq!(SimTime::try_from_millis_f64(0.0000004), Some(SimTime::ZERO));
    assert_eq!(SimTime::try_from_millis_f64(0.0000006), Some(SimTime(1)));
    assert_eq!(SimTime::try_from_millis_f64(1e30), Some(SimTime::MAX));
}

#[test]
fn negative_or_non_finite_time_units_are_rejected() {
    assert_eq!(SimTime::try_from_millis_f64(-1.0), None);
    assert_eq!(SimTime::try_from_millis_f64(f64::NAN), None);
    assert_eq!(SimTime::try_from_millis_f64(f64::INFINITY), None);
}

#[test]
fn millis_round_trip_and_display() {
    assert_eq!(SimTime::from_millis(20).as_millis_f64(), 20.0);
    assert_eq!(SimTime(1_500_000).to_string(), "1.500000ms");
}
