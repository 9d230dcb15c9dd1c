//! Tests for TimeManager and hour-of-day bucketing

use ed_simulator_core_rs::core::time::{hour_of_day, MINUTES_PER_DAY, MINUTES_PER_HOUR};
use ed_simulator_core_rs::TimeManager;

#[test]
fn test_time_manager_new() {
    let time = TimeManager::new();
    assert_eq!(time.current_time(), 0.0);
    assert_eq!(time.current_day(), 0);
    assert_eq!(time.hour_of_day(), 0);
}

#[test]
fn test_advance_within_day() {
    let mut time = TimeManager::new();

    time.advance_to(30.5);
    assert_eq!(time.current_time(), 30.5);
    assert_eq!(time.hour_of_day(), 0);

    time.advance_to(9.0 * MINUTES_PER_HOUR + 1.0);
    assert_eq!(time.hour_of_day(), 9);
    assert_eq!(time.current_day(), 0);
}

#[test]
fn test_day_boundary() {
    let mut time = TimeManager::new();

    time.advance_to(MINUTES_PER_DAY - 0.001);
    assert_eq!(time.current_day(), 0);
    assert_eq!(time.hour_of_day(), 23);

    // Cross into day 1
    time.advance_to(MINUTES_PER_DAY);
    assert_eq!(time.current_day(), 1);
    assert_eq!(time.hour_of_day(), 0);
    assert_eq!(time.minute_within_day(), 0.0);
}

#[test]
fn test_same_time_is_allowed() {
    let mut time = TimeManager::new();
    time.advance_to(100.0);
    time.advance_to(100.0);
    assert_eq!(time.current_time(), 100.0);
}

#[test]
#[should_panic(expected = "cannot move backward")]
fn test_backward_step_panics() {
    let mut time = TimeManager::new();
    time.advance_to(100.0);
    time.advance_to(99.0);
}

#[test]
fn test_hour_of_day_wraps_across_days() {
    assert_eq!(hour_of_day(0.0), 0);
    assert_eq!(hour_of_day(59.9), 0);
    assert_eq!(hour_of_day(60.0), 1);
    assert_eq!(hour_of_day(3.0 * MINUTES_PER_DAY + 22.0 * MINUTES_PER_HOUR), 22);
}

#[test]
fn test_hour_of_day_degenerate_inputs() {
    assert_eq!(hour_of_day(-5.0), 0);
    assert_eq!(hour_of_day(f64::NAN), 0);
}
