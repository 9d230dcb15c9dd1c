//! Event calendar ordering and cancellation

use ed_simulator_core_rs::events::{EventCalendar, EventKind};
use ed_simulator_core_rs::models::patient::PatientId;
use proptest::prelude::*;

#[test]
fn test_pop_in_time_order() {
    let mut calendar = EventCalendar::new();
    calendar.schedule(30.0, EventKind::TriageDeparture, Some(PatientId(0)));
    calendar.schedule(10.0, EventKind::SortDeparture, Some(PatientId(1)));
    calendar.schedule(20.0, EventKind::RegistrationDeparture, Some(PatientId(2)));

    let times: Vec<f64> = std::iter::from_fn(|| calendar.pop_earliest())
        .map(|e| e.time())
        .collect();
    assert_eq!(times, vec![10.0, 20.0, 30.0]);
    assert!(calendar.is_empty());
}

#[test]
fn test_ties_resolve_in_scheduling_order() {
    let mut calendar = EventCalendar::new();
    calendar.schedule(5.0, EventKind::ReassessmentCheck, Some(PatientId(7)));
    calendar.schedule(5.0, EventKind::ZoneDeparture, Some(PatientId(3)));
    calendar.schedule(5.0, EventKind::DecideToLwbs, Some(PatientId(1)));

    let order: Vec<EventKind> = std::iter::from_fn(|| calendar.pop_earliest())
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        order,
        vec![
            EventKind::ReassessmentCheck,
            EventKind::ZoneDeparture,
            EventKind::DecideToLwbs
        ]
    );
}

#[test]
fn test_cancelled_event_never_fires() {
    let mut calendar = EventCalendar::new();
    let check = calendar.schedule(120.0, EventKind::ReassessmentCheck, Some(PatientId(0)));
    calendar.schedule(60.0, EventKind::ZoneDeparture, Some(PatientId(1)));

    assert!(calendar.cancel(check));
    assert!(!calendar.contains(check));

    let fired: Vec<_> = std::iter::from_fn(|| calendar.pop_earliest()).collect();
    assert_eq!(fired.len(), 1);
    assert!(fired.iter().all(|e| e.handle != check));
}

#[test]
fn test_cancel_is_idempotent() {
    let mut calendar = EventCalendar::new();
    let check = calendar.schedule(1.0, EventKind::ReassessmentCheck, Some(PatientId(0)));

    assert!(calendar.cancel(check));
    assert!(!calendar.cancel(check));
    assert!(calendar.is_empty());
}

#[test]
fn test_cancel_after_fire_is_noop() {
    let mut calendar = EventCalendar::new();
    let check = calendar.schedule(1.0, EventKind::ReassessmentCheck, Some(PatientId(0)));
    let fired = calendar.pop_earliest().unwrap();
    assert_eq!(fired.handle, check);

    assert!(!calendar.cancel(check));
}

#[test]
fn test_peek_time_does_not_pop() {
    let mut calendar = EventCalendar::new();
    assert_eq!(calendar.peek_time(), None);
    calendar.schedule(42.0, EventKind::EdArrival, None);
    assert_eq!(calendar.peek_time(), Some(42.0));
    assert_eq!(calendar.len(), 1);
}

#[test]
fn test_handles_are_distinct_at_equal_times() {
    let mut calendar = EventCalendar::new();
    let a = calendar.schedule(9.0, EventKind::ReassessmentCheck, Some(PatientId(0)));
    let b = calendar.schedule(9.0, EventKind::ReassessmentCheck, Some(PatientId(0)));
    assert_ne!(a, b);
    assert!(a.seq() < b.seq());

    assert!(calendar.cancel(a));
    assert!(calendar.contains(b));
}

proptest! {
    #[test]
    fn prop_pops_are_non_decreasing(times in prop::collection::vec(0.0f64..10_000.0, 1..200)) {
        let mut calendar = EventCalendar::new();
        for (i, t) in times.iter().enumerate() {
            calendar.schedule(*t, EventKind::ZoneDeparture, Some(PatientId(i)));
        }

        let mut last = f64::NEG_INFINITY;
        let mut last_seq = 0;
        let mut popped = 0;
        while let Some(event) = calendar.pop_earliest() {
            prop_assert!(event.time() >= last);
            if event.time() == last {
                prop_assert!(event.handle.seq() > last_seq);
            }
            last = event.time();
            last_seq = event.handle.seq();
            popped += 1;
        }
        prop_assert_eq!(popped, times.len());
    }

    #[test]
    fn prop_cancelled_subset_never_fires(
        times in prop::collection::vec(0.0f64..1_000.0, 1..100),
        mask in prop::collection::vec(any::<bool>(), 100),
    ) {
        let mut calendar = EventCalendar::new();
        let handles: Vec<_> = times
            .iter()
            .enumerate()
            .map(|(i, t)| calendar.schedule(*t, EventKind::ReassessmentCheck, Some(PatientId(i))))
            .collect();

        let mut cancelled = Vec::new();
        for (handle, cancel) in handles.iter().zip(&mask) {
            if *cancel {
                prop_assert!(calendar.cancel(*handle));
                cancelled.push(*handle);
            }
        }

        let fired: Vec<_> = std::iter::from_fn(|| calendar.pop_earliest()).collect();
        prop_assert_eq!(fired.len(), handles.len() - cancelled.len());
        for event in &fired {
            prop_assert!(!cancelled.contains(&event.handle));
        }
    }
}
