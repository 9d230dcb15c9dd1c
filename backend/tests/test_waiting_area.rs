//! Waiting area ordering, membership and policy switching

use ed_simulator_core_rs::models::{
    Esi, Patient, PatientId, PatientProfile, PrioritizationPolicy, StationKind, WaitingArea,
    WaitingAreaError,
};
use proptest::prelude::*;

fn patient(id: usize, assigned: Esi, ed_arrival: f64) -> Patient {
    let mut p = Patient::new(PatientId(id), PatientProfile::with_esi(assigned));
    p.set_assigned_esi(assigned);
    p.visit_mut(StationKind::Sort).arrival = Some(ed_arrival);
    p
}

#[test]
fn test_poll_empty_area_fails() {
    let mut area = WaitingArea::new(PrioritizationPolicy::default());
    assert_eq!(area.poll_highest_priority(), Err(WaitingAreaError::Empty));
    assert_eq!(area.peek(), None);
}

#[test]
fn test_higher_acuity_first() {
    let mut area = WaitingArea::new(PrioritizationPolicy::HigherAcuityFirst);
    area.add(&patient(0, Esi::NonUrgent, 0.0));
    area.add(&patient(1, Esi::Urgent, 50.0));
    area.add(&patient(2, Esi::Emergent, 100.0));

    assert_eq!(area.poll_highest_priority(), Ok(PatientId(2)));
    assert_eq!(area.poll_highest_priority(), Ok(PatientId(1)));
    assert_eq!(area.poll_highest_priority(), Ok(PatientId(0)));
}

#[test]
fn test_equal_acuity_earlier_arrival_first() {
    let mut area = WaitingArea::new(PrioritizationPolicy::HigherAcuityFirst);
    area.add(&patient(0, Esi::Urgent, 40.0));
    area.add(&patient(1, Esi::Urgent, 10.0));

    assert_eq!(area.peek(), Some(PatientId(1)));
}

#[test]
fn test_early_arrival_first() {
    let mut area = WaitingArea::new(PrioritizationPolicy::EarlyArrivalFirst);
    area.add(&patient(0, Esi::Resuscitation, 90.0));
    area.add(&patient(1, Esi::NonUrgent, 5.0));

    assert_eq!(area.poll_highest_priority(), Ok(PatientId(1)));
}

#[test]
fn test_add_is_idempotent() {
    let mut area = WaitingArea::new(PrioritizationPolicy::default());
    let p = patient(0, Esi::Urgent, 0.0);
    assert!(area.add(&p));
    assert!(!area.add(&p));
    assert_eq!(area.len(), 1);
}

#[test]
fn test_remove_specific_patient() {
    let mut area = WaitingArea::new(PrioritizationPolicy::default());
    area.add(&patient(0, Esi::Urgent, 0.0));
    area.add(&patient(1, Esi::Emergent, 0.0));

    assert!(area.remove(PatientId(1)));
    assert!(!area.remove(PatientId(1)));
    assert!(!area.contains(PatientId(1)));
    assert_eq!(area.poll_highest_priority(), Ok(PatientId(0)));
    assert!(area.is_empty());
}

#[test]
fn test_change_policy_keeps_membership() {
    let mut area = WaitingArea::new(PrioritizationPolicy::HigherAcuityFirst);
    area.add(&patient(0, Esi::NonUrgent, 1.0));
    area.add(&patient(1, Esi::Emergent, 2.0));
    assert_eq!(area.peek(), Some(PatientId(1)));

    area.change_policy(PrioritizationPolicy::EarlyArrivalFirst);
    assert_eq!(area.policy(), PrioritizationPolicy::EarlyArrivalFirst);
    assert_eq!(area.len(), 2);
    assert_eq!(area.peek(), Some(PatientId(0)));

    // removal still works against the rebuilt order
    assert!(area.remove(PatientId(0)));
    assert_eq!(area.iter().collect::<Vec<_>>(), vec![PatientId(1)]);
}

fn esi_strategy() -> impl Strategy<Value = Esi> {
    (1u8..=5).prop_map(|level| Esi::from_level(level).unwrap())
}

proptest! {
    #[test]
    fn prop_poll_order_matches_acuity_then_arrival(
        entries in prop::collection::vec((esi_strategy(), 0.0f64..1_000.0), 1..60)
    ) {
        let mut area = WaitingArea::new(PrioritizationPolicy::HigherAcuityFirst);
        let patients: Vec<Patient> = entries
            .iter()
            .enumerate()
            .map(|(i, (esi, t))| patient(i, *esi, *t))
            .collect();
        for p in &patients {
            prop_assert!(area.add(p));
        }

        let mut previous: Option<(u8, f64)> = None;
        while let Ok(id) = area.poll_highest_priority() {
            let (esi, t) = entries[id.0];
            let key = (esi.level(), t);
            if let Some(prev) = previous {
                prop_assert!(prev.0 < key.0 || (prev.0 == key.0 && prev.1 <= key.1));
            }
            previous = Some(key);
        }
        prop_assert!(area.is_empty());
    }

    #[test]
    fn prop_iter_matches_poll_sequence(
        entries in prop::collection::vec((esi_strategy(), 0.0f64..1_000.0), 0..40),
        early_first in any::<bool>(),
    ) {
        let policy = if early_first {
            PrioritizationPolicy::EarlyArrivalFirst
        } else {
            PrioritizationPolicy::HigherAcuityFirst
        };
        let mut area = WaitingArea::new(policy);
        for (i, (esi, t)) in entries.iter().enumerate() {
            area.add(&patient(i, *esi, *t));
        }

        let listed: Vec<PatientId> = area.iter().collect();
        let polled: Vec<PatientId> = std::iter::from_fn(|| area.poll_highest_priority().ok()).collect();
        prop_assert_eq!(listed, polled);
    }
}
