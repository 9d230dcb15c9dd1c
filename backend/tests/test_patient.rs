//! Patient records: identity, outcome, misdiagnosis and location

use ed_simulator_core_rs::models::{
    Acuity, Esi, Outcome, PatientError, PatientId, PatientLocation, PatientProfile,
    PatientRegistry, StationKind, StationName, ZoneId,
};
use ed_simulator_core_rs::RngManager;

fn registry_with(esi: Esi) -> (PatientRegistry, PatientId) {
    let mut registry = PatientRegistry::new();
    let id = registry.create(PatientProfile::with_esi(esi));
    (registry, id)
}

#[test]
fn test_registry_assigns_sequential_ids() {
    let mut registry = PatientRegistry::new();
    let a = registry.create(PatientProfile::with_esi(Esi::Urgent));
    let b = registry.create(PatientProfile::with_esi(Esi::Urgent));
    assert_eq!(a, PatientId(0));
    assert_eq!(b, PatientId(1));
    assert_eq!(b.to_string(), "P_1");
    assert_eq!(registry.len(), 2);
    assert!(registry.get(PatientId(2)).is_none());
}

#[test]
fn test_new_patient_defaults() {
    let (registry, id) = registry_with(Esi::Emergent);
    let p = &registry[id];
    assert_eq!(p.location(), PatientLocation::NotArrived);
    assert_eq!(p.assigned_esi(), None);
    assert_eq!(p.routing_esi(), Esi::Emergent);
    assert_eq!(p.acuity(), Acuity::Moderate);
    assert!(!p.is_disposed());
    assert!(!p.misdiagnosis().was_misdiagnosed);
    assert!(!p.reassessment().reassessed);
}

#[test]
fn test_outcome_set_once() {
    let (mut registry, id) = registry_with(Esi::Urgent);
    let p = &mut registry[id];
    p.set_outcome(Outcome::LeftWithoutBeingSeen, 45.0).unwrap();

    assert!(p.has_lwbs());
    assert!(!p.died());
    assert!(!p.was_discharged());
    assert_eq!(p.location(), PatientLocation::Disposed);

    let err = p.set_outcome(Outcome::Died, 50.0).unwrap_err();
    assert_eq!(
        err,
        PatientError::OutcomeAlreadySet {
            id,
            existing: Outcome::LeftWithoutBeingSeen
        }
    );
    // original outcome untouched
    assert!(p.has_lwbs());
    assert_eq!(p.disposition().unwrap().time, 45.0);
}

#[test]
fn test_disposed_patient_cannot_move() {
    let (mut registry, id) = registry_with(Esi::Urgent);
    let p = &mut registry[id];
    p.move_to(PatientLocation::Queued(StationName::Sort)).unwrap();
    p.set_outcome(Outcome::Discharged, 10.0).unwrap();

    assert_eq!(
        p.move_to(PatientLocation::Queued(StationName::Triage)),
        Err(PatientError::AlreadyDisposed(id))
    );
}

#[test]
fn test_move_to_disposed_rejected() {
    let (mut registry, id) = registry_with(Esi::Urgent);
    assert!(registry[id].move_to(PatientLocation::Disposed).is_err());
}

#[test]
fn test_under_diagnosis_recorded() {
    let (mut registry, id) = registry_with(Esi::Emergent);
    let p = &mut registry[id];
    p.set_assigned_esi(Esi::LessUrgent);
    p.record_misdiagnosis(Esi::LessUrgent);

    let record = p.misdiagnosis();
    assert!(record.was_misdiagnosed);
    assert_eq!(record.delta, 2);
    assert!(record.under_diagnosed());
    assert!(!record.over_diagnosed());
}

#[test]
fn test_over_diagnosis_recorded() {
    let (mut registry, id) = registry_with(Esi::NonUrgent);
    registry[id].record_misdiagnosis(Esi::Urgent);
    let record = registry[id].misdiagnosis();
    assert_eq!(record.delta, -2);
    assert!(record.over_diagnosed());
}

#[test]
fn test_correct_diagnosis_not_recorded() {
    let (mut registry, id) = registry_with(Esi::Urgent);
    registry[id].record_misdiagnosis(Esi::Urgent);
    assert!(!registry[id].misdiagnosis().was_misdiagnosed);
}

#[test]
fn test_original_zone_first_assignment_wins() {
    let (mut registry, id) = registry_with(Esi::Urgent);
    registry[id].set_original_zone(ZoneId::Green);
    registry[id].set_original_zone(ZoneId::Red);
    assert_eq!(registry[id].original_zone(), Some(ZoneId::Green));
}

#[test]
fn test_door_to_provider_only_for_discharged() {
    let (mut registry, id) = registry_with(Esi::Urgent);
    let p = &mut registry[id];
    p.visit_mut(StationKind::Sort).arrival = Some(10.0);
    p.visit_mut(StationKind::Zone).processing = Some(70.0);
    assert_eq!(p.door_to_provider_time(), None);

    p.set_outcome(Outcome::Discharged, 130.0).unwrap();
    assert_eq!(p.door_to_provider_time(), Some(60.0));
    assert_eq!(p.ed_length_of_stay(), Some(120.0));
    assert_eq!(p.ed_departure_time(), Some(130.0));
}

#[test]
fn test_station_visit_intervals() {
    let (mut registry, id) = registry_with(Esi::Urgent);
    let visit = registry[id].visit_mut(StationKind::Triage);
    visit.arrival = Some(5.0);
    visit.processing = Some(8.0);
    assert_eq!(visit.waiting_time(), Some(3.0));
    assert_eq!(visit.service_time(), None);

    visit.departure = Some(12.0);
    assert_eq!(visit.service_time(), Some(4.0));
    assert_eq!(visit.response_time(), Some(7.0));
}

#[test]
fn test_esi_clamping_and_levels() {
    assert_eq!(Esi::clamped(-3), Esi::Resuscitation);
    assert_eq!(Esi::clamped(4), Esi::LessUrgent);
    assert_eq!(Esi::clamped(9), Esi::NonUrgent);
    assert_eq!(Esi::from_level(0), None);
    assert!(Esi::Resuscitation < Esi::NonUrgent);
}

#[test]
fn test_sampled_severity_mix() {
    let mut rng = RngManager::new(11);
    let n = 50_000;
    let mut counts = [0usize; 5];
    for _ in 0..n {
        counts[Esi::sample(&mut rng).level() as usize - 1] += 1;
    }
    let share = |i: usize| counts[i] as f64 / n as f64;
    assert!((share(0) - 0.010).abs() < 0.005);
    assert!((share(1) - 0.294).abs() < 0.01);
    assert!((share(2) - 0.488).abs() < 0.01);
    assert!((share(3) - 0.173).abs() < 0.01);
}

#[test]
fn test_sampled_profile_ranges() {
    let mut rng = RngManager::new(5);
    for _ in 0..1_000 {
        let profile = PatientProfile::sample(&mut rng);
        assert!(profile.age < 90);
        assert!((0.0..1.0).contains(&profile.complexity));
    }
}
