//! Patient record
//!
//! One mutable record per patient, owned by the [`PatientRegistry`] and
//! referenced everywhere else by [`PatientId`]. Stations hold ids in their
//! queues; the record's [`PatientLocation`] says which collection holds it.
//!
//! # Critical Invariants
//!
//! 1. **Single terminal outcome**: exactly one of discharged / died / LWBS is
//!    set, at most once ([`Patient::set_outcome`] rejects a second one)
//! 2. **No resurrection**: a disposed patient can never be moved, queued or
//!    admitted again ([`Patient::move_to`] rejects it)
//! 3. **One reassessment check**: at most one pending reassessment event,
//!    referenced by `reassessment.pending_check`

use crate::events::EventHandle;
use crate::models::location::{PatientLocation, StationKind, ZoneId};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Arrival sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatientId(pub usize);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P_{}", self.0)
    }
}

/// Emergency Severity Index, 1 (most severe) to 5 (least severe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Esi {
    Resuscitation = 1,
    Emergent = 2,
    Urgent = 3,
    LessUrgent = 4,
    NonUrgent = 5,
}

impl Esi {
    pub const ALL: [Esi; 5] = [
        Esi::Resuscitation,
        Esi::Emergent,
        Esi::Urgent,
        Esi::LessUrgent,
        Esi::NonUrgent,
    ];

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn from_level(level: u8) -> Option<Esi> {
        match level {
            1 => Some(Esi::Resuscitation),
            2 => Some(Esi::Emergent),
            3 => Some(Esi::Urgent),
            4 => Some(Esi::LessUrgent),
            5 => Some(Esi::NonUrgent),
            _ => None,
        }
    }

    /// Clamp an arbitrary level into 1..=5
    pub fn clamped(level: i64) -> Esi {
        match level {
            i64::MIN..=1 => Esi::Resuscitation,
            2 => Esi::Emergent,
            3 => Esi::Urgent,
            4 => Esi::LessUrgent,
            _ => Esi::NonUrgent,
        }
    }

    pub fn acuity(self) -> Acuity {
        match self {
            Esi::Resuscitation => Acuity::High,
            Esi::Emergent | Esi::Urgent => Acuity::Moderate,
            Esi::LessUrgent | Esi::NonUrgent => Acuity::Low,
        }
    }

    /// Draw from the department's observed severity mix
    /// (1.0% / 29.4% / 48.8% / 17.3% / remainder).
    pub fn sample(rng: &mut RngManager) -> Esi {
        let r = rng.next_f64();
        if r < 0.01 {
            Esi::Resuscitation
        } else if r < 0.01 + 0.294 {
            Esi::Emergent
        } else if r < 0.01 + 0.294 + 0.488 {
            Esi::Urgent
        } else if r < 0.01 + 0.294 + 0.488 + 0.173 {
            Esi::LessUrgent
        } else {
            Esi::NonUrgent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Acuity {
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrivalMode {
    WalkIn,
    Ambulance,
}

/// Demographic and clinical draws made when a patient is created
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub age: u8,
    pub arrival_mode: ArrivalMode,
    pub esi: Esi,
    /// Diagnostic complexity in [0, 1]
    pub complexity: f64,
}

impl PatientProfile {
    /// Fixed profile, mostly for scenarios and tests
    pub fn with_esi(esi: Esi) -> Self {
        Self {
            age: 50,
            arrival_mode: ArrivalMode::WalkIn,
            esi,
            complexity: 0.5,
        }
    }

    /// Sample a new arrival's profile
    pub fn sample(rng: &mut RngManager) -> Self {
        let age = sample_age(rng);
        let arrival_mode = if rng.chance(0.82) {
            ArrivalMode::WalkIn
        } else {
            ArrivalMode::Ambulance
        };
        let esi = Esi::sample(rng);
        let complexity = rng.next_f64();
        Self {
            age,
            arrival_mode,
            esi,
            complexity,
        }
    }
}

fn sample_age(rng: &mut RngManager) -> u8 {
    let r = rng.next_f64();
    let (base, span) = if r < 0.20 {
        (18, 27)
    } else if r < 0.40 {
        (45, 20)
    } else if r < 0.70 {
        (65, 15)
    } else if r < 0.90 {
        (80, 10)
    } else {
        (0, 18)
    };
    (base + rng.range(0, span)) as u8
}

/// Arrival / processing / departure stamps for one station kind.
///
/// `None` means "not yet": a fresh admission resets `departure` to `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StationVisit {
    pub arrival: Option<f64>,
    pub processing: Option<f64>,
    pub departure: Option<f64>,
}

impl StationVisit {
    pub fn waiting_time(&self) -> Option<f64> {
        Some(self.processing? - self.arrival?)
    }

    pub fn service_time(&self) -> Option<f64> {
        Some(self.departure? - self.processing?)
    }

    pub fn response_time(&self) -> Option<f64> {
        Some(self.departure? - self.arrival?)
    }
}

/// Terminal outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Treated and discharged from a zone
    Discharged,
    /// Died during zone treatment
    Died,
    /// Left without being seen
    LeftWithoutBeingSeen,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disposition {
    pub outcome: Outcome,
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosisDirection {
    /// Assigned a less severe level than the truth
    Under,
    /// Assigned a more severe level than the truth
    Over,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MisdiagnosisRecord {
    pub was_misdiagnosed: bool,
    /// assigned - true (positive = under-triaged)
    pub delta: i32,
    pub direction: Option<DiagnosisDirection>,
}

impl MisdiagnosisRecord {
    pub fn under_diagnosed(&self) -> bool {
        self.direction == Some(DiagnosisDirection::Under)
    }

    pub fn over_diagnosed(&self) -> bool {
        self.direction == Some(DiagnosisDirection::Over)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReassessmentRecord {
    pub reassessed: bool,
    /// Zone waiting time accumulated before being pulled for reassessment
    pub time_in_queue_before: f64,
    /// Outstanding reassessment-check event, cancelled when treatment starts
    pub pending_check: Option<EventHandle>,
    /// Zone the patient was waiting in when reassessment fired
    pub origin_zone: Option<ZoneId>,
}

#[derive(Debug, Error, PartialEq)]
pub enum PatientError {
    #[error("Patient {id} already has terminal outcome {existing:?}")]
    OutcomeAlreadySet { id: PatientId, existing: Outcome },

    #[error("Patient {0} has been disposed and cannot be moved")]
    AlreadyDisposed(PatientId),
}

/// A patient moving through the department
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    id: PatientId,
    profile: PatientProfile,
    acuity: Acuity,
    assigned_esi: Option<Esi>,
    visits: [StationVisit; 5],
    ed_departure_time: Option<f64>,
    disposition: Option<Disposition>,
    misdiagnosis: MisdiagnosisRecord,
    reassessment: ReassessmentRecord,
    original_zone: Option<ZoneId>,
    lwbs_check_pending: bool,
    lwbs_probability: f64,
    location: PatientLocation,
}

impl Patient {
    /// Create a patient that has not arrived yet
    ///
    /// # Example
    /// ```
    /// use ed_simulator_core_rs::models::{Esi, Patient, PatientId, PatientProfile};
    ///
    /// let p = Patient::new(PatientId(7), PatientProfile::with_esi(Esi::Urgent));
    /// assert_eq!(p.id().to_string(), "P_7");
    /// assert!(p.assigned_esi().is_none());
    /// assert!(!p.is_disposed());
    /// ```
    pub fn new(id: PatientId, profile: PatientProfile) -> Self {
        Self {
            id,
            acuity: profile.esi.acuity(),
            profile,
            assigned_esi: None,
            visits: [StationVisit::default(); 5],
            ed_departure_time: None,
            disposition: None,
            misdiagnosis: MisdiagnosisRecord::default(),
            reassessment: ReassessmentRecord::default(),
            original_zone: None,
            lwbs_check_pending: false,
            lwbs_probability: 0.0,
            location: PatientLocation::NotArrived,
        }
    }

    pub fn id(&self) -> PatientId {
        self.id
    }

    pub fn profile(&self) -> &PatientProfile {
        &self.profile
    }

    /// True severity
    pub fn esi(&self) -> Esi {
        self.profile.esi
    }

    pub fn age(&self) -> u8 {
        self.profile.age
    }

    pub fn arrival_mode(&self) -> ArrivalMode {
        self.profile.arrival_mode
    }

    pub fn complexity(&self) -> f64 {
        self.profile.complexity
    }

    pub fn acuity(&self) -> Acuity {
        self.acuity
    }

    /// Severity assigned at triage (or reassessment); `None` before triage
    pub fn assigned_esi(&self) -> Option<Esi> {
        self.assigned_esi
    }

    pub fn set_assigned_esi(&mut self, esi: Esi) {
        self.assigned_esi = Some(esi);
    }

    /// Severity used for routing: assigned if diagnosed, else the truth
    pub fn routing_esi(&self) -> Esi {
        self.assigned_esi.unwrap_or(self.profile.esi)
    }

    pub fn visit(&self, kind: StationKind) -> &StationVisit {
        &self.visits[kind.index()]
    }

    pub fn visit_mut(&mut self, kind: StationKind) -> &mut StationVisit {
        &mut self.visits[kind.index()]
    }

    /// ED arrival time (sort-station arrival)
    pub fn ed_arrival_time(&self) -> Option<f64> {
        self.visit(StationKind::Sort).arrival
    }

    pub fn ed_departure_time(&self) -> Option<f64> {
        self.ed_departure_time
    }

    pub fn disposition(&self) -> Option<Disposition> {
        self.disposition
    }

    pub fn is_disposed(&self) -> bool {
        self.disposition.is_some()
    }

    pub fn died(&self) -> bool {
        matches!(self.disposition, Some(d) if d.outcome == Outcome::Died)
    }

    pub fn has_lwbs(&self) -> bool {
        matches!(self.disposition, Some(d) if d.outcome == Outcome::LeftWithoutBeingSeen)
    }

    pub fn was_discharged(&self) -> bool {
        matches!(self.disposition, Some(d) if d.outcome == Outcome::Discharged)
    }

    /// Record the terminal outcome. Fails if one is already recorded.
    pub fn set_outcome(&mut self, outcome: Outcome, time: f64) -> Result<(), PatientError> {
        if let Some(existing) = self.disposition {
            return Err(PatientError::OutcomeAlreadySet {
                id: self.id,
                existing: existing.outcome,
            });
        }
        self.disposition = Some(Disposition { outcome, time });
        self.location = PatientLocation::Disposed;
        if outcome == Outcome::Discharged {
            self.ed_departure_time = Some(time);
        }
        Ok(())
    }

    pub fn misdiagnosis(&self) -> &MisdiagnosisRecord {
        &self.misdiagnosis
    }

    pub fn record_misdiagnosis(&mut self, assigned: Esi) {
        let delta = assigned.level() as i32 - self.profile.esi.level() as i32;
        if delta == 0 {
            return;
        }
        self.misdiagnosis = MisdiagnosisRecord {
            was_misdiagnosed: true,
            delta,
            direction: Some(if delta > 0 {
                DiagnosisDirection::Under
            } else {
                DiagnosisDirection::Over
            }),
        };
    }

    pub fn reassessment(&self) -> &ReassessmentRecord {
        &self.reassessment
    }

    pub fn reassessment_mut(&mut self) -> &mut ReassessmentRecord {
        &mut self.reassessment
    }

    /// Zone first assigned by sort or triage
    pub fn original_zone(&self) -> Option<ZoneId> {
        self.original_zone
    }

    pub fn set_original_zone(&mut self, zone: ZoneId) {
        if self.original_zone.is_none() {
            self.original_zone = Some(zone);
        }
    }

    pub fn lwbs_check_pending(&self) -> bool {
        self.lwbs_check_pending
    }

    pub fn set_lwbs_check_pending(&mut self, pending: bool) {
        self.lwbs_check_pending = pending;
    }

    /// Last LWBS probability computed for this patient
    pub fn lwbs_probability(&self) -> f64 {
        self.lwbs_probability
    }

    pub fn set_lwbs_probability(&mut self, p: f64) {
        self.lwbs_probability = p;
    }

    pub fn location(&self) -> PatientLocation {
        self.location
    }

    /// Move the patient to a new location.
    ///
    /// Disposed patients stay disposed; use [`Patient::set_outcome`] to
    /// dispose.
    pub fn move_to(&mut self, location: PatientLocation) -> Result<(), PatientError> {
        if self.is_disposed() || location == PatientLocation::Disposed {
            return Err(PatientError::AlreadyDisposed(self.id));
        }
        self.location = location;
        Ok(())
    }

    /// Door-to-provider time: ED arrival to start of zone treatment.
    /// Only defined for discharged patients.
    pub fn door_to_provider_time(&self) -> Option<f64> {
        if !self.was_discharged() {
            return None;
        }
        Some(self.visit(StationKind::Zone).processing? - self.ed_arrival_time()?)
    }

    /// ED length of stay: ED arrival to the terminal outcome.
    pub fn ed_length_of_stay(&self) -> Option<f64> {
        let disposition = self.disposition?;
        Some(disposition.time - self.ed_arrival_time()?)
    }
}

/// Arena of every patient created during a run, indexed by `PatientId`.
#[derive(Debug, Clone, Default)]
pub struct PatientRegistry {
    patients: Vec<Patient>,
}

impl PatientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a patient with the next sequence number
    pub fn create(&mut self, profile: PatientProfile) -> PatientId {
        let id = PatientId(self.patients.len());
        self.patients.push(Patient::new(id, profile));
        id
    }

    pub fn get(&self, id: PatientId) -> Option<&Patient> {
        self.patients.get(id.0)
    }

    pub fn get_mut(&mut self, id: PatientId) -> Option<&mut Patient> {
        self.patients.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patient> {
        self.patients.iter()
    }
}

impl std::ops::Index<PatientId> for PatientRegistry {
    type Output = Patient;

    fn index(&self, id: PatientId) -> &Patient {
        self.patients
            .get(id.0)
            .unwrap_or_else(|| panic!("unknown patient {}", id))
    }
}

impl std::ops::IndexMut<PatientId> for PatientRegistry {
    fn index_mut(&mut self, id: PatientId) -> &mut Patient {
        self.patients
            .get_mut(id.0)
            .unwrap_or_else(|| panic!("unknown patient {}", id))
    }
}
