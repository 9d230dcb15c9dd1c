//! Priority waiting area
//!
//! Duplicate-free ordered collection of waiting patients under a pluggable
//! prioritization policy. Every station's primary queue is one of these.
//!
//! Ordering keys are captured when a patient is added. A patient whose
//! assigned severity changes (reassessment) is always removed first and
//! re-added at its next station, so captured keys never go stale.
//!
//! Patients with no assigned severity yet (before triage) rank as severity
//! 0, so upstream queues reduce to arrival order.

use crate::core::time::SimTime;
use crate::models::patient::{Patient, PatientId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// How a waiting area orders its patients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrioritizationPolicy {
    /// (assigned severity ascending, ED arrival ascending)
    #[default]
    HigherAcuityFirst,
    /// (ED arrival ascending, assigned severity ascending)
    EarlyArrivalFirst,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaitingAreaError {
    #[error("Waiting area is empty")]
    Empty,
}

/// Values captured from the patient when it joined the area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WaitingEntry {
    severity: u8,
    arrival: SimTime,
}

/// The patient id is the final tie-break, so two patients with equal
/// severity and arrival time are still distinct members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PriorityKey {
    AcuityFirst(u8, SimTime, PatientId),
    ArrivalFirst(SimTime, u8, PatientId),
}

impl PriorityKey {
    fn build(policy: PrioritizationPolicy, id: PatientId, entry: WaitingEntry) -> Self {
        match policy {
            PrioritizationPolicy::HigherAcuityFirst => {
                PriorityKey::AcuityFirst(entry.severity, entry.arrival, id)
            }
            PrioritizationPolicy::EarlyArrivalFirst => {
                PriorityKey::ArrivalFirst(entry.arrival, entry.severity, id)
            }
        }
    }

    fn patient(&self) -> PatientId {
        match *self {
            PriorityKey::AcuityFirst(_, _, id) | PriorityKey::ArrivalFirst(_, _, id) => id,
        }
    }
}

/// Ordered, duplicate-free set of waiting patients
///
/// # Example
/// ```
/// use ed_simulator_core_rs::models::{
///     Esi, Patient, PatientId, PatientProfile, PrioritizationPolicy, WaitingArea,
/// };
///
/// let mut area = WaitingArea::new(PrioritizationPolicy::HigherAcuityFirst);
/// let mut minor = Patient::new(PatientId(0), PatientProfile::with_esi(Esi::NonUrgent));
/// minor.set_assigned_esi(Esi::NonUrgent);
/// let mut major = Patient::new(PatientId(1), PatientProfile::with_esi(Esi::Emergent));
/// major.set_assigned_esi(Esi::Emergent);
///
/// assert!(area.add(&minor));
/// assert!(area.add(&major));
/// assert!(!area.add(&major)); // idempotent
/// assert_eq!(area.poll_highest_priority(), Ok(PatientId(1)));
/// ```
#[derive(Debug, Clone)]
pub struct WaitingArea {
    policy: PrioritizationPolicy,
    ordered: BTreeSet<PriorityKey>,
    entries: BTreeMap<PatientId, WaitingEntry>,
}

impl WaitingArea {
    pub fn new(policy: PrioritizationPolicy) -> Self {
        Self {
            policy,
            ordered: BTreeSet::new(),
            entries: BTreeMap::new(),
        }
    }

    pub fn policy(&self) -> PrioritizationPolicy {
        self.policy
    }

    /// Add a patient. Returns false (and changes nothing) if it is already
    /// present.
    pub fn add(&mut self, patient: &Patient) -> bool {
        let id = patient.id();
        if self.entries.contains_key(&id) {
            return false;
        }
        let entry = WaitingEntry {
            severity: patient.assigned_esi().map_or(0, |esi| esi.level()),
            arrival: SimTime::new(patient.ed_arrival_time().unwrap_or(0.0)),
        };
        self.ordered.insert(PriorityKey::build(self.policy, id, entry));
        self.entries.insert(id, entry);
        true
    }

    pub fn contains(&self, id: PatientId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Remove a specific patient. Returns false if it was not present.
    pub fn remove(&mut self, id: PatientId) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                let removed = self.ordered.remove(&PriorityKey::build(self.policy, id, entry));
                debug_assert!(removed, "waiting area index out of sync for {}", id);
                true
            }
            None => false,
        }
    }

    /// Remove and return the highest-priority patient
    pub fn poll_highest_priority(&mut self) -> Result<PatientId, WaitingAreaError> {
        let key = self.ordered.pop_first().ok_or(WaitingAreaError::Empty)?;
        let id = key.patient();
        self.entries.remove(&id);
        Ok(id)
    }

    /// Highest-priority patient without removing it
    pub fn peek(&self) -> Option<PatientId> {
        self.ordered.first().map(PriorityKey::patient)
    }

    /// Switch policy, rebuilding the order while keeping membership
    pub fn change_policy(&mut self, policy: PrioritizationPolicy) {
        if policy == self.policy {
            return;
        }
        self.policy = policy;
        self.ordered = self
            .entries
            .iter()
            .map(|(&id, &entry)| PriorityKey::build(policy, id, entry))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Patients in priority order
    pub fn iter(&self) -> impl Iterator<Item = PatientId> + '_ {
        self.ordered.iter().map(PriorityKey::patient)
    }
}
